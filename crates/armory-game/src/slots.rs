//! Inventory slot bookkeeping
//!
//! Maps slot positions to the item occupying them. Handles equip/unequip,
//! swaps, and single-step move undo.

use armory_core::Name;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::item::ItemSlotKind;

/// Slot id type. Slots are addressed by small signed ids.
pub type SlotId = i8;

/// The kind of position a slot represents on a character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentSlotKind {
    Head,
    Shoulders,
    Chest,
    Hands,
    Legs,
    Feet,
    RightHand,
    LeftHand,
}

impl EquipmentSlotKind {
    /// All equipment slot variants
    pub fn all() -> &'static [EquipmentSlotKind] {
        &[
            Self::Head,
            Self::Shoulders,
            Self::Chest,
            Self::Hands,
            Self::Legs,
            Self::Feet,
            Self::RightHand,
            Self::LeftHand,
        ]
    }

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            Self::Head => "Head",
            Self::Shoulders => "Shoulders",
            Self::Chest => "Chest",
            Self::Hands => "Hands",
            Self::Legs => "Legs",
            Self::Feet => "Feet",
            Self::RightHand => "Right Hand",
            Self::LeftHand => "Left Hand",
        }
    }

    /// Whether an item of the given kind may occupy this slot
    pub fn accepts(self, kind: ItemSlotKind) -> bool {
        match self {
            Self::Head => kind == ItemSlotKind::Head,
            Self::Shoulders => kind == ItemSlotKind::Shoulders,
            Self::Chest => kind == ItemSlotKind::Chest,
            Self::Hands => kind == ItemSlotKind::Hands,
            Self::Legs => kind == ItemSlotKind::Legs,
            Self::Feet => kind == ItemSlotKind::Feet,
            Self::RightHand => kind == ItemSlotKind::Weapon,
            Self::LeftHand => matches!(kind, ItemSlotKind::Weapon | ItemSlotKind::Shield),
        }
    }
}

/// Errors from slot operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EquipError {
    /// Item kind doesn't match slot
    #[error("slot {slot} ({expected:?}) cannot hold a {got:?} item")]
    SlotMismatch {
        slot: SlotId,
        expected: EquipmentSlotKind,
        got: ItemSlotKind,
    },

    #[error("no slot with id {0}")]
    UnknownSlot(SlotId),

    #[error("slot id {0} declared twice")]
    DuplicateSlot(SlotId),

    #[error("slot {0} is empty")]
    SlotEmpty(SlotId),

    #[error("slot {0} is already occupied")]
    SlotOccupied(SlotId),
}

/// One slot position and its occupant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventorySlot {
    pub slot_id: SlotId,
    /// Where the current occupant came from, for undoing a move
    pub previous_slot_id: SlotId,
    pub occupied_item: Option<Name>,
    pub is_attached: bool,
    /// Kind of the current occupant
    pub item_slot_kind: Option<ItemSlotKind>,
    pub equipment_slot_kind: EquipmentSlotKind,
}

impl InventorySlot {
    /// Create an empty slot
    pub fn new(slot_id: SlotId, equipment_slot_kind: EquipmentSlotKind) -> Self {
        Self {
            slot_id,
            previous_slot_id: slot_id,
            occupied_item: None,
            is_attached: false,
            item_slot_kind: None,
            equipment_slot_kind,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.occupied_item.is_none()
    }

    /// Occupied and contributing to the character
    pub fn is_equipped(&self) -> bool {
        self.occupied_item.is_some() && self.is_attached
    }

    /// Whether both slots hold the same kind of item (occupant name only)
    pub fn same_occupant(&self, other: &InventorySlot) -> bool {
        self.occupied_item == other.occupied_item
    }

    fn check_accepts(&self, kind: ItemSlotKind) -> Result<(), EquipError> {
        if self.equipment_slot_kind.accepts(kind) {
            Ok(())
        } else {
            Err(EquipError::SlotMismatch {
                slot: self.slot_id,
                expected: self.equipment_slot_kind,
                got: kind,
            })
        }
    }

    fn take(&mut self) -> Option<(Name, ItemSlotKind)> {
        let name = self.occupied_item.take()?;
        let kind = self.item_slot_kind.take()?;
        self.is_attached = false;
        Some((name, kind))
    }

    fn put(&mut self, occupant: (Name, ItemSlotKind), from: SlotId) {
        self.occupied_item = Some(occupant.0);
        self.item_slot_kind = Some(occupant.1);
        self.is_attached = true;
        self.previous_slot_id = from;
    }
}

/// Owns all slots of one character, kept sorted by slot id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "SlotList")]
pub struct InventorySlotManager {
    slots: Vec<InventorySlot>,
}

/// Wire form of a manager; checked on the way in
#[derive(Deserialize)]
struct SlotList {
    slots: Vec<InventorySlot>,
}

impl TryFrom<SlotList> for InventorySlotManager {
    type Error = EquipError;

    fn try_from(list: SlotList) -> Result<Self, Self::Error> {
        Self::from_slots(list.slots)
    }
}

impl InventorySlotManager {
    /// Create a manager from a slot layout. Slot ids must be unique.
    pub fn new(
        layout: impl IntoIterator<Item = (SlotId, EquipmentSlotKind)>,
    ) -> Result<Self, EquipError> {
        Self::from_slots(
            layout
                .into_iter()
                .map(|(id, kind)| InventorySlot::new(id, kind))
                .collect(),
        )
    }

    fn from_slots(mut slots: Vec<InventorySlot>) -> Result<Self, EquipError> {
        slots.sort_by_key(|s| s.slot_id);
        if let Some(pair) = slots.windows(2).find(|w| w[0].slot_id == w[1].slot_id) {
            return Err(EquipError::DuplicateSlot(pair[0].slot_id));
        }
        Ok(Self { slots })
    }

    fn index(&self, slot_id: SlotId) -> Result<usize, EquipError> {
        self.slots
            .binary_search_by_key(&slot_id, |s| s.slot_id)
            .map_err(|_| EquipError::UnknownSlot(slot_id))
    }

    pub fn get(&self, slot_id: SlotId) -> Option<&InventorySlot> {
        self.index(slot_id).ok().map(|i| &self.slots[i])
    }

    /// All slots in slot id order
    pub fn iter(&self) -> impl Iterator<Item = &InventorySlot> {
        self.slots.iter()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Check that an item kind may go into a slot, without changing anything
    pub fn check_equip(&self, slot_id: SlotId, kind: ItemSlotKind) -> Result<(), EquipError> {
        self.slots[self.index(slot_id)?].check_accepts(kind)
    }

    /// Put an item into a slot, replacing any previous occupant.
    pub fn equip(
        &mut self,
        slot_id: SlotId,
        item_name: Name,
        kind: ItemSlotKind,
    ) -> Result<&InventorySlot, EquipError> {
        let idx = self.index(slot_id)?;
        let slot = &mut self.slots[idx];
        slot.check_accepts(kind)?;
        debug!("Equipped '{}' in slot {}", item_name, slot_id);
        slot.put((item_name, kind), slot_id);
        Ok(&self.slots[idx])
    }

    /// Clear a slot, returning the previous occupant. `previous_slot_id` is kept.
    pub fn unequip(&mut self, slot_id: SlotId) -> Result<Option<Name>, EquipError> {
        let idx = self.index(slot_id)?;
        let removed = self.slots[idx].take().map(|(name, _)| name);
        if let Some(name) = &removed {
            debug!("Unequipped '{}' from slot {}", name, slot_id);
        }
        Ok(removed)
    }

    /// Exchange the occupants of two slots. Fails without changes if either slot
    /// rejects its incoming item.
    pub fn swap(&mut self, a: SlotId, b: SlotId) -> Result<(), EquipError> {
        let ia = self.index(a)?;
        let ib = self.index(b)?;
        if ia == ib {
            return Ok(());
        }
        if let Some(kind) = self.slots[ia].item_slot_kind {
            self.slots[ib].check_accepts(kind)?;
        }
        if let Some(kind) = self.slots[ib].item_slot_kind {
            self.slots[ia].check_accepts(kind)?;
        }

        let from_a = self.slots[ia].take();
        let from_b = self.slots[ib].take();
        if let Some(occupant) = from_a {
            self.slots[ib].put(occupant, a);
        }
        if let Some(occupant) = from_b {
            self.slots[ia].put(occupant, b);
        }
        debug!("Swapped slots {} and {}", a, b);
        Ok(())
    }

    /// Move the occupant of `from` into the empty slot `to`
    pub fn move_item(&mut self, from: SlotId, to: SlotId) -> Result<(), EquipError> {
        let ifrom = self.index(from)?;
        let ito = self.index(to)?;
        if ifrom == ito {
            return Ok(());
        }
        let Some(kind) = self.slots[ifrom].item_slot_kind else {
            return Err(EquipError::SlotEmpty(from));
        };
        if !self.slots[ito].is_empty() {
            return Err(EquipError::SlotOccupied(to));
        }
        self.slots[ito].check_accepts(kind)?;

        if let Some(occupant) = self.slots[ifrom].take() {
            self.slots[ito].put(occupant, from);
        }
        debug!("Moved item from slot {} to {}", from, to);
        Ok(())
    }

    /// Send a slot's occupant back to where it was moved from.
    ///
    /// Returns `Ok(false)` when the occupant was not moved there.
    pub fn undo_move(&mut self, slot_id: SlotId) -> Result<bool, EquipError> {
        let idx = self.index(slot_id)?;
        let slot = &self.slots[idx];
        if slot.is_empty() {
            return Err(EquipError::SlotEmpty(slot_id));
        }
        let previous = slot.previous_slot_id;
        if previous == slot_id {
            return Ok(false);
        }
        self.move_item(slot_id, previous)?;
        Ok(true)
    }

    /// Slots whose occupant currently contributes, in slot id order
    pub fn equipped(&self) -> impl Iterator<Item = &InventorySlot> {
        self.slots.iter().filter(|s| s.is_equipped())
    }

    /// Names of all equipped items, in slot id order
    pub fn equipped_names(&self) -> impl Iterator<Item = &Name> {
        self.equipped().filter_map(|s| s.occupied_item.as_ref())
    }

    /// First slot holding an item with this name
    pub fn slot_of(&self, item_name: &Name) -> Option<SlotId> {
        self.slots
            .iter()
            .find(|s| s.occupied_item.as_ref() == Some(item_name))
            .map(|s| s.slot_id)
    }
}
