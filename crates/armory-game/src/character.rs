//! Per-character equipment and effect state
//!
//! One `Character` is mutated only by its own per-step update. Other systems read
//! aggregated attributes or take an owned snapshot of equipped items.

use armory_core::{InstanceId, Name};
use tracing::{info, warn};

use crate::aggregate::{aggregate, Aggregation};
use crate::config::CharacterLayout;
use crate::effect::{
    notify_stopped, EffectId, EffectObjects, ExpiredEffect, PeriodicEffectTracker,
};
use crate::error::ArmoryError;
use crate::item::ItemRecord;
use crate::registry::ItemRegistry;
use crate::replication::CharacterSnapshot;
use crate::slots::{InventorySlotManager, SlotId};
use crate::socket::{SocketError, SocketRejection, SocketSet};

/// A character's slots, sockets, and active effects
#[derive(Debug, Clone)]
pub struct Character {
    id: InstanceId,
    slots: InventorySlotManager,
    sockets: SocketSet,
    effects: PeriodicEffectTracker,
}

impl Character {
    /// Create a character with empty slots and sockets from a layout
    pub fn new(layout: &CharacterLayout) -> Result<Self, ArmoryError> {
        let slots = InventorySlotManager::new(layout.slots.iter().map(|s| (s.id, s.kind)))?;
        let sockets = SocketSet::new(layout.sockets.iter().map(|s| s.build()).collect());
        Ok(Self {
            id: InstanceId::new(),
            slots,
            sockets,
            effects: PeriodicEffectTracker::new(),
        })
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn slots(&self) -> &InventorySlotManager {
        &self.slots
    }

    pub fn sockets(&self) -> &SocketSet {
        &self.sockets
    }

    pub fn effects(&self) -> &PeriodicEffectTracker {
        &self.effects
    }

    /// Effect tracker for activate/refresh calls from combat and ability systems
    pub fn effects_mut(&mut self) -> &mut PeriodicEffectTracker {
        &mut self.effects
    }

    /// Equip an item by name into a slot, attaching it to its socket.
    ///
    /// All checks run before anything changes. A previous occupant of the slot is
    /// unequipped and its socket freed.
    pub fn equip(
        &mut self,
        registry: &ItemRegistry,
        slot_id: SlotId,
        item_name: &Name,
    ) -> Result<(), ArmoryError> {
        let item = registry.require(item_name)?;
        self.slots.check_equip(slot_id, item.slot_kind)?;

        let displaced_socket = self
            .slots
            .get(slot_id)
            .and_then(|slot| slot.occupied_item.as_ref())
            .and_then(|name| registry.get(name))
            .and_then(|displaced| displaced.attach_socket.clone());

        if let Some(socket_name) = &item.attach_socket {
            let socket = self
                .sockets
                .get(socket_name)
                .ok_or_else(|| SocketError::UnknownSocket(socket_name.clone()))?;
            // The displaced item's socket is freed before attaching
            let freed = displaced_socket.as_ref() == Some(socket_name);
            let rejection = if !socket.is_available() && !freed {
                Some(SocketRejection::Occupied)
            } else if item.attach_type != socket.accepted_attach_type {
                Some(SocketRejection::TypeMismatch)
            } else {
                None
            };
            if let Some(reason) = rejection {
                return Err(SocketError::SocketUnavailable {
                    socket: socket_name.clone(),
                    item: item.name.clone(),
                    reason,
                }
                .into());
            }
        }

        if let Some(socket_name) = &displaced_socket {
            if self.sockets.get(socket_name).is_some() {
                self.sockets.detach(socket_name)?;
            }
        }
        self.slots.equip(slot_id, item.name.clone(), item.slot_kind)?;
        if item.attach_socket.is_some() {
            self.sockets.attach(item)?;
        }
        info!("Character {} equipped '{}' in slot {}", self.id, item.name, slot_id);
        Ok(())
    }

    /// Unequip a slot, freeing the socket its item was attached to
    pub fn unequip(
        &mut self,
        registry: &ItemRegistry,
        slot_id: SlotId,
    ) -> Result<Option<Name>, ArmoryError> {
        let socket = self
            .slots
            .get(slot_id)
            .and_then(|slot| slot.occupied_item.as_ref())
            .and_then(|name| registry.get(name))
            .and_then(|item| item.attach_socket.clone());
        if let Some(socket_name) = &socket {
            if self.sockets.get(socket_name).is_some() {
                self.sockets.detach(socket_name)?;
            }
        }
        let removed = self.slots.unequip(slot_id)?;
        if let Some(name) = &removed {
            info!("Character {} unequipped '{}' from slot {}", self.id, name, slot_id);
        }
        Ok(removed)
    }

    /// Exchange the items of two slots, or change nothing
    pub fn swap(&mut self, a: SlotId, b: SlotId) -> Result<(), ArmoryError> {
        self.slots.swap(a, b)?;
        Ok(())
    }

    /// Equipped item records in slot order. Unknown names are skipped with a warning.
    pub fn equipped_items<'r>(&self, registry: &'r ItemRegistry) -> Vec<&'r ItemRecord> {
        self.slots
            .equipped_names()
            .filter_map(|name| {
                let item = registry.get(name);
                if item.is_none() {
                    warn!("Equipped item '{}' missing from registry", name);
                }
                item
            })
            .collect()
    }

    /// Owned copy of equipped items, for readers that must not observe a
    /// half-applied update
    pub fn equipped_snapshot(&self, registry: &ItemRegistry) -> Vec<ItemRecord> {
        self.equipped_items(registry).into_iter().cloned().collect()
    }

    /// Final attribute values from equipped items. Stackability conflicts are logged.
    pub fn attributes(&self, registry: &ItemRegistry) -> Aggregation {
        let result = aggregate(self.equipped_items(registry));
        for conflict in result.conflicts() {
            warn!(
                "Attribute '{}' mixes stackable and non-stackable sources; using {} and ignoring {:?}",
                conflict.name, conflict.kept, conflict.dropped
            );
        }
        result
    }

    /// Advance this character by one simulation step
    pub fn step(&mut self, delta: f32, objects: &mut EffectObjects) -> Vec<ExpiredEffect> {
        let expired = self.effects.tick(delta);
        notify_stopped(&expired, objects);
        expired
    }

    /// Cancel an effect and stop its live object. No-op for unknown ids.
    pub fn cancel_effect(
        &mut self,
        id: EffectId,
        objects: &mut EffectObjects,
    ) -> Option<ExpiredEffect> {
        let expired = self.effects.cancel(id)?;
        notify_stopped(std::slice::from_ref(&expired), objects);
        Some(expired)
    }

    /// Authoritative state for observers
    pub fn snapshot(&self) -> CharacterSnapshot {
        CharacterSnapshot {
            character: self.id,
            slots: self.slots.iter().cloned().collect(),
            effects: self.effects.snapshot(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::AttributeRecord;
    use crate::effect::{EffectObject, ExpiryReason, PeriodicEffect};
    use crate::item::{AttachmentType, ItemId, ItemSlotKind};
    use crate::slots::EquipError;
    use std::cell::Cell;
    use std::rc::Rc;

    fn registry() -> ItemRegistry {
        ItemRegistry::from_items([
            ItemRecord::new(ItemId(1), "Iron Helm", ItemSlotKind::Head)
                .with_attribute(AttributeRecord::stacking("Armor", 4.0))
                .with_attribute(AttributeRecord::stacking("Strength", 5.0)),
            ItemRecord::new(ItemId(2), "Longsword", ItemSlotKind::Weapon)
                .with_socket("hand_r", AttachmentType::Weapon)
                .with_attribute(AttributeRecord::stacking("Strength", 5.0)),
            ItemRecord::new(ItemId(3), "Greataxe", ItemSlotKind::Weapon)
                .with_socket("hand_r", AttachmentType::Weapon)
                .with_attribute(AttributeRecord::unique("Strength", 10.0)),
            ItemRecord::new(ItemId(4), "Buckler", ItemSlotKind::Shield)
                .with_socket("hand_l", AttachmentType::Shield)
                .with_attribute(AttributeRecord::stacking("Armor", 2.0)),
            ItemRecord::new(ItemId(5), "Dirk", ItemSlotKind::Weapon)
                .with_socket("hip_l", AttachmentType::Weapon),
            ItemRecord::new(ItemId(6), "Odd Charm", ItemSlotKind::Weapon)
                .with_socket("hand_l", AttachmentType::Weapon),
        ])
        .unwrap()
    }

    fn character() -> Character {
        Character::new(&CharacterLayout::default()).unwrap()
    }

    fn name(s: &str) -> Name {
        Name::from(s)
    }

    const HEAD: SlotId = 0;
    const RIGHT: SlotId = 6;
    const LEFT: SlotId = 7;

    #[test]
    fn test_equip_attaches_socket() {
        let reg = registry();
        let mut ch = character();
        ch.equip(&reg, RIGHT, &name("Longsword")).unwrap();
        let socket = ch.sockets().get(&name("hand_r")).unwrap();
        assert!(!socket.is_available());
        assert_eq!(socket.occupant(), Some(&name("Longsword")));
        assert!(ch.slots().get(RIGHT).unwrap().is_equipped());
    }

    #[test]
    fn test_equip_wrong_slot_changes_nothing() {
        let reg = registry();
        let mut ch = character();
        let err = ch.equip(&reg, HEAD, &name("Longsword")).unwrap_err();
        assert!(matches!(err, ArmoryError::Equip(EquipError::SlotMismatch { .. })));
        assert!(ch.slots().get(HEAD).unwrap().is_empty());
        assert!(ch.sockets().get(&name("hand_r")).unwrap().is_available());
    }

    #[test]
    fn test_equip_type_mismatch_socket_changes_nothing() {
        let reg = registry();
        let mut ch = character();
        let err = ch.equip(&reg, LEFT, &name("Odd Charm")).unwrap_err();
        assert!(matches!(
            err,
            ArmoryError::Socket(SocketError::SocketUnavailable {
                reason: SocketRejection::TypeMismatch,
                ..
            })
        ));
        assert!(ch.slots().get(LEFT).unwrap().is_empty());
    }

    #[test]
    fn test_equip_occupied_socket_fails() {
        let reg = registry();
        let mut ch = character();
        ch.equip(&reg, RIGHT, &name("Longsword")).unwrap();
        let err = ch.equip(&reg, LEFT, &name("Greataxe")).unwrap_err();
        assert!(matches!(
            err,
            ArmoryError::Socket(SocketError::SocketUnavailable {
                reason: SocketRejection::Occupied,
                ..
            })
        ));
        assert!(ch.slots().get(LEFT).unwrap().is_empty());
    }

    #[test]
    fn test_replacing_item_reuses_socket() {
        let reg = registry();
        let mut ch = character();
        ch.equip(&reg, RIGHT, &name("Longsword")).unwrap();
        ch.equip(&reg, RIGHT, &name("Greataxe")).unwrap();
        let socket = ch.sockets().get(&name("hand_r")).unwrap();
        assert_eq!(socket.occupant(), Some(&name("Greataxe")));
        assert_eq!(ch.slots().slot_of(&name("Longsword")), None);
    }

    #[test]
    fn test_unequip_frees_socket_and_attributes() {
        let reg = registry();
        let mut ch = character();
        ch.equip(&reg, RIGHT, &name("Longsword")).unwrap();
        assert_eq!(ch.attributes(&reg).get("Strength"), Some(5.0));

        let removed = ch.unequip(&reg, RIGHT).unwrap();
        assert_eq!(removed, Some(name("Longsword")));
        let socket = ch.sockets().get(&name("hand_r")).unwrap();
        assert!(socket.is_available());
        assert_eq!(socket.last_item(), Some(&name("Longsword")));
        assert_eq!(ch.attributes(&reg).get("Strength"), None);
    }

    #[test]
    fn test_attributes_follow_equipped_items() {
        let reg = registry();
        let mut ch = character();
        ch.equip(&reg, HEAD, &name("Iron Helm")).unwrap();
        ch.equip(&reg, RIGHT, &name("Longsword")).unwrap();
        ch.equip(&reg, LEFT, &name("Buckler")).unwrap();
        let attrs = ch.attributes(&reg);
        assert_eq!(attrs.get("Strength"), Some(10.0));
        assert_eq!(attrs.get("Armor"), Some(6.0));

        ch.equip(&reg, RIGHT, &name("Greataxe")).unwrap();
        let attrs = ch.attributes(&reg);
        assert_eq!(attrs.get("Strength"), Some(10.0));
        assert_eq!(attrs.conflicts().len(), 1);
    }

    #[test]
    fn test_swap_incompatible_is_atomic() {
        let reg = registry();
        let mut ch = character();
        ch.equip(&reg, RIGHT, &name("Longsword")).unwrap();
        ch.equip(&reg, LEFT, &name("Buckler")).unwrap();
        let before = ch.snapshot().slots;
        assert!(ch.swap(RIGHT, LEFT).is_err());
        assert_eq!(ch.snapshot().slots, before);
    }

    #[test]
    fn test_equipped_snapshot_is_owned() {
        let reg = registry();
        let mut ch = character();
        ch.equip(&reg, RIGHT, &name("Longsword")).unwrap();
        let snapshot = ch.equipped_snapshot(&reg);
        ch.unequip(&reg, RIGHT).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(aggregate(&snapshot).get("Strength"), Some(5.0));
    }

    struct Flag(Rc<Cell<bool>>);

    impl EffectObject for Flag {
        fn stop(&mut self, reason: ExpiryReason) {
            assert_eq!(reason, ExpiryReason::Cancelled);
            self.0.set(true);
        }
    }

    #[test]
    fn test_step_and_cancel_effects() {
        let mut ch = character();
        let mut objects = EffectObjects::new();
        let stopped = Rc::new(Cell::new(false));
        let handle = objects.insert(Box::new(Flag(stopped.clone())));

        let burn = ch
            .effects_mut()
            .activate(PeriodicEffect::new("Burning", 10.0), None)
            .unwrap();
        let ward = ch
            .effects_mut()
            .activate(PeriodicEffect::new("Ward", 10.0).with_object(handle), None)
            .unwrap();

        assert!(ch.step(4.0, &mut objects).is_empty());
        let cancelled = ch.cancel_effect(ward, &mut objects).unwrap();
        assert_eq!(cancelled.reason, ExpiryReason::Cancelled);
        assert!(stopped.get());
        assert!(ch.cancel_effect(ward, &mut objects).is_none());

        ch.step(4.0, &mut objects);
        let expired = ch.step(4.0, &mut objects);
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].id, burn);
        assert!(ch.effects().is_empty());
    }

    #[test]
    fn test_snapshot_contents() {
        let reg = registry();
        let mut ch = character();
        ch.equip(&reg, HEAD, &name("Iron Helm")).unwrap();
        ch.effects_mut()
            .activate(PeriodicEffect::new("Haste", 3.0), None)
            .unwrap();
        let snap = ch.snapshot();
        assert_eq!(snap.character, ch.id());
        assert_eq!(snap.slots.len(), 8);
        assert_eq!(snap.effects.len(), 1);
    }
}
