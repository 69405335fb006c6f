//! Item definition data model
//!
//! Items are defined by external item data and looked up by name through the
//! [`ItemRegistry`](crate::registry::ItemRegistry). This crate never owns the live
//! in-world item objects.

use armory_core::Name;
use serde::{Deserialize, Serialize};

use crate::attribute::AttributeRecord;

/// Stable numeric item definition identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u32);

/// Which kind of equipment slot an item goes into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemSlotKind {
    Head,
    Shoulders,
    Chest,
    Hands,
    Legs,
    Feet,
    Weapon,
    Shield,
}

impl ItemSlotKind {
    /// All item slot kinds
    pub fn all() -> &'static [ItemSlotKind] {
        &[
            Self::Head,
            Self::Shoulders,
            Self::Chest,
            Self::Hands,
            Self::Legs,
            Self::Feet,
            Self::Weapon,
            Self::Shield,
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
            Self::Weapon => "Weapon",
            Self::Shield => "Shield",
        }
    }
}

/// What kind of attachment socket an item mounts on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentType {
    #[default]
    Armor,
    Weapon,
    Shield,
}

/// Opaque reference to an external asset (mesh, icon, class). Never interpreted here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetRef(pub String);

/// External presentation handles carried along with an item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAssets {
    #[serde(default)]
    pub mesh: Option<AssetRef>,
    #[serde(default)]
    pub icon: Option<AssetRef>,
    #[serde(default)]
    pub class: Option<AssetRef>,
}

/// An item definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: ItemId,
    pub name: Name,
    pub slot_kind: ItemSlotKind,
    /// Socket the item mounts on when equipped, if it is visibly attached
    #[serde(default)]
    pub attach_socket: Option<Name>,
    #[serde(default)]
    pub attach_type: AttachmentType,
    #[serde(default)]
    pub attributes: Vec<AttributeRecord>,
    #[serde(default)]
    pub assets: ItemAssets,
}

impl ItemRecord {
    /// Create an item with no attributes, socket, or assets
    pub fn new(id: ItemId, name: impl Into<Name>, slot_kind: ItemSlotKind) -> Self {
        Self {
            id,
            name: name.into(),
            slot_kind,
            attach_socket: None,
            attach_type: AttachmentType::default(),
            attributes: Vec::new(),
            assets: ItemAssets::default(),
        }
    }

    /// Mount the item on the named socket
    pub fn with_socket(mut self, socket: impl Into<Name>, attach_type: AttachmentType) -> Self {
        self.attach_socket = Some(socket.into());
        self.attach_type = attach_type;
        self
    }

    pub fn with_attribute(mut self, attribute: AttributeRecord) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Whether both records describe the same kind of item (name only).
    ///
    /// Full `==` compares every field, including `id`.
    pub fn same_name(&self, other: &ItemRecord) -> bool {
        self.name == other.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_item() -> ItemRecord {
        ItemRecord::new(ItemId(1), "Iron Sword", ItemSlotKind::Weapon)
            .with_socket("hand_r", AttachmentType::Weapon)
            .with_attribute(AttributeRecord::stacking("Strength", 5.0))
    }

    #[test]
    fn test_builder() {
        let item = test_item();
        assert_eq!(item.attach_socket, Some(Name::from("hand_r")));
        assert_eq!(item.attach_type, AttachmentType::Weapon);
        assert_eq!(item.attributes.len(), 1);
    }

    #[test]
    fn test_same_name_vs_full_equality() {
        let a = test_item();
        let mut b = test_item();
        b.id = ItemId(2);
        assert!(a.same_name(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_deserialize_with_assets() {
        let src = r#"
            id = 7
            name = "Leather Cap"
            slot_kind = "head"
            attributes = [{ name = "Armor", value = 2.0, stackable = true }]
            assets = { icon = "/Game/Icons/LeatherCap" }
        "#;
        let item: ItemRecord = toml::from_str(src).unwrap();
        assert_eq!(item.id, ItemId(7));
        assert_eq!(item.slot_kind, ItemSlotKind::Head);
        assert_eq!(item.attach_socket, None);
        assert_eq!(item.assets.icon, Some(AssetRef("/Game/Icons/LeatherCap".to_string())));
        assert!(item.assets.mesh.is_none());
        assert!(item.attributes[0].is_stackable());
    }

    #[test]
    fn test_slot_kind_count() {
        assert_eq!(ItemSlotKind::all().len(), 8);
    }
}
