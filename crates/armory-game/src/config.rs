//! Character layout and effect configuration

use armory_core::Name;
use serde::{Deserialize, Serialize};

use crate::item::AttachmentType;
use crate::slots::{EquipmentSlotKind, SlotId};
use crate::socket::{AttachmentSocket, SocketDetail, SocketSide};

/// One slot in a character layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotLayout {
    pub id: SlotId,
    pub kind: EquipmentSlotKind,
}

/// One attachment socket in a character layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocketLayout {
    pub name: Name,
    pub accepts: AttachmentType,
    pub side: SocketSide,
    pub detail: SocketDetail,
}

impl SocketLayout {
    pub fn build(&self) -> AttachmentSocket {
        AttachmentSocket::new(self.name.clone(), self.accepts, self.side, self.detail)
    }
}

/// Slots and sockets a character is created with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterLayout {
    pub slots: Vec<SlotLayout>,
    pub sockets: Vec<SocketLayout>,
}

impl Default for CharacterLayout {
    fn default() -> Self {
        let slots = [
            EquipmentSlotKind::Head,
            EquipmentSlotKind::Shoulders,
            EquipmentSlotKind::Chest,
            EquipmentSlotKind::Hands,
            EquipmentSlotKind::Legs,
            EquipmentSlotKind::Feet,
            EquipmentSlotKind::RightHand,
            EquipmentSlotKind::LeftHand,
        ]
        .into_iter()
        .enumerate()
        .map(|(id, kind)| SlotLayout {
            id: id as SlotId,
            kind,
        })
        .collect();

        let socket = |name: &str, accepts, side, detail| SocketLayout {
            name: Name::from(name),
            accepts,
            side,
            detail,
        };
        let sockets = vec![
            socket("hand_r", AttachmentType::Weapon, SocketSide::Right, SocketDetail::Hand),
            socket("hand_l", AttachmentType::Shield, SocketSide::Left, SocketDetail::Hand),
            socket("hip_l", AttachmentType::Weapon, SocketSide::Left, SocketDetail::Hip),
            socket("back", AttachmentType::Weapon, SocketSide::Center, SocketDetail::Back),
            socket("head", AttachmentType::Armor, SocketSide::Center, SocketDetail::Body),
        ];

        Self { slots, sockets }
    }
}

/// Periodic effect settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectConfig {
    /// Simulated seconds between replication pushes to observers
    pub snapshot_interval: f32,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            snapshot_interval: 0.5,
        }
    }
}
