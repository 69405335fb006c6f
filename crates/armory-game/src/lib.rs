//! Armory Game - Equipment and status-effect state for characters
//!
//! Resolves which attribute modifiers apply to a character from its equipped
//! items, keeps slot and attachment-socket bookkeeping, and tracks timed effects
//! with an authoritative/display split for network observers.

pub mod aggregate;
pub mod attribute;
pub mod character;
pub mod config;
pub mod effect;
pub mod error;
pub mod item;
pub mod registry;
pub mod replication;
pub mod slots;
pub mod socket;

pub use aggregate::{aggregate, Aggregation, AttributeConflict};
pub use attribute::AttributeRecord;
pub use character::Character;
pub use config::{CharacterLayout, EffectConfig, SlotLayout, SocketLayout};
pub use effect::{
    notify_stopped, EffectError, EffectId, EffectObject, EffectObjectHandle, EffectObjects,
    EffectState, ExpiredEffect, ExpiryReason, PeriodicEffect, PeriodicEffectTracker,
};
pub use error::ArmoryError;
pub use item::{AssetRef, AttachmentType, ItemAssets, ItemId, ItemRecord, ItemSlotKind};
pub use registry::{ItemRegistry, RegistryError};
pub use replication::{CharacterSnapshot, EffectMirror, ReplicatedEffect};
pub use slots::{EquipError, EquipmentSlotKind, InventorySlot, InventorySlotManager, SlotId};
pub use socket::{
    attach, can_attach, detach, AttachmentSocket, SocketDetail, SocketError, SocketRejection,
    SocketSet, SocketSide,
};
