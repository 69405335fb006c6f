use crate::effect::EffectError;
use crate::registry::RegistryError;
use crate::slots::EquipError;
use crate::socket::SocketError;

/// Any failure reported by a character operation. None are fatal; the
/// character's prior state is left unchanged.
#[derive(Debug, thiserror::Error)]
pub enum ArmoryError {
    #[error(transparent)]
    Equip(#[from] EquipError),

    #[error(transparent)]
    Socket(#[from] SocketError),

    #[error(transparent)]
    Effect(#[from] EffectError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}
