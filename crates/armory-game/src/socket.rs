//! Attachment sockets
//!
//! Matches an item's attachment classification against a character's named
//! sockets and tracks which sockets are occupied.

use armory_core::Name;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::item::{AttachmentType, ItemRecord};

/// Which side of the body a socket sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SocketSide {
    Left,
    Right,
    Center,
}

/// Detailed socket placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SocketDetail {
    Hand,
    Hip,
    Back,
    Body,
}

/// Why a socket refused an item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketRejection {
    /// Something is already attached
    Occupied,
    /// The item mounts on a differently named socket
    NameMismatch,
    /// The socket does not accept this attachment type
    TypeMismatch,
}

impl std::fmt::Display for SocketRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Occupied => write!(f, "occupied"),
            Self::NameMismatch => write!(f, "item mounts elsewhere"),
            Self::TypeMismatch => write!(f, "attachment type not accepted"),
        }
    }
}

/// Errors from socket operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SocketError {
    #[error("socket '{socket}' unavailable for '{item}': {reason}")]
    SocketUnavailable {
        socket: Name,
        item: Name,
        reason: SocketRejection,
    },

    #[error("no socket named '{0}'")]
    UnknownSocket(Name),

    #[error("item '{0}' does not mount on a socket")]
    NotAttachable(Name),
}

/// A named attachment point on a character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachmentSocket {
    pub socket_name: Name,
    /// Most recent occupant, kept after detaching for "last worn" hints
    last_item: Option<Name>,
    pub accepted_attach_type: AttachmentType,
    pub side: SocketSide,
    pub detail: SocketDetail,
    is_available: bool,
}

impl AttachmentSocket {
    /// Create an empty, available socket
    pub fn new(
        socket_name: impl Into<Name>,
        accepted_attach_type: AttachmentType,
        side: SocketSide,
        detail: SocketDetail,
    ) -> Self {
        Self {
            socket_name: socket_name.into(),
            last_item: None,
            accepted_attach_type,
            side,
            detail,
            is_available: true,
        }
    }

    pub fn last_item(&self) -> Option<&Name> {
        self.last_item.as_ref()
    }

    pub fn is_available(&self) -> bool {
        self.is_available
    }

    /// Name of the currently attached item, if any
    pub fn occupant(&self) -> Option<&Name> {
        if self.is_available {
            None
        } else {
            self.last_item.as_ref()
        }
    }
}

fn check(item: &ItemRecord, socket: &AttachmentSocket) -> Result<(), SocketRejection> {
    if !socket.is_available {
        return Err(SocketRejection::Occupied);
    }
    if item.attach_socket.as_ref() != Some(&socket.socket_name) {
        return Err(SocketRejection::NameMismatch);
    }
    if item.attach_type != socket.accepted_attach_type {
        return Err(SocketRejection::TypeMismatch);
    }
    Ok(())
}

/// Whether `item` can be attached to `socket` right now
pub fn can_attach(item: &ItemRecord, socket: &AttachmentSocket) -> bool {
    check(item, socket).is_ok()
}

/// Attach `item` to `socket`. Leaves the socket untouched on failure.
pub fn attach(item: &ItemRecord, socket: &mut AttachmentSocket) -> Result<(), SocketError> {
    check(item, socket).map_err(|reason| SocketError::SocketUnavailable {
        socket: socket.socket_name.clone(),
        item: item.name.clone(),
        reason,
    })?;
    socket.is_available = false;
    socket.last_item = Some(item.name.clone());
    debug!("Attached '{}' to socket '{}'", item.name, socket.socket_name);
    Ok(())
}

/// Free a socket. `last_item` is kept. Returns whether anything was attached.
pub fn detach(socket: &mut AttachmentSocket) -> bool {
    if socket.is_available {
        return false;
    }
    socket.is_available = true;
    debug!("Detached socket '{}'", socket.socket_name);
    true
}

/// All sockets of one character, in declaration order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SocketSet {
    sockets: Vec<AttachmentSocket>,
}

impl SocketSet {
    pub fn new(sockets: Vec<AttachmentSocket>) -> Self {
        Self { sockets }
    }

    pub fn get(&self, name: &Name) -> Option<&AttachmentSocket> {
        self.sockets.iter().find(|s| &s.socket_name == name)
    }

    fn get_mut(&mut self, name: &Name) -> Option<&mut AttachmentSocket> {
        self.sockets.iter_mut().find(|s| &s.socket_name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttachmentSocket> {
        self.sockets.iter()
    }

    /// The socket an item mounts on, if the character has it and it would accept the item
    pub fn available_for(&self, item: &ItemRecord) -> Option<&AttachmentSocket> {
        let name = item.attach_socket.as_ref()?;
        self.get(name).filter(|socket| can_attach(item, socket))
    }

    /// Attach an item to the socket it names
    pub fn attach(&mut self, item: &ItemRecord) -> Result<&AttachmentSocket, SocketError> {
        let Some(name) = item.attach_socket.as_ref() else {
            return Err(SocketError::NotAttachable(item.name.clone()));
        };
        let socket = self
            .get_mut(name)
            .ok_or_else(|| SocketError::UnknownSocket(name.clone()))?;
        attach(item, socket)?;
        Ok(&*socket)
    }

    /// Detach the named socket. Returns whether anything was attached.
    pub fn detach(&mut self, name: &Name) -> Result<bool, SocketError> {
        let socket = self
            .get_mut(name)
            .ok_or_else(|| SocketError::UnknownSocket(name.clone()))?;
        Ok(detach(socket))
    }
}
