//! Armory Core - Core types and utilities for the Armory equipment runtime
//!
//! This crate provides the foundational types used by the game layer:
//! - `Name` identifiers for items, attributes, sockets, and effects
//! - `InstanceId` stable instance identifiers for characters and item instances
//! - Generational handles and arenas for references to external runtime objects
//! - Fixed-step simulation clock

pub mod handle;
pub mod time;
pub mod types;

pub use handle::{Arena, Handle};
pub use time::{ClockConfig, ClockError, SimClock};
pub use types::{InstanceId, Name};
