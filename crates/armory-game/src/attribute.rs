//! Attribute modifiers granted by items

use armory_core::Name;
use serde::{Deserialize, Serialize};

/// A named numeric modifier with a stacking rule.
///
/// Equality compares every field. Records are never edited in place; build a new
/// one to change a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeRecord {
    name: Name,
    #[serde(rename = "value")]
    modifier_value: f32,
    /// Multiple sources sum when true. When false only the highest value from all
    /// equipped items is used.
    #[serde(default)]
    stackable: bool,
}

impl AttributeRecord {
    pub fn new(name: impl Into<Name>, modifier_value: f32, stackable: bool) -> Self {
        Self {
            name: name.into(),
            modifier_value,
            stackable,
        }
    }

    /// A modifier that sums with other sources of the same name
    pub fn stacking(name: impl Into<Name>, modifier_value: f32) -> Self {
        Self::new(name, modifier_value, true)
    }

    /// A modifier where only the highest source counts
    pub fn unique(name: impl Into<Name>, modifier_value: f32) -> Self {
        Self::new(name, modifier_value, false)
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn modifier_value(&self) -> f32 {
        self.modifier_value
    }

    pub fn is_stackable(&self) -> bool {
        self.stackable
    }

    /// Whether both records modify the same attribute, regardless of value
    pub fn same_attribute(&self, other: &AttributeRecord) -> bool {
        self.name == other.name
    }
}
