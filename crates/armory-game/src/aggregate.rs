//! Attribute aggregation across equipped items
//!
//! Stacking rules, per attribute name:
//! - every contributing record stackable: the values sum
//! - any contributing record non-stackable: the highest non-stackable value wins and
//!   stackable records of that name are dropped, reported as an [`AttributeConflict`]
//!
//! Names granted by no equipped item are absent from the result, not zero.

use std::collections::BTreeMap;

use armory_core::Name;

use crate::item::ItemRecord;

/// Same-name attributes disagreed on stackability. Resolved in favor of the
/// non-stackable (max) rule; surfaced so callers can warn about bad item data.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeConflict {
    pub name: Name,
    /// Value that was used (highest non-stackable)
    pub kept: f32,
    /// Stackable values that were ignored
    pub dropped: Vec<f32>,
}

/// Result of aggregating a set of equipped items
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation {
    totals: BTreeMap<Name, f32>,
    conflicts: Vec<AttributeConflict>,
}

impl Aggregation {
    /// Final value for an attribute, `None` if no equipped item grants it
    pub fn get(&self, name: &str) -> Option<f32> {
        self.totals.get(name).copied()
    }

    /// All totals in name order
    pub fn totals(&self) -> &BTreeMap<Name, f32> {
        &self.totals
    }

    pub fn conflicts(&self) -> &[AttributeConflict] {
        &self.conflicts
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}

#[derive(Default)]
struct Contributions {
    stacking: Vec<f32>,
    unique: Vec<f32>,
}

/// Compute final attribute values from the given equipped items.
///
/// Pure: the same set of items yields the same result in any order. Stacking
/// values are summed in sorted order so float rounding does not depend on
/// equip order.
pub fn aggregate<'a, I>(items: I) -> Aggregation
where
    I: IntoIterator<Item = &'a ItemRecord>,
{
    let mut grouped: BTreeMap<&'a Name, Contributions> = BTreeMap::new();
    for item in items {
        for attribute in &item.attributes {
            let entry = grouped.entry(attribute.name()).or_default();
            if attribute.is_stackable() {
                entry.stacking.push(attribute.modifier_value());
            } else {
                entry.unique.push(attribute.modifier_value());
            }
        }
    }

    let mut result = Aggregation::default();
    for (name, mut contributions) in grouped {
        contributions.stacking.sort_by(f32::total_cmp);
        let value = match contributions.unique.iter().copied().max_by(f32::total_cmp) {
            Some(max) => {
                if !contributions.stacking.is_empty() {
                    result.conflicts.push(AttributeConflict {
                        name: name.clone(),
                        kept: max,
                        dropped: contributions.stacking,
                    });
                }
                max
            }
            None => contributions.stacking.iter().sum(),
        };
        result.totals.insert(name.clone(), value);
    }
    result
}
