//! Network synchronization payloads
//!
//! Defines which fields are authoritative (sent to observers) and the
//! observer-side display copy. Transport is up to the caller.

use armory_core::{InstanceId, Name};
use serde::{Deserialize, Serialize};

use crate::effect::{EffectId, PeriodicEffect, PeriodicEffectTracker};
use crate::slots::InventorySlot;

/// Authoritative fields of one active effect. `client_current_duration` and the
/// effect object handle are never sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicatedEffect {
    pub id: EffectId,
    pub name: Name,
    pub current_duration: f32,
    pub max_duration: f32,
    pub final_damage_display: f32,
    pub is_active: bool,
}

impl ReplicatedEffect {
    pub fn from_effect(id: EffectId, effect: &PeriodicEffect) -> Self {
        Self {
            id,
            name: effect.name.clone(),
            current_duration: effect.current_duration(),
            max_duration: effect.max_duration(),
            final_damage_display: effect.final_damage_display,
            is_active: effect.is_active(),
        }
    }
}

impl PeriodicEffectTracker {
    /// Authoritative payload for all active effects, in display order
    pub fn snapshot(&self) -> Vec<ReplicatedEffect> {
        self.iter()
            .map(|(id, effect)| ReplicatedEffect::from_effect(id, effect))
            .collect()
    }
}

/// Everything an observer needs to present one character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterSnapshot {
    pub character: InstanceId,
    pub slots: Vec<InventorySlot>,
    pub effects: Vec<ReplicatedEffect>,
}

/// Observer-side display copy of a character's effects.
///
/// Counts display durations down between snapshots so there is something to
/// render. Entries are only added or removed by snapshots, never by local time.
#[derive(Debug, Clone, Default)]
pub struct EffectMirror {
    effects: Vec<(EffectId, PeriodicEffect)>,
}

impl EffectMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the mirror with freshly received authoritative state
    pub fn apply_snapshot(&mut self, snapshot: &[ReplicatedEffect]) {
        self.effects = snapshot
            .iter()
            .map(|r| {
                let effect = PeriodicEffect::from_replicated(
                    r.name.clone(),
                    r.current_duration,
                    r.max_duration,
                    r.final_damage_display,
                    r.is_active,
                );
                (r.id, effect)
            })
            .collect();
    }

    /// Count display durations down locally. Clamped at zero.
    pub fn advance(&mut self, delta: f32) {
        let delta = if delta.is_finite() { delta.max(0.0) } else { 0.0 };
        for (_, effect) in &mut self.effects {
            effect.count_down_display(delta);
        }
    }

    /// Remaining time to show for an effect
    pub fn display_remaining(&self, id: EffectId) -> Option<f32> {
        self.get(id).map(|e| e.client_current_duration())
    }

    pub fn get(&self, id: EffectId) -> Option<&PeriodicEffect> {
        self.effects.iter().find(|(eid, _)| *eid == id).map(|(_, e)| e)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EffectId, &PeriodicEffect)> {
        self.effects.iter().map(|(id, e)| (*id, e))
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}
