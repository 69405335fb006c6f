//! Periodic (timed) effects and their per-character tracker
//!
//! Lifecycle per effect: Inactive -> Active -> Expired. Expired effects are
//! removed from the active set in the same step they reach zero.
//!
//! Each effect carries two durations: `current_duration` is authoritative and
//! drives expiry; `client_current_duration` is a display mirror only.

use armory_core::{Arena, Handle, Name};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Live effect object in the world that does the actual work (damage, visuals).
pub trait EffectObject {
    /// Called once when the tracked effect expires or is cancelled
    fn stop(&mut self, reason: ExpiryReason);
}

/// Caller-owned storage for live effect objects
pub type EffectObjects = Arena<Box<dyn EffectObject>>;

/// Generation-checked reference to a live effect object
pub type EffectObjectHandle = Handle<Box<dyn EffectObject>>;

/// Identifies one activation within a tracker. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EffectId(pub u64);

/// Lifecycle state of an effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectState {
    Inactive,
    Active,
    Expired,
}

/// Why an effect left the active set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpiryReason {
    /// Duration ran out
    Elapsed,
    /// Removed early by request
    Cancelled,
}

/// Errors from effect operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EffectError {
    #[error("cannot {action} an effect that is {from:?}")]
    InvalidStateTransition {
        from: EffectState,
        action: &'static str,
    },

    #[error("effect duration must be positive and finite, got {0}")]
    InvalidDuration(f32),
}

/// A timed buff, debuff, or damage-over-time effect
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodicEffect {
    pub name: Name,
    current_duration: f32,
    client_current_duration: f32,
    max_duration: f32,
    /// Damage figure for UI only. Real damage lives on the effect object.
    pub final_damage_display: f32,
    is_active: bool,
    expired: bool,
    object: Option<EffectObjectHandle>,
}

impl PeriodicEffect {
    /// Create an inactive effect
    pub fn new(name: impl Into<Name>, max_duration: f32) -> Self {
        Self {
            name: name.into(),
            current_duration: 0.0,
            client_current_duration: 0.0,
            max_duration,
            final_damage_display: 0.0,
            is_active: false,
            expired: false,
            object: None,
        }
    }

    pub fn with_damage_display(mut self, damage: f32) -> Self {
        self.final_damage_display = damage;
        self
    }

    /// Link the live effect object to stop on expiry
    pub fn with_object(mut self, object: EffectObjectHandle) -> Self {
        self.object = Some(object);
        self
    }

    pub fn state(&self) -> EffectState {
        if self.is_active {
            EffectState::Active
        } else if self.expired {
            EffectState::Expired
        } else {
            EffectState::Inactive
        }
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Authoritative remaining duration
    pub fn current_duration(&self) -> f32 {
        self.current_duration
    }

    /// Display-only remaining duration. Never use for gameplay decisions.
    pub fn client_current_duration(&self) -> f32 {
        self.client_current_duration
    }

    pub fn max_duration(&self) -> f32 {
        self.max_duration
    }

    pub fn object(&self) -> Option<EffectObjectHandle> {
        self.object
    }

    pub(crate) fn from_replicated(
        name: Name,
        current_duration: f32,
        max_duration: f32,
        final_damage_display: f32,
        is_active: bool,
    ) -> Self {
        Self {
            name,
            current_duration,
            client_current_duration: current_duration,
            max_duration,
            final_damage_display,
            is_active,
            expired: false,
            object: None,
        }
    }

    pub(crate) fn count_down_display(&mut self, delta: f32) {
        self.client_current_duration = (self.client_current_duration - delta).max(0.0);
    }

    fn set_duration(&mut self, duration: f32) {
        self.current_duration = duration.min(self.max_duration);
        self.client_current_duration = self.current_duration;
    }

    fn expire(&mut self) {
        self.is_active = false;
        self.expired = true;
        self.current_duration = 0.0;
        self.client_current_duration = 0.0;
    }
}

/// An effect that just left the active set
#[derive(Debug, Clone, PartialEq)]
pub struct ExpiredEffect {
    pub id: EffectId,
    pub effect: PeriodicEffect,
    pub reason: ExpiryReason,
}

fn check_duration(duration: f32) -> Result<f32, EffectError> {
    if duration.is_finite() && duration > 0.0 {
        Ok(duration)
    } else {
        Err(EffectError::InvalidDuration(duration))
    }
}

/// Manages all active periodic effects on one character, in activation order
#[derive(Debug, Clone, Default)]
pub struct PeriodicEffectTracker {
    active: Vec<(EffectId, PeriodicEffect)>,
    next_id: u64,
}

impl PeriodicEffectTracker {
    /// Create a new empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Start an inactive effect. Always adds a new entry, even if an effect with
    /// the same name is already active; use [`refresh`](Self::refresh) to extend
    /// an existing one instead.
    ///
    /// Starts at `max_duration` unless `start_duration` is given (capped at max).
    pub fn activate(
        &mut self,
        mut effect: PeriodicEffect,
        start_duration: Option<f32>,
    ) -> Result<EffectId, EffectError> {
        let state = effect.state();
        if state != EffectState::Inactive {
            return Err(EffectError::InvalidStateTransition {
                from: state,
                action: "activate",
            });
        }
        check_duration(effect.max_duration)?;
        let start = check_duration(start_duration.unwrap_or(effect.max_duration))?;

        effect.set_duration(start);
        effect.is_active = true;
        let id = EffectId(self.next_id);
        self.next_id += 1;
        debug!(
            "Activated effect '{}' ({:?}) for {:.2}s",
            effect.name, id, effect.current_duration
        );
        self.active.push((id, effect));
        Ok(id)
    }

    /// Reset the remaining duration of an active effect (capped at max)
    ///
    /// Ids this tracker issued that are no longer active have expired; ids it
    /// never issued are reported as inactive.
    pub fn refresh(&mut self, id: EffectId, new_duration: f32) -> Result<(), EffectError> {
        let issued = id.0 < self.next_id;
        let Some((_, effect)) = self.active.iter_mut().find(|(eid, _)| *eid == id) else {
            let from = if issued {
                EffectState::Expired
            } else {
                EffectState::Inactive
            };
            return Err(EffectError::InvalidStateTransition {
                from,
                action: "refresh",
            });
        };
        let duration = check_duration(new_duration)?;
        effect.set_duration(duration);
        debug!("Refreshed effect '{}' ({:?}) to {:.2}s", effect.name, id, effect.current_duration);
        Ok(())
    }

    /// Remove an effect immediately. Cancelling an unknown or already expired
    /// effect does nothing and returns `None`.
    pub fn cancel(&mut self, id: EffectId) -> Option<ExpiredEffect> {
        let pos = self.active.iter().position(|(eid, _)| *eid == id)?;
        let (id, mut effect) = self.active.remove(pos);
        effect.expire();
        debug!("Cancelled effect '{}' ({:?})", effect.name, id);
        Some(ExpiredEffect {
            id,
            effect,
            reason: ExpiryReason::Cancelled,
        })
    }

    /// Cancel every active effect, in activation order
    pub fn cancel_all(&mut self) -> Vec<ExpiredEffect> {
        let ids: Vec<EffectId> = self.active.iter().map(|(id, _)| *id).collect();
        ids.into_iter().filter_map(|id| self.cancel(id)).collect()
    }

    /// Advance all effects by one simulation step. Returns effects that expired.
    ///
    /// Negative or non-finite deltas are treated as zero.
    pub fn tick(&mut self, delta: f32) -> Vec<ExpiredEffect> {
        let delta = if delta.is_finite() { delta.max(0.0) } else { 0.0 };

        for (_, effect) in &mut self.active {
            effect.current_duration = (effect.current_duration - delta).max(0.0);
            effect.count_down_display(delta);
        }

        let mut expired = Vec::new();
        let mut remaining = Vec::with_capacity(self.active.len());
        for (id, mut effect) in self.active.drain(..) {
            if effect.current_duration > 0.0 {
                remaining.push((id, effect));
            } else {
                effect.expire();
                debug!("Effect '{}' ({:?}) expired", effect.name, id);
                expired.push(ExpiredEffect {
                    id,
                    effect,
                    reason: ExpiryReason::Elapsed,
                });
            }
        }
        self.active = remaining;
        expired
    }

    pub fn get(&self, id: EffectId) -> Option<&PeriodicEffect> {
        self.active.iter().find(|(eid, _)| *eid == id).map(|(_, e)| e)
    }

    /// Active effects in activation (display) order
    pub fn iter(&self) -> impl Iterator<Item = (EffectId, &PeriodicEffect)> {
        self.active.iter().map(|(id, e)| (*id, e))
    }

    /// Active effects with the given name
    pub fn find_by_name<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = (EffectId, &'a PeriodicEffect)> + 'a {
        self.iter().filter(move |(_, e)| e.name == name)
    }

    pub fn has_effect(&self, name: &str) -> bool {
        self.find_by_name(name).next().is_some()
    }

    /// Number of active effects
    pub fn count(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

/// Tell live effect objects that their effect ended. Stale handles are skipped.
///
/// Returns how many objects were notified.
pub fn notify_stopped(expired: &[ExpiredEffect], objects: &mut EffectObjects) -> usize {
    let mut notified = 0;
    for entry in expired {
        let Some(handle) = entry.effect.object() else {
            continue;
        };
        match objects.get_mut(handle) {
            Some(object) => {
                object.stop(entry.reason);
                notified += 1;
            }
            None => debug!(
                "Effect object {} for '{}' is gone, skipping stop",
                handle, entry.effect.name
            ),
        }
    }
    notified
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder(Rc<RefCell<Vec<ExpiryReason>>>);

    impl EffectObject for Recorder {
        fn stop(&mut self, reason: ExpiryReason) {
            self.0.borrow_mut().push(reason);
        }
    }

    #[test]
    fn test_activate_starts_at_max() {
        let mut tracker = PeriodicEffectTracker::new();
        let id = tracker.activate(PeriodicEffect::new("Burning", 10.0), None).unwrap();
        let effect = tracker.get(id).unwrap();
        assert_eq!(effect.state(), EffectState::Active);
        assert_eq!(effect.current_duration(), 10.0);
        assert_eq!(effect.client_current_duration(), 10.0);
    }

    #[test]
    fn test_start_duration_capped_at_max() {
        let mut tracker = PeriodicEffectTracker::new();
        let id = tracker.activate(PeriodicEffect::new("Haste", 5.0), Some(30.0)).unwrap();
        assert_eq!(tracker.get(id).unwrap().current_duration(), 5.0);
        let id = tracker.activate(PeriodicEffect::new("Haste", 5.0), Some(2.0)).unwrap();
        assert_eq!(tracker.get(id).unwrap().current_duration(), 2.0);
    }

    #[test]
    fn test_activate_rejects_bad_duration() {
        let mut tracker = PeriodicEffectTracker::new();
        let err = tracker.activate(PeriodicEffect::new("Bad", 0.0), None).unwrap_err();
        assert_eq!(err, EffectError::InvalidDuration(0.0));
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_lifecycle_expires_on_third_tick() {
        let mut tracker = PeriodicEffectTracker::new();
        let id = tracker.activate(PeriodicEffect::new("Poison", 10.0), None).unwrap();
        assert!(tracker.tick(4.0).is_empty());
        assert!(tracker.tick(4.0).is_empty());
        assert_eq!(tracker.get(id).unwrap().current_duration(), 2.0);

        let expired = tracker.tick(4.0);
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].id, id);
        assert_eq!(expired[0].reason, ExpiryReason::Elapsed);
        assert_eq!(expired[0].effect.state(), EffectState::Expired);
        assert!(tracker.get(id).is_none());
        assert_eq!(tracker.count(), 0);
    }

    #[test]
    fn test_duration_never_increases_on_tick() {
        let mut tracker = PeriodicEffectTracker::new();
        let id = tracker.activate(PeriodicEffect::new("Regen", 3.0), None).unwrap();
        tracker.tick(-5.0);
        tracker.tick(f32::NAN);
        assert_eq!(tracker.get(id).unwrap().current_duration(), 3.0);
        tracker.tick(1.0);
        assert_eq!(tracker.get(id).unwrap().current_duration(), 2.0);
    }

    #[test]
    fn test_reactivating_expired_effect_fails() {
        let mut tracker = PeriodicEffectTracker::new();
        let id = tracker.activate(PeriodicEffect::new("Stun", 1.0), None).unwrap();
        let expired = tracker.cancel(id).unwrap();
        let err = tracker.activate(expired.effect, None).unwrap_err();
        assert_eq!(
            err,
            EffectError::InvalidStateTransition {
                from: EffectState::Expired,
                action: "activate",
            }
        );
    }

    #[test]
    fn test_activate_same_name_stacks() {
        let mut tracker = PeriodicEffectTracker::new();
        let a = tracker.activate(PeriodicEffect::new("Bleed", 4.0), None).unwrap();
        let b = tracker.activate(PeriodicEffect::new("Bleed", 4.0), None).unwrap();
        assert_ne!(a, b);
        assert_eq!(tracker.find_by_name("Bleed").count(), 2);
    }

    #[test]
    fn test_refresh_in_place() {
        let mut tracker = PeriodicEffectTracker::new();
        let id = tracker.activate(PeriodicEffect::new("Shield", 8.0), None).unwrap();
        tracker.tick(6.0);
        tracker.refresh(id, 8.0).unwrap();
        assert_eq!(tracker.count(), 1);
        assert_eq!(tracker.get(id).unwrap().current_duration(), 8.0);
    }

    #[test]
    fn test_refresh_inactive_fails() {
        let mut tracker = PeriodicEffectTracker::new();
        let err = tracker.refresh(EffectId(42), 5.0).unwrap_err();
        assert_eq!(
            err,
            EffectError::InvalidStateTransition {
                from: EffectState::Inactive,
                action: "refresh",
            }
        );
    }

    #[test]
    fn test_refresh_ended_effect_reports_expired() {
        let mut tracker = PeriodicEffectTracker::new();
        let cancelled = tracker.activate(PeriodicEffect::new("Slow", 5.0), None).unwrap();
        let elapsed = tracker.activate(PeriodicEffect::new("Stun", 1.0), None).unwrap();
        tracker.cancel(cancelled);
        tracker.tick(1.0);

        for id in [cancelled, elapsed] {
            assert_eq!(
                tracker.refresh(id, 3.0).unwrap_err(),
                EffectError::InvalidStateTransition {
                    from: EffectState::Expired,
                    action: "refresh",
                }
            );
        }
    }

    #[test]
    fn test_refresh_capped_at_max() {
        let mut tracker = PeriodicEffectTracker::new();
        let id = tracker.activate(PeriodicEffect::new("Shield", 8.0), None).unwrap();
        tracker.tick(5.0);
        tracker.refresh(id, 50.0).unwrap();
        let effect = tracker.get(id).unwrap();
        assert_eq!(effect.current_duration(), 8.0);
        assert_eq!(effect.client_current_duration(), 8.0);
    }

    #[test]
    fn test_refresh_rejects_bad_duration() {
        let mut tracker = PeriodicEffectTracker::new();
        let id = tracker.activate(PeriodicEffect::new("Shield", 8.0), None).unwrap();
        tracker.tick(2.0);
        assert_eq!(
            tracker.refresh(id, -1.0).unwrap_err(),
            EffectError::InvalidDuration(-1.0)
        );
        assert!(matches!(
            tracker.refresh(id, f32::INFINITY),
            Err(EffectError::InvalidDuration(_))
        ));
        assert_eq!(tracker.get(id).unwrap().current_duration(), 6.0);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut tracker = PeriodicEffectTracker::new();
        let keep = tracker.activate(PeriodicEffect::new("Haste", 5.0), None).unwrap();
        let id = tracker.activate(PeriodicEffect::new("Slow", 5.0), None).unwrap();

        let first = tracker.cancel(id).unwrap();
        assert_eq!(first.reason, ExpiryReason::Cancelled);
        let ids_once: Vec<EffectId> = tracker.iter().map(|(id, _)| id).collect();

        assert!(tracker.cancel(id).is_none());
        let ids_twice: Vec<EffectId> = tracker.iter().map(|(id, _)| id).collect();
        assert_eq!(ids_once, ids_twice);
        assert_eq!(ids_twice, vec![keep]);

        assert!(tracker.cancel(EffectId(999)).is_none());
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut tracker = PeriodicEffectTracker::new();
        tracker.activate(PeriodicEffect::new("A", 5.0), None).unwrap();
        tracker.activate(PeriodicEffect::new("B", 1.0), None).unwrap();
        tracker.activate(PeriodicEffect::new("C", 5.0), None).unwrap();
        tracker.tick(1.0);
        let names: Vec<&str> = tracker.iter().map(|(_, e)| e.name.as_str()).collect();
        assert_eq!(names, vec!["A", "C"]);
    }

    #[test]
    fn test_cancel_all() {
        let mut tracker = PeriodicEffectTracker::new();
        tracker.activate(PeriodicEffect::new("A", 5.0), None).unwrap();
        tracker.activate(PeriodicEffect::new("B", 5.0), None).unwrap();
        let expired = tracker.cancel_all();
        assert_eq!(expired.len(), 2);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_notify_skips_stale_objects() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut objects: EffectObjects = Arena::new();
        let live = objects.insert(Box::new(Recorder(log.clone())));
        let stale = objects.insert(Box::new(Recorder(log.clone())));
        objects.remove(stale);

        let mut tracker = PeriodicEffectTracker::new();
        tracker
            .activate(PeriodicEffect::new("Burning", 1.0).with_object(live), None)
            .unwrap();
        tracker
            .activate(PeriodicEffect::new("Chill", 1.0).with_object(stale), None)
            .unwrap();
        tracker.activate(PeriodicEffect::new("Plain", 1.0), None).unwrap();

        let expired = tracker.tick(1.0);
        assert_eq!(expired.len(), 3);
        assert_eq!(notify_stopped(&expired, &mut objects), 1);
        assert_eq!(*log.borrow(), vec![ExpiryReason::Elapsed]);
    }
}
