//! Timer registry - every delayed and periodic action of a session.
//!
//! All cadence in the simulation goes through one registry so a flow-state
//! change can suspend everything at once and a restart can cancel
//! everything at once. Timers carry a [`Deferred`] action instead of a
//! closure; the session interprets fired actions at the end of its tick.

use bevy::prelude::*;
use std::time::Duration;

use super::enemy::EnemyId;

/// Handle to a registered timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

/// Work scheduled for later. Handlers must re-check that their target still
/// exists when the action fires.
#[derive(Debug, Clone, PartialEq)]
pub enum Deferred {
    SpawnEnemy,
    EndDash,
    CelestialFury,
    LightningStrike { damage: f32 },
    BossAttack,
    BossMove,
    Meteor,
    ClearInvincibility,
    RestorePlayerAlpha,
    RevertEnemyTint(EnemyId),
    RevertBossTint,
}

#[derive(Debug)]
struct Entry {
    id: TimerId,
    timer: Timer,
    action: Deferred,
    paused: bool,
}

#[derive(Debug, Default)]
pub struct TimerRegistry {
    entries: Vec<Entry>,
    next_id: u64,
    suspended: bool,
}

impl TimerRegistry {
    /// Fire `action` once after `delay`.
    pub fn after(&mut self, delay: Duration, action: Deferred) -> TimerId {
        self.insert(Timer::new(delay, TimerMode::Once), action)
    }

    /// Fire `action` every `period`.
    pub fn every(&mut self, period: Duration, action: Deferred) -> TimerId {
        self.insert(Timer::new(period, TimerMode::Repeating), action)
    }

    fn insert(&mut self, timer: Timer, action: Deferred) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            timer,
            action,
            paused: false,
        });
        id
    }

    /// Drop a timer. Unknown or already-finished ids are ignored.
    pub fn cancel(&mut self, id: TimerId) {
        self.entries.retain(|entry| entry.id != id);
    }

    pub fn contains(&self, id: TimerId) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    /// Pause or resume a single timer, keeping its elapsed time.
    pub fn set_paused(&mut self, id: TimerId, paused: bool) {
        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.id == id) {
            entry.paused = paused;
        }
    }

    pub fn is_paused(&self, id: TimerId) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.id == id && entry.paused)
    }

    /// Suspend every timer. Per-timer pause flags are preserved underneath.
    pub fn pause_all(&mut self) {
        self.suspended = true;
    }

    pub fn resume_all(&mut self) {
        self.suspended = false;
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Cancel every timer and lift the suspension.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.suspended = false;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Advance every running timer and collect the actions that fired,
    /// in registration order. Finished one-shot timers are removed.
    pub fn tick(&mut self, delta: Duration) -> Vec<Deferred> {
        let mut fired = Vec::new();
        if self.suspended {
            return fired;
        }

        for entry in self.entries.iter_mut().filter(|entry| !entry.paused) {
            entry.timer.tick(delta);
            for _ in 0..entry.timer.times_finished_this_tick() {
                fired.push(entry.action.clone());
            }
        }

        self.entries
            .retain(|entry| entry.timer.mode() == TimerMode::Repeating || !entry.timer.is_finished());
        fired
    }
}
