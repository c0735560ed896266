//! Flow state machine - the top-level mode of a run.
//!
//! Only `Playing` and `BossFight` simulate. Every other state freezes the
//! world and suspends every timer until play resumes.

use bevy::prelude::*;

use super::{
    session::Session,
    signals::{MusicCue, Signal},
};

/// Player tint applied when the run is lost.
const DEFEAT_TINT: u32 = 0xff0000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FlowState {
    #[default]
    Playing,
    ManuallyPaused,
    UpgradeSelection,
    ShopOpen,
    BossFight,
    BossDefeated,
    GameOver,
}

impl FlowState {
    /// Whether physics, AI and timers run in this state.
    pub fn is_simulating(self) -> bool {
        matches!(self, FlowState::Playing | FlowState::BossFight)
    }
}

/// Background music as last told to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MusicState {
    Playing,
    Paused,
    Stopped,
}

impl Session {
    /// Switch flow state and run its side effects. Re-entering the current
    /// state does nothing.
    pub(crate) fn set_flow_state(&mut self, next: FlowState) {
        if self.flow == next {
            return;
        }
        info!("Flow state: {:?} -> {:?}", self.flow, next);
        self.flow = next;
        self.emit(Signal::PauseOverlay {
            paused: !next.is_simulating(),
        });

        if next.is_simulating() {
            self.timers.resume_all();
            if let Some(spawn) = self.spawn_timer {
                self.timers.set_paused(spawn, next == FlowState::BossFight);
            }
            self.resume_music();
        } else {
            self.timers.pause_all();
            self.pause_music();
        }

        match next {
            FlowState::ManuallyPaused => self.emit(Signal::ShowPauseMenu {
                music_volume: self.audio.music_volume,
                sfx_volume: self.audio.sfx_volume,
            }),
            FlowState::GameOver => self.game_over(),
            _ => {}
        }
    }

    /// The pause key: pause during play, resume from the pause menu.
    pub(crate) fn toggle_pause(&mut self) {
        if self.flow.is_simulating() {
            self.resume_to = self.flow;
            self.set_flow_state(FlowState::ManuallyPaused);
        } else if self.flow == FlowState::ManuallyPaused {
            self.resume();
        } else {
            warn!("Pause toggled in {:?}, ignoring", self.flow);
        }
    }

    /// Leave the pause menu, back to the state the run was paused from.
    pub(crate) fn resume(&mut self) {
        if self.flow != FlowState::ManuallyPaused {
            warn!("Resume requested in {:?}, ignoring", self.flow);
            return;
        }
        self.emit(Signal::ResumedFromPauseMenu);
        self.set_flow_state(self.resume_to);
    }

    /// Tear everything down once the player has died.
    fn game_over(&mut self) {
        self.timers.clear();
        self.spawn_timer = None;
        self.dash_timer = None;
        self.fury_timer = None;

        if self.attributes.is_dashing {
            self.attributes.is_dashing = false;
            self.player.body.gravity = true;
            self.player.alpha = 1.0;
        }
        self.stop_music();

        self.player.tint = Some(DEFEAT_TINT);
        self.player.body.velocity = Vec2::ZERO;
        info!(
            "Game over on wave {} with {} kills",
            self.progression.wave, self.progression.total_kills
        );
        self.emit(Signal::GameOverDisplay {
            wave: self.progression.wave,
            total_kills: self.progression.total_kills,
        });
    }

    pub(crate) fn set_music_volume(&mut self, volume: f32) {
        self.audio.music_volume = volume.clamp(0.0, 1.0);
        self.emit(Signal::Music(MusicCue::Volume(self.audio.music_volume)));
    }

    pub(crate) fn set_sfx_volume(&mut self, volume: f32) {
        self.audio.sfx_volume = volume.clamp(0.0, 1.0);
    }

    pub(crate) fn start_music(&mut self) {
        self.music = MusicState::Playing;
        self.emit(Signal::Music(MusicCue::Play {
            volume: self.audio.music_volume,
        }));
    }

    fn resume_music(&mut self) {
        match self.music {
            MusicState::Playing => {}
            MusicState::Paused => {
                self.music = MusicState::Playing;
                self.emit(Signal::Music(MusicCue::Resume));
            }
            MusicState::Stopped => self.start_music(),
        }
    }

    fn pause_music(&mut self) {
        if self.music == MusicState::Playing {
            self.music = MusicState::Paused;
            self.emit(Signal::Music(MusicCue::Pause));
        }
    }

    pub(crate) fn stop_music(&mut self) {
        if self.music != MusicState::Stopped {
            self.music = MusicState::Stopped;
            self.emit(Signal::Music(MusicCue::Stop));
        }
    }
}
