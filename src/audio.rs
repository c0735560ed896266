//! Volume settings.
//!
//! Defaults may be seeded from a local JSON file in the user's data
//! directory. Live changes stay in memory and are never written back.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::game::{SimulationSystems, session::Session};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Update, mirror_audio_settings.after(SimulationSystems::Publish));
}

/// Music and sound-effect volumes in `[0, 1]`.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    pub music_volume: f32,
    pub sfx_volume: f32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            music_volume: 0.3,
            sfx_volume: 0.5,
        }
    }
}

impl AudioSettings {
    /// Get the file path for storing settings.
    fn file_path() -> Option<PathBuf> {
        dirs::data_local_dir().map(|dir| dir.join("celestial-fury").join("settings.json"))
    }

    /// Load settings from disk.
    pub fn load() -> Self {
        let Some(path) = Self::file_path() else {
            warn!("Could not determine data directory for audio settings");
            return Self::default();
        };

        if !path.exists() {
            info!("No audio settings found at {:?}, using defaults", path);
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<Self>(&contents) {
                Ok(settings) => {
                    info!("Loaded audio settings from {:?}", path);
                    settings.clamped()
                }
                Err(e) => {
                    warn!("Failed to parse audio settings: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read audio settings file: {}", e);
                Self::default()
            }
        }
    }

    pub fn clamped(self) -> Self {
        Self {
            music_volume: self.music_volume.clamp(0.0, 1.0),
            sfx_volume: self.sfx_volume.clamp(0.0, 1.0),
        }
    }
}

/// Keep the resource in step with the session's live volumes.
fn mirror_audio_settings(session: Res<Session>, mut settings: ResMut<AudioSettings>) {
    let current = session.audio_settings();
    if current != *settings {
        *settings = current;
    }
}
