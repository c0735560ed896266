//! Celestial Fury - a headless arcade survival-combat simulation.
//!
//! The whole run lives in a [`game::session::Session`]. Hosts either drive
//! it directly or add [`plugin`] to a Bevy app, send [`game::signals::Command`]
//! messages, write [`game::signals::Intents`] and read back
//! [`game::signals::Signal`] messages every frame.

pub mod audio;
pub mod config;
pub mod game;

use bevy::prelude::*;

use audio::AudioSettings;
use config::GameConfig;
use game::session::Session;

/// Wire the simulation into `app`. A [`Session`], [`GameConfig`] or
/// [`AudioSettings`] already inserted by the host is kept; anything missing
/// is loaded from disk.
pub fn plugin(app: &mut App) {
    if !app.world().contains_resource::<AudioSettings>() {
        app.insert_resource(AudioSettings::load());
    }
    if !app.world().contains_resource::<GameConfig>() {
        app.insert_resource(GameConfig::load());
    }
    if !app.world().contains_resource::<Session>() {
        let config = app.world().resource::<GameConfig>().clone();
        let audio = *app.world().resource::<AudioSettings>();
        app.insert_resource(Session::new(config, audio));
    }

    app.add_plugins((game::plugin, audio::plugin));
}
