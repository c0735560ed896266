//! The gameplay simulation.
//!
//! This module contains all the gameplay logic including:
//! - The session that owns one run and its timers
//! - Player movement, shooting and the dash
//! - Enemy archetypes, steering and IMP ranged attacks
//! - Arcade physics and overlap resolution
//! - Kill progression, upgrades, the shop and the boss encounter
//! - The flow state machine (pause, menus, game over)

pub mod attributes;
pub mod boss;
mod celestial_fury;
pub mod combat;
pub mod enemy;
pub mod flow;
pub mod gold;
pub mod physics;
pub mod player;
pub mod progression;
pub mod projectile;
pub mod session;
pub mod shop;
pub mod signals;
pub mod timers;
pub mod upgrades;

use bevy::prelude::*;

use session::Session;
use signals::{Command, Intents, Signal};

/// Order of the per-frame simulation work.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSystems {
    /// Apply commands sent since the last frame.
    ApplyCommands,
    /// Step the session by the frame time.
    Advance,
    /// Forward the session's signals as messages.
    Publish,
    /// Drop edge-triggered input consumed this frame.
    ClearEdges,
}

pub(super) fn plugin(app: &mut App) {
    app.add_message::<Command>();
    app.add_message::<Signal>();
    app.init_resource::<Intents>();

    app.configure_sets(
        Update,
        (
            SimulationSystems::ApplyCommands,
            SimulationSystems::Advance,
            SimulationSystems::Publish,
            SimulationSystems::ClearEdges,
        )
            .chain(),
    );

    app.add_systems(
        Update,
        (
            apply_commands.in_set(SimulationSystems::ApplyCommands),
            advance_session.in_set(SimulationSystems::Advance),
            publish_signals.in_set(SimulationSystems::Publish),
            clear_edge_intents.in_set(SimulationSystems::ClearEdges),
        ),
    );
}

fn apply_commands(mut commands: MessageReader<Command>, mut session: ResMut<Session>) {
    for command in commands.read() {
        session.handle(command.clone());
    }
}

fn advance_session(time: Res<Time>, intents: Res<Intents>, mut session: ResMut<Session>) {
    session.tick(time.delta(), &intents);
}

fn publish_signals(mut session: ResMut<Session>, mut signals: MessageWriter<Signal>) {
    for signal in session.drain_signals() {
        signals.write(signal);
    }
}

fn clear_edge_intents(mut intents: ResMut<Intents>) {
    intents.clear_edges();
}
