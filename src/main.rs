//! Headless runner: plays a run with a simple autopilot and logs the outcome.

use bevy::{app::ScheduleRunnerPlugin, log::LogPlugin, prelude::*};
use std::time::Duration;

use celestial_fury::game::{
    SimulationSystems,
    session::Session,
    signals::{Command, Intents, Signal},
};

/// Frames per second of the simulation loop.
const TICK_RATE: f64 = 60.0;

/// Stop after this much simulated time even if the player survives.
const RUN_LIMIT: Duration = Duration::from_secs(600);

/// Dash when an enemy shot gets this close.
const DODGE_RADIUS: f32 = 90.0;

/// Keep this far from the current target horizontally.
const KEEP_AWAY: f32 = 150.0;

fn main() -> AppExit {
    App::new()
        .add_plugins((
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
                1.0 / TICK_RATE,
            ))),
            LogPlugin::default(),
        ))
        .add_plugins(celestial_fury::plugin)
        .add_systems(
            Update,
            (answer_menus, steer_player, stop_when_done)
                .chain()
                .after(SimulationSystems::ClearEdges),
        )
        .run()
}

/// Pick the first upgrade, buy what is affordable and keep going past the boss.
fn answer_menus(mut signals: MessageReader<Signal>, mut commands: MessageWriter<Command>) {
    for signal in signals.read() {
        match signal {
            Signal::ShowUpgrades(offers) => {
                if let Some(offer) = offers.first() {
                    info!("Autopilot takes {}", offer.name);
                    commands.write(Command::ChooseUpgrade(offer.id.to_string()));
                }
            }
            Signal::ShowShop { items, .. } => {
                if let Some(item) = items.iter().find(|item| item.affordable) {
                    info!("Autopilot buys {}", item.name);
                    commands.write(Command::PurchaseItem(item.id.to_string()));
                }
                commands.write(Command::CloseShop);
            }
            Signal::BossSpawned { name, max_health } => {
                info!("Boss fight: {} ({} health)", name, max_health);
            }
            Signal::BossDefeatedShowScreen => {
                commands.write(Command::ContinueEndless);
            }
            _ => {}
        }
    }
}

/// Aim at the nearest threat, keep some distance and dash out of the way
/// of incoming shots.
fn steer_player(session: Res<Session>, mut intents: ResMut<Intents>) {
    let position = session.player().body.position;
    let target = session
        .boss()
        .map(|boss| boss.body.position)
        .or_else(|| {
            session
                .enemies()
                .iter()
                .map(|enemy| enemy.body.position)
                .min_by(|a, b| a.distance_squared(position).total_cmp(&b.distance_squared(position)))
        });

    intents.fire = target.is_some();
    intents.aim = target.unwrap_or(position + Vec2::X);

    let offset = target.map_or(0.0, |target| position.x - target.x);
    intents.left = offset < 0.0 && offset > -KEEP_AWAY;
    intents.right = offset >= 0.0 && offset < KEEP_AWAY && target.is_some();
    intents.jump = session
        .enemies()
        .iter()
        .any(|enemy| enemy.body.position.distance(position) < KEEP_AWAY / 2.0);
    intents.dash = session
        .enemy_projectiles()
        .iter()
        .any(|shot| shot.body.position.distance(position) < DODGE_RADIUS);
}

fn stop_when_done(
    session: Res<Session>,
    mut signals: MessageReader<Signal>,
    mut exit: MessageWriter<AppExit>,
) {
    for signal in signals.read() {
        if let Signal::GameOverDisplay { wave, total_kills } = signal {
            info!("Run over on wave {} with {} kills", wave, total_kills);
            exit.write(AppExit::Success);
            return;
        }
    }

    if session.clock() >= RUN_LIMIT {
        let progression = session.progression();
        info!(
            "Time limit reached on wave {} with {} kills",
            progression.wave, progression.total_kills
        );
        exit.write(AppExit::Success);
    }
}
