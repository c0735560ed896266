//! The session boundary: inbound commands, input intents and outbound signals.
//!
//! Presentation layers never touch session internals. They feed [`Intents`]
//! and [`Command`]s in, and drain [`Signal`]s out after every tick.

use bevy::prelude::*;

use super::enemy::EnemyKind;

/// Discrete requests from menus, the pause key and debug tooling.
#[derive(Message, Debug, Clone, PartialEq)]
pub enum Command {
    TogglePause,
    Resume,
    ChooseUpgrade(String),
    PurchaseItem(String),
    CloseShop,
    /// Full session restart, from any state.
    Restart,
    ContinueEndless,
    /// The "end run" choice on the boss-defeated screen.
    EndRun,
    SetMusicVolume(f32),
    SetSfxVolume(f32),
    TriggerBoss,
}

/// Player input for the next tick. Movement and fire are held; dash is an edge.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct Intents {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub fire: bool,
    /// World position the player is aiming at.
    pub aim: Vec2,
    pub dash: bool,
}

impl Intents {
    /// Forget the edge-triggered intents once a tick has consumed them.
    pub fn clear_edges(&mut self) {
        self.dash = false;
    }
}

/// HUD payload refreshed after every relevant mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct UiSnapshot {
    pub health: f32,
    pub max_health: f32,
    pub wave: u32,
    pub total_kills: u32,
    pub upgrade_progress: u32,
    pub upgrade_required: u32,
    pub gold: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpgradeOffer {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShopOffer {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub cost: u32,
    pub affordable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MusicCue {
    Play { volume: f32 },
    Pause,
    Resume,
    Stop,
    Volume(f32),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SoundCue {
    Shoot { volume: f32 },
    EnemyDeath { kind: EnemyKind, volume: f32 },
}

/// Cosmetic effects the presentation layer may draw.
#[derive(Debug, Clone, PartialEq)]
pub enum VisualCue {
    DamageNumber { position: Vec2, amount: f32 },
    BloodBurst { position: Vec2, size: f32 },
    DashTrail { position: Vec2, lifetime_ms: f32 },
    LightningBolt { x: f32 },
    LightningImpact { position: Vec2 },
}

/// Everything the session tells the outside world.
#[derive(Message, Debug, Clone, PartialEq)]
pub enum Signal {
    UiData(UiSnapshot),
    ShowUpgrades(Vec<UpgradeOffer>),
    ShowShop {
        items: Vec<ShopOffer>,
        player_gold: u32,
    },
    CloseShopUi,
    ItemPurchased {
        player_gold: u32,
    },
    ShowPauseMenu {
        music_volume: f32,
        sfx_volume: f32,
    },
    ResumedFromPauseMenu,
    GameOverDisplay {
        wave: u32,
        total_kills: u32,
    },
    BossSpawned {
        name: String,
        max_health: f32,
    },
    BossHealthUpdate {
        current_health: f32,
        max_health: f32,
    },
    BossDefeatedShowScreen,
    /// Dim or blur the background while a non-simulating state is active.
    PauseOverlay {
        paused: bool,
    },
    Music(MusicCue),
    Sound(SoundCue),
    Effect(VisualCue),
}
