//! Progression - kills, waves and the upgrade/shop cadence.
//!
//! Every kill feeds the counters here. A kill that advances the wave may
//! open the shop or start the boss fight; otherwise reaching the upgrade
//! threshold offers a choice of upgrades. Only the first milestone that
//! applies is taken.

use bevy::prelude::*;

use super::{
    flow::FlowState,
    session::Session,
    shop::ShopItem,
    signals::Signal,
    timers::Deferred,
    upgrades::Upgrade,
};
use crate::config::{ProgressionConfig, ms};

/// Session counters. Reset only by a restart.
#[derive(Debug, Clone, PartialEq)]
pub struct Progression {
    pub wave: u32,
    pub total_kills: u32,
    pub upgrades_completed: u32,
    /// Total kill count at which the next upgrade is offered.
    pub next_upgrade_at: u32,
    /// Kills since the last upgrade threshold.
    pub upgrade_progress: u32,
    pub kills_required: u32,
    pub spawn_delay_ms: f32,
    /// Latched once the player continues past the boss.
    pub endless: bool,
}

/// What a kill unlocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Milestone {
    Shop,
    Boss,
    Upgrade,
}

impl Progression {
    pub fn new(config: &ProgressionConfig) -> Self {
        Self {
            wave: 1,
            total_kills: 0,
            upgrades_completed: 0,
            next_upgrade_at: config.base_kills_for_upgrade,
            upgrade_progress: 0,
            kills_required: config.base_kills_for_upgrade,
            spawn_delay_ms: config.initial_spawn_delay_ms,
            endless: false,
        }
    }

    /// Count a kill. Returns true when it advanced the wave.
    pub fn record_kill(&mut self, config: &ProgressionConfig) -> bool {
        self.total_kills += 1;
        self.upgrade_progress += 1;

        if self.total_kills < self.wave * config.kills_per_wave {
            return false;
        }
        self.wave += 1;
        self.spawn_delay_ms =
            (self.spawn_delay_ms * config.spawn_delay_factor).max(config.min_spawn_delay_ms);
        true
    }

    /// The milestone a kill triggers, if any.
    pub fn milestone(
        &self,
        wave_advanced: bool,
        flow: FlowState,
        config: &ProgressionConfig,
    ) -> Option<Milestone> {
        let playing = flow == FlowState::Playing;
        let shop_wave = config.waves_per_shop > 0 && (self.wave - 1) % config.waves_per_shop == 0;

        if wave_advanced && shop_wave && playing {
            Some(Milestone::Shop)
        } else if wave_advanced && self.wave == config.boss_wave && !self.endless {
            Some(Milestone::Boss)
        } else if self.total_kills >= self.next_upgrade_at && playing {
            Some(Milestone::Upgrade)
        } else {
            None
        }
    }

    /// Move the threshold forward after an upgrade has been taken. Kills
    /// beyond the old threshold carry over.
    pub fn complete_upgrade(&mut self, config: &ProgressionConfig) {
        let previous_threshold = self.next_upgrade_at;
        self.upgrades_completed += 1;
        self.kills_required = config.base_kills_for_upgrade
            + self.upgrades_completed * config.increment_kills_per_upgrade;
        self.next_upgrade_at = previous_threshold + self.kills_required;
        self.upgrade_progress = self.total_kills.saturating_sub(previous_threshold);
    }

    /// Progress toward the next upgrade as shown on the HUD.
    pub fn ui_progress(&self) -> u32 {
        self.upgrade_progress.min(self.kills_required)
    }
}

impl Session {
    /// Count a kill and run whichever milestone it unlocks.
    pub(crate) fn after_kill(&mut self) {
        let wave_advanced = self.progression.record_kill(&self.config.progression);
        if wave_advanced {
            info!(
                "Wave {} reached, spawn delay now {}ms",
                self.progression.wave, self.progression.spawn_delay_ms
            );
            self.rebuild_spawn_timer();
        }
        self.emit_ui();

        match self
            .progression
            .milestone(wave_advanced, self.flow, &self.config.progression)
        {
            Some(Milestone::Shop) => self.open_shop(),
            Some(Milestone::Boss) => self.trigger_boss(),
            Some(Milestone::Upgrade) => self.offer_upgrades(),
            None => {}
        }
    }

    /// Replace the spawn timer with one at the current delay. It starts
    /// paused unless the run is in normal play.
    pub(crate) fn rebuild_spawn_timer(&mut self) {
        if let Some(old) = self.spawn_timer.take() {
            self.timers.cancel(old);
        }
        let timer = self
            .timers
            .every(ms(self.progression.spawn_delay_ms), Deferred::SpawnEnemy);
        self.timers.set_paused(timer, self.flow != FlowState::Playing);
        self.spawn_timer = Some(timer);
    }

    pub(crate) fn offer_upgrades(&mut self) {
        if self.flow != FlowState::Playing {
            return;
        }
        self.set_flow_state(FlowState::UpgradeSelection);
        self.player.body.velocity = Vec2::ZERO;

        let count = self.config.progression.upgrade_choices;
        self.offered_upgrades = Upgrade::random_choices(&mut self.rng, count);
        let offers = self.offered_upgrades.iter().map(Upgrade::offer).collect();
        self.emit(Signal::ShowUpgrades(offers));
    }

    pub(crate) fn choose_upgrade(&mut self, id: &str) {
        if self.flow != FlowState::UpgradeSelection {
            warn!("Upgrade {} chosen outside of upgrade selection, ignoring", id);
            return;
        }
        let offered = Upgrade::from_id(id).filter(|upgrade| self.offered_upgrades.contains(upgrade));
        let Some(upgrade) = offered else {
            warn!("Upgrade {} was not offered, ignoring", id);
            return;
        };
        self.offered_upgrades.clear();

        upgrade.apply(&mut self.attributes);
        self.sync_celestial_fury();
        self.progression.complete_upgrade(&self.config.progression);
        info!(
            "Upgrade taken: {} (next at {} kills)",
            upgrade.name(),
            self.progression.next_upgrade_at
        );

        self.emit_ui();
        self.set_flow_state(FlowState::Playing);
    }

    pub(crate) fn open_shop(&mut self) {
        if self.flow != FlowState::Playing {
            return;
        }
        self.set_flow_state(FlowState::ShopOpen);
        self.player.body.velocity = Vec2::ZERO;

        let gold = self.attributes.gold;
        let count = self.config.progression.shop_items_to_display;
        let items = ShopItem::random_selection(&mut self.rng, count)
            .iter()
            .map(|item| item.offer(gold))
            .collect();
        info!("Shop opened with {} gold", gold);
        self.emit(Signal::ShowShop {
            items,
            player_gold: gold,
        });
    }

    pub(crate) fn purchase(&mut self, id: &str) {
        if self.flow != FlowState::ShopOpen {
            warn!("Purchase of {} requested while the shop is closed, ignoring", id);
            return;
        }
        let Some(item) = ShopItem::from_id(id) else {
            warn!("Unknown shop item id: {}", id);
            return;
        };
        if !item.purchase(&mut self.attributes) {
            warn!("Not enough gold to buy {}", item.name());
            return;
        }

        info!("Purchased {} ({} gold left)", item.name(), self.attributes.gold);
        self.emit_ui();
        self.emit(Signal::ItemPurchased {
            player_gold: self.attributes.gold,
        });
    }

    pub(crate) fn close_shop(&mut self) {
        if self.flow != FlowState::ShopOpen {
            warn!("Close shop requested while the shop is not open, ignoring");
            return;
        }
        self.set_flow_state(FlowState::Playing);
        self.emit(Signal::CloseShopUi);
    }
}
