//! Engine event hooks.
//!
//! The engine drives the agent by calling hooks on an [`AgentModule`]. Every
//! hook has a no-op default, so a module only implements what it reacts to.
//! [`BrooksAgent`] is the worker agent: it greets, reports the matchup, draws
//! the frame rate and runs the [`FrameDispatcher`] on every frame.

use tracing::info;

use crate::config::AgentConfig;
use crate::dispatcher::{FrameDispatcher, FrameReport};
use crate::host::{GameHost, Overlay, PlayerInfo, UnitInfo};
use crate::position::Position;
use crate::rng::{RandomSource, SeededRandom};

/// Host frames per game second at normal speed.
pub const FRAMES_PER_SECOND: u32 = 24;

/// Callbacks the engine invokes on the agent.
///
/// Hooks are never re-entered; each returns before the engine continues.
#[allow(unused_variables)]
pub trait AgentModule {
    /// The match has started.
    fn on_start(&mut self, host: &mut dyn GameHost) {}

    /// The match has ended.
    fn on_end(&mut self, host: &mut dyn GameHost, is_winner: bool) {}

    /// A frame is about to be simulated.
    fn on_frame(&mut self, host: &mut dyn GameHost) {}

    /// The local user typed a chat line.
    fn on_send_text(&mut self, host: &mut dyn GameHost, text: &str) {}

    /// Another player sent a chat line.
    fn on_receive_text(&mut self, host: &mut dyn GameHost, player: &PlayerInfo, text: &str) {}

    /// A player left the match.
    fn on_player_left(&mut self, host: &mut dyn GameHost, player: &PlayerInfo) {}

    /// A nuclear launch was detected. `None` when the target is not visible.
    fn on_nuke_detect(&mut self, host: &mut dyn GameHost, target: Option<Position>) {}

    /// A unit became accessible.
    fn on_unit_discover(&mut self, host: &mut dyn GameHost, unit: &UnitInfo) {}

    /// A unit became inaccessible.
    fn on_unit_evade(&mut self, host: &mut dyn GameHost, unit: &UnitInfo) {}

    /// A unit became visible.
    fn on_unit_show(&mut self, host: &mut dyn GameHost, unit: &UnitInfo) {}

    /// A unit was hidden by fog or cloak.
    fn on_unit_hide(&mut self, host: &mut dyn GameHost, unit: &UnitInfo) {}

    /// A unit was created.
    fn on_unit_create(&mut self, host: &mut dyn GameHost, unit: &UnitInfo) {}

    /// A unit was destroyed. `unit` is its last snapshot.
    fn on_unit_destroy(&mut self, host: &mut dyn GameHost, unit: &UnitInfo) {}

    /// A unit changed type.
    fn on_unit_morph(&mut self, host: &mut dyn GameHost, unit: &UnitInfo) {}

    /// A unit changed owner.
    fn on_unit_renegade(&mut self, host: &mut dyn GameHost, unit: &UnitInfo) {}

    /// A unit finished construction or training.
    fn on_unit_complete(&mut self, host: &mut dyn GameHost, unit: &UnitInfo) {}

    /// The game was saved.
    fn on_save_game(&mut self, host: &mut dyn GameHost, name: &str) {}
}

/// The layered worker agent.
#[derive(Debug)]
pub struct BrooksAgent<R = SeededRandom> {
    dispatcher: FrameDispatcher,
    rng: R,
    last_report: FrameReport,
}

impl BrooksAgent<SeededRandom> {
    /// Agent drawing its randomness from a seeded generator.
    #[must_use]
    pub fn new(config: AgentConfig, seed: u64) -> Self {
        Self::with_rng(config, SeededRandom::new(seed))
    }
}

impl<R: RandomSource> BrooksAgent<R> {
    /// Agent with a caller-supplied random source.
    #[must_use]
    pub fn with_rng(config: AgentConfig, rng: R) -> Self {
        Self {
            dispatcher: FrameDispatcher::new(config),
            rng,
            last_report: FrameReport::default(),
        }
    }

    /// The dispatcher, for inspecting config and remediation state.
    #[must_use]
    pub const fn dispatcher(&self) -> &FrameDispatcher {
        &self.dispatcher
    }

    /// Report of the most recent frame.
    #[must_use]
    pub const fn last_report(&self) -> &FrameReport {
        &self.last_report
    }

    fn draw_fps(host: &mut dyn GameHost) {
        let fps = host.fps();
        let average = host.average_fps();
        host.register_overlay(
            Overlay::ScreenText {
                x: 200,
                y: 0,
                text: format!("FPS: {fps}"),
            },
            1,
        );
        host.register_overlay(
            Overlay::ScreenText {
                x: 200,
                y: 20,
                text: format!("Average FPS: {average:.2}"),
            },
            1,
        );
    }

    /// Chat a replay build-order line for a structure.
    fn announce_structure(host: &mut dyn GameHost, unit: &UnitInfo, verb: &str) {
        if !host.is_replay() || !unit.unit_type.is_building() {
            return;
        }
        let Some(owner) = host.player(unit.owner).filter(|p| !p.is_neutral) else {
            return;
        };
        let line = format!(
            "{}: {} {verb} a {}",
            game_clock(host.frame_count()),
            owner.name,
            unit.unit_type
        );
        host.send_text(&line);
    }
}

/// Format a frame count as `mm:ss` of game time.
#[must_use]
pub fn game_clock(frame: u32) -> String {
    let seconds = frame / FRAMES_PER_SECOND;
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

impl<R: RandomSource> AgentModule for BrooksAgent<R> {
    fn on_start(&mut self, host: &mut dyn GameHost) {
        host.send_text("Hello world!");
        info!(map = %host.map_name(), "Match started");

        if host.is_replay() {
            for player in host.players().iter().filter(|p| !p.is_observer && !p.is_neutral) {
                info!("{} is playing as {}", player.name, player.race);
            }
        } else if let (Some(me), Some(enemy)) = (host.self_player(), host.enemy()) {
            info!("The matchup is {} vs {}", me.race, enemy.race);
        }
    }

    fn on_end(&mut self, host: &mut dyn GameHost, is_winner: bool) {
        info!(frame = host.frame_count(), is_winner, "Match ended");
    }

    fn on_frame(&mut self, host: &mut dyn GameHost) {
        if self.dispatcher.config().show_fps {
            Self::draw_fps(host);
        }
        self.last_report = self.dispatcher.on_frame(host, &mut self.rng);
    }

    fn on_send_text(&mut self, host: &mut dyn GameHost, text: &str) {
        host.send_text(text);
    }

    fn on_receive_text(&mut self, _host: &mut dyn GameHost, player: &PlayerInfo, text: &str) {
        info!("{} said \"{}\"", player.name, text);
    }

    fn on_player_left(&mut self, host: &mut dyn GameHost, player: &PlayerInfo) {
        host.send_text(&format!("Goodbye {}!", player.name));
    }

    fn on_nuke_detect(&mut self, host: &mut dyn GameHost, target: Option<Position>) {
        match target {
            Some(target) => info!("Nuclear Launch Detected at {target}"),
            None => host.send_text("Where's the nuke?"),
        }
    }

    fn on_unit_create(&mut self, host: &mut dyn GameHost, unit: &UnitInfo) {
        Self::announce_structure(host, unit, "creates");
    }

    fn on_unit_morph(&mut self, host: &mut dyn GameHost, unit: &UnitInfo) {
        Self::announce_structure(host, unit, "morphs");
    }

    fn on_save_game(&mut self, _host: &mut dyn GameHost, name: &str) {
        info!("The game was saved to \"{name}\"");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::PlayerId;
    use crate::position::TilePosition;
    use crate::rng::ScriptedRandom;
    use crate::sandbox::SandboxGame;
    use crate::unit_type::{Race, UnitType};

    fn sandbox() -> (SandboxGame, PlayerId) {
        let mut game = SandboxGame::new("hooks", TilePosition::new(64, 64));
        let me = game.add_player("Tester", Race::Terran, 500);
        game.add_player("Rival", Race::Zerg, 500);
        game.set_self(Some(me));
        (game, me)
    }

    #[test]
    fn test_game_clock() {
        assert_eq!(game_clock(0), "00:00");
        assert_eq!(game_clock(24 * 75), "01:15");
        assert_eq!(game_clock(24 * 60 * 12 + 23), "12:00");
    }

    #[test]
    fn test_start_greets() {
        let (mut game, _) = sandbox();
        let mut agent = BrooksAgent::new(AgentConfig::default(), 1);
        agent.on_start(&mut game);
        assert_eq!(game.chat_log(), ["Hello world!".to_string()]);
    }

    #[test]
    fn test_frame_draws_fps_even_when_paused() {
        let (mut game, _) = sandbox();
        game.set_paused(true);
        let mut agent = BrooksAgent::with_rng(AgentConfig::default(), ScriptedRandom::never());
        agent.on_frame(&mut game);

        let texts: Vec<&Overlay> = game.overlays().iter().map(|o| &o.overlay).collect();
        assert_eq!(
            texts,
            [
                &Overlay::ScreenText {
                    x: 200,
                    y: 0,
                    text: "FPS: 24".to_string()
                },
                &Overlay::ScreenText {
                    x: 200,
                    y: 20,
                    text: "Average FPS: 24.00".to_string()
                },
            ]
        );
        assert!(game.overlays().iter().all(|o| o.frames == 1));
        assert_eq!(
            agent.last_report().skipped,
            Some(crate::dispatcher::FrameSkip::Paused)
        );
    }

    #[test]
    fn test_fps_overlay_can_be_disabled() {
        let (mut game, _) = sandbox();
        let config = AgentConfig {
            show_fps: false,
            ..AgentConfig::default()
        };
        let mut agent = BrooksAgent::with_rng(config, ScriptedRandom::never());
        agent.on_frame(&mut game);
        assert!(game.overlays().is_empty());
    }

    #[test]
    fn test_player_left_and_nuke_chat() {
        let (mut game, _) = sandbox();
        let mut agent = BrooksAgent::new(AgentConfig::default(), 1);
        let rival = game.player(PlayerId(1)).expect("rival");
        agent.on_player_left(&mut game, &rival);
        agent.on_nuke_detect(&mut game, None);
        agent.on_nuke_detect(&mut game, Some(Position::new(10, 10)));
        assert_eq!(
            game.chat_log(),
            ["Goodbye Rival!".to_string(), "Where's the nuke?".to_string()]
        );
    }

    #[test]
    fn test_replay_build_order_lines() {
        let (mut game, me) = sandbox();
        game.set_replay(true);
        game.set_frame(24 * 65);
        let depot = game.spawn_at_tile(me, UnitType::SupplyDepot, TilePosition::new(2, 2));
        let scv = game.spawn(me, UnitType::Scv, Position::new(300, 300));
        let field = game.spawn_at_tile(PlayerId::NEUTRAL, UnitType::MineralField, TilePosition::new(9, 9));
        let mut agent = BrooksAgent::new(AgentConfig::default(), 1);

        for id in [depot, scv, field] {
            let unit = game.unit(id).expect("unit");
            agent.on_unit_create(&mut game, &unit);
        }
        let depot = game.unit(depot).expect("depot");
        agent.on_unit_morph(&mut game, &depot);

        assert_eq!(
            game.chat_log(),
            [
                "01:05: Tester creates a Terran Supply Depot".to_string(),
                "01:05: Tester morphs a Terran Supply Depot".to_string(),
            ]
        );
    }

    #[test]
    fn test_structure_lines_only_in_replays() {
        let (mut game, me) = sandbox();
        let depot = game.spawn_at_tile(me, UnitType::SupplyDepot, TilePosition::new(2, 2));
        let unit = game.unit(depot).expect("depot");
        let mut agent = BrooksAgent::new(AgentConfig::default(), 1);
        agent.on_unit_create(&mut game, &unit);
        assert!(game.chat_log().is_empty());
    }
}
