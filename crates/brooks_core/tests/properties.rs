//! Property tests for the dispatcher's invariants.

use brooks_core::dispatcher::eligibility;
use brooks_core::prelude::*;
use brooks_test_utils::fixtures;
use brooks_test_utils::strategies::{increasing_frames, race, unit_status};
use proptest::prelude::*;

/// A blocked Terran depot with no workers to build for it, so every
/// remediation past the cooldown is an attempt.
fn blocked_without_builders() -> (SandboxGame, UnitInfo) {
    let mut base = fixtures::base_with(Race::Terran, 0, 1000);
    let player = base.game.player_mut(base.me).expect("player");
    player.supply_used = 20;
    player.supply_total = 20;
    let depot = base.game.unit(base.depot).expect("depot");
    (base.game, depot)
}

proptest! {
    #[test]
    fn remediation_attempts_respect_cooldown(
        frames in increasing_frames(40, 150),
        cooldown in 1..600_u32,
    ) {
        let (mut game, depot) = blocked_without_builders();
        let config = AgentConfig { remediation_cooldown: cooldown, ..AgentConfig::default() };
        let mut state = SupplyRemediation::new();
        let mut attempts = Vec::new();

        for frame in frames {
            game.set_frame(frame);
            let outcome = state.on_train_failure(&mut game, &depot, CommandError::InsufficientSupply, &config);
            if outcome.attempted() {
                prop_assert_eq!(state.last_checked(), frame);
                attempts.push(frame);
            }
        }

        prop_assert!(attempts.first().map_or(true, |&f| f >= cooldown));
        prop_assert!(attempts.windows(2).all(|w| w[1] - w[0] >= cooldown));
    }

    #[test]
    fn remediation_never_fires_at_cap(
        frames in increasing_frames(20, 500),
        total in 400..1000_u32,
    ) {
        let mut base = fixtures::supply_blocked_terran();
        let depot = base.game.unit(base.depot).expect("depot");
        if let Some(player) = base.game.player_mut(base.me) {
            player.supply_total = total;
        }
        let mut state = SupplyRemediation::new();

        for frame in frames {
            base.game.set_frame(frame);
            let outcome = state.on_train_failure(
                &mut base.game,
                &depot,
                CommandError::InsufficientSupply,
                &AgentConfig::default(),
            );
            prop_assert!(!outcome.attempted());
        }
        prop_assert!(base.game.command_log().is_empty());
        prop_assert_eq!(state.last_checked(), 0);
    }

    #[test]
    fn ineligible_units_receive_no_command(
        race in race(),
        status in unit_status(),
        frame in 0..50_u32,
    ) {
        let (mut game, _, worker) = fixtures::lone_worker(race);
        game.spawn_at_tile(PlayerId::NEUTRAL, UnitType::MineralField, TilePosition::new(24, 24));
        if let Some(unit) = game.unit_mut(worker) {
            unit.status = status;
        }
        game.set_frame(frame * 2);
        let snapshot = game.unit(worker).expect("worker");
        let mut dispatcher = FrameDispatcher::new(AgentConfig::default());

        let report = dispatcher.on_frame(&mut game, &mut ScriptedRandom::always());

        let commanded = game.command_log().iter().any(|c| c.unit == worker);
        match eligibility(&snapshot) {
            Ok(()) => prop_assert!(!report.ineligible.iter().any(|(id, _)| *id == worker)),
            Err(reason) => {
                prop_assert!(!commanded);
                prop_assert!(report.ineligible.contains(&(worker, reason)));
            }
        }
    }
}
