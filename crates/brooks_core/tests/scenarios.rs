//! End-to-end frames against sandbox fixtures.

use brooks_core::prelude::*;
use brooks_test_utils::fixtures;

fn build_orders(game: &SandboxGame) -> Vec<(UnitId, Order)> {
    game.command_log()
        .iter()
        .filter(|c| c.result.is_ok() && matches!(c.order, Order::Build(..)))
        .map(|c| (c.unit, c.order))
        .collect()
}

fn boxes(game: &SandboxGame) -> Vec<u32> {
    game.overlays()
        .iter()
        .filter(|o| matches!(o.overlay, Overlay::MapBox { .. }))
        .map(|o| o.frames)
        .collect()
}

#[test]
fn idle_worker_falls_through_to_minerals() {
    let (mut game, _, worker) = fixtures::lone_worker(Race::Terran);
    let field = game.spawn_at_tile(PlayerId::NEUTRAL, UnitType::MineralField, TilePosition::new(24, 24));
    let mut dispatcher = FrameDispatcher::new(AgentConfig::default());

    let report = dispatcher.on_frame(&mut game, &mut ScriptedRandom::never());

    assert_eq!(
        report.decisions,
        vec![(
            worker,
            LayerDecision {
                layer: LayerKind::Gather,
                outcome: LayerOutcome::Issued(Order::Gather(field)),
            }
        )]
    );
}

#[test]
fn idle_worker_takes_gas_branch() {
    let (mut game, me, worker) = fixtures::lone_worker(Race::Protoss);
    game.spawn_at_tile(PlayerId::NEUTRAL, UnitType::MineralField, TilePosition::new(24, 24));
    let assimilator = game.spawn_at_tile(me, UnitType::Assimilator, TilePosition::new(30, 30));
    let mut dispatcher = FrameDispatcher::new(AgentConfig::default());

    // Supply gate misses, gas preference hits.
    let mut rng = ScriptedRandom::new([0.9, 0.1]);
    let report = dispatcher.on_frame(&mut game, &mut rng);

    assert_eq!(
        report.decisions,
        vec![(
            worker,
            LayerDecision {
                layer: LayerKind::Gather,
                outcome: LayerOutcome::Issued(Order::Gather(assimilator)),
            }
        )]
    );
}

#[test]
fn fixed_random_outcomes_fix_the_winning_layer() {
    let run = || {
        let (base, _) = fixtures::base_with(Race::Terran, 4, 500).with_geyser();
        let mut game = base.game;
        let mut dispatcher = FrameDispatcher::new(AgentConfig::default());
        let report = dispatcher.on_frame(&mut game, &mut ScriptedRandom::new([0.5; 16]));
        report.decisions
    };
    let first = run();
    assert_eq!(first, run());
    assert_eq!(first[0].1.layer, LayerKind::ConstructRefinery);
}

#[test]
fn supply_block_builds_one_depot_with_site_box() {
    let mut base = fixtures::supply_blocked_terran();
    let mut dispatcher = FrameDispatcher::new(AgentConfig::default());

    let report = dispatcher.on_frame(&mut base.game, &mut ScriptedRandom::never());

    assert_eq!(report.train_failures, vec![(base.depot, CommandError::InsufficientSupply)]);
    assert!(matches!(
        report.remediation.as_slice(),
        [RemediationOutcome::BuildIssued {
            provider: UnitType::SupplyDepot,
            ..
        }]
    ));
    let builds = build_orders(&base.game);
    assert_eq!(builds.len(), 1);
    assert!(matches!(builds[0].1, Order::Build(UnitType::SupplyDepot, _)));
    assert_eq!(boxes(&base.game), vec![UnitType::SupplyDepot.build_time() + 100]);
    assert_eq!(dispatcher.remediation().last_checked(), 400);
}

#[test]
fn supply_block_never_drafts_a_skipped_worker() {
    let mut base = fixtures::supply_blocked_terran();
    for worker in &base.workers {
        base.game.unit_mut(*worker).expect("worker").status.loaded = true;
    }
    let mut dispatcher = FrameDispatcher::new(AgentConfig::default());

    let report = dispatcher.on_frame(&mut base.game, &mut ScriptedRandom::never());

    let skipped: Vec<UnitId> = report.ineligible.iter().map(|(id, _)| *id).collect();
    assert_eq!(skipped, base.workers);
    assert_eq!(report.remediation, vec![RemediationOutcome::NoBuilder]);
    assert!(base
        .game
        .command_log()
        .iter()
        .all(|c| !skipped.contains(&c.unit)));
    assert!(boxes(&base.game).is_empty());
}

#[test]
fn supply_block_at_cap_does_nothing() {
    let mut base = fixtures::supply_blocked_terran();
    let player = base.game.player_mut(base.me).expect("player");
    player.supply_used = 400;
    player.supply_total = 400;
    let mut dispatcher = FrameDispatcher::new(AgentConfig::default());

    let report = dispatcher.on_frame(&mut base.game, &mut ScriptedRandom::never());

    assert_eq!(report.remediation, vec![RemediationOutcome::AtCap]);
    assert!(build_orders(&base.game).is_empty());
    assert!(boxes(&base.game).is_empty());
    assert_eq!(dispatcher.remediation().last_checked(), 0);
}

#[test]
fn remediated_depot_unblocks_training() {
    let mut base = fixtures::supply_blocked_terran();
    let mut agent = BrooksAgent::with_rng(AgentConfig::default(), ScriptedRandom::never());

    for _ in 0..(UnitType::SupplyDepot.build_time() + 20) {
        agent.on_frame(&mut base.game);
        base.game.step();
    }

    let (_, total) = base.supply();
    assert_eq!(total, 36);
    assert_eq!(base.game.count_units(base.me, UnitType::SupplyDepot), 1);
    assert_eq!(base.game.incomplete_unit_count(UnitType::Scv), 1);
}

#[test]
fn workers_defend_themselves() {
    let (base, attacker) = fixtures::base(Race::Terran).with_enemy(Race::Zerg);
    let mut game = base.game;
    let mut dispatcher = FrameDispatcher::new(AgentConfig::default());

    let report = dispatcher.on_frame(&mut game, &mut ScriptedRandom::never());

    assert_eq!(report.decisions.len(), base.workers.len());
    assert!(report
        .decisions
        .iter()
        .all(|(_, d)| d.outcome == LayerOutcome::Issued(Order::Attack(attacker))));
}

#[test]
fn replay_frames_are_untouched() {
    let mut base = fixtures::base(Race::Zerg);
    base.game.set_replay(true);
    let mut agent = BrooksAgent::new(AgentConfig::default(), 3);
    for _ in 0..50 {
        agent.on_frame(&mut base.game);
        base.game.step();
    }
    assert!(base.game.command_log().is_empty());
}
