//! Worker behaviour layers.
//!
//! A worker is handed to each [`Layer`] in priority order. The first layer
//! that either issues an accepted order or finds the worker already doing
//! its job wins, and the rest are skipped for this frame. A layer that does
//! not apply, or whose order the host rejects, lets the next one try.
//!
//! Layers hold no state. Everything they need arrives through the
//! [`LayerContext`]: the host to query and command, the random source for
//! probability gates, and the agent config for the gate odds.

use tracing::debug;

use crate::config::{AgentConfig, LayerKind};
use crate::host::{GameHost, Order, ResourceKind, UnitId, UnitInfo};
use crate::position::TilePosition;
use crate::rng::RandomSource;

/// Result of offering a worker to one layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerOutcome {
    /// The layer issued this order and the host accepted it.
    Issued(Order),
    /// The worker is already doing what this layer wants.
    Satisfied,
    /// Not applicable, or the order was rejected.
    Declined,
}

impl LayerOutcome {
    /// Whether evaluation stops at this layer.
    #[must_use]
    pub const fn halts(&self) -> bool {
        !matches!(self, Self::Declined)
    }
}

/// Everything a layer may touch while deciding.
pub struct LayerContext<'a> {
    /// The game.
    pub host: &'a mut dyn GameHost,
    /// Source for probability gates and random targets.
    pub rng: &'a mut dyn RandomSource,
    /// Gate odds and chat settings.
    pub config: &'a AgentConfig,
}

impl LayerContext<'_> {
    /// Issue `order` to `unit`, mapping the host verdict to an outcome.
    ///
    /// On success `announcement` is sent to chat when
    /// [`AgentConfig::announce_actions`] is set.
    pub fn issue(&mut self, unit: UnitId, order: Order, announcement: &str) -> LayerOutcome {
        match self.host.issue(unit, order) {
            Ok(()) => {
                if self.config.announce_actions {
                    self.host.send_text(announcement);
                }
                LayerOutcome::Issued(order)
            }
            Err(error) => {
                debug!(unit = %unit, ?order, %error, "Order rejected");
                LayerOutcome::Declined
            }
        }
    }
}

/// One candidate behaviour for a worker.
pub trait Layer: std::fmt::Debug {
    /// Which layer this is.
    fn kind(&self) -> LayerKind;

    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Try to act on `worker`.
    fn try_apply(&self, ctx: &mut LayerContext<'_>, worker: &UnitInfo) -> LayerOutcome;
}

/// Engage the closest enemy.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttackLayer;

impl Layer for AttackLayer {
    fn kind(&self) -> LayerKind {
        LayerKind::Attack
    }

    fn name(&self) -> &'static str {
        "attack"
    }

    fn try_apply(&self, ctx: &mut LayerContext<'_>, worker: &UnitInfo) -> LayerOutcome {
        if worker.status.attacking {
            return LayerOutcome::Satisfied;
        }
        let host: &dyn GameHost = &*ctx.host;
        let Some(enemy) = host.closest_unit(worker.id, &|u| host.is_enemy(u.owner)) else {
            return LayerOutcome::Declined;
        };
        if !ctx.host.can_attack(worker.id, enemy.id) {
            return LayerOutcome::Declined;
        }
        ctx.issue(worker.id, Order::Attack(enemy.id), "Attack")
    }
}

/// Now and then, have an idle worker put down a supply provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstructSupplyLayer;

impl Layer for ConstructSupplyLayer {
    fn kind(&self) -> LayerKind {
        LayerKind::ConstructSupply
    }

    fn name(&self) -> &'static str {
        "construct-supply"
    }

    fn try_apply(&self, ctx: &mut LayerContext<'_>, worker: &UnitInfo) -> LayerOutcome {
        if !worker.is_idle() || !ctx.rng.chance(ctx.config.construct_supply_chance) {
            return LayerOutcome::Declined;
        }
        let Some(race) = worker.unit_type.race() else {
            return LayerOutcome::Declined;
        };
        let provider = race.supply_provider();
        let Some(site) = ctx.host.build_location(provider, worker.tile_position()) else {
            return LayerOutcome::Declined;
        };
        ctx.issue(worker.id, Order::Build(provider, site), "Build Depot")
    }
}

/// Deliver cargo an idle worker is still holding.
#[derive(Debug, Clone, Copy, Default)]
pub struct DropCargoLayer;

impl Layer for DropCargoLayer {
    fn kind(&self) -> LayerKind {
        LayerKind::DropCargo
    }

    fn name(&self) -> &'static str {
        "drop-cargo"
    }

    fn try_apply(&self, ctx: &mut LayerContext<'_>, worker: &UnitInfo) -> LayerOutcome {
        if !worker.is_idle() || !worker.is_carrying() {
            return LayerOutcome::Declined;
        }
        ctx.issue(worker.id, Order::ReturnCargo, "Drop Resource")
    }
}

/// Build a refinery on the closest untapped geyser.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstructRefineryLayer;

impl Layer for ConstructRefineryLayer {
    fn kind(&self) -> LayerKind {
        LayerKind::ConstructRefinery
    }

    fn name(&self) -> &'static str {
        "construct-refinery"
    }

    fn try_apply(&self, ctx: &mut LayerContext<'_>, worker: &UnitInfo) -> LayerOutcome {
        let Some(race) = worker.unit_type.race() else {
            return LayerOutcome::Declined;
        };
        let geyser = ctx.host.closest_unit(worker.id, &|u| {
            u.unit_type.is_vespene_geyser() && u.resources > 0
        });
        let Some(geyser) = geyser else {
            return LayerOutcome::Declined;
        };
        ctx.issue(
            worker.id,
            Order::Build(race.refinery(), geyser.tile_position()),
            "Building Refinery",
        )
    }
}

/// Keep the worker harvesting, occasionally favouring gas.
#[derive(Debug, Clone, Copy, Default)]
pub struct GatherLayer;

impl GatherLayer {
    fn gather(ctx: &mut LayerContext<'_>, worker: &UnitInfo, kind: ResourceKind) -> LayerOutcome {
        let owner = worker.owner;
        let target = ctx.host.closest_unit(worker.id, &|u| match kind {
            ResourceKind::Minerals => u.unit_type.is_mineral_field() && u.resources > 0,
            ResourceKind::Gas => {
                u.unit_type.is_refinery() && u.owner == owner && u.status.completed
            }
        });
        let Some(target) = target else {
            return LayerOutcome::Declined;
        };
        let announcement = match kind {
            ResourceKind::Minerals => "Gather Mineral",
            ResourceKind::Gas => "Gather Gas",
        };
        ctx.issue(worker.id, Order::Gather(target.id), announcement)
    }
}

impl Layer for GatherLayer {
    fn kind(&self) -> LayerKind {
        LayerKind::Gather
    }

    fn name(&self) -> &'static str {
        "gather"
    }

    fn try_apply(&self, ctx: &mut LayerContext<'_>, worker: &UnitInfo) -> LayerOutcome {
        if worker.is_gathering_minerals() || worker.is_gathering_gas() {
            return LayerOutcome::Satisfied;
        }
        let (first, second) = if ctx.rng.chance(ctx.config.prefer_gas_chance) {
            (ResourceKind::Gas, ResourceKind::Minerals)
        } else {
            (ResourceKind::Minerals, ResourceKind::Gas)
        };
        match Self::gather(ctx, worker, first) {
            LayerOutcome::Declined => Self::gather(ctx, worker, second),
            outcome => outcome,
        }
    }
}

/// Send an idle worker to a random spot on the map.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExploreLayer;

impl Layer for ExploreLayer {
    fn kind(&self) -> LayerKind {
        LayerKind::Explore
    }

    fn name(&self) -> &'static str {
        "explore"
    }

    fn try_apply(&self, ctx: &mut LayerContext<'_>, worker: &UnitInfo) -> LayerOutcome {
        if !worker.is_idle() {
            return LayerOutcome::Declined;
        }
        let map = ctx.host.map_size();
        let tile = TilePosition::new(
            ctx.rng.below(map.x.max(0) as u32) as i32,
            ctx.rng.below(map.y.max(0) as u32) as i32,
        );
        let destination = tile.to_position().make_valid(map);
        ctx.issue(worker.id, Order::Move(destination), "Exploring")
    }
}

/// Build the layer object for a [`LayerKind`].
#[must_use]
pub fn layer_for(kind: LayerKind) -> Box<dyn Layer> {
    match kind {
        LayerKind::Attack => Box::new(AttackLayer),
        LayerKind::ConstructSupply => Box::new(ConstructSupplyLayer),
        LayerKind::DropCargo => Box::new(DropCargoLayer),
        LayerKind::ConstructRefinery => Box::new(ConstructRefineryLayer),
        LayerKind::Gather => Box::new(GatherLayer),
        LayerKind::Explore => Box::new(ExploreLayer),
    }
}

/// The layer that stopped evaluation, and how.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerDecision {
    /// Which layer.
    pub layer: LayerKind,
    /// What it did.
    pub outcome: LayerOutcome,
}

/// Layers in priority order.
#[derive(Debug)]
pub struct LayerStack {
    layers: Vec<Box<dyn Layer>>,
}

impl Default for LayerStack {
    fn default() -> Self {
        Self::standard()
    }
}

impl LayerStack {
    /// The classic six layers in their classic order.
    #[must_use]
    pub fn standard() -> Self {
        Self::from_kinds(&LayerKind::STANDARD_ORDER)
    }

    /// Layers in the given order.
    #[must_use]
    pub fn from_kinds(kinds: &[LayerKind]) -> Self {
        Self {
            layers: kinds.iter().copied().map(layer_for).collect(),
        }
    }

    /// Append a layer at the lowest priority.
    pub fn push(&mut self, layer: Box<dyn Layer>) {
        self.layers.push(layer);
    }

    /// Layer kinds in evaluation order.
    pub fn kinds(&self) -> Vec<LayerKind> {
        self.layers.iter().map(|l| l.kind()).collect()
    }

    /// Number of layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether the stack has no layers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Offer `worker` to each layer until one halts.
    ///
    /// Returns `None` when every layer declined; the worker then gets no
    /// order this frame.
    pub fn run(&self, ctx: &mut LayerContext<'_>, worker: &UnitInfo) -> Option<LayerDecision> {
        for layer in &self.layers {
            let outcome = layer.try_apply(ctx, worker);
            if outcome.halts() {
                debug!(unit = %worker.id, layer = layer.name(), ?outcome, "Layer halted");
                return Some(LayerDecision {
                    layer: layer.kind(),
                    outcome,
                });
            }
        }
        debug!(unit = %worker.id, "No layer applied");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CommandError;
    use crate::host::{OrderKind, Overlay, PlayerId, PlayerInfo};
    use crate::position::Position;
    use crate::rng::ScriptedRandom;
    use crate::sandbox::SandboxGame;
    use crate::unit_type::{Race, UnitType};

    struct Fixture {
        game: SandboxGame,
        me: PlayerId,
        worker: UnitId,
    }

    impl Fixture {
        fn new() -> Self {
            let mut game = SandboxGame::new("layers", TilePosition::new(64, 64));
            let me = game.add_player("Tester", Race::Terran, 500);
            game.set_self(Some(me));
            game.spawn_at_tile(me, UnitType::CommandCenter, TilePosition::new(4, 4));
            let worker = game.spawn(me, UnitType::Scv, Position::new(400, 400));
            Self { game, me, worker }
        }

        fn worker(&self) -> UnitInfo {
            self.game.unit(self.worker).expect("worker exists")
        }

        fn run(&mut self, stack: &LayerStack, rng: &mut ScriptedRandom) -> Option<LayerDecision> {
            let worker = self.worker();
            let config = AgentConfig::default();
            let mut ctx = LayerContext {
                host: &mut self.game,
                rng,
                config: &config,
            };
            stack.run(&mut ctx, &worker)
        }

        fn apply(&mut self, layer: &dyn Layer, rng: &mut ScriptedRandom) -> LayerOutcome {
            let worker = self.worker();
            let config = AgentConfig::default();
            let mut ctx = LayerContext {
                host: &mut self.game,
                rng,
                config: &config,
            };
            layer.try_apply(&mut ctx, &worker)
        }
    }

    /// Wraps the sandbox and refuses every gather order aimed at one unit.
    struct RefusingHost<'a> {
        game: &'a mut SandboxGame,
        refused: UnitId,
    }

    impl GameHost for RefusingHost<'_> {
        fn frame_count(&self) -> u32 {
            self.game.frame_count()
        }
        fn latency_frames(&self) -> u32 {
            self.game.latency_frames()
        }
        fn fps(&self) -> u32 {
            self.game.fps()
        }
        fn average_fps(&self) -> f64 {
            self.game.average_fps()
        }
        fn is_replay(&self) -> bool {
            self.game.is_replay()
        }
        fn is_paused(&self) -> bool {
            self.game.is_paused()
        }
        fn map_name(&self) -> String {
            self.game.map_name()
        }
        fn map_size(&self) -> TilePosition {
            self.game.map_size()
        }
        fn self_player(&self) -> Option<PlayerInfo> {
            self.game.self_player()
        }
        fn enemy(&self) -> Option<PlayerInfo> {
            self.game.enemy()
        }
        fn players(&self) -> Vec<PlayerInfo> {
            self.game.players()
        }
        fn player(&self, id: PlayerId) -> Option<PlayerInfo> {
            self.game.player(id)
        }
        fn own_units(&self) -> Vec<UnitId> {
            self.game.own_units()
        }
        fn unit(&self, id: UnitId) -> Option<UnitInfo> {
            self.game.unit(id)
        }
        fn closest_unit(&self, from: UnitId, filter: &dyn Fn(&UnitInfo) -> bool) -> Option<UnitInfo> {
            self.game.closest_unit(from, filter)
        }
        fn can_attack(&self, attacker: UnitId, target: UnitId) -> bool {
            self.game.can_attack(attacker, target)
        }
        fn incomplete_unit_count(&self, unit_type: UnitType) -> u32 {
            self.game.incomplete_unit_count(unit_type)
        }
        fn build_location(&self, unit_type: UnitType, near: TilePosition) -> Option<TilePosition> {
            self.game.build_location(unit_type, near)
        }
        fn issue(&mut self, unit: UnitId, order: Order) -> Result<(), CommandError> {
            if order == Order::Gather(self.refused) {
                return Err(CommandError::InvalidTarget);
            }
            self.game.issue(unit, order)
        }
        fn send_text(&mut self, text: &str) {
            self.game.send_text(text);
        }
        fn register_overlay(&mut self, overlay: Overlay, frames: u32) {
            self.game.register_overlay(overlay, frames);
        }
    }

    #[test]
    fn test_rejected_refinery_falls_through_to_gather() {
        let mut fx = Fixture::new();
        let field = fx
            .game
            .spawn_at_tile(PlayerId::NEUTRAL, UnitType::MineralField, TilePosition::new(24, 24));
        fx.game
            .spawn_at_tile(PlayerId::NEUTRAL, UnitType::VespeneGeyser, TilePosition::new(20, 20));
        fx.game.player_mut(fx.me).expect("me").minerals = UnitType::Refinery.mineral_price() - 1;

        let decision = fx.run(&LayerStack::standard(), &mut ScriptedRandom::never());

        assert_eq!(
            decision,
            Some(LayerDecision {
                layer: LayerKind::Gather,
                outcome: LayerOutcome::Issued(Order::Gather(field)),
            })
        );
        let log: Vec<_> = fx.game.command_log().iter().map(|c| (c.order.kind(), c.result)).collect();
        assert_eq!(
            log,
            vec![
                (OrderKind::Build, Err(CommandError::InsufficientMinerals)),
                (OrderKind::Gather, Ok(())),
            ]
        );
    }

    #[test]
    fn test_refused_gas_gather_falls_back_to_minerals() {
        let mut fx = Fixture::new();
        let field = fx
            .game
            .spawn_at_tile(PlayerId::NEUTRAL, UnitType::MineralField, TilePosition::new(24, 24));
        let refinery = fx
            .game
            .spawn_at_tile(fx.me, UnitType::Refinery, TilePosition::new(14, 14));
        let worker = fx.worker();
        let config = AgentConfig::default();
        // Supply gate misses, gas preference hits.
        let mut rng = ScriptedRandom::new([0.9, 0.1]);
        let mut host = RefusingHost {
            game: &mut fx.game,
            refused: refinery,
        };
        let mut ctx = LayerContext {
            host: &mut host,
            rng: &mut rng,
            config: &config,
        };

        let decision = LayerStack::standard().run(&mut ctx, &worker);

        assert_eq!(
            decision,
            Some(LayerDecision {
                layer: LayerKind::Gather,
                outcome: LayerOutcome::Issued(Order::Gather(field)),
            })
        );
        assert!(fx.game.unit(fx.worker).is_some_and(|u| u.is_gathering_minerals()));
    }

    #[test]
    fn test_attack_targets_closest_enemy() {
        let mut fx = Fixture::new();
        let enemy = fx.game.add_player("Enemy", Race::Zerg, 0);
        let near = fx.game.spawn(enemy, UnitType::Zergling, Position::new(450, 400));
        fx.game.spawn(enemy, UnitType::Zergling, Position::new(900, 900));

        let decision = fx.run(&LayerStack::standard(), &mut ScriptedRandom::never());

        assert_eq!(
            decision,
            Some(LayerDecision {
                layer: LayerKind::Attack,
                outcome: LayerOutcome::Issued(Order::Attack(near)),
            })
        );
    }

    #[test]
    fn test_attacking_worker_is_left_alone() {
        let mut fx = Fixture::new();
        fx.game.unit_mut(fx.worker).expect("worker").status.attacking = true;

        let decision = fx.run(&LayerStack::standard(), &mut ScriptedRandom::always());

        assert_eq!(decision.map(|d| d.outcome), Some(LayerOutcome::Satisfied));
        assert!(fx.game.command_log().is_empty());
    }

    #[test]
    fn test_attack_skips_unhittable_enemy() {
        let mut fx = Fixture::new();
        let enemy = fx.game.add_player("Enemy", Race::Zerg, 0);
        fx.game.spawn(enemy, UnitType::Overlord, Position::new(420, 400));
        assert_eq!(
            fx.apply(&AttackLayer, &mut ScriptedRandom::never()),
            LayerOutcome::Declined
        );
    }

    #[test]
    fn test_construct_supply_when_gate_fires() {
        let mut fx = Fixture::new();
        let outcome = fx.apply(&ConstructSupplyLayer, &mut ScriptedRandom::new([0.01]));
        assert!(matches!(
            outcome,
            LayerOutcome::Issued(Order::Build(UnitType::SupplyDepot, _))
        ));
        assert_eq!(fx.game.incomplete_unit_count(UnitType::SupplyDepot), 1);
    }

    #[test]
    fn test_construct_supply_gate_miss_declines() {
        let mut fx = Fixture::new();
        assert_eq!(
            fx.apply(&ConstructSupplyLayer, &mut ScriptedRandom::new([0.06])),
            LayerOutcome::Declined
        );
        assert!(fx.game.command_log().is_empty());
    }

    #[test]
    fn test_construct_supply_without_minerals_declines() {
        let mut fx = Fixture::new();
        fx.game.player_mut(fx.me).expect("me").minerals = 10;
        assert_eq!(
            fx.apply(&ConstructSupplyLayer, &mut ScriptedRandom::always()),
            LayerOutcome::Declined
        );
    }

    #[test]
    fn test_drop_cargo_for_idle_carrier() {
        let mut fx = Fixture::new();
        fx.game.unit_mut(fx.worker).expect("worker").carrying = Some(ResourceKind::Gas);
        let decision = fx.run(&LayerStack::standard(), &mut ScriptedRandom::never());
        assert_eq!(
            decision.map(|d| d.outcome),
            Some(LayerOutcome::Issued(Order::ReturnCargo))
        );
    }

    #[test]
    fn test_refinery_on_nearby_geyser() {
        let mut fx = Fixture::new();
        let geyser = fx
            .game
            .spawn_at_tile(PlayerId::NEUTRAL, UnitType::VespeneGeyser, TilePosition::new(20, 4));
        let anchor = fx.game.unit(geyser).expect("geyser").tile_position();
        let decision = fx.run(&LayerStack::standard(), &mut ScriptedRandom::never());
        assert_eq!(
            decision,
            Some(LayerDecision {
                layer: LayerKind::ConstructRefinery,
                outcome: LayerOutcome::Issued(Order::Build(UnitType::Refinery, anchor)),
            })
        );
    }

    #[test]
    fn test_falls_through_to_gather_minerals() {
        let mut fx = Fixture::new();
        let field = fx
            .game
            .spawn_at_tile(PlayerId::NEUTRAL, UnitType::MineralField, TilePosition::new(14, 14));
        // Supply gate misses, gas preference misses.
        let mut rng = ScriptedRandom::new([0.5, 0.5]);
        let decision = fx.run(&LayerStack::standard(), &mut rng);
        assert_eq!(
            decision,
            Some(LayerDecision {
                layer: LayerKind::Gather,
                outcome: LayerOutcome::Issued(Order::Gather(field)),
            })
        );
        assert_eq!(rng.remaining(), 0);
    }

    #[test]
    fn test_gas_preference_uses_own_refinery() {
        let mut fx = Fixture::new();
        fx.game
            .spawn_at_tile(PlayerId::NEUTRAL, UnitType::MineralField, TilePosition::new(14, 14));
        let refinery = fx
            .game
            .spawn_at_tile(fx.me, UnitType::Refinery, TilePosition::new(30, 30));
        let outcome = fx.apply(&GatherLayer, &mut ScriptedRandom::new([0.1]));
        assert_eq!(outcome, LayerOutcome::Issued(Order::Gather(refinery)));
    }

    #[test]
    fn test_gas_preference_falls_back_to_minerals() {
        let mut fx = Fixture::new();
        let field = fx
            .game
            .spawn_at_tile(PlayerId::NEUTRAL, UnitType::MineralField, TilePosition::new(14, 14));
        let outcome = fx.apply(&GatherLayer, &mut ScriptedRandom::new([0.1]));
        assert_eq!(outcome, LayerOutcome::Issued(Order::Gather(field)));
    }

    #[test]
    fn test_gathering_worker_is_satisfied() {
        let mut fx = Fixture::new();
        fx.game.unit_mut(fx.worker).expect("worker").gathering = Some(ResourceKind::Minerals);
        assert_eq!(
            fx.apply(&GatherLayer, &mut ScriptedRandom::never()),
            LayerOutcome::Satisfied
        );
    }

    #[test]
    fn test_explore_when_nothing_else_applies() {
        let mut fx = Fixture::new();
        // Supply gate, gas preference, then x and y of the random tile.
        let mut rng = ScriptedRandom::new([0.5, 0.5, 0.25, 0.75]);
        let decision = fx.run(&LayerStack::standard(), &mut rng);
        assert_eq!(
            decision,
            Some(LayerDecision {
                layer: LayerKind::Explore,
                outcome: LayerOutcome::Issued(Order::Move(Position::new(16 * 32, 48 * 32))),
            })
        );
    }

    #[test]
    fn test_busy_worker_with_nothing_to_do_gets_no_order() {
        let mut fx = Fixture::new();
        fx.game.unit_mut(fx.worker).expect("worker").status.idle = false;
        let decision = fx.run(&LayerStack::standard(), &mut ScriptedRandom::always());
        assert_eq!(decision, None);
        assert!(fx.game.accepted_this_frame().is_empty());
    }

    #[test]
    fn test_custom_order_is_respected() {
        let mut fx = Fixture::new();
        fx.game.unit_mut(fx.worker).expect("worker").carrying = Some(ResourceKind::Minerals);
        let stack = LayerStack::from_kinds(&[LayerKind::Explore, LayerKind::DropCargo]);
        assert_eq!(stack.kinds(), vec![LayerKind::Explore, LayerKind::DropCargo]);
        let decision = fx.run(&stack, &mut ScriptedRandom::new([0.0, 0.0]));
        assert_eq!(decision.map(|d| d.layer), Some(LayerKind::Explore));
    }

    #[test]
    fn test_announces_when_enabled() {
        let mut fx = Fixture::new();
        fx.game.unit_mut(fx.worker).expect("worker").carrying = Some(ResourceKind::Minerals);
        let worker = fx.worker();
        let config = AgentConfig {
            announce_actions: true,
            ..AgentConfig::default()
        };
        let mut rng = ScriptedRandom::never();
        let mut ctx = LayerContext {
            host: &mut fx.game,
            rng: &mut rng,
            config: &config,
        };
        DropCargoLayer.try_apply(&mut ctx, &worker);
        assert_eq!(fx.game.chat_log(), ["Drop Resource".to_string()]);
    }
}
