//! Scenario loading and configuration.
//!
//! Scenarios define the starting sandbox for a headless match: map, players,
//! their units and structures, resource fields, and how long to run.

use std::path::Path;

use brooks_core::error::AgentError;
use brooks_core::host::PlayerId;
use brooks_core::position::{Position, TilePosition};
use brooks_core::sandbox::SandboxGame;
use brooks_core::unit_type::{Race, UnitType};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// The scenario parsed but cannot be played.
    #[error("Invalid scenario: {0}")]
    Invalid(String),
    /// The agent config could not be loaded.
    #[error(transparent)]
    Agent(#[from] AgentError),
}

/// A complete scenario configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Map dimensions in build tiles.
    pub map_size: (i32, i32),
    /// Latency window reported to the agent.
    #[serde(default = "default_latency")]
    pub latency_frames: u32,
    /// Frames to simulate.
    #[serde(default = "default_max_frames")]
    pub max_frames: u32,
    /// Run as a replay; the agent must then issue nothing.
    #[serde(default)]
    pub replay: bool,
    /// Players, in id order. Exactly one must be controlled.
    pub players: Vec<PlayerSetup>,
    /// Neutral mineral fields and geysers.
    #[serde(default)]
    pub resources: Vec<ResourcePlacement>,
}

fn default_latency() -> u32 {
    2
}

fn default_max_frames() -> u32 {
    Scenario::DEFAULT_MAX_FRAMES
}

/// One player's starting setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSetup {
    /// Display name.
    pub name: String,
    /// Race.
    pub race: Race,
    /// Starting minerals.
    #[serde(default = "default_minerals")]
    pub minerals: u32,
    /// Whether the agent plays this player.
    #[serde(default)]
    pub controlled: bool,
    /// Structures, placed by footprint anchor.
    #[serde(default)]
    pub buildings: Vec<BuildingPlacement>,
    /// Mobile units, placed by pixel.
    #[serde(default)]
    pub units: Vec<UnitPlacement>,
}

fn default_minerals() -> u32 {
    50
}

/// A structure at a footprint anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingPlacement {
    /// Structure type.
    pub unit_type: UnitType,
    /// Anchor tile.
    pub tile: (i32, i32),
}

/// A row of identical units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitPlacement {
    /// Unit type.
    pub unit_type: UnitType,
    /// Pixel position of the first unit.
    pub position: (i32, i32),
    /// How many to place, 16 pixels apart along x.
    #[serde(default = "default_count")]
    pub count: u32,
}

fn default_count() -> u32 {
    1
}

impl UnitPlacement {
    /// Placement of `count` units starting at `(x, y)`.
    #[must_use]
    pub const fn new(unit_type: UnitType, x: i32, y: i32, count: u32) -> Self {
        Self {
            unit_type,
            position: (x, y),
            count,
        }
    }
}

/// A neutral resource at a footprint anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePlacement {
    /// `MineralField` or `VespeneGeyser`.
    pub unit_type: UnitType,
    /// Anchor tile.
    pub tile: (i32, i32),
}

impl Scenario {
    /// Five minutes of game time.
    pub const DEFAULT_MAX_FRAMES: u32 = 24 * 60 * 5;

    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Load from a RON string (useful for embedded scenarios).
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Resolve a built-in name (`standard_terran`, `standard_protoss`,
    /// `standard_zerg`, `supply_block`) or else load the name as a path.
    pub fn resolve(name: &str) -> Result<Self, ScenarioError> {
        match name {
            "standard_terran" => Ok(Self::standard(Race::Terran)),
            "standard_protoss" => Ok(Self::standard(Race::Protoss)),
            "standard_zerg" => Ok(Self::standard(Race::Zerg)),
            "supply_block" => Ok(Self::supply_block()),
            path => Self::load(path),
        }
    }

    /// A one-base start for `race` against a distant Zerg opponent.
    #[must_use]
    pub fn standard(race: Race) -> Self {
        let mut resources: Vec<ResourcePlacement> = (0..8)
            .map(|i| ResourcePlacement {
                unit_type: UnitType::MineralField,
                tile: (16, 4 + i),
            })
            .collect();
        resources.push(ResourcePlacement {
            unit_type: UnitType::VespeneGeyser,
            tile: (8, 16),
        });
        resources.push(ResourcePlacement {
            unit_type: UnitType::MineralField,
            tile: (46, 50),
        });

        let mut scenario = Self {
            name: format!("Standard {race}"),
            description: format!("One {race} base with four workers; the opponent sits in the far corner"),
            map_size: (64, 64),
            latency_frames: default_latency(),
            max_frames: Self::DEFAULT_MAX_FRAMES,
            replay: false,
            players: vec![
                PlayerSetup {
                    name: "Brooks".to_string(),
                    race,
                    minerals: 50,
                    controlled: true,
                    buildings: vec![BuildingPlacement {
                        unit_type: race.resource_depot(),
                        tile: (8, 8),
                    }],
                    units: vec![UnitPlacement::new(race.worker(), 420, 300, 4)],
                },
                PlayerSetup {
                    name: "Opponent".to_string(),
                    race: Race::Zerg,
                    minerals: 50,
                    controlled: false,
                    buildings: vec![BuildingPlacement {
                        unit_type: UnitType::Hatchery,
                        tile: (54, 54),
                    }],
                    units: Vec::new(),
                },
            ],
            resources,
        };
        if race == Race::Zerg {
            scenario.players[0]
                .units
                .push(UnitPlacement::new(UnitType::Overlord, 300, 420, 1));
        }
        scenario
    }

    /// A Terran base that starts supply blocked with a healthy bank.
    #[must_use]
    pub fn supply_block() -> Self {
        let mut scenario = Self::standard(Race::Terran);
        scenario.name = "Supply Block".to_string();
        scenario.description = "Ten SCVs on ten supply; the agent has to build its way out".to_string();
        if let Some(me) = scenario.players.first_mut() {
            me.minerals = 1000;
            me.units = vec![UnitPlacement::new(UnitType::Scv, 420, 300, 10)];
        }
        scenario
    }

    /// Check the scenario can be built into a sandbox.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.map_size.0 <= 0 || self.map_size.1 <= 0 {
            return Err(ScenarioError::Invalid(format!(
                "map size {:?} must be positive",
                self.map_size
            )));
        }
        let controlled = self.players.iter().filter(|p| p.controlled).count();
        if controlled != 1 {
            return Err(ScenarioError::Invalid(format!(
                "exactly one player must be controlled, found {controlled}"
            )));
        }
        if self.players.len() >= usize::from(PlayerId::NEUTRAL.0) {
            return Err(ScenarioError::Invalid("too many players".to_string()));
        }
        for resource in &self.resources {
            if !resource.unit_type.is_resource() {
                return Err(ScenarioError::Invalid(format!(
                    "{} is not a resource",
                    resource.unit_type
                )));
            }
        }
        for player in &self.players {
            if let Some(b) = player.buildings.iter().find(|b| !b.unit_type.is_building()) {
                return Err(ScenarioError::Invalid(format!(
                    "{} of {} is not a structure",
                    b.unit_type, player.name
                )));
            }
        }
        Ok(())
    }

    /// Build the starting sandbox. Returns it with the controlled player.
    pub fn build_sandbox(&self) -> Result<(SandboxGame, PlayerId), ScenarioError> {
        self.validate()?;
        let map_size = TilePosition::new(self.map_size.0, self.map_size.1);
        let mut game = SandboxGame::new(self.name.clone(), map_size);
        game.set_latency_frames(self.latency_frames);
        game.set_replay(self.replay);

        let mut me = None;
        for setup in &self.players {
            let id = game.add_player(setup.name.clone(), setup.race, setup.minerals);
            if setup.controlled {
                me = Some(id);
            }
            for building in &setup.buildings {
                let anchor = TilePosition::new(building.tile.0, building.tile.1);
                if !game.can_build_at(building.unit_type, anchor) {
                    warn!(scenario = %self.name, unit = %building.unit_type, %anchor, "Structure overlaps or leaves the map");
                }
                game.spawn_at_tile(id, building.unit_type, anchor);
            }
            for placement in &setup.units {
                for i in 0..placement.count {
                    let (x, y) = placement.position;
                    let position = Position::new(x + 16 * i as i32, y).make_valid(map_size);
                    game.spawn(id, placement.unit_type, position);
                }
            }
        }
        for resource in &self.resources {
            let anchor = TilePosition::new(resource.tile.0, resource.tile.1);
            game.spawn_at_tile(PlayerId::NEUTRAL, resource.unit_type, anchor);
        }

        let me = me.ok_or_else(|| ScenarioError::Invalid("no controlled player".to_string()))?;
        game.set_self(Some(me));
        game.drain_events();
        Ok((game, me))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brooks_core::host::GameHost;

    #[test]
    fn test_standard_scenarios_build() {
        for race in [Race::Terran, Race::Protoss, Race::Zerg] {
            let (game, me) = Scenario::standard(race).build_sandbox().expect("sandbox");
            assert_eq!(game.count_units(me, race.worker()), 4);
            assert_eq!(game.count_units(me, race.resource_depot()), 1);
            assert_eq!(game.self_player().map(|p| p.race), Some(race));
        }
    }

    #[test]
    fn test_supply_block_is_blocked() {
        let (game, _) = Scenario::supply_block().build_sandbox().expect("sandbox");
        let me = game.self_player().expect("self");
        assert_eq!((me.supply_used, me.supply_total), (20, 20));
    }

    #[test]
    fn test_parse_minimal_ron() {
        let ron = r#"
            (
                name: "Tiny",
                map_size: (32, 32),
                players: [
                    (
                        name: "Me",
                        race: Protoss,
                        controlled: true,
                        buildings: [(unit_type: Nexus, tile: (4, 4))],
                        units: [(unit_type: Probe, position: (300, 200), count: 2)],
                    ),
                ],
                resources: [(unit_type: MineralField, tile: (12, 4))],
            )
        "#;
        let scenario = Scenario::from_ron_str(ron).expect("parse");
        assert_eq!(scenario.latency_frames, 2);
        assert_eq!(scenario.max_frames, Scenario::DEFAULT_MAX_FRAMES);
        assert_eq!(scenario.players[0].minerals, 50);
        let (game, me) = scenario.build_sandbox().expect("sandbox");
        assert_eq!(game.count_units(me, UnitType::Probe), 2);
    }

    #[test]
    fn test_rejects_uncontrolled() {
        let mut scenario = Scenario::standard(Race::Terran);
        scenario.players[0].controlled = false;
        assert!(matches!(scenario.validate(), Err(ScenarioError::Invalid(_))));
    }

    #[test]
    fn test_rejects_unit_as_resource() {
        let mut scenario = Scenario::standard(Race::Zerg);
        scenario.resources.push(ResourcePlacement {
            unit_type: UnitType::Zergling,
            tile: (1, 1),
        });
        assert!(matches!(scenario.validate(), Err(ScenarioError::Invalid(_))));
    }

    #[test]
    fn test_load_round_trips_through_file() {
        let scenario = Scenario::supply_block();
        let ron = ron::ser::to_string_pretty(&scenario, ron::ser::PrettyConfig::default()).expect("encode");
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("block.ron");
        std::fs::write(&path, ron).unwrap();

        let loaded = Scenario::resolve(path.to_str().expect("utf-8 path")).expect("load");
        assert_eq!(loaded, scenario);
    }

    #[test]
    fn test_resolve_unknown_path() {
        assert!(matches!(
            Scenario::resolve("no_such_scenario.ron"),
            Err(ScenarioError::FileNotFound(_))
        ));
    }
}
