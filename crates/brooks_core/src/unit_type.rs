//! Races and unit types known to the agent.
//!
//! The catalogue covers what the worker layers and the depot path touch:
//! each race's worker, resource depot, supply provider and refinery, the
//! neutral resources, and one combat unit per race so that sandbox matches
//! have something to fight.
//!
//! Supply is counted in half-units the way the host reports it, so a race's
//! displayed cap of 200 is a `supply_total` of 400.

use serde::{Deserialize, Serialize};

use crate::position::TilePosition;

/// A playable race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Race {
    /// Terran.
    Terran,
    /// Protoss.
    Protoss,
    /// Zerg.
    Zerg,
}

impl Race {
    /// The race's basic worker.
    #[must_use]
    pub const fn worker(self) -> UnitType {
        match self {
            Self::Terran => UnitType::Scv,
            Self::Protoss => UnitType::Probe,
            Self::Zerg => UnitType::Drone,
        }
    }

    /// The race's main base structure.
    #[must_use]
    pub const fn resource_depot(self) -> UnitType {
        match self {
            Self::Terran => UnitType::CommandCenter,
            Self::Protoss => UnitType::Nexus,
            Self::Zerg => UnitType::Hatchery,
        }
    }

    /// The unit or structure that raises the race's supply capacity.
    #[must_use]
    pub const fn supply_provider(self) -> UnitType {
        match self {
            Self::Terran => UnitType::SupplyDepot,
            Self::Protoss => UnitType::Pylon,
            Self::Zerg => UnitType::Overlord,
        }
    }

    /// The gas-extraction structure built on a vespene geyser.
    #[must_use]
    pub const fn refinery(self) -> UnitType {
        match self {
            Self::Terran => UnitType::Refinery,
            Self::Protoss => UnitType::Assimilator,
            Self::Zerg => UnitType::Extractor,
        }
    }

    /// The race's basic combat unit.
    #[must_use]
    pub const fn soldier(self) -> UnitType {
        match self {
            Self::Terran => UnitType::Marine,
            Self::Protoss => UnitType::Zealot,
            Self::Zerg => UnitType::Zergling,
        }
    }
}

impl std::fmt::Display for Race {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Terran => "Terran",
            Self::Protoss => "Protoss",
            Self::Zerg => "Zerg",
        };
        f.write_str(name)
    }
}

/// A unit or structure type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitType {
    // ========================================
    // Terran
    // ========================================
    /// Terran worker.
    Scv,
    /// Terran resource depot.
    CommandCenter,
    /// Terran supply structure.
    SupplyDepot,
    /// Terran gas structure.
    Refinery,
    /// Terran infantry.
    Marine,

    // ========================================
    // Protoss
    // ========================================
    /// Protoss worker.
    Probe,
    /// Protoss resource depot.
    Nexus,
    /// Protoss supply structure.
    Pylon,
    /// Protoss gas structure.
    Assimilator,
    /// Protoss melee warrior.
    Zealot,

    // ========================================
    // Zerg
    // ========================================
    /// Zerg worker.
    Drone,
    /// Zerg resource depot.
    Hatchery,
    /// Zerg supply unit (mobile, not a structure).
    Overlord,
    /// Zerg gas structure.
    Extractor,
    /// Zerg morphing larva; trains every other Zerg unit.
    Larva,
    /// Zerg melee unit.
    Zergling,

    // ========================================
    // Neutral
    // ========================================
    /// Harvestable mineral patch.
    MineralField,
    /// Vespene geyser; a refinery must be built on top to harvest it.
    VespeneGeyser,
}

impl UnitType {
    /// Owning race, `None` for neutral resources.
    #[must_use]
    pub const fn race(self) -> Option<Race> {
        match self {
            Self::Scv | Self::CommandCenter | Self::SupplyDepot | Self::Refinery | Self::Marine => {
                Some(Race::Terran)
            }
            Self::Probe | Self::Nexus | Self::Pylon | Self::Assimilator | Self::Zealot => {
                Some(Race::Protoss)
            }
            Self::Drone
            | Self::Hatchery
            | Self::Overlord
            | Self::Extractor
            | Self::Larva
            | Self::Zergling => Some(Race::Zerg),
            Self::MineralField | Self::VespeneGeyser => None,
        }
    }

    /// Whether this type gathers resources and constructs structures.
    #[must_use]
    pub const fn is_worker(self) -> bool {
        matches!(self, Self::Scv | Self::Probe | Self::Drone)
    }

    /// Whether this type is a main base that trains workers and accepts cargo.
    #[must_use]
    pub const fn is_resource_depot(self) -> bool {
        matches!(self, Self::CommandCenter | Self::Nexus | Self::Hatchery)
    }

    /// Whether this type is a structure occupying build tiles.
    #[must_use]
    pub const fn is_building(self) -> bool {
        matches!(
            self,
            Self::CommandCenter
                | Self::SupplyDepot
                | Self::Refinery
                | Self::Nexus
                | Self::Pylon
                | Self::Assimilator
                | Self::Hatchery
                | Self::Extractor
        )
    }

    /// Whether this type extracts gas from a geyser.
    #[must_use]
    pub const fn is_refinery(self) -> bool {
        matches!(self, Self::Refinery | Self::Assimilator | Self::Extractor)
    }

    /// Whether this type is a mineral patch.
    #[must_use]
    pub const fn is_mineral_field(self) -> bool {
        matches!(self, Self::MineralField)
    }

    /// Whether this type is an untapped vespene geyser.
    #[must_use]
    pub const fn is_vespene_geyser(self) -> bool {
        matches!(self, Self::VespeneGeyser)
    }

    /// Whether this type is a neutral resource.
    #[must_use]
    pub const fn is_resource(self) -> bool {
        self.is_mineral_field() || self.is_vespene_geyser()
    }

    /// The unit type that builds or trains this type, if any is modelled.
    #[must_use]
    pub const fn what_builds(self) -> Option<Self> {
        match self {
            Self::Scv => Some(Self::CommandCenter),
            Self::Probe => Some(Self::Nexus),
            Self::Drone | Self::Overlord | Self::Zergling => Some(Self::Larva),
            Self::Larva => Some(Self::Hatchery),
            Self::CommandCenter | Self::SupplyDepot | Self::Refinery => Some(Self::Scv),
            Self::Nexus | Self::Pylon | Self::Assimilator => Some(Self::Probe),
            Self::Hatchery | Self::Extractor => Some(Self::Drone),
            Self::Marine | Self::Zealot | Self::MineralField | Self::VespeneGeyser => None,
        }
    }

    /// Build or train duration in frames.
    #[must_use]
    pub const fn build_time(self) -> u32 {
        match self {
            Self::Scv | Self::Probe | Self::Drone => 300,
            Self::CommandCenter | Self::Nexus | Self::Hatchery => 1800,
            Self::SupplyDepot | Self::Overlord => 600,
            Self::Pylon => 450,
            Self::Refinery | Self::Assimilator | Self::Extractor => 600,
            Self::Marine => 360,
            Self::Zealot => 600,
            Self::Zergling => 420,
            Self::Larva => 342,
            Self::MineralField | Self::VespeneGeyser => 0,
        }
    }

    /// Footprint in build tiles.
    #[must_use]
    pub const fn tile_size(self) -> TilePosition {
        match self {
            Self::CommandCenter | Self::Nexus | Self::Hatchery => TilePosition::new(4, 3),
            Self::SupplyDepot => TilePosition::new(3, 2),
            Self::Pylon => TilePosition::new(2, 2),
            Self::Refinery | Self::Assimilator | Self::Extractor | Self::VespeneGeyser => {
                TilePosition::new(4, 2)
            }
            Self::MineralField => TilePosition::new(2, 1),
            _ => TilePosition::new(1, 1),
        }
    }

    /// Mineral cost.
    #[must_use]
    pub const fn mineral_price(self) -> u32 {
        match self {
            Self::Scv | Self::Probe | Self::Drone | Self::Marine | Self::Extractor => 50,
            Self::Zergling => 50,
            Self::CommandCenter | Self::Nexus => 400,
            Self::Hatchery => 300,
            Self::SupplyDepot | Self::Pylon | Self::Overlord => 100,
            Self::Refinery | Self::Assimilator | Self::Zealot => 100,
            Self::Larva | Self::MineralField | Self::VespeneGeyser => 0,
        }
    }

    /// Gas cost.
    #[must_use]
    pub const fn gas_price(self) -> u32 {
        0
    }

    /// Supply capacity this type adds once complete, in half-units.
    #[must_use]
    pub const fn supply_provided(self) -> u32 {
        match self {
            Self::CommandCenter => 20,
            Self::Nexus => 18,
            Self::Hatchery => 2,
            Self::SupplyDepot | Self::Pylon | Self::Overlord => 16,
            _ => 0,
        }
    }

    /// Supply this type consumes, in half-units.
    #[must_use]
    pub const fn supply_required(self) -> u32 {
        match self {
            Self::Scv | Self::Probe | Self::Drone | Self::Marine => 2,
            Self::Zealot => 4,
            Self::Zergling => 1,
            _ => 0,
        }
    }

    /// Whether this type has a ground weapon.
    #[must_use]
    pub const fn can_attack(self) -> bool {
        matches!(
            self,
            Self::Scv | Self::Probe | Self::Drone | Self::Marine | Self::Zealot | Self::Zergling
        )
    }

    /// Whether this type flies.
    #[must_use]
    pub const fn is_flyer(self) -> bool {
        matches!(self, Self::Overlord)
    }

    /// Whether this type's weapon can hit flying units.
    #[must_use]
    pub const fn can_attack_air(self) -> bool {
        matches!(self, Self::Marine)
    }

    /// Damage dealt per attack.
    #[must_use]
    pub const fn ground_damage(self) -> u32 {
        match self {
            Self::Scv | Self::Probe | Self::Drone | Self::Zergling => 5,
            Self::Marine => 6,
            Self::Zealot => 16,
            _ => 0,
        }
    }

    /// Frames between attacks.
    #[must_use]
    pub const fn attack_cooldown(self) -> u32 {
        match self {
            Self::Scv | Self::Probe | Self::Drone | Self::Marine => 15,
            Self::Zealot => 22,
            Self::Zergling => 8,
            _ => 0,
        }
    }

    /// Maximum hit points (shields included for Protoss).
    #[must_use]
    pub const fn max_hit_points(self) -> u32 {
        match self {
            Self::Scv => 60,
            Self::Probe | Self::Drone | Self::Marine => 40,
            Self::Zealot => 160,
            Self::Zergling => 35,
            Self::Larva => 25,
            Self::Overlord => 200,
            Self::CommandCenter | Self::Nexus => 1500,
            Self::Hatchery => 1250,
            Self::SupplyDepot => 500,
            Self::Pylon => 400,
            Self::Refinery | Self::Extractor => 750,
            Self::Assimilator => 900,
            Self::MineralField | Self::VespeneGeyser => 100_000,
        }
    }

    /// Display name as the host prints it.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Scv => "Terran SCV",
            Self::CommandCenter => "Terran Command Center",
            Self::SupplyDepot => "Terran Supply Depot",
            Self::Refinery => "Terran Refinery",
            Self::Marine => "Terran Marine",
            Self::Probe => "Protoss Probe",
            Self::Nexus => "Protoss Nexus",
            Self::Pylon => "Protoss Pylon",
            Self::Assimilator => "Protoss Assimilator",
            Self::Zealot => "Protoss Zealot",
            Self::Drone => "Zerg Drone",
            Self::Hatchery => "Zerg Hatchery",
            Self::Overlord => "Zerg Overlord",
            Self::Extractor => "Zerg Extractor",
            Self::Larva => "Zerg Larva",
            Self::Zergling => "Zerg Zergling",
            Self::MineralField => "Resource Mineral Field",
            Self::VespeneGeyser => "Resource Vespene Geyser",
        }
    }
}

impl std::fmt::Display for UnitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_RACES: [Race; 3] = [Race::Terran, Race::Protoss, Race::Zerg];

    #[test]
    fn test_race_catalogue_is_consistent() {
        for race in ALL_RACES {
            assert!(race.worker().is_worker());
            assert!(race.resource_depot().is_resource_depot());
            assert!(race.refinery().is_refinery());
            assert!(race.supply_provider().supply_provided() > 0);
            assert_eq!(race.worker().race(), Some(race));
            assert_eq!(race.supply_provider().race(), Some(race));
        }
    }

    #[test]
    fn test_supply_provider_builders() {
        assert_eq!(UnitType::SupplyDepot.what_builds(), Some(UnitType::Scv));
        assert_eq!(UnitType::Pylon.what_builds(), Some(UnitType::Probe));
        assert_eq!(UnitType::Overlord.what_builds(), Some(UnitType::Larva));
        assert!(!UnitType::Overlord.is_building());
        assert!(UnitType::Pylon.is_building());
    }

    #[test]
    fn test_workers_come_from_depots() {
        assert_eq!(UnitType::Scv.what_builds(), Some(UnitType::CommandCenter));
        assert_eq!(UnitType::Probe.what_builds(), Some(UnitType::Nexus));
        // Drones hatch from larva, which the hatchery spawns.
        assert_eq!(UnitType::Drone.what_builds(), Some(UnitType::Larva));
        assert_eq!(UnitType::Larva.what_builds(), Some(UnitType::Hatchery));
    }

    #[test]
    fn test_resources_are_neutral() {
        assert_eq!(UnitType::MineralField.race(), None);
        assert_eq!(UnitType::VespeneGeyser.race(), None);
        assert!(UnitType::VespeneGeyser.is_resource());
        assert!(!UnitType::VespeneGeyser.is_refinery());
    }
}
