//! Agent tuning.
//!
//! Defaults reproduce the classic example bot exactly. A RON file can
//! override any field, including the order of the worker layers:
//!
//! ```ron
//! (
//!     construct_supply_chance: 0.05,
//!     prefer_gas_chance: 0.2,
//!     layers: [Attack, DropCargo, Gather, Explore],
//! )
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AgentError, Result};

/// Identifies one worker layer in [`AgentConfig::layers`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LayerKind {
    /// Engage the nearest enemy.
    Attack,
    /// Occasionally build a supply provider.
    ConstructSupply,
    /// Deliver carried cargo.
    DropCargo,
    /// Claim a nearby vespene geyser.
    ConstructRefinery,
    /// Harvest minerals or gas.
    Gather,
    /// Wander to a random point.
    Explore,
}

impl LayerKind {
    /// The classic priority order.
    pub const STANDARD_ORDER: [Self; 6] = [
        Self::Attack,
        Self::ConstructSupply,
        Self::DropCargo,
        Self::ConstructRefinery,
        Self::Gather,
        Self::Explore,
    ];
}

/// Tunable constants of the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Per-frame chance an idle worker starts a supply provider.
    pub construct_supply_chance: f64,
    /// Chance a worker tries gas before minerals.
    pub prefer_gas_chance: f64,
    /// Minimum frames between two supply remediation attempts.
    pub remediation_cooldown: u32,
    /// Supply total (half-units) at which remediation stops.
    pub supply_cap: u32,
    /// Extra frames the planned-site box stays on screen after the build time.
    pub overlay_margin: u32,
    /// Worker layers in priority order.
    pub layers: Vec<LayerKind>,
    /// Send a chat line whenever a layer issues a command.
    pub announce_actions: bool,
    /// Draw the frame rate in the screen corner.
    pub show_fps: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            construct_supply_chance: 0.05,
            prefer_gas_chance: 0.20,
            remediation_cooldown: 400,
            supply_cap: 400,
            overlay_margin: 100,
            layers: LayerKind::STANDARD_ORDER.to_vec(),
            announce_actions: false,
            show_fps: true,
        }
    }
}

impl AgentConfig {
    /// Load a config from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(AgentError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Load from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        let config: Self = ron::from_str(ron)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject probabilities outside `0.0..=1.0`.
    pub fn validate(&self) -> Result<()> {
        check_probability("construct_supply_chance", self.construct_supply_chance)?;
        check_probability("prefer_gas_chance", self.prefer_gas_chance)?;
        Ok(())
    }
}

fn check_probability(field: &'static str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(AgentError::InvalidConfig {
            field,
            message: format!("{value} is not within 0.0..=1.0"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_classic_bot() {
        let config = AgentConfig::default();
        assert!((config.construct_supply_chance - 0.05).abs() < f64::EPSILON);
        assert!((config.prefer_gas_chance - 0.20).abs() < f64::EPSILON);
        assert_eq!(config.remediation_cooldown, 400);
        assert_eq!(config.supply_cap, 400);
        assert_eq!(config.overlay_margin, 100);
        assert_eq!(config.layers, LayerKind::STANDARD_ORDER.to_vec());
    }

    #[test]
    fn test_partial_ron_keeps_defaults() {
        let config = AgentConfig::from_ron_str("(prefer_gas_chance: 0.5, layers: [Gather])")
            .expect("valid config");
        assert!((config.prefer_gas_chance - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.layers, vec![LayerKind::Gather]);
        assert_eq!(config.remediation_cooldown, 400);
    }

    #[test]
    fn test_rejects_bad_probability() {
        let result = AgentConfig::from_ron_str("(construct_supply_chance: 1.5)");
        assert!(matches!(
            result,
            Err(AgentError::InvalidConfig {
                field: "construct_supply_chance",
                ..
            })
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = AgentConfig::load("/definitely/not/here.ron");
        assert!(matches!(result, Err(AgentError::FileNotFound(_))));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            AgentConfig::from_ron_str("(layers: [Teleport])"),
            Err(AgentError::ParseError(_))
        ));
    }
}
