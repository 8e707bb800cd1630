//! Reactive supply remediation.
//!
//! When a depot fails to train a worker because the player is out of
//! supply, the agent tries to fix it: find a builder for the race's supply
//! provider and have it build (or, for Zerg, morph) one. Attempts are rate
//! limited by a cooldown and stop entirely once supply capacity reaches the
//! cap.
//!
//! ```text
//! train failed ──► supply blocked? ──► cooled down? ──► nothing in progress?
//!                                                             │
//!                       ┌──────────── at cap ◄────────────────┤
//!                       ▼                                     ▼
//!                    (skip)                       stamp frame, find builder
//!                                                             │
//!                                       structure ◄───────────┴──────► unit
//!                                  locate, box, build                 train
//! ```

use tracing::{debug, info};

use crate::config::AgentConfig;
use crate::dispatcher::eligibility;
use crate::error::CommandError;
use crate::host::{Color, GameHost, Order, Overlay, UnitId, UnitInfo};
use crate::position::TilePosition;
use crate::unit_type::UnitType;

/// What a remediation attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemediationOutcome {
    /// The training failure was not a supply block.
    NotSupplyBlocked,
    /// The depot has no race, so there is no provider to build.
    UnknownRace,
    /// The host reports no controlled player.
    NoSelf,
    /// The last attempt was too recent.
    CoolingDown,
    /// A supply provider is already being built or morphed.
    ProviderInProgress,
    /// Supply capacity has reached the cap.
    AtCap,
    /// No eligible builder that is idle or gathering minerals was found.
    NoBuilder,
    /// The host found no site for the provider.
    NoBuildLocation {
        /// The builder that would have gone.
        builder: UnitId,
    },
    /// A build order went out.
    BuildIssued {
        /// The builder.
        builder: UnitId,
        /// Provider being built.
        provider: UnitType,
        /// Footprint anchor.
        site: TilePosition,
    },
    /// A train order went out.
    TrainIssued {
        /// The producer.
        builder: UnitId,
        /// Provider being trained.
        provider: UnitType,
    },
    /// The host refused the build or train order.
    Rejected {
        /// The builder.
        builder: UnitId,
        /// Why.
        error: CommandError,
    },
}

impl RemediationOutcome {
    /// Whether a remediation command was accepted.
    #[must_use]
    pub const fn issued(&self) -> bool {
        matches!(self, Self::BuildIssued { .. } | Self::TrainIssued { .. })
    }

    /// Whether this attempt stamped the cooldown.
    #[must_use]
    pub const fn attempted(&self) -> bool {
        matches!(
            self,
            Self::NoBuilder
                | Self::NoBuildLocation { .. }
                | Self::BuildIssued { .. }
                | Self::TrainIssued { .. }
                | Self::Rejected { .. }
        )
    }
}

/// Cooldown state for supply remediation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SupplyRemediation {
    last_checked: u32,
}

impl SupplyRemediation {
    /// Fresh state. The first attempt is possible once the cooldown has
    /// elapsed from frame 0.
    #[must_use]
    pub const fn new() -> Self {
        Self { last_checked: 0 }
    }

    /// Frame of the last attempt, 0 if there was none.
    #[must_use]
    pub const fn last_checked(&self) -> u32 {
        self.last_checked
    }

    /// Whether the cooldown allows an attempt on `frame`.
    #[must_use]
    pub const fn ready(&self, frame: u32, cooldown: u32) -> bool {
        frame >= self.last_checked.saturating_add(cooldown)
    }

    /// React to `depot` failing to train with `error`.
    pub fn on_train_failure(
        &mut self,
        host: &mut dyn GameHost,
        depot: &UnitInfo,
        error: CommandError,
        config: &AgentConfig,
    ) -> RemediationOutcome {
        if error != CommandError::InsufficientSupply {
            return RemediationOutcome::NotSupplyBlocked;
        }
        let frame = host.frame_count();
        if !self.ready(frame, config.remediation_cooldown) {
            return RemediationOutcome::CoolingDown;
        }
        let Some(race) = depot.unit_type.race() else {
            return RemediationOutcome::UnknownRace;
        };
        let provider = race.supply_provider();
        if host.incomplete_unit_count(provider) > 0 {
            return RemediationOutcome::ProviderInProgress;
        }
        let Some(me) = host.self_player() else {
            return RemediationOutcome::NoSelf;
        };
        if me.supply_total >= config.supply_cap {
            debug!(supply_total = me.supply_total, "Supply at cap, not remediating");
            return RemediationOutcome::AtCap;
        }

        self.last_checked = frame;

        let Some(builder_type) = provider.what_builds() else {
            return RemediationOutcome::NoBuilder;
        };
        let builder = host.closest_unit(depot.id, &|u| {
            u.unit_type == builder_type
                && u.owner == me.id
                && (u.is_idle() || u.is_gathering_minerals())
                && eligibility(u).is_ok()
        });
        let Some(builder) = builder else {
            debug!(frame, %provider, "No builder for supply provider");
            return RemediationOutcome::NoBuilder;
        };

        if !provider.is_building() {
            return match host.issue(builder.id, Order::Train(provider)) {
                Ok(()) => {
                    info!(frame, builder = %builder.id, %provider, "Training supply provider");
                    RemediationOutcome::TrainIssued {
                        builder: builder.id,
                        provider,
                    }
                }
                Err(error) => RemediationOutcome::Rejected {
                    builder: builder.id,
                    error,
                },
            };
        }

        let Some(site) = host.build_location(provider, builder.tile_position()) else {
            return RemediationOutcome::NoBuildLocation {
                builder: builder.id,
            };
        };
        host.register_overlay(
            Overlay::MapBox {
                top_left: site.to_position(),
                bottom_right: site.offset(provider.tile_size()).to_position(),
                color: Color::Blue,
            },
            provider.build_time() + config.overlay_margin,
        );
        match host.issue(builder.id, Order::Build(provider, site)) {
            Ok(()) => {
                info!(frame, builder = %builder.id, %provider, %site, "Building supply provider");
                RemediationOutcome::BuildIssued {
                    builder: builder.id,
                    provider,
                    site,
                }
            }
            Err(error) => RemediationOutcome::Rejected {
                builder: builder.id,
                error,
            },
        }
    }
}
