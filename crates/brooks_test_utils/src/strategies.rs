//! Proptest strategies for agent inputs.

use brooks_core::host::UnitStatus;
use brooks_core::unit_type::Race;
use proptest::prelude::*;

/// Any of the three races.
pub fn race() -> impl Strategy<Value = Race> {
    prop_oneof![Just(Race::Terran), Just(Race::Protoss), Just(Race::Zerg)]
}

/// Unit status flags, each set independently.
///
/// Eligibility-relevant flags are biased towards their healthy value so
/// both eligible and ineligible units come up often.
pub fn unit_status() -> impl Strategy<Value = UnitStatus> {
    (
        prop::bool::weighted(0.9),
        any::<bool>(),
        prop::bool::weighted(0.9),
        prop::bool::weighted(0.1),
        prop::bool::weighted(0.1),
        prop::bool::weighted(0.1),
        prop::bool::weighted(0.1),
        prop::bool::weighted(0.1),
        prop::bool::weighted(0.9),
        prop::bool::weighted(0.1),
    )
        .prop_map(
            |(
                exists,
                idle,
                completed,
                constructing,
                locked_down,
                maelstrommed,
                stasised,
                loaded,
                powered,
                stuck,
            )| UnitStatus {
                exists,
                idle,
                completed,
                constructing,
                attacking: false,
                locked_down,
                maelstrommed,
                stasised,
                loaded,
                powered,
                stuck,
            },
        )
}

/// A strictly increasing sequence of frames, starting anywhere below
/// 2000 and advancing by 1 to `max_gap` frames at a time.
pub fn increasing_frames(len: usize, max_gap: u32) -> impl Strategy<Value = Vec<u32>> {
    (0..2000_u32, prop::collection::vec(1..=max_gap, len)).prop_map(|(start, gaps)| {
        gaps.into_iter()
            .scan(start, |frame, gap| {
                *frame += gap;
                Some(*frame)
            })
            .collect()
    })
}
