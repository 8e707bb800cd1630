//! Map coordinates.
//!
//! The host reports two coordinate spaces:
//!
//! - [`Position`]: pixel coordinates, used for unit locations and movement.
//! - [`TilePosition`]: build-tile coordinates, 32 pixels per tile, used for
//!   construction sites and map dimensions.
//!
//! All coordinates are integers so that distance comparisons are exact and
//! identical across runs.

use serde::{Deserialize, Serialize};

/// Pixels per build tile.
pub const TILE_SIZE: i32 = 32;

/// A pixel position on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// X coordinate in pixels.
    pub x: i32,
    /// Y coordinate in pixels.
    pub y: i32,
}

impl Position {
    /// Create a new pixel position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Origin of the map.
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    /// Calculate squared distance (avoids sqrt for comparisons).
    #[must_use]
    pub fn distance_squared(self, other: Self) -> i64 {
        let dx = i64::from(self.x - other.x);
        let dy = i64::from(self.y - other.y);
        dx * dx + dy * dy
    }

    /// The build tile containing this position.
    #[must_use]
    pub const fn to_tile(self) -> TilePosition {
        TilePosition {
            x: self.x.div_euclid(TILE_SIZE),
            y: self.y.div_euclid(TILE_SIZE),
        }
    }

    /// Clamp this position into a map of `map_size` tiles.
    ///
    /// The result always lies inside the playable area, so it is a legal
    /// move target even when the input was computed off the edge.
    #[must_use]
    pub fn make_valid(self, map_size: TilePosition) -> Self {
        let max_x = (map_size.x * TILE_SIZE - 1).max(0);
        let max_y = (map_size.y * TILE_SIZE - 1).max(0);
        Self {
            x: self.x.clamp(0, max_x),
            y: self.y.clamp(0, max_y),
        }
    }

    /// Whether this position lies inside a map of `map_size` tiles.
    #[must_use]
    pub const fn is_valid(self, map_size: TilePosition) -> bool {
        self.x >= 0 && self.y >= 0 && self.x < map_size.x * TILE_SIZE && self.y < map_size.y * TILE_SIZE
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A build-tile position on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TilePosition {
    /// X coordinate in tiles.
    pub x: i32,
    /// Y coordinate in tiles.
    pub y: i32,
}

impl TilePosition {
    /// Create a new tile position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Top-left pixel of this tile.
    #[must_use]
    pub const fn to_position(self) -> Position {
        Position {
            x: self.x * TILE_SIZE,
            y: self.y * TILE_SIZE,
        }
    }

    /// Offset this tile by a size in tiles (e.g. a building footprint).
    #[must_use]
    pub const fn offset(self, size: TilePosition) -> Self {
        Self {
            x: self.x + size.x,
            y: self.y + size.y,
        }
    }

    /// Pixel centre of a footprint of `size` anchored at this tile.
    #[must_use]
    pub const fn footprint_center(self, size: TilePosition) -> Position {
        Position {
            x: self.x * TILE_SIZE + size.x * TILE_SIZE / 2,
            y: self.y * TILE_SIZE + size.y * TILE_SIZE / 2,
        }
    }

    /// Whether two footprints overlap.
    #[must_use]
    pub const fn footprints_overlap(
        self,
        size: TilePosition,
        other: TilePosition,
        other_size: TilePosition,
    ) -> bool {
        self.x < other.x + other_size.x
            && other.x < self.x + size.x
            && self.y < other.y + other_size.y
            && other.y < self.y + size.y
    }

    /// Whether a footprint of `size` anchored at this tile fits inside a map
    /// of `map_size` tiles.
    #[must_use]
    pub const fn footprint_fits(self, size: TilePosition, map_size: TilePosition) -> bool {
        self.x >= 0 && self.y >= 0 && self.x + size.x <= map_size.x && self.y + size.y <= map_size.y
    }
}

impl std::fmt::Display for TilePosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_round_trip_is_top_left() {
        let pos = Position::new(70, 33);
        let tile = pos.to_tile();
        assert_eq!(tile, TilePosition::new(2, 1));
        assert_eq!(tile.to_position(), Position::new(64, 32));
    }

    #[test]
    fn test_make_valid_clamps_into_map() {
        let map = TilePosition::new(64, 64);
        assert_eq!(Position::new(-5, 10).make_valid(map), Position::new(0, 10));
        assert_eq!(
            Position::new(5000, 5000).make_valid(map),
            Position::new(64 * 32 - 1, 64 * 32 - 1)
        );
        assert!(Position::new(5000, 5000).make_valid(map).is_valid(map));
    }

    #[test]
    fn test_footprint_fits_edges() {
        let map = TilePosition::new(10, 10);
        assert!(TilePosition::new(6, 7).footprint_fits(TilePosition::new(4, 3), map));
        assert!(!TilePosition::new(7, 7).footprint_fits(TilePosition::new(4, 3), map));
        assert!(!TilePosition::new(-1, 0).footprint_fits(TilePosition::new(1, 1), map));
    }

    #[test]
    fn test_footprint_center_and_overlap() {
        let anchor = TilePosition::new(2, 2);
        let size = TilePosition::new(4, 3);
        assert_eq!(anchor.footprint_center(size), Position::new(128, 112));
        assert!(anchor.footprints_overlap(size, TilePosition::new(5, 4), TilePosition::new(2, 2)));
        assert!(!anchor.footprints_overlap(size, TilePosition::new(6, 2), TilePosition::new(2, 2)));
    }

    #[test]
    fn test_distance_squared() {
        let a = Position::new(0, 0);
        let b = Position::new(3, 4);
        assert_eq!(a.distance_squared(b), 25);
        assert_eq!(b.distance_squared(a), 25);
    }
}
