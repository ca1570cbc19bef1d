use serde::{Deserialize, Serialize};

/// A cell coordinate on the level grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Static tile kinds, decoded from the raw level rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tile {
    /// Filler outside the playfield.
    Void,
    /// Open floor.
    Floor,
    /// Indestructible inner wall.
    Wall,
    /// Playfield border.
    Border,
}

impl Tile {
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            1 => Tile::Floor,
            2 => Tile::Wall,
            70 | 85 => Tile::Border,
            _ => Tile::Void,
        }
    }

    pub fn is_walkable(self) -> bool {
        matches!(self, Tile::Floor)
    }
}

/// Rectangular static tile grid for one level.
///
/// Crates, bombs, enemies, and pickups are dynamic occupants tracked
/// elsewhere; the map only knows the immutable terrain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileMap {
    tiles: Vec<Vec<Tile>>,
    width: i32,
    height: i32,
}

impl TileMap {
    /// Build a map from raw row data. Ragged rows are an authoring error.
    pub fn from_raw(rows: &[Vec<u8>]) -> Self {
        let height = rows.len() as i32;
        let width = rows.first().map_or(0, |r| r.len() as i32);
        debug_assert!(
            rows.iter().all(|r| r.len() as i32 == width),
            "level rows must be rectangular"
        );
        let tiles = rows
            .iter()
            .map(|row| row.iter().map(|&raw| Tile::from_raw(raw)).collect())
            .collect();
        Self {
            tiles,
            width,
            height,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    /// Tile at `pos`; out-of-bounds reads as border so movement and blast
    /// walks never need a separate bounds check.
    pub fn get(&self, pos: GridPos) -> Tile {
        if !self.in_bounds(pos) {
            return Tile::Border;
        }
        self.tiles[pos.y as usize][pos.x as usize]
    }

    /// Center of the playable area, used as the last-resort spawn cell.
    pub fn center(&self) -> GridPos {
        GridPos::new(self.width / 2, self.height / 2)
    }
}

/// Capability object answering "is this cell free to enter or spawn into".
///
/// Handed explicitly to any component that needs occupancy instead of
/// letting components reach into each other's state.
pub trait GridOccupancyQuery {
    fn is_open(&self, pos: GridPos) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_map() -> TileMap {
        TileMap::from_raw(&[
            vec![85, 70, 70, 85],
            vec![85, 1, 2, 85],
            vec![85, 1, 1, 85],
            vec![70, 70, 70, 70],
        ])
    }

    #[test]
    fn raw_decoding() {
        assert_eq!(Tile::from_raw(1), Tile::Floor);
        assert_eq!(Tile::from_raw(2), Tile::Wall);
        assert_eq!(Tile::from_raw(70), Tile::Border);
        assert_eq!(Tile::from_raw(85), Tile::Border);
        assert_eq!(Tile::from_raw(4), Tile::Void);
    }

    #[test]
    fn out_of_bounds_reads_as_border() {
        let map = small_map();
        assert_eq!(map.get(GridPos::new(-1, 0)), Tile::Border);
        assert_eq!(map.get(GridPos::new(0, 99)), Tile::Border);
    }

    #[test]
    fn lookup_matches_layout() {
        let map = small_map();
        assert_eq!(map.get(GridPos::new(1, 1)), Tile::Floor);
        assert_eq!(map.get(GridPos::new(2, 1)), Tile::Wall);
        assert_eq!(map.get(GridPos::new(0, 0)), Tile::Border);
    }

    #[test]
    fn only_floor_is_walkable() {
        assert!(Tile::Floor.is_walkable());
        assert!(!Tile::Wall.is_walkable());
        assert!(!Tile::Border.is_walkable());
        assert!(!Tile::Void.is_walkable());
    }
}
