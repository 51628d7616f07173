/// Layout symbols and their properties.
/// Properties are queried via methods, not stored as flags,
/// so symbol semantics are centralized here.

use super::platform::Slope;

/// Side of one layout cell in world units.
pub const TILE_SIZE: f32 = 16.0;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Tile {
    #[default]
    Empty,
    Girder(Slope),  // '=' flat, '>' rolls right, '<' rolls left
    Hatch,          // '+' girder with a ladder running through it
    Rivet,          // '#' breaks when walked off
    Ladder,         // 'H'
    Elevator,       // 'E' lift start position
    Shaft,          // '|' lift travel range
    Spawn,          // 'M' character start
    Kong,           // 'K' barrel thrower (2×2 cells, anchored bottom-left)
    Princess,       // 'P' goal
    Hammer,         // 'h' power-up
    Bonus,          // '$' points item
    OilDrum,        // 'O' fire threshold column
}

impl Tile {
    pub fn from_char(c: char) -> Option<Tile> {
        let t = match c {
            ' ' | '.' => Tile::Empty,
            '=' => Tile::Girder(Slope::Flat),
            '>' => Tile::Girder(Slope::Right),
            '<' => Tile::Girder(Slope::Left),
            '+' => Tile::Hatch,
            '#' => Tile::Rivet,
            'H' => Tile::Ladder,
            'E' => Tile::Elevator,
            '|' => Tile::Shaft,
            'M' => Tile::Spawn,
            'K' => Tile::Kong,
            'P' => Tile::Princess,
            'h' => Tile::Hammer,
            '$' => Tile::Bonus,
            'O' => Tile::OilDrum,
            _ => return None,
        };
        Some(t)
    }

    /// Does this cell hold a fixed platform?
    pub fn is_platform(self) -> bool {
        matches!(self, Tile::Girder(_) | Tile::Hatch | Tile::Rivet)
    }

    /// Is this cell part of a ladder?
    pub fn is_ladder(self) -> bool {
        matches!(self, Tile::Ladder | Tile::Hatch)
    }

    /// Is this cell part of a lift's travel range?
    pub fn is_shaft(self) -> bool {
        matches!(self, Tile::Shaft | Tile::Elevator)
    }

    pub fn is_breakable(self) -> bool {
        matches!(self, Tile::Rivet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols() {
        assert_eq!(Tile::from_char('>'), Some(Tile::Girder(Slope::Right)));
        assert_eq!(Tile::from_char('<'), Some(Tile::Girder(Slope::Left)));
        assert_eq!(Tile::from_char('.'), Some(Tile::Empty));
        assert_eq!(Tile::from_char('?'), None);
    }

    #[test]
    fn hatch_is_floor_and_ladder() {
        assert!(Tile::Hatch.is_platform());
        assert!(Tile::Hatch.is_ladder());
        assert!(!Tile::Ladder.is_platform());
        assert!(Tile::Rivet.is_breakable());
        assert!(Tile::Elevator.is_shaft());
        assert!(!Tile::Elevator.is_platform());
    }
}
