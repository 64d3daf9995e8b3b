use serde::{Deserialize, Serialize};

use crate::coord::Square;
use crate::force::Force;


// Piece class names as the server spells them in form data.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum PieceColor {
    DarkPiece,
    LightPiece,
}

impl PieceColor {
    pub fn force(self) -> Force {
        match self {
            PieceColor::DarkPiece => Force::Dark,
            PieceColor::LightPiece => Force::Light,
        }
    }

    pub fn of_force(force: Force) -> Self {
        match force {
            Force::Dark => PieceColor::DarkPiece,
            Force::Light => PieceColor::LightPiece,
        }
    }

    pub fn to_wire(self) -> &'static str {
        match self {
            PieceColor::DarkPiece => "DarkPiece",
            PieceColor::LightPiece => "LightPiece",
        }
    }
}

// What the client believes is on a square. Sent with every move-related request so that the
// server can validate against it, but the server's answer always wins.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct PieceSnapshot {
    pub x: u32,
    pub y: u32,
    pub color: PieceColor,
    pub king: bool,
}

impl PieceSnapshot {
    pub fn square(&self) -> Square { Square::new(self.x, self.y) }
    pub fn force(&self) -> Force { self.color.force() }
}

#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub size_x: u32,
    pub size_y: u32,
    pub pieces: Vec<PieceSnapshot>,
}

impl BoardSnapshot {
    pub fn piece_at(&self, square: Square) -> Option<&PieceSnapshot> {
        self.pieces.iter().find(|p| p.square() == square)
    }

    pub fn force_at(&self, square: Square) -> Option<Force> {
        self.piece_at(square).map(|p| p.force())
    }

    pub fn contains(&self, square: Square) -> bool {
        square.x < self.size_x && square.y < self.size_y
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_square() {
        let board = BoardSnapshot {
            size_x: 5,
            size_y: 5,
            pieces: vec![
                PieceSnapshot { x: 0, y: 4, color: PieceColor::LightPiece, king: false },
                PieceSnapshot { x: 2, y: 1, color: PieceColor::DarkPiece, king: true },
            ],
        };
        assert_eq!(board.force_at(Square::new(0, 4)), Some(Force::Light));
        assert_eq!(board.force_at(Square::new(2, 1)), Some(Force::Dark));
        assert!(board.piece_at(Square::new(2, 1)).unwrap().king);
        assert_eq!(board.force_at(Square::new(3, 3)), None);
        assert!(board.contains(Square::new(4, 4)));
        assert!(!board.contains(Square::new(5, 0)));
    }
}
