use std::fmt;

use serde::{Deserialize, Serialize};


// Board coordinates as the server sees them: `x` is the column, `y` is the row, both 0-based.
// The page may display the board flipped, but `data-x`/`data-y` attributes always carry these.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct Square {
    pub x: u32,
    pub y: u32,
}

impl Square {
    pub const fn new(x: u32, y: u32) -> Self { Square { x, y } }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// The server answers `possible_moves` with `[[x, y], ...]`.
impl From<(u32, u32)> for Square {
    fn from((x, y): (u32, u32)) -> Self { Square { x, y } }
}


// On-screen position of a square (document coordinates of its top-left corner).
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct PixelOffset {
    pub left: f64,
    pub top: f64,
}

impl PixelOffset {
    pub const fn new(left: f64, top: f64) -> Self { PixelOffset { left, top } }

    // Translation that moves something at `self` to `other`.
    pub fn translation_to(self, other: PixelOffset) -> (f64, f64) {
        (other.left - self.left, other.top - self.top)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translation() {
        let from = PixelOffset::new(100.0, 340.0);
        let to = PixelOffset::new(160.0, 280.0);
        assert_eq!(from.translation_to(to), (60.0, -60.0));
        assert_eq!(to.translation_to(from), (-60.0, 60.0));
    }
}
