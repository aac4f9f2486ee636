/// One rectangular region of the frame, in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Tile {
    /// Row-major iteration over the absolute pixel coordinates of the tile.
    pub fn pixels(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let (x0, y0) = (self.x, self.y);
        (0..self.height).flat_map(move |dy| (0..self.width).map(move |dx| (x0 + dx, y0 + dy)))
    }
}

/// Splits a frame into square-ish tiles; the right and bottom edges absorb
/// the remainder.
pub struct Tiler {
    pub width: u32,
    pub height: u32,
    pub tile_size: u32,
}

impl Tiler {
    pub fn new(width: u32, height: u32, tile_size: u32) -> Self {
        assert!(tile_size > 0);
        Self {
            width,
            height,
            tile_size,
        }
    }

    pub fn tiles(&self) -> Vec<Tile> {
        let mut tiles = Vec::new();
        let mut y = 0;
        while y < self.height {
            let height = self.tile_size.min(self.height - y);
            let mut x = 0;
            while x < self.width {
                let width = self.tile_size.min(self.width - x);
                tiles.push(Tile {
                    x,
                    y,
                    width,
                    height,
                });
                x += width;
            }
            y += height;
        }
        tiles
    }
}
