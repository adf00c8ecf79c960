use serde::{Deserialize, Serialize};

/// Largest grid edge accepted for manually configured layers
pub const MAX_GRID_DIM: u32 = 5;

/// Rectangle representing a tile target or a monitor work area.
///
/// `x`/`y` may be negative in multi-monitor arrangements where a secondary
/// monitor sits left of or above the primary one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TileRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// A rows x cols partition of a monitor, filled in row-major order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GridSpec {
    pub rows: u32,
    pub cols: u32,
}

impl GridSpec {
    /// Derive grid dimensions from a window count.
    ///
    /// Four windows get a 2x2 quadrant split. Every other count caps the
    /// horizontal spread at 3 columns and grows downward. The 4-window
    /// special case intentionally overrides the general rule (the general
    /// rule would yield 3x2) and must stay that way.
    pub fn for_count(count: usize) -> Result<Self, GridError> {
        if count == 0 {
            return Err(GridError::EmptyCount);
        }

        if count == 4 {
            return Ok(GridSpec { rows: 2, cols: 2 });
        }

        let cols = count.min(3) as u32;
        let rows = count.div_ceil(cols as usize) as u32;
        Ok(GridSpec { rows, cols })
    }

    /// Build an explicitly sized grid for the layer feature.
    pub fn explicit(rows: u32, cols: u32) -> Result<Self, GridError> {
        if rows == 0 || cols == 0 || rows > MAX_GRID_DIM || cols > MAX_GRID_DIM {
            return Err(GridError::DimensionsOutOfRange { rows, cols });
        }

        Ok(GridSpec { rows, cols })
    }

    /// Number of tiles this grid can hold
    pub fn capacity(&self) -> usize {
        (self.rows * self.cols) as usize
    }

    /// Map a tile index to its (row, col) position, left-to-right then
    /// top-to-bottom.
    pub fn tile_position(&self, index: usize) -> Result<(u32, u32), GridError> {
        if index >= self.capacity() {
            return Err(GridError::TileIndexOutOfRange {
                index,
                rows: self.rows,
                cols: self.cols,
            });
        }

        let row = index as u32 / self.cols;
        let col = index as u32 % self.cols;
        Ok((row, col))
    }

    /// Compute the target rectangle for one tile within a monitor area.
    ///
    /// Each cell is `floor(width / cols)` by `floor(height / rows)`, shrunk
    /// by one pixel on the trailing edges so adjacent tiles keep a visible
    /// seam. Cells are not re-expanded to absorb the remainder of the
    /// integer division; the sliver at the right/bottom edge is accepted.
    pub fn tile_rect(&self, area: &TileRect, index: usize) -> Result<TileRect, GridError> {
        let (row, col) = self.tile_position(index)?;

        let base_w = area.width / self.cols;
        let base_h = area.height / self.rows;

        Ok(TileRect {
            x: area.x + (col * base_w) as i32,
            y: area.y + (row * base_h) as i32,
            width: base_w.saturating_sub(1).max(1),
            height: base_h.saturating_sub(1).max(1),
        })
    }
}

/// Errors that can occur when building or indexing a grid
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    #[error("At least one window is required to derive a grid")]
    EmptyCount,

    #[error(
        "Grid dimensions must be between 1x1 and {max}x{max}, got {rows}x{cols}",
        max = MAX_GRID_DIM
    )]
    DimensionsOutOfRange { rows: u32, cols: u32 },

    #[error("Tile index {index} is out of range for a {rows}x{cols} grid")]
    TileIndexOutOfRange { index: usize, rows: u32, cols: u32 },
}
