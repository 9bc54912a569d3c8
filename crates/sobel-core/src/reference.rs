// SPDX-License-Identifier: AGPL-3.0-only

//! Software reference edge map
//!
//! 3×3 Sobel with Manhattan combination, the same norm the RTL uses:
//!
//! ```text
//!        | -1  0 +1 |          | -1 -2 -1 |
//!   Gx = | -2  0 +2 |     Gy = |  0  0  0 |     out = sat(|Gx|) ⊕ sat(|Gy|)
//!        | -1  0 +1 |          | +1 +2 +1 |
//! ```
//!
//! `sat` clamps to 255 and `⊕` is a saturating add. Pixels outside the frame
//! are read with reflect-101 borders (`-1 → 1`, `n → n-2`).

use crate::grid::IntensityGrid;

const GX: [[i32; 3]; 3] = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]];
const GY: [[i32; 3]; 3] = [[-1, -2, -1], [0, 0, 0], [1, 2, 1]];

/// Horizontal and vertical Sobel responses at one pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gradient {
    /// Horizontal derivative
    pub gx: i32,
    /// Vertical derivative
    pub gy: i32,
}

impl Gradient {
    /// `min(255, sat(|gx|) + sat(|gy|))`
    #[must_use]
    pub fn manhattan_u8(&self) -> u8 {
        saturate(self.gx).saturating_add(saturate(self.gy))
    }
}

/// Sobel responses at (`row`, `col`)
#[must_use]
pub fn gradient_at(grid: &IntensityGrid, row: usize, col: usize) -> Gradient {
    let dims = grid.dims();
    let pixels = grid.as_slice();
    let mut gx = 0;
    let mut gy = 0;

    for (ky, (gx_row, gy_row)) in GX.iter().zip(GY.iter()).enumerate() {
        let r = reflect_101(row as isize + ky as isize - 1, dims.height());
        for kx in 0..3 {
            let c = reflect_101(col as isize + kx as isize - 1, dims.width());
            let p = i32::from(pixels[r * dims.width() + c]);
            gx += gx_row[kx] * p;
            gy += gy_row[kx] * p;
        }
    }

    Gradient { gx, gy }
}

/// Reference edge map with the same dimensions as `grid`
#[must_use]
pub fn sobel_manhattan(grid: &IntensityGrid) -> IntensityGrid {
    tracing::debug!("Computing reference Sobel for {} frame", grid.dims());
    IntensityGrid::from_fn(grid.dims(), |row, col| {
        gradient_at(grid, row, col).manhattan_u8()
    })
}

fn saturate(v: i32) -> u8 {
    u8::try_from(v.unsigned_abs().min(255)).unwrap_or(u8::MAX)
}

#[allow(clippy::cast_sign_loss, clippy::cast_possible_wrap)]
fn reflect_101(i: isize, n: usize) -> usize {
    if n == 1 {
        return 0;
    }
    let n = n as isize;
    let mut i = i;
    // One reflection is enough for a 3×3 window on any axis of length ≥ 2.
    if i < 0 {
        i = -i;
    }
    if i >= n {
        i = 2 * n - 2 - i;
    }
    i as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::FrameDims;

    #[test]
    fn test_flat_frame_has_no_edges() {
        let dims = FrameDims::new(5, 7).unwrap();
        let out = sobel_manhattan(&IntensityGrid::filled(dims, 0x10));
        assert!(out.as_slice().iter().all(|&p| p == 0));
        assert_eq!(out.dims(), dims);
    }

    #[test]
    fn test_vertical_step_edge() {
        // Left half 0, right half 100: |Gx| = 4*100 = 400 → saturates.
        let dims = FrameDims::new(4, 4).unwrap();
        let grid = IntensityGrid::from_fn(dims, |_, c| if c < 2 { 0 } else { 100 });
        let g = gradient_at(&grid, 1, 1);
        assert_eq!(g.gx, 400);
        assert_eq!(g.gy, 0);
        assert_eq!(sobel_manhattan(&grid).get(1, 1), Some(255));
        assert_eq!(sobel_manhattan(&grid).get(1, 0), Some(0));
    }

    #[test]
    fn test_small_gradient_not_saturated() {
        // Ramp of 1 per column: Gx = (1+2+1)*2 = 8 in the interior.
        let dims = FrameDims::new(3, 5).unwrap();
        let grid = IntensityGrid::from_fn(dims, |_, c| c as u8);
        assert_eq!(gradient_at(&grid, 1, 2), Gradient { gx: 8, gy: 0 });
        assert_eq!(sobel_manhattan(&grid).get(1, 2), Some(8));
    }

    #[test]
    fn test_reflect_101_border() {
        // Column 0 reflects to column 1, so a ramp has zero gradient at the edge.
        let dims = FrameDims::new(3, 5).unwrap();
        let grid = IntensityGrid::from_fn(dims, |_, c| c as u8);
        assert_eq!(gradient_at(&grid, 1, 0).gx, 0);
        assert_eq!(reflect_101(-1, 5), 1);
        assert_eq!(reflect_101(5, 5), 3);
        assert_eq!(reflect_101(0, 1), 0);
    }

    #[test]
    fn test_manhattan_saturating_add() {
        let g = Gradient { gx: -200, gy: 100 };
        assert_eq!(g.manhattan_u8(), 255);
        let g = Gradient { gx: -20, gy: 30 };
        assert_eq!(g.manhattan_u8(), 50);
    }
}
