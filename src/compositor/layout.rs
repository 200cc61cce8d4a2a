//! Grid placement arithmetic for marker sheets. All values are PDF points,
//! origin at the bottom-left corner of the page.

use serde::{Deserialize, Serialize};

/// A4 in points.
pub const A4: PageSize = PageSize {
    width: 595.2756,
    height: 841.8898,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub rows: usize,
    pub cols: usize,
    pub marker_size: f32,
    pub margin: f32,
    pub min_spacing: f32,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            rows: 4,
            cols: 4,
            marker_size: 80.0,
            margin: 50.0,
            min_spacing: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub page: PageSize,
    pub rows: usize,
    pub cols: usize,
    pub margin: f32,
    pub marker_size: f32,
    pub h_spacing: f32,
    pub v_spacing: f32,
}

fn gaps(count: usize) -> f32 {
    count.saturating_sub(1).max(1) as f32
}

impl GridLayout {
    /// Spreads the grid evenly over the page area inside the margin.
    ///
    /// When either spacing would drop below `min_spacing`, both spacings are
    /// pinned to it and the marker shrinks to fit the tighter dimension.
    pub fn compute(page: PageSize, grid: &GridSpec) -> Self {
        let available_width = page.width - 2.0 * grid.margin;
        let available_height = page.height - 2.0 * grid.margin;
        let (cols, rows) = (grid.cols as f32, grid.rows as f32);

        let mut marker_size = grid.marker_size;
        let mut h_spacing = (available_width - cols * marker_size) / gaps(grid.cols);
        let mut v_spacing = (available_height - rows * marker_size) / gaps(grid.rows);

        if h_spacing < grid.min_spacing || v_spacing < grid.min_spacing {
            h_spacing = grid.min_spacing;
            v_spacing = grid.min_spacing;
            marker_size = f32::min(
                (available_width - gaps(grid.cols) * h_spacing) / cols,
                (available_height - gaps(grid.rows) * v_spacing) / rows,
            )
            .max(0.0);
        }

        Self {
            page,
            rows: grid.rows,
            cols: grid.cols,
            margin: grid.margin,
            marker_size,
            h_spacing,
            v_spacing,
        }
    }

    pub fn slots(&self) -> usize {
        self.rows * self.cols
    }

    /// Bottom-left corner of the marker in slot `index`, filled row by row
    /// from the top margin.
    pub fn slot_origin(&self, index: usize) -> (f32, f32) {
        let row = (index / self.cols) as f32;
        let col = (index % self.cols) as f32;
        let x = self.margin + col * (self.marker_size + self.h_spacing);
        let y = self.page.height
            - self.margin
            - (row + 1.0) * self.marker_size
            - row * self.v_spacing;
        (x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_a4_grid_keeps_marker_size() {
        let layout = GridLayout::compute(A4, &GridSpec::default());
        assert_relative_eq!(layout.marker_size, 80.0);
        assert_relative_eq!(layout.h_spacing, (A4.width - 100.0 - 320.0) / 3.0, epsilon = 1e-3);
        assert_relative_eq!(layout.v_spacing, (A4.height - 100.0 - 320.0) / 3.0, epsilon = 1e-3);
    }

    #[test]
    fn dense_grid_clamps_spacing_and_shrinks_markers() {
        let grid = GridSpec {
            marker_size: 200.0,
            ..GridSpec::default()
        };
        let layout = GridLayout::compute(A4, &grid);
        assert_eq!(layout.h_spacing, 5.0);
        assert_eq!(layout.v_spacing, 5.0);
        let expected = (A4.width - 100.0 - 15.0) / 4.0;
        assert_relative_eq!(layout.marker_size, expected, epsilon = 1e-3);

        let (last_x, _) = layout.slot_origin(3);
        assert!(last_x + layout.marker_size <= A4.width - grid.margin + 1e-3);
    }

    #[test]
    fn spacing_is_never_negative() {
        for size in [10.0, 80.0, 120.0, 150.0, 400.0, 1000.0] {
            let grid = GridSpec {
                marker_size: size,
                ..GridSpec::default()
            };
            let layout = GridLayout::compute(A4, &grid);
            assert!(layout.h_spacing >= 5.0, "size {size}");
            assert!(layout.v_spacing >= 5.0, "size {size}");
            assert!(layout.marker_size > 0.0);
        }
    }

    #[test]
    fn slots_fill_top_down_left_to_right() {
        let layout = GridLayout::compute(A4, &GridSpec::default());
        let (x0, y0) = layout.slot_origin(0);
        assert_relative_eq!(x0, 50.0);
        assert_relative_eq!(y0, A4.height - 50.0 - 80.0, epsilon = 1e-3);

        let (x1, y1) = layout.slot_origin(1);
        assert!(x1 > x0);
        assert_relative_eq!(y1, y0);

        let (x4, y4) = layout.slot_origin(4);
        assert_relative_eq!(x4, x0);
        assert_relative_eq!(y4, y0 - 80.0 - layout.v_spacing, epsilon = 1e-3);

        let (_, y15) = layout.slot_origin(15);
        assert_relative_eq!(y15, 50.0, epsilon = 1e-3);
    }
}
