//! Text rendering of labelled coordinate sets
//!
//! Layers are drawn in the order given; where several layers contain the same
//! cell, the last one wins. Rendering is for debugging and demos only and the
//! output format carries no compatibility guarantee.

use std::collections::BTreeSet;

use crate::grid::Coordinate;

/// A labelled set of cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    pub label: char,
    pub cells: BTreeSet<Coordinate>,
}

impl Layer {
    pub fn new(label: char, cells: impl IntoIterator<Item = Coordinate>) -> Self {
        Self {
            label,
            cells: cells.into_iter().collect(),
        }
    }
}

/// Renders ordered layers onto a character grid.
#[derive(Debug, Clone, Copy)]
pub struct GridRenderer {
    blank: char,
}

impl GridRenderer {
    pub fn new() -> Self {
        Self { blank: ' ' }
    }

    /// Character used for cells no layer covers.
    pub fn with_blank(mut self, blank: char) -> Self {
        self.blank = blank;
        self
    }

    /// Render the inclusive window between `bottom_left` and `top_right`.
    ///
    /// Rows run from `top_right.y` down to `bottom_left.y`, columns left to
    /// right. Every cell is followed by a space and every row by a newline.
    pub fn render(&self, bottom_left: Coordinate, top_right: Coordinate, layers: &[Layer]) -> String {
        let mut out = String::new();
        for y in (bottom_left.y..=top_right.y).rev() {
            for x in bottom_left.x..=top_right.x {
                let cell = Coordinate::new(x, y);
                let label = layers
                    .iter()
                    .rev()
                    .find(|layer| layer.cells.contains(&cell))
                    .map_or(self.blank, |layer| layer.label);
                out.push(label);
                out.push(' ');
            }
            out.push('\n');
        }
        out
    }
}

impl Default for GridRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Render with the default blank character.
pub fn render_layers(bottom_left: Coordinate, top_right: Coordinate, layers: &[Layer]) -> String {
    GridRenderer::default().render(bottom_left, top_right, layers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_are_top_down() {
        let layers = [Layer::new('#', [Coordinate::new(0, 1)])];
        let out = render_layers(Coordinate::new(0, 0), Coordinate::new(1, 1), &layers);
        assert_eq!(out, "#   \n    \n");
    }

    #[test]
    fn test_last_layer_wins() {
        let cell = Coordinate::new(0, 0);
        let layers = [Layer::new('a', [cell]), Layer::new('b', [cell])];
        assert_eq!(render_layers(cell, cell, &layers), "b \n");

        let reversed = [Layer::new('b', [cell]), Layer::new('a', [cell])];
        assert_eq!(render_layers(cell, cell, &reversed), "a \n");
    }

    #[test]
    fn test_custom_blank() {
        let out = GridRenderer::new().with_blank('.').render(
            Coordinate::new(1, 1),
            Coordinate::new(3, 1),
            &[Layer::new('o', [Coordinate::new(2, 1)])],
        );
        assert_eq!(out, ". o . \n");
    }
}
