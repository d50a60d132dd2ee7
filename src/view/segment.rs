//! Render segmentation: turning a row of cells into minimal styled runs.
//!
//! A run is a maximal horizontal span of single-width cells sharing the same
//! attributes. Double-width cells always form their own run (two column
//! slots, one glyph), and the placeholder cells behind them are skipped.

use crate::engine::cell::{Cell, CellAttrs};

/// A span of cells drawn with one fill-rectangle and one text call.
///
/// `start` and `cells` are column positions, not glyph counts: a run holding
/// a single double-width character has `cells == 2`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextRun {
    pub start: u16,
    pub cells: u16,
    pub text: String,
    pub attrs: CellAttrs,
}

/// Segment one row into minimal runs, left to right, looking at no more than
/// `max_cols` columns.
pub fn build_runs(cells: &[Cell], max_cols: u16) -> Vec<TextRun> {
    let limit = (max_cols as usize).min(cells.len());
    let mut runs = Vec::new();
    let mut x = 0usize;

    while x < limit {
        let cell = &cells[x];

        // Placeholders trailing a wide character never start a run.
        if cell.is_placeholder() {
            x += 1;
            continue;
        }

        if cell.width == 2 {
            runs.push(TextRun {
                start: x as u16,
                cells: 2,
                text: cell.display().to_string(),
                attrs: cell.attrs,
            });
            x += 2;
            continue;
        }

        let start = x;
        let attrs = cell.attrs;
        let mut text = String::new();
        while x < limit {
            let current = &cells[x];
            if current.width != 1 || current.attrs != attrs {
                break;
            }
            text.push_str(current.display());
            x += 1;
        }
        runs.push(TextRun {
            start: start as u16,
            cells: (x - start) as u16,
            text,
            attrs,
        });
    }

    runs
}
