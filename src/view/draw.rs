//! Frame rendering against the host draw sink.
//!
//! The renderer walks the visible slice of the buffer, reuses cached runs
//! for clean single-width lines, rebuilds runs for dirty ones, and issues
//! one fill-rectangle plus one text call per run. Double-width and
//! double-height rows are drawn every frame through scaled geometry with a
//! row clip. The cursor overlay is drawn last.

use crate::engine::cell::{AttrFlags, Color, CursorShape};
use crate::engine::Engine;
use crate::view::cursor::CursorBlink;
use crate::view::segment::{build_runs, TextRun};
use crate::view::viewport::Viewport;

/// Pixel rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Cell box dimensions measured by the host's font machinery.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellMetrics {
    pub cell_width: f64,
    pub cell_height: f64,
}

impl CellMetrics {
    /// Grid dimensions that fit in a pixel area, at least 1x1.
    pub fn grid_size(&self, width: f64, height: f64) -> (u16, u16) {
        let cols = ((width / self.cell_width) as i64).max(1) as u16;
        let rows = ((height / self.cell_height) as i64).max(1) as u16;
        (cols, rows)
    }
}

/// Style for one text call. `scale` is (1, 1) except on double-width and
/// double-height rows.
#[derive(Clone, Debug, PartialEq)]
pub struct TextPaint {
    pub fg: Color,
    pub flags: AttrFlags,
    pub scale: (f64, f64),
}

/// Host surface the pane draws on.
pub trait DrawSink {
    fn fill_rect(&mut self, rect: Rect, color: Color);
    fn draw_text(&mut self, x: f64, y: f64, text: &str, paint: &TextPaint);
    fn push_clip(&mut self, rect: Rect);
    fn pop_clip(&mut self);
    /// Cursor overlay. Focused panes draw a filled shape, unfocused panes an
    /// outline; that distinction is the sink's rendering concern.
    fn draw_cursor(&mut self, rect: Rect, shape: CursorShape, focused: bool);
}

/// Draw the visible slice of the buffer and the cursor overlay.
pub fn render_frame(
    engine: &mut dyn Engine,
    viewport: &Viewport,
    blink: &CursorBlink,
    focused: bool,
    cursor_shape: CursorShape,
    metrics: &CellMetrics,
    sink: &mut dyn DrawSink,
) {
    let cols = engine.cols();
    let start = viewport.y();
    let end = (start + viewport.lines()).min(engine.total_lines());
    let blink_on = blink.phase_visible();

    for y in start..end {
        let screen_y = y - start;
        let Some(line) = engine.line_mut(y) else {
            continue;
        };

        let attr = line.attr();
        if attr.is_double() {
            // Rebuilt every frame; the scale transform makes caching unsound.
            let runs = build_runs(line.cells(), cols / 2);
            let scale_y = if attr.is_double_height() { 2.0 } else { 1.0 };
            let shift_y = if attr == crate::engine::cell::LineAttr::DoubleHeightBottom {
                -metrics.cell_height
            } else {
                0.0
            };
            draw_double_row(sink, &runs, screen_y, cols, metrics, blink_on, scale_y, shift_y);
        } else {
            if line.cached_runs().is_none() {
                let runs = build_runs(line.cells(), cols);
                line.cache_runs(runs);
            }
            if let Some(runs) = line.cached_runs() {
                for run in runs {
                    draw_run(sink, run, screen_y, metrics, blink_on);
                }
            }
        }
    }

    draw_cursor_overlay(
        engine,
        start,
        end,
        blink,
        focused,
        cursor_shape,
        metrics,
        sink,
    );
}

fn draw_run(
    sink: &mut dyn DrawSink,
    run: &TextRun,
    screen_y: usize,
    metrics: &CellMetrics,
    blink_on: bool,
) {
    let x = run.start as f64 * metrics.cell_width;
    let y = screen_y as f64 * metrics.cell_height;
    let rect = Rect {
        x,
        y,
        width: run.cells as f64 * metrics.cell_width,
        height: metrics.cell_height,
    };

    let (fg, bg) = run.attrs.resolved(blink_on);
    sink.fill_rect(rect, bg);
    sink.draw_text(
        x,
        y,
        &run.text,
        &TextPaint {
            fg,
            flags: run.attrs.flags,
            scale: (1.0, 1.0),
        },
    );
}

#[allow(clippy::too_many_arguments)]
fn draw_double_row(
    sink: &mut dyn DrawSink,
    runs: &[TextRun],
    screen_y: usize,
    cols: u16,
    metrics: &CellMetrics,
    blink_on: bool,
    scale_y: f64,
    shift_y: f64,
) {
    let row_y = screen_y as f64 * metrics.cell_height;
    let row_rect = Rect {
        x: 0.0,
        y: row_y,
        width: cols as f64 * metrics.cell_width,
        height: metrics.cell_height,
    };

    sink.push_clip(row_rect);
    for run in runs {
        // Horizontal geometry is doubled; the glyphs are scaled to match.
        let x = run.start as f64 * metrics.cell_width * 2.0;
        let rect = Rect {
            x,
            y: row_y,
            width: run.cells as f64 * metrics.cell_width * 2.0,
            height: metrics.cell_height,
        };

        let (fg, bg) = run.attrs.resolved(blink_on);
        sink.fill_rect(rect, bg);
        sink.draw_text(
            x,
            row_y + shift_y,
            &run.text,
            &TextPaint {
                fg,
                flags: run.attrs.flags,
                scale: (2.0, scale_y),
            },
        );
    }
    sink.pop_clip();
}

#[allow(clippy::too_many_arguments)]
fn draw_cursor_overlay(
    engine: &dyn Engine,
    start: usize,
    end: usize,
    blink: &CursorBlink,
    focused: bool,
    cursor_shape: CursorShape,
    metrics: &CellMetrics,
    sink: &mut dyn DrawSink,
) {
    // Visibility is controlled by escape sequences; the blink phase hides
    // the cursor on alternate ticks.
    if !engine.cursor_visible() || !blink.phase_visible() {
        return;
    }

    let cursor = engine.cursor();
    let absolute_y = engine.base_line() + cursor.row as usize;
    if absolute_y < start || absolute_y >= end {
        return;
    }

    let screen_y = absolute_y - start;
    let rect = Rect {
        x: cursor.col as f64 * metrics.cell_width,
        y: screen_y as f64 * metrics.cell_height,
        width: metrics.cell_width,
        height: metrics.cell_height,
    };
    sink.draw_cursor(rect, cursor_shape, focused);
}
