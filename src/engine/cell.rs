//! Cell and line vocabulary shared between the terminal engine and the renderer.
//!
//! The engine collaborator owns the buffer contents; this module defines the
//! shapes it exposes them through: styled cells, line attributes for
//! double-width/double-height rows, and the per-line run cache with its
//! dirty flag.

use bitflags::bitflags;
use unicode_width::UnicodeWidthChar;

use crate::view::segment::TextRun;

/// Color of a cell foreground or background.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Color {
    /// Host default (resolved by the draw sink's palette)
    #[default]
    Default,
    /// 256-color palette index
    Indexed(u8),
    /// 24-bit color
    Rgb(u8, u8, u8),
}

bitflags! {
    /// Style attributes of a cell.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct AttrFlags: u16 {
        const BOLD          = 0b0000_0000_0001;
        const DIM           = 0b0000_0000_0010;
        const ITALIC        = 0b0000_0000_0100;
        const UNDERLINE     = 0b0000_0000_1000;
        const BLINK         = 0b0000_0001_0000;
        const INVERSE       = 0b0000_0010_0000;
        const HIDDEN        = 0b0000_0100_0000;
        const STRIKETHROUGH = 0b0000_1000_0000;
    }
}

/// Full style of a cell. Run segmentation keys on attribute identity, so the
/// inverse/blink color swap happens at draw time, not here.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CellAttrs {
    pub fg: Color,
    pub bg: Color,
    pub flags: AttrFlags,
}

impl CellAttrs {
    /// Resolve the colors to draw with, applying the inverse swap and the
    /// blink-phase swap after run construction.
    pub fn resolved(&self, blink_phase_on: bool) -> (Color, Color) {
        let mut fg = self.fg;
        let mut bg = self.bg;
        if self.flags.contains(AttrFlags::INVERSE) {
            std::mem::swap(&mut fg, &mut bg);
        }
        if self.flags.contains(AttrFlags::BLINK) && blink_phase_on {
            std::mem::swap(&mut fg, &mut bg);
        }
        (fg, bg)
    }
}

/// A single buffer cell.
///
/// A double-width character occupies two columns: the cell holding the
/// glyph has `width == 2` and is followed by an empty placeholder cell with
/// `width == 0`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    pub width: u8,
    pub attrs: CellAttrs,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            text: String::new(),
            width: 1,
            attrs: CellAttrs::default(),
        }
    }
}

impl Cell {
    /// Build a cell from a character, computing its display width.
    pub fn from_char(ch: char, attrs: CellAttrs) -> Self {
        Self {
            text: ch.to_string(),
            width: ch.width().unwrap_or(0) as u8,
            attrs,
        }
    }

    /// The empty cell that trails a double-width character.
    pub fn placeholder(attrs: CellAttrs) -> Self {
        Self {
            text: String::new(),
            width: 0,
            attrs,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.width == 0
    }

    /// Display text (space if empty).
    pub fn display(&self) -> &str {
        if self.text.is_empty() {
            " "
        } else {
            &self.text
        }
    }
}

/// Per-line size attribute (DECDWL/DECDHL).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineAttr {
    #[default]
    Single,
    DoubleWidth,
    DoubleHeightTop,
    DoubleHeightBottom,
}

impl LineAttr {
    pub fn is_double(&self) -> bool {
        !matches!(self, LineAttr::Single)
    }

    pub fn is_double_height(&self) -> bool {
        matches!(self, LineAttr::DoubleHeightTop | LineAttr::DoubleHeightBottom)
    }
}

/// A buffer line with its cached render runs.
///
/// The cache is guarded by an explicit `dirty` flag: every mutation marks the
/// line dirty, and the renderer rebuilds runs only for dirty lines. Lines
/// with a double-width/double-height attribute are never cached.
#[derive(Clone, Debug)]
pub struct Line {
    cells: Vec<Cell>,
    attr: LineAttr,
    dirty: bool,
    runs: Vec<TextRun>,
}

impl Line {
    pub fn new(cols: u16) -> Self {
        Self {
            cells: vec![Cell::default(); cols as usize],
            attr: LineAttr::Single,
            dirty: true,
            runs: Vec::new(),
        }
    }

    pub fn from_cells(cells: Vec<Cell>) -> Self {
        Self {
            cells,
            attr: LineAttr::Single,
            dirty: true,
            runs: Vec::new(),
        }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, x: usize) -> Option<&Cell> {
        self.cells.get(x)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn attr(&self) -> LineAttr {
        self.attr
    }

    pub fn set_attr(&mut self, attr: LineAttr) {
        if self.attr != attr {
            self.attr = attr;
            self.touch();
        }
    }

    /// Replace a cell, invalidating the run cache.
    pub fn set_cell(&mut self, x: usize, cell: Cell) {
        if let Some(slot) = self.cells.get_mut(x) {
            *slot = cell;
            self.touch();
        }
    }

    pub fn resize(&mut self, cols: u16) {
        self.cells.resize(cols as usize, Cell::default());
        self.touch();
    }

    /// Mark the line as changed; the next render rebuilds its runs.
    pub fn touch(&mut self) {
        self.dirty = true;
        self.runs.clear();
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Cached runs, valid only when the line is clean and single-width.
    pub fn cached_runs(&self) -> Option<&[TextRun]> {
        if self.dirty || self.attr.is_double() {
            None
        } else {
            Some(&self.runs)
        }
    }

    /// Store freshly built runs and clear the dirty flag. No-op for
    /// double-width/double-height lines, which are rebuilt every frame.
    pub fn cache_runs(&mut self, runs: Vec<TextRun>) {
        if self.attr.is_double() {
            return;
        }
        self.runs = runs;
        self.dirty = false;
    }

    /// Whether any cell carries the blink attribute. Blinking lines are
    /// re-segmented on each blink tick.
    pub fn has_blink(&self) -> bool {
        self.cells
            .iter()
            .any(|c| c.attrs.flags.contains(AttrFlags::BLINK))
    }
}

/// Cursor shape requested by the host or the application (DECSCUSR).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CursorShape {
    Block,
    Underline,
    #[default]
    Bar,
}

impl CursorShape {
    /// Parse a config value, falling back to the default shape.
    pub fn by_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "block" => CursorShape::Block,
            "underline" => CursorShape::Underline,
            "bar" => CursorShape::Bar,
            _ => CursorShape::default(),
        }
    }
}

/// Cursor position relative to the active screen area.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CursorPos {
    pub col: u16,
    pub row: u16,
}
