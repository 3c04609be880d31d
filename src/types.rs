//! Core types for spark-cv.
//!
//! These are the values the terminal renderer understands: colors, text
//! attributes and the cell grid they are painted into.

use crossterm::style::Color;

// =============================================================================
// Color
// =============================================================================

/// RGBA color with 8-bit channels (0-255).
///
/// Special value: r=-1 means "terminal default" (let terminal pick).
/// Special value: r=-2 means "ANSI palette index stored in g".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgba {
    pub r: i16,
    pub g: i16,
    pub b: i16,
    pub a: i16,
}

impl Rgba {
    /// Create a new RGBA color.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r: r as i16,
            g: g as i16,
            b: b as i16,
            a: a as i16,
        }
    }

    /// Create an opaque RGB color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Terminal default color (let terminal decide).
    pub const TERMINAL_DEFAULT: Self = Self {
        r: -1,
        g: -1,
        b: -1,
        a: -1,
    };

    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const RED: Self = Self::rgb(224, 108, 117);
    pub const YELLOW: Self = Self::rgb(229, 192, 123);
    pub const CYAN: Self = Self::rgb(86, 182, 194);
    pub const BLUE: Self = Self::rgb(97, 175, 239);
    pub const GRAY: Self = Self::rgb(128, 128, 128);

    /// Create an ANSI palette color (0-255).
    pub const fn ansi(index: u8) -> Self {
        Self {
            r: -2,
            g: index as i16,
            b: 0,
            a: 255,
        }
    }

    /// Check if this is the terminal default color.
    #[inline]
    pub const fn is_terminal_default(&self) -> bool {
        self.r == -1
    }

    /// Check if this is an ANSI palette color.
    #[inline]
    pub const fn is_ansi(&self) -> bool {
        self.r == -2
    }

    /// Convert to the crossterm color used for output.
    pub fn to_crossterm(self) -> Color {
        if self.is_terminal_default() {
            Color::Reset
        } else if self.is_ansi() {
            Color::AnsiValue(self.g as u8)
        } else {
            Color::Rgb {
                r: self.r.clamp(0, 255) as u8,
                g: self.g.clamp(0, 255) as u8,
                b: self.b.clamp(0, 255) as u8,
            }
        }
    }
}

// =============================================================================
// Cell Attributes (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Text attributes as a bitfield for efficient storage and comparison.
    ///
    /// Combine with bitwise OR: `Attr::BOLD | Attr::ITALIC`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Attr: u8 {
        const NONE = 0;
        const BOLD = 1 << 0;
        const DIM = 1 << 1;
        const ITALIC = 1 << 2;
        const UNDERLINE = 1 << 3;
        const INVERSE = 1 << 5;
    }
}

// =============================================================================
// Cell - The atomic unit of terminal rendering
// =============================================================================

/// Marker stored in the cell that follows a double-width character.
pub const CONTINUATION: char = '\0';

/// A single terminal cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// Character shown in this cell (space when empty).
    pub char: char,
    /// Foreground color.
    pub fg: Rgba,
    /// Attribute flags (bold, italic, etc.).
    pub attrs: Attr,
}

impl Cell {
    pub const fn styled(char: char, fg: Rgba, attrs: Attr) -> Self {
        Self { char, fg, attrs }
    }

    /// Whether this cell is the right half of a wide character.
    #[inline]
    pub fn is_continuation(&self) -> bool {
        self.char == CONTINUATION
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            char: ' ',
            fg: Rgba::TERMINAL_DEFAULT,
            attrs: Attr::NONE,
        }
    }
}

/// Text style applied while flowing document content into cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub fg: Rgba,
    pub attrs: Attr,
}

impl Style {
    pub const PLAIN: Self = Self {
        fg: Rgba::TERMINAL_DEFAULT,
        attrs: Attr::NONE,
    };

    pub const fn new(fg: Rgba, attrs: Attr) -> Self {
        Self { fg, attrs }
    }

    /// Layer `other` on top of this style; colors override, attributes merge.
    pub fn merge(self, other: Style) -> Style {
        Style {
            fg: if other.fg.is_terminal_default() {
                self.fg
            } else {
                other.fg
            },
            attrs: self.attrs | other.attrs,
        }
    }
}

impl Default for Style {
    fn default() -> Self {
        Self::PLAIN
    }
}
