//! Monochrome bitmaps and the transforms a trial applies to them.
//!
//! Rotation is counter-clockwise as seen on screen and expands the bounding
//! box so no filled cell is clipped. Sampling is nearest-neighbour.

use std::fmt;

use thiserror::Error;

use rotask_core::Presentation;
use rotask_types::Angle;

/// Side length every stimulus is scaled to before it is transformed.
pub const CANONICAL_SIZE: usize = 12;

const FILLED: char = '#';
const EMPTY: char = '.';

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BitmapError {
    #[error("bitmap has no rows")]
    Empty,
    #[error("row {row} is {found} cells wide, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unexpected character {found:?} in row {row}; use '#' or '.'")]
    InvalidCell { row: usize, found: char },
}

#[derive(Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl Bitmap {
    #[must_use]
    pub fn blank(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![false; width * height],
        }
    }

    /// Build from rows of `#` (filled) and `.` (empty).
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, BitmapError> {
        let Some(first) = rows.first() else {
            return Err(BitmapError::Empty);
        };
        let width = first.as_ref().chars().count();
        if width == 0 {
            return Err(BitmapError::Empty);
        }

        let mut cells = Vec::with_capacity(width * rows.len());
        for (row, line) in rows.iter().enumerate() {
            let line = line.as_ref();
            let found = line.chars().count();
            if found != width {
                return Err(BitmapError::Ragged {
                    row,
                    expected: width,
                    found,
                });
            }
            for c in line.chars() {
                match c {
                    FILLED => cells.push(true),
                    EMPTY => cells.push(false),
                    found => return Err(BitmapError::InvalidCell { row, found }),
                }
            }
        }

        Ok(Self {
            width,
            height: rows.len(),
            cells,
        })
    }

    /// Parse a text file body. Blank lines and trailing whitespace are ignored.
    pub fn parse(text: &str) -> Result<Self, BitmapError> {
        let rows: Vec<&str> = text
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .collect();
        Self::from_rows(&rows)
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.cells[y * self.width + x]
    }

    fn set(&mut self, x: usize, y: usize, filled: bool) {
        self.cells[y * self.width + x] = filled;
    }

    #[must_use]
    pub fn filled(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Mirror image about the vertical axis.
    #[must_use]
    pub fn flipped_horizontal(&self) -> Self {
        let mut out = Self::blank(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                out.set(self.width - 1 - x, y, self.get(x, y));
            }
        }
        out
    }

    #[must_use]
    pub fn rotated(&self, angle: Angle) -> Self {
        match angle.degrees() {
            0 => self.clone(),
            90 => self.quarter_turns(1),
            180 => self.quarter_turns(2),
            270 => self.quarter_turns(3),
            degrees => self.rotated_arbitrary(f64::from(degrees)),
        }
    }

    /// Exact counter-clockwise quarter turns.
    fn quarter_turns(&self, turns: u8) -> Self {
        let (w, h) = (self.width, self.height);
        let mut out = match turns {
            2 => Self::blank(w, h),
            _ => Self::blank(h, w),
        };
        for y in 0..h {
            for x in 0..w {
                let (nx, ny) = match turns {
                    1 => (y, w - 1 - x),
                    2 => (w - 1 - x, h - 1 - y),
                    _ => (h - 1 - y, x),
                };
                out.set(nx, ny, self.get(x, y));
            }
        }
        out
    }

    fn rotated_arbitrary(&self, degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        let (w, h) = (self.width as f64, self.height as f64);
        let out_w = (w * cos.abs() + h * sin.abs() - 1e-9).ceil() as usize;
        let out_h = (w * sin.abs() + h * cos.abs() - 1e-9).ceil() as usize;
        let mut out = Self::blank(out_w, out_h);

        // Inverse-map each output cell centre back into the source. Screen y
        // grows downwards, which flips the sign of the sine terms.
        for oy in 0..out_h {
            for ox in 0..out_w {
                let dx = ox as f64 + 0.5 - out_w as f64 / 2.0;
                let dy = oy as f64 + 0.5 - out_h as f64 / 2.0;
                let sx = dx * cos - dy * sin + w / 2.0;
                let sy = dx * sin + dy * cos + h / 2.0;
                if sx >= 0.0 && sy >= 0.0 && sx < w && sy < h {
                    out.set(ox, oy, self.get(sx as usize, sy as usize));
                }
            }
        }
        out
    }

    /// Nearest-neighbour resample to `width` x `height`.
    #[must_use]
    pub fn scaled_to(&self, width: usize, height: usize) -> Self {
        if width == self.width && height == self.height {
            return self.clone();
        }
        let mut out = Self::blank(width, height);
        for y in 0..height {
            for x in 0..width {
                let sx = x * self.width / width;
                let sy = y * self.height / height;
                out.set(x, y, self.get(sx, sy));
            }
        }
        out
    }

    /// One string per row, `on`/`off` per cell.
    #[must_use]
    pub fn rows(&self, on: &str, off: &str) -> Vec<String> {
        (0..self.height)
            .map(|y| {
                (0..self.width)
                    .map(|x| if self.get(x, y) { on } else { off })
                    .collect()
            })
            .collect()
    }
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Bitmap {}x{}", self.width, self.height)?;
        for row in self.rows("#", ".") {
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rows("#", ".").join("\n"))
    }
}

/// Left and right images for a trial.
///
/// Left is the canonical stimulus rotated by the baseline. Right is the
/// stimulus flipped first (when mirrored) and then rotated by baseline plus
/// the trial angle.
#[must_use]
pub fn compose_pair(stimulus: &Bitmap, presentation: &Presentation) -> (Bitmap, Bitmap) {
    let canonical = stimulus.scaled_to(CANONICAL_SIZE, CANONICAL_SIZE);
    let left = canonical.rotated(presentation.left_rotation());
    let right = if presentation.mirror {
        canonical.flipped_horizontal()
    } else {
        canonical
    };
    let right = right.rotated(presentation.right_rotation());
    (left, right)
}
