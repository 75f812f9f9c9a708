//! Terminal front end for rotask using ratatui and crossterm.
//!
//! Implements the session's [`rotask_core::Renderer`] and
//! [`rotask_core::InputSource`] and owns the stimulus bitmaps.

mod input;
pub mod raster;
mod render;
mod stimuli;
mod theme;

pub use input::{InputPump, translate};
pub use raster::{Bitmap, BitmapError, CANONICAL_SIZE, compose_pair};
pub use render::{TerminalRenderer, screen_lines};
pub use stimuli::{LibraryError, StimulusLibrary};
pub use theme::{Palette, palette};
