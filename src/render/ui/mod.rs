//! All UI related utilities.
//!
//! The overlay is drawn through [`UIRenderer`], which batches textured and
//! solid quads, with text from the built-in [`BitmapFont`].

pub mod font;
pub mod overlay;
pub mod renderer;

pub use font::*;
pub use overlay::*;
pub use renderer::*;
