//! Module for anything related to rendering.
//!
//! Vertex formats, geometry, lights, models, shaders and the UI overlay.

pub mod lighting;
pub mod model;
pub mod primitives;
pub mod shaders;
pub mod ui;
pub mod vertex;

pub use vertex::*;
