//! Thin owning wrappers around OpenGL objects.
//!
//! Every wrapper keeps an `Arc<glow::Context>` next to its handle and deletes the
//! handle when dropped, so GPU objects live exactly as long as their Rust owner.

pub mod app;
pub mod buffer;
pub mod framebuffer;
pub mod mesh;
pub mod shader;
pub mod texture;
pub mod vertex_array;

pub use app::*;
pub use buffer::*;
pub use framebuffer::*;
pub use mesh::*;
pub use shader::*;
pub use texture::*;
pub use vertex_array::*;
