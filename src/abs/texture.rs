//! Structs and functions for handling textures.
//!
//! The module provides [`Texture2D`], the owner of a GPU texture object, and
//! [`TextureHandle`], a copyable reference to it used by the UI renderer.

use std::path::Path;
use std::sync::Arc;

use glow::HasContext;

use crate::error::{Error, Result};

/// `GL_TEXTURE_MAX_ANISOTROPY(_EXT)`, shared by the extension and GL 4.6.
const TEXTURE_MAX_ANISOTROPY: u32 = 0x84FE;
const MAX_ANISOTROPY: f32 = 16.0;

/// Represents a handle to a texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub glow::Texture);

impl TextureHandle {
    /// Binds the texture handle to the specified texture unit.
    pub fn bind(&self, gl: &glow::Context, unit: u32) {
        unsafe {
            gl.active_texture(glow::TEXTURE0 + unit);
            gl.bind_texture(glow::TEXTURE_2D, Some(self.0));
        }
    }
}

/// What a texture is sampled for in the lighting shaders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKind {
    Diffuse,
    Specular,
}

impl TextureKind {
    /// Stem of the sampler uniform inside the `material` struct.
    pub fn uniform_stem(self) -> &'static str {
        match self {
            TextureKind::Diffuse => "texture_diffuse",
            TextureKind::Specular => "texture_specular",
        }
    }
}

/// Channel layout of uploaded pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Red,
    Rgb,
    Rgba,
}

impl PixelFormat {
    /// Chooses the format for an image with `channels` channels.
    pub fn from_channels(channels: u8) -> Result<Self> {
        match channels {
            1 => Ok(PixelFormat::Red),
            3 => Ok(PixelFormat::Rgb),
            4 => Ok(PixelFormat::Rgba),
            n => Err(Error::UnsupportedChannels(n)),
        }
    }

    pub fn gl_enum(self) -> u32 {
        match self {
            PixelFormat::Red => glow::RED,
            PixelFormat::Rgb => glow::RGB,
            PixelFormat::Rgba => glow::RGBA,
        }
    }
}

/// Decoded pixels ready for upload, rows ordered bottom to top when flipped.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub pixels: Vec<u8>,
}

/// Decodes an image file, keeping 1, 3 and 4 channel layouts and expanding
/// everything else to RGBA.
pub fn decode_image(path: &Path, flip_vertically: bool) -> Result<DecodedImage> {
    let image = image::open(path).map_err(|source| Error::Image {
        path: path.to_path_buf(),
        source,
    })?;
    let image = if flip_vertically { image.flipv() } else { image };
    let (width, height) = (image.width(), image.height());

    let format = match image.color().channel_count() {
        2 => PixelFormat::Rgba,
        n => PixelFormat::from_channels(n)?,
    };
    let pixels = match format {
        PixelFormat::Red => image.into_luma8().into_raw(),
        PixelFormat::Rgb => image.into_rgb8().into_raw(),
        PixelFormat::Rgba => image.into_rgba8().into_raw(),
    };

    Ok(DecodedImage {
        width,
        height,
        format,
        pixels,
    })
}

/// RGBA pixels of a `size`x`size` checkerboard with `cells` cells per side.
pub fn checkerboard_pixels(size: u32, cells: u32, a: [u8; 4], b: [u8; 4]) -> Vec<u8> {
    let cell = (size / cells.max(1)).max(1);
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let color = if (x / cell + y / cell) % 2 == 0 { a } else { b };
            pixels.extend_from_slice(&color);
        }
    }
    pixels
}

/// Sampling and storage parameters applied by [`Texture2D::generate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureConfig {
    /// Format of the texture object.
    pub internal_format: u32,
    /// Format of the uploaded pixels.
    pub image_format: u32,
    pub wrap_s: u32,
    pub wrap_t: u32,
    /// Filter when texels are smaller than screen pixels.
    pub filter_min: u32,
    /// Filter when texels are larger than screen pixels.
    pub filter_mag: u32,
    pub data_type: u32,
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            internal_format: glow::RGB,
            image_format: glow::RGB,
            wrap_s: glow::REPEAT,
            wrap_t: glow::REPEAT,
            filter_min: glow::LINEAR,
            filter_mag: glow::LINEAR,
            data_type: glow::UNSIGNED_BYTE,
        }
    }
}

impl TextureConfig {
    /// Uses `format` for both the texture object and the pixel data.
    pub fn with_format(mut self, format: PixelFormat) -> Self {
        self.internal_format = format.gl_enum();
        self.image_format = format.gl_enum();
        self
    }

    pub fn with_wrap(mut self, wrap: u32) -> Self {
        self.wrap_s = wrap;
        self.wrap_t = wrap;
        self
    }

    pub fn with_filters(mut self, min: u32, mag: u32) -> Self {
        self.filter_min = min;
        self.filter_mag = mag;
        self
    }
}

/// Represents a texture stored on the GPU side.
pub struct Texture2D {
    gl: Arc<glow::Context>,
    id: glow::Texture,
    width: u32,
    height: u32,
    config: TextureConfig,
}

impl Texture2D {
    /// Creates an empty texture object; storage is allocated by [`Texture2D::generate`].
    pub fn new(gl: &Arc<glow::Context>, config: TextureConfig) -> Result<Self> {
        let id = unsafe { gl.create_texture().map_err(Error::GlObject)? };
        Ok(Self {
            gl: Arc::clone(gl),
            id,
            width: 0,
            height: 0,
            config,
        })
    }

    /// Loads an image file and uploads it with mipmaps.
    pub fn from_file(gl: &Arc<glow::Context>, path: &Path, flip_vertically: bool) -> Result<Self> {
        let image = decode_image(path, flip_vertically)?;
        let mut texture = Self::new(gl, TextureConfig::default().with_format(image.format))?;
        texture.generate(image.width, image.height, Some(&image.pixels), true);
        log::trace!(
            "Texture: {} ({}x{}, {:?})",
            path.display(),
            image.width,
            image.height,
            image.format
        );
        Ok(texture)
    }

    /// Creates a texture from raw RGBA data.
    pub fn from_rgba(gl: &Arc<glow::Context>, width: u32, height: u32, data: &[u8]) -> Result<Self> {
        let mut texture = Self::new(gl, TextureConfig::default().with_format(PixelFormat::Rgba))?;
        texture.generate(width, height, Some(data), true);
        Ok(texture)
    }

    /// A two-colour checkerboard, used in place of textures that failed to load.
    pub fn checkerboard(gl: &Arc<glow::Context>, size: u32, cells: u32, a: [u8; 4], b: [u8; 4]) -> Result<Self> {
        let config = TextureConfig::default()
            .with_format(PixelFormat::Rgba)
            .with_filters(glow::NEAREST, glow::NEAREST);
        let mut texture = Self::new(gl, config)?;
        texture.generate(size, size, Some(&checkerboard_pixels(size, cells, a, b)), false);
        Ok(texture)
    }

    /// Allocates storage and uploads `data`, or leaves the contents undefined when `None`.
    pub fn generate(&mut self, width: u32, height: u32, data: Option<&[u8]>, mipmap: bool) {
        self.width = width;
        self.height = height;

        let tight = self.config.image_format != glow::RGBA;
        unsafe {
            let gl = &self.gl;
            gl.bind_texture(glow::TEXTURE_2D, Some(self.id));
            if tight {
                gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            }
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                self.config.internal_format as i32,
                width as i32,
                height as i32,
                0,
                self.config.image_format,
                self.config.data_type,
                glow::PixelUnpackData::Slice(data),
            );
            if tight {
                gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 4);
            }

            if mipmap {
                gl.generate_mipmap(glow::TEXTURE_2D);
                if gl
                    .supported_extensions()
                    .contains("GL_EXT_texture_filter_anisotropic")
                {
                    gl.tex_parameter_f32(glow::TEXTURE_2D, TEXTURE_MAX_ANISOTROPY, MAX_ANISOTROPY);
                }
                self.config.filter_min = glow::LINEAR_MIPMAP_LINEAR;
            }

            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, self.config.wrap_s as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, self.config.wrap_t as i32);
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MIN_FILTER,
                self.config.filter_min as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MAG_FILTER,
                self.config.filter_mag as i32,
            );

            gl.bind_texture(glow::TEXTURE_2D, None);
        }
    }

    /// Binds the texture to the specified texture unit.
    pub fn bind(&self, slot: u32) {
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + slot);
            self.gl.bind_texture(glow::TEXTURE_2D, Some(self.id));
        }
    }

    pub(crate) fn id(&self) -> glow::Texture {
        self.id
    }

    /// Returns a handle to the texture.
    pub fn handle(&self) -> TextureHandle {
        TextureHandle(self.id)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

impl Drop for Texture2D {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_texture(self.id);
        }
    }
}

impl From<&Texture2D> for TextureHandle {
    fn from(texture: &Texture2D) -> Self {
        texture.handle()
    }
}
