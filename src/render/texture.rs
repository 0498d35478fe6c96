//! Texture handles and sampling properties
//!
//! A [`Texture`] is a copyable handle plus cached metadata; the pixels live
//! in the asset cache under the handle's id. [`TextureProperties`] describe
//! how a texture wants to be sampled and come in the four stock presets
//! most assets use.

use crate::INVALID_ID;

/// Handle to a texture in the asset cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

impl TextureId {
    /// Handle that never resolves to a texture.
    pub const INVALID: Self = Self(INVALID_ID);
}

/// Pixel layout of the decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextureFormat {
    /// 8-bit RGB, three bytes per pixel
    Rgb8,
    /// 8-bit RGBA, four bytes per pixel
    #[default]
    Rgba8,
}

impl TextureFormat {
    /// Bytes per pixel for this format.
    #[must_use]
    pub const fn channels(self) -> u32 {
        match self {
            Self::Rgb8 => 3,
            Self::Rgba8 => 4,
        }
    }
}

/// Texture filtering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    #[default]
    Linear,
    Nearest,
}

/// Texture coordinate wrapping mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapMode {
    #[default]
    MirroredRepeat,
    Repeat,
    ClampToEdge,
}

/// How a texture is stored and sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureProperties {
    pub format: TextureFormat,
    pub min_filter: FilterMode,
    pub mag_filter: FilterMode,
    pub wrap_mode: WrapMode,
    /// Flip rows on load so v grows upward
    pub flip_vertically: bool,
}

impl TextureProperties {
    /// RGBA with linear filtering. The default for most assets.
    #[must_use]
    pub const fn rgba_linear() -> Self {
        Self {
            format: TextureFormat::Rgba8,
            min_filter: FilterMode::Linear,
            mag_filter: FilterMode::Linear,
            wrap_mode: WrapMode::MirroredRepeat,
            flip_vertically: true,
        }
    }

    /// RGBA with nearest filtering, for pixel art.
    #[must_use]
    pub const fn rgba_nearest() -> Self {
        Self {
            min_filter: FilterMode::Nearest,
            mag_filter: FilterMode::Nearest,
            ..Self::rgba_linear()
        }
    }

    /// RGB with linear filtering.
    #[must_use]
    pub const fn rgb_linear() -> Self {
        Self {
            format: TextureFormat::Rgb8,
            ..Self::rgba_linear()
        }
    }

    /// RGB with nearest filtering.
    #[must_use]
    pub const fn rgb_nearest() -> Self {
        Self {
            format: TextureFormat::Rgb8,
            ..Self::rgba_nearest()
        }
    }
}

impl Default for TextureProperties {
    fn default() -> Self {
        Self::rgba_linear()
    }
}

/// Copyable texture handle with cached metadata.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Texture {
    pub id: TextureId,
    pub width: u32,
    pub height: u32,
    pub properties: TextureProperties,
}

impl Texture {
    #[must_use]
    pub fn new(id: TextureId, width: u32, height: u32, properties: TextureProperties) -> Self {
        Self {
            id,
            width,
            height,
            properties,
        }
    }

    /// True when the handle points at an actual texture.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.id != TextureId::INVALID
    }
}

impl Default for Texture {
    fn default() -> Self {
        Self {
            id: TextureId::INVALID,
            width: 0,
            height: 0,
            properties: TextureProperties::default(),
        }
    }
}

/// Why a texture failed to load.
#[derive(Debug)]
pub enum TextureError {
    /// The image file could not be read
    Io(std::io::Error),
    /// The bytes are not a decodable image
    Decode(String),
}

impl From<std::io::Error> for TextureError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl std::fmt::Display for TextureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "texture file error: {e}"),
            Self::Decode(e) => write!(f, "texture decode error: {e}"),
        }
    }
}

impl std::error::Error for TextureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Decode(_) => None,
        }
    }
}
