use std::collections::HashMap;
use std::path::{Path, PathBuf};

use ab_glyph::FontArc;
use image::RgbaImage;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to parse font {path}: {source}")]
    Font {
        path: PathBuf,
        #[source]
        source: ab_glyph::InvalidFont,
    },
}

/// Decoded RGBA pixels. An empty texture is the placeholder for a failed load.
#[derive(Debug, Clone, Default)]
pub struct Texture {
    image: RgbaImage,
}

impl Texture {
    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn pixels(&self) -> &[u8] {
        self.image.as_raw()
    }
}

/// A parsed font, or nothing when loading failed.
#[derive(Clone, Default)]
pub struct Font {
    inner: Option<FontArc>,
}

impl Font {
    pub fn from_font(font: FontArc) -> Self {
        Self { inner: Some(font) }
    }

    pub fn get(&self) -> Option<&FontArc> {
        self.inner.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_none()
    }
}

impl std::fmt::Debug for Font {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Font")
            .field("loaded", &self.inner.is_some())
            .finish()
    }
}

pub fn load_texture(path: impl AsRef<Path>) -> Result<Texture, AssetError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let image = image::load_from_memory(&bytes).map_err(|source| AssetError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Texture::from_image(image.to_rgba8()))
}

pub fn load_font(path: impl AsRef<Path>) -> Result<Font, AssetError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let font = FontArc::try_from_vec(bytes).map_err(|source| AssetError::Font {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Font::from_font(font))
}

/// Named textures and fonts. Failed loads are logged once and stored as placeholders.
#[derive(Default, Debug)]
pub struct ResourceManager {
    textures: HashMap<String, Texture>,
    fonts: HashMap<String, Font>,
}

impl ResourceManager {
    pub fn register_texture(&mut self, key: impl Into<String>, path: impl AsRef<Path>) -> bool {
        let key = key.into();
        let path = path.as_ref();
        let texture = match load_texture(path) {
            Ok(texture) => {
                tracing::debug!(%key, width = texture.width(), height = texture.height(), "registered texture");
                texture
            }
            Err(err) => {
                tracing::error!(%key, %err, "texture unavailable, using placeholder");
                Texture::default()
            }
        };
        let loaded = !texture.is_empty();
        self.textures.insert(key, texture);
        loaded
    }

    pub fn register_font(&mut self, key: impl Into<String>, path: impl AsRef<Path>) -> bool {
        let key = key.into();
        let font = match load_font(path) {
            Ok(font) => {
                tracing::debug!(%key, "registered font");
                font
            }
            Err(err) => {
                tracing::error!(%key, %err, "font unavailable, using placeholder");
                Font::default()
            }
        };
        let loaded = !font.is_empty();
        self.fonts.insert(key, font);
        loaded
    }

    pub fn texture(&self, key: &str) -> Option<&Texture> {
        self.textures.get(key)
    }

    pub fn font(&self, key: &str) -> Option<&Font> {
        self.fonts.get(key)
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    pub fn font_count(&self) -> usize {
        self.fonts.len()
    }
}
