//! Asset requests and the catalog handed to scenes after loading.
//!
//! Scenes list what they need in `Scene::preload`. The host resolves the
//! requests (reading files, decoding images, falling back to a generated
//! placeholder when an image is missing) and passes the resulting catalog to
//! `Scene::create`. Scenes never touch the filesystem themselves.

use std::collections::HashMap;

use crate::scene::SceneError;

#[derive(Debug, Clone, PartialEq)]
pub struct AssetRequest {
    pub key: &'static str,
    pub kind: AssetKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AssetKind {
    /// Image file, replaced by `fallback` when it cannot be loaded.
    Image { path: String, fallback: Placeholder },
    /// Always-generated texture with no backing file.
    Generated(Placeholder),
    /// UTF-8 text file. Missing text is fatal.
    Text { path: String },
}

impl AssetRequest {
    pub fn image(key: &'static str, path: impl Into<String>, fallback: Placeholder) -> Self {
        Self {
            key,
            kind: AssetKind::Image {
                path: path.into(),
                fallback,
            },
        }
    }

    pub fn generated(key: &'static str, placeholder: Placeholder) -> Self {
        Self {
            key,
            kind: AssetKind::Generated(placeholder),
        }
    }

    pub fn text(key: &'static str, path: impl Into<String>) -> Self {
        Self {
            key,
            kind: AssetKind::Text { path: path.into() },
        }
    }
}

/// Solid-colour texture used in place of missing art.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder {
    pub width: u32,
    pub height: u32,
    pub rgba: [u8; 4],
}

impl Placeholder {
    pub const fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self {
            width,
            height,
            rgba,
        }
    }

    pub fn generate(&self) -> LoadedImage {
        let pixel_count = (self.width as usize) * (self.height as usize);
        let mut pixels = Vec::with_capacity(pixel_count * 4);
        for _ in 0..pixel_count {
            pixels.extend_from_slice(&self.rgba);
        }
        LoadedImage {
            width: self.width,
            height: self.height,
            pixels,
            origin: AssetOrigin::Placeholder,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetOrigin {
    File,
    Placeholder,
}

/// Decoded RGBA8 image.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
    pub origin: AssetOrigin,
}

#[derive(Debug, Clone, Default)]
pub struct AssetCatalog {
    images: HashMap<&'static str, LoadedImage>,
    texts: HashMap<&'static str, String>,
}

impl AssetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_image(&mut self, key: &'static str, image: LoadedImage) {
        self.images.insert(key, image);
    }

    pub fn insert_text(&mut self, key: &'static str, text: String) {
        self.texts.insert(key, text);
    }

    pub fn image(&self, key: &str) -> Result<&LoadedImage, SceneError> {
        self.images
            .get(key)
            .ok_or_else(|| SceneError::MissingAsset(key.to_string()))
    }

    pub fn text(&self, key: &str) -> Result<&str, SceneError> {
        self.texts
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| SceneError::MissingAsset(key.to_string()))
    }

    pub fn images(&self) -> impl Iterator<Item = (&'static str, &LoadedImage)> {
        self.images.iter().map(|(k, v)| (*k, v))
    }

    pub fn placeholder_count(&self) -> usize {
        self.images
            .values()
            .filter(|img| img.origin == AssetOrigin::Placeholder)
            .count()
    }
}
