//! Material textures.
//!
//! Loads one RGBA image per [`MeshMaterial`] from a texture directory. A texture that
//! fails to load is logged and left out; the material then renders untextured, and
//! the chunk itself is unaffected.

use std::path::{Path, PathBuf};

use image::RgbaImage;
use log::{info, warn};

use crate::engine_state::error::WorldError;

use super::meshing::MeshMaterial;

/// CPU-side texture images, one optional slot per material.
#[derive(Debug, Default)]
pub struct TextureSet {
    images: [Option<RgbaImage>; MeshMaterial::COUNT],
}

impl TextureSet {
    /// A set with no textures at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Loads every material texture from `directory`, logging and skipping the ones
    /// that fail.
    pub fn load(directory: &Path) -> Self {
        let mut set = Self::empty();

        for material in MeshMaterial::ALL {
            match Self::load_material(directory, material) {
                Ok(image) => set.images[material as usize] = Some(image),
                Err(err) => warn!("{material:?} will render without a texture: {err}"),
            }
        }

        info!(
            "Loaded {}/{} material textures from {}",
            set.loaded_count(),
            MeshMaterial::COUNT,
            directory.display()
        );
        set
    }

    /// Loads the texture for a single material.
    pub fn load_material(
        directory: &Path,
        material: MeshMaterial,
    ) -> Result<RgbaImage, WorldError> {
        let path: PathBuf = directory.join(material.texture_file());
        image::open(&path)
            .map(|image| image.to_rgba8())
            .map_err(|source| WorldError::Texture { path, source })
    }

    /// Replaces the image of one material.
    pub fn insert(&mut self, material: MeshMaterial, image: RgbaImage) {
        self.images[material as usize] = Some(image);
    }

    /// The image for `material`, if it loaded.
    pub fn get(&self, material: MeshMaterial) -> Option<&RgbaImage> {
        self.images[material as usize].as_ref()
    }

    /// Number of materials that have an image.
    pub fn loaded_count(&self) -> usize {
        self.images.iter().filter(|image| image.is_some()).count()
    }
}
