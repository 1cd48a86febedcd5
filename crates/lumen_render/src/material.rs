//! Per-instance material colours and the textures a variant samples

use crate::error::{RenderError, Result};
use glam::Vec3;
use lumen_gpu::TextureHandle;
use lumen_shader::{MaterialConstants, ShaderConfig, TextureChannel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Phong material written to `uMaterial` for each draw
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self::from(MaterialConstants::default())
    }
}

impl Material {
    /// Material with one base colour driving ambient and diffuse
    pub fn colored(color: Vec3) -> Self {
        Self {
            ambient: color * 0.1,
            diffuse: color,
            ..Default::default()
        }
    }

    pub fn with_specular(mut self, specular: Vec3, shininess: f32) -> Self {
        self.specular = specular;
        self.shininess = shininess;
        self
    }
}

impl From<MaterialConstants> for Material {
    fn from(constants: MaterialConstants) -> Self {
        Self {
            ambient: Vec3::from(constants.ambient),
            diffuse: Vec3::from(constants.diffuse),
            specular: Vec3::from(constants.specular),
            shininess: constants.shininess,
        }
    }
}

impl From<Material> for MaterialConstants {
    fn from(material: Material) -> Self {
        Self {
            ambient: material.ambient.to_array(),
            diffuse: material.diffuse.to_array(),
            specular: material.specular.to_array(),
            shininess: material.shininess,
        }
    }
}

/// Texture bound to each texture-stack layer of a variant
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MaterialTextures {
    layers: BTreeMap<(TextureChannel, usize), TextureHandle>,
}

impl MaterialTextures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, channel: TextureChannel, layer: usize, texture: TextureHandle) -> Self {
        self.insert(channel, layer, texture);
        self
    }

    pub fn insert(&mut self, channel: TextureChannel, layer: usize, texture: TextureHandle) {
        self.layers.insert((channel, layer), texture);
    }

    pub fn get(&self, channel: TextureChannel, layer: usize) -> Option<TextureHandle> {
        self.layers.get(&(channel, layer)).copied()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Textures in sampling order for `config`, failing on the first gap
    pub(crate) fn resolve(&self, config: &ShaderConfig) -> Result<Vec<TextureHandle>> {
        config
            .textures
            .layers()
            .map(|(channel, layer, _)| {
                self.get(channel, layer)
                    .ok_or(RenderError::MissingTexture { channel, layer })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_shader::{BlendOp, TextureLayer};

    #[test]
    fn test_default_matches_shader_constants() {
        let material = Material::default();
        let constants = MaterialConstants::from(material);
        assert_eq!(constants, MaterialConstants::default());
    }

    #[test]
    fn test_resolve_reports_missing_layer() {
        let config = ShaderConfig::new()
            .with_layer(TextureChannel::Diffuse, TextureLayer::new(BlendOp::Multiply))
            .with_layer(TextureChannel::Diffuse, TextureLayer::new(BlendOp::Add));
        let textures = MaterialTextures::new().with(TextureChannel::Diffuse, 0, TextureHandle::from_raw(7));

        match textures.resolve(&config) {
            Err(RenderError::MissingTexture { channel, layer }) => {
                assert_eq!(channel, TextureChannel::Diffuse);
                assert_eq!(layer, 1);
            }
            other => panic!("expected missing texture, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_orders_by_channel() {
        let config = ShaderConfig::new()
            .with_layer(TextureChannel::Specular, TextureLayer::new(BlendOp::Multiply))
            .with_layer(TextureChannel::Ambient, TextureLayer::new(BlendOp::Multiply));
        let textures = MaterialTextures::new()
            .with(TextureChannel::Specular, 0, TextureHandle::from_raw(2))
            .with(TextureChannel::Ambient, 0, TextureHandle::from_raw(1));

        let resolved = textures.resolve(&config).unwrap();
        assert_eq!(resolved, vec![TextureHandle::from_raw(1), TextureHandle::from_raw(2)]);
    }
}
