//! Declarative description of one shader variant

use crate::error::{Result, ShaderError};
use serde::{Deserialize, Serialize};

/// Upper bound on point lights a variant may declare
pub const MAX_POINT_LIGHTS: u32 = 8;
/// Upper bound on spot lights a variant may declare
pub const MAX_SPOT_LIGHTS: u32 = 8;
/// Upper bound on UV sets a variant may sample
pub const MAX_UV_CHANNELS: u32 = 4;
/// Upper bound on layers in one texture stack
pub const MAX_STACK_LAYERS: usize = 4;

/// Which lights the shader handles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct LightLayout {
    pub directional: bool,
    pub point_count: u32,
    pub spot_count: u32,
}

impl LightLayout {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_directional(mut self, enabled: bool) -> Self {
        self.directional = enabled;
        self
    }

    pub fn with_points(mut self, count: u32) -> Self {
        self.point_count = count;
        self
    }

    pub fn with_spots(mut self, count: u32) -> Self {
        self.spot_count = count;
        self
    }

    pub fn is_empty(&self) -> bool {
        !self.directional && self.point_count == 0 && self.spot_count == 0
    }
}

/// Specular term
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShadingModel {
    /// Reflected light direction against the view direction
    Phong,
    /// Half vector against the normal
    #[default]
    BlinnPhong,
}

/// Constant colours of a material
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialConstants {
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub shininess: f32,
}

impl Default for MaterialConstants {
    fn default() -> Self {
        Self {
            ambient: [0.1, 0.1, 0.1],
            diffuse: [0.8, 0.8, 0.8],
            specular: [0.5, 0.5, 0.5],
            shininess: 32.0,
        }
    }
}

/// Where the shader reads material colours from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum MaterialSource {
    /// `uniform Material`, written per draw
    Uniform,
    /// Compiled into the program as a constant
    Baked(MaterialConstants),
}

impl Default for MaterialSource {
    fn default() -> Self {
        Self::Uniform
    }
}

/// How a texture layer folds into the running channel colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendOp {
    Multiply,
    Add,
    Subtract,
    Divide,
    /// `(a + b) - a * b`
    SmoothAdd,
    /// `a + (b - 0.5)`
    SignedAdd,
}

/// One texture in a channel stack
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextureLayer {
    /// Scales the sampled texel before blending
    pub blend_factor: f32,
    pub op: BlendOp,
    pub uv_channel: u32,
}

impl TextureLayer {
    pub fn new(op: BlendOp) -> Self {
        Self {
            blend_factor: 1.0,
            op,
            uv_channel: 0,
        }
    }

    pub fn with_factor(mut self, factor: f32) -> Self {
        self.blend_factor = factor;
        self
    }

    pub fn with_uv_channel(mut self, channel: u32) -> Self {
        self.uv_channel = channel;
        self
    }
}

/// Material channel a texture stack feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureChannel {
    Ambient,
    Diffuse,
    Specular,
    Normal,
    Lightmap,
}

impl TextureChannel {
    pub const ALL: [TextureChannel; 5] = [
        TextureChannel::Ambient,
        TextureChannel::Diffuse,
        TextureChannel::Specular,
        TextureChannel::Normal,
        TextureChannel::Lightmap,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TextureChannel::Ambient => "ambient",
            TextureChannel::Diffuse => "diffuse",
            TextureChannel::Specular => "specular",
            TextureChannel::Normal => "normal",
            TextureChannel::Lightmap => "lightmap",
        }
    }

    /// Identifier fragment used in generated names
    pub fn ident(self) -> &'static str {
        match self {
            TextureChannel::Ambient => "Ambient",
            TextureChannel::Diffuse => "Diffuse",
            TextureChannel::Specular => "Specular",
            TextureChannel::Normal => "Normal",
            TextureChannel::Lightmap => "Lightmap",
        }
    }
}

/// Ordered texture stacks per material channel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureStacks {
    pub ambient: Vec<TextureLayer>,
    pub diffuse: Vec<TextureLayer>,
    pub specular: Vec<TextureLayer>,
    pub normal: Vec<TextureLayer>,
    pub lightmap: Vec<TextureLayer>,
}

impl TextureStacks {
    pub fn get(&self, channel: TextureChannel) -> &[TextureLayer] {
        match channel {
            TextureChannel::Ambient => &self.ambient,
            TextureChannel::Diffuse => &self.diffuse,
            TextureChannel::Specular => &self.specular,
            TextureChannel::Normal => &self.normal,
            TextureChannel::Lightmap => &self.lightmap,
        }
    }

    pub fn get_mut(&mut self, channel: TextureChannel) -> &mut Vec<TextureLayer> {
        match channel {
            TextureChannel::Ambient => &mut self.ambient,
            TextureChannel::Diffuse => &mut self.diffuse,
            TextureChannel::Specular => &mut self.specular,
            TextureChannel::Normal => &mut self.normal,
            TextureChannel::Lightmap => &mut self.lightmap,
        }
    }

    /// Every layer with its channel, in channel order
    pub fn layers(&self) -> impl Iterator<Item = (TextureChannel, usize, &TextureLayer)> {
        TextureChannel::ALL.into_iter().flat_map(move |channel| {
            self.get(channel)
                .iter()
                .enumerate()
                .map(move |(index, layer)| (channel, index, layer))
        })
    }

    pub fn total_layers(&self) -> usize {
        TextureChannel::ALL.iter().map(|&c| self.get(c).len()).sum()
    }
}

/// Complete variant description. Equal configurations generate identical source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderConfig {
    pub lights: LightLayout,
    pub textures: TextureStacks,
    pub shading: ShadingModel,
    pub material: MaterialSource,
    pub shadows: bool,
}

impl ShaderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lights(mut self, lights: LightLayout) -> Self {
        self.lights = lights;
        self
    }

    pub fn with_shading(mut self, shading: ShadingModel) -> Self {
        self.shading = shading;
        self
    }

    pub fn with_material(mut self, material: MaterialSource) -> Self {
        self.material = material;
        self
    }

    pub fn with_shadows(mut self, enabled: bool) -> Self {
        self.shadows = enabled;
        self
    }

    /// Append a layer to a channel stack
    pub fn with_layer(mut self, channel: TextureChannel, layer: TextureLayer) -> Self {
        self.textures.get_mut(channel).push(layer);
        self
    }

    /// Number of UV sets the vertex stage forwards: highest referenced channel + 1.
    /// Untextured variants still carry one set.
    pub fn uv_channel_count(&self) -> u32 {
        self.textures
            .layers()
            .map(|(_, _, layer)| layer.uv_channel + 1)
            .max()
            .unwrap_or(1)
    }

    /// Whether the variant reads tangents and builds a TBN matrix
    pub fn normal_mapping(&self) -> bool {
        !self.textures.normal.is_empty()
    }

    /// Whether any light casts a shadow in this variant
    pub fn casts_shadows(&self) -> bool {
        self.shadows && !self.lights.is_empty()
    }

    pub fn uses_runtime_material(&self) -> bool {
        matches!(self.material, MaterialSource::Uniform)
    }

    pub fn validate(&self) -> Result<()> {
        if self.lights.point_count > MAX_POINT_LIGHTS {
            return Err(ShaderError::TooManyLights {
                kind: "point",
                count: self.lights.point_count,
                max: MAX_POINT_LIGHTS,
            });
        }
        if self.lights.spot_count > MAX_SPOT_LIGHTS {
            return Err(ShaderError::TooManyLights {
                kind: "spot",
                count: self.lights.spot_count,
                max: MAX_SPOT_LIGHTS,
            });
        }

        for channel in TextureChannel::ALL {
            let count = self.textures.get(channel).len();
            if count > MAX_STACK_LAYERS {
                return Err(ShaderError::TooManyLayers {
                    channel: channel.name(),
                    count,
                    max: MAX_STACK_LAYERS,
                });
            }
        }

        for (channel, index, layer) in self.textures.layers() {
            if layer.uv_channel >= MAX_UV_CHANNELS {
                return Err(ShaderError::InvalidUvChannel {
                    channel: channel.name(),
                    layer: index,
                    uv_channel: layer.uv_channel,
                    max: MAX_UV_CHANNELS - 1,
                });
            }
            if !layer.blend_factor.is_finite() {
                return Err(ShaderError::InvalidBlendFactor {
                    channel: channel.name(),
                    layer: index,
                    factor: layer.blend_factor,
                });
            }
        }
        Ok(())
    }

    /// Canonical string identifying this variant, for caching compiled programs
    pub fn cache_key(&self) -> String {
        // Serializing plain data with derived impls cannot fail
        serde_json::to_string(self).unwrap_or_else(|_| format!("{self:?}"))
    }
}
