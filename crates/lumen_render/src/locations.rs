//! Cached slots of a generated variant.
//!
//! Every name is looked up exactly once when the [`ModelShader`](crate::ModelShader)
//! is built. Per-frame and per-draw binding only ever touches these numbers.

use crate::error::Result;
use crate::target::LocationResolver;
use lumen_gpu::UniformLocation;
use lumen_shader::{names, ShaderConfig};
use lumen_shapes::AttributeLocations;

#[derive(Clone, Debug, PartialEq)]
pub struct MaterialLocations {
    pub ambient: UniformLocation,
    pub diffuse: UniformLocation,
    pub specular: UniformLocation,
    pub shininess: UniformLocation,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DirectionalLocations {
    pub direction: UniformLocation,
    pub ambient: UniformLocation,
    pub diffuse: UniformLocation,
    pub specular: UniformLocation,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PointLocations {
    pub position: UniformLocation,
    pub ambient: UniformLocation,
    pub diffuse: UniformLocation,
    pub specular: UniformLocation,
    pub constant: UniformLocation,
    pub linear: UniformLocation,
    pub quadratic: UniformLocation,
    pub far_plane: Option<UniformLocation>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpotLocations {
    pub position: UniformLocation,
    pub direction: UniformLocation,
    pub ambient: UniformLocation,
    pub diffuse: UniformLocation,
    pub specular: UniformLocation,
    pub constant: UniformLocation,
    pub linear: UniformLocation,
    pub quadratic: UniformLocation,
    pub cut_off: UniformLocation,
    pub outer_cut_off: UniformLocation,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ShadowLocations {
    pub texel: UniformLocation,
    pub dir_light_space: Option<UniformLocation>,
    pub dir_map: Option<UniformLocation>,
    pub spot_light_space: Vec<UniformLocation>,
    pub spot_maps: Vec<UniformLocation>,
    pub point_maps: Vec<UniformLocation>,
}

/// Every slot of one variant
#[derive(Clone, Debug, PartialEq)]
pub struct Locations {
    pub attributes: AttributeLocations,
    pub model: UniformLocation,
    pub view: UniformLocation,
    pub projection: UniformLocation,
    pub view_pos: Option<UniformLocation>,
    /// `None` for baked materials
    pub material: Option<MaterialLocations>,
    pub directional: Option<DirectionalLocations>,
    pub points: Vec<PointLocations>,
    pub spots: Vec<SpotLocations>,
    /// Texture-stack samplers in sampling order
    pub samplers: Vec<UniformLocation>,
    pub shadows: Option<ShadowLocations>,
}

impl Locations {
    pub(crate) fn resolve(resolver: &LocationResolver<'_>, config: &ShaderConfig) -> Result<Self> {
        let lights = config.lights;

        let attributes = AttributeLocations {
            position: Some(resolver.attribute(names::POSITION)?),
            normal: resolver.optional_attribute(names::NORMAL),
            uv: (0..config.uv_channel_count())
                .filter_map(|channel| resolver.optional_attribute(&names::uv(channel)))
                .collect(),
            tangent: if config.normal_mapping() {
                Some(resolver.attribute(names::TANGENT)?)
            } else {
                None
            },
        };

        let material = if config.uses_runtime_material() {
            Some(MaterialLocations {
                ambient: resolver.uniform(&names::material("ambient"))?,
                diffuse: resolver.uniform(&names::material("diffuse"))?,
                specular: resolver.uniform(&names::material("specular"))?,
                shininess: resolver.uniform(&names::material("shininess"))?,
            })
        } else {
            None
        };

        let directional = if lights.directional {
            Some(DirectionalLocations {
                direction: resolver.uniform(&names::dir_light("direction"))?,
                ambient: resolver.uniform(&names::dir_light("ambient"))?,
                diffuse: resolver.uniform(&names::dir_light("diffuse"))?,
                specular: resolver.uniform(&names::dir_light("specular"))?,
            })
        } else {
            None
        };

        let points = (0..lights.point_count)
            .map(|i| {
                let field = |name: &str| resolver.uniform(&names::point_light(i, name));
                Ok(PointLocations {
                    position: field("position")?,
                    ambient: field("ambient")?,
                    diffuse: field("diffuse")?,
                    specular: field("specular")?,
                    constant: field("attConstant")?,
                    linear: field("attLinear")?,
                    quadratic: field("attQuadratic")?,
                    far_plane: resolver.optional_uniform(&names::point_light(i, "farPlane")),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let spots = (0..lights.spot_count)
            .map(|i| {
                let field = |name: &str| resolver.uniform(&names::spot_light(i, name));
                Ok(SpotLocations {
                    position: field("position")?,
                    direction: field("direction")?,
                    ambient: field("ambient")?,
                    diffuse: field("diffuse")?,
                    specular: field("specular")?,
                    constant: field("attConstant")?,
                    linear: field("attLinear")?,
                    quadratic: field("attQuadratic")?,
                    cut_off: field("cutOff")?,
                    outer_cut_off: field("outerCutOff")?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let samplers = config
            .textures
            .layers()
            .map(|(channel, layer, _)| resolver.uniform(&names::texture_map(channel, layer)))
            .collect::<Result<Vec<_>>>()?;

        let shadows = if config.casts_shadows() {
            Some(ShadowLocations {
                texel: resolver.uniform(names::SHADOW_TEXEL)?,
                dir_light_space: lights
                    .directional
                    .then(|| resolver.uniform(names::DIR_LIGHT_SPACE))
                    .transpose()?,
                dir_map: lights
                    .directional
                    .then(|| resolver.uniform(names::DIR_SHADOW_MAP))
                    .transpose()?,
                spot_light_space: (0..lights.spot_count)
                    .map(|i| resolver.uniform(&names::spot_light_space(i)))
                    .collect::<Result<Vec<_>>>()?,
                spot_maps: (0..lights.spot_count)
                    .map(|i| resolver.uniform(&names::spot_shadow_map(i)))
                    .collect::<Result<Vec<_>>>()?,
                point_maps: (0..lights.point_count)
                    .map(|i| resolver.uniform(&names::point_shadow_map(i)))
                    .collect::<Result<Vec<_>>>()?,
            })
        } else {
            None
        };

        Ok(Self {
            attributes,
            model: resolver.uniform(names::MODEL)?,
            view: resolver.uniform(names::VIEW)?,
            projection: resolver.uniform(names::PROJECTION)?,
            view_pos: resolver.optional_uniform(names::VIEW_POS),
            material,
            directional,
            points,
            spots,
            samplers,
            shadows,
        })
    }

    /// Texture units used by the texture stacks; shadow maps follow
    pub fn texture_unit_count(&self) -> u32 {
        self.samplers.len() as u32
    }
}
