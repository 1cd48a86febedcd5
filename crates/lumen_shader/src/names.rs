//! Identifiers shared by the generated source and the code that binds it

use crate::config::TextureChannel;

// ==================== Attributes ====================

pub const POSITION: &str = "aPosition";
pub const NORMAL: &str = "aNormal";
pub const TANGENT: &str = "aTangent";
/// Per-vertex colour of the line program
pub const COLOR: &str = "aColor";

pub fn uv(channel: u32) -> String {
    format!("aUv{channel}")
}

// ==================== Transform and camera ====================

pub const MODEL: &str = "uModel";
pub const VIEW: &str = "uView";
pub const PROJECTION: &str = "uProjection";
pub const VIEW_POS: &str = "uViewPos";

// ==================== Material ====================

pub const MATERIAL: &str = "uMaterial";
pub const MATERIAL_FIELDS: [&str; 4] = ["ambient", "diffuse", "specular", "shininess"];

pub fn material(field: &str) -> String {
    format!("{MATERIAL}.{field}")
}

/// Sampler array for one texture stack
pub fn texture_maps(channel: TextureChannel) -> String {
    format!("u{}Maps", channel.ident())
}

pub fn texture_map(channel: TextureChannel, layer: usize) -> String {
    format!("{}[{layer}]", texture_maps(channel))
}

// ==================== Lights ====================

pub const DIR_LIGHT: &str = "uDirLight";
pub const POINT_LIGHTS: &str = "uPointLights";
pub const SPOT_LIGHTS: &str = "uSpotLights";

pub const DIR_LIGHT_FIELDS: [&str; 4] = ["direction", "ambient", "diffuse", "specular"];
pub const POINT_LIGHT_FIELDS: [&str; 8] = [
    "position",
    "ambient",
    "diffuse",
    "specular",
    "attConstant",
    "attLinear",
    "attQuadratic",
    "farPlane",
];
pub const SPOT_LIGHT_FIELDS: [&str; 10] = [
    "position",
    "direction",
    "ambient",
    "diffuse",
    "specular",
    "attConstant",
    "attLinear",
    "attQuadratic",
    "cutOff",
    "outerCutOff",
];

pub fn dir_light(field: &str) -> String {
    format!("{DIR_LIGHT}.{field}")
}

pub fn point_light(index: u32, field: &str) -> String {
    format!("{POINT_LIGHTS}[{index}].{field}")
}

pub fn spot_light(index: u32, field: &str) -> String {
    format!("{SPOT_LIGHTS}[{index}].{field}")
}

// ==================== Shadows ====================

pub const DIR_LIGHT_SPACE: &str = "uDirLightSpace";
pub const SPOT_LIGHT_SPACE: &str = "uSpotLightSpace";
pub const DIR_SHADOW_MAP: &str = "uDirShadowMap";
pub const SPOT_SHADOW_MAPS: &str = "uSpotShadowMaps";
pub const POINT_SHADOW_MAPS: &str = "uPointShadowMaps";
/// Size of one shadow-map texel in uv units
pub const SHADOW_TEXEL: &str = "uShadowMapTexel";

pub fn spot_light_space(index: u32) -> String {
    format!("{SPOT_LIGHT_SPACE}[{index}]")
}

pub fn spot_shadow_map(index: u32) -> String {
    format!("{SPOT_SHADOW_MAPS}[{index}]")
}

pub fn point_shadow_map(index: u32) -> String {
    format!("{POINT_SHADOW_MAPS}[{index}]")
}

// ==================== Built-in programs ====================

/// Light view-projection of the planar depth program
pub const LIGHT_SPACE: &str = "uLightSpace";
pub const LIGHT_POS: &str = "uLightPos";
pub const FAR_PLANE: &str = "uFarPlane";
/// Solid colour of the flat program
pub const FLAT_COLOR: &str = "uColor";
