//! Sandbox configuration
//!
//! Everything the sandbox needs to build a scene and run it headlessly,
//! read from a single TOML file. Every table is optional.
//!
//! # Example
//!
//! ```toml
//! frames = 120
//!
//! [physics]
//! gravity = [0.0, -9.81, 0.0]
//!
//! [render]
//! shading = "phong"
//! shadows = true
//!
//! [lights.directional]
//! direction = [-0.3, -1.0, -0.2]
//!
//! [[materials]]
//! diffuse = [0.8, 0.2, 0.2]
//!
//! [[bodies]]
//! name = "ball"
//! position = [0.0, 4.0, 0.0]
//!
//! [[bodies.shapes]]
//! shape = { type = "sphere", radius = 0.5 }
//! material = 0
//! ```

use crate::error::{Result, SandboxError};
use glam::{EulerRot, Quat, Vec3};
use lumen_editor::{GizmoMode, SnapSettings};
use lumen_physics::PhysicsConfig;
use lumen_render::{Camera, LightData, Material, ShadowConfig};
use lumen_scene::{BodyKey, Placement, Scene, ShapeDefinition, ShapeSpec};
use lumen_shader::ShadingModel;
use lumen_shapes::GeometryConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Scene shipped with the binary, used when no file is given
const BUILTIN_SCENE: &str = include_str!("../scenes/default.toml");

/// Root of a sandbox file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    /// Frames to simulate before exiting
    pub frames: u32,
    pub physics: PhysicsConfig,
    pub geometry: GeometryConfig,
    pub shadow: ShadowConfig,
    pub render: RenderSettings,
    pub camera: CameraSettings,
    pub lights: LightData,
    /// Palette that shapes index into
    pub materials: Vec<Material>,
    pub bodies: Vec<BodyConfig>,
    pub editor: EditorSettings,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            frames: 300,
            physics: PhysicsConfig::default(),
            geometry: GeometryConfig::default(),
            shadow: ShadowConfig::default(),
            render: RenderSettings::default(),
            camera: CameraSettings::default(),
            lights: LightData::default(),
            materials: Vec::new(),
            bodies: Vec::new(),
            editor: EditorSettings::default(),
        }
    }
}

/// Shader variant and output options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub shading: ShadingModel,
    /// Cast shadows from every light the scene has
    pub shadows: bool,
    /// Draw the physics wireframe after the scene
    pub debug_lines: bool,
    /// Width and height in pixels, used for aspect and picking
    pub viewport: [u32; 2],
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            shading: ShadingModel::default(),
            shadows: true,
            debug_lines: false,
            viewport: [1280, 720],
        }
    }
}

/// Fixed viewing camera
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view, degrees
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            position: Vec3::new(8.0, 6.0, 10.0),
            target: Vec3::ZERO,
            fov_degrees: 60.0,
            near: 0.1,
            far: 200.0,
        }
    }
}

impl CameraSettings {
    /// Camera for a viewport of the given size
    pub fn build(&self, viewport: [u32; 2]) -> Camera {
        let aspect = viewport[0].max(1) as f32 / viewport[1].max(1) as f32;
        let mut camera =
            Camera::perspective(self.fov_degrees.to_radians(), aspect, self.near, self.far).with_position(self.position);
        camera.look_at(self.target, Vec3::Y);
        camera
    }
}

/// One body and its shapes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyConfig {
    pub name: String,
    pub position: Vec3,
    /// Euler angles, degrees, XYZ order
    pub rotation: Vec3,
    #[serde(rename = "static")]
    pub is_static: bool,
    pub shapes: Vec<PartConfig>,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            is_static: false,
            shapes: Vec::new(),
        }
    }
}

/// One shape of a body, placed in body space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartConfig {
    pub shape: ShapeDefinition,
    #[serde(default)]
    pub position: Vec3,
    /// Euler angles, degrees, XYZ order
    #[serde(default)]
    pub rotation: Vec3,
    /// Index into the material palette
    #[serde(default)]
    pub material: usize,
}

impl PartConfig {
    fn is_offset(&self) -> bool {
        self.position != Vec3::ZERO || self.rotation != Vec3::ZERO
    }
}

/// Initial gizmo state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Body the gizmo starts attached to
    pub select: Option<usize>,
    pub mode: GizmoMode,
    pub snap: SnapSettings,
    pub size: f32,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            select: None,
            mode: GizmoMode::default(),
            snap: SnapSettings::default(),
            size: 1.0,
        }
    }
}

impl SandboxConfig {
    /// Load and validate a config file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_str(&content)?;
        log::info!("Loaded {} bodies from {}", config.bodies.len(), path.display());
        Ok(config)
    }

    /// Parse and validate config text
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Scene shipped with the binary
    pub fn builtin() -> Result<Self> {
        Self::from_str(BUILTIN_SCENE)
    }

    pub fn validate(&self) -> Result<()> {
        self.physics.validate()?;
        self.geometry.validate()?;
        if self.render.shadows {
            self.shadow.validate()?;
        }
        if self.render.viewport.contains(&0) {
            return Err(SandboxError::InvalidArgument(format!(
                "viewport must be non-empty, got {:?}",
                self.render.viewport
            )));
        }

        for (body, config) in self.bodies.iter().enumerate() {
            for (shape, part) in config.shapes.iter().enumerate() {
                part.shape.validate()?;
                // Shapes without a palette fall back to the default material
                if !self.materials.is_empty() && part.material >= self.materials.len() {
                    return Err(SandboxError::InvalidMaterialIndex {
                        body,
                        shape,
                        index: part.material,
                        count: self.materials.len(),
                    });
                }
            }
        }

        if let Some(index) = self.editor.select {
            if index >= self.bodies.len() {
                return Err(SandboxError::InvalidSelection {
                    index,
                    count: self.bodies.len(),
                });
            }
        }
        Ok(())
    }

    fn material(&self, index: usize) -> Material {
        self.materials.get(index).copied().unwrap_or_default()
    }

    /// Add every configured body to `scene`, in file order.
    /// Bodies without shapes are skipped with a warning.
    pub fn populate(&self, scene: &mut Scene) -> Result<Vec<BodyKey>> {
        let mut keys = Vec::with_capacity(self.bodies.len());

        for body in &self.bodies {
            let placement = Placement::new(body.position, euler_degrees(body.rotation));
            let key = match body.shapes.as_slice() {
                [] => {
                    log::warn!("Body '{}' has no shapes, skipping", body.name);
                    continue;
                }
                [part] if !part.is_offset() => {
                    let material = self.material(part.material);
                    match part.shape {
                        ShapeDefinition::Box { extents } => scene.add_cube(placement, extents, material, body.is_static)?,
                        ShapeDefinition::Sphere { radius } => {
                            scene.add_sphere(placement, radius, material, body.is_static)?
                        }
                        ShapeDefinition::Cylinder { radius, height } => {
                            scene.add_cylinder(placement, radius, height, material, body.is_static)?
                        }
                        ShapeDefinition::Cone { radius, height } => {
                            scene.add_cone(placement, radius, height, material, body.is_static)?
                        }
                    }
                }
                parts => {
                    let specs: Vec<ShapeSpec> = parts
                        .iter()
                        .map(|part| {
                            ShapeSpec::new(part.shape, self.material(part.material))
                                .with_local_position(part.position)
                                .with_local_rotation(euler_degrees(part.rotation))
                        })
                        .collect();
                    scene.add_compound(placement, body.is_static, &specs)?
                }
            };
            log::debug!("Body '{}' -> {:?}", body.name, key);
            keys.push(key);
        }

        Ok(keys)
    }
}

fn euler_degrees(degrees: Vec3) -> Quat {
    Quat::from_euler(
        EulerRot::XYZ,
        degrees.x.to_radians(),
        degrees.y.to_radians(),
        degrees.z.to_radians(),
    )
}
