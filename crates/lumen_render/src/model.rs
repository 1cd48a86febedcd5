//! Lit variant binding and the shadow pass protocol.
//!
//! A frame drives the shader like this:
//!
//! ```text
//! while shader.begin_render_shadow(device, &lights) {
//!     batcher.draw(device, shadow target, scene, Shadow)   // depth only
//!     shader.end_render_shadow(device);
//! }
//! shader.bind_frame(device, &camera, &lights);
//! batcher.draw(device, &shader, scene, Lit);
//! ```
//!
//! Leaving the loop early is allowed: the remaining lights simply keep last
//! frame's (or an empty) shadow map, and `bind_frame` rewinds the cursor.

use crate::cache::ShaderCache;
use crate::camera::FrameCamera;
use crate::depth::DepthShader;
use crate::error::Result;
use crate::light::{Attenuation, DirectionalLight, LightData, PointLight, SpotLight};
use crate::locations::{DirectionalLocations, Locations, PointLocations, SpotLocations};
use crate::material::{Material, MaterialTextures};
use crate::shadow::{
    directional_light_space, point_face_space, shadow_passes, spot_light_space, ShadowConfig,
    ShadowPass,
};
use crate::target::{LocationResolver, ShaderTarget};
use glam::{Mat4, Vec3};
use lumen_gpu::{
    GpuDevice, ProgramHandle, RenderState, ShadowTarget, ShadowTargetKind, TextureHandle,
    TextureTarget, UniformLocation, UniformValue,
};
use lumen_shader::{DepthKind, LightLayout, ShaderConfig};
use lumen_shapes::AttributeLocations;

/// Depth targets and programs owned by a shadowed variant
#[derive(Debug)]
struct ShadowResources {
    directional: Option<ShadowTarget>,
    spots: Vec<ShadowTarget>,
    points: Vec<ShadowTarget>,
    planar: Option<DepthShader>,
    cube: Option<DepthShader>,
}

impl ShadowResources {
    fn new(device: &mut dyn GpuDevice, config: &ShaderConfig, shadow: &ShadowConfig) -> Result<Self> {
        let lights = config.lights;
        let mut resources = Self {
            directional: None,
            spots: Vec::new(),
            points: Vec::new(),
            planar: None,
            cube: None,
        };

        // Release whatever was created before a failure
        match resources.allocate(device, lights, shadow) {
            Ok(()) => Ok(resources),
            Err(e) => {
                resources.release(device);
                Err(e)
            }
        }
    }

    fn allocate(
        &mut self,
        device: &mut dyn GpuDevice,
        lights: LightLayout,
        shadow: &ShadowConfig,
    ) -> Result<()> {
        let resolution = shadow.resolution;
        if lights.directional {
            self.directional = Some(device.create_shadow_target(ShadowTargetKind::Planar, resolution)?);
        }
        for _ in 0..lights.spot_count {
            self.spots
                .push(device.create_shadow_target(ShadowTargetKind::Planar, resolution)?);
        }
        for _ in 0..lights.point_count {
            self.points
                .push(device.create_shadow_target(ShadowTargetKind::Cube, resolution)?);
        }
        if lights.directional || lights.spot_count > 0 {
            self.planar = Some(DepthShader::new(device, DepthKind::Planar)?);
        }
        if lights.point_count > 0 {
            self.cube = Some(DepthShader::new(device, DepthKind::Cube)?);
        }
        Ok(())
    }

    fn release(self, device: &mut dyn GpuDevice) {
        let targets = self
            .directional
            .into_iter()
            .chain(self.spots)
            .chain(self.points);
        for target in targets {
            device.destroy_shadow_target(target);
        }
        for shader in self.planar.into_iter().chain(self.cube) {
            shader.release(device);
        }
    }
}

/// Pass currently rendering between begin and end
#[derive(Clone, Copy, Debug)]
struct ActivePass {
    pass: ShadowPass,
    previous_state: RenderState,
}

/// Lit program for one variant plus everything needed to bind it
#[derive(Debug)]
pub struct ModelShader {
    config: ShaderConfig,
    program: ProgramHandle,
    locations: Locations,
    textures: Vec<TextureHandle>,
    shadow_config: ShadowConfig,
    shadows: Option<ShadowResources>,
    passes: Vec<ShadowPass>,
    cursor: usize,
    active: Option<ActivePass>,
}

impl ModelShader {
    /// Build a variant. Fails on an invalid configuration, a compile error,
    /// a missing slot or a texture-stack layer without a texture.
    pub fn new(
        device: &mut dyn GpuDevice,
        cache: &mut ShaderCache,
        config: ShaderConfig,
        textures: &MaterialTextures,
        shadow_config: ShadowConfig,
    ) -> Result<Self> {
        config.validate()?;
        let textures = textures.resolve(&config)?;
        if config.casts_shadows() {
            shadow_config.validate()?;
        }

        let program = cache.get_or_compile(device, &config)?;
        let locations = Locations::resolve(&LocationResolver::new(device, program, "model"), &config)
            .map_err(|e| {
                log::error!("Model program {:?} is unusable: {e}", program);
                e
            })?;

        let shadows = if config.casts_shadows() {
            Some(ShadowResources::new(device, &config, &shadow_config)?)
        } else {
            None
        };
        let passes = shadow_passes(&config.lights);

        log::info!(
            "Model shader {:?}: {} point, {} spot, directional {}, {} texture layers, {} shadow passes",
            program,
            config.lights.point_count,
            config.lights.spot_count,
            config.lights.directional,
            textures.len(),
            passes.len()
        );

        Ok(Self {
            config,
            program,
            locations,
            textures,
            shadow_config,
            shadows,
            passes,
            cursor: 0,
            active: None,
        })
    }

    pub fn config(&self) -> &ShaderConfig {
        &self.config
    }

    pub fn program(&self) -> ProgramHandle {
        self.program
    }

    /// Slots resolved at construction
    pub fn locations(&self) -> &Locations {
        &self.locations
    }

    pub fn shadow_pass_count(&self) -> usize {
        self.passes.len()
    }

    // ==================== Shadow protocol ====================

    /// Start the next shadow pass. Returns `false` once every shadow-casting
    /// light has been rendered (or when the variant has no shadows).
    ///
    /// Lights named by the variant layout but absent from `lights` are skipped.
    pub fn begin_render_shadow(&mut self, device: &mut dyn GpuDevice, lights: &LightData) -> bool {
        self.end_render_shadow(device);
        let Some(resources) = self.shadows.as_ref() else {
            return false;
        };

        while let Some(&pass) = self.passes.get(self.cursor) {
            self.cursor += 1;

            let setup = match pass {
                ShadowPass::Directional => lights.directional.as_ref().and_then(|light| {
                    let target = resources.directional?;
                    let depth = resources.planar.as_ref()?;
                    Some((target, None, depth, directional_light_space(light, &self.shadow_config), None))
                }),
                ShadowPass::Spot(index) => lights.spots.get(index as usize).and_then(|light| {
                    let target = *resources.spots.get(index as usize)?;
                    let depth = resources.planar.as_ref()?;
                    Some((target, None, depth, spot_light_space(light, &self.shadow_config), None))
                }),
                ShadowPass::Point(index, face) => lights.points.get(index as usize).and_then(|light| {
                    let target = *resources.points.get(index as usize)?;
                    let depth = resources.cube.as_ref()?;
                    let space = point_face_space(light.position, face, &self.shadow_config);
                    Some((target, Some(face), depth, space, Some((light.position, self.shadow_config.far))))
                }),
            };

            let Some((target, face, depth, light_space, light)) = setup else {
                log::trace!("Skipping shadow pass {:?}: light not supplied", pass);
                continue;
            };

            let previous_state = device.render_state();
            device.begin_shadow_target(&target, face);
            device.set_render_state(RenderState::shadow());
            depth.begin_pass(device, light_space, light);
            self.active = Some(ActivePass {
                pass,
                previous_state,
            });
            return true;
        }
        false
    }

    /// Finish the pass started by [`begin_render_shadow`](Self::begin_render_shadow)
    pub fn end_render_shadow(&mut self, device: &mut dyn GpuDevice) {
        if let Some(active) = self.active.take() {
            device.end_shadow_target();
            device.set_render_state(active.previous_state);
        }
    }

    /// Depth program for the active pass
    pub fn shadow_target(&self) -> Option<&DepthShader> {
        let active = self.active?;
        let resources = self.shadows.as_ref()?;
        match active.pass {
            ShadowPass::Point(..) => resources.cube.as_ref(),
            _ => resources.planar.as_ref(),
        }
    }

    /// Pass currently being rendered
    pub fn active_pass(&self) -> Option<ShadowPass> {
        self.active.map(|a| a.pass)
    }

    // ==================== Lit pass ====================

    /// Write camera, light and shadow uniforms for the lit pass and rewind
    /// the shadow cursor for the next frame.
    pub fn bind_frame(&mut self, device: &mut dyn GpuDevice, camera: &FrameCamera, lights: &LightData) {
        self.end_render_shadow(device);
        self.cursor = 0;

        self.bind(device);
        let loc = &self.locations;
        device.set_uniform(loc.view, UniformValue::Mat4(camera.view));
        device.set_uniform(loc.projection, UniformValue::Mat4(camera.projection));
        if let Some(view_pos) = loc.view_pos {
            device.set_uniform(view_pos, UniformValue::Vec3(camera.position));
        }

        if lights.directional.is_some() && loc.directional.is_none() {
            log::warn!("Variant has no directional light; ignoring the supplied one");
        }
        if lights.points.len() > loc.points.len() {
            log::warn!(
                "{} point lights supplied, variant uses {}",
                lights.points.len(),
                loc.points.len()
            );
        }
        if lights.spots.len() > loc.spots.len() {
            log::warn!(
                "{} spot lights supplied, variant uses {}",
                lights.spots.len(),
                loc.spots.len()
            );
        }

        if let Some(slots) = &loc.directional {
            bind_directional_light(device, slots, lights.directional.as_ref());
        }
        for (index, slots) in loc.points.iter().enumerate() {
            bind_point_light(device, slots, lights.points.get(index), self.shadow_config.far);
        }
        for (index, slots) in loc.spots.iter().enumerate() {
            bind_spot_light(device, slots, lights.spots.get(index));
        }

        if let Some(slots) = &loc.shadows {
            device.set_uniform(slots.texel, UniformValue::Float(self.shadow_config.texel_size()));
            if let (Some(slot), Some(light)) = (slots.dir_light_space, lights.directional.as_ref()) {
                let space = directional_light_space(light, &self.shadow_config);
                device.set_uniform(slot, UniformValue::Mat4(space));
            }
            for (slot, light) in slots.spot_light_space.iter().zip(&lights.spots) {
                let space = spot_light_space(light, &self.shadow_config);
                device.set_uniform(*slot, UniformValue::Mat4(space));
            }
        }
    }

    /// Destroy shadow targets and depth programs. The lit program belongs to the cache.
    pub fn release(mut self, device: &mut dyn GpuDevice) {
        self.end_render_shadow(device);
        if let Some(resources) = self.shadows.take() {
            resources.release(device);
        }
    }
}

impl ShaderTarget for ModelShader {
    fn attributes(&self) -> &AttributeLocations {
        &self.locations.attributes
    }

    fn bind(&self, device: &mut dyn GpuDevice) {
        device.use_program(self.program);

        let mut unit = 0;
        for (&texture, &sampler) in self.textures.iter().zip(&self.locations.samplers) {
            device.bind_texture(unit, texture, TextureTarget::Texture2D);
            device.set_uniform(sampler, UniformValue::Sampler(unit));
            unit += 1;
        }

        let (Some(resources), Some(slots)) = (&self.shadows, &self.locations.shadows) else {
            return;
        };
        let planar = resources
            .directional
            .iter()
            .zip(slots.dir_map.iter())
            .chain(resources.spots.iter().zip(&slots.spot_maps));
        for (target, &sampler) in planar {
            device.bind_texture(unit, target.texture, TextureTarget::Texture2D);
            device.set_uniform(sampler, UniformValue::Sampler(unit));
            unit += 1;
        }
        for (target, &sampler) in resources.points.iter().zip(&slots.point_maps) {
            device.bind_texture(unit, target.texture, TextureTarget::CubeMap);
            device.set_uniform(sampler, UniformValue::Sampler(unit));
            unit += 1;
        }
    }

    fn set_instance(&self, device: &mut dyn GpuDevice, model: &Mat4, material: Option<&Material>) {
        device.set_uniform(self.locations.model, UniformValue::Mat4(*model));
        if let (Some(slots), Some(material)) = (&self.locations.material, material) {
            device.set_uniform(slots.ambient, UniformValue::Vec3(material.ambient));
            device.set_uniform(slots.diffuse, UniformValue::Vec3(material.diffuse));
            device.set_uniform(slots.specular, UniformValue::Vec3(material.specular));
            device.set_uniform(slots.shininess, UniformValue::Float(material.shininess));
        }
    }
}

// ==================== Light binding ====================

fn bind_directional_light(device: &mut dyn GpuDevice, slots: &DirectionalLocations, light: Option<&DirectionalLight>) {
    let light = light.copied().unwrap_or(DirectionalLight {
        direction: Vec3::NEG_Y,
        ambient: Vec3::ZERO,
        diffuse: Vec3::ZERO,
        specular: Vec3::ZERO,
    });
    device.set_uniform(slots.direction, UniformValue::Vec3(light.direction));
    device.set_uniform(slots.ambient, UniformValue::Vec3(light.ambient));
    device.set_uniform(slots.diffuse, UniformValue::Vec3(light.diffuse));
    device.set_uniform(slots.specular, UniformValue::Vec3(light.specular));
}

fn bind_attenuation(
    device: &mut dyn GpuDevice,
    slots: (UniformLocation, UniformLocation, UniformLocation),
    attenuation: &Attenuation,
) {
    device.set_uniform(slots.0, UniformValue::Float(attenuation.constant));
    device.set_uniform(slots.1, UniformValue::Float(attenuation.linear));
    device.set_uniform(slots.2, UniformValue::Float(attenuation.quadratic));
}

fn bind_point_light(device: &mut dyn GpuDevice, slots: &PointLocations, light: Option<&PointLight>, far: f32) {
    let light = light.copied().unwrap_or(PointLight {
        position: Vec3::ZERO,
        ambient: Vec3::ZERO,
        diffuse: Vec3::ZERO,
        specular: Vec3::ZERO,
        attenuation: Attenuation::default(),
    });
    device.set_uniform(slots.position, UniformValue::Vec3(light.position));
    device.set_uniform(slots.ambient, UniformValue::Vec3(light.ambient));
    device.set_uniform(slots.diffuse, UniformValue::Vec3(light.diffuse));
    device.set_uniform(slots.specular, UniformValue::Vec3(light.specular));
    bind_attenuation(device, (slots.constant, slots.linear, slots.quadratic), &light.attenuation);
    if let Some(far_plane) = slots.far_plane {
        device.set_uniform(far_plane, UniformValue::Float(far));
    }
}

fn bind_spot_light(device: &mut dyn GpuDevice, slots: &SpotLocations, light: Option<&SpotLight>) {
    let light = light.copied().unwrap_or(SpotLight {
        ambient: Vec3::ZERO,
        diffuse: Vec3::ZERO,
        specular: Vec3::ZERO,
        ..Default::default()
    });
    device.set_uniform(slots.position, UniformValue::Vec3(light.position));
    device.set_uniform(slots.direction, UniformValue::Vec3(light.direction));
    device.set_uniform(slots.ambient, UniformValue::Vec3(light.ambient));
    device.set_uniform(slots.diffuse, UniformValue::Vec3(light.diffuse));
    device.set_uniform(slots.specular, UniformValue::Vec3(light.specular));
    bind_attenuation(device, (slots.constant, slots.linear, slots.quadratic), &light.attenuation);
    device.set_uniform(slots.cut_off, UniformValue::Float(light.inner_angle.cos()));
    device.set_uniform(slots.outer_cut_off, UniformValue::Float(light.outer_angle.cos()));
}
