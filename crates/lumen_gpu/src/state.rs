//! Fixed-function pipeline state and scoped changes

use crate::device::GpuDevice;

/// Face culling mode
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CullMode {
    None,
    #[default]
    Back,
    Front,
}

/// Framebuffer blending
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlendMode {
    /// No blending
    #[default]
    Opaque,
    /// src_alpha, one_minus_src_alpha
    Alpha,
    /// one, one
    Additive,
}

/// Snapshot of the fixed-function state the renderer touches
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RenderState {
    pub depth_test: bool,
    pub depth_write: bool,
    pub cull: CullMode,
    pub blend: BlendMode,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            depth_test: true,
            depth_write: true,
            cull: CullMode::Back,
            blend: BlendMode::Opaque,
        }
    }
}

impl RenderState {
    /// Depth-only rendering into a shadow map
    pub fn shadow() -> Self {
        Self {
            cull: CullMode::Front,
            ..Default::default()
        }
    }

    /// Lines drawn over the scene without occlusion
    pub fn wireframe_overlay() -> Self {
        Self {
            depth_test: false,
            depth_write: false,
            cull: CullMode::None,
            blend: BlendMode::Alpha,
        }
    }

    /// Editor handles drawn on top of everything
    pub fn gizmo_overlay() -> Self {
        Self {
            depth_test: false,
            depth_write: false,
            cull: CullMode::Back,
            blend: BlendMode::Opaque,
        }
    }

    pub fn with_depth_test(mut self, enabled: bool) -> Self {
        self.depth_test = enabled;
        self
    }

    pub fn with_cull(mut self, cull: CullMode) -> Self {
        self.cull = cull;
        self
    }

    pub fn with_blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        self
    }
}

/// Run `f` with `state` applied, then restore whatever was active before.
pub fn with_state<D, R>(device: &mut D, state: RenderState, f: impl FnOnce(&mut D) -> R) -> R
where
    D: GpuDevice + ?Sized,
{
    let previous = device.render_state();
    if previous != state {
        device.set_render_state(state);
    }
    let result = f(device);
    if device.render_state() != previous {
        device.set_render_state(previous);
    }
    result
}
