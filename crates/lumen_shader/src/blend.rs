//! Texture stack blending.
//!
//! Each op has a GLSL expression used by the generator and a CPU mirror
//! used by tooling and tests. Both must stay in agreement.

use crate::config::{BlendOp, TextureLayer};
use glam::Vec3;

impl BlendOp {
    /// GLSL expression folding texel `b` into running colour `a`
    pub fn glsl_expr(self, a: &str, b: &str) -> String {
        match self {
            BlendOp::Multiply => format!("{a} * {b}"),
            BlendOp::Add => format!("{a} + {b}"),
            BlendOp::Subtract => format!("{a} - {b}"),
            BlendOp::Divide => format!("{a} / {b}"),
            BlendOp::SmoothAdd => format!("({a} + {b}) - ({a} * {b})"),
            BlendOp::SignedAdd => format!("{a} + ({b} - 0.5)"),
        }
    }

    /// CPU evaluation of [`glsl_expr`](Self::glsl_expr)
    pub fn apply(self, a: Vec3, b: Vec3) -> Vec3 {
        match self {
            BlendOp::Multiply => a * b,
            BlendOp::Add => a + b,
            BlendOp::Subtract => a - b,
            BlendOp::Divide => a / b,
            BlendOp::SmoothAdd => (a + b) - (a * b),
            BlendOp::SignedAdd => a + (b - Vec3::splat(0.5)),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BlendOp::Multiply => "multiply",
            BlendOp::Add => "add",
            BlendOp::Subtract => "subtract",
            BlendOp::Divide => "divide",
            BlendOp::SmoothAdd => "smooth_add",
            BlendOp::SignedAdd => "signed_add",
        }
    }
}

/// Fold sampled texels into a base colour, layer by layer.
///
/// `samples[i]` is the raw texel for `layers[i]`; it is scaled by the
/// layer's blend factor before the op is applied. Missing samples leave the
/// running colour unchanged.
pub fn combine(base: Vec3, layers: &[TextureLayer], samples: &[Vec3]) -> Vec3 {
    layers
        .iter()
        .zip(samples)
        .fold(base, |color, (layer, sample)| {
            layer.op.apply(color, *sample * layer.blend_factor)
        })
}
