//! Fixed programs: shadow depth, flat colour and debug lines

use crate::generator::{write_depth_packing, ShaderSource, SourceWriter};
use crate::names;
use serde::{Deserialize, Serialize};

/// Shadow map flavour a depth program renders into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepthKind {
    /// Light-space projected depth (directional and spot lights)
    Planar,
    /// Linear distance to the light over the far plane (point lights)
    Cube,
}

/// Depth-only program for shadow passes. Depth is packed into RGBA8.
pub fn generate_depth(kind: DepthKind) -> ShaderSource {
    let mut vs = SourceWriter::new();
    vs.header(false);
    vs.section("attributes");
    vs.line(format!("attribute vec3 {};", names::POSITION));
    vs.section("uniforms");
    vs.line(format!("uniform mat4 {};", names::MODEL));
    vs.line(format!("uniform mat4 {};", names::LIGHT_SPACE));
    vs.section("varyings");
    match kind {
        DepthKind::Planar => vs.line("varying vec4 vLightSpacePos;"),
        DepthKind::Cube => vs.line("varying vec3 vWorldPos;"),
    }
    vs.section("main");
    vs.open("void main() {");
    vs.line(format!(
        "vec4 worldPos = {} * vec4({}, 1.0);",
        names::MODEL,
        names::POSITION
    ));
    vs.line(format!("gl_Position = {} * worldPos;", names::LIGHT_SPACE));
    match kind {
        DepthKind::Planar => vs.line("vLightSpacePos = gl_Position;"),
        DepthKind::Cube => vs.line("vWorldPos = worldPos.xyz;"),
    }
    vs.close("}");

    let mut fs = SourceWriter::new();
    fs.header(true);
    fs.section("uniforms");
    if kind == DepthKind::Cube {
        fs.line(format!("uniform vec3 {};", names::LIGHT_POS));
        fs.line(format!("uniform float {};", names::FAR_PLANE));
    }
    fs.section("varyings");
    match kind {
        DepthKind::Planar => fs.line("varying vec4 vLightSpacePos;"),
        DepthKind::Cube => fs.line("varying vec3 vWorldPos;"),
    }
    fs.section("depth packing");
    write_depth_packing(&mut fs, true, false);
    fs.section("main");
    fs.open("void main() {");
    match kind {
        DepthKind::Planar => {
            fs.line("float depth = vLightSpacePos.z / vLightSpacePos.w * 0.5 + 0.5;");
        }
        DepthKind::Cube => fs.line(format!(
            "float depth = length(vWorldPos - {}) / {};",
            names::LIGHT_POS,
            names::FAR_PLANE
        )),
    }
    fs.line("gl_FragColor = packDepth(clamp(depth, 0.0, 1.0));");
    fs.close("}");

    ShaderSource {
        vertex: vs.finish(),
        fragment: fs.finish(),
    }
}

/// Solid-colour program used by overlays
pub fn generate_flat() -> ShaderSource {
    let mut vs = SourceWriter::new();
    vs.header(false);
    vs.section("attributes");
    vs.line(format!("attribute vec3 {};", names::POSITION));
    vs.section("uniforms");
    vs.line(format!("uniform mat4 {};", names::MODEL));
    vs.line(format!("uniform mat4 {};", names::VIEW));
    vs.line(format!("uniform mat4 {};", names::PROJECTION));
    vs.section("main");
    vs.open("void main() {");
    vs.line(format!(
        "gl_Position = {} * {} * {} * vec4({}, 1.0);",
        names::PROJECTION,
        names::VIEW,
        names::MODEL,
        names::POSITION
    ));
    vs.close("}");

    let mut fs = SourceWriter::new();
    fs.header(true);
    fs.section("uniforms");
    fs.line(format!("uniform vec4 {};", names::FLAT_COLOR));
    fs.section("main");
    fs.open("void main() {");
    fs.line(format!("gl_FragColor = {};", names::FLAT_COLOR));
    fs.close("}");

    ShaderSource {
        vertex: vs.finish(),
        fragment: fs.finish(),
    }
}

/// Per-vertex coloured line program for physics debug output
pub fn generate_lines() -> ShaderSource {
    let mut vs = SourceWriter::new();
    vs.header(false);
    vs.section("attributes");
    vs.line(format!("attribute vec3 {};", names::POSITION));
    vs.line(format!("attribute vec4 {};", names::COLOR));
    vs.section("uniforms");
    vs.line(format!("uniform mat4 {};", names::VIEW));
    vs.line(format!("uniform mat4 {};", names::PROJECTION));
    vs.section("varyings");
    vs.line("varying vec4 vColor;");
    vs.section("main");
    vs.open("void main() {");
    vs.line(format!("vColor = {};", names::COLOR));
    vs.line(format!(
        "gl_Position = {} * {} * vec4({}, 1.0);",
        names::PROJECTION,
        names::VIEW,
        names::POSITION
    ));
    vs.close("}");

    let mut fs = SourceWriter::new();
    fs.header(true);
    fs.section("varyings");
    fs.line("varying vec4 vColor;");
    fs.section("main");
    fs.open("void main() {");
    fs.line("gl_FragColor = vColor;");
    fs.close("}");

    ShaderSource {
        vertex: vs.finish(),
        fragment: fs.finish(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_kinds_differ() {
        let planar = generate_depth(DepthKind::Planar);
        let cube = generate_depth(DepthKind::Cube);
        assert_ne!(planar.fragment, cube.fragment);
        assert!(cube.fragment.contains("uniform float uFarPlane;"));
        assert!(!planar.fragment.contains("uFarPlane"));
        assert!(planar.fragment.contains("packDepth"));
    }

    #[test]
    fn test_flat_program_has_color_uniform() {
        let flat = generate_flat();
        assert!(flat.fragment.contains("uniform vec4 uColor;"));
        assert!(flat.vertex.contains("void main()"));
    }

    #[test]
    fn test_line_program_reads_vertex_colour() {
        let lines = generate_lines();
        assert!(lines.vertex.contains("attribute vec4 aColor;"));
        assert!(!lines.vertex.contains("uModel"));
    }
}
