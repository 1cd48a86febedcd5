//! Variant source generation.
//!
//! ```text
//! ShaderConfig ──► generate() ──► ShaderSource { vertex, fragment }
//!
//! vertex:   header │ attributes │ uniforms │ varyings │ matrix helpers │ main
//! fragment: header │ uniforms (material, lights, textures, shadows) │ varyings
//!           │ shadow sampling │ texture stacks │ lighting │ main
//! ```
//!
//! Output targets GLSL ES 1.00 so it also compiles as desktop GLSL 1.20.
//! Arrays are only ever indexed with literals, so every per-light and
//! per-layer statement is unrolled.

use crate::config::{MaterialSource, ShaderConfig, ShadingModel, TextureChannel};
use crate::names;
use std::fmt;

/// Generated vertex and fragment source
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShaderSource {
    pub vertex: String,
    pub fragment: String,
}

impl fmt::Display for ShaderSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "// vertex")?;
        writeln!(f, "{}", self.vertex)?;
        writeln!(f, "// fragment")?;
        write!(f, "{}", self.fragment)
    }
}

/// Sample directions of the point-light cubemap PCF kernel
pub const POINT_SHADOW_OFFSETS: [[i8; 3]; 20] = [
    [1, 1, 1],
    [1, -1, 1],
    [-1, -1, 1],
    [-1, 1, 1],
    [1, 1, -1],
    [1, -1, -1],
    [-1, -1, -1],
    [-1, 1, -1],
    [1, 1, 0],
    [1, -1, 0],
    [-1, -1, 0],
    [-1, 1, 0],
    [1, 0, 1],
    [-1, 0, 1],
    [1, 0, -1],
    [-1, 0, -1],
    [0, 1, 1],
    [0, -1, 1],
    [0, -1, -1],
    [0, 1, -1],
];

/// Base colour of the untextured lightmap and normal channels
const WHITE: &str = "vec3(1.0)";

// ==================== Source writer ====================

/// Line-oriented source builder with indentation
#[derive(Default)]
pub(crate) struct SourceWriter {
    text: String,
    indent: usize,
}

impl SourceWriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn line(&mut self, line: impl AsRef<str>) {
        for _ in 0..self.indent {
            self.text.push_str("    ");
        }
        self.text.push_str(line.as_ref());
        self.text.push('\n');
    }

    pub(crate) fn open(&mut self, line: impl AsRef<str>) {
        self.line(line);
        self.indent += 1;
    }

    pub(crate) fn close(&mut self, line: impl AsRef<str>) {
        self.indent = self.indent.saturating_sub(1);
        self.line(line);
    }

    pub(crate) fn section(&mut self, title: &str) {
        self.text.push('\n');
        self.line(format!("// ---- {title} ----"));
    }

    pub(crate) fn header(&mut self, precision: bool) {
        self.line("#version 100");
        if precision {
            self.line("precision highp float;");
        }
    }

    pub(crate) fn finish(self) -> String {
        self.text
    }
}

/// GLSL float literal; always carries a decimal point
pub(crate) fn float(value: f32) -> String {
    let text = format!("{value}");
    if text.contains('.') {
        text
    } else {
        format!("{text}.0")
    }
}

pub(crate) fn vec3(value: [f32; 3]) -> String {
    format!(
        "vec3({}, {}, {})",
        float(value[0]),
        float(value[1]),
        float(value[2])
    )
}

/// GLSL helpers that pack a [0, 1] depth into an RGBA8 texel and back
pub(crate) fn write_depth_packing(w: &mut SourceWriter, pack: bool, unpack: bool) {
    if pack {
        w.open("vec4 packDepth(float depth) {");
        w.line("vec4 enc = fract(vec4(1.0, 255.0, 65025.0, 16581375.0) * depth);");
        w.line("enc -= enc.yzww * vec4(1.0 / 255.0, 1.0 / 255.0, 1.0 / 255.0, 0.0);");
        w.line("return enc;");
        w.close("}");
    }
    if unpack {
        w.open("float unpackDepth(vec4 rgba) {");
        w.line("return dot(rgba, vec4(1.0, 1.0 / 255.0, 1.0 / 65025.0, 1.0 / 16581375.0));");
        w.close("}");
    }
}

// ==================== Generation ====================

/// Generate the source of one variant.
///
/// Pure: the output depends on nothing but `config`. Configurations are
/// expected to have passed [`ShaderConfig::validate`].
pub fn generate(config: &ShaderConfig) -> ShaderSource {
    let source = ShaderSource {
        vertex: generate_vertex(config),
        fragment: generate_fragment(config),
    };
    log::debug!(
        "Generated shader variant: {} vertex bytes, {} fragment bytes",
        source.vertex.len(),
        source.fragment.len()
    );
    source
}

fn generate_vertex(config: &ShaderConfig) -> String {
    let uv_count = config.uv_channel_count();
    let normal_mapping = config.normal_mapping();
    let shadows = config.casts_shadows();
    let lights = config.lights;

    let mut w = SourceWriter::new();
    w.header(false);

    w.section("attributes");
    w.line(format!("attribute vec3 {};", names::POSITION));
    w.line(format!("attribute vec3 {};", names::NORMAL));
    for channel in 0..uv_count {
        w.line(format!("attribute vec2 {};", names::uv(channel)));
    }
    if normal_mapping {
        w.line(format!("attribute vec3 {};", names::TANGENT));
    }

    w.section("uniforms");
    w.line(format!("uniform mat4 {};", names::MODEL));
    w.line(format!("uniform mat4 {};", names::VIEW));
    w.line(format!("uniform mat4 {};", names::PROJECTION));
    if shadows && lights.directional {
        w.line(format!("uniform mat4 {};", names::DIR_LIGHT_SPACE));
    }
    if shadows && lights.spot_count > 0 {
        w.line(format!(
            "uniform mat4 {}[{}];",
            names::SPOT_LIGHT_SPACE,
            lights.spot_count
        ));
    }

    w.section("varyings");
    write_varyings(&mut w, config);

    w.section("matrix helpers");
    w.open("mat3 transpose3(mat3 m) {");
    w.line("return mat3(m[0][0], m[1][0], m[2][0],");
    w.line("            m[0][1], m[1][1], m[2][1],");
    w.line("            m[0][2], m[1][2], m[2][2]);");
    w.close("}");
    w.open("mat3 inverse3(mat3 m) {");
    w.line("float a00 = m[0][0]; float a01 = m[0][1]; float a02 = m[0][2];");
    w.line("float a10 = m[1][0]; float a11 = m[1][1]; float a12 = m[1][2];");
    w.line("float a20 = m[2][0]; float a21 = m[2][1]; float a22 = m[2][2];");
    w.line("float b01 = a22 * a11 - a12 * a21;");
    w.line("float b11 = -a22 * a10 + a12 * a20;");
    w.line("float b21 = a21 * a10 - a11 * a20;");
    w.line("float det = a00 * b01 + a01 * b11 + a02 * b21;");
    w.line("return mat3(b01, (-a22 * a01 + a02 * a21), (a12 * a01 - a02 * a11),");
    w.line("            b11, (a22 * a00 - a02 * a20), (-a12 * a00 + a02 * a10),");
    w.line("            b21, (-a21 * a00 + a01 * a20), (a11 * a00 - a01 * a10)) / det;");
    w.close("}");

    w.section("main");
    w.open("void main() {");
    w.line(format!(
        "vec4 worldPos = {} * vec4({}, 1.0);",
        names::MODEL,
        names::POSITION
    ));
    w.line("vFragPos = worldPos.xyz;");
    w.line(format!(
        "mat3 model3 = mat3({m}[0].xyz, {m}[1].xyz, {m}[2].xyz);",
        m = names::MODEL
    ));
    w.line("mat3 normalMatrix = transpose3(inverse3(model3));");
    w.line(format!("vNormal = normalize(normalMatrix * {});", names::NORMAL));
    for channel in 0..uv_count {
        w.line(format!("vUv{channel} = {};", names::uv(channel)));
    }
    if normal_mapping {
        w.line(format!("vec3 t = normalize(normalMatrix * {});", names::TANGENT));
        w.line("t = normalize(t - dot(t, vNormal) * vNormal);");
        w.line("vec3 b = cross(vNormal, t);");
        w.line("vTbn = mat3(t, b, vNormal);");
    }
    if shadows && lights.directional {
        w.line(format!("vDirLightSpacePos = {} * worldPos;", names::DIR_LIGHT_SPACE));
    }
    if shadows {
        for i in 0..lights.spot_count {
            w.line(format!(
                "vSpotLightSpacePos[{i}] = {} * worldPos;",
                names::spot_light_space(i)
            ));
        }
    }
    w.line(format!(
        "gl_Position = {} * {} * worldPos;",
        names::PROJECTION,
        names::VIEW
    ));
    w.close("}");

    w.finish()
}

fn write_varyings(w: &mut SourceWriter, config: &ShaderConfig) {
    let shadows = config.casts_shadows();
    w.line("varying vec3 vFragPos;");
    w.line("varying vec3 vNormal;");
    for channel in 0..config.uv_channel_count() {
        w.line(format!("varying vec2 vUv{channel};"));
    }
    if config.normal_mapping() {
        w.line("varying mat3 vTbn;");
    }
    if shadows && config.lights.directional {
        w.line("varying vec4 vDirLightSpacePos;");
    }
    if shadows && config.lights.spot_count > 0 {
        w.line(format!(
            "varying vec4 vSpotLightSpacePos[{}];",
            config.lights.spot_count
        ));
    }
}

fn generate_fragment(config: &ShaderConfig) -> String {
    let lights = config.lights;
    let shadows = config.casts_shadows();

    let mut w = SourceWriter::new();
    w.header(true);

    w.section("uniforms");
    w.line(format!("uniform vec3 {};", names::VIEW_POS));
    write_material(&mut w, config.material);
    write_light_structs(&mut w, config);
    for channel in TextureChannel::ALL {
        let count = config.textures.get(channel).len();
        if count > 0 {
            w.line(format!(
                "uniform sampler2D {}[{count}];",
                names::texture_maps(channel)
            ));
        }
    }
    if shadows {
        w.line(format!("uniform float {};", names::SHADOW_TEXEL));
        if lights.directional {
            w.line(format!("uniform sampler2D {};", names::DIR_SHADOW_MAP));
        }
        if lights.spot_count > 0 {
            w.line(format!(
                "uniform sampler2D {}[{}];",
                names::SPOT_SHADOW_MAPS,
                lights.spot_count
            ));
        }
        if lights.point_count > 0 {
            w.line(format!(
                "uniform samplerCube {}[{}];",
                names::POINT_SHADOW_MAPS,
                lights.point_count
            ));
        }
    }

    w.section("varyings");
    write_varyings(&mut w, config);

    if shadows {
        w.section("shadows");
        write_shadow_functions(&mut w, config);
    }

    w.section("texture stacks");
    write_channel_functions(&mut w, config);

    if !lights.is_empty() {
        w.section("lighting");
        write_lighting_functions(&mut w, config);
    }

    w.section("main");
    write_fragment_main(&mut w, config);

    w.finish()
}

fn write_material(w: &mut SourceWriter, material: MaterialSource) {
    w.open("struct Material {");
    w.line("vec3 ambient;");
    w.line("vec3 diffuse;");
    w.line("vec3 specular;");
    w.line("float shininess;");
    w.close("};");
    match material {
        MaterialSource::Uniform => w.line(format!("uniform Material {};", names::MATERIAL)),
        MaterialSource::Baked(constants) => w.line(format!(
            "const Material {} = Material({}, {}, {}, {});",
            names::MATERIAL,
            vec3(constants.ambient),
            vec3(constants.diffuse),
            vec3(constants.specular),
            float(constants.shininess)
        )),
    }
}

fn write_light_structs(w: &mut SourceWriter, config: &ShaderConfig) {
    let lights = config.lights;
    if lights.directional {
        w.open("struct DirectionalLight {");
        w.line("vec3 direction;");
        w.line("vec3 ambient;");
        w.line("vec3 diffuse;");
        w.line("vec3 specular;");
        w.close("};");
        w.line(format!("uniform DirectionalLight {};", names::DIR_LIGHT));
    }
    if lights.point_count > 0 {
        w.open("struct PointLight {");
        w.line("vec3 position;");
        w.line("vec3 ambient;");
        w.line("vec3 diffuse;");
        w.line("vec3 specular;");
        w.line("float attConstant;");
        w.line("float attLinear;");
        w.line("float attQuadratic;");
        w.line("float farPlane;");
        w.close("};");
        w.line(format!(
            "uniform PointLight {}[{}];",
            names::POINT_LIGHTS,
            lights.point_count
        ));
    }
    if lights.spot_count > 0 {
        w.open("struct SpotLight {");
        w.line("vec3 position;");
        w.line("vec3 direction;");
        w.line("vec3 ambient;");
        w.line("vec3 diffuse;");
        w.line("vec3 specular;");
        w.line("float attConstant;");
        w.line("float attLinear;");
        w.line("float attQuadratic;");
        w.line("float cutOff;");
        w.line("float outerCutOff;");
        w.close("};");
        w.line(format!(
            "uniform SpotLight {}[{}];",
            names::SPOT_LIGHTS,
            lights.spot_count
        ));
    }
}

fn write_shadow_functions(w: &mut SourceWriter, config: &ShaderConfig) {
    let lights = config.lights;
    write_depth_packing(w, false, true);

    if lights.directional || lights.spot_count > 0 {
        w.open("float planarShadow(sampler2D shadowMap, vec4 lightSpacePos, vec3 normal, vec3 lightDir) {");
        w.line("vec3 coords = lightSpacePos.xyz / lightSpacePos.w * 0.5 + 0.5;");
        w.open("if (coords.z > 1.0) {");
        w.line("return 0.0;");
        w.close("}");
        w.line("float bias = max(0.05 * (1.0 - dot(normal, lightDir)), 0.005);");
        w.line("float shadow = 0.0;");
        w.open("for (int x = -1; x <= 1; ++x) {");
        w.open("for (int y = -1; y <= 1; ++y) {");
        w.line(format!(
            "vec2 offset = vec2(float(x), float(y)) * {};",
            names::SHADOW_TEXEL
        ));
        w.line("float closest = unpackDepth(texture2D(shadowMap, coords.xy + offset));");
        w.line("shadow += coords.z - bias > closest ? 1.0 : 0.0;");
        w.close("}");
        w.close("}");
        w.line("return shadow / 9.0;");
        w.close("}");
    }

    if lights.point_count > 0 {
        w.open("float pointShadowSample(samplerCube shadowMap, vec3 direction, float depth, float farPlane) {");
        w.line("float closest = unpackDepth(textureCube(shadowMap, direction)) * farPlane;");
        w.line("return depth > closest ? 1.0 : 0.0;");
        w.close("}");
        w.open("float pointShadow(samplerCube shadowMap, vec3 fragToLight, float farPlane) {");
        w.line("float depth = length(fragToLight) - 0.05;");
        w.line(format!(
            "float viewDistance = length({} - vFragPos);",
            names::VIEW_POS
        ));
        w.line("float diskRadius = (1.0 + viewDistance / farPlane) / 25.0;");
        w.line("float shadow = 0.0;");
        for [x, y, z] in POINT_SHADOW_OFFSETS {
            w.line(format!(
                "shadow += pointShadowSample(shadowMap, fragToLight + vec3({}, {}, {}) * diskRadius, depth, farPlane);",
                float(x as f32),
                float(y as f32),
                float(z as f32)
            ));
        }
        w.line(format!("return shadow / {};", float(POINT_SHADOW_OFFSETS.len() as f32)));
        w.close("}");
    }
}

fn write_channel_functions(w: &mut SourceWriter, config: &ShaderConfig) {
    for channel in TextureChannel::ALL {
        let layers = config.textures.get(channel);
        let base = match channel {
            TextureChannel::Ambient => names::material("ambient"),
            TextureChannel::Diffuse => names::material("diffuse"),
            TextureChannel::Specular => names::material("specular"),
            TextureChannel::Normal | TextureChannel::Lightmap => WHITE.to_string(),
        };
        let function = if channel == TextureChannel::Normal {
            "calcNormalColor".to_string()
        } else {
            format!("calc{}Color", channel.ident())
        };

        if channel == TextureChannel::Normal && layers.is_empty() {
            continue;
        }

        w.open(format!("vec3 {function}() {{"));
        w.line(format!("vec3 color = {base};"));
        for (index, layer) in layers.iter().enumerate() {
            let texel = format!(
                "({} * texture2D({}, vUv{}).rgb)",
                float(layer.blend_factor),
                names::texture_map(channel, index),
                layer.uv_channel
            );
            w.line(format!("color = {};", layer.op.glsl_expr("color", &texel)));
        }
        w.line("return color;");
        w.close("}");
    }

    w.open("vec3 calcNormal() {");
    if config.normal_mapping() {
        w.line("vec3 tangentNormal = normalize(calcNormalColor() * 2.0 - 1.0);");
        w.line("return normalize(vTbn * tangentNormal);");
    } else {
        w.line("return normalize(vNormal);");
    }
    w.close("}");
}

fn write_lighting_functions(w: &mut SourceWriter, config: &ShaderConfig) {
    let lights = config.lights;

    w.open("float specularTerm(vec3 normal, vec3 lightDir, vec3 viewDir) {");
    match config.shading {
        ShadingModel::Phong => {
            w.line("vec3 reflectDir = reflect(-lightDir, normal);");
            w.line(format!(
                "return pow(max(dot(viewDir, reflectDir), 0.0), {});",
                names::material("shininess")
            ));
        }
        ShadingModel::BlinnPhong => {
            w.line("vec3 halfwayDir = normalize(lightDir + viewDir);");
            w.line(format!(
                "return pow(max(dot(normal, halfwayDir), 0.0), {});",
                names::material("shininess")
            ));
        }
    }
    w.close("}");

    let params = "vec3 normal, vec3 viewDir, vec3 ambientColor, vec3 diffuseColor, vec3 specularColor, float shadow";

    if lights.directional {
        w.open(format!("vec3 calcDirLight(DirectionalLight light, {params}) {{"));
        w.line("vec3 lightDir = normalize(-light.direction);");
        w.line("float diff = max(dot(normal, lightDir), 0.0);");
        w.line("float spec = specularTerm(normal, lightDir, viewDir);");
        w.line("vec3 ambient = light.ambient * ambientColor;");
        w.line("vec3 diffuse = light.diffuse * diff * diffuseColor;");
        w.line("vec3 specular = light.specular * spec * specularColor;");
        w.line("return ambient + (1.0 - shadow) * (diffuse + specular);");
        w.close("}");
    }

    if lights.point_count > 0 || lights.spot_count > 0 {
        w.open("float attenuation(float constant, float linear, float quadratic, float distance) {");
        w.line("return 1.0 / (constant + linear * distance + quadratic * distance * distance);");
        w.close("}");
    }

    if lights.point_count > 0 {
        w.open(format!("vec3 calcPointLight(PointLight light, {params}) {{"));
        w.line("vec3 lightDir = normalize(light.position - vFragPos);");
        w.line("float diff = max(dot(normal, lightDir), 0.0);");
        w.line("float spec = specularTerm(normal, lightDir, viewDir);");
        w.line("float att = attenuation(light.attConstant, light.attLinear, light.attQuadratic, length(light.position - vFragPos));");
        w.line("vec3 ambient = light.ambient * ambientColor * att;");
        w.line("vec3 diffuse = light.diffuse * diff * diffuseColor * att;");
        w.line("vec3 specular = light.specular * spec * specularColor * att;");
        w.line("return ambient + (1.0 - shadow) * (diffuse + specular);");
        w.close("}");
    }

    if lights.spot_count > 0 {
        w.open(format!("vec3 calcSpotLight(SpotLight light, {params}) {{"));
        w.line("vec3 lightDir = normalize(light.position - vFragPos);");
        w.line("float diff = max(dot(normal, lightDir), 0.0);");
        w.line("float spec = specularTerm(normal, lightDir, viewDir);");
        w.line("float att = attenuation(light.attConstant, light.attLinear, light.attQuadratic, length(light.position - vFragPos));");
        w.line("float theta = dot(lightDir, normalize(-light.direction));");
        w.line("float epsilon = light.cutOff - light.outerCutOff;");
        w.line("float intensity = clamp((theta - light.outerCutOff) / epsilon, 0.0, 1.0);");
        w.line("vec3 ambient = light.ambient * ambientColor * att;");
        w.line("vec3 diffuse = light.diffuse * diff * diffuseColor * att * intensity;");
        w.line("vec3 specular = light.specular * spec * specularColor * att * intensity;");
        w.line("return ambient + (1.0 - shadow) * (diffuse + specular);");
        w.close("}");
    }
}

fn write_fragment_main(w: &mut SourceWriter, config: &ShaderConfig) {
    let lights = config.lights;
    let shadows = config.casts_shadows();
    let args = "normal, viewDir, ambientColor, diffuseColor, specularColor";

    w.open("void main() {");
    w.line("vec3 normal = calcNormal();");
    w.line(format!(
        "vec3 viewDir = normalize({} - vFragPos);",
        names::VIEW_POS
    ));
    w.line("vec3 ambientColor = calcAmbientColor();");
    w.line("vec3 diffuseColor = calcDiffuseColor();");
    w.line("vec3 specularColor = calcSpecularColor();");

    if lights.is_empty() {
        w.line("vec3 result = diffuseColor;");
    } else {
        w.line("vec3 result = vec3(0.0);");
    }

    if lights.directional {
        let shadow = if shadows {
            format!(
                "planarShadow({}, vDirLightSpacePos, normal, normalize(-{}))",
                names::DIR_SHADOW_MAP,
                names::dir_light("direction")
            )
        } else {
            "0.0".to_string()
        };
        w.line(format!(
            "result += calcDirLight({}, {args}, {shadow});",
            names::DIR_LIGHT
        ));
    }

    for i in 0..lights.point_count {
        let shadow = if shadows {
            format!(
                "pointShadow({}, vFragPos - {}, {})",
                names::point_shadow_map(i),
                names::point_light(i, "position"),
                names::point_light(i, "farPlane")
            )
        } else {
            "0.0".to_string()
        };
        w.line(format!(
            "result += calcPointLight({}[{i}], {args}, {shadow});",
            names::POINT_LIGHTS
        ));
    }

    for i in 0..lights.spot_count {
        let shadow = if shadows {
            format!(
                "planarShadow({}, vSpotLightSpacePos[{i}], normal, normalize({} - vFragPos))",
                names::spot_shadow_map(i),
                names::spot_light(i, "position")
            )
        } else {
            "0.0".to_string()
        };
        w.line(format!(
            "result += calcSpotLight({}[{i}], {args}, {shadow});",
            names::SPOT_LIGHTS
        ));
    }

    w.line("result *= calcLightmapColor();");
    w.line("gl_FragColor = vec4(result, 1.0);");
    w.close("}");
}
