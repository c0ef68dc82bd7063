//! The embedded GLSL sources of the techniques. The vertex stage is shared,
//! the fragment stage is assembled from chunks according to `Features`.

use std::fmt::Write;

use super::layout::{DIRECTIONAL_UNIFORM, POINT_UNIFORM, SPOT_UNIFORM};
use super::table::GlobalUniform;
use super::variant::Features;

pub const DEFAULT_GLSL_VERSION: &str = "330 core";

const VS: &str = include_str!("shaders/lighting.vs");

const AMBIENT_STRUCTS: &str = include_str!("shaders/ambient_structs.glsl");
const FLAT_STRUCTS: &str = include_str!("shaders/flat_structs.glsl");
const NESTED_STRUCTS: &str = include_str!("shaders/nested_structs.glsl");
const SPOT_STRUCTS: &str = include_str!("shaders/spot_structs.glsl");

const AMBIENT_FS: &str = include_str!("shaders/ambient.fs");
const DIRECTIONAL_FS: &str = include_str!("shaders/directional.fs");
const SPECULAR_FS: &str = include_str!("shaders/specular.fs");
const LIGHTS_FS: &str = include_str!("shaders/lights.fs");
const SPOT_FS: &str = include_str!("shaders/spot.fs");

const SPECULAR_HOOK: &str = "        // @specular\n";

/// The vertex and fragment sources of one variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSources {
    pub vertex: String,
    pub fragment: String,
}

impl ShaderSources {
    pub fn new(features: &Features, glsl_version: &str) -> Self {
        ShaderSources {
            vertex: vertex(glsl_version),
            fragment: fragment(features, glsl_version),
        }
    }
}

pub fn vertex(glsl_version: &str) -> String {
    format!("#version {}\n\n{}", glsl_version, VS)
}

pub fn fragment(features: &Features, glsl_version: &str) -> String {
    let mut fs = String::with_capacity(4096);

    // Writing into a `String` never fails.
    let _ = write!(
        fs,
        "#version {}\n\n\
         in vec2 TexCoord0;\n\
         in vec3 Normal0;\n\
         in vec3 WorldPos0;\n\n\
         out vec4 FragColor;\n\n",
        glsl_version
    );

    if features.max_point_lights > 0 {
        let _ = writeln!(fs, "const int MAX_POINT_LIGHTS = {};", features.max_point_lights);
    }

    if features.max_spot_lights > 0 {
        let _ = writeln!(fs, "const int MAX_SPOT_LIGHTS = {};", features.max_spot_lights);
    }

    if features.max_point_lights > 0 || features.max_spot_lights > 0 {
        fs.push('\n');
    }

    if features.is_nested() {
        fs.push_str(NESTED_STRUCTS);
        if features.max_spot_lights > 0 {
            fs.push('\n');
            fs.push_str(SPOT_STRUCTS);
        }
    } else if features.diffuse {
        fs.push_str(FLAT_STRUCTS);
    } else {
        fs.push_str(AMBIENT_STRUCTS);
    }

    fs.push('\n');
    uniforms(&mut fs, features);
    fs.push('\n');

    if features.is_nested() {
        fs.push_str(LIGHTS_FS);
        if features.max_spot_lights > 0 {
            fs.push('\n');
            fs.push_str(SPOT_FS);
        }

        fs.push('\n');
        nested_main(&mut fs, features);
    } else if features.diffuse {
        let specular = if features.specular { SPECULAR_FS } else { "" };
        fs.push_str(&DIRECTIONAL_FS.replace(SPECULAR_HOOK, specular));
    } else {
        fs.push_str(AMBIENT_FS);
    }

    fs
}

fn uniforms(fs: &mut String, features: &Features) {
    let _ = writeln!(fs, "uniform DirectionalLight {};", DIRECTIONAL_UNIFORM);
    let _ = writeln!(fs, "uniform sampler2D {};", GlobalUniform::Sampler.name());

    if features.specular {
        let _ = writeln!(fs, "uniform vec3 {};", GlobalUniform::EyeWorldPos.name());
        let _ = writeln!(fs, "uniform float {};", GlobalUniform::MatSpecularIntensity.name());
        let _ = writeln!(fs, "uniform float {};", GlobalUniform::MatSpecularPower.name());
    }

    if features.max_point_lights > 0 {
        let _ = writeln!(fs, "uniform int {};", GlobalUniform::NumPointLights.name());
        let _ = writeln!(fs, "uniform PointLight {}[MAX_POINT_LIGHTS];", POINT_UNIFORM);
    }

    if features.max_spot_lights > 0 {
        let _ = writeln!(fs, "uniform int {};", GlobalUniform::NumSpotLights.name());
        let _ = writeln!(fs, "uniform SpotLight {}[MAX_SPOT_LIGHTS];", SPOT_UNIFORM);
    }
}

fn nested_main(fs: &mut String, features: &Features) {
    fs.push_str(
        "void main()\n\
         {\n    \
             vec3 Normal = normalize(Normal0);\n    \
             vec4 TotalLight = CalcDirectionalLight(Normal);\n",
    );

    if features.max_point_lights > 0 {
        let _ = write!(
            fs,
            "\n    for (int i = 0 ; i < {} ; i++) {{\n        \
             TotalLight += CalcPointLight({}[i], Normal);\n    \
             }}\n",
            GlobalUniform::NumPointLights.name(),
            POINT_UNIFORM
        );
    }

    if features.max_spot_lights > 0 {
        let _ = write!(
            fs,
            "\n    for (int i = 0 ; i < {} ; i++) {{\n        \
             TotalLight += CalcSpotLight({}[i], Normal);\n    \
             }}\n",
            GlobalUniform::NumSpotLights.name(),
            SPOT_UNIFORM
        );
    }

    let _ = write!(
        fs,
        "\n    FragColor = texture({}, TexCoord0.xy) * TotalLight;\n}}\n",
        GlobalUniform::Sampler.name()
    );
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lighting::table::UniformTable;
    use crate::lighting::variant::Variant;
    use crate::video::reflect;

    #[test]
    fn versions() {
        let sources = ShaderSources::new(Variant::Ambient.features(), "300 es");
        assert!(sources.vertex.starts_with("#version 300 es\n"));
        assert!(sources.fragment.starts_with("#version 300 es\n"));
    }

    #[test]
    fn gates() {
        let fs = fragment(Variant::Ambient.features(), DEFAULT_GLSL_VERSION);
        assert!(!fs.contains("DiffuseFactor"));

        let fs = fragment(Variant::Diffuse.features(), DEFAULT_GLSL_VERSION);
        assert!(fs.contains("DiffuseFactor"));
        assert!(!fs.contains("gEyeWorldPos"));
        assert!(!fs.contains("@specular"));

        let fs = fragment(Variant::Specular.features(), DEFAULT_GLSL_VERSION);
        assert!(fs.contains("pow(SpecularFactor, gSpecularPower)"));

        let fs = fragment(Variant::PointLights.features(), DEFAULT_GLSL_VERSION);
        assert!(fs.contains("CalcPointLight(gPointLights[i], Normal)"));
        assert!(!fs.contains("SpotLight"));

        let fs = fragment(Variant::SpotLights.features(), DEFAULT_GLSL_VERSION);
        assert!(fs.contains("CalcSpotLight(gSpotLights[i], Normal)"));
    }

    #[test]
    fn alpha_scales_with_intensity() {
        for &variant in Variant::ALL.iter() {
            let fs = fragment(variant.features(), DEFAULT_GLSL_VERSION);
            assert!(fs.contains("Color, 1.0) * "), "{}", variant);
            assert!(!fs.contains(".Color * "), "{}", variant);
        }
    }

    #[test]
    fn declares_every_table_name() {
        for &variant in Variant::ALL.iter() {
            let features = variant.features();
            let sources = ShaderSources::new(features, DEFAULT_GLSL_VERSION);

            let mut declared = reflect::declared_uniforms(&sources.vertex).unwrap();
            declared.extend(reflect::declared_uniforms(&sources.fragment).unwrap());

            let names = UniformTable::synthesize(features);
            for (key, name) in &names {
                assert!(declared.contains(name), "{}: {} ({})", variant, name, key);
            }

            // Nothing is declared without a key in the table.
            assert_eq!(declared.len(), names.len(), "{}", variant);
        }
    }
}
