extern crate env_logger;
extern crate lumen;

use lumen::lighting::{GlobalUniform, LightField, UniformTable};
use lumen::prelude::*;
use lumen::utils::hash::FastHashSet;

fn headless(visitor: HeadlessVisitor) -> (RenderContext, HeadlessProbe) {
    let _ = env_logger::try_init();
    let probe = visitor.probe();
    (RenderContext::new(Box::new(visitor)), probe)
}

fn ready(variant: Variant) -> (LightingTechnique, HeadlessProbe) {
    let (ctx, probe) = headless(HeadlessVisitor::new());
    let mut technique = LightingTechnique::new(ctx, variant);
    technique.init().unwrap();
    technique.enable().unwrap();
    (technique, probe)
}

fn handle(technique: &LightingTechnique) -> ProgramHandle {
    technique.program().handle().unwrap()
}

fn written(probe: &HeadlessProbe, technique: &LightingTechnique, prefix: &str) -> Vec<String> {
    probe
        .uniforms(handle(technique))
        .into_iter()
        .map(|v| v.0)
        .filter(|v| v.starts_with(prefix))
        .collect()
}

fn precondition<T: std::fmt::Debug>(result: Result<T>) -> PreconditionError {
    match result {
        Err(Error::Precondition(err)) => err,
        other => panic!("expected a precondition error, got {:?}", other),
    }
}

fn white(ambient: f32, diffuse: f32) -> BaseLight {
    BaseLight::new(Vector3::new(1.0, 1.0, 1.0), ambient, diffuse)
}

#[test]
fn init_every_variant() {
    for (&variant, &len) in Variant::ALL.iter().zip(&[5, 7, 10, 32, 51]) {
        let (technique, probe) = ready(variant);
        let table = technique.uniforms().unwrap();

        assert_eq!(technique.variant(), variant);
        assert_eq!(table.len(), len);
        assert_eq!(table.unresolved().count(), 0);
        assert_eq!(probe.active_uniforms(handle(&technique)).len(), len);

        for (key, entry) in table.iter() {
            assert!(entry.location.is_resolved(), "{} is unresolved", key);
            assert_eq!(table.name(key), Some(entry.name.as_str()));
        }
    }
}

#[test]
fn init_twice() {
    let (mut technique, _) = ready(Variant::Ambient);
    assert_eq!(
        precondition(technique.init()),
        PreconditionError::AlreadyInitialized
    );
    assert!(technique.is_initialized());
}

#[test]
fn init_failure() {
    let (ctx, probe) = headless(
        HeadlessVisitor::new().with_fault(Fault::Compile(ShaderStage::Fragment)),
    );

    let mut technique = LightingTechnique::new(ctx, Variant::PointLights);
    match technique.init() {
        Err(Error::Compile { stage, .. }) => assert_eq!(stage, ShaderStage::Fragment),
        other => panic!("unexpected {:?}", other),
    }

    assert!(!technique.is_initialized());
    assert!(technique.uniforms().is_none());
    assert_eq!(
        precondition(technique.enable()),
        PreconditionError::NotInitialized
    );
    assert_eq!(
        precondition(technique.set_point_lights(&[])),
        PreconditionError::NotInitialized
    );

    drop(technique);
    assert_eq!(probe.alive(), 0);
}

#[test]
fn not_active() {
    let (ctx, probe) = headless(HeadlessVisitor::new());

    let mut a = LightingTechnique::new(ctx.clone(), Variant::Diffuse);
    let mut b = LightingTechnique::new(ctx.clone(), Variant::Diffuse);
    a.init().unwrap();
    b.init().unwrap();

    let light = DirectionalLight::default();
    assert_eq!(
        precondition(a.set_directional_light(&light)),
        PreconditionError::NotActive
    );

    a.enable().unwrap();
    b.enable().unwrap();
    assert_eq!(
        precondition(a.set_world_transform(&Matrix4::from_scale(2.0))),
        PreconditionError::NotActive
    );
    assert!(probe.uniforms(handle(&a)).is_empty());

    b.set_directional_light(&light).unwrap();
    assert!(!probe.uniforms(handle(&b)).is_empty());
}

#[test]
fn unsupported() {
    let (technique, probe) = ready(Variant::Diffuse);

    let checks = vec![
        technique.set_point_lights(&[]),
        technique.set_spot_lights(&[]),
        technique.set_eye_world_position(Vector3::new(0.0, 0.0, 0.0)),
        technique.set_material_specular_intensity(1.0),
        technique.set_material_specular_power(32.0),
    ];

    for result in checks {
        match precondition(result) {
            PreconditionError::Unsupported { variant, .. } => {
                assert_eq!(variant, Variant::Diffuse)
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    assert_eq!(probe.uploads(), 0);

    // Unsupported wins over the missing initialization.
    let ctx = RenderContext::headless();
    let technique = LightingTechnique::new(ctx, Variant::PointLights);
    match precondition(technique.set_spot_lights(&[])) {
        PreconditionError::Unsupported { .. } => {}
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn directional_light() {
    let (technique, probe) = ready(Variant::Specular);
    let h = handle(&technique);

    let light = DirectionalLight {
        base: BaseLight::new(Vector3::new(1.0, 0.5, 0.25), 0.1, 0.75),
        direction: Vector3::new(2.0, 0.0, 0.0),
    };

    technique.set_directional_light(&light).unwrap();
    let first = probe.uniforms(h);

    assert_eq!(
        probe.uniform(h, "gDirectionalLight.Color"),
        Some(UniformVariable::Vector3f([1.0, 0.5, 0.25]))
    );
    assert_eq!(
        probe.uniform(h, "gDirectionalLight.AmbientIntensity"),
        Some(UniformVariable::F32(0.1))
    );
    assert_eq!(
        probe.uniform(h, "gDirectionalLight.DiffuseIntensity"),
        Some(UniformVariable::F32(0.75))
    );
    assert_eq!(
        probe.uniform(h, "gDirectionalLight.Direction"),
        Some(UniformVariable::Vector3f([1.0, 0.0, 0.0]))
    );

    technique.set_directional_light(&light).unwrap();
    assert_eq!(probe.uniforms(h), first);
}

#[test]
fn ambient_skips_direction() {
    let (technique, probe) = ready(Variant::Ambient);

    // The ambient layout has no direction, so a degenerate one is accepted.
    let light = DirectionalLight {
        base: white(0.2, 0.9),
        direction: Vector3::new(0.0, 0.0, 0.0),
    };

    technique.set_directional_light(&light).unwrap();
    assert_eq!(
        written(&probe, &technique, "gDirectionalLight"),
        vec!["gDirectionalLight.AmbientIntensity", "gDirectionalLight.Color"]
    );

    let (technique, _) = ready(Variant::Diffuse);
    assert_eq!(
        precondition(technique.set_directional_light(&light)),
        PreconditionError::ZeroDirection
    );
}

#[test]
fn invalid_lights() {
    let (technique, probe) = ready(Variant::SpotLights);

    let negative = DirectionalLight {
        base: white(-0.1, 1.0),
        ..DirectionalLight::default()
    };

    match precondition(technique.set_directional_light(&negative)) {
        PreconditionError::NegativeIntensity(v) => assert_eq!(v, -0.1),
        other => panic!("unexpected {:?}", other),
    }

    let good = PointLight {
        base: white(0.0, 1.0),
        ..PointLight::default()
    };

    let bad = PointLight {
        attenuation: Attenuation {
            constant: 0.0,
            linear: 0.0,
            exp: 0.0,
        },
        ..good
    };

    match precondition(technique.set_point_lights(&[good, bad])) {
        PreconditionError::AttenuationConstant(v) => assert_eq!(v, 0.0),
        other => panic!("unexpected {:?}", other),
    }

    // The valid light before the bad one is not written either.
    assert!(written(&probe, &technique, "gPointLights").is_empty());
    assert!(written(&probe, &technique, "gNumPointLights").is_empty());
}

#[test]
fn point_lights() {
    let (technique, probe) = ready(Variant::PointLights);
    let h = handle(&technique);

    let lights: Vec<_> = (0..3)
        .map(|i| PointLight {
            base: white(0.0, 0.5),
            position: Vector3::new(i as f32, 1.0, 0.0),
            attenuation: Attenuation {
                linear: 0.1,
                ..Attenuation::default()
            },
        })
        .collect();

    technique.set_point_lights(&lights).unwrap();
    assert_eq!(
        probe.uniform(h, "gNumPointLights"),
        Some(UniformVariable::I32(3))
    );
    assert_eq!(
        probe.uniform(h, "gPointLights[2].Position"),
        Some(UniformVariable::Vector3f([2.0, 1.0, 0.0]))
    );
    assert_eq!(
        probe.uniform(h, "gPointLights[1].Atten.Linear"),
        Some(UniformVariable::F32(0.1))
    );
    assert_eq!(
        probe.uniform(h, "gPointLights[0].Base.DiffuseIntensity"),
        Some(UniformVariable::F32(0.5))
    );
    assert_eq!(written(&probe, &technique, "gPointLights").len(), 21);

    // Fewer lights update the count, stale slots are left as they were.
    technique.set_point_lights(&lights[..1]).unwrap();
    assert_eq!(
        probe.uniform(h, "gNumPointLights"),
        Some(UniformVariable::I32(1))
    );

    technique.set_point_lights(&[]).unwrap();
    assert_eq!(
        probe.uniform(h, "gNumPointLights"),
        Some(UniformVariable::I32(0))
    );
}

#[test]
fn too_many_lights() {
    let (technique, probe) = ready(Variant::SpotLights);
    let h = handle(&technique);

    let points = vec![PointLight::default(); 4];
    assert_eq!(
        precondition(technique.set_point_lights(&points)),
        PreconditionError::TooManyLights {
            category: LightCategory::Point,
            len: 4,
            cap: 3,
        }
    );

    assert_eq!(probe.uniform(h, "gPointLights[0].Base.Color"), None);
    assert_eq!(probe.uniform(h, "gNumPointLights"), None);

    let spots = vec![SpotLight::default(); 3];
    match precondition(technique.set_spot_lights(&spots)) {
        PreconditionError::TooManyLights { len, cap, .. } => {
            assert_eq!(len, 3);
            assert_eq!(cap, 2);
        }
        other => panic!("unexpected {:?}", other),
    }

    assert_eq!(probe.uploads(), 0);
}

#[test]
fn spot_lights() {
    let (technique, probe) = ready(Variant::SpotLights);
    let h = handle(&technique);

    let spot = SpotLight {
        base: white(0.0, 15.0),
        position: Vector3::new(0.0, -1.9, 0.0),
        direction: Vector3::new(0.0, 0.0, 4.0),
        cutoff: 20.0,
        ..SpotLight::default()
    };

    technique.set_spot_lights(&[spot]).unwrap();

    match probe.uniform(h, "gSpotLights[0].Cutoff") {
        Some(UniformVariable::F32(v)) => assert!((v - 0.9397).abs() < 1e-4),
        other => panic!("unexpected {:?}", other),
    }

    assert_eq!(
        probe.uniform(h, "gSpotLights[0].Direction"),
        Some(UniformVariable::Vector3f([0.0, 0.0, 1.0]))
    );
    assert_eq!(
        probe.uniform(h, "gSpotLights[0].Base.Position"),
        Some(UniformVariable::Vector3f([0.0, -1.9, 0.0]))
    );
    assert_eq!(
        probe.uniform(h, "gSpotLights[0].Base.Base.DiffuseIntensity"),
        Some(UniformVariable::F32(15.0))
    );
    assert_eq!(
        probe.uniform(h, "gNumSpotLights"),
        Some(UniformVariable::I32(1))
    );
    assert_eq!(probe.uniform(h, "gSpotLights[1].Cutoff"), None);

    let dark = SpotLight {
        direction: Vector3::new(0.0, 0.0, 0.0),
        ..spot
    };

    assert_eq!(
        precondition(technique.set_spot_lights(&[spot, dark])),
        PreconditionError::ZeroDirection
    );
    assert_eq!(
        probe.uniform(h, "gNumSpotLights"),
        Some(UniformVariable::I32(1))
    );
}

#[test]
fn globals() {
    let (technique, probe) = ready(Variant::SpotLights);
    let h = handle(&technique);

    let world = Matrix4::from_translation(Vector3::new(1.0, 2.0, 3.0));
    technique.set_world_transform(&world).unwrap();

    match probe.uniform(h, "gWorld") {
        Some(UniformVariable::Matrix4f(rows, transpose)) => {
            assert!(transpose);
            assert_eq!(rows[0], [1.0, 0.0, 0.0, 1.0]);
            assert_eq!(rows[1], [0.0, 1.0, 0.0, 2.0]);
            assert_eq!(rows[2], [0.0, 0.0, 1.0, 3.0]);
        }
        other => panic!("unexpected {:?}", other),
    }

    technique.set_texture_unit(3).unwrap();
    technique.set_eye_world_position(Vector3::new(0.0, 0.0, -3.0)).unwrap();
    technique.set_material_specular_intensity(0.5).unwrap();
    technique.set_material_specular_power(16.0).unwrap();

    assert_eq!(probe.uniform(h, "gSampler"), Some(UniformVariable::Sampler2D(3)));
    assert_eq!(
        probe.uniform(h, "gEyeWorldPos"),
        Some(UniformVariable::Vector3f([0.0, 0.0, -3.0]))
    );
    assert_eq!(
        probe.uniform(h, "gMatSpecularIntensity"),
        Some(UniformVariable::F32(0.5))
    );
    assert_eq!(
        probe.uniform(h, "gSpecularPower"),
        Some(UniformVariable::F32(16.0))
    );
}

#[test]
fn stable_locations() {
    let (technique, _) = ready(Variant::PointLights);
    let table = technique.uniforms().unwrap();

    let key = UniformKey::point(2, LightField::AttenuationExp);
    assert_eq!(table.location(key), table.location(key));
    assert_eq!(table.name(key), Some("gPointLights[2].Atten.Exp"));
    assert_eq!(
        table.location(GlobalUniform::WorldViewProjection),
        technique.program().resolve_uniform("gWVP").ok()
    );

    assert!(table.location(UniformKey::spot(0, LightField::Cutoff)).is_none());
}

#[test]
fn inactive_uniform() {
    let (ctx, probe) = headless(
        HeadlessVisitor::new().with_inactive_uniform("gPointLights[2].Atten.Exp"),
    );

    let mut technique = LightingTechnique::new(ctx, Variant::PointLights);
    technique.init().unwrap();
    technique.enable().unwrap();

    let key = UniformKey::point(2, LightField::AttenuationExp);
    let table = technique.uniforms().unwrap();
    assert_eq!(table.location(key), Some(UniformLocation::UNRESOLVED));
    assert_eq!(table.unresolved().collect::<Vec<_>>(), vec![key]);

    let lights = vec![PointLight::default(); 3];
    technique.set_point_lights(&lights).unwrap();
    assert_eq!(written(&probe, &technique, "gPointLights").len(), 20);
}

#[test]
fn undeclared_uniform() {
    let ctx = RenderContext::headless();
    let mut program = Program::new(ctx);
    program.init().unwrap();
    program
        .compile_stage("void main() {}", ShaderStage::Vertex)
        .unwrap();
    program
        .compile_stage("void main() {}", ShaderStage::Fragment)
        .unwrap();
    program.link().unwrap();

    let declared = FastHashSet::default();
    match UniformTable::resolve(&program, Variant::Ambient.features(), &declared) {
        Err(Error::UndeclaredUniform(name)) => assert_eq!(name, "gWorld"),
        other => panic!("unexpected {:?}", other.map(|v| v.len())),
    }
}

#[test]
fn apply_frame() {
    let (technique, probe) = ready(Variant::SpotLights);
    let h = handle(&technique);

    let rig = OrbitRig::new();
    let frame = rig.frame(Matrix4::from_scale(1.0), Matrix4::from_scale(0.5));
    technique.apply(&frame, &rig.scene()).unwrap();

    let len = technique.uniforms().unwrap().len();
    assert_eq!(probe.uniforms(h).len(), len);
    assert_eq!(
        probe.uniform(h, "gNumSpotLights"),
        Some(UniformVariable::I32(2))
    );
    assert_eq!(
        probe.uniform(h, "gEyeWorldPos"),
        Some(UniformVariable::Vector3f([0.0, 0.0, -3.0]))
    );

    // A scene that the variant can't show is rejected up front.
    let (technique, probe) = ready(Variant::Specular);
    match precondition(technique.apply(&frame, &rig.scene())) {
        PreconditionError::Unsupported { variant, .. } => assert_eq!(variant, Variant::Specular),
        other => panic!("unexpected {:?}", other),
    }

    assert_eq!(probe.uploads(), 0);
}

#[test]
fn rejected_frame_uploads_nothing() {
    let (technique, probe) = ready(Variant::SpotLights);
    let h = handle(&technique);

    let rig = OrbitRig::new();
    let frame = rig.frame(Matrix4::from_scale(1.0), Matrix4::from_scale(1.0));

    let mut scene = rig.scene();
    scene.points.push(PointLight::default());
    match precondition(technique.apply(&frame, &scene)) {
        PreconditionError::TooManyLights { category, len, cap } => {
            assert_eq!(category, LightCategory::Point);
            assert_eq!((len, cap), (4, 3));
        }
        other => panic!("unexpected {:?}", other),
    }

    assert_eq!(probe.uploads(), 0);
    assert_eq!(probe.uniform(h, "gWVP"), None);
    assert_eq!(probe.uniform(h, "gDirectionalLight.Base.Color"), None);

    // The last spot light is checked before the first upload too.
    let mut scene = rig.scene();
    scene.spots[1].direction = Vector3::new(0.0, 0.0, 0.0);
    assert_eq!(
        precondition(technique.apply(&frame, &scene)),
        PreconditionError::ZeroDirection
    );
    assert_eq!(probe.uploads(), 0);

    technique.apply(&frame, &rig.scene()).unwrap();
    assert!(probe.uploads() > 0);
}

#[test]
fn glsl_version() {
    let (ctx, probe) = headless(HeadlessVisitor::new());
    let mut technique = LightingTechnique::with_glsl_version(ctx, Variant::Diffuse, "300 es");
    technique.init().unwrap();

    assert_eq!(technique.glsl_version(), "300 es");
    assert_eq!(probe.active_uniforms(handle(&technique)).len(), 7);
}
