extern crate lumen;

use lumen::video::prelude::*;

const VS: &str = "
    uniform mat4 gWVP;
    void main() { gl_Position = gWVP * vec4(0.0); }
";

const FS: &str = "
    struct Light { vec3 Color; float Intensity; };
    uniform Light gLight;
    uniform float gUnused;
    void main() {}
";

fn headless(visitor: HeadlessVisitor) -> (RenderContext, HeadlessProbe) {
    let probe = visitor.probe();
    (RenderContext::new(Box::new(visitor)), probe)
}

fn build(program: &mut Program) -> Result<()> {
    program.init()?;
    program.compile_stage(VS, ShaderStage::Vertex)?;
    program.compile_stage(FS, ShaderStage::Fragment)?;
    program.link()?;
    program.validate()
}

#[test]
fn creation() {
    let (ctx, probe) = headless(HeadlessVisitor::new().with_fault(Fault::CreateProgram));

    let mut program = Program::new(ctx.clone());
    match program.init() {
        Err(Error::ProgramCreation) => {}
        other => panic!("unexpected {:?}", other),
    }

    assert_eq!(program.status(), ProgramStatus::Uninitialized);
    assert!(ctx.is_empty());

    drop(program);
    assert_eq!(probe.deleted(), 0);
}

#[test]
fn compile() {
    let (ctx, probe) = headless(HeadlessVisitor::new());

    let mut program = Program::new(ctx.clone());
    program.init().unwrap();

    match program.compile_stage("", ShaderStage::Fragment) {
        Err(Error::Compile { stage, log }) => {
            assert_eq!(stage, ShaderStage::Fragment);
            assert!(!log.is_empty());
        }
        other => panic!("unexpected {:?}", other),
    }

    // A failed stage is not attached, so it could be compiled again.
    assert!(program.stages().is_empty());
    program.compile_stage(FS, ShaderStage::Fragment).unwrap();

    probe.inject(Fault::Compile(ShaderStage::Vertex));
    match program.compile_stage(VS, ShaderStage::Vertex) {
        Err(Error::Compile { stage, .. }) => assert_eq!(stage, ShaderStage::Vertex),
        other => panic!("unexpected {:?}", other),
    }

    probe.clear(Fault::Compile(ShaderStage::Vertex));
    program.compile_stage(VS, ShaderStage::Vertex).unwrap();
    program.link().unwrap();
}

#[test]
fn link_without_stages() {
    let (ctx, probe) = headless(HeadlessVisitor::new());

    let mut program = Program::new(ctx);
    program.init().unwrap();
    program.compile_stage(FS, ShaderStage::Fragment).unwrap();

    match program.link() {
        Err(Error::Link(log)) => assert!(log.contains("vertex")),
        other => panic!("unexpected {:?}", other),
    }

    // Nothing reached the backend.
    assert_eq!(program.status(), ProgramStatus::Created);
    assert!(probe.active_uniforms(program.handle().unwrap()).is_empty());
}

#[test]
fn link_and_validate_failures() {
    let (ctx, _) = headless(HeadlessVisitor::new().with_fault(Fault::Link));
    let mut program = Program::new(ctx);
    match build(&mut program) {
        Err(Error::Link(_)) => {}
        other => panic!("unexpected {:?}", other),
    }

    assert_eq!(program.status(), ProgramStatus::Invalid);
    assert_eq!(
        program.enable().unwrap_err().precondition(),
        Some(&PreconditionError::NotUsable)
    );

    let (ctx, _) = headless(HeadlessVisitor::new().with_fault(Fault::Validate));
    let mut program = Program::new(ctx.clone());
    match build(&mut program) {
        Err(Error::Validation(_)) => {}
        other => panic!("unexpected {:?}", other),
    }

    assert!(program.enable().is_err());
    assert_eq!(ctx.active_program(), None);
}

#[test]
fn uniforms() {
    let (ctx, probe) = headless(HeadlessVisitor::new().with_inactive_uniform("gUnused"));

    let mut program = Program::new(ctx);
    build(&mut program).unwrap();
    program.enable().unwrap();

    let handle = program.handle().unwrap();
    assert_eq!(
        probe.active_uniforms(handle),
        vec!["gWVP", "gLight.Color", "gLight.Intensity"]
    );

    let color = program.resolve_uniform("gLight.Color").unwrap();
    let intensity = program.resolve_uniform("gLight.Intensity").unwrap();
    assert!(color.is_resolved());
    assert_ne!(color, intensity);
    assert_eq!(program.resolve_uniform("gLight.Color").unwrap(), color);

    program.bind(color, [1.0f32, 0.5, 0.25]).unwrap();
    program.bind(intensity, 0.75f32).unwrap();
    assert_eq!(
        probe.uniform(handle, "gLight.Color"),
        Some(UniformVariable::Vector3f([1.0, 0.5, 0.25]))
    );
    assert_eq!(
        probe.uniform(handle, "gLight.Intensity"),
        Some(UniformVariable::F32(0.75))
    );

    // Both optimized-away and misspelled uniforms resolve to the sentinel, and
    // uploading to it changes nothing.
    let uploads = probe.uploads();
    for name in &["gUnused", "gLight.Colour"] {
        let location = program.resolve_uniform(name).unwrap();
        assert_eq!(location, UniformLocation::UNRESOLVED);
        program.bind(location, 1.0f32).unwrap();
    }

    assert_eq!(probe.uploads(), uploads);
}

#[test]
fn active_program() {
    let (ctx, probe) = headless(HeadlessVisitor::new());

    let mut a = Program::new(ctx.clone());
    let mut b = Program::new(ctx.clone());
    build(&mut a).unwrap();
    build(&mut b).unwrap();

    a.enable().unwrap();
    assert!(a.is_active());
    assert!(!b.is_active());

    let location = b.resolve_uniform("gWVP").unwrap();
    assert_eq!(
        b.bind(location, 1.0f32).unwrap_err().precondition(),
        Some(&PreconditionError::NotActive)
    );

    b.enable().unwrap();
    assert!(!a.is_active());
    assert_eq!(probe.binded_program(), b.handle().ok());

    ctx.unbind().unwrap();
    assert!(!b.is_active());
    assert_eq!(probe.binded_program(), None);
}

#[test]
fn destroy_once() {
    let (ctx, probe) = headless(HeadlessVisitor::new());

    let mut program = Program::new(ctx.clone());
    build(&mut program).unwrap();
    program.enable().unwrap();
    let handle = program.handle().unwrap();

    assert_eq!(probe.alive(), 1);
    drop(program);

    assert_eq!(probe.alive(), 0);
    assert_eq!(probe.deleted(), 1);
    assert!(!probe.is_alive(handle));
    assert_eq!(ctx.active_program(), None);
    assert_eq!(probe.binded_program(), None);

    // Never initialized, nothing to release.
    drop(Program::new(ctx.clone()));
    assert_eq!(probe.deleted(), 1);
}
