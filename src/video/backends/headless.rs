//! A backend without any GPU. Programs are "compiled" by reflecting their
//! sources, and uploads are recorded so they can be inspected with a
//! `HeadlessProbe`.

use std::cell::RefCell;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::utils::hash::{FastHashMap, FastHashSet};
use crate::utils::hash_value::HashValue;
use crate::video::errors::*;
use crate::video::program::ProgramHandle;
use crate::video::reflect;
use crate::video::uniform::{UniformLocation, UniformVariable};

use super::utils::DataVec;
use super::Visitor;

/// Failures that could be injected into a `HeadlessVisitor`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Fault {
    CreateProgram,
    Compile(ShaderStage),
    Link,
    Validate,
}

#[derive(Debug, Default)]
struct HeadlessProgram {
    sources: SmallVec<[(ShaderStage, String); 2]>,
    linked: bool,
    names: Vec<String>,
    locations: FastHashMap<HashValue<str>, UniformLocation>,
    values: FastHashMap<i32, UniformVariable>,
}

#[derive(Debug, Default)]
struct HeadlessState {
    programs: DataVec<HeadlessProgram>,
    faults: FastHashSet<Fault>,
    inactive: FastHashSet<String>,
    binded_program: Option<ProgramHandle>,
    alive: usize,
    deleted: usize,
    uploads: usize,
}

pub struct HeadlessVisitor {
    state: Rc<RefCell<HeadlessState>>,
}

impl Default for HeadlessVisitor {
    fn default() -> Self {
        HeadlessVisitor::new()
    }
}

impl HeadlessVisitor {
    pub fn new() -> Self {
        HeadlessVisitor {
            state: Rc::new(RefCell::new(HeadlessState::default())),
        }
    }

    /// Makes the corresponding call fail until the fault is cleared.
    pub fn with_fault(self, fault: Fault) -> Self {
        self.state.borrow_mut().faults.insert(fault);
        self
    }

    /// Declares a uniform that the "linker" optimizes away. It won't get a
    /// location even though it's declared in sources.
    pub fn with_inactive_uniform<T: Into<String>>(self, name: T) -> Self {
        self.state.borrow_mut().inactive.insert(name.into());
        self
    }

    pub fn probe(&self) -> HeadlessProbe {
        HeadlessProbe {
            state: self.state.clone(),
        }
    }
}

impl HeadlessState {
    fn program(&self, handle: ProgramHandle) -> Result<&HeadlessProgram> {
        self.programs
            .get(handle)
            .ok_or_else(|| Error::Backend(format!("{} is invalid.", handle)))
    }

    fn program_mut(&mut self, handle: ProgramHandle) -> Result<&mut HeadlessProgram> {
        self.programs
            .get_mut(handle)
            .ok_or_else(|| Error::Backend(format!("{} is invalid.", handle)))
    }

    fn fault(&self, fault: Fault) -> bool {
        self.faults.contains(&fault)
    }
}

impl Visitor for HeadlessVisitor {
    unsafe fn create_program(&mut self, handle: ProgramHandle) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.fault(Fault::CreateProgram) {
            return Err(Error::ProgramCreation);
        }

        state.programs.create(handle, HeadlessProgram::default());
        state.alive += 1;
        Ok(())
    }

    unsafe fn compile_shader(
        &mut self,
        handle: ProgramHandle,
        stage: ShaderStage,
        source: &str,
    ) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.fault(Fault::Compile(stage)) {
            let log = "0:1(1): error: injected compile failure".to_owned();
            return Err(Error::Compile { stage, log });
        }

        if source.trim().is_empty() {
            let log = "0:1(1): error: empty shader source".to_owned();
            return Err(Error::Compile { stage, log });
        }

        if !source.contains("void main") {
            let log = "0:1(1): error: missing entry point `main`".to_owned();
            return Err(Error::Compile { stage, log });
        }

        if let Err(err) = reflect::declared_uniforms(source) {
            let log = format!("0:1(1): error: {}", err);
            return Err(Error::Compile { stage, log });
        }

        let program = state.program_mut(handle)?;
        program.sources.push((stage, source.to_owned()));
        Ok(())
    }

    unsafe fn link_program(&mut self, handle: ProgramHandle) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.fault(Fault::Link) {
            return Err(Error::Link("error: injected link failure".to_owned()));
        }

        let mut names = Vec::new();
        {
            let program = state.program(handle)?;
            for &stage in &[ShaderStage::Vertex, ShaderStage::Fragment] {
                let source = program
                    .sources
                    .iter()
                    .find(|v| v.0 == stage)
                    .map(|v| &v.1)
                    .ok_or_else(|| {
                        Error::Link(format!("error: no {} shader attached.", stage))
                    })?;

                for name in reflect::declared_uniforms(source)? {
                    if !state.inactive.contains(&name) && !names.contains(&name) {
                        names.push(name);
                    }
                }
            }
        }

        let program = state.program_mut(handle)?;
        program.locations.clear();
        program.values.clear();
        for (i, name) in names.iter().enumerate() {
            let location = UniformLocation::new(i as i32);
            program.locations.insert(name.as_str().into(), location);
        }

        program.names = names;
        program.linked = true;
        Ok(())
    }

    unsafe fn validate_program(&mut self, handle: ProgramHandle) -> Result<()> {
        let state = self.state.borrow();
        if state.fault(Fault::Validate) {
            return Err(Error::Validation("error: injected validation failure".to_owned()));
        }

        if !state.program(handle)?.linked {
            return Err(Error::Validation("error: program is not linked.".to_owned()));
        }

        Ok(())
    }

    unsafe fn use_program(&mut self, handle: Option<ProgramHandle>) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if let Some(handle) = handle {
            if !state.program(handle)?.linked {
                return Err(Error::Backend(
                    "[Headless] Can not use a program which is not linked.".to_owned(),
                ));
            }
        }

        state.binded_program = handle;
        Ok(())
    }

    unsafe fn uniform_location(
        &mut self,
        handle: ProgramHandle,
        name: &str,
    ) -> Result<UniformLocation> {
        let state = self.state.borrow();
        let program = state.program(handle)?;
        if !program.linked {
            return Err(Error::Backend(
                "[Headless] Can not query uniforms of a program which is not linked.".to_owned(),
            ));
        }

        let hash: HashValue<str> = name.into();
        Ok(program
            .locations
            .get(&hash)
            .cloned()
            .unwrap_or(UniformLocation::UNRESOLVED))
    }

    unsafe fn bind_uniform(
        &mut self,
        location: UniformLocation,
        variable: &UniformVariable,
    ) -> Result<()> {
        if !location.is_resolved() {
            return Ok(());
        }

        let mut state = self.state.borrow_mut();
        let handle = state.binded_program.ok_or_else(|| {
            Error::Backend("[Headless] There is no program in use.".to_owned())
        })?;

        let program = state.program_mut(handle)?;
        if location.raw() as usize >= program.names.len() {
            return Err(Error::Backend(format!(
                "[Headless] Location {} does not belong to {}.",
                location.raw(),
                handle
            )));
        }

        program.values.insert(location.raw(), *variable);
        state.uploads += 1;
        Ok(())
    }

    unsafe fn delete_program(&mut self, handle: ProgramHandle) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.programs.free(handle).is_none() {
            return Err(Error::Backend(format!("{} is invalid.", handle)));
        }

        if state.binded_program == Some(handle) {
            state.binded_program = None;
        }

        state.alive -= 1;
        state.deleted += 1;
        Ok(())
    }
}

/// Read access to what a `HeadlessVisitor` has recorded. It stays valid after
/// the visitor is moved into a `RenderContext`.
#[derive(Clone)]
pub struct HeadlessProbe {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessProbe {
    /// Gets the last value uploaded to the uniform `name` of `program`.
    pub fn uniform(&self, program: ProgramHandle, name: &str) -> Option<UniformVariable> {
        let state = self.state.borrow();
        let program = state.programs.get(program)?;
        let hash: HashValue<str> = name.into();
        let location = program.locations.get(&hash)?;
        program.values.get(&location.raw()).cloned()
    }

    /// Gets all the uniforms that have been written, sorted by name.
    pub fn uniforms(&self, program: ProgramHandle) -> Vec<(String, UniformVariable)> {
        let state = self.state.borrow();
        let mut values: Vec<_> = match state.programs.get(program) {
            Some(program) => program
                .values
                .iter()
                .map(|(&k, &v)| (program.names[k as usize].clone(), v))
                .collect(),
            None => Vec::new(),
        };

        values.sort_by(|lhs, rhs| lhs.0.cmp(&rhs.0));
        values
    }

    /// Gets the names of active uniforms after linking.
    pub fn active_uniforms(&self, program: ProgramHandle) -> Vec<String> {
        let state = self.state.borrow();
        state
            .programs
            .get(program)
            .map(|v| v.names.clone())
            .unwrap_or_default()
    }

    pub fn is_alive(&self, program: ProgramHandle) -> bool {
        self.state.borrow().programs.get(program).is_some()
    }

    pub fn binded_program(&self) -> Option<ProgramHandle> {
        self.state.borrow().binded_program
    }

    /// Number of programs which have not been deleted.
    pub fn alive(&self) -> usize {
        self.state.borrow().alive
    }

    pub fn deleted(&self) -> usize {
        self.state.borrow().deleted
    }

    /// Number of uploads that reached a resolved location.
    pub fn uploads(&self) -> usize {
        self.state.borrow().uploads
    }

    pub fn inject(&self, fault: Fault) {
        self.state.borrow_mut().faults.insert(fault);
    }

    pub fn clear(&self, fault: Fault) {
        self.state.borrow_mut().faults.remove(&fault);
    }
}
