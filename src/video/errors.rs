use std::fmt;

use crate::lighting::{LightCategory, Variant};

/// The two programmable stages every technique embeds.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

#[derive(Debug, Fail)]
pub enum Error {
    #[fail(display = "Failed to create program object.")]
    ProgramCreation,
    #[fail(display = "Failed to compile {} shader, errors: \n{}", stage, log)]
    Compile { stage: ShaderStage, log: String },
    #[fail(display = "Failed to link program, errors: \n{}", _0)]
    Link(String),
    #[fail(display = "Program is invalid, errors: \n{}", _0)]
    Validation(String),
    #[fail(display = "Uniform '{}' is undefined in shader sources.", _0)]
    UndeclaredUniform(String),
    #[fail(display = "Can not reflect shader sources: {}", _0)]
    Reflection(String),
    #[fail(display = "Backend: {}", _0)]
    Backend(String),
    #[fail(display = "Precondition violated: {}", _0)]
    Precondition(#[fail(cause)] PreconditionError),
    #[fail(display = "Settings: {}", _0)]
    Settings(String),
}

/// Caller contract violations. They are reported instead of truncating light
/// arrays or writing into a program that is not bound.
#[derive(Debug, Fail, Clone, PartialEq)]
pub enum PreconditionError {
    #[fail(display = "the program has not been initialized.")]
    NotInitialized,
    #[fail(display = "the program has already been initialized.")]
    AlreadyInitialized,
    #[fail(display = "a {} stage is already attached.", _0)]
    StageAttached(ShaderStage),
    #[fail(display = "the program is not linked and validated.")]
    NotUsable,
    #[fail(display = "the program is not the active program of its context.")]
    NotActive,
    #[fail(display = "{} {} lights exceed the capacity {}.", len, category, cap)]
    TooManyLights {
        category: LightCategory,
        len: usize,
        cap: usize,
    },
    #[fail(display = "{:?} does not support `{}`.", variant, operation)]
    Unsupported {
        variant: Variant,
        operation: &'static str,
    },
    #[fail(display = "light direction has zero length.")]
    ZeroDirection,
    #[fail(display = "attenuation constant {} is below the epsilon.", _0)]
    AttenuationConstant(f32),
    #[fail(display = "light intensity {} is negative.", _0)]
    NegativeIntensity(f32),
}

impl From<PreconditionError> for Error {
    fn from(err: PreconditionError) -> Error {
        Error::Precondition(err)
    }
}

impl From<::serde_json::Error> for Error {
    fn from(err: ::serde_json::Error) -> Error {
        Error::Settings(format!("{}", err))
    }
}

impl From<::std::io::Error> for Error {
    fn from(err: ::std::io::Error) -> Error {
        Error::Settings(format!("{}", err))
    }
}

impl Error {
    /// Returns the violated precondition, if this is one.
    pub fn precondition(&self) -> Option<&PreconditionError> {
        match *self {
            Error::Precondition(ref v) => Some(v),
            _ => None,
        }
    }
}

pub type Result<T> = ::std::result::Result<T, Error>;
