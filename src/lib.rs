//! # What is This?
//!
//! `lumen` manages the GPU programs of a forward, single pass Phong renderer
//! and the structured uniforms of its lights.
//!
//! - `video` wraps the program object lifecycle (create, compile, link,
//!   validate, enable) and uniform uploads behind a backend `Visitor`, which is
//!   either real OpenGL or a headless simulation;
//! - `lighting` describes directional, point and spot lights, lays them out in
//!   GLSL for five progressive techniques, and pushes them every frame through
//!   uniform tables that are resolved once;
//! - `settings` configures a technique and a scene with JSON.
//!
//! Window creation, meshes, textures and camera math are left to the
//! application. Only the texture unit and the transforms are consumed here.

#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

extern crate cgmath;
extern crate gl;
extern crate serde;
extern crate serde_json;
extern crate smallvec;

#[macro_use]
pub mod utils;
pub mod math;
pub mod video;
pub mod lighting;
pub mod settings;

pub mod prelude;
