//! Quasar Core - renderer-agnostic scene description.
//!
//! This crate defines the data model a parsed scene file deserializes into:
//! camera parameters, render settings, primitive lists, and light lists.
//! Parsing itself (JSON or otherwise) is the job of an external stage; the
//! types here derive `serde` so that stage can target them directly.

pub mod description;

pub use description::{
    AreaSamplingMethod, BoxDescription, CameraSettings, LightDescription, MeshDescription,
    MultisamplingSettings, RenderSettings, SceneDescription, SphereDescription,
    TriangleDescription,
};
