//! Engine data structures: models, textures, transforms and scenes.
//!
//! This module contains the core data types for scene representation:
//!
//! - `model` contains mesh and material definitions, GPU resources for 3D models
//! - `texture` contains GPU texture wrapper and creation utilities
//! - `transform` holds per-node transformation data
//! - `scene` contains shared scene templates and per-view scene instances

pub mod model;
pub mod scene;
pub mod texture;
pub mod transform;
