//! Core domain types for ci2docker.
//!
//! This crate contains:
//! - Pipeline stages and their execution kinds
//! - Environment variants produced from the matrix
//! - Instruction sets and script artifacts consumed by rendering

pub mod instruction;
pub mod stage;
pub mod variant;

pub use instruction::{CopySpec, InstructionSet, RenderOptions, ScriptArtifact};
pub use stage::{Stage, StageKind};
pub use variant::EnvironmentVariant;
