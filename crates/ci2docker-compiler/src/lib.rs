//! Build context generation for ci2docker.
//!
//! For every variant of the environment matrix this crate writes:
//! - one script per pipeline stage, replaying variables exported earlier
//! - the image definition and entrypoint script
//! - helper scripts to build and run the image

pub mod compiler;
pub mod copy;
pub mod error;
pub mod fs;
pub mod render;
pub mod scripts;
pub mod section;

pub use compiler::Compiler;
pub use error::{CompileError, CompileResult};
pub use render::{AskamaRenderer, HelperContext, RenderContext, Renderer};
pub use section::{StageOutput, VariantContext, compile_stage};
