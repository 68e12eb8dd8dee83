//! CI configuration parsing for ci2docker.
//!
//! This crate handles:
//! - Loading the CI document (`.travis.yml`)
//! - Expanding the environment matrix into variants
//! - Scanning stage lines for exported variables
//! - Caller settings and path expansion

pub mod ci;
pub mod error;
pub mod exports;
pub mod expand;
pub mod matrix;
pub mod settings;

pub use ci::CiConfig;
pub use error::{ConfigError, ConfigResult};
pub use exports::{ExportAccumulator, scan_exports};
pub use expand::expand_path;
pub use matrix::{EnvMatrix, Variants};
pub use settings::{CopyPath, GeneratorSettings, RepoIdentity};
