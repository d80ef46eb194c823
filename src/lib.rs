pub mod block;
pub mod commands;
pub mod compiler;
pub mod error;
pub mod lines;
pub mod project;
pub mod sources;
pub mod system;
pub mod toolchain;

pub use compiler::{Artifact, Compiler};
pub use error::Error;
pub use project::{Project, ProjectType};
pub use system::{Build, System};

/// Directory holding intermediate build output.
pub const SMELT_DIR: &str = ".smelt";

/// Project definition file expected in the current directory.
pub const PROJ_FILE: &str = "smelt.proj";

/// System definition file.
pub const SYS_FILE: &str = "smelt.sys";

/// Optional toolchain configuration file.
pub const TOOLCHAIN_FILE: &str = "toolchain.toml";
