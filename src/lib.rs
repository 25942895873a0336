pub mod aggregate;
pub mod cli;
pub mod context;
pub mod describe;
pub mod hooks;
pub mod interpreter;
pub mod manifest;
pub mod metadata;
pub mod orchestrator;
pub mod version;

// Convenience re-exports (optional, but nice)
pub use aggregate::RequirementSet;
pub use cli::Mode;
pub use context::InstallContext;
pub use describe::PackageDescription;
pub use interpreter::VersionTuple;
pub use manifest::{ParserStrategy, Requirement};
