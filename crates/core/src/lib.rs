//! seedmind-core
//!
//! Core library for whole-program call-graph construction and program
//! slicing over LLVM IR, in support of directed fuzzing.
//!
//! The pipeline: the loader parses every translation unit's IR file into
//! the arena program model and fills the registry; the call-graph pass
//! resolves direct and indirect call edges to fixpoint; the slicer computes
//! backward and forward slices from target locations; the emitter writes
//! deduplicated slice files.
//!
//! All substantive logic lives here so it is fully testable and reusable
//! from multiple frontends.

pub mod callgraph;
pub mod context;
pub mod emit;
pub mod error;
pub mod ir;
pub mod loader;
pub mod paths;
pub mod slicing;

/// Returns the library version as encoded at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
