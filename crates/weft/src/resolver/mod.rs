//! # Resolver Module
//!
//! Module dependency resolution: registry bookkeeping, the resolution
//! engine, and opt-in cycle diagnostics.
//!
//! ## Modules
//!
//! - [`registry`] - Per-name records: dependency lists, inverse graph edges, use-queues
//! - [`engine`] - `define` / `require` / `request` orchestration and the loader hook
//! - [`cycle`] - Diagnostic cycle detection over the pending graph

pub mod cycle;
pub mod engine;
pub mod registry;

pub use engine::{LoaderHook, ResolveError, Resolver};
pub use registry::Registry;
