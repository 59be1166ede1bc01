//! # weft Library
//!
//! In-process module dependency resolution.
//!
//! Code declares named modules with optional dependencies and an
//! initializer, declares intent to use a module, and an optional
//! host-supplied loader hook is consulted whenever an unknown name is
//! requested. The engine tracks the dependency graph, runs each
//! initializer exactly once in dependency order, and delivers
//! readiness callbacks exactly once.
//!
//! ## Core Modules
//!
//! - [`primitives`] - Foundation types and callback contracts
//! - [`resolver`] - Registry bookkeeping, resolution engine, cycle diagnostics
//!
//! ## Quick Start
//!
//! ```
//! use weft::Resolver;
//!
//! let mut resolver = Resolver::new();
//! resolver.define_with("greeting", &[], || {
//!     println!("greeting initialized");
//!     Ok(())
//! })?;
//! resolver.require("greeting", || println!("greeting ready"))?;
//! assert!(resolver.is_loaded("greeting"));
//! # Ok::<(), weft::ResolveError>(())
//! ```

pub mod primitives;
pub mod resolver;

// Re-export commonly used types for convenience
pub use primitives::{ModuleError, ModuleState, UseTarget};
pub use resolver::engine::{LoaderHook, ResolveError, Resolver};
