//! plait compiles lambda calculus terms into braided track diagrams.
//!
//! The pipeline assigns a unique identifier to every binder and subterm
//! ([`surface::indexing`]), linearizes the term into a dependency-respecting
//! timeline ([`core::timeline`]), enumerates every structurally valid track
//! assignment ([`core::layout`]) and rates the candidates to pick a compact
//! one ([`core::rate`]). A chosen layout projects to a dense time × track
//! grid ([`core::matrix`]) for an external renderer.

pub mod core;
pub mod driver;
pub mod env;
pub mod files;
pub mod source;
pub mod surface;
pub mod symbol;

pub use driver::{Driver, Status};

pub const BUG_REPORT_URL: &str = "https://github.com/plait-lang/plait/issues/new";
