//! `rmx` is a toolkit for turning Monte Carlo response-matrix tallies into
//! importance functions for variance reduction
//!
#![doc = include_str!("../readme.md")]
#![deny(missing_docs, missing_debug_implementations)]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

// Re-exports of toolkit crates.
#[doc(inline)]
pub use rmx_utils as utils;

#[cfg(feature = "mesh")]
#[cfg_attr(docsrs, doc(cfg(feature = "mesh")))]
#[doc(inline)]
pub use rmx_mesh as mesh;

#[cfg(feature = "solver")]
#[cfg_attr(docsrs, doc(cfg(feature = "solver")))]
#[doc(inline)]
pub use rmx_solver as solver;
