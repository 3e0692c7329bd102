//! Derivation of the asset plan from a validated configuration.
//!
//! This module intentionally splits the responsibilities into focused
//! submodules so that remote/local classification, entry normalization, the
//! planning pass, and public-path materialization can be tested
//! independently. The plan is computed once per build and is immutable
//! afterwards.

mod entries;
mod materialize;
mod plan;
mod urls;

pub use entries::{NormalizedEntry, normalize_entry};
pub use materialize::materialize;
pub use plan::resolve;
pub use urls::{infer_local_kind, infer_remote_kind, is_remote_path, path_extension};
