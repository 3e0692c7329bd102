//! Host build context shared by the bundling pipeline.

use std::path::{Path, PathBuf};

/// Paths and host-supplied values the pipeline applies a plan against.
///
/// The resolver itself never touches these; they only matter once a plan is
/// copied to disk and injected into pages.
#[derive(Debug, Clone)]
pub struct HostContext<'a> {
    /// Root the copy sources are resolved against, typically `node_modules`.
    pub dependency_root: &'a Path,
    /// Build output root receiving copied assets.
    pub output_root: &'a Path,
    /// The host's configured public path, used when the plan declares none.
    pub public_path: Option<&'a str>,
    /// Host build hash appended to injected URLs when hashing is enabled.
    pub build_hash: Option<&'a str>,
    /// Generated HTML pages eligible for injection.
    pub html_files: &'a [PathBuf],
}
