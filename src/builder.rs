//! Orchestrator that resolves a configuration and applies the bundle plan.

use std::path::PathBuf;

use anyhow::Result;

use crate::bundle::{execute_copies, patch_html_file};
use crate::config::ExternalsConfig;
use crate::models::AssetPlan;
use crate::project::HostContext;
use crate::resolve::{materialize, resolve};

/// Everything produced by one full pipeline run.
#[derive(Debug)]
pub struct BundleArtifacts {
    /// The resolved plan, including the externals map for the host bundler.
    pub plan: AssetPlan,
    /// Destination paths of every installed vendor file.
    pub copied: Vec<PathBuf>,
    /// HTML pages that were rewritten.
    pub patched: Vec<PathBuf>,
}

/// High-level helper running validate → resolve → copy → inject for a host
/// build.
pub struct ExternalsBuilder<'a> {
    context: HostContext<'a>,
}

impl<'a> ExternalsBuilder<'a> {
    /// Create a builder for the provided host context.
    pub fn new(context: HostContext<'a>) -> Self {
        Self { context }
    }

    /// Apply the configuration: validate it, derive the plan, mirror vendor
    /// assets into the output root, and inject tags into the context's HTML
    /// pages.
    ///
    /// Configuration errors abort before any file I/O; copy errors abort
    /// before any page is rewritten, so no emitted HTML ever references an
    /// asset that failed to copy.
    pub fn build(&self, config: &ExternalsConfig) -> Result<BundleArtifacts> {
        config.validate()?;
        let plan = resolve(config);

        if plan.is_empty() {
            tracing::debug!("externals bundling disabled or empty; nothing to apply");
            return Ok(BundleArtifacts {
                plan,
                copied: Vec::new(),
                patched: Vec::new(),
            });
        }

        let copied = execute_copies(&plan, self.context.dependency_root, self.context.output_root)?;

        let manifest = materialize(&plan, self.context.public_path, self.context.build_hash);
        let mut patched = Vec::new();
        for file in self.context.html_files {
            if patch_html_file(file, &manifest)? {
                patched.push(file.clone());
            }
        }

        tracing::info!(
            copied = copied.len(),
            patched = patched.len(),
            "externals bundle applied"
        );
        Ok(BundleArtifacts {
            plan,
            copied,
            patched,
        })
    }
}
