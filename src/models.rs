//! Data structures produced while planning an externals bundle.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered mapping of module names to their runtime global bindings.
///
/// Iteration order follows configuration declaration order. A `None` value
/// means the module is excluded from the bundle but resolves to no runtime
/// value (a pure side-effect include such as a stylesheet).
pub type ExternalsMap = IndexMap<String, Option<String>>;

/// Kind of tag an asset is injected as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum AssetKind {
    /// A JavaScript asset, injected as a `<script>` tag.
    #[serde(rename = "js")]
    Script,
    /// A stylesheet asset, injected as a `<link rel="stylesheet">` tag.
    #[serde(rename = "css")]
    Stylesheet,
}

/// Location an injected asset is served from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AssetSource {
    /// An externally hosted asset, injected with its URL untouched.
    Remote(String),
    /// An asset copied into the build output, path relative to the output root.
    Copied(String),
}

impl AssetSource {
    /// The raw path or URL carried by this source.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Remote(url) => url,
            Self::Copied(path) => path,
        }
    }
}

/// One asset scheduled for injection into generated HTML pages.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedAsset {
    /// Where the asset will be served from at runtime.
    pub source: AssetSource,
    /// Tag kind to render for the asset.
    pub kind: AssetKind,
    /// Extra attributes rendered on the generated tag, e.g. `integrity`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

/// Options forwarded to the copy step for a single instruction.
///
/// `context` replaces the dependency root for the instruction it is attached
/// to. Unknown keys are preserved verbatim so a host pipeline with its own
/// copy mechanism can interpret them.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CopyOptions {
    /// Directory to resolve the copy source against instead of the
    /// dependency root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Pass-through options not interpreted by the built-in copy executor.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CopyOptions {
    /// Merge these options over a set of defaults, field by field.
    pub fn merged_over(&self, defaults: &CopyOptions) -> CopyOptions {
        let mut extra = defaults.extra.clone();
        for (key, value) in &self.extra {
            extra.insert(key.clone(), value.clone());
        }
        CopyOptions {
            context: self.context.clone().or_else(|| defaults.context.clone()),
            extra,
        }
    }
}

/// A single source → destination copy planned for the bundle output.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyInstruction {
    /// Path relative to the dependency root, `{module}/{path}`.
    pub source: String,
    /// Path relative to the build output root, `{output_path}/{module}/{path}`.
    pub destination: String,
    /// Options forwarded to the copy step.
    #[serde(default)]
    pub options: CopyOptions,
}

/// Complete asset plan derived once from a validated configuration.
///
/// The plan is immutable after resolution: paths in `prepend`/`append` are
/// relative to the output root until [`crate::resolve::materialize`] applies
/// the resolved public path.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetPlan {
    /// Module → global bindings handed to the host's exclusion mechanism.
    pub externals: ExternalsMap,
    /// Assets injected before the host's own bundle assets, in order.
    pub prepend: Vec<PlannedAsset>,
    /// Assets injected after the host's own bundle assets, in order.
    pub append: Vec<PlannedAsset>,
    /// Copy instructions consumed by the copy step, in order.
    pub copies: Vec<CopyInstruction>,
    /// Directory under the build output root receiving copied assets.
    pub output_path: String,
    /// Public path override; `None` inherits the host's configured value.
    pub public_path: Option<String>,
    /// Whether to append a build hash to injected URLs.
    pub hash: bool,
    /// HTML outputs to affect; `None` affects every generated page.
    pub files: Option<Vec<String>>,
}

impl AssetPlan {
    /// Returns `true` when the plan carries no work at all.
    pub fn is_empty(&self) -> bool {
        self.externals.is_empty()
            && self.prepend.is_empty()
            && self.append.is_empty()
            && self.copies.is_empty()
    }
}

/// An asset with its final URL, ready to render as a tag.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InjectableAsset {
    /// Fully resolved URL, public path and build hash applied.
    pub url: String,
    /// Tag kind to render.
    pub kind: AssetKind,
    /// Extra attributes rendered on the tag, sorted by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

/// Materialized injection targets handed to the HTML patcher.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InjectionManifest {
    /// Tags inserted before the page's own assets, in order.
    pub prepend: Vec<InjectableAsset>,
    /// Tags inserted after the page's own assets, in order.
    pub append: Vec<InjectableAsset>,
    /// Page names to patch; `None` patches every page.
    pub files: Option<Vec<String>>,
}
