use std::collections::BTreeMap;

use crate::config::EntryRef;
use crate::models::{AssetKind, CopyOptions};
use crate::resolve::urls::{infer_local_kind, infer_remote_kind, is_remote_path};

/// Structured form every configured entry is normalized into before
/// classification.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedEntry {
    /// Relative path within the module, or a URL.
    pub path: String,
    /// Resolved asset kind.
    pub kind: AssetKind,
    /// Extra attributes rendered on the generated tag.
    pub attributes: BTreeMap<String, String>,
    /// Copy options declared on the entry.
    pub copy_options: CopyOptions,
}

/// Normalize a configured entry, inferring its kind from the path extension
/// when no explicit kind is declared.
///
/// Remote URLs without a recognizable extension are rejected during
/// validation; should one reach this point anyway it falls back to a script.
pub fn normalize_entry(entry: &EntryRef) -> NormalizedEntry {
    let (path, declared_kind, attributes, copy_options) = match entry {
        EntryRef::Path(path) => (
            path.clone(),
            None,
            BTreeMap::new(),
            CopyOptions::default(),
        ),
        EntryRef::Detailed(detail) => (
            detail.path.clone(),
            detail.kind,
            detail.attributes.clone(),
            detail.copy_options.clone(),
        ),
    };

    let kind = declared_kind.unwrap_or_else(|| {
        if is_remote_path(&path) {
            infer_remote_kind(&path).unwrap_or(AssetKind::Script)
        } else {
            infer_local_kind(&path)
        }
    });

    NormalizedEntry {
        path,
        kind,
        attributes,
        copy_options,
    }
}
