use regex::Regex;

use crate::models::AssetKind;

fn remote_entry_pattern() -> &'static Regex {
    use std::sync::OnceLock;

    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)^(https?:)?//").expect("invalid remote entry regex"))
}

/// Determine whether an entry path points at an externally hosted asset.
///
/// Absolute `http://`/`https://` URLs and protocol-relative `//` URLs count
/// as remote; everything else is a path within the module's package.
pub fn is_remote_path(path: &str) -> bool {
    remote_entry_pattern().is_match(path)
}

/// File extension of a path with any query string or fragment stripped.
pub fn path_extension(path: &str) -> Option<&str> {
    let trimmed = path.split(['?', '#']).next().unwrap_or(path);
    let name = trimmed.rsplit('/').next().unwrap_or(trimmed);
    name.rsplit_once('.')
        .map(|(_, extension)| extension)
        .filter(|extension| !extension.is_empty())
}

/// Infer the kind of a local entry from its extension.
///
/// `.css` and `.scss` entries are stylesheets; every other local path is
/// treated as a script.
pub fn infer_local_kind(path: &str) -> AssetKind {
    match path_extension(path).map(str::to_ascii_lowercase).as_deref() {
        Some("css") | Some("scss") => AssetKind::Stylesheet,
        _ => AssetKind::Script,
    }
}

/// Infer the kind of a remote entry, when its URL has a recognizable
/// extension. URLs without one must declare an explicit kind instead.
pub fn infer_remote_kind(path: &str) -> Option<AssetKind> {
    match path_extension(path).map(str::to_ascii_lowercase).as_deref() {
        Some("css") | Some("scss") => Some(AssetKind::Stylesheet),
        Some("js") | Some("mjs") => Some(AssetKind::Script),
        _ => None,
    }
}
