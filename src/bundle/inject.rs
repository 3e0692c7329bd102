//! HTML patching utilities that insert external asset tags into pages.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use regex::Regex;

use crate::models::{AssetKind, InjectableAsset, InjectionManifest};

fn script_tag_pattern() -> &'static Regex {
    use std::sync::OnceLock;

    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)<script[\s>]").expect("invalid script tag regex"))
}

fn stylesheet_link_pattern() -> &'static Regex {
    use std::sync::OnceLock;

    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)<link[^>]*rel="stylesheet""#).expect("invalid stylesheet link regex")
    })
}

fn head_close_pattern() -> &'static Regex {
    use std::sync::OnceLock;

    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)</head>").expect("invalid head close regex"))
}

fn body_close_pattern() -> &'static Regex {
    use std::sync::OnceLock;

    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)</body>").expect("invalid body close regex"))
}

/// Render the HTML tag for a materialized asset.
///
/// Extra attributes are rendered sorted by name so output is deterministic.
pub fn render_tag(asset: &InjectableAsset) -> String {
    let attributes: String = asset
        .attributes
        .iter()
        .map(|(name, value)| format!(" {}=\"{}\"", name, escape_attribute(value)))
        .collect();

    match asset.kind {
        AssetKind::Script => format!(
            "<script src=\"{}\"{}></script>",
            escape_attribute(&asset.url),
            attributes
        ),
        AssetKind::Stylesheet => format!(
            "<link rel=\"stylesheet\" href=\"{}\"{}>",
            escape_attribute(&asset.url),
            attributes
        ),
    }
}

fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

/// Insert the manifest's tags into an HTML document.
///
/// Prepended scripts land before the page's first existing `<script>` tag
/// (before `</body>` when the page has none) and appended scripts before
/// `</body>`, so externally loaded code runs before or after the page's own
/// bundles as configured. Stylesheets follow the same shape inside `<head>`:
/// prepended links go before the first existing stylesheet `<link>`,
/// appended links before `</head>`.
pub fn inject_into_document(text: &str, manifest: &InjectionManifest) -> Result<String> {
    let mut text = text.to_string();

    let prepend_styles = render_group(&manifest.prepend, AssetKind::Stylesheet);
    let append_styles = render_group(&manifest.append, AssetKind::Stylesheet);
    let prepend_scripts = render_group(&manifest.prepend, AssetKind::Script);
    let append_scripts = render_group(&manifest.append, AssetKind::Script);

    if !prepend_styles.is_empty() {
        let index = match stylesheet_link_pattern().find(&text) {
            Some(found) => found.start(),
            None => anchor_index(&text, head_close_pattern(), "</head>")?,
        };
        text.insert_str(index, &prepend_styles);
    }
    if !append_styles.is_empty() {
        let index = anchor_index(&text, head_close_pattern(), "</head>")?;
        text.insert_str(index, &append_styles);
    }

    if !prepend_scripts.is_empty() {
        let index = match script_tag_pattern().find(&text) {
            Some(found) => found.start(),
            None => anchor_index(&text, body_close_pattern(), "</body>")?,
        };
        text.insert_str(index, &prepend_scripts);
    }
    if !append_scripts.is_empty() {
        let index = anchor_index(&text, body_close_pattern(), "</body>")?;
        text.insert_str(index, &append_scripts);
    }

    Ok(text)
}

fn render_group(assets: &[InjectableAsset], kind: AssetKind) -> String {
    assets
        .iter()
        .filter(|asset| asset.kind == kind)
        .map(|asset| format!("{}\n", render_tag(asset)))
        .collect()
}

fn anchor_index(text: &str, pattern: &Regex, anchor: &str) -> Result<usize> {
    pattern
        .find(text)
        .map(|found| found.start())
        .ok_or_else(|| anyhow!("failed to locate {anchor} in document"))
}

/// Patch a single HTML file in place when the manifest targets it.
///
/// Returns `true` when the file was rewritten, `false` when it fell outside
/// the manifest's `files` filter or the manifest carries no tags.
pub fn patch_html_file(path: &Path, manifest: &InjectionManifest) -> Result<bool> {
    if !file_is_targeted(manifest.files.as_deref(), path) {
        return Ok(false);
    }
    if manifest.prepend.is_empty() && manifest.append.is_empty() {
        return Ok(false);
    }

    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let updated = inject_into_document(&text, manifest)
        .with_context(|| format!("failed to patch {}", path.display()))?;
    fs::write(path, updated).with_context(|| format!("failed to write {}", path.display()))?;

    tracing::debug!(path = %path.display(), "injected external asset tags");
    Ok(true)
}

/// Apply the `files` filter: a page is targeted when no filter is set, or
/// when its file name or trailing path segments match a filter entry.
pub fn file_is_targeted(files: Option<&[String]>, path: &Path) -> bool {
    let Some(files) = files else {
        return true;
    };

    files.iter().any(|name| {
        path.file_name()
            .is_some_and(|file_name| file_name.to_string_lossy() == name.as_str())
            || path.ends_with(Path::new(name))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn script(url: &str) -> InjectableAsset {
        InjectableAsset {
            url: url.into(),
            kind: AssetKind::Script,
            attributes: BTreeMap::new(),
        }
    }

    fn stylesheet(url: &str) -> InjectableAsset {
        InjectableAsset {
            url: url.into(),
            kind: AssetKind::Stylesheet,
            attributes: BTreeMap::new(),
        }
    }

    fn page() -> &'static str {
        r#"<html>
  <head>
    <link rel="stylesheet" href="app.css">
  </head>
  <body>
    <script src="bundle.js"></script>
  </body>
</html>"#
    }

    #[test]
    fn renders_script_and_stylesheet_tags() {
        assert_eq!(
            render_tag(&script("vendor/jquery/dist/jquery.min.js")),
            r#"<script src="vendor/jquery/dist/jquery.min.js"></script>"#
        );
        assert_eq!(
            render_tag(&stylesheet("vendor/bootstrap/dist/css/bootstrap.min.css")),
            r#"<link rel="stylesheet" href="vendor/bootstrap/dist/css/bootstrap.min.css">"#
        );
    }

    #[test]
    fn renders_extra_attributes_sorted_by_name() {
        let mut asset = script("https://code.jquery.com/jquery-3.2.1.js");
        asset.attributes.insert("integrity".into(), "sha256-abc".into());
        asset.attributes.insert("crossorigin".into(), "anonymous".into());

        assert_eq!(
            render_tag(&asset),
            r#"<script src="https://code.jquery.com/jquery-3.2.1.js" crossorigin="anonymous" integrity="sha256-abc"></script>"#
        );
    }

    #[test]
    fn escapes_attribute_values() {
        let asset = stylesheet("https://fonts.googleapis.com/css?family=Roboto&display=swap");
        assert!(render_tag(&asset).contains("family=Roboto&amp;display=swap"));
    }

    #[test]
    fn prepends_scripts_before_the_first_existing_script() {
        let manifest = InjectionManifest {
            prepend: vec![script("vendor/jquery.js")],
            append: Vec::new(),
            files: None,
        };

        let updated = inject_into_document(page(), &manifest).unwrap();
        let jquery = updated.find("vendor/jquery.js").unwrap();
        let bundle = updated.find("bundle.js").unwrap();
        assert!(jquery < bundle);
    }

    #[test]
    fn appends_scripts_after_the_existing_ones() {
        let manifest = InjectionManifest {
            prepend: Vec::new(),
            append: vec![script("vendor/analytics.js")],
            files: None,
        };

        let updated = inject_into_document(page(), &manifest).unwrap();
        let analytics = updated.find("vendor/analytics.js").unwrap();
        let bundle = updated.find("bundle.js").unwrap();
        assert!(bundle < analytics);
        assert!(analytics < updated.find("</body>").unwrap());
    }

    #[test]
    fn places_stylesheets_around_the_existing_links() {
        let manifest = InjectionManifest {
            prepend: vec![stylesheet("vendor/reset.css")],
            append: vec![stylesheet("vendor/theme.css")],
            files: None,
        };

        let updated = inject_into_document(page(), &manifest).unwrap();
        let reset = updated.find("vendor/reset.css").unwrap();
        let app = updated.find("app.css").unwrap();
        let theme = updated.find("vendor/theme.css").unwrap();
        assert!(reset < app);
        assert!(app < theme);
        assert!(theme < updated.find("</head>").unwrap());
    }

    #[test]
    fn preserves_declaration_order_within_a_group() {
        let manifest = InjectionManifest {
            prepend: vec![script("vendor/first.js"), script("vendor/second.js")],
            append: Vec::new(),
            files: None,
        };

        let updated = inject_into_document(page(), &manifest).unwrap();
        assert!(updated.find("vendor/first.js").unwrap() < updated.find("vendor/second.js").unwrap());
    }

    #[test]
    fn falls_back_to_body_close_when_the_page_has_no_scripts() {
        let manifest = InjectionManifest {
            prepend: vec![script("vendor/jquery.js")],
            append: Vec::new(),
            files: None,
        };

        let bare = "<html><head></head><body><p>hello</p></body></html>";
        let updated = inject_into_document(bare, &manifest).unwrap();
        assert!(updated.contains(r#"<script src="vendor/jquery.js"></script>"#));
        assert!(updated.find("hello").unwrap() < updated.find("vendor/jquery.js").unwrap());
    }

    #[test]
    fn fails_when_the_required_anchor_is_missing() {
        let manifest = InjectionManifest {
            prepend: Vec::new(),
            append: vec![script("vendor/analytics.js")],
            files: None,
        };

        assert!(inject_into_document("<p>fragment</p>", &manifest).is_err());
    }

    #[test]
    fn files_filter_targets_matching_pages_only() {
        let files = vec!["about.html".to_string()];
        assert!(file_is_targeted(Some(&files), Path::new("dist/about.html")));
        assert!(!file_is_targeted(Some(&files), Path::new("dist/index.html")));
        assert!(file_is_targeted(None, Path::new("dist/index.html")));
    }

    #[test]
    fn patches_targeted_files_and_skips_the_rest() {
        let dir = tempdir().unwrap();
        let index = dir.path().join("index.html");
        let about = dir.path().join("about.html");
        fs::write(&index, page()).unwrap();
        fs::write(&about, page()).unwrap();

        let manifest = InjectionManifest {
            prepend: vec![stylesheet("vendor/bootstrap/dist/css/bootstrap.min.css")],
            append: Vec::new(),
            files: Some(vec!["about.html".into()]),
        };

        assert!(patch_html_file(&about, &manifest).unwrap());
        assert!(!patch_html_file(&index, &manifest).unwrap());

        let about_text = fs::read_to_string(&about).unwrap();
        let index_text = fs::read_to_string(&index).unwrap();
        assert!(about_text.contains("bootstrap.min.css"));
        assert!(!index_text.contains("bootstrap.min.css"));
    }

    #[test]
    fn targets_by_trailing_path_segments() {
        let files = vec!["pages/about.html".to_string()];
        assert!(file_is_targeted(Some(&files), &PathBuf::from("dist/pages/about.html")));
        assert!(!file_is_targeted(Some(&files), &PathBuf::from("dist/other/about.html")));
    }
}
