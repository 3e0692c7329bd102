//! Externals configuration loading, defaulting, and validation.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::models::{AssetKind, CopyOptions};
use crate::resolve::{infer_remote_kind, is_remote_path};

const DEFAULT_CONFIG_FILE: &str = "externals.config.json";

fn default_output_path() -> String {
    "vendor".to_string()
}

fn default_enabled() -> bool {
    true
}

/// Declarative description of the modules to exclude from the bundle and the
/// assets to copy and inject in their place.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalsConfig {
    /// External module specifications, in load order.
    pub externals: Vec<ExternalSpec>,
    /// Append a build hash to injected URLs for cache busting.
    #[serde(default)]
    pub hash: bool,
    /// Directory under the build output root receiving copied assets.
    #[serde(default = "default_output_path")]
    pub output_path: String,
    /// URL prefix for injected assets; `None` inherits the host's public path.
    #[serde(default)]
    pub public_path: Option<String>,
    /// HTML outputs to affect; `None` affects every generated page.
    #[serde(default)]
    pub files: Option<Vec<String>>,
    /// When `false` the whole pipeline becomes a clean no-op.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Default options for every copy instruction; per-entry options win.
    #[serde(default)]
    pub copy_options: CopyOptions,
}

impl Default for ExternalsConfig {
    fn default() -> Self {
        Self {
            externals: Vec::new(),
            hash: false,
            output_path: default_output_path(),
            public_path: None,
            files: None,
            enabled: true,
            copy_options: CopyOptions::default(),
        }
    }
}

/// One external module: where its assets come from and how they are served.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalSpec {
    /// Package or namespace the entries belong to.
    pub module: String,
    /// One or more assets to copy and inject for the module.
    pub entry: EntryList,
    /// Runtime global the module resolves to once excluded from the bundle;
    /// `None` means the module has no runtime value.
    #[serde(default)]
    pub global: Option<String>,
    /// Extra paths copied alongside the entries but never injected.
    #[serde(default)]
    pub supplements: Vec<SupplementRef>,
    /// Inject after the host's own bundle assets instead of before.
    #[serde(default)]
    pub append: bool,
}

/// A scalar entry or an explicit list of entries.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum EntryList {
    /// A single entry given without list syntax.
    Single(EntryRef),
    /// An ordered list of entries.
    Multiple(Vec<EntryRef>),
}

impl EntryList {
    /// Iterate the entries in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, EntryRef> {
        match self {
            Self::Single(entry) => std::slice::from_ref(entry).iter(),
            Self::Multiple(entries) => entries.iter(),
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Multiple(entries) => entries.len(),
        }
    }

    /// Returns `true` when the list carries no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A bare path or a structured entry record.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum EntryRef {
    /// A bare relative path or URL; kind and attributes are inferred.
    Path(String),
    /// A structured record with explicit kind, attributes, or copy options.
    Detailed(EntryDetail),
}

impl EntryRef {
    /// Path or URL named by the entry.
    pub fn path(&self) -> &str {
        match self {
            Self::Path(path) => path,
            Self::Detailed(detail) => &detail.path,
        }
    }

    /// Explicit kind, when the entry declares one.
    pub fn kind(&self) -> Option<AssetKind> {
        match self {
            Self::Path(_) => None,
            Self::Detailed(detail) => detail.kind,
        }
    }
}

/// Structured form of an entry.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryDetail {
    /// Relative path within the module, or a URL.
    pub path: String,
    /// Explicit asset kind; inferred from the path extension when absent.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<AssetKind>,
    /// Extra attributes rendered on the generated tag.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    /// Copy options for this entry, merged over the global defaults.
    #[serde(default)]
    pub copy_options: CopyOptions,
}

/// A supplement path, optionally with its own copy options.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum SupplementRef {
    /// A bare path relative to the module root.
    Path(String),
    /// A structured record carrying copy options.
    Detailed(SupplementDetail),
}

impl SupplementRef {
    /// Path named by the supplement.
    pub fn path(&self) -> &str {
        match self {
            Self::Path(path) => path,
            Self::Detailed(detail) => &detail.path,
        }
    }

    /// Copy options declared on the supplement, if any.
    pub fn copy_options(&self) -> Option<&CopyOptions> {
        match self {
            Self::Path(_) => None,
            Self::Detailed(detail) => Some(&detail.copy_options),
        }
    }
}

/// Structured form of a supplement.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplementDetail {
    /// Relative path within the module; trailing `/` copies a directory tree.
    pub path: String,
    /// Copy options for this supplement, merged over the global defaults.
    #[serde(default)]
    pub copy_options: CopyOptions,
}

/// Errors raised while loading or validating a configuration.
#[derive(Debug)]
pub enum ConfigurationError {
    /// Failed to read the configuration file from disk.
    Io {
        /// Path that caused the error.
        path: PathBuf,
        /// Source I/O error.
        source: std::io::Error,
    },
    /// Failed to parse the configuration file.
    Parse {
        /// Path that caused the error.
        path: PathBuf,
        /// Source parse error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The configuration is structurally malformed.
    Invalid {
        /// Every violated constraint, in declaration order.
        violations: Vec<String>,
    },
}

impl std::fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse {}: {}", path.display(), source)
            }
            Self::Invalid { violations } => {
                write!(f, "invalid externals configuration: {}", violations.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigurationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source.as_ref()),
            Self::Invalid { .. } => None,
        }
    }
}

impl ExternalsConfig {
    /// Load and validate a configuration from a JSON or YAML file.
    ///
    /// The format is chosen by file extension; anything that is not `.yaml`
    /// or `.yml` is parsed as JSON.
    pub fn from_path(path: &Path) -> Result<Self, ConfigurationError> {
        let contents = fs::read_to_string(path).map_err(|err| ConfigurationError::Io {
            path: path.to_path_buf(),
            source: err,
        })?;

        let is_yaml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml") | Some("yml")
        );
        let config: Self = if is_yaml {
            serde_yaml::from_str(&contents).map_err(|err| ConfigurationError::Parse {
                path: path.to_path_buf(),
                source: Box::new(err),
            })?
        } else {
            serde_json::from_str(&contents).map_err(|err| ConfigurationError::Parse {
                path: path.to_path_buf(),
                source: Box::new(err),
            })?
        };

        config.validate()?;
        Ok(config)
    }

    /// Load the default `externals.config.json` from the provided directory.
    pub fn discover(dir: &Path) -> Result<Self, ConfigurationError> {
        Self::from_path(&dir.join(DEFAULT_CONFIG_FILE))
    }

    /// Check structural well-formedness, collecting every violation.
    ///
    /// Returns `Ok(())` for a configuration the resolver is guaranteed to
    /// handle without panicking. The check never mutates the configuration.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let mut violations = Vec::new();

        if self.externals.is_empty() {
            violations.push("`externals` must contain at least one module specification".into());
        }
        if self.output_path.trim().is_empty() {
            violations.push("`outputPath` must be a non-empty string".into());
        }

        let mut globals_by_module: BTreeMap<&str, &Option<String>> = BTreeMap::new();
        for (index, spec) in self.externals.iter().enumerate() {
            let label = if spec.module.is_empty() {
                format!("externals[{index}]")
            } else {
                format!("externals[{index}] (`{}`)", spec.module)
            };

            if spec.module.trim().is_empty() {
                violations.push(format!("{label}: `module` must be a non-empty string"));
            }
            if spec.entry.is_empty() {
                violations.push(format!("{label}: `entry` must contain at least one entry"));
            }
            if spec
                .global
                .as_deref()
                .is_some_and(|global| global.trim().is_empty())
            {
                violations.push(format!(
                    "{label}: `global` must be omitted or a non-empty string"
                ));
            }

            for entry in spec.entry.iter() {
                let path = entry.path();
                if path.trim().is_empty() {
                    violations.push(format!("{label}: entry paths must be non-empty"));
                    continue;
                }
                if is_remote_path(path)
                    && entry.kind().is_none()
                    && infer_remote_kind(path).is_none()
                {
                    violations.push(format!(
                        "{label}: remote entry `{path}` has no recognizable extension; \
                         declare an explicit `type`"
                    ));
                }
            }

            for supplement in &spec.supplements {
                if supplement.path().trim().is_empty() {
                    violations.push(format!("{label}: supplement paths must be non-empty"));
                }
            }

            match globals_by_module.get(spec.module.as_str()) {
                Some(previous) if **previous != spec.global => {
                    violations.push(format!(
                        "{label}: module is declared more than once with conflicting \
                         `global` bindings ({} vs {})",
                        describe_global(previous),
                        describe_global(&spec.global),
                    ));
                }
                _ => {
                    globals_by_module.insert(spec.module.as_str(), &spec.global);
                }
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ConfigurationError::Invalid { violations })
        }
    }
}

fn describe_global(global: &Option<String>) -> String {
    match global {
        Some(name) => format!("`{name}`"),
        None => "none".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn minimal() -> ExternalsConfig {
        ExternalsConfig {
            externals: vec![ExternalSpec {
                module: "jquery".into(),
                entry: EntryList::Single(EntryRef::Path("dist/jquery.min.js".into())),
                global: Some("jQuery".into()),
                supplements: Vec::new(),
                append: false,
            }],
            ..ExternalsConfig::default()
        }
    }

    #[test]
    fn applies_defaults_when_deserializing() {
        let config: ExternalsConfig = serde_json::from_str(
            r#"{"externals": [{"module": "jquery", "entry": "dist/jquery.min.js"}]}"#,
        )
        .expect("minimal configuration should parse");

        assert!(!config.hash);
        assert_eq!(config.output_path, "vendor");
        assert_eq!(config.public_path, None);
        assert_eq!(config.files, None);
        assert!(config.enabled);
        assert_eq!(config.externals[0].global, None);
        assert!(config.externals[0].supplements.is_empty());
        assert!(!config.externals[0].append);
        config.validate().expect("minimal configuration is valid");
    }

    #[test]
    fn rejects_configuration_without_externals() {
        let result: Result<ExternalsConfig, _> = serde_json::from_str("{}");
        assert!(result.is_err());

        let config = ExternalsConfig::default();
        let err = config.validate().expect_err("empty externals must fail");
        assert!(err.to_string().contains("`externals`"));
    }

    #[test]
    fn collects_every_violation() {
        let config = ExternalsConfig {
            externals: vec![ExternalSpec {
                module: String::new(),
                entry: EntryList::Multiple(Vec::new()),
                global: Some(String::new()),
                supplements: vec![SupplementRef::Path(String::new())],
                append: false,
            }],
            output_path: String::new(),
            ..ExternalsConfig::default()
        };

        let ConfigurationError::Invalid { violations } =
            config.validate().expect_err("malformed configuration")
        else {
            panic!("expected an Invalid error");
        };
        assert_eq!(violations.len(), 5);
    }

    #[test]
    fn rejects_remote_entry_without_recognizable_extension() {
        let mut config = minimal();
        config.externals[0].entry = EntryList::Single(EntryRef::Path(
            "https://fonts.googleapis.com/css?family=Roboto".into(),
        ));
        assert!(config.validate().is_err());

        config.externals[0].entry = EntryList::Single(EntryRef::Detailed(EntryDetail {
            path: "https://fonts.googleapis.com/css?family=Roboto".into(),
            kind: Some(AssetKind::Stylesheet),
            attributes: BTreeMap::new(),
            copy_options: CopyOptions::default(),
        }));
        config
            .validate()
            .expect("explicit type satisfies the remote entry rule");
    }

    #[test]
    fn rejects_conflicting_duplicate_globals() {
        let mut config = minimal();
        config.externals.push(ExternalSpec {
            module: "jquery".into(),
            entry: EntryList::Single(EntryRef::Path("dist/jquery.slim.js".into())),
            global: Some("$".into()),
            supplements: Vec::new(),
            append: false,
        });

        let err = config.validate().expect_err("conflicting globals must fail");
        assert!(err.to_string().contains("conflicting"));
    }

    #[test]
    fn accepts_benign_duplicate_declarations() {
        let mut config = minimal();
        config.externals.push(ExternalSpec {
            module: "jquery".into(),
            entry: EntryList::Single(EntryRef::Path("dist/jquery.slim.js".into())),
            global: Some("jQuery".into()),
            supplements: Vec::new(),
            append: false,
        });

        config.validate().expect("same binding twice is accepted");
    }

    #[test]
    fn loads_json_and_yaml_identically() {
        let dir = tempdir().expect("failed to create temp dir");
        let json_path = dir.path().join("externals.config.json");
        let yaml_path = dir.path().join("externals.config.yaml");

        fs::write(
            &json_path,
            r#"{"externals": [{"module": "jquery", "entry": "dist/jquery.min.js", "global": "jQuery"}], "outputPath": "thirdparty"}"#,
        )
        .expect("failed to write JSON config");
        fs::write(
            &yaml_path,
            "externals:\n  - module: jquery\n    entry: dist/jquery.min.js\n    global: jQuery\noutputPath: thirdparty\n",
        )
        .expect("failed to write YAML config");

        let from_json = ExternalsConfig::from_path(&json_path).expect("JSON config loads");
        let from_yaml = ExternalsConfig::from_path(&yaml_path).expect("YAML config loads");
        assert_eq!(from_json, from_yaml);
        assert_eq!(from_json.output_path, "thirdparty");
    }

    #[test]
    fn discover_reports_missing_file_as_io_error() {
        let dir = tempdir().expect("failed to create temp dir");
        let err = ExternalsConfig::discover(dir.path()).expect_err("missing file must fail");
        assert!(matches!(err, ConfigurationError::Io { .. }));
    }
}
