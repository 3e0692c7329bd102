//! Copy executor that mirrors planned vendor assets into the bundle output.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use same_file::is_same_file;

use crate::models::{AssetPlan, CopyInstruction};

/// Errors raised while resolving or copying a planned asset source.
#[derive(Debug)]
pub enum PathResolutionError {
    /// A planned source does not exist under its resolved root.
    Missing {
        /// Absolute path that could not be located.
        path: PathBuf,
        /// The not-found error reported by the filesystem.
        source: std::io::Error,
    },
    /// A source or destination could not be read or written.
    Io {
        /// Path that caused the error.
        path: PathBuf,
        /// Source I/O error.
        source: std::io::Error,
    },
}

impl std::fmt::Display for PathResolutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing { path, .. } => {
                write!(f, "failed to locate {}", path.display())
            }
            Self::Io { path, source } => {
                write!(f, "failed to copy {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for PathResolutionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Missing { source, .. } | Self::Io { source, .. } => Some(source),
        }
    }
}

/// Execute every copy instruction in the plan against the filesystem.
///
/// All sources are verified before anything is written, so a missing vendor
/// file aborts the build without leaving a partially populated output tree
/// behind. File sources are installed with a hard link when the filesystem
/// allows it; directory sources are mirrored recursively. Returns the
/// destination paths of every installed file.
pub fn execute_copies(
    plan: &AssetPlan,
    dependency_root: &Path,
    output_root: &Path,
) -> Result<Vec<PathBuf>, PathResolutionError> {
    let resolved: Vec<(PathBuf, PathBuf)> = plan
        .copies
        .iter()
        .map(|instruction| resolve_instruction(instruction, dependency_root, output_root))
        .collect();

    for (source, _) in &resolved {
        match fs::metadata(source) {
            Ok(_) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(PathResolutionError::Missing {
                    path: source.clone(),
                    source: err,
                });
            }
            Err(err) => {
                return Err(PathResolutionError::Io {
                    path: source.clone(),
                    source: err,
                });
            }
        }
    }

    let mut copied = Vec::new();
    for (source, destination) in &resolved {
        copy_tree(source, destination, &mut copied)?;
    }
    tracing::debug!(files = copied.len(), "mirrored vendor assets");
    Ok(copied)
}

/// Resolve an instruction into absolute source and destination paths. A
/// `context` copy option replaces the dependency root for its instruction.
fn resolve_instruction(
    instruction: &CopyInstruction,
    dependency_root: &Path,
    output_root: &Path,
) -> (PathBuf, PathBuf) {
    let source_root = instruction
        .options
        .context
        .as_deref()
        .map(PathBuf::from)
        .unwrap_or_else(|| dependency_root.to_path_buf());
    (
        source_root.join(trim_relative(&instruction.source)),
        output_root.join(trim_relative(&instruction.destination)),
    )
}

fn trim_relative(path: &str) -> &Path {
    Path::new(path.trim_start_matches('/').trim_end_matches('/'))
}

fn copy_tree(
    source: &Path,
    destination: &Path,
    copied: &mut Vec<PathBuf>,
) -> Result<(), PathResolutionError> {
    let metadata = fs::metadata(source).map_err(|err| io_error(source, err))?;

    if metadata.is_dir() {
        let entries = fs::read_dir(source).map_err(|err| io_error(source, err))?;
        for entry in entries {
            let entry = entry.map_err(|err| io_error(source, err))?;
            copy_tree(
                &entry.path(),
                &destination.join(entry.file_name()),
                copied,
            )?;
        }
        return Ok(());
    }

    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(|err| io_error(parent, err))?;
    }
    install_asset(source, destination).map_err(|err| io_error(source, err))?;
    copied.push(destination.to_path_buf());
    Ok(())
}

/// Install a single file, reusing an existing hard link when the destination
/// already points at the same inode.
fn install_asset(source: &Path, destination: &Path) -> std::io::Result<()> {
    if destination.exists() {
        if is_same_file(source, destination)? {
            return Ok(());
        }
        fs::remove_file(destination)?;
    }

    match fs::hard_link(source, destination) {
        Ok(_) => Ok(()),
        Err(err) if err.kind() == ErrorKind::AlreadyExists => Ok(()),
        Err(_) => fs::copy(source, destination).map(|_| ()),
    }
}

fn io_error(path: &Path, source: std::io::Error) -> PathResolutionError {
    PathResolutionError::Io {
        path: path.to_path_buf(),
        source,
    }
}
