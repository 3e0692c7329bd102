//! Executors that apply a resolved asset plan to the filesystem.

pub mod copy;
pub mod inject;

pub use copy::{PathResolutionError, execute_copies};
pub use inject::{inject_into_document, patch_html_file, render_tag};
