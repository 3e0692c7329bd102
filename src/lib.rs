#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod builder;
pub mod bundle;
pub mod config;
pub mod models;
pub mod project;
pub mod resolve;

pub use builder::{BundleArtifacts, ExternalsBuilder};
pub use bundle::PathResolutionError;
pub use config::{ConfigurationError, ExternalSpec, ExternalsConfig};
pub use models::{AssetKind, AssetPlan, CopyInstruction, ExternalsMap, InjectionManifest};
pub use project::HostContext;
pub use resolve::{materialize, resolve};
