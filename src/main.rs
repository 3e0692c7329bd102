//! Command line entry point for planning and applying externals bundles.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use externals_bundler::{ExternalsBuilder, ExternalsConfig, HostContext, resolve};

#[derive(Parser)]
#[command(
    name = "externals-bundler",
    version,
    about = "Exclude vendor modules from a web bundle and prepare their assets"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the resolved asset plan as JSON without touching the filesystem.
    Plan {
        /// Configuration file (JSON or YAML).
        #[arg(long, default_value = "externals.config.json")]
        config: PathBuf,
    },
    /// Copy vendor assets and inject tags into the given HTML files.
    Apply {
        /// Configuration file (JSON or YAML).
        #[arg(long, default_value = "externals.config.json")]
        config: PathBuf,
        /// Root the copy sources are resolved against.
        #[arg(long, default_value = "node_modules")]
        dependency_root: PathBuf,
        /// Build output root receiving copied assets.
        #[arg(long, default_value = "dist")]
        output_root: PathBuf,
        /// Public path used when the configuration declares none.
        #[arg(long)]
        public_path: Option<String>,
        /// Build hash appended to injected URLs when hashing is enabled.
        #[arg(long)]
        build_hash: Option<String>,
        /// HTML files to patch.
        #[arg(required = true)]
        html_files: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    match Cli::parse().command {
        Command::Plan { config } => {
            let config = ExternalsConfig::from_path(&config)?;
            let plan = resolve(&config);
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        Command::Apply {
            config,
            dependency_root,
            output_root,
            public_path,
            build_hash,
            html_files,
        } => {
            let config = ExternalsConfig::from_path(&config)?;
            let builder = ExternalsBuilder::new(HostContext {
                dependency_root: &dependency_root,
                output_root: &output_root,
                public_path: public_path.as_deref(),
                build_hash: build_hash.as_deref(),
                html_files: &html_files,
            });
            let artifacts = builder.build(&config)?;
            println!(
                "copied {} vendor files, patched {} pages",
                artifacts.copied.len(),
                artifacts.patched.len()
            );
        }
    }

    Ok(())
}
