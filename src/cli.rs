use std::path::PathBuf;
use clap::{Args, Parser, Subcommand};
use shelf::PackageManagerKind;

#[derive(Debug, Parser, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct CLI {
    /// More log output on stderr (-v info, -vv debug). `RUST_LOG` takes precedence
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    pub(crate) verbose: u8,
    #[command(subcommand)]
    pub(crate) command: Option<ShelfCommand>,
}

#[derive(Debug, Subcommand, Clone, PartialEq)]
pub enum ShelfCommand {
    /// Adds components and, before them, every component they depend on
    Add {
        /// Component names, e.g. `button card`
        #[clap(required = true)]
        names: Vec<String>,
        #[command(flatten)]
        registry: RegistryArgs,
        /// Don't run the package manager
        #[clap(long)]
        skip_deps: bool,
        /// Keep files that already exist instead of replacing them
        #[clap(long)]
        no_overwrite: bool,
        /// npm, pnpm, yarn or bun. Detected from the lockfile by default
        #[clap(long)]
        package_manager: Option<PackageManagerKind>,
    },
    /// Lists the registry's components, grouped by type
    List {
        #[command(flatten)]
        registry: RegistryArgs,
    },
    /// Writes a default `shelf.toml` to the project directory
    Init {
        /// Project directory. Defaults to the current directory
        #[clap(long)]
        cwd: Option<PathBuf>,
    },
    /// Removes cached copies of remote registry documents
    Clean,
}

#[derive(Debug, Args, Clone, PartialEq, Default)]
pub struct RegistryArgs {
    /// Registry directory, bundle file or URL. Overrides `shelf.toml`
    #[clap(long)]
    pub registry: Option<String>,
    /// Registry style. Overrides `shelf.toml`
    #[clap(long)]
    pub style: Option<String>,
    /// Project directory. Defaults to the current directory
    #[clap(long)]
    pub cwd: Option<PathBuf>,
}
