//! # Shelf Core Library
//!
//! This crate contains the core logic of the `shelf` tool – a CLI that copies
//! UI components from a JSON registry into a project, installing every
//! component a request depends on before the component itself.
//!
//! A registry holds one JSON document per component, grouped by style
//! (`<style>/<name>.json`). Each document lists npm packages, other registry
//! components it builds on, and the source files it ships.
//!
//! ## Modules Overview
//! - [`registry`] – Component documents and the sources they are read from
//! - [`remote`] – Registries served over HTTP
//! - [`resolve`] – Looking up components and ordering their dependencies
//! - [`installer`] – Running the package manager and writing component files
//! - [`package_manager`] – npm / pnpm / yarn / bun detection and invocation
//! - [`lister`] – Grouping a registry's components for display
//! - [`config`] – `shelf.toml` and per-invocation settings
//! - [`error`] – Error types shared by the modules above
//! - [`util`] – Small shared helpers (name and path checks)
//! - [`global`] – Per-user state (the remote manifest cache)


pub mod config;
pub mod error;
pub mod global;
pub mod installer;
pub mod lister;
pub mod package_manager;
pub mod registry;
pub mod remote;
pub mod resolve;
pub mod util;

pub use config::*;
pub use error::*;
pub use installer::*;
pub use lister::*;
pub use package_manager::*;
pub use registry::*;
pub use resolve::*;
pub use global::cache::*;
