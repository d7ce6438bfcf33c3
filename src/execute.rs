use std::path::{Path, PathBuf};
use anyhow::{bail, Context, Result};
use clap::CommandFactory;
use colored::Colorize;
use shelf::config::{Overrides, ShelfConfig, ShelfToml};
use shelf::global::cache::ManifestCache;
use shelf::installer::{InstallReport, Installer};
use shelf::lister::list;
use shelf::package_manager::{NodePackageManager, PackageManager, PackageManagerKind};
use shelf::registry;
use shelf::resolve::expand_all;
use shelf::util::get_shelf_toml;
use crate::cli::{RegistryArgs, ShelfCommand, CLI};

pub fn execute(cli: CLI) -> Result<()> {
    match cli.command {
        Some(ShelfCommand::Add { names, registry, skip_deps, no_overwrite, package_manager }) => {
            let overrides = Overrides {
                registry: registry.registry.clone(),
                style: registry.style.clone(),
                package_manager,
                no_overwrite,
                skip_deps,
            };
            execute_add(&names, project_dir(registry.cwd)?, &overrides)
        }
        Some(ShelfCommand::List { registry }) => {
            execute_list(registry)
        }
        Some(ShelfCommand::Init { cwd }) => {
            execute_init(project_dir(cwd)?)
        }
        Some(ShelfCommand::Clean) => {
            execute_clean()
        }
        None => {
            CLI::command().print_help()?;
            println!();
            Ok(())
        }
    }
}

fn project_dir(cwd: Option<PathBuf>) -> Result<PathBuf> {
    match cwd {
        Some(dir) => Ok(dir),
        None => Ok(std::env::current_dir()?),
    }
}

pub fn execute_add(names: &[String], project_dir: PathBuf, overrides: &Overrides) -> Result<()> {
    let config = ShelfConfig::load(&project_dir, overrides)?;
    let source = registry::open(&config.registry, &config.style)
        .with_context(|| format!("Could not open registry {}", config.registry))?;
    let items = expand_all(&*source, names)?;

    let package_manager = match config.skip_deps {
        true => None,
        false => Some(NodePackageManager::new(config.package_manager_kind())),
    };
    let installer = Installer::new(&config.install_root, &config.project_dir)
        .with_package_manager(package_manager.as_ref().map(|pm| pm as &dyn PackageManager))
        .overwrite(config.overwrite);

    match installer.install_all(&items) {
        Ok(reports) => {
            for report in &reports {
                print_report(report, &config.project_dir);
            }
            Ok(())
        }
        Err(failure) => {
            for report in &failure.installed {
                print_report(report, &config.project_dir);
            }
            println!("{} {}", "failed".red().bold(), failure.error.component());
            for path in failure.error.written() {
                println!("  wrote {}", display_relative(path, &config.project_dir));
            }
            Err(failure.error.into())
        }
    }
}

fn print_report(report: &InstallReport, project_dir: &Path) {
    println!("{} {}", "added".green().bold(), report.component);
    if !report.packages_added.is_empty() {
        println!("  packages: {}", report.packages_added.join(", "));
    }
    if let Some(e) = &report.dependency_error {
        println!("  {} {}", "warning:".yellow().bold(), e);
    }
    for path in &report.files_written {
        println!("  wrote {}", display_relative(path, project_dir));
    }
    for path in &report.files_skipped {
        println!("  kept  {}", display_relative(path, project_dir));
    }
}

fn display_relative(path: &Path, base: &Path) -> String {
    path.strip_prefix(base).unwrap_or(path).display().to_string()
}

pub fn execute_list(args: RegistryArgs) -> Result<()> {
    let overrides = Overrides {
        registry: args.registry,
        style: args.style,
        ..Default::default()
    };
    let config = ShelfConfig::load(project_dir(args.cwd)?, &overrides)?;
    let source = registry::open(&config.registry, &config.style)
        .with_context(|| format!("Could not open registry {}", config.registry))?;
    let listing = list(&*source)?;

    if listing.is_empty() {
        println!("No components");
        return Ok(());
    }
    for (kind, entries) in &listing.groups {
        println!("{}", kind.to_string().bold());
        for entry in entries {
            match &entry.description {
                Some(description) => println!("  {} - {}", entry.name, description.dimmed()),
                None => println!("  {}", entry.name),
            }
        }
        println!();
    }
    for broken in &listing.unavailable {
        println!("{} {}: {}", "unavailable".red(), broken.name, broken.reason);
    }
    Ok(())
}

pub fn execute_init(project_dir: PathBuf) -> Result<()> {
    let path = get_shelf_toml(&project_dir);
    if path.exists() {
        bail!("{} already exists", path.display());
    }
    let mut toml = ShelfToml::default();
    let detected = PackageManagerKind::detect(&project_dir);
    if detected != PackageManagerKind::Npm {
        toml.project.package_manager = Some(detected);
    }
    toml.save(&path)?;
    println!("Created {}", path.display());
    Ok(())
}

pub fn execute_clean() -> Result<()> {
    let cache = ManifestCache::global()?;
    let removed = cache.clean()?;
    println!("Removed {} cached document(s) from {}", removed, cache.dir().display());
    Ok(())
}
