//! Info command implementation
//!
//! The target is a manifest file when the path exists, otherwise the name
//! of an installed package.

use std::path::{Path, PathBuf};

use console::style;

use crate::cli::InfoArgs;
use crate::error::{KegError, Result};
use crate::meta;
use crate::package::Package;
use crate::vfs::PathTable;

pub fn run(root: Option<PathBuf>, args: InfoArgs) -> Result<()> {
    let target = Path::new(&args.target);
    if target.is_file() {
        let pkg = Package::from_file(target)?;
        display_manifest(&pkg);
        return Ok(());
    }

    let table = PathTable::discover(root)?;
    let Some(record) = meta::read(&table, &args.target)? else {
        return Err(KegError::NotInstalled {
            name: args.target.clone(),
        });
    };

    println!("{} {}", style("Package:").bold(), args.target);
    println!("{} {}", style("Version:").bold(), record.version);
    println!("{} {}", style("Bucket:").bold(), record.bucket);
    println!("{} {}", style("Installed:").bold(), record.date);
    if !record.force_delete.is_empty() {
        println!(
            "{} {}",
            style("Force delete:").bold(),
            record.force_delete.join(", ")
        );
    }
    if let Some(venv) = &record.venv {
        if let Some(category) = &venv.category {
            println!("{} {}", style("Category:").bold(), category);
        }
        if !venv.dependencies.is_empty() {
            println!(
                "{} {}",
                style("Depends on:").bold(),
                style(venv.dependencies.join(", ")).blue()
            );
        }
    }
    Ok(())
}

fn display_manifest(pkg: &Package) {
    println!("{} {}", style("Package:").bold(), pkg.name);
    println!("{} {}", style("Version:").bold(), pkg.version);
    if !pkg.bucket.is_empty() {
        println!("{} {}", style("Bucket:").bold(), pkg.bucket);
    }
    if !pkg.extension.is_empty() {
        println!("{} {}", style("Extension:").bold(), pkg.extension);
    }
    for url in &pkg.urls {
        println!("{} {}", style("Url:").bold(), url.url());
    }
    if !pkg.venv.dependencies.is_empty() {
        println!(
            "{} {}",
            style("Depends on:").bold(),
            style(pkg.venv.dependencies.join(", ")).blue()
        );
    }
    if let Some(notes) = &pkg.notes {
        println!("{} {}", style("Notes:").bold(), notes);
    }
}
