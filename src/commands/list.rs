//! List command implementation

use std::path::PathBuf;

use console::style;

use crate::cli::ListArgs;
use crate::error::Result;
use crate::meta;
use crate::vfs::PathTable;

pub fn run(root: Option<PathBuf>, args: ListArgs) -> Result<()> {
    let table = PathTable::discover(root)?;
    let names = meta::installed_names(&table)?;

    if args.names_only {
        for name in names {
            println!("{name}");
        }
        return Ok(());
    }

    for name in names {
        match meta::read(&table, &name)? {
            Some(record) => println!(
                "{} {} {} {}",
                style(&name).bold().yellow(),
                style(&record.version).green(),
                style(&record.bucket).blue(),
                record.date,
            ),
            None => continue,
        }
    }
    Ok(())
}
