//! List language tables.

use clap::Args;
use vocaline_config::{LanguageTable, factory_tables, list_tables, system_tables_dir, user_tables_dir};

/// List available tables.
#[derive(Args)]
pub struct TablesArgs {
    /// Show only factory tables
    #[arg(long)]
    pub factory: bool,

    /// Show table directories
    #[arg(long)]
    pub paths: bool,
}

/// Run the tables command.
pub fn run(args: TablesArgs) -> anyhow::Result<()> {
    if args.paths {
        println!("User tables:   {}", user_tables_dir().display());
        println!("System tables: {}", system_tables_dir().display());
        return Ok(());
    }

    println!("Factory Tables:");
    println!("===============");
    for table in factory_tables() {
        let desc = table.description.as_deref().unwrap_or("");
        println!("  {:20} - {}", table.name, desc);
    }
    println!();

    if args.factory {
        return Ok(());
    }

    println!("User Tables:");
    println!("============");
    let user_tables = list_tables();
    if user_tables.is_empty() {
        println!("  (none)");
    } else {
        for path in user_tables {
            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("unknown");
            match LanguageTable::load(&path) {
                Ok(table) => {
                    let desc = table.description.as_deref().unwrap_or("");
                    println!("  {:20} - {}", name, desc);
                }
                Err(_) => println!("  {:20} - (error loading)", name),
            }
        }
    }
    println!();

    Ok(())
}
