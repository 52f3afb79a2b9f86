mod commands;
mod migrations;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tessera_core::{AppConfigTrait, LoggingConfig};

#[derive(Parser)]
#[command(name = "tessera")]
#[command(about = "Inspect the tessera schema and look records up by key")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the DDL of the registered schema
    Schema {
        /// Target dialect (mysql or postgresql)
        #[arg(long, default_value = "mysql")]
        dialect: String,

        /// Only list table names
        #[arg(long)]
        tables: bool,
    },

    /// Find a record by primary key
    Find {
        /// Table or model name
        table: String,

        /// Key value; integers are matched as numbers
        id: String,

        /// Columns to select, comma separated
        #[arg(long, value_delimiter = ',')]
        columns: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let logging = LoggingConfig::from_env()?;
    tessera_core::logging::init(&logging).map_err(|e| anyhow::anyhow!(e))?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Schema { dialect, tables } => {
            commands::schema::print(&dialect, tables)?;
        }
        Commands::Find { table, id, columns } => {
            commands::find::run(&table, &id, &columns).await?;
        }
    }

    Ok(())
}
