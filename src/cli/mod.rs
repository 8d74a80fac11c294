pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "sergas")]
#[command(about = "SERGAS CLI - maintenance tasks for the website backend")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Print a bcrypt hash for seeding a user password")]
    HashPassword {
        #[arg(help = "Plain-text password")]
        password: String,

        #[arg(long, help = "bcrypt cost (defaults to BCRYPT_COST)")]
        cost: Option<u32>,
    },

    #[command(about = "Rewrite the display order of a collection")]
    Reorder {
        #[arg(help = "Collection name, e.g. proyectos")]
        collection: String,

        #[arg(required = true, help = "Row ids in their new display order")]
        ids: Vec<i64>,

        #[arg(long, help = "Position of the first id (defaults to ORDERING_BASE_OFFSET)")]
        base: Option<i64>,
    },

    #[command(about = "Report list columns that read back as empty although they hold data")]
    AuditLists {
        #[arg(help = "Collection name, e.g. proyectos")]
        collection: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::HashPassword { password, cost } => {
            commands::hash_password::handle(&password, cost, output_format).await
        }
        Commands::Reorder { collection, ids, base } => {
            commands::reorder::handle(&collection, ids, base, output_format).await
        }
        Commands::AuditLists { collection } => commands::audit::handle(&collection, output_format).await,
    }
}
