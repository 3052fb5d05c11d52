use std::path::PathBuf;

use clap::Subcommand;
use serde_json::json;

use crate::cli::{utils::output_success, OutputFormat};
use crate::config::{config, StoreBackend};
use crate::database::DatabaseManager;
use crate::services::fixture::{self, Fixture};

#[derive(Subcommand)]
pub enum FixtureCommands {
    #[command(about = "Import a post office hierarchy, divisions before their members")]
    Load {
        #[arg(help = "Fixture YAML file")]
        file: PathBuf,
    },

    #[command(about = "Validate a fixture against the database without writing")]
    Check {
        #[arg(help = "Fixture YAML file")]
        file: PathBuf,
    },
}

pub async fn handle(cmd: FixtureCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let database = &config().database;
    if database.backend == StoreBackend::Memory {
        tracing::warn!("STORE_BACKEND=memory: fixture runs against an empty store that is discarded on exit");
    }

    match cmd {
        FixtureCommands::Load { file } => {
            let fixture = Fixture::from_path(&file)?;
            let store = DatabaseManager::open_store(database).await?;
            let report = fixture::load(store.as_ref(), &fixture).await?;

            output_success(
                output_format,
                &format!("Fixture {} loaded", file.display()),
                Some(json!({ "inserted": report.inserted, "updated": report.updated })),
            )
        }
        FixtureCommands::Check { file } => {
            let fixture = Fixture::from_path(&file)?;
            let store = DatabaseManager::open_store(database).await?;
            let count = fixture::check(store.as_ref(), &fixture).await?;

            output_success(
                output_format,
                &format!("Fixture {} is valid", file.display()),
                Some(json!({ "post_offices": count })),
            )
        }
    }
}
