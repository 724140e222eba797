//! `migrate` command.

use crate::cli::args::{MigrateAction, MigrateArgs};
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::Database;

pub async fn execute(args: MigrateArgs, config: Config) -> AppResult<()> {
    let db = Database::connect_without_migrations(&config).await?;
    tracing::debug!(action = ?args.action, "Connected for migration");

    match args.action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            tracing::info!("Pending migrations applied");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            tracing::info!("Last migration rolled back");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await?;
            let pending = status.iter().filter(|(_, applied)| !applied).count();
            for (name, applied) in &status {
                println!("{:<48} {}", name, if *applied { "applied" } else { "pending" });
            }
            tracing::info!(total = status.len(), pending, "Migration status listed");
        }
        MigrateAction::Fresh => {
            tracing::warn!("Dropping every table before re-applying migrations");
            db.fresh_migrations().await?;
            tracing::info!("Schema rebuilt from scratch");
        }
    }

    Ok(())
}
