//! paluwagan-sweep - advances cycle statuses for every active group.
//!
//! Runs once and exits; schedule it with cron or a job runner. Each group
//! is refreshed independently, so one failing group does not stop the rest.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use paluwagan::adapters::{
    InMemoryEventBus, PostgresCycleRepository, PostgresGroupRepository, PostgresLedgerRepository,
    PostgresMemberReader,
};
use paluwagan::application::{Engine, EnginePorts, RefreshCycleStatusesCommand};
use paluwagan::config::{AppConfig, ConfigError, ValidationError};
use paluwagan::domain::foundation::{CommandMetadata, DomainError};
use paluwagan::ports::GroupRepository;

#[derive(Debug, Error)]
enum SweepError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Could not list active groups: {0}")]
    ListGroups(#[from] DomainError),

    #[error("{failed} of {total} groups failed to refresh")]
    GroupsFailed { failed: usize, total: usize },
}

#[tokio::main]
async fn main() -> Result<(), SweepError> {
    let config = AppConfig::load()?;
    config.telemetry.init()?;
    config.validate()?;

    let pool = config.database.connect().await?;
    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Migrations applied");
    }

    let groups = Arc::new(PostgresGroupRepository::new(pool.clone()));
    // Events are logged for now; no downstream consumer is wired in.
    let events = Arc::new(InMemoryEventBus::new());
    let engine = Engine::new(
        EnginePorts {
            groups: groups.clone(),
            members: Arc::new(PostgresMemberReader::new(pool.clone())),
            cycles: Arc::new(PostgresCycleRepository::new(pool.clone())),
            ledger: Arc::new(PostgresLedgerRepository::new(pool.clone())),
            events: events.clone(),
        },
        &config.engine,
        config.is_production(),
    )?;
    let handler = &engine.refresh_cycle_statuses;

    let today = Utc::now().date_naive();
    let active = groups.find_active().await?;
    tracing::info!("Sweeping {} active groups for {}", active.len(), today);

    let mut failed = 0;
    for group in &active {
        let cmd = RefreshCycleStatusesCommand {
            group_id: group.id(),
            today,
        };
        match handler.handle(cmd, CommandMetadata::system("sweep")).await {
            Ok(result) if result.is_noop() => {}
            Ok(result) => tracing::info!(
                group_id = %group.id(),
                steps = result.changes.len(),
                opened_entries = result.opened_entries,
                completed = result.group_completed,
                "group refreshed"
            ),
            Err(err) => {
                failed += 1;
                tracing::error!(group_id = %group.id(), code = %err.code(), "refresh failed: {}", err);
            }
        }
    }

    for envelope in events.drain() {
        tracing::debug!(
            event_type = %envelope.event_type,
            aggregate_id = %envelope.aggregate_id,
            "event emitted"
        );
    }

    if failed > 0 {
        return Err(SweepError::GroupsFailed {
            failed,
            total: active.len(),
        });
    }
    Ok(())
}
