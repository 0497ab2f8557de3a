//! Background sweep over abandoned matches. A match left in_progress stays
//! that way until the operator completes or cancels it; this job only makes
//! the backlog visible, it never mutates match state.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use uuid::Uuid;

pub struct SchedulerService {
    scheduler: JobScheduler,
    pool: PgPool,
    stale_match_hours: i64,
}

impl SchedulerService {
    pub async fn new(pool: PgPool, stale_match_hours: i64) -> Result<Self, JobSchedulerError> {
        let scheduler = JobScheduler::new().await?;
        Ok(Self {
            scheduler,
            pool,
            stale_match_hours,
        })
    }

    /// Register the hourly sweep and start the scheduler.
    pub async fn start(&self) -> Result<(), JobSchedulerError> {
        let pool = self.pool.clone();
        let stale_match_hours = self.stale_match_hours;
        let job = Job::new_async("0 0 * * * *", move |_uuid, _lock| {
            let pool = pool.clone();
            Box::pin(async move {
                sweep_stale_matches(&pool, stale_match_hours).await;
            })
        })?;
        self.scheduler.add(job).await?;
        self.scheduler.start().await?;
        tracing::info!(
            "Stale match sweep scheduled (threshold {}h)",
            self.stale_match_hours
        );
        Ok(())
    }
}

async fn sweep_stale_matches(pool: &PgPool, stale_match_hours: i64) {
    let cutoff = Utc::now() - chrono::Duration::hours(stale_match_hours);
    let stale: Result<Vec<(Uuid, DateTime<Utc>)>, sqlx::Error> = sqlx::query_as(
        r#"
        SELECT id, updated_at FROM tournament_matches
        WHERE status = 'in_progress' AND updated_at < $1
        ORDER BY updated_at
        "#,
    )
    .bind(cutoff)
    .fetch_all(pool)
    .await;

    match stale {
        Ok(rows) => {
            for (match_id, updated_at) in &rows {
                tracing::warn!(
                    "Match {} has been in progress with no activity since {}; complete or cancel it",
                    match_id,
                    updated_at
                );
            }
            if rows.is_empty() {
                tracing::debug!("No stale in-progress matches");
            }
        }
        Err(e) => {
            tracing::error!("Stale match sweep failed: {}", e);
        }
    }
}
