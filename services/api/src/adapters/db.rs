//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `SiteRepository` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.
//!
//! Live subscriptions rely on the `sites_changed` notification raised by the
//! trigger in `migrations/`. Each subscription holds its own `PgListener`
//! connection, which is closed when the subscriber cancels.

use async_trait::async_trait;
use gakbbul_core::domain::{now_millis, NewSite, Site, SiteFormData};
use gakbbul_core::ports::{PortError, PortResult, SiteRepository};
use gakbbul_core::subscription::{site_feed, SiteFeed, SiteSubscription};
use sqlx::postgres::PgListener;
use sqlx::{FromRow, PgPool};
use tracing::{error, info};
use uuid::Uuid;

const SITES_CHANGED_CHANNEL: &str = "sites_changed";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `SiteRepository` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct SiteRecord {
    id: Uuid,
    url: String,
    title: String,
    name: String,
    description: String,
    created_at: i64,
}
impl SiteRecord {
    fn to_domain(self) -> Site {
        Site {
            id: self.id,
            url: self.url,
            title: self.title,
            name: self.name,
            description: self.description,
            created_at: self.created_at,
        }
    }
}

async fn fetch_sites(pool: &PgPool) -> PortResult<Vec<Site>> {
    let records = sqlx::query_as::<_, SiteRecord>(
        "SELECT id, url, title, name, description, created_at FROM sites ORDER BY created_at DESC",
    )
    .fetch_all(pool)
    .await
    .map_err(|e| PortError::Unexpected(e.to_string()))?;

    Ok(records.into_iter().map(|r| r.to_domain()).collect())
}

/// Forwards a fresh snapshot for every change notification until the subscriber leaves.
async fn run_feed(pool: PgPool, mut listener: PgListener, feed: SiteFeed, initial: Vec<Site>) {
    if !feed.publish(initial).await {
        return;
    }
    loop {
        tokio::select! {
            _ = feed.cancelled() => break,
            notification = listener.recv() => {
                if let Err(e) = notification {
                    error!("Site change listener failed: {:?}", e);
                    break;
                }
                match fetch_sites(&pool).await {
                    Ok(sites) => {
                        if !feed.publish(sites).await {
                            break;
                        }
                    }
                    Err(e) => error!("Failed to refresh sites after a change: {:?}", e),
                }
            }
        }
    }
    info!("Site subscription released.");
}

//=========================================================================================
// `SiteRepository` Trait Implementation
//=========================================================================================

#[async_trait]
impl SiteRepository for DbAdapter {
    async fn subscribe(&self) -> PortResult<SiteSubscription> {
        let mut listener = PgListener::connect_with(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        listener
            .listen(SITES_CHANGED_CHANNEL)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Listen before the first read so no change between the two is missed.
        let initial = fetch_sites(&self.pool).await?;

        let (feed, subscription) = site_feed();
        tokio::spawn(run_feed(self.pool.clone(), listener, feed, initial));
        info!("Site subscription opened.");
        Ok(subscription)
    }

    async fn add(&self, form: SiteFormData) -> PortResult<Site> {
        let new_site = NewSite::from_form(form, now_millis())?;

        let record = sqlx::query_as::<_, SiteRecord>(
            "INSERT INTO sites (url, title, name, description, created_at) VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, url, title, name, description, created_at",
        )
        .bind(&new_site.url)
        .bind(&new_site.title)
        .bind(&new_site.name)
        .bind(&new_site.description)
        .bind(new_site.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(record.to_domain())
    }

    async fn delete(&self, id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM sites WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Site {} not found", id)));
        }
        Ok(())
    }
}
