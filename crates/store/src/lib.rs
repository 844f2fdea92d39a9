//! Postgres persistence for the pipeline (spec §2 "Store"). A single
//! relational database plus the on-disk hierarchy owned by Fetcher/Merger/
//! Trimmer (datafs, not this crate). Exposes transactional CRUD and audit
//! logging; the on-disk side never appears here.

pub mod activities;
pub mod audit;
pub mod config;
pub mod error;
pub mod gold;
pub mod reviews;
pub mod runs;
pub mod spots;
pub mod streaks;
pub mod venues;
pub mod watchlist;

pub use error::{Result, StoreError};

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// A process-wide handle to the relational store, threaded explicitly
/// through every stage instead of held as a global (spec §9 "Global
/// singletons").
#[derive(Clone)]
pub struct Store {
    pool: PgPool,
}

impl Store {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn begin(&self) -> Result<sqlx::Transaction<'_, sqlx::Postgres>> {
        Ok(self.pool.begin().await?)
    }
}
