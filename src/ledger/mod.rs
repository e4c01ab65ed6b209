mod memory;
mod postgres;

pub use memory::MemoryLedgerStore;
pub use postgres::PgLedgerStore;

use async_trait::async_trait;
use serde::Serialize;
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

use crate::catalog::model::DrinkRecord;

/// Composite ledger key. Brand and name are kept as separate fields so two
/// brands sharing a drink name can never merge into one entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DrinkKey {
    pub brand_name: String,
    pub drink_name: String,
}

impl From<&DrinkRecord> for DrinkKey {
    fn from(drink: &DrinkRecord) -> Self {
        Self {
            brand_name: drink.brand_name.clone(),
            drink_name: drink.drink_name.clone(),
        }
    }
}

/// Per-drink state inside one week's ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeekEntry {
    pub count: i64,
    pub units: f64,
}

/// One row of a weekly fetch.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct WeekDrink {
    pub brand_name: String,
    pub drink_name: String,
    pub count: i64,
    pub units: f64,
}

#[derive(Debug, Error)]
pub enum LedgerError {
    /// Concurrent transaction conflict; retryable.
    #[error("ledger transaction conflict")]
    Conflict,
    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

/// Transactional weekly-ledger store.
///
/// `apply_delta` is a single atomic read-modify-write: the entry's count and
/// units are clamped at zero, a zero-count entry is deleted, and a week with
/// no entries left disappears entirely. Deltas for different keys must not
/// clobber each other, so implementations write per entry, never the whole
/// week at once.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn apply_delta(
        &self,
        user_id: Uuid,
        week_id: &str,
        key: &DrinkKey,
        count_delta: i64,
        units_delta: f64,
    ) -> Result<(), LedgerError>;

    /// Pure read; an absent week is an empty list, never an error.
    async fn fetch_week(&self, user_id: Uuid, week_id: &str) -> Result<Vec<WeekDrink>, LedgerError>;
}
