use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use super::{DrinkKey, LedgerError, LedgerStore, WeekDrink, WeekEntry};

/// In-memory ledger with literal document semantics: one map per
/// (user, week), entries deleted at zero count, the week map deleted once
/// empty. Backs `AppState::fake()` and the intake tests.
#[derive(Default)]
pub struct MemoryLedgerStore {
    weeks: Mutex<HashMap<(Uuid, String), HashMap<DrinkKey, WeekEntry>>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn week_exists(&self, user_id: Uuid, week_id: &str) -> bool {
        self.weeks
            .lock()
            .expect("ledger lock poisoned")
            .contains_key(&(user_id, week_id.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.weeks.lock().expect("ledger lock poisoned").is_empty()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn apply_delta(
        &self,
        user_id: Uuid,
        week_id: &str,
        key: &DrinkKey,
        count_delta: i64,
        units_delta: f64,
    ) -> Result<(), LedgerError> {
        let mut weeks = self.weeks.lock().expect("ledger lock poisoned");
        let doc = weeks
            .entry((user_id, week_id.to_string()))
            .or_default();

        let current = doc.get(key).copied().unwrap_or_default();
        let new_count = (current.count + count_delta).max(0);
        let new_units = (current.units + units_delta).max(0.0);

        if new_count > 0 {
            doc.insert(
                key.clone(),
                WeekEntry {
                    count: new_count,
                    units: new_units,
                },
            );
        } else {
            doc.remove(key);
        }

        if doc.is_empty() {
            weeks.remove(&(user_id, week_id.to_string()));
        }
        Ok(())
    }

    async fn fetch_week(&self, user_id: Uuid, week_id: &str) -> Result<Vec<WeekDrink>, LedgerError> {
        let weeks = self.weeks.lock().expect("ledger lock poisoned");
        let mut drinks: Vec<WeekDrink> = weeks
            .get(&(user_id, week_id.to_string()))
            .map(|doc| {
                doc.iter()
                    .map(|(key, entry)| WeekDrink {
                        brand_name: key.brand_name.clone(),
                        drink_name: key.drink_name.clone(),
                        count: entry.count,
                        units: entry.units,
                    })
                    .collect()
            })
            .unwrap_or_default();
        drinks.sort_by(|a, b| {
            (a.brand_name.as_str(), a.drink_name.as_str())
                .cmp(&(b.brand_name.as_str(), b.drink_name.as_str()))
        });
        Ok(drinks)
    }
}
