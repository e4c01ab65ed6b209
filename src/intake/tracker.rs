use std::sync::{Arc, RwLock};

use tracing::{debug, error, warn};
use uuid::Uuid;

use super::aggregate::AggregateState;
use crate::auth::Identity;
use crate::catalog::model::DrinkRecord;
use crate::ledger::{DrinkKey, LedgerStore};
use crate::week;

/// One user session's intake state. Local mutations are synchronous and
/// authoritative for display; each one schedules a fire-and-forget ledger
/// delta for the current ISO week. Ledger failures never feed back here —
/// the local aggregate and the remote week may diverge until the next
/// successful write.
pub struct IntakeTracker {
    state: RwLock<Arc<AggregateState>>,
    ledger: Arc<dyn LedgerStore>,
    identity: Arc<dyn Identity>,
}

impl IntakeTracker {
    pub fn new(ledger: Arc<dyn LedgerStore>, identity: Arc<dyn Identity>) -> Self {
        Self {
            state: RwLock::new(Arc::new(AggregateState::default())),
            ledger,
            identity,
        }
    }

    /// Consistent point-in-time view; mutations swap the whole Arc, so a
    /// snapshot never observes a partially applied operation.
    pub fn snapshot(&self) -> Arc<AggregateState> {
        Arc::clone(&self.state.read().expect("aggregate lock poisoned"))
    }

    pub fn add(&self, drink: DrinkRecord) {
        debug!(drink = %drink.drink_name, brand = %drink.brand_name, "adding drink to session");
        {
            let mut guard = self.state.write().expect("aggregate lock poisoned");
            let mut next = (**guard).clone();
            next.add(&drink);
            *guard = Arc::new(next);
        }

        match self.identity.current_user() {
            Some(user_id) => self.spawn_delta(user_id, &drink, 1),
            None => warn!(
                drink = %drink.drink_name,
                "no authenticated user; intake not logged to the weekly ledger"
            ),
        }
    }

    pub fn remove(&self, drink: &DrinkRecord) {
        let removed = {
            let mut guard = self.state.write().expect("aggregate lock poisoned");
            let mut next = (**guard).clone();
            let removed = next.remove(drink);
            if removed {
                *guard = Arc::new(next);
            }
            removed
        };

        if !removed {
            warn!(
                drink = %drink.drink_name,
                brand = %drink.brand_name,
                "attempted to remove a drink that is not in the session"
            );
            return;
        }
        debug!(drink = %drink.drink_name, brand = %drink.brand_name, "removed drink from session");

        match self.identity.current_user() {
            Some(user_id) => self.spawn_delta(user_id, drink, -1),
            None => warn!(
                drink = %drink.drink_name,
                "no authenticated user; removal not logged to the weekly ledger"
            ),
        }
    }

    fn spawn_delta(&self, user_id: Uuid, drink: &DrinkRecord, count_delta: i64) {
        let ledger = Arc::clone(&self.ledger);
        let key = DrinkKey::from(drink);
        let units_delta = count_delta as f64 * drink.alcohol_units;
        let week_id = week::current_week_id();

        tokio::spawn(async move {
            if let Err(e) = ledger
                .apply_delta(user_id, &week_id, &key, count_delta, units_delta)
                .await
            {
                error!(
                    error = %e,
                    user_id = %user_id,
                    week_id = %week_id,
                    drink = %key.drink_name,
                    count_delta,
                    "weekly ledger update failed"
                );
            }
        });
    }
}
