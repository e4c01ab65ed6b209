use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use uuid::Uuid;

use super::tracker::IntakeTracker;
use crate::auth::SessionIdentity;
use crate::ledger::LedgerStore;

/// Per-user tracker registry. Trackers are created lazily on first use and
/// are deliberately retained for the process lifetime: a restart is the
/// session boundary that discards aggregate state, and the weekly ledger,
/// not this map, is the durable record. Memory therefore grows with the
/// number of distinct authenticated users; there is no eviction.
pub struct Sessions {
    ledger: Arc<dyn LedgerStore>,
    trackers: RwLock<HashMap<Uuid, Arc<IntakeTracker>>>,
}

impl Sessions {
    pub fn new(ledger: Arc<dyn LedgerStore>) -> Self {
        Self {
            ledger,
            trackers: RwLock::new(HashMap::new()),
        }
    }

    pub fn tracker_for(&self, user_id: Uuid) -> Arc<IntakeTracker> {
        if let Some(tracker) = self
            .trackers
            .read()
            .expect("sessions lock poisoned")
            .get(&user_id)
        {
            return Arc::clone(tracker);
        }

        let mut trackers = self.trackers.write().expect("sessions lock poisoned");
        Arc::clone(trackers.entry(user_id).or_insert_with(|| {
            Arc::new(IntakeTracker::new(
                Arc::clone(&self.ledger),
                Arc::new(SessionIdentity(user_id)),
            ))
        }))
    }
}
