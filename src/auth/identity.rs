use uuid::Uuid;

/// Explicit identity seam for the intake core: who, if anyone, is the
/// authenticated user behind a mutation. Passed in rather than read from
/// ambient global state.
pub trait Identity: Send + Sync {
    fn current_user(&self) -> Option<Uuid>;
}

/// Identity of an authenticated session; the id comes from the verified
/// bearer token.
#[derive(Debug, Clone, Copy)]
pub struct SessionIdentity(pub Uuid);

impl Identity for SessionIdentity {
    fn current_user(&self) -> Option<Uuid> {
        Some(self.0)
    }
}

/// No authenticated user; local mutations proceed, ledger sync is skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl Identity for Anonymous {
    fn current_user(&self) -> Option<Uuid> {
        None
    }
}
