use crate::{
    domain::{Balance, Date, Debit, LedgerError, Payer, Points, PositivePoints, User, UserLedger},
    ports::ledger::{Error, LedgerPort},
};
use log::{debug, error, warn};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

/// In-memory ledger for all users
///
/// A single lock guards every user, so each operation is one critical section. Clones share the
/// same store.
#[derive(Clone, Debug)]
pub struct MemoryLedger {
    users: Arc<Mutex<HashMap<User, UserLedger>>>,
}

#[async_trait::async_trait]
impl LedgerPort for MemoryLedger {
    async fn add_points(
        &self,
        user: User,
        date: Date,
        payer: Payer,
        delta: Points,
    ) -> Result<Points, Error> {
        let mut users = self.users.lock()?;
        let res = users
            .entry(user.clone())
            .or_default()
            .add_points(&date, &payer, delta);

        match res {
            Ok(points) => {
                debug!("added {delta} points for {user} from {payer} on {date}, now {points}");
                Ok(points)
            }
            Err(err) => {
                warn!("rejected {delta} points for {user} from {payer} on {date}: {err}");
                Err(err.into())
            }
        }
    }

    async fn balance(&self, user: User) -> Result<Balance, Error> {
        let balance = self
            .users
            .lock()?
            .get(&user)
            .map(UserLedger::balance)
            .unwrap_or_default();

        Ok(balance)
    }

    async fn deduct(&self, user: User, amount: PositivePoints) -> Result<Vec<Debit>, Error> {
        let mut users = self.users.lock()?;
        // Unknown users hold zero points; don't create an entry for them
        let res = match users.get_mut(&user) {
            Some(ledger) => ledger.deduct(amount),
            None => Err(LedgerError::InsufficientPoints {
                available: 0,
                requested: amount.get(),
            }),
        };

        match res {
            Ok(debits) => {
                debug!("deducted {} points for {user} over {} cell(s)", amount.get(), debits.len());
                Ok(debits)
            }
            Err(err @ LedgerError::InternalInconsistency { .. }) => {
                error!("deduction of {} points for {user} failed: {err}", amount.get());
                Err(err.into())
            }
            Err(err) => {
                warn!("rejected deduction of {} points for {user}: {err}", amount.get());
                Err(err.into())
            }
        }
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self {
            users: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

/// Erased [`PoisonError`]
///
/// `PoisonError` keeps the `MutexGuard` internally, which is not send. Thus we erase the error
/// and only keep the string representation instead.
#[derive(Debug, thiserror::Error)]
#[error("poison error: {0}")]
pub struct ErasedPoisonError(String);

impl<T> From<PoisonError<T>> for Error {
    fn from(err: PoisonError<T>) -> Self {
        Self::Adapter(Box::new(ErasedPoisonError(err.to_string())))
    }
}
