use crate::domain::{Balance, Date, Debit, LedgerError, Payer, Points, PositivePoints, User};

#[mockall::automock]
#[async_trait::async_trait]
pub trait LedgerPort {
    /// Apply `delta` to a single (user, date, payer) cell, returning the new cell value
    async fn add_points(
        &self,
        user: User,
        date: Date,
        payer: Payer,
        delta: Points,
    ) -> Result<Points, Error>;
    /// Per-payer totals for a user, empty if the user is unknown
    async fn balance(&self, user: User) -> Result<Balance, Error>;
    /// Spend `amount` points, oldest first, all or nothing
    async fn deduct(&self, user: User, amount: PositivePoints) -> Result<Vec<Debit>, Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Domain-level rejection of an operation
    ///
    /// The ledger is left unmodified when this is returned.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Concrete adapter errors
    ///
    /// This could represent any errors from a concrete adapter that is not part of the domain
    /// model, such as connectivity, configuration, or permission errors.
    #[error("adapter error: {0:?}")]
    Adapter(Box<dyn std::error::Error + Send + Sync>),
}
