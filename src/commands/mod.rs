use std::sync::Arc;

pub mod add_points;
pub mod balance;
pub mod deduct;

/// Entry point for all ledger commands
///
/// Each command is a [`tower::Service`] over its own request type.
pub struct DomainLogic<D> {
    ledger: Arc<D>,
}

impl<D> DomainLogic<D> {
    pub fn new(ledger: Arc<D>) -> Self {
        Self { ledger }
    }
}

// Not derived, as that would require `D: Clone`
impl<D> Clone for DomainLogic<D> {
    fn clone(&self) -> Self {
        Self {
            ledger: self.ledger.clone(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("ledger port error: {0}")]
    Ledger(#[from] crate::ports::ledger::Error),
}
