use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use crate::{
    domain::{Debit, PositivePoints, User},
    ports::ledger::LedgerPort,
};
use tower::Service;

use super::{DomainLogic, Error};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeductRequest {
    pub user: User,
    pub points: PositivePoints,
}

/// Cells debited by a deduction, oldest date first
#[derive(Debug, PartialEq, Eq)]
pub struct DeductResponse {
    pub debits: Vec<Debit>,
}

impl<D> Service<DeductRequest> for DomainLogic<D>
where
    D: LedgerPort + 'static,
{
    type Response = DeductResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: DeductRequest) -> Self::Future {
        let ledger = self.ledger.clone();
        Box::pin(async move {
            let debits = ledger.deduct(req.user, req.points).await?;

            Ok(DeductResponse { debits })
        })
    }
}
