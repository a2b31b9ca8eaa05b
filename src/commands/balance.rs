use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use crate::{
    domain::{Balance, User},
    ports::ledger::LedgerPort,
};
use tower::Service;

use super::{DomainLogic, Error};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BalanceRequest {
    pub user: User,
}

impl<D> Service<BalanceRequest> for DomainLogic<D>
where
    D: LedgerPort + 'static,
{
    type Response = Balance;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: BalanceRequest) -> Self::Future {
        let ledger = self.ledger.clone();
        Box::pin(async move { Ok(ledger.balance(req.user).await?) })
    }
}
