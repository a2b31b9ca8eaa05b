use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use crate::{
    domain::{Date, Payer, Points, User},
    ports::ledger::LedgerPort,
};
use tower::Service;

use super::{DomainLogic, Error};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddPointsRequest {
    pub user: User,
    pub date: Date,
    pub payer: Payer,
    /// Difference in points
    ///
    /// A positive number adds points to the cell. A negative number removes from it, without going
    /// through the oldest-first deduction.
    pub points: Points,
}

#[derive(Debug, PartialEq, Eq)]
pub struct AddPointsResponse {
    pub user: User,
    pub date: Date,
    pub payer: Payer,
    /// Previous number of points in the cell
    pub old_points: Points,
    /// New number of points in the cell
    pub new_points: Points,
}

impl<D> Service<AddPointsRequest> for DomainLogic<D>
where
    D: LedgerPort + 'static,
{
    type Response = AddPointsResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: AddPointsRequest) -> Self::Future {
        let ledger = self.ledger.clone();
        Box::pin(async move {
            let new_points = ledger
                .add_points(
                    req.user.clone(),
                    req.date.clone(),
                    req.payer.clone(),
                    req.points,
                )
                .await?;

            Ok(AddPointsResponse {
                user: req.user,
                date: req.date,
                payer: req.payer,
                // The cell was never negative, so this cannot overflow
                old_points: new_points - req.points,
                new_points,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        adapters::database::memory::MemoryLedger,
        domain::LedgerError,
        ports::ledger::{Error as PortError, MockLedgerPort},
    };
    use mockall::predicate::*;
    use rstest::*;
    use speculoos::prelude::*;
    use std::sync::Arc;
    use tower::{BoxError, ServiceExt};

    #[fixture]
    fn request() -> AddPointsRequest {
        AddPointsRequest {
            user: "alice".to_string(),
            date: "2021-01-01".to_string(),
            payer: "DANNON".to_string(),
            points: 300,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn test_call(request: AddPointsRequest) -> Result<(), BoxError> {
        // GIVEN a ledger port that accepts the change
        let mut ledger = MockLedgerPort::new();
        ledger
            .expect_add_points()
            .times(1)
            .with(
                eq("alice".to_string()),
                eq("2021-01-01".to_string()),
                eq("DANNON".to_string()),
                eq(300),
            )
            .returning(|_, _, _, _| Ok(1000));
        let mut domain = DomainLogic::new(Arc::new(ledger));

        // WHEN calling the service
        let res = ServiceExt::<AddPointsRequest>::ready(&mut domain)
            .await?
            .call(request)
            .await;

        // THEN
        // * It returns the cell before and after the change
        // * The port is called
        assert_that!(res).is_ok().is_equal_to(AddPointsResponse {
            user: "alice".to_string(),
            date: "2021-01-01".to_string(),
            payer: "DANNON".to_string(),
            old_points: 700,
            new_points: 1000,
        });
        Arc::into_inner(domain.ledger).unwrap().checkpoint();

        Ok(())
    }

    #[rstest]
    #[tokio::test]
    async fn test_call_rejected(request: AddPointsRequest) -> Result<(), BoxError> {
        // GIVEN a ledger port that rejects the change
        let mut ledger = MockLedgerPort::new();
        ledger.expect_add_points().times(1).returning(|_, _, _, delta| {
            Err(LedgerError::NegativeBalance { current: 0, delta }.into())
        });
        let mut domain = DomainLogic::new(Arc::new(ledger));

        // WHEN calling the service
        let res = ServiceExt::<AddPointsRequest>::ready(&mut domain)
            .await?
            .call(request)
            .await;

        // THEN the domain error is passed through
        assert_that!(res).is_err().matches(|err| {
            matches!(
                err,
                Error::Ledger(PortError::Ledger(LedgerError::NegativeBalance { delta: 300, .. }))
            )
        });

        Ok(())
    }

    #[rstest]
    #[tokio::test]
    async fn test_call_memory(request: AddPointsRequest) -> Result<(), BoxError> {
        // GIVEN an in-memory ledger with existing points in the cell
        let database = MemoryLedger::default();
        database
            .add_points(
                "alice".to_string(),
                "2021-01-01".to_string(),
                "DANNON".to_string(),
                50,
            )
            .await?;
        let domain = DomainLogic::new(Arc::new(database));

        // WHEN removing more than the cell holds
        let res = domain
            .clone()
            .oneshot(AddPointsRequest {
                points: -100,
                ..request
            })
            .await;

        // THEN it fails and the cell keeps its points
        assert_that!(res).is_err();
        let res = domain.ledger.balance("alice".to_string()).await?;
        assert_that!(res.get("DANNON")).is_some().is_equal_to(&50);

        Ok(())
    }
}
