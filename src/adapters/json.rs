//! Transport adapter for JSON requests
//!
//! Requests arrive as untyped JSON. Each field is type-checked here before any command runs, and
//! command results are mapped to HTTP-style status codes.

use crate::{
    commands::{
        add_points::AddPointsRequest, balance::BalanceRequest, deduct::DeductRequest, DomainLogic,
        Error,
    },
    domain::{LedgerError, Points, PositivePoints},
    ports::ledger::{self, LedgerPort},
};
use log::error;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::io::{self, BufRead, Write};
use tower::ServiceExt;

/// Status and JSON body returned for a request
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Response {
    pub status: u16,
    pub body: Value,
}

impl Response {
    pub const OK: u16 = 200;
    pub const BAD_REQUEST: u16 = 400;
    pub const NOT_FOUND: u16 = 404;
    pub const INTERNAL_ERROR: u16 = 500;

    fn ok(body: Value) -> Self {
        Self {
            status: Self::OK,
            body,
        }
    }

    fn error(status: u16, reason: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": reason.into() }),
        }
    }

    fn internal_error() -> Self {
        Self::error(Self::INTERNAL_ERROR, "internal error")
    }

    fn serialized<T: Serialize>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(body) => Self::ok(body),
            Err(err) => {
                error!("failed to serialize response: {err}");
                Self::internal_error()
            }
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Self::OK
    }
}

/// Malformed request
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("request body must be a JSON object")]
    NotAnObject,
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("{0} must be string")]
    NotAString(&'static str),
    #[error("{0} must be whole number")]
    NotAWholeNumber(&'static str),
    #[error("{0} must be positive")]
    NotPositive(&'static str),
    #[error("request must be a JSON object with a string route: {0}")]
    Envelope(String),
}

impl From<ValidationError> for Response {
    fn from(err: ValidationError) -> Self {
        Self::error(Self::BAD_REQUEST, err.to_string())
    }
}

impl From<Error> for Response {
    fn from(err: Error) -> Self {
        let Error::Ledger(err) = err;
        match err {
            ledger::Error::Ledger(LedgerError::NegativeBalance { .. }) => Self::error(
                Self::BAD_REQUEST,
                "would result in negative points for payer on given day",
            ),
            ledger::Error::Ledger(LedgerError::PointsOverflow { .. }) => {
                Self::error(Self::BAD_REQUEST, "points overflow")
            }
            ledger::Error::Ledger(LedgerError::InsufficientPoints { .. }) => {
                Self::error(Self::BAD_REQUEST, "insufficient points")
            }
            err @ (ledger::Error::Ledger(LedgerError::InternalInconsistency { .. })
            | ledger::Error::Adapter(_)) => {
                error!("request failed: {err}");
                Self::internal_error()
            }
        }
    }
}

fn object(body: &Value) -> Result<&Map<String, Value>, ValidationError> {
    body.as_object().ok_or(ValidationError::NotAnObject)
}

fn field<'a>(
    body: &'a Map<String, Value>,
    name: &'static str,
) -> Result<&'a Value, ValidationError> {
    body.get(name).ok_or(ValidationError::Missing(name))
}

fn string_field(body: &Map<String, Value>, name: &'static str) -> Result<String, ValidationError> {
    field(body, name)?
        .as_str()
        .map(str::to_owned)
        .ok_or(ValidationError::NotAString(name))
}

fn points_field(body: &Map<String, Value>, name: &'static str) -> Result<Points, ValidationError> {
    field(body, name)?
        .as_i64()
        .ok_or(ValidationError::NotAWholeNumber(name))
}

fn parse_add(body: &Value) -> Result<AddPointsRequest, ValidationError> {
    let body = object(body)?;
    Ok(AddPointsRequest {
        user: string_field(body, "user")?,
        date: string_field(body, "date")?,
        payer: string_field(body, "payer")?,
        points: points_field(body, "points")?,
    })
}

fn parse_balance(body: &Value) -> Result<BalanceRequest, ValidationError> {
    let body = object(body)?;
    Ok(BalanceRequest {
        user: string_field(body, "user")?,
    })
}

fn parse_deduct(body: &Value) -> Result<DeductRequest, ValidationError> {
    let body = object(body)?;
    let user = string_field(body, "user")?;
    let points = PositivePoints::try_from(points_field(body, "points")?)
        .map_err(|_| ValidationError::NotPositive("points"))?;
    Ok(DeductRequest { user, points })
}

/// Routes JSON requests to the ledger commands
pub struct JsonAdapter<D> {
    logic: DomainLogic<D>,
}

impl<D> JsonAdapter<D>
where
    D: LedgerPort + 'static,
{
    pub fn new(logic: DomainLogic<D>) -> Self {
        Self { logic }
    }

    /// Handle a request for one of the `add`, `balance` or `deduct` routes
    pub async fn handle(&self, route: &str, body: &Value) -> Response {
        let res = match route {
            "add" => self.add(body).await,
            "balance" => self.balance(body).await,
            "deduct" => self.deduct(body).await,
            _ => return Response::error(Response::NOT_FOUND, format!("unknown route: {route}")),
        };

        res.unwrap_or_else(|response| response)
    }

    /// Handle a request envelope of the form `{"route": "...", "body": {...}}`
    pub async fn handle_envelope(&self, line: &str) -> Response {
        let envelope: Value = match serde_json::from_str(line) {
            Ok(envelope) => envelope,
            Err(err) => return ValidationError::Envelope(err.to_string()).into(),
        };
        let Some(route) = envelope.get("route").and_then(Value::as_str) else {
            return ValidationError::Envelope("missing route".to_string()).into();
        };
        let body = envelope.get("body").unwrap_or(&Value::Null);

        self.handle(route, body).await
    }

    /// Answer each newline-delimited request envelope from `input` with one line on `output`
    ///
    /// Blank lines are skipped. Lines that are not valid UTF-8 or JSON get a 400 response. Only I/O
    /// errors stop the loop. Returns the number of requests answered.
    pub async fn serve<R: BufRead, W: Write>(&self, input: R, mut output: W) -> io::Result<usize> {
        let mut served = 0;
        for line in input.split(b'\n') {
            let response = match String::from_utf8(line?) {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => self.handle_envelope(&line).await,
                Err(err) => ValidationError::Envelope(err.to_string()).into(),
            };

            serde_json::to_writer(&mut output, &response)?;
            writeln!(output)?;
            output.flush()?;
            served += 1;
        }

        Ok(served)
    }

    async fn add(&self, body: &Value) -> Result<Response, Response> {
        let req = parse_add(body)?;
        self.logic.clone().oneshot(req).await?;
        Ok(Response::ok(Value::Null))
    }

    async fn balance(&self, body: &Value) -> Result<Response, Response> {
        let req = parse_balance(body)?;
        let balance = self.logic.clone().oneshot(req).await?;
        Ok(Response::serialized(&balance))
    }

    async fn deduct(&self, body: &Value) -> Result<Response, Response> {
        let req = parse_deduct(body)?;
        let res = self.logic.clone().oneshot(req).await?;
        Ok(Response::serialized(&res.debits))
    }
}
