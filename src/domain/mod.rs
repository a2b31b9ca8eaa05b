use serde::Serialize;
use std::collections::BTreeMap;

/// Identifier of the person collecting points
pub type User = String;
/// Calendar day on which points were earned
///
/// Dates are opaque and compared as plain strings, so ISO-8601 `YYYY-MM-DD` values sort
/// chronologically.
pub type Date = String;
/// Identifier of the company granting points
pub type Payer = String;
/// Number of points
pub type Points = i64;

/// Per-payer point totals for a user, ordered by payer identifier
pub type Balance = BTreeMap<Payer, Points>;

/// A number of points strictly greater than zero
///
/// This is the amount taken by [`UserLedger::deduct`]; a zero or negative deduction cannot be
/// represented.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct PositivePoints(Points);

impl PositivePoints {
    pub fn get(self) -> Points {
        self.0
    }
}

impl TryFrom<Points> for PositivePoints {
    type Error = NonPositivePoints;

    fn try_from(points: Points) -> Result<Self, Self::Error> {
        if points > 0 {
            Ok(Self(points))
        } else {
            Err(NonPositivePoints(points))
        }
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("points must be positive, got {0}")]
pub struct NonPositivePoints(pub Points);

/// Points removed from a single (date, payer) cell by a deduction
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Debit {
    pub date: Date,
    pub payer: Payer,
    /// Always negative
    pub points: Points,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// Adding points would make a single (date, payer) cell negative
    #[error("would result in negative points for payer on given day: {delta} to {current}")]
    NegativeBalance { current: Points, delta: Points },

    /// Adding points would not fit in a cell
    #[error("points overflow: {delta} to {current}")]
    PointsOverflow { current: Points, delta: Points },

    /// The user does not hold enough points in total for a deduction
    #[error("insufficient points: requested {requested}, available {available}")]
    InsufficientPoints { available: i128, requested: Points },

    /// The deduction walk could not find points that the total said were there
    ///
    /// This can only happen if the non-negative invariant was broken somewhere.
    #[error("internal inconsistency: {remaining} points left to deduct")]
    InternalInconsistency { remaining: Points },
}

/// Points earned on a single date, per payer
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DateEntry {
    payers: BTreeMap<Payer, Points>,
}

#[cfg(test)]
impl DateEntry {
    fn points(&self, payer: &str) -> Option<Points> {
        self.payers.get(payer).copied()
    }

    fn payers(&self) -> impl Iterator<Item = (&Payer, Points)> {
        self.payers.iter().map(|(payer, points)| (payer, *points))
    }
}

/// All points of a single user, per date then per payer
///
/// Containers are created the first time a date or payer is touched and are never removed, so a
/// cell can legitimately hold zero points.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserLedger {
    dates: BTreeMap<Date, DateEntry>,
}

#[cfg(test)]
impl UserLedger {
    fn dates(&self) -> impl Iterator<Item = (&Date, &DateEntry)> {
        self.dates.iter()
    }

    /// Points held in a single (date, payer) cell
    fn points(&self, date: &str, payer: &str) -> Option<Points> {
        self.dates.get(date).and_then(|entry| entry.points(payer))
    }
}

impl UserLedger {
    /// Apply `delta` to the (date, payer) cell and return its new value
    ///
    /// The date and payer entries are created even when the change is rejected.
    pub fn add_points(
        &mut self,
        date: &str,
        payer: &str,
        delta: Points,
    ) -> Result<Points, LedgerError> {
        let cell = self
            .dates
            .entry(date.to_owned())
            .or_default()
            .payers
            .entry(payer.to_owned())
            .or_default();

        let current = *cell;
        let new_points = current
            .checked_add(delta)
            .ok_or(LedgerError::PointsOverflow { current, delta })?;
        if new_points < 0 {
            return Err(LedgerError::NegativeBalance { current, delta });
        }

        *cell = new_points;
        Ok(new_points)
    }

    /// Sum of each payer's points across all dates
    ///
    /// Payers that net to zero are kept. Totals saturate instead of wrapping.
    pub fn balance(&self) -> Balance {
        let mut balance = Balance::new();
        for entry in self.dates.values() {
            for (payer, points) in &entry.payers {
                let total = balance.entry(payer.clone()).or_insert(0);
                *total = total.saturating_add(*points);
            }
        }
        balance
    }

    /// Sum of all points held by the user
    pub fn total(&self) -> i128 {
        self.dates
            .values()
            .flat_map(|entry| entry.payers.values())
            .map(|points| i128::from(*points))
            .sum()
    }

    /// Remove `amount` points, oldest date first, and return the cells that were debited
    ///
    /// Within a date, payers are debited in identifier order. Nothing is modified if the
    /// deduction fails.
    pub fn deduct(&mut self, amount: PositivePoints) -> Result<Vec<Debit>, LedgerError> {
        let debits = self.plan_deduction(amount)?;

        for debit in &debits {
            *self
                .dates
                .entry(debit.date.clone())
                .or_default()
                .payers
                .entry(debit.payer.clone())
                .or_default() += debit.points;
        }

        Ok(debits)
    }

    /// Compute the debits for a deduction without applying them
    fn plan_deduction(&self, amount: PositivePoints) -> Result<Vec<Debit>, LedgerError> {
        let requested = amount.get();
        let available = self.total();
        if available < i128::from(requested) {
            return Err(LedgerError::InsufficientPoints {
                available,
                requested,
            });
        }

        let mut remaining = requested;
        let mut debits = Vec::new();
        for (date, entry) in &self.dates {
            for (payer, &points) in &entry.payers {
                if points <= 0 {
                    continue;
                }

                let debit = remaining.min(points);
                debits.push(Debit {
                    date: date.clone(),
                    payer: payer.clone(),
                    points: -debit,
                });
                remaining -= debit;

                if remaining == 0 {
                    return Ok(debits);
                }
            }
        }

        Err(LedgerError::InternalInconsistency { remaining })
    }
}
