//! Reward points ledger
//!
//! Users collect points from payers on given dates. Points can be spent, in which case the oldest
//! points are used first and no (date, payer) cell may go negative.

pub mod adapters;
pub mod commands;
pub mod config;
pub mod domain;
pub mod ports;
