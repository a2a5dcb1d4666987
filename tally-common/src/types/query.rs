// Copyright 2021 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use super::*;
use chrono::{
    DateTime,
    NaiveDate,
    TimeZone,
    Utc,
};
use thiserror::Error;

/// The only accepted layout for request dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Rejection of a request whose fields cannot be interpreted
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// The named field is not a `YYYY-MM-DD` date
    #[error("{0} is not in the valid format YYYY-MM-DD")]
    InvalidDate(&'static str),
}

/// Body of `POST /info`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    #[serde(rename = "startDate")]
    #[allow(missing_docs)]
    pub start_date: String,
    #[serde(rename = "endDate")]
    #[allow(missing_docs)]
    pub end_date: String,
    #[serde(rename = "minCount")]
    #[allow(missing_docs)]
    pub min_count: i64,
    #[serde(rename = "maxCount")]
    #[allow(missing_docs)]
    pub max_count: i64,
}

impl QueryRequest {
    /// Create a new query request
    pub fn new(start_date: impl Into<String>, end_date: impl Into<String>, min_count: i64, max_count: i64) -> Self {
        Self {
            start_date: start_date.into(),
            end_date: end_date.into(),
            min_count,
            max_count,
        }
    }

    /// Check both dates and turn the request into an executable query.
    ///
    /// `startDate` is checked first. The order of the dates and of the
    /// counts is not checked; an inverted range matches nothing.
    pub fn validate(&self) -> Result<CountQuery, ValidationError> {
        let start = parse_date("startDate", &self.start_date)?;
        let end = parse_date("endDate", &self.end_date)?;
        Ok(CountQuery {
            start,
            end,
            min_count: self.min_count,
            max_count: self.max_count,
        })
    }
}

/// Parse a `YYYY-MM-DD` date into UTC midnight of that day.
///
/// A date that parses but does not format back to the same text (e.g.
/// `2016-1-26`) is rejected, and so is any year outside `0000..=9999`.
pub fn parse_date(field: &'static str, value: &str) -> Result<DateTime<Utc>, ValidationError> {
    Some(value)
        .filter(|value| value.len() == 10)
        .and_then(|value| NaiveDate::parse_from_str(value, DATE_FORMAT).ok())
        .filter(|date| date.format(DATE_FORMAT).to_string() == value)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| Utc.from_utc_datetime(&midnight))
        .ok_or(ValidationError::InvalidDate(field))
}

/// A validated query, ready to be handed to a repository
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CountQuery {
    /// Lower creation bound (inclusive)
    pub start: DateTime<Utc>,
    /// Upper creation bound (inclusive)
    pub end: DateTime<Utc>,
    /// Lower total bound (inclusive)
    pub min_count: i64,
    /// Upper total bound (inclusive)
    pub max_count: i64,
}

impl CountQuery {
    /// Whether a creation time falls inside the window
    pub fn contains_date(&self, created_at: &DateTime<Utc>) -> bool {
        &self.start <= created_at && created_at <= &self.end
    }

    /// Whether a summed count falls inside the total bounds
    pub fn contains_total(&self, total: i64) -> bool {
        self.min_count <= total && total <= self.max_count
    }
}
