//! Date-range query parameters shared by listing and summary routes

use chrono::{NaiveDate, Utc};
use khata_config::TimeRange;
use khata_core::DateRange;
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};

/// `?start=YYYY-MM-DD&end=YYYY-MM-DD&range=month|quarter|year|all`
///
/// Explicit dates win over `range`; empty values count as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RangeQuery {
    pub start: Option<String>,
    pub end: Option<String>,
    pub range: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_date(field: &str, value: &str) -> ApiResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ApiError::bad_request(format!("Invalid {} date '{}', expected YYYY-MM-DD", field, value)))
}

impl RangeQuery {
    pub fn resolve(&self, default_range: TimeRange, today: NaiveDate) -> ApiResult<DateRange> {
        let start = non_empty(&self.start);
        let end = non_empty(&self.end);

        if start.is_some() || end.is_some() {
            return Ok(DateRange::new(
                start.map(|s| parse_date("start", s)).transpose()?,
                end.map(|e| parse_date("end", e)).transpose()?,
            ));
        }

        let preset = match non_empty(&self.range) {
            Some(r) => r.parse::<TimeRange>().map_err(ApiError::bad_request)?,
            None => default_range,
        };
        Ok(DateRange::for_preset(preset, today))
    }

    /// Resolve against the current date
    pub fn resolve_now(&self, default_range: TimeRange) -> ApiResult<DateRange> {
        self.resolve(default_range, Utc::now().date_naive())
    }
}
