use heatwatch_core::{Period, WindowError};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

#[derive(Clone, Debug, Default, Serialize, Deserialize, IntoParams)]
pub struct DateQuery {
    /// Reference date as YYYY-MM-DD, defaults to today in Philippine time
    pub date: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, IntoParams)]
pub struct SeriesQuery {
    /// Reference date as YYYY-MM-DD, defaults to today in Philippine time
    pub date: Option<String>,
    /// `week` or `month`, defaults to `week`
    pub period: Option<String>,
    /// Limit the series to one station id
    pub station: Option<i64>,
}

impl SeriesQuery {
    pub fn period(&self) -> Result<Period, WindowError> {
        match self.period.as_deref() {
            Some(raw) if !raw.trim().is_empty() => raw.parse(),
            _ => Ok(Period::Week),
        }
    }
}
