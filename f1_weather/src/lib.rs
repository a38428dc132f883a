//! Core form-handling logic for the F1 weather analysis frontend.

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod client;
pub mod controller;

pub use client::HttpAnalysisClient;
pub use controller::{AnalysisClient, AnalysisView, ErrorBanner, FormController, SubmitOutcome};

/// Earliest season the analysis service has data for.
pub const MIN_YEAR: i32 = 1950;
/// FIA three-letter driver abbreviation length.
pub const DRIVER_CODE_LEN: usize = 3;
/// Fallback message for failure responses that carry no `error` field.
pub const GENERIC_FAILURE: &str = "Analysis failed";
/// Display text for a correlation the service could not compute.
pub const CORR_UNAVAILABLE: &str = "N/A";

/// Every variant's `Display` text is shown to the user verbatim.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Rejected locally, before any network traffic.
    #[error("{0}")]
    InvalidInput(String),
    /// Failure constructing or parsing the HTTP exchange.
    #[error("{0}")]
    Transport(String),
    /// Failure reported by the analysis service itself.
    #[error("{0}")]
    Api(String),
}

/// Raw field values as read from the form, prior to any normalization.
#[derive(Clone, Debug, Default)]
pub struct FormFields {
    pub year: String,
    pub gp: String,
    pub driver: String,
    pub session_type: String,
}

/// Payload for `POST /analyze`. Built fresh per submission and discarded
/// once the call resolves.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub year: i32,
    pub gp: String,
    pub driver: String,
    pub session_type: String,
}

impl AnalysisRequest {
    /// Build and validate a request from raw form fields, failing fast on
    /// the first violation. `current_year` is the upper bound of the
    /// accepted year range.
    pub fn from_fields(fields: &FormFields, current_year: i32) -> Result<Self, AnalysisError> {
        let year = fields.year.trim().parse::<i32>().unwrap_or(0);
        if year == 0 || year < MIN_YEAR || year > current_year {
            return Err(AnalysisError::InvalidInput(format!(
                "Invalid year ({MIN_YEAR}-current)"
            )));
        }

        let gp = fields.gp.trim().to_string();
        if gp.is_empty() {
            return Err(AnalysisError::InvalidInput("Grand Prix required".into()));
        }

        let driver = fields.driver.trim().to_uppercase();
        if driver.chars().count() != DRIVER_CODE_LEN {
            return Err(AnalysisError::InvalidInput(
                "3-letter driver code required".into(),
            ));
        }

        Ok(Self {
            year,
            gp,
            driver,
            session_type: fields.session_type.clone(),
        })
    }
}

/// Success body of `POST /analyze`. `plot` is base64-encoded PNG bytes; a
/// correlation the service could not compute arrives as `null` or is absent.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub plot: String,
    #[serde(default)]
    pub temp_corr: Option<f64>,
    #[serde(default)]
    pub rain_corr: Option<f64>,
}

/// Response fields formatted for direct display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedAnalysis {
    pub plot_src: String,
    pub temp_corr: String,
    pub rain_corr: String,
}

impl From<&AnalysisResponse> for RenderedAnalysis {
    fn from(response: &AnalysisResponse) -> Self {
        Self {
            plot_src: format!("data:image/png;base64,{}", response.plot),
            temp_corr: fmt_corr(response.temp_corr),
            rain_corr: fmt_corr(response.rain_corr),
        }
    }
}

fn fmt_corr(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => CORR_UNAVAILABLE.to_string(),
    }
}

/// Live driver-field transform: ASCII letters only, upper-cased, truncated
/// to the three-letter code length. Runs on every keystroke; not a
/// validation gate.
pub fn sanitize_driver(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase())
        .take(DRIVER_CODE_LEN)
        .collect()
}

/// Live year-field transform: digits only, truncated to four characters.
pub fn sanitize_year(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).take(4).collect()
}

/// Current calendar year, the upper bound for [`AnalysisRequest::from_fields`].
pub fn current_year() -> i32 {
    Utc::now().year()
}
