use crate::config::MAX_LOOKBACK_HOURS;
use crate::core::error::AppError;
use crate::features::pipeline::dto::AnalysisRequestDto;

pub(super) fn coerce_lookback(requested: Option<u32>, default: u32) -> Result<u32, AppError> {
    match requested {
        None => Ok(default),
        Some(hours) if (1..=MAX_LOOKBACK_HOURS).contains(&hours) => Ok(hours),
        Some(hours) => Err(AppError::bad_request(format!(
            "lookback_hours must be between 1 and {MAX_LOOKBACK_HOURS}, got {hours}"
        ))),
    }
}

/// An empty body means "run with defaults"; anything else must be a valid
/// request object.
pub(super) fn parse_analysis_request(body: &[u8]) -> Result<AnalysisRequestDto, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(AnalysisRequestDto::default());
    }
    serde_json::from_slice(body)
        .map_err(|err| AppError::bad_request(format!("invalid analysis request: {err}")))
}

pub(super) fn report_cache_key(lookback_hours: u32) -> String {
    format!("report:lookback:{lookback_hours}")
}
