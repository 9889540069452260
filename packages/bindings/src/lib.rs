use napi::Result as NapiResult;
use napi_derive::napi;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

#[napi]
pub fn amortize(input_json: String) -> NapiResult<String> {
    let input: budgetbridge_core::LoanInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = budgetbridge_core::amortization::schedule::amortize(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Sensitivity
// ---------------------------------------------------------------------------

#[napi]
pub fn rate_sensitivity(input_json: String) -> NapiResult<String> {
    let input: budgetbridge_core::sensitivity::rate_sweep::SensitivityInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = budgetbridge_core::sensitivity::rate_sweep::analyze_rate_sensitivity(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Inflation
// ---------------------------------------------------------------------------

#[napi]
pub fn real_balance(input_json: String) -> NapiResult<String> {
    let input: budgetbridge_core::inflation::InflationInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        budgetbridge_core::inflation::real_balance_path(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
