//! AWS Lambda handler for projection requests
//!
//! Accepts a parameter set as JSON and returns both projections. Each
//! request is an isolated computation with no shared state.
//!
//! Supports Lambda Function URLs for direct HTTP access.

use lambda_http::{run, service_fn, Body, Error, Request, Response};
use serde::{Deserialize, Serialize};

use rebate_projection::exchange::DEFAULT_FALLBACK_RATE;
use rebate_projection::{
    quote_for, CalculationParams, CombinedProjection, FormInput, HttpRateProvider, RateProvider,
    RateQuote, ScenarioRunner,
};

/// Input for a projection
#[derive(Debug, Deserialize)]
pub struct ProjectionRequest {
    /// Decimal parameters at the top level; ignored when `form` is present
    #[serde(flatten)]
    pub params: CalculationParams,

    /// Raw form text (tr-TR formatting, percentages)
    #[serde(default)]
    pub form: Option<FormInput>,

    /// Rate to use when the live quote fails (default: 41.98)
    #[serde(default = "default_fallback_rate")]
    pub fallback_rate: f64,
}

fn default_fallback_rate() -> f64 { DEFAULT_FALLBACK_RATE }

/// Output from the projection
#[derive(Debug, Serialize)]
pub struct ProjectionResponse {
    pub params: CalculationParams,
    pub rate: RateQuote,
    pub projection: CombinedProjection,
    pub execution_time_us: u64,
}

/// Decode a request body and project it.
///
/// Errors carry the HTTP status: 400 for a body that is not a request,
/// 422 when required inputs are missing.
fn resolve<P: RateProvider + ?Sized>(
    body: &str,
    provider: &P,
    runner: &ScenarioRunner,
) -> Result<ProjectionResponse, (u16, String)> {
    let start = std::time::Instant::now();

    let request: ProjectionRequest = serde_json::from_str(body)
        .map_err(|e| (400, format!("Invalid JSON: {}", e)))?;

    let mut params = match &request.form {
        Some(form) => form.to_params(),
        None => request.params,
    };
    log::debug!("Projection request: {:?}", params);

    let rate = quote_for(params.usd_try, provider, request.fallback_rate);
    params.usd_try = rate.rate;

    let projection = runner
        .project(&params)
        .map_err(|e| (422, e.to_string()))?;

    Ok(ProjectionResponse {
        params,
        rate,
        projection,
        execution_time_us: start.elapsed().as_micros() as u64,
    })
}

fn error_response(status: u16, message: &str) -> Result<Response<Body>, Error> {
    let body = serde_json::json!({ "error": message });
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(Body::Text(body.to_string()))?)
}

fn json_response(body: &ProjectionResponse) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(200)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "POST, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type")
        .body(Body::Text(serde_json::to_string(body)?))?)
}

/// Lambda handler function
async fn handler(event: Request) -> Result<Response<Body>, Error> {
    // Handle CORS preflight
    if event.method().as_str() == "OPTIONS" {
        return Ok(Response::builder()
            .status(200)
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", "POST, OPTIONS")
            .header("Access-Control-Allow-Headers", "Content-Type")
            .body(Body::Empty)?);
    }

    let body_str = match event.body() {
        Body::Text(s) => s.clone(),
        Body::Binary(b) => String::from_utf8_lossy(b).to_string(),
        Body::Empty => "{}".to_string(),
    };

    // The live quote uses a blocking client
    let outcome = tokio::task::spawn_blocking(move || {
        resolve(&body_str, &HttpRateProvider::default(), &ScenarioRunner::new())
    })
    .await?;

    match outcome {
        Ok(response) => json_response(&response),
        Err((status, message)) => error_response(status, &message),
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}
