//! AWS Lambda handler for the analytics engines
//!
//! Accepts a JSON body tagged by `action` and returns the engine result as JSON.
//! Supports Lambda Function URLs for direct HTTP access.
//!
//! ```json
//! { "action": "pepm", "totalClaims": 2500000, "memberMonths": 12000 }
//! { "action": "variance", "actual": 208.33, "target": 200 }
//! { "action": "whatIf", "orgId": "org-1", "scenario": { ... }, "rebateOffset": 0 }
//! { "action": "rankPeers", "reference": { ... }, "candidates": [ ... ] }
//! ```

use std::time::Instant;

use aws_lambda_events::event::lambda_function_urls::{LambdaFunctionUrlRequest, LambdaFunctionUrlResponse};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use pepm_analytics::instrument::{InMemoryMetrics, MemoryCache};
use pepm_analytics::peers::{DimensionSet, PeerOrganization, ReferenceOrganization};
use pepm_analytics::service::WhatIfRequest;
use pepm_analytics::{AnalyticsConfig, AnalyticsService, PepmInput};

type Service = AnalyticsService<InMemoryMetrics, MemoryCache>;

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
enum AnalyticsRequest {
    Pepm(PepmInput),
    Variance {
        actual: f64,
        target: f64,
    },
    WhatIf(WhatIfRequest),
    #[serde(rename_all = "camelCase")]
    RankPeers {
        reference: ReferenceOrganization,
        candidates: Vec<PeerOrganization>,
        /// Falls back to the configured default dimensions
        #[serde(default)]
        dimensions: Option<DimensionSet>,
        #[serde(default)]
        expanded: bool,
    },
}

impl AnalyticsRequest {
    fn action(&self) -> &'static str {
        match self {
            AnalyticsRequest::Pepm(_) => "pepm",
            AnalyticsRequest::Variance { .. } => "variance",
            AnalyticsRequest::WhatIf(_) => "whatIf",
            AnalyticsRequest::RankPeers { .. } => "rankPeers",
        }
    }
}

/// Envelope around every successful result
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyticsResponse<T> {
    action: &'static str,
    result: T,
    execution_time_ms: f64,
}

fn with_headers(status_code: i64, body: Option<String>) -> LambdaFunctionUrlResponse {
    let mut response = LambdaFunctionUrlResponse {
        status_code,
        headers: Default::default(),
        body,
        is_base64_encoded: false,
        cookies: Vec::new(),
    };
    for (name, value) in [
        ("content-type", "application/json"),
        ("access-control-allow-origin", "*"),
        ("access-control-allow-methods", "POST, OPTIONS"),
        ("access-control-allow-headers", "Content-Type"),
    ] {
        if let Ok(value) = value.parse() {
            response.headers.insert(name, value);
        }
    }
    response
}

fn error_response(status: i64, message: &str) -> LambdaFunctionUrlResponse {
    let body = serde_json::json!({ "error": message }).to_string();
    with_headers(status, Some(body))
}

fn json_response<T: Serialize>(action: &'static str, result: T, started: Instant) -> LambdaFunctionUrlResponse {
    let response = AnalyticsResponse {
        action,
        result,
        execution_time_ms: started.elapsed().as_secs_f64() * 1000.0,
    };
    match serde_json::to_string(&response) {
        Ok(body) => with_headers(200, Some(body)),
        Err(e) => error_response(500, &format!("Failed to serialize response: {}", e)),
    }
}

fn dispatch(service: &Service, request: AnalyticsRequest, started: Instant) -> LambdaFunctionUrlResponse {
    let action = request.action();
    match request {
        AnalyticsRequest::Pepm(input) => match service.pepm(&input) {
            Ok(result) => json_response(action, result, started),
            Err(e) => error_response(400, &e.to_string()),
        },
        AnalyticsRequest::Variance { actual, target } => {
            json_response(action, service.variance(actual, target), started)
        }
        AnalyticsRequest::WhatIf(request) => json_response(action, service.what_if(&request), started),
        AnalyticsRequest::RankPeers { reference, candidates, dimensions, expanded } => {
            let ranking = service.rank_peers(&reference, &candidates, dimensions, expanded);
            json_response(action, ranking, started)
        }
    }
}

/// Lambda handler function
async fn handler(service: &Service, event: LambdaEvent<LambdaFunctionUrlRequest>) -> Result<LambdaFunctionUrlResponse, Error> {
    let started = Instant::now();
    let request = event.payload;

    // Handle CORS preflight
    if request.request_context.http.method.as_deref() == Some("OPTIONS") {
        return Ok(with_headers(200, None));
    }

    if request.is_base64_encoded {
        return Ok(error_response(400, "Base64-encoded bodies are not supported"));
    }
    let body = request.body.as_deref().unwrap_or("{}");

    let request: AnalyticsRequest = match serde_json::from_str(body) {
        Ok(r) => r,
        Err(e) => {
            warn!("rejected request body: {}", e);
            return Ok(error_response(400, &format!("Invalid JSON: {}", e)));
        }
    };
    debug!("dispatching {}", request.action());

    let response = dispatch(service, request, started);
    info!("request finished with status {} in {:?}", response.status_code, started.elapsed());
    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();

    let config = AnalyticsConfig::default();
    let metrics = InMemoryMetrics::new(config.performance.max_samples);
    let service = AnalyticsService::with_instruments(config, metrics, MemoryCache::new());
    let service = &service;

    run(service_fn(move |event| async move { handler(service, event).await })).await
}
