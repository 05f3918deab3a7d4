use actix_web::{get, post, web, HttpRequest, HttpResponse};
use serde::Deserialize;
use x402::{
    InvalidReason, PaymentPayload, PaymentRequirements, SchemeFacilitator, SettleResponse,
    VerifyResponse, X402_VERSION,
};

use crate::metrics;
use crate::state::AppState;

/// Largest accepted `/verify` or `/settle` body.
pub const MAX_BODY_BYTES: usize = 65_536;

/// Raw-body limit for the payment endpoints, which read `web::Bytes` for HMAC.
pub fn payload_config() -> web::PayloadConfig {
    web::PayloadConfig::new(MAX_BODY_BYTES)
}

/// Body of `/verify` and `/settle`. Both halves are optional on the wire so a
/// missing one can be reported as `missing_parameters` instead of a parse error.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    #[serde(default)]
    pub payment_payload: Option<PaymentPayload>,
    #[serde(default)]
    pub payment_requirements: Option<PaymentRequirements>,
}

/// Validate the HMAC header on an incoming request.
/// Returns an error response if HMAC is configured and the signature is missing or invalid.
fn validate_hmac(
    req: &HttpRequest,
    body_bytes: &[u8],
    state: &AppState,
) -> Result<(), HttpResponse> {
    let Some(secret) = &state.hmac_secret else {
        return Ok(());
    };

    let header_value = req
        .headers()
        .get(x402::hmac::AUTH_HEADER)
        .and_then(|v| v.to_str().ok());

    match header_value {
        Some(sig) if x402::hmac::verify_hmac(secret, body_bytes, sig) => Ok(()),
        Some(_) => {
            tracing::warn!("HMAC verification failed: signature mismatch");
            metrics::HMAC_FAILURES.with_label_values(&["invalid"]).inc();
            Err(HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "authentication failed"
            })))
        }
        None => {
            tracing::warn!("HMAC header missing on authenticated endpoint");
            metrics::HMAC_FAILURES.with_label_values(&["missing"]).inc();
            Err(HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "authentication required"
            })))
        }
    }
}

#[get("/health")]
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "network": &state.chain_config.network,
        "feePayer": state.facilitator.fee_payer_address().to_string(),
    }))
}

#[get("/metrics")]
pub async fn metrics_endpoint(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    if let Some(token) = &state.metrics_token {
        let authorized = req
            .headers()
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .is_some_and(|t| x402::hmac::constant_time_eq(t.as_bytes(), token));

        if !authorized {
            return HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "unauthorized",
                "message": "Valid Bearer token required for /metrics"
            }));
        }
    }
    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(metrics::metrics_output())
}

#[get("/supported")]
pub async fn supported(state: web::Data<AppState>) -> HttpResponse {
    let network = &state.chain_config.network;
    let mut signers = serde_json::Map::new();
    signers.insert(
        network.clone(),
        serde_json::Value::String(state.facilitator.fee_payer_address().to_string()),
    );

    HttpResponse::Ok().json(serde_json::json!({
        "kinds": [{
            "x402Version": X402_VERSION,
            "scheme": &state.chain_config.scheme_name,
            "network": network,
            "extra": { "sponsored": true },
        }],
        "signers": signers,
    }))
}

#[post("/verify")]
pub async fn verify(req: HttpRequest, state: web::Data<AppState>, body: web::Bytes) -> HttpResponse {
    if let Err(resp) = validate_hmac(&req, &body, &state) {
        return resp;
    }

    let parsed: PaymentRequest = match serde_json::from_slice(&body) {
        Ok(p) => p,
        Err(e) => {
            tracing::debug!(error = %e, "unparseable verify body");
            metrics::VERIFY_REQUESTS
                .with_label_values(&["bad_request", "invalid_request_body"])
                .inc();
            return HttpResponse::BadRequest().json(serde_json::json!({
                "isValid": false,
                "invalidReason": "invalid_request_body",
                "payer": "",
            }));
        }
    };

    let (Some(payload), Some(requirements)) =
        (parsed.payment_payload, parsed.payment_requirements)
    else {
        metrics::VERIFY_REQUESTS
            .with_label_values(&["invalid", "missing_parameters"])
            .inc();
        return HttpResponse::BadRequest()
            .json(VerifyResponse::invalid(InvalidReason::MissingParameters, ""));
    };

    let result = state.facilitator.verify(&payload, &requirements).await;
    if result.is_valid {
        metrics::VERIFY_REQUESTS
            .with_label_values(&["valid", ""])
            .inc();
    } else {
        let reason = result.invalid_reason.as_deref().unwrap_or("unknown");
        metrics::VERIFY_REQUESTS
            .with_label_values(&["invalid", metrics::reason_label(reason)])
            .inc();
        tracing::info!(
            payer = %result.payer,
            reason,
            "verification rejected"
        );
    }
    HttpResponse::Ok().json(result)
}

#[post("/settle")]
pub async fn settle(req: HttpRequest, state: web::Data<AppState>, body: web::Bytes) -> HttpResponse {
    if let Err(resp) = validate_hmac(&req, &body, &state) {
        return resp;
    }

    let network = &state.chain_config.network;
    let parsed: PaymentRequest = match serde_json::from_slice(&body) {
        Ok(p) => p,
        Err(e) => {
            tracing::debug!(error = %e, "unparseable settle body");
            return HttpResponse::BadRequest().json(SettleResponse::failed(
                "invalid_request_body",
                network.as_str(),
                String::new(),
            ));
        }
    };

    let (Some(payload), Some(requirements)) =
        (parsed.payment_payload, parsed.payment_requirements)
    else {
        return HttpResponse::BadRequest().json(SettleResponse::failed(
            InvalidReason::MissingParameters.to_string(),
            network.as_str(),
            String::new(),
        ));
    };

    let sponsored = if requirements.is_sponsored() { "true" } else { "false" };
    let start = std::time::Instant::now();
    let result = state.facilitator.settle(&payload, &requirements).await;
    let elapsed = start.elapsed().as_secs_f64();

    let outcome = if result.success { "success" } else { "failed" };
    metrics::SETTLE_REQUESTS
        .with_label_values(&[outcome, sponsored])
        .inc();
    metrics::SETTLE_LATENCY
        .with_label_values(&[outcome])
        .observe(elapsed);

    if result.success {
        tracing::info!(
            payer = %result.payer,
            tx = %result.transaction,
            sponsored,
            "settlement completed"
        );
    } else {
        tracing::warn!(
            payer = %result.payer,
            reason = result.error_reason.as_deref().unwrap_or("unknown"),
            "settlement rejected"
        );
    }
    HttpResponse::Ok().json(result)
}
