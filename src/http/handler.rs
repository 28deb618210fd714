//! Endpoint handlers.
//!
//! `POST /api/request` runs behind the rate limit middleware; by the time
//! `submit` executes the client has already been admitted and counted.

use axum::{
    extract::{FromRequest, Request, State},
    http::{header::CONTENT_TYPE, HeaderMap},
    Extension, Form, Json,
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::error::RelayError;
use crate::http::request::{request_id, ClientIdentity};
use crate::http::response::Success;
use crate::http::server::AppState;
use crate::notify::NotificationMessage;
use crate::observability::metrics;
use crate::validation::{SubmissionRequest, ValidationError};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Untyped submission fields decoded from a JSON or form body.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionBody(pub Map<String, Value>);

impl<S> FromRequest<S> for SubmissionBody
where
    S: Send + Sync,
{
    type Rejection = RelayError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.to_ascii_lowercase().starts_with(FORM_CONTENT_TYPE));

        if is_form {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|e| ValidationError::malformed_body(e.body_text()))?;
            let map = fields
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect();
            return Ok(Self(map));
        }

        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|e| ValidationError::malformed_body(e.body_text()))?;

        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(ValidationError::malformed_body("expected a JSON object").into()),
        }
    }
}

/// Validate a submission and relay it to the recipient.
pub async fn submit(
    State(state): State<AppState>,
    Extension(ClientIdentity(client)): Extension<ClientIdentity>,
    headers: HeaderMap,
    body: Result<SubmissionBody, RelayError>,
) -> Result<Json<Success>, RelayError> {
    let request_id = request_id(&headers);

    let submission = body.and_then(|SubmissionBody(fields)| {
        SubmissionRequest::parse(&fields).map_err(RelayError::from)
    });

    let submission = match submission {
        Ok(submission) => submission,
        Err(err) => {
            tracing::info!(
                request_id = %request_id,
                client = %client,
                error = %err,
                "Submission rejected"
            );
            metrics::record_validation_failure();
            return Err(err);
        }
    };

    let message = NotificationMessage::from(&submission);
    if let Err(err) = state.notifier.send(&message).await {
        tracing::error!(
            request_id = %request_id,
            client = %client,
            error = %err,
            "Notification delivery failed"
        );
        metrics::record_notification("failed");
        return Err(err.into());
    }

    metrics::record_notification("sent");
    tracing::info!(request_id = %request_id, client = %client, "Submission relayed");
    Ok(Json(Success::new()))
}

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
