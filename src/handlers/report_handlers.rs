use std::sync::Arc;

use axum::{
    body::{ Body, Bytes },
    extract::{ rejection::{ JsonRejection, QueryRejection }, Query, State },
    http::header,
    response::{ IntoResponse, Response },
    BoxError,
    Json,
};
use futures::{ stream, StreamExt };
use tracing::{ debug, error, warn };

use crate::{
    dto::{ ReportCreation, ReportListParams },
    errors::{ ErrorMessage, HttpError },
    models::Report,
    repositories::ReportStream,
    services::Pageable,
    AppState,
};

// GET /reports
pub async fn get_reports(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ReportListParams>, QueryRejection>
) -> Result<Response, HttpError> {
    let Query(params) = params.map_err(|e| {
        warn!("Rejected report listing query: {}", e.body_text());
        HttpError::new(ErrorMessage::InvalidQueryParameters.to_string(), e.status())
    })?;

    let pageable = Pageable::resolve(
        params.page_or_unset(),
        params.size_or_unset(),
        &state.config.paginator
    );
    debug!(group = ?params.group, ?pageable, "Listing reports");

    let mut reports = state.reports.get_all(params.group.as_deref(), pageable);

    // a failure before anything was written can still become a proper error response
    let first = match reports.next().await {
        Some(Ok(report)) => Some(report),
        Some(Err(e)) => {
            error!("Failed to load reports: {}", e);
            return Err(HttpError::server_error(ErrorMessage::ReportQueryError.to_string()));
        }
        None => None,
    };

    Ok(([(header::CONTENT_TYPE, "application/json")], json_array_body(first, reports)).into_response())
}

fn encode(report: &Report, prefix: &'static [u8]) -> Result<Bytes, BoxError> {
    let mut buf = prefix.to_vec();
    serde_json::to_writer(&mut buf, report)?;
    Ok(Bytes::from(buf))
}

/// Streams `first` and the rest of `reports` as one JSON array. A store error after the
/// opening bracket aborts the body.
fn json_array_body(first: Option<Report>, reports: ReportStream) -> Body {
    let Some(first) = first else {
        return Body::from("[]");
    };

    let head = stream::once(async move { encode(&first, b"[") });
    let tail = reports.map(|item| {
        match item {
            Ok(report) => encode(&report, b","),
            Err(e) => {
                error!("Report stream failed mid-response: {}", e);
                Err(BoxError::from(e))
            }
        }
    });
    let close = stream::once(async { Ok::<Bytes, BoxError>(Bytes::from_static(b"]")) });

    Body::from_stream(head.chain(tail).chain(close))
}

// POST /reports
pub async fn create_reports(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ReportCreation>, JsonRejection>
) -> Result<Json<ReportCreation>, HttpError> {
    let Json(creation) = payload.map_err(|e| {
        warn!("Rejected report creation body: {}", e.body_text());
        HttpError::new(ErrorMessage::InvalidRequestBody.to_string(), e.status())
    })?;

    Ok(Json(state.reports.create_reports(creation).await))
}
