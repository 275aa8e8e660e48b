// crates/csvtidy/src/routes.rs

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, State},
    routing::{get, post},
    Json, Router,
};
use csvtidy_core::preview::{cleaned_file_name, ensure_csv_file_name, Preview};
use csvtidy_core::{CleaningPipeline, CleaningReport};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::AppError;
use crate::state::AppState;

pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/clean", post(clean_upload))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanResponse {
    pub file_name: String,
    pub report: CleaningReport,
    pub preview: Preview,
    pub csv: String,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn malformed(err: impl std::fmt::Display) -> AppError {
    AppError::bad_request("BAD_MULTIPART", err.to_string())
}

/// POST /api/clean
///
/// Multipart fields: `file` (required, must carry a `.csv` file name),
/// `options` (CleaningOptions JSON) and `parse` (ParseOptions JSON). Missing
/// option parts fall back to the server defaults.
async fn clean_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<CleanResponse>, AppError> {
    let mut request = state.defaults().clone();
    let mut upload: Option<(String, Bytes)> = None;

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().map(str::to_string).ok_or_else(|| {
                    AppError::bad_request("MISSING_FILE_NAME", "the 'file' part has no file name")
                })?;
                ensure_csv_file_name(&file_name)?;
                let bytes = field.bytes().await.map_err(malformed)?;
                upload = Some((file_name, bytes));
            }
            Some("options") => {
                let text = field.text().await.map_err(malformed)?;
                request.options = serde_json::from_str(&text)
                    .map_err(|err| AppError::bad_request("BAD_OPTIONS", err.to_string()))?;
            }
            Some("parse") => {
                let text = field.text().await.map_err(malformed)?;
                request.parse = serde_json::from_str(&text)
                    .map_err(|err| AppError::bad_request("BAD_OPTIONS", err.to_string()))?;
            }
            other => debug!(field = ?other, "ignoring multipart field"),
        }
    }

    let (file_name, bytes) = upload
        .ok_or_else(|| AppError::bad_request("MISSING_FILE", "no 'file' part in the upload"))?;

    // Dropping the handler future (client went away) cancels the run.
    let token = CancellationToken::new();
    let guard = token.clone().drop_guard();
    let pipeline = CleaningPipeline::new(request).with_cancellation(token);

    let outcome = tokio::task::spawn_blocking(move || pipeline.run(&bytes))
        .await
        .map_err(|err| AppError::Internal(format!("cleaning worker failed: {err}")))?;
    guard.disarm();

    let output = outcome.into_result()?;
    info!(
        file = %file_name,
        total_rows = output.report.total_rows,
        final_rows = output.report.final_rows,
        "upload cleaned"
    );

    Ok(Json(CleanResponse {
        file_name: cleaned_file_name(&file_name),
        preview: Preview::of(&output.table),
        csv: String::from_utf8_lossy(&output.csv).into_owned(),
        report: output.report,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use csvtidy_core::{CleanRequest, CleaningOptions};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    const BOUNDARY: &str = "csvtidy-test-boundary";

    struct Part<'a> {
        name: &'a str,
        file_name: Option<&'a str>,
        content: &'a str,
    }

    fn file(file_name: &'static str, content: &'static str) -> Part<'static> {
        Part {
            name: "file",
            file_name: Some(file_name),
            content,
        }
    }

    fn field(name: &'static str, content: &'static str) -> Part<'static> {
        Part {
            name,
            file_name: None,
            content,
        }
    }

    fn upload(parts: &[Part<'_>]) -> Request<Body> {
        let mut body = String::new();
        for part in parts {
            body.push_str(&format!("--{BOUNDARY}\r\n"));
            match part.file_name {
                Some(file_name) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{file_name}\"\r\n\
                     Content-Type: text/csv\r\n\r\n",
                    part.name
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                    part.name
                )),
            }
            body.push_str(part.content);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        Request::builder()
            .method("POST")
            .uri("/api/clean")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("valid request")
    }

    async fn send_with(state: AppState, request: Request<Body>) -> (StatusCode, Value) {
        let response = router(state)
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("readable body")
            .to_bytes();
        let body = serde_json::from_slice(&bytes).expect("JSON body");
        (status, body)
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        send_with(AppState::default(), request).await
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let request = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .expect("valid request");
        let (status, body) = send(request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn cleans_an_uploaded_file() {
        let (status, body) = send(upload(&[
            file("people.csv", "name,age\n Ana ,30\nAna,30\nBo,\n"),
            field(
                "options",
                r#"{"nullSentinel":"N/A","columnFormats":[{"column":"age","format":"integer"}]}"#,
            ),
        ]))
        .await;

        assert_eq!(status, StatusCode::OK, "body: {body}");
        assert_eq!(body["fileName"], "people_clean.csv");
        assert_eq!(body["csv"], "name,age\nAna,30\nBo,N/A\n");
        assert_eq!(body["report"]["totalRows"], 3);
        assert_eq!(body["report"]["duplicatesRemoved"], 1);
        assert_eq!(body["report"]["nullsHandled"], 1);
        assert_eq!(body["report"]["fieldsStandardized"], 1);
        assert_eq!(body["report"]["formatErrorsFound"], 0);
        assert_eq!(body["report"]["formatIssues"].as_array().map(Vec::len), Some(0));
        assert_eq!(body["report"]["finalRows"], 2);
        assert_eq!(body["preview"]["rows"][1][1], "N/A");
        assert_eq!(body["preview"]["hasMore"], false);
    }

    #[tokio::test]
    async fn server_defaults_apply_without_options_part() {
        let state = AppState::new(CleanRequest::new(CleaningOptions::none()));
        let (status, body) =
            send_with(state, upload(&[file("raw.csv", "a\n x \n x \n")])).await;

        assert_eq!(status, StatusCode::OK, "body: {body}");
        assert_eq!(body["report"]["finalRows"], 2);
        assert_eq!(body["csv"], "a\n x \n x \n");
    }

    #[tokio::test]
    async fn rejects_non_csv_file_names() {
        let (status, body) = send(upload(&[file("notes.txt", "a,b\n1,2\n")])).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "NOT_CSV");
    }

    #[tokio::test]
    async fn rejects_malformed_options() {
        let (status, body) = send(upload(&[
            file("data.csv", "a,b\n1,2\n"),
            field("options", r#"{"nullPolicy":"sometimes"}"#),
        ]))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BAD_OPTIONS");
    }

    #[tokio::test]
    async fn rejects_misspelled_option_keys() {
        let (status, body) = send(upload(&[
            file("data.csv", "a\nx\nx\n"),
            field("options", r#"{"removeDuplicate":false}"#),
        ]))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BAD_OPTIONS");
    }

    #[tokio::test]
    async fn parse_failures_are_client_errors() {
        let (status, body) = send(upload(&[file("empty.csv", "")])).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "PARSE_ERROR");
        assert_eq!(body["details"], "empty_input");
    }

    #[tokio::test]
    async fn requires_a_file_part() {
        let (status, body) = send(upload(&[field("options", "{}")])).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "MISSING_FILE");
    }
}
