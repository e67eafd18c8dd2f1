//! HTTP server for the creepmerge API.
//!
//! Provides REST endpoints for spreadsheet upload and consolidation. The
//! processing endpoint answers with the consolidated workbook itself, ready
//! to save as `processed_data.xlsx`.
//!
//! # API Endpoints
//!
//! | Method | Path           | Description                              |
//! |--------|----------------|------------------------------------------|
//! | GET    | `/health`      | Health check                             |
//! | POST   | `/api/process` | Upload a spreadsheet, download workbook  |
//! | POST   | `/api/inspect` | Upload a spreadsheet, get a JSON summary |
//! | GET    | `/api/logs`    | SSE stream for real-time logs            |
//! | GET    | `/`            | Upload page (served from `static/`)      |

use axum::{
    extract::{DefaultBodyLimit, Multipart},
    http::{header, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Response, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use super::logs::{log_error, LOG_BROADCASTER};
use super::types::{error_response, InspectResponse};
use crate::error::{PipelineError, ServerError, ServerResult};
use crate::export::DOWNLOAD_FILENAME;
use crate::transform::pipeline::{inspect_bytes, process_bytes};

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Upload size cap in MiB when `CREEPMERGE_MAX_UPLOAD_MB` is unset.
const DEFAULT_MAX_UPLOAD_MB: usize = 32;

/// Start the HTTP server
pub async fn start_server(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE, header::CONTENT_DISPOSITION]);

    let app = Router::new()
        .route("/health", get(health))
        .route("/api/process", post(process_upload))
        .route("/api/inspect", post(inspect_upload))
        .route("/api/logs", get(sse_logs))
        .fallback_service(ServeDir::new("static"))
        .layer(DefaultBodyLimit::max(max_upload_bytes()))
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("🚀 creepmerge server running on http://localhost:{}", port);
    println!("   POST /api/process - Upload spreadsheet, download processed_data.xlsx");
    println!("   POST /api/inspect - Upload spreadsheet, get JSON summary");
    println!("   GET  /api/logs    - SSE log stream");
    println!("   GET  /health      - Health check");
    println!("   GET  /            - Upload page");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn max_upload_bytes() -> usize {
    std::env::var("CREEPMERGE_MAX_UPLOAD_MB")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(DEFAULT_MAX_UPLOAD_MB)
        * 1024
        * 1024
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "creepmerge",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "process": "POST /api/process",
            "inspect": "POST /api/inspect",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Upload endpoint: consolidate and answer with the workbook.
async fn process_upload(mut multipart: Multipart) -> ServerResult<Response> {
    let (bytes, file_name) = read_upload(&mut multipart).await?;

    println!("\n{}", "=".repeat(70));
    println!(
        "📄 NEW UPLOAD: {} ({} bytes)",
        file_name.as_deref().unwrap_or("unknown"),
        bytes.len()
    );
    println!("{}\n", "=".repeat(70));

    let output = process_bytes(&bytes)?;

    println!("\n{}", "=".repeat(70));
    println!("📊 SUMMARY");
    println!("{}", "=".repeat(70));
    println!("   Input rows:       {}", output.summary.input_rows);
    println!("   Test conditions:  {}", output.summary.group_count);
    println!("   Workbook size:    {} bytes", output.workbook.len());
    println!("{}\n", "=".repeat(70));

    let headers = [
        (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", DOWNLOAD_FILENAME),
        ),
    ];
    Ok((headers, output.workbook).into_response())
}

/// Upload endpoint: consolidate without producing a download.
async fn inspect_upload(mut multipart: Multipart) -> ServerResult<Json<InspectResponse>> {
    let (bytes, _file_name) = read_upload(&mut multipart).await?;
    let summary = inspect_bytes(&bytes)?;
    Ok(Json(InspectResponse::from(summary)))
}

/// Pull the `file` field out of a multipart upload.
async fn read_upload(multipart: &mut Multipart) -> ServerResult<(Vec<u8>, Option<String>)> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Multipart error: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        if name == "file" {
            file_name = field.file_name().map(|s| s.to_string());
            file_data = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?
                    .to_vec(),
            );
        }
    }

    let bytes =
        file_data.ok_or_else(|| ServerError::BadRequest("No file provided".to_string()))?;
    Ok((bytes, file_name))
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            // A missing-column report is user-correctable input.
            ServerError::Pipeline(PipelineError::Consolidate(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ServerError::Pipeline(PipelineError::Load(_)) => StatusCode::BAD_REQUEST,
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Pipeline(_) | ServerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        log_error("server", self.to_string());
        (status, Json(error_response(&self.to_string()))).into_response()
    }
}
