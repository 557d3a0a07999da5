//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use loopcast_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Loopcast API",
        version = "0.1.0",
        description = "Large media upload ingestion and looped live relay to an RTMP endpoint"
    ),
    paths(
        handlers::health::ping,
        handlers::upload::upload,
        handlers::files::list_files,
        handlers::stream::start_stream,
        handlers::stream::stop_stream,
        handlers::stream::stream_status,
    ),
    components(schemas(
        models::PingResponse,
        models::UploadResponse,
        models::FileListResponse,
        models::StartStreamRequest,
        models::StopStreamResponse,
        error::ErrorResponse,
        loopcast_relay::RelayStatus,
        loopcast_relay::RelayState,
    )),
    tags(
        (name = "health", description = "Liveness"),
        (name = "files", description = "Upload ingestion and stored file listing"),
        (name = "stream", description = "Relay session control")
    )
)]
pub struct ApiDoc;
