use std::net::{SocketAddr, UdpSocket};
use std::path::PathBuf;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use log::{error, info};

use crate::config::ServerConfig;
use crate::errors::{PixframeError, Result};

/// Handler state: where the scaled asset is published. The handlers are
/// otherwise stateless and safe for concurrent invocation; the filesystem
/// rename in the resampler is the only handoff.
#[derive(Clone)]
pub struct AssetState {
    pub image_path: PathBuf,
}

pub fn router(state: AssetState) -> Router {
    Router::new()
        .route("/image.jpg", get(serve_image))
        .route("/ip", get(serve_ip))
        .fallback(not_found)
        .with_state(state)
}

/// Serve the asset routes forever on the configured port.
pub async fn serve(config: &ServerConfig) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("starting server on port {}", config.server.port);
    let app = router(AssetState {
        image_path: config.paths.image_path.clone(),
    });
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .map_err(|e| PixframeError::Other(anyhow::anyhow!(e)))?;
    Ok(())
}

async fn serve_image(State(state): State<AssetState>) -> Response {
    match tokio::fs::read(&state.image_path).await {
        Ok(bytes) => {
            ([(header::CONTENT_TYPE, "image/jpeg")], bytes).into_response()
        }
        Err(e) => {
            error!("asset read failed: {e}");
            (
                StatusCode::NOT_FOUND,
                [(header::CONTENT_TYPE, "text/plain")],
                "Image not found",
            )
                .into_response()
        }
    }
}

async fn serve_ip() -> Response {
    ([(header::CONTENT_TYPE, "text/plain")], local_ip()).into_response()
}

async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "text/plain")],
        "Not found",
    )
        .into_response()
}

/// Outbound-routable local address, probed by connecting a throwaway UDP
/// socket to a well-known external address. Nothing is actually sent.
pub fn local_ip() -> String {
    fn probe() -> std::io::Result<String> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.connect("8.8.8.8:80")?;
        Ok(socket.local_addr()?.ip().to_string())
    }
    probe().unwrap_or_else(|e| {
        error!("error getting local ip: {e}");
        "127.0.0.1".to_string()
    })
}
