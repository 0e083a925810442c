use axum::{Extension, Router, routing::get};
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::sync::Mutex;

use crate::{Error, Res, api, types::AuthState};

/// Serves `/callback` and `/health` on `addr` until the task is aborted.
pub async fn start_api_server(addr: &str, state: Arc<Mutex<Option<AuthState>>>) -> Res<()> {
    let app = Router::new()
        .route("/health", get(api::health))
        .route("/callback", get(api::callback))
        .layer(Extension(state));

    let addr = SocketAddr::from_str(addr)
        .map_err(|e| Error::Config(format!("failed to parse server address {addr}: {e}")))?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
