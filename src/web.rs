//! HTTP server wiring for the access API.
use std::net::SocketAddr;
use std::sync::Arc;

use miette::IntoDiagnostic;
use tower_http::trace::TraceLayer;

use crate::access::web::{router, ApiState};
use crate::access::AccessState;
use crate::settings::Settings;

pub async fn serve(settings: Settings, access: AccessState) -> miette::Result<()> {
    let addr: SocketAddr = settings
        .listen_addr()
        .parse()
        .map_err(|e| miette::miette!("bad listen addr: {e}"))?;

    let state = Arc::new(ApiState::new(
        access,
        settings.themes,
        settings.policies.default_site,
    )?);
    let app = router(state).layer(TraceLayer::new_for_http());

    tracing::info!(%addr, "Access policy API listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .into_diagnostic()?;
    axum::serve(listener, app).await.into_diagnostic()?;
    Ok(())
}
