use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use crate::access::directory::ActorResolver;
use crate::access::engine;
use crate::access::errors::AccessError;
use crate::access::types::{
    Capability, CheckRequest, CheckResponse, ManageQuery, ManageResponse, MemberId,
};
use crate::access::AccessState;
use crate::site::ThemeCatalog;

/// Everything the access API serves from. Immutable once built.
#[derive(Debug)]
pub struct ApiState {
    pub access: AccessState,
    pub themes: ThemeCatalog,
    /// Site used when a check request names none
    pub default_site: String,
}

impl ApiState {
    /// Rejects sites whose configured theme is not installed or is disabled.
    pub fn new(
        access: AccessState,
        themes: ThemeCatalog,
        default_site: impl Into<String>,
    ) -> Result<Self, AccessError> {
        for site in access.sites.values() {
            themes.check_site(site)?;
        }
        Ok(Self {
            access,
            themes,
            default_site: default_site.into(),
        })
    }
}

pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/v1/check", post(handle_check))
        .route("/v1/manage", get(handle_manage))
        .route("/v1/sites/{site}", get(handle_site))
        .route("/healthz", get(health))
        .with_state(state)
}

async fn handle_check(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<CheckRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(req) = match payload {
        Ok(req) => req,
        Err(rejection) => return AccessError::InvalidRequest(rejection.body_text()).into_response(),
    };
    let capability: Capability = match req.capability.parse() {
        Ok(capability) => capability,
        Err(e) => return e.into_response(),
    };
    let site_id = req.site.as_deref().unwrap_or(&state.default_site);
    let site = state.access.current_site(site_id);
    let member = req.member.map(MemberId);

    let actor = match state.access.directory.resolve(member.as_ref()) {
        Ok(actor) => actor,
        Err(e) => return e.into_response(),
    };

    let eval = engine::explain(&site.policy, &actor, capability);
    tracing::debug!(
        site = %site_id,
        member = ?member,
        capability = %capability,
        decision = ?eval.decision,
        reason = eval.reason.as_str(),
        "Access decision"
    );

    Json(CheckResponse {
        allowed: eval.decision.is_allowed(),
        reason: eval.reason,
    })
    .into_response()
}

async fn handle_manage(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<ManageQuery>,
) -> impl IntoResponse {
    let member = query.member.map(MemberId);
    let directory = &state.access.directory;

    let actor = match directory.resolve(member.as_ref()) {
        Ok(actor) => actor,
        Err(e) => return e.into_response(),
    };
    let codes = member
        .as_ref()
        .map(|m| directory.permission_codes(m))
        .unwrap_or_default();

    let allowed = engine::can_manage_site_config(&actor, &codes);
    Json(ManageResponse { allowed }).into_response()
}

async fn handle_site(
    State(state): State<Arc<ApiState>>,
    Path(site): Path<String>,
) -> impl IntoResponse {
    let config = state.access.current_site(&site);
    Json(json!({
        "site": config,
        "available_themes": state.themes.available(),
    }))
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
