//! Trip form and plan generation pages

use axum::Form;
use axum::extract::rejection::FormRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::api::AppState;
use crate::api::flash::{set_flash, take_flash};
use crate::api::render;
use crate::api::types::ApiError;
use crate::core::constants::MSG_MISSING_DESTINATION;
use crate::domain::itinerary::{PlanRequest, SAMPLE_RESPONSE, build_plan, build_prompt};

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub debug: Option<String>,
}

impl PageQuery {
    fn debug_requested(&self) -> bool {
        self.debug.as_deref() == Some("1")
    }
}

/// GET / - the trip form, plus any pending flash message
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
    jar: CookieJar,
) -> impl IntoResponse {
    let (jar, message) = take_flash(jar, &state.config.session.secret_key);
    let messages: Vec<String> = message.into_iter().collect();
    let debug = state.config.dev && query.debug_requested();
    (jar, Html(render::index_page(&messages, debug)))
}

/// POST /plan - ask the model for an itinerary and render it
///
/// Upstream failures never fail the request: the sample itinerary is rendered
/// instead, with the error shown as a warning.
pub async fn plan(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
    jar: CookieJar,
    form: Result<Form<PlanRequest>, FormRejection>,
) -> Response {
    let request = match form {
        Ok(Form(request)) => request.trimmed(),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Rejected plan form");
            return ApiError::bad_request("INVALID_FORM", rejection.body_text()).into_page();
        }
    };

    if request.destination.is_empty() {
        let jar = set_flash(jar, &state.config.session.secret_key, MSG_MISSING_DESTINATION);
        return (jar, Redirect::to("/")).into_response();
    }

    let prompt = build_prompt(&request);
    tracing::debug!(destination = %request.destination, days = %request.days, "Requesting itinerary");

    let mut warnings = Vec::new();
    let raw = match state.client.generate(&prompt).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(
                error = %e,
                timeout = e.is_timeout(),
                destination = %request.destination,
                "Gemini request failed, rendering sample response"
            );
            warnings.push(format!("Gemini API error: {e}. Showing sample response."));
            SAMPLE_RESPONSE.to_string()
        }
    };

    let view = build_plan(&request, &raw, &state.config.layout);
    tracing::debug!(
        days = view.days_n,
        visits = view.visit_nodes.len(),
        legs = view.legs.len(),
        "Plan built"
    );

    let show_debug = state.config.dev && query.debug_requested();
    (
        StatusCode::OK,
        Html(render::result_page(&view, &warnings, show_debug)),
    )
        .into_response()
}
