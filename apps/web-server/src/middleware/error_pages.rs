//! Error pages - renders HTML for 404s outside the JSON API.

use actix_web::{
    Result,
    dev::ServiceResponse,
    http::StatusCode,
    middleware::{ErrorHandlerResponse, ErrorHandlers},
    web,
};

use crate::handlers::views;
use crate::observability::RequestId;
use crate::state::AppState;
use crate::templates::{self, TemplateName};

/// Error-handler middleware turning bare 404 responses into the not-found page.
pub fn error_pages<B: 'static>() -> ErrorHandlers<B> {
    ErrorHandlers::new().handler(StatusCode::NOT_FOUND, render_not_found)
}

fn render_not_found<B>(res: ServiceResponse<B>) -> Result<ErrorHandlerResponse<B>> {
    let request = res.request();
    if request.path().starts_with("/api") || res.response().extensions().contains::<TemplateName>() {
        return Ok(ErrorHandlerResponse::Response(res.map_into_left_body()));
    }

    let Some(state) = request.app_data::<web::Data<AppState>>().cloned() else {
        return Ok(ErrorHandlerResponse::Response(res.map_into_left_body()));
    };

    tracing::debug!(
        request_id = RequestId::of(request).map(|id| id.0).unwrap_or_default(),
        path = %request.path(),
        "Rendering not-found page"
    );

    let context = views::page_context(
        None,
        "Страница не найдена",
        serde_json::json!({ "path": request.path() }),
    );

    match state.templates.render(templates::NOT_FOUND, &context) {
        Ok(body) => {
            let (req, original) = res.into_parts();
            let page = templates::html_response(original.status(), templates::NOT_FOUND, body);
            let res = ServiceResponse::new(req, page).map_into_right_body();
            Ok(ErrorHandlerResponse::Response(res))
        }
        Err(e) => {
            tracing::error!("Failed to render not-found page: {}", e);
            Ok(ErrorHandlerResponse::Response(res.map_into_left_body()))
        }
    }
}
