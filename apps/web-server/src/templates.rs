//! HTML rendering with handlebars.
//!
//! Templates are compiled into the binary and registered under the names
//! pages are known by (`posts/index.html`, ...). Every rendered response
//! carries a [`TemplateName`] extension naming the template it used.

use actix_web::{HttpResponse, http::StatusCode, http::header::ContentType};
use handlebars::{Handlebars, RenderError, TemplateError};
use serde::Serialize;

pub const INDEX: &str = "posts/index.html";
pub const GROUP_LIST: &str = "posts/group_list.html";
pub const PROFILE: &str = "posts/profile.html";
pub const POST_DETAIL: &str = "posts/post_detail.html";
pub const CREATE_POST: &str = "posts/create_post.html";
pub const LOGIN: &str = "users/login.html";
pub const SIGNUP: &str = "users/signup.html";
pub const LOGGED_OUT: &str = "users/logged_out.html";
pub const NOT_FOUND: &str = "core/404.html";

const PAGES: &[(&str, &str)] = &[
    (INDEX, include_str!("../templates/posts/index.html")),
    (GROUP_LIST, include_str!("../templates/posts/group_list.html")),
    (PROFILE, include_str!("../templates/posts/profile.html")),
    (POST_DETAIL, include_str!("../templates/posts/post_detail.html")),
    (CREATE_POST, include_str!("../templates/posts/create_post.html")),
    (LOGIN, include_str!("../templates/users/login.html")),
    (SIGNUP, include_str!("../templates/users/signup.html")),
    (LOGGED_OUT, include_str!("../templates/users/logged_out.html")),
    (NOT_FOUND, include_str!("../templates/core/404.html")),
];

const PARTIALS: &[(&str, &str)] = &[
    ("header", include_str!("../templates/includes/header.html")),
    ("footer", include_str!("../templates/includes/footer.html")),
    ("post_card", include_str!("../templates/includes/post_card.html")),
    ("paginator", include_str!("../templates/includes/paginator.html")),
];

/// Name of the template a response was rendered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateName(pub &'static str);

/// Compiled template registry.
pub struct Templates {
    registry: Handlebars<'static>,
}

impl Templates {
    pub fn new() -> Result<Self, TemplateError> {
        let mut registry = Handlebars::new();

        for (name, source) in PARTIALS {
            registry.register_partial(name, *source)?;
        }
        for (name, source) in PAGES {
            registry.register_template_string(name, *source)?;
        }

        tracing::debug!(templates = PAGES.len(), "Templates registered");
        Ok(Self { registry })
    }

    pub fn render<T: Serialize>(&self, name: &str, context: &T) -> Result<String, RenderError> {
        self.registry.render(name, context)
    }

    /// Render `name` into a `200 OK` HTML response.
    pub fn page<T: Serialize>(
        &self,
        name: &'static str,
        context: &T,
    ) -> Result<HttpResponse, RenderError> {
        self.page_with_status(StatusCode::OK, name, context)
    }

    pub fn page_with_status<T: Serialize>(
        &self,
        status: StatusCode,
        name: &'static str,
        context: &T,
    ) -> Result<HttpResponse, RenderError> {
        let body = self.render(name, context)?;
        Ok(html_response(status, name, body))
    }
}

/// Wrap rendered HTML, recording which template produced it.
pub fn html_response(status: StatusCode, name: &'static str, body: String) -> HttpResponse {
    let mut response = HttpResponse::build(status)
        .content_type(ContentType::html())
        .body(body);
    response.extensions_mut().insert(TemplateName(name));
    response
}

/// The template recorded on a response, if it was rendered from one.
pub fn template_used<B>(response: &HttpResponse<B>) -> Option<&'static str> {
    response.extensions().get::<TemplateName>().map(|t| t.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_all_templates_compile() {
        let templates = Templates::new().unwrap();
        for (name, _) in PAGES {
            templates.render(name, &json!({})).unwrap();
        }
    }

    #[test]
    fn test_output_is_escaped() {
        let templates = Templates::new().unwrap();
        let html = templates
            .render(NOT_FOUND, &json!({ "path": "<script>alert(1)</script>" }))
            .unwrap();
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>alert"));
    }

    #[test]
    fn test_page_records_template_name() {
        let templates = Templates::new().unwrap();
        let response = templates.page(LOGGED_OUT, &json!({})).unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(template_used(&response), Some(LOGGED_OUT));
    }
}
