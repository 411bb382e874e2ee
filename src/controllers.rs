pub mod index;
pub mod repos;

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use handlebars::Handlebars;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct TemplateViewModel {
    pub title: String,
    pub body: String,
}

/// Renders `name` inside the page layout.
pub fn render_page<T: Serialize>(registry: &Handlebars<'static>, title: &str, name: &str, data: &T) -> Response {
    let page = registry.render(name, data).and_then(|body| {
        registry.render(
            "template",
            &TemplateViewModel {
                title: title.into(),
                body,
            },
        )
    });

    match page {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            log::error!("Failed to render {}: {}", name, e);
            get_error_page(registry, StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

pub fn get_error_page(registry: &Handlebars<'static>, status: StatusCode) -> Response {
    let body = registry
        .render(&format!("errors/{}", status.as_u16()), &())
        .unwrap_or_else(|_| status.to_string());
    (status, Html(body)).into_response()
}
