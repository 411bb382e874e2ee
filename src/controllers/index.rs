use std::sync::Arc;

use axum::extract::{Form, State};
use axum::response::{Redirect, Response};
use serde::Deserialize;

use crate::browser::Notice;
use crate::mappers::browser_mapper;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LookupForm {
    #[serde(default)]
    username: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    term: String,
}

pub async fn get_index(State(state): State<Arc<AppState>>) -> Response {
    let data = {
        let mut browser = state.browser.lock().await;
        let notice = browser.take_notice();
        browser_mapper::to_view_model(&browser, notice)
    };
    super::render_page(&state.registry, "Profile browser", "index", &data)
}

#[axum_macros::debug_handler]
pub async fn post_lookup(State(state): State<Arc<AppState>>, Form(form): Form<LookupForm>) -> Redirect {
    let ticket = {
        let mut browser = state.browser.lock().await;
        browser.set_username(&form.username);
        browser.issue_ticket()
    };

    let result = state.user_lookup_service.lookup(&form.username).await;

    let mut browser = state.browser.lock().await;
    match result {
        Ok(outcome) => {
            browser.apply_lookup(ticket, outcome);
        }
        Err(e) => {
            log::error!("Error looking up user {:?}: {}", form.username, e);
            browser.post_notice(Notice::error(format!("Lookup failed: {e}")));
        }
    }
    Redirect::to("/")
}

pub async fn post_search(State(state): State<Arc<AppState>>, Form(form): Form<SearchForm>) -> Redirect {
    state.browser.lock().await.set_search_term(&form.term);
    Redirect::to("/")
}
