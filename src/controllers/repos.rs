use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::Redirect;

use crate::browser::Notice;
use crate::models::sort::SortKey;
use crate::AppState;

pub async fn post_sort(State(state): State<Arc<AppState>>, Path(key): Path<SortKey>) -> Redirect {
    state.browser.lock().await.set_sort(key);
    Redirect::to("/")
}

/// Deletes remotely first; the row is only dropped locally once the service confirms.
#[axum_macros::debug_handler]
pub async fn post_delete(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> Redirect {
    let result = state.user_lookup_service.delete_repo(id).await;

    let mut browser = state.browser.lock().await;
    match result {
        Ok(()) => {
            if !browser.remove_repo(id) {
                log::debug!("Repository {} was already gone from the list", id);
            }
        }
        Err(e) => {
            log::error!("Error deleting repository: {}", e);
            browser.post_notice(Notice::error(format!("Could not delete repository {id}: {e}")));
        }
    }
    Redirect::to("/")
}
