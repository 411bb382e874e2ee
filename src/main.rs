use std::{sync::Arc, net::{SocketAddr, IpAddr, Ipv4Addr}, str::FromStr, time::Duration};
use anyhow::Context;
use clap::Parser;
use axum::{routing::{get, post}, Router};
use handlebars::Handlebars;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod browser;
pub mod controllers;
pub mod error;
pub mod mappers;
pub mod models;
pub mod services;

use browser::{ProfileBrowser, SharedBrowser};
use controllers::{index, repos};
use services::live_update_listener::LiveUpdateListener;
use services::user_lookup_service::UserLookupService;


// Command line interface
#[derive(Parser, Debug)]
#[clap(name="repo-browser", about="Browse a GitHub user's repositories with live updates")]
struct Opt {
    #[clap(short = 'l', long = "log", env = "LOG_LEVEL", default_value = "debug")]
    log_level: String,

    #[clap(short = 'a', long = "addr", env = "ADDR", default_value = "::1")]
    addr: String,

    #[clap(short = 'p', long = "port", env = "PORT", default_value = "8080")]
    port: u16,

    #[clap(long = "static_dir", default_value = "static")]
    static_dir: String,

    /// Base url of the user lookup service
    #[clap(long = "service-url", env = "SERVICE_URL", default_value = "http://localhost:3002")]
    service_url: String,

    #[clap(long = "no-live-updates")]
    no_live_updates: bool,

    #[clap(long = "request-timeout-secs", default_value = "10")]
    request_timeout_secs: u64,
}

pub struct AppState {
    registry: Handlebars<'static>,
    browser: SharedBrowser,
    user_lookup_service: UserLookupService,
}

fn register_templates() -> Result<Handlebars<'static>, handlebars::TemplateError> {
    let mut handlebars = Handlebars::new();
    handlebars.set_strict_mode(true);
    handlebars.register_template_string("template", include_str!("templates/template.hbs"))?;
    handlebars.register_template_string("index", include_str!("templates/index.hbs"))?;
    handlebars.register_template_string("errors/500", include_str!("templates/errors/500.hbs"))?;
    Ok(handlebars)
}

fn router(state: Arc<AppState>, static_dir: &str) -> Router {
    Router::new()
        .route("/", get(index::get_index))
        .route("/lookup", post(index::post_lookup))
        .route("/search", post(index::post_search))
        .route("/sort/:key", post(repos::post_sort))
        .route("/repos/:id/delete", post(repos::post_delete))
        .fallback_service(ServeDir::new(static_dir))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Fetch console arguments
    let opt = Opt::parse();
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", format!("{},hyper=info,mio=info,tungstenite=info", opt.log_level));
    }
    // Enable console logging
    tracing_subscriber::fmt::init();

    let registry = register_templates().context("Failed to register templates")?;
    let request_timeout = Duration::from_secs(opt.request_timeout_secs);
    let user_lookup_service = UserLookupService::new(&opt.service_url, request_timeout)
        .context("Failed to create HTTP client")?;

    let browser = ProfileBrowser::shared();

    // Single push subscription for the lifetime of the view
    let live_updates = if opt.no_live_updates {
        None
    } else {
        match LiveUpdateListener::mount(&opt.service_url, browser.clone(), request_timeout).await {
            Ok(listener) => Some(listener),
            Err(e) => {
                log::warn!("Live updates unavailable: {}", e);
                None
            }
        }
    };

    let app_state = Arc::new(AppState {
        registry,
        browser,
        user_lookup_service,
    });
    let app = router(app_state, &opt.static_dir);

    let sock_addr = SocketAddr::from((
        IpAddr::from_str(opt.addr.as_str()).unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST)),
        opt.port
    ));
    log::info!("Now listening on http://{}", sock_addr);

    axum::Server::bind(&sock_addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("Server error")?;

    if let Some(listener) = live_updates {
        if !listener.is_active() {
            log::warn!("Push channel had already closed before shutdown");
        }
        listener.unmount().await;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::models::lookup::LookupOutcome;
    use crate::models::profile::Profile;
    use crate::models::repository::Repository;
    use crate::models::sort::{SortKey, SortOrder};

    fn app(server: &MockServer) -> (Router, SharedBrowser) {
        let browser = ProfileBrowser::shared();
        let state = Arc::new(AppState {
            registry: register_templates().unwrap(),
            browser: browser.clone(),
            user_lookup_service: UserLookupService::new(&server.uri(), Duration::from_secs(5)).unwrap(),
        });
        (router(state, "static"), browser)
    }

    fn form(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn page(app: &Router) -> String {
        let response = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn seed(browser: &SharedBrowser, repos: Vec<Repository>) {
        let mut browser = browser.lock().await;
        let ticket = browser.issue_ticket();
        browser.apply_lookup(
            ticket,
            LookupOutcome::Found(Profile {
                login: "octocat".into(),
                repos,
                ..Default::default()
            }),
        );
    }

    fn repo(id: i64, name: &str) -> Repository {
        Repository {
            id: Some(id),
            name: Some(name.into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn renders_empty_view() {
        let server = MockServer::start().await;
        let (app, _) = app(&server);

        let html = page(&app).await;
        assert!(html.contains("Look up a GitHub user"));
        assert!(!html.contains("Repositories:"));
    }

    #[tokio::test]
    async fn lookup_replaces_profile_and_resets_view() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 1,
                "login": "octocat",
                "name": "The Octocat",
                "location": "San Francisco",
                "avatar_url": "https://avatars.example/1",
                "repos": [{"id": 42, "name": "Hello-World", "language": "Ruby"}]
            })))
            .mount(&server)
            .await;
        let (app, browser) = app(&server);
        seed(&browser, vec![repo(1, "old")]).await;
        {
            let mut state = browser.lock().await;
            state.set_search_term("old");
            state.set_sort(SortKey::Name);
        }

        let response = app.clone().oneshot(form("/lookup", "username=octocat")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        {
            let state = browser.lock().await;
            assert_eq!(state.profile().map(|p| p.login.as_str()), Some("octocat"));
            assert_eq!(state.search_term(), "");
            assert_eq!(state.sort_key(), None);
            assert_eq!(state.sort_order(), SortOrder::Ascending);
        }

        let html = page(&app).await;
        assert!(html.contains("The Octocat"));
        assert!(html.contains("Hello-World"));
        assert!(html.contains("https://github.com/octocat"));
    }

    #[tokio::test]
    async fn rows_show_description_and_counts() {
        let server = MockServer::start().await;
        let (app, browser) = app(&server);
        seed(
            &browser,
            vec![Repository {
                id: Some(7),
                name: Some("Spoon-Knife".into()),
                description: Some("This repo is for demonstration purposes only.".into()),
                forks_count: Some(143),
                open_issues_count: Some(17),
                ..Default::default()
            }],
        )
        .await;

        let html = page(&app).await;
        assert!(html.contains("This repo is for demonstration purposes only."));
        assert!(html.contains(r#"<td class="forks">143</td>"#));
        assert!(html.contains(r#"<td class="issues">17</td>"#));
    }

    #[tokio::test]
    async fn failed_lookup_keeps_state_and_shows_notice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;
        let (app, browser) = app(&server);
        seed(&browser, vec![repo(1, "kept")]).await;

        app.clone().oneshot(form("/lookup", "username=octocat")).await.unwrap();

        let html = page(&app).await;
        assert!(html.contains("Lookup failed"));
        assert!(html.contains("kept"));
        assert!(!page(&app).await.contains("Lookup failed"));
    }

    #[tokio::test]
    async fn search_and_sort_shape_the_table() {
        let server = MockServer::start().await;
        let (app, browser) = app(&server);
        seed(&browser, vec![repo(1, "beta-tool"), repo(2, "Alpha-tool"), repo(3, "gamma")]).await;

        app.clone().oneshot(form("/search", "term=TOOL")).await.unwrap();
        app.clone().oneshot(form("/sort/name", "")).await.unwrap();
        app.clone().oneshot(form("/sort/name", "")).await.unwrap();

        let html = page(&app).await;
        assert!(!html.contains("gamma"));
        let beta = html.find("beta-tool").unwrap();
        let alpha = html.find("Alpha-tool").unwrap();
        assert!(beta < alpha);
        assert!(html.contains("Name ▼"));
    }

    #[tokio::test]
    async fn delete_success_removes_only_that_row() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/42"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        let (app, browser) = app(&server);
        seed(&browser, vec![repo(1, "a"), repo(42, "b"), repo(3, "c")]).await;

        app.clone().oneshot(form("/repos/42/delete", "")).await.unwrap();

        let state = browser.lock().await;
        let ids: Vec<_> = state.profile().unwrap().repos.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![Some(1), Some(3)]);
    }

    #[tokio::test]
    async fn delete_of_unknown_id_leaves_list() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        let (app, browser) = app(&server);
        seed(&browser, vec![repo(1, "a"), repo(2, "b")]).await;

        let response = app.clone().oneshot(form("/repos/99/delete", "")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let state = browser.lock().await;
        assert_eq!(state.profile().unwrap().repos.len(), 2);
    }

    #[tokio::test]
    async fn delete_failure_keeps_row_and_shows_notice() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let (app, browser) = app(&server);
        seed(&browser, vec![repo(42, "survivor")]).await;

        app.clone().oneshot(form("/repos/42/delete", "")).await.unwrap();

        let html = page(&app).await;
        assert!(html.contains("survivor"));
        assert!(html.contains("Could not delete repository 42"));
    }

    #[tokio::test]
    async fn unknown_sort_key_is_rejected() {
        let server = MockServer::start().await;
        let (app, browser) = app(&server);

        let response = app.clone().oneshot(form("/sort/stars", "")).await.unwrap();
        assert!(response.status().is_client_error());
        assert_eq!(browser.lock().await.sort_key(), None);
    }
}
