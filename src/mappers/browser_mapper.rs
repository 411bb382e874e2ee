use chrono::DateTime;
use serde::Serialize;

use crate::browser::{Notice, ProfileBrowser};
use crate::models::profile::Profile;
use crate::models::repository::Repository;
use crate::models::sort::{SortIndicator, SortKey};

#[derive(Debug, Serialize)]
pub struct BrowserViewModel {
    pub username: String,
    pub notice: Option<Notice>,
    pub profile: Option<ProfileViewModel>,
    pub search_term: String,
    pub name_sort_icon: &'static str,
    pub language_sort_icon: &'static str,
    pub has_repos: bool,
    pub repos: Vec<RepositoryRowViewModel>,
}

#[derive(Debug, Serialize)]
pub struct ProfileViewModel {
    pub login: String,
    pub name: String,
    pub location: String,
    pub avatar_url: String,
    pub github_url: String,
}

#[derive(Debug, Serialize)]
pub struct RepositoryRowViewModel {
    pub id: Option<i64>,
    pub deletable: bool,
    pub name: String,
    pub html_url: String,
    pub description: String,
    pub language: String,
    pub fork: bool,
    pub forks_count: i64,
    pub open_issues_count: i64,
    pub pushed_at: String,
}

pub fn to_view_model(browser: &ProfileBrowser, notice: Option<Notice>) -> BrowserViewModel {
    let key = browser.sort_key();
    let order = browser.sort_order();
    let repos: Vec<RepositoryRowViewModel> =
        browser.visible_repos().into_iter().map(to_row).collect();

    BrowserViewModel {
        username: browser.username().to_string(),
        notice,
        profile: browser.profile().map(to_profile),
        search_term: browser.search_term().to_string(),
        name_sort_icon: SortIndicator::for_column(SortKey::Name, key, order).symbol(),
        language_sort_icon: SortIndicator::for_column(SortKey::Language, key, order).symbol(),
        has_repos: !repos.is_empty(),
        repos,
    }
}

fn to_profile(profile: &Profile) -> ProfileViewModel {
    ProfileViewModel {
        login: profile.login.clone(),
        name: profile.name.clone(),
        location: profile.location.clone(),
        avatar_url: profile.avatar_url.clone(),
        github_url: profile.github_url(),
    }
}

fn to_row(repo: &Repository) -> RepositoryRowViewModel {
    RepositoryRowViewModel {
        id: repo.id,
        deletable: repo.id.is_some(),
        name: repo.name_or_empty().to_string(),
        html_url: repo.html_url.clone().unwrap_or_default(),
        description: repo.description.clone().unwrap_or_default(),
        language: repo.language.clone().unwrap_or_default(),
        fork: repo.fork.unwrap_or(false),
        forks_count: repo.forks_count.unwrap_or(0),
        open_issues_count: repo.open_issues_count.unwrap_or(0),
        pushed_at: repo.pushed_at.as_deref().map(format_timestamp).unwrap_or_default(),
    }
}

// Falls back to the raw text when the service sends something other than RFC 3339.
fn format_timestamp(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| raw.to_string())
}
