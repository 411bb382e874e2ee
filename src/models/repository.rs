use serde::{Deserialize, Serialize};

use super::profile::Profile;
use super::sort::SortKey;

/// One repository row. The service may leave any field out or send it as `null`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Repository {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub full_name: Option<String>,
    pub html_url: Option<String>,
    pub description: Option<String>,
    pub fork: Option<bool>,
    pub url: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub pushed_at: Option<String>,
    pub language: Option<String>,
    pub forks_count: Option<i64>,
    pub open_issues_count: Option<i64>,
    pub owner: Option<Box<Profile>>,
}

impl Repository {
    pub fn name_or_empty(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    /// Value compared when ordering by `key`; absent values compare as "".
    pub fn sort_field(&self, key: SortKey) -> &str {
        match key {
            SortKey::Name => self.name_or_empty(),
            SortKey::Language => self.language.as_deref().unwrap_or_default(),
        }
    }
}
