use serde::{Deserialize, Serialize};

use super::null_as_default;
use super::repository::Repository;

/// A looked-up account together with the repositories the service returned for it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub login: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub avatar_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub repos: Vec<Repository>,
}

impl Profile {
    /// Drops every repository carrying `id`. Returns whether anything was removed.
    pub fn remove_repo(&mut self, id: i64) -> bool {
        let before = self.repos.len();
        self.repos.retain(|repo| repo.id != Some(id));
        self.repos.len() != before
    }

    pub fn github_url(&self) -> String {
        format!("https://github.com/{}", urlencoding::encode(&self.login))
    }
}
