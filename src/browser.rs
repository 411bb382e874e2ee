//! View state of the profile browser.
//!
//! Every update that replaces the profile carries a [`Ticket`]. Tickets are
//! handed out in increasing order, and an update holding a ticket older than
//! the last applied one is dropped, so a slow lookup response can never
//! overwrite a newer lookup or push event.

pub mod repo_list;

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;

use crate::models::lookup::LookupOutcome;
use crate::models::profile::Profile;
use crate::models::repository::Repository;
use crate::models::sort::{SortKey, SortOrder};

pub type SharedBrowser = Arc<Mutex<ProfileBrowser>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Error,
}

/// One-shot message shown on the next render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct ProfileBrowser {
    username: String,
    profile: Option<Profile>,
    search_term: String,
    sort_key: Option<SortKey>,
    sort_order: SortOrder,
    issued: u64,
    applied: u64,
    notice: Option<Notice>,
}

impl ProfileBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedBrowser {
        Arc::new(Mutex::new(Self::new()))
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn set_username(&mut self, username: &str) {
        self.username = username.to_string();
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn set_search_term(&mut self, term: &str) {
        self.search_term = term.to_string();
    }

    pub fn sort_key(&self) -> Option<SortKey> {
        self.sort_key
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    /// Clicking the active column while ascending flips it to descending;
    /// anything else sorts ascending on the clicked column.
    pub fn set_sort(&mut self, key: SortKey) {
        self.sort_order = if self.sort_key == Some(key) && self.sort_order == SortOrder::Ascending
        {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        };
        self.sort_key = Some(key);
    }

    pub fn issue_ticket(&mut self) -> Ticket {
        self.issued += 1;
        Ticket(self.issued)
    }

    fn accept(&mut self, ticket: Ticket) -> bool {
        if ticket.0 <= self.applied {
            log::debug!(
                "Dropping stale update #{} (already applied #{})",
                ticket.0,
                self.applied
            );
            return false;
        }
        self.applied = ticket.0;
        true
    }

    /// Resets filtering and sorting, then replaces the profile with the lookup
    /// answer unless a newer update already landed. Returns whether the profile
    /// was replaced.
    pub fn apply_lookup(&mut self, ticket: Ticket, outcome: LookupOutcome) -> bool {
        self.search_term.clear();
        self.sort_key = None;
        self.sort_order = SortOrder::Ascending;
        if !self.accept(ticket) {
            return false;
        }
        self.profile = match outcome {
            LookupOutcome::Found(profile) => Some(profile),
            LookupOutcome::NotFound => {
                self.notice = Some(Notice::info(format!(
                    "No user named \"{}\" was found.",
                    self.username
                )));
                None
            }
        };
        true
    }

    /// Replaces the profile from a push event. Filtering and sorting are kept.
    pub fn apply_push(&mut self, ticket: Ticket, profile: Option<Profile>) -> bool {
        if !self.accept(ticket) {
            return false;
        }
        self.profile = profile;
        true
    }

    /// Drops a repository the service confirmed as deleted.
    pub fn remove_repo(&mut self, id: i64) -> bool {
        self.profile
            .as_mut()
            .map(|profile| profile.remove_repo(id))
            .unwrap_or(false)
    }

    pub fn visible_repos(&self) -> Vec<&Repository> {
        repo_list::derive(
            self.profile.as_ref().map(|p| p.repos.as_slice()),
            &self.search_term,
            self.sort_key,
            self.sort_order,
        )
    }

    pub fn post_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }
}
