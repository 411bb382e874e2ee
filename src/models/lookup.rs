use serde::{Deserialize, Serialize};

use super::profile::Profile;

#[derive(Debug, Serialize, Deserialize)]
pub struct LookupRequest {
    pub username: String,
}

/// Result of a lookup the service answered. Transport and status failures are
/// reported separately as [`crate::error::ServiceError`].
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Found(Profile),
    NotFound,
}

impl From<Option<Profile>> for LookupOutcome {
    fn from(profile: Option<Profile>) -> Self {
        match profile {
            Some(profile) => LookupOutcome::Found(profile),
            None => LookupOutcome::NotFound,
        }
    }
}
