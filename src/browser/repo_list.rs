use std::cmp::Ordering;

use crate::models::repository::Repository;
use crate::models::sort::{SortKey, SortOrder};

/// Repositories whose name contains `term`, ignoring case, in source order.
pub fn filter<'a>(repos: &'a [Repository], term: &str) -> Vec<&'a Repository> {
    let needle = term.to_lowercase();
    repos
        .iter()
        .filter(|repo| repo.name_or_empty().to_lowercase().contains(&needle))
        .collect()
}

pub fn sort(repos: &mut [&Repository], key: SortKey, order: SortOrder) {
    repos.sort_by(|a, b| compare(a, b, key, order));
}

fn compare(a: &Repository, b: &Repository, key: SortKey, order: SortOrder) -> Ordering {
    let ordering = a
        .sort_field(key)
        .to_lowercase()
        .cmp(&b.sort_field(key).to_lowercase());
    match order {
        SortOrder::Ascending => ordering,
        SortOrder::Descending => ordering.reverse(),
    }
}

/// The rows to display: filtered by `term`, then sorted when a key is set.
/// The source list is left untouched.
pub fn derive<'a>(
    repos: Option<&'a [Repository]>,
    term: &str,
    key: Option<SortKey>,
    order: SortOrder,
) -> Vec<&'a Repository> {
    let mut visible = filter(repos.unwrap_or_default(), term);
    if let Some(key) = key {
        sort(&mut visible, key, order);
    }
    visible
}
