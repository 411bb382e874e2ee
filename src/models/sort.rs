use serde::{Deserialize, Serialize};

/// Sortable repository columns. "No sort" is `Option::<SortKey>::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Name,
    Language,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// What a column header shows for the current sort state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortIndicator {
    Unsorted,
    Ascending,
    Descending,
}

impl SortIndicator {
    pub fn for_column(column: SortKey, key: Option<SortKey>, order: SortOrder) -> Self {
        if key != Some(column) {
            return SortIndicator::Unsorted;
        }
        match order {
            SortOrder::Ascending => SortIndicator::Ascending,
            SortOrder::Descending => SortIndicator::Descending,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            SortIndicator::Unsorted => "↕",
            SortIndicator::Ascending => "▲",
            SortIndicator::Descending => "▼",
        }
    }
}
