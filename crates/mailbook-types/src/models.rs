use serde::{Deserialize, Serialize};

use crate::api::OutgoingQuery;

/// One of the two boolean status columns on an outgoing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutgoingFlag {
    Thanked,
    HasBeenSent,
}

impl OutgoingFlag {
    pub fn column(self) -> &'static str {
        match self {
            OutgoingFlag::Thanked => "thanked",
            OutgoingFlag::HasBeenSent => "has_been_sent",
        }
    }
}

/// Narrowing applied when listing a user's outgoing records.
///
/// Text filters are case-insensitive substring matches; `None` and blank
/// strings match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub sent: Option<bool>,
    pub username: Option<String>,
    pub country: Option<String>,
    pub region: Option<String>,
}

impl ListFilter {
    pub fn sent(sent: bool) -> Self {
        Self {
            sent: Some(sent),
            ..Self::default()
        }
    }

    /// Text filters that actually narrow the result, as `(column, needle)`.
    pub fn text_filters(&self) -> Vec<(&'static str, &str)> {
        [
            ("username", self.username.as_deref()),
            ("country", self.country.as_deref()),
            ("region", self.region.as_deref()),
        ]
        .into_iter()
        .filter_map(|(column, value)| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| (column, v))
        })
        .collect()
    }
}

impl From<OutgoingQuery> for ListFilter {
    fn from(query: OutgoingQuery) -> Self {
        ListFilter {
            sent: query.sent,
            username: query.username,
            country: query.country,
            region: query.region,
        }
    }
}
