//! Database row types — these map directly to SQLite rows.
//! Distinct from mailbook-types API models to keep the DB layer independent.

use chrono::NaiveDate;

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub password: String,
    pub verified_at: Option<String>,
}

impl UserRow {
    pub fn is_verified(&self) -> bool {
        self.verified_at.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct OutgoingRow {
    pub id: i64,
    pub user_id: String,
    pub username: String,
    pub name: Option<String>,
    pub date: NaiveDate,
    pub country: String,
    pub region: Option<String>,
    pub city: Option<String>,
    pub thanked: bool,
    pub has_been_sent: bool,
    pub occasion: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Every writable column of an outgoing row except the owner.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingFields {
    pub username: String,
    pub name: Option<String>,
    pub date: NaiveDate,
    pub country: String,
    pub region: Option<String>,
    pub city: Option<String>,
    pub thanked: bool,
    pub has_been_sent: bool,
    pub occasion: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
}
