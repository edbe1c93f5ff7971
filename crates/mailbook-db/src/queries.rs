use crate::Database;
use crate::models::{OutgoingFields, OutgoingRow, UserRow};
use anyhow::Result;
use mailbook_types::models::{ListFilter, OutgoingFlag};
use rusqlite::types::Value;
use rusqlite::{Connection, Row};

const OUTGOING_COLUMNS: &str = "id, user_id, username, name, date, country, region, city, \
     thanked, has_been_sent, occasion, description, link, created_at, updated_at";

impl Database {
    // -- Users --

    /// Insert a user. Returns false, without touching the table, when the
    /// username is already taken.
    pub fn create_user(
        &self,
        id: &str,
        username: &str,
        password_hash: &str,
        verification_token_hash: &str,
    ) -> Result<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO users (id, username, password, verification_token) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(username) DO NOTHING",
                (id, username, password_hash, verification_token_hash),
            )?;
            Ok(inserted > 0)
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username", username))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    /// Mark the account holding this token as verified and burn the token.
    /// Returns false when no account holds it.
    pub fn verify_user(&self, verification_token_hash: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let updated = conn.execute(
                "UPDATE users SET verified_at = datetime('now'), verification_token = NULL
                 WHERE verification_token = ?1",
                [verification_token_hash],
            )?;
            Ok(updated > 0)
        })
    }

    // -- Outgoing --

    pub fn insert_outgoing(&self, user_id: &str, fields: &OutgoingFields) -> Result<OutgoingRow> {
        self.with_conn(|conn| {
            let sql = format!(
                "INSERT INTO outgoing (user_id, username, name, date, country, region, city,
                                       thanked, has_been_sent, occasion, description, link)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                 RETURNING {OUTGOING_COLUMNS}"
            );
            let row = conn.query_row(
                &sql,
                rusqlite::params![
                    user_id,
                    fields.username,
                    fields.name,
                    fields.date,
                    fields.country,
                    fields.region,
                    fields.city,
                    fields.thanked,
                    fields.has_been_sent,
                    fields.occasion,
                    fields.description,
                    fields.link,
                ],
                map_outgoing,
            )?;
            Ok(row)
        })
    }

    pub fn find_outgoing_by_id(&self, id: i64) -> Result<Option<OutgoingRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {OUTGOING_COLUMNS} FROM outgoing WHERE id = ?1");
            conn.query_row(&sql, [id], map_outgoing).optional()
        })
    }

    /// All records owned by `user_id` that pass `filter`, newest date first.
    pub fn find_outgoing_by_user(&self, user_id: &str, filter: &ListFilter) -> Result<Vec<OutgoingRow>> {
        self.with_conn(|conn| query_outgoing_by_user(conn, user_id, filter))
    }

    /// Replace every data column of a record owned by `user_id`.
    /// Returns None when no such record exists for that owner.
    pub fn update_outgoing(
        &self,
        id: i64,
        user_id: &str,
        fields: &OutgoingFields,
    ) -> Result<Option<OutgoingRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "UPDATE outgoing
                 SET username = ?3, name = ?4, date = ?5, country = ?6, region = ?7, city = ?8,
                     thanked = ?9, has_been_sent = ?10, occasion = ?11, description = ?12,
                     link = ?13, updated_at = datetime('now')
                 WHERE id = ?1 AND user_id = ?2
                 RETURNING {OUTGOING_COLUMNS}"
            );
            conn.query_row(
                &sql,
                rusqlite::params![
                    id,
                    user_id,
                    fields.username,
                    fields.name,
                    fields.date,
                    fields.country,
                    fields.region,
                    fields.city,
                    fields.thanked,
                    fields.has_been_sent,
                    fields.occasion,
                    fields.description,
                    fields.link,
                ],
                map_outgoing,
            )
            .optional()
        })
    }

    /// Hard delete. Returns false when no record with that id belongs to `user_id`.
    pub fn delete_outgoing(&self, id: i64, user_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute(
                "DELETE FROM outgoing WHERE id = ?1 AND user_id = ?2",
                rusqlite::params![id, user_id],
            )?;
            Ok(deleted > 0)
        })
    }

    /// Flip one status flag in a single statement and return its new value.
    /// Returns None when the record does not exist.
    pub fn toggle_outgoing_flag(&self, id: i64, flag: OutgoingFlag) -> Result<Option<bool>> {
        let column = flag.column();
        self.with_conn(|conn| {
            let sql = format!(
                "UPDATE outgoing SET {column} = NOT {column}, updated_at = datetime('now')
                 WHERE id = ?1
                 RETURNING {column}"
            );
            conn.query_row(&sql, [id], |row| row.get::<_, bool>(0)).optional()
        })
    }
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    let sql = format!(
        "SELECT id, username, password, verified_at FROM users WHERE {column} = ?1"
    );
    let mut stmt = conn.prepare(&sql)?;

    let row = stmt
        .query_row([value], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                password: row.get(2)?,
                verified_at: row.get(3)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn query_outgoing_by_user(
    conn: &Connection,
    user_id: &str,
    filter: &ListFilter,
) -> Result<Vec<OutgoingRow>> {
    let mut sql = format!("SELECT {OUTGOING_COLUMNS} FROM outgoing WHERE user_id = ?1");
    let mut params: Vec<Value> = vec![Value::Text(user_id.to_string())];

    if let Some(sent) = filter.sent {
        params.push(Value::Integer(i64::from(sent)));
        sql.push_str(&format!(" AND has_been_sent = ?{}", params.len()));
    }

    for (column, needle) in filter.text_filters() {
        params.push(Value::Text(needle.to_lowercase()));
        sql.push_str(&format!(" AND instr(fold_case({column}), ?{}) > 0", params.len()));
    }

    sql.push_str(" ORDER BY date DESC, id DESC");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(rusqlite::params_from_iter(params), map_outgoing)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn map_outgoing(row: &Row<'_>) -> rusqlite::Result<OutgoingRow> {
    Ok(OutgoingRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        username: row.get(2)?,
        name: row.get(3)?,
        date: row.get(4)?,
        country: row.get(5)?,
        region: row.get(6)?,
        city: row.get(7)?,
        thanked: row.get(8)?,
        has_been_sent: row.get(9)?,
        occasion: row.get(10)?,
        description: row.get(11)?,
        link: row.get(12)?,
        created_at: row.get(13)?,
        updated_at: row.get(14)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
