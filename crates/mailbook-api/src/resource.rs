use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use mailbook_db::models::OutgoingRow;
use mailbook_types::api::OutgoingResource;

/// Map a stored row to its client-facing shape. Fields pass through as-is.
pub fn to_resource(row: OutgoingRow) -> OutgoingResource {
    let user_id = row.user_id.parse().unwrap_or_else(|e| {
        warn!("Corrupt user_id '{}' on outgoing {}: {}", row.user_id, row.id, e);
        Uuid::default()
    });
    let created_at = parse_timestamp(&row.created_at, row.id);
    let updated_at = parse_timestamp(&row.updated_at, row.id);

    OutgoingResource {
        id: row.id,
        user_id,
        username: row.username,
        name: row.name,
        date: row.date,
        country: row.country,
        region: row.region,
        city: row.city,
        thanked: row.thanked,
        has_been_sent: row.has_been_sent,
        occasion: row.occasion,
        description: row.description,
        link: row.link,
        created_at,
        updated_at,
    }
}

pub fn to_resources(rows: Vec<OutgoingRow>) -> Vec<OutgoingResource> {
    rows.into_iter().map(to_resource).collect()
}

fn parse_timestamp(raw: &str, id: i64) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            // SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without timezone.
            // Parse as naive UTC and convert.
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}' on outgoing {}: {}", raw, id, e);
            DateTime::default()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn row() -> OutgoingRow {
        OutgoingRow {
            id: 7,
            user_id: "6f1c1c64-3c43-4b7e-9d4a-0f3f5b0f9a11".into(),
            username: "alice".into(),
            name: Some("Alice".into()),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            country: "US".into(),
            region: None,
            city: Some("Portland".into()),
            thanked: true,
            has_been_sent: false,
            occasion: None,
            description: None,
            link: Some("https://example.com".into()),
            created_at: "2024-01-02 03:04:05".into(),
            updated_at: "2024-01-03T00:00:00Z".into(),
        }
    }

    #[test]
    fn serializes_natural_types() {
        let json = serde_json::to_value(to_resource(row())).unwrap();

        assert_eq!(json["id"], 7);
        assert_eq!(json["user_id"], "6f1c1c64-3c43-4b7e-9d4a-0f3f5b0f9a11");
        assert_eq!(json["date"], "2024-01-01");
        assert_eq!(json["thanked"], true);
        assert_eq!(json["has_been_sent"], false);
        assert_eq!(json["region"], serde_json::Value::Null);
        assert_eq!(json["city"], "Portland");
    }

    #[test]
    fn parses_both_timestamp_forms() {
        let resource = to_resource(row());
        assert_eq!(resource.created_at, Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap());
        assert_eq!(resource.updated_at, Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap());
    }
}
