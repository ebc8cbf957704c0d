//! Daily devotionals, one per local calendar day.

use chrono::{DateTime, Datelike, Local, TimeZone};
use serde::{Deserialize, Serialize};

use crate::core::constants::DEVOTIONALS_KEY;
use crate::core::storage::LocalStore;
use crate::core::text::collapse_newlines;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    pub reference: String,
    pub text: String,
}

/// Structured payload returned by the devotional call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevotionalContent {
    pub reading: Reading,
    pub reflection: String,
    pub prayer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Devotional {
    pub id: String,
    pub day_id: String,
    /// RFC 3339 generation timestamp.
    pub date: String,
    pub reading: Reading,
    pub reflection: String,
    pub prayer: String,
}

impl Devotional {
    /// Build a record from generated content, collapsing newline runs.
    pub fn from_content(
        id: impl Into<String>,
        day_id: impl Into<String>,
        date: impl Into<String>,
        content: DevotionalContent,
    ) -> Self {
        Self {
            id: id.into(),
            day_id: day_id.into(),
            date: date.into(),
            reading: Reading {
                reference: content.reading.reference,
                text: collapse_newlines(&content.reading.text),
            },
            reflection: collapse_newlines(&content.reflection),
            prayer: collapse_newlines(&content.prayer),
        }
    }

    fn sort_key(&self) -> i64 {
        DateTime::parse_from_rfc3339(&self.date)
            .map(|dt| dt.timestamp_millis())
            .unwrap_or(i64::MIN)
    }
}

/// `YYYY-MM-DD` for the given local moment.
pub fn day_id<Tz: TimeZone>(at: &DateTime<Tz>) -> String {
    format!("{:04}-{:02}-{:02}", at.year(), at.month(), at.day())
}

pub fn today_id() -> String {
    day_id(&Local::now())
}

/// Seed handed to the model so different users get different readings.
pub fn daily_seed(user_id: &str, day_id: &str) -> String {
    format!("{user_id}-{day_id}")
}

/// Devotionals ordered newest first.
#[derive(Debug, Default)]
pub struct DevotionalStore {
    devotionals: Vec<Devotional>,
}

impl DevotionalStore {
    pub fn from_devotionals(mut devotionals: Vec<Devotional>) -> Self {
        devotionals.sort_by_key(|devotional| std::cmp::Reverse(devotional.sort_key()));
        Self { devotionals }
    }

    pub fn load(store: &LocalStore) -> Self {
        Self::from_devotionals(store.load_list(DEVOTIONALS_KEY))
    }

    pub fn save(&self, store: &LocalStore) {
        store.save_list(DEVOTIONALS_KEY, &self.devotionals);
    }

    pub fn devotionals(&self) -> &[Devotional] {
        &self.devotionals
    }

    pub fn len(&self) -> usize {
        self.devotionals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devotionals.is_empty()
    }

    pub fn for_day(&self, day_id: &str) -> Option<&Devotional> {
        self.devotionals.iter().find(|d| d.day_id == day_id)
    }

    /// Add a devotional at the front. Rejected when the day already has one.
    pub fn insert(&mut self, devotional: Devotional) -> Result<(), Devotional> {
        if self.for_day(&devotional.day_id).is_some() {
            return Err(devotional);
        }
        self.devotionals.insert(0, devotional);
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Option<Devotional> {
        let index = self.devotionals.iter().position(|d| d.id == id)?;
        Some(self.devotionals.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn content() -> DevotionalContent {
        DevotionalContent {
            reading: Reading {
                reference: "Lamentations 3:22-23".into(),
                text: "His compassions fail not.\n\n\n\nThey are new every morning.".into(),
            },
            reflection: "Mercy meets us daily.".into(),
            prayer: "Lord,\n\n\n\nthank you.".into(),
        }
    }

    fn devotional(id: &str, day: &str, date: &str) -> Devotional {
        Devotional::from_content(id, day, date, content())
    }

    #[test]
    fn day_id_uses_local_calendar_fields() {
        let offset = FixedOffset::east_opt(3 * 3600).unwrap();
        let moment = offset.with_ymd_and_hms(2024, 3, 9, 23, 30, 0).unwrap();
        assert_eq!(day_id(&moment), "2024-03-09");
    }

    #[test]
    fn content_is_normalized() {
        let d = devotional("devo-1", "2024-03-09", "2024-03-09T08:00:00+00:00");
        assert_eq!(d.reading.text, "His compassions fail not.\n\nThey are new every morning.");
        assert_eq!(d.prayer, "Lord,\n\nthank you.");
    }

    #[test]
    fn second_devotional_for_same_day_is_rejected() {
        let mut store = DevotionalStore::default();
        store
            .insert(devotional("devo-1", "2024-03-09", "2024-03-09T08:00:00+00:00"))
            .expect("first insert");
        let rejected = store.insert(devotional("devo-2", "2024-03-09", "2024-03-09T09:00:00+00:00"));
        assert!(rejected.is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn loaded_devotionals_sort_by_date_desc() {
        let store = DevotionalStore::from_devotionals(vec![
            devotional("a", "2024-03-07", "2024-03-07T08:00:00+00:00"),
            devotional("c", "2024-03-09", "2024-03-09T08:00:00+00:00"),
            devotional("b", "2024-03-08", "2024-03-08T08:00:00+00:00"),
        ]);
        let ids: Vec<&str> = store.devotionals().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[test]
    fn seed_combines_user_and_day() {
        assert_eq!(daily_seed("u-1", "2024-03-09"), "u-1-2024-03-09");
    }

    #[test]
    fn persisted_json_uses_day_id_key() {
        let json = serde_json::to_value(devotional("a", "2024-03-07", "x")).unwrap();
        assert_eq!(json["dayId"], "2024-03-07");
        assert_eq!(json["reading"]["reference"], "Lamentations 3:22-23");
    }
}
