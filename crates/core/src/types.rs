use serde::{Deserialize, Deserializer};

/// All database primary keys are SQLite INTEGER PRIMARY KEY rowids.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Deserialize a field so that an explicit `null` is distinguishable from an
/// absent field.
///
/// Use together with `#[serde(default)]`:
///
/// - field absent -> `None` (leave unchanged)
/// - `"field": null` -> `Some(None)` (clear)
/// - `"field": value` -> `Some(Some(value))` (set)
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
