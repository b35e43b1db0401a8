use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_AVATAR: &str = "https://assets.leetcode.com/users/default_avatar.jpg";

/// Difficulties that get a tile on the page. Anything else is kept on disk
/// but never rendered.
pub const RENDERED_DIFFICULTIES: [&str; 3] = ["Easy", "Medium", "Hard"];

/// One daily snapshot of the tracked profile, as stored in `data.json`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub username: String,
    pub ranking: u64,
    #[serde(default)]
    pub real_name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub stats: Vec<SubmissionStat>,
    // Older snapshots were stamped with this instead of `timestamp`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

impl HistoryEntry {
    /// Collection time, falling back to the legacy field name.
    pub fn recorded_at(&self) -> Option<&str> {
        self.timestamp
            .as_deref()
            .or(self.last_updated.as_deref())
    }

    pub fn avatar_url(&self) -> &str {
        match self.avatar.as_deref() {
            Some(url) if !url.is_empty() => url,
            _ => DEFAULT_AVATAR,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SubmissionStat {
    pub difficulty: String,
    pub count: u64,
    #[serde(default)]
    pub submissions: u64,
}

impl SubmissionStat {
    pub fn is_rendered(&self) -> bool {
        RENDERED_DIFFICULTIES.contains(&self.difficulty.as_str())
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Top-level shape of `data.json`. Older files hold a single entry instead of
/// an array; decode once here and work with [`HistoryFile::into_records`].
///
/// Records stay untyped so a rewrite keeps every stored field, including ones
/// [`HistoryEntry`] does not know about or cannot read.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum HistoryFile {
    Current(Vec<Value>),
    Legacy(Map<String, Value>),
}

impl HistoryFile {
    pub fn into_records(self) -> Vec<Value> {
        match self {
            HistoryFile::Current(records) => records,
            HistoryFile::Legacy(record) => vec![Value::Object(record)],
        }
    }
}

/// The `timestamp` string of a stored record, if it has one.
pub fn record_timestamp(record: &Value) -> Option<&str> {
    record.get("timestamp").and_then(Value::as_str)
}
