use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde::Deserialize;
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// A to-do item. Every read and write is filtered by `owner`.
#[derive(Debug, Clone, FromRow)]
pub struct Todo {
    pub id: Uuid,
    pub owner: Uuid,
    pub title: String,
    pub completed: bool,
    pub date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Todo {
    pub fn new(owner: Uuid, title: impl Into<String>, completed: bool, date: Option<DateTime<Utc>>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            title: title.into(),
            completed,
            date,
            created_at: Utc::now(),
        }
    }

    /// Parses a partial update. Recognized keys keep the creation typing
    /// (`date: null` clears the due date); unrecognized keys are ignored.
    pub fn parse_patch(payload: &Value) -> Result<TodoPatch, String> {
        let object = payload
            .as_object()
            .ok_or_else(|| "expected a JSON object".to_string())?;

        let mut patch = TodoPatch::default();
        for (key, value) in object {
            match key.as_str() {
                "title" => {
                    let title = value
                        .as_str()
                        .map(str::trim)
                        .filter(|t| !t.is_empty())
                        .ok_or_else(|| "title must be a non-empty string".to_string())?;
                    patch.title = Some(title.to_string());
                }
                "completed" => {
                    let completed = value
                        .as_bool()
                        .ok_or_else(|| "completed must be a boolean".to_string())?;
                    patch.completed = Some(completed);
                }
                "date" => {
                    patch.date = Some(parse_due_date(value)?);
                }
                _ => {}
            }
        }
        Ok(patch)
    }
}

// Wire shape is {id, title, completed, date?}: the due date serializes as a
// millisecond timestamp and the key is absent when unset; owner and
// created_at never leave the server.
impl Serialize for Todo {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let fields = 3 + usize::from(self.date.is_some());
        let mut state = serializer.serialize_struct("Todo", fields)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("title", &self.title)?;
        state.serialize_field("completed", &self.completed)?;
        if let Some(date) = &self.date {
            state.serialize_field("date", &date.timestamp_millis())?;
        }
        state.end()
    }
}

/// Creation payload. `completed` is required alongside the title; the due
/// date arrives as a millisecond timestamp when present.
#[derive(Debug, Deserialize)]
pub struct TodoDraft {
    pub title: String,
    pub completed: bool,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub date: Option<DateTime<Utc>>,
}

/// Field-level update; the nested Option distinguishes "leave the due date
/// alone" (None) from "clear it" (Some(None)).
#[derive(Debug, Clone, Default)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub completed: Option<bool>,
    pub date: Option<Option<DateTime<Utc>>>,
}

fn parse_due_date(value: &Value) -> Result<Option<DateTime<Utc>>, String> {
    if value.is_null() {
        return Ok(None);
    }
    let millis = value
        .as_i64()
        .ok_or_else(|| "date must be a millisecond timestamp".to_string())?;
    DateTime::from_timestamp_millis(millis)
        .map(Some)
        .ok_or_else(|| "date is out of range".to_string())
}
