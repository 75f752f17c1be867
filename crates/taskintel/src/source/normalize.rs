//! Normalization of one raw source record into the canonical [`Task`].
//!
//! The raw shape is the source's property map: each property is a tagged
//! object (`title`, `select`, `date`, `rich_text`, `people`). Everything
//! here is tolerant of missing or malformed fields; the only hard
//! requirement is a non-empty task name.

use chrono::NaiveDate;
use serde_json::Value;
use taskintel_core::roster::Roster;
use taskintel_core::task::Task;
use tracing::trace;

/// Convert one raw record into a `Task`. Returns `None` when the record has
/// no usable name; every other field falls back to its sentinel default.
/// The department label is assigned later by the fetcher, never read here.
pub fn normalize_record(record: &Value, roster: &Roster) -> Option<Task> {
    let props = record.get("properties")?;

    let name = title_text(props, "Task Name")?;
    let mut task = Task::new(name);

    task.owners = owner_names(props, roster);
    if let Some(status) = select_name(props, "Status") {
        task.status = status;
    }
    if let Some(priority) = select_name(props, "Priority") {
        task.priority = priority;
    }
    if let Some(blocker) = select_name(props, "Blocker") {
        task.blocker = blocker;
    }
    if let Some(next_step) = rich_text(props, "Next Steps") {
        task.next_step = next_step;
    }
    if let Some(impact) = rich_text(props, "Impact") {
        task.impact = impact;
    }
    task.due_date = date_start(props, "Due Date");

    trace!(task = %task.name, owners = task.owners.len(), "Normalized record");
    Some(task)
}

/// Resolve the `Owner` people list to display names. Identifiers the roster
/// does not know become synthesized placeholders so the task is kept.
fn owner_names(props: &Value, roster: &Roster) -> Vec<String> {
    let Some(people) = props
        .get("Owner")
        .and_then(|p| p.get("people"))
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    people
        .iter()
        .filter_map(|person| {
            if let Some(name) = person.get("name").and_then(Value::as_str) {
                if !name.trim().is_empty() {
                    return Some(name.to_string());
                }
            }
            let id = person.get("id").and_then(Value::as_str)?;
            Some(
                roster
                    .display_name(id)
                    .map(str::to_string)
                    .unwrap_or_else(|| Roster::placeholder_name(id)),
            )
        })
        .collect()
}

fn title_text(props: &Value, field: &str) -> Option<String> {
    let text = props
        .get(field)?
        .get("title")?
        .as_array()?
        .first()?
        .get("plain_text")?
        .as_str()?
        .trim()
        .to_string();
    if text.is_empty() { None } else { Some(text) }
}

fn select_name(props: &Value, field: &str) -> Option<String> {
    props
        .get(field)?
        .get("select")?
        .get("name")?
        .as_str()
        .map(str::to_string)
}

fn rich_text(props: &Value, field: &str) -> Option<String> {
    props
        .get(field)?
        .get("rich_text")?
        .as_array()?
        .first()?
        .get("plain_text")?
        .as_str()
        .map(str::to_string)
}

/// Parse the `start` of a date property. Timestamps are accepted by taking
/// the date prefix; anything unparseable is treated as unset.
fn date_start(props: &Value, field: &str) -> Option<NaiveDate> {
    let start = props.get(field)?.get("date")?.get("start")?.as_str()?;
    let date_part = start.get(..10).unwrap_or(start);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}
