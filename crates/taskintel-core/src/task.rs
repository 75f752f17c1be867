//! The canonical task entity.
//!
//! Tasks are value objects: they are created fresh on every cache refill and
//! never carry identity across snapshots. All date-derived flags are computed
//! against a caller-supplied "today" so nothing time-dependent is ever
//! persisted.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Default sentinel for select-style fields that were never set upstream.
pub const NOT_SET: &str = "Not set";
/// Default sentinel for free-text fields that were never set upstream.
pub const NOT_SPECIFIED: &str = "Not specified";
/// Default sentinel for an absent blocker.
pub const NO_BLOCKER: &str = "None";

/// Status values that count as "this task is finished".
const COMPLETION_VOCABULARY: &[&str] = &["done", "complete", "completed", "shipped", "finished"];

/// One normalized work item from a department collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Task title. A record without one never becomes a `Task`.
    pub name: String,
    /// Display names of the people the task is assigned to.
    pub owners: Vec<String>,
    /// Free-form status label, e.g. "Not started", "In progress", "Done".
    pub status: String,
    /// Free-form priority label, e.g. "High", "Medium", "Low".
    pub priority: String,
    /// Label of the collection this task was fetched from. Assigned by the
    /// fetcher, never read from the source record.
    pub department: String,
    /// Due date, if one was set upstream.
    pub due_date: Option<NaiveDate>,
    /// Active blocker description, or [`NO_BLOCKER`].
    pub blocker: String,
    /// Next step description, or [`NOT_SPECIFIED`].
    pub next_step: String,
    /// Impact description, or [`NOT_SPECIFIED`].
    pub impact: String,
}

impl Task {
    /// Create a task with the given name and every other field defaulted.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            owners: Vec::new(),
            status: NOT_SET.to_string(),
            priority: NOT_SET.to_string(),
            department: String::new(),
            due_date: None,
            blocker: NO_BLOCKER.to_string(),
            next_step: NOT_SPECIFIED.to_string(),
            impact: NOT_SPECIFIED.to_string(),
        }
    }

    /// Whether the status matches the completion vocabulary.
    pub fn is_completed(&self) -> bool {
        let status = self.status.to_lowercase();
        COMPLETION_VOCABULARY.iter().any(|w| status.contains(w))
    }

    /// Whether the task is past due and not completed.
    pub fn is_late(&self, today: NaiveDate) -> bool {
        match self.due_date {
            Some(due) => due < today && !self.is_completed(),
            None => false,
        }
    }

    /// Whether the due date falls inside the current ISO week.
    pub fn is_due_this_week(&self, today: NaiveDate) -> bool {
        self.due_date
            .map(|due| due.iso_week() == today.iso_week())
            .unwrap_or(false)
    }

    /// Whether the due date falls inside the next ISO week.
    pub fn is_due_next_week(&self, today: NaiveDate) -> bool {
        let next_week = today + Days::new(7);
        self.due_date
            .map(|due| due.iso_week() == next_week.iso_week())
            .unwrap_or(false)
    }

    /// Whether an actual blocker is recorded.
    pub fn has_blocker(&self) -> bool {
        let blocker = self.blocker.trim();
        !(blocker.is_empty()
            || blocker.eq_ignore_ascii_case(NO_BLOCKER)
            || blocker.eq_ignore_ascii_case(NOT_SET))
    }

    /// Whether `person` is one of the owners (case-insensitive substring,
    /// so "alice" matches "Alice Johnson").
    pub fn is_owned_by(&self, person: &str) -> bool {
        let person = person.to_lowercase();
        self.owners
            .iter()
            .any(|owner| owner.to_lowercase().contains(&person))
    }

    /// Sort rank for the priority label: High 0, Medium 1, Low 2, unset 3.
    pub fn priority_rank(&self) -> u8 {
        let priority = self.priority.to_lowercase();
        if priority.contains("high") || priority.contains("urgent") {
            0
        } else if priority.contains("medium") {
            1
        } else if priority.contains("low") {
            2
        } else {
            3
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_defaults() {
        let task = Task::new("Ship the thing");
        assert_eq!(task.status, NOT_SET);
        assert_eq!(task.priority, NOT_SET);
        assert_eq!(task.blocker, NO_BLOCKER);
        assert_eq!(task.next_step, NOT_SPECIFIED);
        assert!(!task.is_completed());
        assert!(!task.has_blocker());
    }

    #[test]
    fn test_late_in_progress_task() {
        let today = date(2025, 6, 10);
        let mut task = Task::new("Quarterly report");
        task.status = "In progress".to_string();
        task.due_date = Some(date(2025, 6, 9));

        assert!(task.is_late(today));
        assert!(!task.is_completed());
    }

    #[test]
    fn test_completed_task_is_never_late() {
        let today = date(2025, 6, 10);
        let mut task = Task::new("Quarterly report");
        task.status = "Done".to_string();
        task.due_date = Some(date(2025, 6, 1));

        assert!(task.is_completed());
        assert!(!task.is_late(today));
    }

    #[test]
    fn test_no_due_date_is_never_late() {
        let today = date(2025, 6, 10);
        let task = Task::new("Backlog item");
        assert!(!task.is_late(today));
        assert!(!task.is_due_this_week(today));
    }

    #[test]
    fn test_iso_week_boundaries() {
        // 2025-06-10 is a Tuesday; its ISO week runs Mon 06-09 .. Sun 06-15.
        let today = date(2025, 6, 10);
        let mut task = Task::new("Weekly sync prep");

        task.due_date = Some(date(2025, 6, 9));
        assert!(task.is_due_this_week(today));

        task.due_date = Some(date(2025, 6, 15));
        assert!(task.is_due_this_week(today));

        task.due_date = Some(date(2025, 6, 16));
        assert!(!task.is_due_this_week(today));
        assert!(task.is_due_next_week(today));
    }

    #[test]
    fn test_priority_rank_ordering() {
        let mut task = Task::new("t");
        task.priority = "High".to_string();
        assert_eq!(task.priority_rank(), 0);
        task.priority = "Medium".to_string();
        assert_eq!(task.priority_rank(), 1);
        task.priority = "Low".to_string();
        assert_eq!(task.priority_rank(), 2);
        task.priority = NOT_SET.to_string();
        assert_eq!(task.priority_rank(), 3);
    }

    #[test]
    fn test_owner_matching_is_case_insensitive() {
        let mut task = Task::new("t");
        task.owners = vec!["Alice Johnson".to_string(), "Bob".to_string()];
        assert!(task.is_owned_by("alice"));
        assert!(task.is_owned_by("Bob"));
        assert!(!task.is_owned_by("carol"));
    }
}
