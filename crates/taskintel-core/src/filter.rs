//! Projection of the cached snapshot down to the tasks an intent asks for,
//! plus the uniform report ordering.

use crate::intent::{Intent, IntentKind, Timeframe};
use crate::task::Task;
use chrono::NaiveDate;

/// Select the subset of `tasks` relevant to `intent`, in report order.
///
/// Output is always a subset of the input; no task is fabricated or
/// mutated. Social intents select nothing (their reports carry no tasks).
pub fn select(tasks: &[Task], intent: &Intent, today: NaiveDate) -> Vec<Task> {
    let mut selected: Vec<Task> = tasks
        .iter()
        .filter(|task| matches_intent(task, intent, today))
        .cloned()
        .collect();
    sort_tasks(&mut selected);
    selected
}

fn matches_intent(task: &Task, intent: &Intent, today: NaiveDate) -> bool {
    let primary = match intent.kind {
        IntentKind::Greeting | IntentKind::Thanks | IntentKind::Help => false,
        IntentKind::Overview => true,
        IntentKind::Person => intent
            .person
            .as_deref()
            .is_some_and(|p| task.is_owned_by(p)),
        IntentKind::Department => intent
            .department
            .as_deref()
            .is_some_and(|d| task.department.eq_ignore_ascii_case(d)),
        IntentKind::Status => intent
            .status
            .as_deref()
            .is_some_and(|s| matches_status(task, s)),
        IntentKind::Priority => intent
            .priority
            .as_deref()
            .map_or(task.priority_rank() == 0, |p| matches_priority(task, p)),
        IntentKind::Timeframe => intent
            .timeframe
            .is_some_and(|tf| matches_timeframe(task, tf, today)),
    };
    if !primary {
        return false;
    }

    // Secondary slots narrow the primary predicate when present.
    if intent.kind == IntentKind::Timeframe {
        if let Some(person) = intent.person.as_deref() {
            return task.is_owned_by(person);
        }
        if let Some(dept) = intent.department.as_deref() {
            return task.department.eq_ignore_ascii_case(dept);
        }
    }
    if intent.kind == IntentKind::Person {
        if let Some(tf) = intent.timeframe {
            return matches_timeframe(task, tf, today);
        }
    }
    true
}

fn matches_status(task: &Task, wanted: &str) -> bool {
    // "Blocked" and "Done" are semantic categories, not literal labels.
    if wanted.eq_ignore_ascii_case("blocked") {
        return task.has_blocker() || task.status.to_lowercase().contains("block");
    }
    if wanted.eq_ignore_ascii_case("done") {
        return task.is_completed();
    }
    task.status.to_lowercase().contains(&wanted.to_lowercase())
}

fn matches_priority(task: &Task, wanted: &str) -> bool {
    // "High" is the top rank as a category, so "Urgent" labels count too.
    if wanted.eq_ignore_ascii_case("high") {
        return task.priority_rank() == 0;
    }
    task.priority.to_lowercase().contains(&wanted.to_lowercase())
}

fn matches_timeframe(task: &Task, timeframe: Timeframe, today: NaiveDate) -> bool {
    match timeframe {
        Timeframe::ThisWeek => task.is_due_this_week(today),
        Timeframe::NextWeek => task.is_due_next_week(today),
        Timeframe::Overdue => task.is_late(today),
    }
}

/// Stable report ordering: priority rank ascending, then due date ascending
/// with undated tasks last. Ties keep fetch order.
pub fn sort_tasks(tasks: &mut [Task]) {
    tasks.sort_by_key(|task| (task.priority_rank(), task.due_date.unwrap_or(NaiveDate::MAX)));
}
