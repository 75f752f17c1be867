//! Rendering of (intent, filtered tasks) into the bounded chat report.
//!
//! Output is deterministic for a given input: counts are accumulated in
//! ordered maps, dates render as ISO `YYYY-MM-DD`, and there is no locale
//! or randomness anywhere. Reports never exceed the display cap; overflow
//! is summarized in an explicit trailer.

use crate::intent::{Intent, IntentKind, Timeframe};
use crate::task::{NO_BLOCKER, NOT_SET, NOT_SPECIFIED, Task};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Default maximum number of rendered items per report section.
pub const DEFAULT_DISPLAY_CAP: usize = 6;

/// Bounded-length report renderer.
#[derive(Debug, Clone)]
pub struct Formatter {
    max_items: usize,
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new(DEFAULT_DISPLAY_CAP)
    }
}

impl Formatter {
    pub fn new(max_items: usize) -> Self {
        Self {
            max_items: max_items.max(1),
        }
    }

    /// Render the final report.
    ///
    /// `snapshot_len` is the size of the full cached snapshot the selection
    /// was made from; zero means no data could be retrieved at all, which
    /// gets its own explicit report rather than a blank one.
    pub fn render(
        &self,
        intent: &Intent,
        tasks: &[Task],
        snapshot_len: usize,
        today: NaiveDate,
    ) -> String {
        match intent.kind {
            IntentKind::Greeting => {
                "👋 Hello! Ask me what anyone is working on, or try `brief` for a company overview."
                    .to_string()
            }
            IntentKind::Thanks => "🙌 Anytime!".to_string(),
            IntentKind::Help => self.render_help(snapshot_len),
            _ if snapshot_len == 0 => {
                "📊 No task data could be retrieved right now. The task sources may be \
                 unreachable — please try again in a minute."
                    .to_string()
            }
            IntentKind::Overview => self.render_overview(tasks),
            IntentKind::Person => self.render_person(intent, tasks, today),
            IntentKind::Department => self.render_listing(
                &format!("🏢 **{} Tasks**", intent.department.as_deref().unwrap_or("Department")),
                tasks,
                today,
            ),
            IntentKind::Status => self.render_listing(
                &format!("🔄 **{} Tasks**", intent.status.as_deref().unwrap_or("Status")),
                tasks,
                today,
            ),
            IntentKind::Priority => self.render_listing("🔥 **High Priority Tasks**", tasks, today),
            IntentKind::Timeframe => {
                let header = match intent.timeframe {
                    Some(Timeframe::Overdue) => "⏰ **Overdue Tasks**",
                    Some(Timeframe::NextWeek) => "📅 **Due Next Week**",
                    _ => "📅 **Due This Week**",
                };
                self.render_listing(header, tasks, today)
            }
        }
    }

    fn render_help(&self, task_count: usize) -> String {
        format!(
            "🤖 **Task Intel Bot**\n\n\
             **Natural language queries:**\n\
             • `what is alice working on?`\n\
             • `show me omar's tasks`\n\
             • `what are the top priorities?`\n\
             • `what is overdue?`\n\n\
             **Quick commands:**\n\
             • `brief` — company overview\n\
             • `help` — this message\n\n\
             📈 Live data: {task_count} tasks tracked"
        )
    }

    fn render_person(&self, intent: &Intent, tasks: &[Task], today: NaiveDate) -> String {
        let person = intent.person.as_deref().unwrap_or("Unknown");
        if tasks.is_empty() {
            return format!("👤 No tasks found for **{person}**.");
        }

        let mut out = format!("👤 **{person}'s Tasks**\n\n");
        self.push_items(&mut out, tasks, today);

        let mut dept_counts: BTreeMap<&str, usize> = BTreeMap::new();
        for task in tasks {
            *dept_counts.entry(task.department.as_str()).or_insert(0) += 1;
        }
        let dept_summary = dept_counts
            .iter()
            .map(|(dept, count)| format!("{dept}: {count}"))
            .collect::<Vec<_>>()
            .join(" • ");
        let _ = write!(
            out,
            "\n📊 **Summary:** {} tasks ({})",
            tasks.len(),
            dept_summary
        );
        out
    }

    fn render_overview(&self, tasks: &[Task]) -> String {
        let mut dept_counts: BTreeMap<&str, usize> = BTreeMap::new();
        let mut status_counts: BTreeMap<&str, usize> = BTreeMap::new();
        let mut people: Vec<&str> = Vec::new();
        for task in tasks {
            *dept_counts.entry(task.department.as_str()).or_insert(0) += 1;
            *status_counts.entry(task.status.as_str()).or_insert(0) += 1;
            for owner in &task.owners {
                if !people.contains(&owner.as_str()) {
                    people.push(owner);
                }
            }
        }
        people.sort_unstable();

        let mut out = String::from("🏢 **Company Brief**\n\n📈 **By Department:**\n");
        for (dept, count) in &dept_counts {
            let _ = writeln!(out, "• {dept}: {count} tasks");
        }
        out.push_str("\n🔄 **By Status:**\n");
        for (status, count) in &status_counts {
            let _ = writeln!(out, "• {}: {count} tasks", humanize(status));
        }
        if !people.is_empty() {
            let _ = write!(
                out,
                "\n👥 **Team members with tasks:** {}",
                people.join(", ")
            );
        }
        let _ = write!(out, "\n\n📊 **Total:** {} tasks", tasks.len());
        out
    }

    fn render_listing(&self, header: &str, tasks: &[Task], today: NaiveDate) -> String {
        if tasks.is_empty() {
            return format!("{header}\n\nNothing matching right now. 🎉");
        }
        let mut out = format!("{header}\n\n");
        self.push_items(&mut out, tasks, today);
        let _ = write!(out, "\n📊 **Total:** {} tasks", tasks.len());
        out
    }

    fn push_items(&self, out: &mut String, tasks: &[Task], today: NaiveDate) {
        for (i, task) in tasks.iter().take(self.max_items).enumerate() {
            let late_marker = if task.is_late(today) { " ⚠️" } else { "" };
            let _ = writeln!(out, "**{}. {}**{late_marker}", i + 1, task.name);
            let _ = writeln!(
                out,
                "   Owner: {} | Status: {} | Due: {}",
                if task.owners.is_empty() {
                    "unassigned".to_string()
                } else {
                    task.owners.join(", ")
                },
                humanize(&task.status),
                render_due(task.due_date),
            );
            let _ = writeln!(out, "   Next: {}", humanize(&task.next_step));
            let _ = writeln!(
                out,
                "   Blocker: {} | Priority: {}",
                humanize(&task.blocker),
                humanize(&task.priority),
            );
        }
        if tasks.len() > self.max_items {
            let _ = writeln!(out, "…and {} more", tasks.len() - self.max_items);
        }
    }
}

/// Replace internal sentinel values with human-readable labels.
fn humanize(value: &str) -> &str {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed == NOT_SET {
        "not set"
    } else if trimmed == NOT_SPECIFIED {
        "not specified"
    } else if trimmed == NO_BLOCKER {
        "none"
    } else {
        trimmed
    }
}

fn render_due(due: Option<NaiveDate>) -> String {
    match due {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => "no date".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2025, 6, 10)
    }

    fn tasks(n: usize) -> Vec<Task> {
        (0..n)
            .map(|i| {
                let mut t = Task::new(format!("Task {i}"));
                t.owners = vec!["Alice".to_string()];
                t.department = "Tech".to_string();
                t
            })
            .collect()
    }

    #[test]
    fn test_display_cap_and_trailer() {
        let formatter = Formatter::new(6);
        let intent = Intent::new(IntentKind::Person, 0.9).with_person("Alice");
        let report = formatter.render(&intent, &tasks(12), 12, today());

        let rendered_items = report.matches("   Next:").count();
        assert_eq!(rendered_items, 6);
        assert!(report.contains("…and 6 more"));
    }

    #[test]
    fn test_no_trailer_at_or_under_cap() {
        let formatter = Formatter::new(6);
        let intent = Intent::new(IntentKind::Person, 0.9).with_person("Alice");
        let report = formatter.render(&intent, &tasks(6), 6, today());
        assert!(!report.contains("…and"));
    }

    #[test]
    fn test_empty_snapshot_reports_no_data() {
        let formatter = Formatter::default();
        let intent = Intent::new(IntentKind::Overview, 1.0);
        let report = formatter.render(&intent, &[], 0, today());
        assert!(report.contains("No task data could be retrieved"));
    }

    #[test]
    fn test_empty_selection_with_data_is_not_the_failure_report() {
        let formatter = Formatter::default();
        let intent = Intent::new(IntentKind::Status, 0.8).with_status("Blocked");
        let report = formatter.render(&intent, &[], 42, today());
        assert!(!report.contains("No task data could be retrieved"));
        assert!(report.contains("Nothing matching"));
    }

    #[test]
    fn test_sentinels_are_humanized() {
        let formatter = Formatter::default();
        let intent = Intent::new(IntentKind::Person, 0.9).with_person("Alice");
        let report = formatter.render(&intent, &tasks(1), 1, today());
        assert!(report.contains("Status: not set"));
        assert!(report.contains("Next: not specified"));
        assert!(report.contains("Blocker: none"));
        assert!(!report.contains("Not specified"));
    }

    #[test]
    fn test_overdue_marker() {
        let formatter = Formatter::default();
        let mut overdue = tasks(1);
        overdue[0].due_date = Some(date(2025, 6, 1));
        overdue[0].status = "In progress".to_string();
        let intent = Intent::new(IntentKind::Person, 0.9).with_person("Alice");
        let report = formatter.render(&intent, &overdue, 1, today());
        assert!(report.contains("⚠️"));
        assert!(report.contains("Due: 2025-06-01"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let formatter = Formatter::default();
        let intent = Intent::new(IntentKind::Overview, 1.0);
        let ts = tasks(5);
        assert_eq!(
            formatter.render(&intent, &ts, 5, today()),
            formatter.render(&intent, &ts, 5, today())
        );
    }

    #[test]
    fn test_greeting_and_thanks_bodies() {
        let formatter = Formatter::default();
        let greeting = formatter.render(&Intent::new(IntentKind::Greeting, 1.0), &[], 0, today());
        assert!(greeting.contains("Hello"));
        let thanks = formatter.render(&Intent::new(IntentKind::Thanks, 1.0), &[], 0, today());
        assert!(thanks.contains("Anytime"));
    }
}
