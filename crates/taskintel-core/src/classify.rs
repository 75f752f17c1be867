//! Deterministic intent classification.
//!
//! This is intentionally not an NLU system. Classification is an ordered
//! list of vocabulary rules evaluated against the lower-cased query; the
//! first rule that matches wins, and every tie is broken by the fixed rule
//! order below:
//!
//! 1. follow-up phrase with live conversation context
//! 2. social phrases (greeting, thanks, help)
//! 3. timeframe phrases, optionally combined with a person/department slot
//! 4. person-name substring against the roster, optionally + weekly phrase
//! 5. department vocabulary
//! 6. category vocabularies (blocked, priority, in progress, to do, done,
//!    company brief)
//! 7. fallback: low-confidence overview
//!
//! Empty input always yields the overview intent. Classification never
//! fails; ambiguity resolves to the fallback, not an error.

use crate::context::ContextStore;
use crate::intent::{Intent, IntentKind, Timeframe};
use crate::roster::Roster;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

/// Short phrases that reference the remembered subject instead of naming it.
const FOLLOW_UP_PHRASES: &[&str] = &[
    "pipeline",
    "blockers",
    "blocker",
    "all tasks",
    "impact",
    "next steps",
    "what else",
    "anything else",
];

/// A follow-up must be short; anything longer carries its own subject.
const FOLLOW_UP_TOKEN_BUDGET: usize = 4;

/// Greetings matched by exact equality (too short for safe substring use).
const GREETING_EXACT: &[&str] = &["hi", "hey", "yo", "hiya", "hello"];
/// Greetings safe to match as substrings.
const GREETING_SUBSTR: &[&str] = &["good morning", "good afternoon", "good evening"];

const THANKS_PHRASES: &[&str] = &["thank", "thanks", "thx", "appreciate"];

const HELP_PHRASES: &[&str] = &["help", "how do i", "what can you do", "usage"];

/// Phrases that, combined with a person match, narrow to the current week.
const WEEKLY_PHRASES: &[&str] = &["week", "due", "deadline"];

const BLOCKED_PHRASES: &[&str] = &["blocked", "stuck", "blocker"];
const PRIORITY_PHRASES: &[&str] = &["priority", "priorities", "urgent", "important"];
const IN_PROGRESS_PHRASES: &[&str] = &["in progress", "working on", "ongoing", "active"];
const TODO_PHRASES: &[&str] = &["to do", "todo", "not started", "backlog"];
const DONE_PHRASES: &[&str] = &["done", "completed", "finished", "shipped"];
const BRIEF_PHRASES: &[&str] = &["brief", "overview", "summary", "company"];

/// Department synonyms applied when the canonical department is configured.
const DEPARTMENT_SYNONYMS: &[(&str, &str)] = &[
    ("ops", "Operations"),
    ("engineering", "Tech"),
    ("sales", "Commercial"),
    ("money", "Finance"),
];

/// Rule-list classifier over a fixed roster and department set.
pub struct Classifier {
    roster: Roster,
    departments: Vec<String>,
    context: Arc<ContextStore>,
}

impl Classifier {
    pub fn new(roster: Roster, departments: Vec<String>, context: Arc<ContextStore>) -> Self {
        Self {
            roster,
            departments,
            context,
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Classify a free-text query for a given user.
    ///
    /// Always returns exactly one intent; never panics, never errors.
    pub fn classify(&self, query: &str, user_id: &str, now: DateTime<Utc>) -> Intent {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Intent::new(IntentKind::Overview, 1.0);
        }

        // Follow-ups only read context; they never rebind the subject.
        if let Some(intent) = self.match_follow_up(&query, user_id, now) {
            debug!(kind = ?intent.kind, "Resolved follow-up from context");
            return intent;
        }

        let intent = self
            .match_social(&query)
            .or_else(|| self.match_timeframe(&query))
            .or_else(|| self.match_person(&query))
            .or_else(|| self.match_department(&query))
            .or_else(|| self.match_category(&query))
            .unwrap_or_else(Intent::overview_fallback);

        // A fresh person match becomes the remembered subject for follow-ups.
        if let Some(person) = &intent.person {
            if intent.kind != IntentKind::Overview {
                self.context.remember(user_id, person, now);
            }
        }

        debug!(kind = ?intent.kind, confidence = intent.confidence, "Classified query");
        intent
    }

    /// Rule 1: short follow-up phrase resolved via remembered context.
    fn match_follow_up(&self, query: &str, user_id: &str, now: DateTime<Utc>) -> Option<Intent> {
        if query.split_whitespace().count() > FOLLOW_UP_TOKEN_BUDGET {
            return None;
        }
        if !FOLLOW_UP_PHRASES.iter().any(|p| query.contains(p)) {
            return None;
        }
        let subject = self.context.recall(user_id, now)?;
        Some(Intent::new(IntentKind::Person, 0.9).with_person(subject))
    }

    /// Rule 2: greeting, thanks, help.
    fn match_social(&self, query: &str) -> Option<Intent> {
        if GREETING_EXACT.iter().any(|p| query == *p)
            || GREETING_SUBSTR.iter().any(|p| query.contains(p))
        {
            return Some(Intent::new(IntentKind::Greeting, 1.0));
        }
        if THANKS_PHRASES.iter().any(|p| query.contains(p)) {
            return Some(Intent::new(IntentKind::Thanks, 1.0));
        }
        if HELP_PHRASES.iter().any(|p| query.contains(p)) {
            return Some(Intent::new(IntentKind::Help, 1.0));
        }
        None
    }

    /// Rule 3: explicit timeframe, optionally narrowed by person/department.
    fn match_timeframe(&self, query: &str) -> Option<Intent> {
        let timeframe = if query.contains("overdue") || query.contains("late") {
            Timeframe::Overdue
        } else if query.contains("next week") {
            Timeframe::NextWeek
        } else if query.contains("this week") || query.contains("due soon") {
            Timeframe::ThisWeek
        } else {
            return None;
        };

        let mut intent = Intent::new(IntentKind::Timeframe, 0.85).with_timeframe(timeframe);
        if let Some(person) = self.roster.find_in_query(query) {
            intent = intent.with_person(person);
        } else if let Some(dept) = self.find_department(query) {
            intent = intent.with_department(dept);
        }
        Some(intent)
    }

    /// Rule 4: person named in the query.
    fn match_person(&self, query: &str) -> Option<Intent> {
        let person = self.roster.find_in_query(query)?;
        let mut intent = Intent::new(IntentKind::Person, 0.9).with_person(person);
        if WEEKLY_PHRASES.iter().any(|p| query.contains(p)) {
            intent = intent.with_timeframe(Timeframe::ThisWeek);
        }
        Some(intent)
    }

    /// Rule 5: department named in the query.
    fn match_department(&self, query: &str) -> Option<Intent> {
        let dept = self.find_department(query)?;
        Some(Intent::new(IntentKind::Department, 0.85).with_department(dept))
    }

    /// Rule 6: status/priority category or an explicit company brief.
    fn match_category(&self, query: &str) -> Option<Intent> {
        if BLOCKED_PHRASES.iter().any(|p| query.contains(p)) {
            return Some(Intent::new(IntentKind::Status, 0.8).with_status("Blocked"));
        }
        if PRIORITY_PHRASES.iter().any(|p| query.contains(p)) {
            return Some(Intent::new(IntentKind::Priority, 0.8).with_priority("High"));
        }
        if IN_PROGRESS_PHRASES.iter().any(|p| query.contains(p)) {
            return Some(Intent::new(IntentKind::Status, 0.8).with_status("In progress"));
        }
        if TODO_PHRASES.iter().any(|p| query.contains(p)) {
            return Some(Intent::new(IntentKind::Status, 0.8).with_status("Not started"));
        }
        if DONE_PHRASES.iter().any(|p| query.contains(p)) {
            return Some(Intent::new(IntentKind::Status, 0.8).with_status("Done"));
        }
        if BRIEF_PHRASES.iter().any(|p| query.contains(p)) {
            return Some(Intent::new(IntentKind::Overview, 0.8));
        }
        None
    }

    fn find_department(&self, query: &str) -> Option<String> {
        for dept in &self.departments {
            if query.contains(&dept.to_lowercase()) {
                return Some(dept.clone());
            }
        }
        for (synonym, canonical) in DEPARTMENT_SYNONYMS {
            if query.contains(synonym) && self.departments.iter().any(|d| d == canonical) {
                return Some((*canonical).to_string());
            }
        }
        None
    }
}
