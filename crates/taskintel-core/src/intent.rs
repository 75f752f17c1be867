//! Classified query intents.

use serde::{Deserialize, Serialize};

/// What a query is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    /// Social: a greeting, no data requested.
    Greeting,
    /// Social: thanks/acknowledgment.
    Thanks,
    /// An explicit request for usage help.
    Help,
    /// Company-wide brief. Also the fallback when nothing else matches.
    Overview,
    /// Tasks owned by a specific person.
    Person,
    /// Tasks belonging to one department collection.
    Department,
    /// Tasks in a given status category (blocked, in progress, to do, done).
    Status,
    /// High-priority tasks.
    Priority,
    /// Tasks selected by a deadline window.
    Timeframe,
}

/// Deadline windows a query can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timeframe {
    ThisWeek,
    NextWeek,
    Overdue,
}

/// A classified query: the intent tag plus any extracted slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub kind: IntentKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<Timeframe>,
    /// How certain the rule that produced this intent is, in `0.0..=1.0`.
    pub confidence: f32,
}

impl Intent {
    /// Bare intent of the given kind with no slots filled.
    pub fn new(kind: IntentKind, confidence: f32) -> Self {
        Self {
            kind,
            person: None,
            department: None,
            status: None,
            priority: None,
            timeframe: None,
            confidence,
        }
    }

    /// The fallback intent used when no classification rule matches.
    pub fn overview_fallback() -> Self {
        Self::new(IntentKind::Overview, 0.3)
    }

    pub fn with_person(mut self, person: impl Into<String>) -> Self {
        self.person = Some(person.into());
        self
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    pub fn with_timeframe(mut self, timeframe: Timeframe) -> Self {
        self.timeframe = Some(timeframe);
        self
    }
}
