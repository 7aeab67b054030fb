//! Wire models for the student-facing endpoints
//!
//! Everything optional on the server side is optional here, and list fields
//! default to empty, so older or newer server versions still decode.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// The signed-in user's profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub id: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub avatar_url: Option<String>,
}

/// A course the student is enrolled in
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Course {
    pub id: String,
    pub title: String,
    pub code: Option<String>,
    pub instructor: Option<String>,
    /// Completion (0.0 - 100.0)
    pub progress_percent: Option<f64>,
}

impl Course {
    /// True once progress reaches 100%
    pub fn is_complete(&self) -> bool {
        self.progress_percent.map_or(false, |p| p >= 100.0)
    }
}

/// Lifecycle of an assignment from the student's point of view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    #[default]
    Pending,
    Submitted,
    Graded,
    Late,
    /// Any status this client does not know about yet
    #[serde(other)]
    Unknown,
}

/// Coursework item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Assignment {
    pub id: String,
    pub course_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub due_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: AssignmentStatus,
    pub grade: Option<f64>,
}

impl Assignment {
    /// True if still open and past its due date at `now`
    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        self.status == AssignmentStatus::Pending && self.due_at.map_or(false, |due| due < now)
    }
}

/// Work handed in for an assignment
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Submission {
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachment_urls: Vec<String>,
}

impl Submission {
    /// Creates a text submission
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            attachment_urls: Vec::new(),
        }
    }

    /// Adds an attachment link
    pub fn with_attachment(mut self, url: impl Into<String>) -> Self {
        self.attachment_urls.push(url.into());
        self
    }
}

/// Server acknowledgement of a submission
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubmissionReceipt {
    pub id: String,
    pub assignment_id: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: AssignmentStatus,
}

/// Summary shown on the student home screen
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Dashboard {
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub upcoming_assignments: Vec<Assignment>,
    #[serde(default)]
    pub unread_messages: u32,
    pub next_live_session: Option<LiveSession>,
}

/// A learning-journal entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reflection {
    pub id: String,
    pub body: String,
    pub mood: Option<String>,
    pub course_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Payload for creating a reflection
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewReflection {
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
}

impl NewReflection {
    /// Creates a reflection with only a body
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            ..Self::default()
        }
    }

    /// Sets the mood tag
    pub fn with_mood(mut self, mood: impl Into<String>) -> Self {
        self.mood = Some(mood.into());
        self
    }

    /// Links the reflection to a course
    pub fn with_course(mut self, course_id: impl Into<String>) -> Self {
        self.course_id = Some(course_id.into());
        self
    }
}

/// Calendar entry (class, deadline, exam...)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub kind: Option<String>,
    pub course_id: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
}

impl CalendarEvent {
    /// UTC date the event starts on
    pub fn day(&self) -> NaiveDate {
        self.starts_at.date_naive()
    }
}

/// A chat thread
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Conversation {
    pub id: String,
    pub title: Option<String>,
    #[serde(default)]
    pub participants: Vec<String>,
    #[serde(default)]
    pub unread_count: u32,
    pub last_message_at: Option<DateTime<Utc>>,
}

impl Conversation {
    pub fn has_unread(&self) -> bool {
        self.unread_count > 0
    }
}

/// A chat message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: String,
    pub conversation_id: Option<String>,
    pub sender_id: Option<String>,
    pub body: String,
    pub sent_at: Option<DateTime<Utc>>,
}

/// Payload for sending a message
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewMessage {
    pub body: String,
}

/// A live class currently running
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LiveSession {
    pub id: String,
    pub title: String,
    pub course_id: Option<String>,
    pub host: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
}

/// What the server hands back when joining a live class
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JoinTicket {
    pub session_id: String,
    pub room: Option<String>,
    pub join_url: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// In-class signal sent by a student
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveSignal {
    RaiseHand,
    LowerHand,
    Reaction { emoji: String },
}

impl LiveSignal {
    /// Reaction signal
    pub fn reaction(emoji: impl Into<String>) -> Self {
        LiveSignal::Reaction {
            emoji: emoji.into(),
        }
    }

    /// Wire name of the signal type
    pub fn kind(&self) -> &'static str {
        match self {
            LiveSignal::RaiseHand => "raise_hand",
            LiveSignal::LowerHand => "lower_hand",
            LiveSignal::Reaction { .. } => "reaction",
        }
    }
}
