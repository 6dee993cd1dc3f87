use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const PRIORITY_MIN: i64 = 1;
pub const PRIORITY_MAX: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    NotApplied,
    Applied,
    Interviewing,
    Offer,
    Rejected,
}

impl ApplicationStatus {
    pub const ALL: [Self; 5] = [
        Self::NotApplied,
        Self::Applied,
        Self::Interviewing,
        Self::Offer,
        Self::Rejected,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotApplied => "not_applied",
            Self::Applied => "applied",
            Self::Interviewing => "interviewing",
            Self::Offer => "offer",
            Self::Rejected => "rejected",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::NotApplied => "Not Applied",
            Self::Applied => "Applied",
            Self::Interviewing => "Interviewing",
            Self::Offer => "Offer",
            Self::Rejected => "Rejected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReachOutStatus {
    NotContacted,
    Contacted,
    Responded,
    MeetingScheduled,
    Met,
}

impl ReachOutStatus {
    pub const ALL: [Self; 5] = [
        Self::NotContacted,
        Self::Contacted,
        Self::Responded,
        Self::MeetingScheduled,
        Self::Met,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotContacted => "not_contacted",
            Self::Contacted => "contacted",
            Self::Responded => "responded",
            Self::MeetingScheduled => "meeting_scheduled",
            Self::Met => "met",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::NotContacted => "Not Contacted",
            Self::Contacted => "Contacted",
            Self::Responded => "Responded",
            Self::MeetingScheduled => "Meeting Scheduled",
            Self::Met => "Met",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalKind {
    JobApplications,
    Networking,
    Other,
}

impl GoalKind {
    pub const ALL: [Self; 3] = [Self::JobApplications, Self::Networking, Self::Other];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::JobApplications => "job_applications",
            Self::Networking => "networking",
            Self::Other => "other",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::JobApplications => "Job Applications",
            Self::Networking => "Networking",
            Self::Other => "Other",
        }
    }
}

/// A job application row from the `jobs` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub id: Uuid,
    pub company: String,
    pub position: String,
    pub status: ApplicationStatus,
    pub date_applied: DateTime<Utc>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub user_id: Uuid,
}

/// A networking contact row from the `connections` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub id: Uuid,
    pub name: String,
    pub company: String,
    pub position: String,
    pub reach_out_status: ReachOutStatus,
    #[serde(default)]
    pub profile_link: Option<String>,
    pub priority: i64,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub user_id: Uuid,
}

/// A daily goal row from the `daily_goals` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub id: Uuid,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: GoalKind,
    pub target_count: i64,
    pub current_count: i64,
    #[serde(default)]
    pub linked_items: Option<Vec<String>>,
    pub date: NaiveDate,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub user_id: Uuid,
}

/// Trims a required text field, rejecting blank input.
pub fn required_text(value: &str, field: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{field} is required"));
    }
    Ok(trimmed.to_string())
}

/// Collapses an optional text field to `None` when blank.
pub fn optional_text(value: Option<String>) -> Option<String> {
    value.and_then(|text| {
        let trimmed = text.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}
