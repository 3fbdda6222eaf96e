use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for registered users.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Identifier wrapper for subject proposals.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProposalId(pub String);

/// Identifier wrapper for internship requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub String);

/// Identifier wrapper for offer applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Identifier wrapper for notification rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationId(pub String);

/// Role assigned at registration; immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Teacher,
    Admin,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Admin => "admin",
        }
    }
}

/// Directory entry for a registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub display_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    /// Student cohort; `None` for teachers, admins, and unassigned students.
    pub classe: Option<String>,
}

/// Lifecycle status of a subject proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    Available,
    Assigned,
    Archived,
}

impl ProposalStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ProposalStatus::Available => "available",
            ProposalStatus::Assigned => "assigned",
            ProposalStatus::Archived => "archived",
        }
    }
}

/// Administrator review verdict on a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
}

impl ReviewStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Approved => "approved",
            ReviewStatus::Rejected => "rejected",
        }
    }
}

/// Review metadata attached to a proposal. Approval stamps and rejection
/// reason are mutually exclusive across transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewState {
    pub status: ReviewStatus,
    pub approved_by: Option<UserId>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
}

impl ReviewState {
    pub const fn pending() -> Self {
        Self {
            status: ReviewStatus::Pending,
            approved_by: None,
            approved_at: None,
            rejection_reason: None,
        }
    }

    pub fn approved(by: UserId, at: DateTime<Utc>) -> Self {
        Self {
            status: ReviewStatus::Approved,
            approved_by: Some(by),
            approved_at: Some(at),
            rejection_reason: None,
        }
    }

    pub fn rejected(reason: Option<String>) -> Self {
        Self {
            status: ReviewStatus::Rejected,
            approved_by: None,
            approved_at: None,
            rejection_reason: reason,
        }
    }
}

/// Fields a teacher supplies when submitting or editing a proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalDraft {
    pub subject_title: String,
    pub description: String,
}

/// A teacher's supervision offer. At most one non-archived row per teacher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectProposal {
    pub id: ProposalId,
    pub teacher_id: UserId,
    pub subject_title: String,
    pub description: String,
    pub status: ProposalStatus,
    pub review: ReviewState,
    pub submitted_at: DateTime<Utc>,
}

impl SubjectProposal {
    /// Non-archived proposals block the teacher from submitting another.
    pub fn is_active(&self) -> bool {
        self.status != ProposalStatus::Archived
    }
}

/// Decision status of an internship request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub const fn label(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }

    /// Requests in these states claim their supervisor and partner.
    pub const fn claims_resources(self) -> bool {
        matches!(self, RequestStatus::Pending | RequestStatus::Approved)
    }
}

/// Fields a student supplies when submitting an internship request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSubmission {
    pub student_name: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub company: String,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
    pub partner_id: Option<UserId>,
    pub supervisor_id: Option<UserId>,
}

/// A student's internship request. Never deleted; status mutated by admin only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternshipRequest {
    pub id: RequestId,
    pub student_id: UserId,
    pub student_name: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub company: String,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
    pub partner_id: Option<UserId>,
    pub supervisor_id: Option<UserId>,
    /// Display name captured when the request was written, so later profile
    /// edits do not rewrite history.
    pub supervisor_name: Option<String>,
    pub status: RequestStatus,
    pub submitted_at: DateTime<Utc>,
}

/// Decision status of an offer application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

/// A student's application to a published internship offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferApplication {
    pub id: ApplicationId,
    pub offer_id: String,
    pub applicant_id: UserId,
    pub status: ApplicationStatus,
    pub submitted_at: DateTime<Utc>,
}

/// Categories the state machines stamp on emitted notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    ProposalReview,
    ProposalStatus,
    RequestDecision,
    ApplicationDecision,
}

impl NotificationKind {
    pub const fn label(self) -> &'static str {
        match self {
            NotificationKind::ProposalReview => "proposal_review",
            NotificationKind::ProposalStatus => "proposal_status",
            NotificationKind::RequestDecision => "request_decision",
            NotificationKind::ApplicationDecision => "application_decision",
        }
    }
}

/// In-app notification row; created exclusively by the state machines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub link: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}
