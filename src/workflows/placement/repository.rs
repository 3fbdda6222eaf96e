use serde::{Deserialize, Serialize};

use super::domain::{
    ApplicationId, ApplicationStatus, InternshipRequest, Notification, NotificationId,
    OfferApplication, ProposalId, RequestId, RequestStatus, SubjectProposal, UserId, UserRecord,
};

/// Error enumeration for store failures, as surfaced by the query executor.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Read-only lookup over registered users.
pub trait UserDirectory: Send + Sync {
    fn fetch(&self, id: &UserId) -> Result<Option<UserRecord>, StoreError>;
    /// Students sharing the given cohort, in no particular order.
    fn students_in_classe(&self, classe: &str) -> Result<Vec<UserRecord>, StoreError>;
    fn teachers(&self) -> Result<Vec<UserRecord>, StoreError>;
}

/// Storage seam for subject proposals.
pub trait ProposalRepository: Send + Sync {
    fn insert(&self, proposal: SubjectProposal) -> Result<SubjectProposal, StoreError>;
    fn update(&self, proposal: SubjectProposal) -> Result<(), StoreError>;
    fn delete(&self, id: &ProposalId) -> Result<(), StoreError>;
    fn fetch(&self, id: &ProposalId) -> Result<Option<SubjectProposal>, StoreError>;
    /// The teacher's single non-archived proposal, if any.
    fn active_for_teacher(&self, teacher: &UserId) -> Result<Option<SubjectProposal>, StoreError>;
    fn list_for_teacher(&self, teacher: &UserId) -> Result<Vec<SubjectProposal>, StoreError>;
    fn list_all(&self) -> Result<Vec<SubjectProposal>, StoreError>;
}

/// Supervisors, partners, and owners referenced by requests whose status
/// still claims them (pending or approved).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveClaims {
    pub supervisors: Vec<UserId>,
    pub partners: Vec<UserId>,
    pub owners: Vec<UserId>,
}

impl ActiveClaims {
    pub fn claims_supervisor(&self, teacher: &UserId) -> bool {
        self.supervisors.contains(teacher)
    }

    pub fn claims_partner(&self, student: &UserId) -> bool {
        self.partners.contains(student)
    }

    pub fn claims_owner(&self, student: &UserId) -> bool {
        self.owners.contains(student)
    }
}

/// Storage seam for internship requests.
///
/// `insert` is the atomic conditional write: the implementation must verify,
/// under the same atomic unit as the insert, that the submission's
/// supervisor, partner, and owner are not already claimed by a request whose
/// status is pending or approved, and fail with [`StoreError::Conflict`]
/// otherwise. Two concurrent submissions naming the same resource therefore
/// yield exactly one stored request.
pub trait RequestRepository: Send + Sync {
    fn insert(&self, request: InternshipRequest) -> Result<InternshipRequest, StoreError>;
    fn set_status(&self, id: &RequestId, status: RequestStatus) -> Result<(), StoreError>;
    fn fetch(&self, id: &RequestId) -> Result<Option<InternshipRequest>, StoreError>;
    fn list_for_student(&self, student: &UserId) -> Result<Vec<InternshipRequest>, StoreError>;
    fn list_all(&self) -> Result<Vec<InternshipRequest>, StoreError>;
    fn active_claims(&self) -> Result<ActiveClaims, StoreError>;
}

/// Storage seam for offer applications.
///
/// `insert` must reject a duplicate (offer_id, applicant_id) pair with
/// [`StoreError::Conflict`].
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, application: OfferApplication) -> Result<OfferApplication, StoreError>;
    fn set_status(&self, id: &ApplicationId, status: ApplicationStatus) -> Result<(), StoreError>;
    fn delete(&self, id: &ApplicationId) -> Result<(), StoreError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<OfferApplication>, StoreError>;
    fn list_for_student(&self, student: &UserId) -> Result<Vec<OfferApplication>, StoreError>;
    fn list_all(&self) -> Result<Vec<OfferApplication>, StoreError>;
}

/// Storage seam for notification rows.
pub trait NotificationRepository: Send + Sync {
    fn insert(&self, notification: Notification) -> Result<Notification, StoreError>;
    fn fetch(&self, id: &NotificationId) -> Result<Option<Notification>, StoreError>;
    /// Recipient's notifications, newest first.
    fn list_for_user(&self, user: &UserId) -> Result<Vec<Notification>, StoreError>;
    fn mark_read(&self, id: &NotificationId) -> Result<(), StoreError>;
}

/// Outbound email payload handed to the messenger adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: Option<String>,
}

/// Outbound SMS payload handed to the messenger adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsMessage {
    pub to: String,
    pub body: String,
}

/// Transport error for the best-effort channels.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("channel transport unavailable: {0}")]
    Transport(String),
}

/// Trait describing outbound email/SMS hooks. Both channels are best-effort;
/// callers log and swallow errors.
pub trait Messenger: Send + Sync {
    fn send_email(&self, message: EmailMessage) -> Result<(), ChannelError>;
    fn send_sms(&self, message: SmsMessage) -> Result<(), ChannelError>;
}
