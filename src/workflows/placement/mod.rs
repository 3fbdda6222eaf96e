//! Internship placement coordination: allocation reads, proposal lifecycle,
//! request and application status machines, and the notification side
//! channel. Storage and outbound transports are consumed through the trait
//! seams in [`repository`].

pub mod access;
pub mod applications;
pub mod availability;
pub mod domain;
pub mod memory;
pub mod notify;
pub mod proposals;
pub mod repository;
pub mod requests;
pub mod router;

#[cfg(test)]
mod tests;

pub use access::Actor;
pub use applications::{ApplicationDesk, ApplicationView, BulkOutcome};
pub use availability::{AllocationResolver, Classmate, ClassmateListing, SupervisorSlot};
pub use domain::{
    ApplicationId, ApplicationStatus, InternshipRequest, Notification, NotificationId,
    NotificationKind, OfferApplication, ProposalDraft, ProposalId, ProposalStatus, RequestId,
    RequestStatus, RequestSubmission, ReviewState, ReviewStatus, Role, SubjectProposal, UserId,
    UserRecord,
};
pub use memory::MemoryStore;
pub use notify::{AdminContact, LoggingMessenger, NotificationCenter};
pub use proposals::{ProposalDesk, ProposalView, ReviewDecision};
pub use repository::{
    ActiveClaims, ApplicationRepository, ChannelError, EmailMessage, Messenger,
    NotificationRepository, ProposalRepository, RequestRepository, SmsMessage, StoreError,
    UserDirectory,
};
pub use requests::{RequestDesk, RequestView};
pub use router::{placement_router, PlacementState};

/// Error raised by the placement services; each variant maps to one
/// machine-checkable boundary outcome.
#[derive(Debug, thiserror::Error)]
pub enum PlacementError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("store failure: {0}")]
    Store(String),
}

impl From<StoreError> for PlacementError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Conflict(message) => Self::Conflict(message),
            StoreError::NotFound => Self::NotFound("record"),
            StoreError::Unavailable(message) => Self::Store(message),
        }
    }
}
