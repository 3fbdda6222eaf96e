use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::access::{self, Actor};
use super::domain::{
    NotificationKind, ProposalDraft, ProposalId, ProposalStatus, ReviewState, ReviewStatus, Role,
    SubjectProposal,
};
use super::notify::NotificationCenter;
use super::repository::ProposalRepository;
use super::PlacementError;

static PROPOSAL_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_proposal_id() -> ProposalId {
    let id = PROPOSAL_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ProposalId(format!("prop-{id:06}"))
}

/// Administrator verdict on a submitted proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum ReviewDecision {
    Approve,
    Reject { reason: Option<String> },
}

/// Sanitized proposal representation returned over the boundary.
#[derive(Debug, Clone, Serialize)]
pub struct ProposalView {
    pub id: ProposalId,
    pub teacher_id: String,
    pub subject_title: String,
    pub description: String,
    pub status: &'static str,
    pub review: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

impl ProposalView {
    fn from_proposal(proposal: &SubjectProposal) -> Self {
        Self {
            id: proposal.id.clone(),
            teacher_id: proposal.teacher_id.0.clone(),
            subject_title: proposal.subject_title.clone(),
            description: proposal.description.clone(),
            status: proposal.status.label(),
            review: proposal.review.status.label(),
            rejection_reason: proposal.review.rejection_reason.clone(),
        }
    }
}

/// Proposal lifecycle manager: one active (non-archived) proposal per
/// teacher, with admin-driven review and status transitions.
pub struct ProposalDesk {
    proposals: Arc<dyn ProposalRepository>,
    center: Arc<NotificationCenter>,
}

impl ProposalDesk {
    pub fn new(proposals: Arc<dyn ProposalRepository>, center: Arc<NotificationCenter>) -> Self {
        Self { proposals, center }
    }

    /// Submit a proposal. A first submission inserts a fresh row; a
    /// resubmission overwrites the teacher's active row in place and resets
    /// review to pending, unless that row is assigned.
    pub fn submit(
        &self,
        actor: &Actor,
        draft: ProposalDraft,
    ) -> Result<ProposalView, PlacementError> {
        access::require_role(actor, &[Role::Teacher])?;
        validate_draft(&draft)?;

        let stored = match self.proposals.active_for_teacher(&actor.id)? {
            None => self.proposals.insert(SubjectProposal {
                id: next_proposal_id(),
                teacher_id: actor.id.clone(),
                subject_title: draft.subject_title,
                description: draft.description,
                status: ProposalStatus::Available,
                review: ReviewState::pending(),
                submitted_at: Utc::now(),
            })?,
            Some(active) if active.status == ProposalStatus::Assigned => {
                return Err(PlacementError::Conflict(
                    "an assigned proposal cannot be resubmitted".to_string(),
                ));
            }
            Some(mut active) => {
                active.subject_title = draft.subject_title;
                active.description = draft.description;
                active.review = ReviewState::pending();
                active.submitted_at = Utc::now();
                self.proposals.update(active.clone())?;
                active
            }
        };

        self.center.alert_admin(
            "Subject proposal awaiting review",
            &format!(
                "Teacher {} submitted \"{}\" for review.",
                stored.teacher_id.0, stored.subject_title
            ),
        );

        Ok(ProposalView::from_proposal(&stored))
    }

    /// Admin: move a proposal between available/assigned/archived. All
    /// transitions are permitted, including assigning an unapproved
    /// proposal.
    pub fn set_status(
        &self,
        actor: &Actor,
        id: &ProposalId,
        status: ProposalStatus,
    ) -> Result<ProposalView, PlacementError> {
        access::require_role(actor, &[Role::Admin])?;

        let mut proposal = self
            .proposals
            .fetch(id)?
            .ok_or(PlacementError::NotFound("proposal"))?;
        proposal.status = status;
        self.proposals.update(proposal.clone())?;

        self.center.notify(
            &proposal.teacher_id,
            NotificationKind::ProposalStatus,
            "Proposal status changed",
            &format!(
                "Your proposal \"{}\" is now {}.",
                proposal.subject_title,
                status.label()
            ),
            Some(format!("/proposals/{}", proposal.id.0)),
        );

        Ok(ProposalView::from_proposal(&proposal))
    }

    /// Admin: approve or reject a proposal. Approval stamps the reviewer and
    /// clears any earlier rejection reason; rejection does the inverse.
    pub fn set_approval(
        &self,
        actor: &Actor,
        id: &ProposalId,
        decision: ReviewDecision,
    ) -> Result<ProposalView, PlacementError> {
        access::require_role(actor, &[Role::Admin])?;

        let mut proposal = self
            .proposals
            .fetch(id)?
            .ok_or(PlacementError::NotFound("proposal"))?;

        let (review, title, body) = match decision {
            ReviewDecision::Approve => (
                ReviewState::approved(actor.id.clone(), Utc::now()),
                "Proposal approved",
                format!(
                    "Your proposal \"{}\" was approved and can now be claimed by students.",
                    proposal.subject_title
                ),
            ),
            ReviewDecision::Reject { reason } => {
                let body = match &reason {
                    Some(reason) => format!(
                        "Your proposal \"{}\" was rejected: {reason}",
                        proposal.subject_title
                    ),
                    None => format!(
                        "Your proposal \"{}\" was rejected.",
                        proposal.subject_title
                    ),
                };
                (ReviewState::rejected(reason), "Proposal rejected", body)
            }
        };

        proposal.review = review;
        self.proposals.update(proposal.clone())?;

        self.center.notify(
            &proposal.teacher_id,
            NotificationKind::ProposalReview,
            title,
            &body,
            Some(format!("/proposals/{}", proposal.id.0)),
        );

        Ok(ProposalView::from_proposal(&proposal))
    }

    /// Owner: edit the proposal fields. Any edit restarts admin review.
    pub fn update(
        &self,
        actor: &Actor,
        id: &ProposalId,
        draft: ProposalDraft,
    ) -> Result<ProposalView, PlacementError> {
        access::require_role(actor, &[Role::Teacher])?;
        validate_draft(&draft)?;

        let mut proposal = self
            .proposals
            .fetch(id)?
            .ok_or(PlacementError::NotFound("proposal"))?;
        access::require_owner(actor, &proposal.teacher_id)?;
        reject_if_assigned(&proposal, "updated")?;

        proposal.subject_title = draft.subject_title;
        proposal.description = draft.description;
        proposal.review = ReviewState::pending();
        self.proposals.update(proposal.clone())?;

        Ok(ProposalView::from_proposal(&proposal))
    }

    /// Owner: soft-retire the proposal. Reversible by submitting again.
    pub fn archive(&self, actor: &Actor, id: &ProposalId) -> Result<(), PlacementError> {
        access::require_role(actor, &[Role::Teacher])?;

        let mut proposal = self
            .proposals
            .fetch(id)?
            .ok_or(PlacementError::NotFound("proposal"))?;
        access::require_owner(actor, &proposal.teacher_id)?;
        reject_if_assigned(&proposal, "archived")?;

        proposal.status = ProposalStatus::Archived;
        self.proposals.update(proposal)?;
        Ok(())
    }

    /// Owner: permanently remove the proposal.
    pub fn delete(&self, actor: &Actor, id: &ProposalId) -> Result<(), PlacementError> {
        access::require_role(actor, &[Role::Teacher])?;

        let proposal = self
            .proposals
            .fetch(id)?
            .ok_or(PlacementError::NotFound("proposal"))?;
        access::require_owner(actor, &proposal.teacher_id)?;
        reject_if_assigned(&proposal, "deleted")?;

        self.proposals.delete(id)?;
        Ok(())
    }

    pub fn get(&self, actor: &Actor, id: &ProposalId) -> Result<ProposalView, PlacementError> {
        let proposal = self
            .proposals
            .fetch(id)?
            .ok_or(PlacementError::NotFound("proposal"))?;
        access::require_owner_or_admin(actor, &proposal.teacher_id)?;
        Ok(ProposalView::from_proposal(&proposal))
    }

    pub fn list_mine(&self, actor: &Actor) -> Result<Vec<ProposalView>, PlacementError> {
        access::require_role(actor, &[Role::Teacher])?;
        let proposals = self.proposals.list_for_teacher(&actor.id)?;
        Ok(proposals.iter().map(ProposalView::from_proposal).collect())
    }

    pub fn list_all(&self, actor: &Actor) -> Result<Vec<ProposalView>, PlacementError> {
        access::require_role(actor, &[Role::Admin])?;
        let proposals = self.proposals.list_all()?;
        Ok(proposals.iter().map(ProposalView::from_proposal).collect())
    }
}

fn validate_draft(draft: &ProposalDraft) -> Result<(), PlacementError> {
    if draft.subject_title.trim().is_empty() {
        return Err(PlacementError::Validation(
            "subject_title must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn reject_if_assigned(proposal: &SubjectProposal, verb: &str) -> Result<(), PlacementError> {
    if proposal.status == ProposalStatus::Assigned {
        return Err(PlacementError::Conflict(format!(
            "an assigned proposal cannot be {verb}"
        )));
    }
    Ok(())
}
