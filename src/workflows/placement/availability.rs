use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use super::domain::{ProposalStatus, ReviewStatus, Role, UserId};
use super::repository::{ProposalRepository, RequestRepository, UserDirectory};
use super::PlacementError;

/// A teacher currently open for supervision, with the subject backing the slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SupervisorSlot {
    pub teacher_id: UserId,
    pub display_name: String,
    pub subject_title: String,
}

/// A classmate selectable as a request partner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classmate {
    pub student_id: UserId,
    pub display_name: String,
}

/// Partner candidates plus an explanatory note when the list is empty by
/// construction (requester has no cohort recorded).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassmateListing {
    pub classmates: Vec<Classmate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Read-time allocation views. Availability is derived on every call — there
/// is no persisted flag to go stale — and store failures surface to the
/// caller instead of degrading the exclusion rules.
pub struct AllocationResolver {
    directory: Arc<dyn UserDirectory>,
    proposals: Arc<dyn ProposalRepository>,
    requests: Arc<dyn RequestRepository>,
}

impl AllocationResolver {
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        proposals: Arc<dyn ProposalRepository>,
        requests: Arc<dyn RequestRepository>,
    ) -> Self {
        Self {
            directory,
            proposals,
            requests,
        }
    }

    /// Teachers holding an approved, available proposal and not already
    /// claimed as supervisor by a pending or approved request. Ordered by
    /// display name, ascending, case-insensitive.
    pub fn available_supervisors(&self) -> Result<Vec<SupervisorSlot>, PlacementError> {
        let mut open_subjects: HashMap<UserId, String> = HashMap::new();
        for proposal in self.proposals.list_all()? {
            if proposal.review.status == ReviewStatus::Approved
                && proposal.status == ProposalStatus::Available
            {
                open_subjects.insert(proposal.teacher_id.clone(), proposal.subject_title);
            }
        }

        let claims = self.requests.active_claims()?;

        let mut slots: Vec<SupervisorSlot> = self
            .directory
            .teachers()?
            .into_iter()
            .filter(|teacher| !claims.claims_supervisor(&teacher.id))
            .filter_map(|teacher| {
                open_subjects.get(&teacher.id).map(|subject| SupervisorSlot {
                    teacher_id: teacher.id.clone(),
                    display_name: teacher.display_name,
                    subject_title: subject.clone(),
                })
            })
            .collect();

        slots.sort_by(|a, b| {
            a.display_name
                .to_lowercase()
                .cmp(&b.display_name.to_lowercase())
        });

        Ok(slots)
    }

    /// Students in the requester's cohort who are free to be claimed as a
    /// partner: not the requester, not owning an active request, not already
    /// claimed as someone's partner.
    pub fn eligible_classmates(
        &self,
        student: &UserId,
    ) -> Result<ClassmateListing, PlacementError> {
        let requester = self
            .directory
            .fetch(student)?
            .ok_or(PlacementError::NotFound("student"))?;

        let Some(classe) = requester.classe.as_deref() else {
            return Ok(ClassmateListing {
                classmates: Vec::new(),
                note: Some(
                    "no cohort recorded for this student; partner selection is unavailable"
                        .to_string(),
                ),
            });
        };

        let claims = self.requests.active_claims()?;

        let classmates = self
            .directory
            .students_in_classe(classe)?
            .into_iter()
            .filter(|candidate| candidate.role == Role::Student)
            .filter(|candidate| candidate.id != requester.id)
            .filter(|candidate| !claims.claims_owner(&candidate.id))
            .filter(|candidate| !claims.claims_partner(&candidate.id))
            .map(|candidate| Classmate {
                student_id: candidate.id,
                display_name: candidate.display_name,
            })
            .collect();

        Ok(ClassmateListing {
            classmates,
            note: None,
        })
    }
}
