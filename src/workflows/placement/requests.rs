use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use super::access::{self, Actor};
use super::domain::{
    InternshipRequest, NotificationKind, RequestId, RequestStatus, RequestSubmission, Role, UserId,
};
use super::notify::NotificationCenter;
use super::repository::{RequestRepository, UserDirectory};
use super::PlacementError;

static REQUEST_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_request_id() -> RequestId {
    let id = REQUEST_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    RequestId(format!("req-{id:06}"))
}

/// Sanitized request representation returned over the boundary.
#[derive(Debug, Clone, Serialize)]
pub struct RequestView {
    pub id: RequestId,
    pub student_id: String,
    pub student_name: String,
    pub company: String,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partner_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supervisor_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supervisor_name: Option<String>,
    pub status: &'static str,
}

impl RequestView {
    fn from_request(request: &InternshipRequest) -> Self {
        Self {
            id: request.id.clone(),
            student_id: request.student_id.0.clone(),
            student_name: request.student_name.clone(),
            company: request.company.clone(),
            starts_on: request.starts_on,
            ends_on: request.ends_on,
            partner_id: request.partner_id.as_ref().map(|id| id.0.clone()),
            supervisor_id: request.supervisor_id.as_ref().map(|id| id.0.clone()),
            supervisor_name: request.supervisor_name.clone(),
            status: request.status.label(),
        }
    }
}

/// Internship-request status machine: validated student submission, then
/// admin-driven approval with student notifications.
pub struct RequestDesk {
    requests: Arc<dyn RequestRepository>,
    directory: Arc<dyn UserDirectory>,
    center: Arc<NotificationCenter>,
}

impl RequestDesk {
    pub fn new(
        requests: Arc<dyn RequestRepository>,
        directory: Arc<dyn UserDirectory>,
        center: Arc<NotificationCenter>,
    ) -> Self {
        Self {
            requests,
            directory,
            center,
        }
    }

    /// Submit a request. Supervisor and partner references must resolve to
    /// an existing teacher/student; invalid values reject the submission
    /// instead of being silently dropped. The insert enforces the
    /// supervisor/partner/owner claim invariants atomically, so a lost race
    /// surfaces as Conflict.
    pub fn submit(
        &self,
        actor: &Actor,
        submission: RequestSubmission,
    ) -> Result<RequestView, PlacementError> {
        access::require_role(actor, &[Role::Student])?;
        validate_submission(&submission)?;

        let supervisor_name = match &submission.supervisor_id {
            Some(id) => Some(self.resolve_supervisor(id)?),
            None => None,
        };
        if let Some(partner) = &submission.partner_id {
            self.check_partner(actor, partner)?;
        }

        let request = InternshipRequest {
            id: next_request_id(),
            student_id: actor.id.clone(),
            student_name: submission.student_name,
            contact_email: submission.contact_email,
            contact_phone: submission.contact_phone,
            company: submission.company,
            starts_on: submission.starts_on,
            ends_on: submission.ends_on,
            partner_id: submission.partner_id,
            supervisor_id: submission.supervisor_id,
            supervisor_name,
            status: RequestStatus::Pending,
            submitted_at: Utc::now(),
        };

        let stored = self.requests.insert(request)?;

        self.center.alert_admin(
            "Internship request awaiting review",
            &format!(
                "{} submitted an internship request at {}.",
                stored.student_name, stored.company
            ),
        );

        Ok(RequestView::from_request(&stored))
    }

    /// Admin: decide a request. Either transition is always permitted,
    /// including flipping an already-decided request.
    pub fn set_status(
        &self,
        actor: &Actor,
        id: &RequestId,
        status: RequestStatus,
    ) -> Result<RequestView, PlacementError> {
        access::require_role(actor, &[Role::Admin])?;

        let mut request = self
            .requests
            .fetch(id)?
            .ok_or(PlacementError::NotFound("request"))?;

        self.requests.set_status(id, status)?;
        request.status = status;

        let (title, body) = decision_copy(&request, status);
        self.center.notify(
            &request.student_id,
            NotificationKind::RequestDecision,
            title,
            &body,
            Some(format!("/requests/{}", request.id.0)),
        );

        Ok(RequestView::from_request(&request))
    }

    pub fn get(&self, actor: &Actor, id: &RequestId) -> Result<RequestView, PlacementError> {
        let request = self
            .requests
            .fetch(id)?
            .ok_or(PlacementError::NotFound("request"))?;
        access::require_owner_or_admin(actor, &request.student_id)?;
        Ok(RequestView::from_request(&request))
    }

    pub fn list_mine(&self, actor: &Actor) -> Result<Vec<RequestView>, PlacementError> {
        access::require_role(actor, &[Role::Student])?;
        let requests = self.requests.list_for_student(&actor.id)?;
        Ok(requests.iter().map(RequestView::from_request).collect())
    }

    pub fn list_all(&self, actor: &Actor) -> Result<Vec<RequestView>, PlacementError> {
        access::require_role(actor, &[Role::Admin])?;
        let requests = self.requests.list_all()?;
        Ok(requests.iter().map(RequestView::from_request).collect())
    }

    fn resolve_supervisor(&self, id: &UserId) -> Result<String, PlacementError> {
        let supervisor = self
            .directory
            .fetch(id)?
            .ok_or(PlacementError::NotFound("supervisor"))?;
        if supervisor.role != Role::Teacher {
            return Err(PlacementError::Validation(
                "supervisor_id must reference a teacher".to_string(),
            ));
        }
        Ok(supervisor.display_name)
    }

    fn check_partner(&self, actor: &Actor, partner: &UserId) -> Result<(), PlacementError> {
        if *partner == actor.id {
            return Err(PlacementError::Validation(
                "a student cannot be their own partner".to_string(),
            ));
        }
        let record = self
            .directory
            .fetch(partner)?
            .ok_or(PlacementError::NotFound("partner"))?;
        if record.role != Role::Student {
            return Err(PlacementError::Validation(
                "partner_id must reference a student".to_string(),
            ));
        }
        Ok(())
    }
}

fn validate_submission(submission: &RequestSubmission) -> Result<(), PlacementError> {
    if submission.student_name.trim().is_empty() {
        return Err(PlacementError::Validation(
            "student_name must not be empty".to_string(),
        ));
    }
    if !submission.contact_email.contains('@') {
        return Err(PlacementError::Validation(
            "contact_email must be a valid address".to_string(),
        ));
    }
    if submission.company.trim().is_empty() {
        return Err(PlacementError::Validation(
            "company must not be empty".to_string(),
        ));
    }
    if submission.ends_on < submission.starts_on {
        return Err(PlacementError::Validation(
            "ends_on must not precede starts_on".to_string(),
        ));
    }
    Ok(())
}

fn decision_copy(request: &InternshipRequest, status: RequestStatus) -> (&'static str, String) {
    match status {
        RequestStatus::Approved => (
            "Internship request approved",
            format!(
                "Your internship request at {} was approved.",
                request.company
            ),
        ),
        RequestStatus::Rejected => (
            "Internship request rejected",
            format!(
                "Your internship request at {} was rejected. Contact the administration for details.",
                request.company
            ),
        ),
        RequestStatus::Pending => (
            "Internship request reopened",
            format!(
                "Your internship request at {} is back under review.",
                request.company
            ),
        ),
    }
}
