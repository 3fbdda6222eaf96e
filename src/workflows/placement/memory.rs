use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::domain::{
    ApplicationId, ApplicationStatus, InternshipRequest, Notification, NotificationId,
    OfferApplication, ProposalId, RequestId, RequestStatus, Role, SubjectProposal, UserId,
    UserRecord,
};
use super::repository::{
    ActiveClaims, ApplicationRepository, NotificationRepository, ProposalRepository,
    RequestRepository, StoreError, UserDirectory,
};

#[derive(Default)]
struct MemoryState {
    users: HashMap<UserId, UserRecord>,
    proposals: HashMap<ProposalId, SubjectProposal>,
    requests: HashMap<RequestId, InternshipRequest>,
    applications: HashMap<ApplicationId, OfferApplication>,
    notifications: Vec<Notification>,
}

impl MemoryState {
    fn active_claims(&self) -> ActiveClaims {
        let mut claims = ActiveClaims::default();
        for request in self.requests.values() {
            if !request.status.claims_resources() {
                continue;
            }
            claims.owners.push(request.student_id.clone());
            if let Some(partner) = &request.partner_id {
                claims.partners.push(partner.clone());
            }
            if let Some(supervisor) = &request.supervisor_id {
                claims.supervisors.push(supervisor.clone());
            }
        }
        claims
    }
}

/// Single-process store backing `serve`, `demo`, and the test suite. One
/// mutex guards all tables, which is what makes the request-insert claim
/// check an atomic conditional write.
#[derive(Default, Clone)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a directory entry. Registration itself is outside the engine.
    pub fn add_user(&self, user: UserRecord) {
        let mut state = self.state.lock().expect("placement store mutex poisoned");
        state.users.insert(user.id.clone(), user);
    }
}

impl UserDirectory for MemoryStore {
    fn fetch(&self, id: &UserId) -> Result<Option<UserRecord>, StoreError> {
        let state = self.state.lock().expect("placement store mutex poisoned");
        Ok(state.users.get(id).cloned())
    }

    fn students_in_classe(&self, classe: &str) -> Result<Vec<UserRecord>, StoreError> {
        let state = self.state.lock().expect("placement store mutex poisoned");
        let mut students: Vec<UserRecord> = state
            .users
            .values()
            .filter(|user| user.role == Role::Student)
            .filter(|user| user.classe.as_deref() == Some(classe))
            .cloned()
            .collect();
        students.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(students)
    }

    fn teachers(&self) -> Result<Vec<UserRecord>, StoreError> {
        let state = self.state.lock().expect("placement store mutex poisoned");
        let mut teachers: Vec<UserRecord> = state
            .users
            .values()
            .filter(|user| user.role == Role::Teacher)
            .cloned()
            .collect();
        teachers.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(teachers)
    }
}

impl ProposalRepository for MemoryStore {
    fn insert(&self, proposal: SubjectProposal) -> Result<SubjectProposal, StoreError> {
        let mut state = self.state.lock().expect("placement store mutex poisoned");
        if state.proposals.contains_key(&proposal.id) {
            return Err(StoreError::Conflict("proposal id already exists".to_string()));
        }
        if state
            .proposals
            .values()
            .any(|existing| existing.teacher_id == proposal.teacher_id && existing.is_active())
        {
            return Err(StoreError::Conflict(
                "teacher already holds an active proposal".to_string(),
            ));
        }
        state.proposals.insert(proposal.id.clone(), proposal.clone());
        Ok(proposal)
    }

    fn update(&self, proposal: SubjectProposal) -> Result<(), StoreError> {
        let mut state = self.state.lock().expect("placement store mutex poisoned");
        if !state.proposals.contains_key(&proposal.id) {
            return Err(StoreError::NotFound);
        }
        state.proposals.insert(proposal.id.clone(), proposal);
        Ok(())
    }

    fn delete(&self, id: &ProposalId) -> Result<(), StoreError> {
        let mut state = self.state.lock().expect("placement store mutex poisoned");
        state.proposals.remove(id).map(|_| ()).ok_or(StoreError::NotFound)
    }

    fn fetch(&self, id: &ProposalId) -> Result<Option<SubjectProposal>, StoreError> {
        let state = self.state.lock().expect("placement store mutex poisoned");
        Ok(state.proposals.get(id).cloned())
    }

    fn active_for_teacher(&self, teacher: &UserId) -> Result<Option<SubjectProposal>, StoreError> {
        let state = self.state.lock().expect("placement store mutex poisoned");
        Ok(state
            .proposals
            .values()
            .find(|proposal| proposal.teacher_id == *teacher && proposal.is_active())
            .cloned())
    }

    fn list_for_teacher(&self, teacher: &UserId) -> Result<Vec<SubjectProposal>, StoreError> {
        let state = self.state.lock().expect("placement store mutex poisoned");
        let mut proposals: Vec<SubjectProposal> = state
            .proposals
            .values()
            .filter(|proposal| proposal.teacher_id == *teacher)
            .cloned()
            .collect();
        proposals.sort_by(|a, b| a.id.0.cmp(&b.id.0));
        Ok(proposals)
    }

    fn list_all(&self) -> Result<Vec<SubjectProposal>, StoreError> {
        let state = self.state.lock().expect("placement store mutex poisoned");
        let mut proposals: Vec<SubjectProposal> = state.proposals.values().cloned().collect();
        proposals.sort_by(|a, b| a.id.0.cmp(&b.id.0));
        Ok(proposals)
    }
}

impl RequestRepository for MemoryStore {
    fn insert(&self, request: InternshipRequest) -> Result<InternshipRequest, StoreError> {
        let mut state = self.state.lock().expect("placement store mutex poisoned");
        if state.requests.contains_key(&request.id) {
            return Err(StoreError::Conflict("request id already exists".to_string()));
        }

        // Claim checks and the insert share the store lock; concurrent
        // submissions naming the same resource cannot both pass.
        let claims = state.active_claims();
        if claims.claims_owner(&request.student_id) {
            return Err(StoreError::Conflict(
                "student already has an active internship request".to_string(),
            ));
        }
        if let Some(supervisor) = &request.supervisor_id {
            if claims.claims_supervisor(supervisor) {
                return Err(StoreError::Conflict(
                    "supervisor is already claimed by another request".to_string(),
                ));
            }
        }
        if let Some(partner) = &request.partner_id {
            if claims.claims_partner(partner) {
                return Err(StoreError::Conflict(
                    "partner is already claimed by another request".to_string(),
                ));
            }
            if claims.claims_owner(partner) {
                return Err(StoreError::Conflict(
                    "partner already owns an active internship request".to_string(),
                ));
            }
        }

        state.requests.insert(request.id.clone(), request.clone());
        Ok(request)
    }

    fn set_status(&self, id: &RequestId, status: RequestStatus) -> Result<(), StoreError> {
        let mut state = self.state.lock().expect("placement store mutex poisoned");
        let request = state.requests.get_mut(id).ok_or(StoreError::NotFound)?;
        request.status = status;
        Ok(())
    }

    fn fetch(&self, id: &RequestId) -> Result<Option<InternshipRequest>, StoreError> {
        let state = self.state.lock().expect("placement store mutex poisoned");
        Ok(state.requests.get(id).cloned())
    }

    fn list_for_student(&self, student: &UserId) -> Result<Vec<InternshipRequest>, StoreError> {
        let state = self.state.lock().expect("placement store mutex poisoned");
        let mut requests: Vec<InternshipRequest> = state
            .requests
            .values()
            .filter(|request| request.student_id == *student)
            .cloned()
            .collect();
        requests.sort_by(|a, b| a.id.0.cmp(&b.id.0));
        Ok(requests)
    }

    fn list_all(&self) -> Result<Vec<InternshipRequest>, StoreError> {
        let state = self.state.lock().expect("placement store mutex poisoned");
        let mut requests: Vec<InternshipRequest> = state.requests.values().cloned().collect();
        requests.sort_by(|a, b| a.id.0.cmp(&b.id.0));
        Ok(requests)
    }

    fn active_claims(&self) -> Result<ActiveClaims, StoreError> {
        let state = self.state.lock().expect("placement store mutex poisoned");
        Ok(state.active_claims())
    }
}

impl ApplicationRepository for MemoryStore {
    fn insert(&self, application: OfferApplication) -> Result<OfferApplication, StoreError> {
        let mut state = self.state.lock().expect("placement store mutex poisoned");
        if state.applications.contains_key(&application.id) {
            return Err(StoreError::Conflict(
                "application id already exists".to_string(),
            ));
        }
        if state.applications.values().any(|existing| {
            existing.offer_id == application.offer_id
                && existing.applicant_id == application.applicant_id
        }) {
            return Err(StoreError::Conflict(
                "student already applied to this offer".to_string(),
            ));
        }
        state
            .applications
            .insert(application.id.clone(), application.clone());
        Ok(application)
    }

    fn set_status(&self, id: &ApplicationId, status: ApplicationStatus) -> Result<(), StoreError> {
        let mut state = self.state.lock().expect("placement store mutex poisoned");
        let application = state.applications.get_mut(id).ok_or(StoreError::NotFound)?;
        application.status = status;
        Ok(())
    }

    fn delete(&self, id: &ApplicationId) -> Result<(), StoreError> {
        let mut state = self.state.lock().expect("placement store mutex poisoned");
        state
            .applications
            .remove(id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<OfferApplication>, StoreError> {
        let state = self.state.lock().expect("placement store mutex poisoned");
        Ok(state.applications.get(id).cloned())
    }

    fn list_for_student(&self, student: &UserId) -> Result<Vec<OfferApplication>, StoreError> {
        let state = self.state.lock().expect("placement store mutex poisoned");
        let mut applications: Vec<OfferApplication> = state
            .applications
            .values()
            .filter(|application| application.applicant_id == *student)
            .cloned()
            .collect();
        applications.sort_by(|a, b| a.id.0.cmp(&b.id.0));
        Ok(applications)
    }

    fn list_all(&self) -> Result<Vec<OfferApplication>, StoreError> {
        let state = self.state.lock().expect("placement store mutex poisoned");
        let mut applications: Vec<OfferApplication> =
            state.applications.values().cloned().collect();
        applications.sort_by(|a, b| a.id.0.cmp(&b.id.0));
        Ok(applications)
    }
}

impl NotificationRepository for MemoryStore {
    fn insert(&self, notification: Notification) -> Result<Notification, StoreError> {
        let mut state = self.state.lock().expect("placement store mutex poisoned");
        state.notifications.push(notification.clone());
        Ok(notification)
    }

    fn fetch(&self, id: &NotificationId) -> Result<Option<Notification>, StoreError> {
        let state = self.state.lock().expect("placement store mutex poisoned");
        Ok(state
            .notifications
            .iter()
            .find(|notification| notification.id == *id)
            .cloned())
    }

    fn list_for_user(&self, user: &UserId) -> Result<Vec<Notification>, StoreError> {
        let state = self.state.lock().expect("placement store mutex poisoned");
        let mut inbox: Vec<Notification> = state
            .notifications
            .iter()
            .filter(|notification| notification.user_id == *user)
            .cloned()
            .collect();
        inbox.reverse();
        Ok(inbox)
    }

    fn mark_read(&self, id: &NotificationId) -> Result<(), StoreError> {
        let mut state = self.state.lock().expect("placement store mutex poisoned");
        let notification = state
            .notifications
            .iter_mut()
            .find(|notification| notification.id == *id)
            .ok_or(StoreError::NotFound)?;
        notification.is_read = true;
        notification.read_at = Some(chrono::Utc::now());
        Ok(())
    }
}
