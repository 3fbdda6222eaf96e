use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::access::{self, Actor};
use super::domain::{ApplicationId, ApplicationStatus, NotificationKind, OfferApplication, Role};
use super::notify::NotificationCenter;
use super::repository::ApplicationRepository;
use super::PlacementError;

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

/// Sanitized application representation returned over the boundary.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationView {
    pub id: ApplicationId,
    pub offer_id: String,
    pub applicant_id: String,
    pub status: &'static str,
    pub submitted_at: DateTime<Utc>,
}

impl ApplicationView {
    fn from_application(application: &OfferApplication) -> Self {
        Self {
            id: application.id.clone(),
            offer_id: application.offer_id.clone(),
            applicant_id: application.applicant_id.0.clone(),
            status: application.status.label(),
            submitted_at: application.submitted_at,
        }
    }
}

/// Result of a bulk status update. Unknown ids are reported back without
/// failing the batch.
#[derive(Debug, Clone, Serialize)]
pub struct BulkOutcome {
    pub updated: Vec<ApplicationId>,
    pub missing: Vec<ApplicationId>,
}

/// Offer-application status machine: student submission and withdrawal,
/// admin decisions one at a time or in bulk.
pub struct ApplicationDesk {
    applications: Arc<dyn ApplicationRepository>,
    center: Arc<NotificationCenter>,
}

impl ApplicationDesk {
    pub fn new(
        applications: Arc<dyn ApplicationRepository>,
        center: Arc<NotificationCenter>,
    ) -> Self {
        Self {
            applications,
            center,
        }
    }

    /// Apply to an offer. A second application by the same student to the
    /// same offer is a Conflict.
    pub fn submit(&self, actor: &Actor, offer_id: &str) -> Result<ApplicationView, PlacementError> {
        access::require_role(actor, &[Role::Student])?;
        if offer_id.trim().is_empty() {
            return Err(PlacementError::Validation(
                "offer_id must not be empty".to_string(),
            ));
        }

        let stored = self.applications.insert(OfferApplication {
            id: next_application_id(),
            offer_id: offer_id.to_string(),
            applicant_id: actor.id.clone(),
            status: ApplicationStatus::Pending,
            submitted_at: Utc::now(),
        })?;

        Ok(ApplicationView::from_application(&stored))
    }

    /// Admin: decide a single application and notify the applicant.
    pub fn set_status(
        &self,
        actor: &Actor,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<ApplicationView, PlacementError> {
        access::require_role(actor, &[Role::Admin])?;

        let application = self
            .applications
            .fetch(id)?
            .ok_or(PlacementError::NotFound("application"))?;
        self.apply_decision(&application, status)?;

        let mut decided = application;
        decided.status = status;
        Ok(ApplicationView::from_application(&decided))
    }

    /// Admin: apply one target status to a list of applications. Each item
    /// gets its own notification; a notification failure or an unknown id
    /// never aborts the rest of the batch.
    pub fn set_status_bulk(
        &self,
        actor: &Actor,
        ids: &[ApplicationId],
        status: ApplicationStatus,
    ) -> Result<BulkOutcome, PlacementError> {
        access::require_role(actor, &[Role::Admin])?;

        let mut outcome = BulkOutcome {
            updated: Vec::new(),
            missing: Vec::new(),
        };

        for id in ids {
            match self.applications.fetch(id)? {
                Some(application) => {
                    self.apply_decision(&application, status)?;
                    outcome.updated.push(id.clone());
                }
                None => outcome.missing.push(id.clone()),
            }
        }

        Ok(outcome)
    }

    /// Owner: withdraw a pending application. Decided applications cannot be
    /// withdrawn.
    pub fn withdraw(&self, actor: &Actor, id: &ApplicationId) -> Result<(), PlacementError> {
        access::require_role(actor, &[Role::Student])?;

        let application = self
            .applications
            .fetch(id)?
            .ok_or(PlacementError::NotFound("application"))?;
        access::require_owner(actor, &application.applicant_id)?;

        if application.status != ApplicationStatus::Pending {
            return Err(PlacementError::Conflict(
                "only a pending application can be withdrawn".to_string(),
            ));
        }

        self.applications.delete(id)?;
        Ok(())
    }

    pub fn get(&self, actor: &Actor, id: &ApplicationId) -> Result<ApplicationView, PlacementError> {
        let application = self
            .applications
            .fetch(id)?
            .ok_or(PlacementError::NotFound("application"))?;
        access::require_owner_or_admin(actor, &application.applicant_id)?;
        Ok(ApplicationView::from_application(&application))
    }

    pub fn list_mine(&self, actor: &Actor) -> Result<Vec<ApplicationView>, PlacementError> {
        access::require_role(actor, &[Role::Student])?;
        let applications = self.applications.list_for_student(&actor.id)?;
        Ok(applications
            .iter()
            .map(ApplicationView::from_application)
            .collect())
    }

    pub fn list_all(&self, actor: &Actor) -> Result<Vec<ApplicationView>, PlacementError> {
        access::require_role(actor, &[Role::Admin])?;
        let applications = self.applications.list_all()?;
        Ok(applications
            .iter()
            .map(ApplicationView::from_application)
            .collect())
    }

    fn apply_decision(
        &self,
        application: &OfferApplication,
        status: ApplicationStatus,
    ) -> Result<(), PlacementError> {
        self.applications.set_status(&application.id, status)?;

        let (title, body) = match status {
            ApplicationStatus::Accepted => (
                "Application accepted",
                format!("Your application to offer {} was accepted.", application.offer_id),
            ),
            ApplicationStatus::Rejected => (
                "Application rejected",
                format!("Your application to offer {} was rejected.", application.offer_id),
            ),
            ApplicationStatus::Pending => (
                "Application reopened",
                format!(
                    "Your application to offer {} is back under review.",
                    application.offer_id
                ),
            ),
        };

        self.center.notify(
            &application.applicant_id,
            NotificationKind::ApplicationDecision,
            title,
            &body,
            Some(format!("/applications/{}", application.id.0)),
        );

        Ok(())
    }
}
