use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use crate::workflows::placement::access::Actor;
use crate::workflows::placement::applications::ApplicationDesk;
use crate::workflows::placement::availability::AllocationResolver;
use crate::workflows::placement::domain::{
    Notification, NotificationId, ProposalDraft, RequestSubmission, Role, UserId, UserRecord,
};
use crate::workflows::placement::memory::MemoryStore;
use crate::workflows::placement::notify::{AdminContact, NotificationCenter};
use crate::workflows::placement::proposals::ProposalDesk;
use crate::workflows::placement::repository::{
    ChannelError, EmailMessage, Messenger, NotificationRepository, SmsMessage, StoreError,
};
use crate::workflows::placement::requests::RequestDesk;

pub(super) struct Fixture {
    pub(super) store: MemoryStore,
    pub(super) messenger: Arc<MemoryMessenger>,
    pub(super) center: Arc<NotificationCenter>,
    pub(super) resolver: AllocationResolver,
    pub(super) proposals: ProposalDesk,
    pub(super) requests: RequestDesk,
    pub(super) applications: ApplicationDesk,
    pub(super) admin: Actor,
    pub(super) berger: Actor,
    pub(super) moreau: Actor,
    pub(super) camille: Actor,
    pub(super) theo: Actor,
    pub(super) lina: Actor,
}

pub(super) fn admin_contact() -> AdminContact {
    AdminContact {
        email: "admin@stagehub.local".to_string(),
        sms_number: None,
    }
}

fn seed(store: &MemoryStore, id: &str, name: &str, role: Role, classe: Option<&str>) -> Actor {
    store.add_user(UserRecord {
        id: UserId(id.to_string()),
        display_name: name.to_string(),
        email: format!("{id}@stagehub.local"),
        phone: None,
        role,
        classe: classe.map(str::to_string),
    });
    Actor::new(UserId(id.to_string()), role)
}

/// Full service wiring over one memory store, seeded with an admin, two
/// teachers (display names chosen so case-insensitive ordering differs from
/// byte ordering), and three students in the same cohort.
pub(super) fn fixture() -> Fixture {
    fixture_with_notifications(None)
}

/// Same wiring, optionally swapping the notification repository for a
/// failing double.
pub(super) fn fixture_with_notifications(
    notifications: Option<Arc<dyn NotificationRepository>>,
) -> Fixture {
    let store = MemoryStore::new();
    let messenger = Arc::new(MemoryMessenger::default());

    let admin = seed(&store, "u-admin", "Direction", Role::Admin, None);
    let berger = seed(&store, "u-berger", "alice Berger", Role::Teacher, None);
    let moreau = seed(&store, "u-moreau", "Bruno Moreau", Role::Teacher, None);
    let camille = seed(&store, "u-camille", "Camille Aubert", Role::Student, Some("BTS-SN2"));
    let theo = seed(&store, "u-theo", "Théo Garnier", Role::Student, Some("BTS-SN2"));
    let lina = seed(&store, "u-lina", "Lina Benali", Role::Student, Some("BTS-SN2"));

    let notifications =
        notifications.unwrap_or_else(|| Arc::new(store.clone()) as Arc<dyn NotificationRepository>);
    let center = Arc::new(NotificationCenter::new(
        notifications,
        messenger.clone(),
        admin_contact(),
    ));

    let directory = Arc::new(store.clone());
    let proposals_repo = Arc::new(store.clone());
    let requests_repo = Arc::new(store.clone());
    let applications_repo = Arc::new(store.clone());

    Fixture {
        resolver: AllocationResolver::new(
            directory.clone(),
            proposals_repo.clone(),
            requests_repo.clone(),
        ),
        proposals: ProposalDesk::new(proposals_repo, center.clone()),
        requests: RequestDesk::new(requests_repo, directory, center.clone()),
        applications: ApplicationDesk::new(applications_repo, center.clone()),
        store,
        messenger,
        center,
        admin,
        berger,
        moreau,
        camille,
        theo,
        lina,
    }
}

pub(super) fn draft(title: &str) -> ProposalDraft {
    ProposalDraft {
        subject_title: title.to_string(),
        description: "Supervision slot".to_string(),
    }
}

pub(super) fn submission(name: &str, email: &str) -> RequestSubmission {
    RequestSubmission {
        student_name: name.to_string(),
        contact_email: email.to_string(),
        contact_phone: None,
        company: "Altitude Systèmes".to_string(),
        starts_on: NaiveDate::from_ymd_opt(2026, 1, 12).expect("valid date"),
        ends_on: NaiveDate::from_ymd_opt(2026, 3, 20).expect("valid date"),
        partner_id: None,
        supervisor_id: None,
    }
}

#[derive(Default)]
pub(super) struct MemoryMessenger {
    emails: Mutex<Vec<EmailMessage>>,
    sms: Mutex<Vec<SmsMessage>>,
}

impl MemoryMessenger {
    pub(super) fn emails(&self) -> Vec<EmailMessage> {
        self.emails.lock().expect("messenger mutex poisoned").clone()
    }

    pub(super) fn sms(&self) -> Vec<SmsMessage> {
        self.sms.lock().expect("messenger mutex poisoned").clone()
    }
}

impl Messenger for MemoryMessenger {
    fn send_email(&self, message: EmailMessage) -> Result<(), ChannelError> {
        self.emails
            .lock()
            .expect("messenger mutex poisoned")
            .push(message);
        Ok(())
    }

    fn send_sms(&self, message: SmsMessage) -> Result<(), ChannelError> {
        self.sms
            .lock()
            .expect("messenger mutex poisoned")
            .push(message);
        Ok(())
    }
}

/// Messenger whose channels are always down; used to show that admin alerts
/// never fail the primary write.
pub(super) struct DownMessenger;

impl Messenger for DownMessenger {
    fn send_email(&self, _message: EmailMessage) -> Result<(), ChannelError> {
        Err(ChannelError::Transport("smtp offline".to_string()))
    }

    fn send_sms(&self, _message: SmsMessage) -> Result<(), ChannelError> {
        Err(ChannelError::Transport("sms gateway offline".to_string()))
    }
}

/// Notification repository that refuses inserts for one recipient and
/// delegates everything else to the shared store.
pub(super) struct FailingNotifications {
    pub(super) fail_for: UserId,
    pub(super) inner: MemoryStore,
}

impl NotificationRepository for FailingNotifications {
    fn insert(&self, notification: Notification) -> Result<Notification, StoreError> {
        if notification.user_id == self.fail_for {
            return Err(StoreError::Unavailable("notification table offline".to_string()));
        }
        NotificationRepository::insert(&self.inner, notification)
    }

    fn fetch(&self, id: &NotificationId) -> Result<Option<Notification>, StoreError> {
        NotificationRepository::fetch(&self.inner, id)
    }

    fn list_for_user(&self, user: &UserId) -> Result<Vec<Notification>, StoreError> {
        self.inner.list_for_user(user)
    }

    fn mark_read(&self, id: &NotificationId) -> Result<(), StoreError> {
        NotificationRepository::mark_read(&self.inner, id)
    }
}
