use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::access::Actor;
use super::domain::{Notification, NotificationId, NotificationKind, UserId};
use super::repository::{
    ChannelError, EmailMessage, Messenger, NotificationRepository, SmsMessage,
};
use super::PlacementError;

static NOTIFICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_notification_id() -> NotificationId {
    let id = NOTIFICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    NotificationId(format!("ntf-{id:06}"))
}

/// Administrator contact details for the best-effort alert channels.
#[derive(Debug, Clone)]
pub struct AdminContact {
    pub email: String,
    pub sms_number: Option<String>,
}

/// Side channel shared by the state machines: in-app notification rows for
/// users plus email/SMS alerts for the administrator. Every write here is
/// best-effort; failures are logged and never reach the caller.
pub struct NotificationCenter {
    notifications: Arc<dyn NotificationRepository>,
    messenger: Arc<dyn Messenger>,
    admin: AdminContact,
}

impl NotificationCenter {
    pub fn new(
        notifications: Arc<dyn NotificationRepository>,
        messenger: Arc<dyn Messenger>,
        admin: AdminContact,
    ) -> Self {
        Self {
            notifications,
            messenger,
            admin,
        }
    }

    /// Append a notification row for `user`. Failures are swallowed so the
    /// primary state change they decorate is never rolled back.
    pub fn notify(
        &self,
        user: &UserId,
        kind: NotificationKind,
        title: &str,
        body: &str,
        link: Option<String>,
    ) {
        let notification = Notification {
            id: next_notification_id(),
            user_id: user.clone(),
            kind,
            title: title.to_string(),
            body: body.to_string(),
            link,
            is_read: false,
            created_at: Utc::now(),
            read_at: None,
        };

        if let Err(err) = self.notifications.insert(notification) {
            warn!(user = %user.0, kind = kind.label(), error = %err, "notification insert failed");
        }
    }

    /// Alert the administrator over email, and SMS when a number is
    /// configured. Both channels are best-effort.
    pub fn alert_admin(&self, subject: &str, body: &str) {
        let email = EmailMessage {
            to: self.admin.email.clone(),
            subject: subject.to_string(),
            text: body.to_string(),
            html: None,
        };
        if let Err(err) = self.messenger.send_email(email) {
            warn!(subject, error = %err, "admin email alert failed");
        }

        if let Some(number) = &self.admin.sms_number {
            let sms = SmsMessage {
                to: number.clone(),
                body: format!("{subject}: {body}"),
            };
            if let Err(err) = self.messenger.send_sms(sms) {
                warn!(subject, error = %err, "admin sms alert failed");
            }
        }
    }

    /// The recipient's notifications, newest first.
    pub fn inbox(&self, actor: &Actor) -> Result<Vec<Notification>, PlacementError> {
        Ok(self.notifications.list_for_user(&actor.id)?)
    }

    /// Flip a notification to read. Only the recipient may toggle it.
    pub fn mark_read(&self, actor: &Actor, id: &NotificationId) -> Result<(), PlacementError> {
        let notification = self
            .notifications
            .fetch(id)?
            .ok_or(PlacementError::NotFound("notification"))?;

        if notification.user_id != actor.id {
            return Err(PlacementError::Forbidden(
                "only the recipient may mark a notification read".to_string(),
            ));
        }

        self.notifications.mark_read(id)?;
        Ok(())
    }
}

/// Messenger adapter that logs outbound traffic instead of delivering it.
/// Used by `serve` and `demo` until a real transport is wired in.
#[derive(Debug, Default, Clone)]
pub struct LoggingMessenger;

impl Messenger for LoggingMessenger {
    fn send_email(&self, message: EmailMessage) -> Result<(), ChannelError> {
        info!(to = %message.to, subject = %message.subject, "outbound email (logged only)");
        Ok(())
    }

    fn send_sms(&self, message: SmsMessage) -> Result<(), ChannelError> {
        info!(to = %message.to, "outbound sms (logged only)");
        Ok(())
    }
}
