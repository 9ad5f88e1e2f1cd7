use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Notification {
    pub id: String,
    pub message: String,
    pub sender_id: String,
    pub sent_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(sender_id: String, message: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            message,
            sender_id,
            sent_at: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct NotificationRecipient {
    pub notification_id: String,
    pub principal_id: String,
    pub read_at: Option<DateTime<Utc>>,
}

/// Who a new notification goes to. Only tenant principals are ever kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipientSelector {
    AllTenants,
    Principals(Vec<String>),
}

/// A notification as seen by one principal.
#[derive(Debug, Serialize, Clone)]
pub struct NotificationView {
    pub id: String,
    pub message: String,
    pub sender_id: String,
    pub recipients: Vec<String>,
    pub is_read: bool,
    pub timestamp: DateTime<Utc>,
}

impl NotificationView {
    /// Recipients see their own read state; anyone else sees whether every recipient has read it.
    pub fn for_viewer(notification: Notification, recipients: &[NotificationRecipient], viewer_id: &str) -> Self {
        let is_read = match recipients.iter().find(|r| r.principal_id == viewer_id) {
            Some(own) => own.read_at.is_some(),
            None => !recipients.is_empty() && recipients.iter().all(|r| r.read_at.is_some()),
        };

        Self {
            id: notification.id,
            message: notification.message,
            sender_id: notification.sender_id,
            recipients: recipients.iter().map(|r| r.principal_id.clone()).collect(),
            is_read,
            timestamp: notification.sent_at,
        }
    }
}
