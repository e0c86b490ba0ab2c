//! Notification fanout contract.
//!
//! The engine emits notifications for budget threshold crossings. Delivery
//! is external; failures are logged by [`dispatch`] and never reach the
//! caller.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Spend in a category reached the at-risk threshold.
pub const EVENT_BUDGET_THRESHOLD_EXCEEDED: &str = "budget_threshold_exceeded";
/// Spend in a category exceeded its budget.
pub const EVENT_EXPENSE_EXCEEDS_BUDGET: &str = "expense_exceeds_budget";

/// Who receives a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Recipient {
    /// Everyone holding a role.
    Role(String),
    /// One user.
    User(Uuid),
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Role(role) => write!(f, "role:{role}"),
            Self::User(id) => write!(f, "user:{id}"),
        }
    }
}

/// Notification priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Informational.
    Low,
    /// Default.
    Normal,
    /// Needs attention.
    High,
    /// Needs immediate attention.
    Urgent,
}

impl Priority {
    /// Returns the string representation of the priority.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

/// The entity a notification is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedEntity {
    /// Entity type, e.g. `expense`.
    pub kind: String,
    /// Entity id.
    pub id: Uuid,
}

/// A notification to fan out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Recipient.
    pub recipient: Recipient,
    /// Event type.
    pub event_type: String,
    /// Short title.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Subject of the notification.
    pub related_entity: Option<RelatedEntity>,
    /// Structured details.
    pub metadata: JsonValue,
    /// Priority.
    pub priority: Priority,
}

/// Notification delivery failure.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// The fanout channel rejected the notification.
    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}

impl NotificationError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        500
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        "NOTIFICATION_DELIVERY_FAILED"
    }
}

/// Fanout channel for notifications.
///
/// This trait is implemented by the db crate as a persisted inbox.
pub trait Notifier: Send + Sync {
    /// Deliver one notification.
    fn notify(
        &self,
        notification: Notification,
    ) -> impl std::future::Future<Output = Result<(), NotificationError>> + Send;
}

/// Deliver notifications one by one, logging and swallowing failures.
///
/// Returns the number delivered.
pub async fn dispatch<N: Notifier>(notifier: &N, notifications: Vec<Notification>) -> usize {
    let mut delivered = 0;
    for notification in notifications {
        let recipient = notification.recipient.to_string();
        let event_type = notification.event_type.clone();
        match notifier.notify(notification).await {
            Ok(()) => delivered += 1,
            Err(e) => tracing::warn!(
                recipient = %recipient,
                event_type = %event_type,
                error = %e,
                "Notification delivery failed"
            ),
        }
    }
    delivered
}
