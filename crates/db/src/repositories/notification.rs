//! Notification inbox repository.
//!
//! Persists notifications for in-app display. Push and email delivery are
//! handled by external consumers of the inbox table.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use uuid::Uuid;

use crate::entities::{
    notifications, sea_orm_active_enums::NotificationPriority as DbNotificationPriority,
};
use estimo_core::notification::{Notification, NotificationError, Notifier, Priority, Recipient};

/// Notification repository implementation.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    db: DatabaseConnection,
}

impl NotificationRepository {
    /// Create a new notification repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl Notifier for NotificationRepository {
    async fn notify(&self, notification: Notification) -> Result<(), NotificationError> {
        let (recipient_role, recipient_user_id) = match notification.recipient {
            Recipient::Role(role) => (Some(role), None),
            Recipient::User(id) => (None, Some(id)),
        };
        let (related_entity_type, related_entity_id) = notification
            .related_entity
            .map_or((None, None), |entity| (Some(entity.kind), Some(entity.id)));

        notifications::ActiveModel {
            id: Set(Uuid::now_v7()),
            recipient_role: Set(recipient_role),
            recipient_user_id: Set(recipient_user_id),
            event_type: Set(notification.event_type),
            title: Set(notification.title),
            message: Set(notification.message),
            related_entity_type: Set(related_entity_type),
            related_entity_id: Set(related_entity_id),
            metadata: Set(notification.metadata),
            priority: Set(to_db_priority(notification.priority)),
            read_at: Set(None),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await
        .map_err(|e| NotificationError::Delivery(e.to_string()))?;

        Ok(())
    }
}

fn to_db_priority(priority: Priority) -> DbNotificationPriority {
    match priority {
        Priority::Low => DbNotificationPriority::Low,
        Priority::Normal => DbNotificationPriority::Normal,
        Priority::High => DbNotificationPriority::High,
        Priority::Urgent => DbNotificationPriority::Urgent,
    }
}
