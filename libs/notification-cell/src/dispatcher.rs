use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client,
};
use serde_json::json;
use tracing::{debug, warn};

use shared_config::AppConfig;

use crate::models::{Notification, NotificationContext, NotificationKind};

/// Delivery seam for booking notifications. Implementations are strictly
/// best-effort: they log failures and never return them, so a slow or dead
/// chat service can never fail a booking operation.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn notify(&self, notification: Notification);
}

/// Dispatcher backed by the workspace chat service's bot-message endpoint.
/// Sends one direct message per recipient, attendees first, then
/// room-admins, with duplicates within each group dropped. Attendees and
/// admins get different bodies: attendees are addressed as participants,
/// admins get a heads-up about activity in their rooms.
pub struct ChatBotDispatcher {
    client: Client,
    base_url: String,
    bot_token: String,
}

impl ChatBotDispatcher {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.chat_base_url.clone(),
            bot_token: config.chat_bot_token.clone(),
        }
    }

    async fn send_bot_message(&self, user_id: i64, text: &str) -> Result<(), reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", self.bot_token)) {
            headers.insert(AUTHORIZATION, value);
        }

        let body = json!({
            "user_id": user_id,
            "text": text,
            "bot_type": "meeting-room",
            "bot_name": "Meeting Room Bot",
        });

        self.client
            .post(format!("{}/api/v1/bot/message", self.base_url))
            .headers(headers)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}

#[async_trait]
impl NotificationDispatcher for ChatBotDispatcher {
    async fn notify(&self, notification: Notification) {
        let (attendee_message, admin_message) = match notification.kind {
            NotificationKind::Reminder => (
                format_reminder(&notification.context),
                format_admin_reminder(&notification.context),
            ),
            NotificationKind::Cancel => (
                format_cancellation(&notification.context),
                format_admin_cancellation(&notification.context),
            ),
        };

        let recipients = dedup_ids(&notification.user_ids)
            .into_iter()
            .map(|id| (id, &attendee_message))
            .chain(
                dedup_ids(&notification.admin_ids)
                    .into_iter()
                    .map(|id| (id, &admin_message)),
            );

        for (user_id, message) in recipients {
            match self.send_bot_message(user_id, message).await {
                Ok(()) => debug!("Notification delivered to chat user {}", user_id),
                Err(e) => warn!("Failed to notify chat user {}: {}", user_id, e),
            }
        }
    }
}

/// Drop duplicate ids while keeping first-seen order.
fn dedup_ids(ids: &[i64]) -> Vec<i64> {
    let mut seen = std::collections::HashSet::new();
    ids.iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect()
}

pub fn format_reminder(context: &NotificationContext) -> String {
    let reason_section = if context.reason.is_empty() {
        String::new()
    } else {
        format!("\n- **Reason**: {}", context.reason)
    };

    format!(
        r#"## 📢  Meeting reminder
### **You have a new meeting, please attend on time!**

- **Room**: {}
- **Time**: {}
- **Organizer**: {}{}"#,
        context.room_name,
        context.meeting_time(),
        context.organizer_name,
        reason_section,
    )
}

/// Admin-facing variant of the reminder: framed as room activity rather
/// than an invitation, and lists who is attending.
pub fn format_admin_reminder(context: &NotificationContext) -> String {
    let attendee_section = if context.attendee_names.is_empty() {
        String::new()
    } else {
        format!("\n- **Attendees**: {}", context.attendee_names.join(", "))
    };
    let reason_section = if context.reason.is_empty() {
        String::new()
    } else {
        format!("\n- **Reason**: {}", context.reason)
    };

    format!(
        r#"## 📢  New room booking
### **A room you administer has a new booking.**

- **Room**: {}
- **Time**: {}
- **Organizer**: {}{}{}"#,
        context.room_name,
        context.meeting_time(),
        context.organizer_name,
        attendee_section,
        reason_section,
    )
}

pub fn format_cancellation(context: &NotificationContext) -> String {
    let cancel_section = match context.cancel_reason.as_deref() {
        Some(reason) if !reason.is_empty() => {
            format!("\n- **Cancellation reason**: {}", reason)
        }
        _ => String::new(),
    };

    format!(
        r#"## ❌  Meeting cancelled
### **A meeting you were invited to has been cancelled**

- **Room**: {}
- **Original time**: {}
- **Organizer**: {}{}

> Contact the organizer or an administrator with any questions."#,
        context.room_name,
        context.meeting_time(),
        context.organizer_name,
        cancel_section,
    )
}

pub fn format_admin_cancellation(context: &NotificationContext) -> String {
    format!(
        r#"## ❌  Room booking cancelled
### **A booking in a room you administer was cancelled.**

- **Room**: {}
- **Original time**: {}
- **Organizer**: {}"#,
        context.room_name,
        context.meeting_time(),
        context.organizer_name,
    )
}
