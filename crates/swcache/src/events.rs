//! # Lifecycle Events
//!
//! Every signal the host can deliver, and a single [`Interceptor::dispatch`]
//! entry point that never lets a handler failure escape unlogged.
//!
//! Push, notification-click, message and sync handling are thin
//! pass-throughs to the [`Host`](crate::host::Host).

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::error::InterceptError;
use crate::http::{Request, Response};
use crate::interceptor::{FetchOutcome, Interceptor};

/// Sync tag acknowledged by the interceptor
pub const BACKGROUND_SYNC_TAG: &str = "background-sync";

/// Action id that opens the application from a notification
pub const ACTION_EXPLORE: &str = "explore";

/// Action id that only dismisses a notification
pub const ACTION_CLOSE: &str = "close";

/// A signal delivered by the host
#[derive(Debug)]
pub enum LifecycleEvent {
    Install,
    Activate,
    Fetch(Request),
    Sync { tag: String },
    Push { data: Option<String> },
    NotificationClick { action: Option<String> },
    Message(serde_json::Value),
    Error { message: String },
    UnhandledRejection { reason: String },
}

impl LifecycleEvent {
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleEvent::Install => "install",
            LifecycleEvent::Activate => "activate",
            LifecycleEvent::Fetch(_) => "fetch",
            LifecycleEvent::Sync { .. } => "sync",
            LifecycleEvent::Push { .. } => "push",
            LifecycleEvent::NotificationClick { .. } => "notificationclick",
            LifecycleEvent::Message(_) => "message",
            LifecycleEvent::Error { .. } => "error",
            LifecycleEvent::UnhandledRejection { .. } => "unhandledrejection",
        }
    }
}

/// What came of dispatching an event
#[derive(Debug)]
pub enum EventOutcome {
    /// The event's work completed
    Handled,
    /// A fetch the interceptor chose not to handle
    Passthrough(Request),
    /// A fetch answered by the interceptor
    Respond(Response),
    /// The handler failed; the failure has been logged
    Failed(InterceptError),
}

/// Messages a client page can post to the interceptor
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Activate a waiting version immediately
    #[serde(rename = "SKIP_WAITING")]
    SkipWaiting,
}

/// A button shown on a notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
    pub icon: String,
}

/// Data attached to a push notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationData {
    /// Milliseconds since the epoch
    pub date_of_arrival: i64,
    pub primary_key: u32,
}

/// Everything the host needs to display a notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationOptions {
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    pub data: NotificationData,
    pub actions: Vec<NotificationAction>,
}

impl Interceptor {
    /// Route an event to its handler. Handler errors are logged and returned
    /// as [`EventOutcome::Failed`]; nothing panics.
    pub async fn dispatch(&self, event: LifecycleEvent) -> EventOutcome {
        let name = event.name();
        let result = match event {
            LifecycleEvent::Install => self.install().await.map(|_| EventOutcome::Handled),
            LifecycleEvent::Activate => self.activate().await.map(|_| EventOutcome::Handled),
            LifecycleEvent::Fetch(request) => self.handle_fetch(request).await.map(|outcome| match outcome {
                FetchOutcome::Passthrough(request) => EventOutcome::Passthrough(request),
                FetchOutcome::Respond(response) => EventOutcome::Respond(response),
            }),
            LifecycleEvent::Sync { tag } => {
                self.handle_sync(&tag);
                Ok(EventOutcome::Handled)
            }
            LifecycleEvent::Push { data } => {
                self.handle_push(data.as_deref()).await;
                Ok(EventOutcome::Handled)
            }
            LifecycleEvent::NotificationClick { action } => self
                .handle_notification_click(action.as_deref())
                .await
                .map(|_| EventOutcome::Handled),
            LifecycleEvent::Message(data) => {
                self.handle_message(&data).await;
                Ok(EventOutcome::Handled)
            }
            LifecycleEvent::Error { message } => {
                error!(error = %message, "Error occurred");
                Ok(EventOutcome::Handled)
            }
            LifecycleEvent::UnhandledRejection { reason } => {
                error!(reason = %reason, "Unhandled promise rejection");
                Ok(EventOutcome::Handled)
            }
        };

        result.unwrap_or_else(|e| {
            error!(event = name, error = %e, "Event handler failed");
            EventOutcome::Failed(e)
        })
    }

    /// Acknowledge a background sync. Returns whether the tag is known.
    pub fn handle_sync(&self, tag: &str) -> bool {
        info!(tag = %tag, "Background sync triggered");
        if tag == BACKGROUND_SYNC_TAG {
            debug!("Processing background sync");
            true
        } else {
            false
        }
    }

    /// Show a notification for a push message
    pub async fn handle_push(&self, data: Option<&str>) {
        info!("Push notification received");
        let options = self.notification_options(data);
        self.host().show_notification(self.config().app_name(), options).await;
    }

    /// Build the options for a push notification carrying `data`
    pub fn notification_options(&self, data: Option<&str>) -> NotificationOptions {
        let config = self.config().notification();
        let action = |id: &str, title: &str| NotificationAction {
            action: id.to_string(),
            title: title.to_string(),
            icon: config.icon.clone(),
        };

        NotificationOptions {
            body: data.map_or_else(|| config.default_body.clone(), str::to_string),
            icon: config.icon.clone(),
            badge: config.badge.clone(),
            vibrate: config.vibrate.clone(),
            data: NotificationData {
                date_of_arrival: chrono::Utc::now().timestamp_millis(),
                primary_key: 1,
            },
            actions: vec![
                action(ACTION_EXPLORE, &config.explore_title),
                action(ACTION_CLOSE, &config.close_title),
            ],
        }
    }

    /// Close the clicked notification and open the app for "explore"
    pub async fn handle_notification_click(&self, action: Option<&str>) -> Result<(), InterceptError> {
        info!(action = ?action, "Notification clicked");
        self.host().close_notification().await;

        if action == Some(ACTION_EXPLORE) {
            let target = self.config().scope().join(&self.config().notification().explore_target)?;
            self.host().open_window(target).await;
        }
        Ok(())
    }

    /// Handle a message posted by a client page. Returns the recognized
    /// message, if any.
    pub async fn handle_message(&self, data: &serde_json::Value) -> Option<ClientMessage> {
        info!(data = %data, "Message received");
        let message = ClientMessage::deserialize(data).ok()?;
        match message {
            ClientMessage::SkipWaiting => self.host().skip_waiting().await,
        }
        Some(message)
    }
}
