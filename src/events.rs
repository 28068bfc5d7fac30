//! Fire-and-forget notifications about credential and submission activity.
//!
//! Components hold an [`EventSink`] and call `notify`; delivery never blocks and never
//! fails the caller. The default sink forwards into a bounded channel drained by a
//! background task that writes structured `tracing` records.

use crate::utils::logging::with_pretty_json_debug;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SitepushEvent {
    AuthorizationCompleted {
        credential_id: i64,
        expires_at: DateTime<Utc>,
    },
    TokenRefreshed {
        credential_id: i64,
        expires_at: DateTime<Utc>,
    },
    BatchSubmitted {
        success_count: usize,
        error_count: usize,
        total: usize,
    },
    AutoSubmitted {
        url: String,
        page_type: String,
        reference_id: Option<String>,
    },
    AutoSubmitSkipped {
        url: String,
        reason: String,
    },
    SitemapSubmitted {
        sitemap_url: String,
        submitted_at: DateTime<Utc>,
    },
}

impl SitepushEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SitepushEvent::AuthorizationCompleted { .. } => "authorization_completed",
            SitepushEvent::TokenRefreshed { .. } => "token_refreshed",
            SitepushEvent::BatchSubmitted { .. } => "batch_submitted",
            SitepushEvent::AutoSubmitted { .. } => "auto_submitted",
            SitepushEvent::AutoSubmitSkipped { .. } => "auto_submit_skipped",
            SitepushEvent::SitemapSubmitted { .. } => "sitemap_submitted",
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, event: SitepushEvent);
}

pub type EventSink = Arc<dyn Notifier>;

/// Forwards events into a bounded channel. Drops (with a warning) when the channel is full.
pub struct ChannelNotifier {
    tx: mpsc::Sender<SitepushEvent>,
}

impl ChannelNotifier {
    pub fn new(tx: mpsc::Sender<SitepushEvent>) -> Self {
        Self { tx }
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, event: SitepushEvent) {
        if let Err(e) = self.tx.try_send(event) {
            warn!("Dropping event (channel closed/full): {}", e);
        }
    }
}

/// Discards every event.
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _event: SitepushEvent) {}
}

/// Spawn the logging drain and return a sink feeding it. Must run inside a tokio runtime.
pub fn spawn_log_sink(capacity: usize) -> EventSink {
    let (tx, mut rx) = mpsc::channel::<SitepushEvent>(capacity.max(1));

    tokio::spawn(async move {
        debug!("Event sink started");
        while let Some(event) = rx.recv().await {
            info!(event = event.name(), "sitepush event");
            with_pretty_json_debug(&event, |json| {
                debug!(event = event.name(), body = %json, "sitepush event payload");
            });
        }
        debug!("Event sink stopped");
    });

    Arc::new(ChannelNotifier::new(tx))
}
