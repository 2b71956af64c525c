//! Security-focused logging module to track authentication events
//!
//! Keeps the internal distinctions that callers never see, e.g. whether a
//! failed login named an unknown user or gave a wrong password.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::claims::TokenKind;

/// Why a login attempt failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFailureReason {
    UnknownUser,
    BadCredential,
}

/// Types of security events to track
#[derive(Debug, Clone)]
pub enum SecurityEvent {
    // Registration events
    RegistrationSucceeded { username: String, user_id: Uuid },
    RegistrationRejected { username: String, reason: String },

    // Authentication events
    LoginSucceeded { username: String },
    LoginFailed { username: String, reason: LoginFailureReason },
    TokenIssued { subject: String, kind: TokenKind, token_id: Uuid },
    TokenRejected { expected: TokenKind, reason: String },

    // Session events
    RefreshSucceeded { subject: String, token_id: Uuid },
    RefreshRejected { reason: String },

    // System security
    ConfigurationError { component: String, error: String },
}

impl SecurityEvent {
    /// Stable key used for counters and alert thresholds
    pub fn key(&self) -> &'static str {
        match self {
            SecurityEvent::RegistrationSucceeded { .. } => "registration_success",
            SecurityEvent::RegistrationRejected { .. } => "registration_rejected",
            SecurityEvent::LoginSucceeded { .. } => "login_success",
            SecurityEvent::LoginFailed { reason: LoginFailureReason::UnknownUser, .. } => "login_unknown_user",
            SecurityEvent::LoginFailed { reason: LoginFailureReason::BadCredential, .. } => "login_bad_credential",
            SecurityEvent::TokenIssued { .. } => "token_issued",
            SecurityEvent::TokenRejected { .. } => "token_rejected",
            SecurityEvent::RefreshSucceeded { .. } => "refresh_success",
            SecurityEvent::RefreshRejected { .. } => "refresh_rejected",
            SecurityEvent::ConfigurationError { .. } => "config_error",
        }
    }
}

/// Security event with timestamp
#[derive(Debug, Clone)]
struct TimestampedEvent {
    event: SecurityEvent,
    timestamp: Instant,
}

/// Security logger for tracking and alerting on security events
pub struct SecurityLogger {
    events: Arc<RwLock<Vec<TimestampedEvent>>>,
    /// Totals since start, never reset
    event_counts: Arc<RwLock<HashMap<&'static str, usize>>>,
    /// Counts since the last alert per key
    alert_counts: Arc<RwLock<HashMap<&'static str, usize>>>,
    max_events: usize,
    alert_thresholds: HashMap<&'static str, usize>,
}

impl SecurityLogger {
    /// Create a new security logger
    pub fn new() -> Self {
        let mut alert_thresholds = HashMap::new();
        alert_thresholds.insert("login_bad_credential", 5);
        alert_thresholds.insert("login_unknown_user", 10);
        alert_thresholds.insert("token_rejected", 10);
        alert_thresholds.insert("refresh_rejected", 10);
        alert_thresholds.insert("registration_rejected", 20);
        alert_thresholds.insert("config_error", 1);

        Self {
            events: Arc::new(RwLock::new(Vec::new())),
            event_counts: Arc::new(RwLock::new(HashMap::new())),
            alert_counts: Arc::new(RwLock::new(HashMap::new())),
            max_events: 10000,
            alert_thresholds,
        }
    }

    /// Cap the number of retained events
    pub fn with_max_events(mut self, max_events: usize) -> Self {
        self.max_events = max_events;
        self
    }

    /// Log a security event
    pub async fn log_event(&self, event: SecurityEvent) {
        let event_key = event.key();

        {
            let mut events = self.events.write().await;
            events.push(TimestampedEvent {
                event: event.clone(),
                timestamp: Instant::now(),
            });

            // Limit memory usage
            if events.len() > self.max_events {
                let events_to_remove = events.len() - self.max_events;
                events.drain(0..events_to_remove);
            }
        }

        *self.event_counts.write().await.entry(event_key).or_insert(0) += 1;

        if let Some(&threshold) = self.alert_thresholds.get(event_key) {
            let mut alert_counts = self.alert_counts.write().await;
            let count = alert_counts.entry(event_key).or_insert(0);
            *count += 1;
            if *count >= threshold {
                self.trigger_alert(event_key, *count, &event);
                *count = 0;
            }
        }

        match event {
            SecurityEvent::RegistrationSucceeded { username, user_id } => {
                log::info!("SECURITY: Registration success - User: {}, Id: {}", username, user_id);
            }
            SecurityEvent::RegistrationRejected { username, reason } => {
                log::warn!("SECURITY: Registration rejected - User: {}, Reason: {}", username, reason);
            }
            SecurityEvent::LoginSucceeded { username } => {
                log::info!("SECURITY: Login success - User: {}", username);
            }
            SecurityEvent::LoginFailed { username, reason } => {
                log::warn!("SECURITY: Login failed - User: {}, Reason: {:?}", username, reason);
            }
            SecurityEvent::TokenIssued { subject, kind, token_id } => {
                log::debug!("SECURITY: Token issued - Subject: {}, Kind: {}, Token: {}", subject, kind, token_id);
            }
            SecurityEvent::TokenRejected { expected, reason } => {
                log::warn!("SECURITY: Token rejected - Expected: {}, Reason: {}", expected, reason);
            }
            SecurityEvent::RefreshSucceeded { subject, token_id } => {
                log::info!("SECURITY: Refresh success - Subject: {}, Refresh token: {}", subject, token_id);
            }
            SecurityEvent::RefreshRejected { reason } => {
                log::warn!("SECURITY: Refresh rejected - Reason: {}", reason);
            }
            SecurityEvent::ConfigurationError { component, error } => {
                log::error!("SECURITY: Configuration error - Component: {}, Error: {}", component, error);
            }
        }
    }

    /// Trigger security alert
    fn trigger_alert(&self, event_type: &str, count: usize, sample_event: &SecurityEvent) {
        log::error!("SECURITY ALERT: {} events of type '{}' detected", count, event_type);
        log::error!("Sample event: {:?}", sample_event);
    }

    /// Get recent security events
    pub async fn get_recent_events(&self, duration: Duration) -> Vec<SecurityEvent> {
        let events = self.events.read().await;
        let cutoff = Instant::now().checked_sub(duration);

        events
            .iter()
            .filter(|event| cutoff.map_or(true, |cutoff| event.timestamp > cutoff))
            .map(|event| event.event.clone())
            .collect()
    }

    /// Total number of events seen for `key`
    pub async fn event_count(&self, key: &str) -> usize {
        self.event_counts.read().await.get(key).copied().unwrap_or(0)
    }

    /// Get event statistics
    pub async fn get_event_stats(&self) -> HashMap<&'static str, usize> {
        self.event_counts.read().await.clone()
    }

    /// Clean up old events
    pub async fn cleanup_old_events(&self, max_age: Duration) {
        let Some(cutoff) = Instant::now().checked_sub(max_age) else {
            return;
        };
        self.events.write().await.retain(|event| event.timestamp > cutoff);
    }
}

impl Default for SecurityLogger {
    fn default() -> Self {
        Self::new()
    }
}
