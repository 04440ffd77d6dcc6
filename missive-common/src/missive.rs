//! The message-to-send value object.

use core::fmt::{self, Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    config::{ConfigMap, ConfigValue},
    status::DeliveryStatus,
};

/// The kind of message a missive carries, which determines the provider
/// candidate list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MissiveType {
    Email,
    Sms,
    VoiceCall,
    Postal,
    PostalRegistered,
    PushNotification,
    Notification,
    Branded,
    Lre,
}

impl MissiveType {
    pub const ALL: [Self; 9] = [
        Self::Email,
        Self::Sms,
        Self::VoiceCall,
        Self::Postal,
        Self::PostalRegistered,
        Self::PushNotification,
        Self::Notification,
        Self::Branded,
        Self::Lre,
    ];

    /// Lower-snake rendering used to derive per-type configuration keys
    /// (e.g. `email_geographic_coverage`).
    #[must_use]
    pub const fn as_config_key(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Sms => "sms",
            Self::VoiceCall => "voice_call",
            Self::Postal => "postal",
            Self::PostalRegistered => "postal_registered",
            Self::PushNotification => "push_notification",
            Self::Notification => "notification",
            Self::Branded => "branded",
            Self::Lre => "lre",
        }
    }
}

impl Display for MissiveType {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(fmt, "{}", self.as_config_key())
    }
}

/// A rich recipient carrying arbitrary metadata used for provider-specific
/// addressing (device tokens, chat handles, country hints).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recipient {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "crate::config::map_is_empty")]
    pub metadata: ConfigMap,
}

/// A message to send through one of several interchangeable providers.
///
/// The missive is created by the caller and mutated exclusively by the
/// dispatcher (status transitions) and by the winning provider
/// (`external_id`). Persistence is the caller's responsibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Missive {
    pub missive_type: MissiveType,
    pub body: String,
    /// Optional plain-text variant; falls back to `body`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<Recipient>,
    pub status: DeliveryStatus,
    /// Provider-assigned identifier, stamped by the winning provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Explicit provider choice before dispatch; provenance after it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "crate::config::map_is_empty")]
    pub provider_options: ConfigMap,
    #[serde(default)]
    pub is_registered: bool,
    #[serde(default)]
    pub requires_signature: bool,
}

impl Missive {
    /// Create a draft missive with the given type and body.
    #[must_use]
    pub fn new(missive_type: MissiveType, body: impl Into<String>) -> Self {
        Self {
            missive_type,
            body: body.into(),
            body_text: None,
            subject: None,
            recipient_email: None,
            recipient_phone: None,
            recipient: None,
            status: DeliveryStatus::Draft,
            external_id: None,
            error_message: None,
            provider: None,
            sent_at: None,
            delivered_at: None,
            read_at: None,
            provider_options: ConfigMap::default(),
            is_registered: false,
            requires_signature: false,
        }
    }

    /// The plain-text variant of the body, falling back to the body itself.
    #[must_use]
    pub fn plain_text(&self) -> &str {
        self.body_text.as_deref().unwrap_or(&self.body)
    }

    /// Checks whether the missive can still be sent.
    #[must_use]
    pub fn can_send(&self) -> bool {
        matches!(self.status, DeliveryStatus::Draft | DeliveryStatus::Pending)
    }

    /// Look up a provider option by key.
    #[must_use]
    pub fn provider_option(&self, key: &str) -> Option<&ConfigValue> {
        self.provider_options.get(key)
    }

    /// Look up a recipient metadata entry by key.
    #[must_use]
    pub fn recipient_metadata(&self, key: &str) -> Option<&ConfigValue> {
        self.recipient.as_ref().and_then(|r| r.metadata.get(key))
    }

    /// Stamp the missive as sent through `provider`.
    ///
    /// The winning provider is responsible for `external_id`; this only
    /// touches status, provenance, and the sent timestamp.
    pub fn mark_sent(&mut self, provider: &str) {
        self.status = DeliveryStatus::Sent;
        self.provider = Some(provider.to_string());
        self.sent_at = Some(Utc::now());
    }

    /// Stamp the missive as failed with an aggregate error message.
    pub fn mark_failed(&mut self, error: impl Into<String>) {
        self.status = DeliveryStatus::Failed;
        self.error_message = Some(error.into());
    }
}
