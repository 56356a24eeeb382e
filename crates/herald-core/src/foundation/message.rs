//! Outgoing message payloads.
//!
//! The core produces two kinds of outbound content: plain text and embeds.
//! An [`Embed`] is a pure data carrier; how it is rendered is entirely the
//! platform's concern. Gateway implementations that speak a JSON wire format
//! can serialize payloads directly via [`OutgoingMessage::to_payload`].

use serde::{Deserialize, Serialize};

/// A single labelled field inside an embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    /// Field label.
    pub name: String,
    /// Field content.
    pub value: String,
    /// Whether the platform may lay this field out inline.
    #[serde(default)]
    pub inline: bool,
}

/// A rich display object sent alongside or instead of plain text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    /// Embed title.
    pub title: String,
    /// Body text below the title.
    #[serde(default)]
    pub description: String,
    /// Labelled fields in display order.
    #[serde(default)]
    pub fields: Vec<EmbedField>,
}

impl Embed {
    /// Creates an embed with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Sets the description text.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Appends a non-inline field.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline: false,
        });
        self
    }

    /// Appends an inline field.
    pub fn inline_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline: true,
        });
        self
    }
}

/// An outbound response payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutgoingMessage {
    /// Plain text.
    Text {
        /// Message body.
        content: String,
    },
    /// A rich embed.
    Embed {
        /// The embed data.
        embed: Embed,
    },
}

impl OutgoingMessage {
    /// Creates a plain-text message.
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
        }
    }

    /// Creates an embed message.
    pub fn embed(embed: Embed) -> Self {
        Self::Embed { embed }
    }

    /// Returns the plain-text body, if this is a text message.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { content } => Some(content),
            Self::Embed { .. } => None,
        }
    }

    /// Serializes the payload for gateways that ship JSON on the wire.
    pub fn to_payload(&self) -> serde_json::Value {
        // Serialization of these shapes cannot fail; fall back to null rather
        // than propagating an impossible error to every gateway.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl From<&str> for OutgoingMessage {
    fn from(content: &str) -> Self {
        Self::text(content)
    }
}

impl From<String> for OutgoingMessage {
    fn from(content: String) -> Self {
        Self::text(content)
    }
}

impl From<Embed> for OutgoingMessage {
    fn from(embed: Embed) -> Self {
        Self::embed(embed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embed_builder() {
        let embed = Embed::new("Server info")
            .description("Everything we know")
            .field("Members", "42")
            .inline_field("Region", "eu");

        assert_eq!(embed.title, "Server info");
        assert_eq!(embed.fields.len(), 2);
        assert!(!embed.fields[0].inline);
        assert!(embed.fields[1].inline);
    }

    #[test]
    fn test_payload_tags_variant() {
        let payload = OutgoingMessage::text("hi").to_payload();
        assert_eq!(payload["type"], "text");
        assert_eq!(payload["content"], "hi");

        let payload = OutgoingMessage::embed(Embed::new("t")).to_payload();
        assert_eq!(payload["type"], "embed");
        assert_eq!(payload["embed"]["title"], "t");
    }
}
