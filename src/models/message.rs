//! Outbound message value passed to the publisher.

/// A fully composed, renderable message.
///
/// Ephemeral: produced by the formatter and discarded after the publish
/// call completes or fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Markdown caption text
    pub caption: String,

    /// Image attached to the message, when available
    pub image_url: Option<String>,

    /// Label of the single inline action button
    pub button_label: String,

    /// URL the action button links to
    pub button_url: String,
}
