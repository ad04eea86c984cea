//! Pluggable stream-resolution seam.
//!
//! Turning a media reference into a playable URL is a strategy decision that
//! lives with the application (cloud folder lookup, cache check, indexer
//! fallback, and so on). The auth core only defines the seam; implementations
//! typically issue their provider calls through
//! [`crate::client::AuthedClient`].

use async_trait::async_trait;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Movie,
    Show,
}

/// Season/episode coordinates within a show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeRef {
    pub season: u32,
    pub episode: u32,
}

/// Reference to a playable item, keyed by its tracking-service id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRef {
    pub trakt_id: u64,
    pub kind: MediaKind,
    /// Required when `kind` is [`MediaKind::Show`].
    pub episode: Option<EpisodeRef>,
}

/// Resolves a media reference to a direct, playable stream URL.
#[async_trait]
pub trait StreamResolver: Send + Sync {
    async fn resolve_stream_url(&self, media: &MediaRef) -> Result<String>;
}
