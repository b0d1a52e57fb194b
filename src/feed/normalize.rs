//! Card normalization and the audio-link fallback.
//!
//! Each card moves through `has_audio | needs_fallback → resolved | dropped`.
//! Only `needs_fallback` touches the network, through the injected
//! [`DescriptorFetcher`].
use crate::feed::descriptor::{downloadable_audio_url, truthy_scalar, Card, FallbackDescriptor};
use crate::feed::fetcher::DescriptorFetcher;
use crate::feed::model::{Enclosure, FeedItem, ItemMetadata};
use crate::traverse::{decode, TraverseError};
use crate::util::{fallback_url, parse_datetime, resolve};
use url::Url;

/// Marker identifying a weblink that points at a nested playlist.
pub const PLAYLIST_MARKER: &str = "/playlist/";

/// Where a card's audio link comes from before any request is made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioState {
    /// The card embeds `downloadable_audio.url`.
    HasAudio(String),
    /// The link must be looked up at the per-item endpoint.
    NeedsFallback { endpoint: String },
}

/// Final state of the audio lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioResolution {
    Resolved(String),
    Dropped(DropReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The fallback endpoint could not be fetched.
    FallbackUnavailable,
    /// The fallback document has no audio either.
    NoAudio,
}

impl AudioState {
    pub fn for_card(card: &Card, node: &Url) -> Result<Self, TraverseError> {
        if let Some(url) = downloadable_audio_url(card.downloadable_audio.as_ref()) {
            return Ok(AudioState::HasAudio(url.to_string()));
        }

        let path_id = card
            .path_id
            .as_deref()
            .ok_or_else(|| TraverseError::MissingPathId {
                url: node.to_string(),
                title: card.title.clone(),
            })?;

        Ok(AudioState::NeedsFallback {
            endpoint: fallback_url(node, path_id),
        })
    }
}

/// Runs the audio lookup for one card.
///
/// A transport failure on the fallback endpoint drops the item and is
/// logged at error level; a malformed fallback document is fatal.
pub async fn resolve_audio<F: DescriptorFetcher>(
    card: &Card,
    node: &Url,
    fetcher: &F,
) -> Result<AudioResolution, TraverseError> {
    let endpoint = match AudioState::for_card(card, node)? {
        AudioState::HasAudio(url) => return Ok(AudioResolution::Resolved(url)),
        AudioState::NeedsFallback { endpoint } => endpoint,
    };

    tracing::debug!(title = %card.title, "Missing downloadable audio url, trying item endpoint");

    let bytes = match fetcher.fetch(&endpoint).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(url = %endpoint, error = %e, "Failed to fetch item descriptor");
            return Ok(AudioResolution::Dropped(DropReason::FallbackUnavailable));
        }
    };

    let fallback: FallbackDescriptor = decode(&endpoint, &bytes)?;
    Ok(
        match downloadable_audio_url(fallback.downloadable_audio.as_ref()) {
            Some(url) => AudioResolution::Resolved(url.to_string()),
            None => AudioResolution::Dropped(DropReason::NoAudio),
        },
    )
}

/// Builds the feed entry for a card whose audio link is known.
///
/// The episode fields are only required here; a card that never resolves
/// to audio is not checked for them.
pub fn build_item(card: &Card, node: &Url, audio_url: &str) -> Result<FeedItem, TraverseError> {
    let episode = card.episode().map_err(|source| TraverseError::IncompleteCard {
        url: node.to_string(),
        title: card.title.clone(),
        source,
    })?;

    let link = |target: &str| {
        resolve(node, target).map_err(|source| TraverseError::Link {
            url: node.to_string(),
            link: target.to_string(),
            source,
        })
    };

    let (season, episode_number) = match (
        truthy_scalar(card.season.as_ref()),
        truthy_scalar(card.episode.as_ref()),
    ) {
        (Some(season), Some(episode)) => (Some(season), Some(episode)),
        _ => (None, None),
    };

    Ok(FeedItem {
        id: FeedItem::id_for(&episode.uniquename),
        title: episode.toptitle,
        content: card
            .description
            .clone()
            .unwrap_or_else(|| card.title.clone()),
        url: link(&episode.track_info.page_url)?,
        update: parse_datetime(&format!("{} {}", episode.create_date, episode.create_time)),
        metadata: ItemMetadata {
            enclosure: Enclosure::audio(link(audio_url)?),
            duration: episode.audio.duration,
            image: Some(link(&episode.image)?),
            season,
            episode: episode_number,
            extensions: Vec::new(),
        },
    })
}

/// Normalizes one card; `None` when the item has no reachable audio.
pub async fn normalize_card<F: DescriptorFetcher>(
    card: &Card,
    node: &Url,
    fetcher: &F,
) -> Result<Option<FeedItem>, TraverseError> {
    match resolve_audio(card, node, fetcher).await? {
        AudioResolution::Resolved(audio_url) => build_item(card, node, &audio_url).map(Some),
        AudioResolution::Dropped(reason) => {
            tracing::debug!(title = %card.title, reason = ?reason, "Dropping item without audio");
            Ok(None)
        }
    }
}

/// The card's weblink when it points at a nested playlist.
pub fn playlist_weblink(card: &Card) -> Option<&str> {
    card.weblink
        .as_deref()
        .filter(|link| link.contains(PLAYLIST_MARKER))
}
