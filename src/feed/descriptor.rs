//! Typed view of the JSON documents served for programme and playlist pages.
//!
//! Keys the service always sends are plain fields, so a document without
//! them fails to decode. Keys that are sometimes missing or `null` are
//! `Option` or defaulted.
use serde::Deserialize;
use serde_json::{Map, Value};

/// The `<page>.json` document describing one node.
#[derive(Debug, Clone, Deserialize)]
pub struct Descriptor {
    pub title: String,
    pub podcast_info: PodcastInfo,
    pub tab_menu: Vec<TabMenuEntry>,
    pub block: Block,
    pub track_info: TrackInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PodcastInfo {
    #[serde(default)]
    pub description: Option<String>,
    pub image: String,
    pub genres: Vec<Category>,
    pub subgenres: Vec<Category>,
    pub dfp: Dfp,
    #[serde(default)]
    pub typology: Option<String>,
    #[serde(default)]
    pub metadata: Option<PodcastMetadata>,
}

/// Advertising targeting block; its escaped lists double as categories.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Dfp {
    #[serde(default)]
    pub escaped_genres: Vec<Category>,
    #[serde(default)]
    pub escaped_typology: Vec<Category>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PodcastMetadata {
    #[serde(default)]
    pub product_sources: Vec<Category>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Category {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TabMenuEntry {
    pub content_type: String,
    pub weblink: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Block {
    #[serde(default)]
    pub update_date: Option<String>,
    pub cards: Vec<Card>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackInfo {
    #[serde(default)]
    pub date: Option<String>,
}

/// The subset of a page document read before deciding whether to skip it.
#[derive(Debug, Clone, Deserialize)]
pub struct TypologyView {
    pub podcast_info: TypologyInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypologyInfo {
    #[serde(default)]
    pub typology: Option<String>,
}

/// One record inside `block.cards`.
///
/// Only the keys needed to route the card are decoded up front. A card may
/// just point at a nested playlist, so the episode fields stay in
/// `details` until the card has an audio link.
#[derive(Debug, Clone, Deserialize)]
pub struct Card {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub weblink: Option<String>,
    #[serde(default)]
    pub path_id: Option<String>,
    #[serde(default)]
    pub downloadable_audio: Option<Value>,
    #[serde(default)]
    pub season: Option<Value>,
    #[serde(default)]
    pub episode: Option<Value>,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl Card {
    /// Decodes the keys an episode needs; fails when any is missing.
    pub fn episode(&self) -> Result<EpisodeDetails, serde_json::Error> {
        serde_json::from_value(Value::Object(self.details.clone()))
    }
}

/// Fields of a card that only matter once it becomes a feed item.
#[derive(Debug, Clone, Deserialize)]
pub struct EpisodeDetails {
    pub toptitle: String,
    pub uniquename: String,
    pub create_date: String,
    pub create_time: String,
    pub image: String,
    pub audio: CardAudio,
    pub track_info: CardTrackInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CardAudio {
    pub duration: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CardTrackInfo {
    pub page_url: String,
}

/// The per-item fallback document; only the audio link is of interest.
#[derive(Debug, Clone, Deserialize)]
pub struct FallbackDescriptor {
    #[serde(default)]
    pub downloadable_audio: Option<Value>,
}

/// Extracts a usable `downloadable_audio.url`, treating empty objects and
/// empty strings as absent.
pub fn downloadable_audio_url(value: Option<&Value>) -> Option<&str> {
    value?
        .get("url")?
        .as_str()
        .filter(|url| !url.is_empty())
}

/// Season/episode values arrive as strings or numbers. Empty strings, zero,
/// `false` and `null` count as absent.
pub fn truthy_scalar(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_downloadable_audio_url() {
        let v = json!({"url": "https://example.com/a.mp3"});
        assert_eq!(downloadable_audio_url(Some(&v)), Some("https://example.com/a.mp3"));
        assert_eq!(downloadable_audio_url(Some(&json!({}))), None);
        assert_eq!(downloadable_audio_url(Some(&json!({"url": ""}))), None);
        assert_eq!(downloadable_audio_url(Some(&Value::Null)), None);
        assert_eq!(downloadable_audio_url(None), None);
    }

    #[test]
    fn test_truthy_scalar() {
        assert_eq!(truthy_scalar(Some(&json!("3"))), Some("3".to_string()));
        assert_eq!(truthy_scalar(Some(&json!(2))), Some("2".to_string()));
        assert_eq!(truthy_scalar(Some(&json!(""))), None);
        assert_eq!(truthy_scalar(Some(&json!(0))), None);
        assert_eq!(truthy_scalar(Some(&json!(null))), None);
        assert_eq!(truthy_scalar(Some(&json!(false))), None);
        assert_eq!(truthy_scalar(None), None);
    }

    #[test]
    fn test_optional_podcast_keys_default() {
        let info: PodcastInfo = serde_json::from_value(json!({
            "image": "/img.jpg",
            "genres": [],
            "subgenres": [],
            "dfp": {}
        }))
        .unwrap();
        assert!(info.description.is_none());
        assert!(info.typology.is_none());
        assert!(info.metadata.is_none());
        assert!(info.dfp.escaped_genres.is_empty());
    }

    #[test]
    fn test_missing_podcast_info_is_an_error() {
        let result: Result<Descriptor, _> = serde_json::from_value(json!({
            "title": "x",
            "tab_menu": [],
            "block": {"update_date": "", "cards": []},
            "track_info": {"date": ""}
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_null_timestamps_decode_as_absent() {
        let block: Block =
            serde_json::from_value(json!({"update_date": null, "cards": []})).unwrap();
        assert!(block.update_date.is_none());

        let track: TrackInfo = serde_json::from_value(json!({})).unwrap();
        assert!(track.date.is_none());
    }

    #[test]
    fn test_playlist_card_needs_no_episode_fields() {
        let card: Card = serde_json::from_value(json!({
            "title": "Speciali",
            "weblink": "/playlist/speciali",
            "path_id": "/playlist/speciali.json"
        }))
        .unwrap();

        assert_eq!(card.weblink.as_deref(), Some("/playlist/speciali"));
        let err = card.episode().unwrap_err();
        assert!(err.to_string().contains("toptitle"));
    }

    #[test]
    fn test_episode_details_from_card() {
        let card: Card = serde_json::from_value(json!({
            "title": "Puntata",
            "toptitle": "Puntata 1",
            "uniquename": "ContentItem-1",
            "create_date": "01-02-2023",
            "create_time": "10:00",
            "image": "/img.jpg",
            "audio": {"duration": "00:10:00"},
            "track_info": {"page_url": "/audio/1"},
            "season": "1"
        }))
        .unwrap();

        assert_eq!(card.season, Some(json!("1")));
        assert!(!card.details.contains_key("title"));
        let episode = card.episode().unwrap();
        assert_eq!(episode.uniquename, "ContentItem-1");
        assert_eq!(episode.audio.duration, "00:10:00");
    }

    #[test]
    fn test_typology_view_ignores_the_rest() {
        let view: TypologyView = serde_json::from_value(json!({
            "title": "GR",
            "podcast_info": {"typology": "Programmi Radio"}
        }))
        .unwrap();
        assert_eq!(view.podcast_info.typology.as_deref(), Some("Programmi Radio"));
    }
}
