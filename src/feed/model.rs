use chrono::NaiveDateTime;
use std::collections::BTreeSet;
use url::Url;

/// Prefix of every item id; keeps ids stable with feeds already published.
pub const ITEM_ID_NAMESPACE: &str = "timendum-raiplaysound";

/// Media type used for every enclosure.
pub const AUDIO_MIME_TYPE: &str = "audio/mpeg";

/// One node's synthesized feed.
#[derive(Debug, Clone, PartialEq)]
pub struct Feed {
    url: Url,
    pub title: String,
    pub description: String,
    pub update: Option<NaiveDateTime>,
    pub items: Vec<FeedItem>,
    pub metadata: FeedMetadata,
}

impl Feed {
    /// Creates an empty feed for the node at `url`.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            title: String::new(),
            description: String::new(),
            update: None,
            items: Vec::new(),
            metadata: FeedMetadata::default(),
        }
    }

    /// The node this feed was built from. Fixed at construction.
    pub fn url(&self) -> &Url {
        &self.url
    }
}

/// Channel-level metadata rendered into RSS and iTunes tags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedMetadata {
    pub image: Option<Url>,
    pub author: String,
    pub language: String,
    pub owner_email: String,
    pub categories: BTreeSet<String>,
    /// Extra `(tag, text)` elements written verbatim after the known ones.
    pub extensions: Vec<(String, String)>,
}

/// One episode.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedItem {
    pub id: String,
    pub title: String,
    pub content: String,
    pub url: Url,
    pub update: Option<NaiveDateTime>,
    pub metadata: ItemMetadata,
}

impl FeedItem {
    /// Builds the globally unique id for a card's `uniquename`.
    pub fn id_for(uniquename: &str) -> String {
        format!("{}-{}", ITEM_ID_NAMESPACE, uniquename)
    }

    /// Season and episode, only when both are known.
    pub fn season_episode(&self) -> Option<(&str, &str)> {
        match (&self.metadata.season, &self.metadata.episode) {
            (Some(season), Some(episode)) => Some((season.as_str(), episode.as_str())),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemMetadata {
    pub enclosure: Enclosure,
    pub duration: String,
    pub image: Option<Url>,
    pub season: Option<String>,
    pub episode: Option<String>,
    pub extensions: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enclosure {
    pub mime_type: String,
    pub url: Url,
}

impl Enclosure {
    pub fn audio(url: Url) -> Self {
        Self {
            mime_type: AUDIO_MIME_TYPE.to_string(),
            url,
        }
    }
}
