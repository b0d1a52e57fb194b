//! Walks a programme and its nested playlists, emitting one feed per node.
//!
//! Each node goes through `created → fetching → (skipped | failed |
//! assembled) → emitted → done`. Children are processed to completion
//! before their parent is assembled, so nested feeds are emitted first.
//! The walk uses an explicit stack; the set of visited node URLs is owned by
//! the [`Traverser`] and is the only protection against cyclic links.
use serde::de::DeserializeOwned;
use std::collections::{HashSet, VecDeque};
use thiserror::Error;
use url::Url;

use crate::feed::assemble::{assemble_feed, ChannelDefaults};
use crate::feed::descriptor::{Descriptor, TypologyView};
use crate::feed::fetcher::DescriptorFetcher;
use crate::feed::model::Feed;
use crate::feed::normalize::playlist_weblink;
use crate::feed::sink::{FeedSink, SinkError};
use crate::feed::sort::sort_items;
use crate::util::{descriptor_url, is_self_or_visited, resolve, UrlError};

/// Typologies skipped unless programmes are explicitly requested.
const PROGRAM_TYPOLOGIES: [&str; 2] = ["programmi radio", "informazione notiziari"];
/// Typologies skipped unless films are explicitly requested.
const FILM_TYPOLOGIES: [&str; 2] = ["film", "fiction"];

/// Tab-menu content type that designates a nested playlist.
const PLAYLIST_CONTENT_TYPE: &str = "playlist";

/// Errors that stop the whole run.
///
/// Transport failures are not here: they are logged and only cut off the
/// node or item that hit them.
#[derive(Debug, Error)]
pub enum TraverseError {
    #[error("Malformed document at {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Card {title:?} in {url} has neither downloadable audio nor a path_id")]
    MissingPathId { url: String, title: String },

    #[error("Card {title:?} in {url} has audio but is missing episode fields: {source}")]
    IncompleteCard {
        url: String,
        title: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cannot resolve link {link:?} from {url}: {source}")]
    Link {
        url: String,
        link: String,
        #[source]
        source: UrlError,
    },

    #[error("Failed to emit feed for {url}: {source}")]
    Emit {
        url: String,
        #[source]
        source: SinkError,
    },
}

/// Decodes a fetched JSON document; failures are fatal.
pub(crate) fn decode<T: DeserializeOwned>(url: &str, bytes: &[u8]) -> Result<T, TraverseError> {
    serde_json::from_slice(bytes).map_err(|source| TraverseError::Decode {
        url: url.to_string(),
        source,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalOptions {
    /// Skip radio programmes and news bulletins.
    pub skip_programs: bool,
    /// Skip films and fiction.
    pub skip_films: bool,
    pub channel: ChannelDefaults,
}

impl Default for TraversalOptions {
    fn default() -> Self {
        Self {
            skip_programs: true,
            skip_films: true,
            channel: ChannelDefaults::default(),
        }
    }
}

impl TraversalOptions {
    pub fn should_skip(&self, typology: &str) -> bool {
        let typology = typology.to_lowercase();
        (self.skip_programs && PROGRAM_TYPOLOGIES.contains(&typology.as_str()))
            || (self.skip_films && FILM_TYPOLOGIES.contains(&typology.as_str()))
    }
}

/// What happened when a node's descriptor was requested.
#[derive(Debug)]
enum Opened {
    Assembling(PendingNode),
    Failed,
    Skipped,
}

/// A node whose descriptor is loaded and whose playlist links are still
/// being walked.
#[derive(Debug)]
struct PendingNode {
    url: Url,
    descriptor: Descriptor,
    links: VecDeque<Url>,
    children: Vec<Feed>,
}

/// Playlist links of a node, in discovery order: tab menu first, then cards.
pub fn playlist_links(node: &Url, descriptor: &Descriptor) -> Result<Vec<Url>, TraverseError> {
    let tabs = descriptor
        .tab_menu
        .iter()
        .filter(|tab| tab.content_type == PLAYLIST_CONTENT_TYPE)
        .map(|tab| tab.weblink.as_str());
    let cards = descriptor.block.cards.iter().filter_map(playlist_weblink);

    tabs.chain(cards)
        .map(|link| {
            resolve(node, link).map_err(|source| TraverseError::Link {
                url: node.to_string(),
                link: link.to_string(),
                source,
            })
        })
        .collect()
}

/// One traversal run: fetcher, output and the visited set.
pub struct Traverser<'a, F, S> {
    fetcher: &'a F,
    sink: &'a mut S,
    options: TraversalOptions,
    visited: HashSet<Url>,
}

impl<'a, F: DescriptorFetcher, S: FeedSink> Traverser<'a, F, S> {
    pub fn new(fetcher: &'a F, sink: &'a mut S, options: TraversalOptions) -> Self {
        Self {
            fetcher,
            sink,
            options,
            visited: HashSet::new(),
        }
    }

    /// Node URLs entered so far.
    pub fn visited(&self) -> &HashSet<Url> {
        &self.visited
    }

    /// Processes `root` and everything reachable from it.
    ///
    /// Returns the root's feed followed by the feeds of its descendants,
    /// in discovery order. A root that fails to load or is skipped yields
    /// an empty list. Every feed with at least one item has already been
    /// written to the sink when this returns.
    ///
    /// # Errors
    ///
    /// Malformed documents, missing required keys and sink failures abort
    /// the run with a [`TraverseError`].
    pub async fn process(&mut self, root: Url) -> Result<Vec<Feed>, TraverseError> {
        self.visited.insert(root.clone());

        let mut stack = match self.open(root).await? {
            Opened::Assembling(node) => vec![node],
            Opened::Failed | Opened::Skipped => return Ok(Vec::new()),
        };

        while let Some(top) = stack.last_mut() {
            if let Some(link) = top.links.pop_front() {
                if is_self_or_visited(&link, &top.url, &self.visited) {
                    tracing::debug!(parent = %top.url, url = %link, "Already visited");
                    continue;
                }
                self.visited.insert(link.clone());
                if let Opened::Assembling(child) = self.open(link).await? {
                    stack.push(child);
                }
                continue;
            }

            let Some(node) = stack.pop() else { break };
            let feeds = self.finish(node).await?;
            match stack.last_mut() {
                Some(parent) => parent.children.extend(feeds),
                None => return Ok(feeds),
            }
        }

        Ok(Vec::new())
    }

    async fn open(&self, url: Url) -> Result<Opened, TraverseError> {
        let endpoint = descriptor_url(&url);
        let bytes = match self.fetcher.fetch(&endpoint).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(url = %url, error = %e, "Failed to fetch descriptor");
                return Ok(Opened::Failed);
            }
        };

        // Skipped pages are only read as far as their typology.
        let view: TypologyView = decode(&endpoint, &bytes)?;
        let typology = view.podcast_info.typology.as_deref().unwrap_or("");
        if self.options.should_skip(typology) {
            tracing::debug!(url = %url, typology = %typology, "Skipped");
            return Ok(Opened::Skipped);
        }

        let descriptor: Descriptor = decode(&endpoint, &bytes)?;

        let links = playlist_links(&url, &descriptor)?;
        Ok(Opened::Assembling(PendingNode {
            url,
            descriptor,
            links: links.into(),
            children: Vec::new(),
        }))
    }

    /// Assembles, sorts and emits a node whose children are done.
    async fn finish(&mut self, node: PendingNode) -> Result<Vec<Feed>, TraverseError> {
        let mut feed = assemble_feed(
            &node.url,
            &node.descriptor,
            &self.options.channel,
            self.fetcher,
        )
        .await?;

        if feed.items.is_empty() {
            if node.children.is_empty() {
                tracing::debug!(url = %node.url, "Empty");
            }
        } else {
            let strategy = sort_items(&mut feed.items);
            tracing::info!(
                url = %node.url,
                items = feed.items.len(),
                strategy = ?strategy,
                "Emitting feed"
            );
            self.sink
                .emit(&feed)
                .map_err(|source| TraverseError::Emit {
                    url: node.url.to_string(),
                    source,
                })?;
        }

        let mut feeds = Vec::with_capacity(node.children.len() + 1);
        feeds.push(feed);
        feeds.extend(node.children);
        Ok(feeds)
    }
}
