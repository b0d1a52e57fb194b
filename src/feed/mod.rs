//! Feed synthesis: from service descriptors to RSS documents.
//!
//! - **Descriptors**: typed records of the JSON the service publishes per page
//! - **Fetching**: the transport seam, with an HTTP implementation
//! - **Normalization**: one card to one episode, including the audio fallback
//! - **Assembly**: channel metadata, categories and items for a node
//! - **Sorting**: season/episode or chronological ordering
//! - **Encoding**: RSS 2.0 with the iTunes namespace, written through a sink
//!
//! # Architecture
//!
//! - [`descriptor`] - serde models of the page and item documents
//! - [`fetcher`] - [`DescriptorFetcher`] trait and [`HttpFetcher`]
//! - [`model`] - [`Feed`] and [`FeedItem`]
//! - [`normalize`] - per-card audio state machine and item builder
//! - [`categories`] - category aggregation
//! - [`assemble`] - feed assembly
//! - [`sort`] - item ordering strategies
//! - [`rss`] - XML encoder built on `quick-xml`
//! - [`sink`] - stdout and directory outputs

pub mod assemble;
pub mod categories;
pub mod descriptor;
pub mod fetcher;
pub mod model;
pub mod normalize;
pub mod rss;
pub mod sink;
pub mod sort;

pub use assemble::{assemble_feed, ChannelDefaults};
pub use descriptor::Descriptor;
pub use fetcher::{DescriptorFetcher, FetchError, HttpFetcher};
pub use model::{Enclosure, Feed, FeedItem, FeedMetadata, ItemMetadata};
pub use rss::to_rss_string;
pub use sink::{DirectorySink, FeedSink, SinkError, WriterSink};
pub use sort::{sort_items, SortStrategy};
