//! Builds podcast RSS feeds from RaiPlaySound programme and playlist pages.
//!
//! ```ignore
//! use raiplaysound_rss::feed::{HttpFetcher, WriterSink};
//! use raiplaysound_rss::traverse::{TraversalOptions, Traverser};
//!
//! let fetcher = HttpFetcher::new(reqwest::Client::new());
//! let mut sink = WriterSink::stdout();
//! let root = raiplaysound_rss::util::parse_node_url(url)?;
//! let feeds = Traverser::new(&fetcher, &mut sink, TraversalOptions::default())
//!     .process(root)
//!     .await?;
//! ```

pub mod config;
pub mod feed;
pub mod traverse;
pub mod util;
