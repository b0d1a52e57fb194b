//! Utility functions shared by the traversal and feed modules.
//!
//! - **Dates**: tolerant parsing of the timestamp formats the service publishes
//! - **URLs**: node URL parsing, relative resolution and cycle checks
//!
//! # Examples
//!
//! ```
//! use raiplaysound_rss::util::{parse_datetime, parse_node_url, resolve};
//!
//! let node = parse_node_url("https://www.raiplaysound.it/programmi/x").unwrap();
//! let child = resolve(&node, "/playlist/y").unwrap();
//! assert_eq!(child.path(), "/playlist/y");
//!
//! assert!(parse_datetime("01-02-2023 10:00").is_some());
//! ```

mod dates;
mod urls;

pub use self::dates::parse_datetime;
pub use self::urls::{
    descriptor_url, fallback_url, feed_file_name, is_self_or_visited, parse_node_url, resolve,
    UrlError,
};
