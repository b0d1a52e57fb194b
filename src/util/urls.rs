use std::collections::HashSet;
use thiserror::Error;
use url::Url;

/// Errors that can occur while parsing or resolving node URLs.
#[derive(Error, Debug)]
pub enum UrlError {
    /// The URL string could not be parsed or joined.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
}

/// Parses the URL of a programme or playlist page.
///
/// Only `http` and `https` are accepted, since every node is fetched over
/// HTTP and its origin is reused for the per-item fallback endpoint.
///
/// # Examples
///
/// ```
/// use raiplaysound_rss::util::parse_node_url;
///
/// let url = parse_node_url("https://www.raiplaysound.it/programmi/lezionidimusica").unwrap();
/// assert_eq!(url.host_str(), Some("www.raiplaysound.it"));
///
/// assert!(parse_node_url("file:///etc/passwd").is_err());
/// ```
pub fn parse_node_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str)?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(UrlError::UnsupportedScheme(scheme.to_owned())),
    }
}

/// Resolves `link` against `base` using standard relative-URL rules.
pub fn resolve(base: &Url, link: &str) -> Result<Url, UrlError> {
    Ok(base.join(link)?)
}

/// True when `candidate` is the node itself or a node this run already entered.
///
/// This is the only thing that stops cyclic playlist links; there is no
/// depth limit.
pub fn is_self_or_visited(candidate: &Url, base: &Url, visited: &HashSet<Url>) -> bool {
    candidate == base || visited.contains(candidate)
}

/// The JSON descriptor location for a node: the page URL with `.json` appended.
pub fn descriptor_url(node: &Url) -> String {
    format!("{}.json", node.as_str())
}

/// The per-item fallback endpoint: the node's origin followed by `path_id`.
pub fn fallback_url(node: &Url, path_id: &str) -> String {
    format!(
        "{}/{}",
        node.origin().ascii_serialization(),
        path_id.trim_start_matches('/')
    )
}

/// File name used when feeds are written to a directory: last path segment plus `.xml`.
pub fn feed_file_name(node: &Url) -> String {
    let segment = node
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .unwrap_or("feed");
    format!("{}.xml", segment)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node() -> Url {
        Url::parse("https://www.raiplaysound.it/programmi/lezionidimusica").unwrap()
    }

    #[test]
    fn test_valid_urls() {
        assert!(parse_node_url("https://www.raiplaysound.it/programmi/x").is_ok());
        assert!(parse_node_url("http://127.0.0.1:8080/playlist/x").is_ok());
    }

    #[test]
    fn test_invalid_schemes() {
        assert!(matches!(
            parse_node_url("ftp://example.com/x"),
            Err(UrlError::UnsupportedScheme(s)) if s == "ftp"
        ));
        assert!(matches!(
            parse_node_url("not a url"),
            Err(UrlError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        let base = node();
        assert_eq!(
            resolve(&base, "/playlist/classica").unwrap().as_str(),
            "https://www.raiplaysound.it/playlist/classica"
        );
        assert_eq!(
            resolve(&base, "https://cdn.example.com/a.mp3").unwrap().as_str(),
            "https://cdn.example.com/a.mp3"
        );
        assert_eq!(
            resolve(&base, "x.mp3").unwrap().as_str(),
            "https://www.raiplaysound.it/programmi/x.mp3"
        );
    }

    #[test]
    fn test_self_or_visited() {
        let base = node();
        let other = resolve(&base, "/playlist/a").unwrap();
        let mut visited = HashSet::new();

        assert!(is_self_or_visited(&base, &base, &visited));
        assert!(!is_self_or_visited(&other, &base, &visited));

        visited.insert(other.clone());
        assert!(is_self_or_visited(&other, &base, &visited));
    }

    #[test]
    fn test_descriptor_url_appends_json() {
        assert_eq!(
            descriptor_url(&node()),
            "https://www.raiplaysound.it/programmi/lezionidimusica.json"
        );
    }

    #[test]
    fn test_fallback_url_uses_origin() {
        assert_eq!(
            fallback_url(&node(), "/audio/2023/01/ep1.json"),
            "https://www.raiplaysound.it/audio/2023/01/ep1.json"
        );
        assert_eq!(
            fallback_url(&node(), "audio/ep2.json"),
            "https://www.raiplaysound.it/audio/ep2.json"
        );

        let local = Url::parse("http://127.0.0.1:4321/programmi/x").unwrap();
        assert_eq!(
            fallback_url(&local, "/audio/ep.json"),
            "http://127.0.0.1:4321/audio/ep.json"
        );
    }

    #[test]
    fn test_feed_file_name() {
        assert_eq!(feed_file_name(&node()), "lezionidimusica.xml");

        let trailing = Url::parse("https://www.raiplaysound.it/playlist/abc/").unwrap();
        assert_eq!(feed_file_name(&trailing), "abc.xml");

        let bare = Url::parse("https://www.raiplaysound.it/").unwrap();
        assert_eq!(feed_file_name(&bare), "feed.xml");
    }
}
