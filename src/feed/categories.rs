use crate::feed::descriptor::PodcastInfo;
use std::collections::BTreeSet;

/// Collects category names from genres, subgenres, the escaped DFP lists and
/// the product sources. Absent sources contribute nothing; duplicates collapse.
pub fn aggregate_categories(info: &PodcastInfo) -> BTreeSet<String> {
    let product_sources = info
        .metadata
        .as_ref()
        .map(|m| m.product_sources.as_slice())
        .unwrap_or_default();

    info.genres
        .iter()
        .chain(&info.subgenres)
        .chain(&info.dfp.escaped_genres)
        .chain(&info.dfp.escaped_typology)
        .chain(product_sources)
        .map(|c| c.name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn info(value: serde_json::Value) -> PodcastInfo {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_duplicates_across_sources_collapse() {
        let info = info(json!({
            "image": "/i.jpg",
            "genres": [{"name": "A"}, {"name": "B"}],
            "subgenres": [{"name": "B"}, {"name": "C"}],
            "dfp": {"escaped_genres": [{"name": "C"}]}
        }));

        let categories = aggregate_categories(&info);
        let expected: BTreeSet<String> = ["A", "B", "C"].iter().map(|s| s.to_string()).collect();
        assert_eq!(categories, expected);
    }

    #[test]
    fn test_product_sources_and_typology_included() {
        let info = info(json!({
            "image": "/i.jpg",
            "genres": [],
            "subgenres": [],
            "dfp": {"escaped_typology": [{"name": "Podcast"}]},
            "metadata": {"product_sources": [{"name": "Radio3"}]}
        }));

        let categories = aggregate_categories(&info);
        assert_eq!(categories.len(), 2);
        assert!(categories.contains("Podcast"));
        assert!(categories.contains("Radio3"));
    }

    #[test]
    fn test_metadata_without_product_sources() {
        let info = info(json!({
            "image": "/i.jpg",
            "genres": [{"name": "Musica"}],
            "subgenres": [],
            "dfp": {},
            "metadata": {}
        }));

        let categories = aggregate_categories(&info);
        assert_eq!(categories.into_iter().collect::<Vec<_>>(), vec!["Musica"]);
    }
}
