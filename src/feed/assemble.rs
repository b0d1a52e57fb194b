use crate::feed::categories::aggregate_categories;
use crate::feed::descriptor::Descriptor;
use crate::feed::fetcher::DescriptorFetcher;
use crate::feed::model::Feed;
use crate::feed::normalize::normalize_card;
use crate::traverse::TraverseError;
use crate::util::{parse_datetime, resolve};
use url::Url;

pub const DEFAULT_AUTHOR: &str = "RaiPlaySound";
pub const DEFAULT_LANGUAGE: &str = "it-it";
pub const DEFAULT_OWNER_EMAIL: &str = "timedum@gmail.com";

/// Channel values that do not come from the descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelDefaults {
    pub author: String,
    pub language: String,
    pub owner_email: String,
}

impl Default for ChannelDefaults {
    fn default() -> Self {
        Self {
            author: DEFAULT_AUTHOR.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            owner_email: DEFAULT_OWNER_EMAIL.to_string(),
        }
    }
}

/// Fills in everything except the items.
pub fn populate_channel(
    feed: &mut Feed,
    descriptor: &Descriptor,
    defaults: &ChannelDefaults,
) -> Result<(), TraverseError> {
    let info = &descriptor.podcast_info;

    feed.title = descriptor.title.clone();
    feed.description = info
        .description
        .clone()
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| descriptor.title.clone());

    let image = resolve(feed.url(), &info.image).map_err(|source| TraverseError::Link {
        url: feed.url().to_string(),
        link: info.image.clone(),
        source,
    })?;
    feed.metadata.image = Some(image);
    feed.metadata.author = defaults.author.clone();
    feed.metadata.language = defaults.language.clone();
    feed.metadata.owner_email = defaults.owner_email.clone();
    feed.metadata.categories = aggregate_categories(info);

    feed.update = parse_datetime(descriptor.block.update_date.as_deref().unwrap_or(""))
        .or_else(|| parse_datetime(descriptor.track_info.date.as_deref().unwrap_or("")));

    Ok(())
}

/// Builds the node's feed: channel metadata plus one item per card with audio.
pub async fn assemble_feed<F: DescriptorFetcher>(
    node: &Url,
    descriptor: &Descriptor,
    defaults: &ChannelDefaults,
    fetcher: &F,
) -> Result<Feed, TraverseError> {
    let mut feed = Feed::new(node.clone());
    populate_channel(&mut feed, descriptor, defaults)?;

    for card in &descriptor.block.cards {
        if let Some(item) = normalize_card(card, node, fetcher).await? {
            feed.items.push(item);
        }
    }

    Ok(feed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::fetcher::fake::FakeFetcher;
    use crate::feed::normalize::tests::card_json;
    use serde_json::{json, Value};

    fn descriptor(description: Value, update_date: &str, cards: Vec<Value>) -> Descriptor {
        serde_json::from_value(json!({
            "title": "Lezioni di musica",
            "podcast_info": {
                "description": description,
                "image": "/cropgd/lezioni.jpg",
                "genres": [{"name": "Musica"}],
                "subgenres": [{"name": "Classica"}, {"name": "Musica"}],
                "dfp": {},
                "typology": "Podcast"
            },
            "tab_menu": [],
            "block": {"update_date": update_date, "cards": cards},
            "track_info": {"date": "2023-03-01"}
        }))
        .unwrap()
    }

    fn node() -> Url {
        Url::parse("https://www.raiplaysound.it/programmi/lezionidimusica").unwrap()
    }

    #[test]
    fn test_empty_description_falls_back_to_title() {
        let mut feed = Feed::new(node());
        populate_channel(&mut feed, &descriptor(json!(""), "", vec![]), &ChannelDefaults::default())
            .unwrap();
        assert_eq!(feed.description, feed.title);

        let mut feed = Feed::new(node());
        populate_channel(&mut feed, &descriptor(Value::Null, "", vec![]), &ChannelDefaults::default())
            .unwrap();
        assert_eq!(feed.description, "Lezioni di musica");
    }

    #[test]
    fn test_channel_metadata() {
        let mut feed = Feed::new(node());
        populate_channel(
            &mut feed,
            &descriptor(json!("Ogni settimana"), "10-03-2023 08:15:00", vec![]),
            &ChannelDefaults::default(),
        )
        .unwrap();

        assert_eq!(feed.description, "Ogni settimana");
        assert_eq!(
            feed.metadata.image.as_ref().map(Url::as_str),
            Some("https://www.raiplaysound.it/cropgd/lezioni.jpg")
        );
        assert_eq!(feed.metadata.author, "RaiPlaySound");
        assert_eq!(feed.metadata.language, "it-it");
        assert_eq!(feed.metadata.owner_email, "timedum@gmail.com");
        assert_eq!(feed.metadata.categories.len(), 2);
        assert_eq!(feed.update, parse_datetime("10-03-2023 08:15:00"));
        assert_eq!(feed.url(), &node());
    }

    #[test]
    fn test_update_falls_back_to_track_date() {
        let mut feed = Feed::new(node());
        populate_channel(&mut feed, &descriptor(json!("d"), "", vec![]), &ChannelDefaults::default())
            .unwrap();
        assert_eq!(feed.update, parse_datetime("2023-03-01"));
    }

    #[test]
    fn test_null_timestamps_leave_update_empty() {
        let mut value = json!({
            "title": "Senza data",
            "podcast_info": {
                "image": "/img.jpg",
                "genres": [],
                "subgenres": [],
                "dfp": {}
            },
            "tab_menu": [],
            "block": {"update_date": null, "cards": []},
            "track_info": {"date": null}
        });
        let descriptor: Descriptor = serde_json::from_value(value.clone()).unwrap();
        let mut feed = Feed::new(node());
        populate_channel(&mut feed, &descriptor, &ChannelDefaults::default()).unwrap();
        assert_eq!(feed.update, None);

        value["track_info"]["date"] = json!("2023-03-01");
        let descriptor: Descriptor = serde_json::from_value(value).unwrap();
        populate_channel(&mut feed, &descriptor, &ChannelDefaults::default()).unwrap();
        assert_eq!(feed.update, parse_datetime("2023-03-01"));
    }

    #[tokio::test]
    async fn test_items_without_audio_are_skipped() {
        let mut missing = card_json("missing");
        missing["downloadable_audio"] = Value::Null;
        let descriptor = descriptor(json!("d"), "", vec![card_json("a"), missing, card_json("b")]);
        let fetcher = FakeFetcher::default()
            .with_status("https://www.raiplaysound.it/audio/missing.json", 500);

        let feed = assemble_feed(&node(), &descriptor, &ChannelDefaults::default(), &fetcher)
            .await
            .unwrap();

        let ids: Vec<_> = feed.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["timendum-raiplaysound-a", "timendum-raiplaysound-b"]
        );
    }
}
