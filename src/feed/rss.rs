use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;

use crate::feed::model::{Feed, FeedItem};

pub const ITUNES_NAMESPACE: &str = "http://www.itunes.com/dtds/podcast-1.0.dtd";

/// Serializes a feed as an RSS 2.0 document with the iTunes podcast namespace.
///
/// Timestamps carry no offset in the source data and are written as UTC.
pub fn to_rss_string(feed: &Feed) -> Result<String> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .context("Failed to write XML declaration")?;

    let mut rss = BytesStart::new("rss");
    rss.push_attribute(("version", "2.0"));
    rss.push_attribute(("xmlns:itunes", ITUNES_NAMESPACE));
    writer
        .write_event(Event::Start(rss))
        .context("Failed to write rss element")?;
    start(&mut writer, "channel")?;

    text_element(&mut writer, "title", &feed.title)?;
    text_element(&mut writer, "link", feed.url().as_str())?;
    text_element(&mut writer, "description", &feed.description)?;
    if let Some(update) = feed.update {
        text_element(&mut writer, "lastBuildDate", &rfc2822(update))?;
    }
    if let Some(image) = &feed.metadata.image {
        start(&mut writer, "image")?;
        text_element(&mut writer, "url", image.as_str())?;
        text_element(&mut writer, "title", &feed.title)?;
        text_element(&mut writer, "link", feed.url().as_str())?;
        end(&mut writer, "image")?;
    }
    text_element(&mut writer, "itunes:author", &feed.metadata.author)?;
    text_element(&mut writer, "language", &feed.metadata.language)?;

    start(&mut writer, "itunes:owner")?;
    text_element(&mut writer, "itunes:email", &feed.metadata.owner_email)?;
    end(&mut writer, "itunes:owner")?;

    for category in &feed.metadata.categories {
        let mut element = BytesStart::new("itunes:category");
        element.push_attribute(("text", category.as_str()));
        writer
            .write_event(Event::Empty(element))
            .context("Failed to write category")?;
    }
    for (tag, value) in &feed.metadata.extensions {
        text_element(&mut writer, tag, value)?;
    }

    for item in &feed.items {
        write_item(&mut writer, item)?;
    }

    end(&mut writer, "channel")?;
    end(&mut writer, "rss")?;

    let mut bytes = writer.into_inner().into_inner();
    bytes.push(b'\n');
    String::from_utf8(bytes).context("Generated RSS contains invalid UTF-8")
}

fn write_item(writer: &mut Writer<Cursor<Vec<u8>>>, item: &FeedItem) -> Result<()> {
    start(writer, "item")?;

    text_element(writer, "title", &item.title)?;
    text_element(writer, "link", item.url.as_str())?;
    text_element(writer, "description", &item.content)?;

    let mut guid = BytesStart::new("guid");
    guid.push_attribute(("isPermaLink", "false"));
    writer
        .write_event(Event::Start(guid))
        .context("Failed to write guid")?;
    writer
        .write_event(Event::Text(BytesText::new(&item.id)))
        .context("Failed to write guid text")?;
    end(writer, "guid")?;

    if let Some(update) = item.update {
        text_element(writer, "pubDate", &rfc2822(update))?;
    }

    let enclosure = &item.metadata.enclosure;
    let mut element = BytesStart::new("enclosure");
    element.push_attribute(("type", enclosure.mime_type.as_str()));
    element.push_attribute(("url", enclosure.url.as_str()));
    writer
        .write_event(Event::Empty(element))
        .context("Failed to write enclosure")?;

    text_element(writer, "itunes:title", &item.title)?;
    text_element(writer, "itunes:summary", &item.content)?;
    text_element(writer, "itunes:duration", &item.metadata.duration)?;
    if let Some(image) = &item.metadata.image {
        let mut element = BytesStart::new("itunes:image");
        element.push_attribute(("href", image.as_str()));
        writer
            .write_event(Event::Empty(element))
            .context("Failed to write item image")?;
    }
    if let Some((season, episode)) = item.season_episode() {
        text_element(writer, "itunes:season", season)?;
        text_element(writer, "itunes:episode", episode)?;
    }
    for (tag, value) in &item.metadata.extensions {
        text_element(writer, tag, value)?;
    }

    end(writer, "item")
}

fn start(writer: &mut Writer<Cursor<Vec<u8>>>, name: &str) -> Result<()> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .with_context(|| format!("Failed to write <{}>", name))?;
    Ok(())
}

fn end(writer: &mut Writer<Cursor<Vec<u8>>>, name: &str) -> Result<()> {
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .with_context(|| format!("Failed to write </{}>", name))?;
    Ok(())
}

fn text_element(writer: &mut Writer<Cursor<Vec<u8>>>, name: &str, text: &str) -> Result<()> {
    start(writer, name)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .with_context(|| format!("Failed to write text of <{}>", name))?;
    end(writer, name)
}

fn rfc2822(instant: NaiveDateTime) -> String {
    instant.and_utc().to_rfc2822()
}
