//! Atom 1.0 serialization.

use super::{ChannelFeed, FeedItem};
use crate::error::FeedError;
use atom_syndication::{
    ContentBuilder, Entry, EntryBuilder, Feed, FeedBuilder, GeneratorBuilder, Link, LinkBuilder,
    Person, PersonBuilder, Text,
};

/// Render a built feed as Atom 1.0 XML.
pub fn to_atom(feed: &ChannelFeed) -> Result<String, FeedError> {
    let author: Person = PersonBuilder::default()
        .name(feed.author_name.clone())
        .email(Some(feed.author_email.clone()))
        .build();

    let entries: Vec<Entry> = feed
        .items
        .iter()
        .map(|item| item_to_entry(item, &author))
        .collect();

    // Items are newest-first, so the first one carries the latest update
    let updated = feed
        .items
        .first()
        .map(|item| item.created)
        .unwrap_or(feed.created)
        .fixed_offset();

    let self_link: Link = LinkBuilder::default()
        .href(&feed.link)
        .rel("self".to_string())
        .mime_type(Some("application/atom+xml".to_string()))
        .build();

    let atom: Feed = FeedBuilder::default()
        .title(Text::plain(feed.title.clone()))
        .id(&feed.link)
        .updated(updated)
        .authors(vec![author])
        .links(vec![self_link])
        .subtitle(Some(Text::plain(feed.description.clone())))
        .generator(Some(GeneratorBuilder::default().value("nixfeed").build()))
        .entries(entries)
        .build();

    Ok(atom.to_string())
}

fn item_to_entry(item: &FeedItem, author: &Person) -> Entry {
    let link: Link = LinkBuilder::default()
        .href(&item.link)
        .rel("alternate".to_string())
        .build();

    EntryBuilder::default()
        .title(Text::plain(item.title.clone()))
        .id(&item.id)
        .updated(item.created.fixed_offset())
        .links(vec![link])
        .authors(vec![author.clone()])
        .content(Some(
            ContentBuilder::default()
                .value(Some(item.content.clone()))
                .content_type(Some("text".to_string()))
                .build(),
        ))
        .build()
}
