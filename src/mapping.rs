use crate::error::{Error, Result};
use crate::title::parse_episode_title;
use crate::types::{DirectoryItem, DirectoryKind, Ids, Images, ItemType, PlayableItem, SeriesEpisode, Source};
use crate::upstream::{RawCatalogEntry, RawContainer, RawEpisode, TypeCode, VideoResource};

pub fn item_type_from(code: &TypeCode) -> Result<ItemType> {
    match code {
        TypeCode::Video => Ok(ItemType::Movie),
        TypeCode::Series => Ok(ItemType::Series),
        TypeCode::Other(c) => Err(Error::UnknownItemType(c.clone())),
    }
}

/// Convert one raw catalog record into a [`PlayableItem`].
///
/// A single malformed episode title fails the whole record.
pub fn playable_item_from(entry: RawCatalogEntry) -> Result<PlayableItem> {
    let item_type = item_type_from(&entry.type_code)?;

    let episodes = match (item_type, entry.children) {
        (ItemType::Series, Some(seasons)) => {
            let mut episodes = Vec::new();
            for season in seasons {
                for episode in season.children {
                    episodes.push(series_episode_from(episode)?);
                }
            }
            Some(episodes)
        }
        _ => None,
    };

    let sources = match entry.url {
        Some(url) => Some(vec![Source::main_url(url, None)]),
        None => entry.video_resources.and_then(sources_from_resources),
    };

    let images = Images {
        poster: entry.posterarts.and_then(first),
        background: entry.backgrounds.and_then(first),
        logo: entry.logo,
    };

    Ok(PlayableItem {
        ids: Ids::new(entry.id),
        item_type,
        name: entry.title,
        genres: entry.tags,
        description: entry.description,
        countries: entry.country.map(|c| vec![c]),
        year: entry.year,
        director: entry.directors,
        runtime: entry.duration,
        cast: entry.actors,
        images: images.non_empty(),
        episodes,
        sources,
    })
}

pub fn series_episode_from(episode: RawEpisode) -> Result<SeriesEpisode> {
    let parsed = parse_episode_title(&episode.title)?;
    Ok(SeriesEpisode {
        ids: Ids::new(episode.id),
        name: parsed.name,
        description: episode.description,
        season: parsed.season,
        episode: parsed.episode,
        sources: episode.video_resources.and_then(sources_from_resources),
    })
}

pub fn directory_item_from(container: RawContainer) -> DirectoryItem {
    let images = Images {
        poster: container.thumbnail,
        background: container.backgrounds.into_iter().next(),
        logo: container.logo,
    };
    DirectoryItem {
        id: container.id,
        name: container.title,
        description: container.description,
        kind: DirectoryKind::Directory,
        images: images.non_empty(),
    }
}

// Empty resource lists become `None` rather than `Some(vec![])`.
fn sources_from_resources(resources: Vec<VideoResource>) -> Option<Vec<Source>> {
    let sources: Vec<Source> = resources
        .into_iter()
        .map(|r| Source::main_url(r.manifest.url, r.kind))
        .collect();
    (!sources.is_empty()).then_some(sources)
}

fn first(list: Vec<String>) -> Option<String> {
    list.into_iter().next()
}
