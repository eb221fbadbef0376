use regex::Regex;
use std::sync::LazyLock;

use crate::error::{Error, Result};

// "S01:E05 - Pilot"
static EPISODE_TITLE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^S0*(\d+):E0*(\d+) - (.*)$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeTitle {
    pub season: u32,
    pub episode: u32,
    pub name: String,
}

/// Split an upstream episode title into season, episode and display name.
///
/// Leading zeros on both numbers are dropped. Anything that does not follow
/// the `S<n>:E<n> - <name>` layout is a [`Error::TitleFormat`].
pub fn parse_episode_title(title: &str) -> Result<EpisodeTitle> {
    let bad_title = || Error::TitleFormat(title.to_string());
    let caps = EPISODE_TITLE_PATTERN.captures(title).ok_or_else(bad_title)?;
    let season = caps[1].parse::<u32>().map_err(|_| bad_title())?;
    let episode = caps[2].parse::<u32>().map_err(|_| bad_title())?;
    Ok(EpisodeTitle { season, episode, name: caps[3].to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_zero_padded_numbers() {
        let t = parse_episode_title("S01:E05 - Pilot").unwrap();
        assert_eq!(t, EpisodeTitle { season: 1, episode: 5, name: "Pilot".into() });

        let t = parse_episode_title("S0003:E012 - The Long Way").unwrap();
        assert_eq!((t.season, t.episode), (3, 12));
        assert_eq!(t.name, "The Long Way");
    }

    #[test]
    fn keeps_name_verbatim() {
        let t = parse_episode_title("S2:E10 - Part 1 - The Return: Again ").unwrap();
        assert_eq!((t.season, t.episode), (2, 10));
        assert_eq!(t.name, "Part 1 - The Return: Again ");

        let t = parse_episode_title("S1:E1 - ").unwrap();
        assert_eq!(t.name, "");
    }

    #[test]
    fn numbers_with_inner_zeros_survive() {
        let t = parse_episode_title("S10:E100 - Century").unwrap();
        assert_eq!((t.season, t.episode), (10, 100));
    }

    #[test]
    fn rejects_other_layouts() {
        for title in ["Pilot", "S01E05 - Pilot", "S01:E05 Pilot", "s01:e05 - Pilot", "Season 1: Episode 5 - Pilot", ""] {
            match parse_episode_title(title) {
                Err(Error::TitleFormat(t)) => assert_eq!(t, title),
                other => panic!("expected TitleFormat for {title:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn rejects_numbers_that_overflow() {
        let title = "S99999999999:E1 - Too Many";
        assert!(matches!(parse_episode_title(title), Err(Error::TitleFormat(_))));
    }
}
