use crate::feed::model::FeedItem;

/// Width used to zero-pad season and episode in the lexicographic key.
const PAD_WIDTH: usize = 5;

/// How a feed's items are ordered, chosen once from the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortStrategy {
    /// Every item carries a season and an episode.
    SeasonEpisode,
    /// Fall back to publication time.
    Chronological,
}

impl SortStrategy {
    pub fn select(items: &[FeedItem]) -> Self {
        if items.iter().all(|item| item.season_episode().is_some()) {
            SortStrategy::SeasonEpisode
        } else {
            SortStrategy::Chronological
        }
    }
}

/// Orders items in place using the strategy their data supports.
pub fn sort_items(items: &mut [FeedItem]) -> SortStrategy {
    let strategy = SortStrategy::select(items);
    match strategy {
        SortStrategy::SeasonEpisode => sort_by_season_episode(items),
        SortStrategy::Chronological => items.sort_by_key(|item| item.update),
    }
    strategy
}

/// Numeric `episode + season * 10000` when every value is an integer,
/// otherwise zero-padded season then episode compared as strings.
fn sort_by_season_episode(items: &mut [FeedItem]) {
    if items.iter().all(|item| numeric_key(item).is_some()) {
        items.sort_by_key(|item| numeric_key(item).unwrap_or_default());
    } else {
        tracing::debug!("Non-numeric season or episode, sorting by padded text");
        items.sort_by_cached_key(padded_key);
    }
}

fn numeric_key(item: &FeedItem) -> Option<i128> {
    let (season, episode) = item.season_episode()?;
    let season: i64 = season.trim().parse().ok()?;
    let episode: i64 = episode.trim().parse().ok()?;
    Some(i128::from(episode) + i128::from(season) * 10_000)
}

fn padded_key(item: &FeedItem) -> String {
    let (season, episode) = item.season_episode().unwrap_or_default();
    format!("{}{}", zero_pad(season), zero_pad(episode))
}

/// Left-pads with zeros to `PAD_WIDTH`, keeping a leading sign in front.
fn zero_pad(s: &str) -> String {
    let len = s.chars().count();
    if len >= PAD_WIDTH {
        return s.to_string();
    }
    let zeros = "0".repeat(PAD_WIDTH - len);
    match s.strip_prefix(['+', '-']) {
        Some(rest) => format!("{}{}{}", &s[..1], zeros, rest),
        None => format!("{}{}", zeros, s),
    }
}
