/// Share of live-looking titles above which an album counts as live without a lookup.
pub const LIVE_TITLE_THRESHOLD: f64 = 0.8;

/// How many of an album's track titles mention "live".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveTitleCount {
    pub live: usize,
    pub total: usize,
}

impl LiveTitleCount {
    pub fn is_live_album(&self) -> bool {
        self.total > 0 && self.live as f64 / self.total as f64 > LIVE_TITLE_THRESHOLD
    }
}

/// Count titles containing "live" (case-insensitive). Empty titles count
/// toward the total but never as live.
pub fn count_live_titles(titles: &[String]) -> LiveTitleCount {
    let live = titles
        .iter()
        .filter(|t| t.to_lowercase().contains("live"))
        .count();
    LiveTitleCount {
        live,
        total: titles.len(),
    }
}
