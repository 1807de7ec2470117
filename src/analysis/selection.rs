use chrono::{DateTime, Duration, Utc};

use crate::models::{FetchMode, Repository};

pub const POPULAR_LIMIT: usize = 10;
pub const RECENT_LIMIT: usize = 10;
pub const TOP20_LIMIT: usize = 20;
pub const ACTIVE_LIMIT: usize = 15;
pub const ACTIVE_WINDOW_DAYS: i64 = 180;

/// Narrows the fetched set down to what gets analyzed.
///
/// Input order is the listing order (most recently updated first). Star
/// sorts are stable, so equally starred repositories keep that order.
pub fn select(mode: FetchMode, repos: Vec<Repository>, now: DateTime<Utc>) -> Vec<Repository> {
    match mode {
        FetchMode::All => repos,
        FetchMode::Recent => take(repos, RECENT_LIMIT),
        FetchMode::Popular => take(by_stars(repos), POPULAR_LIMIT),
        FetchMode::Top20 => take(by_stars(repos), TOP20_LIMIT),
        FetchMode::Active => {
            let cutoff = now - Duration::days(ACTIVE_WINDOW_DAYS);
            let active = repos
                .into_iter()
                .filter(|r| r.updated_at_utc().is_some_and(|updated| updated > cutoff))
                .collect();
            take(by_stars(active), ACTIVE_LIMIT)
        }
    }
}

fn by_stars(mut repos: Vec<Repository>) -> Vec<Repository> {
    repos.sort_by(|a, b| b.stars.cmp(&a.stars));
    repos
}

fn take(mut repos: Vec<Repository>, limit: usize) -> Vec<Repository> {
    repos.truncate(limit);
    repos
}
