use crate::models::FetchMode;

/// Fetch cap for `recent`: twice the final selection size, leaving room for
/// entries dropped by the inclusion filters.
pub const RECENT_FETCH_CAP: usize = 20;
/// Fetch cap for `active`: recency is only known per entry, so sample wider.
pub const ACTIVE_FETCH_CAP: usize = 50;

/// How many repositories the fetcher may accumulate before stopping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchBudget {
    Unbounded,
    CallerMax(usize),
    ModeCap(usize),
}

impl FetchBudget {
    pub fn cap(&self) -> Option<usize> {
        match self {
            FetchBudget::Unbounded => None,
            FetchBudget::CallerMax(n) | FetchBudget::ModeCap(n) => Some(*n),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InclusionFilters {
    pub exclude_forks: bool,
    pub min_stars: u32,
}

impl InclusionFilters {
    pub fn accepts(&self, is_fork: bool, stars: u32) -> bool {
        !(self.exclude_forks && is_fork) && stars >= self.min_stars
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPolicy {
    pub budget: FetchBudget,
    pub filters: InclusionFilters,
}

/// Maps a mode to its page budget. Star rankings need the full listing, so
/// only `recent` and `active` get an implicit cap; the caller's maximum
/// bounds the rest.
pub fn select_policy(
    mode: FetchMode,
    max_repos: Option<usize>,
    filters: InclusionFilters,
) -> FetchPolicy {
    let caller_budget = match max_repos {
        Some(n) => FetchBudget::CallerMax(n),
        None => FetchBudget::Unbounded,
    };

    let budget = match mode {
        FetchMode::Recent => FetchBudget::ModeCap(RECENT_FETCH_CAP),
        FetchMode::Active => FetchBudget::ModeCap(ACTIVE_FETCH_CAP),
        FetchMode::Popular | FetchMode::Top20 | FetchMode::All => caller_budget,
    };

    FetchPolicy { budget, filters }
}
