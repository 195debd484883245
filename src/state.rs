use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::gallery::MAX_FETCH_LIMIT;

/// Pagination parameters (admins can modify at runtime).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryConfig {
    /// Messages requested per history fetch.
    pub cache_size: usize,
    /// Upper bound for the `amount` a user may request.
    pub max_amount: usize,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            cache_size: MAX_FETCH_LIMIT,
            max_amount: 500,
        }
    }
}

impl GalleryConfig {
    /// Defaults, with `GALLERY_CACHE_SIZE` applied when set and numeric.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(size) = dotenv::var("GALLERY_CACHE_SIZE")
            .ok()
            .and_then(|s| s.trim().parse::<usize>().ok())
        {
            config.set_cache_size(size);
        }
        config
    }

    /// Clamp to what a single Discord history request can return.
    pub fn set_cache_size(&mut self, size: usize) -> usize {
        self.cache_size = size.clamp(1, MAX_FETCH_LIMIT);
        self.cache_size
    }

    pub fn set_max_amount(&mut self, amount: usize) -> usize {
        self.max_amount = amount.max(1);
        self.max_amount
    }

    /// Requested amount bounded by `max_amount`.
    pub fn effective_amount(&self, requested: usize) -> usize {
        requested.min(self.max_amount)
    }
}

pub struct AppState {
    pub admin_ids: HashSet<u64>,
    pub config: Arc<RwLock<GalleryConfig>>,
}

impl AppState {
    pub fn is_admin(&self, user_id: u64) -> bool {
        self.admin_ids.contains(&user_id)
    }
}

pub type Context<'a> = poise::Context<'a, AppState, anyhow::Error>;
