//! Application constants and configuration

pub const IMAGE_BASE_URL: &str = "https://picsum.photos";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Descriptors appended per load-more activation (and at startup).
pub const BATCH_SIZE: usize = 20;

/// Width of the round-robin cycle across the three fetch strategies.
pub const STRATEGY_CYCLE: usize = 3;

/// Logical box every fetched image is sized to.
pub const TARGET_WIDTH: u32 = 300;
pub const TARGET_HEIGHT: u32 = 150;

/// Transition durations, per strategy.
pub const CROSSFADE_MS: u64 = 300;
pub const FADE_IN_MS: u64 = 150;

/// Concurrent request cap for the shared-client strategy.
pub const FETCH_CONCURRENCY: usize = 8;
