/// Number of entries in the level threshold table.
pub const LEVELS: usize = 50;

/// Creation-time limits for mission definitions.
pub const MAX_TITLE_CHARS: usize = 100;
pub const MAX_DESCRIPTION_CHARS: usize = 500;
pub const MAX_EMOJI_CHARS: usize = 10;

/// Hard ceilings on any single reward, regardless of difficulty tier.
pub const MAX_XP_REWARD: u32 = 1000;
pub const MAX_COIN_REWARD: u32 = 500;

/// Default number of history entries returned when the caller does not ask
/// for a specific amount.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Default window, in days, for the activity rollup.
pub const DEFAULT_ACTIVITY_DAYS: u32 = 7;
