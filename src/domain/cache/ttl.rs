//! TTL tiers for cached entries

use std::time::Duration;

/// Expiration tier applied to a cache write
///
/// Every domain operation is pinned to one tier reflecting how volatile its data
/// is. `Custom` exists for explicit overrides; a zero custom duration falls back
/// to the default tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheTtl {
    /// 60 seconds
    Short,
    /// 300 seconds
    #[default]
    Medium,
    /// 3600 seconds
    Long,
    /// Explicit duration
    Custom(Duration),
}

impl CacheTtl {
    pub const SHORT_SECS: u64 = 60;
    pub const MEDIUM_SECS: u64 = 300;
    pub const LONG_SECS: u64 = 3600;

    /// Returns the effective expiration for this tier
    pub fn as_duration(&self) -> Duration {
        match self {
            Self::Short => Duration::from_secs(Self::SHORT_SECS),
            Self::Medium => Duration::from_secs(Self::MEDIUM_SECS),
            Self::Long => Duration::from_secs(Self::LONG_SECS),
            Self::Custom(d) if d.is_zero() => Self::Medium.as_duration(),
            Self::Custom(d) => *d,
        }
    }

    pub fn from_secs(secs: u64) -> Self {
        Self::Custom(Duration::from_secs(secs))
    }
}

impl From<Duration> for CacheTtl {
    fn from(ttl: Duration) -> Self {
        Self::Custom(ttl)
    }
}
