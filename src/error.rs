//! Application-wide error types.
//!
//! Module-specific errors live next to the code that produces them
//! ([`ConfigError`], [`FeedError`], [`TagError`], ...); this module defines
//! the aggregate for failures that cross component boundaries. The
//! propagation policy is deliberately narrow:
//!
//! - [`Error::Config`] aborts the whole process at startup.
//! - [`Error::Feed`] aborts a single feed's pass; other feeds continue.
//! - [`Error::Cancelled`] unwinds everything and is treated as a clean exit.
//!
//! Per-episode and per-file failures never appear here. They are caught
//! inside the archiver, logged, and tallied into batch reports.
//!
//! [`ConfigError`]: crate::config::ConfigError
//! [`FeedError`]: crate::feed::FeedError
//! [`TagError`]: crate::tagger::TagError

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// An error that escaped its component.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Fatal: configuration could not be loaded
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// Fatal for one feed's pass: the feed could not be fetched or parsed
    #[error(transparent)]
    Feed(#[from] crate::feed::FeedError),

    /// Shutdown was requested; not a failure
    #[error(transparent)]
    Cancelled(#[from] crate::shutdown::Cancelled),
}
