//! Freelancer/project matchmaking backend.
//!
//! Skill overlap scoring, AI-written match rationales, match persistence and
//! workspace recommendations, served over HTTP and from the command line.

pub mod auth;
pub mod cli;
pub mod core;
pub mod error;
pub mod logging;
pub mod matching;
pub mod membership;
pub mod postings;
pub mod store;
pub mod web;

#[cfg(test)]
pub(crate) mod test_support;

pub use crate::error::ServiceError;
pub use crate::web::{build_rocket, start_web_server};

#[doc(hidden)]
pub use tracing as __tracing;

/// Level-named logging shorthand used across the crate.
///
/// `app_log!(info, "Loaded {} candidates", n)` expands to `tracing::info!`.
#[macro_export]
macro_rules! app_log {
    ($level:ident, $($arg:tt)+) => {
        $crate::__tracing::$level!($($arg)+)
    };
}
