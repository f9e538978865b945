// src/matching/engine.rs
use sqlx::SqlitePool;

use crate::core::{MatchingConfig, TextGenerator};
use crate::matching::reasons::ReasonGenerator;

/// Borrowed handles every matching operation runs against.
///
/// Operations live in sibling modules as `impl MatchEngine` blocks.
pub struct MatchEngine<'a> {
    pub(crate) pool: &'a SqlitePool,
    pub(crate) generator: &'a dyn TextGenerator,
    pub(crate) config: &'a MatchingConfig,
}

impl<'a> MatchEngine<'a> {
    pub fn new(
        pool: &'a SqlitePool,
        generator: &'a dyn TextGenerator,
        config: &'a MatchingConfig,
    ) -> Self {
        Self {
            pool,
            generator,
            config,
        }
    }

    pub(crate) fn reasons(&self) -> ReasonGenerator<'a> {
        ReasonGenerator::new(self.generator)
    }

    pub fn config(&self) -> &MatchingConfig {
        self.config
    }
}
