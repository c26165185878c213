//! Answer option ordering.
//!
//! With shuffling enabled each question's options are permuted once, on
//! first access, and the permutation is cached for the rest of the attempt
//! so re-rendering never reorders choices under the user.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::model::{OptionOrder, Question, OPTION_COUNT};

/// Options as shown to the user, keyed by question index.
pub type ShownOptions = BTreeMap<usize, [String; OPTION_COUNT]>;

/// Determines and caches the displayed option order per question.
#[derive(Debug, Clone, Default)]
pub struct OptionPresenter {
    order: OptionOrder,
    cache: ShownOptions,
}

impl OptionPresenter {
    pub fn new(order: OptionOrder) -> Self {
        Self {
            order,
            cache: BTreeMap::new(),
        }
    }

    pub fn order(&self) -> OptionOrder {
        self.order
    }

    /// The four choices for `question` at `index`.
    pub fn options_for<'a, R: Rng + ?Sized>(
        &'a mut self,
        index: usize,
        question: &'a Question,
        rng: &mut R,
    ) -> &'a [String; OPTION_COUNT] {
        match self.order {
            OptionOrder::Source => &question.options,
            OptionOrder::Shuffled => self.cache.entry(index).or_insert_with(|| {
                let mut shuffled = question.options.clone();
                shuffled.shuffle(rng);
                tracing::debug!(index, "cached shuffled option order");
                shuffled
            }),
        }
    }

    /// Cached orders produced so far; empty without shuffling.
    pub fn shown(&self) -> &ShownOptions {
        &self.cache
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }
}
