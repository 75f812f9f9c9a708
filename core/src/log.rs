//! Append-only record of every presentation.

use rotask_types::TrialOutcome;

/// Outcomes in presentation order, one per presentation.
///
/// A failed trial and its later retry are two entries; nothing is ever
/// overwritten or removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultLog {
    outcomes: Vec<TrialOutcome>,
}

impl ResultLog {
    #[inline]
    #[must_use]
    pub fn outcomes(&self) -> &[TrialOutcome] {
        &self.outcomes
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, TrialOutcome> {
        self.outcomes.iter()
    }

    pub fn push(&mut self, outcome: TrialOutcome) {
        self.outcomes.push(outcome);
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.correctness().is_correct())
            .count()
    }
}

impl<'a> IntoIterator for &'a ResultLog {
    type Item = &'a TrialOutcome;
    type IntoIter = std::slice::Iter<'a, TrialOutcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
