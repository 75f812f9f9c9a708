use rotask_types::TrialSpec;

/// Growable FIFO of specs awaiting presentation, consumed by cursor.
///
/// The queue is traversed by index rather than by iterator because retries
/// append to it while it is being drained. A requeued spec always lands
/// behind everything still waiting, so it is never shown twice in a row
/// unless it is the only entry left.
#[derive(Debug, Clone, Default)]
pub struct TrialQueue {
    entries: Vec<TrialSpec>,
    cursor: usize,
}

impl TrialQueue {
    #[must_use]
    pub fn new(entries: Vec<TrialSpec>) -> Self {
        Self { entries, cursor: 0 }
    }

    /// Next spec and its position, advancing the cursor.
    pub fn next_entry(&mut self) -> Option<(usize, TrialSpec)> {
        let spec = *self.entries.get(self.cursor)?;
        let position = self.cursor;
        self.cursor += 1;
        Some((position, spec))
    }

    /// Append `spec` behind every pending entry.
    pub fn requeue(&mut self, spec: TrialSpec) {
        self.entries.push(spec);
    }

    /// Entries ever queued, including consumed ones and retries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.entries.len() - self.cursor
    }

    #[inline]
    #[must_use]
    pub fn is_drained(&self) -> bool {
        self.cursor >= self.entries.len()
    }

    #[must_use]
    pub fn entries(&self) -> &[TrialSpec] {
        &self.entries
    }
}
