//! Random sampling without replacement. Both samplers are seeded so a run
//! can be reproduced from the seed recorded in its manifest.

use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;
use tracing::info;

use super::PipelineStep;
use crate::error::{CleanerError, Result};
use crate::table::{is_librarian, MessageTable};

/// Pick `amount` of `positions`, returned in ascending order
fn sample_positions(
    rng: &mut StdRng,
    positions: &[usize],
    amount: usize,
    class: &str,
) -> Result<Vec<usize>> {
    if amount > positions.len() {
        return Err(CleanerError::InsufficientRows {
            class: class.to_string(),
            requested: amount,
            available: positions.len(),
        });
    }
    let mut picked: Vec<usize> = index::sample(rng, positions.len(), amount)
        .into_iter()
        .map(|i| positions[i])
        .collect();
    picked.sort_unstable();
    Ok(picked)
}

/// Keep the rows at `positions` (ascending), in table order
fn keep_positions(mut table: MessageTable, positions: &[usize]) -> MessageTable {
    let mut wanted = positions.iter().peekable();
    let rows = std::mem::take(&mut table.rows);
    table.rows = rows
        .into_iter()
        .enumerate()
        .filter_map(|(pos, row)| {
            if wanted.peek() == Some(&&pos) {
                wanted.next();
                Some(row)
            } else {
                None
            }
        })
        .collect();
    table
}

/// Uniform sample of `size` messages regardless of who sent them
pub struct RandomSampleStep {
    size: usize,
    seed: u64,
}

impl RandomSampleStep {
    pub fn new(size: usize, seed: u64) -> Self {
        Self { size, seed }
    }
}

impl PipelineStep for RandomSampleStep {
    fn step_name(&self) -> &'static str {
        "random_sample"
    }

    fn snapshot_label(&self) -> String {
        format!("uniform_sample_{}", self.size)
    }

    fn apply(&self, table: MessageTable) -> Result<MessageTable> {
        info!("Getting utterances sample...");
        let mut rng = StdRng::seed_from_u64(self.seed);
        let all: Vec<usize> = (0..table.len()).collect();
        let picked = sample_positions(&mut rng, &all, self.size, "message")?;
        Ok(keep_positions(table, &picked))
    }
}

/// Half librarian-side messages, half everything else
pub struct BalancedSampleStep {
    size: usize,
    seed: u64,
}

impl BalancedSampleStep {
    pub fn new(size: usize, seed: u64) -> Self {
        Self { size, seed }
    }
}

impl PipelineStep for BalancedSampleStep {
    fn step_name(&self) -> &'static str {
        "balanced_sample"
    }

    fn snapshot_label(&self) -> String {
        format!("random_sample_{}", self.size)
    }

    fn apply(&self, table: MessageTable) -> Result<MessageTable> {
        info!("Getting utterances sample with 50/50 composition...");
        let to_recipient = table.message_columns()?.to_recipient;
        let half = self.size / 2;

        let (librarian, patron): (Vec<usize>, Vec<usize>) =
            (0..table.len()).partition(|&pos| is_librarian(&table.rows[pos], to_recipient));

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut picked = sample_positions(&mut rng, &librarian, half, "librarian")?;
        picked.extend(sample_positions(&mut rng, &patron, half, "patron")?);
        picked.sort_unstable();

        Ok(keep_positions(table, &picked))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(librarian: usize, patron: usize) -> MessageTable {
        let mut rows = Vec::new();
        for i in 0..librarian {
            rows.push(vec!["1".to_string(), "LIBRARIAN".to_string(), format!("lib {i}")]);
        }
        for i in 0..patron {
            rows.push(vec!["1".to_string(), "PATRON".to_string(), format!("patron {i}")]);
        }
        MessageTable::from_text_rows(&["conversationID", "toRecipient", "body"], &rows)
    }

    fn count_librarian(table: &MessageTable) -> usize {
        table.rows.iter().filter(|r| is_librarian(r, 1)).count()
    }

    #[test]
    fn test_balanced_sample_has_equal_halves() {
        let out = BalancedSampleStep::new(10, 7).apply(messages(20, 40)).unwrap();
        assert_eq!(out.len(), 10);
        assert_eq!(count_librarian(&out), 5);
    }

    #[test]
    fn test_odd_size_rounds_halves_down() {
        let out = BalancedSampleStep::new(7, 1).apply(messages(5, 5)).unwrap();
        assert_eq!(out.len(), 6);
        assert_eq!(count_librarian(&out), 3);
    }

    #[test]
    fn test_sample_keeps_table_order_and_is_seeded() {
        let a = BalancedSampleStep::new(8, 99).apply(messages(10, 10)).unwrap();
        let b = BalancedSampleStep::new(8, 99).apply(messages(10, 10)).unwrap();
        assert_eq!(a, b);
        let indices: Vec<usize> = a.rows.iter().map(|r| r.index).collect();
        let mut sorted = indices.clone();
        sorted.sort_unstable();
        assert_eq!(indices, sorted);
    }

    #[test]
    fn test_short_class_is_an_error() {
        let err = BalancedSampleStep::new(10, 0).apply(messages(2, 50)).unwrap_err();
        match err {
            CleanerError::InsufficientRows { class, requested, available } => {
                assert_eq!(class, "librarian");
                assert_eq!(requested, 5);
                assert_eq!(available, 2);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_uniform_sample() {
        let out = RandomSampleStep::new(4, 3).apply(messages(3, 3)).unwrap();
        assert_eq!(out.len(), 4);
        assert!(RandomSampleStep::new(7, 3).apply(messages(3, 3)).is_err());
    }
}
