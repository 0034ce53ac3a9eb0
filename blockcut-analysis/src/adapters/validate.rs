//! Historical-commit validation: average blocks touched per author (ABPA)
//! and per commit (ABPC), each compared against the mean over random
//! partitions with matching block-size distribution.

use blockcut_core::{EntityId, FxHashMap, FxHashSet};
use rand::seq::SliceRandom;
use rand::thread_rng;

const TRIALS: usize = 5_000;

/// One touch event: an author's commit touching one entity.
#[derive(Debug, Clone)]
pub struct Touch {
    pub author_email: String,
    pub sha1: String,
    pub entity_id: EntityId,
}

fn group_touches_by<'a>(touches: &'a [Touch], key: impl Fn(&'a Touch) -> &'a str) -> FxHashMap<&'a str, FxHashSet<EntityId>> {
    let mut grouped: FxHashMap<&str, FxHashSet<EntityId>> = FxHashMap::default();
    for t in touches {
        grouped.entry(key(t)).or_default().insert(t.entity_id);
    }
    grouped
}

fn count_blocks_touched(partition: &FxHashMap<EntityId, usize>, touched: &FxHashSet<EntityId>) -> usize {
    let blocks: FxHashSet<usize> = touched.iter().filter_map(|id| partition.get(id).copied()).collect();
    blocks.len()
}

fn avg_blocks_touched(partition: &FxHashMap<EntityId, usize>, groups: &FxHashMap<&str, FxHashSet<EntityId>>) -> f64 {
    if groups.is_empty() {
        return 0.0;
    }
    let total: usize = groups.values().map(|touched| count_blocks_touched(partition, touched)).sum();
    total as f64 / groups.len() as f64
}

/// Block sizes, largest first, as `get_sizes` computes them from a partition.
fn block_sizes(partition: &FxHashMap<EntityId, usize>) -> Vec<usize> {
    let mut by_block: FxHashMap<usize, usize> = FxHashMap::default();
    for &block in partition.values() {
        *by_block.entry(block).or_insert(0) += 1;
    }
    let mut sizes: Vec<usize> = by_block.into_values().collect();
    sizes.sort_unstable_by(|a, b| b.cmp(a));
    sizes
}

/// A uniformly random partition of `entities` into blocks of the given sizes.
fn random_partition(sizes: &[usize], entities: &[EntityId]) -> FxHashMap<EntityId, usize> {
    let mut shuffled = entities.to_vec();
    shuffled.shuffle(&mut thread_rng());
    let mut partition = FxHashMap::default();
    let mut cursor = 0usize;
    for (block, &size) in sizes.iter().enumerate() {
        for &id in &shuffled[cursor..cursor + size] {
            partition.insert(id, block);
        }
        cursor += size;
    }
    partition
}

/// `(real, null)` average-blocks-touched, grouping touches by `key`, with the
/// null average taken over 5000 random partitions sharing the real partition's
/// block-size distribution.
fn calc_abp(partition: &FxHashMap<EntityId, usize>, touches: &[Touch], key: impl Fn(&Touch) -> &str) -> (f64, f64) {
    let groups = group_touches_by(touches, key);
    let real = avg_blocks_touched(partition, &groups);

    let sizes = block_sizes(partition);
    let entities: Vec<EntityId> = partition.keys().copied().collect();

    let null_avg = if entities.is_empty() {
        0.0
    } else {
        let sum: f64 = (0..TRIALS)
            .map(|_| avg_blocks_touched(&random_partition(&sizes, &entities), &groups))
            .sum();
        sum / TRIALS as f64
    };
    (real, null_avg)
}

/// Average blocks touched per distinct author, real vs. null.
pub fn calc_abpa(partition: &FxHashMap<EntityId, usize>, touches: &[Touch]) -> (f64, f64) {
    calc_abp(partition, touches, |t| &t.author_email)
}

/// Average blocks touched per distinct commit, real vs. null.
pub fn calc_abpc(partition: &FxHashMap<EntityId, usize>, touches: &[Touch]) -> (f64, f64) {
    calc_abp(partition, touches, |t| &t.sha1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partition_of(pairs: &[(usize, usize)]) -> FxHashMap<EntityId, usize> {
        pairs.iter().map(|&(id, block)| (EntityId(id), block)).collect()
    }

    #[test]
    fn single_author_touching_one_block_scores_one() {
        let partition = partition_of(&[(0, 0), (1, 0), (2, 1)]);
        let touches = vec![
            Touch { author_email: "a@x.com".into(), sha1: "s1".into(), entity_id: EntityId(0) },
            Touch { author_email: "a@x.com".into(), sha1: "s2".into(), entity_id: EntityId(1) },
        ];
        let (real, _null) = calc_abpa(&partition, &touches);
        assert_eq!(real, 1.0);
    }

    #[test]
    fn scattered_author_touches_score_above_one() {
        let partition = partition_of(&[(0, 0), (1, 1), (2, 2)]);
        let touches = vec![
            Touch { author_email: "a@x.com".into(), sha1: "s1".into(), entity_id: EntityId(0) },
            Touch { author_email: "a@x.com".into(), sha1: "s1".into(), entity_id: EntityId(1) },
            Touch { author_email: "a@x.com".into(), sha1: "s1".into(), entity_id: EntityId(2) },
        ];
        let (real, _null) = calc_abpa(&partition, &touches);
        assert_eq!(real, 3.0);
    }

    #[test]
    fn block_sizes_are_descending() {
        let partition = partition_of(&[(0, 0), (1, 0), (2, 1), (3, 2), (4, 2), (5, 2)]);
        assert_eq!(block_sizes(&partition), vec![3, 2, 1]);
    }

    #[test]
    fn empty_touches_give_zero() {
        let partition = partition_of(&[(0, 0)]);
        let (real, null) = calc_abpc(&partition, &[]);
        assert_eq!(real, 0.0);
        assert_eq!(null, 0.0);
    }
}
