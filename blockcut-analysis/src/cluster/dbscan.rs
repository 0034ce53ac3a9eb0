//! Minimal DBSCAN over a precomputed distance matrix, used to seed `name_id`
//! when `USE_INIT_TEXT_CLX` is enabled. Kept hand-rolled: no clustering crate
//! in reach models a precomputed-distance metric space without also requiring
//! a coordinate space.

/// Run DBSCAN over `n` points given a symmetric distance lookup. Returns a
/// label per point: `Some(cluster_id)` for core/border points, `None` for
/// noise (each noise point ends up in its own singleton group by the caller).
pub fn dbscan(n: usize, distance: impl Fn(usize, usize) -> f64, eps: f64, min_pts: usize) -> Vec<Option<usize>> {
    let mut labels: Vec<Option<usize>> = vec![None; n];
    let mut visited = vec![false; n];
    let mut next_cluster = 0usize;

    let neighbors = |p: usize| -> Vec<usize> {
        (0..n).filter(|&q| q != p && distance(p, q) <= eps).collect()
    };

    for p in 0..n {
        if visited[p] {
            continue;
        }
        visited[p] = true;
        let mut neighbor_set = neighbors(p);
        if neighbor_set.len() + 1 < min_pts {
            continue; // stays noise unless later claimed as a border point
        }

        let cluster_id = next_cluster;
        next_cluster += 1;
        labels[p] = Some(cluster_id);

        let mut queue = neighbor_set.clone();
        let mut i = 0;
        while i < queue.len() {
            let q = queue[i];
            i += 1;
            if !visited[q] {
                visited[q] = true;
                let q_neighbors = neighbors(q);
                if q_neighbors.len() + 1 >= min_pts {
                    for &r in &q_neighbors {
                        if !queue.contains(&r) {
                            queue.push(r);
                        }
                    }
                }
            }
            if labels[q].is_none() {
                labels[q] = Some(cluster_id);
            }
        }
        neighbor_set.clear();
    }

    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_tight_clusters_separate_from_noise() {
        // points 0,1,2 mutually close; points 3,4,5 mutually close; 6 is isolated noise.
        let dist = |a: usize, b: usize| -> f64 {
            let group = |p: usize| -> usize {
                match p {
                    0..=2 => 0,
                    3..=5 => 1,
                    _ => 2,
                }
            };
            if group(a) == group(b) && a != b {
                0.1
            } else if a == b {
                0.0
            } else {
                5.0
            }
        };
        let labels = dbscan(7, dist, 0.3, 3);
        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[1], labels[2]);
        assert_eq!(labels[3], labels[4]);
        assert_ne!(labels[0], labels[3]);
        assert_eq!(labels[6], None);
    }
}
