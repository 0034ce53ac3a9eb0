//! Recursive bisection clustering driver.
//!
//! `run` assigns `name_id`, `strong_id`, `weak_id`, and finally `block_name` /
//! `block_id` onto an `EntityTable`, deriving similarity edges from a
//! `NameSimilarity` index over target names and bisecting every weakly
//! connected component with the balanced minimum-cut solver.

pub mod dbscan;

use blockcut_core::{ClusterConfig, DependencyEdge, EntityTable, FxHashMap, FxHashSet};
use rayon::prelude::*;

use crate::graph;
use crate::similarity::NameSimilarity;
use crate::solver::{self, SolverOutcome};
use crate::tokenizer::Tokenizer;

type WeightedEdge = (usize, usize, i64);

/// One bisection attempt's outcome, recorded for observability/testing.
#[derive(Debug, Clone)]
pub struct BisectionRecord {
    pub block_name: String,
    pub outcome: SolverOutcome,
}

/// Everything produced by one clustering run, beyond the mutations applied to
/// the `EntityTable` itself.
#[derive(Debug, Default)]
pub struct ClusterReport {
    pub bisections: Vec<BisectionRecord>,
}

/// Run the full clustering pipeline over `table`, using `deps` as the
/// dependency edges and `target_ids` to scope which entities' names feed the
/// similarity index. Clients participate in the dependency graph but never
/// seed similarity edges.
pub fn run(
    table: &mut EntityTable,
    deps: &[DependencyEdge],
    target_ids: &FxHashSet<blockcut_core::EntityId>,
    config: &ClusterConfig,
) -> ClusterReport {
    let n = table.len();
    if n == 0 {
        return ClusterReport::default();
    }

    let tokenizer = Tokenizer::new();

    // entity-level directed edges, self-loops dropped (ignored everywhere).
    let entity_edges: Vec<(usize, usize)> = deps
        .iter()
        .filter(|e| !e.is_self_loop())
        .map(|e| (e.src_id.index(), e.tgt_id.index()))
        .collect();

    // Step 1a: name_id.
    assign_name_id(table, &tokenizer, &entity_edges, config);

    // Step 1b/1c: strong_id (SCC over name_id quotient), weak_id (WCC over strong_id quotient).
    let n_names = table.name_id.iter().map(|x| x.unwrap().index()).max().map_or(0, |m| m + 1);
    let name_nodes: Vec<usize> = (0..n_names).collect();
    let name_edges: Vec<(usize, usize)> = graph::quotient(&entity_edges, |e| table.name_id[e].unwrap().index())
        .into_iter()
        .filter(|&(a, b)| a != b)
        .collect();
    let strong_labels = graph::scc_labels(&name_nodes, &name_edges);
    for i in 0..n {
        let name_id = table.name_id[i].unwrap().index();
        table.strong_id[i] = Some(strong_labels[&name_id].into());
    }

    let n_strong = table.strong_id.iter().map(|x| x.unwrap().index()).max().map_or(0, |m| m + 1);
    let strong_nodes: Vec<usize> = (0..n_strong).collect();
    let mut strong_of_name: FxHashMap<usize, usize> = FxHashMap::default();
    for i in 0..n {
        strong_of_name.insert(table.name_id[i].unwrap().index(), table.strong_id[i].unwrap().index());
    }
    let strong_edges: Vec<(usize, usize)> = graph::quotient(&name_edges, |ni| strong_of_name[&ni])
        .into_iter()
        .filter(|&(a, b)| a != b)
        .collect();
    let weak_labels = graph::wcc_labels(&strong_nodes, &strong_edges);
    for i in 0..n {
        let strong_id = table.strong_id[i].unwrap().index();
        table.weak_id[i] = Some(weak_labels[&strong_id].into());
    }

    // Step 2: similarity edges between strong groups.
    let target_names: Vec<String> = table
        .entities
        .iter()
        .filter(|e| !e.is_file() && target_ids.contains(&e.id))
        .map(|e| e.name.clone())
        .collect();
    let similarity = (!target_names.is_empty() && config.effective_use_text_edges()).then(|| {
        NameSimilarity::build(
            Tokenizer::new(),
            &target_names,
            config.effective_allow_dup_names(),
            config.effective_lookback(),
        )
    });

    let mut names_by_strong: FxHashMap<usize, Vec<String>> = FxHashMap::default();
    if similarity.is_some() {
        for e in &table.entities {
            if e.is_file() || !target_ids.contains(&e.id) {
                continue;
            }
            let sid = table.strong_id[e.id.index()].unwrap().index();
            names_by_strong.entry(sid).or_default().push(e.name.clone());
        }
    }

    let mut text_edges: Vec<(usize, usize, f64)> = Vec::new();
    if let Some(sim) = &similarity {
        let threshold = config.effective_text_edge_min_sim();
        let mut strong_ids: Vec<usize> = names_by_strong.keys().copied().collect();
        strong_ids.sort_unstable();
        for (ai, &a) in strong_ids.iter().enumerate() {
            for &b in &strong_ids[ai + 1..] {
                let mut best = 0.0f64;
                for na in &names_by_strong[&a] {
                    if !sim.has_doc(na) {
                        continue;
                    }
                    for nb in &names_by_strong[&b] {
                        if !sim.has_doc(nb) {
                            continue;
                        }
                        best = best.max(sim.sim(na, nb));
                    }
                }
                if best >= threshold {
                    text_edges.push((a, b, best));
                }
            }
        }
    }

    // Step 3: weights.
    let mut strong_weight: Vec<u32> = vec![0; n_strong];
    for e in &table.entities {
        let sid = table.strong_id[e.id.index()].unwrap().index();
        strong_weight[sid] += e.weight();
    }

    let unit_weight = config.effective_unit_edge_weight() as i64;
    let multiplier = config.effective_text_edge_multiplier();
    let di_weighted: Vec<(usize, usize, i64)> = strong_edges.iter().map(|&(a, b)| (a, b, unit_weight)).collect();
    let un_weighted: Vec<(usize, usize, i64)> = text_edges
        .iter()
        .map(|&(a, b, score)| (a, b, (score * unit_weight as f64 * multiplier).round() as i64))
        .collect();

    // Step 4: recursive bisection, one WCC at a time, ascending weak_id.
    let max_weight = config.effective_max_weight();
    let use_all = config.effective_use_all();
    let cut_eps = config.effective_cut_eps();
    let time_limit = config.effective_solver_time_limit_secs();

    // Each weakly connected component bisects independently, so the per-WCC
    // work fans out across rayon's pool; results merge back in afterward.
    let n_weak = table.weak_id.iter().map(|x| x.unwrap().index()).max().map_or(0, |m| m + 1);
    let per_weak: Vec<(FxHashMap<usize, String>, Vec<BisectionRecord>)> = (0..n_weak)
        .into_par_iter()
        .map(|weak_id| {
            let active: FxHashSet<usize> = (0..n_strong).filter(|&sid| weak_labels[&sid] == weak_id).collect();
            let name = format!("W{weak_id}");
            let mut local_out = FxHashMap::default();
            let mut local_report = ClusterReport::default();
            bisect(
                &di_weighted,
                &un_weighted,
                &strong_weight,
                active,
                name,
                max_weight,
                use_all,
                cut_eps,
                time_limit,
                &mut local_out,
                &mut local_report,
            );
            (local_out, local_report.bisections)
        })
        .collect();

    let mut block_of_strong: FxHashMap<usize, String> = FxHashMap::default();
    let mut report = ClusterReport::default();
    for (local_out, local_bisections) in per_weak {
        block_of_strong.extend(local_out);
        report.bisections.extend(local_bisections);
    }

    // Step 5: block assignment.
    for e in &table.entities {
        let sid = table.strong_id[e.id.index()].unwrap().index();
        table.block_name[e.id.index()] = Some(block_of_strong[&sid].clone());
    }
    assign_block_id(table);

    report
}

fn assign_name_id(table: &mut EntityTable, tokenizer: &Tokenizer, entity_edges: &[(usize, usize)], config: &ClusterConfig) {
    let _ = entity_edges;
    if config.effective_use_init_text_clx() {
        assign_name_id_via_dbscan(table, tokenizer);
    } else {
        // Dense grouping on the raw `name` column: identical identifier strings share a name_id.
        let mut seen: FxHashMap<String, usize> = FxHashMap::default();
        for e in &table.entities {
            let next = seen.len();
            let gid = *seen.entry(e.name.clone()).or_insert(next);
            table.name_id[e.id.index()] = Some(gid.into());
        }
    }
}

fn assign_name_id_via_dbscan(table: &mut EntityTable, tokenizer: &Tokenizer) {
    let names: Vec<String> = table.entities.iter().filter(|e| !e.is_file()).map(|e| e.name.clone()).collect();
    if names.is_empty() {
        for e in &table.entities {
            table.name_id[e.id.index()] = Some(0.into());
        }
        return;
    }

    let sim = NameSimilarity::build(Tokenizer::new(), &names, true, 1);
    let normalized: Vec<String> = names.iter().map(|n| tokenizer.normalize_name(n)).collect();
    let mut dedup_normalized: Vec<String> = normalized.clone();
    dedup_normalized.sort();
    dedup_normalized.dedup();
    let n_docs = dedup_normalized.len();

    let dist = |a: usize, b: usize| -> f64 { 1.0 - sim.sim(&dedup_normalized[a], &dedup_normalized[b]) };
    let doc_labels = dbscan::dbscan(n_docs, dist, 0.30, 3);

    let n_clusters = doc_labels.iter().filter_map(|x| *x).max().map_or(0, |m| m + 1);
    let mut next_fresh = n_clusters;
    let mut group_of_normalized: FxHashMap<String, usize> = FxHashMap::default();
    for (i, norm) in dedup_normalized.iter().enumerate() {
        let gid = match doc_labels[i] {
            Some(c) => c,
            None => {
                let id = next_fresh;
                next_fresh += 1;
                id
            }
        };
        group_of_normalized.insert(norm.clone(), gid);
    }

    for e in &table.entities {
        if e.is_file() {
            let id = next_fresh;
            next_fresh += 1;
            table.name_id[e.id.index()] = Some(id.into());
            continue;
        }
        let norm = tokenizer.normalize_name(&e.name);
        let gid = group_of_normalized[&norm];
        table.name_id[e.id.index()] = Some(gid.into());
    }
}

fn assign_block_id(table: &mut EntityTable) {
    let mut seen: FxHashMap<String, usize> = FxHashMap::default();
    for e in &table.entities {
        let name = table.block_name[e.id.index()].clone().unwrap();
        let next = seen.len();
        let id = *seen.entry(name).or_insert(next);
        table.block_id[e.id.index()] = Some(id.into());
    }
}

#[allow(clippy::too_many_arguments)]
fn bisect(
    di_edges: &[(usize, usize, i64)],
    un_edges: &[(usize, usize, i64)],
    strong_weight: &[u32],
    active: FxHashSet<usize>,
    name: String,
    max_weight: u32,
    use_all: bool,
    cut_eps: f64,
    time_limit: u64,
    out: &mut FxHashMap<usize, String>,
    report: &mut ClusterReport,
) {
    let total: u32 = active.iter().map(|&sid| strong_weight[sid]).sum();
    if total <= max_weight {
        for &sid in &active {
            out.insert(sid, name.clone());
        }
        return;
    }

    let weight_fn = |sid: usize| -> u32 {
        if active.contains(&sid) {
            strong_weight[sid]
        } else {
            0
        }
    };

    let (use_di, use_un): (Vec<WeightedEdge>, Vec<WeightedEdge>) = if use_all {
        (di_edges.to_vec(), un_edges.to_vec())
    } else {
        let filt = |edges: &[WeightedEdge]| -> Vec<WeightedEdge> {
            edges
                .iter()
                .filter(|&&(a, b, _)| active.contains(&a) && active.contains(&b))
                .copied()
                .collect()
        };
        (filt(di_edges), filt(un_edges))
    };

    let outcome = solver::partition(&use_di, &use_un, &weight_fn, 2, cut_eps, time_limit);
    report.bisections.push(BisectionRecord {
        block_name: name.clone(),
        outcome: outcome.clone(),
    });

    let Some(labels) = outcome.labels().filter(|l| !l.is_empty() || active.is_empty()) else {
        for &sid in &active {
            out.insert(sid, name.clone());
        }
        return;
    };
    if active.iter().any(|sid| !labels.contains_key(sid)) {
        // solver didn't place every active node (shouldn't happen given use_all's
        // zero-weighting still includes all edge endpoints): fall back to leaf.
        for &sid in &active {
            out.insert(sid, name.clone());
        }
        return;
    }

    let active_a: FxHashSet<usize> = active.iter().filter(|&&sid| labels[&sid] == 0).copied().collect();
    let active_b: FxHashSet<usize> = active.iter().filter(|&&sid| labels[&sid] == 1).copied().collect();

    bisect(
        di_edges,
        un_edges,
        strong_weight,
        active_a,
        format!("{name}A"),
        max_weight,
        use_all,
        cut_eps,
        time_limit,
        out,
        report,
    );
    bisect(
        di_edges,
        un_edges,
        strong_weight,
        active_b,
        format!("{name}B"),
        max_weight,
        use_all,
        cut_eps,
        time_limit,
        out,
        report,
    );
}
