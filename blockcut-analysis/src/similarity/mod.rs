//! Mutual-information based name similarity.
//!
//! Builds a term x doc occurrence matrix, a mutual-information matrix, and a
//! doc x doc correlation matrix over an ordered set of identifier names.

use blockcut_core::FxHashMap;

use crate::tokenizer::Tokenizer;

/// Semantically ordered set with unique membership and O(1) position lookup.
struct IndexedSet<T> {
    items: Vec<T>,
    index_of: FxHashMap<T, usize>,
}

impl<T: Clone + Eq + std::hash::Hash> IndexedSet<T> {
    fn new() -> Self {
        Self {
            items: Vec::new(),
            index_of: FxHashMap::default(),
        }
    }

    fn insert(&mut self, item: T) -> usize {
        if let Some(&i) = self.index_of.get(&item) {
            return i;
        }
        let i = self.items.len();
        self.index_of.insert(item.clone(), i);
        self.items.push(item);
        i
    }

    fn position(&self, item: &T) -> Option<usize> {
        self.index_of.get(item).copied()
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}

/// A built name-similarity index over a fixed list of identifier names.
pub struct NameSimilarity {
    docs: IndexedSet<String>,
    /// S[i*|D|+j], symmetric, entrywise in [0,1], diagonal = implied self-similarity.
    s: Vec<f64>,
    normalizer: Tokenizer,
}

impl NameSimilarity {
    /// Build the index over `names` with the tokenizer's term extraction.
    /// `allow_dup_names`: whether identical names reinforce occurrence counts.
    /// `lookback`: skip-bigram window (default 1). Takes ownership of `tokenizer`
    /// so later `has_doc`/`sim`/`most_sim` calls can normalize raw names the
    /// same way the index itself was built.
    pub fn build(tokenizer: Tokenizer, names: &[String], allow_dup_names: bool, lookback: usize) -> Self {
        let mut terms_set: IndexedSet<String> = IndexedSet::new();
        let mut docs: IndexedSet<String> = IndexedSet::new();

        // occurrence list per doc, as (term_idx) counted with multiplicity
        let mut raw_occurrences: Vec<(usize, usize)> = Vec::new(); // (term_idx, doc_idx)

        for name in names {
            let terms = tokenizer.termize(name);
            if terms.is_empty() {
                continue;
            }
            let normalized = terms.join("_");
            let doc_idx = docs.insert(normalized);

            let mut doc_occurrences: Vec<usize> = Vec::new();
            for (i, term) in terms.iter().enumerate() {
                doc_occurrences.push(terms_set.insert(term.clone()));
                for back in 1..=lookback {
                    if i >= back {
                        let bigram = format!("{}-{}", terms[i - back], term);
                        doc_occurrences.push(terms_set.insert(bigram));
                    }
                }
            }

            if !allow_dup_names {
                doc_occurrences.sort_unstable();
                doc_occurrences.dedup();
            }

            for term_idx in doc_occurrences {
                raw_occurrences.push((term_idx, doc_idx));
            }
        }

        // N(t,d) counts before pruning
        let n_terms = terms_set.len();
        let n_docs_initial = docs.len();
        let mut counts: FxHashMap<(usize, usize), u64> = FxHashMap::default();
        let mut term_totals: Vec<u64> = vec![0; n_terms];
        for &(t, d) in &raw_occurrences {
            *counts.entry((t, d)).or_insert(0) += 1;
            term_totals[t] += 1;
        }

        // Vocabulary pruning: drop terms with total count <= 1.
        let kept_terms: Vec<bool> = term_totals.iter().map(|&c| c > 1).collect();

        let mut pruned_counts: FxHashMap<(usize, usize), u64> = FxHashMap::default();
        let mut doc_totals: Vec<u64> = vec![0; n_docs_initial];
        let mut term_totals_pruned: FxHashMap<usize, u64> = FxHashMap::default();
        let mut total_n: u64 = 0;
        for (&(t, d), &c) in &counts {
            if !kept_terms[t] {
                continue;
            }
            pruned_counts.insert((t, d), c);
            doc_totals[d] += c;
            *term_totals_pruned.entry(t).or_insert(0) += c;
            total_n += c;
        }

        // Docs with zero remaining occurrences are removed from D.
        let mut final_docs: IndexedSet<String> = IndexedSet::new();
        let mut remap_doc: FxHashMap<usize, usize> = FxHashMap::default();
        for (old_idx, name) in docs.items.iter().enumerate() {
            if doc_totals[old_idx] > 0 {
                let new_idx = final_docs.insert(name.clone());
                remap_doc.insert(old_idx, new_idx);
            }
        }

        let final_term_ids: Vec<usize> = (0..n_terms).filter(|&t| kept_terms[t]).collect();
        let mut remap_term: FxHashMap<usize, usize> = FxHashMap::default();
        for (new_idx, &old_idx) in final_term_ids.iter().enumerate() {
            remap_term.insert(old_idx, new_idx);
        }

        let n_t = final_term_ids.len();
        let n_d = final_docs.len();

        // N(t,d), N(t,.), N(.,d)
        let mut n_td: Vec<u64> = vec![0; n_t * n_d];
        let mut n_t_marg: Vec<u64> = vec![0; n_t];
        let mut n_d_marg: Vec<u64> = vec![0; n_d];
        for (&(t, d), &c) in &pruned_counts {
            let (Some(&nt), Some(&nd)) = (remap_term.get(&t), remap_doc.get(&d)) else {
                continue;
            };
            n_td[nt * n_d + nd] += c;
            n_t_marg[nt] += c;
            n_d_marg[nd] += c;
        }

        let n_total = total_n.max(1) as f64;

        // Mutual information matrix M[t,d]
        let mut m = vec![0.0f64; n_t * n_d];
        for t in 0..n_t {
            let nt = n_t_marg[t] as f64;
            let p1 = nt / n_total;
            let p0 = 1.0 - p1;
            for d in 0..n_d {
                let nd = n_d_marg[d] as f64;
                let q1 = nd / n_total;
                let q0 = 1.0 - q1;
                let ntd = n_td[t * n_d + d] as f64;

                let p11 = ntd / n_total;
                let p10 = (nt - ntd) / n_total;
                let p01 = (nd - ntd) / n_total;
                let p00 = 1.0 - p10 - p01 - p11;

                let mut i = 0.0;
                i += mi_term(p11, p1, q1);
                i += mi_term(p10, p1, q0);
                i += mi_term(p01, p0, q1);
                i += mi_term(p00, p0, q0);
                m[t * n_d + d] = i;
            }
        }

        // Doc-doc correlation S[i,j] = max(0, <u-mean(u), v-mean(v)> / (||u||*||v||))
        let mut s = vec![0.0f64; n_d * n_d];
        let col = |d: usize| -> Vec<f64> { (0..n_t).map(|t| m[t * n_d + d]).collect() };
        let cols: Vec<Vec<f64>> = (0..n_d).map(col).collect();
        let means: Vec<f64> = cols
            .iter()
            .map(|c| if c.is_empty() { 0.0 } else { c.iter().sum::<f64>() / c.len() as f64 })
            .collect();
        let norms: Vec<f64> = cols.iter().map(|c| c.iter().map(|x| x * x).sum::<f64>().sqrt()).collect();

        for i in 0..n_d {
            for j in 0..n_d {
                let denom = norms[i] * norms[j];
                let value = if denom == 0.0 {
                    0.0
                } else {
                    let dot: f64 = (0..n_t)
                        .map(|t| (cols[i][t] - means[i]) * (cols[j][t] - means[j]))
                        .sum();
                    (dot / denom).max(0.0)
                };
                s[i * n_d + j] = value;
            }
        }

        Self {
            docs: final_docs,
            s,
            normalizer: tokenizer,
        }
    }

    /// true iff `normalize_name(name) ∈ D`.
    pub fn has_doc(&self, name: &str) -> bool {
        let normalized = self.normalizer.normalize_name(name);
        self.docs.position(&normalized).is_some()
    }

    /// 0 if either doc is absent, else S at their indices.
    pub fn sim(&self, a: &str, b: &str) -> f64 {
        let na = self.normalizer.normalize_name(a);
        let nb = self.normalizer.normalize_name(b);
        let (Some(ia), Some(ib)) = (self.docs.position(&na), self.docs.position(&nb)) else {
            return 0.0;
        };
        let n_d = self.docs.len();
        self.s[ia * n_d + ib]
    }

    /// The `n` docs of highest similarity to `name`, excluding itself, descending.
    pub fn most_sim(&self, name: &str, n: usize) -> Vec<(String, f64)> {
        let normalized = self.normalizer.normalize_name(name);
        let Some(ia) = self.docs.position(&normalized) else {
            return Vec::new();
        };
        let n_d = self.docs.len();
        let mut scored: Vec<(String, f64)> = self
            .docs
            .items
            .iter()
            .enumerate()
            .filter(|&(ib, _)| ib != ia)
            .map(|(ib, doc)| (doc.clone(), self.s[ia * n_d + ib]))
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap().then_with(|| a.0.cmp(&b.0)));
        scored.truncate(n);
        scored
    }
}

fn mi_term(p_ab: f64, p_a: f64, q_b: f64) -> f64 {
    if p_ab <= 0.0 {
        return 0.0;
    }
    let denom = p_a * q_b;
    if denom <= 0.0 {
        return 0.0;
    }
    p_ab * (p_ab / denom).ln()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        vec![
            "parseHTTPResponse".to_string(),
            "parseHTTPRequest".to_string(),
            "renderWidget".to_string(),
            "renderWidgetTree".to_string(),
        ]
    }

    #[test]
    fn symmetry_within_tolerance() {
        let sim = NameSimilarity::build(Tokenizer::without_stop_words(), &names(), true, 1);
        for a in &names() {
            for b in &names() {
                assert!((sim.sim(a, b) - sim.sim(b, a)).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn entries_in_unit_range_and_self_sim_nonnegative() {
        let sim = NameSimilarity::build(Tokenizer::without_stop_words(), &names(), true, 1);
        for a in &names() {
            assert!(sim.sim(a, a) >= 0.0);
            for b in &names() {
                let v = sim.sim(a, b);
                assert!((0.0..=1.0).contains(&v), "{v} out of range");
            }
        }
    }

    #[test]
    fn unknown_doc_returns_zero() {
        let sim = NameSimilarity::build(Tokenizer::without_stop_words(), &names(), true, 1);
        assert_eq!(sim.sim("nonexistent", "alsoNonexistent"), 0.0);
        assert!(!sim.has_doc("nonexistent"));
    }

    #[test]
    fn related_names_score_higher_than_unrelated() {
        let sim = NameSimilarity::build(Tokenizer::without_stop_words(), &names(), true, 1);
        assert!(sim.sim("parseHTTPResponse", "parseHTTPRequest") > sim.sim("parseHTTPResponse", "renderWidget"));
    }

    #[test]
    fn most_sim_excludes_query_and_is_descending() {
        let sim = NameSimilarity::build(Tokenizer::without_stop_words(), &names(), true, 1);
        let normalized_query = Tokenizer::without_stop_words().normalize_name("parseHTTPResponse");
        let top = sim.most_sim("parseHTTPResponse", 3);
        assert!(top.iter().all(|(name, _)| name != &normalized_query));
        for w in top.windows(2) {
            assert!(w[0].1 >= w[1].1);
        }
    }
}
