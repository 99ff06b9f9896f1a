//! Hybrid re-ranking: vector score plus a literal-name bonus.

use std::cmp::Ordering;

use super::KnowledgeFragment;

/// Tunables for [`rank_candidates`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankingPolicy {
    /// Added to a candidate's score when it mentions the query entity.
    pub name_boost: f32,
    /// Upper bound for boosted scores.
    pub max_score: f32,
}

impl Default for RankingPolicy {
    fn default() -> Self {
        Self {
            name_boost: 0.2,
            max_score: 1.0,
        }
    }
}

/// Re-ranks over-fetched candidates.
///
/// Boosts candidates mentioning `entity`, keeps those at or above
/// `threshold`, sorts descending and returns at most `k`. When nothing passes
/// the threshold but candidates exist, the best `k` are returned anyway.
pub fn rank_candidates(
    candidates: Vec<KnowledgeFragment>,
    entity: Option<&str>,
    k: usize,
    threshold: f32,
    policy: RankingPolicy,
) -> Vec<KnowledgeFragment> {
    if k == 0 || candidates.is_empty() {
        return Vec::new();
    }

    let mut boosted: Vec<KnowledgeFragment> = candidates
        .into_iter()
        .map(|mut fragment| {
            if entity.is_some_and(|name| fragment.mentions(name)) {
                fragment.score = (fragment.score + policy.name_boost).min(policy.max_score);
            }
            fragment
        })
        .collect();
    sort_descending(&mut boosted);

    let passing: Vec<KnowledgeFragment> = boosted
        .iter()
        .filter(|f| f.score >= threshold)
        .take(k)
        .cloned()
        .collect();

    if passing.is_empty() {
        boosted.truncate(k);
        return boosted;
    }
    passing
}

fn sort_descending(fragments: &mut [KnowledgeFragment]) {
    fragments.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment(text: &str, score: f32) -> KnowledgeFragment {
        KnowledgeFragment::new(text, score)
    }

    fn texts(fragments: &[KnowledgeFragment]) -> Vec<&str> {
        fragments.iter().map(|f| f.text.as_str()).collect()
    }

    #[test]
    fn never_returns_more_than_k() {
        let candidates = (0..9).map(|i| fragment("x", 0.5 + i as f32 * 0.01)).collect();
        let ranked = rank_candidates(candidates, None, 3, 0.0, RankingPolicy::default());
        assert_eq!(ranked.len(), 3);
    }

    #[test]
    fn filters_below_threshold_and_sorts() {
        let candidates = vec![fragment("a", 0.4), fragment("b", 0.9), fragment("c", 0.1)];
        let ranked = rank_candidates(candidates, None, 5, 0.3, RankingPolicy::default());
        assert_eq!(texts(&ranked), vec!["b", "a"]);
    }

    #[test]
    fn name_match_boosts_low_vector_score_into_results() {
        let candidates = vec![
            fragment("Иван Петров преподает гитару", 0.45),
            fragment("Цены на занятия", 0.42),
            fragment("Karena Zhou ведет вокал по вторникам", 0.31),
        ];
        let ranked = rank_candidates(
            candidates,
            Some("karena zhou"),
            2,
            0.3,
            RankingPolicy::default(),
        );
        assert_eq!(ranked[0].text, "Karena Zhou ведет вокал по вторникам");
        assert!((ranked[0].score - 0.51).abs() < 1e-6);
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn boost_is_capped_at_max_score() {
        let ranked = rank_candidates(
            vec![fragment("Karena Zhou", 0.95)],
            Some("Karena Zhou"),
            1,
            0.0,
            RankingPolicy::default(),
        );
        assert_eq!(ranked[0].score, 1.0);
    }

    #[test]
    fn falls_back_to_best_candidates_when_none_pass() {
        let candidates = vec![fragment("a", 0.05), fragment("b", 0.2), fragment("c", 0.1)];
        let ranked = rank_candidates(candidates, None, 2, 0.9, RankingPolicy::default());
        assert_eq!(texts(&ranked), vec!["b", "c"]);
    }

    #[test]
    fn empty_candidates_yield_empty_result() {
        let ranked = rank_candidates(Vec::new(), Some("x"), 3, 0.0, RankingPolicy::default());
        assert!(ranked.is_empty());
    }
}
