use crate::config::BestHits;

/// Sort by score (descending, stable) and keep the best entries.
///
/// With `best = None` everything is returned, ranked. Otherwise the first `best.best`
/// entries are kept, plus every further entry whose score is within
/// `best.ambiguity_threshold` of the top score, so near-ties at the cutoff survive.
pub fn rank_with_ambiguity<T, F>(mut items: Vec<T>, score: F, best: Option<BestHits>) -> Vec<T>
where
    F: Fn(&T) -> f64,
{
    items.sort_by(|a, b| {
        score(b)
            .partial_cmp(&score(a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let Some(best) = best else {
        return items;
    };
    if items.len() <= best.best {
        return items;
    }

    let top = score(&items[0]);
    let keep = best.best
        + items[best.best..]
            .iter()
            .take_while(|item| top - score(item) <= best.ambiguity_threshold)
            .count();
    items.truncate(keep);
    items
}
