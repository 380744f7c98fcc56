use indexmap::IndexMap;

/// Per-label share of a counted population.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelShare {
    pub label: String,
    pub count: usize,
    pub share: f64,
}

/// Count occurrences of each label in first-seen order (exact string match).
pub fn count_labels<'a>(labels: impl IntoIterator<Item = &'a str>) -> IndexMap<String, usize> {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for label in labels {
        *counts.entry(label.to_string()).or_default() += 1;
    }
    counts
}

/// Convert first-seen counts into shares sorted by descending count.
///
/// Ties keep first-seen order, so repeated runs on the same input agree.
pub fn label_shares(counts: &IndexMap<String, usize>) -> Vec<LabelShare> {
    let total: usize = counts.values().sum();
    let mut shares: Vec<LabelShare> = counts
        .iter()
        .map(|(label, count)| LabelShare {
            label: label.clone(),
            count: *count,
            share: if total == 0 {
                0.0
            } else {
                *count as f64 / total as f64
            },
        })
        .collect();
    // `sort_by` is stable; equal counts stay in first-seen order.
    shares.sort_by(|a, b| b.count.cmp(&a.count));
    shares
}
