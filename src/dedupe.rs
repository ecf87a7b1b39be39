//! Order-preserving deduplication

use std::collections::HashSet;
use std::hash::Hash;

/// Keep the first item for every key produced by `key`
pub fn dedupe_by_key<T, K, F>(items: Vec<T>, mut key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: FnMut(&T) -> K,
{
    let mut seen = HashSet::new();
    items.into_iter().filter(|item| seen.insert(key(item))).collect()
}

/// Lowercased leading `len` characters, the comparison key for near-duplicate prose
pub fn prefix_key(text: &str, len: usize) -> String {
    text.trim().to_lowercase().chars().take(len).collect()
}

/// Keep an item unless an earlier kept item in the same group already
/// contains its `prefix_len`-character prefix (case-insensitive)
pub fn dedupe_by_prefix<T, G, FG, FT>(items: Vec<T>, prefix_len: usize, group: FG, text: FT) -> Vec<T>
where
    G: Eq,
    FG: Fn(&T) -> G,
    FT: Fn(&T) -> &str,
{
    let mut kept: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        let prefix = prefix_key(text(&item), prefix_len);
        let g = group(&item);
        let duplicate = kept
            .iter()
            .any(|k| group(k) == g && text(k).to_lowercase().contains(&prefix));
        if !duplicate {
            kept.push(item);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_key_keeps_first() {
        let urls = vec!["a", "b", "a", "c", "b"];
        assert_eq!(dedupe_by_key(urls, |u| *u), vec!["a", "b", "c"]);
    }

    #[test]
    fn prefix_merges_within_group_only() {
        let items = vec![
            (1, "Book early to get the best rates in town"),
            (1, "Book early to get the best rates, trust me"),
            (2, "Book early to get the best rates in town"),
            (1, "Something else entirely"),
        ];
        let kept = dedupe_by_prefix(items, 20, |i| i.0, |i| i.1);
        assert_eq!(kept.len(), 3);
        assert_eq!(kept[1].0, 2);
    }
}
