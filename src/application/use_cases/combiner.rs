// ============================================================
// COMBINER USE CASE
// ============================================================
// Concatenate two datasets and order them by their second field

use crate::domain::dataset::{leading_pair, Dataset};
use crate::domain::error::Result;

pub struct Combiner;

impl Combiner {
    /// Concatenate `first` and `second`, then sort stably by the lower-cased
    /// second field. Rows with fewer than two fields are rejected with their
    /// position in the concatenation.
    pub fn combine(first: Dataset, second: Dataset) -> Result<Dataset> {
        let mut combined = first;
        combined.extend(second);

        for (index, row) in combined.iter().enumerate() {
            leading_pair(index, row)?;
        }

        // sort_by_cached_key is stable
        combined.sort_by_cached_key(|row| row[1].to_lowercase());
        Ok(combined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::AppError;

    fn data(rows: &[&[&str]]) -> Dataset {
        rows.iter()
            .map(|r| r.iter().map(|f| f.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_merge_scenario() {
        let combined = Combiner::combine(data(&[&["b", "2"], &["a", "1"]]), data(&[&["c", "3"]]))
            .unwrap();
        assert_eq!(combined, data(&[&["a", "1"], &["b", "2"], &["c", "3"]]));
    }

    #[test]
    fn test_length_and_order() {
        let first = data(&[&["1", "pear"], &["2", "Apple"], &["3", "fig", "extra"]]);
        let second = data(&[&["4", "banana"], &["5", "apricot"]]);

        let combined = Combiner::combine(first, second).unwrap();
        assert_eq!(combined.len(), 5);

        let keys: Vec<String> = combined.iter().map(|r| r[1].to_lowercase()).collect();
        assert!(keys.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(combined[0], vec!["2", "Apple"]);
        assert_eq!(combined[2], vec!["4", "banana"]);
        assert_eq!(combined[3], vec!["3", "fig", "extra"]);
    }

    #[test]
    fn test_sort_is_case_insensitive_and_stable() {
        let first = data(&[&["first", "Key"], &["x", "a"], &["second", "KEY"]]);
        let second = data(&[&["third", "key"]]);

        let combined = Combiner::combine(first, second).unwrap();
        let order: Vec<&str> = combined.iter().map(|r| r[0].as_str()).collect();
        assert_eq!(order, vec!["x", "first", "second", "third"]);
    }

    #[test]
    fn test_cyrillic_keys_lowercase() {
        let combined =
            Combiner::combine(data(&[&["1", "Яблоко"]]), data(&[&["2", "арбуз"]])).unwrap();
        assert_eq!(combined[0][1], "арбуз");
        assert_eq!(combined[1][1], "Яблоко");
    }

    #[test]
    fn test_empty_inputs() {
        assert!(Combiner::combine(Vec::new(), Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn test_short_row_is_rejected() {
        // A trailing newline in the second file produces a single empty field
        let result = Combiner::combine(data(&[&["a", "1"]]), data(&[&["b", "2"], &[""]]));
        match result {
            Err(AppError::MalformedRow { index, fields }) => {
                assert_eq!(index, 2);
                assert_eq!(fields, vec!["".to_string()]);
            }
            other => panic!("expected MalformedRow, got {:?}", other),
        }
    }
}
