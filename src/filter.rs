use std::sync::Arc;

use tracing::trace;

use crate::data::Row;

pub fn normalize_query(raw: &str) -> String {
    raw.trim().to_lowercase()
}

impl Row {
    /// `query` must already be normalized. Sub rows are not searched.
    pub fn matches(&self, query: &str) -> bool {
        self.first_name.to_lowercase().contains(query)
            || self.last_name.to_lowercase().contains(query)
            || self.status.as_str().contains(query)
    }
}

/// Rows whose first name, last name or status contain the query.
/// An empty query hands back the same `Arc`.
pub fn filter_rows(data: &Arc<Vec<Row>>, raw_query: &str) -> Arc<Vec<Row>> {
    let query = normalize_query(raw_query);
    if query.is_empty() {
        return Arc::clone(data);
    }
    let rows: Vec<Row> = data.iter().filter(|r| r.matches(&query)).cloned().collect();
    trace!("Filter \"{query}\" kept {} of {} rows", rows.len(), data.len());
    Arc::new(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Status, generate_nested_with, generate_with};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn anna_and_ben() -> Arc<Vec<Row>> {
        Arc::new(vec![
            Row::new("Anna", "Lee", Status::Single),
            Row::new("Ben", "Anand", Status::Complicated),
        ])
    }

    fn dataset(seed: u64) -> Arc<Vec<Row>> {
        Arc::new(generate_with(&mut StdRng::seed_from_u64(seed), 300))
    }

    #[test]
    fn empty_query_returns_same_rows() {
        let data = dataset(1);
        let out = filter_rows(&data, "");
        assert!(Arc::ptr_eq(&data, &out));
        assert_eq!(out, data);
    }

    #[test]
    fn whitespace_query_is_empty() {
        let data = dataset(2);
        assert!(Arc::ptr_eq(&data, &filter_rows(&data, "   ")));
    }

    #[test]
    fn substring_matches_names_case_insensitive() {
        let data = anna_and_ben();
        let out = filter_rows(&data, "an");
        assert_eq!(out.len(), 2);
        let out = filter_rows(&data, "  ANNA ");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].first_name, "Anna");
    }

    #[test]
    fn status_is_searched() {
        let data = anna_and_ben();
        let out = filter_rows(&data, "compl");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].first_name, "Ben");
    }

    #[test]
    fn no_match_gives_empty_view() {
        assert!(filter_rows(&anna_and_ben(), "xyz").is_empty());
    }

    #[test]
    fn numeric_fields_are_not_searched() {
        let mut row = Row::new("Anna", "Lee", Status::Single);
        row.age = 42;
        assert!(filter_rows(&Arc::new(vec![row]), "42").is_empty());
    }

    #[test]
    fn sub_rows_are_not_searched() {
        let mut parent = Row::new("Anna", "Lee", Status::Single);
        parent.sub_rows = Some(vec![Row::new("Zeno", "Oak", Status::Single)]);
        let data = Arc::new(vec![parent]);
        assert!(filter_rows(&data, "zeno").is_empty());
    }

    #[test]
    fn kept_rows_match_and_dropped_rows_do_not() {
        for (seed, q) in [(3, "a"), (4, "ER"), (5, "single"), (6, "lee"), (7, "x")] {
            let data = dataset(seed);
            let out = filter_rows(&data, q);
            let nq = normalize_query(q);
            assert!(out.iter().all(|r| r.matches(&nq)));
            let dropped = data.iter().filter(|r| !out.contains(r));
            for r in dropped {
                assert!(!r.matches(&nq));
            }
            // source order is preserved
            let expected: Vec<&Row> = data.iter().filter(|r| r.matches(&nq)).collect();
            assert_eq!(out.iter().collect::<Vec<_>>(), expected);
        }
    }

    #[test]
    fn filtering_is_idempotent() {
        let data = Arc::new(generate_nested_with(&mut StdRng::seed_from_u64(8), &[100, 2]));
        for q in ["e", "rel", "Anna", "zz"] {
            let once = filter_rows(&data, q);
            let twice = filter_rows(&once, q);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn source_is_untouched() {
        let data = dataset(9);
        let before = (*data).clone();
        let _ = filter_rows(&data, "e");
        assert_eq!(*data, before);
    }
}
