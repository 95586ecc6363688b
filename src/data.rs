use std::fmt;

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Serialize;
use tracing::debug;

const FIRST_WORDS: &[&str] = &[
    "anna", "ben", "carla", "dmitri", "elena", "farid", "greta", "hugo", "ines", "jonas", "kira",
    "liam", "mara", "nils", "olga", "pavel", "quinn", "rosa", "sven", "tara", "ugo", "vera",
    "wanda", "xavi", "yara", "zeno", "amber", "brook", "cedar", "dusk",
];

const LAST_WORDS: &[&str] = &[
    "anand", "lee", "meadow", "harbor", "stone", "river", "frost", "ember", "willow", "granite",
    "thorn", "vale", "birch", "copper", "falcon", "glen", "heath", "iris", "juniper", "kestrel",
    "lark", "marsh", "north", "oak", "pine", "quarry", "reed", "sage", "tide", "wren",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Single,
    Relationship,
    Complicated,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Single => "single",
            Status::Relationship => "relationship",
            Status::Complicated => "complicated",
        }
    }

    fn from_chance(chance: f64) -> Self {
        if chance > 0.66 {
            Status::Relationship
        } else if chance > 0.33 {
            Status::Complicated
        } else {
            Status::Single
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One record of the demo dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub visits: u32,
    pub status: Status,
    pub progress: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_rows: Option<Vec<Row>>,
}

impl Row {
    #[cfg(test)]
    pub fn new(first_name: &str, last_name: &str, status: Status) -> Self {
        Row {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            age: 0,
            visits: 0,
            status,
            progress: 0,
            sub_rows: None,
        }
    }

    /// Number of rows nested below this one, at any depth.
    pub fn descendants(&self) -> usize {
        self.sub_rows
            .as_ref()
            .map(|rows| rows.iter().map(|r| 1 + r.descendants()).sum())
            .unwrap_or(0)
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn random_word<R: Rng>(rng: &mut R, words: &[&str]) -> String {
    words.choose(rng).map(|w| capitalize(w)).unwrap_or_default()
}

fn new_person<R: Rng>(rng: &mut R) -> Row {
    Row {
        first_name: random_word(rng, FIRST_WORDS),
        last_name: random_word(rng, LAST_WORDS),
        age: rng.random_range(0..30),
        visits: rng.random_range(0..100),
        progress: rng.random_range(0..100),
        status: Status::from_chance(rng.random::<f64>()),
        sub_rows: None,
    }
}

fn make_level<R: Rng>(rng: &mut R, lens: &[usize]) -> Vec<Row> {
    let Some((&len, rest)) = lens.split_first() else {
        return Vec::new();
    };
    (0..len)
        .map(|_| {
            let mut row = new_person(rng);
            if rest.first().is_some_and(|&n| n > 0) {
                row.sub_rows = Some(make_level(rng, rest));
            }
            row
        })
        .collect()
}

/// `count` top level rows without sub rows.
pub fn generate(count: usize) -> Vec<Row> {
    generate_with(&mut rand::rng(), count)
}

pub fn generate_with<R: Rng>(rng: &mut R, count: usize) -> Vec<Row> {
    generate_nested_with(rng, &[count])
}

/// `lens[0]` rows, each carrying `lens[1]` sub rows, and so on.
pub fn generate_nested(lens: &[usize]) -> Vec<Row> {
    generate_nested_with(&mut rand::rng(), lens)
}

pub fn generate_nested_with<R: Rng>(rng: &mut R, lens: &[usize]) -> Vec<Row> {
    let rows = make_level(rng, lens);
    debug!("Generated {} rows for levels {:?}", rows.len(), lens);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn generate_returns_requested_count_without_sub_rows() {
        let rows = generate(25);
        assert_eq!(rows.len(), 25);
        assert!(rows.iter().all(|r| r.sub_rows.is_none()));
    }

    #[test]
    fn generated_values_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for row in generate_with(&mut rng, 500) {
            assert!(row.age < 30);
            assert!(row.visits < 100);
            assert!(row.progress < 100);
            assert!(!row.first_name.is_empty());
            assert!(row.first_name.chars().next().unwrap().is_uppercase());
        }
    }

    #[test]
    fn nested_levels_produce_sub_rows() {
        let mut rng = StdRng::seed_from_u64(1);
        let rows = generate_nested_with(&mut rng, &[3, 2, 4]);
        assert_eq!(rows.len(), 3);
        for row in &rows {
            let subs = row.sub_rows.as_ref().unwrap();
            assert_eq!(subs.len(), 2);
            for sub in subs {
                assert_eq!(sub.sub_rows.as_ref().unwrap().len(), 4);
                assert!(sub.sub_rows.as_ref().unwrap().iter().all(|r| r.sub_rows.is_none()));
            }
            assert_eq!(row.descendants(), 2 + 2 * 4);
        }
    }

    #[test]
    fn zero_length_level_means_no_sub_rows() {
        let rows = generate_nested(&[2, 0]);
        assert!(rows.iter().all(|r| r.sub_rows.is_none()));
        assert!(generate_nested(&[]).is_empty());
    }

    #[test]
    fn same_seed_same_data() {
        let a = generate_with(&mut StdRng::seed_from_u64(42), 10);
        let b = generate_with(&mut StdRng::seed_from_u64(42), 10);
        assert_eq!(a, b);
    }

    #[test]
    fn status_thresholds() {
        assert_eq!(Status::from_chance(0.9), Status::Relationship);
        assert_eq!(Status::from_chance(0.5), Status::Complicated);
        assert_eq!(Status::from_chance(0.33), Status::Single);
        assert_eq!(Status::from_chance(0.0), Status::Single);
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let row = Row::new("Anna", "Lee", Status::Single);
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["firstName"], "Anna");
        assert_eq!(json["status"], "single");
        assert!(json.get("subRows").is_none());
    }
}
