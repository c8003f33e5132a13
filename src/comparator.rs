use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::row::RowRecord;

/// The six columns a scouts' log row can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    Name,
    Id,
    Status,
    AssigneeA,
    AssigneeB,
    Timestamp,
}

/// Which way a key sorts when no inversion is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NaturalOrder {
    Ascending,
    Descending,
}

/// `Normal` is a key's natural order, `Reverse` its inversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Normal,
    Reverse,
}

impl SortKey {
    pub const ALL: [SortKey; 6] = [
        SortKey::Name,
        SortKey::Id,
        SortKey::Status,
        SortKey::AssigneeA,
        SortKey::AssigneeB,
        SortKey::Timestamp,
    ];

    /// Raw comparison in the key's natural order. String keys are
    /// case-insensitive and ascending, numeric and time keys put the larger
    /// value first.
    pub fn compare(&self, a: &RowRecord, b: &RowRecord) -> Ordering {
        let ascending = match self {
            SortKey::Name => string_compare(&a.name, &b.name),
            SortKey::Id => a.id.cmp(&b.id),
            SortKey::Status => string_compare(&a.status, &b.status),
            SortKey::AssigneeA => string_compare(&a.assignee_a, &b.assignee_a),
            SortKey::AssigneeB => string_compare(&a.assignee_b, &b.assignee_b),
            SortKey::Timestamp => a.timestamp.cmp(&b.timestamp),
        };
        match self.natural_order() {
            NaturalOrder::Ascending => ascending,
            NaturalOrder::Descending => ascending.reverse(),
        }
    }

    pub fn natural_order(&self) -> NaturalOrder {
        match self {
            SortKey::Id | SortKey::Timestamp => NaturalOrder::Descending,
            _ => NaturalOrder::Ascending,
        }
    }

    /// Header cell the key's control lives in. Name and id share the first
    /// column.
    pub fn column(&self) -> usize {
        match self {
            SortKey::Name | SortKey::Id => 0,
            SortKey::Status => 1,
            SortKey::AssigneeA => 2,
            SortKey::AssigneeB => 3,
            SortKey::Timestamp => 4,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            SortKey::Name => "Sort by Cell Name",
            SortKey::Id => "Sort by Cell ID",
            SortKey::Status => "Sort by Status",
            SortKey::AssigneeA => "Sort by Player A",
            SortKey::AssigneeB => "Sort by Player B",
            SortKey::Timestamp => "Sort by Time",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SortKey::Name => "name",
            SortKey::Id => "id",
            SortKey::Status => "status",
            SortKey::AssigneeA => "player-a",
            SortKey::AssigneeB => "player-b",
            SortKey::Timestamp => "time",
        };
        f.write_str(name)
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "name" => Ok(SortKey::Name),
            "id" => Ok(SortKey::Id),
            "status" => Ok(SortKey::Status),
            "player-a" | "a" => Ok(SortKey::AssigneeA),
            "player-b" | "b" => Ok(SortKey::AssigneeB),
            "time" | "timestamp" => Ok(SortKey::Timestamp),
            other => Err(format!("unknown sort key \"{other}\"")),
        }
    }
}

impl SortDirection {
    pub fn flip(self) -> Self {
        match self {
            SortDirection::Normal => SortDirection::Reverse,
            SortDirection::Reverse => SortDirection::Normal,
        }
    }

    pub fn is_reverse(self) -> bool {
        self == SortDirection::Reverse
    }

    /// Inversion wrapper: negates the relation for `Reverse`.
    pub fn apply(self, relation: Ordering) -> Ordering {
        match self {
            SortDirection::Normal => relation,
            SortDirection::Reverse => relation.reverse(),
        }
    }

    pub fn as_attr(self) -> &'static str {
        match self {
            SortDirection::Normal => "normal",
            SortDirection::Reverse => "reverse",
        }
    }

    /// Anything other than `"reverse"` reads as `Normal`.
    pub fn from_attr(value: Option<&str>) -> Self {
        match value {
            Some("reverse") => SortDirection::Reverse,
            _ => SortDirection::Normal,
        }
    }
}

pub fn compare_directed(
    key: SortKey,
    direction: SortDirection,
    a: &RowRecord,
    b: &RowRecord,
) -> Ordering {
    direction.apply(key.compare(a, b))
}

/// Stable sort, rows comparing equal keep their current relative order.
pub fn sort_rows(rows: &mut [RowRecord], key: SortKey, direction: SortDirection) {
    rows.sort_by(|a, b| compare_directed(key, direction, a, b));
}

// Lowercased so "amy" and "Amy" sort next to each other.
fn string_compare(x: &str, y: &str) -> Ordering {
    x.to_lowercase().cmp(&y.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::tests::record;
    use proptest::prelude::*;

    fn ids(rows: &[RowRecord]) -> Vec<u64> {
        rows.iter().map(|r| r.id).collect()
    }

    #[test]
    fn id_sorts_largest_first_unless_reversed() {
        let mut rows = vec![record("a", 5), record("b", 1), record("c", 3)];
        sort_rows(&mut rows, SortKey::Id, SortDirection::Normal);
        assert_eq!(ids(&rows), vec![5, 3, 1]);
        sort_rows(&mut rows, SortKey::Id, SortDirection::Reverse);
        assert_eq!(ids(&rows), vec![1, 3, 5]);
    }

    #[test]
    fn timestamp_sorts_newest_first() {
        let mut old = record("old", 1);
        old.timestamp = "2020-01-01T00:00:00Z".parse().unwrap();
        let mut new = record("new", 2);
        new.timestamp = "2024-06-01T00:00:00Z".parse().unwrap();
        let mut rows = vec![old, new];
        sort_rows(&mut rows, SortKey::Timestamp, SortDirection::Normal);
        assert_eq!(rows[0].name, "new");
    }

    #[test]
    fn names_interleave_regardless_of_case() {
        let mut rows = vec![
            record("bob", 1),
            record("Carl", 2),
            record("amy", 3),
            record("Bob", 4),
            record("Amy", 5),
        ];
        sort_rows(&mut rows, SortKey::Name, SortDirection::Normal);
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["amy", "Amy", "bob", "Bob", "Carl"]);
    }

    #[test]
    fn string_compare_leaves_fields_untouched() {
        let mut rows = vec![record("ZED", 1), record("alf", 2)];
        sort_rows(&mut rows, SortKey::Name, SortDirection::Normal);
        assert_eq!(rows[1].name, "ZED");
    }

    #[test]
    fn normal_direction_follows_natural_order() {
        let mut small = record("alpha", 1);
        small.status = "complete".into();
        small.assignee_a = "amy".into();
        small.assignee_b = "amy".into();
        small.timestamp = "2020-01-01T00:00:00Z".parse().unwrap();
        let mut large = record("Zulu", 9);
        large.status = "Need A".into();
        large.assignee_a = "Zed".into();
        large.assignee_b = "Zed".into();
        large.timestamp = "2024-01-01T00:00:00Z".parse().unwrap();

        for key in SortKey::ALL {
            let mut rows = vec![large.clone(), small.clone()];
            sort_rows(&mut rows, key, SortDirection::Normal);
            let first = match key.natural_order() {
                NaturalOrder::Ascending => &small,
                NaturalOrder::Descending => &large,
            };
            assert_eq!(rows[0].id, first.id, "{key}");
        }
        assert_eq!(SortKey::Id.natural_order(), NaturalOrder::Descending);
        assert_eq!(SortKey::Timestamp.natural_order(), NaturalOrder::Descending);
        assert_eq!(SortKey::Status.natural_order(), NaturalOrder::Ascending);
    }

    #[test]
    fn keys_parse_from_cli_names() {
        for key in SortKey::ALL {
            assert_eq!(key.to_string().parse::<SortKey>(), Ok(key));
        }
        assert!("colour".parse::<SortKey>().is_err());
    }

    #[test]
    fn direction_attr_round_trip() {
        assert_eq!(SortDirection::from_attr(Some("reverse")), SortDirection::Reverse);
        assert_eq!(SortDirection::from_attr(Some("normal")), SortDirection::Normal);
        assert_eq!(SortDirection::from_attr(None), SortDirection::Normal);
        assert_eq!(SortDirection::Normal.flip().as_attr(), "reverse");
    }

    proptest! {
        #[test]
        fn reverse_is_exact_inversion(a in "[a-zA-Z]{0,6}", b in "[a-zA-Z]{0,6}", x in 0u64..100, y in 0u64..100) {
            let ra = record(&a, x);
            let rb = record(&b, y);
            for key in SortKey::ALL {
                prop_assert_eq!(
                    compare_directed(key, SortDirection::Reverse, &ra, &rb),
                    key.compare(&ra, &rb).reverse()
                );
            }
        }

        #[test]
        fn case_never_separates_names(names in proptest::collection::vec("[a-c]{1,3}", 1..12)) {
            let mut rows: Vec<RowRecord> = names
                .iter()
                .enumerate()
                .flat_map(|(i, n)| [record(n, i as u64), record(&n.to_uppercase(), i as u64)])
                .collect();
            sort_rows(&mut rows, SortKey::Name, SortDirection::Normal);
            let lowered: Vec<String> = rows.iter().map(|r| r.name.to_lowercase()).collect();
            let mut expected = lowered.clone();
            expected.sort();
            prop_assert_eq!(lowered, expected);
        }

        #[test]
        fn double_toggle_round_trips(names in proptest::collection::vec("[a-dA-D]{1,2}", 0..16)) {
            let mut rows: Vec<RowRecord> = names
                .iter()
                .enumerate()
                .map(|(i, n)| record(n, i as u64))
                .collect();
            sort_rows(&mut rows, SortKey::Name, SortDirection::Normal);
            let first = ids(&rows);
            sort_rows(&mut rows, SortKey::Name, SortDirection::Reverse);
            sort_rows(&mut rows, SortKey::Name, SortDirection::Normal);
            prop_assert_eq!(ids(&rows), first);
        }
    }
}
