use std::collections::HashMap;

use serde::Serialize;

use crate::models::{
    Faculty, Student, PROGRAM_NOT_SPECIFIED, UNSPECIFIED_DEPARTMENT, UNSPECIFIED_TYPE,
    YEAR_NOT_SPECIFIED,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakdownCell {
    pub key: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakdownRow {
    pub key: String,
    pub total: usize,
    pub cells: Vec<BreakdownCell>,
}

impl BreakdownRow {
    pub fn count(&self, secondary: &str) -> usize {
        self.cells
            .iter()
            .find(|c| c.key == secondary)
            .map(|c| c.count)
            .unwrap_or(0)
    }
}

/// Primary key -> (secondary key -> count, total), in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BreakdownTable {
    pub rows: Vec<BreakdownRow>,
}

impl BreakdownTable {
    pub fn grand_total(&self) -> usize {
        self.rows.iter().map(|r| r.total).sum()
    }

    pub fn row(&self, key: &str) -> Option<&BreakdownRow> {
        self.rows.iter().find(|r| r.key == key)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Surrounding whitespace is not part of a key; blank keys take the default.
fn resolve_key(value: Option<&str>, default: &str) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => default.to_string(),
    }
}

pub fn aggregate<T, P, S>(
    entities: &[T],
    primary_of: P,
    secondary_of: S,
    primary_default: &str,
    secondary_default: &str,
) -> BreakdownTable
where
    P: Fn(&T) -> Option<&str>,
    S: Fn(&T) -> Option<&str>,
{
    let mut rows: Vec<BreakdownRow> = Vec::new();
    let mut row_index: HashMap<String, usize> = HashMap::new();

    for entity in entities {
        let primary = resolve_key(primary_of(entity), primary_default);
        let secondary = resolve_key(secondary_of(entity), secondary_default);

        let idx = *row_index.entry(primary.clone()).or_insert_with(|| {
            rows.push(BreakdownRow {
                key: primary,
                total: 0,
                cells: Vec::new(),
            });
            rows.len() - 1
        });

        let row = &mut rows[idx];
        row.total += 1;
        match row.cells.iter_mut().find(|c| c.key == secondary) {
            Some(cell) => cell.count += 1,
            None => row.cells.push(BreakdownCell {
                key: secondary,
                count: 1,
            }),
        }
    }

    BreakdownTable { rows }
}

/// Students by program, then year level.
pub fn student_population(students: &[Student]) -> BreakdownTable {
    aggregate(
        students,
        |s| s.program.as_deref(),
        |s| s.year_level.as_deref(),
        PROGRAM_NOT_SPECIFIED,
        YEAR_NOT_SPECIFIED,
    )
}

/// Faculty by department, then employment type.
pub fn faculty_population(faculty: &[Faculty]) -> BreakdownTable {
    aggregate(
        faculty,
        |f| f.department.as_deref(),
        |f| f.employment_type.as_deref(),
        UNSPECIFIED_DEPARTMENT,
        UNSPECIFIED_TYPE,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    struct Person {
        primary: Option<String>,
        secondary: Option<String>,
    }

    fn person(primary: Option<&str>, secondary: Option<&str>) -> Person {
        Person {
            primary: primary.map(str::to_string),
            secondary: secondary.map(str::to_string),
        }
    }

    fn table_of(people: &[Person]) -> BreakdownTable {
        aggregate(
            people,
            |p| p.primary.as_deref(),
            |p| p.secondary.as_deref(),
            "Primary Missing",
            "Secondary Missing",
        )
    }

    fn arb_key() -> impl Strategy<Value = Option<&'static str>> {
        prop::option::of(prop::sample::select(vec!["A", "B", "C", "", "  "]))
    }

    fn arb_person() -> impl Strategy<Value = Person> {
        (arb_key(), arb_key()).prop_map(|(p, s)| person(p, s))
    }

    #[test]
    fn empty_input_gives_empty_table() {
        let table = table_of(&[]);
        assert!(table.is_empty());
        assert_eq!(table.grand_total(), 0);
    }

    #[test]
    fn counts_cells_and_totals() {
        let people = vec![
            person(Some("BSIT"), Some("1st Year")),
            person(Some("BSIT"), Some("2nd Year")),
            person(Some("BSIT"), Some("1st Year")),
            person(Some("BSCS"), Some("1st Year")),
        ];
        let table = table_of(&people);

        let bsit = table.row("BSIT").unwrap();
        assert_eq!(bsit.total, 3);
        assert_eq!(bsit.count("1st Year"), 2);
        assert_eq!(bsit.count("2nd Year"), 1);
        assert_eq!(bsit.count("3rd Year"), 0);
        assert_eq!(table.row("BSCS").unwrap().total, 1);
        assert_eq!(table.grand_total(), 4);
    }

    #[test]
    fn absent_and_blank_keys_use_defaults() {
        let people = vec![person(None, Some("1st Year")), person(Some("   "), None)];
        let table = table_of(&people);

        assert_eq!(table.rows.len(), 1);
        let row = table.row("Primary Missing").unwrap();
        assert_eq!(row.total, 2);
        assert_eq!(row.count("1st Year"), 1);
        assert_eq!(row.count("Secondary Missing"), 1);
    }

    #[test]
    fn padded_keys_share_a_row_with_clean_keys() {
        let people = vec![
            person(Some(" BSIT"), Some("1st Year ")),
            person(Some("BSIT"), Some("1st Year")),
        ];
        let table = table_of(&people);

        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].key, "BSIT");
        assert_eq!(table.rows[0].cells.len(), 1);
        assert_eq!(table.rows[0].count("1st Year"), 2);
    }

    #[test]
    fn student_population_uses_program_sentinels() {
        let students = vec![Student {
            id: 1,
            first_name: "Lia".to_string(),
            last_name: "Santos".to_string(),
            email: "lia@campus.edu".to_string(),
            program: None,
            year_level: None,
            section: None,
        }];
        let table = student_population(&students);
        let row = table.row(PROGRAM_NOT_SPECIFIED).unwrap();
        assert_eq!(row.count(YEAR_NOT_SPECIFIED), 1);
    }

    proptest! {
        #[test]
        fn conserves_every_entity(people in prop::collection::vec(arb_person(), 0..60)) {
            let table = table_of(&people);
            let cell_sum: usize = table
                .rows
                .iter()
                .flat_map(|r| r.cells.iter())
                .map(|c| c.count)
                .sum();
            prop_assert_eq!(table.grand_total(), people.len());
            prop_assert_eq!(cell_sum, people.len());
        }

        #[test]
        fn row_totals_match_cells(people in prop::collection::vec(arb_person(), 0..60)) {
            let table = table_of(&people);
            for row in &table.rows {
                let sum: usize = row.cells.iter().map(|c| c.count).sum();
                prop_assert_eq!(row.total, sum);
            }
        }

        #[test]
        fn aggregation_is_idempotent(people in prop::collection::vec(arb_person(), 0..60)) {
            prop_assert_eq!(table_of(&people), table_of(&people));
        }
    }
}
