//! Statistical conditions derived from factor value columns.

use log::info;

use super::{ConvertError, Diagnostics};
use crate::sdrf::{SdrfRow, SdrfTable};

/// Joins the values of the columns making up a condition
pub const CONDITION_DELIMITER: &str = "|";

const CHARACTERISTICS_AS_FACTORS: &str =
    "No factors specified. Adding non-redundant characteristics as factor. Will be used as condition. ";
const DUMMY_FACTOR: &str = "No factors specified. Adding dummy factor used as condition.";

#[derive(Debug, Clone)]
enum Source {
    /// Columns chosen by the user; also used to split the outputs
    Selected(Vec<usize>),
    /// Factor columns, falling back to non-redundant characteristics
    Factors {
        factors: Vec<usize>,
        characteristics: Vec<usize>,
    },
}

/// Builds the condition string of each row
#[derive(Debug, Clone)]
pub struct ConditionBuilder {
    source: Source,
    diagnostics: Diagnostics,
}

impl ConditionBuilder {
    /// Conditions from the table's factor value columns
    pub fn from_factors(table: &SdrfTable) -> Self {
        let factors = table.factor_columns();
        let characteristics =
            remove_redundant_characteristics(table, &table.characteristics_columns(), &factors);

        info!("Factor columns: {:?}", column_names(table, &factors));
        info!(
            "Characteristics columns (those covered by factor columns removed): {:?}",
            column_names(table, &characteristics)
        );

        Self {
            source: Source::Factors {
                factors,
                characteristics,
            },
            diagnostics: Diagnostics::new(),
        }
    }

    /// Conditions from user-selected columns
    pub fn from_columns<S: AsRef<str>>(table: &SdrfTable, columns: &[S]) -> Result<Self, ConvertError> {
        let selected = columns
            .iter()
            .map(|name| {
                let name = name.as_ref();
                table
                    .find_column(name)
                    .ok_or_else(|| ConvertError::UnknownColumn(name.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!("User selected factor columns: {:?}", column_names(table, &selected));

        Ok(Self {
            source: Source::Selected(selected),
            diagnostics: Diagnostics::new(),
        })
    }

    /// Whether outputs are split per condition
    pub fn is_selected(&self) -> bool {
        matches!(self.source, Source::Selected(_))
    }

    /// Condition of `row`; `None` when the table declares nothing to use, in
    /// which case the source name stands in.
    pub fn combine(&mut self, row: SdrfRow<'_>) -> Option<String> {
        match &self.source {
            Source::Selected(columns) => Some(join(row, columns)),
            Source::Factors {
                factors,
                characteristics,
            } => {
                if !factors.is_empty() {
                    Some(join(row, factors))
                } else if !characteristics.is_empty() {
                    self.diagnostics.record(CHARACTERISTICS_AS_FACTORS);
                    Some(join(row, characteristics))
                } else {
                    self.diagnostics.record(DUMMY_FACTOR);
                    None
                }
            }
        }
    }

    /// Messages recorded while choosing condition columns
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }
}

/// Drop characteristics columns whose values equal some factor column
pub fn remove_redundant_characteristics(
    table: &SdrfTable,
    characteristics: &[usize],
    factors: &[usize],
) -> Vec<usize> {
    characteristics
        .iter()
        .copied()
        .filter(|&c| {
            !factors
                .iter()
                .any(|&f| table.column_values(c).eq(table.column_values(f)))
        })
        .collect()
}

/// Column list as given on the command line: `[col1,col2]`
pub fn parse_column_list(text: &str) -> Vec<String> {
    let text = text.trim();
    let text = text.strip_prefix('[').unwrap_or(text);
    let text = text.strip_suffix(']').unwrap_or(text);
    text.split(',')
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty())
        .collect()
}

fn join(row: SdrfRow<'_>, columns: &[usize]) -> String {
    columns
        .iter()
        .map(|&c| row.value(c))
        .collect::<Vec<_>>()
        .join(CONDITION_DELIMITER)
}

fn column_names<'a>(table: &'a SdrfTable, columns: &[usize]) -> Vec<&'a str> {
    columns.iter().map(|&c| table.header(c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> SdrfTable {
        SdrfTable::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
        .unwrap()
    }

    const BASE: [&str; 4] = [
        "source name",
        "comment[data file]",
        "comment[label]",
        "comment[cleavage agent details]",
    ];

    fn with(extra: &[&'static str]) -> Vec<&'static str> {
        BASE.iter().chain(extra).copied().collect()
    }

    #[test]
    fn test_factor_values_joined() {
        let t = table(
            &with(&["factor value[disease]", "factor value[dose]"]),
            &[&["s1", "a.raw", "label free sample", "NT=Trypsin", "cancer", "10"]],
        );
        let mut builder = ConditionBuilder::from_factors(&t);
        let row = t.row(0).unwrap();
        assert_eq!(builder.combine(row).as_deref(), Some("cancer|10"));
        assert!(builder.diagnostics().is_empty());
    }

    #[test]
    fn test_redundant_characteristics_removed() {
        let t = table(
            &with(&["characteristics[disease]", "characteristics[sex]", "factor value[disease]"]),
            &[
                &["s1", "a.raw", "label free sample", "NT=Trypsin", "cancer", "male", "cancer"],
                &["s2", "b.raw", "label free sample", "NT=Trypsin", "normal", "female", "normal"],
            ],
        );
        let kept = remove_redundant_characteristics(&t, &t.characteristics_columns(), &t.factor_columns());
        assert_eq!(kept, vec![5]);
    }

    #[test]
    fn test_characteristics_fallback() {
        let t = table(
            &with(&["characteristics[organism]", "characteristics[sex]"]),
            &[&["s1", "a.raw", "label free sample", "NT=Trypsin", "human", "male"]],
        );
        let mut builder = ConditionBuilder::from_factors(&t);
        assert_eq!(builder.combine(t.row(0).unwrap()).as_deref(), Some("human|male"));
        assert_eq!(builder.diagnostics().count(CHARACTERISTICS_AS_FACTORS), 1);
    }

    #[test]
    fn test_no_factors_gives_none() {
        let t = table(&BASE, &[&["sample 1", "a.raw", "label free sample", "NT=Trypsin"]]);
        let mut builder = ConditionBuilder::from_factors(&t);
        assert_eq!(builder.combine(t.row(0).unwrap()), None);
        assert_eq!(builder.diagnostics().count(DUMMY_FACTOR), 1);
    }

    #[test]
    fn test_selected_columns() {
        let t = table(
            &with(&["characteristics[individual]", "factor value[disease]"]),
            &[&["s1", "a.raw", "label free sample", "NT=Trypsin", "p1", "cancer"]],
        );
        let columns = parse_column_list("[Characteristics[individual], factor value[disease]]");
        let mut builder = ConditionBuilder::from_columns(&t, &columns).unwrap();
        assert!(builder.is_selected());
        assert_eq!(builder.combine(t.row(0).unwrap()).as_deref(), Some("p1|cancer"));

        let err = ConditionBuilder::from_columns(&t, &["factor value[age]"]).unwrap_err();
        assert!(matches!(err, ConvertError::UnknownColumn(c) if c == "factor value[age]"));
    }

    #[test]
    fn test_parse_column_list() {
        assert_eq!(parse_column_list("[a, B ]"), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(parse_column_list("c"), vec!["c".to_string()]);
    }
}
