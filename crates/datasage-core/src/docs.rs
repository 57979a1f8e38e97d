//! Templated table and column documentation

use crate::types::SampleRow;

/// Example values shown in a column description
pub const MAX_COLUMN_EXAMPLES: usize = 3;

/// Descriptive text for a table from its column names.
/// Sample rows are accepted as context; the template does not use them.
pub fn describe_table(table: &str, columns: &[String], _sample_rows: &[SampleRow]) -> String {
    format!(
        "The **{table}** table stores information about {subject}. \
         It contains columns: {columns}. \
         Use this table to analyze trends and relationships.",
        table = table,
        subject = table.to_lowercase(),
        columns = columns.join(", ")
    )
}

/// Descriptive text for one column, quoting at most three sample values
pub fn describe_column(
    _table: &str,
    column: &str,
    data_type: &str,
    sample_values: &[String],
) -> String {
    let base = format!("This column stores {} data of type {}.", column, data_type);
    if sample_values.is_empty() {
        return format!("{} No example values are available.", base);
    }

    let examples: Vec<&str> = sample_values
        .iter()
        .take(MAX_COLUMN_EXAMPLES)
        .map(String::as_str)
        .collect();
    format!("{} Example values include: {}.", base, examples.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_table() {
        let doc = describe_table(
            "Employees",
            &["id".to_string(), "name".to_string()],
            &[],
        );
        assert_eq!(
            doc,
            "The **Employees** table stores information about employees. \
             It contains columns: id, name. \
             Use this table to analyze trends and relationships."
        );
    }

    #[test]
    fn test_describe_column_caps_examples() {
        let samples: Vec<String> = ["a", "b", "c", "d", "e"].iter().map(|s| s.to_string()).collect();
        let doc = describe_column("customers", "first_name", "VARCHAR", &samples);

        assert_eq!(
            doc,
            "This column stores first_name data of type VARCHAR. Example values include: a, b, c."
        );
        assert!(!doc.contains(", d"));
    }

    #[test]
    fn test_describe_column_few_examples() {
        let doc = describe_column("t", "c", "INTEGER", &["1".to_string()]);
        assert!(doc.ends_with("Example values include: 1."));
    }

    #[test]
    fn test_describe_column_without_examples() {
        let doc = describe_column("t", "c", "DATE", &[]);
        assert_eq!(
            doc,
            "This column stores c data of type DATE. No example values are available."
        );
    }
}
