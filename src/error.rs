/// Reason a CSV row was left out of the parsed series.
///
/// Rows are indexed from 0 counting only non-blank lines after the header.
/// `file` names the file the text was loaded from.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowIssue {
    #[error("Row {index} in {file} is malformed: {row}")]
    MalformedRow {
        index: usize,
        file: String,
        row: String,
    },

    #[error("Invalid date format in row {index} of {file}: {raw}")]
    InvalidDatetime {
        index: usize,
        file: String,
        raw: String,
    },
}
