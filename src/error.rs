/// Errors raised while parsing delimited site and evidence records.
///
/// Malformed input is never recovered from: the offending file and line are
/// reported and the stage stops.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("{file}:{line}: expected at least {expected} fields, found {found}")]
    MissingFields {
        file: String,
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("{file}:{line}: column {column} is not a valid {kind}: '{value}'")]
    InvalidField {
        file: String,
        line: usize,
        column: usize,
        kind: &'static str,
        value: String,
    },

    #[error("{file}:{line}: column {column} is not a cluster interval (start:end): '{value}'")]
    InvalidInterval {
        file: String,
        line: usize,
        column: usize,
        value: String,
    },
}
