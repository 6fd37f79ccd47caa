#[derive(thiserror::Error, Debug)]
pub enum FieldError {
    /// Error reading a field table file.
    #[error("table read error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from [`splines`].
    #[error("spline error: {0}")]
    Spline(#[from] splines::SplineError),

    /// The table header names a column the format does not know.
    #[error("unrecognized column '{0}' in table header")]
    UnknownColumn(String),

    /// A coordinate column the table kind requires is missing.
    #[error("missing coordinate column '{0}'")]
    MissingColumn(&'static str),

    /// The table holds no field columns at all.
    #[error("table contains no field columns")]
    NoFieldColumns,

    /// A data line could not be parsed.
    #[error("bad value '{value}' on table line {line}")]
    BadNumber { line: usize, value: String },

    /// A data line has a different number of entries than the header.
    #[error("table line {line} has {got} entries, header names {expected}")]
    RaggedRow {
        line: usize,
        got: usize,
        expected: usize,
    },

    /// The coordinate columns do not span a full rectangular grid.
    #[error("coordinate columns do not form a rectangular grid ({0})")]
    NonRectangular(String),
}
