use thiserror::Error;

#[derive(Error, Debug)]
/// Record mapping error
pub enum RecordError {
    /// The underlying CSV source has no further records.
    #[error("End of data")]
    EndOfData,

    /// Tokenizer level failure (malformed record, I/O while reading).
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Expected {expected} fields per record but found {found} (line {line})")]
    FieldCount {
        expected: usize,
        found: usize,
        line: u64,
    },

    #[error("No column is mapped for field {field}")]
    MissingColumn { field: String },

    #[error("Column {position} of field {field} is out of range ({len} columns read)")]
    ColumnOutOfRange {
        field: String,
        position: usize,
        len: usize,
    },

    #[error("Cannot set field {field} from {value:?}: {reason}")]
    Coercion {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Cannot render field {field}: {reason}")]
    Render { field: String, reason: String },

    #[error("Unsupported field kind for {field}")]
    UnsupportedKind { field: String },
}

impl RecordError {
    /// Returns `true` when the error only signals that the source is exhausted.
    pub fn is_end_of_data(&self) -> bool {
        matches!(self, RecordError::EndOfData)
    }

    pub(crate) fn from_value(field: &str, value: &str, error: ValueError) -> Self {
        match error {
            ValueError::Invalid(reason) => RecordError::Coercion {
                field: field.to_string(),
                value: value.to_string(),
                reason,
            },
            ValueError::Unsupported => RecordError::UnsupportedKind {
                field: field.to_string(),
            },
        }
    }

    pub(crate) fn from_render(field: &str, error: ValueError) -> Self {
        match error {
            ValueError::Invalid(reason) => RecordError::Render {
                field: field.to_string(),
                reason,
            },
            ValueError::Unsupported => RecordError::UnsupportedKind {
                field: field.to_string(),
            },
        }
    }
}

/// Failure of a single value conversion, before it is tied to a field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    #[error("{0}")]
    Invalid(String),

    #[error("unsupported kind")]
    Unsupported,
}

impl ValueError {
    pub fn invalid(reason: impl ToString) -> Self {
        ValueError::Invalid(reason.to_string())
    }
}
