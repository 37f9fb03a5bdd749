use thiserror::Error;

/// Errors returned by text line validation.
///
/// # Examples
/// ```
/// use dmxbridge_core::LineRejection;
///
/// let err = LineRejection::OutOfRange { index: 1, value: 999 };
/// assert!(err.to_string().contains("out of range"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineRejection {
    #[error("blank line")]
    Blank,
    #[error("missing field terminator '{terminator}'")]
    MissingTerminator { terminator: char },
    #[error("no fields before terminator")]
    EmptyPayload,
    #[error("invalid field count: {count} (expected 1..=512)")]
    FieldCount { count: usize },
    #[error("field {index} is empty")]
    EmptyField { index: usize },
    #[error("field {index} too wide: {width} characters")]
    FieldTooWide { index: usize, width: usize },
    #[error("field {index} not numeric: {token:?}")]
    NotNumeric { index: usize, token: String },
    #[error("field {index} out of range: {value}")]
    OutOfRange { index: usize, value: u32 },
}
