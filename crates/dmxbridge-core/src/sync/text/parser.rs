use crate::frame::ChannelFrame;

use super::error::LineRejection;
use super::layout;

/// Field delimiters of the text encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineFormat {
    /// Ends the field list; anything after it is ignored.
    pub field_terminator: char,
    pub field_separator: char,
}

impl Default for LineFormat {
    fn default() -> Self {
        Self {
            field_terminator: layout::DEFAULT_FIELD_TERMINATOR,
            field_separator: layout::DEFAULT_FIELD_SEPARATOR,
        }
    }
}

/// A fully validated line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    /// Channels past `fields` are 0.
    pub frame: ChannelFrame,
    pub fields: usize,
}

/// Validate one line and build its frame.
///
/// # Examples
/// ```
/// use dmxbridge_core::{LineFormat, parse_line};
///
/// let parsed = parse_line("10,20,30;", &LineFormat::default())?;
/// assert_eq!(parsed.fields, 3);
/// assert_eq!(parsed.frame.get(2), Some(30));
/// assert_eq!(parsed.frame.get(3), Some(0));
/// # Ok::<(), dmxbridge_core::LineRejection>(())
/// ```
///
/// # Errors
/// Returns the first `LineRejection` found; no partial result is produced.
pub fn parse_line(line: &str, format: &LineFormat) -> Result<ParsedLine, LineRejection> {
    if line.trim().is_empty() {
        return Err(LineRejection::Blank);
    }
    let Some(end) = line.find(format.field_terminator) else {
        return Err(LineRejection::MissingTerminator {
            terminator: format.field_terminator,
        });
    };
    let payload = line[..end].trim();
    if payload.is_empty() {
        return Err(LineRejection::EmptyPayload);
    }

    let count = payload.split(format.field_separator).count();
    if !(layout::MIN_FIELDS..=layout::MAX_FIELDS).contains(&count) {
        return Err(LineRejection::FieldCount { count });
    }

    let mut frame = ChannelFrame::blackout();
    for (index, raw) in payload.split(format.field_separator).enumerate() {
        frame.set(index, parse_field(index, raw)?);
    }
    Ok(ParsedLine {
        frame,
        fields: count,
    })
}

fn parse_field(index: usize, raw: &str) -> Result<u8, LineRejection> {
    let token = raw.trim();
    if token.is_empty() {
        return Err(LineRejection::EmptyField { index });
    }
    let width = token.chars().count();
    if width > layout::MAX_FIELD_WIDTH {
        return Err(LineRejection::FieldTooWide { index, width });
    }
    let value: u32 = token.parse().map_err(|_| LineRejection::NotNumeric {
        index,
        token: token.to_string(),
    })?;
    u8::try_from(value).map_err(|_| LineRejection::OutOfRange { index, value })
}
