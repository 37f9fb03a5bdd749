use crate::frame::CHANNELS;

pub const DEFAULT_FIELD_TERMINATOR: char = ';';
pub const DEFAULT_FIELD_SEPARATOR: char = ',';
pub const DEFAULT_LINE_TERMINATOR: u8 = b'\n';

pub const MIN_FIELDS: usize = 1;
pub const MAX_FIELDS: usize = CHANNELS;
/// Widest decimal byte ("255").
pub const MAX_FIELD_WIDTH: usize = 3;
