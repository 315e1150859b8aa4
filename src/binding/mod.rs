//! Column binding registry
//!
//! Maps selected output columns to optional caller buffers and converts
//! matched row values into them.
//!
//! # Conversion rules
//!
//! - Text truncates to the display size and never exceeds buffer capacity
//! - Integer narrowing fails with `ConversionOverflow`, never wraps
//! - NULL writes an empty value with length zero

mod binding;
mod convert;

pub use binding::{BindTarget, ColumnBinding, LengthSlot, OutputBuffer};
pub use convert::{convert, parse_bool, truncate_utf8, Converted, OutputType, OutputValue};
