//! Column bindings and caller-owned output buffers
//!
//! A binding ties a selected column to an optional output target. Buffers
//! and length slots are shared handles: the caller keeps one clone, the
//! session writes through the other on every matched row.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::errors::SqlResult;
use crate::source::{ColumnDef, Value};

use super::convert::{convert, Converted, OutputType, OutputValue};

/// Shared output buffer receiving converted values
#[derive(Debug, Clone, Default)]
pub struct OutputBuffer(Rc<RefCell<OutputValue>>);

impl OutputBuffer {
    /// Creates an empty (NULL) buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the current contents
    pub fn get(&self) -> OutputValue {
        self.0.borrow().clone()
    }

    fn set(&self, value: OutputValue) {
        *self.0.borrow_mut() = value;
    }
}

/// Shared slot receiving the converted length of each value
#[derive(Debug, Clone, Default)]
pub struct LengthSlot(Rc<Cell<usize>>);

impl LengthSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> usize {
        self.0.get()
    }

    fn set(&self, len: usize) {
        self.0.set(len);
    }
}

/// Where a bound column's values are copied
#[derive(Debug, Clone)]
pub struct BindTarget {
    buffer: OutputBuffer,
    capacity: usize,
    length: Option<LengthSlot>,
}

impl BindTarget {
    /// Creates a target without a length slot
    pub fn new(buffer: OutputBuffer, capacity: usize) -> Self {
        Self {
            buffer,
            capacity,
            length: None,
        }
    }

    /// Attaches a slot receiving the converted length
    pub fn with_length(mut self, length: LengthSlot) -> Self {
        self.length = Some(length);
        self
    }

    /// Copies a converted value into the buffer and length slot.
    pub fn write(&self, converted: Converted) {
        if let Some(slot) = &self.length {
            slot.set(converted.len);
        }
        self.buffer.set(converted.value);
    }
}

/// A selected output column
#[derive(Debug, Clone)]
pub struct ColumnBinding {
    name: String,
    output_type: OutputType,
    /// Filled from the physical column once the table is resolved
    display_size: Option<usize>,
    target: Option<BindTarget>,
}

impl ColumnBinding {
    /// Creates an unbound text binding
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            output_type: OutputType::Text,
            display_size: None,
            target: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn output_type(&self) -> OutputType {
        self.output_type
    }

    pub fn display_size(&self) -> Option<usize> {
        self.display_size
    }

    pub fn target(&self) -> Option<&BindTarget> {
        self.target.as_ref()
    }

    /// Returns true if values are copied out for this column
    pub fn is_bound(&self) -> bool {
        self.target.is_some()
    }

    /// Returns the last value written to the bound buffer
    pub fn value(&self) -> Option<OutputValue> {
        self.target.as_ref().map(|t| t.buffer.get())
    }

    /// Attaches an output target and conversion type
    pub fn attach(&mut self, target: BindTarget, output_type: OutputType) {
        self.target = Some(target);
        self.output_type = output_type;
    }

    pub fn set_display_size(&mut self, size: usize) {
        self.display_size = Some(size);
    }

    /// Converts a row value for this binding without writing it.
    ///
    /// Returns `None` for unbound columns.
    pub fn prepare(&self, column: &ColumnDef, value: &Value) -> SqlResult<Option<Converted>> {
        let target = match &self.target {
            Some(t) => t,
            None => return Ok(None),
        };
        let display_size = self.display_size.unwrap_or_else(|| column.display_size());
        convert(
            value,
            &self.name,
            self.output_type,
            display_size,
            target.capacity,
        )
        .map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ColumnType;

    #[test]
    fn test_unbound_binding_prepares_nothing() {
        let binding = ColumnBinding::new("name");
        let col = ColumnDef::new("name", ColumnType::Text);
        assert!(!binding.is_bound());
        assert_eq!(
            binding.prepare(&col, &Value::Text("x".into())).unwrap(),
            None
        );
    }

    #[test]
    fn test_write_through_shared_handles() {
        let buffer = OutputBuffer::new();
        let length = LengthSlot::new();
        let mut binding = ColumnBinding::new("name");
        binding.set_display_size(3);
        binding.attach(
            BindTarget::new(buffer.clone(), 64).with_length(length.clone()),
            OutputType::Text,
        );

        let col = ColumnDef::with_size("name", ColumnType::Text, 50);
        let converted = binding
            .prepare(&col, &Value::Text("hello".into()))
            .unwrap()
            .unwrap();
        binding.target().unwrap().write(converted);

        assert_eq!(buffer.get(), OutputValue::Text("hel".into()));
        assert_eq!(length.get(), 3);
        assert_eq!(binding.value(), Some(OutputValue::Text("hel".into())));
    }

    #[test]
    fn test_display_size_falls_back_to_column() {
        let buffer = OutputBuffer::new();
        let mut binding = ColumnBinding::new("code");
        binding.attach(BindTarget::new(buffer.clone(), 64), OutputType::Text);

        let col = ColumnDef::with_size("code", ColumnType::Text, 2);
        let converted = binding
            .prepare(&col, &Value::Text("abcdef".into()))
            .unwrap()
            .unwrap();
        assert_eq!(converted.value, OutputValue::Text("ab".into()));
    }
}
