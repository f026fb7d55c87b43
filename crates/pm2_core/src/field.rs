use std::fmt;

use serde::{Deserialize, Serialize};

use crate::buffer::SaveBuffer;
use crate::core_api::{CoreError, CoreErrorCode};
use crate::registry::StatId;

/// Fixed-point fields store two implied decimal places.
const FLOAT_SCALE: f64 = 100.0;

/// Decoded shape of one stat field, with its valid domain for writes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    Int { min: i64, max: i64 },
    Float { min: f64, max: f64 },
    Text,
}

/// Static metadata for one stat: where it lives in the save image and how
/// its bytes decode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDefinition {
    pub stat: StatId,
    pub name: &'static str,
    pub offset: usize,
    pub width: usize,
    pub kind: FieldKind,
}

/// A decoded stat value, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl StatValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
        }
    }
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v:.2}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

/// Typed view over one stat field, bound to the buffer it decodes from.
///
/// Accessors cache nothing: every `get` re-reads the buffer, so a live
/// accessor always reflects the current image, including writes made
/// through other accessors or directly through [`SaveBuffer::write_at`].
#[derive(Debug)]
pub enum FieldAccessor<'a> {
    Int(IntField<'a>),
    Float(FloatField<'a>),
    Text(TextField<'a>),
}

impl<'a> FieldAccessor<'a> {
    pub(crate) fn bind(def: &'static FieldDefinition, buffer: &'a mut SaveBuffer) -> Self {
        match def.kind {
            FieldKind::Int { min, max } => Self::Int(IntField {
                def,
                min,
                max,
                buffer,
            }),
            FieldKind::Float { min, max } => Self::Float(FloatField {
                def,
                min,
                max,
                buffer,
            }),
            FieldKind::Text => Self::Text(TextField { def, buffer }),
        }
    }

    pub fn definition(&self) -> &'static FieldDefinition {
        match self {
            Self::Int(field) => field.def,
            Self::Float(field) => field.def,
            Self::Text(field) => field.def,
        }
    }

    /// Kind-erased read.
    pub fn value(&self) -> Result<StatValue, CoreError> {
        match self {
            Self::Int(field) => field.get().map(StatValue::Int),
            Self::Float(field) => field.get().map(StatValue::Float),
            Self::Text(field) => field.get().map(StatValue::Text),
        }
    }

    /// Kind-erased write; the value must match the field's kind.
    pub fn set_value(&mut self, value: &StatValue) -> Result<(), CoreError> {
        let def = self.definition();
        match (&mut *self, value) {
            (Self::Int(field), StatValue::Int(v)) => field.set(*v),
            (Self::Float(field), StatValue::Float(v)) => field.set(*v),
            (Self::Text(field), StatValue::Text(v)) => field.set(v),
            _ => Err(CoreError::new(
                CoreErrorCode::UnsupportedOperation,
                format!(
                    "{} does not accept {} values",
                    def.name,
                    value.kind_name()
                ),
            )),
        }
    }
}

/// Little-endian unsigned integer field with an inclusive valid range.
#[derive(Debug)]
pub struct IntField<'a> {
    def: &'static FieldDefinition,
    min: i64,
    max: i64,
    buffer: &'a mut SaveBuffer,
}

impl IntField<'_> {
    pub fn definition(&self) -> &'static FieldDefinition {
        self.def
    }

    pub fn range(&self) -> (i64, i64) {
        (self.min, self.max)
    }

    pub fn get(&self) -> Result<i64, CoreError> {
        decode_int(self.def, self.buffer)
    }

    /// Encode `value` back at the field's native width. Values outside
    /// the declared range are rejected and the buffer is left unchanged.
    pub fn set(&mut self, value: i64) -> Result<(), CoreError> {
        if value < self.min || value > self.max {
            return Err(CoreError::new(
                CoreErrorCode::RangeViolation,
                format!(
                    "{} must be between {} and {}, got {value}",
                    self.def.name, self.min, self.max
                ),
            ));
        }
        let encoded = (value as u64).to_le_bytes();
        self.buffer.write_at(self.def.offset, self.def.width, &encoded)
    }
}

/// Packed fixed-point field (the format's "GNX float"): a little-endian
/// integer carrying two implied decimal places.
#[derive(Debug)]
pub struct FloatField<'a> {
    def: &'static FieldDefinition,
    min: f64,
    max: f64,
    buffer: &'a mut SaveBuffer,
}

impl FloatField<'_> {
    pub fn definition(&self) -> &'static FieldDefinition {
        self.def
    }

    pub fn range(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    pub fn get(&self) -> Result<f64, CoreError> {
        decode_float(self.def, self.buffer)
    }

    pub fn set(&mut self, value: f64) -> Result<(), CoreError> {
        if !value.is_finite() || value < self.min || value > self.max {
            return Err(CoreError::new(
                CoreErrorCode::RangeViolation,
                format!(
                    "{} must be between {} and {}, got {value}",
                    self.def.name, self.min, self.max
                ),
            ));
        }
        let raw = (value * FLOAT_SCALE).round() as u64;
        self.buffer
            .write_at(self.def.offset, self.def.width, &raw.to_le_bytes())
    }
}

/// Fixed-width NUL-terminated text field.
#[derive(Debug)]
pub struct TextField<'a> {
    def: &'static FieldDefinition,
    buffer: &'a mut SaveBuffer,
}

impl TextField<'_> {
    pub fn definition(&self) -> &'static FieldDefinition {
        self.def
    }

    /// Longest encodable text, leaving room for the NUL terminator.
    pub fn max_len(&self) -> usize {
        self.def.width - 1
    }

    pub fn get(&self) -> Result<String, CoreError> {
        decode_text(self.def, self.buffer)
    }

    /// Encode `value` with a terminator and NUL-pad the remainder of the
    /// field. Text that does not fit is rejected with the buffer left
    /// unchanged.
    pub fn set(&mut self, value: &str) -> Result<(), CoreError> {
        let encoded = value.as_bytes();
        if encoded.len() > self.max_len() {
            return Err(CoreError::new(
                CoreErrorCode::TooLong,
                format!(
                    "{} holds at most {} bytes, got {}",
                    self.def.name,
                    self.max_len(),
                    encoded.len()
                ),
            ));
        }
        let mut padded = vec![0u8; self.def.width];
        padded[..encoded.len()].copy_from_slice(encoded);
        self.buffer.write_at(self.def.offset, self.def.width, &padded)
    }
}

pub(crate) fn read_value(
    def: &'static FieldDefinition,
    buffer: &SaveBuffer,
) -> Result<StatValue, CoreError> {
    match def.kind {
        FieldKind::Int { .. } => decode_int(def, buffer).map(StatValue::Int),
        FieldKind::Float { .. } => decode_float(def, buffer).map(StatValue::Float),
        FieldKind::Text => decode_text(def, buffer).map(StatValue::Text),
    }
}

fn decode_int(def: &FieldDefinition, buffer: &SaveBuffer) -> Result<i64, CoreError> {
    let bytes = buffer.read_at(def.offset, def.width)?;
    let mut raw: u64 = 0;
    for (index, &byte) in bytes.iter().enumerate() {
        raw |= u64::from(byte) << (8 * index);
    }
    Ok(raw as i64)
}

fn decode_float(def: &FieldDefinition, buffer: &SaveBuffer) -> Result<f64, CoreError> {
    let raw = decode_int(def, buffer)?;
    Ok(raw as f64 / FLOAT_SCALE)
}

fn decode_text(def: &FieldDefinition, buffer: &SaveBuffer) -> Result<String, CoreError> {
    let bytes = buffer.read_at(def.offset, def.width)?;
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
}
