//! Outbound accumulation of user-supplied attribute values.
//!
//! A [`RuleAttributesMap`] is filled shape by shape: [`RuleAttributesMap::start_shape`] opens
//! the next initial shape, the `add_*` calls append to it. Array values are encoded with
//! [`crate::codec`] before they are stored. [`RuleAttributesMap::buffers`] exposes the
//! flattened result without consuming it.
use crate::attribute::RuleAttribute;
use crate::buckets::AttributeBuffers;
use crate::codec::encode_array;
use crate::error::Result;
use crate::input::{cast_values, HostValue};
use crate::values::DefaultValue;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RuleAttributesMap {
    buffers: AttributeBuffers,
}

impl RuleAttributesMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the next shape. Must precede every `add_*` call targeting that shape.
    pub fn start_shape(&mut self) {
        self.buffers.start_shape();
    }

    pub fn shape_count(&self) -> usize {
        self.buffers.shape_count()
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// Flattened per-category buffers. Can be called any number of times.
    pub fn buffers(&self) -> &AttributeBuffers {
        &self.buffers
    }

    pub fn into_buffers(self) -> AttributeBuffers {
        self.buffers
    }

    pub fn add_bool(&mut self, key: impl Into<String>, value: bool) {
        self.buffers.booleans.push(key, value);
    }

    pub fn add_integer(&mut self, key: impl Into<String>, value: i32) {
        self.buffers.integers.push(key, value);
    }

    pub fn add_double(&mut self, key: impl Into<String>, value: f64) {
        self.buffers.doubles.push(key, value);
    }

    pub fn add_string(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.buffers.strings.push(key, value.into());
    }

    pub fn add_bool_array(&mut self, key: impl Into<String>, values: &[bool]) {
        self.buffers.bool_arrays.push(key, encode_array(values));
    }

    pub fn add_integer_array(&mut self, key: impl Into<String>, values: &[i32]) {
        self.buffers.integer_arrays.push(key, encode_array(values));
    }

    pub fn add_double_array(&mut self, key: impl Into<String>, values: &[f64]) {
        self.buffers.double_arrays.push(key, encode_array(values));
    }

    pub fn add_string_array(&mut self, key: impl Into<String>, values: &[String]) {
        self.buffers.string_arrays.push(key, encode_array(values));
    }

    /// Casts `value` to the declared type of `attribute` and appends it.
    ///
    /// Color attributes take colors or hex text and are stored as `#RRGGBB`. Array
    /// attributes receive a one-element array. Nothing is appended when the cast fails.
    pub fn add_value(&mut self, attribute: &RuleAttribute, value: &HostValue) -> Result<()> {
        self.add_values(attribute, std::slice::from_ref(value))
    }

    /// Appends a whole array for an array attribute, skipping null values.
    ///
    /// Scalar attributes take the first non-null value and append nothing when there is none.
    pub fn add_values(&mut self, attribute: &RuleAttribute, values: &[HostValue]) -> Result<()> {
        self.assert_open();
        if let Some(value) = cast_values(attribute, values)? {
            self.add_cast(attribute.full_name.as_str(), value);
        }
        Ok(())
    }

    fn add_cast(&mut self, key: &str, value: DefaultValue) {
        match value {
            DefaultValue::Bool(v) => self.add_bool(key, v),
            DefaultValue::Integer(v) => self.add_integer(key, v),
            DefaultValue::Double(v) => self.add_double(key, v),
            DefaultValue::String(v) => self.add_string(key, v),
            DefaultValue::BoolArray(v) => self.add_bool_array(key, &v),
            DefaultValue::IntegerArray(v) => self.add_integer_array(key, &v),
            DefaultValue::DoubleArray(v) => self.add_double_array(key, &v),
            DefaultValue::StringArray(v) => self.add_string_array(key, &v),
        }
    }

    fn assert_open(&self) {
        assert!(
            self.shape_count() > 0,
            "start_shape must be called before adding attributes"
        );
    }
}
