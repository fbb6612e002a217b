//! Flattened per-shape key/value buffers.
//!
//! The engine boundary exchanges attributes as parallel `keys`/`values` sequences plus one
//! start offset per initial shape. [`AttributeBuckets`] owns one such triple on the host
//! side and slices it back into shape ranges; [`AttributeBuffers`] groups the triples of
//! all value categories.
use std::ops::Range;

use crate::error::{Error, Result};

/// One flattened `(starts, keys, values)` triple.
///
/// Shape `i` owns `keys[starts[i]..end]` where `end` is the next shape's start, or
/// `keys.len()` for the last shape. A shape may own nothing.
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeBuckets<T> {
    starts: Vec<usize>,
    keys: Vec<String>,
    values: Vec<T>,
}

impl<T> AttributeBuckets<T> {
    pub fn new() -> Self {
        Self {
            starts: Vec::new(),
            keys: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Builds buckets from raw parts, validating the layout.
    pub fn from_parts(starts: Vec<usize>, keys: Vec<String>, values: Vec<T>) -> Result<Self> {
        validate_layout(&starts, keys.len(), values.len())?;
        Ok(Self {
            starts,
            keys,
            values,
        })
    }

    /// Opens the next shape. Entries pushed afterwards belong to it.
    pub fn start_shape(&mut self) {
        self.starts.push(self.keys.len());
    }

    /// Appends an entry to the most recently opened shape.
    ///
    /// # Panics
    ///
    /// Panics if no shape has been opened yet.
    pub fn push(&mut self, key: impl Into<String>, value: T) {
        assert!(
            !self.starts.is_empty(),
            "start_shape must be called before adding attributes"
        );
        self.keys.push(key.into());
        self.values.push(value);
    }

    /// Number of shapes that have been opened.
    pub fn shape_count(&self) -> usize {
        self.starts.len()
    }

    /// Total number of entries over all shapes.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn starts(&self) -> &[usize] {
        &self.starts
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Index range of the entries owned by `shape`, or `None` if the shape does not exist.
    pub fn shape_range(&self, shape: usize) -> Option<Range<usize>> {
        interval(shape, &self.starts, self.keys.len())
    }

    /// Iterates `(key, value)` pairs of one shape in insertion order.
    pub fn shape_entries(&self, shape: usize) -> impl Iterator<Item = (&str, &T)> + '_ {
        let range = self.shape_range(shape).unwrap_or(0..0);
        self.keys[range.clone()]
            .iter()
            .map(String::as_str)
            .zip(&self.values[range])
    }

    /// Consumes the buckets, returning `(starts, keys, values)`.
    pub fn into_parts(self) -> (Vec<usize>, Vec<String>, Vec<T>) {
        (self.starts, self.keys, self.values)
    }
}

impl<T> Default for AttributeBuckets<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Range of shape `index` for the given starts; the last shape extends to `item_count`.
pub(crate) fn interval(index: usize, starts: &[usize], item_count: usize) -> Option<Range<usize>> {
    let start = *starts.get(index)?;
    let end = starts.get(index + 1).copied().unwrap_or(item_count);
    Some(start..end)
}

fn validate_layout(starts: &[usize], key_count: usize, value_count: usize) -> Result<()> {
    if key_count != value_count {
        return Err(Error::InvalidBuffer(format!(
            "{key_count} keys but {value_count} values"
        )));
    }
    if starts.is_empty() && key_count > 0 {
        return Err(Error::InvalidBuffer(format!(
            "{key_count} entries but no shapes"
        )));
    }
    if let Some(&first) = starts.first() {
        if first != 0 {
            return Err(Error::InvalidBuffer(format!(
                "first start must be 0, got {first}"
            )));
        }
    }
    if starts.windows(2).any(|w| w[0] > w[1]) {
        return Err(Error::InvalidBuffer("starts are not ascending".into()));
    }
    if let Some(&last) = starts.last() {
        if last > key_count {
            return Err(Error::InvalidBuffer(format!(
                "start {last} exceeds {key_count} entries"
            )));
        }
    }
    Ok(())
}

/// Flattened buffers for every attribute value category.
///
/// Array categories hold one encoded string per entry (see [`crate::codec`]).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttributeBuffers {
    pub booleans: AttributeBuckets<bool>,
    pub integers: AttributeBuckets<i32>,
    pub doubles: AttributeBuckets<f64>,
    pub strings: AttributeBuckets<String>,
    pub bool_arrays: AttributeBuckets<String>,
    pub integer_arrays: AttributeBuckets<String>,
    pub double_arrays: AttributeBuckets<String>,
    pub string_arrays: AttributeBuckets<String>,
}

impl AttributeBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the next shape in every category.
    pub fn start_shape(&mut self) {
        self.booleans.start_shape();
        self.integers.start_shape();
        self.doubles.start_shape();
        self.strings.start_shape();
        self.bool_arrays.start_shape();
        self.integer_arrays.start_shape();
        self.double_arrays.start_shape();
        self.string_arrays.start_shape();
    }

    /// Shape count, taken from the boolean category. Use [`AttributeBuffers::check_shape_count`]
    /// for buffers of foreign origin.
    pub fn shape_count(&self) -> usize {
        self.booleans.shape_count()
    }

    /// Total number of entries over all categories and shapes.
    pub fn len(&self) -> usize {
        self.booleans.len()
            + self.integers.len()
            + self.doubles.len()
            + self.strings.len()
            + self.bool_arrays.len()
            + self.integer_arrays.len()
            + self.double_arrays.len()
            + self.string_arrays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Verifies that every category carries exactly `shape_count` starts.
    pub fn check_shape_count(&self, shape_count: usize) -> Result<()> {
        let counts = [
            ("bool", self.booleans.shape_count()),
            ("integer", self.integers.shape_count()),
            ("double", self.doubles.shape_count()),
            ("string", self.strings.shape_count()),
            ("bool array", self.bool_arrays.shape_count()),
            ("integer array", self.integer_arrays.shape_count()),
            ("double array", self.double_arrays.shape_count()),
            ("string array", self.string_arrays.shape_count()),
        ];
        match counts.iter().find(|(_, n)| *n != shape_count) {
            Some((category, n)) => Err(Error::InvalidBuffer(format!(
                "{category} category has {n} starts for {shape_count} shapes"
            ))),
            None => Ok(()),
        }
    }
}
