//! Native-compatible staging buffers for one direction of a flat-buffer engine call.
//!
//! An [`InteropBuffer`] owns contiguous C-layout storage for a `starts` offset array, a
//! `keys` string array and one scalar `values` array. It is created right before a call,
//! either empty (the engine populates it through the mutable views) or copied from host
//! [`AttributeBuckets`], and released when it goes out of scope. [`InteropBuffer::dispose`]
//! releases it explicitly; because it consumes the buffer, a second release cannot compile.
//!
//! Raw pointers are handed out for callers that cross a real FFI boundary; they stay valid
//! only while the buffer is alive and unmodified.
use std::ffi::{c_char, c_double, c_int, CString};

use tracing::{debug, trace};

use crate::buckets::{AttributeBuckets, AttributeBuffers};
use crate::error::{Error, Result};

/// Host scalar with a native buffer representation.
pub trait NativeValue: Sized {
    type Native;

    fn to_native(&self) -> Result<Self::Native>;

    fn from_native(native: &Self::Native) -> Result<Self>;
}

impl NativeValue for bool {
    type Native = c_int;

    fn to_native(&self) -> Result<c_int> {
        Ok(c_int::from(*self))
    }

    fn from_native(native: &c_int) -> Result<Self> {
        Ok(*native != 0)
    }
}

impl NativeValue for i32 {
    type Native = c_int;

    fn to_native(&self) -> Result<c_int> {
        Ok(*self)
    }

    fn from_native(native: &c_int) -> Result<Self> {
        Ok(*native)
    }
}

impl NativeValue for f64 {
    type Native = c_double;

    fn to_native(&self) -> Result<c_double> {
        Ok(*self)
    }

    fn from_native(native: &c_double) -> Result<Self> {
        Ok(*native)
    }
}

impl NativeValue for String {
    type Native = CString;

    fn to_native(&self) -> Result<CString> {
        to_c_string(self)
    }

    fn from_native(native: &CString) -> Result<Self> {
        from_c_string(native)
    }
}

fn to_c_string(text: &str) -> Result<CString> {
    CString::new(text)
        .map_err(|_| Error::InvalidBuffer(format!("interior NUL in '{}'", text.escape_debug())))
}

fn from_c_string(native: &CString) -> Result<String> {
    native
        .to_str()
        .map(str::to_owned)
        .map_err(|_| Error::InvalidBuffer("string is not valid UTF-8".into()))
}

/// Owned native `(starts, keys, values)` buffers for one value category.
pub struct InteropBuffer<T: NativeValue> {
    starts: Vec<c_int>,
    keys: Vec<CString>,
    values: Vec<T::Native>,
}

impl<T: NativeValue> InteropBuffer<T> {
    /// Zero-length buffers, used as an out-parameter destination.
    pub fn empty() -> Self {
        Self {
            starts: Vec::new(),
            keys: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Copies host buckets into native storage.
    pub fn from_buckets(buckets: &AttributeBuckets<T>) -> Result<Self> {
        let mut buffer = Self::empty();
        buffer.assign(buckets)?;
        Ok(buffer)
    }

    /// Replaces the contents with a copy of `buckets`.
    pub fn assign(&mut self, buckets: &AttributeBuckets<T>) -> Result<()> {
        let starts = buckets
            .starts()
            .iter()
            .map(|&s| {
                c_int::try_from(s)
                    .map_err(|_| Error::InvalidBuffer(format!("offset {s} exceeds c_int")))
            })
            .collect::<Result<Vec<_>>>()?;
        let keys = buckets
            .keys()
            .iter()
            .map(|k| to_c_string(k))
            .collect::<Result<Vec<_>>>()?;
        let values = buckets
            .values()
            .iter()
            .map(T::to_native)
            .collect::<Result<Vec<_>>>()?;

        self.starts = starts;
        self.keys = keys;
        self.values = values;
        Ok(())
    }

    /// Converts back into host buckets, validating the layout written by the engine.
    pub fn to_buckets(&self) -> Result<AttributeBuckets<T>> {
        let starts = self
            .starts
            .iter()
            .map(|&s| {
                usize::try_from(s).map_err(|_| Error::InvalidBuffer(format!("negative start {s}")))
            })
            .collect::<Result<Vec<_>>>()?;
        let keys = self
            .keys
            .iter()
            .map(from_c_string)
            .collect::<Result<Vec<_>>>()?;
        let values = self
            .values
            .iter()
            .map(T::from_native)
            .collect::<Result<Vec<_>>>()?;
        AttributeBuckets::from_parts(starts, keys, values)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn shape_count(&self) -> usize {
        self.starts.len()
    }

    pub fn starts(&self) -> &[c_int] {
        &self.starts
    }

    pub fn keys(&self) -> &[CString] {
        &self.keys
    }

    pub fn values(&self) -> &[T::Native] {
        &self.values
    }

    pub fn starts_mut(&mut self) -> &mut Vec<c_int> {
        &mut self.starts
    }

    pub fn keys_mut(&mut self) -> &mut Vec<CString> {
        &mut self.keys
    }

    pub fn values_mut(&mut self) -> &mut Vec<T::Native> {
        &mut self.values
    }

    #[inline]
    pub fn starts_ptr(&self) -> *const c_int {
        self.starts.as_ptr()
    }

    #[inline]
    pub fn values_ptr(&self) -> *const T::Native {
        self.values.as_ptr()
    }

    /// Pointer table over the keys, valid while `self` is borrowed.
    pub fn key_ptrs(&self) -> Vec<*const c_char> {
        self.keys.iter().map(|k| k.as_ptr()).collect()
    }

    /// Releases the buffers.
    pub fn dispose(self) {
        drop(self);
    }
}

impl<T: NativeValue> Default for InteropBuffer<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: NativeValue> Drop for InteropBuffer<T> {
    fn drop(&mut self) {
        trace!(
            shapes = self.starts.len(),
            entries = self.keys.len(),
            "releasing interop buffer"
        );
    }
}

/// Interop buffers for all attribute value categories.
#[derive(Default)]
pub struct NativeAttributeBuffers {
    pub booleans: InteropBuffer<bool>,
    pub integers: InteropBuffer<i32>,
    pub doubles: InteropBuffer<f64>,
    pub strings: InteropBuffer<String>,
    pub bool_arrays: InteropBuffer<String>,
    pub integer_arrays: InteropBuffer<String>,
    pub double_arrays: InteropBuffer<String>,
    pub string_arrays: InteropBuffer<String>,
}

impl NativeAttributeBuffers {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Stages host buffers for an engine call.
    pub fn from_buffers(buffers: &AttributeBuffers) -> Result<Self> {
        let mut native = Self::empty();
        native.assign(buffers)?;
        debug!(
            shapes = buffers.shape_count(),
            entries = buffers.len(),
            "staged attribute buffers"
        );
        Ok(native)
    }

    /// Replaces every category with a copy of `buffers`.
    pub fn assign(&mut self, buffers: &AttributeBuffers) -> Result<()> {
        self.booleans.assign(&buffers.booleans)?;
        self.integers.assign(&buffers.integers)?;
        self.doubles.assign(&buffers.doubles)?;
        self.strings.assign(&buffers.strings)?;
        self.bool_arrays.assign(&buffers.bool_arrays)?;
        self.integer_arrays.assign(&buffers.integer_arrays)?;
        self.double_arrays.assign(&buffers.double_arrays)?;
        self.string_arrays.assign(&buffers.string_arrays)?;
        Ok(())
    }

    /// Typed extraction of every category.
    pub fn to_buffers(&self) -> Result<AttributeBuffers> {
        Ok(AttributeBuffers {
            booleans: self.booleans.to_buckets()?,
            integers: self.integers.to_buckets()?,
            doubles: self.doubles.to_buckets()?,
            strings: self.strings.to_buckets()?,
            bool_arrays: self.bool_arrays.to_buckets()?,
            integer_arrays: self.integer_arrays.to_buckets()?,
            double_arrays: self.double_arrays.to_buckets()?,
            string_arrays: self.string_arrays.to_buckets()?,
        })
    }

    /// Releases all category buffers.
    pub fn dispose(self) {
        drop(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doubles() -> AttributeBuckets<f64> {
        AttributeBuckets::from_parts(
            vec![0, 1],
            vec!["width".into(), "height".into()],
            vec![3.5, 7.0],
        )
        .unwrap()
    }

    #[test]
    fn staging_preserves_layout() {
        let buffer = InteropBuffer::from_buckets(&doubles()).unwrap();
        assert_eq!(buffer.starts(), &[0, 1]);
        assert_eq!(buffer.values(), &[3.5, 7.0]);
        assert_eq!(buffer.keys()[1].to_str().unwrap(), "height");
        assert_eq!(buffer.key_ptrs().len(), buffer.len());
        assert!(!buffer.values_ptr().is_null());
        assert_eq!(buffer.to_buckets().unwrap(), doubles());
        buffer.dispose();
    }

    #[test]
    fn booleans_travel_as_ints() {
        let mut b = AttributeBuckets::new();
        b.start_shape();
        b.push("visible", true);
        b.push("hidden", false);
        let buffer = InteropBuffer::from_buckets(&b).unwrap();
        assert_eq!(buffer.values(), &[1, 0]);
    }

    #[test]
    fn out_parameter_is_validated_on_extraction() {
        let mut out = InteropBuffer::<i32>::empty();
        assert_eq!(out.shape_count(), 0);

        out.starts_mut().extend([0, 2]);
        out.keys_mut().push(CString::new("floors").unwrap());
        out.values_mut().push(4);
        assert!(matches!(out.to_buckets(), Err(Error::InvalidBuffer(_))));

        out.starts_mut()[1] = -1;
        assert!(out.to_buckets().is_err());

        out.starts_mut()[1] = 1;
        let buckets = out.to_buckets().unwrap();
        assert_eq!(buckets.shape_range(1), Some(1..1));
    }

    #[test]
    fn interior_nul_is_rejected() {
        let mut b = AttributeBuckets::new();
        b.start_shape();
        b.push("name", "a\0b".to_string());
        assert!(matches!(
            InteropBuffer::from_buckets(&b),
            Err(Error::InvalidBuffer(_))
        ));
    }

    #[test]
    fn all_categories_round_trip() {
        let mut host = AttributeBuffers::new();
        host.start_shape();
        host.doubles.push("width", 3.5);
        host.strings.push("roof", "gable".to_string());
        host.start_shape();
        host.bool_arrays.push("windows", "true;false;".to_string());

        let native = NativeAttributeBuffers::from_buffers(&host).unwrap();
        assert_eq!(native.bool_arrays.starts(), &[0, 0]);
        assert_eq!(native.to_buffers().unwrap(), host);
        native.dispose();
    }
}
