//! Per-shape default attribute values.
//!
//! The engine reports authored defaults for all initial shapes at once, as flattened
//! [`AttributeBuffers`]. [`AttributesValuesMap::from_buffers`] slices them back into one
//! map per shape. Lookups return `None` for attributes without an authored default; the
//! projection helpers ([`default_doubles`] and friends) substitute the engine fallback in
//! that case and return one branch per shape.
use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::buckets::{AttributeBuckets, AttributeBuffers};
use crate::codec::decode_array;
use crate::color::Color;
use crate::error::{Error, Result};
use crate::rule_map::RuleAttributesMap;
use crate::tree::DataTree;

/// A single default value of any category.
#[derive(Clone, Debug, PartialEq)]
pub enum DefaultValue {
    Bool(bool),
    Integer(i32),
    Double(f64),
    String(String),
    BoolArray(Vec<bool>),
    IntegerArray(Vec<i32>),
    DoubleArray(Vec<f64>),
    StringArray(Vec<String>),
}

impl DefaultValue {
    /// Stringified form of a scalar value; `None` for arrays.
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            DefaultValue::Bool(v) => Some(v.to_string()),
            DefaultValue::Integer(v) => Some(v.to_string()),
            DefaultValue::Double(v) => Some(v.to_string()),
            DefaultValue::String(v) => Some(v.clone()),
            _ => None,
        }
    }
}

/// Default values of one initial shape. A key lives in at most one category.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttributesValuesMap {
    booleans: HashMap<String, bool>,
    integers: HashMap<String, i32>,
    doubles: HashMap<String, f64>,
    strings: HashMap<String, String>,
    bool_arrays: HashMap<String, Vec<bool>>,
    integer_arrays: HashMap<String, Vec<i32>>,
    double_arrays: HashMap<String, Vec<f64>>,
    string_arrays: HashMap<String, Vec<String>>,
}

impl AttributesValuesMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slices flattened buffers into one map per shape.
    ///
    /// Every category must carry exactly `shape_count` starts. Shapes owning no entries get
    /// empty maps. Array entries are decoded; a malformed one fails the whole call, as does
    /// a key that appears twice for the same shape.
    pub fn from_buffers(shape_count: usize, buffers: &AttributeBuffers) -> Result<Vec<Self>> {
        buffers.check_shape_count(shape_count)?;

        let mut maps = Vec::with_capacity(shape_count);
        for shape in 0..shape_count {
            let mut map = Self::new();
            let mut seen = HashSet::new();
            fill(&mut map.booleans, &mut seen, &buffers.booleans, shape, |v| Ok(*v))?;
            fill(&mut map.integers, &mut seen, &buffers.integers, shape, |v| Ok(*v))?;
            fill(&mut map.doubles, &mut seen, &buffers.doubles, shape, |v| Ok(*v))?;
            fill(&mut map.strings, &mut seen, &buffers.strings, shape, |v| Ok(v.clone()))?;
            fill(&mut map.bool_arrays, &mut seen, &buffers.bool_arrays, shape, |v| decode_array(v))?;
            fill(&mut map.integer_arrays, &mut seen, &buffers.integer_arrays, shape, |v| decode_array(v))?;
            fill(&mut map.double_arrays, &mut seen, &buffers.double_arrays, shape, |v| decode_array(v))?;
            fill(&mut map.string_arrays, &mut seen, &buffers.string_arrays, shape, |v| decode_array(v))?;
            maps.push(map);
        }

        debug!(
            shapes = shape_count,
            entries = buffers.len(),
            "built per-shape default values"
        );
        Ok(maps)
    }

    /// Stores `value` under `key`, removing the key from every other category.
    pub fn insert(&mut self, key: impl Into<String>, value: DefaultValue) {
        let key = key.into();
        self.remove(&key);
        match value {
            DefaultValue::Bool(v) => {
                self.booleans.insert(key, v);
            }
            DefaultValue::Integer(v) => {
                self.integers.insert(key, v);
            }
            DefaultValue::Double(v) => {
                self.doubles.insert(key, v);
            }
            DefaultValue::String(v) => {
                self.strings.insert(key, v);
            }
            DefaultValue::BoolArray(v) => {
                self.bool_arrays.insert(key, v);
            }
            DefaultValue::IntegerArray(v) => {
                self.integer_arrays.insert(key, v);
            }
            DefaultValue::DoubleArray(v) => {
                self.double_arrays.insert(key, v);
            }
            DefaultValue::StringArray(v) => {
                self.string_arrays.insert(key, v);
            }
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: DefaultValue) -> Self {
        self.insert(key, value);
        self
    }

    fn remove(&mut self, key: &str) {
        self.booleans.remove(key);
        self.integers.remove(key);
        self.doubles.remove(key);
        self.strings.remove(key);
        self.bool_arrays.remove(key);
        self.integer_arrays.remove(key);
        self.double_arrays.remove(key);
        self.string_arrays.remove(key);
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.booleans.get(key).copied()
    }

    pub fn get_integer(&self, key: &str) -> Option<i32> {
        self.integers.get(key).copied()
    }

    pub fn get_double(&self, key: &str) -> Option<f64> {
        self.doubles.get(key).copied()
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.strings.get(key).map(String::as_str)
    }

    pub fn get_bool_array(&self, key: &str) -> Option<&[bool]> {
        self.bool_arrays.get(key).map(Vec::as_slice)
    }

    pub fn get_integer_array(&self, key: &str) -> Option<&[i32]> {
        self.integer_arrays.get(key).map(Vec::as_slice)
    }

    pub fn get_double_array(&self, key: &str) -> Option<&[f64]> {
        self.double_arrays.get(key).map(Vec::as_slice)
    }

    pub fn get_string_array(&self, key: &str) -> Option<&[String]> {
        self.string_arrays.get(key).map(Vec::as_slice)
    }

    /// Looks `key` up in whichever category holds it.
    pub fn get(&self, key: &str) -> Option<DefaultValue> {
        self.get_bool(key)
            .map(DefaultValue::Bool)
            .or_else(|| self.get_integer(key).map(DefaultValue::Integer))
            .or_else(|| self.get_double(key).map(DefaultValue::Double))
            .or_else(|| self.get_string(key).map(|v| DefaultValue::String(v.to_owned())))
            .or_else(|| self.get_bool_array(key).map(|v| DefaultValue::BoolArray(v.to_vec())))
            .or_else(|| {
                self.get_integer_array(key)
                    .map(|v| DefaultValue::IntegerArray(v.to_vec()))
            })
            .or_else(|| {
                self.get_double_array(key)
                    .map(|v| DefaultValue::DoubleArray(v.to_vec()))
            })
            .or_else(|| {
                self.get_string_array(key)
                    .map(|v| DefaultValue::StringArray(v.to_vec()))
            })
    }

    /// Number of keys over all categories.
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

    /// All keys, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.booleans
            .keys()
            .chain(self.integers.keys())
            .chain(self.doubles.keys())
            .chain(self.strings.keys())
            .chain(self.bool_arrays.keys())
            .chain(self.integer_arrays.keys())
            .chain(self.double_arrays.keys())
            .chain(self.string_arrays.keys())
            .map(String::as_str)
    }

    /// Copies every entry of `other` over `self`.
    pub fn overlay(&mut self, other: &AttributesValuesMap) {
        for key in other.keys() {
            if let Some(value) = other.get(key) {
                self.insert(key, value);
            }
        }
    }

    /// Appends all entries to the currently open shape of `map`, in key order per category.
    fn append_to(&self, map: &mut RuleAttributesMap) {
        for (k, v) in sorted(&self.booleans) {
            map.add_bool(k, *v);
        }
        for (k, v) in sorted(&self.integers) {
            map.add_integer(k, *v);
        }
        for (k, v) in sorted(&self.doubles) {
            map.add_double(k, *v);
        }
        for (k, v) in sorted(&self.strings) {
            map.add_string(k, v.clone());
        }
        for (k, v) in sorted(&self.bool_arrays) {
            map.add_bool_array(k, v);
        }
        for (k, v) in sorted(&self.integer_arrays) {
            map.add_integer_array(k, v);
        }
        for (k, v) in sorted(&self.double_arrays) {
            map.add_double_array(k, v);
        }
        for (k, v) in sorted(&self.string_arrays) {
            map.add_string_array(k, v);
        }
    }
}

fn fill<T, U>(
    target: &mut HashMap<String, U>,
    seen: &mut HashSet<String>,
    buckets: &AttributeBuckets<T>,
    shape: usize,
    convert: impl Fn(&T) -> Result<U>,
) -> Result<()> {
    for (key, value) in buckets.shape_entries(shape) {
        if !seen.insert(key.to_owned()) {
            return Err(Error::DuplicateKey {
                key: key.to_owned(),
            });
        }
        target.insert(key.to_owned(), convert(value)?);
    }
    Ok(())
}

fn sorted<V>(map: &HashMap<String, V>) -> Vec<(&String, &V)> {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
}

/// Re-flattens per-shape maps, one section per map in order.
pub fn flatten_value_maps(maps: &[AttributesValuesMap]) -> RuleAttributesMap {
    let mut flat = RuleAttributesMap::new();
    for map in maps {
        flat.start_shape();
        map.append_to(&mut flat);
    }
    flat
}

/// Per-shape booleans for `key`; `false` (or an empty branch for arrays) where missing.
pub fn default_booleans(key: &str, maps: &[AttributesValuesMap], is_array: bool) -> DataTree<bool> {
    if is_array {
        maps.iter()
            .map(|m| m.get_bool_array(key).map(<[bool]>::to_vec).unwrap_or_default())
            .collect()
    } else {
        DataTree::from_values(maps.iter().map(|m| m.get_bool(key).unwrap_or(false)).collect())
    }
}

/// Per-shape integers for `key`; `0` (or an empty branch for arrays) where missing.
pub fn default_integers(key: &str, maps: &[AttributesValuesMap], is_array: bool) -> DataTree<i32> {
    if is_array {
        maps.iter()
            .map(|m| m.get_integer_array(key).map(<[i32]>::to_vec).unwrap_or_default())
            .collect()
    } else {
        DataTree::from_values(maps.iter().map(|m| m.get_integer(key).unwrap_or(0)).collect())
    }
}

/// Per-shape doubles for `key`; `NaN` (or an empty branch for arrays) where missing.
pub fn default_doubles(key: &str, maps: &[AttributesValuesMap], is_array: bool) -> DataTree<f64> {
    if is_array {
        maps.iter()
            .map(|m| m.get_double_array(key).map(<[f64]>::to_vec).unwrap_or_default())
            .collect()
    } else {
        DataTree::from_values(
            maps.iter()
                .map(|m| m.get_double(key).unwrap_or(f64::NAN))
                .collect(),
        )
    }
}

/// Per-shape strings for `key`; `""` (or an empty branch for arrays) where missing.
pub fn default_strings(key: &str, maps: &[AttributesValuesMap], is_array: bool) -> DataTree<String> {
    if is_array {
        maps.iter()
            .map(|m| m.get_string_array(key).map(<[String]>::to_vec).unwrap_or_default())
            .collect()
    } else {
        DataTree::from_values(
            maps.iter()
                .map(|m| m.get_string(key).unwrap_or_default().to_owned())
                .collect(),
        )
    }
}

/// Per-shape colors decoded from hex string defaults.
///
/// Shapes without a default (or with an empty string) get an empty branch; any other
/// malformed value is a parse error.
pub fn default_colors(key: &str, maps: &[AttributesValuesMap]) -> Result<DataTree<Color>> {
    maps.iter()
        .map(|m| match m.get_string(key) {
            Some(hex) if !hex.is_empty() => Color::from_hex(hex).map(|c| vec![c]),
            _ => Ok(Vec::new()),
        })
        .collect::<Result<Vec<_>>>()
        .map(DataTree::from_branches)
}
