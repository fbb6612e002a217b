//! Boundary to the procedural engine.
//!
//! [`PrtEngine`] lists the calls this crate makes into the engine. Methods mirror the
//! native entry points: queries fill caller-owned buffers and return a success flag,
//! never partial data. [`crate::context::PrtContext`] is the only caller and turns the
//! flags into [`crate::error::Error::NativeCall`].
//!
//! [`MemoryEngine`] implements the boundary in plain Rust for tests and demos.
use std::path::Path;
use std::time::SystemTime;

use crate::annotation::Annotation;
use crate::attribute::RuleAttributeInfo;
use crate::interop::NativeAttributeBuffers;
use crate::material::MaterialBuffers;
use crate::report::ReportBuffers;

pub mod memory;

pub use memory::{MemoryEngine, RulePackage};

/// Calls into a procedural engine instance.
pub trait PrtEngine {
    /// Loads a rule package, replacing the current one.
    fn set_package(&mut self, path: &Path) -> Result<(), String>;

    /// Stamp of the package at `path`; a changed stamp means the package was rebuilt.
    ///
    /// Defaults to the file's modification time.
    fn package_stamp(&self, path: &Path) -> Option<SystemTime> {
        std::fs::metadata(path).and_then(|m| m.modified()).ok()
    }

    fn rule_attribute_count(&self) -> usize;

    fn rule_attribute(&self, index: usize) -> Option<RuleAttributeInfo>;

    /// Annotations of the attribute at `index`, or `None` when the query fails.
    fn annotations(&self, index: usize) -> Option<Vec<Annotation>>;

    /// Writes the authored defaults of `shape_count` shapes into `out`.
    fn default_values(&mut self, shape_count: usize, out: &mut NativeAttributeBuffers) -> bool;

    fn set_attribute_bool(&mut self, shape: usize, rule_file: &str, full_name: &str, value: bool) -> bool;

    fn set_attribute_integer(&mut self, shape: usize, rule_file: &str, full_name: &str, value: i32) -> bool;

    fn set_attribute_double(&mut self, shape: usize, rule_file: &str, full_name: &str, value: f64) -> bool;

    fn set_attribute_string(&mut self, shape: usize, rule_file: &str, full_name: &str, value: &str) -> bool;

    /// Array setters take the encoded form produced by [`crate::codec::encode_array`].
    fn set_attribute_bool_array(&mut self, shape: usize, rule_file: &str, full_name: &str, encoded: &str) -> bool;

    fn set_attribute_integer_array(&mut self, shape: usize, rule_file: &str, full_name: &str, encoded: &str) -> bool;

    fn set_attribute_double_array(&mut self, shape: usize, rule_file: &str, full_name: &str, encoded: &str) -> bool;

    fn set_attribute_string_array(&mut self, shape: usize, rule_file: &str, full_name: &str, encoded: &str) -> bool;

    /// Runs generation for `shape_count` shapes with the given attribute overrides.
    fn generate(&mut self, shape_count: usize, attributes: &NativeAttributeBuffers) -> bool;

    /// Reports of the last generation for `shape`.
    fn reports(&self, shape: usize, out: &mut ReportBuffers) -> bool;

    fn mesh_part_count(&self, shape: usize) -> usize;

    fn material(&self, shape: usize, part: usize, out: &mut MaterialBuffers) -> bool;
}
