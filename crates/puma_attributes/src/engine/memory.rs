//! Pure Rust engine keeping rule packages in memory.
//!
//! Generation does not build geometry: every shape reports the effective value of each
//! scalar rule attribute under its nickname, and every mesh part gets the package's
//! materials. Individual calls can be made to fail with [`MemoryEngine::fail_on`].
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tracing::{debug, warn};

use crate::annotation::Annotation;
use crate::attribute::{RuleAttribute, RuleAttributeInfo};
use crate::codec::{decode_array, ArrayElement};
use crate::engine::PrtEngine;
use crate::interop::NativeAttributeBuffers;
use crate::material::MaterialBuffers;
use crate::report::ReportBuffers;
use crate::values::{flatten_value_maps, AttributesValuesMap, DefaultValue};

/// A rule package as the in-memory engine sees it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RulePackage {
    pub attributes: Vec<RuleAttribute>,
    /// Defaults shared by all shapes.
    pub defaults: AttributesValuesMap,
    /// Materials assigned to the mesh parts of every generated shape.
    pub materials: Vec<MaterialBuffers>,
}

impl RulePackage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attribute(mut self, attribute: RuleAttribute, default: Option<DefaultValue>) -> Self {
        if let Some(value) = default {
            self.defaults.insert(attribute.full_name.clone(), value);
        }
        self.attributes.push(attribute);
        self
    }

    pub fn with_material(mut self, material: MaterialBuffers) -> Self {
        self.materials.push(material);
        self
    }

    fn find(&self, full_name: &str) -> Option<&RuleAttribute> {
        self.attributes.iter().find(|a| a.full_name == full_name)
    }
}

#[derive(Debug, Default)]
pub struct MemoryEngine {
    packages: HashMap<PathBuf, RulePackage>,
    revisions: HashMap<PathBuf, u64>,
    current: Option<RulePackage>,
    load_count: usize,
    shape_defaults: HashMap<usize, AttributesValuesMap>,
    overrides: Vec<AttributesValuesMap>,
    reports: Vec<ReportBuffers>,
    failing: HashSet<&'static str>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `package` under `path` for [`PrtEngine::set_package`].
    pub fn with_package(mut self, path: impl Into<PathBuf>, package: RulePackage) -> Self {
        self.packages.insert(path.into(), package);
        self
    }

    /// Replaces the package registered under `path` and bumps its stamp.
    pub fn rebuild_package(&mut self, path: impl Into<PathBuf>, package: RulePackage) {
        let path = path.into();
        *self.revisions.entry(path.clone()).or_default() += 1;
        self.packages.insert(path, package);
    }

    /// Overrides a package default for one shape only.
    pub fn with_shape_default(mut self, shape: usize, key: impl Into<String>, value: DefaultValue) -> Self {
        self.shape_defaults.entry(shape).or_default().insert(key, value);
        self
    }

    /// Makes the named call report failure: `set_package`, `annotations`, `default_values`,
    /// `set_attribute`, `generate`, `reports` or `material`.
    pub fn fail_on(&mut self, call: &'static str) {
        self.failing.insert(call);
    }

    pub fn clear_failures(&mut self) {
        self.failing.clear();
    }

    /// Number of successful package loads.
    pub fn load_count(&self) -> usize {
        self.load_count
    }

    /// Values stored through the `set_attribute_*` calls for `shape`.
    pub fn overrides(&self, shape: usize) -> Option<&AttributesValuesMap> {
        self.overrides.get(shape)
    }

    fn fails(&self, call: &'static str) -> bool {
        self.failing.contains(call)
    }

    fn effective_defaults(&self, package: &RulePackage, shape: usize) -> AttributesValuesMap {
        let mut values = package.defaults.clone();
        if let Some(per_shape) = self.shape_defaults.get(&shape) {
            values.overlay(per_shape);
        }
        if let Some(overrides) = self.overrides.get(shape) {
            values.overlay(overrides);
        }
        values
    }

    fn set_override(&mut self, shape: usize, rule_file: &str, full_name: &str, value: DefaultValue) -> bool {
        if self.fails("set_attribute") {
            return false;
        }
        let Some(package) = &self.current else {
            return false;
        };
        match package.find(full_name) {
            Some(attribute) if attribute.rule_file == rule_file => {}
            _ => {
                warn!(attribute = full_name, rule_file, "no such rule attribute");
                return false;
            }
        }

        if self.overrides.len() <= shape {
            self.overrides.resize_with(shape + 1, AttributesValuesMap::default);
        }
        self.overrides[shape].insert(full_name, value);
        true
    }

    fn set_encoded<T: ArrayElement>(
        &mut self,
        shape: usize,
        rule_file: &str,
        full_name: &str,
        encoded: &str,
        wrap: impl FnOnce(Vec<T>) -> DefaultValue,
    ) -> bool {
        match decode_array::<T>(encoded) {
            Ok(values) => self.set_override(shape, rule_file, full_name, wrap(values)),
            Err(err) => {
                warn!(attribute = full_name, "{err}");
                false
            }
        }
    }
}

/// Reports every scalar attribute value, doubles first, then booleans, then strings.
fn report_values(attributes: &[RuleAttribute], values: &AttributesValuesMap) -> ReportBuffers {
    let mut doubles = Vec::new();
    let mut bools = Vec::new();
    let mut strings = Vec::new();
    for attribute in attributes {
        match values.get(&attribute.full_name) {
            Some(DefaultValue::Double(v)) => doubles.push((&attribute.nickname, v)),
            Some(DefaultValue::Integer(v)) => doubles.push((&attribute.nickname, f64::from(v))),
            Some(DefaultValue::Bool(v)) => bools.push((&attribute.nickname, i32::from(v))),
            Some(DefaultValue::String(v)) => strings.push((&attribute.nickname, v)),
            _ => {}
        }
    }

    let mut out = ReportBuffers::new();
    for (key, v) in doubles {
        out.keys.push(key.clone());
        out.doubles.push(v);
    }
    for (key, v) in bools {
        out.keys.push(key.clone());
        out.bools.push(v);
    }
    for (key, v) in strings {
        out.keys.push(key.clone());
        out.strings.push(v);
    }
    out
}

impl PrtEngine for MemoryEngine {
    fn set_package(&mut self, path: &Path) -> Result<(), String> {
        self.current = None;
        self.overrides.clear();
        self.reports.clear();
        if self.fails("set_package") {
            return Err(format!("could not open rule package {}", path.display()));
        }
        let package = self
            .packages
            .get(path)
            .cloned()
            .ok_or_else(|| format!("no rule package at {}", path.display()))?;

        self.current = Some(package);
        self.load_count += 1;
        Ok(())
    }

    fn package_stamp(&self, path: &Path) -> Option<SystemTime> {
        if !self.packages.contains_key(path) {
            return None;
        }
        let revision = self.revisions.get(path).copied().unwrap_or(0);
        Some(SystemTime::UNIX_EPOCH + Duration::from_secs(revision))
    }

    fn rule_attribute_count(&self) -> usize {
        self.current.as_ref().map_or(0, |p| p.attributes.len())
    }

    fn rule_attribute(&self, index: usize) -> Option<RuleAttributeInfo> {
        let attribute = self.current.as_ref()?.attributes.get(index)?;
        Some(RuleAttributeInfo {
            full_name: attribute.full_name.clone(),
            nickname: attribute.nickname.clone(),
            rule_file: attribute.rule_file.clone(),
            attribute_type: attribute.attribute_type,
            group: attribute.group.clone(),
        })
    }

    fn annotations(&self, index: usize) -> Option<Vec<Annotation>> {
        if self.fails("annotations") {
            return None;
        }
        Some(self.current.as_ref()?.attributes.get(index)?.annotations.clone())
    }

    fn default_values(&mut self, shape_count: usize, out: &mut NativeAttributeBuffers) -> bool {
        if self.fails("default_values") {
            return false;
        }
        let Some(package) = &self.current else {
            return false;
        };

        let maps: Vec<_> = (0..shape_count)
            .map(|shape| self.effective_defaults(package, shape))
            .collect();
        match out.assign(flatten_value_maps(&maps).buffers()) {
            Ok(()) => true,
            Err(err) => {
                warn!("{err}");
                false
            }
        }
    }

    fn set_attribute_bool(&mut self, shape: usize, rule_file: &str, full_name: &str, value: bool) -> bool {
        self.set_override(shape, rule_file, full_name, DefaultValue::Bool(value))
    }

    fn set_attribute_integer(&mut self, shape: usize, rule_file: &str, full_name: &str, value: i32) -> bool {
        self.set_override(shape, rule_file, full_name, DefaultValue::Integer(value))
    }

    fn set_attribute_double(&mut self, shape: usize, rule_file: &str, full_name: &str, value: f64) -> bool {
        self.set_override(shape, rule_file, full_name, DefaultValue::Double(value))
    }

    fn set_attribute_string(&mut self, shape: usize, rule_file: &str, full_name: &str, value: &str) -> bool {
        self.set_override(shape, rule_file, full_name, DefaultValue::String(value.to_owned()))
    }

    fn set_attribute_bool_array(&mut self, shape: usize, rule_file: &str, full_name: &str, encoded: &str) -> bool {
        self.set_encoded(shape, rule_file, full_name, encoded, DefaultValue::BoolArray)
    }

    fn set_attribute_integer_array(&mut self, shape: usize, rule_file: &str, full_name: &str, encoded: &str) -> bool {
        self.set_encoded(shape, rule_file, full_name, encoded, DefaultValue::IntegerArray)
    }

    fn set_attribute_double_array(&mut self, shape: usize, rule_file: &str, full_name: &str, encoded: &str) -> bool {
        self.set_encoded(shape, rule_file, full_name, encoded, DefaultValue::DoubleArray)
    }

    fn set_attribute_string_array(&mut self, shape: usize, rule_file: &str, full_name: &str, encoded: &str) -> bool {
        self.set_encoded(shape, rule_file, full_name, encoded, DefaultValue::StringArray)
    }

    fn generate(&mut self, shape_count: usize, attributes: &NativeAttributeBuffers) -> bool {
        if self.fails("generate") {
            return false;
        }
        let Some(package) = &self.current else {
            return false;
        };

        let submitted = match attributes
            .to_buffers()
            .and_then(|buffers| AttributesValuesMap::from_buffers(shape_count, &buffers))
        {
            Ok(maps) => maps,
            Err(err) => {
                warn!("rejected generation input: {err}");
                return false;
            }
        };

        let reports: Vec<_> = submitted
            .iter()
            .enumerate()
            .map(|(shape, values)| {
                let mut effective = self.effective_defaults(package, shape);
                effective.overlay(values);
                report_values(&package.attributes, &effective)
            })
            .collect();
        debug!(shapes = shape_count, "generated");
        self.reports = reports;
        true
    }

    fn reports(&self, shape: usize, out: &mut ReportBuffers) -> bool {
        if self.fails("reports") {
            return false;
        }
        match self.reports.get(shape) {
            Some(reports) => {
                *out = reports.clone();
                true
            }
            None => false,
        }
    }

    fn mesh_part_count(&self, shape: usize) -> usize {
        match &self.current {
            Some(package) if shape < self.reports.len() => package.materials.len(),
            _ => 0,
        }
    }

    fn material(&self, shape: usize, part: usize, out: &mut MaterialBuffers) -> bool {
        if self.fails("material") || shape >= self.reports.len() {
            return false;
        }
        match self.current.as_ref().and_then(|p| p.materials.get(part)) {
            Some(material) => {
                *out = material.clone();
                true
            }
            None => false,
        }
    }
}
