//! Explicit handle on one engine instance and its loaded rule package.
//!
//! Every engine interaction goes through a [`PrtContext`]. A failed engine call becomes
//! [`Error::NativeCall`] and no data of that call is returned. Staging buffers are
//! released before each method returns, on every path.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, info, warn};

use crate::attribute::RuleAttribute;
use crate::codec::encode_array;
use crate::engine::PrtEngine;
use crate::error::{Error, Result};
use crate::input::{cast_values, HostValue};
use crate::interop::NativeAttributeBuffers;
use crate::material::{Material, MaterialBuffers};
use crate::report::{format_reports, Report, ReportBuffers, ReportFilter};
use crate::rule_map::RuleAttributesMap;
use crate::values::{AttributesValuesMap, DefaultValue};

/// Results of one generation pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GenerateOutput {
    /// Per shape; `None` where the engine returned no usable reports.
    pub reports: Vec<Option<Vec<Report>>>,
    /// Per shape, one material per mesh part that could be queried.
    pub materials: Vec<Vec<Material>>,
}

impl GenerateOutput {
    pub fn shape_count(&self) -> usize {
        self.reports.len()
    }

    pub fn reports_of(&self, shape: usize) -> Option<&[Report]> {
        self.reports.get(shape)?.as_deref()
    }

    /// Reports of all shapes in shape order.
    pub fn all_reports(&self) -> impl Iterator<Item = &Report> + '_ {
        self.reports.iter().flatten().flatten()
    }

    pub fn filter_reports(&self, filter: &ReportFilter) -> BTreeMap<usize, Vec<Report>> {
        filter.apply(&self.reports)
    }

    /// One text block per shape for the reports `filter` keeps.
    pub fn format_reports(&self, filter: &ReportFilter) -> Vec<String> {
        format_reports(&self.filter_reports(filter), self.shape_count())
    }
}

/// Identity of a loaded rule package: its path and the stamp it had when loaded.
#[derive(Clone, Debug, PartialEq, Eq)]
struct LoadedPackage {
    path: PathBuf,
    stamp: Option<SystemTime>,
}

pub struct PrtContext<E: PrtEngine> {
    engine: E,
    package: Option<LoadedPackage>,
    attributes: Vec<RuleAttribute>,
}

impl<E: PrtEngine> PrtContext<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            package: None,
            attributes: Vec::new(),
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn into_engine(self) -> E {
        self.engine
    }

    /// Path of the loaded rule package.
    pub fn package(&self) -> Option<&Path> {
        self.package.as_ref().map(|p| p.path.as_path())
    }

    /// Loads the rule package at `path` and refreshes the rule attributes.
    ///
    /// Returns `Ok(false)` without touching the engine when the same package is loaded and
    /// its stamp (see [`PrtEngine::package_stamp`]) is unchanged. A failed load leaves no
    /// package loaded and no rule attributes.
    pub fn load_package(&mut self, path: impl AsRef<Path>) -> Result<bool> {
        let path = path.as_ref();
        let loaded = LoadedPackage {
            path: path.to_path_buf(),
            stamp: self.engine.package_stamp(path),
        };
        if self.package.as_ref() == Some(&loaded) {
            debug!(package = %path.display(), "rule package already loaded");
            return Ok(false);
        }

        self.package = None;
        self.attributes.clear();
        if let Err(message) = self.engine.set_package(path) {
            warn!(package = %path.display(), "{message}");
            return Err(Error::Package(message));
        }
        self.package = Some(loaded);
        self.attributes = self.query_rule_attributes();
        info!(
            package = %path.display(),
            attributes = self.attributes.len(),
            "loaded rule package"
        );
        Ok(true)
    }

    fn require_package(&self) -> Result<()> {
        match self.package {
            Some(_) => Ok(()),
            None => Err(Error::Package("no rule package loaded".into())),
        }
    }

    /// All attributes or none: a single failed query leaves the list empty.
    fn query_rule_attributes(&self) -> Vec<RuleAttribute> {
        let count = self.engine.rule_attribute_count();
        let mut attributes = Vec::with_capacity(count);
        for index in 0..count {
            let info = self.engine.rule_attribute(index);
            let annotations = self.engine.annotations(index);
            match (info, annotations) {
                (Some(info), Some(annotations)) => {
                    attributes.push(RuleAttribute::from_info(info, annotations));
                }
                _ => {
                    warn!(index, "rule attribute query failed");
                    return Vec::new();
                }
            }
        }
        attributes
    }

    pub fn rule_attributes(&self) -> &[RuleAttribute] {
        &self.attributes
    }

    pub fn find_attribute(&self, full_name: &str) -> Option<&RuleAttribute> {
        self.attributes.iter().find(|a| a.full_name == full_name)
    }

    /// Authored defaults of `shape_count` shapes, one map per shape.
    pub fn default_values(&mut self, shape_count: usize) -> Result<Vec<AttributesValuesMap>> {
        self.require_package()?;
        let mut out = NativeAttributeBuffers::empty();
        if !self.engine.default_values(shape_count, &mut out) {
            return Err(Error::NativeCall("default_values"));
        }
        let buffers = out.to_buffers()?;
        out.dispose();
        AttributesValuesMap::from_buffers(shape_count, &buffers)
    }

    /// Sets one attribute of one shape directly on the engine.
    ///
    /// Scalar attributes take the first non-null value; array attributes take all of them.
    pub fn set_attribute(&mut self, shape: usize, full_name: &str, values: &[HostValue]) -> Result<()> {
        self.require_package()?;
        let attribute = self
            .find_attribute(full_name)
            .cloned()
            .ok_or_else(|| Error::Other(format!("unknown rule attribute '{full_name}'")))?;
        let value = cast_values(&attribute, values)?
            .ok_or_else(|| Error::Other(format!("no value for attribute '{full_name}'")))?;

        let rule_file = attribute.rule_file.as_str();
        let engine = &mut self.engine;
        let ok = match value {
            DefaultValue::Bool(v) => engine.set_attribute_bool(shape, rule_file, full_name, v),
            DefaultValue::Integer(v) => engine.set_attribute_integer(shape, rule_file, full_name, v),
            DefaultValue::Double(v) => engine.set_attribute_double(shape, rule_file, full_name, v),
            DefaultValue::String(v) => engine.set_attribute_string(shape, rule_file, full_name, &v),
            DefaultValue::BoolArray(v) => {
                engine.set_attribute_bool_array(shape, rule_file, full_name, &encode_array(&v))
            }
            DefaultValue::IntegerArray(v) => {
                engine.set_attribute_integer_array(shape, rule_file, full_name, &encode_array(&v))
            }
            DefaultValue::DoubleArray(v) => {
                engine.set_attribute_double_array(shape, rule_file, full_name, &encode_array(&v))
            }
            DefaultValue::StringArray(v) => {
                engine.set_attribute_string_array(shape, rule_file, full_name, &encode_array(&v))
            }
        };

        if ok {
            Ok(())
        } else {
            Err(Error::NativeCall("set_attribute"))
        }
    }

    /// Generates all shapes of `attributes` and collects reports and materials.
    pub fn generate(&mut self, attributes: &RuleAttributesMap) -> Result<GenerateOutput> {
        self.require_package()?;
        let shape_count = attributes.shape_count();
        attributes.buffers().check_shape_count(shape_count)?;

        let native = NativeAttributeBuffers::from_buffers(attributes.buffers())?;
        let generated = self.engine.generate(shape_count, &native);
        native.dispose();
        if !generated {
            return Err(Error::NativeCall("generate"));
        }

        let mut output = GenerateOutput::default();
        for shape in 0..shape_count {
            output.reports.push(self.shape_reports(shape));
            output.materials.push(self.shape_materials(shape)?);
        }
        debug!(shapes = shape_count, "collected generation results");
        Ok(output)
    }

    fn shape_reports(&self, shape: usize) -> Option<Vec<Report>> {
        let mut buffers = ReportBuffers::new();
        if !self.engine.reports(shape, &mut buffers) {
            return None;
        }
        match buffers.into_reports(shape) {
            Ok(reports) => Some(reports),
            Err(err) => {
                warn!(shape, "dropping reports: {err}");
                None
            }
        }
    }

    fn shape_materials(&self, shape: usize) -> Result<Vec<Material>> {
        let mut materials = Vec::new();
        for part in 0..self.engine.mesh_part_count(shape) {
            let mut buffers = MaterialBuffers::default();
            if self.engine.material(shape, part, &mut buffers) {
                materials.push(Material::try_from(buffers)?);
            } else {
                warn!(shape, part, "material query failed");
            }
        }
        Ok(materials)
    }
}
