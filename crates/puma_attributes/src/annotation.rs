//! Annotations constraining or describing the legal values of a rule attribute.
//!
//! The variant set is closed, so annotations are a plain enum and every consumer matches
//! on it directly.
use std::fmt::Display;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Discriminant of an [`Annotation`], with the engine's wire codes.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnnotationKind {
    Color = 0,
    Range = 1,
    Enum = 2,
    File = 3,
    Directory = 4,
    None = 5,
}

impl AnnotationKind {
    pub fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            0 => AnnotationKind::Color,
            1 => AnnotationKind::Range,
            2 => AnnotationKind::Enum,
            3 => AnnotationKind::File,
            4 => AnnotationKind::Directory,
            5 => AnnotationKind::None,
            _ => return None,
        })
    }
}

/// Element type of an enumeration annotation.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnumType {
    Double = 0,
    Bool = 1,
    String = 2,
}

/// Numeric range with optional step size.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct RangeAnnotation {
    pub min: f64,
    pub max: f64,
    /// Zero when the rule declares no step.
    pub step_size: f64,
    pub restricted: bool,
}

impl RangeAnnotation {
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            step_size: 0.0,
            restricted: true,
        }
    }

    pub fn with_step_size(mut self, step_size: f64) -> Self {
        self.step_size = step_size;
        self
    }

    pub fn with_restricted(mut self, restricted: bool) -> Self {
        self.restricted = restricted;
        self
    }
}

/// Allowed values of an enumeration annotation.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub enum EnumValues {
    Double(Vec<f64>),
    Bool(Vec<bool>),
    String(Vec<String>),
}

impl EnumValues {
    pub fn enum_type(&self) -> EnumType {
        match self {
            EnumValues::Double(_) => EnumType::Double,
            EnumValues::Bool(_) => EnumType::Bool,
            EnumValues::String(_) => EnumType::String,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            EnumValues::Double(v) => v.len(),
            EnumValues::Bool(v) => v.len(),
            EnumValues::String(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stringified values, in declaration order.
    pub fn labels(&self) -> Vec<String> {
        fn strings<T: Display>(values: &[T]) -> Vec<String> {
            values.iter().map(ToString::to_string).collect()
        }
        match self {
            EnumValues::Double(v) => strings(v),
            EnumValues::Bool(v) => strings(v),
            EnumValues::String(v) => v.clone(),
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct EnumAnnotation {
    pub values: EnumValues,
    pub restricted: bool,
}

impl EnumAnnotation {
    pub fn new(values: EnumValues, restricted: bool) -> Self {
        Self { values, restricted }
    }

    /// Boolean enumerations always offer exactly `true` and `false`.
    pub fn booleans() -> Self {
        Self::new(EnumValues::Bool(vec![true, false]), true)
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub enum Annotation {
    Range(RangeAnnotation),
    Enum(EnumAnnotation),
    Color,
    File,
    Directory,
    None,
}

impl Annotation {
    pub fn kind(&self) -> AnnotationKind {
        match self {
            Annotation::Range(_) => AnnotationKind::Range,
            Annotation::Enum(_) => AnnotationKind::Enum,
            Annotation::Color => AnnotationKind::Color,
            Annotation::File => AnnotationKind::File,
            Annotation::Directory => AnnotationKind::Directory,
            Annotation::None => AnnotationKind::None,
        }
    }

    pub fn is_color(&self) -> bool {
        matches!(self, Annotation::Color)
    }

    pub fn enum_type(&self) -> Option<EnumType> {
        match self {
            Annotation::Enum(e) => Some(e.values.enum_type()),
            _ => None,
        }
    }

    /// Human-readable summary shown next to the attribute.
    pub fn describe(&self) -> String {
        match self {
            Annotation::Range(r) => {
                let mut text = format!("Range: Min: {} Max: {}", r.min, r.max);
                if r.step_size > 0.0 {
                    text.push_str(&format!(" StepSize: {}", r.step_size));
                }
                if r.restricted {
                    text.push_str(" Restricted");
                }
                text
            }
            Annotation::Enum(e) => {
                let mut text = String::from("Enumeration, allowed values are:\n");
                for label in e.values.labels() {
                    text.push_str(&format!(" - {label}\n"));
                }
                text
            }
            Annotation::Color => "This attribute accepts a color object.".into(),
            Annotation::File => "This attribute accepts a file path.".into(),
            Annotation::Directory => "This attribute accepts a folder path.".into(),
            Annotation::None => String::new(),
        }
    }
}
