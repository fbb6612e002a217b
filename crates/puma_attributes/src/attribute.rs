//! Rule attributes exposed by a loaded rule package.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::annotation::Annotation;

/// Declared value type of a rule attribute, with the engine's wire codes.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttributeType {
    Void = 0,
    Bool = 1,
    Float = 2,
    String = 3,
    Int = 4,
    Unknown = 5,
    BoolArray = 6,
    FloatArray = 7,
    StringArray = 8,
}

impl AttributeType {
    /// Maps a wire code; unrecognized codes become [`AttributeType::Unknown`].
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => AttributeType::Void,
            1 => AttributeType::Bool,
            2 => AttributeType::Float,
            3 => AttributeType::String,
            4 => AttributeType::Int,
            6 => AttributeType::BoolArray,
            7 => AttributeType::FloatArray,
            8 => AttributeType::StringArray,
            _ => AttributeType::Unknown,
        }
    }

    pub fn is_array(self) -> bool {
        matches!(
            self,
            AttributeType::BoolArray | AttributeType::FloatArray | AttributeType::StringArray
        )
    }
}

/// Raw attribute description as reported by the engine, before annotations are attached.
#[derive(Clone, Debug, PartialEq)]
pub struct RuleAttributeInfo {
    pub full_name: String,
    pub nickname: String,
    pub rule_file: String,
    pub attribute_type: AttributeType,
    pub group: String,
}

/// One procedural parameter of a rule package.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct RuleAttribute {
    /// Qualified identifier, unique within the package.
    pub full_name: String,
    pub nickname: String,
    pub rule_file: String,
    pub attribute_type: AttributeType,
    /// Display grouping path, empty when ungrouped.
    pub group: String,
    pub annotations: Vec<Annotation>,
}

impl RuleAttribute {
    pub fn new(
        full_name: impl Into<String>,
        nickname: impl Into<String>,
        rule_file: impl Into<String>,
        attribute_type: AttributeType,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            nickname: nickname.into(),
            rule_file: rule_file.into(),
            attribute_type,
            group: String::new(),
            annotations: Vec::new(),
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn from_info(info: RuleAttributeInfo, annotations: Vec<Annotation>) -> Self {
        Self {
            full_name: info.full_name,
            nickname: info.nickname,
            rule_file: info.rule_file,
            attribute_type: info.attribute_type,
            group: info.group,
            annotations,
        }
    }

    #[inline]
    pub fn is_array(&self) -> bool {
        self.attribute_type.is_array()
    }

    pub fn is_color(&self) -> bool {
        self.annotations.iter().any(Annotation::is_color)
    }

    /// Parameter description: the group line followed by every annotation summary.
    pub fn description(&self) -> String {
        let mut text = String::new();
        if !self.group.is_empty() {
            text.push_str(&format!("Group {}\n", self.group));
        }
        for annotation in &self.annotations {
            text.push(' ');
            text.push_str(&annotation.describe());
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::RangeAnnotation;

    #[test]
    fn unknown_codes_fall_back() {
        assert_eq!(AttributeType::from_code(7), AttributeType::FloatArray);
        assert_eq!(AttributeType::from_code(5), AttributeType::Unknown);
        assert_eq!(AttributeType::from_code(42), AttributeType::Unknown);
        assert!(AttributeType::StringArray.is_array());
        assert!(!AttributeType::Int.is_array());
    }

    #[test]
    fn description_includes_group_and_annotations() {
        let attr = RuleAttribute::new("/ce/rule/height", "height", "rules/building.cga", AttributeType::Float)
            .with_group("Massing")
            .with_annotation(Annotation::Range(RangeAnnotation::new(0.0, 10.0)));
        assert_eq!(
            attr.description(),
            "Group Massing\n Range: Min: 0 Max: 10 Restricted"
        );
    }

    #[test]
    fn color_detection_scans_all_annotations() {
        let attr = RuleAttribute::new("/ce/rule/facade", "facade", "r.cga", AttributeType::String)
            .with_annotation(Annotation::None)
            .with_annotation(Annotation::Color);
        assert!(attr.is_color());
    }
}
