#![forbid(unsafe_code)]
//! puma_attributes: Attribute marshalling and default-value resolution for procedural rule engines.
//!
//! Modules:
//! - codec: encoded arrays carried through single string values
//! - buckets, interop: flattened per-shape `(starts, keys, values)` buffers and their native staging
//! - values, rule_map, input: inbound per-shape defaults and outbound user values
//! - attribute, annotation, widget: rule attribute model and display widget selection
//! - engine, context: the engine boundary, an in-memory engine, and the explicit context handle
//! - report, material, color, tree: generation results and host-facing value types
//!
//! For examples and docs, see README and the demos crate.
pub mod annotation;
pub mod attribute;
pub mod buckets;
pub mod codec;
pub mod color;
pub mod context;
pub mod engine;
pub mod error;
pub mod input;
pub mod interop;
pub mod material;
pub mod report;
pub mod rule_map;
pub mod tree;
pub mod values;
pub mod widget;

/// Convenient re-exports for common types. Import with `use puma_attributes::prelude::*;`.
pub mod prelude {
    pub use crate::annotation::{
        Annotation, AnnotationKind, EnumAnnotation, EnumType, EnumValues, RangeAnnotation,
    };
    pub use crate::attribute::{AttributeType, RuleAttribute, RuleAttributeInfo};
    pub use crate::buckets::{AttributeBuckets, AttributeBuffers};
    pub use crate::codec::{decode_array, encode_array, ArrayElement};
    pub use crate::color::Color;
    pub use crate::context::{GenerateOutput, PrtContext};
    pub use crate::engine::{MemoryEngine, PrtEngine, RulePackage};
    pub use crate::error::{Error, Result};
    pub use crate::input::{
        cast_values, collect_inputs, AttributeInput, CastPolicy, CollectedInputs, HostValue,
        InputConfig,
    };
    pub use crate::interop::{InteropBuffer, NativeAttributeBuffers, NativeValue};
    pub use crate::material::{Material, MaterialBuffers, Textures};
    pub use crate::report::{format_reports, Report, ReportBuffers, ReportFilter, ReportValue};
    pub use crate::rule_map::RuleAttributesMap;
    pub use crate::tree::DataTree;
    pub use crate::values::{
        default_booleans, default_colors, default_doubles, default_integers, default_strings,
        flatten_value_maps, AttributesValuesMap, DefaultValue,
    };
    pub use crate::widget::{
        select_widget, ChoiceItem, ChoiceSource, ChoiceWidget, ColorWidget, DefaultInjection,
        SliderAccuracy, SliderWidget, Widget, WidgetKind, WidgetSelection,
    };
}

#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use crate::prelude::*;

    #[test]
    fn rule_attributes_persist_through_ron() {
        let attribute = RuleAttribute::new("/ce/rule/roof", "roof", "rules/building.cga", AttributeType::String)
            .with_group("Roof")
            .with_annotation(Annotation::Enum(EnumAnnotation::new(
                EnumValues::String(vec!["flat".into(), "gable".into()]),
                true,
            )))
            .with_annotation(Annotation::Range(RangeAnnotation::new(1.0, 3.0).with_step_size(0.5)));

        let text = ron::to_string(&attribute).unwrap();
        let restored: RuleAttribute = ron::from_str(&text).unwrap();
        assert_eq!(restored, attribute);
    }

    #[test]
    fn input_config_persists_through_ron() {
        let config = InputConfig::new()
            .with_cast_policy(CastPolicy::SkipAttribute)
            .with_repeat_last(false);
        let text = ron::to_string(&config).unwrap();
        assert_eq!(ron::from_str::<InputConfig>(&text).unwrap(), config);
    }
}
