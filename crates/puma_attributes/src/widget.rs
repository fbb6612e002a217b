//! Display widget selection for rule attributes.
//!
//! [`select_widget`] picks a widget from the attribute type and its annotations, then
//! seeds it with the authored default of one shape when a value map is supplied.
//!
//! Dispatch, first match wins:
//!
//! | type | widget |
//! |---|---|
//! | bool, bool array | [`WidgetKind::Boolean`] |
//! | float, float array, int | [`WidgetKind::Slider`] with a range annotation, else [`WidgetKind::Choice`] with an enum annotation, else [`WidgetKind::Number`] |
//! | string, string array | [`WidgetKind::ColorPicker`] for color attributes, else [`WidgetKind::Choice`] for enum, directory or file annotations (in that priority), else [`WidgetKind::Text`] |
//! | anything else | [`WidgetKind::Generic`] |
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::annotation::{Annotation, EnumAnnotation, RangeAnnotation};
use crate::attribute::{AttributeType, RuleAttribute};
use crate::color::Color;
use crate::error::Result;
use crate::values::{AttributesValuesMap, DefaultValue};

/// Bounded numeric slider.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct SliderWidget {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub accuracy: SliderAccuracy,
    pub value: f64,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SliderAccuracy {
    Integer,
    Float,
}

impl SliderWidget {
    /// Starts at the midpoint of the range. Integer accuracy requires an integral,
    /// non-zero step and an integral minimum.
    pub fn from_range(range: &RangeAnnotation) -> Self {
        let integral = |v: f64| v.fract() == 0.0;
        let accuracy = if range.step_size != 0.0 && integral(range.step_size) && integral(range.min)
        {
            SliderAccuracy::Integer
        } else {
            SliderAccuracy::Float
        };
        Self {
            min: range.min,
            max: range.max,
            step: range.step_size,
            accuracy,
            value: (range.min + range.max) * 0.5,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct ChoiceItem {
    pub label: String,
    /// Quoted label, the expression the host evaluates when the item is picked.
    pub expression: String,
}

impl ChoiceItem {
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        let expression = format!("\"{label}\"");
        Self { label, expression }
    }
}

/// Where the choices of a [`ChoiceWidget`] come from.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChoiceSource {
    /// Fixed items of an enum annotation.
    Enum,
    /// Folder picked on the host file system.
    Directory,
    /// File picked on the host file system.
    File,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct ChoiceWidget {
    pub items: Vec<ChoiceItem>,
    pub selected: Option<usize>,
    pub source: ChoiceSource,
}

impl ChoiceWidget {
    pub fn from_enum(annotation: &EnumAnnotation) -> Self {
        Self {
            items: annotation.values.labels().into_iter().map(ChoiceItem::new).collect(),
            selected: None,
            source: ChoiceSource::Enum,
        }
    }

    pub fn path(source: ChoiceSource) -> Self {
        Self {
            items: Vec::new(),
            selected: None,
            source,
        }
    }

    pub fn position(&self, label: &str) -> Option<usize> {
        self.items.iter().position(|item| item.label == label)
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColorWidget {
    pub color: Option<Color>,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub enum WidgetKind {
    Boolean,
    Number,
    Slider(SliderWidget),
    Choice(ChoiceWidget),
    ColorPicker(ColorWidget),
    Text,
    Generic,
}

/// A configured input widget for one rule attribute.
#[derive(Clone, Debug, PartialEq)]
pub struct Widget {
    pub name: String,
    pub nickname: String,
    pub description: String,
    pub access_array: bool,
    pub kind: WidgetKind,
    /// Authored default of the shape used for seeding, if any.
    pub default: Option<DefaultValue>,
}

/// What happened when the authored default was applied.
#[derive(Clone, Debug, PartialEq)]
pub enum DefaultInjection {
    /// No value map was given or it holds no default for the attribute.
    NoDefault,
    Applied,
    /// The default text matches none of the enum items; the widget has no selection.
    Unmatched { value: String },
}

#[derive(Clone, Debug, PartialEq)]
pub struct WidgetSelection {
    pub widget: Widget,
    pub injection: DefaultInjection,
}

/// Builds the widget for `attribute`, seeded from `defaults` when given.
///
/// Fails only when a color default is not a valid hex color.
pub fn select_widget(
    attribute: &RuleAttribute,
    defaults: Option<&AttributesValuesMap>,
) -> Result<WidgetSelection> {
    let mut widget = Widget {
        name: attribute.full_name.clone(),
        nickname: attribute.nickname.clone(),
        description: attribute.description(),
        access_array: attribute.is_array(),
        kind: widget_kind(attribute),
        default: None,
    };

    let Some(default) = defaults.and_then(|map| map.get(&attribute.full_name)) else {
        return Ok(WidgetSelection {
            widget,
            injection: DefaultInjection::NoDefault,
        });
    };

    let injection = inject_default(&mut widget.kind, &default)?;
    if let DefaultInjection::Unmatched { value } = &injection {
        warn!(
            attribute = %attribute.full_name,
            "default '{value}' matches no enumerated item"
        );
    }
    widget.default = Some(default);
    Ok(WidgetSelection { widget, injection })
}

fn widget_kind(attribute: &RuleAttribute) -> WidgetKind {
    let annotations = &attribute.annotations;
    match attribute.attribute_type {
        AttributeType::Bool | AttributeType::BoolArray => WidgetKind::Boolean,
        AttributeType::Float | AttributeType::FloatArray | AttributeType::Int => {
            let range = annotations.iter().find_map(|a| match a {
                Annotation::Range(r) => Some(r),
                _ => None,
            });
            if let Some(range) = range {
                return WidgetKind::Slider(SliderWidget::from_range(range));
            }
            match find_enum(annotations) {
                Some(e) => WidgetKind::Choice(ChoiceWidget::from_enum(e)),
                None => WidgetKind::Number,
            }
        }
        AttributeType::String | AttributeType::StringArray => {
            if attribute.is_color() {
                WidgetKind::ColorPicker(ColorWidget::default())
            } else if let Some(e) = find_enum(annotations) {
                WidgetKind::Choice(ChoiceWidget::from_enum(e))
            } else if annotations.contains(&Annotation::Directory) {
                WidgetKind::Choice(ChoiceWidget::path(ChoiceSource::Directory))
            } else if annotations.contains(&Annotation::File) {
                WidgetKind::Choice(ChoiceWidget::path(ChoiceSource::File))
            } else {
                WidgetKind::Text
            }
        }
        AttributeType::Void | AttributeType::Unknown => WidgetKind::Generic,
    }
}

fn find_enum(annotations: &[Annotation]) -> Option<&EnumAnnotation> {
    annotations.iter().find_map(|a| match a {
        Annotation::Enum(e) => Some(e),
        _ => None,
    })
}

/// Sets specialized widget state from a scalar default. Array defaults are only stored.
fn inject_default(kind: &mut WidgetKind, default: &DefaultValue) -> Result<DefaultInjection> {
    match kind {
        WidgetKind::Slider(slider) => {
            match default {
                DefaultValue::Double(v) => slider.value = *v,
                DefaultValue::Integer(v) => slider.value = f64::from(*v),
                _ => {}
            }
            Ok(DefaultInjection::Applied)
        }
        WidgetKind::Choice(choice) if choice.source == ChoiceSource::Enum => {
            let Some(text) = default.scalar_text() else {
                return Ok(DefaultInjection::Applied);
            };
            match choice.position(&text) {
                Some(index) => {
                    choice.selected = Some(index);
                    Ok(DefaultInjection::Applied)
                }
                None => {
                    choice.selected = None;
                    Ok(DefaultInjection::Unmatched { value: text })
                }
            }
        }
        WidgetKind::ColorPicker(picker) => {
            if let DefaultValue::String(hex) = default {
                if !hex.is_empty() {
                    picker.color = Some(Color::from_hex(hex)?);
                }
            }
            Ok(DefaultInjection::Applied)
        }
        _ => Ok(DefaultInjection::Applied),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::EnumValues;
    use crate::error::Error;

    fn attr(ty: AttributeType) -> RuleAttribute {
        RuleAttribute::new("/ce/rule/height", "height", "rules/building.cga", ty)
    }

    fn heights() -> Annotation {
        Annotation::Enum(EnumAnnotation::new(
            EnumValues::Double(vec![5.0, 10.0, 12.5]),
            true,
        ))
    }

    #[test]
    fn range_wins_over_enum() {
        let attribute = attr(AttributeType::Float)
            .with_annotation(heights())
            .with_annotation(Annotation::Range(RangeAnnotation::new(0.0, 10.0)));
        let selection = select_widget(&attribute, None).unwrap();
        match selection.widget.kind {
            WidgetKind::Slider(slider) => {
                assert_eq!((slider.min, slider.max), (0.0, 10.0));
                assert_eq!(slider.value, 5.0);
            }
            other => panic!("expected slider, got {other:?}"),
        }
        assert_eq!(selection.injection, DefaultInjection::NoDefault);
    }

    #[test]
    fn slider_accuracy_follows_step_and_min() {
        let integral = SliderWidget::from_range(&RangeAnnotation::new(1.0, 9.0).with_step_size(2.0));
        assert_eq!(integral.accuracy, SliderAccuracy::Integer);
        let no_step = SliderWidget::from_range(&RangeAnnotation::new(1.0, 9.0));
        assert_eq!(no_step.accuracy, SliderAccuracy::Float);
        let fractional_min =
            SliderWidget::from_range(&RangeAnnotation::new(0.5, 9.0).with_step_size(1.0));
        assert_eq!(fractional_min.accuracy, SliderAccuracy::Float);
    }

    #[test]
    fn plain_types_get_plain_widgets() {
        assert_eq!(widget_kind(&attr(AttributeType::BoolArray)), WidgetKind::Boolean);
        assert_eq!(widget_kind(&attr(AttributeType::Int)), WidgetKind::Number);
        assert_eq!(widget_kind(&attr(AttributeType::StringArray)), WidgetKind::Text);
        assert_eq!(widget_kind(&attr(AttributeType::Void)), WidgetKind::Generic);
        assert_eq!(widget_kind(&attr(AttributeType::Unknown)), WidgetKind::Generic);
    }

    #[test]
    fn string_annotations_follow_priority() {
        let file_and_dir = attr(AttributeType::String)
            .with_annotation(Annotation::File)
            .with_annotation(Annotation::Directory);
        assert!(matches!(
            widget_kind(&file_and_dir),
            WidgetKind::Choice(ChoiceWidget { source: ChoiceSource::Directory, .. })
        ));

        let with_enum = file_and_dir.clone().with_annotation(Annotation::Enum(
            EnumAnnotation::new(EnumValues::String(vec!["a".into()]), false),
        ));
        assert!(matches!(
            widget_kind(&with_enum),
            WidgetKind::Choice(ChoiceWidget { source: ChoiceSource::Enum, .. })
        ));

        let colored = with_enum.with_annotation(Annotation::Color);
        assert!(matches!(widget_kind(&colored), WidgetKind::ColorPicker(_)));
    }

    #[test]
    fn enum_default_selects_matching_item() {
        let attribute = attr(AttributeType::Float).with_annotation(heights());
        let defaults = AttributesValuesMap::new().with("/ce/rule/height", DefaultValue::Double(10.0));
        let selection = select_widget(&attribute, Some(&defaults)).unwrap();

        assert_eq!(selection.injection, DefaultInjection::Applied);
        let WidgetKind::Choice(choice) = &selection.widget.kind else {
            panic!("expected choice widget");
        };
        assert_eq!(choice.selected, Some(1));
        assert_eq!(choice.items[1].expression, "\"10\"");
        assert_eq!(selection.widget.default, Some(DefaultValue::Double(10.0)));
    }

    #[test]
    fn enum_default_miss_is_observable() {
        let attribute = attr(AttributeType::Float).with_annotation(heights());
        let defaults = AttributesValuesMap::new().with("/ce/rule/height", DefaultValue::Double(7.0));
        let selection = select_widget(&attribute, Some(&defaults)).unwrap();

        assert_eq!(
            selection.injection,
            DefaultInjection::Unmatched { value: "7".into() }
        );
        let WidgetKind::Choice(choice) = &selection.widget.kind else {
            panic!("expected choice widget");
        };
        assert_eq!(choice.selected, None);
    }

    #[test]
    fn slider_takes_scalar_default() {
        let attribute = attr(AttributeType::Int)
            .with_annotation(Annotation::Range(RangeAnnotation::new(0.0, 20.0)));
        let defaults = AttributesValuesMap::new().with("/ce/rule/height", DefaultValue::Integer(3));
        let selection = select_widget(&attribute, Some(&defaults)).unwrap();
        let WidgetKind::Slider(slider) = selection.widget.kind else {
            panic!("expected slider");
        };
        assert_eq!(slider.value, 3.0);
    }

    #[test]
    fn color_default_is_decoded() {
        let attribute = attr(AttributeType::String).with_annotation(Annotation::Color);
        let defaults =
            AttributesValuesMap::new().with("/ce/rule/height", DefaultValue::String("#FF0000".into()));
        let selection = select_widget(&attribute, Some(&defaults)).unwrap();
        assert_eq!(
            selection.widget.kind,
            WidgetKind::ColorPicker(ColorWidget {
                color: Some(Color::new(255, 0, 0))
            })
        );

        let bad = AttributesValuesMap::new().with("/ce/rule/height", DefaultValue::String("red".into()));
        assert!(matches!(
            select_widget(&attribute, Some(&bad)),
            Err(Error::Parse { .. })
        ));
    }

    #[test]
    fn missing_default_leaves_widget_untouched() {
        let attribute = attr(AttributeType::Bool);
        let selection = select_widget(&attribute, Some(&AttributesValuesMap::new())).unwrap();
        assert_eq!(selection.injection, DefaultInjection::NoDefault);
        assert_eq!(selection.widget.default, None);
        assert!(!selection.widget.access_array);
    }
}
