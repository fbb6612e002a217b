//! Host-side input values and their extraction into a [`RuleAttributesMap`].
//!
//! Hosts supply one [`DataTree`] of loosely typed [`HostValue`]s per rule attribute.
//! [`collect_inputs`] walks all initial shapes in order and appends one entry per
//! attribute and shape, casting each value to the attribute's declared type.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::attribute::{AttributeType, RuleAttribute};
use crate::codec::ArrayElement;
use crate::color::Color;
use crate::error::{Error, Result};
use crate::rule_map::RuleAttributesMap;
use crate::tree::DataTree;
use crate::values::DefaultValue;

/// A dynamically typed value coming from the host.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub enum HostValue {
    #[default]
    Null,
    Bool(bool),
    Integer(i32),
    Number(f64),
    Text(String),
    Color(Color),
}

impl HostValue {
    pub fn is_valid(&self) -> bool {
        !matches!(self, HostValue::Null)
    }

    /// Numbers are `true` when non-zero; text must read `true`/`false` (or `1`/`0`).
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            HostValue::Bool(v) => Some(*v),
            HostValue::Integer(v) => Some(*v != 0),
            HostValue::Number(v) => Some(*v != 0.0),
            HostValue::Text(t) => bool::parse_token(t).ok(),
            _ => None,
        }
    }

    /// Numbers must be integral and within `i32` range.
    pub fn as_integer(&self) -> Option<i32> {
        match self {
            HostValue::Bool(v) => Some(i32::from(*v)),
            HostValue::Integer(v) => Some(*v),
            HostValue::Number(v) => integral(*v),
            HostValue::Text(t) => i32::parse_token(t)
                .ok()
                .or_else(|| f64::parse_token(t).ok().and_then(integral)),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            HostValue::Bool(v) => Some(if *v { 1.0 } else { 0.0 }),
            HostValue::Integer(v) => Some(f64::from(*v)),
            HostValue::Number(v) => Some(*v),
            HostValue::Text(t) => f64::parse_token(t).ok(),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<String> {
        match self {
            HostValue::Null => None,
            HostValue::Bool(v) => Some(v.to_string()),
            HostValue::Integer(v) => Some(v.to_string()),
            HostValue::Number(v) => Some(v.to_string()),
            HostValue::Text(t) => Some(t.clone()),
            HostValue::Color(c) => Some(c.to_hex()),
        }
    }

    /// Colors, or text holding a hex color.
    pub fn as_color(&self) -> Option<Color> {
        match self {
            HostValue::Color(c) => Some(*c),
            HostValue::Text(t) => Color::from_hex(t).ok(),
            _ => None,
        }
    }
}

fn integral(v: f64) -> Option<i32> {
    if v.fract() == 0.0 && v >= f64::from(i32::MIN) && v <= f64::from(i32::MAX) {
        Some(v as i32)
    } else {
        None
    }
}

/// Casts host values to the declared type of `attribute`.
///
/// Null values are skipped. Array types take every remaining value; scalar types take the
/// first one and yield `Ok(None)` when there is none. Color attributes accept colors or hex
/// text and produce `#RRGGBB`.
pub fn cast_values(attribute: &RuleAttribute, values: &[HostValue]) -> Result<Option<DefaultValue>> {
    let key = attribute.full_name.as_str();
    let cast = |target| move || Error::cast(key, target);
    let present = values.iter().filter(|v| v.is_valid());

    let value = match attribute.attribute_type {
        AttributeType::Bool => {
            first_cast(values, |v| v.as_bool().ok_or_else(cast("bool")))?.map(DefaultValue::Bool)
        }
        AttributeType::Int => {
            first_cast(values, |v| v.as_integer().ok_or_else(cast("integer")))?.map(DefaultValue::Integer)
        }
        AttributeType::Float => {
            first_cast(values, |v| v.as_double().ok_or_else(cast("double")))?.map(DefaultValue::Double)
        }
        AttributeType::String => first_cast(values, |v| cast_text(attribute, v))?.map(DefaultValue::String),
        AttributeType::BoolArray => Some(DefaultValue::BoolArray(
            present
                .map(|v| v.as_bool().ok_or_else(cast("bool array")))
                .collect::<Result<_>>()?,
        )),
        AttributeType::FloatArray => Some(DefaultValue::DoubleArray(
            present
                .map(|v| v.as_double().ok_or_else(cast("double array")))
                .collect::<Result<_>>()?,
        )),
        AttributeType::StringArray => Some(DefaultValue::StringArray(
            present.map(|v| cast_text(attribute, v)).collect::<Result<_>>()?,
        )),
        AttributeType::Void | AttributeType::Unknown => {
            return Err(Error::UnsupportedType {
                attribute: key.to_owned(),
            })
        }
    };
    Ok(value)
}

fn first_cast<T>(values: &[HostValue], cast: impl FnOnce(&HostValue) -> Result<T>) -> Result<Option<T>> {
    values.iter().find(|v| v.is_valid()).map(cast).transpose()
}

fn cast_text(attribute: &RuleAttribute, value: &HostValue) -> Result<String> {
    let key = attribute.full_name.as_str();
    if attribute.is_color() {
        value
            .as_color()
            .map(|c| c.to_hex())
            .ok_or_else(|| Error::cast(key, "color"))
    } else {
        value.as_text().ok_or_else(|| Error::cast(key, "string"))
    }
}

impl From<bool> for HostValue {
    fn from(v: bool) -> Self {
        HostValue::Bool(v)
    }
}

impl From<i32> for HostValue {
    fn from(v: i32) -> Self {
        HostValue::Integer(v)
    }
}

impl From<f64> for HostValue {
    fn from(v: f64) -> Self {
        HostValue::Number(v)
    }
}

impl From<&str> for HostValue {
    fn from(v: &str) -> Self {
        HostValue::Text(v.to_owned())
    }
}

impl From<String> for HostValue {
    fn from(v: String) -> Self {
        HostValue::Text(v)
    }
}

impl From<Color> for HostValue {
    fn from(v: Color) -> Self {
        HostValue::Color(v)
    }
}

/// Reaction to a value that does not cast to its attribute's type.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CastPolicy {
    /// Stop and return the cast error.
    #[default]
    Abort,
    /// Leave the attribute out for that shape and keep going.
    SkipAttribute,
}

/// Input extraction settings.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct InputConfig {
    pub on_cast_error: CastPolicy,
    /// Repeat the last value (or branch) for shapes beyond the supplied data.
    pub repeat_last: bool,
}

impl InputConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cast_policy(mut self, policy: CastPolicy) -> Self {
        self.on_cast_error = policy;
        self
    }

    pub fn with_repeat_last(mut self, repeat_last: bool) -> Self {
        self.repeat_last = repeat_last;
        self
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            on_cast_error: CastPolicy::Abort,
            repeat_last: true,
        }
    }
}

/// Values supplied for one rule attribute.
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeInput {
    pub attribute: RuleAttribute,
    pub tree: DataTree<HostValue>,
}

impl AttributeInput {
    pub fn new(attribute: RuleAttribute, tree: DataTree<HostValue>) -> Self {
        Self { attribute, tree }
    }
}

#[derive(Debug, Default)]
pub struct CollectedInputs {
    pub map: RuleAttributesMap,
    /// Cast errors tolerated under [`CastPolicy::SkipAttribute`].
    pub skipped: Vec<Error>,
}

/// Builds the outbound map for `shape_count` shapes.
///
/// Scalar attributes read their tree as one flat list, item `i` going to shape `i`. Array
/// attributes read branch `i` for shape `i`. Null values are left out.
pub fn collect_inputs(
    inputs: &[AttributeInput],
    shape_count: usize,
    config: &InputConfig,
) -> Result<CollectedInputs> {
    let scalars: Vec<Vec<&HostValue>> = inputs.iter().map(|i| i.tree.items().collect()).collect();

    let mut collected = CollectedInputs::default();
    for shape in 0..shape_count {
        collected.map.start_shape();
        for (input, items) in inputs.iter().zip(&scalars) {
            let attribute = &input.attribute;
            let outcome = if attribute.is_array() {
                match pick(input.tree.branches(), shape, config.repeat_last) {
                    Some(branch) => collected.map.add_values(attribute, branch),
                    None => Ok(()),
                }
            } else {
                match pick(items, shape, config.repeat_last) {
                    Some(value) if value.is_valid() => collected.map.add_value(attribute, value),
                    _ => Ok(()),
                }
            };

            if let Err(err) = outcome {
                match config.on_cast_error {
                    CastPolicy::Abort => return Err(err),
                    CastPolicy::SkipAttribute => {
                        warn!(attribute = %attribute.full_name, shape, "{err}");
                        collected.skipped.push(err);
                    }
                }
            }
        }
    }
    Ok(collected)
}

fn pick<T>(items: &[T], index: usize, repeat_last: bool) -> Option<&T> {
    items
        .get(index)
        .or_else(|| if repeat_last { items.last() } else { None })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::AttributeType;
    use crate::codec::decode_array;

    fn input(name: &str, ty: AttributeType, branches: Vec<Vec<HostValue>>) -> AttributeInput {
        AttributeInput::new(
            RuleAttribute::new(name, name, "rules/main.cga", ty),
            DataTree::from_branches(branches),
        )
    }

    #[test]
    fn casts_follow_host_conventions() {
        assert_eq!(HostValue::Number(0.0).as_bool(), Some(false));
        assert_eq!(HostValue::from("TRUE").as_bool(), Some(true));
        assert_eq!(HostValue::Number(4.0).as_integer(), Some(4));
        assert_eq!(HostValue::Number(4.5).as_integer(), None);
        assert_eq!(HostValue::from("7").as_integer(), Some(7));
        assert_eq!(HostValue::from(" 2.5 ").as_double(), Some(2.5));
        assert_eq!(HostValue::from(Color::WHITE).as_text().as_deref(), Some("#FFFFFF"));
        assert_eq!(HostValue::Null.as_text(), None);
        assert_eq!(HostValue::from("#000").as_color(), Some(Color::BLACK));
    }

    #[test]
    fn cast_values_follows_declared_type() {
        let floors = RuleAttribute::new("floors", "floors", "rules/main.cga", AttributeType::Int);
        assert_eq!(
            cast_values(&floors, &[HostValue::Null, 4.0.into(), 9.into()]).unwrap(),
            Some(DefaultValue::Integer(4))
        );
        assert_eq!(cast_values(&floors, &[HostValue::Null]).unwrap(), None);

        let names = RuleAttribute::new("names", "names", "rules/main.cga", AttributeType::StringArray);
        assert_eq!(
            cast_values(&names, &["a".into(), HostValue::Null, 2.into()]).unwrap(),
            Some(DefaultValue::StringArray(vec!["a".into(), "2".into()]))
        );
        assert_eq!(
            cast_values(&names, &[]).unwrap(),
            Some(DefaultValue::StringArray(Vec::new()))
        );

        let facade = RuleAttribute::new("facade", "facade", "rules/main.cga", AttributeType::String)
            .with_annotation(crate::annotation::Annotation::Color);
        assert_eq!(
            cast_values(&facade, &[Color::new(0, 0, 255).into()]).unwrap(),
            Some(DefaultValue::String("#0000FF".into()))
        );
        assert!(matches!(
            cast_values(&facade, &["blue".into()]),
            Err(Error::Cast { target: "color", .. })
        ));
    }

    #[test]
    fn scalar_values_go_to_shapes_in_order() {
        let inputs = [input(
            "height",
            AttributeType::Float,
            vec![vec![1.0.into()], vec![2.0.into()]],
        )];
        let collected = collect_inputs(&inputs, 3, &InputConfig::default()).unwrap();
        let doubles = &collected.map.buffers().doubles;
        assert_eq!(doubles.values(), &[1.0, 2.0, 2.0]);
        assert_eq!(doubles.starts(), &[0, 1, 2]);
    }

    #[test]
    fn no_repeat_leaves_later_shapes_empty() {
        let inputs = [input("height", AttributeType::Float, vec![vec![1.0.into()]])];
        let config = InputConfig::new().with_repeat_last(false);
        let collected = collect_inputs(&inputs, 2, &config).unwrap();
        let doubles = &collected.map.buffers().doubles;
        assert_eq!(doubles.values(), &[1.0]);
        assert_eq!(doubles.shape_range(1), Some(1..1));
    }

    #[test]
    fn array_branches_go_to_shapes() {
        let inputs = [input(
            "levels",
            AttributeType::FloatArray,
            vec![vec![1.0.into(), 2.0.into()], vec![3.0.into()]],
        )];
        let collected = collect_inputs(&inputs, 2, &InputConfig::default()).unwrap();
        let encoded = collected.map.buffers().double_arrays.values();
        assert_eq!(decode_array::<f64>(&encoded[0]).unwrap(), vec![1.0, 2.0]);
        assert_eq!(decode_array::<f64>(&encoded[1]).unwrap(), vec![3.0]);
    }

    #[test]
    fn nulls_are_not_submitted() {
        let inputs = [input("roof", AttributeType::String, vec![vec![HostValue::Null]])];
        let collected = collect_inputs(&inputs, 1, &InputConfig::default()).unwrap();
        assert!(collected.map.is_empty());
        assert_eq!(collected.map.shape_count(), 1);
    }

    #[test]
    fn cast_policy_decides_between_abort_and_skip() {
        let inputs = [
            input("height", AttributeType::Float, vec![vec!["tall".into()]]),
            input("floors", AttributeType::Int, vec![vec![3.into()]]),
        ];

        let err = collect_inputs(&inputs, 1, &InputConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Cast { ref attribute, .. } if attribute == "height"));

        let config = InputConfig::new().with_cast_policy(CastPolicy::SkipAttribute);
        let collected = collect_inputs(&inputs, 1, &config).unwrap();
        assert_eq!(collected.skipped.len(), 1);
        assert!(collected.map.buffers().doubles.is_empty());
        assert_eq!(collected.map.buffers().integers.values(), &[3]);
    }
}
