use puma_attributes::prelude::*;
use puma_attributes_examples::{demo_engine, init_tracing, print_tree, DEMO_PACKAGE};
use tracing::info;

fn main() -> anyhow::Result<()> {
    init_tracing();

    // Shape 2 sits on a narrow lot and gets a lower authored height.
    let engine = demo_engine().with_shape_default(2, "/ce/rule/height", DefaultValue::Double(9.0));
    let mut ctx = PrtContext::new(engine);
    ctx.load_package(DEMO_PACKAGE)?;

    let shape_count = 4;
    let maps = ctx.default_values(shape_count)?;
    info!(
        shapes = shape_count,
        attributes = ctx.rule_attributes().len(),
        "fetched defaults"
    );

    for attribute in ctx.rule_attributes() {
        let key = attribute.full_name.as_str();
        let title = format!("{} ({:?})", attribute.nickname, attribute.attribute_type);
        match attribute.attribute_type {
            AttributeType::Bool | AttributeType::BoolArray => {
                print_tree(&title, &default_booleans(key, &maps, attribute.is_array()))
            }
            AttributeType::Int => print_tree(&title, &default_integers(key, &maps, false)),
            AttributeType::Float | AttributeType::FloatArray => {
                print_tree(&title, &default_doubles(key, &maps, attribute.is_array()))
            }
            AttributeType::String if attribute.is_color() => {
                print_tree(&title, &default_colors(key, &maps)?)
            }
            AttributeType::String | AttributeType::StringArray => {
                print_tree(&title, &default_strings(key, &maps, attribute.is_array()))
            }
            AttributeType::Void | AttributeType::Unknown => {}
        }
    }

    Ok(())
}
