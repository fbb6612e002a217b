#![forbid(unsafe_code)]

use puma_attributes::prelude::*;
use tracing_subscriber::EnvFilter;

/// Path under which [`demo_engine`] registers [`demo_package`].
pub const DEMO_PACKAGE: &str = "packages/extrude_building.rpk";

const RULE_FILE: &str = "rules/extrude_building.cga";

/// Installs a formatting subscriber. `RUST_LOG` overrides the default `info` level.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// A small building rule with one attribute per widget flavor.
pub fn demo_package() -> RulePackage {
    let attr = |name: &str, ty| RuleAttribute::new(format!("/ce/rule/{name}"), name, RULE_FILE, ty);

    RulePackage::new()
        .with_attribute(
            attr("height", AttributeType::Float)
                .with_group("Massing")
                .with_annotation(Annotation::Range(
                    RangeAnnotation::new(3.0, 60.0).with_step_size(1.0),
                )),
            Some(DefaultValue::Double(18.0)),
        )
        .with_attribute(
            attr("floors", AttributeType::Int).with_group("Massing"),
            Some(DefaultValue::Integer(6)),
        )
        .with_attribute(
            attr("roof", AttributeType::String)
                .with_group("Roof")
                .with_annotation(Annotation::Enum(EnumAnnotation::new(
                    EnumValues::String(vec!["flat".into(), "gable".into(), "hip".into()]),
                    true,
                ))),
            Some(DefaultValue::String("gable".into())),
        )
        .with_attribute(
            attr("facade_color", AttributeType::String)
                .with_group("Facade")
                .with_annotation(Annotation::Color),
            Some(DefaultValue::String("#D9C8A9".into())),
        )
        .with_attribute(
            attr("texture", AttributeType::String)
                .with_group("Facade")
                .with_annotation(Annotation::File),
            Some(DefaultValue::String("assets/brick.jpg".into())),
        )
        .with_attribute(
            attr("balconies", AttributeType::Bool),
            Some(DefaultValue::Bool(false)),
        )
        .with_attribute(
            attr("floor_heights", AttributeType::FloatArray).with_group("Massing"),
            Some(DefaultValue::DoubleArray(vec![4.0, 3.0, 3.0])),
        )
        .with_attribute(
            attr("signage", AttributeType::StringArray),
            Some(DefaultValue::StringArray(vec!["CAFE".into(), "OPEN; DAILY".into()])),
        )
        .with_material(MaterialBuffers {
            texture_keys: vec!["colorMap".into(), "opacityMap".into()],
            texture_paths: vec!["assets/brick.jpg".into(), "assets/brick.jpg".into()],
            diffuse: vec![217, 200, 169],
            ambient: vec![20, 20, 20],
            ..MaterialBuffers::default()
        })
}

/// An in-memory engine with [`demo_package`] registered under [`DEMO_PACKAGE`].
pub fn demo_engine() -> MemoryEngine {
    MemoryEngine::new().with_package(DEMO_PACKAGE, demo_package())
}

/// Prints one line per branch, prefixed with the shape index.
pub fn print_tree<T: std::fmt::Debug>(title: &str, tree: &DataTree<T>) {
    println!("{title}:");
    for (shape, branch) in tree.branches().iter().enumerate() {
        println!("  {{{shape}}} {branch:?}");
    }
}
