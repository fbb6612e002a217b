use puma_attributes::prelude::*;
use puma_attributes_examples::{demo_engine, init_tracing, DEMO_PACKAGE};
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

fn main() -> anyhow::Result<()> {
    init_tracing();

    let mut ctx = PrtContext::new(demo_engine());
    ctx.load_package(DEMO_PACKAGE)?;

    let find = |name: &str| {
        ctx.find_attribute(name)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("rule attribute {name} missing"))
    };

    // Random heights for five shapes; roofs and colors are given for the first shapes
    // only and repeat for the rest.
    let shape_count = 5;
    let mut rng = StdRng::seed_from_u64(2025);
    let heights: Vec<HostValue> = (0..shape_count)
        .map(|_| HostValue::Number((10.0 + rng.random::<f64>() * 40.0).round()))
        .collect();

    let inputs = [
        AttributeInput::new(find("/ce/rule/height")?, DataTree::from_values(heights)),
        AttributeInput::new(
            find("/ce/rule/roof")?,
            DataTree::from_values(vec!["flat".into(), "hip".into()]),
        ),
        AttributeInput::new(
            find("/ce/rule/facade_color")?,
            DataTree::from_values(vec![Color::new(180, 60, 40).into()]),
        ),
        AttributeInput::new(
            find("/ce/rule/floors")?,
            DataTree::from_values(vec!["many".into()]),
        ),
    ];

    let config = InputConfig::new().with_cast_policy(CastPolicy::SkipAttribute);
    let collected = collect_inputs(&inputs, shape_count, &config)?;
    for err in &collected.skipped {
        println!("skipped: {err}");
    }

    let output = ctx.generate(&collected.map)?;
    for report in output.all_reports() {
        println!("{report}");
    }
    let filter = ReportFilter::new().with_keys(["height\nroof"]);
    for block in output.format_reports(&filter) {
        println!("{block}");
    }
    for (shape, materials) in output.materials.iter().enumerate() {
        for material in materials {
            println!(
                "shape {shape}: diffuse {:?}, transparency {:.2}, texture {:?}",
                material.diffuse.map(|c| c.to_hex()),
                material.transparency(),
                material.textures.diffuse
            );
        }
    }

    Ok(())
}
