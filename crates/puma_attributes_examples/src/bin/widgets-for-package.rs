use puma_attributes::prelude::*;
use puma_attributes_examples::{demo_engine, init_tracing, DEMO_PACKAGE};

fn main() -> anyhow::Result<()> {
    init_tracing();

    let mut ctx = PrtContext::new(demo_engine());
    ctx.load_package(DEMO_PACKAGE)?;
    let defaults = ctx.default_values(1)?;

    for attribute in ctx.rule_attributes() {
        let selection = select_widget(attribute, defaults.first())?;
        let widget = &selection.widget;
        let kind = match &widget.kind {
            WidgetKind::Slider(s) => format!(
                "slider {}..{} ({:?}) at {}",
                s.min, s.max, s.accuracy, s.value
            ),
            WidgetKind::Choice(c) => {
                let labels: Vec<_> = c.items.iter().map(|i| i.label.as_str()).collect();
                format!("choice {:?} {labels:?} selected {:?}", c.source, c.selected)
            }
            WidgetKind::ColorPicker(c) => {
                format!("color picker {}", c.color.map(|c| c.to_hex()).unwrap_or_default())
            }
            other => format!("{other:?}"),
        };

        println!("{} [{}]", widget.nickname, kind);
        println!("  default: {:?} ({:?})", widget.default, selection.injection);
        for line in widget.description.lines() {
            println!("  | {line}");
        }
    }

    Ok(())
}
