use std::io::{self, Write};

use backdrop_core::HeadlessPage;
use backdrop_protocol::{LayerSpec, LayerStyle, StackLevel};

fn stack_label(stack: StackLevel) -> &'static str {
    match stack {
        StackLevel::Parked => "parked",
        StackLevel::InView => "in-view",
    }
}

fn format_style(style: &LayerStyle) -> String {
    format!(
        "y={:>6.1}% o={:.2} {:<7}",
        style.y_percent,
        style.opacity,
        stack_label(style.stack)
    )
}

pub fn write_header(out: &mut impl Write, layers: &[LayerSpec]) -> io::Result<()> {
    for layer in layers {
        writeln!(out, "# {:<6} url(/{})", layer.id, layer.image)?;
    }
    Ok(())
}

/// One line per scroll position: every mounted layer in mount order.
pub fn write_step(out: &mut impl Write, scroll_top: f64, page: &HeadlessPage) -> io::Result<()> {
    write!(out, "{scroll_top:>7.0}")?;
    for (id, layer) in page.layers() {
        write!(out, " | {id:<6} {}", format_style(&layer.style))?;
    }
    writeln!(out)
}
