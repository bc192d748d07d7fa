//#![doc = include_str!("../../README.md")]

pub mod core;
pub mod io;

pub mod prelude {
    pub use crate::core::*;
    pub use crate::io::*;
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn greeting(tool: &str) {
    use comfy_table::modifiers::UTF8_ROUND_CORNERS;
    use comfy_table::presets::UTF8_FULL;
    use comfy_table::{Attribute, Cell, Table};

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .add_row(vec![
            Cell::new("SISF - Self-Intermediate Scattering Function").add_attributes(vec![Attribute::Bold])
        ])
        .add_row(vec![format!(
            "{}\n{}",
            env!("CARGO_PKG_HOMEPAGE"),
            env!("CARGO_PKG_AUTHORS")
        )])
        .add_row(vec![format!("SISF version: {}", VERSION)])
        .add_row(vec![format!(
            "Tool: {tool}"
        )]);
    println!("{table}");
}
