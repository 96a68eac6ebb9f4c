use std::collections::BTreeSet;
use std::fmt::Display;
use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use petri_core::{TraitDescriptor, TraitTable};

pub fn run(path: Option<&Path>, json: bool) -> Result<(), String> {
    let table = super::load_table(path)?;

    if json {
        let text = table.to_json_pretty().map_err(|e| format!("JSON error: {e}"))?;
        println!("{text}");
        return Ok(());
    }

    let source = path.map_or_else(|| "built-in".to_string(), |p| p.display().to_string());
    println!("  {} {}", "Trait Table".bold(), format!("({source})").dimmed());
    println!();
    println!("{}", render(&table));
    Ok(())
}

fn render(table: &TraitTable) -> Table {
    let mut out = Table::new();
    out.set_content_arrangement(ContentArrangement::Dynamic);
    out.set_header(vec![
        "Trait",
        "Size",
        "Speed",
        "Strength",
        "Loss/frame",
        "Eats",
        "Hunts",
        "Merges with",
        "Modifier",
    ]);
    for (tag, d) in table.iter() {
        out.add_row(vec![
            tag.to_string(),
            d.base_size.to_string(),
            d.base_speed.to_string(),
            d.strength.to_string(),
            d.energy_loss.to_string(),
            join(&d.eats),
            join(&d.hunts),
            join(&d.compatible_with),
            modifier(d),
        ]);
    }
    out
}

fn join<T: Display>(set: &BTreeSet<T>) -> String {
    if set.is_empty() {
        return "--".to_string();
    }
    set.iter().map(|t| t.to_string()).collect::<Vec<_>>().join(", ")
}

fn modifier(d: &TraitDescriptor) -> String {
    let parts: Vec<String> = [
        d.speed_bonus.map(|v| format!("speed x{v}")),
        d.loss_factor.map(|v| format!("loss x{v}")),
        d.strength_bonus.map(|v| format!("strength x{v}")),
    ]
    .into_iter()
    .flatten()
    .collect();
    if parts.is_empty() {
        "--".to_string()
    } else {
        parts.join(", ")
    }
}
