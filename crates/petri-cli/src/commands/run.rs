use std::path::PathBuf;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use petri_core::TraitTag;
use petri_simulation::{SimConfig, SimEventKind, Simulation, Statistics};

pub struct RunOptions {
    pub ticks: u64,
    pub seed: u64,
    pub width: f64,
    pub height: f64,
    pub cells: usize,
    pub food: usize,
    pub dt: f64,
    pub settings: Option<PathBuf>,
    pub traits: Option<PathBuf>,
    pub verbose: bool,
    pub json: bool,
}

pub fn run(opts: &RunOptions) -> Result<(), String> {
    let table = super::load_table(opts.traits.as_deref())?;
    let settings = super::load_settings(opts.settings.as_deref())?;

    let config = SimConfig::default()
        .with_seed(opts.seed)
        .with_arena(opts.width, opts.height)
        .with_initial_cells(opts.cells)
        .with_initial_food(opts.food)
        .with_max_events(if opts.verbose { 0 } else { 5000 });

    let mut sim = Simulation::new(config, table).map_err(|e| format!("simulation setup failed: {e}"))?;
    sim.run(opts.ticks, opts.dt, &settings);

    if opts.json {
        let out = serde_json::json!({
            "statistics": sim.statistics(),
            "snapshot": sim.snapshot(),
        });
        let text = serde_json::to_string_pretty(&out).map_err(|e| format!("JSON error: {e}"))?;
        println!("{text}");
        return Ok(());
    }

    // Header
    println!(
        "  {} {}",
        "Simulation".bold(),
        format!(
            "({} ticks, seed={}, arena={}x{})",
            opts.ticks, opts.seed, opts.width, opts.height
        )
        .dimmed()
    );
    println!(
        "  {} cells alive, {} food, {} events logged",
        sim.cells().len(),
        sim.food().len(),
        sim.events().len()
    );
    println!();

    // Events
    if opts.verbose {
        println!("  {}", "Event Log".bold().underline());
        println!();
        for event in sim.events().events() {
            let tick_label = format!("[tick {:>4}]", event.tick).dimmed();
            let desc = colorize_event(&event.kind, &event.description);
            println!("  {tick_label} {desc}");
        }
        println!();
    }

    println!("  {}", "Statistics".bold().underline());
    println!();
    println!("{}", stats_table(sim.statistics()));
    println!();

    if !sim.cells().is_empty() {
        println!("  {}", "Population by Trait".bold().underline());
        println!();
        println!("{}", trait_table(&sim));
        println!();
    }

    Ok(())
}

fn stats_table(stats: &Statistics) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Metric", "Value"]);
    let dominant = stats
        .dominant_trait
        .map(|t| t.to_string())
        .unwrap_or_else(|| "--".to_string());
    let rows: [(&str, String); 11] = [
        ("Tick", stats.tick.to_string()),
        ("Population", stats.population.to_string()),
        ("Food", stats.food_count.to_string()),
        ("Average energy", format!("{:.1}", stats.average_energy)),
        ("Dominant trait", dominant),
        ("Generation", stats.generation.to_string()),
        ("Births", stats.births.to_string()),
        ("Deaths", stats.deaths.to_string()),
        ("Merges", stats.merges.to_string()),
        ("Food eaten", stats.food_eaten.to_string()),
        ("Max population", stats.max_population.to_string()),
    ];
    for (name, value) in rows {
        table.add_row(vec![name.to_string(), value]);
    }
    table
}

fn trait_table(sim: &Simulation) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Main trait", "Cells", "Avg energy", "Multi-trait"]);
    for tag in TraitTag::PRIMARY {
        let cells: Vec<_> = sim.cells().iter().filter(|c| c.main_trait() == tag).collect();
        if cells.is_empty() {
            continue;
        }
        let avg = cells.iter().map(|c| c.energy()).sum::<f64>() / cells.len() as f64;
        let multi = cells.iter().filter(|c| c.traits().len() > 1).count();
        table.add_row(vec![
            tag.to_string(),
            cells.len().to_string(),
            format!("{avg:.1}"),
            multi.to_string(),
        ]);
    }
    table
}

fn colorize_event(kind: &SimEventKind, description: &str) -> colored::ColoredString {
    match kind {
        SimEventKind::Starved { .. } => description.red(),
        SimEventKind::Preyed { .. } => description.red().bold(),
        SimEventKind::Merged { .. } => description.magenta(),
        SimEventKind::Born { .. } => description.green(),
        SimEventKind::Mutated { .. } => description.yellow(),
        SimEventKind::FoodEaten { .. } | SimEventKind::FoodSpawned { .. } => description.dimmed(),
        SimEventKind::Seeded { .. } | SimEventKind::Cleared | SimEventKind::CellAdded { .. } => {
            description.cyan()
        }
    }
}
