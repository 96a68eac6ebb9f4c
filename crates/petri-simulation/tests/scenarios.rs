//! Integration scenario tests for the Petri simulation.

use std::collections::BTreeMap;

use petri_core::{DVec2, EntityId, TraitSet, TraitTable, TraitTag};
use petri_simulation::{
    EnvironmentalFactors, Settings, SimConfig, SimEventKind, Simulation, TickPhase,
};

const DT: f64 = 1.0 / 60.0;

fn empty_sim() -> Simulation {
    Simulation::new(
        SimConfig::default().with_initial_cells(0).with_initial_food(0),
        TraitTable::builtin(),
    )
    .unwrap()
}

/// No spawning, no mutation.
fn quiet() -> Settings {
    Settings {
        food_spawning_enabled: false,
        mutation_rate: 0.0,
        ..Settings::default()
    }
}

fn still_cell(sim: &mut Simulation, tag: TraitTag, x: f64, y: f64, energy: f64) -> EntityId {
    let id = sim.add_cell(TraitSet::single(tag), Some(DVec2::new(x, y)));
    sim.edit_cell(id, |c| {
        c.velocity = DVec2::ZERO;
        c.set_energy(energy);
    })
    .unwrap();
    id
}

fn assert_invariants(sim: &Simulation) {
    let arena = sim.config().arena();
    for cell in sim.cells() {
        assert!((0.0..=100.0).contains(&cell.energy()), "{} energy {}", cell.id, cell.energy());
        assert!(!cell.traits().is_empty());
        assert_eq!(cell.traits().as_slice()[0], cell.main_trait());
        assert!(!cell.main_trait().is_auxiliary());
        assert!(cell.position.x >= 0.0 && cell.position.x <= arena.x);
        assert!(cell.position.y >= 0.0 && cell.position.y <= arena.y);
    }
}

// ---------------------------------------------------------------------------
// Scenario A: merge
// ---------------------------------------------------------------------------

#[test]
fn compatible_single_trait_cells_merge() {
    let mut sim = empty_sim();
    let herb = still_cell(&mut sim, TraitTag::Herbivore, 100.0, 100.0, 50.0);
    let omni = still_cell(&mut sim, TraitTag::Omnivore, 105.0, 100.0, 40.0);

    assert!(sim.tick(DT, &quiet()));

    assert_eq!(sim.cells().len(), 1);
    let survivor = sim.cell(herb).unwrap();
    assert_eq!(survivor.traits().as_slice(), &[TraitTag::Herbivore, TraitTag::Omnivore]);
    // 50 + 40/2, then one frame of herbivore decay
    assert!((survivor.energy() - 69.9).abs() < 1e-9);
    assert!((survivor.speed() - 2.25).abs() < 1e-9);
    assert!((survivor.strength() - 42.5).abs() < 1e-9);
    assert_eq!(survivor.receptors().len(), 4);
    assert!(sim.cell(omni).is_none());

    let stats = sim.statistics();
    assert_eq!(stats.merges, 1);
    assert_eq!(stats.deaths, 1);
    assert_eq!(stats.population, 1);

    let merged = sim.events().events_for_entity(omni);
    assert_eq!(merged.len(), 2);
    assert_eq!(merged[1].tick, 1);
    assert_eq!(
        merged[1].kind,
        SimEventKind::Merged {
            survivor: herb,
            absorbed: omni
        }
    );
}

#[test]
fn merge_bonus_setting_scales_speed() {
    let mut sim = empty_sim();
    let herb = still_cell(&mut sim, TraitTag::Herbivore, 100.0, 100.0, 50.0);
    still_cell(&mut sim, TraitTag::Omnivore, 105.0, 100.0, 40.0);
    let settings = Settings {
        merge_speed_bonus: 200.0,
        ..quiet()
    };
    sim.tick(DT, &settings);
    assert!((sim.cell(herb).unwrap().speed() - 3.0).abs() < 1e-9);
}

#[test]
fn incompatible_cells_do_not_merge() {
    let mut sim = empty_sim();
    still_cell(&mut sim, TraitTag::Herbivore, 100.0, 100.0, 50.0);
    still_cell(&mut sim, TraitTag::Herbivore, 104.0, 100.0, 50.0);
    sim.tick(DT, &quiet());
    assert_eq!(sim.cells().len(), 2);
    assert_eq!(sim.statistics().merges, 0);
}

// ---------------------------------------------------------------------------
// Scenario B: reproduction
// ---------------------------------------------------------------------------

#[test]
fn reproduction_halves_parent_energy() {
    let mut sim = empty_sim();
    let parent = still_cell(&mut sim, TraitTag::Herbivore, 400.0, 300.0, 85.0);

    sim.tick(DT, &quiet());

    assert_eq!(sim.cells().len(), 2);
    assert!((sim.cell(parent).unwrap().energy() - 42.45).abs() < 1e-9);
    let child = &sim.cells()[1];
    assert_eq!(child.energy(), 100.0);
    assert_eq!(child.generation, 1);
    assert_eq!(child.traits(), sim.cell(parent).unwrap().traits());
    assert!((child.position.x - 400.0).abs() <= 10.0);
    assert!((child.position.y - 300.0).abs() <= 10.0);

    let stats = sim.statistics();
    assert_eq!(stats.births, 1);
    assert_eq!(stats.deaths, 0);
    assert_eq!(stats.generation, 1);
    assert_eq!(stats.max_population, 2);
}

#[test]
fn reproduction_threshold_setting_is_respected() {
    let mut sim = empty_sim();
    still_cell(&mut sim, TraitTag::Herbivore, 400.0, 300.0, 85.0);
    let settings = Settings {
        reproduction_threshold: 90.0,
        ..quiet()
    };
    sim.tick(DT, &settings);
    assert_eq!(sim.cells().len(), 1);
}

#[test]
fn offspring_near_wall_is_clamped_inside() {
    let mut sim = empty_sim();
    still_cell(&mut sim, TraitTag::Carnivore, 9.0, 9.0, 100.0);
    sim.tick(DT, &quiet());
    assert_eq!(sim.cells().len(), 2);
    let child = &sim.cells()[1];
    assert!(child.position.x >= 9.0 && child.position.y >= 9.0);
}

// ---------------------------------------------------------------------------
// Scenario C: starvation
// ---------------------------------------------------------------------------

#[test]
fn starving_cell_is_removed_and_counted() {
    let mut sim = empty_sim();
    let id = still_cell(&mut sim, TraitTag::Carnivore, 400.0, 300.0, 0.5);
    sim.select(id).unwrap();
    // Carnivore loss 0.2 at five times the energy cost is one unit per frame.
    let settings = Settings {
        energy_cost: 5.0,
        ..quiet()
    };

    sim.tick(DT, &settings);

    assert!(sim.cells().is_empty());
    assert_eq!(sim.statistics().deaths, 1);
    assert_eq!(sim.statistics().population, 0);
    assert!(sim.selected().is_none());
    assert_eq!(
        sim.events()
            .count(|k| matches!(k, SimEventKind::Starved { cell } if *cell == id)),
        1
    );
}

#[test]
fn zero_temperature_stops_decay() {
    let mut sim = empty_sim();
    let id = still_cell(&mut sim, TraitTag::Carnivore, 400.0, 300.0, 50.0);
    let settings = Settings {
        environmental_factors: EnvironmentalFactors {
            temperature: 0.0,
            ..EnvironmentalFactors::default()
        },
        ..quiet()
    };
    sim.run(100, DT, &settings);
    assert_eq!(sim.cell(id).unwrap().energy(), 50.0);
}

// ---------------------------------------------------------------------------
// Scenario D: predation
// ---------------------------------------------------------------------------

#[test]
fn predator_gain_is_capped() {
    let mut sim = empty_sim();
    let carn = still_cell(&mut sim, TraitTag::Carnivore, 100.0, 100.0, 70.0);
    let herb = still_cell(&mut sim, TraitTag::Herbivore, 105.0, 100.0, 100.0);
    let settings = Settings {
        reproduction_threshold: 100.0,
        ..quiet()
    };

    sim.tick(DT, &settings);

    assert!(sim.cell(herb).is_none());
    // min(100, 70 + 50) minus one frame of carnivore decay
    assert!((sim.cell(carn).unwrap().energy() - 99.8).abs() < 1e-9);
    assert_eq!(sim.statistics().deaths, 1);
    assert_eq!(
        sim.events().count(|k| matches!(k, SimEventKind::Preyed { .. })),
        1
    );
}

#[test]
fn predator_pressure_scales_gain() {
    let mut sim = empty_sim();
    let carn = still_cell(&mut sim, TraitTag::Carnivore, 100.0, 100.0, 20.0);
    still_cell(&mut sim, TraitTag::Herbivore, 105.0, 100.0, 100.0);
    let settings = Settings {
        environmental_factors: EnvironmentalFactors {
            predator_pressure: 0.5,
            ..EnvironmentalFactors::default()
        },
        ..quiet()
    };
    sim.tick(DT, &settings);
    assert!((sim.cell(carn).unwrap().energy() - 44.8).abs() < 1e-9);
}

#[test]
fn weaker_hunter_cannot_prey() {
    let mut sim = empty_sim();
    let omni = still_cell(&mut sim, TraitTag::Omnivore, 100.0, 100.0, 50.0);
    let herb = still_cell(&mut sim, TraitTag::Herbivore, 105.0, 100.0, 50.0);
    sim.edit_cell(herb, |c| {
        let traits = TraitSet::new([TraitTag::Herbivore, TraitTag::Strong, TraitTag::Carnivore]).unwrap();
        c.set_traits(traits, &TraitTable::builtin());
    })
    .unwrap();
    sim.tick(DT, &quiet());
    assert!(sim.cell(herb).is_some());
    assert!((sim.cell(omni).unwrap().energy() - 49.85).abs() < 1e-9);
    assert_eq!(sim.statistics().deaths, 0);
}

#[test]
fn lower_id_decides_between_merge_and_predation() {
    // The omnivore acts first and absorbs the carnivore.
    let mut sim = empty_sim();
    let omni = still_cell(&mut sim, TraitTag::Omnivore, 100.0, 100.0, 50.0);
    let carn = still_cell(&mut sim, TraitTag::Carnivore, 105.0, 100.0, 50.0);
    sim.tick(DT, &quiet());
    assert!(sim.cell(carn).is_none());
    assert_eq!(
        sim.cell(omni).unwrap().traits().as_slice(),
        &[TraitTag::Omnivore, TraitTag::Carnivore]
    );
    assert_eq!(sim.statistics().merges, 1);

    // The carnivore acts first and eats the omnivore.
    let mut sim = empty_sim();
    let carn = still_cell(&mut sim, TraitTag::Carnivore, 100.0, 100.0, 50.0);
    let omni = still_cell(&mut sim, TraitTag::Omnivore, 105.0, 100.0, 50.0);
    sim.tick(DT, &quiet());
    assert!(sim.cell(omni).is_none());
    assert!(sim.cell(carn).is_some());
    assert_eq!(sim.statistics().merges, 0);
    assert_eq!(sim.statistics().deaths, 1);
}

#[test]
fn merge_survivor_is_not_merged_again_in_the_same_tick() {
    // Omnivores that only graze, so every contact is a merge candidate.
    let mut descriptors: BTreeMap<_, _> =
        TraitTable::builtin().iter().map(|(tag, d)| (tag, d.clone())).collect();
    descriptors.get_mut(&TraitTag::Omnivore).unwrap().hunts.clear();
    let table = TraitTable::from_descriptors(descriptors).unwrap();
    let mut sim = Simulation::new(
        SimConfig::default().with_initial_cells(0).with_initial_food(0),
        table,
    )
    .unwrap();

    let herb = still_cell(&mut sim, TraitTag::Herbivore, 100.0, 100.0, 50.0);
    let absorbed = still_cell(&mut sim, TraitTag::Omnivore, 105.0, 100.0, 50.0);
    let late = still_cell(&mut sim, TraitTag::Omnivore, 95.0, 100.0, 50.0);
    sim.tick(DT, &quiet());

    assert!(sim.cell(absorbed).is_none());
    let survivor = sim.cell(herb).unwrap();
    assert_eq!(survivor.traits().as_slice(), &[TraitTag::Herbivore, TraitTag::Omnivore]);
    assert!((survivor.energy() - 74.9).abs() < 1e-9);
    let late = sim.cell(late).unwrap();
    assert_eq!(late.traits().as_slice(), &[TraitTag::Omnivore]);
    assert!((late.energy() - 49.85).abs() < 1e-9);
    assert_eq!(sim.statistics().merges, 1);
    assert_eq!(sim.statistics().deaths, 1);
}

#[test]
fn prey_is_claimed_once() {
    let mut sim = empty_sim();
    let first = still_cell(&mut sim, TraitTag::Carnivore, 100.0, 100.0, 30.0);
    let prey = still_cell(&mut sim, TraitTag::Herbivore, 105.0, 100.0, 100.0);
    let second = still_cell(&mut sim, TraitTag::Carnivore, 110.0, 100.0, 30.0);
    sim.tick(DT, &quiet());

    assert!(sim.cell(prey).is_none());
    assert!((sim.cell(first).unwrap().energy() - 79.8).abs() < 1e-9);
    assert!((sim.cell(second).unwrap().energy() - 29.8).abs() < 1e-9);
    assert_eq!(sim.statistics().deaths, 1);
}

// ---------------------------------------------------------------------------
// Food
// ---------------------------------------------------------------------------

#[test]
fn food_is_eaten_by_first_claimant_only() {
    let mut sim = empty_sim();
    let a = still_cell(&mut sim, TraitTag::Herbivore, 100.0, 100.0, 40.0);
    let food = sim.spawn_food(Some(DVec2::new(104.0, 100.0)));
    let b = still_cell(&mut sim, TraitTag::Herbivore, 108.0, 100.0, 40.0);

    sim.tick(DT, &quiet());

    assert!(sim.food().is_empty());
    assert!((sim.cell(a).unwrap().energy() - 69.9).abs() < 1e-9);
    assert!((sim.cell(b).unwrap().energy() - 39.9).abs() < 1e-9);
    assert_eq!(sim.statistics().food_eaten, 1);
    assert_eq!(sim.events().events_for_entity(food).len(), 2);
}

#[test]
fn carnivores_ignore_food() {
    let mut sim = empty_sim();
    still_cell(&mut sim, TraitTag::Carnivore, 100.0, 100.0, 40.0);
    sim.spawn_food(Some(DVec2::new(101.0, 100.0)));
    sim.tick(DT, &quiet());
    assert_eq!(sim.food().len(), 1);
}

#[test]
fn herbivore_steers_toward_food() {
    let mut sim = empty_sim();
    let id = still_cell(&mut sim, TraitTag::Herbivore, 100.0, 100.0, 40.0);
    sim.spawn_food(Some(DVec2::new(110.0, 100.0)));
    sim.tick(DT, &quiet());
    let cell = sim.cell(id).unwrap();
    assert!((cell.velocity - DVec2::new(1.5, 0.0)).length() < 1e-9);
    assert!((cell.position.x - 101.5).abs() < 1e-9);
}

// ---------------------------------------------------------------------------
// Conservation and invariants
// ---------------------------------------------------------------------------

#[test]
fn population_changes_only_by_births_and_deaths() {
    let mut sim = empty_sim();
    for i in 0..8 {
        let x = 50.0 + 90.0 * i as f64;
        sim.add_cell(TraitSet::single(TraitTag::Herbivore), Some(DVec2::new(x, 300.0)));
    }
    let initial = sim.cells().len() as i64;
    // Parents fall to half energy and starve within the run.
    let settings = Settings {
        energy_cost: 5.0,
        ..quiet()
    };

    for _ in 0..150 {
        sim.tick(DT, &settings);
        let c = sim.counters();
        assert_eq!(sim.cells().len() as i64, initial + c.births as i64 - c.deaths as i64);
        assert_eq!(c.merges, 0);
        assert_eq!(c.food_eaten, 0);
        assert_invariants(&sim);
    }
    let born = sim.events().count(|k| matches!(k, SimEventKind::Born { .. }));
    assert_eq!(born as u64, sim.counters().births);
}

#[test]
fn seeded_world_keeps_invariants_with_mutation() {
    let mut sim = Simulation::new(SimConfig::default().with_seed(3), TraitTable::builtin()).unwrap();
    let settings = Settings {
        mutation_rate: 0.5,
        food_spawn_rate: 20.0,
        ..Settings::default()
    };
    for _ in 0..200 {
        sim.tick(DT, &settings);
        assert_invariants(&sim);
        assert_eq!(sim.phase(), TickPhase::Indexing);
    }
    let c = sim.counters();
    assert_eq!(sim.cells().len() as i64, 10 + c.births as i64 - c.deaths as i64);
    assert!(c.max_population >= sim.cells().len());
    let mutated = sim.events().count(|k| matches!(k, SimEventKind::Mutated { .. }));
    assert!(mutated as u64 <= c.births);
}

#[test]
fn snapshot_is_in_id_order_and_serializes() {
    let mut sim = Simulation::new(SimConfig::default(), TraitTable::builtin()).unwrap();
    sim.run(50, DT, &Settings::default());
    let snapshot = sim.snapshot();
    assert_eq!(snapshot.tick, 50);
    assert!(snapshot.cells.windows(2).all(|w| w[0].id < w[1].id));
    assert!(snapshot.food.windows(2).all(|w| w[0].id < w[1].id));
    for view in &snapshot.cells {
        assert_eq!(view.velocity, sim.cell(view.id).unwrap().velocity);
    }
    let json = snapshot.to_json().unwrap();
    assert!(json.starts_with("{\"tick\":50,"));
    assert!(json.contains("\"velocity\":["));
}
