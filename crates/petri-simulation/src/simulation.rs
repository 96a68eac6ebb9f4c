use std::collections::BTreeSet;
use std::fmt;

use glam::DVec2;
use petri_core::cell::{
    Cell, Interaction, InteractionRules, Neighbor, PREDATION_ENERGY_GAIN, UpdateParams, clamp_into,
};
use petri_core::entity::{EntityId, EntityKey, IdAllocator};
use petri_core::food::{FOOD_RADIUS, Food};
use petri_core::geometry::Rect;
use petri_core::traits::{TraitSet, TraitTable, TraitTag};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::clock::{SimClock, frame_scale, sanitize_dt};
use crate::config::SimConfig;
use crate::context::TickContext;
use crate::error::{SimError, SimResult};
use crate::event::{EventLog, SimEvent, SimEventKind};
use crate::settings::Settings;
use crate::snapshot::{CellView, FoodView, FrameSnapshot};
use crate::spatial::QuadTree;
use crate::stats::{Counters, FpsMeter, Statistics};

/// Where the engine is in its tick cycle.
///
/// A tick runs `Indexing → Spawning → Updating → Committing` and comes back
/// to `Indexing`. Between ticks the engine rests in `Indexing`, or in `Idle`
/// while paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TickPhase {
    /// Paused; ticks are ignored.
    Idle,
    /// Rebuilding the spatial index from live entities.
    Indexing,
    /// Rolling for a new food particle.
    Spawning,
    /// Running every cell against the start-of-tick snapshot.
    Updating,
    /// Applying removals and births, then recomputing statistics.
    Committing,
}

/// Removals and births collected during the update phase.
#[derive(Debug, Default)]
struct TickOutcome {
    dead: BTreeSet<EntityId>,
    eaten: BTreeSet<EntityId>,
    /// Merge survivors; no longer single-trait, so never merge partners again this tick.
    merged: BTreeSet<EntityId>,
    births: Vec<Cell>,
    merges: u64,
}

/// The simulation engine.
///
/// Owns every cell and food particle, the spatial index, the seeded RNG,
/// the event log and the running statistics. Cells and food are kept in
/// ascending id order, which is also draw order.
pub struct Simulation {
    config: SimConfig,
    table: TraitTable,
    cells: Vec<Cell>,
    food: Vec<Food>,
    index: QuadTree<EntityKey>,
    ids: IdAllocator,
    clock: SimClock,
    rng: StdRng,
    events: EventLog,
    counters: Counters,
    fps: FpsMeter,
    stats: Statistics,
    selected: Option<EntityId>,
    paused: bool,
    phase: TickPhase,
    last_clamped: Option<Settings>,
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("tick", &self.clock.tick())
            .field("phase", &self.phase)
            .field("cells", &self.cells.len())
            .field("food", &self.food.len())
            .field("events", &self.events.len())
            .finish()
    }
}

impl Simulation {
    /// Create an engine and seed the initial population.
    pub fn new(config: SimConfig, table: TraitTable) -> SimResult<Self> {
        config.validate(&table)?;
        let stats = Statistics::compute(0, &[], 0, &Counters::default(), 0.0);
        let mut sim = Self {
            index: QuadTree::new(config.bounds()),
            rng: StdRng::seed_from_u64(config.seed),
            events: EventLog::new(config.max_events),
            config,
            table,
            cells: Vec::new(),
            food: Vec::new(),
            ids: IdAllocator::new(),
            clock: SimClock::new(),
            counters: Counters::default(),
            fps: FpsMeter::new(),
            stats,
            selected: None,
            paused: false,
            phase: TickPhase::Indexing,
            last_clamped: None,
        };
        sim.reset();
        Ok(sim)
    }

    /// Clear everything and reseed from the configured seed.
    ///
    /// Resets ids, the tick counter, counters, events and selection. A paused
    /// engine stays paused.
    pub fn reset(&mut self) {
        self.cells.clear();
        self.food.clear();
        self.ids.reset();
        self.clock.reset();
        self.rng = StdRng::seed_from_u64(self.config.seed);
        self.events.clear();
        self.counters = Counters::default();
        self.fps.reset();
        self.selected = None;

        for _ in 0..self.config.initial_cells {
            let main = TraitTag::PRIMARY[self.rng.random_range(0..TraitTag::PRIMARY.len())];
            self.place_cell(TraitSet::single(main), None);
        }
        for _ in 0..self.config.initial_food {
            self.place_food(None);
        }
        self.counters.added = self.cells.len() as u64;
        self.counters.max_population = self.cells.len();

        let (cells, food) = (self.cells.len(), self.food.len());
        self.emit(
            SimEventKind::Seeded { cells, food },
            format!("seeded {cells} cells and {food} food"),
        );
        info!(seed = self.config.seed, cells, food, "world reset");

        self.phase = if self.paused {
            TickPhase::Idle
        } else {
            TickPhase::Indexing
        };
        self.refresh();
    }

    /// Advance one tick of `dt` host seconds. Returns `false` if paused.
    pub fn tick(&mut self, dt: f64, settings: &Settings) -> bool {
        if self.paused {
            return false;
        }
        let settings = self.sanitize(settings);
        let dt = sanitize_dt(dt);
        self.fps.record(dt);
        let tick = self.clock.advance(dt);

        self.phase = TickPhase::Indexing;
        self.rebuild_index();

        self.phase = TickPhase::Spawning;
        self.spawn_phase(&settings);

        self.phase = TickPhase::Updating;
        let outcome = self.update_phase(&settings, dt, tick);

        self.phase = TickPhase::Committing;
        self.commit(outcome, tick);

        self.phase = TickPhase::Indexing;
        true
    }

    /// Advance up to `n` ticks. Returns how many actually ran.
    pub fn run(&mut self, n: u64, dt: f64, settings: &Settings) -> u64 {
        let mut ran = 0;
        for _ in 0..n {
            if !self.tick(dt, settings) {
                break;
            }
            ran += 1;
        }
        ran
    }

    // -- Commands ---------------------------------------------------------

    /// Stop ticking until [`Simulation::resume`].
    pub fn pause(&mut self) {
        self.paused = true;
        self.phase = TickPhase::Idle;
    }

    /// Continue ticking.
    pub fn resume(&mut self) {
        self.paused = false;
        self.phase = TickPhase::Indexing;
    }

    /// Flip the pause state. Returns `true` if now paused.
    pub fn toggle_pause(&mut self) -> bool {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
        self.paused
    }

    /// Place a full-energy cell. Without a position it lands somewhere
    /// random; a given position is clamped into the arena.
    pub fn add_cell(&mut self, traits: TraitSet, position: Option<DVec2>) -> EntityId {
        let id = self.place_cell(traits, position);
        self.counters.added += 1;
        self.counters.max_population = self.counters.max_population.max(self.cells.len());
        self.emit(SimEventKind::CellAdded { cell: id }, format!("cell {id} added"));
        self.refresh();
        id
    }

    /// [`Simulation::add_cell`] from raw tags, main trait first.
    pub fn add_cell_tags(&mut self, tags: &[TraitTag], position: Option<DVec2>) -> SimResult<EntityId> {
        let traits = TraitSet::new(tags.iter().copied())?;
        Ok(self.add_cell(traits, position))
    }

    /// Place a food particle, ignoring the spawn cap.
    pub fn spawn_food(&mut self, position: Option<DVec2>) -> EntityId {
        let id = self.place_food(position);
        self.emit(SimEventKind::FoodSpawned { food: id }, format!("food {id} placed"));
        self.refresh();
        id
    }

    /// Apply `edit` to a live cell, then clamp it back into the arena.
    pub fn edit_cell<R>(&mut self, id: EntityId, edit: impl FnOnce(&mut Cell) -> R) -> SimResult<R> {
        let i = position_of(&self.cells, id, |c| c.id).ok_or(SimError::CellNotFound(id))?;
        let arena = self.config.arena();
        let cell = &mut self.cells[i];
        let out = edit(cell);
        cell.position = clamp_into(cell.position, cell.radius(), arena);
        self.refresh();
        Ok(out)
    }

    /// Remove every cell and food particle. Counters and the tick are kept.
    pub fn clear_all(&mut self) {
        self.cells.clear();
        self.food.clear();
        self.selected = None;
        self.emit(SimEventKind::Cleared, "all cells and food removed");
        self.refresh();
    }

    /// Select a live cell for inspection.
    pub fn select(&mut self, id: EntityId) -> SimResult<()> {
        if self.cell(id).is_none() {
            return Err(SimError::CellNotFound(id));
        }
        self.selected = Some(id);
        Ok(())
    }

    /// Drop the selection.
    pub fn deselect(&mut self) {
        self.selected = None;
    }

    /// Select whatever [`Simulation::pick`] finds at `point`, or nothing.
    pub fn select_at(&mut self, point: DVec2) -> Option<EntityId> {
        self.selected = self.pick(point);
        self.selected
    }

    // -- Queries ----------------------------------------------------------

    /// The topmost cell whose body contains `point`. Later ids draw on top.
    pub fn pick(&self, point: DVec2) -> Option<EntityId> {
        let reach = self.table.largest_radius();
        self.index
            .query(&Rect::centered(point, reach))
            .into_iter()
            .filter_map(|key| match key {
                EntityKey::Cell(id) => self.cell(id),
                EntityKey::Food(_) => None,
            })
            .filter(|c| c.position.distance(point) <= c.radius())
            .map(|c| c.id)
            .max()
    }

    /// A live cell by id.
    pub fn cell(&self, id: EntityId) -> Option<&Cell> {
        position_of(&self.cells, id, |c| c.id).map(|i| &self.cells[i])
    }

    /// The selected cell, if it is still alive.
    pub fn selected(&self) -> Option<&Cell> {
        self.selected.and_then(|id| self.cell(id))
    }

    /// Live cells in id order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Live food in id order.
    pub fn food(&self) -> &[Food] {
        &self.food
    }

    /// Committed state for rendering.
    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            tick: self.clock.tick(),
            cells: self.cells.iter().map(CellView::from).collect(),
            food: self.food.iter().map(FoodView::from).collect(),
            selected: self.selected,
        }
    }

    /// Statistics as of the last commit or command.
    pub fn statistics(&self) -> &Statistics {
        &self.stats
    }

    /// Recorded events.
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Running totals since reset.
    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    /// Number of committed ticks since reset.
    pub fn current_tick(&self) -> u64 {
        self.clock.tick()
    }

    /// Current phase.
    pub fn phase(&self) -> TickPhase {
        self.phase
    }

    /// `true` while paused.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// The run configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// The trait table in use.
    pub fn table(&self) -> &TraitTable {
        &self.table
    }

    // -- Tick phases ------------------------------------------------------

    fn spawn_phase(&mut self, settings: &Settings) {
        if !settings.food_spawning_enabled || self.food.len() >= self.config.max_food {
            return;
        }
        if self.rng.random::<f64>() < settings.food_spawn_chance() {
            let id = self.place_food(None);
            self.emit(SimEventKind::FoodSpawned { food: id }, format!("food {id} spawned"));
        }
    }

    fn update_phase(&mut self, settings: &Settings, dt: f64, tick: u64) -> TickOutcome {
        let env = settings.environmental_factors;
        let params = UpdateParams {
            arena: self.config.arena(),
            energy_decay_scale: env.temperature * settings.energy_cost * frame_scale(dt),
            reproduction_threshold: settings.reproduction_threshold,
            mutation_rate: settings.mutation_rate,
        };
        let rules = InteractionRules {
            predation_gain: PREDATION_ENERGY_GAIN * env.predator_pressure,
            merge_speed_multiplier: settings.merge_speed_multiplier(),
        };

        let Self {
            table,
            cells,
            food,
            index,
            ids,
            rng,
            events,
            ..
        } = self;
        let table: &TraitTable = table;
        let food: &[Food] = food;
        let snapshot = cells.clone();
        let mut ctx = TickContext {
            tick,
            events,
            rng,
            ids,
        };
        let mut outcome = TickOutcome::default();
        let mut keys = Vec::new();
        let mut neighbors: Vec<Neighbor<'_>> = Vec::new();

        for cell in cells.iter_mut() {
            if outcome.dead.contains(&cell.id) {
                continue;
            }

            keys.clear();
            index.query_into(&Rect::centered(cell.position, cell.radius() * 2.0), &mut keys);
            keys.sort_unstable();
            neighbors.clear();
            for key in &keys {
                match *key {
                    EntityKey::Cell(id) if id != cell.id && !outcome.dead.contains(&id) => {
                        if let Some(i) = position_of(&snapshot, id, |c| c.id) {
                            neighbors.push(Neighbor::Cell(&snapshot[i]));
                        }
                    }
                    EntityKey::Food(id) if !outcome.eaten.contains(&id) => {
                        if let Some(i) = position_of(food, id, |f| f.id) {
                            neighbors.push(Neighbor::Food(&food[i]));
                        }
                    }
                    _ => {}
                }
            }

            for &neighbor in &neighbors {
                let spent_survivor = match neighbor {
                    Neighbor::Cell(other) => {
                        outcome.merged.contains(&other.id) && !cell.can_hunt(other, table)
                    }
                    Neighbor::Food(_) => false,
                };
                if spent_survivor {
                    continue;
                }
                let Some(interaction) = cell.interact(neighbor, table, &rules) else {
                    continue;
                };
                match interaction {
                    Interaction::Ate(food_id) => {
                        outcome.eaten.insert(food_id);
                        ctx.emit(
                            SimEventKind::FoodEaten {
                                cell: cell.id,
                                food: food_id,
                            },
                            format!("{} ate food {food_id}", cell.id),
                        );
                    }
                    Interaction::Preyed(prey) => {
                        outcome.dead.insert(prey);
                        ctx.emit(
                            SimEventKind::Preyed {
                                predator: cell.id,
                                prey,
                            },
                            format!("{} preyed on {prey}", cell.id),
                        );
                    }
                    Interaction::Merged(absorbed) => {
                        outcome.dead.insert(absorbed);
                        outcome.merged.insert(cell.id);
                        outcome.merges += 1;
                        ctx.emit(
                            SimEventKind::Merged {
                                survivor: cell.id,
                                absorbed,
                            },
                            format!("{} absorbed {absorbed} and became {}", cell.id, cell.traits()),
                        );
                    }
                }
            }

            neighbors.retain(|n| match n {
                Neighbor::Cell(c) => !outcome.dead.contains(&c.id),
                Neighbor::Food(f) => !outcome.eaten.contains(&f.id),
            });
            let offspring = cell.update(&neighbors, table, &params, &mut *ctx.ids, &mut *ctx.rng);
            if let Some(offspring) = offspring {
                let child = offspring.cell;
                ctx.emit(
                    SimEventKind::Born {
                        cell: child.id,
                        parent: cell.id,
                    },
                    format!("{} was born to {}", child.id, cell.id),
                );
                if offspring.mutated {
                    ctx.emit(
                        SimEventKind::Mutated {
                            cell: child.id,
                            traits: child.traits().clone(),
                        },
                        format!("{} mutated into {}", child.id, child.traits()),
                    );
                }
                outcome.births.push(child);
            }

            if !cell.is_alive() {
                outcome.dead.insert(cell.id);
                ctx.emit(
                    SimEventKind::Starved { cell: cell.id },
                    format!("{} starved", cell.id),
                );
            }
        }
        outcome
    }

    fn commit(&mut self, outcome: TickOutcome, tick: u64) {
        let TickOutcome {
            dead,
            eaten,
            births,
            merges,
            ..
        } = outcome;
        let born = births.len() as u64;

        self.cells.retain(|c| !dead.contains(&c.id));
        self.food.retain(|f| !eaten.contains(&f.id));
        for child in births {
            self.counters.highest_generation = self.counters.highest_generation.max(child.generation);
            self.cells.push(child);
        }

        self.counters.births += born;
        self.counters.deaths += dead.len() as u64;
        self.counters.merges += merges;
        self.counters.food_eaten += eaten.len() as u64;
        self.counters.max_population = self.counters.max_population.max(self.cells.len());

        if self.selected.is_some_and(|id| dead.contains(&id)) {
            self.selected = None;
        }
        self.refresh();

        debug!(
            tick,
            population = self.cells.len(),
            food = self.food.len(),
            born,
            died = dead.len(),
            "tick committed"
        );
    }

    // -- Helpers ----------------------------------------------------------

    fn sanitize(&mut self, settings: &Settings) -> Settings {
        let clean = settings.sanitized();
        if self.note_clamped(settings, &clean) {
            warn!(?settings, "settings out of range, clamped");
        }
        clean
    }

    /// Record a clamp. Returns `true` only when it differs from the last one
    /// recorded. Compares the clamped result, which is always NaN-free.
    fn note_clamped(&mut self, raw: &Settings, clean: &Settings) -> bool {
        if raw == clean || self.last_clamped.as_ref() == Some(clean) {
            return false;
        }
        self.last_clamped = Some(*clean);
        true
    }

    fn place_cell(&mut self, traits: TraitSet, position: Option<DVec2>) -> EntityId {
        let radius = self.table.get(traits.main()).base_size;
        let arena = self.config.arena();
        let position = match position {
            Some(p) => clamp_into(p, radius, arena),
            None => DVec2::new(
                self.rng.random_range(radius..arena.x - radius),
                self.rng.random_range(radius..arena.y - radius),
            ),
        };
        let id = self.ids.next_id();
        let cell = Cell::new(id, position, traits, &self.table, &mut self.rng);
        trace!(%id, traits = %cell.traits(), "cell placed");
        self.cells.push(cell);
        id
    }

    fn place_food(&mut self, position: Option<DVec2>) -> EntityId {
        let arena = self.config.arena();
        let position = match position {
            Some(p) => clamp_into(p, FOOD_RADIUS, arena),
            None => DVec2::new(
                self.rng.random_range(0.0..arena.x),
                self.rng.random_range(0.0..arena.y),
            ),
        };
        let id = self.ids.next_id();
        self.food.push(Food::plant(id, position));
        id
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for cell in &self.cells {
            if !self.index.insert(cell.position, EntityKey::Cell(cell.id)) {
                warn!(id = %cell.id, "cell outside arena, not indexed");
            }
        }
        for food in &self.food {
            if !self.index.insert(food.position, EntityKey::Food(food.id)) {
                warn!(id = %food.id, "food outside arena, not indexed");
            }
        }
    }

    fn refresh(&mut self) {
        self.rebuild_index();
        self.stats = Statistics::compute(
            self.clock.tick(),
            &self.cells,
            self.food.len(),
            &self.counters,
            self.fps.fps(),
        );
    }

    fn emit(&mut self, kind: SimEventKind, description: impl Into<String>) {
        let event = SimEvent::new(self.clock.tick(), kind, description);
        trace!(tick = event.tick, "{}", event.description);
        self.events.push(event);
    }
}

fn position_of<T>(items: &[T], id: EntityId, key: impl FnMut(&T) -> EntityId) -> Option<usize> {
    items.binary_search_by_key(&id, key).ok()
}
