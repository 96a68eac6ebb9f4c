use petri_core::cell::Cell;
use petri_core::traits::TraitTag;
use serde::Serialize;

/// Running totals since the last reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counters {
    /// Offspring produced by reproduction.
    pub births: u64,
    /// Cells placed from outside: seeding and [`Simulation::add_cell`].
    ///
    /// [`Simulation::add_cell`]: crate::Simulation::add_cell
    pub added: u64,
    /// Cells removed for any reason: starvation, predation, or absorption.
    pub deaths: u64,
    /// Merges performed.
    pub merges: u64,
    /// Food particles eaten.
    pub food_eaten: u64,
    /// Largest population seen after a commit.
    pub max_population: usize,
    /// Deepest generation born so far.
    pub highest_generation: u32,
}

/// Aggregate statistics, recomputed after every committed tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    /// Tick the statistics describe.
    pub tick: u64,
    /// Live cells.
    pub population: usize,
    /// Live food particles.
    pub food_count: usize,
    /// Host frame rate measured over the last full window.
    pub fps: f64,
    /// Mean energy of live cells; 0 when there are none.
    pub average_energy: f64,
    /// Most common main trait among live cells.
    pub dominant_trait: Option<TraitTag>,
    /// Deepest generation born so far.
    pub generation: u32,
    /// Offspring produced since reset.
    pub births: u64,
    /// Cells removed since reset.
    pub deaths: u64,
    /// Merges since reset.
    pub merges: u64,
    /// Food eaten since reset.
    pub food_eaten: u64,
    /// Largest population since reset.
    pub max_population: usize,
}

impl Statistics {
    /// Summarize `cells` together with the running counters.
    pub fn compute(tick: u64, cells: &[Cell], food_count: usize, counters: &Counters, fps: f64) -> Self {
        let population = cells.len();
        let average_energy = if population == 0 {
            0.0
        } else {
            cells.iter().map(Cell::energy).sum::<f64>() / population as f64
        };
        Self {
            tick,
            population,
            food_count,
            fps,
            average_energy,
            dominant_trait: dominant_trait(cells),
            generation: counters.highest_generation,
            births: counters.births,
            deaths: counters.deaths,
            merges: counters.merges,
            food_eaten: counters.food_eaten,
            max_population: counters.max_population,
        }
    }
}

/// Modal main trait. Ties go to the tag listed first in [`TraitTag::ALL`].
pub fn dominant_trait(cells: &[Cell]) -> Option<TraitTag> {
    let mut counts = [0usize; TraitTag::ALL.len()];
    for cell in cells {
        if let Some(i) = TraitTag::ALL.iter().position(|t| *t == cell.main_trait()) {
            counts[i] += 1;
        }
    }
    let mut best: Option<(usize, TraitTag)> = None;
    for (tag, count) in TraitTag::ALL.iter().zip(counts) {
        if count > 0 && best.is_none_or(|(n, _)| count > n) {
            best = Some((count, *tag));
        }
    }
    best.map(|(_, tag)| tag)
}

/// Frames-per-second over windows of at least one second of host time.
#[derive(Debug, Clone, Default)]
pub struct FpsMeter {
    frames: u32,
    window: f64,
    fps: f64,
}

impl FpsMeter {
    /// Shortest window the rate is averaged over, in seconds.
    pub const WINDOW: f64 = 1.0;

    /// Create a meter reporting 0 until the first window closes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one frame that took `dt` seconds.
    pub fn record(&mut self, dt: f64) {
        self.frames += 1;
        self.window += dt;
        if self.window >= Self::WINDOW {
            self.fps = f64::from(self.frames) / self.window;
            self.frames = 0;
            self.window = 0.0;
        }
    }

    /// Rate measured over the last closed window.
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Forget everything.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
