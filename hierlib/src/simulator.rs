use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::cache::CacheLevel;
use crate::config::{ConfigError, Diagnostic, HierarchyConfig};

/// A three-level cache hierarchy backed by a fixed-latency main memory.
///
/// The hierarchy owns the chain of levels (L1 first) and the shared logical
/// clock that orders replacement decisions across all of them. It supports
/// calling `run_simulation` multiple times, and will keep accumulating
/// accesses and cycles
pub struct CacheHierarchy {
    levels: Vec<CacheLevel>,
    memory_latency_cycles: u64,
    clock: u64,
    total_accesses: u64,
    total_cycles: u64,
    diagnostics: Vec<Diagnostic>,
}

/// The result of a hierarchy simulation. Can be serialised to JSON
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HierarchyResult {
    pub total_accesses: u64,
    pub total_cycles: u64,
    /// Cycles per access over the whole run; `None` when nothing was accessed
    pub simulated_amat: Option<f64>,
    pub levels: Vec<LevelResult>,
    /// Formula-based cross-check, innermost level first (L3, L2, L1)
    pub formula_amat: Vec<AmatEstimate>,
}

/// The result for an individual level
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LevelResult {
    pub level: u32,
    pub accesses: u64,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub miss_rate: f64,
}

/// One step of the formula-based AMAT computation:
/// `amat = hit_latency + miss_rate * miss_penalty`, where the miss penalty is
/// the next level's AMAT (or the memory latency for the innermost level).
///
/// The formula assumes stationary miss rates while the simulation is
/// path-dependent, so it approximates the simulated AMAT rather than matching
/// it exactly; the gap is itself an observable, not a bug signal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AmatEstimate {
    pub level: u32,
    pub hit_latency_cycles: u64,
    pub miss_rate: f64,
    pub miss_penalty: f64,
    pub amat: f64,
}

impl CacheHierarchy {
    /// Builds the L1→L2→L3→memory chain from a configuration.
    ///
    /// Every level is validated independently; the first failure aborts
    /// construction. Non-fatal findings from all levels end up on the
    /// hierarchy's diagnostics channel.
    ///
    /// # Arguments
    ///
    /// * `config`: A hierarchy configuration, usually resulting from parsing JSON
    ///
    /// returns: Result<CacheHierarchy, ConfigError>
    pub fn new(config: &HierarchyConfig) -> Result<Self, ConfigError> {
        let mut diagnostics = Vec::new();
        let mut levels = Vec::with_capacity(3);
        for (number, level_config) in [&config.l1, &config.l2, &config.l3].into_iter().enumerate()
        {
            levels.push(CacheLevel::new(
                level_config,
                number as u32 + 1,
                &mut diagnostics,
            )?);
        }
        info!(
            "cache hierarchy initialised, main memory latency: {} cycles",
            config.memory_latency_cycles
        );
        Ok(Self {
            levels,
            memory_latency_cycles: config.memory_latency_cycles,
            clock: 0,
            total_accesses: 0,
            total_cycles: 0,
            diagnostics,
        })
    }

    /// Performs one memory access against the hierarchy, returning the
    /// latency charged for it.
    ///
    /// This is the only operation that advances `total_accesses`; the logical
    /// clock inside is a finer-grained counter that ticks once per level
    /// visited.
    pub fn access_memory(&mut self, address: u64) -> u64 {
        self.total_accesses += 1;
        let latency = access_chain(
            &mut self.levels,
            self.memory_latency_cycles,
            address,
            &mut self.clock,
        );
        self.total_cycles += latency;
        latency
    }

    /// Replays an address trace in order. Order matters: it determines what
    /// is resident when each subsequent address is probed.
    ///
    /// An empty trace is not an error; it logs a warning and leaves the
    /// totals untouched
    pub fn run_simulation(&mut self, addresses: &[u64]) {
        if addresses.is_empty() {
            warn!("no addresses provided, simulation not run");
            return;
        }
        info!("starting simulation for {} addresses", addresses.len());
        for &address in addresses {
            self.access_memory(address);
        }
        info!("simulation finished");
    }

    /// Snapshots the accumulated statistics, including the formula-based
    /// AMAT cross-check
    pub fn results(&self) -> HierarchyResult {
        let simulated_amat = if self.total_accesses == 0 {
            None
        } else {
            Some(self.total_cycles as f64 / self.total_accesses as f64)
        };
        let levels = self
            .levels
            .iter()
            .map(|level| LevelResult {
                level: level.level(),
                accesses: level.accesses(),
                hits: level.hits(),
                misses: level.misses(),
                hit_rate: level.hit_rate(),
                miss_rate: level.miss_rate(),
            })
            .collect();

        // Innermost outward: each level's miss penalty is the AMAT below it
        let mut formula_amat = Vec::with_capacity(self.levels.len());
        let mut miss_penalty = self.memory_latency_cycles as f64;
        for level in self.levels.iter().rev() {
            let amat = level.hit_latency_cycles() as f64 + level.miss_rate() * miss_penalty;
            formula_amat.push(AmatEstimate {
                level: level.level(),
                hit_latency_cycles: level.hit_latency_cycles(),
                miss_rate: level.miss_rate(),
                miss_penalty,
                amat,
            });
            miss_penalty = amat;
        }

        HierarchyResult {
            total_accesses: self.total_accesses,
            total_cycles: self.total_cycles,
            simulated_amat,
            levels,
            formula_amat,
        }
    }

    /// Non-fatal findings collected while the hierarchy was built
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// The levels in probe order, L1 first
    pub fn levels(&self) -> &[CacheLevel] {
        &self.levels
    }

    pub fn memory_latency_cycles(&self) -> u64 {
        self.memory_latency_cycles
    }

    pub fn total_accesses(&self) -> u64 {
        self.total_accesses
    }

    pub fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    /// The shared logical clock; ticks once per level visited
    pub fn clock(&self) -> u64 {
        self.clock
    }
}

/// Resolves one access against `levels[0]`, delegating misses down the tail
/// of the slice. An empty slice is the end of the chain - main memory, a
/// fixed cost.
///
/// Every visited level charges its own hit latency, win or lose, on top of
/// whatever the levels below it cost. The fill happens after the downstream
/// resolution, so the fresh line carries the clock value reached by the whole
/// chain walk - the same total order every level's replacement decisions are
/// ranked by.
fn access_chain(levels: &mut [CacheLevel], memory_latency: u64, address: u64, clock: &mut u64) -> u64 {
    let Some((level, rest)) = levels.split_first_mut() else {
        return memory_latency;
    };
    if level.lookup(address, clock) {
        return level.hit_latency_cycles();
    }
    let downstream = access_chain(rest, memory_latency, address, clock);
    level.fill(address, *clock);
    level.hit_latency_cycles() + downstream
}
