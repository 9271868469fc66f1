use log::{info, warn};

use crate::address;
use crate::config::{ConfigError, Diagnostic, LevelConfig, ReplacementPolicy};

/// A single line of storage within a set.
///
/// The timestamp does double duty: under LRU it marks the last use (refreshed
/// on every hit and on fill), under FIFO it marks the insertion order
/// (written only on fill). Eviction is the same for both - the valid line
/// with the smallest timestamp goes
#[derive(Debug, Clone, Copy, Default)]
struct CacheLine {
    valid: bool,
    tag: u64,
    last_used: u64,
}

/// One set-associative cache level.
///
/// A level owns its sets and its hit/miss counters; it knows nothing about its
/// neighbours. The hierarchy chains levels together and drives the shared
/// logical clock through `lookup`/`fill`
pub struct CacheLevel {
    config: LevelConfig,
    level: u32,
    sets: Vec<Vec<CacheLine>>,
    num_blocks: u64,
    num_sets: u64,
    offset_bits: u32,
    index_bits: u32,
    tag_bits: u32,
    hits: u64,
    misses: u64,
}

impl CacheLevel {
    /// Builds a level from a configuration, validating it and deriving the
    /// geometry.
    ///
    /// Fatal problems (zero parameters, unaligned size, indivisible
    /// associativity, field widths overflowing 64 bits) return a
    /// [`ConfigError`]. Unusual-but-workable geometries are accepted and
    /// reported into `diagnostics`; an associativity exceeding the block
    /// count is silently clamped to fully associative.
    ///
    /// # Arguments
    ///
    /// * `config`: The level's configuration
    /// * `level`: The level number, used in diagnostics (1 for L1, etc.)
    /// * `diagnostics`: Collector for non-fatal findings
    ///
    /// returns: Result<CacheLevel, ConfigError>
    pub fn new(
        config: &LevelConfig,
        level: u32,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<Self, ConfigError> {
        if config.size_bytes == 0 || config.block_size_bytes == 0 || config.associativity == 0 {
            return Err(ConfigError::ZeroParameter { level });
        }
        if config.size_bytes % config.block_size_bytes != 0 {
            return Err(ConfigError::UnalignedSize {
                level,
                size_bytes: config.size_bytes,
                block_size_bytes: config.block_size_bytes,
            });
        }
        if !config.block_size_bytes.is_power_of_two() {
            emit(
                diagnostics,
                Diagnostic::NonPowerOfTwoBlockSize {
                    level,
                    block_size_bytes: config.block_size_bytes,
                },
            );
        }

        let num_blocks = config.size_bytes / config.block_size_bytes;
        let mut config = config.clone();
        let num_sets = if config.associativity >= num_blocks {
            if config.associativity > num_blocks {
                emit(
                    diagnostics,
                    Diagnostic::AssociativityClamped {
                        level,
                        requested: config.associativity,
                        num_blocks,
                    },
                );
            }
            config.associativity = num_blocks;
            1
        } else {
            if num_blocks % config.associativity != 0 {
                return Err(ConfigError::IndivisibleAssociativity {
                    level,
                    num_blocks,
                    associativity: config.associativity,
                });
            }
            num_blocks / config.associativity
        };
        if num_sets > 1 && !num_sets.is_power_of_two() {
            emit(
                diagnostics,
                Diagnostic::NonPowerOfTwoSetCount { level, num_sets },
            );
        }

        let offset_bits = address::field_width(config.block_size_bytes);
        let index_bits = address::field_width(num_sets);
        if offset_bits + index_bits > u64::BITS {
            return Err(ConfigError::AddressWidthExceeded {
                level,
                offset_bits,
                index_bits,
            });
        }
        let tag_bits = u64::BITS - offset_bits - index_bits;

        info!(
            "initialised L{level} cache: size={}B, block_size={}B, assoc={}, sets={num_sets}, policy={}, hit_latency={} cycles",
            config.size_bytes,
            config.block_size_bytes,
            config.associativity,
            config.policy,
            config.hit_latency_cycles
        );
        info!("  L{level} derived: offset_bits={offset_bits}, index_bits={index_bits}, tag_bits={tag_bits}");

        let sets = vec![vec![CacheLine::default(); config.associativity as usize]; num_sets as usize];
        Ok(Self {
            config,
            level,
            sets,
            num_blocks,
            num_sets,
            offset_bits,
            index_bits,
            tag_bits,
            hits: 0,
            misses: 0,
        })
    }

    /// Probes the level for an address, advancing the shared logical clock by
    /// one and updating the hit/miss counters.
    ///
    /// On a hit under LRU the matched line's timestamp is refreshed to the
    /// clock; under FIFO it is left alone. A miss records nothing in the set -
    /// the caller resolves the miss downstream first and then calls [`fill`]
    /// with the clock value reached at that point.
    ///
    /// [`fill`]: CacheLevel::fill
    ///
    /// returns: bool, true on a hit
    pub fn lookup(&mut self, address: u64, clock: &mut u64) -> bool {
        *clock += 1;
        let (tag, index) = address::decode(address, self.offset_bits, self.index_bits);
        let set = &mut self.sets[index as usize];
        for line in set.iter_mut() {
            if line.valid && line.tag == tag {
                self.hits += 1;
                if self.config.policy == ReplacementPolicy::Lru {
                    line.last_used = *clock;
                }
                return true;
            }
        }
        self.misses += 1;
        false
    }

    /// Installs an address's block after a miss, evicting a victim if the set
    /// is full.
    ///
    /// Victim selection prefers any invalid line; otherwise the valid line
    /// with the smallest timestamp, ties broken by scan order. The fresh line
    /// is stamped with the clock unconditionally - that stamp is what gives
    /// FIFO lines their insertion-order marker.
    pub fn fill(&mut self, address: u64, clock: u64) {
        let (tag, index) = address::decode(address, self.offset_bits, self.index_bits);
        let set = &mut self.sets[index as usize];
        let victim = match set.iter().position(|line| !line.valid) {
            Some(empty) => empty,
            None => {
                let mut victim = 0;
                let mut min_timestamp = u64::MAX;
                for (i, line) in set.iter().enumerate() {
                    if line.last_used < min_timestamp {
                        min_timestamp = line.last_used;
                        victim = i;
                    }
                }
                victim
            }
        };
        let line = &mut set[victim];
        line.valid = true;
        line.tag = tag;
        line.last_used = clock;
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn accesses(&self) -> u64 {
        self.hits + self.misses
    }

    /// Hits over accesses, or 0.0 before any access
    pub fn hit_rate(&self) -> f64 {
        if self.accesses() == 0 {
            0.0
        } else {
            self.hits as f64 / self.accesses() as f64
        }
    }

    /// Misses over accesses, or 0.0 before any access
    pub fn miss_rate(&self) -> f64 {
        if self.accesses() == 0 {
            0.0
        } else {
            self.misses as f64 / self.accesses() as f64
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn hit_latency_cycles(&self) -> u64 {
        self.config.hit_latency_cycles
    }

    pub fn policy(&self) -> ReplacementPolicy {
        self.config.policy
    }

    /// The level's configuration with any associativity correction applied
    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    pub fn num_blocks(&self) -> u64 {
        self.num_blocks
    }

    pub fn num_sets(&self) -> u64 {
        self.num_sets
    }

    pub fn associativity(&self) -> u64 {
        self.config.associativity
    }

    pub fn offset_bits(&self) -> u32 {
        self.offset_bits
    }

    pub fn index_bits(&self) -> u32 {
        self.index_bits
    }

    pub fn tag_bits(&self) -> u32 {
        self.tag_bits
    }

    /// Lines that have never been filled. Useful for analysing cache
    /// performance or debugging
    pub fn invalid_line_count(&self) -> usize {
        self.sets
            .iter()
            .flat_map(|set| set.iter())
            .filter(|line| !line.valid)
            .count()
    }
}

fn emit(diagnostics: &mut Vec<Diagnostic>, diagnostic: Diagnostic) {
    warn!("{diagnostic}");
    diagnostics.push(diagnostic);
}
