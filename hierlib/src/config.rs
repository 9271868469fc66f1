use std::fmt;

use serde::Deserialize;
use thiserror::Error;

/// A configuration for the full L1/L2/L3 hierarchy
#[derive(Debug, Clone, Deserialize)]
pub struct HierarchyConfig {
    pub l1: LevelConfig,
    pub l2: LevelConfig,
    pub l3: LevelConfig,
    pub memory_latency_cycles: u64,
}

/// A configuration for a single cache level
#[derive(Debug, Clone, Deserialize)]
pub struct LevelConfig {
    pub size_bytes: u64,
    pub block_size_bytes: u64,
    pub associativity: u64,
    #[serde(default = "ReplacementPolicy::default")]
    pub policy: ReplacementPolicy,
    pub hit_latency_cycles: u64,
}

/// The replacement policy - lru or fifo. Defaults to lru.
///
/// Both are realised by the same min-timestamp victim rule; the policy only
/// decides whether a hit refreshes the line's timestamp
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
pub enum ReplacementPolicy {
    #[serde(alias = "lru")]
    Lru,
    #[serde(alias = "fifo")]
    Fifo,
}

impl Default for ReplacementPolicy {
    fn default() -> Self {
        ReplacementPolicy::Lru
    }
}

impl fmt::Display for ReplacementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplacementPolicy::Lru => write!(f, "LRU"),
            ReplacementPolicy::Fifo => write!(f, "FIFO"),
        }
    }
}

/// Fatal configuration problems, detected when a level is built.
///
/// Any of these aborts hierarchy construction; no partially-built hierarchy is
/// left usable
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("L{level}: size, block size, and associativity must all be non-zero")]
    ZeroParameter { level: u32 },

    #[error("L{level}: size ({size_bytes}B) must be divisible by block size ({block_size_bytes}B)")]
    UnalignedSize {
        level: u32,
        size_bytes: u64,
        block_size_bytes: u64,
    },

    #[error("L{level}: {num_blocks} blocks cannot be divided evenly into ways of {associativity}")]
    IndivisibleAssociativity {
        level: u32,
        num_blocks: u64,
        associativity: u64,
    },

    #[error("L{level}: offset bits ({offset_bits}) and index bits ({index_bits}) exceed the 64-bit address width")]
    AddressWidthExceeded {
        level: u32,
        offset_bits: u32,
        index_bits: u32,
    },
}

/// Non-fatal configuration findings, collected during construction.
///
/// These are reported through a structured side channel (and the `log` facade)
/// rather than failing the build - unusual geometries are accepted because the
/// index/offset widths are derived from the actual counts via integer log, not
/// assumed alignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    NonPowerOfTwoBlockSize {
        level: u32,
        block_size_bytes: u64,
    },
    NonPowerOfTwoSetCount {
        level: u32,
        num_sets: u64,
    },
    AssociativityClamped {
        level: u32,
        requested: u64,
        num_blocks: u64,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::NonPowerOfTwoBlockSize {
                level,
                block_size_bytes,
            } => write!(
                f,
                "L{level}: block size ({block_size_bytes}) is not a power of 2"
            ),
            Diagnostic::NonPowerOfTwoSetCount { level, num_sets } => write!(
                f,
                "L{level}: number of sets ({num_sets}) is not a power of 2, indexing might be unusual"
            ),
            Diagnostic::AssociativityClamped {
                level,
                requested,
                num_blocks,
            } => write!(
                f,
                "L{level}: associativity ({requested}) is greater than the number of blocks ({num_blocks}), setting to fully associative"
            ),
        }
    }
}
