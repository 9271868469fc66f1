use crate::config::{HierarchyConfig, LevelConfig, ReplacementPolicy};

/// Shorthand constructor for a level configuration
pub fn level_config(
    size_bytes: u64,
    block_size_bytes: u64,
    associativity: u64,
    policy: ReplacementPolicy,
    hit_latency_cycles: u64,
) -> LevelConfig {
    LevelConfig {
        size_bytes,
        block_size_bytes,
        associativity,
        policy,
        hit_latency_cycles,
    }
}

/// A small, conventional hierarchy with the given policy at every level:
/// L1 64B/16B/2-way at 1 cycle, L2 256B/16B/4-way at 10 cycles,
/// L3 1024B/16B/8-way at 30 cycles, memory at 100 cycles
pub fn hierarchy_config(policy: ReplacementPolicy) -> HierarchyConfig {
    HierarchyConfig {
        l1: level_config(64, 16, 2, policy, 1),
        l2: level_config(256, 16, 4, policy, 10),
        l3: level_config(1024, 16, 8, policy, 30),
        memory_latency_cycles: 100,
    }
}

/// The LRU variant of [`hierarchy_config`]
pub fn example_hierarchy_config() -> HierarchyConfig {
    hierarchy_config(ReplacementPolicy::Lru)
}
