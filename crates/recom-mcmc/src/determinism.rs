use recom_core::derive_substream_seed;

/// Seed of the RNG that drives chain step `step` (steps count from 1).
pub fn step_seed(master_seed: u64, step: usize) -> u64 {
    derive_substream_seed(master_seed, step as u64)
}

/// Master seed handed to the recursive seed partitioner.
///
/// Kept apart from the step substreams so that regenerating the seed plan
/// never collides with a chain step.
pub fn seed_partition_seed(master_seed: u64) -> u64 {
    derive_substream_seed(master_seed ^ 0xA5A5_A5A5_A5A5_A5A5, 0)
}
