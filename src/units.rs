// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Credit Economy Digital Twin - Units & Constants

//! Unit aliases and protocol constants.
//!
//! Everything in the engine is carried as `f64`; the aliases only document
//! which unit a field or argument is denominated in.

/// Native token amount (SSC).
pub type Credits = f64;
/// Smallest token denomination, `1e-18` Credits.
pub type Shannon = f64;
/// Block count.
pub type Blocks = f64;
/// Elapsed time in days.
pub type Days = f64;
/// Elapsed time in seconds.
pub type Seconds = f64;
/// Storage volume in bytes.
pub type Bytes = f64;
/// Share count on the staking pool.
pub type Shares = f64;
/// Abstract compute weight units.
pub type ComputeWeights = f64;
/// Dimensionless ratio.
pub type Percentage = f64;
/// Credits paid per byte of storage.
pub type CreditsPerByte = f64;
/// Share price on the staking pool.
pub type CreditsPerShare = f64;

// ─── Time ────────────────────────────────────────────────────────────────────

pub const BLOCK_TIME: Seconds = 6.0;
pub const DAY_TO_SECONDS: Seconds = 24.0 * 60.0 * 60.0;
pub const BLOCKS_PER_DAY: Blocks = DAY_TO_SECONDS / BLOCK_TIME;
pub const BLOCKS_PER_MONTH: Blocks = BLOCKS_PER_DAY * 30.0;
pub const BLOCKS_PER_YEAR: Blocks = BLOCKS_PER_DAY * 365.0;
pub const DAYS_PER_YEAR: Days = 365.0;

// ─── Denominations ───────────────────────────────────────────────────────────

pub const SHANNON_IN_CREDITS: Credits = 1e-18;

// ─── Storage geometry ────────────────────────────────────────────────────────

pub const KIB_IN_BYTES: Bytes = 1024.0;
pub const MIB_IN_BYTES: Bytes = 1024.0 * KIB_IN_BYTES;
pub const GIB_IN_BYTES: Bytes = 1024.0 * MIB_IN_BYTES;

/// Raw record chunk plus commitment and witness.
pub const PIECE_SIZE: Bytes = 32_768.0 * 32.0 + 32.0 + 32.0;
pub const PIECES_IN_SECTOR: f64 = 1000.0;
pub const SECTOR_SIZE: Bytes = PIECE_SIZE * PIECES_IN_SECTOR;

/// Archived segment before erasure coding.
pub const SEGMENT_SIZE: Bytes = 128.0 * MIB_IN_BYTES;
/// Archived segment after erasure coding doubles it.
pub const SEGMENT_HISTORY_SIZE: Bytes = 2.0 * SEGMENT_SIZE;

// ─── Issuance ────────────────────────────────────────────────────────────────

pub const MAX_CREDIT_ISSUANCE: Credits = 3e9;
/// Share of the total issuance reserved for farmer block rewards.
pub const FARMER_ISSUANCE_SHARE: Percentage = 0.44;
pub const ISSUANCE_FOR_FARMERS: Credits = MAX_CREDIT_ISSUANCE * FARMER_ISSUANCE_SHARE;
pub const OTHER_ISSUANCE: Credits = MAX_CREDIT_ISSUANCE - ISSUANCE_FOR_FARMERS;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_per_day_from_block_time() {
        assert!((BLOCKS_PER_DAY - 14_400.0).abs() < f64::EPSILON);
        assert!((BLOCKS_PER_YEAR - 14_400.0 * 365.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_issuance_pools_cover_max_supply() {
        let total = ISSUANCE_FOR_FARMERS + OTHER_ISSUANCE;
        assert!((total - MAX_CREDIT_ISSUANCE).abs() < 1e-6);
    }

    #[test]
    fn test_history_segment_is_erasure_coded_segment() {
        assert!((SEGMENT_HISTORY_SIZE / SEGMENT_SIZE - 2.0).abs() < f64::EPSILON);
    }
}
