//! This module contains constants used throughout the project.

use alloy_primitives::U256;

/// Fixed-point scale used by every price and ratio computation (18 decimal places)
pub const SCALE: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// Number of positions at or below which any participant may conclude the auction
pub const MIN_POSITIONS: usize = 3;

/// Logging target shared by every auction component
pub const LOG_TARGET: &str = "auction";
