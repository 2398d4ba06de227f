//! Reward calculus for the indexed chain.
//!
//! Everything here is a pure function of block heights, computed on
//! [`U256`] so the results are bit-identical wherever they are recomputed.
//! The base reward is a step function that decays by 1 coin at fixed height
//! thresholds; miners of blocks that reference uncles earn a nephew bonus on
//! top, and each uncle earns a distance-scaled share of the base reward.

#![warn(
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    clippy::missing_const_for_fn,
    rustdoc::all
)]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![deny(unused_must_use, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

use alloy::primitives::U256;

const WEI: u64 = 1_000_000_000_000_000_000;

/// Reward steps as `(strictly-greater-than height, reward in coins)` pairs,
/// highest threshold first.
const STEPS: [(u64, u64); 8] = [
    (2_508_545, 1),
    (2_150_181, 2),
    (1_791_818, 3),
    (1_433_454, 4),
    (1_075_090, 5),
    (716_727, 6),
    (358_363, 7),
    (0, 8),
];

/// The rewards minted by one block, all in wei.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rewards {
    /// Base block reward including the nephew bonus.
    pub reward: U256,
    /// Sum of the rewards paid to the block's uncles.
    pub uncle_rewards: U256,
    /// Total newly issued coin: `reward + uncle_rewards`.
    pub minted: U256,
}

/// The base reward for mining the block at `height`.
///
/// Genesis mints nothing.
pub fn block_reward(height: u64) -> U256 {
    if height == 0 {
        return U256::ZERO;
    }
    for (threshold, coins) in STEPS {
        if height > threshold {
            return U256::from(coins) * U256::from(WEI);
        }
    }
    U256::ZERO
}

/// The reward paid to an uncle at `uncle_height` referenced by the canonical
/// block at `height`.
///
/// `(uncle_height + 2 − height) × block_reward(height) / 2`, clamped to zero
/// for uncles more than two blocks behind.
pub fn uncle_reward(height: u64, uncle_height: u64) -> U256 {
    if uncle_height.saturating_add(2) < height {
        return U256::ZERO;
    }
    let depth = U256::from(uncle_height.saturating_add(2) - height);
    depth * block_reward(height) / U256::from(2)
}

/// The bonus paid to the canonical miner for referencing `uncle_count`
/// uncles: `block_reward / (32 × uncle_count)`.
pub fn nephew_bonus(height: u64, uncle_count: usize) -> U256 {
    if uncle_count == 0 {
        return U256::ZERO;
    }
    block_reward(height) / U256::from(32 * uncle_count as u64)
}

/// The base reward plus the nephew bonus, which is the reward figure the
/// crawler attributes to the canonical miner.
pub fn base_reward(height: u64, uncle_count: usize) -> U256 {
    block_reward(height) + nephew_bonus(height, uncle_count)
}

/// Computes every reward component minted by the block at `height`
/// referencing uncles at `uncle_heights`.
pub fn accumulate_rewards(height: u64, uncle_heights: &[u64]) -> Rewards {
    let reward = base_reward(height, uncle_heights.len());
    let uncle_rewards =
        uncle_heights.iter().fold(U256::ZERO, |acc, &u| acc + uncle_reward(height, u));
    Rewards { reward, uncle_rewards, minted: reward + uncle_rewards }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn coins(n: u64) -> U256 {
        U256::from(n) * U256::from(WEI)
    }

    #[test]
    fn genesis_mints_nothing() {
        assert_eq!(block_reward(0), U256::ZERO);
        let r = accumulate_rewards(0, &[]);
        assert_eq!(r.minted, U256::ZERO);
    }

    #[test]
    fn step_boundaries_are_strictly_greater_than() {
        assert_eq!(block_reward(1), coins(8));
        assert_eq!(block_reward(358_363), coins(8));
        assert_eq!(block_reward(358_364), coins(7));
        assert_eq!(block_reward(716_727), coins(7));
        assert_eq!(block_reward(716_728), coins(6));
        assert_eq!(block_reward(1_075_091), coins(5));
        assert_eq!(block_reward(1_433_455), coins(4));
        assert_eq!(block_reward(1_791_819), coins(3));
        assert_eq!(block_reward(2_150_182), coins(2));
        assert_eq!(block_reward(2_508_545), coins(2));
        assert_eq!(block_reward(2_508_546), coins(1));
        assert_eq!(block_reward(u64::MAX), coins(1));
    }

    #[test]
    fn deep_uncle_reward_clamps_to_zero() {
        // an uncle two blocks behind earns nothing
        assert_eq!(uncle_reward(200_000, 199_998), U256::ZERO);
        assert_eq!(uncle_reward(200_000, 199_997), U256::ZERO);
    }

    #[test]
    fn near_uncle_rewards() {
        // one block behind: half the base reward
        assert_eq!(uncle_reward(100, 99), coins(4));
        // same-height competitor: the full base reward
        assert_eq!(uncle_reward(100, 100), coins(8));
    }

    #[test]
    fn nephew_bonus_splits_by_uncle_count() {
        assert_eq!(nephew_bonus(100, 0), U256::ZERO);
        assert_eq!(nephew_bonus(100, 1), coins(8) / U256::from(32));
        assert_eq!(nephew_bonus(100, 2), coins(8) / U256::from(64));
    }

    #[test]
    fn accumulate_matches_components() {
        let r = accumulate_rewards(200_000, &[199_998]);
        assert_eq!(r.uncle_rewards, U256::ZERO);
        assert_eq!(r.reward, coins(8) + coins(8) / U256::from(32));
        assert_eq!(r.minted, r.reward);

        let r = accumulate_rewards(100, &[99, 100]);
        assert_eq!(r.uncle_rewards, coins(4) + coins(8));
        assert_eq!(r.reward, coins(8) + coins(8) / U256::from(64));
        assert_eq!(r.minted, r.reward + r.uncle_rewards);
    }

    proptest! {
        #[test]
        fn uncle_rewards_are_non_negative_and_bounded(
            height in 1u64..3_000_000,
            delta in 0u64..5,
        ) {
            let uncle = height.saturating_sub(delta);
            let r = uncle_reward(height, uncle);
            prop_assert!(r <= block_reward(height));
        }

        #[test]
        fn minted_without_uncles_is_the_block_reward(height in 0u64..4_000_000) {
            let r = accumulate_rewards(height, &[]);
            prop_assert_eq!(r.reward, block_reward(height));
            prop_assert_eq!(r.uncle_rewards, U256::ZERO);
            prop_assert_eq!(r.minted, block_reward(height));
        }

        #[test]
        fn block_reward_is_monotone_non_increasing(height in 1u64..4_000_000) {
            prop_assert!(block_reward(height + 1) <= block_reward(height));
        }
    }
}
