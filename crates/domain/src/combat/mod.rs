//! Pure combat rules: exchange resolution, turn order, termination, targeting.

pub mod exchange;
pub mod turn_order;

pub use exchange::{
    resolve_exchange, CombatDice, ExchangeOutcome, BLOCK_REDUCTION_MAX, BLOCK_REDUCTION_MIN,
    CRIT_MULTIPLIER,
};
pub use turn_order::{
    acting_index, check_termination, eligible_targets, order_ids, turn_order, Termination,
};
