//! Experience and level progression.

/// Experience needed per level step at the given level.
pub fn level_requirement(level: u32) -> u64 {
    100 * u64::from(level.max(1))
}

/// Level implied by `experience` when evaluated against `current_level`.
///
/// Never returns less than `current_level`.
pub fn level_for_experience(experience: u64, current_level: u32) -> u32 {
    let computed = experience / level_requirement(current_level) + 1;
    let computed = u32::try_from(computed).unwrap_or(u32::MAX);
    computed.max(current_level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_level_up_at_one_hundred() {
        assert_eq!(level_for_experience(99, 1), 1);
        assert_eq!(level_for_experience(100, 1), 2);
    }

    #[test]
    fn level_never_decreases() {
        // 260 / 300 + 1 = 1, but the character is already level 3
        assert_eq!(level_for_experience(260, 3), 3);
    }

    #[test]
    fn zero_level_is_treated_as_one() {
        assert_eq!(level_requirement(0), 100);
    }
}
