use super::{FAST_BLOCK_SECS, MAX_ZEROES_IN_HASH, SLOW_BLOCK_SECS};

/// Next difficulty after a block that took `generate_secs` to find, plus the
/// annotation recorded on that block.
///
/// A slow block always lowers difficulty, even at the ceiling. A fast block
/// never raises it past the ceiling.
pub fn adjust_zeroes_in_hash(current: u32, generate_secs: u64) -> (u32, String) {
    if generate_secs > SLOW_BLOCK_SECS {
        return (current.saturating_sub(1), "N was decreased by 1".to_string());
    }
    if current >= MAX_ZEROES_IN_HASH {
        return (current, "N stays the same".to_string());
    }
    if generate_secs < FAST_BLOCK_SECS {
        let next = current + 1;
        (next, format!("N was increased to {next}"))
    } else {
        (current, "N stays the same".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::adjust_zeroes_in_hash;

    #[test]
    fn slow_block_decreases_by_one() {
        assert_eq!(adjust_zeroes_in_hash(4, 65).0, 3);
        assert_eq!(adjust_zeroes_in_hash(7, 65).0, 6);
        assert_eq!(adjust_zeroes_in_hash(4, 65).1, "N was decreased by 1");
    }

    #[test]
    fn decrease_floors_at_zero() {
        assert_eq!(adjust_zeroes_in_hash(0, 65).0, 0);
    }

    #[test]
    fn ceiling_stays_for_normal_block() {
        assert_eq!(adjust_zeroes_in_hash(7, 30), (7, "N stays the same".to_string()));
    }

    #[test]
    fn fast_block_increases_up_to_ceiling() {
        assert_eq!(adjust_zeroes_in_hash(6, 10), (7, "N was increased to 7".to_string()));
        assert_eq!(adjust_zeroes_in_hash(7, 10), (7, "N stays the same".to_string()));
    }

    #[test]
    fn boundaries_are_exclusive() {
        assert_eq!(adjust_zeroes_in_hash(3, 60).0, 3);
        assert_eq!(adjust_zeroes_in_hash(3, 15).0, 3);
        assert_eq!(adjust_zeroes_in_hash(3, 14).0, 4);
    }
}
