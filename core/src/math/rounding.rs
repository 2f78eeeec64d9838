/// Anchor cell of a continuous pixel position.
///
/// Non-negative positions round half up; negative positions step one cell
/// further down before truncating, so a position just below zero anchors at
/// -1 and never aliases onto cell 0.
pub fn anchor_index(position: f32) -> i64 {
    if position >= 0.0 {
        (position + 0.5).floor() as i64
    } else {
        (position - 1.0).trunc() as i64
    }
}

/// IEEE-style remainder: `x - n * modulus` with `n` the nearest integer to
/// `x / modulus`, ties to even. The result lies in `[-modulus/2, modulus/2]`.
pub fn signed_remainder(x: f32, modulus: f32) -> f32 {
    x - (x / modulus).round_ties_even() * modulus
}

/// Maps `value` into `[lower, lower + period)` using floor modulo.
pub fn wrap_into(value: f32, lower: f32, period: f32) -> f32 {
    (value - lower).rem_euclid(period) + lower
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_rounds_half_up_for_non_negative() {
        assert_eq!(anchor_index(0.0), 0);
        assert_eq!(anchor_index(0.49), 0);
        assert_eq!(anchor_index(0.5), 1);
        assert_eq!(anchor_index(2.7), 3);
    }

    #[test]
    fn anchor_steps_below_zero_for_negative() {
        assert_eq!(anchor_index(-0.2), -1);
        assert_eq!(anchor_index(-1.5), -2);
    }

    #[test]
    fn remainder_takes_shortest_way_round() {
        assert_eq!(signed_remainder(350.0, 360.0), -10.0);
        assert_eq!(signed_remainder(-350.0, 360.0), 10.0);
        assert_eq!(signed_remainder(20.0, 360.0), 20.0);
        assert_eq!(signed_remainder(180.0, 360.0), 180.0);
    }

    #[test]
    fn wrap_into_uses_floor_modulo() {
        assert_eq!(wrap_into(190.0, -180.0, 360.0), -170.0);
        assert_eq!(wrap_into(-190.0, -180.0, 360.0), 170.0);
        assert_eq!(wrap_into(45.0, -90.0, 180.0), 45.0);
    }
}
