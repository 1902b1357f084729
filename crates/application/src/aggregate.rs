//! Rating aggregation.
//!
//! The canonical rounding rule for the whole system: averages round to the
//! nearest integer with ties away from zero, which on the positive 1..=5
//! domain is round-half-up. The Postgres repositories compute the same
//! value in SQL with `ROUND(AVG(..))`, which uses the identical tie rule.

/// Rounded average of the given scores; `None` when there are none.
pub fn rounded_average<I>(scores: I) -> Option<i32>
where
    I: IntoIterator<Item = i32>,
{
    let mut sum: i64 = 0;
    let mut count: i64 = 0;
    for score in scores {
        sum += i64::from(score);
        count += 1;
    }
    if count == 0 {
        return None;
    }
    Some((sum as f64 / count as f64).round() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_scores_yields_none_not_zero() {
        assert_eq!(rounded_average([]), None);
    }

    #[test]
    fn single_score_is_its_own_average() {
        assert_eq!(rounded_average([4]), Some(4));
    }

    #[test]
    fn averages_round_to_nearest() {
        assert_eq!(rounded_average([5, 3]), Some(4));
        assert_eq!(rounded_average([1, 1, 2]), Some(1));
        assert_eq!(rounded_average([5, 5, 4]), Some(5));
    }

    #[test]
    fn ties_round_half_up() {
        assert_eq!(rounded_average([2, 3]), Some(3));
        assert_eq!(rounded_average([4, 5]), Some(5));
        assert_eq!(rounded_average([1, 2]), Some(2));
    }
}
