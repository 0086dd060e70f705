//! Danger zones: five equal-width buckets between the smallest and the
//! largest value of a set, used to colour regions.

pub const ZONE_COUNT: u8 = 5;

/// Zone of `value` within `[min, max + 1)`, 0 (lowest) to 4 (highest).
pub fn danger_zone(value: i64, min: i64, max: i64) -> u8 {
    let span = max.saturating_add(1).saturating_sub(min);
    if span <= 0 {
        return 0;
    }

    let step = span as f64 / f64::from(ZONE_COUNT);
    let zone = ((value.saturating_sub(min)) as f64 / step).floor();

    zone.clamp(0.0, f64::from(ZONE_COUNT - 1)) as u8
}

/// Zone of every value, relative to the set itself.
pub fn zones_of(values: &[i64]) -> Vec<u8> {
    let (Some(&min), Some(&max)) = (values.iter().min(), values.iter().max()) else {
        return Vec::new();
    };

    values.iter().map(|&v| danger_zone(v, min, max)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extremes_land_in_first_and_last_zone() {
        assert_eq!(danger_zone(0, 0, 99), 0);
        assert_eq!(danger_zone(99, 0, 99), 4);
    }

    #[test]
    fn equal_width_buckets() {
        // span 100, step 20
        assert_eq!(danger_zone(19, 0, 99), 0);
        assert_eq!(danger_zone(20, 0, 99), 1);
        assert_eq!(danger_zone(59, 0, 99), 2);
        assert_eq!(danger_zone(60, 0, 99), 3);
    }

    #[test]
    fn single_value_is_zone_zero() {
        assert_eq!(zones_of(&[42]), vec![0]);
        assert_eq!(zones_of(&[7, 7, 7]), vec![0, 0, 0]);
    }

    #[test]
    fn negative_deltas_are_bucketed_too() {
        assert_eq!(zones_of(&[-10, 0, 10]), vec![0, 2, 4]);
    }

    #[test]
    fn empty_set_has_no_zones() {
        assert!(zones_of(&[]).is_empty());
    }
}
