/// Record identifiers as issued by the data store (assets, teams, projects,
/// categories). The engine treats them as opaque ordered keys.
pub type DbId = i64;

/// Round `value` to `places` decimal digits (half away from zero).
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_to_four_places() {
        assert_eq!(round_to(0.123_456, 4), 0.1235);
        assert_eq!(round_to(1.0, 4), 1.0);
    }

    #[test]
    fn round_to_two_places() {
        assert_eq!(round_to(15.004, 2), 15.0);
        assert_eq!(round_to(15.006, 2), 15.01);
    }
}
