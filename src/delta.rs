use crate::models::{Delta, Direction};

pub fn percent_change(current: u64, previous: Option<u64>) -> Delta {
    match previous {
        None => Delta::NoBaseline,
        Some(0) if current == 0 => Delta::Change { percent: 0.0 },
        Some(0) => Delta::Unbounded,
        Some(previous) => {
            let raw = (current as f64 - previous as f64) / previous as f64 * 100.0;
            let rounded = (raw * 10.0).round() / 10.0;
            // -0.0 would otherwise print as "-0.0%"
            let percent = if rounded == 0.0 { 0.0 } else { rounded };
            Delta::Change { percent }
        }
    }
}

impl Delta {
    pub fn direction(&self) -> Option<Direction> {
        match self {
            Delta::NoBaseline => None,
            Delta::Unbounded => Some(Direction::Up),
            Delta::Change { percent } if *percent > 0.0 => Some(Direction::Up),
            Delta::Change { percent } if *percent < 0.0 => Some(Direction::Down),
            Delta::Change { .. } => Some(Direction::Flat),
        }
    }

    pub fn percent(&self) -> Option<f64> {
        match self {
            Delta::Change { percent } => Some(*percent),
            _ => None,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Delta::NoBaseline => String::new(),
            Delta::Unbounded => "+\u{221e}".to_string(),
            Delta::Change { percent } if *percent > 0.0 => format!("+{percent:.1}%"),
            Delta::Change { percent } => format!("{percent:.1}%"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_baseline_has_no_percent_or_direction() {
        let delta = percent_change(0, None);
        assert_eq!(delta, Delta::NoBaseline);
        assert_eq!(delta.percent(), None);
        assert_eq!(delta.direction(), None);
        assert_eq!(delta.label(), "");
    }

    #[test]
    fn zero_baseline_with_growth_is_unbounded() {
        let delta = percent_change(5, Some(0));
        assert_eq!(delta, Delta::Unbounded);
        assert_eq!(delta.percent(), None);
        assert_eq!(delta.direction(), Some(Direction::Up));
    }

    #[test]
    fn zero_to_zero_is_flat() {
        let delta = percent_change(0, Some(0));
        assert_eq!(delta.percent(), Some(0.0));
        assert_eq!(delta.direction(), Some(Direction::Flat));
        assert_eq!(delta.label(), "0.0%");
    }

    #[test]
    fn growth_and_decline_round_to_one_decimal() {
        let up = percent_change(150, Some(100));
        assert_eq!(up.percent(), Some(50.0));
        assert_eq!(up.direction(), Some(Direction::Up));
        assert_eq!(up.label(), "+50.0%");

        let down = percent_change(50, Some(100));
        assert_eq!(down.percent(), Some(-50.0));
        assert_eq!(down.direction(), Some(Direction::Down));
        assert_eq!(down.label(), "-50.0%");

        assert_eq!(percent_change(1, Some(3)).percent(), Some(-66.7));
        assert_eq!(percent_change(3, Some(3)).direction(), Some(Direction::Flat));
    }

    #[test]
    fn tiny_changes_round_to_flat() {
        let delta = percent_change(10_000, Some(10_001));
        assert_eq!(delta.percent(), Some(0.0));
        assert_eq!(delta.direction(), Some(Direction::Flat));
        assert_eq!(delta.label(), "0.0%");
    }
}
