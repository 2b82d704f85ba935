//! Hand-authored sample series shown next to generated plans.
//!
//! These numbers are not derived from the form or the plan. Displays must
//! label them as sample data.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub label: &'static str,
    pub value: u64,
}

const fn p(label: &'static str, value: u64) -> Point {
    Point { label, value }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IllustrativeMetrics {
    /// Percent of daily calories
    pub macro_split: &'static [Point],
    pub calories_by_day: &'static [Point],
    /// Relative intensity, 0-10
    pub intensity_by_day: &'static [Point],
}

pub const SAMPLE_METRICS: IllustrativeMetrics = IllustrativeMetrics {
    macro_split: &[p("Protein", 30), p("Carbs", 45), p("Fat", 25)],
    calories_by_day: &[
        p("Mon", 1850),
        p("Tue", 1920),
        p("Wed", 1780),
        p("Thu", 2010),
        p("Fri", 1890),
        p("Sat", 2150),
        p("Sun", 1950),
    ],
    intensity_by_day: &[
        p("Mon", 7),
        p("Tue", 5),
        p("Wed", 8),
        p("Thu", 4),
        p("Fri", 9),
        p("Sat", 6),
        p("Sun", 2),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macro_split_sums_to_hundred() {
        let total: u64 = SAMPLE_METRICS.macro_split.iter().map(|p| p.value).sum();
        assert_eq!(total, 100);
    }

    #[test]
    fn test_week_series_cover_seven_days() {
        assert_eq!(SAMPLE_METRICS.calories_by_day.len(), 7);
        assert_eq!(SAMPLE_METRICS.intensity_by_day.len(), 7);
        assert!(SAMPLE_METRICS.intensity_by_day.iter().all(|p| p.value <= 10));
    }
}
