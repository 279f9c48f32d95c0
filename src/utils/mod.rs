use std::time::{Duration, Instant};
use tracing::info;

/// A simple wall-clock timer for logging elapsed time.
pub struct Timer {
    label: String,
    start: Instant,
}

impl Timer {
    pub fn start(label: impl Into<String>) -> Self {
        let label = label.into();
        info!("⏱  Starting: {}", label);
        Self {
            label,
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        info!(
            "⏱  Finished: {} (took {:.2?})",
            self.label,
            self.elapsed()
        );
    }
}

const MISSING: &str = "—";

/// Format a large integer with thousands separators.
pub fn fmt_number(n: i64) -> String {
    let s = n.unsigned_abs().to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    if n < 0 {
        result.push('-');
    }
    result.chars().rev().collect()
}

/// Whole-number display of an optional feed value.
pub fn fmt_amount(v: Option<f64>) -> String {
    v.map(|x| fmt_number(x.round() as i64)).unwrap_or_else(|| MISSING.into())
}

/// 1_234_567 → "1.23 M"
pub fn fmt_compact(v: Option<f64>) -> String {
    let Some(x) = v else {
        return MISSING.into();
    };
    let abs = x.abs();
    if abs >= 1e12 {
        format!("{:.2} T", x / 1e12)
    } else if abs >= 1e9 {
        format!("{:.2} B", x / 1e9)
    } else if abs >= 1e6 {
        format!("{:.2} M", x / 1e6)
    } else if abs >= 1e3 {
        format!("{:.2} K", x / 1e3)
    } else {
        format!("{:.2}", x)
    }
}

/// Fractional return as a percentage: 0.0123 → "1.23%"
pub fn fmt_percent(v: Option<f64>) -> String {
    v.map(|x| format!("{:.2}%", x * 100.0)).unwrap_or_else(|| MISSING.into())
}

pub fn fmt_ratio(v: Option<f64>) -> String {
    v.map(|x| format!("{:.2}", x)).unwrap_or_else(|| MISSING.into())
}

/// Human age: "3d 4h", "2h 5m", "42s"
pub fn fmt_age(d: Duration) -> String {
    let secs = d.as_secs();
    match secs {
        s if s >= 86_400 => format!("{}d {}h", s / 86_400, (s % 86_400) / 3600),
        s if s >= 3600 => format!("{}h {}m", s / 3600, (s % 3600) / 60),
        s if s >= 60 => format!("{}m {}s", s / 60, s % 60),
        s => format!("{}s", s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_number() {
        assert_eq!(fmt_number(1_234_567), "1,234,567");
        assert_eq!(fmt_number(0), "0");
        assert_eq!(fmt_number(-42_000), "-42,000");
        assert_eq!(fmt_number(999), "999");
    }

    #[test]
    fn test_fmt_amount() {
        assert_eq!(fmt_amount(Some(18_073_500.0)), "18,073,500");
        assert_eq!(fmt_amount(None), "—");
    }

    #[test]
    fn test_fmt_compact() {
        assert_eq!(fmt_compact(Some(2_566_406_250_000.0)), "2.57 T");
        assert_eq!(fmt_compact(Some(18_073_500.0)), "18.07 M");
        assert_eq!(fmt_compact(Some(16_400.0)), "16.40 K");
        assert_eq!(fmt_compact(Some(7.0)), "7.00");
        assert_eq!(fmt_compact(None), "—");
    }

    #[test]
    fn test_fmt_percent() {
        assert_eq!(fmt_percent(Some(-0.01793722)), "-1.79%");
        assert_eq!(fmt_percent(None), "—");
    }

    #[test]
    fn test_fmt_age() {
        assert_eq!(fmt_age(Duration::from_secs(42)), "42s");
        assert_eq!(fmt_age(Duration::from_secs(3 * 86_400 + 4 * 3600)), "3d 4h");
        assert_eq!(fmt_age(Duration::from_secs(7500)), "2h 5m");
    }
}
