//! The SLI window catalogue and the multi-burn-rate factor table.

use crate::errors::GenerationError;
use crate::model::SUPPORTED_WINDOW_DAYS;

/// The fixed short windows every SLO gets an SLI recording rule for,
/// ascending, before the full window is appended.
pub const SHORT_WINDOWS: &[&str] = &["5m", "30m", "1h", "2h", "6h", "1d", "3d"];

/// Returns `SHORT_WINDOWS` followed by the full window literal (e.g. `30d`
/// for a 30-day SLO), in emission order.
pub fn all_windows(time_window_days: u32) -> Vec<String> {
    let mut windows: Vec<String> = SHORT_WINDOWS.iter().map(|w| w.to_string()).collect();
    windows.push(full_window_literal(time_window_days));
    windows
}

pub fn full_window_literal(time_window_days: u32) -> String {
    format!("{time_window_days}d")
}

pub fn is_supported_window_days(days: u32) -> bool {
    SUPPORTED_WINDOW_DAYS.contains(&days)
}

/// Severity tier of a burn-rate alert condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Page,
    Ticket,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Page => "page",
            Severity::Ticket => "ticket",
        }
    }
}

/// One row of the multi-burn-rate table: a long/short window pair, the
/// fraction of error budget that sustained burn at this rate would consume,
/// and the burn-rate factor threshold derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct BurnRateTier {
    pub severity: Severity,
    pub long_window: &'static str,
    pub short_window: &'static str,
    pub budget_consumed: f64,
    pub factor: f64,
}

/// One (severity, long window, short window, budget-consumed) tuple from
/// the canonical 30-day table. The factor is NOT hardcoded alongside
/// these — it is derived from `budget_consumed * period_seconds /
/// window_seconds` in [`burn_rate_table`], so the same four tuples produce
/// a correct table for every supported window length.
struct TierSpec {
    severity: Severity,
    long_window: &'static str,
    short_window: &'static str,
    budget_consumed: f64,
}

const TIER_SPECS: &[TierSpec] = &[
    TierSpec {
        severity: Severity::Page,
        long_window: "1h",
        short_window: "5m",
        budget_consumed: 0.02,
    },
    TierSpec {
        severity: Severity::Page,
        long_window: "6h",
        short_window: "30m",
        budget_consumed: 0.05,
    },
    TierSpec {
        severity: Severity::Ticket,
        long_window: "1d",
        short_window: "2h",
        budget_consumed: 0.10,
    },
    TierSpec {
        severity: Severity::Ticket,
        long_window: "3d",
        short_window: "6h",
        budget_consumed: 0.10,
    },
];

/// Parses a window literal like `5m`, `1h`, `3d`, `30d` into seconds. Only
/// the unit suffixes this generator ever emits are supported; this is not
/// a general duration parser.
fn window_seconds(window: &str) -> u64 {
    let (value, unit) = window.split_at(window.len() - 1);
    let value: u64 = value.parse().expect("window literal has a numeric prefix");
    match unit {
        "m" => value * 60,
        "h" => value * 3600,
        "d" => value * 86400,
        other => panic!("unsupported window unit '{other}'"),
    }
}

/// Builds the burn-rate table for `time_window_days`, deriving each tier's
/// factor as `budget_consumed * period_seconds / window_seconds`. Fails
/// only if `time_window_days` is outside the supported set.
pub fn burn_rate_table(
    slo_id: &str,
    time_window_days: u32,
) -> Result<Vec<BurnRateTier>, GenerationError> {
    if !is_supported_window_days(time_window_days) {
        return Err(GenerationError::MissingBurnRateTable {
            slo_id: slo_id.to_string(),
            days: time_window_days,
        });
    }

    let period_seconds = (time_window_days as u64) * 86400;
    Ok(TIER_SPECS
        .iter()
        .map(|spec| {
            let window_seconds = window_seconds(spec.long_window);
            let factor = spec.budget_consumed * (period_seconds as f64) / (window_seconds as f64);
            BurnRateTier {
                severity: spec.severity,
                long_window: spec.long_window,
                short_window: spec.short_window,
                budget_consumed: spec.budget_consumed,
                factor,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thirty_day_table_matches_the_documented_factors() {
        let table = burn_rate_table("svc-x", 30).unwrap();
        let factors: Vec<f64> = table.iter().map(|t| t.factor).collect();
        assert!((factors[0] - 14.4).abs() < 1e-9);
        assert!((factors[1] - 6.0).abs() < 1e-9);
        assert!((factors[2] - 3.0).abs() < 1e-9);
        assert!((factors[3] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn unsupported_window_is_rejected() {
        let err = burn_rate_table("svc-x", 31).unwrap_err();
        assert!(matches!(err, GenerationError::MissingBurnRateTable { .. }));
    }

    #[test]
    fn seven_day_table_scales_down_proportionally() {
        let thirty = burn_rate_table("svc-x", 30).unwrap();
        let seven = burn_rate_table("svc-x", 7).unwrap();
        for (a, b) in thirty.iter().zip(seven.iter()) {
            assert!((a.factor / b.factor - 30.0 / 7.0).abs() < 1e-9);
        }
    }

    #[test]
    fn all_windows_appends_full_window_last() {
        let windows = all_windows(30);
        assert_eq!(windows.last().unwrap(), "30d");
        assert_eq!(windows.len(), SHORT_WINDOWS.len() + 1);
    }
}
