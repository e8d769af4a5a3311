use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

pub const DEFAULT_MAX_H_TICKS: usize = 10;
pub const DEFAULT_MAX_V_TICKS: usize = 7;

const STEP_MANTISSAS: [f64; 3] = [1.0, 2.0, 5.0];

/// Relative distance, in units of `f64::EPSILON`, within which a bound counts
/// as an exact multiple of the step.
const MULTIPLE_TOLERANCE_EPSILONS: f64 = 8.0;

/// One labeled reference position along an axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub value: f64,
    pub label: String,
}

/// Wholesale-regenerated tick sequence for one axis.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TickSet {
    pub step: f64,
    pub ticks: SmallVec<[Tick; 10]>,
}

impl TickSet {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.ticks.iter().map(|tick| tick.value)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.ticks.iter().map(|tick| tick.label.as_str())
    }
}

/// Picks "nice" tick positions for `[lo, hi]`.
///
/// The step comes from `{1, 2, 5} x 10^k` and is the smallest one that yields
/// at most `max_ticks` ticks, which gives the largest admissible tick count.
/// Labels carry just enough decimals to tell adjacent ticks apart.
#[must_use]
pub fn gen_ticks(lo: f64, hi: f64, max_ticks: usize) -> TickSet {
    if max_ticks == 0 || !lo.is_finite() || !hi.is_finite() || lo >= hi {
        return TickSet::default();
    }

    let Some((step, exponent)) = select_step(lo, hi, max_ticks) else {
        return TickSet::default();
    };

    let (first, last) = index_range(lo, hi, step);
    let decimals = if exponent < 0 {
        exponent.unsigned_abs() as usize
    } else {
        0
    };

    let ticks = (first..=last)
        .map(|index| {
            let value = (index as f64 * step).clamp(lo, hi);
            Tick {
                value,
                label: format_tick(value, decimals),
            }
        })
        .collect();

    TickSet { step, ticks }
}

fn select_step(lo: f64, hi: f64, max_ticks: usize) -> Option<(f64, i32)> {
    let span = hi - lo;
    if !span.is_finite() || span <= 0.0 {
        return None;
    }

    // Start one decade below the naive estimate so every admissible step is
    // visited in ascending order.
    let mut exponent = (span / max_ticks as f64).log10().floor() as i32 - 1;
    for _ in 0..8 {
        let decade = 10f64.powi(exponent);
        for mantissa in STEP_MANTISSAS {
            let step = mantissa * decade;
            if tick_count(lo, hi, step) <= max_ticks as f64 {
                return Some((step, exponent));
            }
        }
        exponent += 1;
    }
    None
}

fn tick_count(lo: f64, hi: f64, step: f64) -> f64 {
    let (first, last) = index_range(lo, hi, step);
    (last as f64 - first as f64 + 1.0).max(0.0)
}

/// Indices of the first and last multiple of `step` inside `[lo, hi]`.
fn index_range(lo: f64, hi: f64, step: f64) -> (i64, i64) {
    let first = snap_to_integer(lo / step).unwrap_or_else(|| (lo / step).ceil());
    let last = snap_to_integer(hi / step).unwrap_or_else(|| (hi / step).floor());
    (first as i64, last as i64)
}

/// `0.3 / 0.05` lands on 5.999..., which must still count as 6.
fn snap_to_integer(quotient: f64) -> Option<f64> {
    let nearest = quotient.round();
    let tolerance = MULTIPLE_TOLERANCE_EPSILONS * f64::EPSILON * quotient.abs().max(1.0);
    ((quotient - nearest).abs() <= tolerance).then_some(nearest)
}

fn format_tick(value: f64, decimals: usize) -> String {
    let text = format!("{value:.decimals$}");
    if text.starts_with('-') && text[1..].chars().all(|c| c == '0' || c == '.') {
        text[1..].to_owned()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::{format_tick, index_range, select_step};

    #[test]
    fn negative_zero_is_printed_without_sign() {
        assert_eq!(format_tick(-0.0, 0), "0");
        assert_eq!(format_tick(-0.000_01, 2), "0.00");
    }

    #[test]
    fn bounds_landing_just_off_a_multiple_are_snapped() {
        assert_eq!(index_range(0.0, 0.3, 0.05), (0, 6));
        assert_eq!(index_range(0.1, 0.7, 0.1), (1, 7));
        assert_eq!(index_range(-0.3, -0.1, 0.1), (-3, -1));
        assert_eq!(index_range(0.04, 0.26, 0.05), (1, 5));
    }

    #[test]
    fn step_selection_prefers_more_ticks() {
        let (step, exponent) = select_step(0.0, 1.0, 11).expect("step");
        assert_eq!(exponent, -1);
        assert!((step - 0.1).abs() <= 1e-15);
    }
}
