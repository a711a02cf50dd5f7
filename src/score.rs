use crate::error::{GameError, Result};

/// Percentage of the deck answered without a mistake, clamped at zero.
///
/// `round_to` rounds half away from zero to the given number of decimals.
pub fn score_percent(mistakes: i64, total: i64, round_to: Option<u32>) -> Result<f64> {
    if mistakes < 0 || total < 0 {
        return Err(GameError::InvalidArgument(format!(
            "mistakes ({mistakes}) and total ({total}) must be non-negative"
        )));
    }

    if mistakes == 0 {
        return Ok(100.0);
    }

    if total == 0 {
        return Err(GameError::DivideByZero { mistakes });
    }

    let percent = 100.0 * (total - mistakes).max(0) as f64 / total as f64;

    Ok(match round_to {
        Some(digits) => round_half_away(percent, digits),
        None => percent,
    })
}

fn round_half_away(value: f64, digits: u32) -> f64 {
    let factor = 10f64.powi(digits as i32);
    (value * factor).round() / factor
}
