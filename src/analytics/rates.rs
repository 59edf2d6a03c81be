//! Rate arithmetic with a single rounding policy.
//!
//! Percentages carry one decimal place, ratios two, both rounded half
//! away from zero. Zero denominators never panic and never produce NaN:
//! percentages degrade to 0.0, per-death ratios to `None`. The
//! distinction matters because a 0% rate is a real (bad) rate, while a
//! ratio over zero deaths is not a number at all.

/// Rounds to one decimal place, half away from zero.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Rounds to two decimal places, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `part` as a percentage of `whole`, one decimal place. 0.0 when
/// `whole` is zero.
pub fn percent(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        0.0
    } else {
        round1(part as f64 * 100.0 / whole as f64)
    }
}

/// Kills per death, two decimal places. `None` when `deaths` is zero.
pub fn kd(kills: u32, deaths: u32) -> Option<f64> {
    if deaths == 0 {
        None
    } else {
        Some(round2(kills as f64 / deaths as f64))
    }
}

/// (kills + 0.5 * assists) per death, two decimal places, same
/// zero-deaths guard as [`kd`].
pub fn kda(kills: u32, assists: u32, deaths: u32) -> Option<f64> {
    if deaths == 0 {
        None
    } else {
        Some(round2((kills as f64 + 0.5 * assists as f64) / deaths as f64))
    }
}

/// Signed mean of `(won - lost)` over `games`, one decimal place.
/// 0.0 when `games` is zero.
pub fn mean_diff(won: i64, lost: i64, games: u32) -> f64 {
    if games == 0 {
        0.0
    } else {
        round1((won - lost) as f64 / games as f64)
    }
}
