//! Textual-encoding normalisation helpers.
//!
//! Racecard sources encode the same facts in many shapes: weight as
//! stones-and-pounds, distance as miles-and-furlongs, going as prose, odds as
//! fractions or decimals. Every function here is total: unparseable input
//! yields `None`, never an error, so a malformed field degrades to missing
//! data instead of failing the race.

/// Convert an "st-lb" carried-weight string to total pounds ("11-4" -> 158).
pub fn weight_to_lbs(weight: &str) -> Option<u32> {
    let (stones, pounds) = weight.trim().split_once('-')?;
    let stones: u32 = stones.trim().parse().ok()?;
    let pounds: u32 = pounds.trim().parse().ok()?;
    Some(stones * 14 + pounds)
}

/// Convert a distance string to furlongs ("2m4f" -> 20.0, "7f" -> 7.0).
/// Trailing yards ("2m4f110y") are ignored.
pub fn distance_to_furlongs(dist: &str) -> Option<f64> {
    let mut miles = 0.0f64;
    let mut furlongs = 0.0f64;
    let mut num = String::new();
    let mut matched = false;

    for ch in dist.trim().to_lowercase().chars() {
        if ch.is_ascii_digit() || ch == '.' {
            num.push(ch);
        } else if ch == 'm' && !num.is_empty() {
            miles = num.parse().ok()?;
            num.clear();
            matched = true;
        } else if ch == 'f' && !num.is_empty() {
            furlongs = num.parse().ok()?;
            num.clear();
            matched = true;
        } else {
            num.clear();
        }
    }

    let total = miles * 8.0 + furlongs;
    if matched && total > 0.0 {
        Some(total)
    } else {
        None
    }
}

/// Map a going/ground description onto the 1 (firm) … 6 (heavy) ordinal.
/// Synonyms fold onto the same ordinal: "yielding" and "good to soft" are
/// both 4, and the all-weather "standard" scale aligns with turf.
pub fn going_ordinal(going: &str) -> Option<f64> {
    let key = going.trim().to_lowercase().replace([' ', '-'], "_");
    match key.as_str() {
        "firm" => Some(1.0),
        "good_to_firm" => Some(2.0),
        "good" | "standard" => Some(3.0),
        "good_to_soft" | "yielding" | "standard_to_slow" => Some(4.0),
        "soft" | "slow" => Some(5.0),
        "heavy" => Some(6.0),
        _ => None,
    }
}

/// Convert fractional ("5/1", "11/4"), decimal ("3.5") or "evens" odds text
/// to decimal odds. Decimal odds <= 1.0 would imply a certainty or worse and
/// are treated as invalid.
pub fn parse_odds(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if text.eq_ignore_ascii_case("evens") || text.eq_ignore_ascii_case("evs") {
        return Some(2.0);
    }

    let decimal = if let Some((num, den)) = text.split_once('/') {
        let num: f64 = num.trim().parse().ok()?;
        let den: f64 = den.trim().parse().ok()?;
        if den <= 0.0 {
            return None;
        }
        round_dp(num / den + 1.0, 2)
    } else {
        text.parse::<f64>().ok()?
    };

    if decimal.is_finite() && decimal > 1.0 {
        Some(decimal)
    } else {
        None
    }
}

/// Round to `dp` decimal places.
pub(crate) fn round_dp(value: f64, dp: u32) -> f64 {
    let factor = 10f64.powi(dp as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_to_lbs() {
        assert_eq!(weight_to_lbs("11-4"), Some(158));
        assert_eq!(weight_to_lbs("10-0"), Some(140));
        assert_eq!(weight_to_lbs(" 9-13 "), Some(139));
        assert_eq!(weight_to_lbs("eleven"), None);
        assert_eq!(weight_to_lbs(""), None);
        assert_eq!(weight_to_lbs("11"), None);
    }

    #[test]
    fn test_distance_to_furlongs() {
        assert_eq!(distance_to_furlongs("2m4f"), Some(20.0));
        assert_eq!(distance_to_furlongs("7f"), Some(7.0));
        assert_eq!(distance_to_furlongs("2m"), Some(16.0));
        assert_eq!(distance_to_furlongs("1m 2f"), Some(10.0));
        assert_eq!(distance_to_furlongs("2m4f110y"), Some(20.0));
        assert_eq!(distance_to_furlongs("7.5f"), Some(7.5));
        assert_eq!(distance_to_furlongs("about a mile"), None);
        assert_eq!(distance_to_furlongs(""), None);
    }

    #[test]
    fn test_going_ordinal_synonyms() {
        assert_eq!(going_ordinal("Firm"), Some(1.0));
        assert_eq!(going_ordinal("good to soft"), Some(4.0));
        assert_eq!(going_ordinal("yielding"), Some(4.0));
        assert_eq!(going_ordinal("good_to_soft"), Some(4.0));
        assert_eq!(going_ordinal("Standard"), Some(3.0));
        assert_eq!(going_ordinal("standard to slow"), Some(4.0));
        assert_eq!(going_ordinal("Heavy"), Some(6.0));
        assert_eq!(going_ordinal("muddy"), None);
    }

    #[test]
    fn test_parse_odds() {
        assert_eq!(parse_odds("5/1"), Some(6.0));
        assert_eq!(parse_odds("11/4"), Some(3.75));
        assert_eq!(parse_odds("evens"), Some(2.0));
        assert_eq!(parse_odds("EVS"), Some(2.0));
        assert_eq!(parse_odds("3.5"), Some(3.5));
        assert_eq!(parse_odds("100"), Some(100.0));
        assert_eq!(parse_odds("nope"), None);
    }

    #[test]
    fn test_parse_odds_rejects_impossible_prices() {
        // A runner cannot have <= 0% implied probability.
        assert_eq!(parse_odds("1.0"), None);
        assert_eq!(parse_odds("0.5"), None);
        assert_eq!(parse_odds("0/1"), None);
        assert_eq!(parse_odds("5/0"), None);
    }

    #[test]
    fn test_round_dp() {
        assert_eq!(round_dp(66.666_666, 1), 66.7);
        assert_eq!(round_dp(0.123_449, 4), 0.1234);
    }
}
