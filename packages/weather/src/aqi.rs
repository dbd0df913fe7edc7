//! PM2.5 to US EPA AQI conversion and coarse seasonal estimation.

use chrono::{DateTime, Datelike, Utc};

/// One band of the piecewise-linear AQI breakpoint table: a concentration
/// range mapped linearly onto an index range.
struct Breakpoint {
    c_low: f64,
    c_high: f64,
    i_low: i32,
    i_high: i32,
}

/// US EPA PM2.5 breakpoints, February 2024 revision (88 FR 5558). The "Good"
/// ceiling dropped from 12.0 to 9.0 µg/m³ and the "Very Unhealthy" ceiling
/// from 150.4 to 125.4 µg/m³.
const PM25_BREAKPOINTS: [Breakpoint; 7] = [
    Breakpoint { c_low: 0.0, c_high: 9.0, i_low: 0, i_high: 50 },
    Breakpoint { c_low: 9.1, c_high: 35.4, i_low: 51, i_high: 100 },
    Breakpoint { c_low: 35.5, c_high: 55.4, i_low: 101, i_high: 150 },
    Breakpoint { c_low: 55.5, c_high: 125.4, i_low: 151, i_high: 200 },
    Breakpoint { c_low: 125.5, c_high: 225.4, i_low: 201, i_high: 300 },
    Breakpoint { c_low: 225.5, c_high: 325.4, i_low: 301, i_high: 400 },
    Breakpoint { c_low: 325.5, c_high: 500.4, i_low: 401, i_high: 500 },
];

/// Converts a PM2.5 concentration in µg/m³ to the US EPA AQI.
///
/// Linear interpolation within the matching band, exact at band boundaries,
/// clamped to 500 above the last band and to 0 below the first.
#[must_use]
pub fn pm25_to_aqi(pm25: f64) -> i32 {
    if !pm25.is_finite() || pm25 <= 0.0 {
        return 0;
    }

    for bp in &PM25_BREAKPOINTS {
        if pm25 <= bp.c_high {
            let t = ((pm25 - bp.c_low) / (bp.c_high - bp.c_low)).clamp(0.0, 1.0);
            let aqi = f64::from(bp.i_high - bp.i_low).mul_add(t, f64::from(bp.i_low));
            #[allow(clippy::cast_possible_truncation)]
            return aqi.round() as i32;
        }
    }

    500
}

/// Coarse AQI estimate from season and temperature, used when the air-quality
/// endpoint fails but the main weather fetch succeeded.
///
/// Winter temperature inversions trap smog over the city, so cold winter days
/// score far worse than warm summer ones.
#[must_use]
pub fn estimate_aqi(temperature: f64, now: DateTime<Utc>) -> i32 {
    let month = now.month();
    let is_winter = month == 12 || month <= 2;

    if is_winter && temperature < -10.0 {
        200
    } else if is_winter && temperature < 0.0 {
        160
    } else if temperature > 25.0 {
        45
    } else {
        80
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;

    use super::*;

    #[test]
    fn band_boundaries_map_exactly() {
        assert_eq!(pm25_to_aqi(9.0), 50);
        assert_eq!(pm25_to_aqi(35.4), 100);
        assert_eq!(pm25_to_aqi(55.4), 150);
        assert_eq!(pm25_to_aqi(125.4), 200);
        assert_eq!(pm25_to_aqi(225.4), 300);
        assert_eq!(pm25_to_aqi(325.4), 400);
        assert_eq!(pm25_to_aqi(500.4), 500);
    }

    #[test]
    fn clamps_outside_the_table() {
        assert_eq!(pm25_to_aqi(0.0), 0);
        assert_eq!(pm25_to_aqi(-3.0), 0);
        assert_eq!(pm25_to_aqi(750.0), 500);
        assert_eq!(pm25_to_aqi(f64::NAN), 0);
    }

    #[test]
    fn interpolates_within_a_band() {
        // Midpoint of the 35.5..=55.4 band lands mid-way through 101..=150.
        let mid = pm25_to_aqi(45.45);
        assert!((120..=131).contains(&mid), "got {mid}");
    }

    #[test]
    fn conversion_is_monotonic() {
        let mut last = 0;
        for tenth in 0..5010 {
            let aqi = pm25_to_aqi(f64::from(tenth) / 10.0);
            assert!(aqi >= last, "regression at {tenth}");
            last = aqi;
        }
    }

    #[test]
    fn winter_inversion_estimates_high() {
        let january = Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap();
        let july = Utc.with_ymd_and_hms(2025, 7, 15, 12, 0, 0).unwrap();

        assert_eq!(estimate_aqi(-15.0, january), 200);
        assert_eq!(estimate_aqi(-5.0, january), 160);
        assert_eq!(estimate_aqi(30.0, july), 45);
        assert_eq!(estimate_aqi(15.0, july), 80);
    }
}
