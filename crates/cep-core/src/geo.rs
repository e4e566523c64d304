// crates/cep-core/src/geo.rs

//! # Geo helpers
//!
//! Great-circle distance and the state-centroid approximation.
//!
//! The dataset carries no coordinates. The only "real" positions are the 27
//! state capitals below; every other coordinate is a capital plus a bounded
//! random offset. Results are therefore accurate to a state, not to a street.

use crate::error::{CepError, Result};
use crate::traits::JitterSource;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Default jitter amplitude in degrees (about 5 km).
pub const DEFAULT_JITTER_DEGREES: f64 = 0.045;

/// UF used when an address has no UF or an unknown one.
pub const FALLBACK_UF: &str = "DF";

/// State capitals, in table order. Ties in [`nearest_state`] go to the
/// earlier entry.
pub const STATE_CENTROIDS: [(&str, f64, f64); 27] = [
    ("AC", -9.97499, -67.82462),
    ("AL", -9.64706, -35.73309),
    ("AM", -3.10719, -60.02613),
    ("AP", 0.03861, -51.05653),
    ("BA", -12.97111, -38.51083),
    ("CE", -3.71839, -38.54343),
    ("DF", -15.77972, -47.92972),
    ("ES", -20.31778, -40.33778),
    ("GO", -16.67861, -49.25389),
    ("MA", -2.53073, -44.30278),
    ("MG", -19.92083, -43.93778),
    ("MS", -20.44278, -54.64722),
    ("MT", -15.59889, -56.09667),
    ("PA", -1.45583, -48.50444),
    ("PB", -7.11528, -34.86306),
    ("PE", -8.05389, -34.88111),
    ("PI", -5.09194, -42.80333),
    ("PR", -25.42778, -49.27306),
    ("RJ", -22.90278, -43.20722),
    ("RN", -5.79500, -35.20944),
    ("RO", -8.76194, -63.90389),
    ("RR", 2.82056, -60.67333),
    ("RS", -30.03306, -51.23000),
    ("SC", -27.59667, -48.54917),
    ("SE", -10.91111, -37.07167),
    ("SP", -23.55052, -46.63331),
    ("TO", -10.18889, -48.33361),
];

/// A validated latitude/longitude pair in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Latitude in `[-90, 90]`, longitude in `[-180, 180]`.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CepError::Format(format!(
                "latitude must be between -90 and 90, got {latitude}"
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CepError::Format(format!(
                "longitude must be between -180 and 180, got {longitude}"
            )));
        }
        Ok(GeoPoint {
            latitude,
            longitude,
        })
    }

    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        distance_km(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}

#[inline]
fn to_radians(degrees: f64) -> f64 {
    degrees * std::f64::consts::PI / 180.0
}

/// Haversine great-circle distance in kilometres.
///
/// ```rust
/// use cep_core::geo::distance_km;
/// let d = distance_km(-23.55052, -46.63331, -22.90278, -43.20722);
/// assert!((d - 358.0).abs() < 3.0);
/// ```
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = to_radians(lat2 - lat1);
    let d_lon = to_radians(lon2 - lon1);

    let a = (d_lat / 2.0).sin() * (d_lat / 2.0).sin()
        + to_radians(lat1).cos()
            * to_radians(lat2).cos()
            * (d_lon / 2.0).sin()
            * (d_lon / 2.0).sin();
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Rounds to two decimals, the precision distances are reported with.
pub fn round_km(km: f64) -> f64 {
    (km * 100.0).round() / 100.0
}

/// Capital coordinates of a UF (case-insensitive).
pub fn centroid(uf: &str) -> Option<GeoPoint> {
    STATE_CENTROIDS
        .iter()
        .find(|(code, _, _)| code.eq_ignore_ascii_case(uf))
        .map(|&(_, latitude, longitude)| GeoPoint {
            latitude,
            longitude,
        })
}

/// UF whose capital is closest to the point. Linear scan; the first entry
/// wins ties.
pub fn nearest_state(latitude: f64, longitude: f64) -> &'static str {
    let mut best = STATE_CENTROIDS[0].0;
    let mut best_distance = f64::INFINITY;
    for &(code, lat, lon) in STATE_CENTROIDS.iter() {
        let d = distance_km(latitude, longitude, lat, lon);
        if d < best_distance {
            best_distance = d;
            best = code;
        }
    }
    best
}

/// Capital of `uf` (or of [`FALLBACK_UF`]) offset independently on each axis
/// by a jitter of at most `max_jitter` degrees.
pub fn approximate_coordinates(
    uf: Option<&str>,
    jitter: &dyn JitterSource,
    max_jitter: f64,
) -> GeoPoint {
    let base = uf
        .and_then(centroid)
        .or_else(|| centroid(FALLBACK_UF))
        .unwrap_or(GeoPoint {
            latitude: STATE_CENTROIDS[6].1,
            longitude: STATE_CENTROIDS[6].2,
        });
    GeoPoint {
        latitude: base.latitude + jitter.jitter(max_jitter),
        longitude: base.longitude + jitter.jitter(max_jitter),
    }
}

/// Uniform jitter from the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomJitter;

impl JitterSource for RandomJitter {
    fn jitter(&self, max_abs: f64) -> f64 {
        if max_abs <= 0.0 {
            return 0.0;
        }
        rand::thread_rng().gen_range(-max_abs..=max_abs)
    }
}

/// No jitter: approximate coordinates are exactly the capital.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZeroJitter;

impl JitterSource for ZeroJitter {
    fn jitter(&self, _max_abs: f64) -> f64 {
        0.0
    }
}

/// Always the same offset, clamped to the allowed amplitude.
#[derive(Debug, Clone, Copy)]
pub struct FixedJitter(pub f64);

impl JitterSource for FixedJitter {
    fn jitter(&self, max_abs: f64) -> f64 {
        self.0.clamp(-max_abs.abs(), max_abs.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn latitude() -> impl Strategy<Value = f64> {
        -90.0f64..=90.0
    }

    fn longitude() -> impl Strategy<Value = f64> {
        -180.0f64..=180.0
    }

    proptest! {
        #[test]
        fn haversine_is_symmetric(
            a_lat in latitude(),
            a_lon in longitude(),
            b_lat in latitude(),
            b_lon in longitude()
        ) {
            let ab = distance_km(a_lat, a_lon, b_lat, b_lon);
            let ba = distance_km(b_lat, b_lon, a_lat, a_lon);
            prop_assert!((ab - ba).abs() < 1e-9, "{} vs {}", ab, ba);
            prop_assert!(ab >= 0.0);
        }

        #[test]
        fn haversine_is_zero_on_self(lat in latitude(), lon in longitude()) {
            prop_assert_eq!(distance_km(lat, lon, lat, lon), 0.0);
        }

        #[test]
        fn geo_point_accepts_exactly_valid_coordinates(lat in -200.0f64..200.0, lon in -400.0f64..400.0) {
            let valid = (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon);
            prop_assert_eq!(GeoPoint::new(lat, lon).is_ok(), valid);
        }

        /// Approximate coordinates stay within the jitter box around the capital.
        #[test]
        fn approximation_stays_near_capital(idx in 0usize..27, offset in -1.0f64..1.0) {
            let (uf, lat, lon) = STATE_CENTROIDS[idx];
            let p = approximate_coordinates(Some(uf), &FixedJitter(offset), DEFAULT_JITTER_DEGREES);
            prop_assert!((p.latitude - lat).abs() <= DEFAULT_JITTER_DEGREES + 1e-12);
            prop_assert!((p.longitude - lon).abs() <= DEFAULT_JITTER_DEGREES + 1e-12);
        }
    }

    #[test]
    fn sao_paulo_to_rio() {
        let d = distance_km(-23.55052, -46.63331, -22.90278, -43.20722);
        assert!((355.0..=362.0).contains(&d), "got {d}");
    }

    #[test]
    fn brasilia_maps_to_df() {
        assert_eq!(nearest_state(-15.7797, -47.9297), "DF");
        assert_eq!(nearest_state(-23.5, -46.6), "SP");
        assert_eq!(nearest_state(-30.0, -51.2), "RS");
    }

    #[test]
    fn every_centroid_is_its_own_nearest_state() {
        for (code, lat, lon) in STATE_CENTROIDS {
            assert_eq!(nearest_state(lat, lon), code);
            assert!(GeoPoint::new(lat, lon).is_ok());
        }
    }

    #[test]
    fn approximation_falls_back_to_df() {
        let p = approximate_coordinates(Some("XX"), &ZeroJitter, DEFAULT_JITTER_DEGREES);
        assert_eq!(p, centroid("DF").unwrap());
        let p = approximate_coordinates(None, &ZeroJitter, DEFAULT_JITTER_DEGREES);
        assert_eq!(p, centroid("DF").unwrap());
        let p = approximate_coordinates(Some("sp"), &ZeroJitter, DEFAULT_JITTER_DEGREES);
        assert_eq!(p, centroid("SP").unwrap());
    }

    #[test]
    fn random_jitter_stays_in_bounds() {
        let sp = centroid("SP").unwrap();
        for _ in 0..500 {
            let p = approximate_coordinates(Some("SP"), &RandomJitter, DEFAULT_JITTER_DEGREES);
            assert!((p.latitude - sp.latitude).abs() <= DEFAULT_JITTER_DEGREES + 1e-12);
            assert!((p.longitude - sp.longitude).abs() <= DEFAULT_JITTER_DEGREES + 1e-12);
        }
    }

    #[test]
    fn fixed_jitter_is_clamped() {
        assert_eq!(FixedJitter(0.01).jitter(0.045), 0.01);
        assert_eq!(FixedJitter(1.0).jitter(0.045), 0.045);
        assert_eq!(FixedJitter(-1.0).jitter(0.045), -0.045);
    }

    #[test]
    fn coordinates_are_validated() {
        assert!(GeoPoint::new(90.0, 180.0).is_ok());
        assert!(GeoPoint::new(-90.0, -180.0).is_ok());
        assert!(matches!(GeoPoint::new(90.1, 0.0), Err(CepError::Format(_))));
        assert!(matches!(GeoPoint::new(0.0, -180.5), Err(CepError::Format(_))));
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn rounding_to_two_decimals() {
        assert_eq!(round_km(357.4567), 357.46);
        assert_eq!(round_km(0.0), 0.0);
    }
}
