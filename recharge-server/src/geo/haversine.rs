//! Great-circle distance.

use crate::domain::LonLat;

/// Mean Earth radius in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance between two coordinates, in metres.
pub fn haversine_m(from: LonLat, to: LonLat) -> f64 {
    let lat1_rad = from.lat.to_radians();
    let lat2_rad = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_lon = (to.lon - from.lon).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair past 1 for antipodal points.
    let c = 2.0 * a.clamp(0.0, 1.0).sqrt().asin();

    EARTH_RADIUS_M * c
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pt(lon: f64, lat: f64) -> LonLat {
        LonLat::new(lon, lat).unwrap()
    }

    #[test]
    fn same_point_is_zero() {
        let p = pt(113.485659, 23.155489);
        assert_eq!(haversine_m(p, p), 0.0);
    }

    #[test]
    fn one_degree_of_latitude() {
        let d = haversine_m(pt(113.0, 23.0), pt(113.0, 24.0));
        assert!((d - 111_195.0).abs() < 10.0, "got {d}");
    }

    #[test]
    fn directional_service_areas_are_close() {
        // The two halves of one service area sit either side of the highway.
        let a = pt(113.485659, 23.155489);
        let b = pt(113.484471, 23.156617);
        let d = haversine_m(a, b);
        assert!(d > 100.0 && d < 250.0, "got {d}");
    }

    fn coord() -> impl Strategy<Value = LonLat> {
        (-180.0f64..=180.0, -90.0f64..=90.0).prop_map(|(lon, lat)| pt(lon, lat))
    }

    proptest! {
        #[test]
        fn symmetric(a in coord(), b in coord()) {
            let ab = haversine_m(a, b);
            let ba = haversine_m(b, a);
            prop_assert!((ab - ba).abs() < 1e-6);
        }

        #[test]
        fn bounded_by_half_circumference(a in coord(), b in coord()) {
            let d = haversine_m(a, b);
            prop_assert!(d >= 0.0);
            prop_assert!(d <= std::f64::consts::PI * EARTH_RADIUS_M + 1e-6);
        }

        #[test]
        fn triangle_inequality(a in coord(), b in coord(), c in coord()) {
            let direct = haversine_m(a, c);
            let via = haversine_m(a, b) + haversine_m(b, c);
            prop_assert!(direct <= via + 1e-3);
        }
    }
}
