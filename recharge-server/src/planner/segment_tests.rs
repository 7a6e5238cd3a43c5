//! Route segmentation against an in-memory map.

use super::*;
use crate::amap::MapError;
use crate::catalog::{DistrictIndex, RegionIndex, StationCatalog};
use crate::domain::{DrivingPath, LonLat, PathStep, RegionRef, Route, Station};
use crate::geo::{PathProvider, haversine_m};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

fn pt(lon: f64, lat: f64) -> LonLat {
    LonLat::new(lon, lat).unwrap()
}

fn key(from: LonLat, to: LonLat) -> (String, String) {
    (from.to_string(), to.to_string())
}

/// Path provider with fixed routes for some pairs and a detour-factor
/// estimate for everything else.
struct MockPaths {
    routes: HashMap<(String, String), Arc<DrivingPath>>,
    distances: HashMap<(String, String), f64>,
    blocked: HashSet<(String, String)>,
    calls: Mutex<Vec<(LonLat, LonLat)>>,
}

impl MockPaths {
    fn new() -> Self {
        Self {
            routes: HashMap::new(),
            distances: HashMap::new(),
            blocked: HashSet::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn route(mut self, from: LonLat, to: LonLat, path: DrivingPath) -> Self {
        self.routes.insert(key(from, to), Arc::new(path));
        self
    }

    fn distance(mut self, from: LonLat, to: LonLat, metres: f64) -> Self {
        self.distances.insert(key(from, to), metres);
        self
    }

    fn block(mut self, from: LonLat, to: LonLat) -> Self {
        self.blocked.insert(key(from, to));
        self
    }

    fn call_count(&self, from: LonLat, to: LonLat) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(a, b)| *a == from && *b == to)
            .count()
    }
}

impl PathProvider for MockPaths {
    async fn driving_path(&self, from: LonLat, to: LonLat) -> Result<Arc<DrivingPath>, MapError> {
        self.calls.lock().unwrap().push((from, to));
        let k = key(from, to);
        if self.blocked.contains(&k) {
            return Err(MapError::NoRoute { from, to });
        }
        if let Some(path) = self.routes.get(&k) {
            return Ok(Arc::clone(path));
        }

        let distance_m = self
            .distances
            .get(&k)
            .copied()
            .unwrap_or_else(|| haversine_m(from, to) * 1.2);
        Ok(Arc::new(DrivingPath {
            distance_m,
            duration_s: distance_m / 25.0,
            steps: vec![PathStep {
                distance_m,
                toll: true,
                duration_s: distance_m / 25.0,
                polyline: vec![],
                regions: vec![],
            }],
        }))
    }
}

fn origin() -> Station {
    Station::new("广州市黄埔区", pt(112.99, 23.0))
}

fn destination() -> Station {
    Station::new("河源市", pt(113.21, 23.0))
}

fn jia() -> Station {
    Station::new("甲服务区", pt(113.05, 23.0))
}

// The two carriageway halves of 乙, each ~440 m / ~410 m from the samples
// at 113.097 and 113.105.
fn yi_west() -> Station {
    Station::new("乙服务区(西向)", pt(113.101, 23.0015))
}

fn yi_east() -> Station {
    Station::new("乙服务区(东向)", pt(113.101, 23.0))
}

fn bing() -> Station {
    Station::new("丙服务区", pt(113.153, 23.0))
}

fn catalog() -> StationCatalog {
    let mut districts = DistrictIndex::new();
    districts.insert("黄埔区".into(), vec![jia(), yi_west(), yi_east(), bing()]);
    let mut regions = RegionIndex::new();
    regions.insert("广州市".into(), districts);
    StationCatalog::new(regions).unwrap()
}

/// 20 km of highway due east along latitude 23°, one vertex every 0.001°.
///
/// With 800 m spacing the 200 usable vertices are strided by 8, so samples
/// fall at 113.001, 113.009, ..., 113.193.
fn highway_step(region: &str, distance_m: f64, toll: bool) -> PathStep {
    PathStep {
        distance_m,
        toll,
        duration_s: distance_m / 30.0,
        polyline: (0..=200).map(|i| pt(113.0 + i as f64 * 0.001, 23.0)).collect(),
        regions: vec![RegionRef::new(region, vec!["黄埔区".into()])],
    }
}

fn trip_path(step: PathStep) -> DrivingPath {
    DrivingPath {
        distance_m: 22_000.0,
        duration_s: 900.0,
        steps: vec![step],
    }
}

fn highway_map() -> MockPaths {
    MockPaths::new().route(
        origin().location,
        destination().location,
        trip_path(highway_step("广州市", 20_000.0, true)),
    )
}

async fn segment(paths: &MockPaths, end: &Station) -> Result<Route, PlanError> {
    let catalog = catalog();
    let config = SegmenterConfig::default();
    let vehicle = VehicleConfig::default();
    RouteSegmenter::new(&catalog, paths, &config, &vehicle)
        .segment(&origin(), end)
        .await
}

fn stops(route: &Route) -> Vec<(&str, &str)> {
    route.legs().iter().map(|l| (l.start(), l.end())).collect()
}

#[tokio::test]
async fn legs_follow_driving_order() {
    let paths = highway_map();
    let route = segment(&paths, &destination()).await.unwrap();

    assert_eq!(
        stops(&route),
        vec![
            ("广州市黄埔区", "甲服务区"),
            ("甲服务区", "乙服务区(东向)"),
            ("乙服务区(东向)", "丙服务区"),
            ("丙服务区", "河源市"),
        ]
    );
    assert_eq!(route.origin(), "广州市黄埔区");
    assert_eq!(route.destination(), "河源市");
    assert_eq!(paths.call_count(origin().location, destination().location), 1);
}

#[tokio::test]
async fn legs_are_costed() {
    let paths = highway_map();
    let route = segment(&paths, &destination()).await.unwrap();

    for leg in route.legs() {
        assert!(leg.distance_km() > 0.0);
        assert!(leg.consumed_battery_kwh() > 0.0);
    }
    // 甲 → 乙(东向): 0.051° of longitude at 23°N, times the 1.2 detour.
    let second = &route.legs()[1];
    let metres = haversine_m(jia().location, yi_east().location) * 1.2;
    assert_eq!(second.distance_km(), round_to(metres / 1000.0, 1));
}

#[tokio::test]
async fn carriageway_chosen_by_driving_distance() {
    // Make the eastbound half a long way round from 甲.
    let paths = highway_map().distance(jia().location, yi_east().location, 9_000.0);
    let route = segment(&paths, &destination()).await.unwrap();

    assert_eq!(
        stops(&route),
        vec![
            ("广州市黄埔区", "甲服务区"),
            ("甲服务区", "乙服务区(西向)"),
            ("乙服务区(西向)", "丙服务区"),
            ("丙服务区", "河源市"),
        ]
    );
}

#[tokio::test]
async fn repeated_matches_collapse() {
    // Two samples land within range of 乙; it must appear once.
    let paths = highway_map();
    let route = segment(&paths, &destination()).await.unwrap();
    let arrivals_at_yi = route
        .legs()
        .iter()
        .filter(|l| l.end().starts_with("乙服务区"))
        .count();
    assert_eq!(arrivals_at_yi, 1);
}

#[tokio::test]
async fn non_toll_steps_not_sampled() {
    let paths = MockPaths::new().route(
        origin().location,
        destination().location,
        trip_path(highway_step("广州市", 20_000.0, false)),
    );
    let route = segment(&paths, &destination()).await.unwrap();
    assert_eq!(stops(&route), vec![("广州市黄埔区", "河源市")]);
}

#[tokio::test]
async fn short_steps_not_sampled() {
    let paths = MockPaths::new().route(
        origin().location,
        destination().location,
        trip_path(highway_step("广州市", 400.0, true)),
    );
    let route = segment(&paths, &destination()).await.unwrap();
    assert_eq!(route.len(), 1);
}

#[tokio::test]
async fn trip_ending_at_a_station() {
    let paths = MockPaths::new().route(
        origin().location,
        bing().location,
        trip_path(highway_step("广州市", 20_000.0, true)),
    );
    let route = segment(&paths, &bing()).await.unwrap();

    assert_eq!(route.len(), 3);
    assert_eq!(route.destination(), "丙服务区");
}

#[tokio::test]
async fn missing_trip_route() {
    let paths = MockPaths::new().block(origin().location, destination().location);
    let err = segment(&paths, &destination()).await.unwrap_err();
    assert!(matches!(
        err,
        PlanError::RouteUnavailable { from, to } if from == "广州市黄埔区" && to == "河源市"
    ));
}

#[tokio::test]
async fn missing_leg_route_names_stations() {
    let paths = highway_map().block(yi_east().location, bing().location);
    let err = segment(&paths, &destination()).await.unwrap_err();
    assert!(matches!(
        err,
        PlanError::RouteUnavailable { from, to } if from == "乙服务区(东向)" && to == "丙服务区"
    ));
}

#[tokio::test]
async fn uncovered_region() {
    let paths = MockPaths::new().route(
        origin().location,
        destination().location,
        trip_path(highway_step("河源市", 20_000.0, true)),
    );
    let err = segment(&paths, &destination()).await.unwrap_err();
    assert!(matches!(err, PlanError::DataCoverageGap { region } if region == "河源市"));
}
