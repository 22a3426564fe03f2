//! Hexagonal density binning for the collision density map.
//!
//! Points are projected onto a local equirectangular plane around the map
//! center (meters), binned into pointy-top hexagons using axial coordinates,
//! and mapped back to latitude/longitude for drawing.

use super::calculator::Midpoint;
use crate::data::GeoPoint;
use serde::Serialize;
use std::collections::HashMap;

/// Meters per degree of latitude.
const METERS_PER_DEGREE: f64 = 111_320.0;

const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Camera of the density map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewState {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: f64,
    pub pitch: f64,
}

impl ViewState {
    pub const ZOOM: f64 = 11.0;
    pub const PITCH: f64 = 50.0;

    pub fn centered_on(midpoint: Midpoint) -> Self {
        Self {
            latitude: midpoint.latitude,
            longitude: midpoint.longitude,
            zoom: Self::ZOOM,
            pitch: Self::PITCH,
        }
    }

    /// Longitude span visible in a 1024px wide web-mercator viewport.
    pub fn longitude_span(&self) -> f64 {
        360.0 * 1024.0 / (256.0 * 2f64.powf(self.zoom))
    }
}

/// Hexagon layer settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DensityLayer {
    /// Hexagon radius in meters.
    pub radius: f64,
    pub elevation_scale: f64,
    pub elevation_range: [f64; 2],
    pub extruded: bool,
    pub pickable: bool,
}

impl Default for DensityLayer {
    fn default() -> Self {
        Self {
            radius: 100.0,
            elevation_scale: 4.0,
            elevation_range: [0.0, 1000.0],
            extruded: true,
            pickable: true,
        }
    }
}

/// One occupied hexagon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HexCell {
    /// Axial coordinates (q, r).
    pub axial: (i64, i64),
    pub latitude: f64,
    pub longitude: f64,
    pub count: usize,
    pub elevation: f64,
}

/// Everything the density map needs to draw one hour.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DensityView {
    pub view_state: ViewState,
    pub layer: DensityLayer,
    pub cells: Vec<HexCell>,
}

impl DensityView {
    pub fn new(midpoint: Midpoint, points: &[GeoPoint], layer: DensityLayer) -> Self {
        Self {
            view_state: ViewState::centered_on(midpoint),
            layer,
            cells: hexbin(points, midpoint, &layer),
        }
    }

    pub fn max_count(&self) -> usize {
        self.cells.iter().map(|c| c.count).max().unwrap_or(0)
    }

    /// Hexagon outline of a cell as [lon, lat] pairs.
    pub fn outline(&self, cell: &HexCell) -> Vec<[f64; 2]> {
        let origin = Midpoint {
            latitude: self.view_state.latitude,
            longitude: self.view_state.longitude,
        };
        let (cx, cy) = project(cell.latitude, cell.longitude, origin);
        (0..6)
            .map(|i| {
                let angle = (60.0 * i as f64 - 30.0).to_radians();
                let (lat, lon) = unproject(
                    cx + self.layer.radius * angle.cos(),
                    cy + self.layer.radius * angle.sin(),
                    origin,
                );
                [lon, lat]
            })
            .collect()
    }
}

fn project(latitude: f64, longitude: f64, origin: Midpoint) -> (f64, f64) {
    let x = (longitude - origin.longitude) * origin.latitude.to_radians().cos() * METERS_PER_DEGREE;
    let y = (latitude - origin.latitude) * METERS_PER_DEGREE;
    (x, y)
}

fn unproject(x: f64, y: f64, origin: Midpoint) -> (f64, f64) {
    let latitude = origin.latitude + y / METERS_PER_DEGREE;
    let longitude =
        origin.longitude + x / (origin.latitude.to_radians().cos() * METERS_PER_DEGREE);
    (latitude, longitude)
}

/// Round fractional axial coordinates to the containing hexagon.
fn axial_round(q: f64, r: f64) -> (i64, i64) {
    let s = -q - r;
    let (mut rq, mut rr, rs) = (q.round(), r.round(), s.round());
    let (dq, dr, ds) = ((rq - q).abs(), (rr - r).abs(), (rs - s).abs());

    if dq > dr && dq > ds {
        rq = -rr - rs;
    } else if dr > ds {
        rr = -rq - rs;
    }
    (rq as i64, rr as i64)
}

/// Bucket points into hexagons of `layer.radius` meters around `origin`.
///
/// Cells come back busiest first; elevation maps the count linearly onto the
/// layer's elevation range.
pub fn hexbin(points: &[GeoPoint], origin: Midpoint, layer: &DensityLayer) -> Vec<HexCell> {
    let size = layer.radius;
    if points.is_empty() || size <= 0.0 {
        return Vec::new();
    }

    let mut bins: HashMap<(i64, i64), usize> = HashMap::new();
    for point in points {
        let (x, y) = project(point.latitude, point.longitude, origin);
        let q = (SQRT_3 / 3.0 * x - y / 3.0) / size;
        let r = (2.0 / 3.0 * y) / size;
        *bins.entry(axial_round(q, r)).or_default() += 1;
    }

    let max_count = bins.values().copied().max().unwrap_or(0).max(1) as f64;
    let [low, high] = layer.elevation_range;

    let mut cells: Vec<HexCell> = bins
        .into_iter()
        .map(|((q, r), count)| {
            let x = size * SQRT_3 * (q as f64 + r as f64 / 2.0);
            let y = size * 1.5 * r as f64;
            let (latitude, longitude) = unproject(x, y, origin);
            HexCell {
                axial: (q, r),
                latitude,
                longitude,
                count,
                elevation: low + (high - low) * count as f64 / max_count,
            }
        })
        .collect();

    cells.sort_by(|a, b| b.count.cmp(&a.count).then(a.axial.cmp(&b.axial)));
    cells
}
