use crate::error::{Error, Result};
use geo::{Centroid, Contains, Coord, EuclideanDistance, MapCoords, MultiPolygon, Point};
use geojson::GeoJson;
use std::fs;
use std::path::Path;
use wkt::TryFromWkt;

/// Mean earth radius in meters, for the local projection
const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// One named reference polygon in WGS84
#[derive(Debug, Clone)]
pub struct BoundaryPolygon {
    pub name: String,
    pub geometry: MultiPolygon<f64>,
}

/// A reference layer (community areas or wards) supporting point-in-polygon
/// lookup.
///
/// Polygons are sorted by identifier at construction and `locate` returns the
/// first containing polygon, so a point on a shared boundary resolves
/// deterministically regardless of input file order.
#[derive(Debug, Clone)]
pub struct BoundaryLayer {
    polygons: Vec<BoundaryPolygon>,
}

impl BoundaryLayer {
    pub fn new(mut polygons: Vec<BoundaryPolygon>) -> Self {
        polygons.sort_by(|a, b| a.name.cmp(&b.name));
        Self { polygons }
    }

    /// Name of the first polygon containing `point`, in ascending identifier
    /// order; `None` when the point falls outside every polygon.
    pub fn locate(&self, point: &Point<f64>) -> Option<&str> {
        self.polygons
            .iter()
            .find(|p| p.geometry.contains(point))
            .map(|p| p.name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&BoundaryPolygon> {
        self.polygons.iter().find(|p| p.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BoundaryPolygon> {
        self.polygons.iter()
    }

    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }
}

/// Load the community-area layer from a GeoJSON feature collection; the
/// feature property `community` names each area.
pub fn load_communities(path: &Path) -> Result<BoundaryLayer> {
    let contents = fs::read_to_string(path)?;
    let geojson: GeoJson = contents
        .parse()
        .map_err(|e| Error::Boundary(format!("{}: {}", path.display(), e)))?;
    let GeoJson::FeatureCollection(collection) = geojson else {
        return Err(Error::Boundary(format!(
            "{}: expected a FeatureCollection",
            path.display()
        )));
    };

    let mut polygons = Vec::new();
    for feature in collection.features {
        let Some(name) = feature
            .property("community")
            .and_then(|v| v.as_str())
            .map(str::to_string)
        else {
            continue;
        };
        let Some(geometry) = feature.geometry.as_ref() else {
            continue;
        };
        let geometry = geo::Geometry::<f64>::try_from(geometry)
            .map_err(|e| Error::Boundary(format!("{}: {}: {}", path.display(), name, e)))?;
        polygons.push(BoundaryPolygon {
            geometry: to_multi_polygon(geometry)
                .ok_or_else(|| Error::Boundary(format!("{}: {}: not a polygon", path.display(), name)))?,
            name,
        });
    }

    if polygons.is_empty() {
        return Err(Error::Boundary(format!(
            "{}: no community polygons found",
            path.display()
        )));
    }
    Ok(BoundaryLayer::new(polygons))
}

/// Load the ward layer from a CSV with a WKT geometry column (`the_geom`)
/// and a `ward` identifier column.
pub fn load_wards(path: &Path) -> Result<BoundaryLayer> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::Boundary(format!("{}: missing column {name:?}", path.display())))
    };
    let geom_idx = column("the_geom")?;
    let ward_idx = column("ward")?;

    let mut polygons = Vec::new();
    for row in reader.records() {
        let row = row?;
        let name = row.get(ward_idx).unwrap_or("").trim().to_string();
        let wkt_text = row.get(geom_idx).unwrap_or("").trim();
        if name.is_empty() || wkt_text.is_empty() {
            continue;
        }
        let geometry = geo::Geometry::<f64>::try_from_wkt_str(wkt_text)
            .map_err(|e| Error::Boundary(format!("{}: ward {}: {}", path.display(), name, e)))?;
        polygons.push(BoundaryPolygon {
            geometry: to_multi_polygon(geometry).ok_or_else(|| {
                Error::Boundary(format!("{}: ward {}: not a polygon", path.display(), name))
            })?,
            name,
        });
    }

    if polygons.is_empty() {
        return Err(Error::Boundary(format!(
            "{}: no ward polygons found",
            path.display()
        )));
    }
    Ok(BoundaryLayer::new(polygons))
}

fn to_multi_polygon(geometry: geo::Geometry<f64>) -> Option<MultiPolygon<f64>> {
    match geometry {
        geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        _ => None,
    }
}

/// Equirectangular projection centered on the area of interest. At city scale
/// the error against a true projected CRS is far below the buffer distance.
#[derive(Debug, Clone, Copy)]
struct LocalProjection {
    origin: Coord<f64>,
    cos_lat: f64,
}

impl LocalProjection {
    fn new(origin: Point<f64>) -> Self {
        Self {
            origin: Coord {
                x: origin.x(),
                y: origin.y(),
            },
            cos_lat: origin.y().to_radians().cos(),
        }
    }

    /// Geographic degrees to local meters
    fn project_coord(&self, c: Coord<f64>) -> Coord<f64> {
        Coord {
            x: (c.x - self.origin.x).to_radians() * self.cos_lat * EARTH_RADIUS_M,
            y: (c.y - self.origin.y).to_radians() * EARTH_RADIUS_M,
        }
    }

    fn project_point(&self, p: &Point<f64>) -> Point<f64> {
        Point::from(self.project_coord(p.0))
    }

    fn project_multi_polygon(&self, mp: &MultiPolygon<f64>) -> MultiPolygon<f64> {
        mp.map_coords(|c| self.project_coord(c))
    }
}

/// The area-of-interest polygon expanded outward by a fixed distance.
///
/// The target community polygon is re-projected into a local meters-based
/// plane; candidate points are re-projected the same way. Membership in the
/// buffered polygon is equivalent to a euclidean distance to the polygon of
/// at most the buffer distance (zero when inside), so no explicit
/// Minkowski-sum buffer geometry is materialized.
pub struct AreaOfInterestBuffer {
    projection: LocalProjection,
    polygon: MultiPolygon<f64>,
    distance_m: f64,
}

impl AreaOfInterestBuffer {
    pub fn new(communities: &BoundaryLayer, name: &str, distance_m: f64) -> Result<Self> {
        let target = communities.get(name).ok_or_else(|| {
            Error::Boundary(format!("community {name:?} not found in boundary layer"))
        })?;
        let origin = target
            .geometry
            .centroid()
            .ok_or_else(|| Error::Boundary(format!("community {name:?} has a degenerate geometry")))?;
        let projection = LocalProjection::new(origin);
        Ok(Self {
            polygon: projection.project_multi_polygon(&target.geometry),
            projection,
            distance_m,
        })
    }

    /// Whether a WGS84 point falls inside the buffered polygon.
    pub fn contains(&self, point: &Point<f64>) -> bool {
        let projected = self.projection.project_point(point);
        self.polygon
            .0
            .iter()
            .map(|p| projected.euclidean_distance(p))
            .fold(f64::INFINITY, f64::min)
            <= self.distance_m
    }
}
