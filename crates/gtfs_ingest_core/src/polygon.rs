use gtfs_model::Coordinates;

#[derive(Debug, Clone, Copy, PartialEq)]
struct BoundingBox {
    min_lat: f64,
    max_lat: f64,
    min_lon: f64,
    max_lon: f64,
}

impl BoundingBox {
    fn of(ring: &[Coordinates]) -> Self {
        ring.iter().fold(
            BoundingBox {
                min_lat: f64::INFINITY,
                max_lat: f64::NEG_INFINITY,
                min_lon: f64::INFINITY,
                max_lon: f64::NEG_INFINITY,
            },
            |bbox, point| BoundingBox {
                min_lat: bbox.min_lat.min(point.lat),
                max_lat: bbox.max_lat.max(point.lat),
                min_lon: bbox.min_lon.min(point.lon),
                max_lon: bbox.max_lon.max(point.lon),
            },
        )
    }

    fn contains(&self, point: Coordinates) -> bool {
        point.lat >= self.min_lat
            && point.lat <= self.max_lat
            && point.lon >= self.min_lon
            && point.lon <= self.max_lon
    }
}

/// Outer ring of a boundary region. The ring is implicitly closed.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    ring: Vec<Coordinates>,
    bbox: BoundingBox,
}

impl Polygon {
    pub fn new(mut ring: Vec<Coordinates>) -> Self {
        if ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }
        let bbox = BoundingBox::of(&ring);
        Self { ring, bbox }
    }

    pub fn from_lat_lon(ring: &[[f64; 2]]) -> Self {
        Self::new(
            ring.iter()
                .map(|[lat, lon]| Coordinates::new(*lat, *lon))
                .collect(),
        )
    }

    /// Ray-casting parity test along the point's latitude. Points on an edge
    /// or a vertex count as contained.
    pub fn contains(&self, point: Coordinates) -> bool {
        if self.ring.is_empty() || !self.bbox.contains(point) {
            return false;
        }

        let mut inside = false;
        let count = self.ring.len();
        for index in 0..count {
            let a = self.ring[index];
            let b = self.ring[(index + 1) % count];

            if a == point || b == point {
                return true;
            }
            // Degenerate edge: a repeated vertex contributes nothing.
            if a == b {
                continue;
            }
            if a.lat == point.lat && b.lat == point.lat {
                let (low, high) = if a.lon < b.lon {
                    (a.lon, b.lon)
                } else {
                    (b.lon, a.lon)
                };
                if point.lon > low && point.lon < high {
                    return true;
                }
                continue;
            }
            if (a.lat > point.lat) != (b.lat > point.lat) {
                let crossing_lon =
                    a.lon + (point.lat - a.lat) * (b.lon - a.lon) / (b.lat - a.lat);
                if crossing_lon == point.lon {
                    return true;
                }
                if point.lon < crossing_lon {
                    inside = !inside;
                }
            }
        }
        inside
    }
}

/// Zero or more polygons. An empty boundary contains every point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Boundary {
    polygons: Vec<Polygon>,
}

impl Boundary {
    pub fn new(polygons: Vec<Polygon>) -> Self {
        Self { polygons }
    }

    pub fn is_unbounded(&self) -> bool {
        self.polygons.is_empty()
    }

    pub fn contains(&self, point: Coordinates) -> bool {
        self.is_unbounded() || self.polygons.iter().any(|polygon| polygon.contains(point))
    }
}
