//! Great-circle distance, bounds checks and the distance ranker.

use crate::types::{Bounds, Coordinates, ServiceRecord};

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometres.
#[must_use]
pub fn haversine_km(from: Coordinates, to: Coordinates) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lng = (to.lng - from.lng).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + from.lat.to_radians().cos() * to.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

impl Bounds {
    /// `south <= north` and `west <= east`, all finite.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        [self.north, self.south, self.east, self.west]
            .iter()
            .all(|v| v.is_finite())
            && self.south <= self.north
            && self.west <= self.east
    }

    /// Closed-rectangle containment.
    #[must_use]
    pub fn contains(&self, point: Coordinates) -> bool {
        (self.south..=self.north).contains(&point.lat) && (self.west..=self.east).contains(&point.lng)
    }

    #[must_use]
    pub fn center(&self) -> Coordinates {
        Coordinates {
            lat: (self.north + self.south) / 2.0,
            lng: (self.east + self.west) / 2.0,
        }
    }

    /// Distance from the centre to a corner, in metres.
    #[must_use]
    pub fn half_diagonal_meters(&self) -> f64 {
        let corner = Coordinates {
            lat: self.north,
            lng: self.east,
        };
        haversine_km(self.center(), corner) * 1000.0
    }
}

/// Drops every record outside `bounds`.
pub fn retain_within_bounds(services: &mut Vec<ServiceRecord>, bounds: &Bounds) {
    services.retain(|s| bounds.contains(s.coordinates));
}

/// Attaches `distance_km` to every record and sorts ascending.
///
/// The sort is stable, so equal distances keep their input order.
pub fn rank_by_distance(services: &mut [ServiceRecord], origin: Coordinates) {
    for service in services.iter_mut() {
        service.distance_km = Some(haversine_km(origin, service.coordinates));
    }
    services.sort_by(|a, b| {
        let a = a.distance_km.unwrap_or(f64::INFINITY);
        let b = b.distance_km.unwrap_or(f64::INFINITY);
        a.total_cmp(&b)
    });
}
