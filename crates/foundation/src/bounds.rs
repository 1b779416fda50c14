use crate::math::{GeoPoint, wrap_deg_360};

/// Longitude/latitude extent of a point set, aware of the ±180° seam.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GeoBounds {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

impl GeoBounds {
    pub fn new(min_lon: f64, max_lon: f64, min_lat: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            max_lon,
            min_lat,
            max_lat,
        }
    }

    /// Returns `None` for an empty iterator.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = GeoPoint>,
    {
        let mut bounds: Option<Self> = None;
        for p in points {
            bounds = Some(match bounds {
                None => Self::new(p.lon_deg, p.lon_deg, p.lat_deg, p.lat_deg),
                Some(b) => Self::new(
                    b.min_lon.min(p.lon_deg),
                    b.max_lon.max(p.lon_deg),
                    b.min_lat.min(p.lat_deg),
                    b.max_lat.max(p.lat_deg),
                ),
            });
        }
        bounds
    }

    /// Span going eastwards from `min_lon` to `max_lon`.
    pub fn direct_lon_span(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    /// Span going the other way round, across the antimeridian.
    pub fn wrapped_lon_span(&self) -> f64 {
        (180.0 - self.max_lon) + (self.min_lon + 180.0)
    }

    /// True when the data is better described as straddling the ±180° seam.
    /// Ties go to the wrapped reading.
    pub fn crosses_antimeridian(&self) -> bool {
        self.direct_lon_span() >= self.wrapped_lon_span()
    }

    pub fn lon_span(&self) -> f64 {
        self.direct_lon_span().min(self.wrapped_lon_span())
    }

    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// Center longitude, taken across the seam when that side is shorter.
    ///
    /// A seam-straddling center is reported in `[0, 360)` so that `{179, -179}`
    /// centers on 180 rather than on its wrapped twin.
    pub fn center_lon(&self) -> f64 {
        if self.crosses_antimeridian() {
            wrap_deg_360((self.max_lon + self.min_lon + 360.0) / 2.0)
        } else {
            (self.max_lon + self.min_lon) / 2.0
        }
    }

    pub fn center_lat(&self) -> f64 {
        (self.max_lat + self.min_lat) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::GeoBounds;
    use crate::math::GeoPoint;

    #[test]
    fn empty_input_has_no_bounds() {
        assert!(GeoBounds::from_points(Vec::new()).is_none());
    }

    #[test]
    fn bounds_cover_all_points() {
        let b = GeoBounds::from_points(vec![
            GeoPoint::new(10.0, 45.0),
            GeoPoint::new(-5.0, 50.0),
            GeoPoint::new(2.0, 36.0),
        ])
        .unwrap();
        assert_eq!(b, GeoBounds::new(-5.0, 10.0, 36.0, 50.0));
        assert!(!b.crosses_antimeridian());
        assert_eq!(b.center_lon(), 2.5);
        assert_eq!(b.center_lat(), 43.0);
    }

    #[test]
    fn seam_straddling_points_center_on_the_seam() {
        let b = GeoBounds::from_points(vec![GeoPoint::new(179.0, 0.0), GeoPoint::new(-179.0, 0.0)])
            .unwrap();
        assert!(b.crosses_antimeridian());
        assert_eq!(b.lon_span(), 2.0);
        assert_eq!(b.center_lon(), 180.0);
    }
}
