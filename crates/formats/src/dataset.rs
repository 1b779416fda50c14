use foundation::GeoBounds;
use foundation::math::GeoPoint;
use serde_json::{Map, Value};

/// One GeoJSON point feature.
#[derive(Debug, Clone, PartialEq)]
pub struct FeaturePoint {
    pub position: GeoPoint,
    pub category: Option<i64>,
}

/// How a dataset is painted onto the globe.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DrawMode {
    /// Every point in one shared color.
    SingleCategory,
    /// Density heat map split by category.
    Categorized,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub title: Option<String>,
    pub features: Vec<FeaturePoint>,
}

#[derive(Debug)]
pub enum DatasetError {
    InvalidJson { reason: String },
    NotAFeatureCollection,
    InvalidFeature { index: usize, reason: String },
    Empty,
}

impl std::fmt::Display for DatasetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetError::InvalidJson { reason } => write!(f, "JSON parse error: {reason}"),
            DatasetError::NotAFeatureCollection => {
                write!(f, "expected GeoJSON FeatureCollection")
            }
            DatasetError::InvalidFeature { index, reason } => {
                write!(f, "invalid feature at index {index}: {reason}")
            }
            DatasetError::Empty => write!(f, "dataset has no features"),
        }
    }
}

impl std::error::Error for DatasetError {}

impl Dataset {
    pub fn from_geojson_str(payload: &str) -> Result<Self, DatasetError> {
        let value: Value = serde_json::from_str(payload).map_err(|e| DatasetError::InvalidJson {
            reason: e.to_string(),
        })?;
        Self::from_geojson_value(&value)
    }

    pub fn from_geojson_value(value: &Value) -> Result<Self, DatasetError> {
        let obj = value.as_object().ok_or(DatasetError::NotAFeatureCollection)?;
        let ty = obj
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or(DatasetError::NotAFeatureCollection)?;
        if ty != "FeatureCollection" {
            return Err(DatasetError::NotAFeatureCollection);
        }

        let title = obj.get("title").and_then(|v| v.as_str()).map(str::to_string);

        let features_val = obj
            .get("features")
            .and_then(|v| v.as_array())
            .ok_or(DatasetError::NotAFeatureCollection)?;
        if features_val.is_empty() {
            return Err(DatasetError::Empty);
        }

        let features = features_val
            .iter()
            .enumerate()
            .map(|(index, feat)| {
                parse_feature(feat).map_err(|reason| DatasetError::InvalidFeature { index, reason })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { title, features })
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Categorized only when every feature declares a category.
    pub fn draw_mode(&self) -> DrawMode {
        if !self.features.is_empty() && self.features.iter().all(|f| f.category.is_some()) {
            DrawMode::Categorized
        } else {
            DrawMode::SingleCategory
        }
    }

    pub fn positions(&self) -> Vec<GeoPoint> {
        self.features.iter().map(|f| f.position).collect()
    }

    /// Features that carry a category, paired with it.
    pub fn categorized(&self) -> Vec<(GeoPoint, i64)> {
        self.features
            .iter()
            .filter_map(|f| f.category.map(|c| (f.position, c)))
            .collect()
    }

    pub fn bounds(&self) -> Option<GeoBounds> {
        GeoBounds::from_points(self.features.iter().map(|f| f.position))
    }
}

fn parse_feature(value: &Value) -> Result<FeaturePoint, String> {
    let obj = value
        .as_object()
        .ok_or_else(|| "feature must be an object".to_string())?;

    let ty = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or_else(|| "feature missing type".to_string())?;
    if ty != "Feature" {
        return Err(format!("unexpected feature type: {ty}"));
    }

    let geometry = obj
        .get("geometry")
        .and_then(|v| v.as_object())
        .ok_or_else(|| "feature missing geometry".to_string())?;
    let position = parse_point(geometry)?;

    let category = match obj.get("properties") {
        None | Some(Value::Null) => None,
        Some(Value::Object(props)) => parse_category(props)?,
        Some(_) => return Err("properties must be an object".to_string()),
    };

    Ok(FeaturePoint { position, category })
}

fn parse_point(geometry: &Map<String, Value>) -> Result<GeoPoint, String> {
    let ty = geometry
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or_else(|| "geometry missing type".to_string())?;
    if ty != "Point" {
        return Err(format!("unsupported geometry type: {ty}"));
    }

    let coords = geometry
        .get("coordinates")
        .and_then(|v| v.as_array())
        .ok_or_else(|| "Point.coordinates must be an array".to_string())?;
    if coords.len() < 2 {
        return Err("Point.coordinates needs longitude and latitude".to_string());
    }
    let lon = coords[0]
        .as_f64()
        .ok_or_else(|| "longitude must be a number".to_string())?;
    let lat = coords[1]
        .as_f64()
        .ok_or_else(|| "latitude must be a number".to_string())?;

    let p = GeoPoint::new(lon, lat);
    if !p.is_valid() {
        return Err(format!("coordinates out of range: [{lon}, {lat}]"));
    }
    Ok(p)
}

fn parse_category(props: &Map<String, Value>) -> Result<Option<i64>, String> {
    match props.get("category") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                return Ok(Some(i));
            }
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(Some(f as i64)),
                _ => Err(format!("category must be an integer, got {n}")),
            }
        }
        Some(other) => Err(format!("category must be an integer, got {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::{Dataset, DatasetError, DrawMode, FeaturePoint};
    use foundation::math::GeoPoint;

    fn point(lon: f64, lat: f64, props: &str) -> String {
        format!(
            r#"{{"type":"Feature","properties":{props},"geometry":{{"type":"Point","coordinates":[{lon},{lat}]}}}}"#
        )
    }

    fn collection(features: &[String]) -> String {
        format!(
            r#"{{"type":"FeatureCollection","title":"Test data","features":[{}]}}"#,
            features.join(",")
        )
    }

    #[test]
    fn parses_categorized_points() {
        let payload = collection(&[
            point(12.5, 41.9, r#"{"category":1}"#),
            point(-0.1, 51.5, r#"{"category":2,"name":"London"}"#),
        ]);
        let ds = Dataset::from_geojson_str(&payload).unwrap();

        assert_eq!(ds.title.as_deref(), Some("Test data"));
        assert_eq!(
            ds.features,
            vec![
                FeaturePoint {
                    position: GeoPoint::new(12.5, 41.9),
                    category: Some(1),
                },
                FeaturePoint {
                    position: GeoPoint::new(-0.1, 51.5),
                    category: Some(2),
                },
            ]
        );
        assert_eq!(ds.draw_mode(), DrawMode::Categorized);
    }

    #[test]
    fn one_missing_category_falls_back_to_single_color() {
        let payload = collection(&[
            point(0.0, 0.0, r#"{"category":1}"#),
            point(1.0, 1.0, "{}"),
        ]);
        let ds = Dataset::from_geojson_str(&payload).unwrap();
        assert_eq!(ds.draw_mode(), DrawMode::SingleCategory);
        assert_eq!(ds.categorized().len(), 1);
        assert_eq!(ds.positions().len(), 2);
    }

    #[test]
    fn null_properties_are_allowed() {
        let payload = collection(&[point(5.0, 5.0, "null")]);
        let ds = Dataset::from_geojson_str(&payload).unwrap();
        assert_eq!(ds.features[0].category, None);
    }

    #[test]
    fn integral_float_categories_are_accepted() {
        let payload = collection(&[point(5.0, 5.0, r#"{"category":2.0}"#)]);
        let ds = Dataset::from_geojson_str(&payload).unwrap();
        assert_eq!(ds.features[0].category, Some(2));
    }

    #[test]
    fn rejects_non_collections_and_empty_ones() {
        assert!(matches!(
            Dataset::from_geojson_str(r#"{"type":"Feature"}"#),
            Err(DatasetError::NotAFeatureCollection)
        ));
        assert!(matches!(
            Dataset::from_geojson_str(r#"{"type":"FeatureCollection","features":[]}"#),
            Err(DatasetError::Empty)
        ));
        assert!(matches!(
            Dataset::from_geojson_str("not json"),
            Err(DatasetError::InvalidJson { .. })
        ));
    }

    #[test]
    fn reports_the_offending_feature() {
        let payload = collection(&[
            point(0.0, 0.0, "{}"),
            point(200.0, 0.0, "{}"),
        ]);
        match Dataset::from_geojson_str(&payload) {
            Err(DatasetError::InvalidFeature { index, reason }) => {
                assert_eq!(index, 1);
                assert!(reason.contains("out of range"), "{reason}");
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let bad_category = collection(&[point(0.0, 0.0, r#"{"category":"high"}"#)]);
        assert!(matches!(
            Dataset::from_geojson_str(&bad_category),
            Err(DatasetError::InvalidFeature { index: 0, .. })
        ));
    }

    #[test]
    fn non_point_geometry_is_rejected() {
        let payload = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{},"geometry":{"type":"LineString","coordinates":[[0,0],[1,1]]}}
        ]}"#;
        assert!(matches!(
            Dataset::from_geojson_str(payload),
            Err(DatasetError::InvalidFeature { index: 0, .. })
        ));
    }

    #[test]
    fn bounds_cover_the_features() {
        let payload = collection(&[point(-10.0, 5.0, "{}"), point(20.0, -5.0, "{}")]);
        let b = Dataset::from_geojson_str(&payload).unwrap().bounds().unwrap();
        assert_eq!((b.min_lon, b.max_lon, b.min_lat, b.max_lat), (-10.0, 20.0, -5.0, 5.0));
    }
}
