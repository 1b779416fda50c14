use std::fmt;

use crate::raster::{RasterError, RgbaRaster};

/// The two world maps the globe can wear.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum BaseMapSet {
    /// Shaded relief political map.
    #[default]
    Geographic,
    /// Flat land/ocean mask.
    LandOcean,
}

impl BaseMapSet {
    pub const ALL: [BaseMapSet; 2] = [BaseMapSet::Geographic, BaseMapSet::LandOcean];

    /// Native texture size of the set.
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            BaseMapSet::Geographic => (5400, 2700),
            BaseMapSet::LandOcean => (4832, 2416),
        }
    }

    pub fn other(self) -> Self {
        match self {
            BaseMapSet::Geographic => BaseMapSet::LandOcean,
            BaseMapSet::LandOcean => BaseMapSet::Geographic,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BaseMapSet::Geographic => "geographic",
            BaseMapSet::LandOcean => "land-ocean",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }
}

impl fmt::Display for BaseMapSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug)]
pub enum BaseMapError {
    Unavailable { set: BaseMapSet },
    Decode { set: BaseMapSet, message: String },
    Raster(RasterError),
}

impl fmt::Display for BaseMapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BaseMapError::Unavailable { set } => write!(f, "base map `{set}` is not available"),
            BaseMapError::Decode { set, message } => {
                write!(f, "failed to decode base map `{set}`: {message}")
            }
            BaseMapError::Raster(e) => write!(f, "invalid base map raster: {e}"),
        }
    }
}

impl std::error::Error for BaseMapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BaseMapError::Raster(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RasterError> for BaseMapError {
    fn from(e: RasterError) -> Self {
        BaseMapError::Raster(e)
    }
}

/// Source of decoded base-map rasters, supplied by the host.
pub trait BaseMapProvider {
    fn load(&mut self, set: BaseMapSet) -> Result<RgbaRaster, BaseMapError>;
}

/// Provider backed by rasters handed over up front.
#[derive(Debug, Default)]
pub struct StaticBaseMaps {
    geographic: Option<RgbaRaster>,
    land_ocean: Option<RgbaRaster>,
}

impl StaticBaseMaps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, set: BaseMapSet, raster: RgbaRaster) {
        match set {
            BaseMapSet::Geographic => self.geographic = Some(raster),
            BaseMapSet::LandOcean => self.land_ocean = Some(raster),
        }
    }

    pub fn with(mut self, set: BaseMapSet, raster: RgbaRaster) -> Self {
        self.insert(set, raster);
        self
    }
}

impl BaseMapProvider for StaticBaseMaps {
    fn load(&mut self, set: BaseMapSet) -> Result<RgbaRaster, BaseMapError> {
        let raster = match set {
            BaseMapSet::Geographic => self.geographic.as_ref(),
            BaseMapSet::LandOcean => self.land_ocean.as_ref(),
        };
        raster.cloned().ok_or(BaseMapError::Unavailable { set })
    }
}

#[cfg(test)]
mod tests {
    use super::{BaseMapError, BaseMapProvider, BaseMapSet, StaticBaseMaps};
    use crate::raster::RgbaRaster;

    #[test]
    fn sets_toggle_and_round_trip_names() {
        assert_eq!(BaseMapSet::Geographic.other(), BaseMapSet::LandOcean);
        assert_eq!(BaseMapSet::LandOcean.other(), BaseMapSet::Geographic);
        for set in BaseMapSet::ALL {
            assert_eq!(BaseMapSet::from_name(set.name()), Some(set));
        }
        assert_eq!(BaseMapSet::LandOcean.dimensions(), (4832, 2416));
    }

    #[test]
    fn static_provider_reports_missing_sets() {
        let mut maps = StaticBaseMaps::new().with(BaseMapSet::Geographic, RgbaRaster::new(4, 2).unwrap());
        assert!(maps.load(BaseMapSet::Geographic).is_ok());
        assert!(matches!(
            maps.load(BaseMapSet::LandOcean),
            Err(BaseMapError::Unavailable {
                set: BaseMapSet::LandOcean
            })
        ));
    }
}
