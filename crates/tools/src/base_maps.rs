use std::path::{Path, PathBuf};

use layers::{BaseMapError, BaseMapProvider, BaseMapSet, RgbaRaster};
use tracing::debug;

/// Base maps decoded from image files on demand.
#[derive(Debug, Clone, Default)]
pub struct ImageBaseMaps {
    geographic: Option<PathBuf>,
    land_ocean: Option<PathBuf>,
}

impl ImageBaseMaps {
    pub fn new(geographic: impl Into<PathBuf>) -> Self {
        Self {
            geographic: Some(geographic.into()),
            land_ocean: None,
        }
    }

    pub fn with_land_ocean(mut self, path: impl Into<PathBuf>) -> Self {
        self.land_ocean = Some(path.into());
        self
    }

    pub fn path(&self, set: BaseMapSet) -> Option<&Path> {
        match set {
            BaseMapSet::Geographic => self.geographic.as_deref(),
            BaseMapSet::LandOcean => self.land_ocean.as_deref(),
        }
    }
}

impl BaseMapProvider for ImageBaseMaps {
    fn load(&mut self, set: BaseMapSet) -> Result<RgbaRaster, BaseMapError> {
        let path = self.path(set).ok_or(BaseMapError::Unavailable { set })?;
        let img = image::open(path)
            .map_err(|e| BaseMapError::Decode {
                set,
                message: format!("{}: {e}", path.display()),
            })?
            .to_rgba8();
        let (w, h) = img.dimensions();
        debug!(%set, width = w, height = h, path = %path.display(), "decoded base map");
        Ok(RgbaRaster::from_rgba8(w, h, img.into_raw())?)
    }
}

pub fn save_png(raster: &RgbaRaster, path: &Path) -> Result<(), String> {
    let (w, h) = raster.dimensions();
    let img = image::RgbaImage::from_raw(w, h, raster.as_bytes().to_vec())
        .ok_or_else(|| format!("raster buffer does not match {w}x{h}"))?;
    img.save(path).map_err(|e| format!("write {}: {e}", path.display()))
}
