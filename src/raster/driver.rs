//! Raster drivers
//!
//! Factory for opening input rasters and creating output rasters by driver
//! short name, in the manner of the compression handler factory.

use log::debug;

use crate::raster::memory::MemRasterSink;
use crate::raster::sink::RasterSink;
use crate::raster::source::RasterSource;
use crate::raster::tiff_sink::TiffRasterSink;
use crate::raster::tiff_source::TiffRasterSource;
use crate::raster::types::OutputDataType;
use crate::tiff::errors::TiffResult;
use crate::utils::creation_options::CreationOptions;

/// Output drivers that can be selected with `-of`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    GTiff,
    Mem,
}

/// Name and description of a driver, as listed to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverInfo {
    pub driver: Driver,
    pub short_name: &'static str,
    pub long_name: &'static str,
}

const DRIVERS: [DriverInfo; 2] = [
    DriverInfo { driver: Driver::GTiff, short_name: "GTiff", long_name: "GeoTIFF" },
    DriverInfo { driver: Driver::Mem, short_name: "MEM", long_name: "In Memory Raster" },
];

/// Every driver able to create output
pub fn available_drivers() -> &'static [DriverInfo] {
    &DRIVERS
}

impl Driver {
    /// Looks a driver up by short name, case-insensitively
    pub fn from_name(name: &str) -> Option<Self> {
        DRIVERS.iter()
            .find(|info| info.short_name.eq_ignore_ascii_case(name))
            .map(|info| info.driver)
    }

    pub fn short_name(&self) -> &'static str {
        DRIVERS.iter()
            .find(|info| info.driver == *self)
            .map_or("unknown", |info| info.short_name)
    }
}

/// Factory for raster sources and sinks
pub struct RasterDriverFactory;

impl RasterDriverFactory {
    /// Opens an input raster
    ///
    /// Only GeoTIFF files can be opened from a path; in-memory sources are
    /// built directly.
    pub fn open_source(path: &str) -> TiffResult<Box<dyn RasterSource>> {
        debug!("Opening {} with the GTiff driver", path);
        Ok(Box::new(TiffRasterSource::open(path)?))
    }

    /// Creates an output raster with `driver`
    pub fn create_sink(
        driver: Driver,
        path: &str,
        width: usize,
        height: usize,
        data_type: OutputDataType,
        options: &CreationOptions,
    ) -> TiffResult<Box<dyn RasterSink>> {
        debug!("Creating {} with the {} driver", path, driver.short_name());
        match driver {
            Driver::GTiff => Ok(Box::new(TiffRasterSink::create(path, width, height, data_type, options)?)),
            Driver::Mem => Ok(Box::new(MemRasterSink::new(path, width, height, data_type))),
        }
    }
}
