//! Satellite tile provider.
//!
//! Tiles are never downloaded: a pre-rendered `demo_tile.png` in the cache
//! directory is used when present, otherwise a solid placeholder.

use anyhow::{Context, Result};
use image::{DynamicImage, Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::cache_common;
use crate::color_utils::symbols;
use crate::domain::Region;

pub const TILE_CACHE_ENV_VAR: &str = "AQUATHERM_TILE_CACHE_DIR";
pub const DEFAULT_TILE_CACHE_DIR: &str = "data/sentinel_cache";
pub const DEMO_TILE_FILENAME: &str = "demo_tile.png";

pub const PLACEHOLDER_SIZE: u32 = 640;
pub const PLACEHOLDER_COLOR: [u8; 3] = [73, 109, 137];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SatelliteMetadata {
    pub provider: String,
    pub resolution: String,
    pub cloud_cover: String,
    pub acquisition_date: String,
    pub band_info: String,
}

pub trait ImageSource {
    fn fetch_tile(&self, region: &Region) -> Result<DynamicImage>;

    fn metadata(&self, region: &Region) -> SatelliteMetadata;
}

#[derive(Debug, Clone)]
pub struct TileCache {
    cache_dir: PathBuf,
}

impl TileCache {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    /// Cache rooted at `AQUATHERM_TILE_CACHE_DIR`, or the default directory.
    pub fn from_env() -> Self {
        Self::new(cache_common::path_with_env_override(
            TILE_CACHE_ENV_VAR,
            DEFAULT_TILE_CACHE_DIR,
        ))
    }

    pub fn demo_tile_path(&self) -> PathBuf {
        self.cache_dir.join(DEMO_TILE_FILENAME)
    }
}

pub fn placeholder_tile() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(
        PLACEHOLDER_SIZE,
        PLACEHOLDER_SIZE,
        Rgb(PLACEHOLDER_COLOR),
    ))
}

impl ImageSource for TileCache {
    fn fetch_tile(&self, region: &Region) -> Result<DynamicImage> {
        let demo_path = self.demo_tile_path();

        if demo_path.is_file() {
            log::info!(
                "{}Loading cached Sentinel tile from {} for ({:.4}, {:.4})",
                symbols::satellite(),
                demo_path.display(),
                region.lat,
                region.lng
            );
            let img = image::open(&demo_path)
                .with_context(|| format!("Failed to decode tile {}", demo_path.display()))?;
            return Ok(DynamicImage::ImageRgb8(img.to_rgb8()));
        }

        log::warn!(
            "{}No cached tile found in {}, using placeholder",
            symbols::warning(),
            self.cache_dir.display()
        );
        Ok(placeholder_tile())
    }

    fn metadata(&self, _region: &Region) -> SatelliteMetadata {
        SatelliteMetadata {
            provider: "Copernicus Sentinel-2".to_string(),
            resolution: "10m".to_string(),
            cloud_cover: "12%".to_string(),
            acquisition_date: "2025-01-14".to_string(),
            band_info: "Multispectral (B2/B3/B4/B8)".to_string(),
        }
    }
}
