use crate::{
    MapContext,
    error::{MapGenError, Result},
};

/// A staged heightfield write. `None` leaves the corresponding value untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeightfieldWrite {
    pub terrain: Option<u8>,
    pub elevation: Option<i32>,
    pub is_land: Option<bool>,
}

/// A staged climate write. `None` leaves the corresponding value untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClimateWrite {
    /// Clamped to `0..=200`.
    pub rainfall: Option<i32>,
    /// Clamped to `0..=255`.
    pub humidity: Option<i32>,
}

impl MapContext {
    /// Writes heightfield values for one tile.
    ///
    /// The staged buffer is updated first, then the mirrored field arrays, then the terrain authority, so the staged
    /// and authoritative views agree once this returns. Elevation is clamped to the `i16` range before any of the three
    /// sees it. The land mask is staged only; the authority derives it from
    /// the terrain.
    ///
    /// # Errors
    ///
    /// Returns [`MapGenError::OutOfBounds`] if `(x, y)` is outside the map.
    pub fn write_heightfield(&mut self, x: i32, y: i32, write: HeightfieldWrite) -> Result<()> {
        let index = self.checked_index(x, y)?;
        let elevation = write.elevation.map(clamp_elevation);

        let heightfield = self.buffers.heightfield_mut();
        if let Some(terrain) = write.terrain {
            heightfield.terrain_mut()[index] = terrain;
        }
        if let Some(elevation) = elevation {
            heightfield.elevation_mut()[index] = elevation;
        }
        if let Some(is_land) = write.is_land {
            heightfield.land_mask_mut()[index] = is_land as u8;
        }

        if let Some(terrain) = write.terrain {
            self.fields.terrain_type[index] = terrain;
        }
        if let Some(elevation) = elevation {
            self.fields.elevation[index] = elevation;
        }

        if let Some(terrain) = write.terrain {
            self.adapter_mut().set_terrain_type(x, y, terrain);
        }
        if let Some(elevation) = elevation {
            self.adapter_mut().set_elevation(x, y, elevation as i32);
        }
        Ok(())
    }

    /// Writes climate values for one tile, in the same order as [`MapContext::write_heightfield`].
    ///
    /// Humidity has no authoritative counterpart and is only staged.
    ///
    /// # Errors
    ///
    /// Returns [`MapGenError::OutOfBounds`] if `(x, y)` is outside the map.
    pub fn write_climate_field(&mut self, x: i32, y: i32, write: ClimateWrite) -> Result<()> {
        let index = self.checked_index(x, y)?;
        let rainfall = write.rainfall.map(|rainfall| rainfall.clamp(0, 200));

        let climate = self.buffers.climate_mut();
        if let Some(rainfall) = rainfall {
            climate.rainfall_mut()[index] = rainfall as u8;
        }
        if let Some(humidity) = write.humidity {
            climate.humidity_mut()[index] = humidity.clamp(0, 255) as u8;
        }

        if let Some(rainfall) = rainfall {
            self.fields.rainfall[index] = rainfall as u8;
            self.adapter_mut().set_rainfall(x, y, rainfall);
        }
        Ok(())
    }

    /// Pulls terrain, elevation and the land mask back from the terrain authority.
    ///
    /// Call this after any stage that mutated the authority directly. Tiles for which the authority reports no data
    /// keep their staged terrain and elevation.
    pub fn sync_heightfield(&mut self) {
        let dimensions = self.dimensions();
        for (index, tile) in dimensions.all_coordinates().enumerate() {
            let (x, y) = (tile.x(), tile.y());
            let terrain = self.adapter().get_terrain_type(x, y);
            let elevation = self.adapter().get_elevation(x, y);
            let is_water = self.adapter().is_water(x, y);

            let heightfield = self.buffers.heightfield_mut();
            if let Some(terrain) = terrain {
                heightfield.terrain_mut()[index] = terrain;
            }
            if let Some(elevation) = elevation {
                heightfield.elevation_mut()[index] = clamp_elevation(elevation);
            }
            heightfield.land_mask_mut()[index] = !is_water as u8;

            if let Some(terrain) = terrain {
                self.fields.terrain_type[index] = terrain;
            }
            if let Some(elevation) = elevation {
                self.fields.elevation[index] = clamp_elevation(elevation);
            }
        }

        tracing::debug!(target: "mapgen::context", "context.sync_heightfield");
    }

    /// Pulls rainfall back from the terrain authority, clamped to `0..=200`.
    pub fn sync_climate_field(&mut self) {
        let dimensions = self.dimensions();
        for (index, tile) in dimensions.all_coordinates().enumerate() {
            let Some(rainfall) = self.adapter().get_rainfall(tile.x(), tile.y()) else {
                continue;
            };
            let rainfall = rainfall.clamp(0, 200) as u8;
            self.buffers.climate_mut().rainfall_mut()[index] = rainfall;
            self.fields.rainfall[index] = rainfall;
        }

        tracing::debug!(target: "mapgen::context", "context.sync_climate_field");
    }

    fn checked_index(&self, x: i32, y: i32) -> Result<usize> {
        self.idx(x, y).ok_or(MapGenError::OutOfBounds {
            x,
            y,
            width: self.dimensions().width(),
            height: self.dimensions().height(),
        })
    }
}

fn clamp_elevation(elevation: i32) -> i16 {
    elevation.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}
