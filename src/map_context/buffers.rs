use std::collections::BTreeMap;

use crate::error::{MapGenError, Result};

/// Staged heightfield data, mirrored to the terrain authority on write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeightfieldBuffer {
    elevation: Box<[i16]>,
    terrain: Box<[u8]>,
    land_mask: Box<[u8]>,
}

impl HeightfieldBuffer {
    pub fn new(size: usize) -> Self {
        Self {
            elevation: vec![0; size].into_boxed_slice(),
            terrain: vec![0; size].into_boxed_slice(),
            land_mask: vec![0; size].into_boxed_slice(),
        }
    }

    /// Builds a heightfield from existing arrays. Lengths are checked when the buffer is installed with
    /// [`MapBuffers::replace_heightfield`].
    pub fn from_parts(elevation: Vec<i16>, terrain: Vec<u8>, land_mask: Vec<u8>) -> Self {
        Self {
            elevation: elevation.into_boxed_slice(),
            terrain: terrain.into_boxed_slice(),
            land_mask: land_mask.into_boxed_slice(),
        }
    }

    pub fn elevation(&self) -> &[i16] {
        &self.elevation
    }

    pub fn elevation_mut(&mut self) -> &mut [i16] {
        &mut self.elevation
    }

    pub fn terrain(&self) -> &[u8] {
        &self.terrain
    }

    pub fn terrain_mut(&mut self) -> &mut [u8] {
        &mut self.terrain
    }

    /// `1` for land, `0` for water.
    pub fn land_mask(&self) -> &[u8] {
        &self.land_mask
    }

    pub fn land_mask_mut(&mut self) -> &mut [u8] {
        &mut self.land_mask
    }

    fn check_size(&self, size: usize) -> Result<()> {
        check_len("heightfield.elevation", size, self.elevation.len())?;
        check_len("heightfield.terrain", size, self.terrain.len())?;
        check_len("heightfield.landMask", size, self.land_mask.len())
    }
}

/// Staged climate data, mirrored to the terrain authority on write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClimateFieldBuffer {
    rainfall: Box<[u8]>,
    humidity: Box<[u8]>,
}

impl ClimateFieldBuffer {
    pub fn new(size: usize) -> Self {
        Self {
            rainfall: vec![0; size].into_boxed_slice(),
            humidity: vec![0; size].into_boxed_slice(),
        }
    }

    pub fn from_parts(rainfall: Vec<u8>, humidity: Vec<u8>) -> Self {
        Self {
            rainfall: rainfall.into_boxed_slice(),
            humidity: humidity.into_boxed_slice(),
        }
    }

    /// Rainfall of each tile, `0..=200`.
    pub fn rainfall(&self) -> &[u8] {
        &self.rainfall
    }

    pub fn rainfall_mut(&mut self) -> &mut [u8] {
        &mut self.rainfall
    }

    pub fn humidity(&self) -> &[u8] {
        &self.humidity
    }

    pub fn humidity_mut(&mut self) -> &mut [u8] {
        &mut self.humidity
    }

    fn check_size(&self, size: usize) -> Result<()> {
        check_len("climate.rainfall", size, self.rainfall.len())?;
        check_len("climate.humidity", size, self.humidity.len())
    }
}

/// Working data of the current run.
///
/// Every buffer holds exactly `size` entries. Replacing a buffer or inserting a scratch mask with any other length
/// fails with [`MapGenError::BufferSizeMismatch`] instead of truncating or padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapBuffers {
    size: usize,
    heightfield: HeightfieldBuffer,
    climate: ClimateFieldBuffer,
    /// Named single-stage bookkeeping arrays. Not part of any long-term contract.
    scratch_masks: BTreeMap<String, Box<[u8]>>,
}

impl MapBuffers {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            heightfield: HeightfieldBuffer::new(size),
            climate: ClimateFieldBuffer::new(size),
            scratch_masks: BTreeMap::new(),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn heightfield(&self) -> &HeightfieldBuffer {
        &self.heightfield
    }

    pub fn heightfield_mut(&mut self) -> &mut HeightfieldBuffer {
        &mut self.heightfield
    }

    pub fn climate(&self) -> &ClimateFieldBuffer {
        &self.climate
    }

    pub fn climate_mut(&mut self) -> &mut ClimateFieldBuffer {
        &mut self.climate
    }

    /// Replaces the staged heightfield.
    ///
    /// # Errors
    ///
    /// Returns [`MapGenError::BufferSizeMismatch`] if any array of `heightfield` does not hold `size` entries.
    pub fn replace_heightfield(&mut self, heightfield: HeightfieldBuffer) -> Result<()> {
        heightfield.check_size(self.size)?;
        self.heightfield = heightfield;
        Ok(())
    }

    /// Replaces the staged climate field.
    ///
    /// # Errors
    ///
    /// Returns [`MapGenError::BufferSizeMismatch`] if any array of `climate` does not hold `size` entries.
    pub fn replace_climate(&mut self, climate: ClimateFieldBuffer) -> Result<()> {
        climate.check_size(self.size)?;
        self.climate = climate;
        Ok(())
    }

    /// Returns the scratch mask `name`, creating a zero-filled one on first use.
    pub fn scratch_mask(&mut self, name: &str) -> &mut [u8] {
        let size = self.size;
        self.scratch_masks
            .entry(name.to_owned())
            .or_insert_with(|| vec![0; size].into_boxed_slice())
    }

    pub fn get_scratch_mask(&self, name: &str) -> Option<&[u8]> {
        self.scratch_masks.get(name).map(|mask| &**mask)
    }

    /// Stores `mask` under `name`, replacing any previous mask.
    ///
    /// # Errors
    ///
    /// Returns [`MapGenError::BufferSizeMismatch`] if `mask` does not hold `size` entries.
    pub fn insert_scratch_mask(&mut self, name: &str, mask: Vec<u8>) -> Result<()> {
        check_len(name, self.size, mask.len())?;
        self.scratch_masks
            .insert(name.to_owned(), mask.into_boxed_slice());
        Ok(())
    }

    pub fn remove_scratch_mask(&mut self, name: &str) -> Option<Box<[u8]>> {
        self.scratch_masks.remove(name)
    }

    /// Zero-fills the staged buffers and drops every scratch mask.
    pub fn reset(&mut self) {
        self.heightfield.elevation.fill(0);
        self.heightfield.terrain.fill(0);
        self.heightfield.land_mask.fill(0);
        self.climate.rainfall.fill(0);
        self.climate.humidity.fill(0);
        self.scratch_masks.clear();
    }
}

fn check_len(name: &str, expected: usize, received: usize) -> Result<()> {
    if expected != received {
        return Err(MapGenError::BufferSizeMismatch {
            name: name.to_owned(),
            expected,
            received,
        });
    }
    Ok(())
}
