use smallvec::SmallVec;

use crate::math;
use crate::video::errors::*;
use crate::video::program::Program;
use crate::video::uniform::{UniformLocation, UniformVariable};

use super::layout::{LightCategory, LightField};
use super::light::Light;
use super::table::{UniformKey, UniformTable};

/// The resolved locations of one light, e.g. `gPointLights[1]`. Fields the
/// variant doesn't declare are `None`.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct LightSlot {
    locations: [Option<UniformLocation>; LightField::COUNT],
}

impl LightSlot {
    /// Collects the locations of light `index` of `category` from `table`.
    pub fn from_table(table: &UniformTable, category: LightCategory, index: usize) -> Self {
        let mut slot = LightSlot::default();
        for &field in LightField::ALL.iter() {
            slot.locations[field.index()] = table.location(UniformKey::light(category, index, field));
        }

        slot
    }

    #[inline]
    pub fn get(&self, field: LightField) -> Option<UniformLocation> {
        self.locations[field.index()]
    }

    #[inline]
    pub fn declares(&self, field: LightField) -> bool {
        self.get(field).is_some()
    }
}

/// The uploads of one light, checked and converted, ready to be pushed.
#[derive(Debug, Clone, Default)]
pub struct LightRecord {
    uploads: SmallVec<[(UniformLocation, UniformVariable); 16]>,
}

impl LightRecord {
    #[inline]
    pub fn len(&self) -> usize {
        self.uploads.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.uploads.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(UniformLocation, UniformVariable)> {
        self.uploads.iter()
    }

    fn push<T: Into<UniformVariable>>(&mut self, slot: &LightSlot, field: LightField, v: T) {
        if let Some(location) = slot.get(field) {
            self.uploads.push((location, v.into()));
        }
    }
}

/// Pushes light records into the light slots of a program.
pub struct LightBinder<'a> {
    program: &'a Program,
}

impl<'a> LightBinder<'a> {
    pub fn new(program: &'a Program) -> Self {
        LightBinder { program }
    }

    /// Checks `light` and converts it into the uploads of `slot`. Directions are
    /// normalized and cutoff angles are converted to cosines. Nothing is
    /// uploaded here, so a rejected light leaves the GPU state untouched.
    pub fn prepare(slot: &LightSlot, light: &Light) -> Result<LightRecord> {
        light.validate()?;

        let direction = match light.direction() {
            Some(direction) if slot.declares(LightField::Direction) => Some(
                math::try_normalize(direction).ok_or(PreconditionError::ZeroDirection)?,
            ),
            _ => None,
        };

        let mut record = LightRecord::default();

        let base = light.base();
        record.push(slot, LightField::Color, base.color);
        record.push(slot, LightField::AmbientIntensity, base.ambient_intensity);
        record.push(slot, LightField::DiffuseIntensity, base.diffuse_intensity);

        if let Some(position) = light.position() {
            record.push(slot, LightField::Position, position);
        }

        if let Some(attenuation) = light.attenuation() {
            record.push(slot, LightField::AttenuationConstant, attenuation.constant);
            record.push(slot, LightField::AttenuationLinear, attenuation.linear);
            record.push(slot, LightField::AttenuationExp, attenuation.exp);
        }

        if let Some(direction) = direction {
            record.push(slot, LightField::Direction, direction);
        }

        if let Some(cutoff) = light.cutoff() {
            record.push(slot, LightField::Cutoff, math::cutoff_cosine(cutoff));
        }

        Ok(record)
    }

    /// Uploads a prepared record into the program, which must be active.
    pub fn push(&self, record: &LightRecord) -> Result<()> {
        for &(location, variable) in record.iter() {
            self.program.bind(location, variable)?;
        }

        Ok(())
    }
}
