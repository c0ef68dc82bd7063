//! The uniform table of a technique: every uniform it uploads, keyed by its
//! logical identity, with the synthesized GLSL name and the resolved location.

use std::fmt;
use std::str::FromStr;

use crate::utils::hash::{FastHashMap, FastHashSet};
use crate::video::errors::*;
use crate::video::program::Program;
use crate::video::uniform::UniformLocation;

use super::layout::{LightCategory, LightField};
use super::variant::Features;

/// Uniforms that are not part of any light struct.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GlobalUniform {
    World,
    WorldViewProjection,
    Sampler,
    EyeWorldPos,
    MatSpecularIntensity,
    MatSpecularPower,
    NumPointLights,
    NumSpotLights,
}

impl GlobalUniform {
    pub const ALL: [GlobalUniform; 8] = [
        GlobalUniform::World,
        GlobalUniform::WorldViewProjection,
        GlobalUniform::Sampler,
        GlobalUniform::EyeWorldPos,
        GlobalUniform::MatSpecularIntensity,
        GlobalUniform::MatSpecularPower,
        GlobalUniform::NumPointLights,
        GlobalUniform::NumSpotLights,
    ];

    /// The GLSL name.
    pub fn name(self) -> &'static str {
        match self {
            GlobalUniform::World => "gWorld",
            GlobalUniform::WorldViewProjection => "gWVP",
            GlobalUniform::Sampler => "gSampler",
            GlobalUniform::EyeWorldPos => "gEyeWorldPos",
            GlobalUniform::MatSpecularIntensity => "gMatSpecularIntensity",
            GlobalUniform::MatSpecularPower => "gSpecularPower",
            GlobalUniform::NumPointLights => "gNumPointLights",
            GlobalUniform::NumSpotLights => "gNumSpotLights",
        }
    }

    /// The logical key, e.g. `material.specular_power`.
    pub fn as_str(self) -> &'static str {
        match self {
            GlobalUniform::World => "world",
            GlobalUniform::WorldViewProjection => "world_view_projection",
            GlobalUniform::Sampler => "sampler",
            GlobalUniform::EyeWorldPos => "eye_world_position",
            GlobalUniform::MatSpecularIntensity => "material.specular_intensity",
            GlobalUniform::MatSpecularPower => "material.specular_power",
            GlobalUniform::NumPointLights => "point.count",
            GlobalUniform::NumSpotLights => "spot.count",
        }
    }

    /// Whether a variant with `features` declares this uniform.
    pub fn is_declared(self, features: &Features) -> bool {
        match self {
            GlobalUniform::World | GlobalUniform::WorldViewProjection | GlobalUniform::Sampler => {
                true
            }
            GlobalUniform::EyeWorldPos
            | GlobalUniform::MatSpecularIntensity
            | GlobalUniform::MatSpecularPower => features.specular,
            GlobalUniform::NumPointLights => features.max_point_lights > 0,
            GlobalUniform::NumSpotLights => features.max_spot_lights > 0,
        }
    }
}

/// The logical identity of one uniform, independent of the GLSL layout.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UniformKey {
    Global(GlobalUniform),
    Light {
        category: LightCategory,
        /// The slot in the light array. Always 0 for the directional light.
        index: usize,
        field: LightField,
    },
}

impl UniformKey {
    #[inline]
    pub fn light(category: LightCategory, index: usize, field: LightField) -> Self {
        UniformKey::Light {
            category,
            index,
            field,
        }
    }

    #[inline]
    pub fn directional(field: LightField) -> Self {
        UniformKey::light(LightCategory::Directional, 0, field)
    }

    #[inline]
    pub fn point(index: usize, field: LightField) -> Self {
        UniformKey::light(LightCategory::Point, index, field)
    }

    #[inline]
    pub fn spot(index: usize, field: LightField) -> Self {
        UniformKey::light(LightCategory::Spot, index, field)
    }
}

impl From<GlobalUniform> for UniformKey {
    fn from(v: GlobalUniform) -> Self {
        UniformKey::Global(v)
    }
}

impl fmt::Display for UniformKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            UniformKey::Global(v) => f.write_str(v.as_str()),
            UniformKey::Light {
                category,
                index,
                field,
            } => {
                if category.is_array() {
                    write!(f, "{}[{}].{}", category, index, field)
                } else {
                    write!(f, "{}.{}", category, field)
                }
            }
        }
    }
}

impl FromStr for UniformKey {
    type Err = String;

    fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
        if let Some(v) = GlobalUniform::ALL.iter().find(|v| v.as_str() == s) {
            return Ok(UniformKey::Global(*v));
        }

        let malformed = || format!("malformed uniform key `{}`", s);
        let dot = s.find('.').ok_or_else(malformed)?;
        let (head, field) = (&s[..dot], &s[dot + 1..]);
        let field: LightField = field.parse()?;

        let (category, index) = match head.find('[') {
            Some(open) => {
                if !head.ends_with(']') {
                    return Err(malformed());
                }

                let category: LightCategory = head[..open].parse()?;
                let index = head[open + 1..head.len() - 1]
                    .parse::<usize>()
                    .map_err(|_| malformed())?;

                if !category.is_array() {
                    return Err(malformed());
                }

                (category, index)
            }
            None => {
                let category: LightCategory = head.parse()?;
                if category.is_array() {
                    return Err(malformed());
                }

                (category, 0)
            }
        };

        Ok(UniformKey::light(category, index, field))
    }
}

#[derive(Debug, Clone)]
pub struct UniformEntry {
    pub name: String,
    pub location: UniformLocation,
}

/// Built once when a technique is initialized, and immutable afterwards.
#[derive(Debug, Default)]
pub struct UniformTable {
    entries: FastHashMap<UniformKey, UniformEntry>,
    keys: Vec<UniformKey>,
}

impl UniformTable {
    /// Synthesizes the name of every uniform a variant with `features`
    /// declares, in a stable order.
    pub fn synthesize(features: &Features) -> Vec<(UniformKey, String)> {
        let mut names = Vec::new();

        for &v in GlobalUniform::ALL.iter() {
            if v.is_declared(features) {
                names.push((UniformKey::Global(v), v.name().to_owned()));
            }
        }

        for &category in &[
            LightCategory::Directional,
            LightCategory::Point,
            LightCategory::Spot,
        ] {
            let layout = match features.layout.category(category) {
                Some(layout) => layout,
                None => continue,
            };

            let (slots, array) = if category.is_array() {
                (features.capacity(category), true)
            } else {
                (1, false)
            };

            for index in 0..slots {
                for &(field, _) in layout.fields {
                    let slot = if array { Some(index) } else { None };
                    if let Some(name) = layout.name(slot, field) {
                        names.push((UniformKey::light(category, index, field), name));
                    }
                }
            }
        }

        names
    }

    /// Synthesizes and resolves all the uniforms of `features` in `program`.
    ///
    /// Every synthesized name must be declared in the shader sources, otherwise
    /// the table and the layout disagree and `Error::UndeclaredUniform` is
    /// returned. Declared uniforms that the linker dropped keep an unresolved
    /// location.
    pub fn resolve(
        program: &Program,
        features: &Features,
        declared: &FastHashSet<String>,
    ) -> Result<UniformTable> {
        let names = UniformTable::synthesize(features);

        for (_, name) in &names {
            if !declared.contains(name) {
                return Err(Error::UndeclaredUniform(name.clone()));
            }
        }

        let mut table = UniformTable::default();
        for (key, name) in names {
            let location = program.resolve_uniform(&name)?;
            table.entries.insert(key, UniformEntry { name, location });
            table.keys.push(key);
        }

        Ok(table)
    }

    /// Gets the resolved location of `key`. Returns `None` if the variant does
    /// not declare it at all.
    #[inline]
    pub fn location<T: Into<UniformKey>>(&self, key: T) -> Option<UniformLocation> {
        self.entries.get(&key.into()).map(|v| v.location)
    }

    #[inline]
    pub fn name<T: Into<UniformKey>>(&self, key: T) -> Option<&str> {
        self.entries.get(&key.into()).map(|v| v.name.as_str())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Iterates the entries in the order they were synthesized.
    pub fn iter(&self) -> impl Iterator<Item = (UniformKey, &UniformEntry)> {
        let entries = &self.entries;
        self.keys
            .iter()
            .filter_map(move |k| entries.get(k).map(|v| (*k, v)))
    }

    /// Iterates the keys whose uniforms were optimized away.
    pub fn unresolved(&self) -> impl Iterator<Item = UniformKey> + '_ {
        self.iter()
            .filter(|(_, v)| !v.location.is_resolved())
            .map(|(k, _)| k)
    }
}
