use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::layout::{LightCategory, LightLayout, AMBIENT_LAYOUT, FLAT_LAYOUT, POINT_LAYOUT, SPOT_LAYOUT};

pub const MAX_POINT_LIGHTS: usize = 3;
pub const MAX_SPOT_LIGHTS: usize = 2;

/// The progressive capability variants. Each one strictly extends the previous.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// `Color * AmbientIntensity` of the directional light.
    Ambient,
    /// Adds the Lambert term of the directional light.
    Diffuse,
    /// Adds the specular reflection term.
    Specular,
    /// Adds up to `MAX_POINT_LIGHTS` attenuated point lights.
    PointLights,
    /// Adds up to `MAX_SPOT_LIGHTS` spot lights.
    SpotLights,
}

impl Default for Variant {
    fn default() -> Self {
        Variant::SpotLights
    }
}

impl Variant {
    pub const ALL: [Variant; 5] = [
        Variant::Ambient,
        Variant::Diffuse,
        Variant::Specular,
        Variant::PointLights,
        Variant::SpotLights,
    ];

    pub fn features(self) -> &'static Features {
        match self {
            Variant::Ambient => &AMBIENT,
            Variant::Diffuse => &DIFFUSE,
            Variant::Specular => &SPECULAR,
            Variant::PointLights => &POINT_LIGHTS,
            Variant::SpotLights => &SPOT_LIGHTS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Ambient => "ambient",
            Variant::Diffuse => "diffuse",
            Variant::Specular => "specular",
            Variant::PointLights => "point_lights",
            Variant::SpotLights => "spot_lights",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ambient" | "1" => Ok(Variant::Ambient),
            "diffuse" | "2" => Ok(Variant::Diffuse),
            "specular" | "3" => Ok(Variant::Specular),
            "point_lights" | "point" | "4" => Ok(Variant::PointLights),
            "spot_lights" | "spot" | "5" => Ok(Variant::SpotLights),
            _ => Err(format!("unknown lighting variant `{}`", s)),
        }
    }
}

/// What a variant declares: which terms its fragment stage evaluates, how many
/// lights of each category it holds and how its light structs are laid out.
#[derive(Debug)]
pub struct Features {
    pub variant: Variant,
    pub diffuse: bool,
    pub specular: bool,
    pub max_point_lights: usize,
    pub max_spot_lights: usize,
    pub layout: &'static LightLayout,
}

impl Features {
    /// Capacity of the light arrays of `category`. A directional light is
    /// always present.
    pub fn capacity(&self, category: LightCategory) -> usize {
        match category {
            LightCategory::Directional => 1,
            LightCategory::Point => self.max_point_lights,
            LightCategory::Spot => self.max_spot_lights,
        }
    }

    /// Whether the light structs nest a shared `BaseLight`.
    pub fn is_nested(&self) -> bool {
        self.max_point_lights > 0
    }
}

static AMBIENT: Features = Features {
    variant: Variant::Ambient,
    diffuse: false,
    specular: false,
    max_point_lights: 0,
    max_spot_lights: 0,
    layout: &AMBIENT_LAYOUT,
};

static DIFFUSE: Features = Features {
    variant: Variant::Diffuse,
    diffuse: true,
    specular: false,
    max_point_lights: 0,
    max_spot_lights: 0,
    layout: &FLAT_LAYOUT,
};

static SPECULAR: Features = Features {
    variant: Variant::Specular,
    diffuse: true,
    specular: true,
    max_point_lights: 0,
    max_spot_lights: 0,
    layout: &FLAT_LAYOUT,
};

static POINT_LIGHTS: Features = Features {
    variant: Variant::PointLights,
    diffuse: true,
    specular: true,
    max_point_lights: MAX_POINT_LIGHTS,
    max_spot_lights: 0,
    layout: &POINT_LAYOUT,
};

static SPOT_LIGHTS: Features = Features {
    variant: Variant::SpotLights,
    diffuse: true,
    specular: true,
    max_point_lights: MAX_POINT_LIGHTS,
    max_spot_lights: MAX_SPOT_LIGHTS,
    layout: &SPOT_LAYOUT,
};

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn lattice() {
        for pair in Variant::ALL.windows(2) {
            let (lhs, rhs) = (pair[0].features(), pair[1].features());
            assert!(lhs.variant < rhs.variant);
            assert!(lhs.diffuse <= rhs.diffuse);
            assert!(lhs.specular <= rhs.specular);
            assert!(lhs.max_point_lights <= rhs.max_point_lights);
            assert!(lhs.max_spot_lights <= rhs.max_spot_lights);
        }

        assert_eq!(Variant::SpotLights.features().capacity(LightCategory::Spot), 2);
        assert_eq!(Variant::Specular.features().capacity(LightCategory::Point), 0);
    }

    #[test]
    fn parse() {
        for v in Variant::ALL.iter() {
            assert_eq!(v.as_str().parse::<Variant>(), Ok(*v));
        }

        assert_eq!("4".parse::<Variant>(), Ok(Variant::PointLights));
        assert!("phong".parse::<Variant>().is_err());
    }
}
