//! Static tables describing how each variant lays its light structs out in
//! GLSL. Every uniform name of a light is synthesized from these tables, so
//! the nesting depth of a field (`Color`, `Base.Color`, `Base.Base.Color`)
//! lives in exactly one place.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightCategory {
    Directional,
    Point,
    Spot,
}

impl LightCategory {
    /// Whether lights of this category are stored in a uniform array.
    pub fn is_array(self) -> bool {
        self != LightCategory::Directional
    }
}

impl fmt::Display for LightCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            LightCategory::Directional => f.write_str("directional"),
            LightCategory::Point => f.write_str("point"),
            LightCategory::Spot => f.write_str("spot"),
        }
    }
}

impl FromStr for LightCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "directional" => Ok(LightCategory::Directional),
            "point" => Ok(LightCategory::Point),
            "spot" => Ok(LightCategory::Spot),
            _ => Err(format!("unknown light category `{}`", s)),
        }
    }
}

/// A logical field of a light record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LightField {
    Color,
    AmbientIntensity,
    DiffuseIntensity,
    Position,
    AttenuationConstant,
    AttenuationLinear,
    AttenuationExp,
    Direction,
    Cutoff,
}

impl LightField {
    pub const COUNT: usize = 9;

    pub const ALL: [LightField; LightField::COUNT] = [
        LightField::Color,
        LightField::AmbientIntensity,
        LightField::DiffuseIntensity,
        LightField::Position,
        LightField::AttenuationConstant,
        LightField::AttenuationLinear,
        LightField::AttenuationExp,
        LightField::Direction,
        LightField::Cutoff,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LightField::Color => "color",
            LightField::AmbientIntensity => "ambient",
            LightField::DiffuseIntensity => "diffuse",
            LightField::Position => "position",
            LightField::AttenuationConstant => "attenuation.constant",
            LightField::AttenuationLinear => "attenuation.linear",
            LightField::AttenuationExp => "attenuation.exp",
            LightField::Direction => "direction",
            LightField::Cutoff => "cutoff",
        }
    }
}

impl fmt::Display for LightField {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LightField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LightField::ALL
            .iter()
            .find(|v| v.as_str() == s)
            .cloned()
            .ok_or_else(|| format!("unknown light field `{}`", s))
    }
}

/// The GLSL uniform of one light category, and the path of each field inside
/// its struct.
#[derive(Debug)]
pub struct LightStruct {
    pub uniform: &'static str,
    pub fields: &'static [(LightField, &'static str)],
}

impl LightStruct {
    pub fn path(&self, field: LightField) -> Option<&'static str> {
        self.fields
            .iter()
            .find(|v| v.0 == field)
            .map(|v| v.1)
    }

    /// Synthesizes the fully-qualified uniform name of `field`, e.g.
    /// `gPointLights[1].Atten.Linear`.
    pub fn name(&self, index: Option<usize>, field: LightField) -> Option<String> {
        let path = self.path(field)?;
        Some(match index {
            Some(index) => format!("{}[{}].{}", self.uniform, index, path),
            None => format!("{}.{}", self.uniform, path),
        })
    }
}

/// The light structs of one variant.
#[derive(Debug)]
pub struct LightLayout {
    pub directional: LightStruct,
    pub point: Option<LightStruct>,
    pub spot: Option<LightStruct>,
}

impl LightLayout {
    pub fn category(&self, category: LightCategory) -> Option<&LightStruct> {
        match category {
            LightCategory::Directional => Some(&self.directional),
            LightCategory::Point => self.point.as_ref(),
            LightCategory::Spot => self.spot.as_ref(),
        }
    }
}

pub const DIRECTIONAL_UNIFORM: &str = "gDirectionalLight";
pub const POINT_UNIFORM: &str = "gPointLights";
pub const SPOT_UNIFORM: &str = "gSpotLights";

const AMBIENT_DIRECTIONAL: &[(LightField, &str)] = &[
    (LightField::Color, "Color"),
    (LightField::AmbientIntensity, "AmbientIntensity"),
];

const FLAT_DIRECTIONAL: &[(LightField, &str)] = &[
    (LightField::Color, "Color"),
    (LightField::AmbientIntensity, "AmbientIntensity"),
    (LightField::DiffuseIntensity, "DiffuseIntensity"),
    (LightField::Direction, "Direction"),
];

const NESTED_DIRECTIONAL: &[(LightField, &str)] = &[
    (LightField::Color, "Base.Color"),
    (LightField::AmbientIntensity, "Base.AmbientIntensity"),
    (LightField::DiffuseIntensity, "Base.DiffuseIntensity"),
    (LightField::Direction, "Direction"),
];

const POINT: &[(LightField, &str)] = &[
    (LightField::Color, "Base.Color"),
    (LightField::AmbientIntensity, "Base.AmbientIntensity"),
    (LightField::DiffuseIntensity, "Base.DiffuseIntensity"),
    (LightField::Position, "Position"),
    (LightField::AttenuationConstant, "Atten.Constant"),
    (LightField::AttenuationLinear, "Atten.Linear"),
    (LightField::AttenuationExp, "Atten.Exp"),
];

const SPOT: &[(LightField, &str)] = &[
    (LightField::Color, "Base.Base.Color"),
    (LightField::AmbientIntensity, "Base.Base.AmbientIntensity"),
    (LightField::DiffuseIntensity, "Base.Base.DiffuseIntensity"),
    (LightField::Position, "Base.Position"),
    (LightField::AttenuationConstant, "Base.Atten.Constant"),
    (LightField::AttenuationLinear, "Base.Atten.Linear"),
    (LightField::AttenuationExp, "Base.Atten.Exp"),
    (LightField::Direction, "Direction"),
    (LightField::Cutoff, "Cutoff"),
];

/// Ambient only, `DirectionalLight { Color; AmbientIntensity; }`.
pub static AMBIENT_LAYOUT: LightLayout = LightLayout {
    directional: LightStruct {
        uniform: DIRECTIONAL_UNIFORM,
        fields: AMBIENT_DIRECTIONAL,
    },
    point: None,
    spot: None,
};

/// A flat directional light struct, shared by the diffuse and specular variants.
pub static FLAT_LAYOUT: LightLayout = LightLayout {
    directional: LightStruct {
        uniform: DIRECTIONAL_UNIFORM,
        fields: FLAT_DIRECTIONAL,
    },
    point: None,
    spot: None,
};

pub static POINT_LAYOUT: LightLayout = LightLayout {
    directional: LightStruct {
        uniform: DIRECTIONAL_UNIFORM,
        fields: NESTED_DIRECTIONAL,
    },
    point: Some(LightStruct {
        uniform: POINT_UNIFORM,
        fields: POINT,
    }),
    spot: None,
};

pub static SPOT_LAYOUT: LightLayout = LightLayout {
    directional: LightStruct {
        uniform: DIRECTIONAL_UNIFORM,
        fields: NESTED_DIRECTIONAL,
    },
    point: Some(LightStruct {
        uniform: POINT_UNIFORM,
        fields: POINT,
    }),
    spot: Some(LightStruct {
        uniform: SPOT_UNIFORM,
        fields: SPOT,
    }),
};

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn names() {
        let v = &AMBIENT_LAYOUT.directional;
        assert_eq!(
            v.name(None, LightField::Color).unwrap(),
            "gDirectionalLight.Color"
        );
        assert_eq!(v.name(None, LightField::Direction), None);

        let v = &POINT_LAYOUT.directional;
        assert_eq!(
            v.name(None, LightField::Color).unwrap(),
            "gDirectionalLight.Base.Color"
        );

        let v = SPOT_LAYOUT.category(LightCategory::Spot).unwrap();
        assert_eq!(
            v.name(Some(0), LightField::Color).unwrap(),
            "gSpotLights[0].Base.Base.Color"
        );
        assert_eq!(
            v.name(Some(1), LightField::AttenuationExp).unwrap(),
            "gSpotLights[1].Base.Atten.Exp"
        );

        assert!(POINT_LAYOUT.category(LightCategory::Spot).is_none());
    }

    #[test]
    fn fields() {
        for field in LightField::ALL.iter() {
            assert_eq!(field.as_str().parse::<LightField>(), Ok(*field));
            assert_eq!(LightField::ALL[field.index()], *field);
        }

        assert!("atten".parse::<LightField>().is_err());
        assert_eq!("spot".parse::<LightCategory>(), Ok(LightCategory::Spot));
    }
}
