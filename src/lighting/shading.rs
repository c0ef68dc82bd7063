//! A CPU rendition of the fragment stage. It evaluates exactly what the
//! generated GLSL evaluates for the same `Features`, and is used to reason
//! about shading results without a GPU.

use crate::math::prelude::*;
use crate::math;

use super::light::{BaseLight, DirectionalLight, LightScene, PointLight, SpotLight};
use super::technique::SpecularMaterial;
use super::variant::Features;

/// The interpolated inputs of one fragment.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Surface {
    pub normal: Vector3<f32>,
    pub world_position: Vector3<f32>,
    pub eye_position: Vector3<f32>,
    /// The sampled texture color.
    pub texel: Vector3<f32>,
}

#[inline]
fn zero() -> Vector3<f32> {
    Vector3::new(0.0, 0.0, 0.0)
}

#[inline]
fn normalize_or_zero(v: Vector3<f32>) -> Vector3<f32> {
    math::try_normalize(v).unwrap_or_else(zero)
}

/// The contribution of `light` shining along `direction` onto `surface`.
pub fn light_internal(
    features: &Features,
    light: &BaseLight,
    direction: Vector3<f32>,
    surface: &Surface,
    material: &SpecularMaterial,
) -> Vector3<f32> {
    let ambient = light.color * light.ambient_intensity;
    if !features.diffuse {
        return ambient;
    }

    let normal = normalize_or_zero(surface.normal);
    let diffuse_factor = normal.dot(-direction);

    let mut diffuse = zero();
    let mut specular = zero();

    if diffuse_factor > 0.0 {
        diffuse = light.color * (light.diffuse_intensity * diffuse_factor);

        if features.specular {
            let vertex_to_eye = normalize_or_zero(surface.eye_position - surface.world_position);
            let light_reflect = normalize_or_zero(math::reflect(direction, normal));
            let specular_factor = vertex_to_eye.dot(light_reflect);

            if specular_factor > 0.0 {
                let specular_factor = specular_factor.powf(material.specular_power);
                specular = light.color * (material.specular_intensity * specular_factor);
            }
        }
    }

    ambient + diffuse + specular
}

pub fn directional(
    features: &Features,
    light: &DirectionalLight,
    surface: &Surface,
    material: &SpecularMaterial,
) -> Vector3<f32> {
    let direction = normalize_or_zero(light.direction);
    light_internal(features, &light.base, direction, surface, material)
}

pub fn point(
    features: &Features,
    light: &PointLight,
    surface: &Surface,
    material: &SpecularMaterial,
) -> Vector3<f32> {
    let offset = surface.world_position - light.position;
    let distance = offset.magnitude();
    let direction = normalize_or_zero(offset);

    let color = light_internal(features, &light.base, direction, surface, material);
    color / light.attenuation.factor(distance)
}

/// The linear fade from the rim of the cone (0) to its axis (1). Everything
/// outside of the cone is 0.
#[inline]
pub fn spot_smoothing(spot_factor: f32, cutoff_cos: f32) -> f32 {
    if spot_factor > cutoff_cos {
        1.0 - (1.0 - spot_factor) / (1.0 - cutoff_cos)
    } else {
        0.0
    }
}

pub fn spot(
    features: &Features,
    light: &SpotLight,
    surface: &Surface,
    material: &SpecularMaterial,
) -> Vector3<f32> {
    let light_to_pixel = normalize_or_zero(surface.world_position - light.position);
    let spot_factor = light_to_pixel.dot(normalize_or_zero(light.direction));
    let cutoff_cos = math::cutoff_cosine(light.cutoff);

    if spot_factor > cutoff_cos {
        let base = PointLight {
            base: light.base,
            position: light.position,
            attenuation: light.attenuation,
        };

        point(features, &base, surface, material) * spot_smoothing(spot_factor, cutoff_cos)
    } else {
        zero()
    }
}

/// Shades `surface` with `scene`. Lights beyond the capacities of `features`
/// are ignored, the same way the fragment stage never sees them.
pub fn shade(
    features: &Features,
    scene: &LightScene,
    material: &SpecularMaterial,
    surface: &Surface,
) -> Vector3<f32> {
    let mut total = directional(features, &scene.directional, surface, material);

    for light in scene.points.iter().take(features.max_point_lights) {
        total += point(features, light, surface, material);
    }

    for light in scene.spots.iter().take(features.max_spot_lights) {
        total += spot(features, light, surface, material);
    }

    surface.texel.mul_element_wise(total)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lighting::variant::Variant;

    fn surface() -> Surface {
        Surface {
            normal: Vector3::new(0.0, 0.0, 1.0),
            world_position: Vector3::new(0.0, 0.0, 0.0),
            eye_position: Vector3::new(0.0, 0.0, 5.0),
            texel: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    fn white() -> BaseLight {
        BaseLight::new(Vector3::new(1.0, 1.0, 1.0), 0.0, 1.0)
    }

    #[test]
    fn back_facing() {
        let features = Variant::Specular.features();
        let material = SpecularMaterial::default();

        // Grazing, diffuse factor is exactly 0.
        let v = light_internal(features, &white(), Vector3::new(1.0, 0.0, 0.0), &surface(), &material);
        assert_eq!(v, zero());

        // From behind.
        let v = light_internal(features, &white(), Vector3::new(0.0, 0.0, 1.0), &surface(), &material);
        assert_eq!(v, zero());

        // Head-on gets both diffuse and specular.
        let v = light_internal(features, &white(), Vector3::new(0.0, 0.0, -1.0), &surface(), &material);
        assert!(v.x > 1.0);
    }

    #[test]
    fn ambient_only() {
        let features = Variant::Ambient.features();
        let light = BaseLight::new(Vector3::new(1.0, 0.5, 0.0), 0.5, 1.0);
        let v = light_internal(
            features,
            &light,
            Vector3::new(0.0, 0.0, -1.0),
            &surface(),
            &SpecularMaterial::default(),
        );

        assert_eq!(v, Vector3::new(0.5, 0.25, 0.0));
    }

    #[test]
    fn smoothing() {
        let cutoff = math::cutoff_cosine(20.0);
        assert_eq!(spot_smoothing(cutoff, cutoff), 0.0);
        assert_eq!(spot_smoothing(cutoff - 0.1, cutoff), 0.0);
        assert!(spot_smoothing(cutoff + 1e-4, cutoff) < 1e-2);
        assert!((spot_smoothing(1.0, cutoff) - 1.0).abs() < 1e-6);
    }
}
