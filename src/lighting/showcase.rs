//! The animated scene of the lighting demo: three colored point lights
//! orbiting the origin, a sweeping warm spot light and a cyan one mounted at
//! the camera.

use crate::math::prelude::{Matrix4, Vector3};

use super::light::*;
use super::technique::{FrameUniforms, SpecularMaterial};

/// The phase increment of each `advance`.
pub const PHASE_STEP: f32 = 0.1;

const ORBIT_RADIUS: f32 = 10.0;
const ORBIT_HEIGHT: f32 = 1.0;
const ORBIT_PHASES: [f32; 3] = [0.0, 2.1, 4.2];

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct OrbitRig {
    phase: f32,
}

impl OrbitRig {
    pub fn new() -> Self {
        OrbitRig::default()
    }

    #[inline]
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Steps the animation by one frame.
    pub fn advance(&mut self) {
        self.phase += PHASE_STEP;
    }

    /// The eye position the demo renders from.
    pub fn eye(&self) -> Vector3<f32> {
        Vector3::new(0.0, 0.0, -3.0)
    }

    pub fn scene(&self) -> LightScene {
        let directional = DirectionalLight {
            base: BaseLight::new(Vector3::new(1.0, 1.0, 1.0), 0.0, 0.75),
            direction: Vector3::new(1.0, 0.0, 0.0),
        };

        let colors = [
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
        ];

        let points = colors
            .iter()
            .zip(ORBIT_PHASES.iter())
            .map(|(&color, &offset)| {
                let angle = self.phase + offset;
                PointLight {
                    base: BaseLight::new(color, 0.0, 0.5),
                    position: Vector3::new(
                        ORBIT_RADIUS * angle.sin(),
                        ORBIT_HEIGHT,
                        ORBIT_RADIUS * angle.cos(),
                    ),
                    attenuation: Attenuation {
                        linear: 0.1,
                        ..Attenuation::default()
                    },
                }
            })
            .collect();

        let sweeping = SpotLight {
            base: BaseLight::new(Vector3::new(1.0, 1.0, 0.7), 0.0, 15.0),
            position: Vector3::new(0.0, -1.9, 0.0),
            attenuation: Attenuation {
                linear: 0.1,
                ..Attenuation::default()
            },
            direction: Vector3::new(self.phase.sin(), 0.0, self.phase.cos()),
            cutoff: 20.0,
        };

        let headlight = SpotLight {
            base: BaseLight::new(Vector3::new(0.0, 1.0, 1.0), 0.0, 5.0),
            position: self.eye(),
            attenuation: Attenuation {
                linear: 0.1,
                ..Attenuation::default()
            },
            direction: Vector3::new(0.0, 0.0, 2.0),
            cutoff: 10.0,
        };

        LightScene {
            directional,
            points,
            spots: vec![sweeping, headlight],
        }
    }

    /// The frame uniforms for the given transforms.
    pub fn frame(&self, world: Matrix4<f32>, world_view_projection: Matrix4<f32>) -> FrameUniforms {
        FrameUniforms {
            world,
            world_view_projection,
            eye_world_position: self.eye(),
            material: SpecularMaterial {
                specular_intensity: 1.0,
                specular_power: 32.0,
            },
            texture_unit: 0,
        }
    }
}
