//! Phong light types and the uniform layout of the `model` shader.

use glam::Vec3;

use crate::abs::ShaderProgram;
use crate::camera::Camera;

pub const POINT_LIGHT_COUNT: usize = 4;

pub const POINT_LIGHT_POSITIONS: [Vec3; POINT_LIGHT_COUNT] = [
    Vec3::new(0.7, 0.2, 2.0),
    Vec3::new(2.3, -3.3, -4.0),
    Vec3::new(-4.0, 2.0, -12.0),
    Vec3::new(0.0, 0.0, -3.0),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirLight {
    pub direction: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
}

impl Default for DirLight {
    fn default() -> Self {
        Self {
            direction: Vec3::new(-0.2, -1.0, -0.3),
            ambient: Vec3::splat(0.05),
            diffuse: Vec3::splat(0.4),
            specular: Vec3::splat(0.5),
        }
    }
}

impl DirLight {
    fn apply(&self, program: &ShaderProgram, name: &str) {
        program.set_uniform(&format!("{name}.direction"), self.direction);
        program.set_uniform(&format!("{name}.ambient"), self.ambient);
        program.set_uniform(&format!("{name}.diffuse"), self.diffuse);
        program.set_uniform(&format!("{name}.specular"), self.specular);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl PointLight {
    /// A white light with a range of roughly 50 units.
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ambient: Vec3::splat(0.05),
            diffuse: Vec3::splat(0.8),
            specular: Vec3::ONE,
            constant: 1.0,
            linear: 0.09,
            quadratic: 0.032,
        }
    }

    fn apply(&self, program: &ShaderProgram, name: &str) {
        program.set_uniform(&format!("{name}.position"), self.position);
        program.set_uniform(&format!("{name}.ambient"), self.ambient);
        program.set_uniform(&format!("{name}.diffuse"), self.diffuse);
        program.set_uniform(&format!("{name}.specular"), self.specular);
        program.set_uniform(&format!("{name}.constant"), self.constant);
        program.set_uniform(&format!("{name}.linear"), self.linear);
        program.set_uniform(&format!("{name}.quadratic"), self.quadratic);
    }
}

/// A cone of light. Cut-offs are stored as cosines of the half-angles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotLight {
    pub light: PointLight,
    pub direction: Vec3,
    pub cut_off: f32,
    pub outer_cut_off: f32,
}

impl Default for SpotLight {
    fn default() -> Self {
        Self {
            light: PointLight {
                ambient: Vec3::ZERO,
                diffuse: Vec3::ONE,
                specular: Vec3::ONE,
                ..PointLight::at(Vec3::ZERO)
            },
            direction: Vec3::NEG_Z,
            cut_off: 12.5_f32.to_radians().cos(),
            outer_cut_off: 15.0_f32.to_radians().cos(),
        }
    }
}

impl SpotLight {
    /// Places the cone at the camera, pointing where it looks.
    pub fn follow(&mut self, camera: &Camera) {
        self.light.position = camera.position;
        self.direction = camera.front();
    }

    fn apply(&self, program: &ShaderProgram, name: &str) {
        self.light.apply(program, name);
        program.set_uniform(&format!("{name}.direction"), self.direction);
        program.set_uniform(&format!("{name}.cut_off"), self.cut_off);
        program.set_uniform(&format!("{name}.outer_cut_off"), self.outer_cut_off);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self { shininess: 64.0 }
    }
}

/// The full set of lights the `model` shader expects.
#[derive(Debug, Clone, PartialEq)]
pub struct LightRig {
    pub dir_light: DirLight,
    pub point_lights: [PointLight; POINT_LIGHT_COUNT],
    pub spot_light: SpotLight,
    pub material: Material,
    /// Whether the spot light tracks the camera on every `apply`.
    pub flashlight: bool,
}

impl Default for LightRig {
    fn default() -> Self {
        Self {
            dir_light: DirLight::default(),
            point_lights: POINT_LIGHT_POSITIONS.map(PointLight::at),
            spot_light: SpotLight::default(),
            material: Material::default(),
            flashlight: true,
        }
    }
}

impl LightRig {
    /// Uploads every light plus `view_pos` and `material.shininess`.
    /// `program` must be in use.
    pub fn apply(&mut self, program: &ShaderProgram, camera: &Camera) {
        if self.flashlight {
            self.spot_light.follow(camera);
        }

        program.set_uniform("view_pos", camera.position);
        self.dir_light.apply(program, "dir_light");
        for (i, light) in self.point_lights.iter().enumerate() {
            light.apply(program, &format!("point_lights[{i}]"));
        }
        self.spot_light.apply(program, "spot_light");
        program.set_uniform("material.shininess", self.material.shininess);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rig_matches_the_scene_layout() {
        let rig = LightRig::default();
        let positions: Vec<_> = rig.point_lights.iter().map(|light| light.position).collect();
        assert_eq!(positions, POINT_LIGHT_POSITIONS.to_vec());
        assert_eq!(rig.dir_light.direction, Vec3::new(-0.2, -1.0, -0.3));
        assert_eq!(rig.material.shininess, 64.0);
        assert_eq!(rig.spot_light.light.ambient, Vec3::ZERO);
        assert_eq!(rig.spot_light.light.linear, 0.09);
    }

    #[test]
    fn point_lights_use_the_fifty_unit_range() {
        let light = PointLight::at(Vec3::ZERO);
        assert_eq!(
            (light.constant, light.linear, light.quadratic),
            (1.0, 0.09, 0.032)
        );
        assert_eq!(light.specular, Vec3::ONE);
    }

    #[test]
    fn spot_cone_is_twelve_and_a_half_to_fifteen_degrees() {
        let spot = SpotLight::default();
        assert!(spot.cut_off > spot.outer_cut_off);
        assert!((spot.cut_off.acos().to_degrees() - 12.5).abs() < 1e-3);
        assert!((spot.outer_cut_off.acos().to_degrees() - 15.0).abs() < 1e-3);
    }

    #[test]
    fn spot_light_follows_camera() {
        let mut spot = SpotLight::default();
        let mut camera = Camera::new(Vec3::new(1.0, 2.0, 3.0));
        camera.process_mouse_movement(900.0, 0.0, true);
        spot.follow(&camera);
        assert_eq!(spot.light.position, Vec3::new(1.0, 2.0, 3.0));
        assert!((spot.direction - Vec3::X).length() < 1e-5);
    }
}
