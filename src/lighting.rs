use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: Vec3,
    pub intensity: f32,
}

impl Default for AmbientLight {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            intensity: 0.5,
        }
    }
}

/// Cone light. `angle` is the half angle of the cone in radians and
/// `penumbra` the fraction of it over which the light fades out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotLight {
    pub position: Vec3,
    pub target: Vec3,
    pub color: Vec3,
    pub intensity: f32,
    pub angle: f32,
    pub penumbra: f32,
}

impl Default for SpotLight {
    fn default() -> Self {
        Self {
            position: Vec3::new(10.0, 10.0, 10.0),
            target: Vec3::ZERO,
            color: Vec3::ONE,
            intensity: 1.0,
            angle: 0.15,
            penumbra: 1.0,
        }
    }
}

impl SpotLight {
    pub fn direction(&self) -> Vec3 {
        (self.target - self.position).normalize_or(Vec3::NEG_Y)
    }

    /// Cosine of the angle inside which the light is at full intensity.
    pub fn inner_cos(&self) -> f32 {
        (self.angle * (1.0 - self.penumbra.clamp(0.0, 1.0))).cos()
    }

    pub fn outer_cos(&self) -> f32 {
        self.angle.cos()
    }
}

/// Backdrop and image-free ambient fill, named after common HDRI presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum EnvironmentPreset {
    City,
    Dawn,
    Forest,
    Night,
    Studio,
    Sunset,
    Warehouse,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Environment {
    pub sky: Vec3,
    pub horizon: Vec3,
    pub ground: Vec3,
    /// How much of the sky/ground color reaches surfaces.
    pub intensity: f32,
}

impl EnvironmentPreset {
    pub fn environment(self) -> Environment {
        let (sky, horizon, ground, intensity) = match self {
            Self::City => (
                Vec3::new(0.55, 0.62, 0.72),
                Vec3::new(0.80, 0.78, 0.74),
                Vec3::new(0.25, 0.24, 0.23),
                0.6,
            ),
            Self::Dawn => (
                Vec3::new(0.35, 0.42, 0.65),
                Vec3::new(0.95, 0.65, 0.50),
                Vec3::new(0.20, 0.16, 0.18),
                0.5,
            ),
            Self::Forest => (
                Vec3::new(0.45, 0.60, 0.50),
                Vec3::new(0.60, 0.70, 0.55),
                Vec3::new(0.15, 0.20, 0.10),
                0.5,
            ),
            Self::Night => (
                Vec3::new(0.02, 0.03, 0.08),
                Vec3::new(0.10, 0.10, 0.18),
                Vec3::new(0.02, 0.02, 0.03),
                0.3,
            ),
            Self::Studio => (
                Vec3::new(0.85, 0.85, 0.85),
                Vec3::new(0.75, 0.75, 0.75),
                Vec3::new(0.45, 0.45, 0.45),
                0.7,
            ),
            Self::Sunset => (
                Vec3::new(0.30, 0.25, 0.50),
                Vec3::new(1.00, 0.55, 0.30),
                Vec3::new(0.20, 0.12, 0.10),
                0.5,
            ),
            Self::Warehouse => (
                Vec3::new(0.50, 0.48, 0.45),
                Vec3::new(0.65, 0.60, 0.52),
                Vec3::new(0.22, 0.20, 0.18),
                0.6,
            ),
        };

        Environment {
            sky,
            horizon,
            ground,
            intensity,
        }
    }
}

/// Everything that lights the model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    pub ambient: AmbientLight,
    pub spot: SpotLight,
    pub environment: Environment,
}

impl Lighting {
    pub fn new(preset: EnvironmentPreset) -> Self {
        Self {
            ambient: AmbientLight::default(),
            spot: SpotLight::default(),
            environment: preset.environment(),
        }
    }
}
