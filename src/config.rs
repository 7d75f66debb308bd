use std::path::PathBuf;

use clap::Parser;
use glam::Vec3;

use crate::lighting::EnvironmentPreset;

/// URL requested ahead of first use to pre-warm the asset cache.
pub const DEFAULT_MODEL_URL: &str = "/model.glb";

/// Command line interface of the viewer.
#[derive(Debug, Parser)]
#[command(name = "modelview", about = "Interactive glTF model viewer")]
pub struct Args {
    /// Model to display. Absolute URLs such as `/model.glb` are resolved against `--asset-root`.
    #[arg(default_value = DEFAULT_MODEL_URL)]
    pub model_url: String,

    /// Directory that plays the role of the web root for absolute model URLs.
    #[arg(long, default_value = "public")]
    pub asset_root: PathBuf,

    /// Keep the model still instead of spinning it.
    #[arg(long)]
    pub no_auto_rotate: bool,

    /// Auto-rotation speed in radians per second.
    #[arg(long, default_value_t = 0.5)]
    pub rotation_speed: f32,

    #[arg(long, value_enum, default_value_t = EnvironmentPreset::City)]
    pub environment: EnvironmentPreset,

    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    #[arg(long, default_value_t = 720)]
    pub height: u32,
}

#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub model_url: String,
    pub asset_root: PathBuf,
    pub auto_rotate: bool,
    pub rotation_speed: f32,
    /// Models whose largest dimension exceeds this are scaled down to it.
    pub max_dimension: f32,
    pub camera_position: Vec3,
    pub environment: EnvironmentPreset,
    pub window_size: (u32, u32),
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            model_url: DEFAULT_MODEL_URL.to_string(),
            asset_root: PathBuf::from("public"),
            auto_rotate: true,
            rotation_speed: 0.5,
            max_dimension: 2.0,
            camera_position: Vec3::new(0.0, 0.0, 5.0),
            environment: EnvironmentPreset::City,
            window_size: (1280, 720),
        }
    }
}

impl From<Args> for ViewerConfig {
    fn from(args: Args) -> Self {
        Self {
            model_url: args.model_url,
            asset_root: args.asset_root,
            auto_rotate: !args.no_auto_rotate,
            rotation_speed: args.rotation_speed,
            environment: args.environment,
            window_size: (args.width.max(1), args.height.max(1)),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_cli_defaults() {
        let args = Args::parse_from(["modelview"]);
        let config = ViewerConfig::from(args);
        let defaults = ViewerConfig::default();

        assert_eq!(config.model_url, defaults.model_url);
        assert_eq!(config.asset_root, defaults.asset_root);
        assert_eq!(config.auto_rotate, defaults.auto_rotate);
        assert_eq!(config.rotation_speed, defaults.rotation_speed);
        assert_eq!(config.environment, defaults.environment);
        assert_eq!(config.window_size, defaults.window_size);
    }

    #[test]
    fn cli_overrides() {
        let args = Args::parse_from([
            "modelview",
            "models/duck.glb",
            "--no-auto-rotate",
            "--environment",
            "sunset",
            "--width",
            "0",
        ]);
        let config = ViewerConfig::from(args);

        assert_eq!(config.model_url, "models/duck.glb");
        assert!(!config.auto_rotate);
        assert_eq!(config.environment, EnvironmentPreset::Sunset);
        assert_eq!(config.window_size.0, 1);
    }
}
