//! Startup configuration.
//!
//! Everything the demo treats as tunable at process start lives here: window
//! mode, vsync, MSAA sample count, camera and spotlight parameters, and the
//! asset paths of the scene. Values come from an optional `settings.json`
//! next to the executable; a missing or unreadable file falls back to the
//! defaults with a logged warning rather than aborting.

use serde::{Deserialize, Serialize};

/// MSAA sample counts the render targets are created with.
///
/// wgpu guarantees 1 and 4 on every backend; anything else from the settings
/// file is coerced to the nearest supported count.
pub const SUPPORTED_SAMPLE_COUNTS: [u32; 2] = [1, 4];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fullscreen: bool,
    pub vsync: bool,
    pub msaa_samples: u32,
    pub window_size: (u32, u32),

    pub move_speed: f32,
    pub mouse_sensitivity: f32,
    pub fov: f32,
    pub min_fov: f32,
    pub max_fov: f32,

    pub shadow_map_size: u32,

    /// OBJ model shown in the middle of the scene, relative to the assets dir.
    pub model_path: String,
    /// Unit cube used as skybox geometry.
    pub cube_path: String,
    /// Skybox faces in +X, -X, +Y, -Y, +Z, -Z order.
    pub skybox_faces: [String; 6],
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fullscreen: true,
            vsync: true,
            msaa_samples: 4,
            window_size: (800, 600),
            move_speed: 2.5,
            mouse_sensitivity: 0.4,
            fov: 70.0,
            min_fov: 0.1,
            max_fov: 120.0,
            shadow_map_size: 1024,
            model_path: "assets/models/backpack/backpack.obj".to_string(),
            cube_path: "assets/models/cube.obj".to_string(),
            skybox_faces: [
                "assets/textures/skybox/right.jpg".to_string(),
                "assets/textures/skybox/left.jpg".to_string(),
                "assets/textures/skybox/top.jpg".to_string(),
                "assets/textures/skybox/bottom.jpg".to_string(),
                "assets/textures/skybox/front.jpg".to_string(),
                "assets/textures/skybox/back.jpg".to_string(),
            ],
        }
    }
}

impl Config {
    /// Load settings from `path`, falling back to the defaults when the file
    /// is missing or malformed. Never fatal: a broken settings file should
    /// not keep the demo from starting.
    pub fn load_or_default(path: &str) -> Self {
        let config = match std::fs::read_to_string(path) {
            Ok(text) => match serde_json::from_str::<Config>(&text) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!("Could not parse {path}: {e}. Using default settings.");
                    Config::default()
                }
            },
            Err(e) => {
                log::warn!("Could not read {path}: {e}. Using default settings.");
                Config::default()
            }
        };
        config.sanitized()
    }

    /// Coerce out-of-range values into something the GPU accepts.
    pub fn sanitized(mut self) -> Self {
        if !SUPPORTED_SAMPLE_COUNTS.contains(&self.msaa_samples) {
            let coerced = if self.msaa_samples > 1 { 4 } else { 1 };
            log::warn!(
                "Unsupported msaa_samples {} coerced to {}",
                self.msaa_samples,
                coerced
            );
            self.msaa_samples = coerced;
        }
        if self.window_size.0 == 0 || self.window_size.1 == 0 {
            log::warn!("Zero window_size coerced to 800x600");
            self.window_size = (800, 600);
        }
        if self.min_fov >= self.max_fov {
            log::warn!("min_fov must be below max_fov; using 0.1..120.0");
            self.min_fov = 0.1;
            self.max_fov = 120.0;
        }
        self.fov = self.fov.clamp(self.min_fov, self.max_fov);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let config = Config::load_or_default("does/not/exist.json");
        assert_eq!(config.msaa_samples, 4);
        assert_eq!(config.window_size, (800, 600));
        assert!(config.vsync);
    }

    #[test]
    fn partial_settings_keep_defaults_for_the_rest() {
        let config: Config =
            serde_json::from_str(r#"{ "vsync": false, "window_size": [1280, 720] }"#).unwrap();
        assert!(!config.vsync);
        assert_eq!(config.window_size, (1280, 720));
        assert!(config.fullscreen);
        assert_eq!(config.fov, 70.0);
    }

    #[test]
    fn unsupported_sample_count_is_coerced() {
        let config = Config {
            msaa_samples: 8,
            ..Config::default()
        }
        .sanitized();
        assert_eq!(config.msaa_samples, 4);

        let config = Config {
            msaa_samples: 0,
            ..Config::default()
        }
        .sanitized();
        assert_eq!(config.msaa_samples, 1);
    }

    #[test]
    fn fov_is_clamped_into_range() {
        let config = Config {
            fov: 500.0,
            ..Config::default()
        }
        .sanitized();
        assert_eq!(config.fov, config.max_fov);
    }
}
