//! Scene component options and variant presets

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::SceneError;

/// Video file served next to the page
pub const DEFAULT_VIDEO_SRC: &str = "video.mp4";

/// Feature presets matching the application's incremental releases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Drag-to-rotate cube, always rendering
    Basic,
    /// Adds the AR session toggle; the cube only exists during a session
    Immersive,
    /// Immersive plus a looping video mapped onto the cube
    VideoTexture,
    /// Video texture plus click/tap to scale and toggle mute
    #[default]
    Interactive,
}

impl FromStr for Variant {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "immersive" => Ok(Self::Immersive),
            "video_texture" | "video-texture" | "video" => Ok(Self::VideoTexture),
            "interactive" => Ok(Self::Interactive),
            other => Err(SceneError::InvalidOptions(format!("unknown variant '{other}'"))),
        }
    }
}

/// When the render loop schedules frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopPolicy {
    /// Every display refresh for as long as the component is mounted
    #[default]
    Continuous,
    /// Only while an immersive session is active
    WhileSessionActive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraOptions {
    #[serde(default = "default_fov")]
    pub fov_y_degrees: f32,
    #[serde(default = "default_near")]
    pub near: f32,
    #[serde(default = "default_far")]
    pub far: f32,
    /// Distance from the origin along +Z
    #[serde(default = "default_distance")]
    pub distance: f32,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            fov_y_degrees: default_fov(),
            near: default_near(),
            far: default_far(),
            distance: default_distance(),
        }
    }
}

fn default_fov() -> f32 {
    75.0
}

fn default_near() -> f32 {
    0.1
}

fn default_far() -> f32 {
    1000.0
}

fn default_distance() -> f32 {
    5.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoOptions {
    /// Video URL, relative to the page
    #[serde(default = "default_video_src")]
    pub src: String,
    #[serde(default = "default_true")]
    pub looping: bool,
    /// Browsers only autoplay muted media
    #[serde(default = "default_true")]
    pub start_muted: bool,
}

impl Default for VideoOptions {
    fn default() -> Self {
        Self {
            src: default_video_src(),
            looping: true,
            start_muted: true,
        }
    }
}

fn default_video_src() -> String {
    DEFAULT_VIDEO_SRC.to_string()
}

/// Scene component configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneOptions {
    /// Rotate the cube by dragging it
    #[serde(default = "default_true")]
    pub drag_rotate: bool,
    /// Show the AR session toggle; the cube is only in the scene during a session
    #[serde(default)]
    pub immersive: bool,
    #[serde(default)]
    pub loop_policy: LoopPolicy,
    /// Map a looping video onto the cube
    #[serde(default)]
    pub video: Option<VideoOptions>,
    /// Click/tap the cube to scale it up and toggle mute
    #[serde(default)]
    pub click_to_scale: bool,
    /// Radians per pixel of pointer movement
    #[serde(default = "default_rotate_speed")]
    pub rotate_speed: f32,
    /// Scale multiplier per click/tap
    #[serde(default = "default_scale_step")]
    pub scale_step: f32,
    /// Cube colour (0xRRGGBB) when no video is mapped
    #[serde(default = "default_color")]
    pub color: u32,
    #[serde(default)]
    pub camera: CameraOptions,
}

fn default_true() -> bool {
    true
}

fn default_rotate_speed() -> f32 {
    0.01
}

fn default_scale_step() -> f32 {
    1.1
}

fn default_color() -> u32 {
    0x00ff00
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self::preset(Variant::Basic)
    }
}

impl SceneOptions {
    /// Options for one of the release presets
    pub fn preset(variant: Variant) -> Self {
        let base = Self {
            drag_rotate: true,
            immersive: false,
            loop_policy: LoopPolicy::Continuous,
            video: None,
            click_to_scale: false,
            rotate_speed: default_rotate_speed(),
            scale_step: default_scale_step(),
            color: default_color(),
            camera: CameraOptions::default(),
        };

        match variant {
            Variant::Basic => base,
            Variant::Immersive => Self {
                immersive: true,
                loop_policy: LoopPolicy::WhileSessionActive,
                ..base
            },
            Variant::VideoTexture => Self {
                video: Some(VideoOptions::default()),
                ..Self::preset(Variant::Immersive)
            },
            Variant::Interactive => Self {
                click_to_scale: true,
                ..Self::preset(Variant::VideoTexture)
            },
        }
    }

    /// Parse options from JSON; absent fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        let options: Self = serde_json::from_str(json)
            .map_err(|e| SceneError::InvalidOptions(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), SceneError> {
        let camera = &self.camera;
        if !(camera.fov_y_degrees > 0.0 && camera.fov_y_degrees < 180.0) {
            return Err(SceneError::InvalidOptions(format!(
                "camera fov must be within (0, 180), got {}",
                camera.fov_y_degrees
            )));
        }
        if !(camera.near > 0.0 && camera.far > camera.near) {
            return Err(SceneError::InvalidOptions(format!(
                "camera clip planes must satisfy 0 < near < far, got near={} far={}",
                camera.near, camera.far
            )));
        }
        if !self.rotate_speed.is_finite() {
            return Err(SceneError::InvalidOptions("rotate_speed must be finite".into()));
        }
        if !(self.scale_step.is_finite() && self.scale_step > 0.0) {
            return Err(SceneError::InvalidOptions(format!(
                "scale_step must be positive, got {}",
                self.scale_step
            )));
        }
        if self.loop_policy == LoopPolicy::WhileSessionActive && !self.immersive {
            return Err(SceneError::InvalidOptions(
                "a session-gated render loop requires immersive mode".into(),
            ));
        }
        Ok(())
    }

    /// Whether the cube is in the scene from mount, rather than only during a session
    pub fn mesh_always_visible(&self) -> bool {
        !self.immersive
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_accumulate_features() {
        let basic = SceneOptions::preset(Variant::Basic);
        assert!(basic.drag_rotate && !basic.immersive && basic.video.is_none());
        assert_eq!(basic.loop_policy, LoopPolicy::Continuous);

        let immersive = SceneOptions::preset(Variant::Immersive);
        assert!(immersive.immersive);
        assert_eq!(immersive.loop_policy, LoopPolicy::WhileSessionActive);

        let video = SceneOptions::preset(Variant::VideoTexture);
        assert_eq!(video.video.as_ref().unwrap().src, "video.mp4");
        assert!(!video.click_to_scale);

        let interactive = SceneOptions::preset(Variant::Interactive);
        assert!(interactive.click_to_scale && interactive.immersive);

        for variant in [Variant::Basic, Variant::Immersive, Variant::VideoTexture, Variant::Interactive] {
            SceneOptions::preset(variant).validate().unwrap();
        }
    }

    #[test]
    fn test_json_defaults() {
        let options = SceneOptions::from_json("{}").unwrap();
        assert_eq!(options, SceneOptions::default());

        let options = SceneOptions::from_json(
            r#"{"immersive": true, "loop_policy": "while_session_active", "video": {"src": "clip.webm"}}"#,
        )
        .unwrap();
        let video = options.video.unwrap();
        assert_eq!(video.src, "clip.webm");
        assert!(video.looping && video.start_muted);
    }

    #[test]
    fn test_invalid_options() {
        assert!(SceneOptions::from_json("not json").is_err());
        assert!(SceneOptions::from_json(r#"{"loop_policy": "while_session_active"}"#).is_err());
        assert!(SceneOptions::from_json(r#"{"scale_step": 0.0}"#).is_err());
        assert!(SceneOptions::from_json(r#"{"camera": {"near": 5.0, "far": 1.0}}"#).is_err());
    }

    #[test]
    fn test_variant_from_str() {
        assert_eq!("Basic".parse::<Variant>().unwrap(), Variant::Basic);
        assert_eq!("video-texture".parse::<Variant>().unwrap(), Variant::VideoTexture);
        assert!("nope".parse::<Variant>().is_err());
    }
}
