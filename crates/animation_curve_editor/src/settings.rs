// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor settings.
//!
//! Fixed chart policy (frame window, lane layout, hit radii) and playback
//! defaults. Stored as RON next to the host's other editor configuration.

use crate::chart::TimeTrackerStyle;
use crate::error::{EditorError, Result};
use crate::playback::SyncType;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current settings format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Settings file name
pub const SETTINGS_FILE_NAME: &str = "curve_editor.ron";

/// Curve editor settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Format version
    pub version: u32,
    /// First frame of the editing window
    pub frame_min: f32,
    /// Last frame of the editing window
    pub frame_max: f32,
    /// Offset of each lane's points within its row
    pub row_offset: f32,
    /// Point hit radius in pixels
    pub hit_radius: f32,
    /// Half width of the time tracker's grab region in pixels
    pub tracker_grab_width: f32,
    /// Snap dragged frames to `snap_interval`
    pub snap_enabled: bool,
    /// Frame snap interval
    pub snap_interval: f32,
    /// Time tracker annotation style
    pub tracker_style: TimeTrackerStyle,
    /// Playback speed ratio passed to the engine
    pub speed_ratio: f32,
    /// Loop playback
    pub looping: bool,
    /// Sync type for new sessions
    pub default_sync_type: SyncType,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            frame_min: 0.0,
            frame_max: 100.0,
            row_offset: 0.5,
            hit_radius: 6.0,
            tracker_grab_width: 4.0,
            snap_enabled: true,
            snap_interval: 1.0,
            tracker_style: TimeTrackerStyle::default(),
            speed_ratio: 1.0,
            looping: false,
            default_sync_type: SyncType::Animation,
        }
    }
}

impl EditorSettings {
    /// Parse settings from a RON string
    pub fn from_ron_str(content: &str) -> Result<Self> {
        let settings: EditorSettings = ron::from_str(content)?;

        if settings.version > SETTINGS_FORMAT_VERSION {
            return Err(EditorError::UnsupportedSettingsVersion {
                found: settings.version,
                supported: SETTINGS_FORMAT_VERSION,
            });
        }

        Ok(settings)
    }

    /// Serialize settings as pretty RON
    pub fn to_ron_string(&self) -> Result<String> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        Ok(ron::ser::to_string_pretty(self, config)?)
    }

    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron_str(&content)
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_ron_string()?)?;
        Ok(())
    }

    /// Snap a frame to the grid if enabled
    pub fn snap_frame(&self, frame: f32) -> f32 {
        if self.snap_enabled && self.snap_interval > 0.0 {
            (frame / self.snap_interval).round() * self.snap_interval
        } else {
            frame
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = EditorSettings::default();
        assert_eq!(settings.version, SETTINGS_FORMAT_VERSION);
        assert_eq!(settings.row_offset, 0.5);
        assert_eq!(settings.default_sync_type, SyncType::Animation);
    }

    #[test]
    fn test_serialization() {
        let mut settings = EditorSettings::default();
        settings.frame_max = 240.0;
        settings.looping = true;
        let ron_str = settings.to_ron_string().unwrap();
        let loaded = EditorSettings::from_ron_str(&ron_str).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let loaded = EditorSettings::from_ron_str("(frame_max: 60.0)").unwrap();
        assert_eq!(loaded.frame_max, 60.0);
        assert_eq!(loaded.hit_radius, EditorSettings::default().hit_radius);
    }

    #[test]
    fn test_newer_version_rejected() {
        let err = EditorSettings::from_ron_str("(version: 99)").unwrap_err();
        assert!(matches!(
            err,
            EditorError::UnsupportedSettingsVersion { found: 99, .. }
        ));
    }

    #[test]
    fn test_snap_frame() {
        let mut settings = EditorSettings::default();
        assert_eq!(settings.snap_frame(3.4), 3.0);
        settings.snap_interval = 5.0;
        assert_eq!(settings.snap_frame(12.6), 15.0);
        settings.snap_enabled = false;
        assert_eq!(settings.snap_frame(12.6), 12.6);
    }
}
