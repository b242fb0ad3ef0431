//! Player preferences
//!
//! Persisted separately from the leaderboard, under its own storage key.

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, StorageError};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Background pad volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Mute all sound
    pub muted: bool,

    // === Board ===
    /// Highlight an available move after a few idle seconds
    pub show_hints: bool,
    /// Pause cascades between phases so falling tiles are visible
    pub animate_cascades: bool,
    /// Delay between cascade phases when animating (ms)
    pub cascade_delay_ms: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.5,
            muted: false,

            show_hints: false,
            animate_cascades: true,
            cascade_delay_ms: 500,
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "tile_match_settings";

    /// Upper bound for `cascade_delay_ms`
    pub const MAX_CASCADE_DELAY_MS: u32 = 5_000;

    /// Effective sound effect volume (respects mute)
    pub fn effective_sfx_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
        }
    }

    /// Effective music volume (respects mute)
    pub fn effective_music_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.music_volume).clamp(0.0, 1.0)
        }
    }

    /// Flip mute, returning the new state
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    /// How long the board stays busy while `clears` phases play out
    pub fn cascade_delay_for(&self, clears: u32) -> i32 {
        let total = self.cascade_delay_ms.saturating_mul(clears);
        i32::try_from(total).unwrap_or(i32::MAX)
    }

    /// Pull stored values back into range
    fn sanitized(mut self) -> Self {
        for volume in [
            &mut self.master_volume,
            &mut self.sfx_volume,
            &mut self.music_volume,
        ] {
            let v = *volume;
            *volume = if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
        }
        self.cascade_delay_ms = self.cascade_delay_ms.min(Self::MAX_CASCADE_DELAY_MS);
        self
    }

    /// Load settings, falling back to defaults when absent or unreadable
    pub fn load(store: &impl KeyValueStore) -> Self {
        match store.get_item(Self::STORAGE_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<Settings>(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings");
                    return settings.sanitized();
                }
                Err(e) => log::warn!("Ignoring malformed settings: {}", e),
            },
            Ok(None) => {}
            Err(e) => log::warn!("Settings unavailable: {}", e),
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings; failures are logged
    pub fn save(&self, store: &mut impl KeyValueStore) {
        let result = serde_json::to_string(self)
            .map_err(StorageError::from)
            .and_then(|json| store.set_item(Self::STORAGE_KEY, &json));
        match result {
            Ok(()) => log::info!("Settings saved"),
            Err(e) => log::warn!("Failed to save settings: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_round_trip() {
        let mut store = MemoryStore::new();
        let settings = Settings {
            muted: true,
            cascade_delay_ms: 250,
            ..Settings::default()
        };
        settings.save(&mut store);
        assert_eq!(Settings::load(&store), settings);
    }

    #[test]
    fn test_corrupt_settings_fall_back() {
        let store = MemoryStore::with_item(Settings::STORAGE_KEY, "{{{");
        assert_eq!(Settings::load(&store), Settings::default());
    }

    #[test]
    fn test_oversized_delay_is_clamped() {
        let store = MemoryStore::with_item(
            Settings::STORAGE_KEY,
            r#"{"cascade_delay_ms": 3000000000, "sfx_volume": 7.5}"#,
        );
        let settings = Settings::load(&store);
        assert_eq!(settings.cascade_delay_ms, Settings::MAX_CASCADE_DELAY_MS);
        assert_eq!(settings.sfx_volume, 1.0);
        assert_eq!(settings.cascade_delay_for(2), 10_000);
    }

    #[test]
    fn test_cascade_delay_saturates() {
        let settings = Settings {
            cascade_delay_ms: u32::MAX,
            ..Settings::default()
        };
        assert_eq!(settings.cascade_delay_for(2), i32::MAX);
        assert_eq!(settings.cascade_delay_for(0), 0);
    }

    #[test]
    fn test_toggle_mute_persists() {
        let mut store = MemoryStore::new();
        let mut settings = Settings::default();
        assert!(settings.toggle_mute());
        settings.save(&mut store);
        let loaded = Settings::load(&store);
        assert!(loaded.muted);
        assert_eq!(loaded.effective_music_volume(), 0.0);
    }

    #[test]
    fn test_mute_silences() {
        let settings = Settings {
            muted: true,
            ..Settings::default()
        };
        assert_eq!(settings.effective_sfx_volume(), 0.0);
        assert!((Settings::default().effective_sfx_volume() - 0.8).abs() < 1e-6);
        assert!((Settings::default().effective_music_volume() - 0.4).abs() < 1e-6);
    }
}
