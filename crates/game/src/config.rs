//! Game configuration (input, timing, camera, wheel and the form roster). Loaded from config.ron at startup.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::locomotion::{Ability, AbilityKey, AbilitySlot, FlightProfile, LocomotionProfile};
use crate::omnitrix::{ArrivalCue, FormDef, TransformTiming};
use crate::wheel::WheelConfig;

/// Persistent game settings. Loaded from `config.ron` in the current directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Mouse sensitivity multiplier (1.0 = default).
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f32,
    /// Fixed simulation rate in Hz.
    #[serde(default = "default_tick_rate")]
    pub tick_rate: f64,
    /// Length of the headless session in seconds.
    #[serde(default = "default_session_seconds")]
    pub session_seconds: f32,
    #[serde(default)]
    pub transformation: TransformationConfig,
    #[serde(default)]
    pub wheel: WheelConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    /// First entry is the base form.
    #[serde(default = "default_roster")]
    pub forms: Vec<FormDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformationConfig {
    /// Seconds an alien form lasts before the watch times out (0 = unlimited).
    #[serde(default = "default_duration")]
    pub duration: f32,
    #[serde(default = "default_effect_lead")]
    pub effect_lead: f32,
    #[serde(default = "default_settle")]
    pub settle: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "default_min_pitch")]
    pub min_pitch_degrees: f32,
    #[serde(default = "default_max_pitch")]
    pub max_pitch_degrees: f32,
    #[serde(default = "default_follow_speed")]
    pub follow_speed: f32,
    /// Closest collision may pull the camera in.
    #[serde(default = "default_min_distance")]
    pub min_distance: f32,
}

fn default_sensitivity() -> f32 {
    1.0
}
fn default_tick_rate() -> f64 {
    60.0
}
fn default_session_seconds() -> f32 {
    45.0
}
fn default_duration() -> f32 {
    15.0
}
fn default_effect_lead() -> f32 {
    0.3
}
fn default_settle() -> f32 {
    0.3
}
fn default_min_pitch() -> f32 {
    -30.0
}
fn default_max_pitch() -> f32 {
    60.0
}
fn default_follow_speed() -> f32 {
    10.0
}
fn default_min_distance() -> f32 {
    1.0
}

impl Default for TransformationConfig {
    fn default() -> Self {
        Self {
            duration: default_duration(),
            effect_lead: default_effect_lead(),
            settle: default_settle(),
        }
    }
}

impl TransformationConfig {
    pub fn timing(&self) -> TransformTiming {
        TransformTiming { effect_lead: self.effect_lead, settle: self.settle }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [("duration", self.duration), ("effect_lead", self.effect_lead), ("settle", self.settle)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidTiming { field, value });
            }
        }
        Ok(())
    }
}

/// Settings that deserialize fine but cannot drive a session.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("tick_rate must be a positive number of Hz, got {0}")]
    InvalidTickRate(f64),
    #[error("transformation.{field} must be a non-negative number of seconds, got {value}")]
    InvalidTiming { field: &'static str, value: f32 },
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            min_pitch_degrees: default_min_pitch(),
            max_pitch_degrees: default_max_pitch(),
            follow_speed: default_follow_speed(),
            min_distance: default_min_distance(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            sensitivity: default_sensitivity(),
            tick_rate: default_tick_rate(),
            session_seconds: default_session_seconds(),
            transformation: TransformationConfig::default(),
            wheel: WheelConfig::default(),
            camera: CameraConfig::default(),
            forms: default_roster(),
        }
    }
}

impl GameConfig {
    /// Load config from `config.ron`. If the file is missing or invalid, returns default config.
    pub fn load() -> Self {
        let path = config_path();
        if let Ok(data) = std::fs::read_to_string(&path) {
            match Self::from_ron_str(&data) {
                Ok(c) => return c,
                Err(e) => log::warn!("Invalid config at {:?}: {}, using defaults", path, e),
            }
        } else {
            log::info!("No config at {:?}, using defaults", path);
        }
        Self::default()
    }

    /// Reject values that would stall or crash the simulation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.tick_rate.is_finite() || self.tick_rate <= 0.0 {
            return Err(ConfigError::InvalidTickRate(self.tick_rate));
        }
        self.transformation.validate()
    }

    pub fn from_ron_str(data: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(data)
    }

    /// Save current config to `config.ron`. Logs on error.
    pub fn save(&self) {
        let path = config_path();
        match ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()) {
            Ok(s) => {
                if let Err(e) = std::fs::write(&path, s) {
                    log::warn!("Could not write config to {:?}: {}", path, e);
                }
            }
            Err(e) => log::warn!("Could not serialize config: {}", e),
        }
    }
}

fn config_path() -> std::path::PathBuf {
    std::env::current_dir().unwrap_or_else(|_| std::path::PathBuf::from(".")).join("config.ron")
}

fn animations(extra: &[&str]) -> Vec<String> {
    ["Idle", "Walk", "Run", "Jump", "Fall", "Land"]
        .iter()
        .chain(extra)
        .map(|s| s.to_string())
        .collect()
}

/// Ben plus the five aliens on the watch.
pub fn default_roster() -> Vec<FormDef> {
    let ben = FormDef {
        cooldown: 0.0,
        animations: animations(&["Hit", "Death"]),
        ..FormDef::new("Ben")
    };

    let four_arms = FormDef {
        camera_distance: 6.0,
        camera_height: 2.5,
        locomotion: LocomotionProfile {
            walk_speed: 10.0,
            jump_force: 15.0,
            gravity: 20.0,
            ground_probe: 1.0,
            ..LocomotionProfile::default()
        },
        animations: animations(&["Standing", "Attack"]),
        arrival: Some(ArrivalCue { cue: "Standing".into(), hold: 1.5 }),
        ..FormDef::new("Four Arms")
    };

    let humungousaur = FormDef {
        camera_distance: 8.0,
        camera_height: 3.0,
        locomotion: LocomotionProfile {
            walk_speed: 4.0,
            run_speed: 8.0,
            jump_force: 10.0,
            abilities: vec![
                AbilitySlot { key: AbilityKey::Primary, ability: Ability::Grow { scale: 2.0, duration: 3.0 } },
                AbilitySlot {
                    key: AbilityKey::Secondary,
                    ability: Ability::GroundPound { radius: 6.0, damage: 30.0, force: 10.0, cooldown: 5.0 },
                },
            ],
            ..LocomotionProfile::default()
        },
        animations: animations(&["GroundPound", "Attack"]),
        ..FormDef::new("Humungousaur")
    };

    let jetray = FormDef {
        locomotion: LocomotionProfile {
            flight: Some(FlightProfile { fly_speed: 14.0, vertical_speed: 8.0 }),
            ..LocomotionProfile::default()
        },
        animations: animations(&["Fly"]),
        ..FormDef::new("Jetray")
    };

    let fasttrack = FormDef {
        locomotion: LocomotionProfile {
            run_speed: 15.0,
            abilities: vec![
                AbilitySlot {
                    key: AbilityKey::Primary,
                    ability: Ability::SuperSpeed { multiplier: 3.0, duration: 3.0, cooldown: 5.0 },
                },
                AbilitySlot { key: AbilityKey::Secondary, ability: Ability::Dash { distance: 15.0, cooldown: 2.0 } },
            ],
            ..LocomotionProfile::default()
        },
        animations: animations(&["Dash"]),
        ..FormDef::new("Fasttrack")
    };

    let way_big = FormDef {
        camera_distance: 14.0,
        camera_height: 8.0,
        locomotion: LocomotionProfile {
            walk_speed: 3.0,
            run_speed: 5.0,
            abilities: vec![
                AbilitySlot {
                    key: AbilityKey::Primary,
                    ability: Ability::CosmicRay {
                        speed: 50.0,
                        damage: 100.0,
                        blast_radius: 5.0,
                        lifetime: 5.0,
                        cooldown: 5.0,
                    },
                },
                AbilitySlot {
                    key: AbilityKey::Secondary,
                    ability: Ability::GroundPound { radius: 10.0, damage: 50.0, force: 20.0, cooldown: 3.0 },
                },
            ],
            ..LocomotionProfile::default()
        },
        animations: animations(&["GroundPound", "Attack"]),
        ..FormDef::new("Way Big")
    };

    vec![ben, four_arms, humungousaur, jetray, fasttrack, way_big]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::AnimationCue;

    #[test]
    fn partial_file_fills_in_defaults() {
        let config = GameConfig::from_ron_str("(sensitivity: 2.0, transformation: (duration: 5.0))").unwrap();
        assert_eq!(config.sensitivity, 2.0);
        assert_eq!(config.transformation.duration, 5.0);
        assert_eq!(config.transformation.settle, 0.3);
        assert_eq!(config.tick_rate, 60.0);
        assert_eq!(config.forms.len(), 6);
        assert_eq!(config.camera.max_pitch_degrees, 60.0);
    }

    #[test]
    fn roster_entries_need_only_a_name() {
        let config = GameConfig::from_ron_str(r#"(forms: [(name: "Ben", cooldown: 0.0), (name: "Upgrade")])"#).unwrap();
        assert_eq!(config.forms.len(), 2);
        let upgrade = &config.forms[1];
        assert_eq!(upgrade.cooldown, 30.0);
        assert_eq!(upgrade.camera_distance, 5.0);
        assert_eq!(upgrade.locomotion, LocomotionProfile::default());
        assert!(upgrade.arrival.is_none());
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(GameConfig::from_ron_str("(sensitivity: \"fast\")").is_err());
    }

    #[test]
    fn validate_rejects_unusable_timing() {
        assert_eq!(GameConfig::default().validate(), Ok(()));
        let config = GameConfig::from_ron_str("(tick_rate: 0.0)").unwrap();
        assert_eq!(config.validate(), Err(ConfigError::InvalidTickRate(0.0)));
        let config = GameConfig::from_ron_str("(transformation: (duration: -5.0))").unwrap();
        assert_eq!(config.validate(), Err(ConfigError::InvalidTiming { field: "duration", value: -5.0 }));
        let config = GameConfig::from_ron_str("(transformation: (settle: NaN))").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidTiming { field: "settle", .. })));
        let config = GameConfig::from_ron_str("(transformation: (duration: 0.0, effect_lead: 0.0, settle: 0.0))").unwrap();
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn default_roster_cues_resolve() {
        let roster = default_roster();
        assert_eq!(roster[0].name, "Ben");
        assert_eq!(roster[0].cooldown, 0.0);
        for def in &roster {
            for name in &def.animations {
                assert!(name.parse::<AnimationCue>().is_ok(), "{} has unknown cue {}", def.name, name);
            }
            if let Some(arrival) = &def.arrival {
                assert!(def.animations.contains(&arrival.cue));
            }
        }
    }

    #[test]
    fn roster_survives_a_ron_round_trip() {
        let text = ron::ser::to_string_pretty(&GameConfig::default(), ron::ser::PrettyConfig::default()).unwrap();
        let back = GameConfig::from_ron_str(&text).unwrap();
        assert_eq!(back.forms, default_roster());
    }
}
