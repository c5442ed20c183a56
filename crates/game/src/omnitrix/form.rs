//! Form roster: the base form plus every alien the watch can switch into.

use std::collections::HashSet;
use std::fmt;

use hecs::Entity;
use serde::{Deserialize, Serialize};

use super::error::{RosterError, TransformError};
use super::scene::FormScene;
use crate::animation::{AnimationCue, AnimationSet};
use crate::locomotion::LocomotionProfile;

/// Index of a registered form. The base form is always 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FormId(pub usize);

impl FormId {
    pub const BASE: FormId = FormId(0);

    pub fn is_base(self) -> bool {
        self == Self::BASE
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "form #{}", self.0)
    }
}

/// One-shot animation played when a form arrives, and how long it holds the sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrivalCue {
    pub cue: String,
    #[serde(default)]
    pub hold: f32,
}

/// Data-driven description of a form, as it appears in `config.ron`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormDef {
    pub name: String,
    /// Seconds the form is unavailable after reverting out of it.
    #[serde(default = "default_cooldown")]
    pub cooldown: f32,
    #[serde(default = "default_camera_distance")]
    pub camera_distance: f32,
    #[serde(default = "default_camera_height")]
    pub camera_height: f32,
    #[serde(default)]
    pub locomotion: LocomotionProfile,
    #[serde(default = "default_animations")]
    pub animations: Vec<String>,
    #[serde(default)]
    pub arrival: Option<ArrivalCue>,
}

fn default_cooldown() -> f32 {
    30.0
}
fn default_camera_distance() -> f32 {
    5.0
}
fn default_camera_height() -> f32 {
    1.5
}
fn default_animations() -> Vec<String> {
    ["Idle", "Walk", "Run", "Jump", "Fall", "Land"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl FormDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cooldown: default_cooldown(),
            camera_distance: default_camera_distance(),
            camera_height: default_camera_height(),
            locomotion: LocomotionProfile::default(),
            animations: default_animations(),
            arrival: None,
        }
    }
}

/// A definition paired with the scene objects that realise it.
#[derive(Debug, Clone)]
pub struct FormSpec {
    pub def: FormDef,
    pub body: Option<Entity>,
    /// Camera anchor; the body itself when unset.
    pub anchor: Option<Entity>,
}

impl FormSpec {
    pub fn new(def: FormDef, body: Entity) -> Self {
        Self { def, body: Some(body), anchor: None }
    }
}

/// A validated, registered form.
#[derive(Debug, Clone)]
pub struct Form {
    pub id: FormId,
    pub name: String,
    pub body: Entity,
    pub anchor: Entity,
    pub cooldown: f32,
    pub camera_distance: f32,
    pub camera_height: f32,
    pub arrival: Option<(AnimationCue, f32)>,
}

/// Per-body flags owned by the coordinator. Gameplay systems read them; only
/// the transformation sequence writes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormPresence {
    form: FormId,
    model_active: bool,
    controller_enabled: bool,
}

impl FormPresence {
    pub fn new(form: FormId) -> Self {
        Self { form, model_active: false, controller_enabled: false }
    }

    pub fn form(&self) -> FormId {
        self.form
    }

    /// Visible in the world.
    pub fn is_model_active(&self) -> bool {
        self.model_active
    }

    /// Accepting movement and ability input.
    pub fn is_controller_enabled(&self) -> bool {
        self.controller_enabled
    }

    pub(crate) fn set_model_active(&mut self, active: bool) {
        self.model_active = active;
    }

    pub(crate) fn set_controller_enabled(&mut self, enabled: bool) {
        self.controller_enabled = enabled;
    }
}

/// Ordered, immutable set of registered forms.
#[derive(Debug, Clone)]
pub struct FormRegistry {
    forms: Vec<Form>,
}

impl FormRegistry {
    /// Validate the roster and attach presence and animation state to each body.
    ///
    /// The first entry is the base form and must be complete. Later forms that are
    /// missing a body are skipped with a warning; bad numbers, duplicate names and
    /// unknown animation cues are errors.
    pub fn build(specs: Vec<FormSpec>, scene: &mut dyn FormScene) -> Result<Self, RosterError> {
        if specs.is_empty() {
            return Err(RosterError::MissingBaseForm);
        }

        let mut names = HashSet::new();
        for spec in &specs {
            if !names.insert(spec.def.name.to_ascii_lowercase()) {
                return Err(RosterError::DuplicateName(spec.def.name.clone()));
            }
        }

        let mut forms = Vec::with_capacity(specs.len());
        for (slot, spec) in specs.into_iter().enumerate() {
            let def = spec.def;
            check_duration(&def.name, "cooldown", def.cooldown)?;
            check_duration(&def.name, "camera_distance", def.camera_distance)?;

            let animations = AnimationSet::from_names(&def.animations).map_err(|source| {
                RosterError::UnknownAnimation { form: def.name.clone(), source }
            })?;
            let arrival = match &def.arrival {
                Some(a) => {
                    check_duration(&def.name, "arrival hold", a.hold)?;
                    let cue = a.cue.parse::<AnimationCue>().map_err(|source| {
                        RosterError::UnknownAnimation { form: def.name.clone(), source }
                    })?;
                    if !animations.supports(cue) {
                        return Err(RosterError::UnsupportedCue { form: def.name.clone(), cue });
                    }
                    Some((cue, a.hold))
                }
                None => None,
            };

            let id = FormId(forms.len());
            let attached = match (spec.body, spec.anchor) {
                (None, _) => Err("body"),
                (_, Some(anchor)) if !scene.exists(anchor) => Err("camera anchor"),
                (Some(body), _) if !scene.attach(body, id, &animations) => Err("body"),
                (Some(body), anchor) => Ok((body, anchor.unwrap_or(body))),
            };
            let (body, anchor) = match attached {
                Ok(parts) => parts,
                Err(part) => {
                    if slot == 0 {
                        return Err(RosterError::IncompleteBaseForm { name: def.name, part });
                    }
                    let missing = TransformError::MissingCollaborator { form: def.name, part };
                    log::warn!("{}; leaving it out of the roster", missing);
                    continue;
                }
            };

            forms.push(Form {
                id,
                name: def.name,
                body,
                anchor,
                cooldown: def.cooldown,
                camera_distance: def.camera_distance,
                camera_height: def.camera_height,
                arrival,
            });
        }

        log::info!(
            "Registered {} forms: {}",
            forms.len(),
            forms.iter().map(|f| f.name.as_str()).collect::<Vec<_>>().join(", ")
        );
        Ok(Self { forms })
    }

    /// Number of registered forms, base included.
    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn get(&self, id: FormId) -> Option<&Form> {
        self.forms.get(id.0)
    }

    pub fn form(&self, id: FormId) -> Result<&Form, TransformError> {
        self.get(id).ok_or(TransformError::UnknownForm(id))
    }

    pub fn base(&self) -> &Form {
        &self.forms[0]
    }

    pub fn find(&self, name: &str) -> Option<FormId> {
        self.forms
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
            .map(|f| f.id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Form> {
        self.forms.iter()
    }
}

fn check_duration(form: &str, field: &'static str, value: f32) -> Result<(), RosterError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(RosterError::InvalidDuration { form: form.to_string(), field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::Transform;
    use hecs::World;

    fn body(world: &mut World) -> Entity {
        world.spawn((Transform::default(),))
    }

    #[test]
    fn base_form_is_index_zero_and_ids_follow_registration() {
        let mut world = World::new();
        let specs = vec![
            FormSpec::new(FormDef::new("Ben"), body(&mut world)),
            FormSpec::new(FormDef::new("Four Arms"), body(&mut world)),
            FormSpec::new(FormDef::new("Jetray"), body(&mut world)),
        ];
        let registry = FormRegistry::build(specs, &mut world).unwrap();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.base().name, "Ben");
        assert_eq!(registry.find("jetray"), Some(FormId(2)));

        let four_arms = registry.get(FormId(1)).unwrap();
        let presence = world.get::<&FormPresence>(four_arms.body).unwrap();
        assert_eq!(presence.form(), FormId(1));
        assert!(!presence.is_model_active());
    }

    #[test]
    fn empty_roster_is_rejected() {
        let mut world = World::new();
        assert_eq!(
            FormRegistry::build(Vec::new(), &mut world).unwrap_err(),
            RosterError::MissingBaseForm
        );
    }

    #[test]
    fn base_without_body_is_fatal_but_alien_without_body_is_skipped() {
        let mut world = World::new();
        let specs = vec![FormSpec { def: FormDef::new("Ben"), body: None, anchor: None }];
        assert!(matches!(
            FormRegistry::build(specs, &mut world),
            Err(RosterError::IncompleteBaseForm { .. })
        ));

        let specs = vec![
            FormSpec::new(FormDef::new("Ben"), body(&mut world)),
            FormSpec { def: FormDef::new("Ghostfreak"), body: None, anchor: None },
            FormSpec::new(FormDef::new("Jetray"), body(&mut world)),
        ];
        let registry = FormRegistry::build(specs, &mut world).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.find("Jetray"), Some(FormId(1)));
        assert_eq!(registry.find("Ghostfreak"), None);
    }

    #[test]
    fn despawned_body_counts_as_missing() {
        let mut world = World::new();
        let gone = body(&mut world);
        world.despawn(gone).unwrap();
        let specs = vec![
            FormSpec::new(FormDef::new("Ben"), body(&mut world)),
            FormSpec::new(FormDef::new("Upgrade"), gone),
        ];
        assert_eq!(FormRegistry::build(specs, &mut world).unwrap().len(), 1);
    }

    #[test]
    fn despawned_anchor_counts_as_missing() {
        let mut world = World::new();
        let head = body(&mut world);
        world.despawn(head).unwrap();
        let alien = body(&mut world);
        let specs = vec![
            FormSpec::new(FormDef::new("Ben"), body(&mut world)),
            FormSpec { def: FormDef::new("Upgrade"), body: Some(alien), anchor: Some(head) },
        ];
        let registry = FormRegistry::build(specs, &mut world).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.find("Upgrade"), None);
        assert!(world.get::<&FormPresence>(alien).is_err());

        let ben = body(&mut world);
        let specs = vec![FormSpec { def: FormDef::new("Ben"), body: Some(ben), anchor: Some(head) }];
        assert_eq!(
            FormRegistry::build(specs, &mut world).unwrap_err(),
            RosterError::IncompleteBaseForm { name: "Ben".to_string(), part: "camera anchor" }
        );
    }

    #[test]
    fn invalid_roster_entries_are_errors() {
        let mut world = World::new();
        let b = body(&mut world);
        let a = body(&mut world);

        let dup = vec![FormSpec::new(FormDef::new("Ben"), b), FormSpec::new(FormDef::new("ben"), a)];
        assert_eq!(
            FormRegistry::build(dup, &mut world).unwrap_err(),
            RosterError::DuplicateName("ben".to_string())
        );

        let mut negative = FormDef::new("Four Arms");
        negative.cooldown = -1.0;
        let specs = vec![FormSpec::new(FormDef::new("Ben"), b), FormSpec::new(negative, a)];
        assert!(matches!(
            FormRegistry::build(specs, &mut world),
            Err(RosterError::InvalidDuration { field: "cooldown", .. })
        ));

        let mut typo = FormDef::new("Four Arms");
        typo.animations.push("Flex".to_string());
        let specs = vec![FormSpec::new(FormDef::new("Ben"), b), FormSpec::new(typo, a)];
        assert!(matches!(
            FormRegistry::build(specs, &mut world),
            Err(RosterError::UnknownAnimation { .. })
        ));
    }

    #[test]
    fn arrival_cue_must_be_playable() {
        let mut world = World::new();
        let b = body(&mut world);
        let a = body(&mut world);

        let mut def = FormDef::new("Four Arms");
        def.arrival = Some(ArrivalCue { cue: "Standing".to_string(), hold: 1.5 });
        let specs = vec![FormSpec::new(FormDef::new("Ben"), b), FormSpec::new(def.clone(), a)];
        assert_eq!(
            FormRegistry::build(specs, &mut world).unwrap_err(),
            RosterError::UnsupportedCue { form: "Four Arms".to_string(), cue: AnimationCue::Standing }
        );

        def.animations.push("Standing".to_string());
        let specs = vec![FormSpec::new(FormDef::new("Ben"), b), FormSpec::new(def, a)];
        let registry = FormRegistry::build(specs, &mut world).unwrap();
        assert_eq!(registry.get(FormId(1)).unwrap().arrival, Some((AnimationCue::Standing, 1.5)));
    }

    #[test]
    fn anchor_defaults_to_body() {
        let mut world = World::new();
        let b = body(&mut world);
        let head = body(&mut world);
        let specs = vec![FormSpec { def: FormDef::new("Ben"), body: Some(b), anchor: Some(head) }];
        let registry = FormRegistry::build(specs, &mut world).unwrap();
        assert_eq!(registry.base().anchor, head);

        let mut world = World::new();
        let b = body(&mut world);
        let registry = FormRegistry::build(vec![FormSpec::new(FormDef::new("Ben"), b)], &mut world).unwrap();
        assert_eq!(registry.base().anchor, b);
    }
}
