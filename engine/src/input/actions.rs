//! Input Actions
//!
//! Discrete input events consumed by the build mode. Device handling lives
//! outside the core; whatever reads the keyboard and mouse translates them
//! into these events and hands one batch per tick to the builder.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::physics::Ray;

/// Top-level interaction mode (overhead building vs. walking around).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InteractionMode {
    #[default]
    Build,
    FirstPerson,
}

impl InteractionMode {
    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            InteractionMode::Build => InteractionMode::FirstPerson,
            InteractionMode::FirstPerson => InteractionMode::Build,
        }
    }

    pub fn allows_building(self) -> bool {
        self == InteractionMode::Build
    }
}

impl fmt::Display for InteractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InteractionMode::Build => write!(f, "build"),
            InteractionMode::FirstPerson => write!(f, "first-person"),
        }
    }
}

/// One discrete input event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Pick a part type by catalog name
    SelectPart(String),
    /// Drop the current selection (same as Cancel while targeting)
    Deselect,
    /// Pointer moved; ray from the camera through the cursor
    PointerRay(Ray),
    /// Rotate the preview by this many degrees (usually +-90)
    Rotate(i32),
    /// Move the working level up or down
    ChangeLevel(i32),
    Commit,
    Cancel,
    /// Delete the placed part under this ray
    DeleteAt(Ray),
    SwitchMode(InteractionMode),
}

impl InputEvent {
    /// Events that only make sense while building.
    pub fn is_build_input(&self) -> bool {
        !matches!(self, InputEvent::SwitchMode(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn mode_toggle_round_trips() {
        assert_eq!(InteractionMode::Build.toggled(), InteractionMode::FirstPerson);
        assert_eq!(InteractionMode::Build.toggled().toggled(), InteractionMode::Build);
        assert!(InteractionMode::default().allows_building());
        assert!(!InteractionMode::FirstPerson.allows_building());
    }

    #[test]
    fn only_mode_switches_bypass_build_gate() {
        let ray = Ray::new(Vec3::Y, Vec3::NEG_Y);
        assert!(InputEvent::PointerRay(ray).is_build_input());
        assert!(InputEvent::DeleteAt(ray).is_build_input());
        assert!(InputEvent::Commit.is_build_input());
        assert!(!InputEvent::SwitchMode(InteractionMode::Build).is_build_input());
    }
}
