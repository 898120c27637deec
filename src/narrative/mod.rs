//! Narrative state: which part of the story is on screen and where the
//! camera should be looking.
//!
//! The scroll mapper is the only writer of [`StoryState`]; every animation
//! system reads it.

use bevy::prelude::*;

pub mod scroll;

pub struct NarrativePlugin;

impl Plugin for NarrativePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<StoryState>()
            .configure_sets(Update, (StorySet::Input, StorySet::Animate).chain())
            .add_plugins(scroll::ScrollPlugin);
    }
}

/// Ordering for the per-frame work: scroll/resize handling always settles
/// the story state before anything animates toward it.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum StorySet {
    Input,
    Animate,
}

/// Narrative mode driving all per-frame visual behaviour.
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Mode {
    #[default]
    Home,
    Problem,
    Research,
    Success,
    Solution,
    Benefits,
    Action,
}

impl Mode {
    pub const ALL: [Mode; 7] = [
        Mode::Home,
        Mode::Problem,
        Mode::Research,
        Mode::Success,
        Mode::Solution,
        Mode::Benefits,
        Mode::Action,
    ];

    /// Parked cars block the bike lane in the opening scenes.
    pub fn shows_parked_cars(self) -> bool {
        matches!(self, Mode::Home | Mode::Problem)
    }

    /// Bikes only have to dodge cars while the cars are parked in their lane.
    pub fn bikes_avoid_parked_cars(self) -> bool {
        matches!(self, Mode::Home | Mode::Problem)
    }

    /// Protected lanes (bollards up, green surface).
    pub fn bike_lanes_protected(self) -> bool {
        matches!(
            self,
            Mode::Solution | Mode::Success | Mode::Benefits | Mode::Action
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::Home => "home",
            Mode::Problem => "problem",
            Mode::Research => "research",
            Mode::Success => "success",
            Mode::Solution => "solution",
            Mode::Benefits => "benefits",
            Mode::Action => "action",
        }
    }
}

/// Where the camera wants to be. The camera eases toward this every frame.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct CameraTarget {
    pub position: Vec3,
    pub look_at: Vec3,
}

impl CameraTarget {
    pub const fn new(position: Vec3, look_at: Vec3) -> Self {
        Self { position, look_at }
    }
}

impl Default for CameraTarget {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 8.0, 20.0), Vec3::new(0.0, 0.0, -50.0))
    }
}

/// Application state shared between the scroll mapper and the animation
/// driver.
#[derive(Resource, Default, Debug)]
pub struct StoryState {
    pub mode: Mode,
    pub camera_target: CameraTarget,
    /// Id of the section that won the last viewport test, if any.
    pub active_section: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_predicates_partition() {
        for mode in Mode::ALL {
            // Parked cars and protected lanes are never shown together.
            assert!(!(mode.shows_parked_cars() && mode.bike_lanes_protected()));
            assert_eq!(mode.shows_parked_cars(), mode.bikes_avoid_parked_cars());
        }
        assert!(!Mode::Research.shows_parked_cars());
        assert!(!Mode::Research.bike_lanes_protected());
    }

    #[test]
    fn test_initial_story_state() {
        let state = StoryState::default();
        assert_eq!(state.mode, Mode::Home);
        assert_eq!(state.camera_target.position, Vec3::new(0.0, 8.0, 20.0));
        assert_eq!(state.camera_target.look_at, Vec3::new(0.0, 0.0, -50.0));
        assert!(state.active_section.is_none());
    }
}
