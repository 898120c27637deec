//! Virtual story page and the scroll-to-mode mapper.
//!
//! The page is a vertical stack of named sections, each some number of
//! viewport-heights tall. Section rectangles are expressed relative to the
//! top of the viewport in logical pixels, so a section whose `top` is
//! negative has partly scrolled off screen.

use bevy::{
    input::mouse::{MouseScrollUnit, MouseWheel},
    prelude::*,
    window::{PrimaryWindow, WindowResized},
};

use super::{CameraTarget, Mode, StorySet, StoryState};

pub struct ScrollPlugin;

impl Plugin for ScrollPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<StoryPage>()
            .init_resource::<ScrollConfig>()
            .init_resource::<PageScroll>()
            .add_systems(Startup, map_scroll_to_mode)
            .add_systems(
                Update,
                (scroll_input, map_scroll_to_mode)
                    .chain()
                    .in_set(StorySet::Input),
            );
    }
}

/// Upper edge of the centre band, as a fraction of viewport height.
const CENTER_BAND_TOP: f32 = 0.6;
/// Lower edge of the centre band, as a fraction of viewport height.
const CENTER_BAND_BOTTOM: f32 = 0.4;

/// One named block of the story page.
#[derive(Clone, Debug)]
pub struct Section {
    pub id: String,
    pub title: String,
    pub body: String,
    /// Height in viewport-heights.
    pub screens: f32,
}

impl Section {
    pub fn new(id: &str, title: &str, body: &str) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            body: body.into(),
            screens: 1.0,
        }
    }
}

/// The ordered list of sections making up the page.
#[derive(Resource, Clone, Debug)]
pub struct StoryPage {
    pub sections: Vec<Section>,
}

impl Default for StoryPage {
    fn default() -> Self {
        Self {
            sections: vec![
                Section::new(
                    "sec-home",
                    "Streets for Everyone",
                    "Scroll down to see how one change makes this street safer.",
                ),
                Section::new(
                    "sec-problem",
                    "Paint Is Not Protection",
                    "Parked cars fill the bike lane and push riders into traffic.",
                ),
                Section::new(
                    "sec-research",
                    "What the Data Says",
                    "Most conflicts happen where the lane is blocked, not where it is busy.",
                ),
                Section::new(
                    "sec-success",
                    "It Works Elsewhere",
                    "Cities that separated their lanes saw riding grow and crashes fall.",
                ),
                Section::new(
                    "sec-solution",
                    "Protected Bike Lanes",
                    "A line of bollards keeps the lane clear all day long.",
                ),
                Section::new(
                    "sec-benefits",
                    "Better for Everyone",
                    "Predictable traffic for drivers, a safe route for riders.",
                ),
                Section::new(
                    "sec-action",
                    "Make It Happen",
                    "Tell your council you want protected lanes on this street.",
                ),
            ],
        }
    }
}

impl StoryPage {
    /// Total page height in logical pixels.
    pub fn height(&self, viewport_height: f32) -> f32 {
        self.sections
            .iter()
            .map(|s| s.screens * viewport_height)
            .sum()
    }

    /// Largest valid scroll offset.
    pub fn max_scroll(&self, viewport_height: f32) -> f32 {
        (self.height(viewport_height) - viewport_height).max(0.0)
    }

    /// Section rectangles relative to the viewport, in page order.
    pub fn section_rects(
        &self,
        scroll: f32,
        viewport_height: f32,
    ) -> impl Iterator<Item = (&Section, SectionRect)> {
        let mut start = 0.0;
        self.sections.iter().map(move |section| {
            let height = section.screens * viewport_height;
            let top = start - scroll;
            start += height;
            (section, SectionRect::new(top, top + height))
        })
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }
}

/// Vertical extent of a section relative to the top of the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SectionRect {
    pub top: f32,
    pub bottom: f32,
}

impl SectionRect {
    pub fn new(top: f32, bottom: f32) -> Self {
        Self { top, bottom }
    }

    pub fn in_center_band(&self, viewport_height: f32) -> bool {
        self.top < viewport_height * CENTER_BAND_TOP
            && self.bottom > viewport_height * CENTER_BAND_BOTTOM
    }
}

/// Picks the active section: the last one in page order that overlaps the
/// centre band. Lower sections win when two overlap it.
pub fn active_section<'a>(
    rects: impl IntoIterator<Item = (&'a str, SectionRect)>,
    viewport_height: f32,
) -> Option<&'a str> {
    rects
        .into_iter()
        .filter(|(_, rect)| rect.in_center_band(viewport_height))
        .last()
        .map(|(id, _)| id)
}

/// A mode plus the camera shot that presents it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shot {
    pub mode: Mode,
    pub camera: CameraTarget,
}

const fn shot(mode: Mode, position: [f32; 3], look_at: [f32; 3]) -> Shot {
    Shot {
        mode,
        camera: CameraTarget::new(
            Vec3::new(position[0], position[1], position[2]),
            Vec3::new(look_at[0], look_at[1], look_at[2]),
        ),
    }
}

/// Fixed section lookup table.
pub fn shot_for_section(id: &str) -> Option<Shot> {
    let shot = match id {
        // Intro view
        "sec-home" => shot(Mode::Home, [0.0, 15.0, 30.0], [0.0, 5.0, -50.0]),
        // Side angle on a car blocking a bike
        "sec-problem" => shot(Mode::Problem, [15.0, 6.0, -10.0], [0.0, 2.0, -40.0]),
        // Birdseye over the same problem scene
        "sec-research" => shot(Mode::Problem, [0.0, 40.0, -40.0], [0.0, 0.0, -80.0]),
        // Low, down the green lane
        "sec-success" => shot(Mode::Success, [11.0, 3.0, 5.0], [11.0, 1.0, -50.0]),
        "sec-solution" => shot(Mode::Solution, [-20.0, 20.0, -20.0], [0.0, 0.0, -50.0]),
        // Reverse angle
        "sec-benefits" => shot(Mode::Benefits, [0.0, 10.0, -80.0], [0.0, 0.0, 0.0]),
        "sec-action" => shot(Mode::Action, [0.0, 2.0, 40.0], [0.0, 15.0, -50.0]),
        _ => return None,
    };
    Some(shot)
}

/// Applies the winning section to the story state.
///
/// An absent or unknown section falls back to [`Mode::Solution`] and leaves
/// the camera target where it was.
pub fn apply_active_section(state: &mut StoryState, active: Option<&str>) {
    match active.and_then(shot_for_section) {
        Some(shot) => {
            state.mode = shot.mode;
            state.camera_target = shot.camera;
        }
        None => state.mode = Mode::Solution,
    }
    state.active_section = active.map(str::to_owned);
}

/// Scroll input tuning.
#[derive(Resource)]
pub struct ScrollConfig {
    /// Pixels per wheel "line" and per arrow key press.
    pub line_height: f32,
    /// Fraction of the viewport moved by PageUp/PageDown/Space.
    pub page_fraction: f32,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            line_height: 40.0,
            page_fraction: 0.9,
        }
    }
}

/// Current scroll offset of the page in logical pixels (0 = top).
#[derive(Resource, Default, Debug)]
pub struct PageScroll {
    pub offset: f32,
}

/// Converts a wheel event into a page offset delta. Wheel up scrolls toward
/// the top of the page.
pub fn wheel_delta(unit: MouseScrollUnit, y: f32, line_height: f32) -> f32 {
    match unit {
        MouseScrollUnit::Line => -y * line_height,
        MouseScrollUnit::Pixel => -y,
    }
}

fn scroll_input(
    mut wheel: EventReader<MouseWheel>,
    keys: Res<ButtonInput<KeyCode>>,
    config: Res<ScrollConfig>,
    page: Res<StoryPage>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut scroll: ResMut<PageScroll>,
) {
    let mut delta: f32 = wheel
        .read()
        .map(|e| wheel_delta(e.unit, e.y, config.line_height))
        .sum();

    let Ok(window) = windows.get_single() else {
        return;
    };
    let viewport = window.height();
    let max = page.max_scroll(viewport);

    if keys.just_pressed(KeyCode::ArrowDown) {
        delta += config.line_height;
    }
    if keys.just_pressed(KeyCode::ArrowUp) {
        delta -= config.line_height;
    }
    if keys.just_pressed(KeyCode::PageDown) || keys.just_pressed(KeyCode::Space) {
        delta += viewport * config.page_fraction;
    }
    if keys.just_pressed(KeyCode::PageUp) {
        delta -= viewport * config.page_fraction;
    }
    if keys.just_pressed(KeyCode::Home) {
        delta = -scroll.offset;
    }
    if keys.just_pressed(KeyCode::End) {
        delta = max - scroll.offset;
    }

    // Also re-clamps after a resize shrank the page.
    let offset = (scroll.offset + delta).clamp(0.0, max);
    if offset != scroll.offset {
        scroll.offset = offset;
    }
}

/// Runs once at startup, then whenever the page scrolls or the window
/// changes size.
fn map_scroll_to_mode(
    mut resized: EventReader<WindowResized>,
    scroll: Res<PageScroll>,
    page: Res<StoryPage>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut story: ResMut<StoryState>,
) {
    let was_resized = resized.read().count() > 0;
    if !was_resized && !scroll.is_changed() {
        return;
    }

    let Ok(window) = windows.get_single() else {
        return;
    };
    let viewport = window.height();

    let active = active_section(
        page.section_rects(scroll.offset, viewport)
            .map(|(section, rect)| (section.id.as_str(), rect)),
        viewport,
    );

    let previous = story.mode;
    apply_active_section(&mut story, active);

    if story.mode != previous {
        info!(
            "Story mode: {} -> {} ({})",
            previous.label(),
            story.mode.label(),
            active.unwrap_or("no section")
        );
    }
}
