//! Story copy for the active section, plus a small debug readout.

use bevy::{
    diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin},
    prelude::*,
};

use crate::narrative::scroll::{PageScroll, StoryPage};
use crate::narrative::StoryState;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(FrameTimeDiagnosticsPlugin::default())
            .init_resource::<OverlayConfig>()
            .add_systems(Startup, setup_overlay)
            .add_systems(
                Update,
                (update_story_copy, toggle_debug_readout, update_debug_readout),
            );
    }
}

#[derive(Resource)]
pub struct OverlayConfig {
    pub show_debug: bool,
    pub debug_key: KeyCode,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            show_debug: false,
            debug_key: KeyCode::F3,
        }
    }
}

#[derive(Component)]
struct HeadlineText;

#[derive(Component)]
struct BodyText;

#[derive(Component)]
struct DebugReadout;

/// Title and copy for the active section; empty when nothing is active.
pub fn section_copy<'a>(page: &'a StoryPage, story: &StoryState) -> (&'a str, &'a str) {
    story
        .active_section
        .as_deref()
        .and_then(|id| page.section(id))
        .map(|s| (s.title.as_str(), s.body.as_str()))
        .unwrap_or(("", ""))
}

pub fn debug_line(story: &StoryState, scroll: f32, fps: Option<f64>) -> String {
    let fps = fps.map_or_else(|| "--".to_string(), |f| format!("{f:.0}"));
    format!(
        "MODE: {} | SECTION: {} | SCROLL: {:.0}px | FPS: {}",
        story.mode.label(),
        story.active_section.as_deref().unwrap_or("-"),
        scroll,
        fps
    )
}

fn setup_overlay(mut commands: Commands, config: Res<OverlayConfig>) {
    let panel_bg = Color::srgba(0.02, 0.02, 0.02, 0.75);
    let accent = Color::srgb(0.3, 0.9, 0.4);

    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(40.0),
                bottom: Val::Px(40.0),
                max_width: Val::Px(460.0),
                padding: UiRect::all(Val::Px(18.0)),
                row_gap: Val::Px(8.0),
                flex_direction: FlexDirection::Column,
                ..default()
            },
            BackgroundColor(panel_bg),
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new(""),
                TextFont {
                    font_size: 30.0,
                    ..default()
                },
                TextColor(accent),
                HeadlineText,
            ));
            parent.spawn((
                Text::new(""),
                TextFont {
                    font_size: 18.0,
                    ..default()
                },
                TextColor(Color::srgb(0.9, 0.9, 0.9)),
                BodyText,
            ));
        });

    commands.spawn((
        Text::new(""),
        TextFont {
            font_size: 14.0,
            ..default()
        },
        TextColor(accent),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            right: Val::Px(10.0),
            ..default()
        },
        if config.show_debug {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        },
        DebugReadout,
    ));
}

fn update_story_copy(
    story: Res<StoryState>,
    page: Res<StoryPage>,
    mut headline: Query<&mut Text, (With<HeadlineText>, Without<BodyText>)>,
    mut body: Query<&mut Text, (With<BodyText>, Without<HeadlineText>)>,
) {
    if !story.is_changed() {
        return;
    }

    let (title, copy) = section_copy(&page, &story);
    for mut text in &mut headline {
        if text.0 != title {
            text.0 = title.to_string();
        }
    }
    for mut text in &mut body {
        if text.0 != copy {
            text.0 = copy.to_string();
        }
    }
}

fn toggle_debug_readout(
    keys: Res<ButtonInput<KeyCode>>,
    mut config: ResMut<OverlayConfig>,
    mut readouts: Query<&mut Visibility, With<DebugReadout>>,
) {
    if !keys.just_pressed(config.debug_key) {
        return;
    }

    config.show_debug = !config.show_debug;
    for mut visibility in &mut readouts {
        *visibility = if config.show_debug {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }
    info!("Debug readout: {}", if config.show_debug { "ON" } else { "OFF" });
}

fn update_debug_readout(
    config: Res<OverlayConfig>,
    story: Res<StoryState>,
    scroll: Res<PageScroll>,
    diagnostics: Res<DiagnosticsStore>,
    mut readouts: Query<&mut Text, With<DebugReadout>>,
) {
    if !config.show_debug {
        return;
    }

    let fps = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|d| d.smoothed());
    let line = debug_line(&story, scroll.offset, fps);
    for mut text in &mut readouts {
        text.0.clone_from(&line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::narrative::scroll::apply_active_section;
    use crate::narrative::Mode;

    #[test]
    fn test_section_copy_follows_active_section() {
        let page = StoryPage::default();
        let mut story = StoryState::default();
        assert_eq!(section_copy(&page, &story), ("", ""));

        apply_active_section(&mut story, Some("sec-solution"));
        assert_eq!(section_copy(&page, &story).0, "Protected Bike Lanes");

        apply_active_section(&mut story, Some("sec-footer"));
        assert_eq!(story.mode, Mode::Solution);
        assert_eq!(section_copy(&page, &story), ("", ""));
    }

    #[test]
    fn test_debug_line() {
        let mut story = StoryState::default();
        apply_active_section(&mut story, Some("sec-research"));
        assert_eq!(
            debug_line(&story, 1600.4, Some(59.7)),
            "MODE: problem | SECTION: sec-research | SCROLL: 1600px | FPS: 60"
        );
        assert!(debug_line(&story, 0.0, None).ends_with("FPS: --"));
    }
}
