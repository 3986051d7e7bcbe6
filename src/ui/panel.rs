// src/ui/panel.rs
//! Controls overlay
//!
//! The panel edits a copy of the [`DisplayToggles`] in place and reports
//! everything else (strikes, regeneration, variant switches) as
//! [`UiCommand`]s for the app to apply after the frame.

use crate::{
    config::{DisplayToggles, SceneConfig},
    lifecycle::StrikeCommand,
    scene::{ObjectId, Scene, SceneVariant},
};

/// Actions requested from the overlay during one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    Strike(StrikeCommand),
    Regenerate,
    SwitchVariant(SceneVariant),
}

/// What the overlay shows about the selected object
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionReadout {
    pub index: usize,
    pub kind: &'static str,
    pub energy: f32,
    pub struck: bool,
}

impl SelectionReadout {
    pub fn from_scene(scene: &Scene, selected: Option<ObjectId>) -> Option<Self> {
        let id = selected?;
        let object = scene.objects.get(id)?;
        Some(Self {
            index: scene.objects.index_of(id)?,
            kind: object.kind.label(),
            energy: object.energy(),
            struck: object.is_struck(),
        })
    }
}

/// Draws the controls window
pub fn control_panel(
    ui: &imgui::Ui,
    variant: SceneVariant,
    object_total: usize,
    toggles: &mut DisplayToggles,
    selection: Option<&SelectionReadout>,
    commands: &mut Vec<UiCommand>,
) {
    let display_size = ui.io().display_size;
    if display_size[0] <= 0.0 || display_size[1] <= 0.0 {
        return;
    }

    ui.window("Controls")
        .size([300.0, 0.0], imgui::Condition::FirstUseEver)
        .position([10.0, 10.0], imgui::Condition::FirstUseEver)
        .resizable(false)
        .collapsible(true)
        .build(|| {
            ui.text(variant.title());
            ui.text_disabled(format!("{} objects", object_total));
            for candidate in SceneVariant::ALL {
                if ui.radio_button_bool(format!("{:?}", candidate), candidate == variant) && candidate != variant {
                    commands.push(UiCommand::SwitchVariant(candidate));
                }
                ui.same_line();
            }
            ui.new_line();
            ui.separator();

            render_toggles(ui, variant, toggles);
            ui.separator();
            render_actions(ui, variant, object_total, toggles, commands);
            ui.separator();
            render_selection(ui, selection);
        });
}

fn render_toggles(ui: &imgui::Ui, variant: SceneVariant, toggles: &mut DisplayToggles) {
    ui.checkbox("Show stats (S)", &mut toggles.show_stats);

    let mut wireframe = toggles.render_mode.is_wireframe();
    if ui.checkbox("Wireframe (W)", &mut wireframe) {
        toggles.toggle_wireframe();
    }

    let (lo, hi) = SceneConfig::LIGHT_INTENSITY;
    ui.slider("Light intensity", lo, hi, &mut toggles.light_intensity);

    let (lo, hi) = SceneConfig::ANIMATION_SPEED;
    ui.slider("Animation speed", lo, hi, &mut toggles.animation_speed);

    match variant {
        SceneVariant::Float => {
            ui.checkbox("Auto-rotate (A)", &mut toggles.auto_rotate);
            let (lo, hi) = SceneConfig::OBJECT_COUNT;
            let mut count = toggles.object_count as i32;
            if ui.slider("Object count", lo as i32, hi as i32, &mut count) {
                toggles.set_object_count(count.max(0) as usize);
            }
        }
        SceneVariant::Showcase => {
            ui.checkbox("Auto-strike (T)", &mut toggles.auto_strike);
        }
        SceneVariant::Drift => {}
    }
}

fn render_actions(
    ui: &imgui::Ui,
    variant: SceneVariant,
    object_total: usize,
    toggles: &DisplayToggles,
    commands: &mut Vec<UiCommand>,
) {
    match variant {
        SceneVariant::Drift => {
            if ui.button("Strike All (Space)") {
                commands.push(UiCommand::Strike(StrikeCommand::All));
            }
        }
        SceneVariant::Float => {
            if ui.button("Regenerate Objects (R)") {
                commands.push(UiCommand::Regenerate);
            }
            ui.text_disabled(format!("Next build: {} objects", toggles.object_count));
        }
        SceneVariant::Showcase => {
            for index in 0..object_total {
                if ui.button(format!("Strike {}", index + 1)) {
                    commands.push(UiCommand::Strike(StrikeCommand::Index(index)));
                }
                if index + 1 < object_total {
                    ui.same_line();
                }
            }
            if ui.button("Strike Selected") {
                commands.push(UiCommand::Strike(StrikeCommand::Selected));
            }
            ui.same_line();
            if ui.button("Strike Random") {
                commands.push(UiCommand::Strike(StrikeCommand::Random));
            }
            ui.same_line();
            if ui.button("Strike All") {
                commands.push(UiCommand::Strike(StrikeCommand::All));
            }
        }
    }
}

fn render_selection(ui: &imgui::Ui, selection: Option<&SelectionReadout>) {
    match selection {
        Some(readout) => {
            ui.text(format!("Selected #{}: {}", readout.index + 1, readout.kind));
            ui.text(format!("Energy: {:.3}", readout.energy));
            if readout.struck {
                ui.text_colored([1.0, 0.6, 0.2, 1.0], "Struck");
            }
        }
        None => ui.text_disabled("Nothing selected"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{gfx::resources::TrackingAllocator, scene::SceneBuilder};
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_readout_of_selected_object() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut alloc = TrackingAllocator::new();
        let scene = SceneBuilder::new(SceneVariant::Showcase, &mut rng)
            .build(&mut alloc, None, 1.5)
            .unwrap();
        let id = scene.objects.at(2).unwrap().id();

        let readout = SelectionReadout::from_scene(&scene, Some(id)).unwrap();
        assert_eq!(readout.index, 2);
        assert_eq!(readout.kind, scene.objects.at(2).unwrap().kind.label());
        assert!(!readout.struck);
    }

    #[test]
    fn test_no_readout_without_selection() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut alloc = TrackingAllocator::new();
        let mut scene = SceneBuilder::new(SceneVariant::Drift, &mut rng)
            .build(&mut alloc, None, 1.5)
            .unwrap();
        assert!(SelectionReadout::from_scene(&scene, None).is_none());

        let id = scene.objects.at(0).unwrap().id();
        scene.release_objects(&mut alloc);
        assert!(SelectionReadout::from_scene(&scene, Some(id)).is_none());
    }
}
