use imgui::{Condition, WindowFlags};

use crate::viewer::loading::{LoadingIndicator, LoadingState};

const FAILED_TEXT_COLOR: [f32; 4] = [1.0, 0.45, 0.45, 1.0];

/// Covers the whole window with a translucent panel and a centered status line.
pub fn draw_loading_overlay(ui: &imgui::Ui, indicator: &LoadingIndicator) {
    let Some(message) = indicator.message() else {
        return;
    };

    let display_size = ui.io().display_size;

    ui.window("##loading_overlay")
        .position([0.0, 0.0], Condition::Always)
        .size(display_size, Condition::Always)
        .flags(
            WindowFlags::NO_DECORATION
                | WindowFlags::NO_MOVE
                | WindowFlags::NO_SAVED_SETTINGS
                | WindowFlags::NO_INPUTS
                | WindowFlags::NO_NAV,
        )
        .bg_alpha(0.8)
        .build(|| {
            let text_size = ui.calc_text_size(&message);
            ui.set_cursor_pos([
                ((display_size[0] - text_size[0]) * 0.5).max(0.0),
                ((display_size[1] - text_size[1]) * 0.5).max(0.0),
            ]);

            match indicator.state() {
                LoadingState::Failed(_) => ui.text_colored(FAILED_TEXT_COLOR, &message),
                _ => ui.text(&message),
            }
        });
}
