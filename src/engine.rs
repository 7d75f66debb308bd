use std::time::Duration;

use crate::viewer::ViewerState;

/// One frame of simulation: poll the asset, advance rotation, refresh world matrices.
pub fn update(viewer: &mut ViewerState, delta_time: Duration) {
    viewer.update(delta_time);
    viewer.scene.late_update();
}
