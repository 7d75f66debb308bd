#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadingState {
    Loading,
    Loaded,
    Failed(String),
}

/// Tracks the overlay shown until the model is available.
///
/// Leaves `Loading` at most once. After that the state is final for the
/// lifetime of the viewer, so the overlay never comes back once hidden.
#[derive(Debug)]
pub struct LoadingIndicator {
    state: LoadingState,
}

impl LoadingIndicator {
    pub const LOADING_MESSAGE: &'static str = "Loading 3D Model...";

    pub fn new() -> Self {
        Self {
            state: LoadingState::Loading,
        }
    }

    pub fn state(&self) -> &LoadingState {
        &self.state
    }

    /// Returns whether this call hid the overlay.
    pub fn finish(&mut self) -> bool {
        self.transition(LoadingState::Loaded)
    }

    pub fn fail(&mut self, message: impl Into<String>) -> bool {
        self.transition(LoadingState::Failed(message.into()))
    }

    fn transition(&mut self, next: LoadingState) -> bool {
        if self.state != LoadingState::Loading {
            return false;
        }

        self.state = next;
        true
    }

    pub fn is_visible(&self) -> bool {
        self.state != LoadingState::Loaded
    }

    pub fn message(&self) -> Option<String> {
        match &self.state {
            LoadingState::Loading => Some(Self::LOADING_MESSAGE.to_string()),
            LoadingState::Loaded => None,
            LoadingState::Failed(reason) => Some(format!("Failed to load 3D model\n{reason}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visible_until_finished() {
        let mut indicator = LoadingIndicator::new();
        assert!(indicator.is_visible());
        assert_eq!(
            indicator.message().as_deref(),
            Some(LoadingIndicator::LOADING_MESSAGE)
        );

        assert!(indicator.finish());
        assert!(!indicator.is_visible());
        assert_eq!(indicator.message(), None);
    }

    #[test]
    fn hides_exactly_once() {
        let mut indicator = LoadingIndicator::new();

        assert!(indicator.finish());
        assert!(!indicator.finish());
        assert!(!indicator.fail("late error"));
        assert_eq!(indicator.state(), &LoadingState::Loaded);
    }

    #[test]
    fn failure_stays_visible_with_reason() {
        let mut indicator = LoadingIndicator::new();

        assert!(indicator.fail("no such file"));
        assert!(!indicator.finish());
        assert!(indicator.is_visible());
        assert!(indicator.message().unwrap().contains("no such file"));
    }
}
