use indexmap::IndexSet;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityChange {
    Shown,
    Hidden,
}

/// Decides whether the single scene model should be in the scene: it is
/// shown while at least one image target is detected, and only once its
/// asset has finished loading.
#[derive(Debug)]
pub struct ModelVisibility {
    asset_path: String,
    asset_loaded: bool,
    detected_targets: IndexSet<String>,
    shown: bool,
}

impl ModelVisibility {
    pub fn new(asset_path: &str) -> Self {
        ModelVisibility {
            asset_path: String::from(asset_path),
            asset_loaded: false,
            detected_targets: IndexSet::new(),
            shown: false,
        }
    }

    pub fn asset_path(&self) -> &str {
        &self.asset_path
    }

    pub fn is_asset_loaded(&self) -> bool {
        self.asset_loaded
    }

    pub fn is_shown(&self) -> bool {
        self.shown
    }

    /// Currently detected targets, in the order they were first detected
    pub fn detected_targets(&self) -> impl Iterator<Item = &str> {
        self.detected_targets.iter().map(|s| s.as_str())
    }

    pub fn any_target_detected(&self) -> bool {
        !self.detected_targets.is_empty()
    }

    pub fn target_detected(&mut self, target_id: &str) -> Option<VisibilityChange> {
        if !self.detected_targets.insert(String::from(target_id)) {
            debug!("Target {} was already detected", target_id);
        }
        if !self.asset_loaded {
            warn!(
                "Target {} detected before \"{}\" finished loading; model will appear once loaded",
                target_id, self.asset_path
            );
        }
        self.reconcile()
    }

    pub fn target_lost(&mut self, target_id: &str) -> Option<VisibilityChange> {
        if !self.detected_targets.shift_remove(target_id) {
            warn!("Lost a target that was never detected: {}", target_id);
        }
        self.reconcile()
    }

    pub fn asset_loaded(&mut self) -> Option<VisibilityChange> {
        self.asset_loaded = true;
        self.reconcile()
    }

    fn reconcile(&mut self) -> Option<VisibilityChange> {
        let should_show = self.asset_loaded && self.any_target_detected();
        if should_show == self.shown {
            return None;
        }
        self.shown = should_show;
        Some(if should_show {
            VisibilityChange::Shown
        } else {
            VisibilityChange::Hidden
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_on_detect_hide_on_lost() {
        let mut visibility = ModelVisibility::new("frame.glb");
        assert_eq!(visibility.asset_loaded(), None);
        assert_eq!(
            visibility.target_detected("poster"),
            Some(VisibilityChange::Shown)
        );
        assert!(visibility.is_shown());
        assert_eq!(
            visibility.target_lost("poster"),
            Some(VisibilityChange::Hidden)
        );
        assert!(!visibility.is_shown());
    }

    #[test]
    fn test_stays_visible_while_any_target_detected() {
        let mut visibility = ModelVisibility::new("frame.glb");
        visibility.asset_loaded();
        assert_eq!(visibility.target_detected("a"), Some(VisibilityChange::Shown));
        assert_eq!(visibility.target_detected("b"), None);
        assert_eq!(visibility.target_lost("a"), None);
        assert!(visibility.is_shown());
        assert_eq!(visibility.detected_targets().collect::<Vec<_>>(), vec!["b"]);
        assert_eq!(visibility.target_lost("b"), Some(VisibilityChange::Hidden));
    }

    #[test]
    fn test_detection_before_asset_load_is_deferred() {
        let mut visibility = ModelVisibility::new("frame.glb");
        assert_eq!(visibility.target_detected("poster"), None);
        assert!(!visibility.is_shown());
        assert_eq!(visibility.asset_loaded(), Some(VisibilityChange::Shown));
    }

    #[test]
    fn test_unknown_lost_target_changes_nothing() {
        let mut visibility = ModelVisibility::new("frame.glb");
        visibility.asset_loaded();
        assert_eq!(visibility.target_lost("ghost"), None);
        assert!(!visibility.is_shown());
    }
}
