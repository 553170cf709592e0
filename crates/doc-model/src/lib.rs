use serde::{Deserialize, Serialize};

mod divider;
mod shortcuts;

pub use divider::{split_from_pointer, DividerDrag, DragPhase};
pub use shortcuts::{shortcut_action, Shortcut, ShortcutAction, ShortcutKey, SHORTCUTS};

pub const SPLIT_MIN: u8 = 15;
pub const SPLIT_MAX: u8 = 85;

pub const ZOOM_MIN: u16 = 25;
pub const ZOOM_MAX: u16 = 200;
pub const ZOOM_STEP: u16 = 25;

pub const MANIFEST_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Split,
    Paper,
    App,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    pub fn flipped(self) -> Self {
        match self {
            Orientation::Horizontal => Orientation::Vertical,
            Orientation::Vertical => Orientation::Horizontal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn flipped(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutState {
    pub view_mode: ViewMode,
    pub orientation: Orientation,
    pub split_percent: u8,
    pub swapped: bool,
    pub theme: Theme,
    pub pdf_zoom_percent: u16,
    pub toolbar_visible: bool,
}

impl Default for LayoutState {
    fn default() -> Self {
        Self {
            view_mode: ViewMode::Split,
            orientation: Orientation::Horizontal,
            split_percent: 50,
            swapped: false,
            theme: Theme::Dark,
            pdf_zoom_percent: 100,
            toolbar_visible: true,
        }
    }
}

/// Bundle metadata stored as `manifest.json` inside the archive.
///
/// Only `paper` and `app` are required; the layout fields are applied onto
/// the live layout state when present and ignored when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default = "default_manifest_version")]
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub paper: String,
    pub app: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<ViewMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Orientation>,
}

fn default_manifest_version() -> u32 {
    MANIFEST_VERSION
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayoutAction {
    SetViewMode(ViewMode),
    SetOrientation(Orientation),
    SetSplitPercent(f32),
    ZoomIn,
    ZoomOut,
    ToggleSwap,
    ToggleTheme,
    ToggleToolbar,
}

pub fn clamp_split(percent: f32) -> u8 {
    (percent.round() as i64).clamp(SPLIT_MIN as i64, SPLIT_MAX as i64) as u8
}

/// Clamps a stored zoom value into range and snaps it onto the 25-step grid.
pub fn snap_zoom(percent: u16) -> u16 {
    let clamped = percent.clamp(ZOOM_MIN, ZOOM_MAX);
    let snapped = (clamped + ZOOM_STEP / 2) / ZOOM_STEP * ZOOM_STEP;
    snapped.clamp(ZOOM_MIN, ZOOM_MAX)
}

pub fn apply_layout_action(state: &mut LayoutState, action: LayoutAction) {
    match action {
        LayoutAction::SetViewMode(mode) => state.view_mode = mode,
        LayoutAction::SetOrientation(orientation) => state.orientation = orientation,
        LayoutAction::SetSplitPercent(percent) => state.split_percent = clamp_split(percent),
        LayoutAction::ZoomIn => {
            state.pdf_zoom_percent =
                state.pdf_zoom_percent.saturating_add(ZOOM_STEP).clamp(ZOOM_MIN, ZOOM_MAX);
        }
        LayoutAction::ZoomOut => {
            state.pdf_zoom_percent =
                state.pdf_zoom_percent.saturating_sub(ZOOM_STEP).clamp(ZOOM_MIN, ZOOM_MAX);
        }
        LayoutAction::ToggleSwap => state.swapped = !state.swapped,
        LayoutAction::ToggleTheme => state.theme = state.theme.flipped(),
        LayoutAction::ToggleToolbar => state.toolbar_visible = !state.toolbar_visible,
    }
}

/// Applies the optional layout fields of a freshly decoded manifest onto the
/// live layout state. Out-of-range `split` values are clamped, not rejected.
pub fn apply_manifest_layout(state: &mut LayoutState, manifest: &Manifest) {
    if let Some(mode) = manifest.layout {
        state.view_mode = mode;
    }

    if let Some(split) = manifest.split {
        state.split_percent = split.clamp(SPLIT_MIN as i64, SPLIT_MAX as i64) as u8;
    }

    if let Some(orientation) = manifest.orientation {
        state.orientation = orientation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_percent_is_clamped_and_rounded() {
        let mut state = LayoutState::default();

        apply_layout_action(&mut state, LayoutAction::SetSplitPercent(42.4));
        assert_eq!(state.split_percent, 42);

        apply_layout_action(&mut state, LayoutAction::SetSplitPercent(3.0));
        assert_eq!(state.split_percent, SPLIT_MIN);

        apply_layout_action(&mut state, LayoutAction::SetSplitPercent(99.9));
        assert_eq!(state.split_percent, SPLIT_MAX);

        apply_layout_action(&mut state, LayoutAction::SetSplitPercent(-40.0));
        assert_eq!(state.split_percent, SPLIT_MIN);
    }

    #[test]
    fn zoom_never_leaves_bounds_under_repeated_steps() {
        let mut state = LayoutState::default();

        for _ in 0..20 {
            apply_layout_action(&mut state, LayoutAction::ZoomIn);
            assert!(state.pdf_zoom_percent >= ZOOM_MIN && state.pdf_zoom_percent <= ZOOM_MAX);
        }
        assert_eq!(state.pdf_zoom_percent, ZOOM_MAX);

        for _ in 0..20 {
            apply_layout_action(&mut state, LayoutAction::ZoomOut);
            assert!(state.pdf_zoom_percent >= ZOOM_MIN && state.pdf_zoom_percent <= ZOOM_MAX);
        }
        assert_eq!(state.pdf_zoom_percent, ZOOM_MIN);
    }

    #[test]
    fn zoom_snaps_onto_step_grid() {
        assert_eq!(snap_zoom(100), 100);
        assert_eq!(snap_zoom(110), 100);
        assert_eq!(snap_zoom(113), 125);
        assert_eq!(snap_zoom(3), ZOOM_MIN);
        assert_eq!(snap_zoom(9999), ZOOM_MAX);
    }

    #[test]
    fn toggles_flip_and_flip_back() {
        let mut state = LayoutState::default();

        apply_layout_action(&mut state, LayoutAction::ToggleSwap);
        assert!(state.swapped);
        apply_layout_action(&mut state, LayoutAction::ToggleSwap);
        assert!(!state.swapped);

        apply_layout_action(&mut state, LayoutAction::ToggleTheme);
        assert_eq!(state.theme, Theme::Light);

        apply_layout_action(&mut state, LayoutAction::ToggleToolbar);
        assert!(!state.toolbar_visible);
    }

    #[test]
    fn manifest_layout_fields_apply_only_when_present() {
        let mut state = LayoutState::default();
        state.split_percent = 33;

        let manifest = Manifest {
            version: MANIFEST_VERSION,
            title: None,
            paper: "paper.pdf".to_owned(),
            app: "app.html".to_owned(),
            layout: Some(ViewMode::Paper),
            split: None,
            orientation: None,
        };

        apply_manifest_layout(&mut state, &manifest);
        assert_eq!(state.view_mode, ViewMode::Paper);
        assert_eq!(state.split_percent, 33);
        assert_eq!(state.orientation, Orientation::Horizontal);
    }

    #[test]
    fn manifest_split_out_of_range_is_clamped_not_rejected() {
        let mut state = LayoutState::default();

        let manifest = Manifest {
            version: MANIFEST_VERSION,
            title: None,
            paper: "paper.pdf".to_owned(),
            app: "app.html".to_owned(),
            layout: None,
            split: Some(-200),
            orientation: Some(Orientation::Vertical),
        };

        apply_manifest_layout(&mut state, &manifest);
        assert_eq!(state.split_percent, SPLIT_MIN);
        assert_eq!(state.orientation, Orientation::Vertical);
    }

    #[test]
    fn manifest_enums_use_lowercase_wire_spellings() {
        let json = r#"{
            "version": 1,
            "paper": "paper.pdf",
            "app": "app.html",
            "layout": "split",
            "split": 60,
            "orientation": "vertical"
        }"#;

        let manifest: Manifest = serde_json::from_str(json).expect("manifest should parse");
        assert_eq!(manifest.layout, Some(ViewMode::Split));
        assert_eq!(manifest.orientation, Some(Orientation::Vertical));
    }

    #[test]
    fn manifest_version_defaults_when_absent() {
        let json = r#"{"paper": "p.pdf", "app": "a.html"}"#;
        let manifest: Manifest = serde_json::from_str(json).expect("manifest should parse");
        assert_eq!(manifest.version, MANIFEST_VERSION);
    }
}
