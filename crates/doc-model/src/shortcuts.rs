use crate::ViewMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutKey {
    Num1,
    Num2,
    Num3,
    B,
    F,
    O,
    T,
    X,
    F1,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    SetViewMode(ViewMode),
    ToggleTheme,
    ToggleFullscreen,
    ToggleSwap,
    ToggleToolbar,
    ToggleOrientation,
    ToggleHelp,
    DismissOverlay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shortcut {
    pub key: ShortcutKey,
    /// Requires Cmd on macOS / Ctrl elsewhere.
    pub command: bool,
    pub action: ShortcutAction,
    pub label: &'static str,
}

/// The single dispatch table for global key bindings. Lookup is a direct
/// scan over this table; at most one entry matches a given key event.
pub const SHORTCUTS: &[Shortcut] = &[
    Shortcut {
        key: ShortcutKey::Num1,
        command: true,
        action: ShortcutAction::SetViewMode(ViewMode::Split),
        label: "Split view",
    },
    Shortcut {
        key: ShortcutKey::Num2,
        command: true,
        action: ShortcutAction::SetViewMode(ViewMode::Paper),
        label: "Paper only",
    },
    Shortcut {
        key: ShortcutKey::Num3,
        command: true,
        action: ShortcutAction::SetViewMode(ViewMode::App),
        label: "App only",
    },
    Shortcut {
        key: ShortcutKey::T,
        command: true,
        action: ShortcutAction::ToggleTheme,
        label: "Toggle theme",
    },
    Shortcut {
        key: ShortcutKey::F,
        command: true,
        action: ShortcutAction::ToggleFullscreen,
        label: "Toggle fullscreen",
    },
    Shortcut {
        key: ShortcutKey::X,
        command: true,
        action: ShortcutAction::ToggleSwap,
        label: "Swap panes",
    },
    Shortcut {
        key: ShortcutKey::B,
        command: true,
        action: ShortcutAction::ToggleToolbar,
        label: "Toggle toolbar",
    },
    Shortcut {
        key: ShortcutKey::O,
        command: true,
        action: ShortcutAction::ToggleOrientation,
        label: "Toggle orientation",
    },
    Shortcut {
        key: ShortcutKey::F1,
        command: false,
        action: ShortcutAction::ToggleHelp,
        label: "Show shortcuts",
    },
    Shortcut {
        key: ShortcutKey::Escape,
        command: false,
        action: ShortcutAction::DismissOverlay,
        label: "Dismiss overlay",
    },
];

/// Maps a qualifying key event to its action, or `None` if the combination
/// is unbound.
pub fn shortcut_action(command: bool, key: ShortcutKey) -> Option<ShortcutAction> {
    SHORTCUTS
        .iter()
        .find(|shortcut| shortcut.command == command && shortcut.key == key)
        .map(|shortcut| shortcut.action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_key_event_maps_to_at_most_one_action() {
        for shortcut in SHORTCUTS {
            let matches = SHORTCUTS
                .iter()
                .filter(|other| other.key == shortcut.key && other.command == shortcut.command)
                .count();
            assert_eq!(matches, 1, "duplicate binding for {:?}", shortcut.key);
        }
    }

    #[test]
    fn view_mode_keys_dispatch_their_modes() {
        assert_eq!(
            shortcut_action(true, ShortcutKey::Num1),
            Some(ShortcutAction::SetViewMode(ViewMode::Split))
        );
        assert_eq!(
            shortcut_action(true, ShortcutKey::Num2),
            Some(ShortcutAction::SetViewMode(ViewMode::Paper))
        );
        assert_eq!(
            shortcut_action(true, ShortcutKey::Num3),
            Some(ShortcutAction::SetViewMode(ViewMode::App))
        );
    }

    #[test]
    fn modifier_state_distinguishes_bindings() {
        assert_eq!(shortcut_action(false, ShortcutKey::Num1), None);
        assert_eq!(shortcut_action(true, ShortcutKey::Escape), None);
        assert_eq!(
            shortcut_action(false, ShortcutKey::Escape),
            Some(ShortcutAction::DismissOverlay)
        );
    }
}
