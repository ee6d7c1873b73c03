use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Represents the result of handling a key event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    /// Quit the application
    Quit,
    /// Keep the current item
    Keep,
    /// Mark the current item for deletion
    Trash,
    /// Undo the last decision
    Undo,
    /// Move to the next item without deciding
    Next,
    /// Move to the previous item without deciding
    Previous,
    /// Cycle the media filter (all -> images -> videos)
    CycleFilter,
    /// Start committing the pending deletions
    Commit,
    /// Open the pending-review overlay
    Review,
    /// Accept the deletion batch
    ConfirmDelete,
    /// Decline the deletion batch
    CancelDelete,
    /// Toggle help overlay
    Help,
    /// No action
    None,
}

/// Maps keyboard events to actions
pub fn handle_key_event(key: KeyEvent) -> KeyAction {
    match (key.code, key.modifiers) {
        // Quit: q, Esc or Ctrl+C
        (KeyCode::Char('q'), KeyModifiers::NONE) => KeyAction::Quit,
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => KeyAction::Quit,
        (KeyCode::Esc, KeyModifiers::NONE) => KeyAction::Quit,

        // Keep: Right arrow or k
        (KeyCode::Right, KeyModifiers::NONE) => KeyAction::Keep,
        (KeyCode::Char('k'), KeyModifiers::NONE) => KeyAction::Keep,

        // Trash: Left arrow or t
        (KeyCode::Left, KeyModifiers::NONE) => KeyAction::Trash,
        (KeyCode::Char('t'), KeyModifiers::NONE) => KeyAction::Trash,

        // Navigation without deciding
        (KeyCode::Down, KeyModifiers::NONE) => KeyAction::Next,
        (KeyCode::Up, KeyModifiers::NONE) => KeyAction::Previous,
        (KeyCode::Char('j'), KeyModifiers::NONE) => KeyAction::Next,
        (KeyCode::Char('i'), KeyModifiers::NONE) => KeyAction::Previous,

        // Undo: u or Ctrl+Z
        (KeyCode::Char('u'), KeyModifiers::NONE) => KeyAction::Undo,
        (KeyCode::Char('z'), KeyModifiers::CONTROL) => KeyAction::Undo,

        // Filter cycling: f
        (KeyCode::Char('f'), KeyModifiers::NONE) => KeyAction::CycleFilter,

        // Commit the pending batch: d or Enter
        (KeyCode::Char('d'), KeyModifiers::NONE) => KeyAction::Commit,
        (KeyCode::Enter, KeyModifiers::NONE) => KeyAction::Commit,

        // Review pending items: r
        (KeyCode::Char('r'), KeyModifiers::NONE) => KeyAction::Review,

        // Help: ?
        (KeyCode::Char('?'), KeyModifiers::NONE) => KeyAction::Help,

        _ => KeyAction::None,
    }
}

/// Maps keyboard events to confirmation actions
/// Used when ViewState is ConfirmDelete
pub fn handle_confirm_input(key: KeyEvent) -> KeyAction {
    match (key.code, key.modifiers) {
        // Confirm: y or Enter
        (KeyCode::Char('y'), KeyModifiers::NONE) => KeyAction::ConfirmDelete,
        (KeyCode::Char('Y'), KeyModifiers::NONE) => KeyAction::ConfirmDelete,
        (KeyCode::Enter, KeyModifiers::NONE) => KeyAction::ConfirmDelete,

        // Cancel: n or Esc
        (KeyCode::Char('n'), KeyModifiers::NONE) => KeyAction::CancelDelete,
        (KeyCode::Char('N'), KeyModifiers::NONE) => KeyAction::CancelDelete,
        (KeyCode::Esc, KeyModifiers::NONE) => KeyAction::CancelDelete,

        _ => KeyAction::None,
    }
}
