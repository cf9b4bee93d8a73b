//! Key mapping from terminal events to dashboard actions.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::types::Focus;

/// Moderation command templates offered from the player table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prefill {
    Kick,
    Ban,
    Teleport,
}

impl Prefill {
    /// Console text for the player with entity id `id`.
    pub fn command_for(self, id: &str) -> String {
        match self {
            Prefill::Kick => format!("kick {id} \"Kicked by Console\""),
            Prefill::Ban => format!("ban {id} 10 year \"Banned by Console\""),
            Prefill::Teleport => format!("teleport {id} "),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardAction {
    ToggleFocus,
    SelectPrev,
    SelectNext,
    Prefill(Prefill),
    Insert(char),
    Backspace,
    Submit,
}

/// Map keyboard input to a dashboard action for the focused pane.
pub fn handle_key_event(key: KeyEvent, focus: Focus) -> Option<DashboardAction> {
    if key.code == KeyCode::Tab || key.code == KeyCode::BackTab {
        return Some(DashboardAction::ToggleFocus);
    }
    if key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
    {
        return None;
    }

    match focus {
        Focus::Players => match key.code {
            KeyCode::Up => Some(DashboardAction::SelectPrev),
            KeyCode::Down => Some(DashboardAction::SelectNext),
            KeyCode::Char('k') | KeyCode::Char('K') => {
                Some(DashboardAction::Prefill(Prefill::Kick))
            }
            KeyCode::Char('b') | KeyCode::Char('B') => Some(DashboardAction::Prefill(Prefill::Ban)),
            KeyCode::Char('t') | KeyCode::Char('T') => {
                Some(DashboardAction::Prefill(Prefill::Teleport))
            }
            _ => None,
        },
        Focus::Console => match key.code {
            KeyCode::Enter => Some(DashboardAction::Submit),
            KeyCode::Backspace => Some(DashboardAction::Backspace),
            KeyCode::Char(c) if !c.is_control() => Some(DashboardAction::Insert(c)),
            _ => None,
        },
    }
}

/// Check if key should quit the monitor.
pub fn should_quit(key: KeyEvent) -> bool {
    key.code == KeyCode::Esc
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    #[test]
    fn test_tab_toggles_focus_everywhere() {
        for focus in [Focus::Console, Focus::Players] {
            assert_eq!(
                handle_key_event(KeyEvent::from(KeyCode::Tab), focus),
                Some(DashboardAction::ToggleFocus)
            );
        }
    }

    #[test]
    fn test_player_table_keys() {
        let focus = Focus::Players;
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Up), focus),
            Some(DashboardAction::SelectPrev)
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Down), focus),
            Some(DashboardAction::SelectNext)
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('k')), focus),
            Some(DashboardAction::Prefill(Prefill::Kick))
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('b')), focus),
            Some(DashboardAction::Prefill(Prefill::Ban))
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('t')), focus),
            Some(DashboardAction::Prefill(Prefill::Teleport))
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('x')), focus),
            None
        );
    }

    #[test]
    fn test_console_keys() {
        let focus = Focus::Console;
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('k')), focus),
            Some(DashboardAction::Insert('k'))
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Enter), focus),
            Some(DashboardAction::Submit)
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Backspace), focus),
            Some(DashboardAction::Backspace)
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Up), focus),
            None
        );
    }

    #[test]
    fn test_control_chords_are_not_typed() {
        assert_eq!(
            handle_key_event(
                KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL),
                Focus::Console
            ),
            None
        );
    }

    #[test]
    fn test_prefill_templates() {
        assert_eq!(Prefill::Kick.command_for("171"), "kick 171 \"Kicked by Console\"");
        assert_eq!(
            Prefill::Ban.command_for("171"),
            "ban 171 10 year \"Banned by Console\""
        );
        assert_eq!(Prefill::Teleport.command_for("171"), "teleport 171 ");
    }

    #[test]
    fn test_quit_keys() {
        assert!(should_quit(KeyEvent::from(KeyCode::Esc)));
        assert!(should_quit(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL
        )));
        assert!(!should_quit(KeyEvent::from(KeyCode::Char('q'))));
    }
}
