use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::snake::Direction;

/// What the player asked the game to do.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    Turn(Direction),
    TogglePause,
    Reset,
    Quit,
}

pub fn intent_for(key: &KeyEvent) -> Option<Intent> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if is_ctrl_c(key) {
        return Some(Intent::Quit);
    }

    let intent = match key.code {
        KeyCode::Char('w') | KeyCode::Char('W') | KeyCode::Up => Intent::Turn(Direction::Up),
        KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Left => Intent::Turn(Direction::Left),
        KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Down => Intent::Turn(Direction::Down),
        KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Right => Intent::Turn(Direction::Right),
        KeyCode::Char('p') | KeyCode::Char('P') => Intent::TogglePause,
        KeyCode::Char('r') | KeyCode::Char('R') => Intent::Reset,
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Intent::Quit,
        _ => return None,
    };
    Some(intent)
}

fn is_ctrl_c(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_arrow_keys() {
        assert_eq!(intent_for(&press(KeyCode::Up)), Some(Intent::Turn(Direction::Up)));
        assert_eq!(intent_for(&press(KeyCode::Down)), Some(Intent::Turn(Direction::Down)));
        assert_eq!(intent_for(&press(KeyCode::Left)), Some(Intent::Turn(Direction::Left)));
        assert_eq!(intent_for(&press(KeyCode::Right)), Some(Intent::Turn(Direction::Right)));
    }

    #[test]
    fn test_wasd_keys() {
        assert_eq!(intent_for(&press(KeyCode::Char('w'))), Some(Intent::Turn(Direction::Up)));
        assert_eq!(intent_for(&press(KeyCode::Char('a'))), Some(Intent::Turn(Direction::Left)));
        assert_eq!(intent_for(&press(KeyCode::Char('s'))), Some(Intent::Turn(Direction::Down)));
        assert_eq!(intent_for(&press(KeyCode::Char('D'))), Some(Intent::Turn(Direction::Right)));
    }

    #[test]
    fn test_control_keys() {
        assert_eq!(intent_for(&press(KeyCode::Char('p'))), Some(Intent::TogglePause));
        assert_eq!(intent_for(&press(KeyCode::Char('R'))), Some(Intent::Reset));
        assert_eq!(intent_for(&press(KeyCode::Esc)), Some(Intent::Quit));
        assert_eq!(intent_for(&press(KeyCode::Char('q'))), Some(Intent::Quit));
    }

    #[test]
    fn test_ctrl_c() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(intent_for(&ctrl_c), Some(Intent::Quit));
        assert_eq!(intent_for(&press(KeyCode::Char('c'))), None);
    }

    #[test]
    fn test_release_ignored() {
        let release = KeyEvent::new_with_kind_and_state(
            KeyCode::Up,
            KeyModifiers::NONE,
            KeyEventKind::Release,
            KeyEventState::NONE,
        );
        assert_eq!(intent_for(&release), None);
    }

    #[test]
    fn test_unknown_key() {
        assert_eq!(intent_for(&press(KeyCode::Char('x'))), None);
        assert_eq!(intent_for(&press(KeyCode::Enter)), None);
    }
}
