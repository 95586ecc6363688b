use ratatui::crossterm::event::{self, KeyCode, KeyModifiers};
use tracing::trace;

/// Line editor behind the search box. The cursor counts characters.
#[derive(Default)]
pub struct Inputter {
    current_input: String,
    curser_pos: usize,
    finished: bool,
    canceled: bool,
}

#[derive(Default, Clone, Debug, PartialEq)]
pub struct InputResult {
    pub input: String,
    pub finished: bool,
    pub canceled: bool,
    pub changed: bool,
    pub curser_pos: usize,
}

impl Inputter {
    pub fn read(&mut self, key: event::KeyEvent) -> InputResult {
        let before = self.current_input.clone();
        self.finished = false;
        self.canceled = false;
        match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => self.finished = true,
            (KeyCode::Esc, _) => {
                self.clear();
                self.canceled = true;
                self.finished = true;
            }
            (KeyCode::Backspace, _) => self.backspace(),
            (KeyCode::Delete, _) => self.delete(),
            (KeyCode::Left, _) => self.curser_pos = self.curser_pos.saturating_sub(1),
            (KeyCode::Right, _) => self.curser_pos = (self.curser_pos + 1).min(self.len()),
            (KeyCode::Home, _) => self.curser_pos = 0,
            (KeyCode::End, _) => self.curser_pos = self.len(),
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => self.clear(),
            (KeyCode::Char(chr), m) if !m.contains(KeyModifiers::CONTROL) => self.insert(chr),
            _ => {}
        }
        let mut result = self.get();
        result.changed = before != self.current_input;
        trace!("Input {:?} => {:?}", key.code, result);
        result
    }

    pub fn set(&mut self, s: &str) {
        self.current_input = s.to_string();
        self.curser_pos = self.len();
    }

    pub fn get(&self) -> InputResult {
        InputResult {
            canceled: self.canceled,
            finished: self.finished,
            changed: false,
            input: self.current_input.clone(),
            curser_pos: self.curser_pos,
        }
    }

    pub fn clear(&mut self) {
        self.canceled = false;
        self.finished = false;
        self.current_input.clear();
        self.curser_pos = 0;
    }

    fn len(&self) -> usize {
        self.current_input.chars().count()
    }

    fn insert(&mut self, chr: char) {
        let pos = self.getbytepos(self.curser_pos);
        self.current_input.insert(pos, chr);
        self.curser_pos += 1;
    }

    fn backspace(&mut self) {
        if self.curser_pos > 0 {
            self.curser_pos -= 1;
            let pos = self.getbytepos(self.curser_pos);
            self.current_input.remove(pos);
        }
    }

    fn delete(&mut self) {
        if self.curser_pos < self.len() {
            let pos = self.getbytepos(self.curser_pos);
            self.current_input.remove(pos);
        }
    }

    fn getbytepos(&self, char_pos: usize) -> usize {
        self.current_input
            .char_indices()
            .nth(char_pos)
            .map(|(byte_idx, _)| byte_idx)
            .unwrap_or(self.current_input.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyEvent;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(input: &mut Inputter, s: &str) {
        for c in s.chars() {
            input.read(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn typing_reports_changes() {
        let mut input = Inputter::default();
        let r = input.read(key(KeyCode::Char('a')));
        assert!(r.changed);
        assert_eq!(r.input, "a");
        let r = input.read(key(KeyCode::Left));
        assert!(!r.changed);
        assert_eq!(r.curser_pos, 0);
    }

    #[test]
    fn edits_at_the_cursor() {
        let mut input = Inputter::default();
        type_str(&mut input, "anna");
        input.read(key(KeyCode::Left));
        input.read(key(KeyCode::Left));
        input.read(key(KeyCode::Backspace));
        assert_eq!(input.get().input, "ana");
        input.read(key(KeyCode::Delete));
        assert_eq!(input.get().input, "aa");
        type_str(&mut input, "ü");
        assert_eq!(input.get().input, "aüa");
        input.read(key(KeyCode::End));
        input.read(key(KeyCode::Backspace));
        assert_eq!(input.get().input, "aü");
    }

    #[test]
    fn enter_keeps_and_escape_clears() {
        let mut input = Inputter::default();
        type_str(&mut input, "lee");
        let r = input.read(key(KeyCode::Enter));
        assert!(r.finished && !r.canceled);
        assert_eq!(r.input, "lee");
        let r = input.read(key(KeyCode::Esc));
        assert!(r.finished && r.canceled && r.changed);
        assert_eq!(r.input, "");
    }

    #[test]
    fn set_moves_cursor_to_end() {
        let mut input = Inputter::default();
        input.set("ben");
        assert_eq!(input.get().curser_pos, 3);
        input.read(key(KeyCode::Char('x')));
        assert_eq!(input.get().input, "benx");
    }
}
