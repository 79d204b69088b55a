use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavKey {
    ArrowUp,
    ArrowDown,
    Enter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavPhase {
    Idle,
    FocusedNoResults,
    FocusedWithResults,
}

/// Field focus plus the keyboard-highlighted dropdown row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Navigator {
    focused: bool,
    focus_index: Option<usize>,
}

impl Navigator {
    pub fn has_focus(&self) -> bool {
        self.focused
    }

    pub fn focus_index(&self) -> Option<usize> {
        self.focus_index
    }

    pub fn phase(&self, has_rows: bool) -> NavPhase {
        match (self.focused, has_rows) {
            (false, _) => NavPhase::Idle,
            (true, false) => NavPhase::FocusedNoResults,
            (true, true) => NavPhase::FocusedWithResults,
        }
    }

    pub fn on_focus(&mut self) {
        self.focus_index = None;
        self.focused = true;
    }

    pub fn on_focus_lost(&mut self) {
        self.focused = false;
    }

    pub fn clear_focus_index(&mut self) {
        self.focus_index = None;
    }

    /// Circular forward step. Returns the new index, or `None` when there is
    /// nothing to move over.
    pub fn move_down(&mut self, row_count: usize) -> Option<usize> {
        if row_count == 0 {
            return None;
        }
        let last = row_count - 1;
        let next = match self.focus_index {
            None => 0,
            Some(index) if index >= last => 0,
            Some(index) => index + 1,
        };
        self.focus_index = Some(next);
        Some(next)
    }

    /// Circular backward step. The first step from no highlight lands on the
    /// last row.
    pub fn move_up(&mut self, row_count: usize) -> Option<usize> {
        if row_count == 0 {
            return None;
        }
        let last = row_count - 1;
        let next = match self.focus_index {
            None | Some(0) => last,
            Some(index) => index.min(last + 1) - 1,
        };
        self.focus_index = Some(next);
        Some(next)
    }

    /// Index of the highlighted row if it still addresses one of `row_count`
    /// rows.
    pub fn valid_index(&self, row_count: usize) -> Option<usize> {
        self.focus_index.filter(|index| *index < row_count)
    }
}

#[cfg(test)]
mod tests {
    use super::{NavPhase, Navigator};

    #[test]
    fn arrow_down_wraps_from_last_row() {
        let mut nav = Navigator::default();
        nav.on_focus();
        assert_eq!(nav.move_down(3), Some(0));
        assert_eq!(nav.move_down(3), Some(1));
        assert_eq!(nav.move_down(3), Some(2));
        assert_eq!(nav.move_down(3), Some(0));
    }

    #[test]
    fn arrow_up_starts_at_last_row_and_wraps_from_first() {
        let mut nav = Navigator::default();
        nav.on_focus();
        assert_eq!(nav.move_up(3), Some(2));
        assert_eq!(nav.move_up(3), Some(1));
        assert_eq!(nav.move_up(3), Some(0));
        assert_eq!(nav.move_up(3), Some(2));
    }

    #[test]
    fn single_row_stays_put() {
        let mut nav = Navigator::default();
        assert_eq!(nav.move_down(1), Some(0));
        assert_eq!(nav.move_down(1), Some(0));
        assert_eq!(nav.move_up(1), Some(0));
    }

    #[test]
    fn no_rows_leaves_index_untouched() {
        let mut nav = Navigator::default();
        assert_eq!(nav.move_down(0), None);
        assert_eq!(nav.move_up(0), None);
        assert_eq!(nav.focus_index(), None);
    }

    #[test]
    fn stale_index_is_clamped_when_rows_shrink() {
        let mut nav = Navigator::default();
        nav.move_up(5);
        assert_eq!(nav.focus_index(), Some(4));
        assert_eq!(nav.valid_index(2), None);
        assert_eq!(nav.move_up(2), Some(1));
    }

    #[test]
    fn focus_resets_index_and_phase_tracks_rows() {
        let mut nav = Navigator::default();
        assert_eq!(nav.phase(true), NavPhase::Idle);
        nav.move_down(2);
        nav.on_focus();
        assert_eq!(nav.focus_index(), None);
        assert_eq!(nav.phase(false), NavPhase::FocusedNoResults);
        assert_eq!(nav.phase(true), NavPhase::FocusedWithResults);
        nav.on_focus_lost();
        assert_eq!(nav.phase(true), NavPhase::Idle);
    }
}
