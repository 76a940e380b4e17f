//! Directed focus graph for one screen.
//!
//! Controls live in a flat arena and link to each other by index.  At most
//! one control is selected at a time, and the selection always refers to a
//! member of this graph.  Links need not be mutual and cycles are allowed
//! (wrap-around pin pads).

use super::control::{ControlId, Direction, FocusableControl};
use crate::app::input::{InputSnapshot, InputTable};

/// Arena of controls plus the current selection.
#[derive(Debug, Default)]
pub struct ControlGraph {
    controls: Vec<FocusableControl>,
    selected: Option<ControlId>,
}

impl ControlGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a control and return its [`ControlId`].
    pub fn register(&mut self, mut control: FocusableControl) -> ControlId {
        control.selected = false;
        let id = self.controls.len();
        self.controls.push(control);
        id
    }

    /// Link `from → to` in `dir`.  Returns `false` (and links nothing) when
    /// either id is unknown or `to` does not take focus.
    pub fn link(&mut self, from: ControlId, dir: Direction, to: ControlId) -> bool {
        let target_ok = self.controls.get(to).is_some_and(|c| c.requires_focus);
        match self.controls.get_mut(from) {
            Some(c) if target_ok => {
                c.set_neighbor(dir, Some(to));
                true
            }
            _ => {
                tracing::debug!(from, to, ?dir, "refusing focus link");
                false
            }
        }
    }

    /// Link both ways: `a → b` in `dir` and `b → a` in the opposite direction.
    pub fn link_mutual(&mut self, a: ControlId, dir: Direction, b: ControlId) {
        self.link(a, dir, b);
        self.link(b, dir.opposite(), a);
    }

    /// Link `ids` as a vertical list (no wrap).
    pub fn link_column(&mut self, ids: &[ControlId]) {
        for pair in ids.windows(2) {
            self.link_mutual(pair[0], Direction::Down, pair[1]);
        }
    }

    /// Make `id` the selected control.  Unknown ids are ignored.
    pub fn select(&mut self, id: ControlId) -> bool {
        if id >= self.controls.len() {
            return false;
        }
        if let Some(prev) = self.selected {
            self.controls[prev].selected = false;
        }
        self.controls[id].selected = true;
        self.selected = Some(id);
        true
    }

    pub fn selected(&self) -> Option<ControlId> {
        self.selected
    }

    pub fn selected_control(&self) -> Option<&FocusableControl> {
        self.selected.map(|id| &self.controls[id])
    }

    pub fn get(&self, id: ControlId) -> Option<&FocusableControl> {
        self.controls.get(id)
    }

    pub fn get_mut(&mut self, id: ControlId) -> Option<&mut FocusableControl> {
        self.controls.get_mut(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ControlId, &FocusableControl)> {
        self.controls.iter().enumerate()
    }

    /// Move selection along the link in `dir`.  Returns the new selection if
    /// it moved; an absent link leaves the selection untouched.
    pub fn handle_directional(&mut self, dir: Direction) -> Option<ControlId> {
        let current = self.selected?;
        let next = self.controls[current].neighbor(dir)?;
        if !self.controls.get(next).is_some_and(|c| c.requires_focus) {
            return None;
        }
        tracing::trace!(
            from = %self.controls[current].name,
            to = %self.controls[next].name,
            ?dir,
            "focus moved"
        );
        self.select(next);
        Some(next)
    }

    /// Apply every direction pressed this tick, in press order.
    pub fn handle_input(&mut self, input: &InputSnapshot, table: &InputTable) {
        for &key in &input.just_pressed {
            if let Some(dir) = table.logical(key).and_then(Direction::from_logical) {
                self.handle_directional(dir);
            }
        }
    }

    /// Edge-triggered activation check.
    ///
    /// The control is *activated* while one of `triggers` (logical ids) is
    /// held and the control is selected or does not require focus, or when a
    /// hit-testable control is clicked.  Returns `true` only on the tick it
    /// goes from not-activated to activated.  Call once per tick per control.
    pub fn is_pressed(
        &mut self,
        id: ControlId,
        triggers: &[&str],
        input: &InputSnapshot,
        table: &InputTable,
    ) -> bool {
        let selected = self.selected;
        let Some(control) = self.controls.get_mut(id) else {
            return false;
        };

        let key_held = input
            .held
            .iter()
            .filter_map(|&k| table.logical(k))
            .any(|name| triggers.contains(&name));
        let focused = selected == Some(id) || !control.requires_focus;
        let clicked = control.hit_testable
            && input.click.is_some_and(|p| control.bounds().contains(p));

        let active = (key_held && focused) || clicked;
        control.pressed = active && !control.latched;
        control.latched = active;
        control.pressed
    }

    /// Treat every control as activated until its trigger is seen released.
    /// Used after something else consumed the input stream.
    pub fn relatch_all(&mut self) {
        for c in &mut self.controls {
            c.latched = true;
            c.pressed = false;
        }
    }

    /// Record where a control was drawn this frame (for hit-testing).
    pub fn place(&mut self, id: ControlId, at: super::control::Point) {
        if let Some(c) = self.controls.get_mut(id) {
            c.drawn_at = Some(at);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::input::PhysicalKey;
    use crate::core::control::Point;
    use crate::testing::snapshot;

    fn control(name: &str) -> FocusableControl {
        FocusableControl::new(name, Point::new(0.0, 0.0))
    }

    fn row(n: usize) -> (ControlGraph, Vec<ControlId>) {
        let mut g = ControlGraph::new();
        let ids: Vec<_> = (0..n).map(|i| g.register(control(&format!("c{i}")))).collect();
        g.link_column(&ids);
        g.select(ids[0]);
        (g, ids)
    }

    // --- Navigation ---

    #[test]
    fn register_does_not_select() {
        let mut g = ControlGraph::new();
        let id = g.register(control("a"));
        assert_eq!(g.selected(), None);
        assert!(!g.get(id).unwrap().is_selected());
    }

    #[test]
    fn select_keeps_single_selection() {
        let (mut g, ids) = row(3);
        g.select(ids[2]);
        let selected: Vec<_> = g.iter().filter(|(_, c)| c.is_selected()).map(|(id, _)| id).collect();
        assert_eq!(selected, vec![ids[2]]);
        assert!(!g.select(99));
        assert_eq!(g.selected(), Some(ids[2]));
    }

    #[test]
    fn directional_follows_links() {
        let (mut g, ids) = row(3);
        assert_eq!(g.handle_directional(Direction::Down), Some(ids[1]));
        assert_eq!(g.handle_directional(Direction::Down), Some(ids[2]));
        assert_eq!(g.handle_directional(Direction::Up), Some(ids[1]));
    }

    #[test]
    fn missing_link_leaves_selection() {
        let (mut g, ids) = row(2);
        assert_eq!(g.handle_directional(Direction::Up), None);
        assert_eq!(g.handle_directional(Direction::Left), None);
        assert_eq!(g.selected(), Some(ids[0]));
        g.select(ids[1]);
        assert_eq!(g.handle_directional(Direction::Down), None);
        assert_eq!(g.selected(), Some(ids[1]));
    }

    #[test]
    fn asymmetric_and_cyclic_links() {
        let mut g = ControlGraph::new();
        let a = g.register(control("a"));
        let b = g.register(control("b"));
        let c = g.register(control("c"));
        g.link(a, Direction::Right, b);
        g.link(b, Direction::Right, c);
        g.link(c, Direction::Right, a);
        g.select(a);
        for expected in [b, c, a, b] {
            assert_eq!(g.handle_directional(Direction::Right), Some(expected));
        }
        // no way back left
        assert_eq!(g.handle_directional(Direction::Left), None);
    }

    #[test]
    fn unfocusable_controls_are_not_link_targets() {
        let mut g = ControlGraph::new();
        let a = g.register(control("a"));
        let back = g.register(control("back").without_focus());
        assert!(!g.link(a, Direction::Up, back));
        assert!(!g.link(a, Direction::Up, 42));
        g.select(a);
        assert_eq!(g.handle_directional(Direction::Up), None);
    }

    #[test]
    fn handle_input_maps_dpad() {
        let (mut g, ids) = row(3);
        let table = InputTable::default();
        g.handle_input(&snapshot(&[PhysicalKey::DpadDown], &[PhysicalKey::DpadDown]), &table);
        assert_eq!(g.selected(), Some(ids[1]));
        // held but not newly pressed: no movement
        g.handle_input(&snapshot(&[PhysicalKey::DpadDown], &[]), &table);
        assert_eq!(g.selected(), Some(ids[1]));
    }

    // --- Activation ---

    #[test]
    fn pressed_only_on_rising_edge() {
        let (mut g, ids) = row(1);
        let table = InputTable::default();
        let idle = snapshot(&[], &[]);
        let held = snapshot(&[PhysicalKey::A], &[PhysicalKey::A]);
        let still = snapshot(&[PhysicalKey::A], &[]);

        assert!(!g.is_pressed(ids[0], &["a"], &idle, &table));
        assert!(g.is_pressed(ids[0], &["a"], &held, &table));
        assert!(g.get(ids[0]).unwrap().pressed_this_tick());
        assert!(!g.is_pressed(ids[0], &["a"], &still, &table));
        assert!(!g.is_pressed(ids[0], &["a"], &still, &table));
        assert!(!g.get(ids[0]).unwrap().pressed_this_tick());
        assert!(!g.is_pressed(ids[0], &["a"], &idle, &table));
        assert!(g.is_pressed(ids[0], &["a"], &held, &table));
    }

    #[test]
    fn held_at_creation_needs_release() {
        let (mut g, ids) = row(1);
        let table = InputTable::default();
        let held = snapshot(&[PhysicalKey::A], &[]);
        assert!(!g.is_pressed(ids[0], &["a"], &held, &table));
        assert!(!g.is_pressed(ids[0], &["a"], &snapshot(&[], &[]), &table));
        assert!(g.is_pressed(ids[0], &["a"], &held, &table));
    }

    #[test]
    fn unselected_control_ignores_keys() {
        let (mut g, ids) = row(2);
        let table = InputTable::default();
        g.is_pressed(ids[1], &["a"], &snapshot(&[], &[]), &table);
        assert!(!g.is_pressed(ids[1], &["a"], &snapshot(&[PhysicalKey::A], &[]), &table));
    }

    #[test]
    fn focus_free_control_fires_without_selection() {
        let (mut g, _) = row(2);
        let back = g.register(control("back").without_focus());
        let table = InputTable::default();
        g.is_pressed(back, &["b", "y"], &snapshot(&[], &[]), &table);
        assert!(g.is_pressed(back, &["b", "y"], &snapshot(&[PhysicalKey::Y], &[]), &table));
        // wrong key
        g.is_pressed(back, &["b"], &snapshot(&[], &[]), &table);
        assert!(!g.is_pressed(back, &["b"], &snapshot(&[PhysicalKey::A], &[]), &table));
    }

    #[test]
    fn click_activates_hit_testable_control() {
        let mut g = ControlGraph::new();
        let pin = g.register(
            FocusableControl::new("7", Point::new(10.0, 10.0)).with_size(4.0, 2.0),
        );
        let table = InputTable::default();
        let mut click = snapshot(&[], &[]);
        click.click = Some(Point::new(10.5, 10.5));
        g.is_pressed(pin, &["a"], &snapshot(&[], &[]), &table);
        assert!(g.is_pressed(pin, &["a"], &click, &table));

        g.get_mut(pin).unwrap().hit_testable = false;
        g.is_pressed(pin, &["a"], &snapshot(&[], &[]), &table);
        assert!(!g.is_pressed(pin, &["a"], &click, &table));
    }

    #[test]
    fn relatch_requires_release() {
        let (mut g, ids) = row(1);
        let table = InputTable::default();
        g.is_pressed(ids[0], &["a"], &snapshot(&[], &[]), &table);
        g.relatch_all();
        assert!(!g.is_pressed(ids[0], &["a"], &snapshot(&[PhysicalKey::A], &[]), &table));
    }
}
