//! A single focusable widget and the geometry it lives in.
//!
//! Controls never hold references to each other.  Neighbor links are
//! [`ControlId`] indices into the owning [`ControlGraph`] arena, so dropping
//! the graph at screen cleanup invalidates every link at once.
//!
//! [`ControlGraph`]: super::graph::ControlGraph

// ───────────────────────────────────────── geometry ──────────

/// A point in surface coordinates (terminal cells, fractional allowed).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    /// Rectangle of `width × height` centred on `center`.
    pub fn centered(center: Point, width: f32, height: f32) -> Self {
        Self {
            x: center.x - width / 2.0,
            y: center.y - height / 2.0,
            width,
            height,
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }
}

// ───────────────────────────────────────── direction ─────────

/// Directional input used for focus traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Map a logical input identifier (`"up arrow"`, …) to a direction.
    pub fn from_logical(name: &str) -> Option<Self> {
        match name {
            "up arrow" => Some(Direction::Up),
            "down arrow" => Some(Direction::Down),
            "left arrow" => Some(Direction::Left),
            "right arrow" => Some(Direction::Right),
            _ => None,
        }
    }

    fn slot(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }
}

// ───────────────────────────────────────── control ───────────

/// Index into [`ControlGraph`](super::graph::ControlGraph)'s control table.
pub type ControlId = usize;

/// One navigable / activatable widget.
#[derive(Debug, Clone)]
pub struct FocusableControl {
    /// Identity, unique within a screen by convention (not enforced).
    pub name: String,
    /// Text drawn inside the control, if any.
    pub label: Option<String>,
    /// Layout-space position (centre of the control).
    pub position: Point,
    /// Where the control was last drawn.  Scrolling lists draw controls away
    /// from their layout position; hit-testing follows the drawn position.
    pub drawn_at: Option<Point>,
    /// Unscaled width × height in cells.
    pub size: (f32, f32),
    /// Render scale applied to `size`.
    pub scale: f32,
    /// Scale applied to the label only (long labels shrink to fit).
    pub text_scale: f32,
    /// When `false` the control activates regardless of selection
    /// (e.g. a persistent Back button) and is never a traversal target.
    pub requires_focus: bool,
    /// Pointer clicks inside the drawn bounds activate the control.
    pub hit_testable: bool,
    pub(super) selected: bool,
    pub(super) pressed: bool,
    /// `true` while the control is considered activated.  Starts `true` so a
    /// trigger already held at creation must be released before it fires.
    pub(super) latched: bool,
    pub(super) neighbors: [Option<ControlId>; 4],
}

impl FocusableControl {
    pub fn new(name: impl Into<String>, position: Point) -> Self {
        Self {
            name: name.into(),
            label: None,
            position,
            drawn_at: None,
            size: (12.0, 3.0),
            scale: 1.0,
            text_scale: 1.0,
            requires_focus: true,
            hit_testable: true,
            selected: false,
            pressed: false,
            latched: true,
            neighbors: [None; 4],
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.size = (width, height);
        self
    }

    /// Activate independent of selection.
    pub fn without_focus(mut self) -> Self {
        self.requires_focus = false;
        self
    }

    pub fn with_hit_test(mut self, hit_testable: bool) -> Self {
        self.hit_testable = hit_testable;
        self
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// `true` only on the tick the last [`is_pressed`] check fired.
    ///
    /// [`is_pressed`]: super::graph::ControlGraph::is_pressed
    pub fn pressed_this_tick(&self) -> bool {
        self.pressed
    }

    pub fn neighbor(&self, dir: Direction) -> Option<ControlId> {
        self.neighbors[dir.slot()]
    }

    pub(super) fn set_neighbor(&mut self, dir: Direction, to: Option<ControlId>) {
        self.neighbors[dir.slot()] = to;
    }

    /// Scaled bounds around the drawn (or layout) position.
    pub fn bounds(&self) -> Bounds {
        let center = self.drawn_at.unwrap_or(self.position);
        Bounds::centered(center, self.size.0 * self.scale, self.size.1 * self.scale)
    }
}
