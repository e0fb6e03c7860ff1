/*!

  Logic elements: the closed set of gates, sources, lamps and compounds that
  can be placed on a board.

*/

use crate::{
    compound::Compound,
    geometry::{Point, Rect},
    pin::{Direction, Pin},
};

/// Width of every element body
pub const BODY_WIDTH: i32 = 40;
/// Height of every element body
pub const BODY_HEIGHT: i32 = 40;
/// Distance the pin tips stick out of the body
pub const PIN_GAP: i32 = 10;
/// Drawn length of a pin stub
pub const STUB_LEN: i32 = 20;

/// A handle to an element on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
pub struct ElementId(usize);

impl ElementId {
    /// Returns the arena index behind this handle
    pub fn index(&self) -> usize {
        self.0
    }
}

impl From<usize> for ElementId {
    fn from(value: usize) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// The kinds of element a board can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
pub enum Variant {
    /// Two inputs, AND of both
    AndGate,
    /// Two inputs, OR of both
    OrGate,
    /// One input, its negation
    NotGate,
    /// A toggleable constant with one output
    InputSource,
    /// A lamp with one input showing the sampled value
    OutputLamp,
    /// A group of existing elements
    Compound,
}

impl Variant {
    /// Every variant, in toolbar order
    pub const ALL: [Variant; 6] = [
        Variant::AndGate,
        Variant::OrGate,
        Variant::NotGate,
        Variant::InputSource,
        Variant::OutputLamp,
        Variant::Compound,
    ];

    /// Number of input pins the variant owns
    pub fn input_count(&self) -> usize {
        match self {
            Variant::AndGate | Variant::OrGate => 2,
            Variant::NotGate | Variant::OutputLamp => 1,
            Variant::InputSource | Variant::Compound => 0,
        }
    }

    /// Number of output pins the variant owns
    pub fn output_count(&self) -> usize {
        match self {
            Variant::AndGate | Variant::OrGate | Variant::NotGate | Variant::InputSource => 1,
            Variant::OutputLamp | Variant::Compound => 0,
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Variant::AndGate => "AndGate",
            Variant::OrGate => "OrGate",
            Variant::NotGate => "NotGate",
            Variant::InputSource => "InputSource",
            Variant::OutputLamp => "OutputLamp",
            Variant::Compound => "Compound",
        };
        f.write_str(name)
    }
}

/// Variant-specific state of an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Logic {
    /// AND gate
    And,
    /// OR gate
    Or,
    /// NOT gate
    Not,
    /// Input source and its stored level
    Source {
        /// `true` when the source is high
        high: bool,
    },
    /// Output lamp and the reading cached by its last evaluation
    Lamp {
        /// `true` when the last evaluation lit the lamp
        lit: bool,
    },
    /// A group of elements
    Compound(Compound),
}

impl Logic {
    /// Fresh state for `variant`
    pub fn new(variant: Variant) -> Self {
        match variant {
            Variant::AndGate => Logic::And,
            Variant::OrGate => Logic::Or,
            Variant::NotGate => Logic::Not,
            Variant::InputSource => Logic::Source { high: false },
            Variant::OutputLamp => Logic::Lamp { lit: false },
            Variant::Compound => Logic::Compound(Compound::new()),
        }
    }

    /// Returns the variant tag
    pub fn variant(&self) -> Variant {
        match self {
            Logic::And => Variant::AndGate,
            Logic::Or => Variant::OrGate,
            Logic::Not => Variant::NotGate,
            Logic::Source { .. } => Variant::InputSource,
            Logic::Lamp { .. } => Variant::OutputLamp,
            Logic::Compound(_) => Variant::Compound,
        }
    }
}

/// A logic element placed (or about to be placed) on a board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    id: ElementId,
    /// Top-left corner of the body
    position: Point,
    logic: Logic,
    /// Owned pins, inputs first
    pins: Vec<Pin>,
    selected: bool,
    /// The compound this element was grouped into
    parent: Option<ElementId>,
}

impl Element {
    /// Constructs an element of `variant` with its pins laid out at `at`
    pub fn new(id: ElementId, variant: Variant, at: Point, snap_radius: i32) -> Self {
        Self::with_logic(id, Logic::new(variant), at, snap_radius)
    }

    /// Constructs an element from existing state with fresh, unconnected pins
    pub(crate) fn with_logic(id: ElementId, logic: Logic, at: Point, snap_radius: i32) -> Self {
        let variant = logic.variant();
        let pins = std::iter::repeat_n(Direction::Input, variant.input_count())
            .chain(std::iter::repeat_n(
                Direction::Output,
                variant.output_count(),
            ))
            .map(|d| Pin::new(id, d, STUB_LEN, snap_radius))
            .collect();
        let mut element = Self {
            id,
            position: at,
            logic,
            pins,
            selected: false,
            parent: None,
        };
        element.move_to(at);
        element
    }

    /// Returns the handle of this element
    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Returns the variant tag
    pub fn variant(&self) -> Variant {
        self.logic.variant()
    }

    /// Returns the variant-specific state
    pub fn logic(&self) -> &Logic {
        &self.logic
    }

    /// Returns the top-left corner of the body
    pub fn position(&self) -> Point {
        self.position
    }

    /// Moves the body to `at` and lays the pins out again.
    ///
    /// For compounds this only moves the origin; the board moves the children.
    pub fn move_to(&mut self, at: Point) {
        self.position = at;
        let Point { x, y } = at;
        let left = x - PIN_GAP;
        let right = x + BODY_WIDTH + PIN_GAP;
        let middle = y + BODY_HEIGHT / 2;
        let tips = match &mut self.logic {
            Logic::And | Logic::Or => vec![
                Point::new(left, y + PIN_GAP),
                Point::new(left, y + BODY_HEIGHT - PIN_GAP),
                Point::new(right, middle),
            ],
            Logic::Not => vec![Point::new(left, middle), Point::new(right, middle)],
            Logic::Source { .. } => vec![Point::new(right, middle)],
            Logic::Lamp { .. } => vec![Point::new(left, middle)],
            Logic::Compound(c) => {
                if c.is_empty() {
                    c.reset_bounds(at);
                }
                Vec::new()
            }
        };
        for (pin, tip) in self.pins.iter_mut().zip(tips) {
            pin.set_position(tip);
        }
    }

    /// Returns the rectangle used for hit-testing and compound bounds
    pub fn body(&self) -> Rect {
        match &self.logic {
            Logic::Compound(c) => c.bounds(),
            _ => Rect::new(
                self.position.x,
                self.position.y,
                BODY_WIDTH,
                BODY_HEIGHT,
            ),
        }
    }

    /// Returns `true` if (`x`, `y`) lies on the body
    pub fn is_mouse_on(&self, x: i32, y: i32) -> bool {
        self.body().contains(Point::new(x, y))
    }

    /// Returns the owned pins. Compounds own none.
    pub fn pins(&self) -> &[Pin] {
        &self.pins
    }

    /// Returns the owned pin at `index`
    pub fn pin(&self, index: usize) -> Option<&Pin> {
        self.pins.get(index)
    }

    /// Returns the owned pin at `index` mutably
    pub fn pin_mut(&mut self, index: usize) -> Option<&mut Pin> {
        self.pins.get_mut(index)
    }

    /// Returns the `n`th input pin
    pub fn input(&self, n: usize) -> Option<&Pin> {
        self.pins.iter().filter(|p| p.is_input()).nth(n)
    }

    /// Iterates over the input pins
    pub fn inputs(&self) -> impl Iterator<Item = &Pin> {
        self.pins.iter().filter(|p| p.is_input())
    }

    /// Iterates over the output pins
    pub fn outputs(&self) -> impl Iterator<Item = &Pin> {
        self.pins.iter().filter(|p| p.is_output())
    }

    /// Returns `true` if the element is selected
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Sets the plain selection flag. The board cascades it into compounds.
    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    /// Returns the compound this element belongs to
    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<ElementId>) {
        self.parent = parent;
    }

    /// Returns the level of an input source
    pub fn level(&self) -> Option<bool> {
        match self.logic {
            Logic::Source { high } => Some(high),
            _ => None,
        }
    }

    /// Flips an input source, returning the new level
    pub fn toggle(&mut self) -> Option<bool> {
        match &mut self.logic {
            Logic::Source { high } => {
                *high = !*high;
                Some(*high)
            }
            _ => None,
        }
    }

    /// Returns the cached reading of an output lamp
    pub fn is_lit(&self) -> Option<bool> {
        match self.logic {
            Logic::Lamp { lit } => Some(lit),
            _ => None,
        }
    }

    pub(crate) fn set_lit(&mut self, value: bool) {
        if let Logic::Lamp { lit } = &mut self.logic {
            *lit = value;
        }
    }

    /// Returns the group state if this element is a compound
    pub fn as_compound(&self) -> Option<&Compound> {
        match &self.logic {
            Logic::Compound(c) => Some(c),
            _ => None,
        }
    }

    pub(crate) fn as_compound_mut(&mut self) -> Option<&mut Compound> {
        match &mut self.logic {
            Logic::Compound(c) => Some(c),
            _ => None,
        }
    }

    /// Builds a disconnected copy under the handle `id`.
    ///
    /// The copy sits at the same position, gets fresh pins without wires and
    /// keeps the source level. It is unselected and belongs to no compound.
    /// A lamp's cached reading comes from its wiring and starts dark. A
    /// compound copy starts empty; the board clones the children into it.
    pub fn duplicate(&self, id: ElementId) -> Self {
        let logic = match &self.logic {
            Logic::Lamp { .. } => Logic::Lamp { lit: false },
            Logic::Compound(_) => Logic::Compound(Compound::new()),
            other => other.clone(),
        };
        let snap_radius = self
            .pins
            .first()
            .map(|p| p.snap_radius())
            .unwrap_or(crate::pin::DEFAULT_SNAP_RADIUS);
        Self::with_logic(id, logic, self.position, snap_radius)
    }
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} {}", self.id, self.variant(), self.position)?;
        match &self.logic {
            Logic::Source { high } => write!(f, " {}", if *high { "high" } else { "low" }),
            Logic::Lamp { lit } => write!(f, " {}", if *lit { "lit" } else { "dark" }),
            Logic::Compound(c) => {
                let names: Vec<String> = c.children().map(|c| c.id().to_string()).collect();
                write!(f, " [{}]", names.join(", "))
            }
            _ => Ok(()),
        }
    }
}
