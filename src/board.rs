/*!

  The board: the arena of elements and wires an editor works on.

  Elements and wires live in slot vectors addressed by [ElementId] and
  [WireId]. Pins are addressed by [PinRef] (owner plus index). Freed slots are
  never reused, so a stale handle resolves to nothing rather than to some other
  element.

*/

use crate::{
    compound::Child,
    config::BoardConfig,
    element::{Element, ElementId, Variant},
    error::{BoardError, ConnectError, EvalError},
    eval::{EvalReport, Evaluation, Evaluator, TruthTable},
    geometry::{Point, Rect},
    graph::DfsIterator,
    pin::{Direction, Pin, PinRef},
    wire::{Wire, WireId},
};
use tracing::{debug, error};

/// The elements and wires of a circuit, plus the set of placed elements
#[derive(Debug, Clone, Default)]
pub struct Board {
    /// The name of the board
    name: String,
    config: BoardConfig,
    /// Element arena. [None] marks a freed slot.
    elements: Vec<Option<Element>>,
    /// Wire arena. [None] marks a freed slot.
    wires: Vec<Option<Wire>>,
    /// Top-level elements, bottom-most first
    placed: Vec<ElementId>,
    /// The compound being built by a grouping session
    group: Option<ElementId>,
}

impl Board {
    /// Creates an empty board with the default configuration
    pub fn new(name: String) -> Self {
        Self::with_config(name, BoardConfig::default())
    }

    /// Creates an empty board with the given configuration
    pub fn with_config(name: String, config: BoardConfig) -> Self {
        Self {
            name,
            config,
            ..Default::default()
        }
    }

    /// Returns the name of the board
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Returns the configuration
    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// Resolves an element handle
    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.index()).and_then(Option::as_ref)
    }

    fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(id.index()).and_then(Option::as_mut)
    }

    fn require(&self, id: ElementId) -> Result<&Element, BoardError> {
        self.element(id).ok_or(BoardError::UnknownElement(id))
    }

    fn require_mut(&mut self, id: ElementId) -> Result<&mut Element, BoardError> {
        self.element_mut(id).ok_or(BoardError::UnknownElement(id))
    }

    /// Resolves a wire handle
    pub fn wire(&self, id: WireId) -> Option<&Wire> {
        self.wires.get(id.index()).and_then(Option::as_ref)
    }

    /// Resolves a pin address
    pub fn pin(&self, pin: PinRef) -> Option<&Pin> {
        self.element(pin.element)?.pin(pin.index)
    }

    fn pin_mut(&mut self, pin: PinRef) -> Option<&mut Pin> {
        self.element_mut(pin.element)?.pin_mut(pin.index)
    }

    /// Returns the top-level elements, bottom-most first
    pub fn placed(&self) -> &[ElementId] {
        &self.placed
    }

    /// Returns `true` if `id` is a top-level element
    pub fn is_placed(&self, id: ElementId) -> bool {
        self.placed.contains(&id)
    }

    /// Returns `true` if `id` or one of its ancestors is placed
    fn is_shown(&self, id: ElementId) -> bool {
        let mut cursor = Some(id);
        while let Some(c) = cursor {
            if self.is_placed(c) {
                return true;
            }
            cursor = self.element(c).and_then(Element::parent);
        }
        false
    }

    /// Returns everything grouped inside `id`, at any depth
    fn descendants(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(c) = stack.pop() {
            if let Some(children) = self.element(c).and_then(Element::as_compound) {
                for child in children.child_ids() {
                    out.push(child);
                    stack.push(child);
                }
            }
        }
        out
    }

    /// Iterates over the live wires in creation order
    pub fn wires(&self) -> impl Iterator<Item = (WireId, &Wire)> {
        self.wires
            .iter()
            .enumerate()
            .filter_map(|(i, w)| w.as_ref().map(|w| (WireId::from(i), w)))
    }

    /// Iterates over every live element, placed or not
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter().flatten()
    }

    /// Returns the number of live elements
    pub fn element_count(&self) -> usize {
        self.elements().count()
    }

    /// Returns the number of live wires
    pub fn wire_count(&self) -> usize {
        self.wires().count()
    }

    /// Returns the placed elements and everything grouped inside them,
    /// depth-first in placement order
    pub fn reachable(&self) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = self.placed.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(c) = self.element(id).and_then(Element::as_compound) {
                stack.extend(c.child_ids().into_iter().rev());
            }
        }
        out
    }

    fn reachable_of(&self, variant: Variant) -> Vec<ElementId> {
        self.reachable()
            .into_iter()
            .filter(|id| self.element(*id).is_some_and(|e| e.variant() == variant))
            .collect()
    }

    /// Returns every reachable output lamp
    pub fn lamps(&self) -> Vec<ElementId> {
        self.reachable_of(Variant::OutputLamp)
    }

    /// Returns every reachable input source
    pub fn sources(&self) -> Vec<ElementId> {
        self.reachable_of(Variant::InputSource)
    }

    /// Returns the pins of `id`. For a compound this is the union of its
    /// children's pins.
    pub fn pins_of(&self, id: ElementId) -> Vec<PinRef> {
        let Some(element) = self.element(id) else {
            return Vec::new();
        };
        match element.as_compound() {
            Some(c) => c.children().flat_map(|c| self.pins_of(c.id())).collect(),
            None => (0..element.pins().len())
                .map(|i| PinRef::new(id, i))
                .collect(),
        }
    }

    /// Returns, per input of `id`, the element driving it
    pub fn drivers(&self, id: ElementId) -> Vec<Option<ElementId>> {
        let Some(element) = self.element(id) else {
            return Vec::new();
        };
        element
            .inputs()
            .map(|p| {
                let wire = self.wire(p.incoming_wire()?)?;
                let src = wire.from_pin();
                self.element(src.element).map(|_| src.element)
            })
            .collect()
    }
}

/// Factory and placement
impl Board {
    fn alloc(&mut self, variant: Variant, at: Point) -> ElementId {
        let id = ElementId::from(self.elements.len());
        let element = Element::new(id, variant, at, self.config.snap_radius);
        self.elements.push(Some(element));
        id
    }

    /// Constructs an element of `variant` at `at` and places it on top
    pub fn add(&mut self, variant: Variant, at: Point) -> ElementId {
        let id = self.alloc(variant, at);
        self.placed.push(id);
        debug!(element = %id, %variant, %at, "added");
        id
    }

    /// Constructs an element without placing it, e.g. as a floating preview
    pub fn spawn(&mut self, variant: Variant, at: Point) -> ElementId {
        self.alloc(variant, at)
    }

    /// Moves an unplaced element to `at` and places it on top
    pub fn place(&mut self, id: ElementId, at: Point) -> Result<(), BoardError> {
        let element = self.require(id)?;
        if let Some(parent) = element.parent() {
            return Err(BoardError::Grouped(id, parent));
        }
        if self.is_placed(id) {
            return Err(BoardError::AlreadyPlaced(id));
        }
        self.relocate(id, at);
        let inner = self.descendants(id);
        self.placed.retain(|p| !inner.contains(p));
        self.placed.push(id);
        debug!(element = %id, %at, "placed");
        Ok(())
    }

    /// Drops an unplaced element, together with anything grouped inside it.
    /// Nothing is dropped if any of them is placed.
    pub fn discard(&mut self, id: ElementId) -> Result<Element, BoardError> {
        if let Some(parent) = self.require(id)?.parent() {
            return Err(BoardError::Grouped(id, parent));
        }
        let inner = self.descendants(id);
        if let Some(placed) = std::iter::once(id)
            .chain(inner.iter().copied())
            .find(|e| self.is_placed(*e))
        {
            return Err(BoardError::AlreadyPlaced(placed));
        }
        let element = self.delete_element(id)?;
        for child in inner {
            if let Some(e) = self.element_mut(child) {
                e.set_parent(None);
            }
            self.delete_element(child)?;
        }
        Ok(element)
    }
}

/// Wiring
impl Board {
    /// Connects two pins with a new wire. Either pin may be the output; the
    /// other must be a free input. Nothing changes when the connection is
    /// rejected.
    pub fn connect(&mut self, a: PinRef, b: PinRef) -> Result<WireId, ConnectError> {
        let pa = self.pin(a).ok_or(ConnectError::UnknownPin(a))?;
        let pb = self.pin(b).ok_or(ConnectError::UnknownPin(b))?;
        let (from, to, input) = match (pa.direction(), pb.direction()) {
            (Direction::Input, Direction::Input) => return Err(ConnectError::BothInputs(a, b)),
            (Direction::Output, Direction::Output) => {
                return Err(ConnectError::BothOutputs(a, b));
            }
            (Direction::Output, Direction::Input) => (a, b, pb),
            (Direction::Input, Direction::Output) => (b, a, pa),
        };
        if let Some(existing) = input.incoming_wire() {
            return Err(ConnectError::InputOccupied(to, existing));
        }
        if self.config.reject_loops && self.depends_on(from.element, to.element) {
            return Err(ConnectError::WouldCreateLoop(from, to));
        }

        let id = WireId::from(self.wires.len());
        self.wires.push(Some(Wire::new(from, to)));
        if let Some(pin) = self.pin_mut(to) {
            pin.set_incoming_wire(id);
        }
        debug!(wire = %id, %from, %to, "connected");
        Ok(id)
    }

    /// Returns `true` if `of` is `on` or is fed, directly or not, by `on`
    pub fn depends_on(&self, of: ElementId, on: ElementId) -> bool {
        DfsIterator::new(self, of).any(|e| e == on)
    }

    /// Removes a wire and frees the input it was feeding
    pub fn disconnect(&mut self, wire: WireId) -> Result<Wire, BoardError> {
        let removed = self
            .wires
            .get_mut(wire.index())
            .and_then(Option::take)
            .ok_or(BoardError::UnknownWire(wire))?;
        if let Some(pin) = self.pin_mut(removed.to_pin()) {
            if pin.incoming_wire() == Some(wire) {
                pin.clear_incoming_wire();
            }
        }
        debug!(%wire, "disconnected");
        Ok(removed)
    }

    /// Hit-tests a single wire between its current pin tips
    pub fn hit_wire(&self, wire: WireId, x: i32, y: i32, tolerance: i32) -> bool {
        let Some(w) = self.wire(wire) else {
            return false;
        };
        match (self.pin(w.from_pin()), self.pin(w.to_pin())) {
            (Some(a), Some(b)) => Wire::hit_test(a.position(), b.position(), x, y, tolerance),
            _ => false,
        }
    }

    /// Sets the selection flag of a wire
    pub fn set_wire_selected(&mut self, wire: WireId, selected: bool) -> Result<(), BoardError> {
        self.wires
            .get_mut(wire.index())
            .and_then(Option::as_mut)
            .ok_or(BoardError::UnknownWire(wire))?
            .set_selected(selected);
        Ok(())
    }
}

/// Deletion
impl Board {
    /// Deletes an element after removing every wire attached to its own pins.
    ///
    /// Deleting a compound leaves its children and their wires alone: they
    /// stay alive and keep evaluating, but are no longer placed.
    pub fn delete_element(&mut self, id: ElementId) -> Result<Element, BoardError> {
        if let Some(parent) = self.require(id)?.parent() {
            return Err(BoardError::Grouped(id, parent));
        }
        if self.group == Some(id) {
            self.group = None;
        }

        let attached: Vec<WireId> = self
            .wires()
            .filter(|(_, w)| w.touches(id))
            .map(|(wid, _)| wid)
            .collect();
        for wire in attached {
            self.disconnect(wire)?;
        }

        self.placed.retain(|p| *p != id);
        let element = self
            .elements
            .get_mut(id.index())
            .and_then(Option::take)
            .ok_or(BoardError::UnknownElement(id))?;
        if let Some(c) = element.as_compound() {
            for child in c.children() {
                if let Some(e) = self.element_mut(child.id()) {
                    e.set_parent(None);
                }
            }
        }
        debug!(element = %id, "deleted");
        Ok(element)
    }

    /// Removes every element and wire. Handles issued before stay invalid.
    pub fn clear(&mut self) {
        self.wires.iter_mut().for_each(|w| *w = None);
        self.elements.iter_mut().for_each(|e| *e = None);
        self.placed.clear();
        self.group = None;
    }
}

/// Movement, state and selection
impl Board {
    /// Moves an element to `at`. A compound carries its children along.
    pub fn move_to(&mut self, id: ElementId, at: Point) -> Result<(), BoardError> {
        self.require(id)?;
        self.relocate(id, at);
        self.refit_ancestors(id);
        Ok(())
    }

    /// Moves `id` and, for compounds, every child to origin + offset. The
    /// parents of `id` are left stale.
    fn relocate(&mut self, id: ElementId, at: Point) {
        let Some(element) = self.element_mut(id) else {
            return;
        };
        element.move_to(at);
        let children: Vec<Child> = match element.as_compound() {
            Some(c) => c.children().copied().collect(),
            None => return,
        };
        for child in children {
            self.relocate(child.id(), at + child.offset());
        }
        self.refit(id);
    }

    /// Recomputes bounds, origin and offsets of the compound `id`
    fn refit(&mut self, id: ElementId) {
        let Some(children) = self
            .element(id)
            .and_then(Element::as_compound)
            .map(|c| c.child_ids())
        else {
            return;
        };
        let bodies: Vec<Rect> = children
            .iter()
            .filter_map(|c| self.element(*c))
            .map(Element::body)
            .collect();
        if let Some(element) = self.element_mut(id) {
            let origin = element.as_compound_mut().and_then(|c| c.refit(&bodies));
            if let Some(origin) = origin {
                element.move_to(origin);
            }
        }
    }

    fn refit_ancestors(&mut self, id: ElementId) {
        let mut parent = self.element(id).and_then(Element::parent);
        while let Some(p) = parent {
            self.refit(p);
            parent = self.element(p).and_then(Element::parent);
        }
    }

    /// Flips an input source, returning its new level
    pub fn toggle(&mut self, id: ElementId) -> Result<bool, BoardError> {
        let level = self
            .require_mut(id)?
            .toggle()
            .ok_or(BoardError::NotASource(id))?;
        debug!(element = %id, level, "toggled");
        Ok(level)
    }

    /// Selects or deselects an element. Compounds pass the flag on to every
    /// child.
    pub fn set_selected(&mut self, id: ElementId, selected: bool) -> Result<(), BoardError> {
        let element = self.require_mut(id)?;
        element.set_selected(selected);
        let children = element
            .as_compound()
            .map(|c| c.child_ids())
            .unwrap_or_default();
        for child in children {
            self.set_selected(child, selected)?;
        }
        Ok(())
    }

    /// Deselects every element and wire
    pub fn clear_selection(&mut self) {
        self.elements
            .iter_mut()
            .flatten()
            .for_each(|e| e.set_selected(false));
        self.wires
            .iter_mut()
            .flatten()
            .for_each(|w| w.set_selected(false));
    }

    /// Builds a disconnected copy of `id`. The copy keeps position and state,
    /// has fresh pins without wires, is unselected and is not placed.
    /// Compounds are copied child by child with their layout preserved.
    pub fn clone_element(&mut self, id: ElementId) -> Result<ElementId, BoardError> {
        let source = self.require(id)?;
        let origin = source.position();
        let children: Vec<Child> = source
            .as_compound()
            .map(|c| c.children().copied().collect())
            .unwrap_or_default();
        let copy_id = ElementId::from(self.elements.len());
        let copy = source.duplicate(copy_id);
        self.elements.push(Some(copy));

        for child in children {
            let c = self.clone_element(child.id())?;
            self.relocate(c, origin + child.offset());
            self.add_existing(copy_id, c)?;
        }
        debug!(element = %id, copy = %copy_id, "cloned");
        Ok(copy_id)
    }
}

/// Grouping
impl Board {
    /// Adds the existing element `child` to `compound` by reference.
    ///
    /// The first child anchors the compound origin to its own position. The
    /// offset is stored and the bounds recomputed. Wires on the child are
    /// untouched.
    pub fn add_existing(&mut self, compound: ElementId, child: ElementId) -> Result<(), BoardError> {
        let group = self.require(compound)?;
        if group.as_compound().is_none() {
            return Err(BoardError::NotACompound(compound));
        }
        let member = self.require(child)?;
        if let Some(parent) = member.parent() {
            return Err(BoardError::Grouped(child, parent));
        }
        let mut cursor = Some(compound);
        while let Some(c) = cursor {
            if c == child {
                return Err(BoardError::Containment(compound, child));
            }
            cursor = self.element(c).and_then(Element::parent);
        }
        let child_at = member.position();

        let group = self.require_mut(compound)?;
        if group.as_compound().is_some_and(|c| c.is_empty()) {
            group.move_to(child_at);
        }
        let offset = child_at - group.position();
        if let Some(c) = group.as_compound_mut() {
            c.push(child, offset);
        }
        self.require_mut(child)?.set_parent(Some(compound));
        if self.is_shown(compound) {
            self.placed.retain(|p| *p != child);
        }
        self.refit(compound);
        self.refit_ancestors(compound);
        Ok(())
    }

    /// Opens a grouping session with a fresh, empty compound. An open session
    /// is cancelled first.
    pub fn start_group(&mut self) -> ElementId {
        self.cancel_group();
        let id = self.alloc(Variant::Compound, Point::default());
        self.group = Some(id);
        id
    }

    /// Returns the compound of the open grouping session
    pub fn group_in_progress(&self) -> Option<ElementId> {
        self.group
    }

    /// Adds a placed, non-compound element to the open group and marks it
    /// selected
    pub fn add_to_group(&mut self, id: ElementId) -> Result<(), BoardError> {
        let group = self.group.ok_or(BoardError::NoGroupInProgress)?;
        if self.require(id)?.as_compound().is_some() {
            return Err(BoardError::CompoundInGroup(id));
        }
        if !self.is_placed(id) {
            return Err(BoardError::NotPlaced(id));
        }
        self.add_existing(group, id)?;
        self.require_mut(id)?.set_selected(true);
        Ok(())
    }

    /// Closes the grouping session. The children leave the top level and the
    /// compound is placed, selected, in their stead. Returns [None] when
    /// nothing was grouped.
    pub fn end_group(&mut self) -> Option<ElementId> {
        let group = self.group.take()?;
        let children = self
            .element(group)
            .and_then(Element::as_compound)
            .map(|c| c.child_ids())
            .unwrap_or_default();
        if children.is_empty() {
            self.elements[group.index()] = None;
            return None;
        }
        self.placed.retain(|p| !children.contains(p));
        self.placed.push(group);
        self.set_selected(group, true).ok()?;
        debug!(compound = %group, children = children.len(), "grouped");
        Some(group)
    }

    /// Abandons the grouping session. Children are released and deselected;
    /// nothing else changes.
    pub fn cancel_group(&mut self) {
        let Some(group) = self.group.take() else {
            return;
        };
        let children = self
            .element(group)
            .and_then(Element::as_compound)
            .map(|c| c.child_ids())
            .unwrap_or_default();
        for child in children {
            if let Some(e) = self.element_mut(child) {
                e.set_selected(false);
                e.set_parent(None);
            }
        }
        self.elements[group.index()] = None;
    }
}

/// Evaluation
impl Board {
    /// Evaluates `id`. Unconnected or broken inputs read as `false` and are
    /// logged; a lamp caches the result.
    pub fn evaluate(&mut self, id: ElementId) -> Result<bool, EvalError> {
        self.evaluate_traced(id).map(|e| e.value)
    }

    /// Like [Board::evaluate], also returning the faults met on the way
    pub fn evaluate_traced(&mut self, id: ElementId) -> Result<Evaluation, EvalError> {
        let outcome = Evaluator::new(self).run(id);
        let lit = outcome.as_ref().is_ok_and(|e| e.value);
        if let Some(e) = self.element_mut(id) {
            e.set_lit(lit);
        }
        outcome
    }

    /// Evaluates every reachable lamp. A lamp that fails hard reads `false`
    /// and the pass moves on.
    pub fn evaluate_lamps(&mut self) -> EvalReport {
        let mut report = EvalReport::default();
        for lamp in self.lamps() {
            let outcome = Evaluator::new(self).run(lamp);
            if let Err(e) = &outcome {
                error!(%lamp, error = %e, "lamp evaluation failed");
            }
            let lit = outcome.as_ref().is_ok_and(|e| e.value);
            if let Some(e) = self.element_mut(lamp) {
                e.set_lit(lit);
            }
            report.record(lamp, outcome);
        }
        report
    }

    /// Returns the reading a lamp cached at its last evaluation
    pub fn is_lit(&self, lamp: ElementId) -> Option<bool> {
        self.element(lamp)?.is_lit()
    }

    /// Enumerates every assignment of the reachable sources without changing
    /// their stored levels
    pub fn truth_table(&self) -> Result<TruthTable, BoardError> {
        TruthTable::build(self)
    }
}

/// Hit-testing
impl Board {
    /// Returns the top-most placed element under (`x`, `y`)
    pub fn element_at(&self, x: i32, y: i32) -> Option<ElementId> {
        self.placed
            .iter()
            .rev()
            .copied()
            .find(|id| self.element(*id).is_some_and(|e| e.is_mouse_on(x, y)))
    }

    /// Returns a pin of the top-most placed element within snap range of
    /// (`x`, `y`)
    pub fn pin_at(&self, x: i32, y: i32) -> Option<PinRef> {
        self.placed
            .iter()
            .rev()
            .flat_map(|id| self.pins_of(*id))
            .find(|p| self.pin(*p).is_some_and(|pin| pin.is_within_snap(x, y)))
    }

    /// Returns the top-most wire within the configured tolerance of
    /// (`x`, `y`)
    pub fn wire_at(&self, x: i32, y: i32) -> Option<WireId> {
        let tol = self.config.wire_tolerance;
        let ids: Vec<WireId> = self.wires().map(|(id, _)| id).collect();
        ids.into_iter()
            .rev()
            .find(|id| self.hit_wire(*id, x, y, tol))
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "board {} {{", self.name)?;
        let mut stack: Vec<(ElementId, usize)> =
            self.placed.iter().rev().map(|id| (*id, 1)).collect();
        while let Some((id, depth)) = stack.pop() {
            let Some(element) = self.element(id) else {
                continue;
            };
            let indent = "  ".repeat(depth);
            writeln!(f, "{indent}{element}")?;
            if let Some(c) = element.as_compound() {
                stack.extend(c.child_ids().into_iter().rev().map(|c| (c, depth + 1)));
            }
        }
        for (id, wire) in self.wires() {
            writeln!(f, "  {id}: {wire}")?;
        }
        writeln!(f, "}}")
    }
}

#[cfg(test)]
impl Board {
    /// Frees an element slot without touching the wires that point at it
    fn vacate(&mut self, id: ElementId) {
        self.elements[id.index()] = None;
        self.placed.retain(|p| *p != id);
    }
}
