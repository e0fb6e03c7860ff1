/*!

  Graph analyses over a [Board].

*/

use crate::{
    board::Board,
    element::{ElementId, Logic},
    error::EvalError,
};
#[cfg(feature = "graph")]
use crate::{pin::PinRef, wire::WireId};
#[cfg(feature = "graph")]
use petgraph::graph::DiGraph;
use std::collections::{HashMap, HashSet, VecDeque};

/// A common trait of analyses that can be performed on a board.
/// An analysis becomes stale when the board is modified.
pub trait Analysis<'a>
where
    Self: Sized + 'a,
{
    /// Construct the analysis to the current state of the board.
    fn build(board: &'a Board) -> Result<Self, EvalError>;
}

/// Depth-first walk from an element towards everything that feeds it.
/// Each element is yielded once.
///
/// # Examples
///
/// ```
/// use gate_board::{board::Board, element::Variant, graph::DfsIterator, pin::PinRef};
///
/// let mut board = Board::new("example".to_string());
/// let a = board.add(Variant::InputSource, (0, 0).into());
/// let not = board.add(Variant::NotGate, (100, 0).into());
/// board.connect(PinRef::new(a, 0), PinRef::new(not, 0)).unwrap();
/// let mut dfs = DfsIterator::new(&board, not);
/// let mut nodes = Vec::new();
/// while let Some(n) = dfs.next() {
///     if dfs.check_cycles() {
///         panic!("Cycle detected on the board");
///     }
///     nodes.push(n);
/// }
/// assert_eq!(nodes, vec![not, a]);
/// ```
pub struct DfsIterator<'a> {
    board: &'a Board,
    /// Pending elements with their distance from the start
    stack: Vec<(ElementId, usize)>,
    /// The chain of elements leading to the one last yielded
    path: Vec<ElementId>,
    visited: HashSet<ElementId>,
    cycle: Option<ElementId>,
}

impl<'a> DfsIterator<'a> {
    /// Create a new DFS iterator for the board starting at `from`.
    pub fn new(board: &'a Board, from: ElementId) -> Self {
        Self {
            board,
            stack: vec![(from, 0)],
            path: Vec::new(),
            visited: HashSet::new(),
            cycle: None,
        }
    }
}

impl DfsIterator<'_> {
    /// Check if the DFS traversal has encountered a cycle yet.
    pub fn check_cycles(&self) -> bool {
        self.cycle.is_some()
    }

    /// Returns the first element found to feed itself
    pub fn cycle_at(&self) -> Option<ElementId> {
        self.cycle
    }

    /// Consumes the iterator to detect cycles upstream of the start.
    pub fn detect_cycles(mut self) -> bool {
        while self.cycle.is_none() && self.next().is_some() {}
        self.cycle.is_some()
    }
}

impl Iterator for DfsIterator<'_> {
    type Item = ElementId;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((id, depth)) = self.stack.pop() {
            self.path.truncate(depth);
            if self.path.contains(&id) {
                self.cycle.get_or_insert(id);
                continue;
            }
            if !self.visited.insert(id) {
                continue;
            }
            self.path.push(id);
            for driver in self.board.drivers(id).into_iter().flatten() {
                self.stack.push((driver, depth + 1));
            }
            return Some(id);
        }
        None
    }
}

/// A table that maps elements to the elements they drive
pub struct FanOutTable<'a> {
    board: &'a Board,
    /// Maps an element to the elements its outputs feed, once per wire
    fan_out: HashMap<ElementId, Vec<ElementId>>,
}

impl FanOutTable<'_> {
    /// Returns an iterator to the elements that use `id`.
    pub fn get_users(&self, id: ElementId) -> impl Iterator<Item = ElementId> {
        self.fan_out
            .get(&id)
            .into_iter()
            .flat_map(|users| users.iter().copied())
    }

    /// Returns `true` if any wire leaves `id`
    pub fn has_users(&self, id: ElementId) -> bool {
        self.fan_out.get(&id).is_some_and(|u| !u.is_empty())
    }

    /// Returns the lamps whose reading may change when `id` changes, in
    /// breadth-first order
    pub fn affected_lamps(&self, id: ElementId) -> Vec<ElementId> {
        let mut seen = HashSet::from([id]);
        let mut queue = VecDeque::from([id]);
        let mut lamps = Vec::new();
        while let Some(e) = queue.pop_front() {
            if self
                .board
                .element(e)
                .is_some_and(|el| matches!(el.logic(), Logic::Lamp { .. }))
            {
                lamps.push(e);
            }
            for user in self.get_users(e) {
                if seen.insert(user) {
                    queue.push_back(user);
                }
            }
        }
        lamps
    }
}

impl<'a> Analysis<'a> for FanOutTable<'a> {
    fn build(board: &'a Board) -> Result<Self, EvalError> {
        let mut fan_out: HashMap<ElementId, Vec<ElementId>> = HashMap::new();
        for (_, wire) in board.wires() {
            let (src, dst) = (wire.from_pin().element, wire.to_pin().element);
            if board.element(src).is_none() || board.element(dst).is_none() {
                continue;
            }
            fan_out.entry(src).or_default().push(dst);
        }
        Ok(FanOutTable { board, fan_out })
    }
}

/// Logic levels of everything feeding the board's lamps.
///
/// Sources sit at level 0, every gate adds one and a lamp shows the level of
/// its driver. Unconnected inputs count as level 0. Building fails on a
/// combinational loop.
pub struct LogicDepth<'a> {
    _board: &'a Board,
    depth: HashMap<ElementId, usize>,
    max_depth: usize,
}

impl LogicDepth<'_> {
    /// Returns the logic level of an element
    pub fn get_depth(&self, id: ElementId) -> Option<usize> {
        self.depth.get(&id).copied()
    }

    /// Returns the deepest logic level on the board
    pub fn get_max_depth(&self) -> usize {
        self.max_depth
    }
}

impl<'a> Analysis<'a> for LogicDepth<'a> {
    fn build(board: &'a Board) -> Result<Self, EvalError> {
        let mut nodes = Vec::new();
        for lamp in board.lamps() {
            let mut dfs = DfsIterator::new(board, lamp);
            while let Some(n) = dfs.next() {
                if let Some(at) = dfs.cycle_at() {
                    return Err(EvalError::CombinationalLoop(at));
                }
                nodes.push(n);
            }
            if let Some(at) = dfs.cycle_at() {
                return Err(EvalError::CombinationalLoop(at));
            }
        }

        // Drivers before users: repeat until every node is resolved
        let mut depth: HashMap<ElementId, usize> = HashMap::new();
        let mut pending = nodes;
        while !pending.is_empty() {
            let before = pending.len();
            pending.retain(|id| {
                let Some(element) = board.element(*id) else {
                    return false;
                };
                let drivers = board.drivers(*id);
                if drivers.iter().flatten().any(|d| !depth.contains_key(d)) {
                    return true;
                }
                let deepest = drivers
                    .iter()
                    .flatten()
                    .filter_map(|d| depth.get(d))
                    .max()
                    .copied()
                    .unwrap_or(0);
                let level = match element.logic() {
                    Logic::And | Logic::Or | Logic::Not => deepest + 1,
                    Logic::Lamp { .. } => deepest,
                    Logic::Source { .. } | Logic::Compound(_) => 0,
                };
                depth.insert(*id, level);
                false
            });
            if pending.len() == before {
                return Err(EvalError::CombinationalLoop(pending[0]));
            }
        }

        let max_depth = depth.values().max().copied().unwrap_or(0);
        Ok(LogicDepth {
            _board: board,
            depth,
            max_depth,
        })
    }
}

/// An enum to provide pseudo-nodes for any misc user-programmable behavior.
#[cfg(feature = "graph")]
#[derive(Debug, Clone)]
pub enum Node<T: Clone + std::fmt::Debug + std::fmt::Display> {
    /// An element on the board
    Element(ElementId),
    /// Any other user-programmable node
    Pseudo(T),
}

#[cfg(feature = "graph")]
impl<T> std::fmt::Display for Node<T>
where
    T: Clone + std::fmt::Debug + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Node::Element(id) => id.fmt(f),
            Node::Pseudo(t) => std::fmt::Display::fmt(t, f),
        }
    }
}

/// An enum to provide pseudo-edges for any misc user-programmable behavior.
#[cfg(feature = "graph")]
#[derive(Debug, Clone)]
pub enum Edge<T: Clone + std::fmt::Debug + std::fmt::Display> {
    /// A wire between two elements
    Wire(WireId),
    /// Any other user-programmable edge
    Pseudo(T),
}

#[cfg(feature = "graph")]
impl<T> std::fmt::Display for Edge<T>
where
    T: Clone + std::fmt::Debug + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Edge::Wire(w) => w.fmt(f),
            Edge::Pseudo(t) => std::fmt::Display::fmt(t, f),
        }
    }
}

/// A petgraph view of the board as a directed multi-graph of type [DiGraph<Node, Edge>].
/// Every unconnected input hangs off a pseudo-node of its own.
#[cfg(feature = "graph")]
pub struct MultiDiGraph<'a> {
    _board: &'a Board,
    graph: DiGraph<Node<String>, Edge<PinRef>>,
}

#[cfg(feature = "graph")]
impl MultiDiGraph<'_> {
    /// Return a reference to the graph constructed by this analysis
    pub fn get_graph(&self) -> &DiGraph<Node<String>, Edge<PinRef>> {
        &self.graph
    }
}

#[cfg(feature = "graph")]
impl<'a> Analysis<'a> for MultiDiGraph<'a> {
    fn build(board: &'a Board) -> Result<Self, EvalError> {
        let mut mapping = HashMap::new();
        let mut graph = DiGraph::new();

        for id in board.reachable() {
            if board
                .element(id)
                .is_some_and(|e| e.as_compound().is_none())
            {
                mapping.insert(id, graph.add_node(Node::Element(id)));
            }
        }

        for (wid, wire) in board.wires() {
            let src = mapping.get(&wire.from_pin().element);
            let dst = mapping.get(&wire.to_pin().element);
            if let (Some(s), Some(t)) = (src, dst) {
                graph.add_edge(*s, *t, Edge::Wire(wid));
            }
        }

        // Finally, mark the inputs nothing drives
        let mut open = Vec::new();
        for (id, node) in mapping.iter() {
            if let Some(element) = board.element(*id) {
                for (n, pin) in element.inputs().enumerate() {
                    if !pin.has_incoming_wire() {
                        open.push((*node, PinRef::new(*id, n)));
                    }
                }
            }
        }
        open.sort_by_key(|(_, pin)| *pin);
        for (node, pin) in open {
            let s = graph.add_node(Node::Pseudo(format!("Unconnected({pin})")));
            graph.add_edge(s, node, Edge::Pseudo(pin));
        }

        Ok(Self {
            _board: board,
            graph,
        })
    }
}
