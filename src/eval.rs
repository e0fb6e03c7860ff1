/*!

  Pull-based evaluation of the element graph.

  Evaluating an element walks every input wire back to the element driving
  it and evaluates that first. A missing wire or an upstream element that
  cannot be resolved reads as `false`; the problem is logged and handed back
  to the caller as an [EvalFault] instead of aborting the walk. Loops and
  runaway depth are hard [EvalError]s.

  Nothing is memoized: an element feeding several inputs is evaluated once per
  path that reaches it.

*/

use crate::{
    board::Board,
    element::{Element, ElementId, Logic},
    error::{BoardError, EvalError},
    pin::PinRef,
    wire::WireId,
};
use bitvec::{slice::BitSlice, vec::BitVec};
use std::collections::{HashMap, HashSet};
use tracing::{error, trace, warn};

/// Largest number of input sources a [TruthTable] enumerates
pub const MAX_TRUTH_TABLE_SOURCES: usize = 16;

/// A recoverable problem met while evaluating. The affected input reads as
/// `false`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
pub enum EvalFault {
    /// The input pin has no wire
    Unconnected(PinRef),
    /// The wire feeding the input does not lead to a live output pin
    BrokenUpstream(PinRef, WireId),
}

impl EvalFault {
    /// Returns the input pin the fault was found on
    pub fn pin(&self) -> PinRef {
        match self {
            EvalFault::Unconnected(pin) | EvalFault::BrokenUpstream(pin, _) => *pin,
        }
    }

    /// Returns `true` for faults that are only worth a warning
    pub fn is_warning(&self) -> bool {
        matches!(self, EvalFault::Unconnected(_))
    }
}

impl std::fmt::Display for EvalFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvalFault::Unconnected(pin) => write!(f, "input {pin} is not connected"),
            EvalFault::BrokenUpstream(pin, wire) => {
                write!(f, "input {pin} is fed by {wire} from an unknown element")
            }
        }
    }
}

/// The value of one evaluation and the faults met on the way
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// The computed value
    pub value: bool,
    /// Recoverable problems, in the order they were met
    pub faults: Vec<EvalFault>,
}

/// Walks the board for one evaluation
pub(crate) struct Evaluator<'a> {
    board: &'a Board,
    /// Elements on the current recursion path
    path: HashSet<ElementId>,
    faults: Vec<EvalFault>,
    /// Source levels to use instead of the stored ones
    assignment: Option<&'a HashMap<ElementId, bool>>,
}

impl<'a> Evaluator<'a> {
    pub(crate) fn new(board: &'a Board) -> Self {
        Self {
            board,
            path: HashSet::new(),
            faults: Vec::new(),
            assignment: None,
        }
    }

    pub(crate) fn with_assignment(mut self, assignment: &'a HashMap<ElementId, bool>) -> Self {
        self.assignment = Some(assignment);
        self
    }

    /// Evaluates `id`, consuming the evaluator
    pub(crate) fn run(mut self, id: ElementId) -> Result<Evaluation, EvalError> {
        let value = self.eval(id)?;
        Ok(Evaluation {
            value,
            faults: self.faults,
        })
    }

    fn eval(&mut self, id: ElementId) -> Result<bool, EvalError> {
        let board = self.board;
        let element = board.element(id).ok_or(EvalError::UnknownElement(id))?;
        let limit = board.config().max_eval_depth;
        if self.path.len() >= limit {
            return Err(EvalError::DepthExceeded(limit));
        }
        if !self.path.insert(id) {
            return Err(EvalError::CombinationalLoop(id));
        }

        let value = match element.logic() {
            // Both sides are always walked so every fault gets reported
            Logic::And => {
                let a = self.input(element, 0)?;
                let b = self.input(element, 1)?;
                a && b
            }
            Logic::Or => {
                let a = self.input(element, 0)?;
                let b = self.input(element, 1)?;
                a || b
            }
            Logic::Not => !self.input(element, 0)?,
            Logic::Source { high } => self
                .assignment
                .and_then(|a| a.get(&id).copied())
                .unwrap_or(*high),
            Logic::Lamp { .. } => self.input(element, 0)?,
            Logic::Compound(_) => false,
        };

        trace!(element = %id, value, "evaluated");
        self.path.remove(&id);
        Ok(value)
    }

    /// Reads the `n`th input of `element`. Inputs come first in the pin list,
    /// so the pin index is `n`.
    fn input(&mut self, element: &Element, n: usize) -> Result<bool, EvalError> {
        let pin = PinRef::new(element.id(), n);
        let Some(wire) = element.input(n).and_then(|p| p.incoming_wire()) else {
            warn!(%pin, "input is not connected, reading false");
            self.faults.push(EvalFault::Unconnected(pin));
            return Ok(false);
        };

        let board = self.board;
        let driver = board
            .wire(wire)
            .map(|w| w.from_pin())
            .filter(|src| board.pin(*src).is_some_and(|p| p.is_output()))
            .map(|src| src.element);

        match driver {
            Some(driver) => self.eval(driver),
            None => {
                error!(%pin, %wire, "upstream element cannot be resolved, reading false");
                self.faults.push(EvalFault::BrokenUpstream(pin, wire));
                Ok(false)
            }
        }
    }
}

/// The outcome of evaluating every lamp on a board
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize))]
pub struct EvalReport {
    lamps: Vec<ElementId>,
    /// One bit per lamp, in lamp order
    levels: BitVec,
    faults: Vec<EvalFault>,
    failures: Vec<(ElementId, EvalError)>,
}

impl EvalReport {
    pub(crate) fn record(&mut self, lamp: ElementId, outcome: Result<Evaluation, EvalError>) {
        self.lamps.push(lamp);
        match outcome {
            Ok(eval) => {
                self.levels.push(eval.value);
                self.faults.extend(eval.faults);
            }
            Err(e) => {
                self.levels.push(false);
                self.failures.push((lamp, e));
            }
        }
    }

    /// Returns the evaluated lamps
    pub fn lamps(&self) -> &[ElementId] {
        &self.lamps
    }

    /// Returns the lamp readings, in the order of [EvalReport::lamps]
    pub fn levels(&self) -> &BitSlice {
        &self.levels
    }

    /// Returns the reading of `lamp`, if it was evaluated
    pub fn level(&self, lamp: ElementId) -> Option<bool> {
        let i = self.lamps.iter().position(|l| *l == lamp)?;
        self.levels.get(i).map(|b| *b)
    }

    /// Returns the recoverable faults met during the pass
    pub fn faults(&self) -> &[EvalFault] {
        &self.faults
    }

    /// Returns the lamps whose evaluation failed hard
    pub fn failures(&self) -> &[(ElementId, EvalError)] {
        &self.failures
    }

    /// Returns `true` when the pass met neither faults nor failures
    pub fn is_clean(&self) -> bool {
        self.faults.is_empty() && self.failures.is_empty()
    }

    #[cfg(feature = "serde")]
    /// Writes the report as pretty JSON.
    pub fn write_json(&self, writer: impl std::io::Write) -> Result<(), serde_json::Error> {
        serde_json::to_writer_pretty(writer, self)
    }
}

/// Lamp readings for every assignment of the input sources
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruthTable {
    sources: Vec<ElementId>,
    lamps: Vec<ElementId>,
    /// Row `r` assigns bit `i` of `r` to source `i`
    rows: Vec<BitVec>,
}

impl TruthTable {
    pub(crate) fn build(board: &Board) -> Result<Self, BoardError> {
        let sources = board.sources();
        let lamps = board.lamps();
        if sources.len() > MAX_TRUTH_TABLE_SOURCES {
            return Err(BoardError::TooManySources(
                sources.len(),
                MAX_TRUTH_TABLE_SOURCES,
            ));
        }

        let mut rows = Vec::with_capacity(1 << sources.len());
        let mut assignment = HashMap::new();
        for r in 0..(1usize << sources.len()) {
            for (i, s) in sources.iter().enumerate() {
                assignment.insert(*s, (r >> i) & 1 == 1);
            }
            let mut row = BitVec::with_capacity(lamps.len());
            for lamp in lamps.iter() {
                let eval = Evaluator::new(board)
                    .with_assignment(&assignment)
                    .run(*lamp)?;
                row.push(eval.value);
            }
            rows.push(row);
        }

        Ok(Self {
            sources,
            lamps,
            rows,
        })
    }

    /// Returns the sources, least significant first
    pub fn sources(&self) -> &[ElementId] {
        &self.sources
    }

    /// Returns the lamps, in column order
    pub fn lamps(&self) -> &[ElementId] {
        &self.lamps
    }

    /// Returns the number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the lamp readings for the assignment encoded in `row`
    pub fn row(&self, row: usize) -> Option<&BitSlice> {
        self.rows.get(row).map(|r| r.as_bitslice())
    }

    /// Returns the lamp readings when source `i` is at `levels[i]`
    pub fn lookup(&self, levels: &[bool]) -> Option<&BitSlice> {
        if levels.len() != self.sources.len() {
            return None;
        }
        let row = levels
            .iter()
            .enumerate()
            .fold(0usize, |acc, (i, b)| acc | ((*b as usize) << i));
        self.row(row)
    }
}

impl std::fmt::Display for TruthTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names = |ids: &[ElementId]| {
            ids.iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(" ")
        };
        writeln!(f, "{} | {}", names(&self.sources), names(&self.lamps))?;
        for (r, row) in self.rows.iter().enumerate() {
            let ins: Vec<&str> = (0..self.sources.len())
                .map(|i| if (r >> i) & 1 == 1 { "1" } else { "0" })
                .collect();
            let outs: Vec<&str> = row.iter().map(|b| if *b { "1" } else { "0" }).collect();
            writeln!(f, "{} | {}", ins.join(" "), outs.join(" "))?;
        }
        Ok(())
    }
}
