/*!

  Tunables of a board.

*/

use crate::pin::DEFAULT_SNAP_RADIUS;

/// Default tolerance for picking wires with the pointer
pub const DEFAULT_PICK_TOLERANCE: i32 = 6;

/// Default recursion bound for a single evaluation
pub const DEFAULT_MAX_EVAL_DEPTH: usize = 1024;

/// Board configuration. Start from [Default] and adjust with the `with_*`
/// builders.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BoardConfig {
    /// Snap radius given to every new pin
    pub snap_radius: i32,
    /// Tolerance used when picking wires with the pointer
    pub wire_tolerance: i32,
    /// Deepest chain of elements a single evaluation may walk
    pub max_eval_depth: usize,
    /// Reject connections that would close a combinational loop
    pub reject_loops: bool,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            snap_radius: DEFAULT_SNAP_RADIUS,
            wire_tolerance: DEFAULT_PICK_TOLERANCE,
            max_eval_depth: DEFAULT_MAX_EVAL_DEPTH,
            reject_loops: true,
        }
    }
}

impl BoardConfig {
    /// Sets the pin snap radius
    pub fn with_snap_radius(mut self, r: i32) -> Self {
        self.snap_radius = r;
        self
    }

    /// Sets the wire picking tolerance
    pub fn with_wire_tolerance(mut self, tol: i32) -> Self {
        self.wire_tolerance = tol;
        self
    }

    /// Sets the evaluation depth limit
    pub fn with_max_eval_depth(mut self, depth: usize) -> Self {
        self.max_eval_depth = depth;
        self
    }

    /// Turns connect-time loop rejection on or off
    pub fn with_reject_loops(mut self, reject: bool) -> Self {
        self.reject_loops = reject;
        self
    }
}
