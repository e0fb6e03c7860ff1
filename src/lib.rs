#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs, unreachable_pub)]
/*!

`gate-board`

The connectivity and evaluation model behind an interactive combinational
logic editor. A [board::Board] owns every element and wire; elements are AND,
OR and NOT gates, toggleable input sources, output lamps and compounds that
group other elements by reference. Lamps are evaluated on demand by pulling
values back through the wires.

*/
#![doc = "## Simple Example\n```"]
#![doc = include_str!("../demos/simple.rs")]
#![doc = "\n```"]

pub mod board;
pub mod compound;
pub mod config;
pub mod element;
pub mod error;
pub mod eval;
pub mod geometry;
pub mod graph;
pub mod pin;
pub mod util;
pub mod wire;
