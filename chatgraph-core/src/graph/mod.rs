mod core;
mod edges;
mod stream;

pub use core::{Graph, DEFAULT_RECURSION_LIMIT, END, START};
pub use edges::{Built, Condition, Edge, NotBuilt};
pub use stream::{RunOutcome, StateSnapshot, StreamEvent};
