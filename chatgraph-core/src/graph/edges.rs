use std::fmt;
use std::sync::Arc;

/// Routing function for a conditional edge. It returns the name of the next
/// node, or `END`.
pub type Condition<S> = Arc<dyn Fn(&S) -> String + Send + Sync>;

/// Where a run goes after a node finishes without a `Command`.
#[derive(Clone)]
pub enum Edge<S> {
    Direct(String),
    Conditional(Condition<S>),
}

impl<S> Edge<S> {
    /// The next node for `state`.
    pub fn resolve(&self, state: &S) -> String {
        match self {
            Edge::Direct(to) => to.clone(),
            Edge::Conditional(route) => route(state),
        }
    }

    /// The target, when it is known without a state.
    pub fn fixed_target(&self) -> Option<&str> {
        match self {
            Edge::Direct(to) => Some(to),
            Edge::Conditional(_) => None,
        }
    }
}

impl<S> fmt::Debug for Edge<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.fixed_target() {
            Some(to) => write!(f, "-> {to}"),
            None => f.write_str("-> <conditional>"),
        }
    }
}

/// Typestate: nodes and edges may still be added.
#[derive(Debug)]
pub struct NotBuilt;

/// Typestate: validated and runnable.
#[derive(Debug)]
pub struct Built;
