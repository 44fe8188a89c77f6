use std::fmt::Debug;

/// State carried through a graph.
///
/// Nodes either hand back a whole new state or a list of `Update`s. Each
/// update is folded in with `apply`, which is where field reducers live
/// (replace, append, id-aware message merging, ...). `#[derive(State)]`
/// generates the update enum and this impl.
pub trait GraphState: Debug + Clone + Send + Sync + 'static {
    type Update: Debug + Clone + Send + Sync;

    /// Update this state with a single update.
    fn apply(&mut self, update: Self::Update);

    /// Apply multiple updates in sequence.
    fn apply_many<I: IntoIterator<Item = Self::Update>>(&mut self, updates: I) {
        for update in updates {
            self.apply(update);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::State;

    #[derive(State, Debug, Clone, Default, PartialEq)]
    struct CounterState {
        count: i32,
        #[update(append)]
        history: Vec<String>,
    }

    #[test]
    fn test_apply_many_runs_reducers_in_order() {
        use super::GraphState;

        let mut state = CounterState::default();
        state.apply_many(vec![
            CounterStateUpdate::Count(3),
            CounterStateUpdate::History(vec!["a".into()]),
            CounterStateUpdate::Count(5),
            CounterStateUpdate::History(vec!["b".into(), "c".into()]),
        ]);

        assert_eq!(state.count, 5);
        assert_eq!(state.history, vec!["a", "b", "c"]);
    }
}
