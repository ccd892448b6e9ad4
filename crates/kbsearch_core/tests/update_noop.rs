use kbsearch_core::{update, Msg, SessionState};

#[test]
fn update_is_noop() {
    let state = SessionState::new();
    let (next, effects) = update(state.clone(), Msg::NoOp);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}
