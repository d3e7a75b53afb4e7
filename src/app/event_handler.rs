use std::cell::RefCell;
use std::rc::Rc;

use super::state::{notify, refresh, AppState, BackendEvent};
use crate::session::Notice;

/// Handle a backend event. This is the core state machine.
pub fn handle_backend_event(state: &Rc<RefCell<AppState>>, event: BackendEvent) {
    match event {
        BackendEvent::FileLoaded { name, content } => {
            let rejected = state.borrow_mut().session.select_file(&name, content);
            if let Some(notice) = rejected {
                notify(state, &notice);
            }
        }
        BackendEvent::FileLoadFailed(message) => {
            notify(state, &Notice::error(message));
        }
        BackendEvent::RecognitionFinished { mode, outcome } => {
            let notice = state.borrow_mut().session.finish_submission(mode, outcome);
            if let Some(ref win) = state.borrow().window {
                crate::ui::window::show_notice(win, &notice);
            }
        }
    }
    refresh(state);
}
