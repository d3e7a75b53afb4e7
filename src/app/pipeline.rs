use std::cell::RefCell;
use std::rc::Rc;

use super::state::{AppState, BackendEvent};
use crate::recognizer::{OcrError, OcrRequest, RecognitionBackend};

/// Run the upload on the tokio runtime and post the outcome back to the
/// main thread. A panicking request still produces an outcome, so the
/// in-flight flag is always lowered.
pub fn dispatch_recognition(state: &Rc<RefCell<AppState>>, request: OcrRequest) {
    let s = state.borrow();
    let recognizer = s.recognizer.clone();
    let sender = s.backend_sender.clone();
    let mode = request.mode;

    s.tokio_rt.spawn(async move {
        let result = tokio::spawn(async move { recognizer.recognize(request).await }).await;

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => Err(OcrError::Task(e.to_string())),
        };
        let _ = sender
            .send(BackendEvent::RecognitionFinished { mode, outcome })
            .await;
    });
}
