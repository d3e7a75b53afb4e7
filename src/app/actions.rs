use std::cell::RefCell;
use std::rc::Rc;

use super::pipeline::dispatch_recognition;
use super::state::{notify, refresh, AppState, BackendEvent};
use crate::clipboard::SystemClipboard;
use crate::session::{Notice, RecognitionMode};
use crate::ui::file_dialog::LoadedFile;

/// Forward a loaded (or failed) file to the event loop.
pub fn file_loaded_sender(state: &Rc<RefCell<AppState>>) -> impl Fn(LoadedFile) + Clone + 'static {
    let sender = state.borrow().backend_sender.clone();
    move |loaded| {
        let event = match loaded {
            Ok((name, content)) => BackendEvent::FileLoaded { name, content },
            Err(message) => BackendEvent::FileLoadFailed(message),
        };
        let _ = sender.try_send(event);
    }
}

pub fn choose_file(state: &Rc<RefCell<AppState>>) {
    let parent = match state.borrow().window {
        Some(ref win) => win.window.clone(),
        None => return,
    };
    crate::ui::file_dialog::choose_image(&parent, file_loaded_sender(state));
}

pub fn remove_file(state: &Rc<RefCell<AppState>>) {
    state.borrow_mut().session.remove_file();
    refresh(state);
}

pub fn set_mode(state: &Rc<RefCell<AppState>>, mode: RecognitionMode) {
    {
        let mut s = state.borrow_mut();
        s.session.set_mode(mode);
        if s.config.default_mode != mode {
            s.config.default_mode = mode;
            if let Err(e) = s.config.save() {
                log::warn!("Failed to save config: {e}");
            }
        }
    }
    refresh(state);
}

pub fn submit(state: &Rc<RefCell<AppState>>) {
    let begun = state.borrow_mut().session.begin_submission();
    match begun {
        Ok(request) => dispatch_recognition(state, request),
        Err(notice) => notify(state, &notice),
    }
    refresh(state);
}

pub fn copy_result(state: &Rc<RefCell<AppState>>) {
    let notice = state.borrow().session.copy_result(&SystemClipboard);
    if let Some(notice) = notice {
        notify(state, &notice);
    }
}

pub fn export_result(state: &Rc<RefCell<AppState>>) {
    let notice = {
        let s = state.borrow();
        match crate::export::export_result(&s.config.output_dir, &s.session) {
            Ok(path) => Notice::success(format!("Saved to {}", path.display())),
            Err(notice) => notice,
        }
    };
    notify(state, &notice);
}
