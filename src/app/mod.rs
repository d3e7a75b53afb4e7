mod actions;
mod event_handler;
mod pipeline;
mod state;

pub use actions::{
    choose_file, copy_result, export_result, file_loaded_sender, remove_file, set_mode, submit,
};
pub use event_handler::handle_backend_event;
pub use state::{refresh, AppState, BackendEvent};
