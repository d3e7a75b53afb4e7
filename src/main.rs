mod app;
mod clipboard;
mod config;
mod export;
mod recognizer;
mod render;
mod session;
mod ui;

use std::cell::RefCell;
use std::rc::Rc;

use gtk4::prelude::*;

use app::{AppState, BackendEvent};
use config::Config;
use session::RecognitionMode;

fn main() {
    env_logger::init();
    log::info!("OCR Desk starting");

    let application = libadwaita::Application::builder()
        .application_id("io.github.ocrdesk.OcrDesk")
        .build();

    application.connect_activate(on_activate);
    application.run();
}

fn on_activate(app: &libadwaita::Application) {
    // Re-activation from a second launch just raises the existing window
    if let Some(window) = app.active_window() {
        window.present();
        return;
    }

    // Create async channel for dialog/worker → UI communication
    let (backend_tx, backend_rx) = async_channel::unbounded::<BackendEvent>();

    let config = Config::load();
    log::info!("Recognition endpoint: {}", config.endpoint);

    let state = match AppState::new(config, backend_tx) {
        Ok(state) => Rc::new(RefCell::new(state)),
        Err(e) => {
            log::error!("Failed to initialise: {e}");
            app.quit();
            return;
        }
    };

    // Build UI
    let main_window = {
        let s = state.borrow();
        ui::window::build_window(app, s.recognizer.endpoint(), s.session.mode())
    };

    // Wire up the mode toggles
    for (toggle, mode) in [
        (&main_window.markdown_toggle, RecognitionMode::Markdown),
        (&main_window.plain_toggle, RecognitionMode::PlainText),
    ] {
        let state_clone = state.clone();
        toggle.connect_toggled(move |button| {
            if button.is_active() {
                app::set_mode(&state_clone, mode);
            }
        });
    }

    // Wire up the upload controls
    {
        let state_clone = state.clone();
        main_window.choose_button.connect_clicked(move |_| {
            app::choose_file(&state_clone);
        });
    }
    {
        let state_clone = state.clone();
        main_window.remove_button.connect_clicked(move |_| {
            app::remove_file(&state_clone);
        });
    }
    ui::file_dialog::accept_drops(&main_window.drop_area, app::file_loaded_sender(&state));

    // Wire up submission and result actions
    {
        let state_clone = state.clone();
        main_window.submit_button.connect_clicked(move |_| {
            app::submit(&state_clone);
        });
    }
    {
        let state_clone = state.clone();
        main_window.copy_button.connect_clicked(move |_| {
            app::copy_result(&state_clone);
        });
    }
    {
        let state_clone = state.clone();
        main_window.export_button.connect_clicked(move |_| {
            app::export_result(&state_clone);
        });
    }

    // Store UI handles in state and show the window
    let window = main_window.window.clone();
    state.borrow_mut().window = Some(main_window);
    app::refresh(&state);
    window.present();

    // Attach backend event handler
    {
        let state_clone = state.clone();
        gtk4::glib::spawn_future_local(async move {
            while let Ok(event) = backend_rx.recv().await {
                app::handle_backend_event(&state_clone, event);
            }
        });
    }
}
