use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use crate::config::Config;
use crate::recognizer::{HttpRecognizer, OcrError, OcrReply};
use crate::session::{Notice, RecognitionMode, Session};
use crate::ui::previews::TexturePreviews;
use crate::ui::window::{self, MainWindow};

/// Events delivered to the GTK main thread from dialogs and worker tasks.
#[derive(Debug)]
pub enum BackendEvent {
    FileLoaded { name: String, content: Vec<u8> },
    FileLoadFailed(String),
    RecognitionFinished {
        mode: RecognitionMode,
        outcome: Result<OcrReply, OcrError>,
    },
}

/// Central application state. Lives on the GTK main thread inside Rc<RefCell<>>.
pub struct AppState {
    pub config: Config,
    pub session: Session<TexturePreviews>,
    pub recognizer: Arc<HttpRecognizer>,
    pub tokio_rt: tokio::runtime::Runtime,
    pub backend_sender: async_channel::Sender<BackendEvent>,

    // UI handles
    pub window: Option<MainWindow>,
}

impl AppState {
    pub fn new(
        config: Config,
        sender: async_channel::Sender<BackendEvent>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let recognizer = HttpRecognizer::new(config.endpoint.clone(), config.request_timeout())?;
        let tokio_rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;
        let session = Session::new(TexturePreviews::default(), config.default_mode);

        Ok(Self {
            config,
            session,
            recognizer: Arc::new(recognizer),
            tokio_rt,
            backend_sender: sender,
            window: None,
        })
    }
}

/// Re-render the window from the session.
pub fn refresh(state: &Rc<RefCell<AppState>>) {
    let s = state.borrow();
    if let Some(ref win) = s.window {
        window::sync(win, &s.session);
    }
}

/// Log a notice and show it as a toast.
pub fn notify(state: &Rc<RefCell<AppState>>, notice: &Notice) {
    notice.log();
    if let Some(ref win) = state.borrow().window {
        window::show_notice(win, notice);
    }
}
