use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::session::{Notice, PreviewStore, RecognitionMode, Session};

/// Write the raw result next to earlier exports as `<stem>-<timestamp>.<ext>`.
/// The extension follows the mode that produced the text.
pub fn export_result<P: PreviewStore>(dir: &Path, session: &Session<P>) -> Result<PathBuf, Notice> {
    let result = session.result();
    if result.is_empty() {
        return Err(Notice::warning("Nothing to export yet"));
    }

    let stem = session
        .selected()
        .and_then(|f| Path::new(&f.name).file_stem())
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("ocr");
    let mode = result.mode().unwrap_or(RecognitionMode::Markdown);
    let timestamp = Local::now().format("%Y%m%d-%H%M%S");
    let path = dir.join(format!("{stem}-{timestamp}.{}", mode.file_extension()));

    fs::create_dir_all(dir)
        .and_then(|()| fs::write(&path, result.raw()))
        .map_err(|e| Notice::error(format!("Export failed: {e}")))?;

    log::info!("Exported result to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognizer::OcrReply;
    use crate::session::upload_fixtures::{CountingPreviews, PNG};

    fn session_with(text: &str, mode: RecognitionMode) -> Session<CountingPreviews> {
        let mut session = Session::new(CountingPreviews::default(), mode);
        session.select_file("scan.page-1.png", PNG.to_vec());
        let request = session.begin_submission().unwrap();
        session.finish_submission(
            request.mode,
            Ok(OcrReply {
                result: Some(text.into()),
                file_name: None,
            }),
        );
        session
    }

    #[test]
    fn empty_result_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::new(CountingPreviews::default(), RecognitionMode::Markdown);
        assert!(export_result(&dir.path().join("out"), &session).is_err());
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn markdown_result_gets_md_extension() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let session = session_with("# Title", RecognitionMode::Markdown);

        let path = export_result(&out, &session).unwrap();
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("scan.page-1-"));
        assert!(name.ends_with(".md"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "# Title");
    }

    #[test]
    fn plain_text_result_gets_txt_extension() {
        let dir = tempfile::tempdir().unwrap();
        let session = session_with("line one", RecognitionMode::PlainText);
        let path = export_result(dir.path(), &session).unwrap();
        assert_eq!(path.extension().unwrap(), "txt");
    }

    #[test]
    fn unwritable_directory_is_an_error_notice() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();
        let session = session_with("text", RecognitionMode::Markdown);

        let notice = export_result(&blocker.join("sub"), &session).unwrap_err();
        assert_eq!(notice.level, crate::session::NoticeLevel::Error);
    }
}
