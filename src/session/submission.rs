use crate::recognizer::{OcrError, OcrReply, OcrRequest, RecognitionBackend};

use super::notice::Notice;
use super::upload::PreviewStore;
use super::{RecognitionMode, Session};

impl<P: PreviewStore> Session<P> {
    /// Check the precondition, raise the in-flight flag and build the upload.
    /// Every `Ok` must be paired with one [`Session::finish_submission`].
    pub fn begin_submission(&mut self) -> Result<OcrRequest, Notice> {
        let file = self
            .selected()
            .ok_or_else(|| Notice::warning("Please select an image first"))?;
        let request = OcrRequest {
            file_name: file.name.clone(),
            content: file.content.clone(),
            mime: file.mime,
            mode: self.mode,
        };
        self.pending += 1;
        Ok(request)
    }

    /// Apply the outcome of a submission started in `mode` and lower the
    /// in-flight flag. The result is only replaced on a non-blank reply.
    pub fn finish_submission(
        &mut self,
        mode: RecognitionMode,
        outcome: Result<OcrReply, OcrError>,
    ) -> Notice {
        self.pending = self.pending.saturating_sub(1);

        let notice = match outcome {
            Ok(OcrReply {
                result: Some(text),
                file_name,
            }) if !text.trim().is_empty() => {
                log::info!(
                    "Recognized {} characters from {}",
                    text.chars().count(),
                    file_name.as_deref().unwrap_or("upload")
                );
                self.result.replace(text, mode);
                Notice::success("Recognition complete")
            }
            Ok(_) => Notice::warning("No text was recognized"),
            Err(OcrError::Server { status, message }) => {
                log::error!("OCR server replied with HTTP {status}");
                Notice::error(format!("Recognition failed: {message}"))
            }
            Err(e) => Notice::error(format!("Recognition failed: {e}")),
        };
        notice.log();
        notice
    }

    /// Run one submission to completion against `backend`.
    pub async fn submit<B>(&mut self, backend: &B) -> Notice
    where
        B: RecognitionBackend + ?Sized,
    {
        let request = match self.begin_submission() {
            Ok(request) => request,
            Err(notice) => return notice,
        };
        let mode = request.mode;
        let outcome = backend.recognize(request).await;
        self.finish_submission(mode, outcome)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::super::upload::tests::{CountingPreviews, PNG};
    use super::super::NoticeLevel;
    use super::*;
    use crate::render::{render, Block, BlockKind};

    /// Records requests and answers from a script.
    #[derive(Default)]
    struct ScriptedBackend {
        replies: Mutex<VecDeque<Result<OcrReply, OcrError>>>,
        requests: Mutex<Vec<OcrRequest>>,
    }

    impl ScriptedBackend {
        fn answering(replies: Vec<Result<OcrReply, OcrError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::default(),
            }
        }

        fn requests(&self) -> Vec<OcrRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RecognitionBackend for ScriptedBackend {
        async fn recognize(&self, request: OcrRequest) -> Result<OcrReply, OcrError> {
            self.requests.lock().unwrap().push(request);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(OcrError::Task("no scripted reply".into())))
        }
    }

    fn text(result: &str) -> Result<OcrReply, OcrError> {
        Ok(OcrReply {
            result: Some(result.to_string()),
            file_name: None,
        })
    }

    fn session_with_photo() -> Session<CountingPreviews> {
        let mut session = Session::new(CountingPreviews::default(), RecognitionMode::Markdown);
        assert!(session.select_file("photo.png", PNG.to_vec()).is_none());
        session
    }

    #[tokio::test]
    async fn submit_without_file_sends_nothing() {
        let mut session = Session::new(CountingPreviews::default(), RecognitionMode::Markdown);
        let backend = ScriptedBackend::answering(vec![text("unused")]);

        let notice = session.submit(&backend).await;
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert!(backend.requests().is_empty());
        assert!(session.result().is_empty());
        assert!(!session.is_in_flight());
    }

    #[tokio::test]
    async fn markdown_result_is_rendered() {
        let mut session = session_with_photo();
        let backend = ScriptedBackend::answering(vec![text("# Title\n\nBody")]);

        let notice = session.submit(&backend).await;
        assert_eq!(notice.level, NoticeLevel::Success);
        assert_eq!(session.result().raw(), "# Title\n\nBody");
        assert_eq!(
            session.result().rendered(),
            &[
                Block {
                    kind: BlockKind::Heading(1),
                    markup: "Title".into()
                },
                Block {
                    kind: BlockKind::Paragraph,
                    markup: "Body".into()
                },
            ]
        );

        let requests = backend.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].file_name, "photo.png");
        assert_eq!(requests[0].mime, "image/png");
        assert_eq!(requests[0].content, PNG);
        assert_eq!(requests[0].mode, RecognitionMode::Markdown);
    }

    #[tokio::test]
    async fn rendered_view_depends_only_on_raw_text() {
        let mut session = session_with_photo();
        let backend = ScriptedBackend::answering(vec![text("abc")]);
        session.submit(&backend).await;
        assert_eq!(session.result().raw(), "abc");
        assert_eq!(session.result().rendered(), render("abc").as_slice());
    }

    #[tokio::test]
    async fn missing_result_keeps_previous_text() {
        let mut session = session_with_photo();
        let backend = ScriptedBackend::answering(vec![
            text("first"),
            Ok(OcrReply::default()),
            Ok(OcrReply {
                result: Some("  \n".into()),
                file_name: Some("photo.png".into()),
            }),
        ]);

        session.submit(&backend).await;
        let before = session.result().clone();

        for _ in 0..2 {
            let notice = session.submit(&backend).await;
            assert_eq!(notice.level, NoticeLevel::Warning);
            assert_eq!(session.result(), &before);
        }
        assert!(!session.is_in_flight());
    }

    #[tokio::test]
    async fn failure_clears_in_flight_and_keeps_result() {
        let mut session = session_with_photo();
        let backend = ScriptedBackend::answering(vec![
            text("kept"),
            Err(OcrError::from_response(
                503,
                r#"{"detail": "Model not loaded properly."}"#,
            )),
            Err(OcrError::Task("worker panicked".into())),
        ]);
        session.submit(&backend).await;

        let notice = session.submit(&backend).await;
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.message, "Recognition failed: Model not loaded properly.");
        assert_eq!(session.result().raw(), "kept");
        assert!(!session.is_in_flight());

        let notice = session.submit(&backend).await;
        assert_eq!(notice.level, NoticeLevel::Error);
        assert!(notice.message.contains("worker panicked"));
        assert_eq!(session.result().raw(), "kept");
    }

    #[test]
    fn in_flight_spans_begin_to_finish() {
        let mut session = session_with_photo();
        assert!(!session.is_in_flight());

        let first = session.begin_submission().unwrap();
        let second = session.begin_submission().unwrap();
        assert!(session.is_in_flight());

        session.finish_submission(first.mode, Err(OcrError::Task("boom".into())));
        assert!(session.is_in_flight());
        session.finish_submission(second.mode, text("done"));
        assert!(!session.is_in_flight());
        assert_eq!(session.result().raw(), "done");
    }

    #[tokio::test]
    async fn mode_change_only_changes_mode_field() {
        let mut session = session_with_photo();
        let backend = ScriptedBackend::answering(vec![text("# md"), text("plain")]);

        session.submit(&backend).await;
        session.set_mode(RecognitionMode::PlainText);
        session.submit(&backend).await;

        let requests = backend.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].mode, RecognitionMode::Markdown);
        assert_eq!(requests[1].mode, RecognitionMode::PlainText);
        let mut normalized = requests[1].clone();
        normalized.mode = requests[0].mode;
        assert_eq!(normalized, requests[0]);
        assert_eq!(session.result().mode(), Some(RecognitionMode::PlainText));
    }
}
