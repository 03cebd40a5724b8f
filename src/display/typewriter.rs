use crate::analysis::ChunkSink;
use async_trait::async_trait;
use indicatif::ProgressBar;
use std::io::Write;
use std::time::Duration;
use tracing::warn;

/// Streams chunks to a writer one character at a time
///
/// With a zero delay every chunk is written in one go. An optional spinner is
/// cleared as soon as the first chunk arrives.
pub struct Typewriter<W: Write + Send> {
    out: W,
    delay: Duration,
    spinner: Option<ProgressBar>,
    broken: bool,
}

impl<W: Write + Send> Typewriter<W> {
    pub fn new(out: W, delay: Duration) -> Self {
        Self {
            out,
            delay,
            spinner: None,
            broken: false,
        }
    }

    /// Shows `spinner` until the first chunk is displayed
    pub fn with_spinner(mut self, spinner: ProgressBar) -> Self {
        self.spinner = Some(spinner);
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn clear_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    fn write_str(&mut self, text: &str) {
        if self.broken {
            return;
        }
        if let Err(e) = self.out.write_all(text.as_bytes()).and_then(|_| self.out.flush()) {
            // Closed pipe: keep consuming the stream so the result still gets saved
            warn!("Display output failed, continuing without it: {}", e);
            self.broken = true;
        }
    }
}

#[async_trait]
impl<W: Write + Send> ChunkSink for Typewriter<W> {
    async fn on_chunk(&mut self, chunk: &str) {
        self.clear_spinner();

        if self.delay.is_zero() {
            self.write_str(chunk);
            return;
        }

        let mut buf = [0u8; 4];
        for c in chunk.chars() {
            self.write_str(c.encode_utf8(&mut buf));
            if !self.broken {
                tokio::time::sleep(self.delay).await;
            }
        }
    }

    async fn on_finish(&mut self) {
        self.clear_spinner();
        self.write_str("\n");
    }
}
