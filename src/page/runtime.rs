//! Event loop that connects the page controller to real fetchers.
//!
//! User events come from a line-oriented reader (stdin in the CLI); fetch
//! completions come back over a channel from spawned tasks. Every state
//! change happens on this loop, one event at a time.

use crate::error::FetchResult;
use crate::fetch::{AnalysisFetcher, VideoMetadataFetcher};
use crate::models::{AnalysisResult, VideoMetadata};
use crate::page::controller::{AnalysisPageController, Command, RequestTag};
use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::debug;

/// Something the user asked the page to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    Navigate(Option<String>),
    RequestReview,
    ToggleAspects,
    Quit,
}

impl PageEvent {
    /// Parse one line of interactive input. Unknown input yields `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_lowercase().as_str() {
            "r" | "review" => Some(PageEvent::RequestReview),
            "a" | "aspects" => Some(PageEvent::ToggleAspects),
            "q" | "quit" | "exit" => Some(PageEvent::Quit),
            "o" | "open" => Some(PageEvent::Navigate(
                (!rest.is_empty()).then(|| rest.to_string()),
            )),
            _ => None,
        }
    }
}

/// Result of a spawned fetch, tagged with the page view it belongs to.
#[derive(Debug)]
pub enum Completion {
    Metadata(RequestTag, FetchResult<VideoMetadata>),
    Analysis(RequestTag, FetchResult<AnalysisResult>),
}

pub struct PageRuntime {
    controller: AnalysisPageController,
    metadata_fetcher: VideoMetadataFetcher,
    analysis_fetcher: AnalysisFetcher,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
}

impl PageRuntime {
    pub fn new(metadata_fetcher: VideoMetadataFetcher, analysis_fetcher: AnalysisFetcher) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            controller: AnalysisPageController::new(),
            metadata_fetcher,
            analysis_fetcher,
            completions_tx,
            completions_rx,
        }
    }

    pub fn controller(&self) -> &AnalysisPageController {
        &self.controller
    }

    /// Apply a user event. Returns false when the user asked to quit.
    pub fn dispatch(&mut self, event: PageEvent) -> bool {
        debug!("Page event: {:?}", event);
        let command = match event {
            PageEvent::Navigate(segment) => self.controller.navigate(segment.as_deref()),
            PageEvent::RequestReview => self.controller.request_review(),
            PageEvent::ToggleAspects => {
                self.controller.toggle_aspects();
                None
            }
            PageEvent::Quit => return false,
        };

        if let Some(command) = command {
            self.execute(command);
        }
        true
    }

    /// Apply a completion. Returns false when it was stale and ignored.
    pub fn apply(&mut self, completion: Completion) -> bool {
        match completion {
            Completion::Metadata(tag, outcome) => self.controller.metadata_settled(&tag, outcome),
            Completion::Analysis(tag, outcome) => self.controller.analysis_settled(&tag, outcome),
        }
    }

    /// Wait until no fetch for the current page view is outstanding.
    pub async fn settle(&mut self) {
        while self.controller.has_pending() {
            match self.completions_rx.recv().await {
                Some(completion) => {
                    self.apply(completion);
                }
                None => break,
            }
        }
    }

    /// Run the interactive loop until quit or end of input, calling `render`
    /// after every change.
    pub async fn run<R, F>(&mut self, input: R, mut render: F) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        F: FnMut(&AnalysisPageController) -> Result<()>,
    {
        let mut lines = input.lines();
        let mut input_open = true;
        render(&self.controller)?;

        loop {
            tokio::select! {
                line = lines.next_line(), if input_open => {
                    match line.context("Failed to read input")? {
                        Some(line) => match PageEvent::parse(&line) {
                            Some(event) => {
                                if !self.dispatch(event) {
                                    break;
                                }
                                render(&self.controller)?;
                            }
                            None if line.trim().is_empty() => {}
                            None => eprintln!("Unknown command: {} (r, a, o <id>, q)", line.trim()),
                        },
                        None => input_open = false,
                    }
                }
                Some(completion) = self.completions_rx.recv() => {
                    if self.apply(completion) {
                        render(&self.controller)?;
                    }
                }
            }

            if !input_open && !self.controller.has_pending() {
                break;
            }
        }

        Ok(())
    }

    fn execute(&self, command: Command) {
        let tx = self.completions_tx.clone();
        match command {
            Command::FetchMetadata(tag) => {
                let fetcher = self.metadata_fetcher.clone();
                tokio::spawn(async move {
                    let outcome = fetcher.fetch(&tag.identifier).await;
                    let _ = tx.send(Completion::Metadata(tag, outcome));
                });
            }
            Command::FetchAnalysis(tag) => {
                let fetcher = self.analysis_fetcher.clone();
                tokio::spawn(async move {
                    let outcome = fetcher.fetch(&tag.identifier).await;
                    let _ = tx.send(Completion::Analysis(tag, outcome));
                });
            }
        }
    }
}
