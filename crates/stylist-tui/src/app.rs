//! Interactive stylist state and key handling

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use stylist_core::config::Config;
use stylist_core::error::Error;
use stylist_core::session::{
    AttemptToken, Completion, EXAMPLE_PROMPTS, LoadingCarousel, PendingAttempt, Session,
};
use stylist_core::styling::{SourceImage, StyledImage, save_styled_image};
use tracing::{debug, info, warn};

/// Which input receives typed characters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    ImagePath,
    Prompt,
}

/// Work the event loop must carry out for the app
#[derive(Debug)]
pub enum Action {
    LoadImage(PathBuf),
    Generate(PendingAttempt),
}

pub struct App {
    pub session: Session,
    pub focus: Focus,
    pub path_input: String,
    pub carousel: LoadingCarousel,
    /// Informational message, e.g. where a download went
    pub status: Option<String>,
    pub spinner_frame: usize,
    pub should_quit: bool,
    /// Decoded size of the current result
    pub result_bytes: Option<usize>,
    next_example: usize,
    max_upload_bytes: u64,
    output_dir: PathBuf,
    file_stem: String,
}

impl App {
    pub fn new(config: &Config) -> Self {
        Self {
            session: Session::new(),
            focus: Focus::ImagePath,
            path_input: String::new(),
            carousel: LoadingCarousel::new(
                Duration::from_millis(config.ui.loading_interval_ms),
                Instant::now(),
            ),
            status: None,
            spinner_frame: 0,
            should_quit: false,
            result_bytes: None,
            next_example: 0,
            max_upload_bytes: config.upload.max_bytes,
            output_dir: config.output.directory.clone(),
            file_stem: config.output.file_stem.clone(),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if ctrl => self.should_quit = true,
            KeyCode::Char('g') if ctrl => return self.start_generation(),
            KeyCode::Char('e') if ctrl => self.next_example(),
            KeyCode::Char('s') if ctrl => self.download(),
            KeyCode::Char('r') if ctrl => self.reset(),
            KeyCode::Tab | KeyCode::BackTab => self.toggle_focus(),
            KeyCode::Enter => return self.submit(),
            KeyCode::Backspace => self.edit(|text| {
                text.pop();
            }),
            KeyCode::Char(c) if !ctrl => self.edit(|text| text.push(c)),
            _ => {}
        }
        None
    }

    fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::ImagePath => Focus::Prompt,
            Focus::Prompt => Focus::ImagePath,
        };
    }

    fn submit(&mut self) -> Option<Action> {
        match self.focus {
            Focus::ImagePath => {
                let path = self.path_input.trim();
                if path.is_empty() {
                    return None;
                }
                Some(Action::LoadImage(PathBuf::from(path)))
            }
            Focus::Prompt => self.start_generation(),
        }
    }

    fn edit(&mut self, change: impl FnOnce(&mut String)) {
        match self.focus {
            Focus::ImagePath => change(&mut self.path_input),
            Focus::Prompt => {
                if self.session.is_generating() {
                    return;
                }
                let mut prompt = self.session.prompt().to_string();
                change(&mut prompt);
                let _ = self.session.set_prompt(prompt);
            }
        }
    }

    fn next_example(&mut self) {
        match self.session.choose_example(self.next_example) {
            Ok(example) => {
                debug!(example, "Example prompt chosen");
                self.next_example = (self.next_example + 1) % EXAMPLE_PROMPTS.len();
                self.focus = Focus::Prompt;
            }
            Err(Error::GenerationInProgress) => {
                self.status = Some("Wait for the current look to finish.".to_string());
            }
            Err(e) => self.session.report_error(e.to_string()),
        }
    }

    /// Read a photo from disk and make it the session's image
    pub async fn load_image(&mut self, path: &Path) {
        if self.session.is_generating() {
            self.status = Some("Wait for the current look to finish.".to_string());
            return;
        }

        let loaded = SourceImage::from_path(path, self.max_upload_bytes)
            .await
            .and_then(|image| self.session.select_image(image));
        match loaded {
            Ok(()) => {
                self.result_bytes = None;
                self.status = None;
                self.focus = Focus::Prompt;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not load image");
                self.session.report_error(e.to_string());
            }
        }
    }

    fn start_generation(&mut self) -> Option<Action> {
        match self.session.begin_generation() {
            Ok(attempt) => {
                self.carousel.restart(Instant::now());
                self.result_bytes = None;
                self.status = None;
                Some(Action::Generate(attempt))
            }
            Err(Error::GenerationInProgress) => {
                self.status = Some("Already styling, hang tight.".to_string());
                None
            }
            Err(_) => None,
        }
    }

    /// Apply a finished attempt; late results for superseded attempts are dropped
    pub fn finish_generation(
        &mut self,
        token: AttemptToken,
        result: stylist_core::Result<StyledImage>,
    ) {
        match &result {
            Err(e) if e.is_generation_failure() => {
                debug!(token = %token, error = ?e, "Attempt failed");
            }
            _ => {}
        }

        if self.session.complete(token, result) == Completion::Applied {
            self.result_bytes = self
                .session
                .result()
                .and_then(|styled| styled.decode().ok())
                .map(|bytes| bytes.len());
        }
    }

    pub fn download(&mut self) {
        if !self.session.can_download() {
            self.status = Some("Nothing to download yet.".to_string());
            return;
        }
        let Some(styled) = self.session.result() else {
            return;
        };

        match save_styled_image(styled, &self.output_dir, &self.file_stem) {
            Ok(path) => {
                info!(path = %path.display(), "Downloaded styled image");
                self.status = Some(format!("Saved to {}", path.display()));
            }
            Err(e) => self.session.report_error(e.to_string()),
        }
    }

    pub fn reset(&mut self) {
        self.session.reset();
        self.path_input.clear();
        self.focus = Focus::ImagePath;
        self.status = None;
        self.result_bytes = None;
        self.next_example = 0;
    }

    pub fn tick(&mut self, now: Instant) {
        if self.session.is_generating() {
            self.spinner_frame = self.spinner_frame.wrapping_add(1);
            self.carousel.tick(now);
        }
    }

    /// Default download name for the current result
    pub fn download_name(&self) -> Option<String> {
        self.session
            .result()
            .map(|styled| styled.file_name(&self.file_stem))
    }
}
