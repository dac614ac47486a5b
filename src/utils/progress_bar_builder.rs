use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

pub(crate) struct ProgressBarBuilder {
    style_template: &'static str,
    message: String,
    length: Option<u64>,
    enable_tick: bool,
    visible: bool,
}

impl ProgressBarBuilder {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            style_template: "{spinner:.green} {msg}",
            message: message.into(),
            length: None,
            enable_tick: false,
            visible: true,
        }
    }

    pub(crate) fn with_template(mut self, template: &'static str) -> Self {
        self.style_template = template;
        self
    }

    pub(crate) fn with_tick(mut self) -> Self {
        self.enable_tick = true;
        self
    }

    pub(crate) fn with_length(mut self, length: u64) -> Self {
        self.length = Some(length);
        self
    }

    pub(crate) fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub(crate) fn build(self) -> Result<ProgressBar> {
        if !self.visible {
            return Ok(ProgressBar::hidden());
        }

        let pb = match self.length {
            Some(len) => ProgressBar::new(len),
            None => ProgressBar::new_spinner(),
        };

        pb.set_style(ProgressStyle::default_spinner().template(self.style_template)?);
        pb.set_message(self.message);

        if self.enable_tick {
            pb.enable_steady_tick(Duration::from_millis(120));
        }

        Ok(pb)
    }
}
