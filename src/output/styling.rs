use std::fmt::Display;

use console::{style, StyledObject};

// Status words in the job report.

pub fn passed(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).green().bold()
}

pub fn failed(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).red().bold()
}

/// Still running, or waiting for the next poll.
pub fn pending(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).yellow()
}

// Everything else.

pub fn emphasis(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bold()
}

pub fn heading(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bold().underlined()
}

pub fn title(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).magenta().bold()
}

pub fn muted(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).dim()
}
