//! Prompt collaborator for the interactive ceremony.
//!
//! The controller and builder only talk to the [`Prompt`] trait, so tests
//! (and unattended runs) can drive a full ceremony with scripted answers
//! instead of a terminal.

use std::collections::VecDeque;
use std::io;

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Password};

use crate::error::Result;

/// Interactive input source for the ceremony.
pub trait Prompt {
    /// Ask a yes/no question; `default` is used on an empty answer.
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool>;

    /// Ask for a line of text; `default` is used on an empty answer.
    fn input(&mut self, message: &str, default: Option<&str>) -> Result<String>;

    /// Ask for a secret; the answer is never echoed.
    fn password(&mut self, message: &str) -> Result<String>;
}

/// Terminal prompt backed by dialoguer.
#[derive(Default)]
pub struct TermPrompt {
    theme: ColorfulTheme,
}

impl Prompt for TermPrompt {
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool> {
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt(message)
            .default(default)
            .show_default(true)
            .wait_for_newline(true)
            .interact()?)
    }

    fn input(&mut self, message: &str, default: Option<&str>) -> Result<String> {
        let mut input = Input::<String>::with_theme(&self.theme).with_prompt(message);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        Ok(input.interact_text()?)
    }

    fn password(&mut self, message: &str) -> Result<String> {
        Ok(Password::with_theme(&self.theme)
            .with_prompt(message)
            .interact()?)
    }
}

/// Deterministic prompt answering from a fixed script, one line per ask.
///
/// Empty lines take the prompt's default. Used by the test suite and
/// suitable for driving rehearsal runs from a prepared answer file.
pub struct ScriptedPrompt {
    answers: VecDeque<String>,
}

impl ScriptedPrompt {
    /// Build a prompt from scripted answer lines.
    #[must_use]
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: lines.into_iter().map(Into::into).collect(),
        }
    }

    fn next(&mut self, message: &str) -> Result<String> {
        self.answers.pop_front().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("no scripted answer left for prompt: {message}"),
            )
            .into()
        })
    }
}

impl Prompt for ScriptedPrompt {
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool> {
        let answer = self.next(message)?;
        Ok(match answer.trim() {
            "" => default,
            "y" | "Y" | "yes" => true,
            _ => false,
        })
    }

    fn input(&mut self, message: &str, default: Option<&str>) -> Result<String> {
        let answer = self.next(message)?;
        if answer.trim().is_empty() {
            if let Some(default) = default {
                return Ok(default.to_string());
            }
        }
        Ok(answer)
    }

    fn password(&mut self, message: &str) -> Result<String> {
        self.next(message)
    }
}
