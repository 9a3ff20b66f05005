//! Terminal implementation of the login prompter.
//!
//! Email and password found ahead of time (env, config, keyring) answer
//! the first round of prompts; a retry always asks interactively.

use dialoguer::Input;
use nestly_core::Prompter;
use secrecy::{ExposeSecret, SecretString};

#[derive(Default)]
pub struct TerminalPrompter {
    preset_email: Option<String>,
    preset_password: Option<SecretString>,
    last_email: Option<String>,
}

impl TerminalPrompter {
    /// A preset email only answers without asking when a password is
    /// preset too; otherwise it becomes the prompt default.
    pub fn new(email: Option<String>, password: Option<SecretString>) -> Self {
        let preset_email = email.clone().filter(|_| password.is_some());
        Self {
            preset_email,
            preset_password: password,
            last_email: email,
        }
    }

    fn ask_email(&mut self, prompt: &str) -> Option<String> {
        if let Some(preset) = self.preset_email.take() {
            return Some(preset);
        }
        let mut input = Input::<String>::new().with_prompt(prompt);
        if let Some(ref email) = self.last_email {
            input = input.default(email.clone());
        }
        let value = input.interact_text().ok()?;
        self.last_email = Some(value.clone());
        Some(value).filter(|v| !v.trim().is_empty())
    }

    fn ask_password(&mut self, prompt: &str) -> Option<String> {
        if let Some(preset) = self.preset_password.take() {
            return Some(preset.expose_secret().to_owned());
        }
        let value = rpassword::prompt_password(format!("{prompt}: ")).ok()?;
        Some(value).filter(|v| !v.is_empty())
    }
}

impl Prompter for TerminalPrompter {
    fn request_credentials(&mut self, _title: &str, prompt: &str, hidden: bool) -> Option<String> {
        if hidden {
            self.ask_password(prompt)
        } else {
            self.ask_email(prompt)
        }
    }

    fn show_message(&mut self, title: &str, body: &str) {
        eprintln!("{title}\n{body}\n");
    }
}
