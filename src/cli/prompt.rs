use dialoguer::{theme::ColorfulTheme, Confirm};

use crate::services::Confirmation;

/// Confirmation backed by an interactive terminal prompt. Defaults to "no".
#[derive(Default)]
pub struct TerminalConfirmation {
    theme: ColorfulTheme,
}

impl TerminalConfirmation {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Confirmation for TerminalConfirmation {
    fn confirm(&self, prompt: &str) -> anyhow::Result<bool> {
        let answer = Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(false)
            .interact()?;
        Ok(answer)
    }
}
