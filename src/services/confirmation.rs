use std::cell::RefCell;

/// Blocking yes/no prompt supplied by whoever hosts a manager.
///
/// Destructive and monetary actions (clearing a cart, checking out,
/// deleting a row) only proceed when this returns `true`.
pub trait Confirmation {
    fn confirm(&self, prompt: &str) -> anyhow::Result<bool>;
}

/// Answers every prompt the same way and remembers what was asked.
/// Backs the `--yes` flag and non-interactive callers.
#[derive(Debug, Default)]
pub struct PresetConfirmation {
    answer: bool,
    prompts: RefCell<Vec<String>>,
}

impl PresetConfirmation {
    pub fn new(answer: bool) -> Self {
        Self {
            answer,
            prompts: RefCell::new(Vec::new()),
        }
    }

    pub fn accept() -> Self {
        Self::new(true)
    }

    pub fn decline() -> Self {
        Self::new(false)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }
}

impl Confirmation for PresetConfirmation {
    fn confirm(&self, prompt: &str) -> anyhow::Result<bool> {
        tracing::debug!("Auto-answering '{}' with {}", prompt, self.answer);
        self.prompts.borrow_mut().push(prompt.to_string());
        Ok(self.answer)
    }
}
