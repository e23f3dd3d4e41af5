//! Choosing a model to score with

use std::io::{self, BufRead, Write};
use textcat_core::StoredModel;

/// Prompt shown by [`PromptSelector`]
pub const SELECTION_PROMPT: &str = "Select a model by number: ";

/// Picks one of the listed models; `None` means the choice was invalid
pub trait ModelSelector {
    /// Return a 0-based index into `models`
    fn select(&mut self, models: &[StoredModel]) -> Option<usize>;
}

impl<F> ModelSelector for F
where
    F: FnMut(&[StoredModel]) -> Option<usize>,
{
    fn select(&mut self, models: &[StoredModel]) -> Option<usize> {
        self(models)
    }
}

/// Turn a 1-based answer into a 0-based index within `count` entries
pub fn parse_selection(input: &str, count: usize) -> Option<usize> {
    let number: usize = input.trim().parse().ok()?;
    (1..=count).contains(&number).then(|| number - 1)
}

/// Asks on a terminal-like reader/writer pair
pub struct PromptSelector<R, W> {
    input: R,
    output: W,
}

impl PromptSelector<io::StdinLock<'static>, io::Stdout> {
    pub fn stdin() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> PromptSelector<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> ModelSelector for PromptSelector<R, W> {
    fn select(&mut self, models: &[StoredModel]) -> Option<usize> {
        write!(self.output, "{SELECTION_PROMPT}").ok()?;
        self.output.flush().ok()?;

        let mut answer = String::new();
        self.input.read_line(&mut answer).ok()?;
        parse_selection(&answer, models.len())
    }
}
