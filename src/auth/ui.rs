use ratatui::crossterm::event::{
    self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::fmt;
use std::io::{self, IsTerminal, Write};

pub const MASKED_INPUT_PROMPT: &str = "Enter your Groq API key (input hidden): ";

#[derive(Debug, Clone)]
pub struct UiError {
    message: String,
}

impl UiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for UiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for UiError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretEditOutcome {
    Continue,
    Submit(String),
    Cancelled,
}

/// Hidden single-line input: nothing typed is echoed.
#[derive(Debug, Default)]
pub struct SecretEditor {
    text: String,
}

impl SecretEditor {
    pub fn apply(&mut self, key: KeyEvent) -> SecretEditOutcome {
        if key.kind != KeyEventKind::Press {
            return SecretEditOutcome::Continue;
        }
        match key.code {
            KeyCode::Enter => SecretEditOutcome::Submit(self.text.trim().to_string()),
            KeyCode::Esc => SecretEditOutcome::Cancelled,
            KeyCode::Char('c') | KeyCode::Char('d')
                if key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                SecretEditOutcome::Cancelled
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.text.clear();
                SecretEditOutcome::Continue
            }
            KeyCode::Backspace => {
                self.text.pop();
                SecretEditOutcome::Continue
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.text.push(c);
                SecretEditOutcome::Continue
            }
            _ => SecretEditOutcome::Continue,
        }
    }

    pub fn paste(&mut self, text: &str) {
        self.text.extend(text.chars().filter(|c| !c.is_control()));
    }

    pub fn handle_event(&mut self, event: Event) -> SecretEditOutcome {
        match event {
            Event::Key(key) => self.apply(key),
            Event::Paste(text) => {
                self.paste(&text);
                SecretEditOutcome::Continue
            }
            _ => SecretEditOutcome::Continue,
        }
    }
}

/// Ask for a secret without echoing it. Returns `None` when the user
/// cancels or submits nothing.
pub fn prompt_secret(prompt: &str) -> Result<Option<String>, UiError> {
    print!("{prompt}");
    io::stdout()
        .flush()
        .map_err(|err| UiError::new(err.to_string()))?;

    let secret = if io::stdin().is_terminal() {
        read_secret_raw()?
    } else {
        let mut input = String::new();
        io::stdin()
            .read_line(&mut input)
            .map_err(|err| UiError::new(err.to_string()))?;
        Some(input.trim().to_string())
    };

    Ok(secret.filter(|value| !value.is_empty()))
}

fn read_secret_raw() -> Result<Option<String>, UiError> {
    enable_raw_mode().map_err(|err| UiError::new(err.to_string()))?;
    // Pasted keys arrive as one Event::Paste instead of a burst of key events.
    let paste_enabled = execute!(io::stdout(), EnableBracketedPaste).is_ok();

    let result = (|| -> Result<Option<String>, UiError> {
        let mut editor = SecretEditor::default();
        loop {
            let event = event::read().map_err(|err| UiError::new(err.to_string()))?;
            match editor.handle_event(event) {
                SecretEditOutcome::Continue => {}
                SecretEditOutcome::Submit(secret) => return Ok(Some(secret)),
                SecretEditOutcome::Cancelled => return Ok(None),
            }
        }
    })();

    let restore_paste = if paste_enabled {
        execute!(io::stdout(), DisableBracketedPaste)
    } else {
        Ok(())
    };
    let restore_raw = disable_raw_mode();
    println!();
    restore_paste
        .and(restore_raw)
        .map_err(|err| UiError::new(err.to_string()))?;
    result
}

pub fn prompt_confirmation(question: &str) -> Result<bool, UiError> {
    print!("{question} [y/N]: ");
    io::stdout()
        .flush()
        .map_err(|err| UiError::new(err.to_string()))?;

    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .map_err(|err| UiError::new(err.to_string()))?;
    Ok(parse_confirmation(&input))
}

pub fn parse_confirmation(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}
