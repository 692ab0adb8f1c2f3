//! Terminal prompts: plain lines from stdin, secrets in raw mode.

use std::io::{self, BufRead, StdinLock, Write};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode},
};

use rxbatch_contracts::error::{RxError, RxResult};
use rxbatch_core::traits::Prompter;

/// Exit status after Ctrl+C at a secret prompt.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// The operator's terminal. Opened once per run and closed with `close()`.
pub struct Console {
    input: Option<StdinLock<'static>>,
}

impl Console {
    pub fn open() -> Self {
        Self {
            input: Some(io::stdin().lock()),
        }
    }

    /// Release stdin. Later reads fail with `InputError`.
    pub fn close(&mut self) {
        self.input = None;
    }

    fn input(&mut self) -> RxResult<&mut StdinLock<'static>> {
        self.input.as_mut().ok_or_else(|| input_error("console already closed"))
    }
}

fn input_error(reason: impl Into<String>) -> RxError {
    RxError::InputError {
        reason: reason.into(),
    }
}

fn show_prompt(prompt: &str) -> RxResult<()> {
    let mut out = io::stdout();
    write!(out, "{}", prompt)
        .and_then(|()| out.flush())
        .map_err(|e| input_error(format!("cannot write prompt: {}", e)))
}

impl Prompter for Console {
    fn read_line(&mut self, prompt: &str) -> RxResult<String> {
        show_prompt(prompt)?;
        let mut line = String::new();
        let read = self
            .input()?
            .read_line(&mut line)
            .map_err(|e| input_error(format!("cannot read from stdin: {}", e)))?;
        if read == 0 {
            return Err(input_error("stdin closed"));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Read a line in raw mode, echoing `*` for every character.
    ///
    /// Ctrl+C restores the terminal and ends the process with exit code 130.
    fn read_secret(&mut self, prompt: &str) -> RxResult<String> {
        // Holding stdin keeps the raw-mode reader the only consumer.
        self.input()?;
        show_prompt(prompt)?;

        let mut secret = String::new();
        let interrupted = {
            let _raw = RawModeGuard::enable()?;
            loop {
                let key = match event::read() {
                    Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => key,
                    Ok(_) => continue,
                    Err(e) => return Err(input_error(format!("cannot read key: {}", e))),
                };
                match apply_key(&mut secret, key) {
                    SecretKey::Typed => echo("*"),
                    SecretKey::Erased => echo("\u{8} \u{8}"),
                    SecretKey::Ignored => {}
                    SecretKey::Submitted => break false,
                    SecretKey::Interrupted => break true,
                }
            }
        };
        echo("\r\n");

        if interrupted {
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
        Ok(secret)
    }
}

fn echo(text: &str) {
    let mut out = io::stdout();
    // Echo is cosmetic; a broken stdout must not lose the keystroke.
    let _ = write!(out, "{}", text).and_then(|()| out.flush());
}

/// Disables raw mode when dropped.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> RxResult<Self> {
        enable_raw_mode().map_err(|e| input_error(format!("cannot enter raw mode: {}", e)))?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SecretKey {
    Typed,
    Erased,
    Ignored,
    Submitted,
    Interrupted,
}

/// Apply one key press to the secret being typed.
fn apply_key(secret: &mut String, key: KeyEvent) -> SecretKey {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            SecretKey::Interrupted
        }
        KeyCode::Enter => SecretKey::Submitted,
        KeyCode::Backspace => match secret.pop() {
            Some(_) => SecretKey::Erased,
            None => SecretKey::Ignored,
        },
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            secret.push(c);
            SecretKey::Typed
        }
        _ => SecretKey::Ignored,
    }
}
