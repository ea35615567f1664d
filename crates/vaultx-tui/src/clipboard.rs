//! Clipboard access through the terminal.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::io::{self, Write};

/// Somewhere copied text can be written.
pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> io::Result<()>;
}

/// Writes the OSC 52 "set clipboard" sequence; the terminal emulator owns
/// the actual clipboard, and nothing reports back whether it accepted it.
pub struct Osc52Clipboard<W: Write> {
    out: W,
}

impl<W: Write> Osc52Clipboard<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl Osc52Clipboard<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Clipboard for Osc52Clipboard<W> {
    fn set_text(&mut self, text: &str) -> io::Result<()> {
        write!(self.out, "\x1b]52;c;{}\x07", STANDARD.encode(text))?;
        self.out.flush()
    }
}

#[cfg(test)]
pub mod testing {
    use super::Clipboard;
    use std::cell::RefCell;
    use std::io;
    use std::rc::Rc;

    /// Remembers every write; clones share the same log.
    #[derive(Clone, Default)]
    pub struct RecordingClipboard(pub Rc<RefCell<Vec<String>>>);

    impl Clipboard for RecordingClipboard {
        fn set_text(&mut self, text: &str) -> io::Result<()> {
            self.0.borrow_mut().push(text.to_string());
            Ok(())
        }
    }
}
