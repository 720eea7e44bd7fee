//! Copying activation codes to a clipboard.
//!
//! Two strategies are tried in order:
//!
//! 1. [`SystemClipboard`] - the desktop clipboard via `arboard`
//!    (requires the `clipboard` feature and a display server).
//! 2. [`TerminalClipboard`] - an OSC 52 escape sequence written to the
//!    terminal, which most modern terminal emulators turn into a clipboard
//!    write. This works over SSH where there is no local clipboard.
//!
//! Both report through the same [`CopyOutcome`], so callers only render one
//! status line.

use std::io::Write;
#[cfg(all(feature = "clipboard", target_os = "linux"))]
use std::time::Instant;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;

use crate::config::ClipboardConfig;
use crate::errors::ClipboardError;

/// A strategy that can place text on some clipboard.
pub trait ClipboardWriter: Send {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// Desktop clipboard through `arboard`.
///
/// On Linux the selection is owned by this process and vanishes when it
/// exits, so the write blocks until a clipboard manager (or another
/// application) takes ownership, or until `hold` runs out.
#[derive(Debug, Clone)]
pub struct SystemClipboard {
    hold: Duration,
}

impl SystemClipboard {
    pub fn new(hold: Duration) -> Self {
        Self { hold }
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_HOLD_SECS))
    }
}

/// Default time a Linux clipboard write is held open.
pub const DEFAULT_HOLD_SECS: u64 = 5;

/// Whether a display server is reachable, judged from `DISPLAY` and
/// `WAYLAND_DISPLAY`. Empty values count as unset.
pub fn display_available(display: Option<&str>, wayland_display: Option<&str>) -> bool {
    [display, wayland_display]
        .into_iter()
        .any(|v| v.is_some_and(|s| !s.is_empty()))
}

impl ClipboardWriter for SystemClipboard {
    fn name(&self) -> &'static str {
        "system"
    }

    #[cfg(feature = "clipboard")]
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        #[cfg(target_os = "linux")]
        {
            let display = std::env::var("DISPLAY").ok();
            let wayland = std::env::var("WAYLAND_DISPLAY").ok();
            if !display_available(display.as_deref(), wayland.as_deref()) {
                return Err(ClipboardError::Unavailable(
                    "no display server (DISPLAY and WAYLAND_DISPLAY unset)".to_string(),
                ));
            }
        }

        let mut clipboard = arboard::Clipboard::new()
            .map_err(|e| ClipboardError::Unavailable(format!("failed to open clipboard: {e}")))?;

        #[cfg(target_os = "linux")]
        {
            use arboard::SetExtLinux;
            clipboard
                .set()
                .wait_until(Instant::now() + self.hold)
                .text(text)
                .map_err(|e| ClipboardError::WriteFailed(format!("failed to set clipboard: {e}")))
        }

        #[cfg(not(target_os = "linux"))]
        {
            clipboard
                .set_text(text)
                .map_err(|e| ClipboardError::WriteFailed(format!("failed to set clipboard: {e}")))
        }
    }

    #[cfg(not(feature = "clipboard"))]
    fn write_text(&mut self, _text: &str) -> Result<(), ClipboardError> {
        Err(ClipboardError::Unavailable(
            "built without the `clipboard` feature".to_string(),
        ))
    }
}

/// OSC 52 clipboard write to a terminal stream.
pub struct TerminalClipboard<W: Write + Send> {
    out: W,
}

impl<W: Write + Send> TerminalClipboard<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl TerminalClipboard<std::io::Stderr> {
    /// Writes to stderr so the sequence does not end up in piped stdout.
    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }
}

/// Encode `text` as an OSC 52 "set clipboard" sequence.
pub fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", B64.encode(text.as_bytes()))
}

impl<W: Write + Send> ClipboardWriter for TerminalClipboard<W> {
    fn name(&self) -> &'static str {
        "osc52"
    }

    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.out.write_all(osc52_sequence(text).as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

/// Result of a copy attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    /// The primary strategy succeeded
    Primary,
    /// The primary strategy failed or was disabled, the fallback succeeded
    Fallback,
    /// Nothing was copied
    Failed(String),
}

impl CopyOutcome {
    pub fn is_copied(&self) -> bool {
        !matches!(self, CopyOutcome::Failed(_))
    }
}

/// Ordered primary and fallback strategies.
#[derive(Default)]
pub struct ClipboardChain {
    primary: Option<Box<dyn ClipboardWriter>>,
    fallback: Option<Box<dyn ClipboardWriter>>,
}

impl ClipboardChain {
    pub fn new(
        primary: Option<Box<dyn ClipboardWriter>>,
        fallback: Option<Box<dyn ClipboardWriter>>,
    ) -> Self {
        Self { primary, fallback }
    }

    /// Build the chain described by the clipboard configuration.
    pub fn from_config(config: &ClipboardConfig) -> Self {
        let primary: Option<Box<dyn ClipboardWriter>> = if config.enabled {
            Some(Box::new(SystemClipboard::new(Duration::from_secs(
                config.hold_secs,
            ))))
        } else {
            None
        };

        let fallback: Option<Box<dyn ClipboardWriter>> =
            match config.fallback.to_lowercase().as_str() {
                "osc52" => Some(Box::new(TerminalClipboard::stderr())),
                _ => None,
            };

        Self::new(primary, fallback)
    }

    /// Copy `text`, trying the primary strategy first.
    ///
    /// Empty text is never copied.
    pub fn copy(&mut self, text: &str) -> CopyOutcome {
        if text.is_empty() {
            return CopyOutcome::Failed("nothing to copy".to_string());
        }

        let mut last_error = "no clipboard strategy configured".to_string();

        if let Some(primary) = self.primary.as_mut() {
            match primary.write_text(text) {
                Ok(()) => return CopyOutcome::Primary,
                Err(e) => {
                    tracing::debug!(strategy = primary.name(), error = %e, "Clipboard strategy failed");
                    last_error = e.to_string();
                }
            }
        }

        if let Some(fallback) = self.fallback.as_mut() {
            match fallback.write_text(text) {
                Ok(()) => return CopyOutcome::Fallback,
                Err(e) => {
                    tracing::debug!(strategy = fallback.name(), error = %e, "Clipboard strategy failed");
                    last_error = e.to_string();
                }
            }
        }

        CopyOutcome::Failed(last_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// In-memory writer that records what it was asked to copy.
    struct Recording {
        fail: bool,
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl Recording {
        fn boxed(fail: bool) -> (Box<dyn ClipboardWriter>, Arc<Mutex<Vec<String>>>) {
            let seen = Arc::new(Mutex::new(Vec::new()));
            (
                Box::new(Recording {
                    fail,
                    seen: seen.clone(),
                }),
                seen,
            )
        }
    }

    impl ClipboardWriter for Recording {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
            self.seen.lock().unwrap().push(text.to_string());
            if self.fail {
                Err(ClipboardError::Unavailable("no display".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn display_detection() {
        assert!(display_available(Some(":0"), None));
        assert!(display_available(None, Some("wayland-0")));
        assert!(!display_available(None, None));
        assert!(!display_available(Some(""), Some("")));
    }

    /// Stands in for a system clipboard on a headless host.
    struct Headless;

    impl ClipboardWriter for Headless {
        fn name(&self) -> &'static str {
            "headless"
        }

        fn write_text(&mut self, _text: &str) -> Result<(), ClipboardError> {
            Err(ClipboardError::Unavailable("no display server".to_string()))
        }
    }

    #[test]
    fn headless_host_falls_back_to_osc52() {
        let mut chain = ClipboardChain::new(
            Some(Box::new(Headless)),
            Some(Box::new(TerminalClipboard::new(Vec::new()))),
        );
        assert_eq!(chain.copy("CODE-GOLD-1294D74277"), CopyOutcome::Fallback);
    }

    #[test]
    fn osc52_encodes_base64_payload() {
        assert_eq!(
            osc52_sequence("CODE-GOLD-1294D74277"),
            "\x1b]52;c;Q09ERS1HT0xELTEyOTRENzQyNzc=\x07"
        );
    }

    #[test]
    fn terminal_clipboard_writes_sequence() {
        let mut term = TerminalClipboard::new(Vec::new());
        term.write_text("abc").unwrap();
        assert_eq!(term.into_inner(), b"\x1b]52;c;YWJj\x07".to_vec());
    }

    #[test]
    fn primary_wins_when_it_works() {
        let (primary, p_seen) = Recording::boxed(false);
        let (fallback, f_seen) = Recording::boxed(false);
        let mut chain = ClipboardChain::new(Some(primary), Some(fallback));

        assert_eq!(chain.copy("CODE-X-0123456789"), CopyOutcome::Primary);
        assert_eq!(p_seen.lock().unwrap().len(), 1);
        assert!(f_seen.lock().unwrap().is_empty());
    }

    #[test]
    fn falls_back_when_primary_fails() {
        let (primary, _) = Recording::boxed(true);
        let (fallback, f_seen) = Recording::boxed(false);
        let mut chain = ClipboardChain::new(Some(primary), Some(fallback));

        assert_eq!(chain.copy("CODE-X-0123456789"), CopyOutcome::Fallback);
        assert_eq!(*f_seen.lock().unwrap(), vec!["CODE-X-0123456789"]);
    }

    #[test]
    fn reports_failure_when_everything_fails() {
        let (primary, _) = Recording::boxed(true);
        let (fallback, _) = Recording::boxed(true);
        let mut chain = ClipboardChain::new(Some(primary), Some(fallback));

        let outcome = chain.copy("CODE-X-0123456789");
        assert!(matches!(outcome, CopyOutcome::Failed(ref m) if m.contains("no display")));
        assert!(!outcome.is_copied());
    }

    #[test]
    fn empty_text_is_not_copied() {
        let (primary, p_seen) = Recording::boxed(false);
        let mut chain = ClipboardChain::new(Some(primary), None);

        assert!(!chain.copy("").is_copied());
        assert!(p_seen.lock().unwrap().is_empty());
    }

    #[test]
    fn empty_chain_fails() {
        let mut chain = ClipboardChain::default();
        assert!(!chain.copy("CODE-X-0123456789").is_copied());
    }
}
