//! Message-sink channels: status/verbose/debug progress reporting.
//!
//! Three independent verbosity channels, expressed the way idiomatic Rust
//! libraries expose optional diagnostics: injected callbacks, not a singleton
//! logger or a signal/slot emitter.

use std::fmt;
use std::rc::Rc;

pub type Sink = Rc<dyn Fn(&str)>;

/// The three independent verbosity channels a driver call reports through.
#[derive(Clone)]
pub struct MessageSinks {
    pub status: Sink,
    pub verbose: Sink,
    pub debug: Sink,
}

impl fmt::Debug for MessageSinks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageSinks").finish_non_exhaustive()
    }
}

fn noop(_msg: &str) {}

impl Default for MessageSinks {
    fn default() -> Self {
        Self {
            status: Rc::new(noop),
            verbose: Rc::new(noop),
            debug: Rc::new(noop),
        }
    }
}

impl MessageSinks {
    pub fn status(&self, msg: impl AsRef<str>) {
        (self.status)(msg.as_ref());
    }

    pub fn verbose(&self, msg: impl AsRef<str>) {
        (self.verbose)(msg.as_ref());
    }

    pub fn debug(&self, msg: impl AsRef<str>) {
        (self.debug)(msg.as_ref());
    }

    /// Sinks that print to stdout/stderr at increasing verbosity, the shape the
    /// CLI front-end wires up from its `-v`/`-vv` flags.
    pub fn printing(verbosity: u8) -> Self {
        Self {
            status: Rc::new(|msg| println!("{msg}")),
            verbose: if verbosity >= 1 {
                Rc::new(|msg| eprintln!("{msg}"))
            } else {
                Rc::new(noop)
            },
            debug: if verbosity >= 2 {
                Rc::new(|msg| eprintln!("  {msg}"))
            } else {
                Rc::new(noop)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn default_sinks_are_silent_noops() {
        let sinks = MessageSinks::default();
        sinks.status("hello");
        sinks.verbose("world");
        sinks.debug("!");
    }

    #[test]
    fn custom_sink_is_invoked() {
        let captured: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
        let captured_clone = captured.clone();
        let sinks = MessageSinks {
            status: Rc::new(move |m| captured_clone.borrow_mut().push(m.to_owned())),
            ..MessageSinks::default()
        };
        sinks.status("discovered libfoo.so");
        assert_eq!(captured.borrow().as_slice(), ["discovered libfoo.so"]);
    }
}
