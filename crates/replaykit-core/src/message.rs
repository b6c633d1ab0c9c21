//! Caller-supplied failure messages.

use std::fmt;

/// Message template with positional arguments, attached to a failure.
///
/// Each `{}` in the template is replaced by the next argument; `{{` and `}}`
/// produce literal braces. Surplus arguments are appended at the end.
///
/// # Example
///
/// ```
/// use replaykit_core::Message;
///
/// let msg = Message::new("listing of {} differs after {} runs")
///     .arg("src/")
///     .arg(3);
/// assert_eq!(msg.render(), "listing of src/ differs after 3 runs");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    template: String,
    args: Vec<String>,
}

impl Message {
    /// Create a message from a template.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            args: Vec::new(),
        }
    }

    /// Append a positional argument.
    pub fn arg(mut self, value: impl fmt::Display) -> Self {
        self.args.push(value.to_string());
        self
    }

    /// Whether no message was supplied.
    pub fn is_empty(&self) -> bool {
        self.template.is_empty() && self.args.is_empty()
    }

    /// Render the template with its arguments.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.template.len());
        let mut args = self.args.iter();
        let mut chars = self.template.chars().peekable();

        while let Some(c) = chars.next() {
            match (c, chars.peek()) {
                ('{', Some('{')) => {
                    chars.next();
                    out.push('{');
                }
                ('}', Some('}')) => {
                    chars.next();
                    out.push('}');
                }
                ('{', Some('}')) => {
                    chars.next();
                    match args.next() {
                        Some(arg) => out.push_str(arg),
                        None => out.push_str("{}"),
                    }
                }
                _ => out.push(c),
            }
        }

        for extra in args {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(extra);
        }

        out
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<&str> for Message {
    fn from(template: &str) -> Self {
        Self::new(template)
    }
}

impl From<String> for Message {
    fn from(template: String) -> Self {
        Self::new(template)
    }
}

/// Build a [`Message`] from a template and arguments.
///
/// ```
/// use replaykit_core::message;
///
/// let msg = message!("expected {} entries", 4);
/// assert_eq!(msg.render(), "expected 4 entries");
/// ```
#[macro_export]
macro_rules! message {
    ($template:expr $(, $arg:expr)* $(,)?) => {
        $crate::Message::new($template)$(.arg($arg))*
    };
}
