//! Logging and tracing setup for Basic Gate.
//!
//! Formatted events pass through a [`RedactingMakeWriter`] so that values of
//! personal data fields never reach the log sink.

use std::io::{self, Write};
use std::sync::Arc;

use regex::{Captures, Regex};
use tracing_subscriber::{
    fmt::MakeWriter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

use crate::config::LoggingConfig;

/// Replacement for redacted values.
pub const REDACTION: &str = "***";

/// Fields treated as personal data by default.
pub const PII_FIELDS: [&str; 5] = ["name", "email", "phone", "ssn", "password"];

/// Separator between `key=value` pairs in human-readable output.
pub const SEPARATOR: &str = " ";

/// Precompiled redaction patterns for a set of fields.
///
/// Human-readable lines mask the value following `field=` up to the next
/// separator or the end of the line; a quoted value is masked whole. JSON
/// lines mask the value of a `"field":` member, and `field=` pairs inside
/// string values only up to the end of the token so the line stays valid JSON.
#[derive(Debug, Clone)]
pub struct Redactor {
    patterns: Vec<Regex>,
}

impl Redactor {
    /// Patterns for `key=value` output joined by `separator`.
    pub fn plain<S: AsRef<str>>(fields: &[S], separator: &str) -> Self {
        let separator = regex::escape(separator);
        Self::compile(fields, |field| {
            vec![format!(
                r#"(?m)(\b{field}=)("(?:[^"\\]|\\.)*"|.+?)({separator}|$)"#
            )]
        })
    }

    /// Patterns for lines rendered by the JSON formatter.
    pub fn json<S: AsRef<str>>(fields: &[S]) -> Self {
        Self::compile(fields, |field| {
            vec![
                format!(r#"("{field}":)("(?:[^"\\]|\\.)*"|[^,}}\s]+)()"#),
                // key=value embedded in a message string
                format!(r#"(\b{field}=)([^\s",}}\\]+)()"#),
            ]
        })
    }

    fn compile<S, F>(fields: &[S], patterns_for: F) -> Self
    where
        S: AsRef<str>,
        F: Fn(&str) -> Vec<String>,
    {
        let patterns = fields
            .iter()
            .flat_map(|field| patterns_for(regex::escape(field.as_ref()).as_str()))
            .filter_map(|pattern| Regex::new(&pattern).ok())
            .collect();

        Self { patterns }
    }

    pub fn redact(&self, message: &str, redaction: &str) -> String {
        self.patterns
            .iter()
            .fold(message.to_string(), |message, pattern| {
                pattern
                    .replace_all(&message, |caps: &Captures| {
                        let quoted = caps[2].starts_with('"');
                        let value = if quoted {
                            format!("\"{}\"", redaction)
                        } else {
                            redaction.to_string()
                        };
                        format!("{}{}{}", &caps[1], value, &caps[3])
                    })
                    .into_owned()
            })
    }
}

/// `MakeWriter` that redacts every formatted event before writing to stdout.
#[derive(Clone)]
pub struct RedactingMakeWriter {
    redactor: Arc<Redactor>,
}

impl RedactingMakeWriter {
    pub fn new(redactor: Redactor) -> Self {
        Self {
            redactor: Arc::new(redactor),
        }
    }
}

impl<'a> MakeWriter<'a> for RedactingMakeWriter {
    type Writer = RedactingWriter<io::Stdout>;

    fn make_writer(&'a self) -> Self::Writer {
        RedactingWriter::new(io::stdout(), Arc::clone(&self.redactor))
    }
}

/// Writer that redacts each buffer it receives.
///
/// The fmt layer writes one complete event per `write`, so a field and its
/// value never straddle two buffers.
pub struct RedactingWriter<W> {
    inner: W,
    redactor: Arc<Redactor>,
}

impl<W: Write> RedactingWriter<W> {
    pub fn new(inner: W, redactor: Arc<Redactor>) -> Self {
        Self { inner, redactor }
    }
}

impl<W: Write> Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        let redacted = self.redactor.redact(&text, REDACTION);
        self.inner.write_all(redacted.as_bytes())?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Initialize the tracing subscriber.
///
/// Reads log level from RUST_LOG environment variable, falling back to
/// the configured filter.
pub fn init(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));

    let fmt_layer = if config.json {
        let writer = RedactingMakeWriter::new(Redactor::json(&config.redact_fields));
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_writer(writer)
            .boxed()
    } else {
        let writer = RedactingMakeWriter::new(Redactor::plain(&config.redact_fields, SEPARATOR));
        tracing_subscriber::fmt::layer()
            .with_target(true)
            // Escape codes around field names would defeat redaction
            .with_ansi(false)
            .with_writer(writer)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_semicolon_separated() {
        let fields = ["password", "date_of_birth"];
        let message = "name=egg;email=eggmin@eggsample.com;password=eggcellent;date_of_birth=12/12/1986;";

        assert_eq!(
            Redactor::plain(&fields, ";").redact(message, "xxx"),
            "name=egg;email=eggmin@eggsample.com;password=xxx;date_of_birth=xxx;"
        );
    }

    #[test]
    fn test_redact_end_of_line() {
        let message = "user login email=bob@example.com password=hunter2";
        assert_eq!(
            Redactor::plain(&PII_FIELDS, SEPARATOR).redact(message, REDACTION),
            "user login email=*** password=***"
        );
    }

    #[test]
    fn test_redact_field_boundary() {
        // `username` must not be caught by `name`
        let message = "username=bob name=Bob";
        assert_eq!(
            Redactor::plain(&["name"], SEPARATOR).redact(message, REDACTION),
            "username=bob name=***"
        );
    }

    #[test]
    fn test_redact_json_fields() {
        let redactor = Redactor::json(&PII_FIELDS);
        let line = r#"{"level":"INFO","fields":{"message":"Failed login","email":"bob@example.com","attempts":3}}"#;

        assert_eq!(
            redactor.redact(line, REDACTION),
            r#"{"level":"INFO","fields":{"message":"Failed login","email":"***","attempts":3}}"#
        );
    }

    #[test]
    fn test_redact_quoted_value() {
        let message = r#"lookup name="Bob Smith" attempts=1"#;
        assert_eq!(
            Redactor::plain(&PII_FIELDS, SEPARATOR).redact(message, REDACTION),
            r#"lookup name="***" attempts=1"#
        );
    }

    #[test]
    fn test_redacted_json_line_stays_valid() {
        let redactor = Redactor::json(&PII_FIELDS);
        let line = r#"{"level":"INFO","fields":{"message":"lookup email=bob@x.com","attempts":3},"target":"basic_gate"}"#;

        let redacted = redactor.redact(line, REDACTION);
        let parsed: serde_json::Value = serde_json::from_str(&redacted).unwrap();

        assert_eq!(parsed["fields"]["message"], "lookup email=***");
        assert_eq!(parsed["fields"]["attempts"], 3);
        assert_eq!(parsed["target"], "basic_gate");
        assert!(!redacted.contains("bob@x.com"));
    }

    #[test]
    fn test_redacting_writer() {
        let redactor = Arc::new(Redactor::plain(&PII_FIELDS, SEPARATOR));
        let mut writer = RedactingWriter::new(Vec::new(), redactor);

        let line = b"INFO basic_gate: created user email=bob@example.com\n";
        let written = writer.write(line).unwrap();

        assert_eq!(written, line.len());
        assert_eq!(
            String::from_utf8(writer.inner).unwrap(),
            "INFO basic_gate: created user email=***\n"
        );
    }
}
