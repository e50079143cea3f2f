//! Destinations for issued access tokens.
//!
//! A [`TokenSink`] receives one `KEY=value` entry per successful exchange. Entries are written
//! as a single `KEY=value\n` line so a reader never observes a partial line.

pub mod file;

pub use file::EnvFileSink;

// std
use std::{io::Write, path::PathBuf};
// self
use crate::{_prelude::*, auth::TokenSecret};

/// Errors raised while publishing an entry.
#[derive(Debug, ThisError)]
pub enum SinkError {
	/// Key is empty, starts with a digit, or contains characters other than ASCII alphanumerics
	/// and `_`.
	#[error("Sink key `{key}` is not a valid environment variable name.")]
	InvalidKey {
		/// Offending key.
		key: String,
	},
	/// Value contains a line break and would corrupt the env-file format.
	#[error("Value for sink key `{key}` contains a line break.")]
	InvalidValue {
		/// Key whose value was rejected.
		key: String,
	},
	/// Destination could not be opened.
	#[error("Failed to open sink file {}.", .path.display())]
	Open {
		/// Destination path.
		path: PathBuf,
		/// Underlying I/O failure.
		#[source]
		source: std::io::Error,
	},
	/// Writing the entry failed.
	#[error("Failed to write sink entry.")]
	Write(#[from] std::io::Error),
}

/// Receives access tokens produced by successful exchanges.
pub trait TokenSink
where
	Self: Send + Sync,
{
	/// Appends `key=value` followed by a newline.
	fn publish(&self, key: &str, value: &TokenSecret) -> Result<(), SinkError>;
}

/// Sink writing entries into any [`Write`] implementation.
#[derive(Debug, Default)]
pub struct WriterSink<W>(Mutex<W>);
impl<W> WriterSink<W> {
	/// Wraps the writer.
	pub fn new(writer: W) -> Self {
		Self(Mutex::new(writer))
	}

	/// Returns the wrapped writer.
	pub fn into_inner(self) -> W {
		self.0.into_inner()
	}
}
impl<W> TokenSink for WriterSink<W>
where
	W: Write + Send,
{
	fn publish(&self, key: &str, value: &TokenSecret) -> Result<(), SinkError> {
		write_entry(&mut *self.0.lock(), key, value)
	}
}

/// Validates and writes one entry with a single `write_all` call, then flushes.
pub fn write_entry<W>(writer: &mut W, key: &str, value: &TokenSecret) -> Result<(), SinkError>
where
	W: ?Sized + Write,
{
	validate_entry(key, value)?;

	let line = format!("{key}={}\n", value.expose());

	writer.write_all(line.as_bytes())?;
	writer.flush()?;

	Ok(())
}

fn validate_entry(key: &str, value: &TokenSecret) -> Result<(), SinkError> {
	let valid_key = key.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
		&& key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');

	if !valid_key {
		return Err(SinkError::InvalidKey { key: key.to_owned() });
	}
	if value.expose().contains(['\n', '\r']) {
		return Err(SinkError::InvalidValue { key: key.to_owned() });
	}

	Ok(())
}
