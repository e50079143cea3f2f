//! Env-file sink consumed by CI runners between steps.

// std
use std::{
	fs::OpenOptions,
	path::{Path, PathBuf},
};
// self
use crate::{
	auth::TokenSecret,
	sink::{SinkError, TokenSink, write_entry},
};

/// Appends entries to a file, creating it when absent.
///
/// Existing contents are preserved. New files are created with mode `0644` on Unix.
#[derive(Clone, Debug)]
pub struct EnvFileSink {
	path: PathBuf,
}
impl EnvFileSink {
	/// Targets the file at `path`. Nothing is opened until the first entry is published.
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	/// Destination path.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn open(&self) -> Result<std::fs::File, SinkError> {
		let mut options = OpenOptions::new();

		options.append(true).create(true);

		#[cfg(unix)]
		{
			use std::os::unix::fs::OpenOptionsExt;

			options.mode(0o644);
		}

		options.open(&self.path).map_err(|source| SinkError::Open { path: self.path.clone(), source })
	}
}
impl TokenSink for EnvFileSink {
	fn publish(&self, key: &str, value: &TokenSecret) -> Result<(), SinkError> {
		let mut file = self.open()?;

		write_entry(&mut file, key, value)
	}
}
