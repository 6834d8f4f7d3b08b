// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the browser SDK.

use thiserror::Error;

/// Result type alias for browser SDK operations.
pub type Result<T> = std::result::Result<T, BrowserSdkError>;

/// Errors that can occur in the browser SDK.
#[derive(Debug, Error)]
pub enum BrowserSdkError {
	/// No registration endpoint was configured.
	#[error("init URL is required")]
	MissingInitUrl,

	/// A URL could not be parsed or resolved against the page location.
	#[error("invalid URL: {0}")]
	InvalidUrl(String),

	/// HTTP request failed.
	#[error("HTTP request failed: {0}")]
	RequestFailed(#[from] reqwest::Error),

	/// Server returned an error.
	#[error("server error (status {status}): {message}")]
	ServerError {
		/// HTTP status code.
		status: u16,
		/// Error message from server.
		message: String,
	},

	/// Failed to serialize a payload or parse configuration.
	#[error("serialization error: {0}")]
	SerializationError(#[from] serde_json::Error),

	/// A server date header could not be parsed.
	#[error("invalid date header: {0}")]
	InvalidDate(String),
}

/// Failures inside the storage accessor.
///
/// These never reach plugins: the public accessor logs them and degrades to
/// an empty string.
#[derive(Debug, Error)]
pub enum StorageError {
	#[error("storage key is empty")]
	EmptyKey,

	#[error("storage key not found: {0}")]
	MissingKey(String),

	#[error("stored value is not valid JSON: {0}")]
	Parse(#[from] serde_json::Error),

	#[error("cookie value is not valid percent-encoding: {0}")]
	Decode(String),
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_server_error_display() {
		let err = BrowserSdkError::ServerError {
			status: 503,
			message: "unavailable".to_string(),
		};
		assert_eq!(err.to_string(), "server error (status 503): unavailable");
	}

	#[test]
	fn test_storage_parse_error_from_serde() {
		let parse = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
		let err: StorageError = parse.into();
		assert!(matches!(err, StorageError::Parse(_)));
	}
}
