// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the browser reporting wire model.

use thiserror::Error;

/// Errors raised while parsing or building wire types.
#[derive(Debug, Error)]
pub enum CoreError {
	#[error("invalid report type: {0}")]
	InvalidReportType(String),

	#[error("invalid page lifecycle stage: {0}")]
	InvalidPageLifeType(String),

	#[error("invalid store tier: {0}")]
	InvalidStoreTier(String),

	#[error("invalid platform: {0}")]
	InvalidPlatform(String),

	#[error("invalid breadcrumb level: {0}")]
	InvalidBreadcrumbLevel(String),

	#[error("invalid dimensions: {0}")]
	InvalidDimensions(String),

	#[error("serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

/// Result type for wire model operations.
pub type Result<T> = std::result::Result<T, CoreError>;
