// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Index generation names: `<alias>_<UTC yyyyMMdd_HHmmss_SSS>`.

use chrono::{DateTime, NaiveDateTime, Utc};

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S_%3f";

pub fn generation_name(alias: &str, at: DateTime<Utc>) -> String {
	format!("{alias}_{}", at.format(TIMESTAMP_FORMAT))
}

/// The index pattern matching every generation of `alias`.
pub fn generation_pattern(alias: &str) -> String {
	format!("{alias}_*")
}

/// When `name` is a generation of `alias`, the time it was named at.
pub fn generation_time(alias: &str, name: &str) -> Option<DateTime<Utc>> {
	let stamp = name.strip_prefix(alias)?.strip_prefix('_')?;
	NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT)
		.ok()
		.map(|t| t.and_utc())
}

pub fn is_generation_of(alias: &str, name: &str) -> bool {
	generation_time(alias, name).is_some()
}
