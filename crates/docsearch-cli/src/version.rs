// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Build information.

pub fn format_version_info() -> String {
	format!(
		"docsearch {}\n\
		 Platform: {}-{}",
		env!("CARGO_PKG_VERSION"),
		std::env::consts::OS,
		std::env::consts::ARCH
	)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn includes_version_and_platform() {
		let info = format_version_info();
		assert!(info.starts_with(&format!("docsearch {}", env!("CARGO_PKG_VERSION"))));
		assert!(info.contains(std::env::consts::OS));
	}
}
