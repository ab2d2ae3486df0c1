//
//  cloud-databases
//  config/file.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Credentials File I/O
//!
//! Service properties can be kept in a credentials file instead of the
//! process environment. The file uses `KEY=VALUE` lines with `#` comments:
//!
//! ```text
//! # Cloud Databases
//! CLOUD_DATABASES_AUTH_TYPE=iam
//! CLOUD_DATABASES_APIKEY=my-api-key
//! CLOUD_DATABASES_URL=https://api.eu-de.databases.cloud.ibm.com/v5/ibm
//! ```
//!
//! ## Lookup Order
//!
//! 1. The path in `IBM_CREDENTIALS_FILE`, if set
//! 2. `ibm-credentials.env` in the current directory
//! 3. `ibm-credentials.env` in the user's home directory
//!
//! The first existing file wins.

use std::path::{Path, PathBuf};

use directories::UserDirs;

use super::EnvSnapshot;
use crate::api::common::ApiError;

/// Environment variable naming an explicit credentials file.
pub const CREDENTIALS_FILE_ENV: &str = "IBM_CREDENTIALS_FILE";

/// File name searched for in the working and home directories.
pub const DEFAULT_CREDENTIALS_FILE_NAME: &str = "ibm-credentials.env";

/// Finds the credentials file to use, if any.
pub fn credentials_file_path(env: &EnvSnapshot) -> Option<PathBuf> {
    if let Some(path) = env.get(CREDENTIALS_FILE_ENV).filter(|path| !path.is_empty()) {
        let path = PathBuf::from(path);
        return path.is_file().then_some(path);
    }

    let local = PathBuf::from(DEFAULT_CREDENTIALS_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    UserDirs::new()
        .map(|dirs| dirs.home_dir().join(DEFAULT_CREDENTIALS_FILE_NAME))
        .filter(|path| path.is_file())
}

/// Reads and parses a credentials file.
///
/// # Errors
///
/// Returns a `Configuration` error if the file cannot be read.
pub fn read_credentials_file(path: &Path) -> Result<Vec<(String, String)>, ApiError> {
    let content = std::fs::read_to_string(path).map_err(|err| {
        ApiError::configuration(format!(
            "failed to read credentials file {}: {err}",
            path.display()
        ))
    })?;
    Ok(parse_credentials(&content))
}

/// Parses `KEY=VALUE` lines.
///
/// Blank lines, `#` comments and lines without `=` are skipped. Keys and
/// values are trimmed; the value keeps any further `=` characters.
pub fn parse_credentials(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .filter(|(key, _)| !key.is_empty())
        .collect()
}
