// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Tokio based file reading for `sigv4_core`.
//!
//! `TokioFileRead` is used by the profile credential providers to load
//! `~/.aws/config` and `~/.aws/credentials`, and by the config loader to
//! read signing config files.
//!
//! ```no_run
//! use sigv4_core::{Context, OsEnv};
//! use sigv4_file_read_tokio::TokioFileRead;
//!
//! #[tokio::main]
//! async fn main() {
//!     let ctx = Context::new()
//!         .with_file_read(TokioFileRead)
//!         .with_env(OsEnv);
//!
//!     match ctx.file_read("/path/to/sigv4.toml").await {
//!         Ok(content) => println!("read {} bytes", content.len()),
//!         Err(e) => eprintln!("failed to read file: {e}"),
//!     }
//! }
//! ```

use async_trait::async_trait;
use sigv4_core::{Error, FileRead, Result};

/// Tokio based implementation of [`FileRead`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFileRead;

#[async_trait]
impl FileRead for TokioFileRead {
    async fn file_read(&self, path: &str) -> Result<Vec<u8>> {
        tokio::fs::read(path).await.map_err(|e| {
            Error::unexpected("failed to read file")
                .with_source(e)
                .with_context(format!("path: {path}"))
        })
    }
}
