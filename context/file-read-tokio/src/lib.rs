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

//! Tokio-based file reading for awscurl.
//!
//! `TokioFileRead` implements [`FileRead`] with `tokio::fs::read`. The whole
//! file is read into memory and the handle is closed before the call returns,
//! which is what both the request body and the shared AWS config files need.
//!
//! ## Example
//!
//! ```no_run
//! use awscurl_core::{Context, OsEnv};
//! use awscurl_file_read_tokio::TokioFileRead;
//!
//! # async fn example() -> awscurl_core::Result<()> {
//! let ctx = Context::new()
//!     .with_file_read(TokioFileRead)
//!     .with_env(OsEnv);
//!
//! let payload = ctx.file_read("/path/to/payload.json").await?;
//! println!("Read {} bytes", payload.len());
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use awscurl_core::{Error, FileRead, Result};

/// Tokio-based implementation of the `FileRead` trait.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFileRead;

#[async_trait]
impl FileRead for TokioFileRead {
    async fn file_read(&self, path: &str) -> Result<Vec<u8>> {
        tokio::fs::read(path).await.map_err(|e| {
            Error::io("failed to read file")
                .with_source(e)
                .with_context(format!("path: {path}"))
        })
    }
}
