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

use alicloud_core::{Context, OsEnv};
use alicloud_file_read_tokio::TokioFileRead;
use alicloud_http_send_reqwest::ReqwestHttpSend;
use alicloud_sleep_tokio::TokioSleep;

/// Context reading files with tokio, sending through reqwest, reading the
/// process environment and sleeping on the tokio timer.
pub fn default_context() -> Context {
    Context::new()
        .with_file_read(TokioFileRead)
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv)
        .with_sleep(TokioSleep)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    #[tokio::test]
    async fn test_default_context_reads_files() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(file, "{{\"current\":\"default\"}}")?;

        let ctx = default_context();
        let path = file.path().to_string_lossy().to_string();
        assert_eq!(
            ctx.file_read_as_string(&path).await?,
            "{\"current\":\"default\"}"
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_default_context_sleeps() {
        default_context().sleep(Duration::from_millis(1)).await;
    }
}
