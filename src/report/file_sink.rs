// Copyright 2025 Lablup Inc. and Jeongkyu Shin
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::{console, HostRecord, ReportKind, VolumeRecord};
use crate::error::Result;
use crate::traits::ReportSink;

/// Writes each record set as a pretty-printed JSON array under `dir`,
/// optionally echoing a table to stdout.
pub struct FileReportSink {
    dir: PathBuf,
    echo: bool,
    written: Vec<PathBuf>,
}

impl FileReportSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            echo: false,
            written: Vec::new(),
        }
    }

    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Files written so far, in write order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn write_json<T: Serialize>(&mut self, kind: ReportKind, records: &[T]) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(kind.file_name());
        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut writer, records)?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        tracing::info!(
            report = kind.file_name(),
            records = records.len(),
            "Wrote report to {}",
            path.display()
        );
        self.written.push(path);
        Ok(())
    }
}

impl ReportSink for FileReportSink {
    fn write_hosts(&mut self, kind: ReportKind, records: &[HostRecord]) -> Result<()> {
        if self.echo {
            print!("{}", console::render_hosts(kind, records));
        }
        self.write_json(kind, records)
    }

    fn write_volumes(&mut self, kind: ReportKind, records: &[VolumeRecord]) -> Result<()> {
        if self.echo {
            print!("{}", console::render_volumes(kind, records));
        }
        self.write_json(kind, records)
    }
}
