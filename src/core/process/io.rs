// snapmirror: Snapshot Mirror Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Draining a child's stdout and stderr.
//!
//! ```text
//! stdout --reader task--> trace! (masked, lossy) + raw bytes --+
//! stderr --reader task--> trace! (masked, lossy) + raw bytes --+--> ProcessOutput
//! wait() ------------------------------------------------------+
//! ```
//!
//! Both pipes are always read to the end so a chatty git cannot block on a
//! full pipe buffer, even when nothing is kept. Output is read as bytes; a
//! line that is not valid UTF-8 is traced lossily and kept verbatim.

use std::io;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Child;
use tokio::task::JoinHandle;
use tracing::trace;

use super::builder::{ProcessBuilder, ProcessOutput, StreamFlags, redact};

/// Per-stream state handed to a reader task.
struct LineSink {
    flags: StreamFlags,
    process: String,
    stream: &'static str,
    secrets: Vec<String>,
    kept: Vec<u8>,
}

impl LineSink {
    fn accept(&mut self, line: &[u8]) {
        if self.flags.contains(StreamFlags::FORWARD_TO_LOG) {
            let text = String::from_utf8_lossy(line);
            let shown = redact(&self.secrets, text.trim_end_matches(['\n', '\r']));
            trace!(process = %self.process, stream = self.stream, line = %shown, "output");
        }
        if self.flags.contains(StreamFlags::KEEP_IN_STRING) {
            self.kept.extend_from_slice(line);
        }
    }
}

type Reader = JoinHandle<io::Result<Vec<u8>>>;

fn spawn_reader<R>(stream: Option<R>, mut sink: LineSink) -> Option<Reader>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    stream.map(|stream| {
        tokio::spawn(async move {
            let mut reader = BufReader::new(stream);
            let mut line = Vec::new();
            loop {
                line.clear();
                if reader.read_until(b'\n', &mut line).await? == 0 {
                    break;
                }
                sink.accept(&line);
            }
            Ok::<_, io::Error>(sink.kept)
        })
    })
}

async fn finish(reader: Option<Reader>) -> io::Result<Vec<u8>> {
    match reader {
        Some(handle) => handle.await.map_err(io::Error::other)?,
        None => Ok(Vec::new()),
    }
}

impl ProcessBuilder {
    fn sink(&self, process: &str, stream: &'static str) -> LineSink {
        LineSink {
            flags: self.streams(),
            process: process.to_string(),
            stream,
            secrets: self.secrets().to_vec(),
            kept: Vec::new(),
        }
    }

    /// Waits for `child`, reading both pipes until they close.
    ///
    /// A read error on either pipe fails the whole command rather than
    /// truncating its output.
    pub(super) async fn collect(
        &self,
        process: &str,
        child: &mut Child,
    ) -> io::Result<ProcessOutput> {
        let stdout = spawn_reader(child.stdout.take(), self.sink(process, "stdout"));
        let stderr = spawn_reader(child.stderr.take(), self.sink(process, "stderr"));

        let status = child.wait().await?;
        let stdout = finish(stdout).await?;
        let stderr = finish(stderr).await?;

        Ok(ProcessOutput::from_raw(
            status.code().unwrap_or(-1),
            stdout,
            stderr,
        ))
    }
}
