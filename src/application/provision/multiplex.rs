//! Merges a process's stdout and stderr into one ordered feed.
//!
//! One reader task per pipe pushes lines into a shared bounded channel as
//! soon as they are read, so the merged order is whatever arrives first.
//! Each pipe keeps its own order. The feed ends once both readers finish
//! and drop their senders.
//!
//! Every line is also logged locally (stdout at INFO, stderr at WARN). The
//! readers keep draining and logging after the consumer hangs up, so the
//! child never blocks on a full pipe.

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tracing::{debug, info, warn, Instrument, Span};

use crate::domain::{LogLine, LogSource};
use crate::port::outbound::process::LineStream;

/// Merge two line streams into a single receiver.
///
/// Must be called from within a Tokio runtime. Reader tasks inherit the
/// caller's tracing span.
pub fn multiplex(stdout: LineStream, stderr: LineStream, capacity: usize) -> mpsc::Receiver<LogLine> {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    spawn_reader(LogSource::Stdout, stdout, tx.clone());
    spawn_reader(LogSource::Stderr, stderr, tx);
    rx
}

fn spawn_reader(source: LogSource, mut lines: LineStream, tx: mpsc::Sender<LogLine>) {
    let span = Span::current();
    tokio::spawn(
        async move {
            let mut forwarding = true;
            while let Some(text) = lines.next().await {
                match source {
                    LogSource::Stdout => info!(stream = %source, "{text}"),
                    LogSource::Stderr => warn!(stream = %source, "{text}"),
                }
                if forwarding && tx.send(LogLine::new(source, text)).await.is_err() {
                    debug!(stream = %source, "log consumer gone, draining without forwarding");
                    forwarding = false;
                }
            }
            debug!(stream = %source, "stream exhausted");
        }
        .instrument(span),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;
    use std::time::Duration;

    fn lines(items: &[&str]) -> LineStream {
        stream::iter(items.iter().map(ToString::to_string).collect::<Vec<_>>()).boxed()
    }

    async fn collect(mut rx: mpsc::Receiver<LogLine>) -> Vec<LogLine> {
        let mut out = Vec::new();
        while let Some(line) = rx.recv().await {
            out.push(line);
        }
        out
    }

    fn position(lines: &[LogLine], text: &str) -> usize {
        lines
            .iter()
            .position(|l| l.text == text)
            .unwrap_or_else(|| panic!("{text} missing from merged feed"))
    }

    #[tokio::test]
    async fn merged_feed_preserves_per_stream_order() {
        let merged = collect(multiplex(lines(&["A", "B"]), lines(&["X", "Y"]), 8)).await;

        assert_eq!(merged.len(), 4);
        assert!(position(&merged, "A") < position(&merged, "B"));
        assert!(position(&merged, "X") < position(&merged, "Y"));
    }

    #[tokio::test]
    async fn lines_keep_their_origin() {
        let merged = collect(multiplex(lines(&["out"]), lines(&["err"]), 8)).await;

        let out = &merged[position(&merged, "out")];
        let err = &merged[position(&merged, "err")];
        assert_eq!(out.source, LogSource::Stdout);
        assert_eq!(err.source, LogSource::Stderr);
    }

    #[tokio::test]
    async fn feed_waits_for_both_streams() {
        let slow_stderr = stream::once(async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            "late".to_string()
        })
        .boxed();

        let merged = collect(multiplex(lines(&["early"]), slow_stderr, 8)).await;
        let texts: Vec<_> = merged.into_iter().map(LogLine::into_text).collect();
        assert_eq!(texts, vec!["early", "late"]);
    }

    #[tokio::test]
    async fn empty_streams_close_the_feed() {
        let merged = collect(multiplex(lines(&[]), lines(&[]), 1)).await;
        assert!(merged.is_empty());
    }

    #[tokio::test]
    async fn readers_keep_draining_after_consumer_drops() {
        let (seen_tx, mut seen_rx) = mpsc::unbounded_channel();
        let tracked = stream::iter(0..100)
            .map(move |i| {
                let _ = seen_tx.send(i);
                format!("line {i}")
            })
            .boxed();

        let rx = multiplex(tracked, lines(&[]), 1);
        drop(rx);

        let mut last = None;
        while let Some(i) = seen_rx.recv().await {
            last = Some(i);
        }
        assert_eq!(last, Some(99));
    }
}
