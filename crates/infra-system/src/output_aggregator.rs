// Output Aggregator
// Drains a child's stdout and stderr concurrently until both reach EOF

use iac_bridge_core::application::constants::STREAM_READ_CHUNK_BYTES;
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::trace;

/// Final contents of both streams of one process
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AggregatedOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Reads both pipes at the same time so a child blocked on a full stderr
/// pipe can never stall a reader waiting on stdout (or the other way round).
#[derive(Debug, Clone)]
pub struct OutputAggregator {
    chunk_size: usize,
}

impl Default for OutputAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputAggregator {
    pub fn new() -> Self {
        Self::with_chunk_size(STREAM_READ_CHUNK_BYTES)
    }

    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    /// Append everything each stream yields, in arrival order, until both
    /// report end-of-stream. Buffers are only handed out once both are done.
    pub async fn drain<O, E>(&self, stdout: O, stderr: E) -> io::Result<AggregatedOutput>
    where
        O: AsyncRead + Unpin,
        E: AsyncRead + Unpin,
    {
        let (stdout, stderr) = tokio::try_join!(
            drain_stream(stdout, "stdout", self.chunk_size),
            drain_stream(stderr, "stderr", self.chunk_size),
        )?;

        Ok(AggregatedOutput { stdout, stderr })
    }
}

async fn drain_stream<R>(mut reader: R, stream: &'static str, chunk_size: usize) -> io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = Vec::new();
    let mut chunk = vec![0u8; chunk_size];

    loop {
        let read = reader.read(&mut chunk).await?;
        if read == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..read]);
        trace!(stream, bytes = read, total = buffer.len(), "Read chunk from child");
    }

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn test_drains_both_streams() {
        let aggregator = OutputAggregator::new();

        let output = aggregator
            .drain(&b"{\"ok\":true}"[..], &b"warning"[..])
            .await
            .unwrap();

        assert_eq!(output.stdout, b"{\"ok\":true}");
        assert_eq!(output.stderr, b"warning");
    }

    #[tokio::test]
    async fn test_empty_streams() {
        let output = OutputAggregator::new()
            .drain(tokio::io::empty(), tokio::io::empty())
            .await
            .unwrap();

        assert_eq!(output, AggregatedOutput::default());
    }

    #[tokio::test]
    async fn test_small_chunks_keep_order() {
        let payload: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
        let aggregator = OutputAggregator::with_chunk_size(7);

        let output = aggregator.drain(&payload[..], &b""[..]).await.unwrap();

        assert_eq!(output.stdout, payload);
    }

    #[tokio::test]
    async fn test_incremental_interleaved_writers() {
        let (mut out_tx, out_rx) = tokio::io::duplex(16);
        let (mut err_tx, err_rx) = tokio::io::duplex(16);

        let writer = tokio::spawn(async move {
            for i in 0..20 {
                out_tx.write_all(format!("o{};", i).as_bytes()).await.unwrap();
                err_tx.write_all(format!("e{};", i).as_bytes()).await.unwrap();
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
            // dropping both halves signals EOF
        });

        let output = OutputAggregator::with_chunk_size(4)
            .drain(out_rx, err_rx)
            .await
            .unwrap();
        writer.await.unwrap();

        let expected_out: String = (0..20).map(|i| format!("o{};", i)).collect();
        let expected_err: String = (0..20).map(|i| format!("e{};", i)).collect();
        assert_eq!(String::from_utf8(output.stdout).unwrap(), expected_out);
        assert_eq!(String::from_utf8(output.stderr).unwrap(), expected_err);
    }

    #[tokio::test]
    async fn test_full_stderr_does_not_block_stdout() {
        // stderr producer writes far more than the pipe holds before stdout closes
        let (mut out_tx, out_rx) = tokio::io::duplex(64);
        let (mut err_tx, err_rx) = tokio::io::duplex(64);

        let writer = tokio::spawn(async move {
            err_tx.write_all(&vec![b'x'; 64 * 1024]).await.unwrap();
            drop(err_tx);
            out_tx.write_all(b"done").await.unwrap();
        });

        let output = tokio::time::timeout(
            Duration::from_secs(5),
            OutputAggregator::new().drain(out_rx, err_rx),
        )
        .await
        .expect("drain must not deadlock")
        .unwrap();
        writer.await.unwrap();

        assert_eq!(output.stdout, b"done");
        assert_eq!(output.stderr.len(), 64 * 1024);
    }
}
