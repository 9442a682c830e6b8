use super::UplinkResult;
use async_trait::async_trait;
use serde_json::Value;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

/// Trait for handing worker output to the downstream sink
///
/// Implementations should:
/// - Write each output as one self-contained document
/// - Return error if the sink rejects the write
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait SinkWriter: Send + Sync {
    async fn write(&self, output: &Value) -> UplinkResult<()>;
}

/// Writes one JSON document per line.
pub struct JsonLinesWriter<W> {
    inner: Mutex<W>,
}

impl<W> JsonLinesWriter<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(inner: W) -> Self {
        Self {
            inner: Mutex::new(inner),
        }
    }

    pub fn into_inner(self) -> W {
        self.inner.into_inner()
    }
}

#[async_trait]
impl<W> SinkWriter for JsonLinesWriter<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn write(&self, output: &Value) -> UplinkResult<()> {
        let mut line = serde_json::to_vec(output)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        line.push(b'\n');

        let mut inner = self.inner.lock().await;
        inner.write_all(&line).await?;
        inner.flush().await?;
        Ok(())
    }
}
