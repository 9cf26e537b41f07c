use crate::domain::ports::TabularWriter;
use crate::utils::error::Result;

/// Per-run state of one sink. `header_written` starts as whether the sink already
/// existed when acquired and is never re-derived from disk afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkState {
    pub path: String,
    pub header_written: bool,
}

/// Appends rows to sinks, writing each sink's header exactly once.
pub struct RecordEmitter<W: TabularWriter> {
    writer: W,
}

impl<W: TabularWriter> RecordEmitter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// 在寫入任何資料列之前取得 sink，只檢查一次檔案是否存在
    pub fn acquire(&self, path: impl Into<String>) -> SinkState {
        let path = path.into();
        let header_written = self.writer.exists(&path);
        tracing::debug!("Acquired sink {} (pre-existing: {})", path, header_written);
        SinkState {
            path,
            header_written,
        }
    }

    pub async fn append(&self, sink: &mut SinkState, header: &[&str], row: &[String]) -> Result<()> {
        if !sink.header_written {
            let header: Vec<String> = header.iter().map(|h| h.to_string()).collect();
            self.writer.append_row(&sink.path, &header).await?;
            sink.header_written = true;
        }
        self.writer.append_row(&sink.path, row).await
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }
}
