//! Export boundary.
//!
//! The engine's contract ends at "finished encoded image plus suggested
//! name"; download packaging and archive creation live on the other side of
//! [`ExportSink`].

use std::path::PathBuf;

use anyhow::Context;

use crate::encode::RenderResult;
use crate::foundation::error::{FrameError, FrameResult};

/// One finished render ready for export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportItem {
    /// Suggested output filename, already sanitized.
    pub filename: String,
    /// Encoded blob; ownership transfers out of the engine here.
    pub result: RenderResult,
}

/// Consumer contract for finished exports.
///
/// `push_item` is called once per item after `begin(total)`; `end` is called
/// exactly once afterwards.
pub trait ExportSink: Send {
    /// Called once before any items are pushed.
    fn begin(&mut self, total: usize) -> FrameResult<()>;
    /// Push one finished item.
    fn push_item(&mut self, item: &ExportItem) -> FrameResult<()>;
    /// Called once after the last item.
    fn end(&mut self) -> FrameResult<()>;
}

/// Drive a sink over a finished item set.
pub fn export_all(items: &[ExportItem], sink: &mut dyn ExportSink) -> FrameResult<()> {
    sink.begin(items.len())?;
    for item in items {
        sink.push_item(item)?;
    }
    sink.end()
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemoryExport {
    total: Option<usize>,
    items: Vec<ExportItem>,
    ended: bool,
}

impl InMemoryExport {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total announced in `begin`, if any.
    pub fn total(&self) -> Option<usize> {
        self.total
    }

    /// Borrow the collected items.
    pub fn items(&self) -> &[ExportItem] {
        &self.items
    }

    /// Whether `end` has been called.
    pub fn is_ended(&self) -> bool {
        self.ended
    }
}

impl ExportSink for InMemoryExport {
    fn begin(&mut self, total: usize) -> FrameResult<()> {
        self.total = Some(total);
        self.items.clear();
        self.ended = false;
        Ok(())
    }

    fn push_item(&mut self, item: &ExportItem) -> FrameResult<()> {
        self.items.push(item.clone());
        Ok(())
    }

    fn end(&mut self) -> FrameResult<()> {
        self.ended = true;
        Ok(())
    }
}

/// Sink that writes each item as a file into a directory.
#[derive(Debug)]
pub struct DirectoryExport {
    dir: PathBuf,
}

impl DirectoryExport {
    /// Export into `dir`, creating it on `begin` if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ExportSink for DirectoryExport {
    fn begin(&mut self, _total: usize) -> FrameResult<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create export directory '{}'", self.dir.display()))
            .map_err(FrameError::Other)
    }

    fn push_item(&mut self, item: &ExportItem) -> FrameResult<()> {
        let path = self.dir.join(&item.filename);
        std::fs::write(&path, &item.result.bytes)
            .with_context(|| format!("write export '{}'", path.display()))
            .map_err(FrameError::Other)
    }

    fn end(&mut self) -> FrameResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;

    fn item(name: &str) -> ExportItem {
        ExportItem {
            filename: name.to_owned(),
            result: RenderResult {
                bytes: vec![1, 2, 3],
                format: OutputFormat::Png,
            },
        }
    }

    #[test]
    fn in_memory_sink_collects_in_order() {
        let items = vec![item("a.png"), item("b.png")];
        let mut sink = InMemoryExport::new();
        export_all(&items, &mut sink).unwrap();

        assert_eq!(sink.total(), Some(2));
        assert!(sink.is_ended());
        assert_eq!(sink.items()[0].filename, "a.png");
        assert_eq!(sink.items()[1].filename, "b.png");
    }

    #[test]
    fn directory_sink_writes_files() {
        let dir = std::env::temp_dir().join(format!(
            "enframe_export_test_{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);

        let mut sink = DirectoryExport::new(&dir);
        export_all(&[item("out.png")], &mut sink).unwrap();

        let written = std::fs::read(dir.join("out.png")).unwrap();
        assert_eq!(written, vec![1, 2, 3]);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
