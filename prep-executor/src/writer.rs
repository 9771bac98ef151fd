//! Output writers.
//!
//! A [`Writer`] is called once with the final schema, then once per
//! surviving row in original order, then flushed.

use parking_lot::Mutex;
use prep_core::error::Result;
use prep_core::row::{Column, Row, Schema};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io;
use std::sync::Arc;

/// Sink for transformed rows.
pub trait Writer: Send {
    /// Write the final schema. Called exactly once, before any row.
    fn write_schema(&mut self, schema: &Schema) -> Result<()>;

    /// Write one row.
    fn write_row(&mut self, row: &Row) -> Result<()>;

    /// Finish the output.
    fn flush(&mut self) -> Result<()>;
}

#[derive(Serialize)]
struct Metadata<'a> {
    columns: &'a [Column],
}

/// Writes `{"metadata":{"columns":[...]},"records":[...]}`.
///
/// Records map column ids to values and carry the row id as `tdpId`.
pub struct JsonWriter<W: io::Write> {
    out: W,
    records: usize,
    pretty: bool,
}

impl<W: io::Write> JsonWriter<W> {
    /// Write to `out`.
    pub fn new(out: W) -> Self {
        Self {
            out,
            records: 0,
            pretty: false,
        }
    }

    /// Indent records, one per line.
    #[must_use]
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Recover the underlying output.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn separator(&self) -> &'static str {
        if self.pretty { "\n  " } else { "" }
    }
}

impl<W: io::Write + Send> Writer for JsonWriter<W> {
    fn write_schema(&mut self, schema: &Schema) -> Result<()> {
        let metadata = serde_json::to_string(&Metadata {
            columns: schema.columns(),
        })?;
        write!(self.out, "{{\"metadata\":{{\"columns\":{metadata}")?;
        write!(self.out, "}},\"records\":[")?;
        Ok(())
    }

    fn write_row(&mut self, row: &Row) -> Result<()> {
        let mut record: BTreeMap<&str, serde_json::Value> = row
            .values()
            .iter()
            .map(|(id, value)| (id.as_str(), serde_json::Value::from(value.as_str())))
            .collect();
        if let Some(id) = row.id() {
            record.insert("tdpId", serde_json::Value::from(id));
        }
        if self.records > 0 {
            self.out.write_all(b",")?;
        }
        self.out.write_all(self.separator().as_bytes())?;
        serde_json::to_writer(&mut self.out, &record)?;
        self.records += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if self.pretty && self.records > 0 {
            self.out.write_all(b"\n")?;
        }
        self.out.write_all(b"]}")?;
        self.out.flush()?;
        tracing::debug!(records = self.records, "JSON output flushed");
        Ok(())
    }
}

impl<W: Writer + ?Sized> Writer for Box<W> {
    fn write_schema(&mut self, schema: &Schema) -> Result<()> {
        (**self).write_schema(schema)
    }

    fn write_row(&mut self, row: &Row) -> Result<()> {
        (**self).write_row(row)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

/// What a [`CollectingWriter`] received.
#[derive(Debug, Default)]
pub struct Written {
    /// Final schema, once written.
    pub schema: Option<Schema>,
    /// Rows, in write order.
    pub rows: Vec<Row>,
    /// Number of flush calls.
    pub flushes: usize,
}

/// Shared view of a [`CollectingWriter`]'s output.
pub type WrittenHandle = Arc<Mutex<Written>>;

/// Writer keeping everything in memory.
#[derive(Debug, Clone)]
pub struct CollectingWriter {
    written: WrittenHandle,
}

impl CollectingWriter {
    /// Create a writer and the handle to read its output.
    pub fn new() -> (Self, WrittenHandle) {
        let written = WrittenHandle::default();
        (
            Self {
                written: Arc::clone(&written),
            },
            written,
        )
    }
}

impl Writer for CollectingWriter {
    fn write_schema(&mut self, schema: &Schema) -> Result<()> {
        self.written.lock().schema = Some(schema.clone());
        Ok(())
    }

    fn write_row(&mut self, row: &Row) -> Result<()> {
        self.written.lock().rows.push(row.clone());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.written.lock().flushes += 1;
        Ok(())
    }
}
