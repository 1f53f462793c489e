//! Batch export of events to a JSON-lines file.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::Error;
use crate::time::{Clock, SystemClock};

use super::EventOptions;
use super::body::{EventBody, ITEM_ENTITY, SET_EVENT, UNSET_EVENT, USER_ENTITY, targeting_item};

/// Writes events to a file, one JSON object per line, for bulk import.
///
/// Lines have the same shape as the bodies [`EventClient`](crate::EventClient)
/// posts. Events are buffered; call [`close`](Self::close) to flush and
/// observe write errors.
///
/// # Example
///
/// ```no_run
/// use predictionio::{EventOptions, FileExporter};
///
/// # fn example() -> Result<(), predictionio::Error> {
/// let mut exporter = FileExporter::create("events.json")?;
/// exporter.set_user("u1", &EventOptions::new().with_property("age", 28))?;
/// exporter.record_user_action_on_item("buy", "u1", "i1", &EventOptions::new())?;
/// exporter.close()?;
/// # Ok(())
/// # }
/// ```
pub struct FileExporter {
    path: PathBuf,
    writer: BufWriter<File>,
    clock: Arc<dyn Clock>,
    written: usize,
}

impl std::fmt::Debug for FileExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileExporter")
            .field("path", &self.path)
            .field("written", &self.written)
            .finish_non_exhaustive()
    }
}

impl FileExporter {
    /// Creates (or truncates) the export file, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be created.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(&path)?;
        tracing::debug!(path = %path.display(), "Opened export file");

        Ok(Self {
            path,
            writer: BufWriter::new(file),
            clock: Arc::new(SystemClock),
            written: 0,
        })
    }

    /// Replaces the clock that stamps events without an explicit time.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// The file being written.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of events written so far.
    #[must_use]
    pub const fn events_written(&self) -> usize {
        self.written
    }

    /// Appends one event.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] for an invalid `$unset` event
    /// - [`Error::Io`] if writing fails
    pub fn create_event(
        &mut self,
        event: &str,
        entity_type: &str,
        entity_id: &str,
        options: &EventOptions,
    ) -> Result<(), Error> {
        let body = EventBody::new(event, entity_type, entity_id, options, self.clock.as_ref())?;
        let line = body.to_json()?;

        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    /// Writes a `$set` event for a user.
    ///
    /// # Errors
    ///
    /// Same as [`create_event`](Self::create_event).
    pub fn set_user(&mut self, uid: &str, options: &EventOptions) -> Result<(), Error> {
        self.create_event(SET_EVENT, USER_ENTITY, uid, options)
    }

    /// Writes a `$unset` event for a user.
    ///
    /// # Errors
    ///
    /// Same as [`create_event`](Self::create_event).
    pub fn unset_user(&mut self, uid: &str, options: &EventOptions) -> Result<(), Error> {
        self.create_event(UNSET_EVENT, USER_ENTITY, uid, options)
    }

    /// Writes a `$set` event for an item.
    ///
    /// # Errors
    ///
    /// Same as [`create_event`](Self::create_event).
    pub fn set_item(&mut self, iid: &str, options: &EventOptions) -> Result<(), Error> {
        self.create_event(SET_EVENT, ITEM_ENTITY, iid, options)
    }

    /// Writes a `$unset` event for an item.
    ///
    /// # Errors
    ///
    /// Same as [`create_event`](Self::create_event).
    pub fn unset_item(&mut self, iid: &str, options: &EventOptions) -> Result<(), Error> {
        self.create_event(UNSET_EVENT, ITEM_ENTITY, iid, options)
    }

    /// Writes a user event targeting item `iid`.
    ///
    /// # Errors
    ///
    /// Same as [`create_event`](Self::create_event).
    pub fn record_user_action_on_item(
        &mut self,
        action: &str,
        uid: &str,
        iid: &str,
        options: &EventOptions,
    ) -> Result<(), Error> {
        self.create_event(action, USER_ENTITY, uid, &targeting_item(options, iid))
    }

    /// Flushes buffered events and closes the file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if flushing fails.
    pub fn close(mut self) -> Result<(), Error> {
        self.writer.flush()?;
        tracing::debug!(path = %self.path.display(), events = self.written, "Closed export file");
        Ok(())
    }
}
