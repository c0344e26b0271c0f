//! Import form: one export file, one provider, one submission at a time.

use std::path::Path;

use memory_api::{Error, ImportAck, ImportSource, Upload};
use thiserror::Error;

use crate::input::InputBuffer;
use crate::task::Ticket;

#[derive(Debug, Clone, PartialEq)]
pub enum ImportStatus {
    Idle,
    Pending(Ticket),
    Succeeded(ImportAck),
    Failed(String),
}

/// Why the form refused an action. No request is issued for any of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportRejected {
    #[error("choose a file to import first")]
    NoFile,

    #[error("an import is already running")]
    Busy,

    #[error("could not read {path}: {reason}")]
    Unreadable { path: String, reason: String },
}

/// Read the file at `path` into an [`Upload`] named after its final component.
pub async fn read_upload(path: impl AsRef<Path>) -> Result<Upload, ImportRejected> {
    let path = path.as_ref();
    let unreadable = |reason: String| ImportRejected::Unreadable {
        path: path.display().to_string(),
        reason,
    };

    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| unreadable(e.to_string()))?;
    if !metadata.is_file() {
        return Err(unreadable("not a regular file".to_string()));
    }

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| unreadable(e.to_string()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    tracing::debug!(file = %file_name, bytes = bytes.len(), "loaded import file");
    Ok(Upload::new(file_name, bytes))
}

#[derive(Debug)]
pub struct ImportForm {
    path: InputBuffer,
    file: Option<Upload>,
    source: ImportSource,
    status: ImportStatus,
}

impl Default for ImportForm {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportForm {
    pub fn new() -> Self {
        Self {
            path: InputBuffer::new(),
            file: None,
            source: ImportSource::default(),
            status: ImportStatus::Idle,
        }
    }

    pub fn path(&self) -> &InputBuffer {
        &self.path
    }

    /// The path prompt. Unavailable while an import is running.
    pub fn path_mut(&mut self) -> Option<&mut InputBuffer> {
        if self.is_pending() {
            None
        } else {
            Some(&mut self.path)
        }
    }

    pub fn file(&self) -> Option<&Upload> {
        self.file.as_ref()
    }

    pub fn source(&self) -> ImportSource {
        self.source
    }

    pub fn status(&self) -> &ImportStatus {
        &self.status
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.status, ImportStatus::Pending(_))
    }

    pub fn can_submit(&self) -> bool {
        self.file.is_some() && !self.is_pending()
    }

    pub fn set_source(&mut self, source: ImportSource) -> Result<(), ImportRejected> {
        if self.is_pending() {
            return Err(ImportRejected::Busy);
        }
        self.source = source;
        Ok(())
    }

    pub fn toggle_source(&mut self) -> Result<ImportSource, ImportRejected> {
        let next = match self.source {
            ImportSource::ChatGpt => ImportSource::Claude,
            ImportSource::Claude => ImportSource::ChatGpt,
        };
        self.set_source(next)?;
        Ok(next)
    }

    /// Replace the selected file. A finished import's outcome is cleared.
    pub fn select_file(&mut self, upload: Upload) -> Result<(), ImportRejected> {
        if self.is_pending() {
            return Err(ImportRejected::Busy);
        }
        self.file = Some(upload);
        self.status = ImportStatus::Idle;
        Ok(())
    }

    /// Submit the selected file. `dispatch` runs at most once.
    pub fn submit(
        &mut self,
        dispatch: impl FnOnce(Upload, ImportSource) -> Ticket,
    ) -> Result<Ticket, ImportRejected> {
        if self.is_pending() {
            return Err(ImportRejected::Busy);
        }
        let upload = self.file.clone().ok_or(ImportRejected::NoFile)?;

        let ticket = dispatch(upload, self.source);
        self.status = ImportStatus::Pending(ticket);
        Ok(ticket)
    }

    pub fn apply_result(&mut self, ticket: Ticket, result: Result<ImportAck, Error>) -> bool {
        if self.status != ImportStatus::Pending(ticket) {
            tracing::debug!(?ticket, "ignoring import result the form is not waiting for");
            return false;
        }

        self.status = match result {
            Ok(ack) => {
                tracing::info!(status = ?ack.status(), "import finished");
                ImportStatus::Succeeded(ack)
            }
            Err(e) => {
                tracing::warn!(error = %e, "import failed");
                ImportStatus::Failed(e.to_string())
            }
        };
        true
    }

    pub fn status_line(&self) -> String {
        match &self.status {
            ImportStatus::Idle => match &self.file {
                Some(file) => format!(
                    "Ready to import {} ({} bytes) from {}",
                    file.file_name,
                    file.len(),
                    self.source.label()
                ),
                None => "No file selected".to_string(),
            },
            ImportStatus::Pending(_) => "Importing...".to_string(),
            ImportStatus::Succeeded(ack) => match ack.message() {
                Some(message) => format!("Import complete: {message}"),
                None => "Import complete".to_string(),
            },
            ImportStatus::Failed(reason) => format!("Import failed: {reason}"),
        }
    }
}
