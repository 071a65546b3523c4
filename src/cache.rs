use tracing::{debug, warn};

use crate::error::Result;
use crate::source::TicketSource;

/// Status of the rows behind the ticket page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketRows {
    Loading,
    Loaded(Vec<String>),
    Failed(String),
}

/// Rows from the most recent fetch, guarded by a load sequence number so a
/// superseded fetch can never overwrite a newer one.
#[derive(Debug)]
pub struct TicketCache {
    rows: TicketRows,
    load_id: u64,
}

impl Default for TicketCache {
    fn default() -> Self {
        Self {
            rows: TicketRows::Loaded(Vec::new()),
            load_id: 0,
        }
    }
}

impl TicketCache {
    /// Start a new fetch generation; returns its id.
    pub fn begin(&mut self) -> u64 {
        self.load_id += 1;
        self.rows = TicketRows::Loading;
        self.load_id
    }

    /// Drop whatever fetch is in flight without touching the stored rows.
    pub fn cancel(&mut self) {
        self.load_id += 1;
    }

    /// Store a fetch result if it belongs to the latest generation.
    pub fn complete(
        &mut self,
        load_id: u64,
        result: std::result::Result<Vec<String>, String>,
    ) -> bool {
        if load_id != self.load_id {
            debug!(load_id, latest = self.load_id, "discarding stale ticket fetch");
            return false;
        }

        self.rows = match result {
            Ok(rows) => TicketRows::Loaded(rows),
            Err(message) => TicketRows::Failed(message),
        };
        true
    }

    pub fn state(&self) -> &TicketRows {
        &self.rows
    }

    /// Loaded rows; empty while loading or after a failure.
    pub fn rows(&self) -> &[String] {
        match &self.rows {
            TicketRows::Loaded(rows) => rows,
            TicketRows::Loading | TicketRows::Failed(_) => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.rows().len()
    }

    pub fn is_loading(&self) -> bool {
        self.rows == TicketRows::Loading
    }

    pub fn load_id(&self) -> u64 {
        self.load_id
    }
}

/// Run `expression` against the source and return the full row set.
pub async fn refresh(source: &dyn TicketSource, expression: &str) -> Result<Vec<String>> {
    debug!(source = source.name(), expression, "fetching tickets");
    match source.search(expression).await {
        Ok(rows) => {
            debug!(count = rows.len(), "tickets fetched");
            Ok(rows)
        }
        Err(e) => {
            warn!(error = %e, expression, "ticket fetch failed");
            Err(e)
        }
    }
}
