use crate::error::TixError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    Up,
    Down,
    Select,

    // Fetch completion, tagged with the load that produced it
    TicketsLoaded { rows: Vec<String>, load_id: u64 },
    TicketsFailed { message: String, load_id: u64 },

    None,
}

impl Action {
    pub fn from_fetch(result: Result<Vec<String>, TixError>, load_id: u64) -> Self {
        match result {
            Ok(rows) => Action::TicketsLoaded { rows, load_id },
            Err(e) => Action::TicketsFailed {
                message: e.to_string(),
                load_id,
            },
        }
    }
}
