//! Command Handlers
//!
//! Operations invoked by the UI or the CLI, organized by domain. Each takes
//! the `App` context; locks on the state are never held across a gateway
//! call.

mod load_cmd;
mod inventory_cmd;
mod event_cmd;
mod proof_cmd;


pub use load_cmd::*;
pub use inventory_cmd::*;
pub use event_cmd::*;
pub use proof_cmd::*;

use serde::Serialize;
use serde_json::Value;

use crate::domain::DomainResult;

/// Serialize a new record into a backend row
pub(crate) fn to_row<T: Serialize>(record: &T) -> DomainResult<Value> {
    Ok(serde_json::to_value(record)?)
}
