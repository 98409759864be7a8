//! Shared data types for the storage layer

mod lead;
mod user;

pub use lead::{
    LEAD_COLUMNS, LeadChanges, LeadRow, LeadSource, LeadStatus, NewLead, UnknownVariant,
};
pub use user::UserRow;
