//! SQLite repositories
//!
//! Row types (UserRow, LeadRow, ...) are imported from `crate::data::types`.

pub mod lead;
pub mod user;

pub use lead::{
    DUPLICATE_LEAD_EMAIL, count_leads, create_lead, delete_lead, find_leads, get_lead,
    update_lead,
};
pub use user::{DUPLICATE_USER_EMAIL, create_user, get_by_email, get_user};
