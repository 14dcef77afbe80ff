//! Admin console for dictionary data records.
//!
//! The backend REST service owns all persistence; this crate is the
//! screen in front of it: a searchable paginated table, a create/edit
//! modal, single and bulk deletion with confirmation, and an
//! export-to-spreadsheet action.

pub mod api;
pub mod config;
pub mod models;
pub mod notify;
pub mod tui;
