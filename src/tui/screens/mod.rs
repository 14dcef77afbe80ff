//! Screen state for the admin console

pub mod editor;
pub mod records;
pub mod search;

pub use editor::{ModalMode, ModalState, RecordForm};
pub use records::RecordsScreen;
pub use search::SearchScreen;
