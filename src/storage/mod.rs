//! SQLite storage for student, academic, attendance and fee records.

mod records;

pub use records::RecordStore;
