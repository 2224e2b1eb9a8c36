pub use key::RecordKey;
pub use memory::{RecordStore, Transaction};

pub mod key;
pub mod memory;
