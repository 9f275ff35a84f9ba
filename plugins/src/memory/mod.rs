pub mod local;

pub use local::FileHistoryStore;
