pub mod firestore;
pub mod identity;
pub mod store;
pub mod subscription;
pub mod sync_engine;
