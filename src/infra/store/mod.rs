mod user_store;

pub use user_store::{StoreError, UserRecord, UserStore, hash_password};
