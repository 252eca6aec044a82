//! Session handling for SkyCast.
//!
//! The session token is the only state persisted by the client. It lives in
//! a `CredentialStore` and is exposed to views through `SessionContext`.

pub mod confirm;
pub mod session;
pub mod storage;

pub use confirm::{AlwaysConfirm, Confirmer};
pub use session::{Navigator, Route, RouteLog, SessionContext, SESSION_KEY};
pub use storage::{
    open_store, CredentialStore, FileCredentialStore, KeyringCredentialStore,
    MemoryCredentialStore,
};
