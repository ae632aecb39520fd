//! Bazaar Domain - Core session types
//!
//! This crate defines the domain model for the Bazaar storefront and
//! vendor-dashboard session layer. All types here are pure Rust with
//! no I/O dependencies.

pub mod error;
pub mod event;
pub mod id;
pub mod identity;
pub mod location;
pub mod redirect;
pub mod request;
pub mod response;
pub mod settings;
pub mod state;

pub use error::{DomainError, DomainResult};
pub use event::SessionEvent;
pub use id::generate_id_v7;
pub use identity::{IdentityRecord, Role};
pub use location::Location;
pub use redirect::{LoginReason, RedirectPolicy};
pub use request::{ApiRequest, HttpMethod};
pub use response::ApiResponse;
pub use settings::{
    ApiSettings, GuardSettings, InvalidationSettings, NamespaceRule, RouteSettings,
    StorageSettings,
};
pub use state::{GuardState, RenderEnvironment};
