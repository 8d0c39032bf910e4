//! # sorng-skydrive – SkyDrive / Live Connect Integration
//!
//! Built against the **Live Connect REST API v5.0** (`https://apis.live.net/v5.0`).
//!
//! ## Capabilities
//!
//! - **OAuth2** – consent URL, authorization-code exchange and silent refresh
//!   through the login.live.com endpoints.  Refresh tokens are handed to a
//!   [`RefreshTokenStore`] (in-memory or JSON file).
//! - **Items** – `file` / `folder` responses become [`FileItem`] /
//!   [`FolderItem`] inside a [`ResourceItem`]; unknown types are rejected.
//! - **Folders** – list children (all, folders only, files only), create
//!   sub-folders, upload into a folder, resolve friendly-name paths.
//! - **Files** – streaming download to a reader or a local file.
//! - **Properties** – read, write (rename / describe), refresh in place.
//! - **Move / Copy / Delete** by item or by bare id.
//! - **Sharing** – shared read link, shared edit link, embed HTML.
//!
//! The HTTP layer sits behind the [`LiveTransport`] trait; the
//! [`SimulatedTransport`] implements it in memory for tests and offline use.

pub mod types;
pub mod error;
pub mod accessor;
pub mod token_store;
pub mod transport;
pub mod api_client;
pub mod auth;
pub mod items;
pub mod client;

// Re-exports
pub use accessor::{FromResponseValue, ResponseMapExt};
pub use api_client::LiveConnectClient;
pub use auth::LiveAuthClient;
pub use client::SkyDriveClient;
pub use error::{SkyDriveError, SkyDriveErrorCode, SkyDriveResult};
pub use items::{FileItem, FolderItem, ItemProperties, ResourceItem, SkyDriveItem};
pub use token_store::{FileTokenStore, MemoryTokenStore, RefreshTokenRecord, RefreshTokenStore};
pub use transport::{LiveTransport, SimulatedTransport};
pub use types::*;
