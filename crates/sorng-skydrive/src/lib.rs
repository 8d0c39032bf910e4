//! # SortOfRemote NG – SkyDrive / Live Connect
//!
//! Typed client for the Live Connect v5.0 storage object graph:
//!
//! - **Refresh-token persistence** – pluggable single-slot store so a signed-in
//!   session survives process restarts
//! - **Resource items** – folders and files projected from loosely-typed REST
//!   responses, with chained async operations
//! - **Transfers** – streaming upload from readers or local files, streaming
//!   download to readers or local files
//! - **Sharing** – read, edit and embed links

pub mod skydrive;

pub use skydrive::*;
