//! # booking-chat-storage
//!
//! Filesystem-backed [`ObjectStore`](booking_chat_core::ObjectStore) for chat
//! media. Objects live at `<media_root>/chat-media/<thread_id>/<uuid>-<name>`
//! and are read back only through short-lived signed URLs.

mod local;
mod signer;

pub use local::LocalObjectStore;
pub use signer::{MediaClaims, MediaUrlSigner, SignedUrlError};
