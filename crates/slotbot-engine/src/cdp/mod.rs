//! Chrome DevTools Protocol substrate.
//!
//! A deliberately small CDP client: endpoint discovery over HTTP, one
//! command WebSocket, per-target page sessions, and a launcher that owns a
//! Chrome process per profile directory. Everything above this module
//! talks in terms of [`PageSession`] operations and never sees a raw
//! WebSocket frame.

mod client;
mod error;
mod launcher;
mod page;
mod protocol;

pub use client::CdpClient;
pub use error::CdpError;
pub use launcher::ChromeProcess;
pub use page::PageSession;
pub use protocol::{BoxModel, BrowserVersion, CdpRequest, CdpResponse, PageInfo, RemoteObject};
