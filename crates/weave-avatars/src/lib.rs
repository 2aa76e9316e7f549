//! # Weave Avatars
//!
//! Best-effort avatar collection for the handles in a weave roster.
//!
//! Every roster entry ends up as `<user_dir>/<handle>.png`. Local entries are
//! read from disk, remote entries are resolved through an [`IdentityLookup`]
//! and downloaded. Every image is normalized to RGBA PNG before it is written,
//! and an artifact that already exists is never touched.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use weave_avatars::{AvatarFetcher, GithubLookup, DEFAULT_API_BASE};
//!
//! let lookup = GithubLookup::new(DEFAULT_API_BASE, std::env::var("GITHUB_TOKEN").ok())?;
//! let fetcher = AvatarFetcher::new("users", Arc::new(lookup));
//! let report = fetcher.fetch_all(&roster).await?;
//! ```
//!
//! ## Failure model
//!
//! A failing handle is logged and counted in the [`FetchReport`]; the pass
//! moves on to the next handle.

pub mod error;
pub mod fetch;
pub mod lookup;
pub mod normalize;

// Re-export main types
pub use error::AvatarError;
pub use fetch::{AvatarFetcher, FetchOutcome, FetchReport};
pub use lookup::{GithubLookup, IdentityLookup, DEFAULT_API_BASE};
pub use normalize::normalize_image;
