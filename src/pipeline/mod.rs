//! Content stages that run before layout.
//!
//! Each submodule does one transformation and knows nothing about pages.
//!
//! ## Data Flow
//!
//! ```text
//! narrative ──▶ blocks ──▶ table        records ──▶ aggregate
//!                 │                     branding ──▶ assets
//!                 └──▶ sanitize (every string on its way to the surface)
//! ```
//!
//! 1. [`sanitize`]  — font-safe text and markdown stripping
//! 2. [`blocks`]    — classify narrative lines, one line of look-ahead
//! 3. [`table`]     — pipe rows → header + body cells
//! 4. [`aggregate`] — date filter, group-by-dimension, group-by-month
//! 5. [`assets`]    — fetch, shrink and re-encode logo / signature images

pub mod aggregate;
pub mod assets;
pub mod blocks;
pub mod sanitize;
pub mod table;
