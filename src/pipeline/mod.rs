//! Pipeline stages for layout-to-text conversion.
//!
//! Each submodule implements exactly one transformation step, leaves first.
//! Only [`assemble`] holds run state; everything else is a pure function of
//! its arguments.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ padding ──▶ classify ──▶ table ──▶ toc ──▶ assemble ──▶ postprocess
//! (JSON)    (margins)   (normalize)  (grids)   (index)  (buffer)     (polish)
//! ```
//!
//! 1. [`input`]     — read and sniff the layout dump, deserialize it
//! 2. [`padding`]   — page content margins from the layout log
//! 3. [`classify`]  — font-size and indentation roles; text goes through
//!    [`normalize`]
//! 4. [`table`]     — reject degenerate candidates, render GFM grids
//! 5. [`toc`]       — dotted-leader TOC lines and the breadcrumb index;
//!    [`state`] tracks where the run is relative to the TOC
//! 6. [`assemble`]  — reading order, the pending-TOC buffer, page loop
//! 7. [`postprocess`] — deterministic final polish

pub mod assemble;
pub mod classify;
pub mod input;
pub mod normalize;
pub mod padding;
pub mod postprocess;
pub mod state;
pub mod table;
pub mod toc;
