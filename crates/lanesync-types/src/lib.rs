//! Shared identity and record types for lanesync.
//!
//! This crate is the leaf of the workspace: typed IDs, raw sort values, the
//! polymorphic card→lane reference, and the raw records the external store
//! delivers. It has **no internal lanesync dependencies**.
//!
//! # Shape of a snapshot
//!
//! ```text
//! BoardSnapshot
//! ├── lanes: Source<LaneRecord>   { status, items }
//! │       └── LaneRecord { id, sort, guid, attributes }
//! └── cards: Source<CardRecord>   { status, items }
//!         └── CardRecord { id, sort, lane: LaneRef, attributes }
//! ```
//!
//! # Key Types
//!
//! |-------------------|----------------------------------------------|
//! | Type              | Purpose                                      |
//! |-------------------|----------------------------------------------|
//! | [`LaneId`]        | Which lane (group)                           |
//! | [`CardId`]        | Which card (item)                            |
//! | [`SortValue`]     | Raw sort attribute, coerced to a finite f64  |
//! | [`DecimalKey`]    | Fixed-point decimal sort value / commit rank |
//! | [`LaneRef`]       | Owning-lane reference in any store shape     |
//! | [`LaneRecord`]    | Raw lane                                     |
//! | [`CardRecord`]    | Raw card                                     |
//! | [`Source`]        | Records plus load status                     |
//! | [`BoardSnapshot`] | One refresh of both sources                  |
//! |-------------------|----------------------------------------------|

pub mod ids;
pub mod lane_ref;
pub mod record;
pub mod sort;

pub use ids::{CardId, LaneId};
pub use lane_ref::{LaneRef, RefKey, WrappedRef};
pub use record::{BoardSnapshot, CardRecord, LaneRecord, Source, SourceStatus};
pub use sort::{DecimalKey, SortValue, parse_leading_float};
