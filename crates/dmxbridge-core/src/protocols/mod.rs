//! Lighting network protocols.
//!
//! Each protocol follows a layered structure:
//! - `layout`: byte offsets and ranges (source of truth)
//! - `writer`: safe byte access
//! - `encoder`: packet assembly (no direct byte indexing)
//! - `sender`: socket handling
//! - `error`: explicit, actionable errors

pub mod artnet;
