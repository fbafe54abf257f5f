//! Bijective instrument identifier system.
//!
//! Self-describing identifiers that embed venue, asset type and
//! venue-specific identifying data in a reversible format, with no
//! external mapping table anywhere:
//! - Deterministic: same input always produces the same id
//! - Reversible: venue, asset type and details come back out
//! - Cache-friendly: packs to a u64 key for O(1) lookups

pub mod instrument;
pub mod pairing;

pub use instrument::{AssetType, IdentityError, InstrumentId, VenueId};
pub use pairing::{cantor_pair, cantor_unpair, POOL_OPERAND_BITS};
