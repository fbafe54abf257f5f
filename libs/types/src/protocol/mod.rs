//! Protocol wire definitions: header layout, domains, sources, TLV registry.

pub mod constants;
pub mod message;
pub mod relay_domain;
pub mod source_type;
pub mod tlv;
