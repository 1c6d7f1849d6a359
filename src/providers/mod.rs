//! Provider implementations

pub mod oci;
