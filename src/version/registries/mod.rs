//! Registry implementations for listing image tags

pub mod oci;

pub use oci::OciRegistry;
