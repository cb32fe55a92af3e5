//! Low-level plumbing for reading the xlsx package.
pub(crate) mod xml;
pub(crate) mod zip;
