//! Graphics context capability probing

pub mod extensions;

pub use extensions::{Extension, ExtensionSet, GlContext, GlExtensions, ProcAddress};
