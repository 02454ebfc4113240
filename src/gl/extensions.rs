//! One-time binding of optional graphics API entry points
//!
//! The host hands in a resolver that maps an entry point name to its address
//! in the current graphics context. Each [`Extension`] lists the entry points
//! it needs, each with alternative vendor names tried in order. An extension
//! whose entry points cannot all be resolved is marked unavailable; rendering
//! paths that depend on it check [`ExtensionSet::is_available`] and fall back.

use crate::prelude::HashMap;
use crate::{Error, Result};
use once_cell::sync::{Lazy, OnceCell};
use std::ffi::c_void;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicBool, Ordering};

/// Non-null address of a graphics API entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcAddress(NonNull<c_void>);

// A code address; it is never dereferenced as data by this crate.
unsafe impl Send for ProcAddress {}
unsafe impl Sync for ProcAddress {}

impl ProcAddress {
    /// `None` for a null pointer, which is how hosts report a missing symbol
    pub fn from_ptr(ptr: *const c_void) -> Option<Self> {
        NonNull::new(ptr as *mut c_void).map(Self)
    }

    pub fn as_ptr(&self) -> *const c_void {
        self.0.as_ptr()
    }
}

/// Something that can look up entry points in the graphics context that is
/// current on the calling thread
pub trait GlContext {
    fn proc_address(&self, name: &str) -> Option<ProcAddress>;
}

/// An entry point and the names it may be exported under
#[derive(Debug)]
pub struct ExtensionFunction {
    pub name: &'static str,
    pub candidates: &'static [&'static str],
}

const fn function(
    name: &'static str,
    candidates: &'static [&'static str],
) -> ExtensionFunction {
    ExtensionFunction { name, candidates }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Extension {
    VertexArrayObject,
    ProgramBinary,
    DebugOutput,
    TextureHalfFloat,
    AnisotropicFiltering,
}

static VERTEX_ARRAY_OBJECT: [ExtensionFunction; 3] = [
    function(
        "glBindVertexArray",
        &["glBindVertexArray", "glBindVertexArrayOES", "glBindVertexArrayAPPLE"],
    ),
    function(
        "glDeleteVertexArrays",
        &["glDeleteVertexArrays", "glDeleteVertexArraysOES", "glDeleteVertexArraysAPPLE"],
    ),
    function(
        "glGenVertexArrays",
        &["glGenVertexArrays", "glGenVertexArraysOES", "glGenVertexArraysAPPLE"],
    ),
];

static PROGRAM_BINARY: [ExtensionFunction; 2] = [
    function("glGetProgramBinary", &["glGetProgramBinary", "glGetProgramBinaryOES"]),
    function("glProgramBinary", &["glProgramBinary", "glProgramBinaryOES"]),
];

static DEBUG_OUTPUT: [ExtensionFunction; 2] = [
    function(
        "glDebugMessageControl",
        &["glDebugMessageControl", "glDebugMessageControlARB", "glDebugMessageControlKHR"],
    ),
    function(
        "glDebugMessageCallback",
        &["glDebugMessageCallback", "glDebugMessageCallbackARB", "glDebugMessageCallbackKHR"],
    ),
];

// Pure capability flags; presence is signalled by an entry point of the same
// extension family.
static TEXTURE_HALF_FLOAT: [ExtensionFunction; 1] = [function(
    "glTexStorage2D",
    &["glTexStorage2D", "glTexStorage2DEXT"],
)];

static ANISOTROPIC_FILTERING: [ExtensionFunction; 1] = [function(
    "glSamplerParameterf",
    &["glSamplerParameterf", "glSamplerParameterfEXT"],
)];

impl Extension {
    pub const ALL: [Extension; 5] = [
        Extension::VertexArrayObject,
        Extension::ProgramBinary,
        Extension::DebugOutput,
        Extension::TextureHalfFloat,
        Extension::AnisotropicFiltering,
    ];

    pub fn functions(&self) -> &'static [ExtensionFunction] {
        match self {
            Self::VertexArrayObject => &VERTEX_ARRAY_OBJECT,
            Self::ProgramBinary => &PROGRAM_BINARY,
            Self::DebugOutput => &DEBUG_OUTPUT,
            Self::TextureHalfFloat => &TEXTURE_HALF_FLOAT,
            Self::AnisotropicFiltering => &ANISOTROPIC_FILTERING,
        }
    }
}

/// Outcome of extension initialization
#[derive(Debug, Default)]
pub struct ExtensionSet {
    addresses: HashMap<&'static str, ProcAddress>,
    available: Vec<Extension>,
}

impl ExtensionSet {
    fn resolve<F>(mut resolver: F) -> Self
    where
        F: FnMut(&str) -> Option<ProcAddress>,
    {
        let mut set = Self::default();

        for extension in Extension::ALL {
            let mut resolved = Vec::new();
            for entry in extension.functions() {
                match entry.candidates.iter().find_map(|name| resolver(*name)) {
                    Some(address) => resolved.push((entry.name, address)),
                    None => {
                        log::warn!(
                            "{:?} unavailable: no address for {}",
                            extension,
                            entry.name
                        );
                        break;
                    }
                }
            }

            if resolved.len() == extension.functions().len() {
                set.addresses.extend(resolved);
                set.available.push(extension);
            }
        }

        set
    }

    pub fn is_available(&self, extension: Extension) -> bool {
        self.available.contains(&extension)
    }

    /// Address of an entry point by its canonical name
    pub fn address(&self, name: &str) -> Option<ProcAddress> {
        self.addresses.get(name).copied()
    }

    pub fn available(&self) -> &[Extension] {
        &self.available
    }
}

/// Guards the single initialization call
#[derive(Debug, Default)]
pub struct GlExtensions {
    started: AtomicBool,
    set: OnceCell<ExtensionSet>,
}

impl GlExtensions {
    pub const fn new() -> Self {
        Self {
            started: AtomicBool::new(false),
            set: OnceCell::new(),
        }
    }

    /// Resolve every known extension through `resolver`.
    ///
    /// Must run once, on the thread whose graphics context is current. A second
    /// or reentrant call is rejected.
    pub fn initialize<F>(&self, resolver: F) -> Result<&ExtensionSet>
    where
        F: FnMut(&str) -> Option<ProcAddress>,
    {
        if self.started.swap(true, Ordering::AcqRel) {
            return Err(Error::Graphics(
                "graphics extensions are already initialized".into(),
            ));
        }

        let set = self.set.get_or_init(|| ExtensionSet::resolve(resolver));
        log::info!("graphics extensions initialized: {:?}", set.available());
        Ok(set)
    }

    /// Initialize from the context current on this thread.
    ///
    /// # Panics
    ///
    /// Panics if `context` is `None`: binding without a current context leaves
    /// the capability set undefined.
    pub fn initialize_from_context(&self, context: Option<&dyn GlContext>) -> Result<&ExtensionSet> {
        let Some(context) = context else {
            panic!("graphics extensions initialized without a current graphics context");
        };
        self.initialize(|name| context.proc_address(name))
    }

    pub fn extensions(&self) -> Option<&ExtensionSet> {
        self.set.get()
    }

    /// False until initialized
    pub fn is_available(&self, extension: Extension) -> bool {
        self.extensions()
            .map(|set| set.is_available(extension))
            .unwrap_or(false)
    }
}

static GLOBAL_EXTENSIONS: Lazy<GlExtensions> = Lazy::new(GlExtensions::new);

/// Initialize the process-wide extension set
pub fn initialize_extensions<F>(resolver: F) -> Result<&'static ExtensionSet>
where
    F: FnMut(&str) -> Option<ProcAddress>,
{
    GLOBAL_EXTENSIONS.initialize(resolver)
}

/// The process-wide extension set, once initialized
pub fn extensions() -> Option<&'static ExtensionSet> {
    GLOBAL_EXTENSIONS.extensions()
}
