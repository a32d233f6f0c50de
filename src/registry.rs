//! The pixel data handler registry.
//!
//! A [`HandlerRegistry`] is an ordered list of
//! [handlers](crate::handlers::PixelDataHandler):
//! dispatch walks the list in order and
//! the first handler claiming support for a data set's configuration wins,
//! so position encodes preference.
//! An empty registry is legal and makes every dispatch fail
//! with an unsupported transfer syntax error.
//!
//! One registry instance is process-wide state,
//! accessible through [`get_registry`] and [`set_registry`].
//! It is a deliberate extension point:
//! callers install or remove backends by replacing the list,
//! and nothing resets it implicitly.
//! Tests and other scoped callers should prefer
//! [`HandlerRegistry::install_scoped`],
//! which restores the previous registry when the guard is dropped.
//! The pipeline also accepts a registry argument directly
//! (see [`decode_pixel_data_with`](crate::decode_pixel_data_with)),
//! so the global instance is a convenience, not a requirement.

use lazy_static::lazy_static;
use std::sync::{Mutex, PoisonError};

use crate::handlers::native::NativeHandler;
use crate::handlers::{DynPixelDataHandler, PixelDataHandler};
use crate::photometric::PhotometricInterpretation;

/// An ordered list of pixel data handlers,
/// consulted front to back.
#[derive(Debug, Clone, Default)]
pub struct HandlerRegistry {
    handlers: Vec<DynPixelDataHandler>,
}

impl HandlerRegistry {
    /// Create an empty registry.
    pub fn empty() -> Self {
        HandlerRegistry::default()
    }

    /// Create a registry holding the built-in handlers:
    /// the compiled-in compressed-syntax adapters first,
    /// then the pure-numeric fallback for uncompressed syntaxes.
    pub fn with_default_handlers() -> Self {
        let mut registry = HandlerRegistry::empty();
        #[cfg(feature = "jpeg")]
        registry.push(crate::handlers::jpeg::JpegHandler);
        registry.push(crate::handlers::jpeg2k::Jpeg2000Handler);
        registry.push(NativeHandler);
        registry
    }

    /// Create a registry holding only the pure-numeric fallback.
    pub fn fallback_only() -> Self {
        let mut registry = HandlerRegistry::empty();
        registry.push(NativeHandler);
        registry
    }

    /// Append a handler with the lowest preference.
    pub fn push<H>(&mut self, handler: H)
    where
        H: PixelDataHandler + 'static,
    {
        self.handlers.push(std::sync::Arc::new(handler));
    }

    /// Insert a handler at the given position
    /// (0 being the highest preference).
    pub fn insert<H>(&mut self, index: usize, handler: H)
    where
        H: PixelDataHandler + 'static,
    {
        self.handlers.insert(index, std::sync::Arc::new(handler));
    }

    /// The number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no handlers are registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Iterate over the registered handlers in preference order.
    pub fn iter(&self) -> impl Iterator<Item = &DynPixelDataHandler> {
        self.handlers.iter()
    }

    /// Find the first handler claiming support
    /// for the given configuration.
    pub fn select(
        &self,
        transfer_syntax: &str,
        photometric_interpretation: &PhotometricInterpretation,
        bits_allocated: u16,
    ) -> Option<&DynPixelDataHandler> {
        self.handlers
            .iter()
            .find(|h| h.supports(transfer_syntax, photometric_interpretation, bits_allocated))
    }

    /// Install this registry as the process-wide registry,
    /// returning a guard which restores the previous one when dropped.
    pub fn install_scoped(self) -> RegistryGuard {
        let previous = replace_registry(self);
        RegistryGuard {
            previous: Some(previous),
        }
    }
}

lazy_static! {
    static ref REGISTRY: Mutex<HandlerRegistry> =
        Mutex::new(HandlerRegistry::with_default_handlers());
}

/// A snapshot of the current process-wide handler registry.
pub fn get_registry() -> HandlerRegistry {
    REGISTRY
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Replace the process-wide handler registry.
///
/// There is no implicit reset:
/// callers which need the previous configuration back
/// must save and restore it themselves,
/// or use [`HandlerRegistry::install_scoped`].
pub fn set_registry(registry: HandlerRegistry) {
    replace_registry(registry);
}

fn replace_registry(registry: HandlerRegistry) -> HandlerRegistry {
    let mut guard = REGISTRY.lock().unwrap_or_else(PoisonError::into_inner);
    std::mem::replace(&mut *guard, registry)
}

/// Guard which restores the previously installed registry on drop.
///
/// Created by [`HandlerRegistry::install_scoped`].
#[derive(Debug)]
pub struct RegistryGuard {
    previous: Option<HandlerRegistry>,
}

impl Drop for RegistryGuard {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            set_registry(previous);
        }
    }
}
