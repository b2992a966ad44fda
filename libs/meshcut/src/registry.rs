//! # Context Registry
//!
//! Owns every live context and is the entry point of the Rust API. Handles
//! are minted from one counter shared with the contexts, so no handle is
//! ever reused.
//!
//! ## Locking
//!
//! The handle table is read-locked only long enough to clone a context's
//! `Arc`; every operation then runs without holding the registry lock, so
//! distinct contexts never contend. Dropping the registry releases all of
//! its contexts.

use crate::array_mesh::FieldData;
use crate::context::{Context, ContextConfig};
use crate::debug::DebugSink;
use crate::dispatch::{dispatch, MeshInput};
use crate::error::{Error, Result};
use crate::flags::{ComponentTypeFlags, DebugSeverity, DebugSource, DebugType};
use crate::handle::{ComponentHandle, ContextHandle, HandleMint, HandleTable};
use crate::types::{DataField, InfoQuery};
use meshcut_kernel::{BspKernel, Kernel};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

/// Process-independent collection of cutting contexts.
///
/// # Example
///
/// ```rust
/// use meshcut::{ContextRegistry, ComponentTypeFlags, MeshInput};
///
/// let registry = ContextRegistry::new();
/// let context = registry.create_context(0).unwrap();
///
/// let cube = |o: f64| -> Vec<f64> {
///     (0..8u32)
///         .flat_map(|i| [i & 1, (i >> 1) & 1, (i >> 2) & 1])
///         .map(|c| c as f64 + o)
///         .collect()
/// };
/// let faces = [0, 2, 3, 1, 4, 5, 7, 6, 0, 1, 5, 4, 2, 6, 7, 3, 0, 4, 6, 2, 1, 3, 7, 5];
/// let sizes = [4; 6];
/// let (source, cut) = (cube(0.0), cube(0.5));
///
/// registry
///     .dispatch(
///         context,
///         meshcut::DispatchFlags::VERTEX_ARRAY_DOUBLE.bits(),
///         &MeshInput::f64(&source, &faces, &sizes),
///         &MeshInput::f64(&cut, &faces, &sizes),
///     )
///     .unwrap();
///
/// let fragments = registry.list_components(context, ComponentTypeFlags::FRAGMENT.bits()).unwrap();
/// assert_eq!(fragments.len(), 6);
/// registry.release_context(context).unwrap();
/// ```
pub struct ContextRegistry {
    contexts: RwLock<HandleTable<ContextHandle, Arc<Context>>>,
    mint: Arc<HandleMint>,
    kernel: Arc<dyn Kernel>,
}

impl ContextRegistry {
    /// Creates a registry using the bundled [`BspKernel`].
    pub fn new() -> Self {
        Self::with_kernel(Arc::new(BspKernel))
    }

    /// Creates a registry dispatching to `kernel`.
    pub fn with_kernel(kernel: Arc<dyn Kernel>) -> Self {
        Self {
            contexts: RwLock::new(HandleTable::new()),
            mint: Arc::new(HandleMint::new()),
            kernel,
        }
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Creates a context from raw creation flags.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidValue`] for unknown bits or conflicting scheduling
    ///   modes
    /// - [`Error::OutOfMemory`] if the worker pool cannot be started
    pub fn create_context(&self, flags: u32) -> Result<ContextHandle> {
        self.create_context_with(ContextConfig::from_bits(flags)?)
    }

    /// Creates a context from an explicit configuration.
    pub fn create_context_with(&self, config: ContextConfig) -> Result<ContextHandle> {
        let handle = ContextHandle::from_raw(self.mint.mint());
        let context = Context::new(handle, config, Arc::clone(&self.mint))?;
        info!(
            context = %handle,
            schedule = ?config.schedule,
            workers = meshcut_kernel::Executor::worker_count(context.scheduler()),
            "context created"
        );
        self.contexts.write().insert(handle, Arc::new(context));
        Ok(handle)
    }

    /// Releases a context and every component it owns.
    ///
    /// The worker pool shuts down once any dispatch still running on the
    /// context has drained.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHandle`] if `handle` is not live.
    pub fn release_context(&self, handle: ContextHandle) -> Result<()> {
        let context = self
            .contexts
            .write()
            .remove(handle)
            .ok_or_else(|| unknown_context(handle))?;
        let released = context.store().release(&[])?;
        info!(context = %handle, released, "context released");
        Ok(())
    }

    /// Returns the live context named by `handle`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHandle`] if `handle` is not live.
    pub fn context(&self, handle: ContextHandle) -> Result<Arc<Context>> {
        self.contexts
            .read()
            .get(handle)
            .cloned()
            .ok_or_else(|| unknown_context(handle))
    }

    /// Handles of all live contexts in creation order.
    pub fn contexts(&self) -> Vec<ContextHandle> {
        self.contexts.read().iter().map(|(h, _)| h).collect()
    }

    pub fn len(&self) -> usize {
        self.contexts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.read().is_empty()
    }

    // =========================================================================
    // CONFIGURATION
    // =========================================================================

    /// Installs (or, with `None`, clears) a context's debug sink.
    pub fn set_debug_callback(
        &self,
        handle: ContextHandle,
        sink: Option<Arc<dyn DebugSink>>,
    ) -> Result<()> {
        self.context(handle)?.set_debug_callback(sink);
        Ok(())
    }

    /// Enables or disables categories of a context's debug output. Mask
    /// bits without a defined category are ignored.
    pub fn set_debug_filter(
        &self,
        handle: ContextHandle,
        sources: u32,
        types: u32,
        severities: u32,
        enabled: bool,
    ) -> Result<()> {
        self.context(handle)?.set_debug_filter(
            DebugSource::from_bits_retain(sources),
            DebugType::from_bits_retain(types),
            DebugSeverity::from_bits_retain(severities),
            enabled,
        );
        Ok(())
    }

    /// Copies a context property into `dst` with the same size contract as
    /// [`ContextRegistry::component_data`].
    pub fn info(&self, handle: ContextHandle, query: u32, dst: Option<&mut [u8]>) -> Result<usize> {
        let context = self.context(handle)?;
        let query = context.report(InfoQuery::try_from(query))?;
        let data = FieldData::Scalar(context.info(query));
        if let Some(dst) = dst {
            data.copy_into(dst);
        }
        Ok(data.byte_len())
    }

    // =========================================================================
    // DISPATCH AND COMPONENTS
    // =========================================================================

    /// Cuts `source` with `cut` on the given context.
    ///
    /// Blocks until every component is published. On failure the context's
    /// components are left untouched.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidHandle`] if `handle` is not live
    /// - [`Error::InvalidValue`] for malformed flags or input arrays
    /// - [`Error::KernelFailure`] if the kernel cannot cut the meshes
    /// - [`Error::OutOfMemory`] if the output cannot be allocated
    pub fn dispatch(
        &self,
        handle: ContextHandle,
        flags: u32,
        source: &MeshInput<'_>,
        cut: &MeshInput<'_>,
    ) -> Result<()> {
        let context = self.context(handle)?;
        dispatch(&context, self.kernel.as_ref(), flags, source, cut)
    }

    /// Handles of the context's components whose type is in `filter`.
    pub fn list_components(
        &self,
        handle: ContextHandle,
        filter: u32,
    ) -> Result<Vec<ComponentHandle>> {
        let context = self.context(handle)?;
        Ok(context.list_components(ComponentTypeFlags::from_bits_retain(filter)))
    }

    /// Copies one field of a component into `dst`.
    ///
    /// With `dst` absent only the required size is returned; otherwise the
    /// leading `min(required, dst.len())` bytes are copied and the required
    /// size is returned.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidHandle`] for unknown handles or a component owned
    ///   by another context
    /// - [`Error::InvalidValue`] for unknown selectors or metadata the
    ///   component does not carry
    pub fn component_data(
        &self,
        handle: ContextHandle,
        component: ComponentHandle,
        field: u32,
        dst: Option<&mut [u8]>,
    ) -> Result<usize> {
        let context = self.context(handle)?;
        let field = context.report(DataField::try_from(field))?;
        context.component_data(component, field, dst)
    }

    /// Releases the named components (all of them if `components` is
    /// empty). All-or-nothing.
    pub fn release_components(
        &self,
        handle: ContextHandle,
        components: &[ComponentHandle],
    ) -> Result<usize> {
        self.context(handle)?.release_components(components)
    }
}

impl Default for ContextRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ContextRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextRegistry")
            .field("contexts", &self.len())
            .finish()
    }
}

fn unknown_context(handle: ContextHandle) -> Error {
    Error::invalid_handle(format!("context {handle} is not live"))
}
