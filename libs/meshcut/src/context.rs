//! # Context
//!
//! The isolation unit of the runtime: a scheduler, a component store, a
//! debug channel and the flags of the last dispatch. Contexts are created
//! and released through a [`crate::ContextRegistry`].

use crate::array_mesh::FieldData;
use crate::debug::{message_id, DebugChannel, DebugSink};
use crate::error::{ErrorKind, Result};
use crate::flags::{
    ComponentTypeFlags, ContextFlags, DebugSeverity, DebugSource, DebugType, DispatchFlags,
};
use crate::handle::{ComponentHandle, ContextHandle, HandleMint};
use crate::scheduler::{ScheduleMode, Scheduler};
use crate::store::ComponentStore;
use crate::types::{DataField, InfoQuery};
use config::constants::{resolve_worker_count, DEFAULT_WORKER_COUNT};
use meshcut_kernel::Executor;
use parking_lot::Mutex;
use std::sync::Arc;

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Run-time configuration of a context, derived from its creation flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextConfig {
    /// Flags as given by the client.
    pub flags: ContextFlags,
    /// Forward informational messages, not only errors.
    pub debug: bool,
    /// Report stage timings.
    pub profiling: bool,
    pub schedule: ScheduleMode,
    /// Requested pool size; [`DEFAULT_WORKER_COUNT`] means one per CPU.
    pub worker_count: usize,
}

impl ContextConfig {
    /// Interprets creation flags.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`](crate::Error::InvalidValue) for unknown
    /// bits or conflicting scheduling modes.
    pub fn from_bits(bits: u32) -> Result<Self> {
        ContextFlags::parse(bits).map(Self::from_flags)
    }

    pub fn from_flags(flags: ContextFlags) -> Self {
        Self {
            flags,
            debug: flags.contains(ContextFlags::DEBUG),
            profiling: flags.contains(ContextFlags::PROFILING_ENABLE),
            schedule: if flags.contains(ContextFlags::SCHEDULE_INLINE) {
                ScheduleMode::Inline
            } else {
                ScheduleMode::Pool
            },
            worker_count: DEFAULT_WORKER_COUNT,
        }
    }

    /// Overrides the pool size.
    pub fn with_worker_count(mut self, workers: usize) -> Self {
        self.worker_count = workers;
        self
    }
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self::from_flags(ContextFlags::empty())
    }
}

// =============================================================================
// CONTEXT
// =============================================================================

/// A cutting session.
#[derive(Debug)]
pub struct Context {
    handle: ContextHandle,
    config: ContextConfig,
    scheduler: Scheduler,
    store: ComponentStore,
    debug: DebugChannel,
    dispatch_flags: Mutex<DispatchFlags>,
    mint: Arc<HandleMint>,
}

impl Context {
    pub(crate) fn new(
        handle: ContextHandle,
        config: ContextConfig,
        mint: Arc<HandleMint>,
    ) -> Result<Self> {
        let workers = resolve_worker_count(config.worker_count);
        Ok(Self {
            handle,
            config,
            scheduler: Scheduler::new(config.schedule, workers)?,
            store: ComponentStore::new(),
            debug: DebugChannel::new(),
            dispatch_flags: Mutex::new(DispatchFlags::empty()),
            mint,
        })
    }

    pub fn handle(&self) -> ContextHandle {
        self.handle
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn store(&self) -> &ComponentStore {
        &self.store
    }

    pub fn debug_channel(&self) -> &DebugChannel {
        &self.debug
    }

    /// Flags of the most recent successful dispatch.
    pub fn dispatch_flags(&self) -> DispatchFlags {
        *self.dispatch_flags.lock()
    }

    pub(crate) fn set_dispatch_flags(&self, flags: DispatchFlags) {
        *self.dispatch_flags.lock() = flags;
    }

    pub(crate) fn mint_component_handle(&self) -> ComponentHandle {
        ComponentHandle::from_raw(self.mint.mint())
    }

    // -------------------------------------------------------------------------
    // Debug output
    // -------------------------------------------------------------------------

    /// Installs or clears the debug sink.
    pub fn set_debug_callback(&self, sink: Option<Arc<dyn DebugSink>>) {
        self.debug.set_sink(sink);
    }

    /// Enables or disables categories of debug output.
    pub fn set_debug_filter(
        &self,
        sources: DebugSource,
        types: DebugType,
        severities: DebugSeverity,
        enabled: bool,
    ) {
        self.debug.control(sources, types, severities, enabled);
    }

    /// Raises a debug message.
    ///
    /// Errors always reach the channel; everything else only when the
    /// context was created with [`ContextFlags::DEBUG`].
    pub fn log(
        &self,
        source: DebugSource,
        kind: DebugType,
        id: u32,
        severity: DebugSeverity,
        text: &str,
    ) {
        if !kind.contains(DebugType::ERROR) && !self.config.debug {
            return;
        }
        self.debug.emit(source, kind, id, severity, text);
    }

    /// Reports a failed call through the debug channel and passes the
    /// result on unchanged.
    pub(crate) fn report<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            let id = match err.kind() {
                ErrorKind::InvalidHandle => message_id::INVALID_HANDLE,
                ErrorKind::InvalidValue => message_id::INVALID_INPUT,
                ErrorKind::OutOfMemory => message_id::OUT_OF_MEMORY,
                ErrorKind::KernelFailure => message_id::KERNEL_FAILURE,
            };
            self.log(
                DebugSource::API,
                DebugType::ERROR,
                id,
                DebugSeverity::HIGH,
                &err.to_string(),
            );
        }
        result
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Answers a context info query.
    pub fn info(&self, query: InfoQuery) -> u32 {
        match query {
            InfoQuery::ContextFlags => self.config.flags.bits(),
            InfoQuery::DispatchFlags => self.dispatch_flags().bits(),
            InfoQuery::WorkerCount => self.scheduler.worker_count() as u32,
        }
    }

    /// Handles of the components matching `filter`, in creation order.
    pub fn list_components(&self, filter: ComponentTypeFlags) -> Vec<ComponentHandle> {
        self.store.list(filter)
    }

    /// Copies one field of a component into `dst`.
    ///
    /// With `dst` absent only the required size is computed. Otherwise the
    /// leading `min(required, dst.len())` bytes are copied. Returns the
    /// required size in bytes either way.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidHandle`](crate::Error::InvalidHandle) if this context
    ///   does not own `component`
    /// - [`Error::InvalidValue`](crate::Error::InvalidValue) for metadata the
    ///   component does not carry
    pub fn component_data(
        &self,
        component: ComponentHandle,
        field: DataField,
        dst: Option<&mut [u8]>,
    ) -> Result<usize> {
        let result = self.store.with_component(component, |c| {
            let data: FieldData<'_> = c.field(field)?;
            if let Some(dst) = dst {
                data.copy_into(dst);
            }
            Ok(data.byte_len())
        });
        self.report(result.and_then(|inner| inner))
    }

    /// Releases the named components, or all of them when `components` is
    /// empty. Returns the number released.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHandle`](crate::Error::InvalidHandle) if any
    /// handle is not owned by this context; nothing is released in that case.
    pub fn release_components(&self, components: &[ComponentHandle]) -> Result<usize> {
        let result = self.store.release(components);
        self.report(result)
    }
}
