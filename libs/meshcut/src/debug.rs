//! # Debug Channel
//!
//! Client-visible diagnostics. A context optionally holds a [`DebugSink`]
//! and a [`DebugFilter`]; messages are delivered synchronously at the point
//! they are raised, and only if the filter permits their category.
//!
//! This channel is separate from the crate's `tracing` output, which is for
//! whoever embeds the library rather than for the API client.

use crate::flags::{DebugSeverity, DebugSource, DebugType};
use config::constants::MAX_DEBUG_MESSAGE_LENGTH;
use parking_lot::RwLock;
use std::sync::Arc;

/// Stable identifiers of the messages the runtime emits.
pub mod message_id {
    /// Malformed flags, selector or input arrays.
    pub const INVALID_INPUT: u32 = 1;
    /// Unknown handle.
    pub const INVALID_HANDLE: u32 = 2;
    /// Allocation failure.
    pub const OUT_OF_MEMORY: u32 = 3;
    /// The kernel rejected the meshes.
    pub const KERNEL_FAILURE: u32 = 4;
    /// A diagnostic forwarded from the kernel.
    pub const KERNEL_MESSAGE: u32 = 5;
    /// Summary of a completed dispatch.
    pub const DISPATCH_SUMMARY: u32 = 6;
    /// Stage timings.
    pub const PROFILING: u32 = 7;
}

/// One diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugMessage<'a> {
    pub source: DebugSource,
    pub kind: DebugType,
    pub id: u32,
    pub severity: DebugSeverity,
    pub text: &'a str,
}

/// Receiver of debug messages.
pub trait DebugSink: Send + Sync {
    fn deliver(&self, message: &DebugMessage<'_>);
}

impl<F> DebugSink for F
where
    F: Fn(&DebugMessage<'_>) + Send + Sync,
{
    fn deliver(&self, message: &DebugMessage<'_>) {
        self(message)
    }
}

/// Category masks deciding which messages are forwarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugFilter {
    pub sources: DebugSource,
    pub types: DebugType,
    pub severities: DebugSeverity,
}

impl Default for DebugFilter {
    fn default() -> Self {
        Self {
            sources: DebugSource::ALL,
            types: DebugType::ALL,
            severities: DebugSeverity::ALL,
        }
    }
}

impl DebugFilter {
    /// Returns true if every mask permits the message's category.
    pub fn permits(&self, message: &DebugMessage<'_>) -> bool {
        self.sources.intersects(message.source)
            && self.types.intersects(message.kind)
            && self.severities.intersects(message.severity)
    }

    /// Enables (`enabled`) or disables the given categories in each mask.
    pub fn update(
        &mut self,
        sources: DebugSource,
        types: DebugType,
        severities: DebugSeverity,
        enabled: bool,
    ) {
        if enabled {
            self.sources |= sources;
            self.types |= types;
            self.severities |= severities;
        } else {
            self.sources &= !sources;
            self.types &= !types;
            self.severities &= !severities;
        }
    }
}

/// Truncates `text` to the delivery limit on a character boundary.
fn clamp(text: &str) -> &str {
    if text.len() <= MAX_DEBUG_MESSAGE_LENGTH {
        return text;
    }
    let mut end = MAX_DEBUG_MESSAGE_LENGTH;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// A context's sink and filter.
#[derive(Default)]
pub struct DebugChannel {
    sink: RwLock<Option<Arc<dyn DebugSink>>>,
    filter: RwLock<DebugFilter>,
}

impl DebugChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the sink; `None` silences the channel.
    pub fn set_sink(&self, sink: Option<Arc<dyn DebugSink>>) {
        *self.sink.write() = sink;
    }

    pub fn has_sink(&self) -> bool {
        self.sink.read().is_some()
    }

    pub fn filter(&self) -> DebugFilter {
        *self.filter.read()
    }

    pub fn control(
        &self,
        sources: DebugSource,
        types: DebugType,
        severities: DebugSeverity,
        enabled: bool,
    ) {
        self.filter
            .write()
            .update(sources, types, severities, enabled);
    }

    /// Delivers a message if a sink is installed and the filter permits it.
    /// Returns whether it was delivered.
    pub fn emit(
        &self,
        source: DebugSource,
        kind: DebugType,
        id: u32,
        severity: DebugSeverity,
        text: &str,
    ) -> bool {
        let message = DebugMessage {
            source,
            kind,
            id,
            severity,
            text: clamp(text),
        };
        if !self.filter().permits(&message) {
            return false;
        }
        // Clone out so a sink may reconfigure the channel while running
        let Some(sink) = self.sink.read().clone() else {
            return false;
        };
        sink.deliver(&message);
        true
    }
}

impl std::fmt::Debug for DebugChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebugChannel")
            .field("has_sink", &self.has_sink())
            .field("filter", &self.filter())
            .finish()
    }
}
