//! # Flags
//!
//! Bitmasks crossing the API boundary. Values are part of the wire contract
//! and must not change.

use crate::error::{Error, Result};
use bitflags::bitflags;

bitflags! {
    /// Flags fixed when a context is created.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ContextFlags: u32 {
        /// Forward informational messages through the debug channel.
        const DEBUG = 1 << 0;
        /// Accepted for compatibility; has no effect.
        const OUT_OF_ORDER_EXEC_MODE_ENABLE = 1 << 1;
        /// Report dispatch stage timings through the debug channel.
        const PROFILING_ENABLE = 1 << 2;
        /// Run dispatch sub-tasks on the calling thread.
        const SCHEDULE_INLINE = 1 << 3;
        /// Run dispatch sub-tasks on a per-context worker pool.
        const SCHEDULE_POOL = 1 << 4;
    }
}

impl ContextFlags {
    /// Parses creation flags, rejecting unknown bits and conflicting
    /// scheduling modes.
    pub fn parse(bits: u32) -> Result<Self> {
        let flags = Self::from_bits(bits).ok_or_else(|| {
            Error::invalid_value(format!(
                "unrecognized context flag bits {:#x}",
                bits & !Self::all().bits()
            ))
        })?;
        if flags.contains(Self::SCHEDULE_INLINE | Self::SCHEDULE_POOL) {
            return Err(Error::invalid_value(
                "SCHEDULE_INLINE and SCHEDULE_POOL are mutually exclusive",
            ));
        }
        Ok(flags)
    }
}

bitflags! {
    /// Flags controlling one dispatch.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DispatchFlags: u32 {
        const VERTEX_ARRAY_FLOAT = 1 << 0;
        const VERTEX_ARRAY_DOUBLE = 1 << 1;
        const REQUIRE_THROUGH_CUTS = 1 << 2;
        const INCLUDE_VERTEX_MAP = 1 << 3;
        const INCLUDE_FACE_MAP = 1 << 4;
        const FILTER_FRAGMENT_LOCATION_ABOVE = 1 << 5;
        const FILTER_FRAGMENT_LOCATION_BELOW = 1 << 6;
        const FILTER_FRAGMENT_LOCATION_UNDEFINED = 1 << 7;
        const FILTER_FRAGMENT_SEALING_INSIDE = 1 << 8;
        const FILTER_FRAGMENT_SEALING_OUTSIDE = 1 << 9;
        const FILTER_FRAGMENT_SEALING_INSIDE_EXHAUSTIVE = 1 << 10;
        const FILTER_FRAGMENT_SEALING_OUTSIDE_EXHAUSTIVE = 1 << 11;
        const FILTER_FRAGMENT_SEALING_NONE = 1 << 12;
        const FILTER_PATCH_INSIDE = 1 << 13;
        const FILTER_PATCH_OUTSIDE = 1 << 14;
        const FILTER_SEAM_SRCMESH = 1 << 15;
        const FILTER_SEAM_CUTMESH = 1 << 16;
        /// Perturb the cut mesh instead of failing on coincident geometry.
        const ENFORCE_GENERAL_POSITION = 1 << 17;
        /// Keep components of earlier dispatches instead of replacing them.
        const ACCUMULATE_COMPONENTS = 1 << 18;

        const FILTER_ALL = (1 << 17) - (1 << 5);
    }
}

impl DispatchFlags {
    /// Parses dispatch flags, rejecting unknown bits and requiring exactly
    /// one vertex precision.
    pub fn parse(bits: u32) -> Result<Self> {
        let flags = Self::from_bits(bits).ok_or_else(|| {
            Error::invalid_value(format!(
                "unrecognized dispatch flag bits {:#x}",
                bits & !Self::all().bits()
            ))
        })?;
        let precision = flags & (Self::VERTEX_ARRAY_FLOAT | Self::VERTEX_ARRAY_DOUBLE);
        if precision.bits().count_ones() != 1 {
            return Err(Error::invalid_value(
                "exactly one of VERTEX_ARRAY_FLOAT and VERTEX_ARRAY_DOUBLE must be set",
            ));
        }
        Ok(flags)
    }

    /// Output-selection bits of this mask.
    pub fn filter(self) -> Self {
        self & Self::FILTER_ALL
    }
}

bitflags! {
    /// Connected-component type filter.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ComponentTypeFlags: u32 {
        const FRAGMENT = 1 << 0;
        const PATCH = 1 << 2;
        const SEAM = 1 << 3;
        const INPUT = 1 << 4;
        const ALL = 0xFFFF_FFFF;
    }
}

bitflags! {
    /// Who produced a debug message.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DebugSource: u32 {
        const API = 1 << 0;
        const KERNEL = 1 << 1;
        const ALL = 0xFFFF_FFFF;
    }
}

bitflags! {
    /// What a debug message is about.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DebugType: u32 {
        const ERROR = 1 << 0;
        const DEPRECATED_BEHAVIOR = 1 << 1;
        const UNDEFINED_BEHAVIOR = 1 << 2;
        const PORTABILITY = 1 << 3;
        const PERFORMANCE = 1 << 4;
        const OTHER = 1 << 5;
        const ALL = 0xFFFF_FFFF;
    }
}

bitflags! {
    /// How urgent a debug message is.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DebugSeverity: u32 {
        const HIGH = 1 << 0;
        const MEDIUM = 1 << 1;
        const LOW = 1 << 2;
        const NOTIFICATION = 1 << 3;
        const ALL = 0xFFFF_FFFF;
    }
}
