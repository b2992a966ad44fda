//! # Dispatch
//!
//! Runs one cut on a context: validates the input arrays, invokes the
//! kernel on the context's scheduler, turns the kernel's meshes into
//! connected components and publishes them to the store.
//!
//! ## Failure
//!
//! Every failure leaves the store exactly as it was. Components are built
//! off to the side and published in one step only once all of them exist.

use crate::array_mesh::{ArrayMesh, MapLayout};
use crate::component::ConnectedComponent;
use crate::context::Context;
use crate::debug::message_id;
use crate::error::{Error, Result};
use crate::flags::{DebugSeverity, DebugSource, DebugType, DispatchFlags};
use crate::store::Publish;
use config::constants::{COORDS_PER_VERTEX, MAX_FACES, MAX_VERTICES, MIN_FACE_SIZE};
use glam::DVec3;
use meshcut_kernel::{
    map_parallel, CutJob, CutOptions, InputMesh, Kernel, KernelLevel, KernelLog, KernelMesh,
    MeshRole, Operand,
};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;
use tracing::{debug, info_span, warn};

// =============================================================================
// INPUT
// =============================================================================

/// Vertex coordinates in the precision named by the dispatch flags.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VertexData<'a> {
    F32(&'a [f32]),
    F64(&'a [f64]),
}

impl VertexData<'_> {
    fn len(&self) -> usize {
        match self {
            VertexData::F32(v) => v.len(),
            VertexData::F64(v) => v.len(),
        }
    }

    fn to_positions(self) -> Vec<DVec3> {
        match self {
            VertexData::F32(v) => v
                .chunks_exact(COORDS_PER_VERTEX)
                .map(|c| DVec3::new(c[0] as f64, c[1] as f64, c[2] as f64))
                .collect(),
            VertexData::F64(v) => v
                .chunks_exact(COORDS_PER_VERTEX)
                .map(|c| DVec3::new(c[0], c[1], c[2]))
                .collect(),
        }
    }
}

/// One input mesh as flat arrays.
///
/// Face `i` uses `face_sizes[i]` consecutive entries of `face_indices`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshInput<'a> {
    pub vertices: VertexData<'a>,
    pub face_indices: &'a [u32],
    pub face_sizes: &'a [u32],
}

impl<'a> MeshInput<'a> {
    /// Mesh with single-precision coordinates.
    pub fn f32(vertices: &'a [f32], face_indices: &'a [u32], face_sizes: &'a [u32]) -> Self {
        Self {
            vertices: VertexData::F32(vertices),
            face_indices,
            face_sizes,
        }
    }

    /// Mesh with double-precision coordinates.
    pub fn f64(vertices: &'a [f64], face_indices: &'a [u32], face_sizes: &'a [u32]) -> Self {
        Self {
            vertices: VertexData::F64(vertices),
            face_indices,
            face_sizes,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / COORDS_PER_VERTEX
    }

    pub fn face_count(&self) -> usize {
        self.face_sizes.len()
    }
}

/// Structural checks on one input mesh.
fn validate_mesh(operand: Operand, mesh: &MeshInput<'_>) -> Result<()> {
    let invalid = |detail: String| Err(Error::invalid_value(format!("{operand} mesh: {detail}")));

    if mesh.vertices.len() % COORDS_PER_VERTEX != 0 {
        return invalid(format!(
            "vertex array length {} is not a multiple of 3",
            mesh.vertices.len()
        ));
    }
    let vertex_count = mesh.vertex_count();
    let face_count = mesh.face_count();
    if vertex_count == 0 {
        return invalid("vertex count is zero".to_string());
    }
    if face_count == 0 {
        return invalid("face count is zero".to_string());
    }
    if vertex_count > MAX_VERTICES {
        return invalid(format!("{vertex_count} vertices exceed the limit of {MAX_VERTICES}"));
    }
    if face_count > MAX_FACES {
        return invalid(format!("{face_count} faces exceed the limit of {MAX_FACES}"));
    }

    let mut total = 0usize;
    for (face, &size) in mesh.face_sizes.iter().enumerate() {
        if size < MIN_FACE_SIZE {
            return invalid(format!("face {face} has {size} vertices (minimum {MIN_FACE_SIZE})"));
        }
        total += size as usize;
    }
    if total != mesh.face_indices.len() {
        return invalid(format!(
            "face sizes sum to {total} but {} face indices were given",
            mesh.face_indices.len()
        ));
    }

    if let Some((position, &index)) = mesh
        .face_indices
        .iter()
        .enumerate()
        .find(|&(_, &i)| i as usize >= vertex_count)
    {
        return invalid(format!(
            "face index {position} references vertex {index}, but only {vertex_count} exist"
        ));
    }

    Ok(())
}

// =============================================================================
// KERNEL BRIDGE
// =============================================================================

/// Forwards kernel diagnostics to the context's debug channel.
struct KernelForwarder<'a> {
    context: &'a Context,
}

impl KernelLog for KernelForwarder<'_> {
    fn message(&self, level: KernelLevel, text: &str) {
        let (kind, severity) = match level {
            KernelLevel::Info => (DebugType::OTHER, DebugSeverity::NOTIFICATION),
            KernelLevel::Warning => (DebugType::OTHER, DebugSeverity::MEDIUM),
            KernelLevel::Error => (DebugType::ERROR, DebugSeverity::HIGH),
        };
        self.context.log(
            DebugSource::KERNEL,
            kind,
            message_id::KERNEL_MESSAGE,
            severity,
            text,
        );
    }
}

/// Whether the output filter of `flags` selects a mesh with `role`.
///
/// An empty filter selects everything; input echoes are always selected.
fn selects(flags: DispatchFlags, role: MeshRole) -> bool {
    use meshcut_kernel::{FragmentSide, PatchSide, Sealing};

    let filter = flags.filter();
    if filter.is_empty() {
        return true;
    }
    match role {
        MeshRole::Fragment { side, sealing } => {
            let location = match side {
                FragmentSide::Above => DispatchFlags::FILTER_FRAGMENT_LOCATION_ABOVE,
                FragmentSide::Below => DispatchFlags::FILTER_FRAGMENT_LOCATION_BELOW,
            };
            let sealing = match sealing {
                Sealing::Inside => {
                    DispatchFlags::FILTER_FRAGMENT_SEALING_INSIDE
                        | DispatchFlags::FILTER_FRAGMENT_SEALING_INSIDE_EXHAUSTIVE
                }
                Sealing::Outside => {
                    DispatchFlags::FILTER_FRAGMENT_SEALING_OUTSIDE
                        | DispatchFlags::FILTER_FRAGMENT_SEALING_OUTSIDE_EXHAUSTIVE
                }
                Sealing::Unsealed => DispatchFlags::FILTER_FRAGMENT_SEALING_NONE,
            };
            filter.contains(location) && filter.intersects(sealing)
        }
        MeshRole::Patch { side } => filter.contains(match side {
            PatchSide::Inside => DispatchFlags::FILTER_PATCH_INSIDE,
            PatchSide::Outside => DispatchFlags::FILTER_PATCH_OUTSIDE,
        }),
        MeshRole::Seam { operand } => filter.contains(match operand {
            Operand::Source => DispatchFlags::FILTER_SEAM_SRCMESH,
            Operand::Cut => DispatchFlags::FILTER_SEAM_CUTMESH,
        }),
        MeshRole::Input { .. } => true,
    }
}

// =============================================================================
// DISPATCH
// =============================================================================

/// Cuts `source` with `cut` on `context` and publishes the resulting
/// components. Failures are also reported through the debug channel.
pub(crate) fn dispatch(
    context: &Context,
    kernel: &dyn Kernel,
    flags: u32,
    source: &MeshInput<'_>,
    cut: &MeshInput<'_>,
) -> Result<()> {
    let _span = info_span!("dispatch", context = %context.handle()).entered();
    let result = run(context, kernel, flags, source, cut);
    if let Err(err) = &result {
        warn!(error = %err, "dispatch failed");
    }
    context.report(result)
}

fn run(
    context: &Context,
    kernel: &dyn Kernel,
    bits: u32,
    source: &MeshInput<'_>,
    cut: &MeshInput<'_>,
) -> Result<()> {
    let started = Instant::now();
    let flags = DispatchFlags::parse(bits)?;

    let wants_double = flags.contains(DispatchFlags::VERTEX_ARRAY_DOUBLE);
    for (operand, mesh) in [(Operand::Source, source), (Operand::Cut, cut)] {
        let is_double = matches!(mesh.vertices, VertexData::F64(_));
        if is_double != wants_double {
            return Err(Error::invalid_value(format!(
                "{operand} mesh vertex precision does not match the dispatch flags"
            )));
        }
        validate_mesh(operand, mesh)?;
    }

    let source_mesh = InputMesh::new(
        source.vertices.to_positions(),
        source.face_indices,
        source.face_sizes,
    );
    let cut_mesh = InputMesh::new(cut.vertices.to_positions(), cut.face_indices, cut.face_sizes);

    let forwarder = KernelForwarder { context };
    let job = CutJob {
        source: &source_mesh,
        cut: &cut_mesh,
        options: CutOptions {
            enforce_general_position: flags.contains(DispatchFlags::ENFORCE_GENERAL_POSITION),
        },
        executor: context.scheduler(),
        log: &forwarder,
    };
    let output = match catch_unwind(AssertUnwindSafe(|| kernel.cut(&job))) {
        Ok(result) => result?,
        Err(_) => return Err(Error::KernelFailure("kernel panicked".to_string())),
    };
    let kernel_time = started.elapsed();

    let layout = MapLayout {
        vertex_map: flags.contains(DispatchFlags::INCLUDE_VERTEX_MAP),
        face_map: flags.contains(DispatchFlags::INCLUDE_FACE_MAP),
        source_vertex_count: source.vertex_count() as u32,
        source_face_count: source.face_count() as u32,
    };
    let selected: Vec<KernelMesh> = output
        .meshes
        .into_iter()
        .filter(|mesh| selects(flags, mesh.role))
        .collect();

    let built = map_parallel(context.scheduler(), selected, |mesh| {
        ArrayMesh::from_kernel_mesh(&mesh, layout)
            .map(|array| ConnectedComponent::new(mesh.role.into(), array))
    });
    let components = built.into_iter().collect::<Result<Vec<_>>>()?;

    let mut batch = Vec::new();
    batch.try_reserve_exact(components.len())?;
    batch.extend(
        components
            .into_iter()
            .map(|component| (context.mint_component_handle(), component)),
    );
    let produced = batch.len();
    let mode = if flags.contains(DispatchFlags::ACCUMULATE_COMPONENTS) {
        Publish::Accumulate
    } else {
        Publish::Replace
    };
    let dropped = context.store().publish(batch, mode);
    context.set_dispatch_flags(flags);

    let total_time = started.elapsed();
    debug!(
        produced,
        dropped,
        intersected = output.intersected,
        perturbations = output.perturbations,
        elapsed_ms = total_time.as_secs_f64() * 1e3,
        "dispatch complete"
    );
    context.log(
        DebugSource::API,
        DebugType::OTHER,
        message_id::DISPATCH_SUMMARY,
        DebugSeverity::NOTIFICATION,
        &format!("dispatch produced {produced} connected components ({dropped} replaced)"),
    );
    if context.config().profiling {
        context.log(
            DebugSource::API,
            DebugType::PERFORMANCE,
            message_id::PROFILING,
            DebugSeverity::NOTIFICATION,
            &format!(
                "kernel {:.3} ms, extraction {:.3} ms",
                kernel_time.as_secs_f64() * 1e3,
                (total_time - kernel_time).as_secs_f64() * 1e3
            ),
        );
    }

    Ok(())
}
