//! # BSP Cutting Kernel
//!
//! Reference [`Kernel`] built on BSP clipping.
//!
//! ## Pipeline
//!
//! 1. **Polygonize**: input faces become convex polygons tagged with their
//!    origin. Convex planar faces stay whole, others are ear-clipped.
//! 2. **General position**: a vertex of one mesh lying on the other mesh is
//!    rejected, or resolved by nudging the cut mesh when requested.
//! 3. **Clip**: each mesh is clipped against the other's BSP tree and its
//!    inverse, giving the inside and outside parts of both meshes.
//! 4. **Assemble**: fragments, patches, seams and input echoes are stitched
//!    from those parts, welded and split into connected pieces.
//!
//! Steps 3 and 4 fan out through the job's [`Executor`](crate::Executor).

use crate::error::{KernelError, KernelResult};
use crate::executor::map_parallel;
use crate::geometry::{ear_clip, predicates, BspTree, Polygon, Vertex};
use crate::kernel::{CutJob, CutOutput, Kernel, KernelLevel};
use crate::mesh::{
    FaceOrigin, FragmentSide, InputMesh, KernelMesh, MeshRole, Operand, PatchSide, Sealing,
    VertexOrigin,
};
use crate::weld::{split_connected, weld, Surface};
use config::constants::{GENERAL_POSITION_PERTURBATION, MAX_PERTURBATION_ATTEMPTS};
use glam::DVec3;
use tracing::debug;

#[cfg(test)]
mod tests;

/// The bundled cutting kernel.
#[derive(Debug, Default, Clone, Copy)]
pub struct BspKernel;

impl Kernel for BspKernel {
    fn cut(&self, job: &CutJob<'_>) -> KernelResult<CutOutput> {
        let source_polygons = polygonize(job.source, Operand::Source)?;
        let input_cut_polygons = polygonize(job.cut, Operand::Cut)?;
        debug!(
            source_polygons = source_polygons.len(),
            cut_polygons = input_cut_polygons.len(),
            "polygonized inputs"
        );

        let (cut_polygons, perturbations) =
            resolve_general_position(job, &source_polygons, &input_cut_polygons)?;

        let parts = clip(job, &source_polygons, &cut_polygons)?;
        let intersected = !parts.source_inside.is_empty()
            && !parts.source_outside.is_empty()
            && !parts.cut_inside.is_empty();

        if !intersected {
            job.log.message(
                KernelLevel::Info,
                "meshes do not intersect; only input meshes are returned",
            );
        }

        let plan: Vec<Assembly> = ASSEMBLIES
            .iter()
            .filter(|a| intersected || matches!(a.role, MeshRole::Input { .. }))
            .copied()
            .collect();

        let source_surface = Surface::new(&source_polygons);
        let cut_surface = Surface::new(&cut_polygons);
        let assembled = map_parallel(job.executor, plan, |assembly| {
            let mut polygons = Vec::new();
            for &(part, facing) in assembly.parts {
                let pieces = match part {
                    Part::SourceOutside => &parts.source_outside,
                    Part::SourceInside => &parts.source_inside,
                    Part::CutOutside => &parts.cut_outside,
                    Part::CutInside => &parts.cut_inside,
                    Part::SourceInput => &source_polygons,
                    Part::CutInput => &input_cut_polygons,
                };
                match facing {
                    Facing::Kept => polygons.extend(pieces.iter().cloned()),
                    Facing::Flipped => polygons.extend(pieces.iter().map(Polygon::flip)),
                }
            }

            let mesh = weld(assembly.role, &polygons, &source_surface, &cut_surface);
            match assembly.role {
                MeshRole::Fragment { .. } | MeshRole::Patch { .. } => split_connected(mesh),
                _ if mesh.face_count() == 0 => Vec::new(),
                _ => vec![mesh],
            }
        });

        let meshes: Vec<KernelMesh> = assembled.into_iter().flatten().collect();
        job.log.message(
            KernelLevel::Info,
            &format!(
                "cut produced {} meshes ({} perturbation(s))",
                meshes.len(),
                perturbations
            ),
        );

        Ok(CutOutput {
            meshes,
            intersected,
            perturbations,
        })
    }
}

// =============================================================================
// POLYGONIZE
// =============================================================================

fn vertex_origin(operand: Operand, index: u32) -> VertexOrigin {
    match operand {
        Operand::Source => VertexOrigin::Source(index),
        Operand::Cut => VertexOrigin::Cut(index),
    }
}

fn face_origin(operand: Operand, index: u32) -> FaceOrigin {
    match operand {
        Operand::Source => FaceOrigin::Source(index),
        Operand::Cut => FaceOrigin::Cut(index),
    }
}

/// Converts every face of `mesh` into one or more convex polygons.
///
/// # Errors
///
/// Returns [`KernelError::Degenerate`] for faces with repeated vertices or
/// no area.
fn polygonize(mesh: &InputMesh<'_>, operand: Operand) -> KernelResult<Vec<Polygon>> {
    let mut polygons = Vec::with_capacity(mesh.face_count());

    for (face, indices) in mesh.faces().enumerate() {
        let face = face as u32;
        let degenerate = || KernelError::Degenerate { operand, face };

        let mut distinct = indices.to_vec();
        distinct.sort_unstable();
        distinct.dedup();
        if distinct.len() != indices.len() {
            return Err(degenerate());
        }

        let vertices = indices
            .iter()
            .map(|&i| {
                mesh.vertices
                    .get(i as usize)
                    .map(|&pos| Vertex::new(pos, vertex_origin(operand, i)))
                    .ok_or_else(|| {
                        KernelError::Internal(format!(
                            "face {face} of the {operand} mesh references missing vertex {i}"
                        ))
                    })
            })
            .collect::<KernelResult<Vec<Vertex>>>()?;
        let points: Vec<DVec3> = vertices.iter().map(|v| v.pos).collect();

        if predicates::is_degenerate(&points) {
            return Err(degenerate());
        }

        let origin = face_origin(operand, face);
        if predicates::is_convex_planar(&points) {
            polygons.push(Polygon::from_vertices(vertices, origin).ok_or_else(degenerate)?);
            continue;
        }

        for [a, b, c] in ear_clip(&points).ok_or_else(degenerate)? {
            let triangle = vec![vertices[a], vertices[b], vertices[c]];
            polygons.push(Polygon::from_vertices(triangle, origin).ok_or_else(degenerate)?);
        }
    }

    Ok(polygons)
}

// =============================================================================
// GENERAL POSITION
// =============================================================================

/// Fixed direction the cut mesh is nudged along. Not aligned with any axis
/// so that axis-aligned coincidences are broken.
fn perturbation_direction() -> DVec3 {
    DVec3::new(1.0, 2.0, 3.0).normalize()
}

/// Finds the first vertex of either mesh lying on the other mesh's surface.
fn find_violation(
    source_positions: &[DVec3],
    source_polygons: &[Polygon],
    cut_positions: &[DVec3],
    cut_polygons: &[Polygon],
) -> Option<(Operand, u32)> {
    let on = |p: DVec3, polygons: &[Polygon]| polygons.iter().any(|poly| poly.contains_point(p));

    source_positions
        .iter()
        .position(|&p| on(p, cut_polygons))
        .map(|i| (Operand::Source, i as u32))
        .or_else(|| {
            cut_positions
                .iter()
                .position(|&p| on(p, source_polygons))
                .map(|i| (Operand::Cut, i as u32))
        })
}

/// Returns the cut polygons to clip with and the number of perturbation
/// steps applied to them.
fn resolve_general_position(
    job: &CutJob<'_>,
    source_polygons: &[Polygon],
    cut_polygons: &[Polygon],
) -> KernelResult<(Vec<Polygon>, u32)> {
    let source_positions = &job.source.vertices;
    let Some((operand, vertex)) = find_violation(
        source_positions,
        source_polygons,
        &job.cut.vertices,
        cut_polygons,
    ) else {
        return Ok((cut_polygons.to_vec(), 0));
    };

    if !job.options.enforce_general_position {
        return Err(KernelError::GeneralPosition { operand, vertex });
    }

    let direction = perturbation_direction();
    for attempt in 1..=MAX_PERTURBATION_ATTEMPTS {
        let offset = direction * GENERAL_POSITION_PERTURBATION * f64::from(attempt);
        let positions: Vec<DVec3> = job.cut.vertices.iter().map(|&p| p + offset).collect();
        let mut moved = cut_polygons.to_vec();
        for polygon in &mut moved {
            polygon.translate(offset);
        }

        if find_violation(source_positions, source_polygons, &positions, &moved).is_none() {
            job.log.message(
                KernelLevel::Warning,
                &format!(
                    "cut mesh perturbed by {:.1e} to reach general position",
                    offset.length()
                ),
            );
            return Ok((moved, attempt));
        }
    }

    Err(KernelError::GeneralPosition { operand, vertex })
}

// =============================================================================
// CLIP
// =============================================================================

/// Inside and outside parts of both meshes.
struct Parts {
    source_outside: Vec<Polygon>,
    source_inside: Vec<Polygon>,
    cut_outside: Vec<Polygon>,
    cut_inside: Vec<Polygon>,
}

#[derive(Debug, Clone, Copy)]
enum Clip {
    SourceOutside,
    SourceInside,
    CutOutside,
    CutInside,
}

fn clip(
    job: &CutJob<'_>,
    source_polygons: &[Polygon],
    cut_polygons: &[Polygon],
) -> KernelResult<Parts> {
    let lost = |stage: &str| KernelError::Internal(format!("{stage} lost a task result"));

    let trees = map_parallel(
        job.executor,
        vec![source_polygons.to_vec(), cut_polygons.to_vec()],
        BspTree::new,
    );
    let [source_tree, cut_tree]: [BspTree; 2] =
        trees.try_into().map_err(|_| lost("tree build"))?;

    let clipped = map_parallel(
        job.executor,
        vec![
            Clip::SourceOutside,
            Clip::SourceInside,
            Clip::CutOutside,
            Clip::CutInside,
        ],
        |clip| match clip {
            Clip::SourceOutside => cut_tree.clip_polygons(source_polygons.to_vec()),
            Clip::SourceInside => cut_tree.inverted().clip_polygons(source_polygons.to_vec()),
            Clip::CutOutside => source_tree.clip_polygons(cut_polygons.to_vec()),
            Clip::CutInside => source_tree.inverted().clip_polygons(cut_polygons.to_vec()),
        },
    );
    let [source_outside, source_inside, cut_outside, cut_inside]: [Vec<Polygon>; 4] =
        clipped.try_into().map_err(|_| lost("clipping"))?;

    debug!(
        source_outside = source_outside.len(),
        source_inside = source_inside.len(),
        cut_outside = cut_outside.len(),
        cut_inside = cut_inside.len(),
        "clipped meshes"
    );

    Ok(Parts {
        source_outside,
        source_inside,
        cut_outside,
        cut_inside,
    })
}

// =============================================================================
// ASSEMBLE
// =============================================================================

#[derive(Debug, Clone, Copy)]
enum Part {
    SourceOutside,
    SourceInside,
    CutOutside,
    CutInside,
    SourceInput,
    CutInput,
}

#[derive(Debug, Clone, Copy)]
enum Facing {
    Kept,
    Flipped,
}

/// One output mesh and the parts it is stitched from.
#[derive(Debug, Clone, Copy)]
struct Assembly {
    role: MeshRole,
    parts: &'static [(Part, Facing)],
}

const fn fragment(
    side: FragmentSide,
    sealing: Sealing,
    parts: &'static [(Part, Facing)],
) -> Assembly {
    Assembly {
        role: MeshRole::Fragment { side, sealing },
        parts,
    }
}

/// Output order: fragments, patches, seams, inputs.
const ASSEMBLIES: &[Assembly] = &[
    fragment(
        FragmentSide::Above,
        Sealing::Inside,
        &[(Part::SourceOutside, Facing::Kept), (Part::CutInside, Facing::Flipped)],
    ),
    fragment(
        FragmentSide::Above,
        Sealing::Outside,
        &[(Part::SourceOutside, Facing::Kept), (Part::CutOutside, Facing::Kept)],
    ),
    fragment(
        FragmentSide::Above,
        Sealing::Unsealed,
        &[(Part::SourceOutside, Facing::Kept)],
    ),
    fragment(
        FragmentSide::Below,
        Sealing::Inside,
        &[(Part::SourceInside, Facing::Kept), (Part::CutInside, Facing::Kept)],
    ),
    fragment(
        FragmentSide::Below,
        Sealing::Outside,
        &[(Part::SourceInside, Facing::Kept), (Part::CutOutside, Facing::Flipped)],
    ),
    fragment(
        FragmentSide::Below,
        Sealing::Unsealed,
        &[(Part::SourceInside, Facing::Kept)],
    ),
    Assembly {
        role: MeshRole::Patch {
            side: PatchSide::Inside,
        },
        parts: &[(Part::CutInside, Facing::Kept)],
    },
    Assembly {
        role: MeshRole::Patch {
            side: PatchSide::Outside,
        },
        parts: &[(Part::CutOutside, Facing::Kept)],
    },
    Assembly {
        role: MeshRole::Seam {
            operand: Operand::Source,
        },
        parts: &[(Part::SourceOutside, Facing::Kept), (Part::SourceInside, Facing::Kept)],
    },
    Assembly {
        role: MeshRole::Seam {
            operand: Operand::Cut,
        },
        parts: &[(Part::CutInside, Facing::Kept), (Part::CutOutside, Facing::Kept)],
    },
    Assembly {
        role: MeshRole::Input {
            operand: Operand::Source,
        },
        parts: &[(Part::SourceInput, Facing::Kept)],
    },
    Assembly {
        role: MeshRole::Input {
            operand: Operand::Cut,
        },
        parts: &[(Part::CutInput, Facing::Kept)],
    },
];
