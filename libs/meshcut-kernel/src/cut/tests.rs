//! Tests for the BSP cutting kernel.

use super::*;
use crate::executor::{Executor, SerialExecutor, Task};
use crate::kernel::{CutOptions, KernelLog};
use std::sync::Mutex;

// =============================================================================
// HELPERS
// =============================================================================

const CUBE_FACES: [u32; 24] = [
    0, 2, 3, 1, 4, 5, 7, 6, 0, 1, 5, 4, 2, 6, 7, 3, 0, 4, 6, 2, 1, 3, 7, 5,
];
const CUBE_SIZES: [u32; 6] = [4; 6];

/// Unit cube corners shifted by `offset`.
fn cube(offset: DVec3) -> Vec<DVec3> {
    (0..8)
        .map(|i| {
            DVec3::new(
                (i & 1) as f64,
                ((i >> 1) & 1) as f64,
                ((i >> 2) & 1) as f64,
            ) + offset
        })
        .collect()
}

struct ScopedExecutor;

impl Executor for ScopedExecutor {
    fn execute<'scope>(&self, tasks: Vec<Task<'scope>>) {
        std::thread::scope(|scope| {
            for task in tasks {
                scope.spawn(task);
            }
        });
    }

    fn worker_count(&self) -> usize {
        4
    }
}

#[derive(Default)]
struct RecordingLog {
    messages: Mutex<Vec<(KernelLevel, String)>>,
}

impl KernelLog for RecordingLog {
    fn message(&self, level: KernelLevel, text: &str) {
        self.messages.lock().unwrap().push((level, text.to_string()));
    }
}

fn run_cut(
    offset: DVec3,
    options: CutOptions,
    executor: &dyn Executor,
    log: &dyn KernelLog,
) -> KernelResult<CutOutput> {
    let source = InputMesh::new(cube(DVec3::ZERO), &CUBE_FACES, &CUBE_SIZES);
    let cut = InputMesh::new(cube(offset), &CUBE_FACES, &CUBE_SIZES);
    let job = CutJob {
        source: &source,
        cut: &cut,
        options,
        executor,
        log,
    };
    BspKernel.cut(&job)
}

fn cut_cubes(offset: DVec3) -> CutOutput {
    run_cut(offset, CutOptions::default(), &SerialExecutor, &crate::NullLog).unwrap()
}

fn count(output: &CutOutput, pred: impl Fn(&MeshRole) -> bool) -> usize {
    output.meshes.iter().filter(|m| pred(&m.role)).count()
}

// =============================================================================
// CUTS
// =============================================================================

#[test]
fn test_overlapping_cubes_produce_every_role() {
    let output = cut_cubes(DVec3::splat(0.5));

    assert!(output.intersected);
    assert_eq!(output.perturbations, 0);
    assert_eq!(count(&output, |r| matches!(r, MeshRole::Fragment { .. })), 6);
    assert_eq!(count(&output, |r| matches!(r, MeshRole::Patch { .. })), 2);
    assert_eq!(count(&output, |r| matches!(r, MeshRole::Seam { .. })), 2);
    assert_eq!(count(&output, |r| matches!(r, MeshRole::Input { .. })), 2);
}

#[test]
fn test_output_order_is_grouped_by_role() {
    let output = cut_cubes(DVec3::splat(0.5));
    let rank = |role: &MeshRole| match role {
        MeshRole::Fragment { .. } => 0,
        MeshRole::Patch { .. } => 1,
        MeshRole::Seam { .. } => 2,
        MeshRole::Input { .. } => 3,
    };
    let ranks: Vec<i32> = output.meshes.iter().map(|m| rank(&m.role)).collect();
    let mut sorted = ranks.clone();
    sorted.sort();
    assert_eq!(ranks, sorted);
}

#[test]
fn test_disjoint_meshes_return_inputs_only() {
    let log = RecordingLog::default();
    let output = run_cut(DVec3::splat(5.0), CutOptions::default(), &SerialExecutor, &log).unwrap();

    assert!(!output.intersected);
    assert_eq!(output.meshes.len(), 2);
    assert!(output
        .meshes
        .iter()
        .all(|m| matches!(m.role, MeshRole::Input { .. })));

    let messages = log.messages.lock().unwrap();
    assert!(messages
        .iter()
        .any(|(level, text)| *level == KernelLevel::Info && text.contains("do not intersect")));
}

#[test]
fn test_input_echo_keeps_origins() {
    let output = cut_cubes(DVec3::splat(0.5));
    let input = output
        .meshes
        .iter()
        .find(|m| {
            m.role
                == MeshRole::Input {
                    operand: Operand::Source,
                }
        })
        .unwrap();

    assert_eq!(input.vertex_count(), 8);
    assert_eq!(input.face_count(), 6);
    assert!(input.seam_vertices.is_empty());
    assert!(input
        .vertex_origins
        .iter()
        .all(|o| matches!(o, VertexOrigin::Source(i) if *i < 8)));
    let faces: Vec<FaceOrigin> = (0..6).map(FaceOrigin::Source).collect();
    assert_eq!(input.face_origins, faces);
}

#[test]
fn test_sealed_fragment_mixes_both_meshes() {
    let output = cut_cubes(DVec3::splat(0.5));
    let fragment = output
        .meshes
        .iter()
        .find(|m| {
            m.role
                == MeshRole::Fragment {
                    side: FragmentSide::Below,
                    sealing: Sealing::Inside,
                }
        })
        .unwrap();

    assert!(fragment
        .face_origins
        .iter()
        .any(|o| o.operand() == Operand::Source));
    assert!(fragment
        .face_origins
        .iter()
        .any(|o| o.operand() == Operand::Cut));

    // The piece is the overlap [0.5, 1]^3
    for p in &fragment.positions {
        for c in p.to_array() {
            assert!((0.5 - 1e-9..=1.0 + 1e-9).contains(&c), "{p:?} outside overlap");
        }
    }
}

#[test]
fn test_seam_vertices_lie_on_both_surfaces() {
    let output = cut_cubes(DVec3::splat(0.5));
    let fragment = output
        .meshes
        .iter()
        .find(|m| {
            m.role
                == MeshRole::Fragment {
                    side: FragmentSide::Below,
                    sealing: Sealing::Unsealed,
                }
        })
        .unwrap();

    assert!(fragment.seam_vertices.len() >= 6);
    assert!(fragment.seam_vertices.windows(2).all(|w| w[0] < w[1]));
    for &v in &fragment.seam_vertices {
        let p = fragment.positions[v as usize].to_array();
        assert!(p.iter().any(|c| (c - 0.5).abs() < 1e-9), "{p:?} not on cut surface");
        assert!(p.iter().any(|c| (c - 1.0).abs() < 1e-9), "{p:?} not on source surface");
        assert!(fragment.vertex_origins[v as usize].is_introduced());
    }
}

#[test]
fn test_parallel_executor_matches_serial() {
    let serial = cut_cubes(DVec3::splat(0.5));
    let parallel = run_cut(
        DVec3::splat(0.5),
        CutOptions::default(),
        &ScopedExecutor,
        &crate::NullLog,
    )
    .unwrap();

    assert_eq!(serial, parallel);
}

// =============================================================================
// GENERAL POSITION
// =============================================================================

#[test]
fn test_coplanar_faces_violate_general_position() {
    let offset = DVec3::new(0.5, 0.5, 0.0);
    let result = run_cut(offset, CutOptions::default(), &SerialExecutor, &crate::NullLog);

    assert!(matches!(
        result,
        Err(KernelError::GeneralPosition {
            operand: Operand::Source,
            vertex: 3
        })
    ));
}

#[test]
fn test_enforced_general_position_perturbs() {
    let log = RecordingLog::default();
    let options = CutOptions {
        enforce_general_position: true,
    };
    let output = run_cut(DVec3::new(0.5, 0.5, 0.0), options, &SerialExecutor, &log).unwrap();

    assert!(output.intersected);
    assert_eq!(output.perturbations, 1);
    let messages = log.messages.lock().unwrap();
    assert!(messages
        .iter()
        .any(|(level, text)| *level == KernelLevel::Warning && text.contains("perturbed")));
}

// =============================================================================
// POLYGONIZE
// =============================================================================

#[test]
fn test_polygonize_rejects_collinear_face() {
    let vertices = vec![DVec3::ZERO, DVec3::X, DVec3::X * 2.0];
    let mesh = InputMesh::new(vertices, &[0, 1, 2], &[3]);

    assert!(matches!(
        polygonize(&mesh, Operand::Cut),
        Err(KernelError::Degenerate {
            operand: Operand::Cut,
            face: 0
        })
    ));
}

#[test]
fn test_polygonize_rejects_repeated_index() {
    let vertices = vec![DVec3::ZERO, DVec3::X, DVec3::Y];
    let mesh = InputMesh::new(vertices, &[0, 1, 2, 0, 1, 1], &[3, 3]);

    assert!(matches!(
        polygonize(&mesh, Operand::Source),
        Err(KernelError::Degenerate { face: 1, .. })
    ));
}

#[test]
fn test_polygonize_triangulates_concave_face() {
    let vertices = vec![
        DVec3::new(0.0, 0.0, 0.0),
        DVec3::new(2.0, 0.0, 0.0),
        DVec3::new(1.0, 0.5, 0.0),
        DVec3::new(1.0, 2.0, 0.0),
    ];
    let mesh = InputMesh::new(vertices, &[0, 1, 2, 3], &[4]);

    let polygons = polygonize(&mesh, Operand::Source).unwrap();

    assert_eq!(polygons.len(), 2);
    assert!(polygons
        .iter()
        .all(|p| p.origin() == FaceOrigin::Source(0) && p.vertices().len() == 3));
}

/// Prism over the L-shaped hexagon `(0,0) (2,0) (2,1) (1,1) (1,2) (0,2)`,
/// one unit tall. Both caps are concave.
fn ell_prism() -> (Vec<DVec3>, Vec<u32>, Vec<u32>) {
    let outline = [
        (0.0, 0.0),
        (2.0, 0.0),
        (2.0, 1.0),
        (1.0, 1.0),
        (1.0, 2.0),
        (0.0, 2.0),
    ];
    let vertices: Vec<DVec3> = [0.0, 1.0]
        .iter()
        .flat_map(|&z| outline.iter().map(move |&(x, y)| DVec3::new(x, y, z)))
        .collect();

    let mut faces: Vec<u32> = (0..6).rev().collect();
    faces.extend(6..12);
    let mut sizes = vec![6, 6];
    for i in 0..6 {
        let j = (i + 1) % 6;
        faces.extend([i, j, j + 6, i + 6]);
        sizes.push(4);
    }
    (vertices, faces, sizes)
}

fn triangle_area(a: DVec3, b: DVec3, c: DVec3) -> f64 {
    (b - a).cross(c - a).length() / 2.0
}

fn cap_area(mesh: &KernelMesh, z: f64) -> f64 {
    mesh.faces()
        .map(|face| face.iter().map(|&i| mesh.positions[i as usize]).collect::<Vec<_>>())
        .filter(|points| points.iter().all(|p| p.z == z))
        .map(|points| {
            (1..points.len() - 1)
                .map(|i| triangle_area(points[0], points[i], points[i + 1]))
                .sum::<f64>()
        })
        .sum()
}

#[test]
fn test_polygonize_ear_clips_l_shaped_face() {
    let (vertices, faces, sizes) = ell_prism();
    let mesh = InputMesh::new(vertices, &faces, &sizes);

    let polygons = polygonize(&mesh, Operand::Source).unwrap();
    let bottom: Vec<&Polygon> = polygons
        .iter()
        .filter(|p| p.origin() == FaceOrigin::Source(0))
        .collect();

    assert_eq!(bottom.len(), 4);
    let area: f64 = bottom
        .iter()
        .map(|p| {
            let v = p.vertices();
            triangle_area(v[0].pos, v[1].pos, v[2].pos)
        })
        .sum();
    assert!((area - 3.0).abs() < 1e-12, "bottom cap covers {area}");
    assert!(bottom.iter().all(|p| p.plane().normal().z < 0.0));
}

#[test]
fn test_concave_input_echo_keeps_its_area() {
    let (vertices, faces, sizes) = ell_prism();
    let source = InputMesh::new(vertices, &faces, &sizes);
    let cut = InputMesh::new(cube(DVec3::splat(5.0)), &CUBE_FACES, &CUBE_SIZES);
    let job = CutJob {
        source: &source,
        cut: &cut,
        options: CutOptions::default(),
        executor: &SerialExecutor,
        log: &crate::NullLog,
    };

    let output = BspKernel.cut(&job).unwrap();
    let input = &output.meshes[0];

    assert_eq!(input.role, MeshRole::Input { operand: Operand::Source });
    assert!((cap_area(input, 0.0) - 3.0).abs() < 1e-9);
    assert!((cap_area(input, 1.0) - 3.0).abs() < 1e-9);
}

#[test]
fn test_cube_in_concave_notch_does_not_intersect() {
    let (vertices, faces, sizes) = ell_prism();
    let source = InputMesh::new(vertices, &faces, &sizes);
    // Crosses the bottom cap inside the notch only
    let cut = InputMesh::new(cube(DVec3::new(1.1, 1.1, -0.8)), &CUBE_FACES, &CUBE_SIZES);
    let job = CutJob {
        source: &source,
        cut: &cut,
        options: CutOptions::default(),
        executor: &SerialExecutor,
        log: &crate::NullLog,
    };

    let output = BspKernel.cut(&job).unwrap();

    assert!(!output.intersected);
    assert_eq!(output.meshes.len(), 2);
}

#[test]
fn test_polygonize_keeps_convex_face_whole() {
    let mesh = InputMesh::new(cube(DVec3::ZERO), &CUBE_FACES, &CUBE_SIZES);
    let polygons = polygonize(&mesh, Operand::Source).unwrap();

    assert_eq!(polygons.len(), 6);
    assert_eq!(polygons[2].vertices()[1].origin, VertexOrigin::Source(1));
}
