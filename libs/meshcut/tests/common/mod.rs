//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use meshcut::{
    ComponentHandle, ContextFlags, ContextHandle, ContextRegistry, DataField, DispatchFlags,
    ErrorKind, MeshInput,
};

/// Quads of the unit cube whose vertex `i` is `(i & 1, (i >> 1) & 1, (i >> 2) & 1)`.
pub const CUBE_FACES: [u32; 24] = [
    0, 2, 3, 1, 4, 5, 7, 6, 0, 1, 5, 4, 2, 6, 7, 3, 0, 4, 6, 2, 1, 3, 7, 5,
];
pub const CUBE_SIZES: [u32; 6] = [4; 6];

/// Every data selector, in wire order.
pub const ALL_FIELDS: [DataField; 16] = [
    DataField::VertexFloat,
    DataField::VertexDouble,
    DataField::Face,
    DataField::FaceSize,
    DataField::Edge,
    DataField::Type,
    DataField::FragmentLocation,
    DataField::PatchLocation,
    DataField::FragmentSealType,
    DataField::SeamVertex,
    DataField::Origin,
    DataField::VertexMap,
    DataField::FaceMap,
    DataField::FaceAdjacentFace,
    DataField::FaceAdjacentFaceSize,
    DataField::FaceTriangulation,
];

pub const DOUBLE: u32 = DispatchFlags::VERTEX_ARRAY_DOUBLE.bits();
pub const FLOAT: u32 = DispatchFlags::VERTEX_ARRAY_FLOAT.bits();
pub const INLINE: u32 = ContextFlags::SCHEDULE_INLINE.bits();

pub fn cube(offset: [f64; 3]) -> Vec<f64> {
    (0..8u32)
        .flat_map(|i| {
            [
                (i & 1) as f64 + offset[0],
                ((i >> 1) & 1) as f64 + offset[1],
                ((i >> 2) & 1) as f64 + offset[2],
            ]
        })
        .collect()
}

/// Unit-height prism over the L-shaped hexagon
/// `(0,0) (2,0) (2,1) (1,1) (1,2) (0,2)`. Faces 0 and 1 are the concave
/// bottom and top caps, each of area 3.
pub fn ell_prism() -> (Vec<f64>, Vec<u32>, Vec<u32>) {
    let outline = [
        (0.0, 0.0),
        (2.0, 0.0),
        (2.0, 1.0),
        (1.0, 1.0),
        (1.0, 2.0),
        (0.0, 2.0),
    ];
    let vertices: Vec<f64> = [0.0, 1.0]
        .iter()
        .flat_map(|&z| outline.iter().flat_map(move |&(x, y)| [x, y, z]))
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

pub fn cube_f32(offset: [f64; 3]) -> Vec<f32> {
    cube(offset).into_iter().map(|c| c as f32).collect()
}

pub fn cube_input(vertices: &[f64]) -> MeshInput<'_> {
    MeshInput::f64(vertices, &CUBE_FACES, &CUBE_SIZES)
}

/// Cuts the unit cube with a copy shifted by `offset`.
pub fn cut_cubes(
    registry: &ContextRegistry,
    ctx: ContextHandle,
    flags: u32,
    offset: [f64; 3],
) -> meshcut::Result<()> {
    let source = cube([0.0; 3]);
    let cut = cube(offset);
    registry.dispatch(ctx, flags, &cube_input(&source), &cube_input(&cut))
}

pub fn count(
    registry: &ContextRegistry,
    ctx: ContextHandle,
    filter: meshcut::ComponentTypeFlags,
) -> usize {
    registry.list_components(ctx, filter.bits()).unwrap().len()
}

pub fn read_bytes(
    registry: &ContextRegistry,
    ctx: ContextHandle,
    component: ComponentHandle,
    field: DataField,
) -> Vec<u8> {
    let len = registry
        .component_data(ctx, component, field as u32, None)
        .unwrap();
    let mut bytes = vec![0u8; len];
    registry
        .component_data(ctx, component, field as u32, Some(&mut bytes))
        .unwrap();
    bytes
}

/// Reads a field, or the kind of error the read fails with.
pub fn try_read_bytes(
    registry: &ContextRegistry,
    ctx: ContextHandle,
    component: ComponentHandle,
    field: DataField,
) -> Result<Vec<u8>, ErrorKind> {
    let len = registry
        .component_data(ctx, component, field as u32, None)
        .map_err(|err| err.kind())?;
    let mut bytes = vec![0u8; len];
    registry
        .component_data(ctx, component, field as u32, Some(&mut bytes))
        .map_err(|err| err.kind())?;
    Ok(bytes)
}

pub fn read_u32s(
    registry: &ContextRegistry,
    ctx: ContextHandle,
    component: ComponentHandle,
    field: DataField,
) -> Vec<u32> {
    read_bytes(registry, ctx, component, field)
        .chunks_exact(4)
        .map(|c| u32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

pub fn read_f64s(
    registry: &ContextRegistry,
    ctx: ContextHandle,
    component: ComponentHandle,
    field: DataField,
) -> Vec<f64> {
    read_bytes(registry, ctx, component, field)
        .chunks_exact(8)
        .map(|c| f64::from_ne_bytes(c.try_into().unwrap()))
        .collect()
}

pub fn read_f32s(
    registry: &ContextRegistry,
    ctx: ContextHandle,
    component: ComponentHandle,
    field: DataField,
) -> Vec<f32> {
    read_bytes(registry, ctx, component, field)
        .chunks_exact(4)
        .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}
