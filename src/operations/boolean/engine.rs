use std::collections::HashMap;

use crate::error::{OperationError, Result};
use crate::math::polygon_3d::is_planar;
use crate::math::{Point3, Vector3, PLANE_EPSILON};
use crate::operations::query::{Aabb, Volume};
use crate::topology::{Mesh, MeshStore, SolidData, SolidId};

use super::bsp::Node;
use super::select::BooleanOp;
use super::split::Polygon;

/// Executes a boolean operation on two solids.
///
/// Orchestrates the full pipeline: polygon extraction, BSP clipping with an
/// AABB shortcut for the base, and re-indexing into a new solid named after
/// `solid_a`. The operands are left in the store untouched.
pub fn boolean_execute(
    store: &mut MeshStore,
    solid_a: SolidId,
    solid_b: SolidId,
    op: BooleanOp,
) -> Result<SolidId> {
    let a = store.solid(solid_a)?;
    let b = store.solid(solid_b)?;
    let name = a.name.clone();
    let mesh = boolean_meshes(&a.mesh, &b.mesh, op)?;
    Ok(store.add_solid(SolidData::base(name, mesh)))
}

/// Runs the boolean on two meshes directly.
pub(crate) fn boolean_meshes(a: &Mesh, b: &Mesh, op: BooleanOp) -> Result<Mesh> {
    a.check_indices()?;
    b.check_indices()?;

    // Step 1: Collect polygons, triangulating warped faces
    let polys_a = mesh_to_polygons(a);
    let polys_b = mesh_to_polygons(b);
    if polys_a.is_empty() || polys_b.is_empty() {
        return Err(OperationError::InvalidInput(format!(
            "{} operand has no usable faces",
            op.label()
        ))
        .into());
    }

    // Step 2: BSP clipping. Base polygons outside the tool's box skip the
    // tool tree; the tool itself is always classified against the whole base.
    let Some(box_b) = Aabb::from_points(&b.positions) else {
        return Err(OperationError::InvalidInput("empty operand".into()).into());
    };
    let result = match op {
        BooleanOp::Union => union_polygons(polys_a, polys_b, &box_b),
        BooleanOp::Subtract => subtract_polygons(polys_a, polys_b, &box_b),
        BooleanOp::Intersect => intersect_polygons(polys_a, polys_b),
    };

    // Step 3: Re-index and sanity-check
    let mesh = polygons_to_mesh(&result);
    if mesh.is_empty() {
        return Err(OperationError::Failed(format!("{} produced an empty result", op.label())).into());
    }
    if !mesh.is_finite() {
        return Err(
            OperationError::Failed(format!("{} produced non-finite vertices", op.label())).into(),
        );
    }
    let volume = Volume::new(&mesh).execute();
    if !(volume.is_finite() && volume > 0.0) {
        return Err(OperationError::Failed(format!(
            "{} produced a non-positive volume ({volume})",
            op.label()
        ))
        .into());
    }
    Ok(mesh)
}

/// `a ∪ b`: the parts of `a` outside `b` plus the parts of `b` outside `a`.
///
/// Written over polygon lists rather than merged trees, which lets the far
/// part of `a` bypass `b` entirely while `b` still meets every plane of `a`.
fn union_polygons(a: Vec<Polygon>, b: Vec<Polygon>, box_b: &Aabb) -> Vec<Polygon> {
    let a_tree = Node::from_polygons(a.clone());
    let b_tree = Node::from_polygons(b.clone());
    let (near, mut out) = partition_polygons(a, box_b);
    out.extend(b_tree.clip_polygons(near));
    // The flipped second pass drops faces of `b` coplanar with faces of `a`.
    let b = a_tree.clip_polygons(b);
    out.extend(flipped(a_tree.clip_polygons(flipped(b))));
    out
}

/// `a - b`: the parts of `a` outside `b` plus the parts of `b` inside `a`,
/// turned inward.
fn subtract_polygons(a: Vec<Polygon>, b: Vec<Polygon>, box_b: &Aabb) -> Vec<Polygon> {
    let mut a_tree = Node::from_polygons(a.clone());
    a_tree.invert();
    let b_tree = Node::from_polygons(b.clone());
    let (near, mut out) = partition_polygons(a, box_b);
    out.extend(flipped(b_tree.clip_polygons(flipped(near))));
    let b = a_tree.clip_polygons(b);
    out.extend(a_tree.clip_polygons(flipped(b)));
    out
}

/// `a ∩ b` over BSP trees.
fn intersect_polygons(a: Vec<Polygon>, b: Vec<Polygon>) -> Vec<Polygon> {
    let mut a = Node::from_polygons(a);
    let mut b = Node::from_polygons(b);
    a.invert();
    b.clip_to(&a);
    b.invert();
    a.clip_to(&b);
    b.clip_to(&a);
    a.build(b.all_polygons());
    a.invert();
    a.all_polygons()
}

/// Splits polygons into those whose bounds touch `other`, grown by the
/// plane tolerance, and those lying wholly outside it.
fn partition_polygons(polygons: Vec<Polygon>, other: &Aabb) -> (Vec<Polygon>, Vec<Polygon>) {
    let margin = Vector3::repeat(PLANE_EPSILON);
    let grown = Aabb {
        min: other.min - margin,
        max: other.max + margin,
    };
    polygons.into_iter().partition(|poly| {
        Aabb::from_points(&poly.vertices).is_some_and(|bb| bb.overlaps(&grown))
    })
}

fn flipped(mut polygons: Vec<Polygon>) -> Vec<Polygon> {
    for poly in &mut polygons {
        poly.flip();
    }
    polygons
}

/// Converts mesh faces to BSP polygons.
///
/// Planar faces pass through whole; warped faces (for example displaced
/// sphere quads) are fanned into triangles first.
fn mesh_to_polygons(mesh: &Mesh) -> Vec<Polygon> {
    let mut out = Vec::with_capacity(mesh.face_count());
    for face in 0..mesh.face_count() {
        let points = mesh.face_points(face);
        if is_planar(&points, PLANE_EPSILON) {
            out.extend(Polygon::new(points));
        } else {
            for k in 1..points.len() - 1 {
                out.extend(Polygon::new(vec![points[0], points[k], points[k + 1]]));
            }
        }
    }
    out
}

/// Re-indexes a polygon soup, sharing bit-identical positions.
fn polygons_to_mesh(polygons: &[Polygon]) -> Mesh {
    let mut mesh = Mesh::default();
    let mut index: HashMap<[u64; 3], u32> = HashMap::new();
    for poly in polygons {
        let mut face: Vec<u32> = poly
            .vertices
            .iter()
            .map(|p| {
                *index
                    .entry(position_key(p))
                    .or_insert_with(|| mesh.push_vertex(*p))
            })
            .collect();
        face.dedup();
        if face.len() > 1 && face.first() == face.last() {
            face.pop();
        }
        if face.len() >= 3 {
            mesh.faces.push(face);
        }
    }
    mesh.recompute_normals();
    mesh
}

fn position_key(p: &Point3) -> [u64; 3] {
    // Fold -0.0 into 0.0 so they share a vertex.
    [p.x + 0.0, p.y + 0.0, p.z + 0.0].map(f64::to_bits)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operations::creation::{MakeBox, MakePrism, MakeUvSphere};
    use approx::assert_relative_eq;

    fn cube(offset: Vector3) -> Mesh {
        let mut mesh = MakeBox::new(Vector3::new(1.0, 1.0, 1.0)).execute().unwrap();
        mesh.translate(&offset);
        mesh
    }

    #[test]
    fn union_of_overlapping_cubes() {
        let a = cube(Vector3::zeros());
        let b = cube(Vector3::new(1.0, 1.0, 1.0));
        let result = boolean_meshes(&a, &b, BooleanOp::Union).unwrap();
        assert_relative_eq!(Volume::new(&result).execute(), 15.0, epsilon = 1e-6);
    }

    #[test]
    fn subtract_overlapping_cubes() {
        let a = cube(Vector3::zeros());
        let b = cube(Vector3::new(1.0, 1.0, 1.0));
        let result = boolean_meshes(&a, &b, BooleanOp::Subtract).unwrap();
        assert_relative_eq!(Volume::new(&result).execute(), 7.0, epsilon = 1e-6);
    }

    #[test]
    fn intersect_overlapping_cubes() {
        let a = cube(Vector3::zeros());
        let b = cube(Vector3::new(1.0, 1.0, 1.0));
        let result = boolean_meshes(&a, &b, BooleanOp::Intersect).unwrap();
        assert_relative_eq!(Volume::new(&result).execute(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn drill_through_box() {
        let slab = MakeBox::new(Vector3::new(5.0, 5.0, 1.0)).execute().unwrap();
        let pin = MakePrism::new(6, 1.0, 4.0).execute().unwrap();
        let result = boolean_meshes(&slab, &pin, BooleanOp::Subtract).unwrap();
        let hexagon_area = 1.5 * 3.0_f64.sqrt();
        assert_relative_eq!(
            Volume::new(&result).execute(),
            200.0 - hexagon_area * 2.0,
            epsilon = 1e-6
        );
    }

    #[test]
    fn subtract_disjoint_keeps_base() {
        let a = cube(Vector3::zeros());
        let b = cube(Vector3::new(10.0, 0.0, 0.0));
        let result = boolean_meshes(&a, &b, BooleanOp::Subtract).unwrap();
        assert_relative_eq!(Volume::new(&result).execute(), 8.0, epsilon = 1e-9);
    }

    #[test]
    fn intersect_disjoint_fails() {
        let a = cube(Vector3::zeros());
        let b = cube(Vector3::new(10.0, 0.0, 0.0));
        assert!(boolean_meshes(&a, &b, BooleanOp::Intersect).is_err());
    }

    #[test]
    fn empty_operand_fails() {
        let a = cube(Vector3::zeros());
        assert!(boolean_meshes(&a, &Mesh::default(), BooleanOp::Union).is_err());
    }

    /// A hexagonal pin poking out through the side of a finely tessellated
    /// sphere, so most of the sphere lies outside the pin's box.
    fn sphere_and_rim_pin() -> (Mesh, Mesh) {
        let sphere = MakeUvSphere::new(Point3::origin(), 10.0, 32, 16).execute().unwrap();
        let mut pin = MakePrism::new(6, 1.5, 4.0).execute().unwrap();
        pin.translate(&Vector3::new(9.2, 0.7, 1.0));
        (sphere, pin)
    }

    #[test]
    fn rim_boolean_volumes_agree_with_full_intersection() {
        let (sphere, pin) = sphere_and_rim_pin();
        let sphere_volume = Volume::new(&sphere).execute();
        let pin_volume = Volume::new(&pin).execute();
        let overlap = Volume::new(&boolean_meshes(&sphere, &pin, BooleanOp::Intersect).unwrap()).execute();
        assert!(overlap > 0.0 && overlap < pin_volume);

        let union = Volume::new(&boolean_meshes(&sphere, &pin, BooleanOp::Union).unwrap()).execute();
        assert_relative_eq!(union, sphere_volume + pin_volume - overlap, max_relative = 1e-6);
        let difference =
            Volume::new(&boolean_meshes(&sphere, &pin, BooleanOp::Subtract).unwrap()).execute();
        assert_relative_eq!(difference, sphere_volume - overlap, max_relative = 1e-6);
    }

    #[test]
    fn tool_inside_base_is_still_clipped() {
        let big = cube(Vector3::zeros());
        let mut small = MakeBox::new(Vector3::new(0.25, 0.25, 0.25)).execute().unwrap();
        small.translate(&Vector3::new(0.1, 0.0, 0.0));
        let union = boolean_meshes(&big, &small, BooleanOp::Union).unwrap();
        assert_relative_eq!(Volume::new(&union).execute(), 8.0, epsilon = 1e-9);
        let hollow = boolean_meshes(&big, &small, BooleanOp::Subtract).unwrap();
        assert_relative_eq!(Volume::new(&hollow).execute(), 8.0 - 0.125, epsilon = 1e-9);
    }

    #[test]
    fn face_with_too_few_vertices_is_rejected() {
        let mut a = cube(Vector3::zeros());
        a.faces.push(Vec::new());
        let b = cube(Vector3::new(1.0, 1.0, 1.0));
        assert!(boolean_meshes(&a, &b, BooleanOp::Union).is_err());
        a.faces.pop();
        a.faces.push(vec![0, 1]);
        assert!(boolean_meshes(&b, &a, BooleanOp::Subtract).is_err());
    }

    #[test]
    fn execute_leaves_operands_in_store() {
        let mut store = MeshStore::new();
        let a = store.add_solid(SolidData::base("base", cube(Vector3::zeros())));
        let b = store.add_solid(SolidData::tool("tool", cube(Vector3::new(1.0, 0.0, 0.0))));
        let c = boolean_execute(&mut store, a, b, BooleanOp::Union).unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.solid(c).unwrap().name, "base");
    }
}
