//! Normal synthesis for primitives that ship without normals

use crate::foundation::math::{utils, Vec3};

/// Normal used when a face or vertex has no usable direction
pub const FALLBACK_NORMAL: [f32; 3] = [0.0, 1.0, 0.0];

fn fallback() -> Vec3 {
    Vec3::from(FALLBACK_NORMAL)
}

/// Unnormalized face normal `(b - a) x (c - a)`
fn face_cross(positions: &[[f32; 3]], a: usize, b: usize, c: usize) -> Vec3 {
    let pa = Vec3::from(positions[a]);
    let pb = Vec3::from(positions[b]);
    let pc = Vec3::from(positions[c]);
    (pb - pa).cross(&(pc - pa))
}

/// Smooth per-vertex normals for an indexed triangle list.
///
/// Every triangle adds its unnormalized cross product to its three corners,
/// so larger faces weigh more. Triangles referencing a vertex past the end of
/// `positions` are skipped, as is a trailing partial triangle.
pub fn smooth_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut accumulated = vec![Vec3::zeros(); positions.len()];

    for triangle in indices.chunks_exact(3) {
        let [a, b, c] = [triangle[0] as usize, triangle[1] as usize, triangle[2] as usize];
        if a.max(b).max(c) >= positions.len() {
            log::warn!("Skipping triangle {triangle:?}: index out of range for {} vertices", positions.len());
            continue;
        }
        let n = face_cross(positions, a, b, c);
        accumulated[a] += n;
        accumulated[b] += n;
        accumulated[c] += n;
    }

    accumulated
        .into_iter()
        .map(|n| utils::normalize_or(n, fallback()).into())
        .collect()
}

/// Flat per-face normals for a non-indexed triangle list.
///
/// Each group of three consecutive vertices gets its own face normal.
/// Vertices of a trailing partial triangle get the fallback normal.
pub fn flat_normals(positions: &[[f32; 3]]) -> Vec<[f32; 3]> {
    let mut normals = vec![FALLBACK_NORMAL; positions.len()];

    for (face, slots) in normals.chunks_exact_mut(3).enumerate() {
        let base = face * 3;
        let n: [f32; 3] = utils::normalize_or(face_cross(positions, base, base + 1, base + 2), fallback()).into();
        slots.fill(n);
    }

    normals
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const XY_TRIANGLE: [[f32; 3]; 3] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];

    fn assert_unit(n: [f32; 3]) {
        let v = Vec3::from(n);
        assert!(v.iter().all(|c| c.is_finite()));
        assert_relative_eq!(v.norm(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_single_indexed_triangle_gets_face_normal() {
        let normals = smooth_normals(&XY_TRIANGLE, &[0, 1, 2]);
        for n in normals {
            assert_relative_eq!(Vec3::from(n), Vec3::z(), epsilon = 1e-6);
        }
    }

    #[test]
    fn test_shared_vertices_average_adjacent_faces() {
        // Two faces folded 90 degrees along the x axis edge 0-1
        let positions = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, -1.0],
        ];
        let normals = smooth_normals(&positions, &[0, 1, 2, 0, 1, 3]);

        let expected = Vec3::new(0.0, 1.0, 1.0).normalize();
        assert_relative_eq!(Vec3::from(normals[0]), expected, epsilon = 1e-6);
        assert_relative_eq!(Vec3::from(normals[1]), expected, epsilon = 1e-6);
        assert_relative_eq!(Vec3::from(normals[2]), Vec3::z(), epsilon = 1e-6);
        assert_relative_eq!(Vec3::from(normals[3]), Vec3::y(), epsilon = 1e-6);
    }

    #[test]
    fn test_unreferenced_vertex_gets_fallback() {
        let mut positions = XY_TRIANGLE.to_vec();
        positions.push([5.0, 5.0, 5.0]);
        let normals = smooth_normals(&positions, &[0, 1, 2]);
        assert_eq!(normals[3], FALLBACK_NORMAL);
    }

    #[test]
    fn test_out_of_range_triangle_is_skipped() {
        let normals = smooth_normals(&XY_TRIANGLE, &[0, 1, 2, 0, 1, 7]);
        assert_eq!(normals.len(), 3);
        for n in normals {
            assert_relative_eq!(Vec3::from(n), Vec3::z(), epsilon = 1e-6);
        }
    }

    #[test]
    fn test_flat_normals_per_face() {
        // Second triangle lies in the XZ plane facing -Y
        let positions = [
            [0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0],
        ];
        let normals = flat_normals(&positions);

        assert_eq!(normals[0], normals[1]);
        assert_eq!(normals[1], normals[2]);
        assert_eq!(normals[3], normals[4]);
        assert_eq!(normals[4], normals[5]);
        assert_relative_eq!(Vec3::from(normals[0]), Vec3::z(), epsilon = 1e-6);
        assert_relative_eq!(Vec3::from(normals[3]), -Vec3::y(), epsilon = 1e-6);
    }

    #[test]
    fn test_coplanar_flat_faces_agree() {
        let positions = [
            [0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0],
            [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0],
        ];
        let normals = flat_normals(&positions);
        assert_relative_eq!(Vec3::from(normals[0]), Vec3::from(normals[3]), epsilon = 1e-6);
    }

    #[test]
    fn test_degenerate_triangles_stay_finite() {
        let collinear = [[0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [2.0, 2.0, 2.0]];
        let coincident = [[3.0, 3.0, 3.0]; 3];

        for n in smooth_normals(&collinear, &[0, 1, 2]).into_iter().chain(flat_normals(&coincident)) {
            assert_unit(n);
        }
    }
}
