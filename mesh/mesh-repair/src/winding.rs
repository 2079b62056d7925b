//! Winding repair.
//!
//! Faces are grouped into edge-connected components. Within a component the
//! winding of every face is propagated from a seed across shared manifold
//! edges; the faces that disagree with the majority are flipped. A component
//! whose signed volume ends up negative is then reversed as a whole so that
//! normals point outward.

use std::collections::VecDeque;

use hashbrown::{HashMap, HashSet};
use mesh_types::IndexedMesh;
use nalgebra::Vector3;
use tracing::debug;

use crate::adjacency::MeshAdjacency;

/// Counts from [`fix_winding_order`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindingSummary {
    /// Edge-connected face components.
    pub components: usize,
    /// Faces flipped to agree with their component's majority.
    pub faces_flipped: usize,
    /// Components reversed because their signed volume was negative.
    pub components_reversed: usize,
}

/// Number of manifold edges whose two faces traverse them in the same
/// direction.
///
/// Zero for a consistently wound mesh.
///
/// ```
/// use mesh_repair::count_inconsistent_edges;
///
/// assert_eq!(count_inconsistent_edges(&[[0, 1, 2], [2, 1, 3]]), 0);
/// assert_eq!(count_inconsistent_edges(&[[0, 1, 2], [1, 2, 3]]), 1);
/// ```
#[must_use]
pub fn count_inconsistent_edges(faces: &[[u32; 3]]) -> usize {
    let mut directed: HashMap<(u32, u32), u32> = HashMap::with_capacity(faces.len() * 3);
    for face in faces {
        for i in 0..3 {
            *directed.entry((face[i], face[(i + 1) % 3])).or_default() += 1;
        }
    }

    let adjacency = MeshAdjacency::build(faces);
    adjacency
        .edges()
        .filter(|(_, f)| f.len() == 2)
        .filter(|&((a, b), _)| {
            let fwd = directed.get(&(a, b)).copied().unwrap_or(0);
            let rev = directed.get(&(b, a)).copied().unwrap_or(0);
            fwd != 1 || rev != 1
        })
        .count()
}

/// Make winding consistent within each component and orient each component
/// outward.
///
/// Non-manifold edges do not propagate orientation. Open components are
/// oriented by the sign of their (partial) signed volume.
///
/// # Example
///
/// ```
/// use mesh_repair::{count_inconsistent_edges, fix_winding_order};
/// use mesh_types::unit_cube;
///
/// let mut cube = unit_cube();
/// cube.faces[3].swap(1, 2);
///
/// let summary = fix_winding_order(&mut cube);
/// assert_eq!(summary.faces_flipped, 1);
/// assert_eq!(count_inconsistent_edges(&cube.faces), 0);
/// assert!(cube.signed_volume() > 0.0);
/// ```
pub fn fix_winding_order(mesh: &mut IndexedMesh) -> WindingSummary {
    let mut summary = WindingSummary::default();
    if mesh.faces.is_empty() {
        return summary;
    }

    let adjacency = MeshAdjacency::build(&mesh.faces);
    let mut component_of: Vec<Option<usize>> = vec![None; mesh.faces.len()];
    // Relative to the seed: true means "traverses edges opposite to the seed".
    let mut flipped = vec![false; mesh.faces.len()];
    let mut components: Vec<Vec<usize>> = Vec::new();

    for seed in 0..mesh.faces.len() {
        if component_of[seed].is_some() {
            continue;
        }
        let id = components.len();
        let mut members = vec![seed];
        component_of[seed] = Some(id);

        let mut queue = VecDeque::from([seed]);
        while let Some(current) = queue.pop_front() {
            let face = mesh.faces[current];
            for i in 0..3 {
                let (a, b) = (face[i], face[(i + 1) % 3]);
                let Some(&[f0, f1]) = adjacency.faces_for_edge(a, b) else {
                    continue;
                };
                let neighbor = if f0 == current { f1 } else { f0 };
                if component_of[neighbor].is_some() {
                    continue;
                }
                // Consistent neighbors traverse the shared edge as b -> a.
                let same_direction = traverses(mesh.faces[neighbor], a, b);
                flipped[neighbor] = flipped[current] ^ same_direction;
                component_of[neighbor] = Some(id);
                members.push(neighbor);
                queue.push_back(neighbor);
            }
        }
        components.push(members);
    }

    summary.components = components.len();

    for members in &components {
        let opposed = members.iter().filter(|&&f| flipped[f]).count();
        // Flip the minority so the majority keeps its winding.
        let flip_when = opposed * 2 <= members.len();
        for &f in members {
            if flipped[f] == flip_when {
                mesh.faces[f].swap(1, 2);
                summary.faces_flipped += 1;
            }
        }

        if component_signed_volume(mesh, members) < 0.0 {
            for &f in members {
                mesh.faces[f].swap(1, 2);
            }
            summary.components_reversed += 1;
        }
    }

    debug!(
        components = summary.components,
        flipped = summary.faces_flipped,
        reversed = summary.components_reversed,
        "Winding repaired"
    );
    summary
}

/// True if `face` walks from `a` directly to `b`.
fn traverses(face: [u32; 3], a: u32, b: u32) -> bool {
    (0..3).any(|i| face[i] == a && face[(i + 1) % 3] == b)
}

fn component_signed_volume(mesh: &IndexedMesh, members: &[usize]) -> f64 {
    // Relative to the component centroid so open pieces far from the origin
    // still get a meaningful sign.
    let mut centroid = Vector3::zeros();
    let mut n = 0.0;
    for &f in members {
        for &v in &mesh.faces[f] {
            centroid += mesh.vertices[v as usize].position.coords;
            n += 1.0;
        }
    }
    let centroid = centroid / n;

    members
        .iter()
        .map(|&f| {
            let [a, b, c] = mesh.faces[f];
            let p0 = mesh.vertices[a as usize].position.coords - centroid;
            let p1 = mesh.vertices[b as usize].position.coords - centroid;
            let p2 = mesh.vertices[c as usize].position.coords - centroid;
            p0.dot(&p1.cross(&p2))
        })
        .sum::<f64>()
        / 6.0
}

/// True if every directed edge occurs once and its reverse also occurs.
///
/// This is the "closed and consistently wound" check in a single pass over
/// directed edges.
#[must_use]
pub fn has_consistent_winding(faces: &[[u32; 3]]) -> bool {
    let mut seen: HashSet<(u32, u32)> = HashSet::with_capacity(faces.len() * 3);
    for face in faces {
        for i in 0..3 {
            if !seen.insert((face[i], face[(i + 1) % 3])) {
                return false;
            }
        }
    }
    !seen.is_empty() && seen.iter().all(|&(a, b)| seen.contains(&(b, a)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_types::{icosphere, unit_cube};

    #[test]
    fn consistent_mesh_untouched() {
        let mut cube = unit_cube();
        let before = cube.faces.clone();
        let summary = fix_winding_order(&mut cube);
        assert_eq!(summary.components, 1);
        assert_eq!(summary.faces_flipped, 0);
        assert_eq!(summary.components_reversed, 0);
        assert_eq!(cube.faces, before);
    }

    #[test]
    fn inside_out_mesh_reversed() {
        let mut sphere = icosphere(1);
        sphere.flip_normals();
        let summary = fix_winding_order(&mut sphere);
        assert_eq!(summary.faces_flipped, 0);
        assert_eq!(summary.components_reversed, 1);
        assert!(sphere.signed_volume() > 0.0);
    }

    #[test]
    fn minority_flipped_per_component() {
        let mut mesh = unit_cube();
        let mut other = icosphere(1);
        other.translate(nalgebra::Vector3::new(5.0, 0.0, 0.0));
        mesh.merge(&other);
        // Scramble three faces in each component.
        for f in [0, 5, 9, 12, 40, 77] {
            mesh.faces[f].swap(0, 1);
        }

        let summary = fix_winding_order(&mut mesh);
        assert_eq!(summary.components, 2);
        assert_eq!(summary.faces_flipped, 6);
        assert_eq!(count_inconsistent_edges(&mesh.faces), 0);
        assert!(has_consistent_winding(&mesh.faces));
        assert!(mesh.signed_volume() > 0.0);
    }

    #[test]
    fn consistency_check_detects_open_surface() {
        assert!(!has_consistent_winding(&[[0, 1, 2]]));
        assert!(has_consistent_winding(&unit_cube().faces));
    }
}
