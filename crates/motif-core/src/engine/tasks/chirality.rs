use super::correspondence::Pairing;
use crate::core::models::ids::AtomId;
use crate::core::models::structure::Structure;
use crate::core::models::topology::BondCollection;
use crate::core::utils::geometry::det3;
use crate::engine::model::{MotifModel, atom_is_near_planar};
use nalgebra::Vector3;
use tracing::trace;

/// Sign of `x` as -1, 0 or 1; zero stays zero.
#[inline]
fn sign(x: f64) -> i8 {
    if x > 0.0 {
        1
    } else if x < 0.0 {
        -1
    } else {
        0
    }
}

/// First neighbor triple `[i, j, k]`, `i < j < k`, whose signed volume differs in sign
/// between the two vector sets.
fn first_handedness_mismatch(model: &[Vector3<f64>], candidate: &[Vector3<f64>]) -> Option<[usize; 3]> {
    let n = model.len().min(candidate.len());
    if n < 3 {
        return None;
    }
    for i in 0..n - 2 {
        for j in i + 1..n - 1 {
            for k in j + 1..n {
                let expected = sign(det3(&model[i], &model[j], &model[k]));
                let observed = sign(det3(&candidate[i], &candidate[j], &candidate[k]));
                if expected != observed {
                    return Some([i, j, k]);
                }
            }
        }
    }
    None
}

/// Bond vectors from the center to every paired model neighbor, in model neighbor order,
/// together with the vectors between the corresponding candidate atoms.
fn paired_bond_vectors(
    model: &Structure,
    candidate: &Structure,
    pairing: &Pairing,
    model_center: AtomId,
    candidate_center: AtomId,
) -> (Vec<Vector3<f64>>, Vec<Vector3<f64>>) {
    let (Some(mc), Some(cc)) = (model.atom(model_center), candidate.atom(candidate_center)) else {
        return (Vec::new(), Vec::new());
    };
    model
        .bonds()
        .neighbors(model_center)
        .filter_map(|(model_neighbor, _)| {
            let candidate_neighbor = pairing.candidate_of(model_neighbor)?;
            let mn = model.atom(model_neighbor)?;
            let cn = candidate.atom(candidate_neighbor)?;
            Some((mn.position - mc.position, cn.position - cc.position))
        })
        .unzip()
}

/// Chiral model atoms whose paired candidate atom has the opposite handedness.
///
/// A near-planar model center is a mismatch only when its candidate counterpart, judged
/// over `moved_bonds`, is not near-planar. Other centers compare the sign of the signed
/// volume of every triple of paired neighbors and stop at the first disagreement.
///
/// Returns `(model, candidate)` pairs in model serial order.
pub fn compare(
    model: &MotifModel,
    candidate: &Structure,
    moved_bonds: &BondCollection,
    pairing: &Pairing,
    planarity_threshold: f64,
) -> Vec<(AtomId, AtomId)> {
    let mut mismatches = Vec::new();
    for &model_atom in model.chiral_atoms() {
        let Some(candidate_atom) = pairing.candidate_of(model_atom) else {
            continue;
        };

        let inverted = if model.is_near_planar(model_atom) {
            !atom_is_near_planar(candidate, moved_bonds, candidate_atom, planarity_threshold)
        } else {
            let (expected, observed) = paired_bond_vectors(
                model.structure(),
                candidate,
                pairing,
                model_atom,
                candidate_atom,
            );
            first_handedness_mismatch(&expected, &observed).is_some()
        };

        if inverted {
            trace!(?model_atom, ?candidate_atom, "Chirality mismatch");
            mismatches.push((model_atom, candidate_atom));
        }
    }
    mismatches
}
