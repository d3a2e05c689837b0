//! Permutation operators: order-preserving crossover and swap mutation.

use std::collections::HashSet;

use rand::Rng;

/// A permutation of stop indices.
pub type Chromosome = Vec<usize>;

/// Order-preserving crossover with random cut points.
///
/// Draws `a <= b` uniformly from the chromosome positions and delegates to
/// [`order_crossover`]. Empty parents yield an empty child.
pub fn crossover<R: Rng + ?Sized>(first: &[usize], second: &[usize], rng: &mut R) -> Chromosome {
    let len = first.len();
    if len == 0 {
        return Vec::new();
    }
    let x = rng.gen_range(0..len);
    let y = rng.gen_range(0..len);
    order_crossover(first, second, x.min(y), x.max(y))
}

/// Copy `first[a..=b]` into the child at the same positions, then fill the
/// remaining positions, starting after `b` and wrapping, with the genes of
/// `second` in their own order, skipping genes already present.
///
/// When both parents are permutations of the same genes the child is too.
///
/// # Examples
/// ```
/// use courier_solver_genetic::order_crossover;
///
/// let child = order_crossover(&[0, 1, 2, 3, 4], &[4, 3, 2, 1, 0], 1, 2);
/// assert_eq!(child, vec![0, 1, 2, 4, 3]);
/// ```
#[must_use]
pub fn order_crossover(first: &[usize], second: &[usize], a: usize, b: usize) -> Chromosome {
    let len = first.len();
    if len == 0 || a > b || b >= len {
        return first.to_vec();
    }
    let mut child: Vec<Option<usize>> = vec![None; len];
    let mut taken = HashSet::with_capacity(len);
    for (slot, &gene) in child.iter_mut().zip(first).skip(a).take(b - a + 1) {
        *slot = Some(gene);
        taken.insert(gene);
    }
    let donors = second.iter().filter(|gene| !taken.contains(*gene));
    for (position, &gene) in (b + 1..len).chain(0..a).zip(donors) {
        if let Some(slot) = child.get_mut(position) {
            *slot = Some(gene);
        }
    }
    child.into_iter().flatten().collect()
}

/// Swap two uniformly chosen positions (possibly the same one).
pub fn mutate<R: Rng + ?Sized>(chromosome: &mut [usize], rng: &mut R) {
    let len = chromosome.len();
    if len < 2 {
        return;
    }
    let i = rng.gen_range(0..len);
    let j = rng.gen_range(0..len);
    chromosome.swap(i, j);
}
