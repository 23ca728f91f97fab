//! k-subset enumeration over a sorted slice of points.

/// Calls `visit` once for every `k`-element subset of `items`, in
/// lexicographic order of positions.
///
/// Each subset is passed as a slice that preserves the order of `items`, so an
/// ascending input yields ascending subsets. `k == 0` visits the empty subset
/// once; `k > items.len()` visits nothing.
pub fn for_each_combination<F>(items: &[u32], k: usize, mut visit: F)
where
    F: FnMut(&[u32]),
{
    let n = items.len();
    if k > n {
        return;
    }
    let mut positions: Vec<usize> = (0..k).collect();
    let mut subset: Vec<u32> = items[..k].to_vec();

    loop {
        visit(&subset);

        // Rightmost position that has not reached its final slot.
        let Some(i) = (0..k).rev().find(|&i| positions[i] != i + n - k) else {
            return;
        };
        positions[i] += 1;
        subset[i] = items[positions[i]];
        for j in i + 1..k {
            positions[j] = positions[j - 1] + 1;
            subset[j] = items[positions[j]];
        }
    }
}

/// Number of `k`-subsets of an `n`-set, or `None` on `u64` overflow.
pub fn binomial(n: u64, k: u64) -> Option<u64> {
    if k > n {
        return Some(0);
    }
    let k = k.min(n - k);
    let mut acc: u128 = 1;
    for i in 0..k {
        // Exact at every step: acc is C(n, i) * (n - i) / (i + 1) = C(n, i + 1).
        acc = acc * (n - i) as u128 / (i + 1) as u128;
        if acc > u64::MAX as u128 {
            return None;
        }
    }
    Some(acc as u64)
}

/// XOR of every point in `points`.
#[inline]
pub fn xor_sum(points: &[u32]) -> u32 {
    points.iter().fold(0, |acc, &p| acc ^ p)
}
