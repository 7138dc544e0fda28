// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lipmaa link arithmetic.
//!
//! Every entry links back to its immediate predecessor and, where the two
//! differ, to the entry at `lipmaa(seq_num)`. The skip targets are chosen so
//! that repeated application reaches the log root in a logarithmic number of
//! hops, following the graph structure of complete 3-ary trees with
//! `g(k) = (3^k - 1) / 2` nodes.
use std::collections::{BTreeSet, HashMap, VecDeque};

/// Returns the sequence number the given entry skip-links to.
///
/// Sequence numbers are 1-based; the first entry carries no links and
/// `lipmaa(1)` is 1 by convention.
pub fn lipmaa(seq_num: u64) -> u64 {
    if seq_num < 2 {
        return 1;
    }

    // Intermediate values exceed the target by up to 3x, keep them wide.
    let n = seq_num as u128;
    let mut m: u128 = 1;
    let mut po3: u128 = 3;

    // Find the smallest complete tree size m = g(k) with m >= n.
    while m < n {
        po3 *= 3;
        m = (po3 - 1) / 2;
    }
    po3 /= 3;

    if m != n {
        let mut x = n;
        while x != 0 {
            m = (po3 - 1) / 2;
            po3 /= 3;
            x %= m;
        }
        if m != po3 {
            po3 = m;
        }
    }

    (n - po3) as u64
}

/// Returns true when the entry at this sequence number carries a dedicated
/// lipmaa link next to its backlink.
///
/// The link is omitted from the encoding whenever it would equal the
/// backlink, and the first entry has no links at all.
pub fn is_lipmaa_required(seq_num: u64) -> bool {
    seq_num > 1 && lipmaa(seq_num) != seq_num - 1
}

/// Returns the set of sequence numbers required to keep the given entry
/// verifiable, in descending order.
///
/// The pool is the union of the shortest link path from the entry down to 1
/// and the shortest link path down to the entry from the next complete tree
/// size `g(k) >= seq_num`. Entries outside this set can be dropped without
/// breaking the certificate path of the entry itself or of any future log
/// head.
pub fn cert_pool(seq_num: u64) -> Vec<u64> {
    let seq_num = seq_num.max(1);

    let mut pool: BTreeSet<u64> = BTreeSet::new();
    pool.extend(shortest_path(checkpoint(seq_num), seq_num));
    pool.extend(shortest_path(seq_num, 1));

    pool.into_iter().rev().collect()
}

/// Smallest complete tree size `g(k)` at or above the given sequence number.
fn checkpoint(seq_num: u64) -> u64 {
    let mut po3: u128 = 3;
    while (po3 - 1) / 2 < seq_num as u128 {
        po3 *= 3;
    }
    ((po3 - 1) / 2) as u64
}

/// Breadth-first search for the shortest link path from `from` down to `to`,
/// over the edges `n -> n - 1` and `n -> lipmaa(n)`.
///
/// Returns all sequence numbers on the path, including both endpoints.
fn shortest_path(from: u64, to: u64) -> Vec<u64> {
    if from == to {
        return vec![from];
    }

    let mut parent: HashMap<u64, u64> = HashMap::new();
    let mut queue: VecDeque<u64> = VecDeque::from([from]);

    'search: while let Some(n) = queue.pop_front() {
        for next in [n - 1, lipmaa(n)] {
            // Links never point upwards; steps below `to` overshoot.
            if next < to || next >= n || parent.contains_key(&next) {
                continue;
            }
            parent.insert(next, n);
            if next == to {
                break 'search;
            }
            queue.push_back(next);
        }
    }

    let mut path = vec![to];
    let mut n = to;
    while let Some(&previous) = parent.get(&n) {
        path.push(previous);
        n = previous;
    }

    path
}
