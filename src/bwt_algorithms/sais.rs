// SA-IS (induced sorting) suffix array construction with a virtual sentinel,
// plus the rotation helpers that let a suffix array stand in for rotation order.
use crate::error::{try_alloc, try_grow, try_with_capacity, Result};
use log::trace;

/// Marks an S-type element in the ls bit vec (L-type elements are the unset bits).
const S: u32 = 1;
/// Marks an LMS-type element in the lms bit vec.
const LMS: u32 = 1;
/// Empty slot in the suffix array under construction.
const EMPTY: u32 = u32::MAX;

/// Alphabet element of a string being suffix sorted. The top level sorts bytes,
/// recursion levels sort u32 names.
pub(crate) trait Symbol: Copy + Ord {
    fn index(self) -> usize;
}

impl Symbol for u8 {
    #[inline(always)]
    fn index(self) -> usize {
        self as usize
    }
}

impl Symbol for u32 {
    #[inline(always)]
    fn index(self) -> usize {
        self as usize
    }
}

#[allow(clippy::upper_case_acronyms)]
/// LMS struct holds bit-packed L, S, and LMS flags, plus the LMS count.
struct LMS {
    /// Bit oriented vec of LMS type element indecies
    lms: Vec<u32>,
    /// Bit oriented vec of L and S type element indecies
    ls: Vec<u32>,
    /// Length of the data. The virtual sentinel sits here.
    last: usize,
    /// Count of LMS type elements
    lms_count: usize,
}

impl LMS {
    fn new() -> Self {
        Self {
            ls: Vec::new(),
            lms: Vec::new(),
            last: 0_usize,
            lms_count: 0_usize,
        }
    }

    /// Classify every element of the data. Bit idx>>5, idx%32 holds element idx.
    fn init<T: Symbol>(&mut self, data: &[T]) -> Result<()> {
        /*
        The sentinel is never stored. It is smaller than every element, so the last real
        element is always L-type, and the element after the last one is treated as the
        end of every LMS substring that reaches it.
        */
        self.last = data.len();
        self.ls = try_alloc(data.len() / 32 + 1)?;
        self.lms = try_alloc(data.len() / 32 + 1)?;

        // Walk right to left. `current_s` is the type of the element to the right.
        let mut current_s = false;
        for idx in (0..data.len().saturating_sub(1)).rev() {
            match data[idx].cmp(&data[idx + 1]) {
                std::cmp::Ordering::Less => {
                    self.ls[idx >> 5] |= S << (idx % 32);
                    current_s = true;
                }
                // Equal elements inherit the type of their right neighbour
                std::cmp::Ordering::Equal => {
                    if current_s {
                        self.ls[idx >> 5] |= S << (idx % 32);
                    }
                }
                // An L followed by an S makes the S an LMS element
                std::cmp::Ordering::Greater => {
                    if current_s {
                        self.lms[(idx + 1) >> 5] |= LMS << ((idx + 1) % 32);
                    }
                    current_s = false;
                }
            }
        }
        self.lms_count = self.lms.iter().map(|el| el.count_ones()).sum::<u32>() as usize;
        Ok(())
    }

    /// Checks if element at index is set (is an LMS element)
    #[inline(always)]
    fn is_lms(&self, idx: usize) -> bool {
        idx < self.last && self.lms[idx >> 5] & (LMS << (idx % 32)) > 0
    }

    /// data element at idx is not set (is an L)
    #[inline(always)]
    fn is_l(&self, idx: usize) -> bool {
        self.ls[idx >> 5] & (S << (idx % 32)) == 0
    }

    /// data element at idx is set (is an S)
    #[inline(always)]
    fn is_s(&self, idx: usize) -> bool {
        !self.is_l(idx)
    }

    /// Test if the LMS substrings starting at a and b are identical (same bytes, same types,
    /// same length). A substring that runs into the sentinel is unique.
    fn equal_lms<T: Symbol>(&self, data: &[T], a: usize, b: usize) -> bool {
        if a == b {
            return true;
        }
        let mut d = 0;
        loop {
            let (x, y) = (a + d, b + d);
            if x == self.last || y == self.last {
                return false;
            }
            if data[x] != data[y] || self.is_s(x) != self.is_s(y) {
                return false;
            }
            if d > 0 && (self.is_lms(x) || self.is_lms(y)) {
                return self.is_lms(x) && self.is_lms(y);
            }
            d += 1;
        }
    }
}

//--- Done with LMS struct ------------------------------------------------------------------------------------

//-- Counts for Bucket Sorting --------------------------------------------------------------------------------
/// Return frequency count of elements in the input vec. Size is the alphabet size.
fn bucket_sizes<T: Symbol>(data: &[T], size: usize) -> Result<Vec<u32>> {
    let mut freqs: Vec<u32> = try_alloc(size)?;
    data.iter().for_each(|&el| freqs[el.index()] += 1);
    Ok(freqs)
}

/// Returns index to the first slot of each bucket.
fn bucket_heads(buckets: &[u32]) -> Result<Vec<u32>> {
    let mut heads = try_with_capacity(buckets.len())?;
    heads.extend(buckets.iter().scan(0_u32, |idx, &count| {
        let head = *idx;
        *idx += count;
        Some(head)
    }));
    Ok(heads)
}

/// Returns index one past the last slot of each bucket.
fn bucket_tails(buckets: &[u32]) -> Result<Vec<u32>> {
    let mut tails = try_with_capacity(buckets.len())?;
    tails.extend(buckets.iter().scan(0_u32, |idx, &count| {
        *idx += count;
        Some(*idx)
    }));
    Ok(tails)
}

#[cfg(test)]
mod test_bucket_prep {
    use super::*;
    #[test]
    pub fn freq_count_test() {
        let data = [2_u32, 0, 1, 1, 0, 6, 4];
        let frq = bucket_sizes(&data, 7).unwrap();
        assert_eq!(frq, vec![2, 2, 1, 0, 1, 0, 1]);
    }
    #[test]
    pub fn freq_head_test() {
        let data = [2_u32, 0, 1, 1, 0, 6, 4];
        let freq = bucket_sizes(&data, 7).unwrap();
        let heads = bucket_heads(&freq).unwrap();
        assert_eq!(heads, vec![0, 2, 4, 5, 5, 6, 6]);
    }
    #[test]
    pub fn freq_tail_test() {
        let data = [2_u32, 0, 1, 1, 0, 6, 4];
        let freq = bucket_sizes(&data, 7).unwrap();
        let tails = bucket_tails(&freq).unwrap();
        assert_eq!(tails, vec![2, 4, 5, 5, 6, 6, 7]);
    }
}
//-- End Frequency Counts for Bucket Sorting -------------------------------------------------------------------

//-- Bucket Sorting --------------------------------------------------------------------------------------------
/// Induce L type elements from the elements already placed, scanning left to right.
fn induced_sort_l<T: Symbol>(data: &[T], sa: &mut [u32], bkt_sizes: &[u32], lms: &LMS) -> Result<()> {
    let mut heads = bucket_heads(bkt_sizes)?;

    // The sentinel sorts first and its predecessor, the last element, is always L type.
    let last = data.len() - 1;
    let c = data[last].index();
    sa[heads[c] as usize] = last as u32;
    heads[c] += 1;

    for idx in 0..sa.len() {
        let el = sa[idx];
        if el == EMPTY || el == 0 {
            continue;
        }
        let prev = el as usize - 1;
        if lms.is_l(prev) {
            let c = data[prev].index();
            sa[heads[c] as usize] = prev as u32;
            heads[c] += 1;
        }
    }
    Ok(())
}

/// Induce S type elements from the sorted L elements, scanning right to left.
fn induced_sort_s<T: Symbol>(data: &[T], sa: &mut [u32], bkt_sizes: &[u32], lms: &LMS) -> Result<()> {
    let mut tails = bucket_tails(bkt_sizes)?;

    for idx in (0..sa.len()).rev() {
        let el = sa[idx];
        if el == EMPTY || el == 0 {
            continue;
        }
        let prev = el as usize - 1;
        if lms.is_s(prev) {
            let c = data[prev].index();
            tails[c] -= 1;
            sa[tails[c] as usize] = prev as u32;
        }
    }
    Ok(())
}

/// Suffix array of `data` over an alphabet of `alphabet_size` symbols, comparing as if a unique
/// smallest sentinel followed the last element. Shorter suffixes sort before their extensions.
pub(crate) fn sa_is<T: Symbol>(data: &[T], alphabet_size: usize) -> Result<Vec<u32>> {
    let mut sa = Vec::new();
    sa_is_into(data, alphabet_size, &mut sa)?;
    Ok(sa)
}

/// As `sa_is`, building the suffix array in `sa`. The buffer keeps its allocation when it is
/// already large enough.
pub(crate) fn sa_is_into<T: Symbol>(data: &[T], alphabet_size: usize, sa: &mut Vec<u32>) -> Result<()> {
    let n = data.len();
    try_grow(sa, n)?;
    // Don't attemp to process empty data.
    if n == 0 {
        return Ok(());
    }

    // STEP 1: Build LMS info
    let mut lms = LMS::new();
    lms.init(data)?;

    // STEP 2: Calculate buckets for bucket sorting
    let bkt_sizes = bucket_sizes(data, alphabet_size)?;

    // STEP 3: Drop LMS elements at the tails of their buckets, in any order
    sa.resize(n, EMPTY);
    {
        let mut tails = bucket_tails(&bkt_sizes)?;
        for idx in 1..n {
            if lms.is_lms(idx) {
                let c = data[idx].index();
                tails[c] -= 1;
                sa[tails[c] as usize] = idx as u32;
            }
        }
    }

    // STEP 4 and 5: Induce L then S. This sorts the LMS substrings (not yet the suffixes).
    induced_sort_l(data, sa, &bkt_sizes, &lms)?;
    induced_sort_s(data, sa, &bkt_sizes, &lms)?;

    // STEP 6: Name the LMS substrings in sorted order and build the reduced string
    let mut sorted_lms: Vec<u32> = try_with_capacity(lms.lms_count)?;
    sorted_lms.extend(sa.iter().copied().filter(|&el| lms.is_lms(el as usize)));
    let (summary, offsets, name_count) = make_summary(data, &sorted_lms, &lms)?;
    drop(sorted_lms);
    trace!(
        "SA-IS level: {} elements, {} LMS, {} unique names",
        n,
        lms.lms_count,
        name_count
    );

    // STEP 7: Sort the reduced string, recursing only while names repeat
    let summary_order = make_summary_suffix_vec(&summary, name_count)?;

    // STEP 8: Place the LMS suffixes in final order, back to front in each bucket
    sa.iter_mut().for_each(|el| *el = EMPTY);
    {
        let mut tails = bucket_tails(&bkt_sizes)?;
        for &rank in summary_order.iter().rev() {
            let data_index = offsets[rank as usize] as usize;
            let c = data[data_index].index();
            tails[c] -= 1;
            sa[tails[c] as usize] = data_index as u32;
        }
    }

    // STEP 9 and 10: Final induced sorts
    induced_sort_l(data, sa, &bkt_sizes, &lms)?;
    induced_sort_s(data, sa, &bkt_sizes, &lms)
}

/// Name each LMS substring by its rank among distinct LMS substrings. Returns the reduced
/// string (names in text order), the data offset of each reduced element, and the name count.
fn make_summary<T: Symbol>(
    data: &[T],
    sorted_lms: &[u32],
    lms: &LMS,
) -> Result<(Vec<u32>, Vec<u32>, usize)> {
    // LMS elements are at least two apart, so idx/2 is a collision-free slot.
    // Only slots of LMS elements are read back, and all of those get a name.
    let mut names: Vec<u32> = try_alloc(data.len() / 2 + 1)?;
    let mut current_name = 0_u32;
    let mut prev: Option<usize> = None;
    for &el in sorted_lms {
        let curr = el as usize;
        if let Some(p) = prev {
            if !lms.equal_lms(data, p, curr) {
                current_name += 1;
            }
        }
        names[curr / 2] = current_name;
        prev = Some(curr);
    }

    let mut summary = try_with_capacity(lms.lms_count)?;
    let mut offsets = try_with_capacity(lms.lms_count)?;
    for idx in 1..data.len() {
        if lms.is_lms(idx) {
            summary.push(names[idx / 2]);
            offsets.push(idx as u32);
        }
    }
    let name_count = if sorted_lms.is_empty() {
        0
    } else {
        current_name as usize + 1
    };
    Ok((summary, offsets, name_count))
}

/// Order of the reduced string's suffixes. Unique names give it directly, repeats need recursion.
fn make_summary_suffix_vec(summary: &[u32], name_count: usize) -> Result<Vec<u32>> {
    if name_count < summary.len() {
        sa_is(summary, name_count)
    } else {
        let mut order: Vec<u32> = try_alloc(summary.len())?;
        summary
            .iter()
            .enumerate()
            .for_each(|(idx, &name)| order[name as usize] = idx as u32);
        Ok(order)
    }
}

//-- Rotation helpers ------------------------------------------------------------------------------------------
/// Start of the lexicographically least rotation (Duval's algorithm over the doubled string).
pub(crate) fn least_rotation(input: &[u8]) -> usize {
    let n = input.len();
    if n < 2 {
        return 0;
    }
    let at = |i: usize| input[if i < n { i } else { i - n }];
    let mut start = 0;
    let mut i = 0;
    while i < n {
        start = i;
        let mut j = i + 1;
        let mut k = i;
        while j < 2 * n && at(k) <= at(j) {
            if at(k) < at(j) {
                k = i;
            } else {
                k += 1;
            }
            j += 1;
        }
        while i <= k {
            i += j - k;
        }
    }
    start
}

/// Length of the shortest w with input == w^k. Returns input.len() for primitive strings.
pub(crate) fn primitive_period(input: &[u8]) -> Result<usize> {
    let n = input.len();
    if n < 2 {
        return Ok(n);
    }
    // KMP failure function: border[i] is the longest proper border of input[..=i]
    let mut border: Vec<u32> = try_alloc(n)?;
    let mut k = 0_usize;
    for i in 1..n {
        while k > 0 && input[i] != input[k] {
            k = border[k - 1] as usize;
        }
        if input[i] == input[k] {
            k += 1;
        }
        border[i] = k as u32;
    }
    let period = n - border[n - 1] as usize;
    Ok(if n % period == 0 { period } else { n })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_suffix_array(data: &[u8]) -> Vec<u32> {
        let mut sa = (0..data.len() as u32).collect::<Vec<u32>>();
        sa.sort_by(|&a, &b| data[a as usize..].cmp(&data[b as usize..]));
        sa
    }

    fn naive_least_rotation(data: &[u8]) -> usize {
        let n = data.len();
        (0..n)
            .min_by(|&a, &b| {
                let ra = data[a..].iter().chain(data[..a].iter());
                let rb = data[b..].iter().chain(data[..b].iter());
                ra.cmp(rb).then(a.cmp(&b))
            })
            .unwrap_or(0)
    }

    #[test]
    fn sa_is_banana_test() {
        assert_eq!(sa_is("banana".as_bytes(), 256).unwrap(), vec![5, 3, 1, 0, 4, 2]);
    }

    #[test]
    fn sa_is_single_test() {
        assert_eq!(sa_is("x".as_bytes(), 256).unwrap(), vec![0]);
        assert!(sa_is::<u8>(&[], 256).unwrap().is_empty());
    }

    #[test]
    fn sa_is_run_test() {
        assert_eq!(sa_is("aaaaa".as_bytes(), 256).unwrap(), vec![4, 3, 2, 1, 0]);
    }

    #[test]
    fn sa_is_recursion_test() {
        // Repeated LMS substrings force at least one recursion level
        let data = "mmiissiissiippii".as_bytes();
        assert_eq!(sa_is(data, 256).unwrap(), naive_suffix_array(data));
        let data = "abaabaaabaababaaabaaababaab".as_bytes();
        assert_eq!(sa_is(data, 256).unwrap(), naive_suffix_array(data));
    }

    #[test]
    fn sa_is_against_naive_test() {
        let mut seed = 12345_u32;
        for len in 1..200 {
            let data: Vec<u8> = (0..len)
                .map(|_| {
                    seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
                    b'a' + ((seed >> 16) % 3) as u8
                })
                .collect();
            assert_eq!(sa_is(&data, 256).unwrap(), naive_suffix_array(&data), "len {}", len);
        }
    }

    #[test]
    fn sa_is_into_reuse_test() {
        let mut sa = Vec::new();
        sa_is_into("mississippi".as_bytes(), 256, &mut sa).unwrap();
        let ptr = sa.as_ptr();
        sa_is_into("banana".as_bytes(), 256, &mut sa).unwrap();
        assert_eq!(sa, vec![5, 3, 1, 0, 4, 2]);
        assert_eq!(sa.as_ptr(), ptr);
    }

    #[test]
    fn sa_is_allocation_failure_test() {
        // the bucket table for this alphabet cannot be allocated
        assert!(matches!(
            sa_is::<u32>(&[1, 0], usize::MAX),
            Err(crate::error::BscError::CapacityExceeded { .. })
        ));
    }

    #[test]
    fn duval_test_a() {
        assert_eq!(least_rotation("a".as_bytes()), 0);
    }
    #[test]
    fn duval_test_ba() {
        assert_eq!(least_rotation("ba".as_bytes()), 1);
    }
    #[test]
    fn duval_test_aaaaaa() {
        assert_eq!(least_rotation("aaaaaa".as_bytes()), 0);
    }
    #[test]
    fn duval_test_aaaaba() {
        assert_eq!(least_rotation("aaaaba".as_bytes()), 5);
    }
    #[test]
    fn duval_test_aabaaa() {
        assert_eq!(least_rotation("aabaaa".as_bytes()), 3);
    }
    #[test]
    fn duval_test_abbbba() {
        assert_eq!(least_rotation("abbbba".as_bytes()), 5);
    }
    #[test]
    fn duval_test_baabaa() {
        assert_eq!(least_rotation("baabaa".as_bytes()), 1);
    }
    #[test]
    fn duval_test_banana() {
        assert_eq!(least_rotation("banana".as_bytes()), 5);
    }
    #[test]
    fn duval_against_naive_test() {
        for data in [
            "abaabaaabaababaaabaaababaab",
            "mississippi",
            "zyxwvu",
            "abcabcabd",
            "bcabca",
        ] {
            let data = data.as_bytes();
            let got = least_rotation(data);
            let want = naive_least_rotation(data);
            // Any start of an equal least rotation is acceptable
            let rot = |s: usize| [&data[s..], &data[..s]].concat();
            assert_eq!(rot(got), rot(want));
        }
    }

    #[test]
    fn period_test() {
        assert_eq!(primitive_period("abab".as_bytes()).unwrap(), 2);
        assert_eq!(primitive_period("aaaa".as_bytes()).unwrap(), 1);
        assert_eq!(primitive_period("abcab".as_bytes()).unwrap(), 5);
        assert_eq!(primitive_period("abaaba".as_bytes()).unwrap(), 3);
        assert_eq!(primitive_period("x".as_bytes()).unwrap(), 1);
    }
}
