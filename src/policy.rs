//! Capacity and growth policy.
//!
//! Bucket counts are always powers of two so that a bucket index is a single
//! mask of the hash. Requested sizes are first snapped to the next entry of a
//! curated prime table and only then rounded up to a power of two, so unlucky
//! caller-supplied reservations land on well-spread sizes.

/// Probe window used by the smallest tables.
pub const MIN_PROBE_WINDOW: usize = 4;

/// Capacity requested by [`HashMap::new`](crate::HashMap::new).
pub const DEFAULT_CAPACITY: usize = 16;

/// Capacity requested when a caller asks for zero.
pub(crate) const ZERO_CAPACITY_REQUEST: usize = 4;

// Generated by starting at p = 2 and repeatedly taking NextPrime(2 * p) until
// 64 bits overflow, then filling every gap with ClosestPrime(p * 2^(1/3)) and
// ClosestPrime(p * 2^(2/3)), and finally appending PrevPrime(2^64).
const PRIMES: [u64; 186] = [
    2, 3, 5, 7, 11, 13, 17, 23, 29, 37, 47, 59, 73, 97, 127, 151, 197, 251, 313, 397, 499, 631,
    797, 1009, 1259, 1597, 2011, 2539, 3203, 4027, 5087, 6421, 8089, 10193, 12853, 16193,
    20399, 25717, 32401, 40823, 51437, 64811, 81649, 102877, 129607, 163307, 205759, 259229,
    326617, 411527, 518509, 653267, 823117, 1037059, 1306601, 1646237, 2074129, 2613229,
    3292489, 4148279, 5226491, 6584983, 8296553, 10453007, 13169977, 16593127, 20906033,
    26339969, 33186281, 41812097, 52679969, 66372617, 83624237, 105359939, 132745199,
    167248483, 210719881, 265490441, 334496971, 421439783, 530980861, 668993977, 842879579,
    1061961721, 1337987929, 1685759167, 2123923447, 2675975881, 3371518343, 4247846927,
    5351951779, 6743036717, 8495693897, 10703903591, 13486073473, 16991387857, 21407807219,
    26972146961, 33982775741, 42815614441, 53944293929, 67965551447, 85631228929, 107888587883,
    135931102921, 171262457903, 215777175787, 271862205833, 342524915839, 431554351609,
    543724411781, 685049831731, 863108703229, 1087448823553, 1370099663459, 1726217406467,
    2174897647073, 2740199326961, 3452434812973, 4349795294267, 5480398654009, 6904869625999,
    8699590588571, 10960797308051, 13809739252051, 17399181177241, 21921594616111,
    27619478504183, 34798362354533, 43843189232363, 55238957008387, 69596724709081,
    87686378464759, 110477914016779, 139193449418173, 175372756929481, 220955828033581,
    278386898836457, 350745513859007, 441911656067171, 556773797672909, 701491027718027,
    883823312134381, 1113547595345903, 1402982055436147, 1767646624268779, 2227095190691797,
    2805964110872297, 3535293248537579, 4454190381383713, 5611928221744609, 7070586497075177,
    8908380762767489, 11223856443489329, 14141172994150357, 17816761525534927,
    22447712886978529, 28282345988300791, 35633523051069991, 44895425773957261,
    56564691976601587, 71267046102139967, 89790851547914507, 113129383953203213,
    142534092204280003, 179581703095829107, 226258767906406483, 285068184408560057,
    359163406191658253, 452517535812813007, 570136368817120201, 718326812383316683,
    905035071625626043, 1140272737634240411, 1436653624766633509, 1810070143251252131,
    2280545475268481167, 2873307249533267101, 3620140286502504283, 4561090950536962147,
    5746614499066534157, 7240280573005008577, 9122181901073924329, 11493228998133068689,
    14480561146010017169, 18446744073709551557,
];

/// Computes the bucket count a table should use for `requested` buckets.
///
/// Returns `None` when the resulting power of two does not fit in `usize`.
///
/// # Examples
///
/// ```rust
/// use probe_map::policy::next_size;
///
/// // 4 snaps to the prime 5, which rounds up to 8.
/// assert_eq!(next_size(4), Some(8));
/// assert_eq!(next_size(16), Some(32));
/// assert_eq!(next_size(usize::MAX), None);
/// ```
pub fn next_size(requested: usize) -> Option<usize> {
    let requested = requested as u64;
    let candidates = &PRIMES[..PRIMES.len() - 1];
    let prime = PRIMES[candidates.partition_point(|&p| p < requested)];
    usize::try_from(prime.checked_next_power_of_two()?).ok()
}

/// Maps a hash onto a bucket of a table with `capacity` buckets.
///
/// `capacity` must be a non-zero power of two.
#[inline(always)]
pub fn bucket_index(hash: u64, capacity: usize) -> usize {
    debug_assert!(capacity.is_power_of_two());
    (hash as usize) & (capacity - 1)
}

/// Maximum linear-probe distance for a table with `capacity` buckets:
/// `max(4, floor(log2(capacity)))`.
#[inline]
pub fn probe_window(capacity: usize) -> usize {
    (capacity.max(1).ilog2() as usize).max(MIN_PROBE_WINDOW)
}

/// Size requested when an insert exhausts its probe window.
///
/// Not a clean doubling, so that growth does not land back on the same
/// prime/power-of-two pair.
#[inline]
pub fn grow_request(capacity: usize) -> usize {
    capacity.saturating_mul(2).saturating_add(2)
}

/// Physical slot-array length: every bucket, the overflow slack a probe
/// starting at the last bucket may reach, and the terminal slot.
#[inline]
pub(crate) fn slot_array_len(capacity: usize, probe_window: usize) -> usize {
    capacity + probe_window + 1
}
