//! The fixed hash state behind the map and set facades.

use core::hash::BuildHasher;

use siphasher::sip::SipHasher13;

// SipHash reference-vector keys. The facades make no hash-flooding
// guarantees, so fixed keys are fine and keep hashing deterministic.
const KEY0: u64 = 0x0706_0504_0302_0100;
const KEY1: u64 = 0x0f0e_0d0c_0b0a_0908;

/// Builds SipHash-1-3 hashers with fixed keys.
///
/// Key types feed their `Hash` implementation through this state; there is
/// no way to substitute another hasher.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct SipState;

impl BuildHasher for SipState {
    type Hasher = SipHasher13;

    fn build_hasher(&self) -> Self::Hasher {
        SipHasher13::new_with_keys(KEY0, KEY1)
    }
}
