//! Pure helpers for splitting a 64-bit address into its tag/index/offset
//! fields, given a level's bit widths.
//!
//! No error conditions exist here; geometries where the offset and index
//! fields would overflow the address width are rejected at configuration time.

/// Splits an address into `(tag, index)` for a level with the given field
/// widths. The offset bits are dropped; the tag is not re-aligned.
pub fn decode(address: u64, offset_bits: u32, index_bits: u32) -> (u64, u64) {
    let index = if index_bits == 0 {
        0
    } else {
        (address >> offset_bits) & ((1u64 << index_bits) - 1)
    };
    let tag_shift = offset_bits + index_bits;
    let tag = if tag_shift >= u64::BITS {
        0
    } else {
        address >> tag_shift
    };
    (tag, index)
}

/// The block-offset part of an address, i.e. the low `offset_bits` bits.
pub fn offset(address: u64, offset_bits: u32) -> u64 {
    if offset_bits == 0 {
        0
    } else {
        address & ((1u64 << offset_bits) - 1)
    }
}

/// Bits needed to index `count` items: the integer log of `count`, or 0 for
/// counts of at most one. Non-power-of-two counts round down, so derived
/// indices always stay in range.
pub fn field_width(count: u64) -> u32 {
    if count <= 1 {
        0
    } else {
        count.ilog2()
    }
}
