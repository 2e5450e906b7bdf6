use serde::{Deserialize, Serialize};

use crate::error::IdentityError;

/// Default number of revocation slots per issuer.
pub const DEFAULT_REVOCATION_CAPACITY: u32 = 131_072;

/// Per-issuer revocation bitmap.
///
/// Indexes are handed out in increasing order and never reused. The bitmap
/// only grows to cover allocated slots, so a fresh registry serializes to a
/// few bytes regardless of capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevocationRegistry {
    capacity: u32,
    next_index: u32,
    #[serde(with = "bitmap_base64")]
    bitmap: Vec<u8>,
}

impl RevocationRegistry {
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity,
            next_index: 0,
            bitmap: Vec::new(),
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// The index the next allocation will return; also the allocated count.
    pub fn next_index(&self) -> u32 {
        self.next_index
    }

    /// Reserve a fresh slot.
    pub fn allocate(&mut self) -> Result<u32, IdentityError> {
        if self.next_index >= self.capacity {
            return Err(IdentityError::RevocationCapacityExhausted {
                capacity: self.capacity,
            });
        }
        let index = self.next_index;
        self.next_index += 1;
        let needed = (self.next_index as usize).div_ceil(8);
        if self.bitmap.len() < needed {
            self.bitmap.resize(needed, 0);
        }
        Ok(index)
    }

    /// Set the bit at `index`. Returns `false` if it was already set.
    pub fn set(&mut self, index: u32) -> Result<bool, IdentityError> {
        let (byte, mask) = self.locate(index)?;
        let was_set = self.bitmap[byte] & mask != 0;
        self.bitmap[byte] |= mask;
        Ok(!was_set)
    }

    /// Clear the bit at `index`. Returns `false` if it was already clear.
    pub fn clear(&mut self, index: u32) -> Result<bool, IdentityError> {
        let (byte, mask) = self.locate(index)?;
        let was_set = self.bitmap[byte] & mask != 0;
        self.bitmap[byte] &= !mask;
        Ok(was_set)
    }

    /// Unallocated indexes read as not revoked.
    pub fn is_set(&self, index: u32) -> bool {
        self.locate(index)
            .map(|(byte, mask)| self.bitmap[byte] & mask != 0)
            .unwrap_or(false)
    }

    /// Number of set bits.
    pub fn revoked_count(&self) -> u32 {
        self.bitmap.iter().map(|b| b.count_ones()).sum()
    }

    fn locate(&self, index: u32) -> Result<(usize, u8), IdentityError> {
        let byte = (index / 8) as usize;
        if index >= self.next_index || byte >= self.bitmap.len() {
            return Err(IdentityError::RevocationIndexOutOfRange {
                index,
                next_index: self.next_index,
            });
        }
        Ok((byte, 1u8 << (index % 8)))
    }
}

impl Default for RevocationRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_REVOCATION_CAPACITY)
    }
}

mod bitmap_base64 {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bitmap: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bitmap))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}
