#![forbid(unsafe_code)]

/// Tag stored in the outbound record for a prime: ASCII `'T'`.
pub const TAG_PRIME: i32 = b'T' as i32;

/// Tag stored in the outbound record for a composite: ASCII `'F'`.
pub const TAG_COMPOSITE: i32 = b'F' as i32;

// The verdict for one inbound number. Produced once per non-sentinel, non-idle
// input and moved from a worker (or the dispatch task on a cache hit) to the writer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ClassificationResult {
    pub number: i32,
    pub is_prime: bool,
}

impl ClassificationResult {
    #[inline]
    pub fn new(number: i32, is_prime: bool) -> Self {
        Self { number, is_prime }
    }

    #[inline]
    pub fn tag(&self) -> i32 {
        if self.is_prime { TAG_PRIME } else { TAG_COMPOSITE }
    }
}

// Outbound wire record, 8 bytes: the number followed by the tag widened to a
// full 32-bit field. Never packed, the consumer reads two native-endian i32s.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResultRecord {
    pub number: i32,
    pub tag: i32,
}

impl ResultRecord {
    /// A slot nobody has written yet (or one the writer has not reached since
    /// the file was created) reads as number 0.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.number == crate::IDLE
    }

    /// `Some(true)` for `'T'`, `Some(false)` for `'F'`, `None` for anything
    /// else, which is what a torn or never-written slot looks like.
    #[inline]
    pub fn is_prime(&self) -> Option<bool> {
        match self.tag {
            TAG_PRIME => Some(true),
            TAG_COMPOSITE => Some(false),
            _ => None,
        }
    }
}

impl From<ClassificationResult> for ResultRecord {
    fn from(r: ClassificationResult) -> Self {
        Self {
            number: r.number,
            tag: r.tag(),
        }
    }
}
