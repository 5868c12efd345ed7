//! User-string heap for `ldstr` literals.
//!
//! Literals are stored the way the `#US` metadata heap stores them: a
//! compressed byte length, UTF-16LE code units, and one trailing flag byte.
//! Offset 0 is reserved for the empty entry, so a token never has a zero RID.

use indexmap::IndexMap;

/// Offset of a literal inside a [`StringHeap`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct StringToken(u32);

impl StringToken {
    /// Table tag of user-string tokens.
    pub const TABLE: u32 = 0x70;

    #[inline]
    pub fn offset(self) -> u32 {
        self.0
    }

    /// Metadata token (`0x70xxxxxx`).
    #[inline]
    pub fn token(self) -> u32 {
        (Self::TABLE << 24) | self.0
    }
}

/// Deduplicating literal heap. Literals keep insertion order.
#[derive(Debug, Clone)]
pub struct StringHeap {
    offsets: IndexMap<String, StringToken>,
    blob: Vec<u8>,
}

impl Default for StringHeap {
    fn default() -> Self {
        Self::new()
    }
}

impl StringHeap {
    pub fn new() -> Self {
        Self {
            offsets: IndexMap::new(),
            blob: vec![0],
        }
    }

    /// Intern a literal, returning its token. Repeated literals share one entry.
    pub fn intern(&mut self, s: &str) -> StringToken {
        if let Some(&token) = self.offsets.get(s) {
            return token;
        }

        let token = StringToken(self.blob.len() as u32);
        let units: Vec<u16> = s.encode_utf16().collect();
        write_compressed_len(&mut self.blob, units.len() as u32 * 2 + 1);
        for unit in &units {
            self.blob.extend_from_slice(&unit.to_le_bytes());
        }
        self.blob.push(u8::from(units.iter().any(|&u| needs_special_handling(u))));

        self.offsets.insert(s.to_owned(), token);
        token
    }

    /// Look up a literal without interning it.
    pub fn get(&self, s: &str) -> Option<StringToken> {
        self.offsets.get(s).copied()
    }

    /// Number of distinct literals.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Literals with their tokens, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, StringToken)> {
        self.offsets.iter().map(|(s, &t)| (s.as_str(), t))
    }

    /// Raw heap bytes, including the reserved leading entry.
    pub fn as_bytes(&self) -> &[u8] {
        &self.blob
    }
}

/// ECMA-335 II.23.2 compressed unsigned integer.
fn write_compressed_len(out: &mut Vec<u8>, len: u32) {
    if len < 0x80 {
        out.push(len as u8);
    } else if len < 0x4000 {
        out.extend_from_slice(&(0x8000 | len as u16).to_be_bytes());
    } else {
        out.extend_from_slice(&(0xC000_0000 | len).to_be_bytes());
    }
}

/// ECMA-335 II.24.2.4 trailing byte. Set for any non-ASCII unit, as the CLR
/// writer does, and for the reserved low ranges.
fn needs_special_handling(unit: u16) -> bool {
    let [lo, hi] = unit.to_le_bytes();
    hi != 0 || lo >= 0x7F || matches!(lo, 0x01..=0x08 | 0x0E..=0x1F | 0x27 | 0x2D)
}
