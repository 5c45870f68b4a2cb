//! Address-cursor arithmetic (spec §4.4 steps 5–8, "Address assignment
//! policies").

/// How an `addrmap`'s byte cursor advances between untagged children
/// (spec §4.4: "the cursor advance policy follows that mode").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressingMode {
    Compact,
    #[default]
    RegAlign,
    FullAlign,
}

impl AddressingMode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "compact" => Some(Self::Compact),
            "regalign" => Some(Self::RegAlign),
            "fullalign" => Some(Self::FullAlign),
            _ => None,
        }
    }
}

/// Round `value` up to the next multiple of `align` (a no-op if `align`
/// is 0 or 1).
pub fn align_up(value: u64, align: u64) -> u64 {
    if align <= 1 {
        return value;
    }
    value.div_ceil(align)
        .saturating_mul(align)
}

/// Smallest power of two ≥ `value` (used by `fullalign`).
pub fn next_pow2(value: u64) -> u64 {
    if value <= 1 {
        return 1;
    }
    1u64 << (64 - (value - 1).leading_zeros())
}

/// Total byte footprint of an instance occupying `element_count` copies
/// of something `element_size` bytes wide, spaced `stride` bytes apart
/// (spec §4.4 step 5: "element k's address += k · S_i").
pub fn span(element_size: u64, element_count: u64, stride: u64) -> u64 {
    if element_count == 0 {
        element_size
    } else {
        stride.saturating_mul(element_count.saturating_sub(1)).saturating_add(element_size)
    }
}

/// A running byte-address cursor inside one byte-addressed container
/// (addrmap/regfile/mem). Starts at the container's own base address.
#[derive(Debug, Clone, Copy)]
pub struct Cursor {
    pos: u64,
}

impl Cursor {
    pub fn new(base: u64) -> Self {
        Self { pos: base }
    }

    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Apply an explicit `%= A` alignment to the cursor before an
    /// instance's address is taken from it.
    pub fn align(&mut self, align: u64) {
        self.pos = align_up(self.pos, align);
    }

    /// Apply a container-level addressing mode before an untagged
    /// (non-`@`) instance's address is taken from the cursor.
    pub fn apply_mode(&mut self, mode: AddressingMode, element_size: u64, container_span_hint: u64) {
        match mode {
            AddressingMode::Compact => {}
            AddressingMode::RegAlign => {
                if element_size > 0 {
                    self.pos = align_up(self.pos, element_size);
                }
            }
            AddressingMode::FullAlign => {
                let target = next_pow2(container_span_hint.max(element_size).max(1));
                self.pos = align_up(self.pos, target);
            }
        }
    }

    /// Take the cursor's current position as an instance's address, then
    /// advance it past the instance's full footprint (element size times
    /// element count, since array elements are addressed contiguously by
    /// stride).
    pub fn take_and_advance(&mut self, element_size: u64, element_count: u64, stride: u64) -> u64 {
        let addr = self.pos;
        self.pos = addr.saturating_add(span(element_size, element_count, stride));
        addr
    }

    /// Move the cursor to at least `addr + span`, used after an
    /// explicitly addressed (`@`) instance so later untagged siblings
    /// don't land inside it.
    pub fn advance_past(&mut self, addr: u64, span: u64) {
        self.pos = self.pos.max(addr.saturating_add(span));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_up_rounds_to_multiple() {
        assert_eq!(align_up(5, 4), 8);
        assert_eq!(align_up(8, 4), 8);
        assert_eq!(align_up(1, 0), 1);
    }

    #[test]
    fn next_pow2_rounds_up() {
        assert_eq!(next_pow2(1), 1);
        assert_eq!(next_pow2(5), 8);
        assert_eq!(next_pow2(16), 16);
    }

    #[test]
    fn cursor_advances_by_array_span() {
        let mut cursor = Cursor::new(0x100);
        let addr = cursor.take_and_advance(4, 3, 4);
        assert_eq!(addr, 0x100);
        assert_eq!(cursor.position(), 0x10C);
    }

    #[test]
    fn cursor_regalign_aligns_to_element_size() {
        let mut cursor = Cursor::new(1);
        cursor.apply_mode(AddressingMode::RegAlign, 4, 0);
        assert_eq!(cursor.position(), 4);
    }
}
