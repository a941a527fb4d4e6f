bitflags::bitflags! {
    /// Selects which optional code paths are compiled into one shader permutation.
    ///
    /// Bits outside the named flags are retained but ignored.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Variant: u8 {
        const DIRECTIONAL_LIGHTING = 1 << 0;
        const DYNAMIC_LIGHTING = 1 << 1;
        const SHADOW_RECEIVER = 1 << 2;
        const SKINNING = 1 << 3;
        /// Depth-only pass; the color pass never requests this variant.
        const DEPTH = 1 << 4;
    }
}

impl Variant {
    /// Wraps a raw variant key.
    #[inline]
    pub fn from_key(key: u8) -> Self {
        Variant::from_bits_retain(key)
    }

    #[inline]
    pub fn key(&self) -> u8 {
        self.bits()
    }

    #[inline]
    pub fn has_directional_lighting(&self) -> bool {
        self.contains(Variant::DIRECTIONAL_LIGHTING)
    }

    #[inline]
    pub fn has_dynamic_lighting(&self) -> bool {
        self.contains(Variant::DYNAMIC_LIGHTING)
    }

    #[inline]
    pub fn has_shadow_receiver(&self) -> bool {
        self.contains(Variant::SHADOW_RECEIVER)
    }

    #[inline]
    pub fn has_skinning(&self) -> bool {
        self.contains(Variant::SKINNING)
    }

    #[inline]
    pub fn is_depth_pass(&self) -> bool {
        self.contains(Variant::DEPTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_predicates() {
        let variant = Variant::from_key(0x01 | 0x08);
        assert!(variant.has_directional_lighting());
        assert!(variant.has_skinning());
        assert!(!variant.has_dynamic_lighting());
        assert!(!variant.has_shadow_receiver());
        assert!(!variant.is_depth_pass());
    }

    #[test]
    fn test_unknown_bits_are_retained() {
        let variant = Variant::from_key(0x80 | 0x10);
        assert!(variant.is_depth_pass());
        assert_eq!(variant.key(), 0x90);
    }
}
