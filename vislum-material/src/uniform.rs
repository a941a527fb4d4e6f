use std::collections::HashMap;

use crate::enums::{Precision, UniformType};

/// A laid-out uniform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformInfo {
    pub name: String,
    /// Offset of the uniform in the buffer, in 4-byte units.
    pub offset: u32,
    /// Stride to the next array element, in 4-byte units.
    pub stride: u32,
    pub ty: UniformType,
    /// Number of array elements, 1 when the uniform is not an array.
    pub size: u32,
    pub precision: Precision,
}

impl UniformInfo {
    /// Returns the offset in bytes of element `index` of this uniform.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below the element count.
    pub fn buffer_offset(&self, index: usize) -> usize {
        assert!(
            index < self.size as usize,
            "uniform `{}` has {} element(s), index {index} is out of range",
            self.name,
            self.size,
        );
        (self.offset as usize + self.stride as usize * index) * size_of::<u32>()
    }

    #[inline]
    pub fn is_array(&self) -> bool {
        self.size > 1
    }
}

struct UniformEntry {
    name: String,
    size: u32,
    ty: UniformType,
    precision: Precision,
}

#[derive(Default)]
pub struct UniformInterfaceBlockBuilder {
    name: String,
    entries: Vec<UniformEntry>,
}

impl UniformInterfaceBlockBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a uniform with the default precision.
    pub fn add(self, name: impl Into<String>, size: u32, ty: UniformType) -> Self {
        self.add_with_precision(name, size, ty, Precision::Default)
    }

    pub fn add_with_precision(
        mut self,
        name: impl Into<String>,
        size: u32,
        ty: UniformType,
        precision: Precision,
    ) -> Self {
        self.push(name, size, ty, precision);
        self
    }

    /// Same as [`Self::add_with_precision`], for builders held in a binding.
    pub fn push(&mut self, name: impl Into<String>, size: u32, ty: UniformType, precision: Precision) {
        self.entries.push(UniformEntry {
            name: name.into(),
            size,
            ty,
            precision,
        });
    }

    pub fn build(self) -> UniformInterfaceBlock {
        UniformInterfaceBlock::new(self)
    }
}

/// A named uniform block laid out with std140 rules.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UniformInterfaceBlock {
    name: String,
    infos: Vec<UniformInfo>,
    info_map: HashMap<String, usize>,
    /// Size in bytes.
    size: usize,
}

static_assertions::assert_impl_all!(UniformInterfaceBlock: Send, Sync);

impl UniformInterfaceBlock {
    pub fn builder() -> UniformInterfaceBlockBuilder {
        UniformInterfaceBlockBuilder::default()
    }

    fn new(builder: UniformInterfaceBlockBuilder) -> Self {
        let mut infos = Vec::with_capacity(builder.entries.len());
        let mut info_map = HashMap::with_capacity(builder.entries.len());

        let mut offset = 0u32;
        for entry in builder.entries {
            let mut alignment = entry.ty.base_alignment();
            let mut stride = entry.ty.stride();
            if entry.size > 1 {
                // Arrays are aligned like a float4.
                alignment = (alignment + 3) & !3;
                stride = (stride + 3) & !3;
            }

            let padding = (alignment - (offset % alignment)) % alignment;
            offset += padding;

            info_map.insert(entry.name.clone(), infos.len());
            infos.push(UniformInfo {
                name: entry.name,
                offset,
                stride,
                ty: entry.ty,
                size: entry.size,
                precision: entry.precision,
            });

            offset += stride * entry.size;
        }

        Self {
            name: builder.name,
            infos,
            info_map,
            size: size_of::<u32>() * ((offset as usize + 3) & !3),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size in bytes needed to back this block in a uniform buffer.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// The laid-out uniforms, in declaration order.
    #[inline]
    pub fn uniform_info_list(&self) -> &[UniformInfo] {
        &self.infos
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&UniformInfo> {
        self.info_map.get(name).map(|&index| &self.infos[index])
    }
}
