use std::collections::HashMap;

use crate::enums::{Precision, SamplerFormat, SamplerType};

/// Bytes of the group name kept in a sampler uniform name.
const MAX_GROUP_NAME_LEN: usize = 128;

/// Bytes of the sampler name kept in a sampler uniform name.
const MAX_SAMPLER_NAME_LEN: usize = 126;

/// A registered sampler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplerInfo {
    pub name: String,
    /// Index of the sampler in its block.
    pub offset: u8,
    pub ty: SamplerType,
    pub format: SamplerFormat,
    pub precision: Precision,
    pub multisample: bool,
}

#[derive(Default)]
pub struct SamplerInterfaceBlockBuilder {
    name: String,
    entries: Vec<SamplerEntry>,
}

struct SamplerEntry {
    name: String,
    ty: SamplerType,
    format: SamplerFormat,
    precision: Precision,
    multisample: bool,
}

impl SamplerInterfaceBlockBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a single-sampled sampler with medium precision.
    pub fn add(self, name: impl Into<String>, ty: SamplerType, format: SamplerFormat) -> Self {
        self.add_with(name, ty, format, Precision::Medium, false)
    }

    pub fn add_with(
        mut self,
        name: impl Into<String>,
        ty: SamplerType,
        format: SamplerFormat,
        precision: Precision,
        multisample: bool,
    ) -> Self {
        self.push(name, ty, format, precision, multisample);
        self
    }

    pub fn push(
        &mut self,
        name: impl Into<String>,
        ty: SamplerType,
        format: SamplerFormat,
        precision: Precision,
        multisample: bool,
    ) {
        self.entries.push(SamplerEntry {
            name: name.into(),
            ty,
            format,
            precision,
            multisample,
        });
    }

    pub fn build(self) -> SamplerInterfaceBlock {
        SamplerInterfaceBlock::new(self)
    }
}

/// A named, ordered list of samplers.
///
/// Samplers have no alignment; each one's offset is its declaration index.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SamplerInterfaceBlock {
    name: String,
    infos: Vec<SamplerInfo>,
    info_map: HashMap<String, usize>,
}

static_assertions::assert_impl_all!(SamplerInterfaceBlock: Send, Sync);

impl SamplerInterfaceBlock {
    pub fn builder() -> SamplerInterfaceBlockBuilder {
        SamplerInterfaceBlockBuilder::default()
    }

    fn new(builder: SamplerInterfaceBlockBuilder) -> Self {
        let mut infos = Vec::with_capacity(builder.entries.len());
        let mut info_map = HashMap::with_capacity(builder.entries.len());

        for (index, entry) in builder.entries.into_iter().enumerate() {
            info_map.insert(entry.name.clone(), index);
            infos.push(SamplerInfo {
                name: entry.name,
                offset: index as u8,
                ty: entry.ty,
                format: entry.format,
                precision: entry.precision,
                multisample: entry.multisample,
            });
        }

        Self {
            name: builder.name,
            infos,
            info_map,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of samplers in the block.
    #[inline]
    pub fn size(&self) -> usize {
        self.infos.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    #[inline]
    pub fn sampler_info_list(&self) -> &[SamplerInfo] {
        &self.infos
    }

    pub fn get(&self, name: &str) -> Option<&SamplerInfo> {
        self.info_map.get(name).map(|&index| &self.infos[index])
    }

    /// Returns the identifier a sampler of `group` is declared with in shader text.
    ///
    /// The group name is cut to 128 bytes and its first byte lowercased when it
    /// is an ASCII capital. It is joined with `_` to the sampler name, cut to
    /// 126 bytes.
    pub fn uniform_name(group: &str, sampler: &str) -> String {
        let group = group.as_bytes();
        let sampler = sampler.as_bytes();
        let group = &group[..group.len().min(MAX_GROUP_NAME_LEN)];
        let sampler = &sampler[..sampler.len().min(MAX_SAMPLER_NAME_LEN)];

        let mut name = Vec::with_capacity(group.len() + 1 + sampler.len());
        name.extend_from_slice(group);
        if let Some(first) = name.first_mut() {
            first.make_ascii_lowercase();
        }
        name.push(b'_');
        name.extend_from_slice(sampler);

        // A cut may land inside a multi-byte character.
        String::from_utf8_lossy(&name).into_owned()
    }
}
