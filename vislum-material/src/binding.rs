use std::collections::BTreeMap;

use crate::engine;
use crate::enums::{BindingPoint, MAX_SAMPLER_COUNT};
use crate::sampler::SamplerInterfaceBlock;

/// Where a sampler of a binding point lands in the global binding space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SamplerBindingInfo {
    pub binding_point: BindingPoint,
    /// Offset of the sampler in its own block.
    pub local_offset: u8,
    /// Binding slot shared by all binding points.
    pub global_offset: u8,
}

/// Reported by [`SamplerBindingMap::populate`] when the samplers do not fit.
///
/// The map is still fully populated; slots past the limit are simply invalid
/// on hardware that enforces it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("exceeded max sampler count of {limit} with {count} samplers{}", material_suffix(.material))]
pub struct SamplerOverflow {
    pub material: Option<String>,
    pub limit: usize,
    pub count: usize,
    /// Every sampler with the slot it was given, in assignment order.
    pub samplers: Vec<(u8, String)>,
}

fn material_suffix(material: &Option<String>) -> String {
    match material {
        Some(material) => format!(" ({material})"),
        None => String::new(),
    }
}

/// Assigns every sampler of every binding point a unique global slot.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SamplerBindingMap {
    block_offsets: [u8; BindingPoint::COUNT],
    bindings: BTreeMap<(BindingPoint, u8), SamplerBindingInfo>,
}

static_assertions::assert_impl_all!(SamplerBindingMap: Send, Sync);

impl SamplerBindingMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves the sampler block of `binding_point`.
    ///
    /// The per material block and the post process block never coexist, so the
    /// post process block is left out whenever a material block is given.
    fn resolve<'a>(
        binding_point: BindingPoint,
        per_material: Option<&'a SamplerInterfaceBlock>,
    ) -> Option<&'a SamplerInterfaceBlock> {
        match binding_point {
            BindingPoint::PerMaterialInstance => per_material,
            BindingPoint::PostProcess if per_material.is_some() => None,
            _ => engine::sampler_block_for(binding_point),
        }
    }

    /// Walks the binding points in order and hands out sequential global slots.
    ///
    /// Going past [`MAX_SAMPLER_COUNT`] does not stop the walk. The overflow is
    /// logged with every sampler and its slot, then returned.
    pub fn populate(
        &mut self,
        per_material: Option<&SamplerInterfaceBlock>,
        material_name: Option<&str>,
    ) -> Option<SamplerOverflow> {
        self.bindings.clear();

        let mut offset: usize = 0;
        let mut overflow = false;
        for binding_point in BindingPoint::ALL {
            self.block_offsets[binding_point.index()] = offset as u8;

            let Some(sib) = Self::resolve(binding_point, per_material) else {
                continue;
            };

            for info in sib.sampler_info_list() {
                if offset > MAX_SAMPLER_COUNT - 1 {
                    overflow = true;
                }
                self.add_sampler(SamplerBindingInfo {
                    binding_point,
                    local_offset: info.offset,
                    global_offset: offset as u8,
                });
                offset += 1;
            }
        }

        if !overflow {
            return None;
        }

        let samplers = Self::list_samplers(per_material);
        match material_name {
            Some(name) => log::warn!("Exceeded max sampler count of {MAX_SAMPLER_COUNT} ({name})"),
            None => log::warn!("Exceeded max sampler count of {MAX_SAMPLER_COUNT}"),
        }
        for (slot, name) in &samplers {
            log::warn!("  {slot} {name}");
        }

        Some(SamplerOverflow {
            material: material_name.map(str::to_owned),
            limit: MAX_SAMPLER_COUNT,
            count: offset,
            samplers,
        })
    }

    /// Lists every sampler with its slot, without touching the map.
    ///
    /// Groups resolve as in [`Self::populate`], so `colorBuffer` and `depthBuffer`
    /// are not listed next to a material block. A listing that walks every
    /// engine block unconditionally would show them with slots no sampler holds.
    fn list_samplers(per_material: Option<&SamplerInterfaceBlock>) -> Vec<(u8, String)> {
        BindingPoint::ALL
            .into_iter()
            .filter_map(|binding_point| Self::resolve(binding_point, per_material))
            .flat_map(|sib| sib.sampler_info_list())
            .enumerate()
            .map(|(slot, info)| (slot as u8, info.name.clone()))
            .collect()
    }

    fn add_sampler(&mut self, info: SamplerBindingInfo) {
        // Slots only grow during a walk, so a block never starts after one of its samplers.
        debug_assert!(info.global_offset >= self.block_offsets[info.binding_point.index()]);
        self.bindings.insert((info.binding_point, info.local_offset), info);
    }

    /// First global slot of `binding_point`.
    #[inline]
    pub fn block_offset(&self, binding_point: BindingPoint) -> u8 {
        self.block_offsets[binding_point.index()]
    }

    pub fn get(&self, binding_point: BindingPoint, local_offset: u8) -> Option<&SamplerBindingInfo> {
        self.bindings.get(&(binding_point, local_offset))
    }

    /// The bindings in global slot order.
    pub fn iter(&self) -> impl Iterator<Item = &SamplerBindingInfo> {
        self.bindings.values()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
