//! Uniform and sampler blocks owned by the engine rather than by a material.
//!
//! The layouts below mirror the buffers the renderer uploads every frame. Keep
//! them in sync with the CPU side structures when editing.

use std::sync::LazyLock;

use crate::enums::{
    BindingPoint, CONFIG_MAX_BONE_COUNT, CONFIG_MAX_LIGHT_COUNT, Precision, SamplerFormat, SamplerType,
    UniformType,
};
use crate::sampler::SamplerInterfaceBlock;
use crate::uniform::UniformInterfaceBlock;

pub static PER_VIEW_UIB: LazyLock<UniformInterfaceBlock> = LazyLock::new(|| {
    use UniformType::*;

    UniformInterfaceBlock::builder()
        .name("FrameUniforms")
        // transforms
        .add_with_precision("viewFromWorldMatrix", 1, Mat4, Precision::High)
        .add_with_precision("worldFromViewMatrix", 1, Mat4, Precision::High)
        .add_with_precision("clipFromViewMatrix", 1, Mat4, Precision::High)
        .add_with_precision("viewFromClipMatrix", 1, Mat4, Precision::High)
        .add_with_precision("clipFromWorldMatrix", 1, Mat4, Precision::High)
        .add_with_precision("worldFromClipMatrix", 1, Mat4, Precision::High)
        .add_with_precision("lightFromWorldMatrix", 1, Mat4, Precision::High)
        // view
        .add_with_precision("resolution", 1, Float4, Precision::High)
        // camera
        .add_with_precision("cameraPosition", 1, Float3, Precision::High)
        .add_with_precision("time", 1, Float, Precision::High)
        // directional light
        .add("lightColorIntensity", 1, Float4)
        .add("sun", 1, Float4)
        .add("lightDirection", 1, Float3)
        .add("fParamsX", 1, Uint)
        // shadow
        .add("shadowBias", 1, Float3)
        .add("oneOverFroxelDimensionY", 1, Float)
        // froxels
        .add("zParams", 1, Float4)
        .add("fParams", 1, Uint2)
        .add("origin", 1, Float2)
        .add("oneOverFroxelDimension", 1, Float)
        // ibl
        .add("iblLuminance", 1, Float)
        // exposure
        .add("exposure", 1, Float)
        .add("ev100", 1, Float)
        .add("iblSH", 9, Float3)
        .add("userTime", 1, Float4)
        .add("iblMaxMipLevel", 1, Float2)
        .add("padding10", 1, Float2)
        // pads the block to 1 KiB
        .add("padding1", 16, Float4)
        .build()
});

pub static PER_RENDERABLE_UIB: LazyLock<UniformInterfaceBlock> = LazyLock::new(|| {
    UniformInterfaceBlock::builder()
        .name("ObjectUniforms")
        .add_with_precision("worldFromModelMatrix", 1, UniformType::Mat4, Precision::High)
        .add_with_precision("worldFromModelNormalMatrix", 1, UniformType::Mat3, Precision::High)
        .build()
});

pub static LIGHTS_UIB: LazyLock<UniformInterfaceBlock> = LazyLock::new(|| {
    UniformInterfaceBlock::builder()
        .name("LightsUniforms")
        .add_with_precision("lights", CONFIG_MAX_LIGHT_COUNT, UniformType::Mat4, Precision::High)
        .build()
});

pub static POST_PROCESS_UIB: LazyLock<UniformInterfaceBlock> = LazyLock::new(|| {
    UniformInterfaceBlock::builder()
        .name("PostProcessUniforms")
        .add("uvScale", 1, UniformType::Float2)
        .add("time", 1, UniformType::Float)
        .add("yOffset", 1, UniformType::Float)
        .add("dithering", 1, UniformType::Int)
        .build()
});

/// Four vectors per bone.
pub static PER_RENDERABLE_BONES_UIB: LazyLock<UniformInterfaceBlock> = LazyLock::new(|| {
    UniformInterfaceBlock::builder()
        .name("BonesUniforms")
        .add_with_precision("bones", CONFIG_MAX_BONE_COUNT * 4, UniformType::Float4, Precision::Medium)
        .build()
});

pub static PER_VIEW_SIB: LazyLock<SamplerInterfaceBlock> = LazyLock::new(|| {
    use SamplerFormat::*;
    use SamplerType::*;

    SamplerInterfaceBlock::builder()
        .name("Light")
        .add_with("shadowMap", Sampler2d, Shadow, Precision::Low, false)
        .add_with("records", Sampler2d, Uint, Precision::Medium, false)
        .add_with("froxels", Sampler2d, Uint, Precision::Medium, false)
        .add_with("iblDFG", Sampler2d, Float, Precision::Medium, false)
        .add_with("iblSpecular", SamplerCubemap, Float, Precision::Medium, false)
        .add_with("ssao", Sampler2d, Float, Precision::Medium, false)
        .build()
});

pub static POST_PROCESS_SIB: LazyLock<SamplerInterfaceBlock> = LazyLock::new(|| {
    SamplerInterfaceBlock::builder()
        .name("PostProcess")
        .add("colorBuffer", SamplerType::Sampler2d, SamplerFormat::Float)
        .add("depthBuffer", SamplerType::Sampler2d, SamplerFormat::Float)
        .build()
});

/// The engine uniform block bound at `binding_point`, if the engine owns one there.
pub fn uniform_block_for(binding_point: BindingPoint) -> Option<&'static UniformInterfaceBlock> {
    match binding_point {
        BindingPoint::PerView => Some(&*PER_VIEW_UIB),
        BindingPoint::PerRenderable => Some(&*PER_RENDERABLE_UIB),
        BindingPoint::Lights => Some(&*LIGHTS_UIB),
        BindingPoint::PerRenderableBones => Some(&*PER_RENDERABLE_BONES_UIB),
        BindingPoint::PostProcess => Some(&*POST_PROCESS_UIB),
        BindingPoint::PerMaterialInstance => None,
    }
}

/// The engine sampler block bound at `binding_point`, if the engine owns one there.
pub fn sampler_block_for(binding_point: BindingPoint) -> Option<&'static SamplerInterfaceBlock> {
    match binding_point {
        BindingPoint::PerView => Some(&*PER_VIEW_SIB),
        BindingPoint::PostProcess => Some(&*POST_PROCESS_SIB),
        _ => None,
    }
}
