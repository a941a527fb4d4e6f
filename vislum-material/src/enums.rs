use serde::{Deserialize, Serialize};

/// Maximum number of samplers a single program may bind.
pub const MAX_SAMPLER_COUNT: usize = 16;

/// Maximum number of lights in the lights uniform block.
pub const CONFIG_MAX_LIGHT_COUNT: u32 = 256;

/// Maximum number of bones in the bones uniform block.
pub const CONFIG_MAX_BONE_COUNT: u32 = 256;

/// The capability class of the target GPU.
///
/// The ordering matters: anything below [`ShaderModel::Desktop`] is a mobile tier.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShaderModel {
    /// OpenGL ES 3.0 class hardware.
    #[default]
    Mobile,
    /// OpenGL 4.1 core class hardware.
    Desktop,
}

impl ShaderModel {
    #[inline]
    pub fn is_mobile(self) -> bool {
        self < ShaderModel::Desktop
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetApi {
    #[default]
    OpenGl,
    Vulkan,
    Metal,
}

/// The source dialect the generated text is meant for.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetLanguage {
    /// Plain GLSL consumed by a GL driver.
    #[default]
    Glsl,
    /// GLSL that is compiled to SPIR-V before reaching the driver.
    Spirv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ShaderType {
    #[display("vertex")]
    Vertex,
    #[display("fragment")]
    Fragment,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precision {
    Low,
    Medium,
    High,
    #[default]
    Default,
}

impl Precision {
    /// Returns the qualifier for this precision, or an empty string when it
    /// matches `default_precision`.
    pub fn qualifier(self, default_precision: Precision) -> &'static str {
        if self == default_precision {
            return "";
        }

        match self {
            Precision::Low => "lowp",
            Precision::Medium => "mediump",
            Precision::High => "highp",
            Precision::Default => "ERROR",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UniformType {
    Bool,
    Bool2,
    Bool3,
    Bool4,
    Float,
    Float2,
    Float3,
    Float4,
    Int,
    Int2,
    Int3,
    Int4,
    Uint,
    Uint2,
    Uint3,
    Uint4,
    Mat3,
    Mat4,
}

impl UniformType {
    /// Base alignment, in 4-byte units.
    pub fn base_alignment(self) -> u32 {
        use UniformType::*;

        match self {
            Bool | Float | Int | Uint => 1,
            Bool2 | Float2 | Int2 | Uint2 => 2,
            Bool3 | Bool4 | Float3 | Float4 | Int3 | Int4 | Uint3 | Uint4 | Mat3 | Mat4 => 4,
        }
    }

    /// Stride to the next element, in 4-byte units.
    pub fn stride(self) -> u32 {
        use UniformType::*;

        match self {
            Bool | Float | Int | Uint => 1,
            Bool2 | Float2 | Int2 | Uint2 => 2,
            Bool3 | Float3 | Int3 | Uint3 => 3,
            Bool4 | Float4 | Int4 | Uint4 => 4,
            Mat3 => 12,
            Mat4 => 16,
        }
    }

    /// Whether a precision qualifier may be attached to this type.
    pub fn has_precision(self) -> bool {
        !matches!(
            self,
            UniformType::Bool | UniformType::Bool2 | UniformType::Bool3 | UniformType::Bool4
        )
    }

    pub fn type_name(self) -> &'static str {
        use UniformType::*;

        match self {
            Bool => "bool",
            Bool2 => "bvec2",
            Bool3 => "bvec3",
            Bool4 => "bvec4",
            Float => "float",
            Float2 => "vec2",
            Float3 => "vec3",
            Float4 => "vec4",
            Int => "int",
            Int2 => "ivec2",
            Int3 => "ivec3",
            Int4 => "ivec4",
            Uint => "uint",
            Uint2 => "uvec2",
            Uint3 => "uvec3",
            Uint4 => "uvec4",
            Mat3 => "mat3",
            Mat4 => "mat4",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplerType {
    Sampler2d,
    SamplerCubemap,
    SamplerExternal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplerFormat {
    Int,
    Uint,
    Float,
    Shadow,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendingMode {
    #[default]
    Opaque,
    Transparent,
    Add,
    Masked,
    /// Transparent, but the lighting fades out with the alpha too.
    Fade,
    Multiply,
    Screen,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shading {
    Unlit,
    #[default]
    Lit,
    Subsurface,
    Cloth,
    SpecularGlossiness,
}

impl Shading {
    pub fn define_name(self) -> &'static str {
        match self {
            Shading::Unlit => "SHADING_MODEL_UNLIT",
            Shading::Lit => "SHADING_MODEL_LIT",
            Shading::Subsurface => "SHADING_MODEL_SUBSURFACE",
            Shading::Cloth => "SHADING_MODEL_CLOTH",
            Shading::SpecularGlossiness => "SHADING_MODEL_SPECULAR_GLOSSINESS",
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    #[default]
    Smooth,
    Flat,
}

impl Interpolation {
    pub fn qualifier(self) -> &'static str {
        match self {
            Interpolation::Smooth => "",
            Interpolation::Flat => "flat ",
        }
    }
}

/// The space the vertex positions are expressed in.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VertexDomain {
    #[default]
    Object,
    World,
    View,
    Device,
}

impl VertexDomain {
    pub fn define_name(self) -> &'static str {
        match self {
            VertexDomain::Object => "VERTEX_DOMAIN_OBJECT",
            VertexDomain::World => "VERTEX_DOMAIN_WORLD",
            VertexDomain::View => "VERTEX_DOMAIN_VIEW",
            VertexDomain::Device => "VERTEX_DOMAIN_DEVICE",
        }
    }
}

/// A vertex attribute. The discriminant is the attribute's shader location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u32)]
pub enum VertexAttribute {
    Position = 0,
    Tangents = 1,
    Color = 2,
    Uv0 = 3,
    Uv1 = 4,
    BoneIndices = 5,
    BoneWeights = 6,
}

impl VertexAttribute {
    #[inline]
    pub fn location(self) -> u32 {
        self as u32
    }
}

bitflags::bitflags! {
    /// A set of vertex attributes, one bit per [`VertexAttribute`] location.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct AttributeSet: u32 {
        const POSITION = 1 << VertexAttribute::Position as u32;
        const TANGENTS = 1 << VertexAttribute::Tangents as u32;
        const COLOR = 1 << VertexAttribute::Color as u32;
        const UV0 = 1 << VertexAttribute::Uv0 as u32;
        const UV1 = 1 << VertexAttribute::Uv1 as u32;
        const BONE_INDICES = 1 << VertexAttribute::BoneIndices as u32;
        const BONE_WEIGHTS = 1 << VertexAttribute::BoneWeights as u32;
    }
}

impl AttributeSet {
    #[inline]
    pub fn has(&self, attribute: VertexAttribute) -> bool {
        self.contains(AttributeSet::from(attribute))
    }
}

impl From<VertexAttribute> for AttributeSet {
    fn from(attribute: VertexAttribute) -> Self {
        AttributeSet::from_bits_retain(1 << attribute.location())
    }
}

/// The named groups sharing the global binding namespace, in allocation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum BindingPoint {
    PerView = 0,
    PerRenderable = 1,
    Lights = 2,
    PerRenderableBones = 3,
    PerMaterialInstance = 4,
    PostProcess = 5,
}

impl BindingPoint {
    pub const COUNT: usize = 6;

    pub const ALL: [BindingPoint; BindingPoint::COUNT] = [
        BindingPoint::PerView,
        BindingPoint::PerRenderable,
        BindingPoint::Lights,
        BindingPoint::PerRenderableBones,
        BindingPoint::PerMaterialInstance,
        BindingPoint::PostProcess,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mobile_tier_ordering() {
        assert!(ShaderModel::Mobile.is_mobile());
        assert!(!ShaderModel::Desktop.is_mobile());
    }

    #[test]
    fn test_precision_qualifier_omits_default() {
        assert_eq!(Precision::High.qualifier(Precision::High), "");
        assert_eq!(Precision::High.qualifier(Precision::Medium), "highp");
        assert_eq!(Precision::Low.qualifier(Precision::Default), "lowp");
    }

    #[test]
    fn test_bool_types_have_no_precision() {
        assert!(!UniformType::Bool3.has_precision());
        assert!(UniformType::Float3.has_precision());
        assert!(UniformType::Mat4.has_precision());
    }

    #[test]
    fn test_attribute_set_locations() {
        let set = AttributeSet::POSITION | AttributeSet::from(VertexAttribute::Uv1);
        assert!(set.has(VertexAttribute::Position));
        assert!(set.has(VertexAttribute::Uv1));
        assert!(!set.has(VertexAttribute::Color));
        assert_eq!(AttributeSet::BONE_WEIGHTS.bits(), 1 << 6);
    }

    #[test]
    fn test_binding_points_are_ordered() {
        for (index, point) in BindingPoint::ALL.iter().enumerate() {
            assert_eq!(point.index(), index);
        }
    }
}
