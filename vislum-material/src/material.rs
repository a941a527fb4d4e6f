use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::binding::{SamplerBindingMap, SamplerOverflow};
use crate::enums::{
    AttributeSet, BlendingMode, Interpolation, Precision, SamplerFormat, SamplerType, ShaderModel,
    ShaderType, Shading, TargetApi, TargetLanguage, UniformType, VertexDomain,
};
use crate::generator::ShaderGenerator;
use crate::sampler::SamplerInterfaceBlock;
use crate::uniform::UniformInterfaceBlock;
use crate::validate::{ShaderValidator, ValidationError};
use crate::variant::Variant;

pub const MATERIAL_PROPERTIES_COUNT: usize = 19;
pub const MATERIAL_VARIABLES_COUNT: usize = 4;
pub const MAX_PARAMETERS_COUNT: usize = 32;

/// Name of the material's own uniform and sampler blocks.
pub const MATERIAL_PARAMS_BLOCK_NAME: &str = "MaterialParams";

#[derive(Debug, thiserror::Error)]
pub enum MaterialError {
    #[error("A material declares at most 4 custom variables, got {0}")]
    TooManyVariables(usize),

    #[error("Invalid custom variable name: {0:?}")]
    InvalidVariableName(String),

    #[error("A material declares at most 32 parameters")]
    TooManyParameters,

    #[error("Duplicate parameter: {0}")]
    DuplicateParameter(String),

    #[error("Array parameter {0} has no elements")]
    EmptyArray(String),
}

/// A material property the author may write in `material()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Property {
    BaseColor,
    Roughness,
    Metallic,
    Reflectance,
    AmbientOcclusion,
    ClearCoat,
    ClearCoatRoughness,
    ClearCoatNormal,
    Anisotropy,
    AnisotropyDirection,
    Thickness,
    SubsurfacePower,
    SubsurfaceColor,
    SheenColor,
    SpecularColor,
    Glossiness,
    Emissive,
    Normal,
    PostLightingColor,
}

impl Property {
    pub const ALL: [Property; MATERIAL_PROPERTIES_COUNT] = [
        Property::BaseColor,
        Property::Roughness,
        Property::Metallic,
        Property::Reflectance,
        Property::AmbientOcclusion,
        Property::ClearCoat,
        Property::ClearCoatRoughness,
        Property::ClearCoatNormal,
        Property::Anisotropy,
        Property::AnisotropyDirection,
        Property::Thickness,
        Property::SubsurfacePower,
        Property::SubsurfaceColor,
        Property::SheenColor,
        Property::SpecularColor,
        Property::Glossiness,
        Property::Emissive,
        Property::Normal,
        Property::PostLightingColor,
    ];

    /// The suffix of the property's `MATERIAL_HAS_` define.
    pub fn constant_name(self) -> &'static str {
        match self {
            Property::BaseColor => "BASE_COLOR",
            Property::Roughness => "ROUGHNESS",
            Property::Metallic => "METALLIC",
            Property::Reflectance => "REFLECTANCE",
            Property::AmbientOcclusion => "AMBIENT_OCCLUSION",
            Property::ClearCoat => "CLEAR_COAT",
            Property::ClearCoatRoughness => "CLEAR_COAT_ROUGHNESS",
            Property::ClearCoatNormal => "CLEAR_COAT_NORMAL",
            Property::Anisotropy => "ANISOTROPY",
            Property::AnisotropyDirection => "ANISOTROPY_DIRECTION",
            Property::Thickness => "THICKNESS",
            Property::SubsurfacePower => "SUBSURFACE_POWER",
            Property::SubsurfaceColor => "SUBSURFACE_COLOR",
            Property::SheenColor => "SHEEN_COLOR",
            Property::SpecularColor => "SPECULAR_COLOR",
            Property::Glossiness => "GLOSSINESS",
            Property::Emissive => "EMISSIVE",
            Property::Normal => "NORMAL",
            Property::PostLightingColor => "POST_LIGHTING_COLOR",
        }
    }

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

/// The properties a material writes, indexed by [`Property`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Property>", into = "Vec<Property>")]
pub struct PropertyList([bool; MATERIAL_PROPERTIES_COUNT]);

impl PropertyList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, property: Property) {
        self.0[property.index()] = true;
    }

    #[inline]
    pub fn has(&self, property: Property) -> bool {
        self.0[property.index()]
    }

    /// The set properties, in declaration order of [`Property`].
    pub fn iter(&self) -> impl Iterator<Item = Property> + '_ {
        Property::ALL.into_iter().filter(|&property| self.has(property))
    }
}

impl FromIterator<Property> for PropertyList {
    fn from_iter<I: IntoIterator<Item = Property>>(iter: I) -> Self {
        let mut list = PropertyList::new();
        for property in iter {
            list.set(property);
        }
        list
    }
}

impl From<Vec<Property>> for PropertyList {
    fn from(properties: Vec<Property>) -> Self {
        properties.into_iter().collect()
    }
}

impl From<PropertyList> for Vec<Property> {
    fn from(list: PropertyList) -> Self {
        list.iter().collect()
    }
}

/// A custom interpolant slot. The slot index is the interpolant's location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Variable {
    Custom0,
    Custom1,
    Custom2,
    Custom3,
}

impl Variable {
    pub const ALL: [Variable; MATERIAL_VARIABLES_COUNT] =
        [Variable::Custom0, Variable::Custom1, Variable::Custom2, Variable::Custom3];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

static IDENTIFIER_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Names of the custom interpolants, one optional name per [`Variable`] slot.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Option<String>>", into = "Vec<Option<String>>")]
pub struct VariableList(SmallVec<[Option<String>; MATERIAL_VARIABLES_COUNT]>);

impl VariableList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names the interpolant in `slot`.
    pub fn set(&mut self, slot: Variable, name: impl Into<String>) -> Result<(), MaterialError> {
        let name = name.into();
        if !IDENTIFIER_REGEX.is_match(&name) {
            return Err(MaterialError::InvalidVariableName(name));
        }

        if self.0.len() <= slot.index() {
            self.0.resize(slot.index() + 1, None);
        }
        self.0[slot.index()] = Some(name);
        Ok(())
    }

    pub fn get(&self, slot: Variable) -> Option<&str> {
        self.0.get(slot.index()).and_then(|name| name.as_deref())
    }

    /// The named interpolants with their slot index, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(index, name)| Some((index, name.as_deref()?)))
    }

    /// Whether any interpolant is named. Depth variants need the author code
    /// when this holds, since the interpolants are written there.
    pub fn has_custom_variables(&self) -> bool {
        self.0.iter().any(Option::is_some)
    }
}

impl TryFrom<Vec<Option<String>>> for VariableList {
    type Error = MaterialError;

    fn try_from(names: Vec<Option<String>>) -> Result<Self, Self::Error> {
        if names.len() > MATERIAL_VARIABLES_COUNT {
            return Err(MaterialError::TooManyVariables(names.len()));
        }

        let mut list = VariableList::new();
        for (slot, name) in Variable::ALL.into_iter().zip(names) {
            if let Some(name) = name {
                list.set(slot, name)?;
            }
        }
        Ok(list)
    }
}

impl From<VariableList> for Vec<Option<String>> {
    fn from(list: VariableList) -> Self {
        list.0.into_vec()
    }
}

/// A material parameter: a uniform in the material's uniform block or a
/// sampler in its sampler block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Parameter {
    Uniform {
        name: String,
        #[serde(rename = "type")]
        ty: UniformType,
        #[serde(default = "default_array_size")]
        size: u32,
    },
    Sampler {
        name: String,
        #[serde(rename = "type")]
        ty: SamplerType,
        format: SamplerFormat,
        #[serde(default)]
        precision: Precision,
    },
}

fn default_array_size() -> u32 {
    1
}

impl Parameter {
    pub fn uniform(name: impl Into<String>, ty: UniformType, size: u32) -> Self {
        Parameter::Uniform {
            name: name.into(),
            ty,
            size,
        }
    }

    pub fn sampler(name: impl Into<String>, ty: SamplerType, format: SamplerFormat, precision: Precision) -> Self {
        Parameter::Sampler {
            name: name.into(),
            ty,
            format,
            precision,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Parameter::Uniform { name, .. } | Parameter::Sampler { name, .. } => name,
        }
    }

    #[inline]
    pub fn is_sampler(&self) -> bool {
        matches!(self, Parameter::Sampler { .. })
    }
}

/// The material parameters in declaration order.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, derive_more::Deref)]
#[serde(try_from = "Vec<Parameter>", into = "Vec<Parameter>")]
pub struct ParameterList(#[deref(forward)] SmallVec<[Parameter; MAX_PARAMETERS_COUNT]>);

impl ParameterList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, parameter: Parameter) -> Result<(), MaterialError> {
        if self.0.len() >= MAX_PARAMETERS_COUNT {
            return Err(MaterialError::TooManyParameters);
        }

        if self.0.iter().any(|existing| existing.name() == parameter.name()) {
            return Err(MaterialError::DuplicateParameter(parameter.name().to_owned()));
        }

        if let Parameter::Uniform { name, size: 0, .. } = &parameter {
            return Err(MaterialError::EmptyArray(name.clone()));
        }

        self.0.push(parameter);
        Ok(())
    }

    /// Whether any sampler parameter is an external sampler.
    pub fn has_external_sampler(&self) -> bool {
        self.0.iter().any(|parameter| {
            matches!(
                parameter,
                Parameter::Sampler {
                    ty: SamplerType::SamplerExternal,
                    ..
                }
            )
        })
    }
}

impl TryFrom<Vec<Parameter>> for ParameterList {
    type Error = MaterialError;

    fn try_from(parameters: Vec<Parameter>) -> Result<Self, Self::Error> {
        let mut list = ParameterList::new();
        for parameter in parameters {
            list.push(parameter)?;
        }
        Ok(list)
    }
}

impl From<ParameterList> for Vec<Parameter> {
    fn from(list: ParameterList) -> Self {
        list.0.into_vec()
    }
}

/// Target of one generation request.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeGenParams {
    pub shader_model: ShaderModel,
    pub target_api: TargetApi,
    pub target_language: TargetLanguage,
}

/// Everything the shader generator reads about a material.
///
/// Produced by [`MaterialDefinition::prepare`] and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct MaterialInfo {
    pub is_lit: bool,
    pub has_double_sided_capability: bool,
    pub has_external_samplers: bool,
    pub has_shadow_multiplier: bool,
    pub specular_anti_aliasing: bool,
    pub clear_coat_ior_change: bool,
    pub flip_uv: bool,
    /// Overrides the tier default when set.
    pub multi_bounce_ao: Option<bool>,
    /// Overrides the tier default when set.
    pub specular_ao: Option<bool>,
    pub required_attributes: AttributeSet,
    pub blending_mode: BlendingMode,
    pub post_lighting_blending_mode: BlendingMode,
    pub shading: Shading,
    pub uib: UniformInterfaceBlock,
    pub sib: SamplerInterfaceBlock,
    pub sampler_bindings: SamplerBindingMap,
    /// Set when the samplers do not fit. Generation still proceeds; the caller
    /// decides whether this is fatal.
    pub sampler_overflow: Option<SamplerOverflow>,
}

static_assertions::assert_impl_all!(MaterialInfo: Send, Sync);

/// An authored material, as read from a material file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialDefinition {
    pub name: String,

    /// Body of `material()`. Generated when empty.
    pub material_code: String,
    /// Line of the material file `material_code` starts at.
    pub material_line_offset: usize,
    /// Body of `materialVertex()`. Generated when empty.
    pub vertex_code: String,
    pub vertex_line_offset: usize,

    pub properties: PropertyList,
    pub parameters: ParameterList,
    pub variables: VariableList,

    pub blending: BlendingMode,
    pub post_lighting_blending: BlendingMode,
    pub shading: Shading,
    pub interpolation: Interpolation,
    pub vertex_domain: VertexDomain,
    pub required_attributes: AttributeSet,

    /// Initial values of the `_maskThreshold`, `_specularAntiAliasingVariance`,
    /// `_specularAntiAliasingThreshold` and `_doubleSided` uniforms. Generation
    /// only declares those uniforms; the values travel with the definition for
    /// whoever fills the parameter buffer.
    pub mask_threshold: f32,
    pub specular_anti_aliasing_variance: f32,
    pub specular_anti_aliasing_threshold: f32,
    pub double_sided: bool,

    pub shadow_multiplier: bool,
    pub double_sided_capability: bool,
    pub specular_anti_aliasing: bool,
    pub clear_coat_ior_change: bool,
    pub flip_uv: bool,
    pub multi_bounce_ao: Option<bool>,
    pub specular_ao: Option<bool>,
}

impl Default for MaterialDefinition {
    fn default() -> Self {
        Self {
            name: String::new(),
            material_code: String::new(),
            material_line_offset: 0,
            vertex_code: String::new(),
            vertex_line_offset: 0,
            properties: PropertyList::default(),
            parameters: ParameterList::default(),
            variables: VariableList::default(),
            blending: BlendingMode::Opaque,
            post_lighting_blending: BlendingMode::Transparent,
            shading: Shading::Lit,
            interpolation: Interpolation::Smooth,
            vertex_domain: VertexDomain::Object,
            required_attributes: AttributeSet::empty(),
            mask_threshold: 0.4,
            specular_anti_aliasing_variance: 0.15,
            specular_anti_aliasing_threshold: 0.2,
            shadow_multiplier: false,
            double_sided: false,
            double_sided_capability: false,
            specular_anti_aliasing: false,
            clear_coat_ior_change: true,
            flip_uv: true,
            multi_bounce_ao: None,
            specular_ao: None,
        }
    }
}

impl MaterialDefinition {
    #[inline]
    pub fn is_lit(&self) -> bool {
        self.shading != Shading::Unlit
    }

    /// Lays out the material's blocks and freezes everything generation reads.
    pub fn prepare(&self) -> MaterialInfo {
        let mut samplers = SamplerInterfaceBlock::builder().name(MATERIAL_PARAMS_BLOCK_NAME);
        let mut uniforms = UniformInterfaceBlock::builder().name(MATERIAL_PARAMS_BLOCK_NAME);
        for parameter in self.parameters.iter() {
            match parameter {
                Parameter::Uniform { name, ty, size } => {
                    uniforms.push(name.as_str(), *size, *ty, Precision::Default);
                }
                Parameter::Sampler {
                    name,
                    ty,
                    format,
                    precision,
                } => {
                    samplers.push(name.as_str(), *ty, *format, *precision, false);
                }
            }
        }

        if self.specular_anti_aliasing {
            uniforms.push("_specularAntiAliasingVariance", 1, UniformType::Float, Precision::Default);
            uniforms.push("_specularAntiAliasingThreshold", 1, UniformType::Float, Precision::Default);
        }

        if self.blending == BlendingMode::Masked {
            uniforms.push("_maskThreshold", 1, UniformType::Float, Precision::Default);
        }

        if self.double_sided_capability {
            uniforms.push("_doubleSided", 1, UniformType::Bool, Precision::Default);
        }

        let mut required_attributes = self.required_attributes | AttributeSet::POSITION;
        if self.is_lit() || self.shadow_multiplier {
            required_attributes |= AttributeSet::TANGENTS;
        }

        let sib = samplers.build();
        let uib = uniforms.build();

        let material_name = (!self.name.is_empty()).then_some(self.name.as_str());
        let mut sampler_bindings = SamplerBindingMap::new();
        let sampler_overflow = sampler_bindings.populate(Some(&sib), material_name);

        MaterialInfo {
            is_lit: self.is_lit(),
            has_double_sided_capability: self.double_sided_capability,
            has_external_samplers: self.parameters.has_external_sampler(),
            has_shadow_multiplier: self.shadow_multiplier,
            specular_anti_aliasing: self.specular_anti_aliasing,
            clear_coat_ior_change: self.clear_coat_ior_change,
            flip_uv: self.flip_uv,
            multi_bounce_ao: self.multi_bounce_ao,
            specular_ao: self.specular_ao,
            required_attributes,
            blending_mode: self.blending,
            post_lighting_blending_mode: self.post_lighting_blending,
            shading: self.shading,
            uib,
            sib,
            sampler_bindings,
            sampler_overflow,
        }
    }

    pub fn shader_generator(&self) -> ShaderGenerator<'_> {
        ShaderGenerator::new(
            &self.properties,
            &self.variables,
            &self.material_code,
            self.material_line_offset,
            &self.vertex_code,
            self.vertex_line_offset,
        )
    }

    /// Renders one stage of the base variant.
    pub fn peek(&self, shader_type: ShaderType, params: &CodeGenParams) -> String {
        let generator = self.shader_generator();
        let info = self.prepare();
        let variant = Variant::default();

        match shader_type {
            ShaderType::Vertex => {
                generator.create_vertex_program(params, &info, variant, self.interpolation, self.vertex_domain)
            }
            ShaderType::Fragment => generator.create_fragment_program(params, &info, variant, self.interpolation),
        }
    }

    /// Generates both stages for mobile OpenGL and runs them through `validator`.
    pub fn run_semantic_analysis(&self, validator: &dyn ShaderValidator) -> Result<(), ValidationError> {
        let params = CodeGenParams::default();

        let vertex = self.peek(ShaderType::Vertex, &params);
        log::debug!("Vertex shader of {:?}:\n{vertex}", self.name);
        validator.validate_vertex(&vertex, params.shader_model, params.target_api)?;

        let fragment = self.peek(ShaderType::Fragment, &params);
        log::debug!("Fragment shader of {:?}:\n{fragment}", self.name);
        validator.validate_fragment(&fragment, params.shader_model, params.target_api)
    }
}
