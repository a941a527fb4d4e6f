pub mod binding;
pub mod codegen;
pub mod composer;
mod directive;
pub mod engine;
pub mod enums;
pub mod generator;
pub mod material;
pub mod sampler;
pub mod templates;
pub mod uniform;
pub mod validate;
pub mod variant;

pub mod prelude {
    pub use crate::binding::{SamplerBindingInfo, SamplerBindingMap, SamplerOverflow};
    pub use crate::codegen::CodeGenerator;
    pub use crate::composer::{ComposeError, ComposeErrorType, ShaderComposer};
    pub use crate::enums::{
        AttributeSet, BindingPoint, BlendingMode, Interpolation, Precision, SamplerFormat, SamplerType,
        ShaderModel, ShaderType, Shading, TargetApi, TargetLanguage, UniformType, VertexAttribute, VertexDomain,
    };
    pub use crate::generator::ShaderGenerator;
    pub use crate::material::{
        CodeGenParams, MaterialDefinition, MaterialError, MaterialInfo, Parameter, ParameterList, Property,
        PropertyList, Variable, VariableList,
    };
    pub use crate::sampler::{SamplerInfo, SamplerInterfaceBlock};
    pub use crate::uniform::{UniformInfo, UniformInterfaceBlock};
    pub use crate::validate::{CallGraphValidator, ShaderValidator, ValidationError};
    pub use crate::variant::Variant;
}
