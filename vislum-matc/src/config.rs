use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use vislum_material::prelude::*;

/// Which stages to print.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Stage {
    Vertex,
    Fragment,
    #[default]
    Both,
}

impl Stage {
    pub fn shader_types(self) -> &'static [ShaderType] {
        match self {
            Stage::Vertex => &[ShaderType::Vertex],
            Stage::Fragment => &[ShaderType::Fragment],
            Stage::Both => &[ShaderType::Vertex, ShaderType::Fragment],
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Model {
    #[default]
    Mobile,
    Desktop,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Api {
    #[default]
    Opengl,
    Vulkan,
    Metal,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Language {
    #[default]
    Glsl,
    Spirv,
}

/// Generates shader text from a JSON material definition.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct MatcConfig {
    /// Path to the JSON material definition.
    #[arg(value_name = "FILE")]
    pub material: PathBuf,

    #[arg(long, value_enum, default_value_t = Stage::Both)]
    pub stage: Stage,

    /// Hardware tier to generate for.
    #[arg(long, value_enum, default_value_t = Model::Mobile)]
    pub model: Model,

    #[arg(long, value_enum, default_value_t = Api::Opengl)]
    pub api: Api,

    /// Dialect of the generated text.
    #[arg(long, value_enum, default_value_t = Language::Glsl)]
    pub language: Language,

    /// Raw variant key; see the variant bits of the material crate.
    #[arg(long, default_value_t = 0)]
    pub variant: u8,

    /// Run the call graph validator over every generated stage.
    #[arg(long, default_value_t = false)]
    pub validate: bool,

    /// Fail instead of warning when the samplers exceed the binding limit.
    #[arg(long, default_value_t = false)]
    pub deny_sampler_overflow: bool,
}

impl MatcConfig {
    pub fn code_gen_params(&self) -> CodeGenParams {
        CodeGenParams {
            shader_model: match self.model {
                Model::Mobile => ShaderModel::Mobile,
                Model::Desktop => ShaderModel::Desktop,
            },
            target_api: match self.api {
                Api::Opengl => TargetApi::OpenGl,
                Api::Vulkan => TargetApi::Vulkan,
                Api::Metal => TargetApi::Metal,
            },
            target_language: match self.language {
                Language::Glsl => TargetLanguage::Glsl,
                Language::Spirv => TargetLanguage::Spirv,
            },
        }
    }

    #[inline]
    pub fn variant(&self) -> Variant {
        Variant::from_key(self.variant)
    }
}
