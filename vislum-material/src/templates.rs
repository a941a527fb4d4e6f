//! Shader source shared by every generated program.

pub const AMBIENT_OCCLUSION_FS: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders/ambient_occlusion.fs"));
pub const BRDF_FS: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders/brdf.fs"));
pub const COMMON_GETTERS_FS: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders/common_getters.fs"));
pub const COMMON_GRAPHICS_FS: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders/common_graphics.fs"));
pub const COMMON_LIGHTING_FS: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders/common_lighting.fs"));
pub const COMMON_MATERIAL_FS: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders/common_material.fs"));
pub const COMMON_MATH_FS: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders/common_math.fs"));
pub const COMMON_SHADING_FS: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders/common_shading.fs"));
pub const COMMON_TYPES_FS: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders/common_types.fs"));
pub const DEPTH_MAIN_FS: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders/depth_main.fs"));
pub const DEPTH_MAIN_VS: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders/depth_main.vs"));
pub const GETTERS_FS: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders/getters.fs"));
pub const GETTERS_VS: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders/getters.vs"));
pub const INPUTS_FS: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders/inputs.fs"));
pub const INPUTS_VS: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders/inputs.vs"));
pub const LIGHT_DIRECTIONAL_FS: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders/light_directional.fs"));
pub const LIGHT_INDIRECT_FS: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders/light_indirect.fs"));
pub const LIGHT_PUNCTUAL_FS: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders/light_punctual.fs"));
pub const MAIN_FS: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders/main.fs"));
pub const MAIN_VS: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders/main.vs"));
pub const MATERIAL_INPUTS_FS: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders/material_inputs.fs"));
pub const MATERIAL_INPUTS_VS: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders/material_inputs.vs"));
pub const SHADING_LIT_FS: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders/shading_lit.fs"));
pub const SHADING_MODEL_CLOTH_FS: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders/shading_model_cloth.fs"));
pub const SHADING_MODEL_STANDARD_FS: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders/shading_model_standard.fs"));
pub const SHADING_MODEL_SUBSURFACE_FS: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders/shading_model_subsurface.fs"));
pub const SHADING_PARAMETERS_FS: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders/shading_parameters.fs"));
pub const SHADING_UNLIT_FS: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders/shading_unlit.fs"));
pub const SHADOWING_FS: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders/shadowing.fs"));
pub const SHADOWING_VS: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders/shadowing.vs"));
