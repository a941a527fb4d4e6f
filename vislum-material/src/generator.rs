use crate::codegen::{CodeGenerator, count_lines};
use crate::engine;
use crate::enums::{
    AttributeSet, BindingPoint, BlendingMode, Interpolation, Precision, SamplerFormat, SamplerType, ShaderModel,
    ShaderType, Shading, TargetApi, TargetLanguage, VertexAttribute, VertexDomain,
};
use crate::material::{CodeGenParams, MaterialInfo, PropertyList, VariableList};
use crate::sampler::SamplerInterfaceBlock;
use crate::templates;
use crate::uniform::UniformInterfaceBlock;
use crate::variant::Variant;

const DEFAULT_MATERIAL_CODE: &str = "void material(inout MaterialInputs m) {\n    prepareMaterial(m);\n}\n";
const DEFAULT_MATERIAL_VERTEX_CODE: &str = "void materialVertex(inout MaterialVertexInputs m) {\n}\n";

/// Turns a prepared material into vertex and fragment shader text.
///
/// Generation is a pure function of the generator's inputs and the request, so
/// two calls with the same arguments return the same text.
#[derive(Debug, Clone)]
pub struct ShaderGenerator<'a> {
    properties: &'a PropertyList,
    variables: &'a VariableList,
    material_code: &'a str,
    material_line_offset: usize,
    vertex_code: &'a str,
    vertex_line_offset: usize,
}

impl<'a> ShaderGenerator<'a> {
    /// Empty author code is replaced by an entry point that does nothing but
    /// the mandatory setup.
    pub fn new(
        properties: &'a PropertyList,
        variables: &'a VariableList,
        material_code: &'a str,
        material_line_offset: usize,
        vertex_code: &'a str,
        vertex_line_offset: usize,
    ) -> Self {
        Self {
            properties,
            variables,
            material_code: if material_code.is_empty() {
                DEFAULT_MATERIAL_CODE
            } else {
                material_code
            },
            material_line_offset,
            vertex_code: if vertex_code.is_empty() {
                DEFAULT_MATERIAL_VERTEX_CODE
            } else {
                vertex_code
            },
            vertex_line_offset,
        }
    }

    /// Whether the material declares custom interpolants, which are written by
    /// the author code even in depth variants.
    pub fn has_custom_depth_shader(&self) -> bool {
        self.variables.has_custom_variables()
    }

    /// Whether a depth variant of `material` has to run the author code.
    fn depth_uses_material_code(&self, material: &MaterialInfo) -> bool {
        material.blending_mode == BlendingMode::Masked || self.has_custom_depth_shader()
    }

    pub fn create_vertex_program(
        &self,
        params: &CodeGenParams,
        material: &MaterialInfo,
        variant: Variant,
        interpolation: Interpolation,
        vertex_domain: VertexDomain,
    ) -> String {
        log::debug!("Generating vertex program for variant {:#04x} ({params:?})", variant.key());

        let mut cg = CodeGenerator::new();
        let shader_type = ShaderType::Vertex;

        generate_prolog(&mut cg, params, shader_type, material.has_external_samplers);

        generate_define(&mut cg, "FLIP_UV_ATTRIBUTE", material.flip_uv);
        generate_lighting_defines(&mut cg, shader_type, material, variant);
        generate_define(&mut cg, "HAS_SKINNING", variant.has_skinning());
        generate_define(&mut cg, material.shading.define_name(), true);
        self.generate_material_defines(&mut cg);

        let attributes = vertex_attributes(material, variant);
        generate_shader_inputs(&mut cg, shader_type, attributes, interpolation);
        self.generate_variables(&mut cg, shader_type);

        generate_define(&mut cg, vertex_domain.define_name(), true);

        generate_uniforms(&mut cg, params, shader_type, BindingPoint::PerView, &engine::PER_VIEW_UIB);
        generate_uniforms(&mut cg, params, shader_type, BindingPoint::PerRenderable, &engine::PER_RENDERABLE_UIB);
        if variant.has_skinning() {
            generate_uniforms(
                &mut cg,
                params,
                shader_type,
                BindingPoint::PerRenderableBones,
                &engine::PER_RENDERABLE_BONES_UIB,
            );
        }
        generate_uniforms(&mut cg, params, shader_type, BindingPoint::PerMaterialInstance, &material.uib);
        cg.blank();
        generate_samplers(
            &mut cg,
            params,
            material.sampler_bindings.block_offset(BindingPoint::PerMaterialInstance),
            &material.sib,
        );

        cg.line(templates::COMMON_MATH_FS);
        cg.line(templates::COMMON_GETTERS_FS);
        cg.line(templates::GETTERS_VS);
        cg.line(templates::MATERIAL_INPUTS_VS);

        if variant.is_depth_pass() && !self.depth_uses_material_code(material) {
            cg.line(templates::DEPTH_MAIN_VS);
        } else {
            append_shader(&mut cg, self.vertex_code, self.vertex_line_offset);
            cg.line(templates::SHADOWING_VS);
            cg.line(templates::MAIN_VS);
        }

        generate_epilog(&mut cg);
        cg.to_text()
    }

    pub fn create_fragment_program(
        &self,
        params: &CodeGenParams,
        material: &MaterialInfo,
        variant: Variant,
        interpolation: Interpolation,
    ) -> String {
        log::debug!("Generating fragment program for variant {:#04x} ({params:?})", variant.key());

        let mut cg = CodeGenerator::new();
        let shader_type = ShaderType::Fragment;

        generate_prolog(&mut cg, params, shader_type, material.has_external_samplers);

        generate_define(&mut cg, "USE_MULTIPLE_SCATTERING_COMPENSATION", true);
        generate_define(
            &mut cg,
            "GEOMETRIC_SPECULAR_AA",
            material.specular_anti_aliasing && material.is_lit,
        );
        generate_define(&mut cg, "CLEAR_COAT_IOR_CHANGE", material.clear_coat_ior_change);

        let mobile = params.shader_model.is_mobile();
        let specular_ao = material.specular_ao.unwrap_or(!mobile);
        generate_define_value(&mut cg, "SPECULAR_AMBIENT_OCCLUSION", specular_ao as u32);
        let multi_bounce_ao = material.multi_bounce_ao.unwrap_or(!mobile);
        generate_define_value(&mut cg, "MULTI_BOUNCE_AMBIENT_OCCLUSION", multi_bounce_ao as u32);

        generate_lighting_defines(&mut cg, shader_type, material, variant);

        generate_define(
            &mut cg,
            "MATERIAL_HAS_DOUBLE_SIDED_CAPABILITY",
            material.has_double_sided_capability,
        );
        for name in blend_mode_defines(material.blending_mode) {
            generate_define(&mut cg, name, true);
        }
        if let Some(name) = post_lighting_blend_mode_define(material.post_lighting_blending_mode) {
            generate_define(&mut cg, name, true);
        }
        generate_define(&mut cg, material.shading.define_name(), true);
        self.generate_material_defines(&mut cg);

        generate_shader_inputs(&mut cg, shader_type, material.required_attributes, interpolation);
        self.generate_variables(&mut cg, shader_type);

        generate_uniforms(&mut cg, params, shader_type, BindingPoint::PerView, &engine::PER_VIEW_UIB);
        generate_uniforms(&mut cg, params, shader_type, BindingPoint::Lights, &engine::LIGHTS_UIB);
        generate_uniforms(&mut cg, params, shader_type, BindingPoint::PerMaterialInstance, &material.uib);
        cg.blank();
        generate_samplers(
            &mut cg,
            params,
            material.sampler_bindings.block_offset(BindingPoint::PerView),
            &engine::PER_VIEW_SIB,
        );
        generate_samplers(
            &mut cg,
            params,
            material.sampler_bindings.block_offset(BindingPoint::PerMaterialInstance),
            &material.sib,
        );

        cg.line(templates::COMMON_MATH_FS);
        cg.line(templates::COMMON_SHADING_FS);
        cg.line(templates::COMMON_GRAPHICS_FS);
        cg.line(templates::COMMON_MATERIAL_FS);
        cg.line(templates::COMMON_GETTERS_FS);
        cg.line(templates::GETTERS_FS);
        cg.line(templates::MATERIAL_INPUTS_FS);
        cg.line(templates::SHADING_PARAMETERS_FS);

        if variant.is_depth_pass() {
            if self.depth_uses_material_code(material) {
                append_shader(&mut cg, self.material_code, self.material_line_offset);
            }
            cg.line(templates::DEPTH_MAIN_FS);
        } else {
            append_shader(&mut cg, self.material_code, self.material_line_offset);
            if material.is_lit {
                generate_shader_lit(&mut cg, variant, material.shading);
            } else {
                generate_shader_unlit(&mut cg, variant, material.has_shadow_multiplier);
            }
            cg.line(templates::MAIN_FS);
        }

        generate_epilog(&mut cg);
        cg.to_text()
    }

    fn generate_material_defines(&self, cg: &mut CodeGenerator) {
        for property in self.properties.iter() {
            cg.line_fmt(format_args!("#define MATERIAL_HAS_{}", property.constant_name()));
        }
    }

    fn generate_variables(&self, cg: &mut CodeGenerator, shader_type: ShaderType) {
        for (index, name) in self.variables.iter() {
            match shader_type {
                ShaderType::Vertex => {
                    cg.line_fmt(format_args!("\n#define VARIABLE_CUSTOM{index} {name}"));
                    cg.line_fmt(format_args!("\n#define VARIABLE_CUSTOM_AT{index} variable_{name}"));
                    cg.line_fmt(format_args!("LAYOUT_LOCATION({index}) out vec4 variable_{name};"));
                }
                ShaderType::Fragment => {
                    cg.line_fmt(format_args!("\nLAYOUT_LOCATION({index}) in highp vec4 variable_{name};"));
                }
            }
        }
    }
}

/// Precision applied to declarations without a qualifier in `shader_type`.
fn default_precision(shader_type: ShaderType, shader_model: ShaderModel) -> Precision {
    match shader_type {
        ShaderType::Vertex => Precision::High,
        ShaderType::Fragment if shader_model.is_mobile() => Precision::Medium,
        ShaderType::Fragment => Precision::High,
    }
}

/// Precision of block members declared with [`Precision::Default`].
fn default_uniform_precision(shader_model: ShaderModel) -> Precision {
    if shader_model.is_mobile() {
        Precision::Medium
    } else {
        Precision::High
    }
}

fn generate_prolog(cg: &mut CodeGenerator, params: &CodeGenParams, shader_type: ShaderType, has_external_samplers: bool) {
    let spirv = params.target_language == TargetLanguage::Spirv;

    match params.shader_model {
        ShaderModel::Mobile => {
            // Layout locations on inputs and outputs need 310 es.
            cg.line(if spirv { "#version 310 es\n" } else { "#version 300 es\n" });
            if has_external_samplers {
                cg.line("#extension GL_OES_EGL_image_external_essl3 : require\n");
            }
            cg.line("#define TARGET_MOBILE");
        }
        ShaderModel::Desktop => {
            // Binding qualifiers need 450 core.
            cg.line(if spirv { "#version 450 core\n" } else { "#version 410 core\n" });
        }
    }

    match params.target_api {
        TargetApi::Vulkan => cg.line("#define TARGET_VULKAN_ENVIRONMENT"),
        TargetApi::Metal => cg.line("#define TARGET_METAL_ENVIRONMENT"),
        TargetApi::OpenGl => {}
    }
    if spirv {
        cg.line("#define TARGET_LANGUAGE_SPIRV");
    }

    let precision = default_precision(shader_type, params.shader_model).qualifier(Precision::Default);
    cg.line_fmt(format_args!("precision {precision} float;\n"));
    cg.line_fmt(format_args!("precision {precision} int;\n"));

    // The Metal shading language versions we target have no invariant qualifier.
    if shader_type == ShaderType::Vertex && params.target_api != TargetApi::Metal {
        cg.blank();
        cg.line("invariant gl_Position;");
    }

    cg.line(templates::COMMON_TYPES_FS);
    cg.blank();
}

/// Every shader ends with an empty line; [`append_shader`] counts on it.
fn generate_epilog(cg: &mut CodeGenerator) {
    cg.blank();
}

fn generate_define(cg: &mut CodeGenerator, name: &str, value: bool) {
    if value {
        cg.line_fmt(format_args!("#define {name}"));
    }
}

fn generate_define_value(cg: &mut CodeGenerator, name: &str, value: u32) {
    cg.line_fmt(format_args!("#define {name} {value}"));
}

/// Lighting variant defines. Dynamic lighting only exists in the fragment stage.
fn generate_lighting_defines(
    cg: &mut CodeGenerator,
    shader_type: ShaderType,
    material: &MaterialInfo,
    variant: Variant,
) {
    let lit_variants = material.is_lit || material.has_shadow_multiplier;
    generate_define(
        cg,
        "HAS_DIRECTIONAL_LIGHTING",
        lit_variants && variant.has_directional_lighting(),
    );
    if shader_type == ShaderType::Fragment {
        generate_define(cg, "HAS_DYNAMIC_LIGHTING", lit_variants && variant.has_dynamic_lighting());
    }
    generate_define(cg, "HAS_SHADOWING", lit_variants && variant.has_shadow_receiver());
    generate_define(cg, "HAS_SHADOW_MULTIPLIER", material.has_shadow_multiplier);
}

fn blend_mode_defines(blending_mode: BlendingMode) -> &'static [&'static str] {
    match blending_mode {
        BlendingMode::Opaque => &["BLEND_MODE_OPAQUE"],
        BlendingMode::Transparent => &["BLEND_MODE_TRANSPARENT"],
        BlendingMode::Add => &["BLEND_MODE_ADD"],
        BlendingMode::Masked => &["BLEND_MODE_MASKED"],
        // Fade is transparent blending that also fades the lighting.
        BlendingMode::Fade => &["BLEND_MODE_TRANSPARENT", "BLEND_MODE_FADE"],
        BlendingMode::Multiply => &["BLEND_MODE_MULTIPLY"],
        BlendingMode::Screen => &["BLEND_MODE_SCREEN"],
    }
}

fn post_lighting_blend_mode_define(blending_mode: BlendingMode) -> Option<&'static str> {
    match blending_mode {
        BlendingMode::Opaque => Some("POST_LIGHTING_BLEND_MODE_OPAQUE"),
        BlendingMode::Transparent => Some("POST_LIGHTING_BLEND_MODE_TRANSPARENT"),
        BlendingMode::Add => Some("POST_LIGHTING_BLEND_MODE_ADD"),
        BlendingMode::Multiply => Some("POST_LIGHTING_BLEND_MODE_MULTIPLY"),
        BlendingMode::Screen => Some("POST_LIGHTING_BLEND_MODE_SCREEN"),
        BlendingMode::Masked | BlendingMode::Fade => None,
    }
}

/// The vertex stage's attributes: the material's, plus the bones when the variant skins.
fn vertex_attributes(material: &MaterialInfo, variant: Variant) -> AttributeSet {
    let mut attributes = material.required_attributes;
    if variant.has_skinning() {
        attributes |= AttributeSet::BONE_INDICES | AttributeSet::BONE_WEIGHTS;
    }
    attributes
}

fn generate_shader_inputs(
    cg: &mut CodeGenerator,
    shader_type: ShaderType,
    attributes: AttributeSet,
    interpolation: Interpolation,
) {
    cg.line_fmt(format_args!("#define SHADING_INTERPOLATION {}", interpolation.qualifier()));

    generate_define(cg, "HAS_ATTRIBUTE_TANGENTS", attributes.has(VertexAttribute::Tangents));
    generate_define(cg, "HAS_ATTRIBUTE_COLOR", attributes.has(VertexAttribute::Color));
    generate_define(cg, "HAS_ATTRIBUTE_UV0", attributes.has(VertexAttribute::Uv0));
    generate_define(cg, "HAS_ATTRIBUTE_UV1", attributes.has(VertexAttribute::Uv1));
    generate_define(cg, "HAS_ATTRIBUTE_BONE_INDICES", attributes.has(VertexAttribute::BoneIndices));
    generate_define(cg, "HAS_ATTRIBUTE_BONE_WEIGHTS", attributes.has(VertexAttribute::BoneWeights));

    match shader_type {
        ShaderType::Vertex => {
            cg.blank();
            generate_define_value(cg, "LOCATION_POSITION", VertexAttribute::Position.location());

            const LOCATIONS: [(VertexAttribute, &str); 6] = [
                (VertexAttribute::Tangents, "LOCATION_TANGENTS"),
                (VertexAttribute::Uv0, "LOCATION_UV0"),
                (VertexAttribute::Uv1, "LOCATION_UV1"),
                (VertexAttribute::Color, "LOCATION_COLOR"),
                (VertexAttribute::BoneIndices, "LOCATION_BONE_INDICES"),
                (VertexAttribute::BoneWeights, "LOCATION_BONE_WEIGHTS"),
            ];
            for (attribute, name) in LOCATIONS {
                if attributes.has(attribute) {
                    generate_define_value(cg, name, attribute.location());
                }
            }

            cg.line(templates::INPUTS_VS);
        }
        ShaderType::Fragment => cg.line(templates::INPUTS_FS),
    }
}

fn generate_uniforms(
    cg: &mut CodeGenerator,
    params: &CodeGenParams,
    shader_type: ShaderType,
    binding_point: BindingPoint,
    uib: &UniformInterfaceBlock,
) {
    if uib.is_empty() {
        return;
    }

    let uniform_precision = default_uniform_precision(params.shader_model);
    let default_precision = default_precision(shader_type, params.shader_model);

    let mut header = String::from("\nlayout(");
    if params.target_language == TargetLanguage::Spirv {
        header.push_str(&format!("binding = {}, ", binding_point.index()));
    }
    header.push_str(&format!("std140) uniform {} {{", uib.name()));
    cg.line(header);

    for info in uib.uniform_info_list() {
        let precision = if !info.ty.has_precision() {
            ""
        } else {
            let precision = match info.precision {
                Precision::Default => uniform_precision,
                precision => precision,
            };
            precision.qualifier(default_precision)
        };

        let mut line = String::from("    ");
        if !precision.is_empty() {
            line.push_str(precision);
            line.push(' ');
        }
        line.push_str(info.ty.type_name());
        line.push(' ');
        line.push_str(&info.name);
        if info.is_array() {
            line.push_str(&format!("[{}]", info.size));
        }
        line.push(';');
        cg.line(line);
    }

    cg.line_fmt(format_args!("}} {};", uib.name().to_lowercase()));
}

fn generate_samplers(cg: &mut CodeGenerator, params: &CodeGenParams, first_binding: u8, sib: &SamplerInterfaceBlock) {
    if sib.is_empty() {
        return;
    }

    for info in sib.sampler_info_list() {
        let uniform_name = SamplerInterfaceBlock::uniform_name(sib.name(), &info.name);

        // External textures are a mobile only concept; desktop samples them as 2D.
        let ty = match info.ty {
            SamplerType::SamplerExternal if !params.shader_model.is_mobile() => SamplerType::Sampler2d,
            ty => ty,
        };
        let type_name = sampler_type_name(ty, info.format, info.multisample, params.target_language);
        let precision = info.precision.qualifier(Precision::Default);

        let mut line = String::new();
        if params.target_language == TargetLanguage::Spirv {
            line.push_str(&format!("layout(binding = {}", first_binding as u32 + info.offset as u32));
            // Vulkan keeps samplers in set 1 so their bindings start from zero.
            if params.target_api == TargetApi::Vulkan {
                line.push_str(", set = 1");
            }
            line.push_str(") ");
        }
        line.push_str("uniform ");
        if !precision.is_empty() {
            line.push_str(precision);
            line.push(' ');
        }
        line.push_str(&format!("{type_name} {uniform_name};"));
        cg.line(line);
    }

    cg.blank();
}

fn sampler_type_name(
    ty: SamplerType,
    format: SamplerFormat,
    multisample: bool,
    target_language: TargetLanguage,
) -> &'static str {
    match (ty, multisample, format) {
        (SamplerType::Sampler2d, false, SamplerFormat::Int) => "isampler2D",
        (SamplerType::Sampler2d, false, SamplerFormat::Uint) => "usampler2D",
        (SamplerType::Sampler2d, false, SamplerFormat::Float) => "sampler2D",
        (SamplerType::Sampler2d, _, SamplerFormat::Shadow) => "sampler2DShadow",
        (SamplerType::Sampler2d, true, SamplerFormat::Int) => "ms_isampler2D",
        (SamplerType::Sampler2d, true, SamplerFormat::Uint) => "ms_usampler2D",
        (SamplerType::Sampler2d, true, SamplerFormat::Float) => "ms_sampler2D",
        (SamplerType::SamplerCubemap, _, SamplerFormat::Int) => "isamplerCube",
        (SamplerType::SamplerCubemap, _, SamplerFormat::Uint) => "usamplerCube",
        (SamplerType::SamplerCubemap, _, SamplerFormat::Float) => "samplerCube",
        (SamplerType::SamplerCubemap, _, SamplerFormat::Shadow) => "samplerCubeShadow",
        // SPIR-V targets sample external images like any other 2D image.
        (SamplerType::SamplerExternal, _, _) => match target_language {
            TargetLanguage::Spirv => "sampler2D",
            TargetLanguage::Glsl => "samplerExternalOES",
        },
    }
}

fn generate_shader_lit(cg: &mut CodeGenerator, variant: Variant, shading: Shading) {
    cg.line(templates::COMMON_LIGHTING_FS);
    if variant.has_shadow_receiver() {
        cg.line(templates::SHADOWING_FS);
    }

    cg.line(templates::BRDF_FS);
    match shading {
        Shading::Lit | Shading::SpecularGlossiness => cg.line(templates::SHADING_MODEL_STANDARD_FS),
        Shading::Subsurface => cg.line(templates::SHADING_MODEL_SUBSURFACE_FS),
        Shading::Cloth => cg.line(templates::SHADING_MODEL_CLOTH_FS),
        Shading::Unlit => debug_assert!(false, "lit shader generated for an unlit material"),
    }

    cg.line(templates::AMBIENT_OCCLUSION_FS);
    cg.line(templates::LIGHT_INDIRECT_FS);
    if variant.has_directional_lighting() {
        cg.line(templates::LIGHT_DIRECTIONAL_FS);
    }
    if variant.has_dynamic_lighting() {
        cg.line(templates::LIGHT_PUNCTUAL_FS);
    }

    cg.line(templates::SHADING_LIT_FS);
}

fn generate_shader_unlit(cg: &mut CodeGenerator, variant: Variant, has_shadow_multiplier: bool) {
    if has_shadow_multiplier && variant.has_shadow_receiver() {
        cg.line(templates::SHADOWING_FS);
    }
    cg.line(templates::SHADING_UNLIT_FS);
}

/// Splices author code, bracketed by `#line` markers so that diagnostics
/// point into the material file.
fn append_shader(cg: &mut CodeGenerator, shader: &str, line_offset: usize) {
    if shader.is_empty() {
        return;
    }

    let mut lines = cg.line_count();
    let mut text = format!("#line {line_offset}");
    if !shader.starts_with('\n') {
        text.push('\n');
    }
    text.push_str(shader);
    if !shader.ends_with('\n') {
        text.push('\n');
        lines += 1;
    }
    // Two more lines for the markers themselves.
    text.push_str(&format!("#line {}\n", lines + count_lines(shader) + 2));
    cg.line(text);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::{Precision, UniformType};
    use crate::material::{MaterialDefinition, Parameter, Property, Variable};

    const MOBILE_GL: CodeGenParams = CodeGenParams {
        shader_model: ShaderModel::Mobile,
        target_api: TargetApi::OpenGl,
        target_language: TargetLanguage::Glsl,
    };

    const DESKTOP_VULKAN: CodeGenParams = CodeGenParams {
        shader_model: ShaderModel::Desktop,
        target_api: TargetApi::Vulkan,
        target_language: TargetLanguage::Spirv,
    };

    fn textured_material() -> MaterialDefinition {
        let mut material = MaterialDefinition {
            name: "textured".to_owned(),
            ..Default::default()
        };
        material.properties.set(Property::BaseColor);
        material.properties.set(Property::Roughness);
        material
            .parameters
            .push(Parameter::uniform("tint", UniformType::Float4, 1))
            .unwrap();
        material
            .parameters
            .push(Parameter::sampler(
                "albedo",
                SamplerType::Sampler2d,
                SamplerFormat::Float,
                Precision::Medium,
            ))
            .unwrap();
        material
    }

    fn vertex(material: &MaterialDefinition, params: &CodeGenParams, variant: Variant) -> String {
        let info = material.prepare();
        material.shader_generator().create_vertex_program(
            params,
            &info,
            variant,
            material.interpolation,
            material.vertex_domain,
        )
    }

    fn fragment(material: &MaterialDefinition, params: &CodeGenParams, variant: Variant) -> String {
        let info = material.prepare();
        material
            .shader_generator()
            .create_fragment_program(params, &info, variant, material.interpolation)
    }

    #[test]
    fn test_generation_is_deterministic() {
        let material = textured_material();
        let variant = Variant::DIRECTIONAL_LIGHTING | Variant::SHADOW_RECEIVER;

        assert_eq!(vertex(&material, &MOBILE_GL, variant), vertex(&material, &MOBILE_GL, variant));
        assert_eq!(
            fragment(&material, &DESKTOP_VULKAN, variant),
            fragment(&material, &DESKTOP_VULKAN, variant)
        );
    }

    #[test]
    fn test_version_table() {
        let material = MaterialDefinition::default();
        let cases = [
            (ShaderModel::Mobile, TargetLanguage::Glsl, "#version 300 es\n"),
            (ShaderModel::Mobile, TargetLanguage::Spirv, "#version 310 es\n"),
            (ShaderModel::Desktop, TargetLanguage::Glsl, "#version 410 core\n"),
            (ShaderModel::Desktop, TargetLanguage::Spirv, "#version 450 core\n"),
        ];

        for (shader_model, target_language, version) in cases {
            let params = CodeGenParams {
                shader_model,
                target_api: TargetApi::OpenGl,
                target_language,
            };
            let text = fragment(&material, &params, Variant::default());
            assert!(text.starts_with(version), "{version}");
            assert_eq!(text.contains("#define TARGET_MOBILE"), shader_model.is_mobile());
            assert_eq!(
                text.contains("#define TARGET_LANGUAGE_SPIRV"),
                target_language == TargetLanguage::Spirv
            );
        }
    }

    #[test]
    fn test_prolog() {
        let material = MaterialDefinition::default();

        let text = vertex(&material, &MOBILE_GL, Variant::default());
        assert!(text.starts_with("#version 300 es\n\n#define TARGET_MOBILE\nprecision highp float;\n\nprecision highp int;\n\n\ninvariant gl_Position;\n"));

        let text = fragment(&material, &MOBILE_GL, Variant::default());
        assert!(text.contains("precision mediump float;\n"));
        assert!(!text.contains("invariant gl_Position;"));

        let metal = CodeGenParams {
            target_api: TargetApi::Metal,
            ..MOBILE_GL
        };
        let text = vertex(&material, &metal, Variant::default());
        assert!(text.contains("#define TARGET_METAL_ENVIRONMENT"));
        assert!(!text.contains("invariant gl_Position;"));
    }

    #[test]
    fn test_external_samplers() {
        let mut material = MaterialDefinition::default();
        material
            .parameters
            .push(Parameter::sampler(
                "video",
                SamplerType::SamplerExternal,
                SamplerFormat::Float,
                Precision::Default,
            ))
            .unwrap();

        let text = fragment(&material, &MOBILE_GL, Variant::default());
        assert!(text.contains("#extension GL_OES_EGL_image_external_essl3 : require\n"));
        assert!(text.contains("\nuniform samplerExternalOES materialParams_video;\n"));

        let desktop = CodeGenParams {
            shader_model: ShaderModel::Desktop,
            ..MOBILE_GL
        };
        let text = fragment(&material, &desktop, Variant::default());
        assert!(!text.contains("#extension"));
        assert!(text.contains("\nuniform sampler2D materialParams_video;\n"));
    }

    #[test]
    fn test_skinning_variant() {
        let material = textured_material();

        let text = vertex(&material, &MOBILE_GL, Variant::SKINNING);
        assert!(text.contains("#define HAS_SKINNING\n"));
        assert!(text.contains("#define HAS_ATTRIBUTE_BONE_INDICES\n"));
        assert!(text.contains("#define HAS_ATTRIBUTE_BONE_WEIGHTS\n"));
        assert!(text.contains("#define LOCATION_BONE_INDICES 5\n"));
        assert!(text.contains("#define LOCATION_BONE_WEIGHTS 6\n"));
        assert!(text.contains("uniform BonesUniforms {"));
        assert!(text.contains("    mediump vec4 bones[1024];\n"));

        let text = vertex(&material, &MOBILE_GL, Variant::default());
        assert!(!text.contains("#define HAS_SKINNING"));
        assert!(!text.contains("#define LOCATION_BONE_INDICES"));
        assert!(!text.contains("BonesUniforms"));
    }

    #[test]
    fn test_vertex_inputs() {
        let mut material = MaterialDefinition {
            required_attributes: AttributeSet::UV0 | AttributeSet::COLOR,
            interpolation: Interpolation::Flat,
            ..Default::default()
        };
        material.variables.set(Variable::Custom0, "eye").unwrap();

        let text = vertex(&material, &MOBILE_GL, Variant::default());
        assert!(text.contains("#define SHADING_INTERPOLATION flat \n"));
        assert!(text.contains(
            "\n#define LOCATION_POSITION 0\n#define LOCATION_TANGENTS 1\n#define LOCATION_UV0 3\n#define LOCATION_COLOR 2\n"
        ));
        assert!(text.contains("\n#define VARIABLE_CUSTOM0 eye\n"));
        assert!(text.contains("\n#define VARIABLE_CUSTOM_AT0 variable_eye\n"));
        assert!(text.contains("LAYOUT_LOCATION(0) out vec4 variable_eye;\n"));
        assert!(text.contains("#define VERTEX_DOMAIN_OBJECT\n"));

        let text = fragment(&material, &MOBILE_GL, Variant::default());
        assert!(text.contains("\nLAYOUT_LOCATION(0) in highp vec4 variable_eye;\n"));
        assert!(!text.contains("LOCATION_POSITION"));
    }

    #[test]
    fn test_depth_variant_skips_author_code_when_opaque() {
        let material = MaterialDefinition::default();

        let text = fragment(&material, &MOBILE_GL, Variant::DEPTH);
        assert!(!text.contains("void material(inout MaterialInputs m)"));
        assert!(text.contains(templates::DEPTH_MAIN_FS));
        assert!(!text.contains(templates::MAIN_FS));

        let text = vertex(&material, &MOBILE_GL, Variant::DEPTH);
        assert!(!text.contains("void materialVertex("));
        assert!(text.contains(templates::DEPTH_MAIN_VS));
    }

    #[test]
    fn test_depth_variant_splices_author_code_when_masked() {
        let material = MaterialDefinition {
            blending: BlendingMode::Masked,
            ..Default::default()
        };

        let text = fragment(&material, &MOBILE_GL, Variant::DEPTH);
        let code = text.find("void material(inout MaterialInputs m)").unwrap();
        let depth_main = text.find(templates::DEPTH_MAIN_FS).unwrap();
        assert!(code < depth_main);

        let text = vertex(&material, &MOBILE_GL, Variant::DEPTH);
        assert!(text.contains("void materialVertex("));
    }

    #[test]
    fn test_depth_variant_splices_author_code_with_custom_variables() {
        let mut material = MaterialDefinition::default();
        material.variables.set(Variable::Custom2, "height").unwrap();

        let generator = material.shader_generator();
        assert!(generator.has_custom_depth_shader());

        assert!(fragment(&material, &MOBILE_GL, Variant::DEPTH).contains("void material(inout MaterialInputs m)"));
        assert!(vertex(&material, &MOBILE_GL, Variant::DEPTH).contains("void materialVertex("));
    }

    #[test]
    fn test_line_markers() {
        let material = MaterialDefinition {
            material_code: "void material(inout MaterialInputs m) {\n    prepareMaterial(m);\n}".to_owned(),
            material_line_offset: 12,
            ..Default::default()
        };

        let text = fragment(&material, &MOBILE_GL, Variant::default());
        let start = text.find("#line 12\nvoid material(").unwrap();
        let before = count_lines(&text[..start]);
        assert!(text.contains(&format!("}}\n#line {}\n", before + 1 + 2 + 2)));
    }

    #[test]
    fn test_uniform_block_precision() {
        let mut material = textured_material();
        material.double_sided_capability = true;

        let text = vertex(&material, &MOBILE_GL, Variant::default());
        assert!(text.contains("\nlayout(std140) uniform FrameUniforms {\n    mat4 viewFromWorldMatrix;\n"));
        assert!(text.contains("    mediump vec4 lightColorIntensity;\n"));
        assert!(text.contains("    mediump vec3 iblSH[9];\n"));
        assert!(text.contains("} frameuniforms;\n"));
        assert!(text.contains("    bool _doubleSided;\n"));

        let text = fragment(&material, &MOBILE_GL, Variant::default());
        assert!(text.contains("    highp mat4 viewFromWorldMatrix;\n"));
        assert!(text.contains("    vec4 lightColorIntensity;\n"));
        assert!(text.contains("    vec4 tint;\n"));
        assert!(text.contains("} materialparams;\n"));

        let desktop = CodeGenParams {
            shader_model: ShaderModel::Desktop,
            ..MOBILE_GL
        };
        let text = fragment(&material, &desktop, Variant::default());
        assert!(text.contains("    mat4 viewFromWorldMatrix;\n"));
        assert!(text.contains("    vec4 lightColorIntensity;\n"));
    }

    #[test]
    fn test_empty_material_block_is_skipped() {
        let material = MaterialDefinition::default();
        let text = fragment(&material, &MOBILE_GL, Variant::default());
        assert!(!text.contains("uniform MaterialParams"));
        assert!(text.contains("uniform LightsUniforms {"));
    }

    #[test]
    fn test_vulkan_bindings() {
        let material = textured_material();

        let text = fragment(&material, &DESKTOP_VULKAN, Variant::default());
        assert!(text.contains("#define TARGET_VULKAN_ENVIRONMENT\n"));
        assert!(text.contains("\nlayout(binding = 0, std140) uniform FrameUniforms {\n"));
        assert!(text.contains("\nlayout(binding = 2, std140) uniform LightsUniforms {\n"));
        assert!(text.contains("\nlayout(binding = 4, std140) uniform MaterialParams {\n"));
        assert!(text.contains("layout(binding = 0, set = 1) uniform lowp sampler2DShadow light_shadowMap;\n"));
        assert!(text.contains("layout(binding = 4, set = 1) uniform mediump samplerCube light_iblSpecular;\n"));
        assert!(text.contains("layout(binding = 6, set = 1) uniform mediump sampler2D materialParams_albedo;\n"));

        let spirv_gl = CodeGenParams {
            target_api: TargetApi::OpenGl,
            ..DESKTOP_VULKAN
        };
        let text = fragment(&material, &spirv_gl, Variant::default());
        assert!(text.contains("layout(binding = 6) uniform mediump sampler2D materialParams_albedo;\n"));

        let text = fragment(&material, &MOBILE_GL, Variant::default());
        assert!(text.contains("\nuniform mediump sampler2D materialParams_albedo;\n"));
        assert!(!text.contains("binding ="));
    }

    #[test]
    fn test_blend_mode_defines() {
        let material = MaterialDefinition {
            blending: BlendingMode::Fade,
            post_lighting_blending: BlendingMode::Masked,
            ..Default::default()
        };
        let text = fragment(&material, &MOBILE_GL, Variant::default());
        assert!(text.contains("#define BLEND_MODE_TRANSPARENT\n#define BLEND_MODE_FADE\n"));
        assert!(!text.contains("#define POST_LIGHTING_BLEND_MODE_"));

        let text = fragment(&MaterialDefinition::default(), &MOBILE_GL, Variant::default());
        assert!(text.contains("#define BLEND_MODE_OPAQUE\n"));
        assert!(text.contains("#define POST_LIGHTING_BLEND_MODE_TRANSPARENT\n"));
    }

    #[test]
    fn test_ambient_occlusion_defaults_and_overrides() {
        let material = MaterialDefinition::default();
        let text = fragment(&material, &MOBILE_GL, Variant::default());
        assert!(text.contains("#define SPECULAR_AMBIENT_OCCLUSION 0\n"));
        assert!(text.contains("#define MULTI_BOUNCE_AMBIENT_OCCLUSION 0\n"));

        let text = fragment(&material, &DESKTOP_VULKAN, Variant::default());
        assert!(text.contains("#define SPECULAR_AMBIENT_OCCLUSION 1\n"));

        let material = MaterialDefinition {
            specular_ao: Some(true),
            multi_bounce_ao: Some(false),
            ..Default::default()
        };
        let text = fragment(&material, &MOBILE_GL, Variant::default());
        assert!(text.contains("#define SPECULAR_AMBIENT_OCCLUSION 1\n"));
        assert!(text.contains("#define MULTI_BOUNCE_AMBIENT_OCCLUSION 0\n"));
    }

    #[test]
    fn test_lighting_defines_follow_shading() {
        let variant = Variant::DIRECTIONAL_LIGHTING | Variant::DYNAMIC_LIGHTING | Variant::SHADOW_RECEIVER;

        let lit = fragment(&textured_material(), &MOBILE_GL, variant);
        assert!(lit.contains("#define HAS_DIRECTIONAL_LIGHTING\n#define HAS_DYNAMIC_LIGHTING\n#define HAS_SHADOWING\n"));
        assert!(lit.contains("#define MATERIAL_HAS_BASE_COLOR\n#define MATERIAL_HAS_ROUGHNESS\n"));
        assert!(lit.contains(templates::LIGHT_PUNCTUAL_FS));
        assert!(lit.contains(templates::LIGHT_DIRECTIONAL_FS));
        assert!(lit.contains(templates::SHADOWING_FS));
        assert!(lit.contains(templates::SHADING_MODEL_STANDARD_FS));

        let unlit = MaterialDefinition {
            shading: Shading::Unlit,
            ..Default::default()
        };
        let text = fragment(&unlit, &MOBILE_GL, variant);
        assert!(!text.contains("#define HAS_DIRECTIONAL_LIGHTING"));
        assert!(!text.contains(templates::SHADOWING_FS));
        assert!(text.contains(templates::SHADING_UNLIT_FS));
        assert!(text.contains("#define SHADING_MODEL_UNLIT\n"));

        let shadowed = MaterialDefinition {
            shading: Shading::Unlit,
            shadow_multiplier: true,
            ..Default::default()
        };
        let text = fragment(&shadowed, &MOBILE_GL, variant);
        assert!(text.contains("#define HAS_SHADOWING\n"));
        assert!(text.contains("#define HAS_SHADOW_MULTIPLIER\n"));
        assert!(text.contains(templates::SHADOWING_FS));
    }

    #[test]
    fn test_stage_specific_defines() {
        let material = textured_material();
        let variant = Variant::DIRECTIONAL_LIGHTING | Variant::DYNAMIC_LIGHTING | Variant::SKINNING;

        let text = vertex(&material, &MOBILE_GL, variant);
        assert!(text.contains("#define FLIP_UV_ATTRIBUTE\n#define HAS_DIRECTIONAL_LIGHTING\n#define HAS_SKINNING\n"));
        assert!(!text.contains("#define HAS_DYNAMIC_LIGHTING"));

        let text = fragment(&material, &MOBILE_GL, variant);
        assert!(text.contains("#define HAS_DYNAMIC_LIGHTING\n"));
        assert!(!text.contains("#define FLIP_UV_ATTRIBUTE"));
        assert!(!text.contains("#define HAS_SKINNING"));
        assert!(!text.contains("#define HAS_ATTRIBUTE_BONE_INDICES"));
        assert!(!text.contains("#define HAS_ATTRIBUTE_BONE_WEIGHTS"));
    }

    #[test]
    fn test_shading_model_templates() {
        let cloth = MaterialDefinition {
            shading: Shading::Cloth,
            ..Default::default()
        };
        let text = fragment(&cloth, &MOBILE_GL, Variant::default());
        assert!(text.contains(templates::SHADING_MODEL_CLOTH_FS));
        assert!(!text.contains(templates::SHADING_MODEL_STANDARD_FS));

        let subsurface = MaterialDefinition {
            shading: Shading::Subsurface,
            ..Default::default()
        };
        let text = fragment(&subsurface, &MOBILE_GL, Variant::default());
        assert!(text.contains(templates::SHADING_MODEL_SUBSURFACE_FS));

        let glossy = MaterialDefinition {
            shading: Shading::SpecularGlossiness,
            ..Default::default()
        };
        let text = fragment(&glossy, &MOBILE_GL, Variant::default());
        assert!(text.contains(templates::SHADING_MODEL_STANDARD_FS));
        assert!(text.contains("#define SHADING_MODEL_SPECULAR_GLOSSINESS\n"));
    }

    #[test]
    fn test_fragment_feature_defines() {
        let material = MaterialDefinition {
            specular_anti_aliasing: true,
            double_sided_capability: true,
            flip_uv: false,
            ..Default::default()
        };
        let text = fragment(&material, &MOBILE_GL, Variant::default());
        assert!(text.contains("#define USE_MULTIPLE_SCATTERING_COMPENSATION\n"));
        assert!(text.contains("#define GEOMETRIC_SPECULAR_AA\n"));
        assert!(text.contains("#define CLEAR_COAT_IOR_CHANGE\n"));
        assert!(text.contains("#define MATERIAL_HAS_DOUBLE_SIDED_CAPABILITY\n"));
        assert!(!text.contains("#define FLIP_UV_ATTRIBUTE"));

        let text = vertex(&MaterialDefinition::default(), &MOBILE_GL, Variant::default());
        assert!(text.contains("#define FLIP_UV_ATTRIBUTE\n"));
        assert!(!text.contains("#define GEOMETRIC_SPECULAR_AA"));
    }

    #[test]
    fn test_program_ends_with_blank_line() {
        let text = fragment(&MaterialDefinition::default(), &MOBILE_GL, Variant::default());
        assert!(text.ends_with("}\n\n\n"));
    }
}
