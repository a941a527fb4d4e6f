use anyhow::{Context, Result};
use clap::Parser;
use vislum_material::prelude::*;

mod config;

use config::MatcConfig;

/// Generates every requested stage, in vertex then fragment order.
fn generate(material: &MaterialDefinition, config: &MatcConfig) -> Result<Vec<(ShaderType, String)>> {
    let params = config.code_gen_params();
    let variant = config.variant();
    let info = material.prepare();
    if let Some(overflow) = &info.sampler_overflow {
        if config.deny_sampler_overflow {
            return Err(overflow.clone()).context("sampler bindings do not fit");
        }
        log::warn!("{overflow}; slots from {} on are invalid", overflow.limit);
    }
    let generator = material.shader_generator();

    let shaders = config
        .stage
        .shader_types()
        .iter()
        .map(|&shader_type| {
            let text = match shader_type {
                ShaderType::Vertex => generator.create_vertex_program(
                    &params,
                    &info,
                    variant,
                    material.interpolation,
                    material.vertex_domain,
                ),
                ShaderType::Fragment => {
                    generator.create_fragment_program(&params, &info, variant, material.interpolation)
                }
            };
            (shader_type, text)
        })
        .collect();

    Ok(shaders)
}

fn validate(shaders: &[(ShaderType, String)], config: &MatcConfig) -> Result<()> {
    let params = config.code_gen_params();
    let validator = CallGraphValidator::new();

    for (shader_type, text) in shaders {
        let result = match shader_type {
            ShaderType::Vertex => validator.validate_vertex(text, params.shader_model, params.target_api),
            ShaderType::Fragment => validator.validate_fragment(text, params.shader_model, params.target_api),
        };
        result.with_context(|| format!("{shader_type} shader failed validation"))?;
    }

    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let config = MatcConfig::parse();

    let source = std::fs::read_to_string(&config.material)
        .with_context(|| format!("failed to read {}", config.material.display()))?;
    let mut material: MaterialDefinition = serde_json::from_str(&source)
        .with_context(|| format!("failed to parse {}", config.material.display()))?;
    if material.name.is_empty() {
        if let Some(stem) = config.material.file_stem() {
            material.name = stem.to_string_lossy().into_owned();
        }
    }

    log::debug!("Generating {:?} for {} ({:?})", config.stage, material.name, config.code_gen_params());
    let shaders = generate(&material, &config)?;

    if config.validate {
        validate(&shaders, &config)?;
        log::info!("{} passed validation", material.name);
    }

    for (shader_type, text) in &shaders {
        if shaders.len() > 1 {
            println!("// {shader_type} shader");
        }
        print!("{text}");
    }

    Ok(())
}
