/// Placeholder Docs — prints the placeholders every template may use.
///
/// Usage: placeholder_docs [--engine legacy|structured] [--kind <TemplateKind>]

use narrative_export::core::data::InMemoryData;
use narrative_export::core::dispatch::ConditionRenderer;
use narrative_export::core::templates::{
    CachedTemplateProvider, InMemoryTemplateStore, TemplateCatalog,
};
use narrative_export::schema::template::{RenderingEngineKind, TemplateKind};
use std::process;
use std::sync::Arc;

fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();

    let mut engine = RenderingEngineKind::Legacy;
    let mut only_kind: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--engine" if i + 1 < args.len() => {
                i += 1;
                engine = match args[i].to_lowercase().as_str() {
                    "legacy" => RenderingEngineKind::Legacy,
                    "structured" => RenderingEngineKind::Structured,
                    other => {
                        eprintln!("Unknown engine: {}", other);
                        process::exit(1);
                    }
                };
            }
            "--kind" if i + 1 < args.len() => {
                i += 1;
                only_kind = Some(args[i].clone());
            }
            "--help" | "-h" => {
                println!(
                    "Usage: placeholder_docs [--engine legacy|structured] [--kind <TemplateKind>]"
                );
                return;
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let catalog = match TemplateCatalog::builtin() {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("ERROR: Failed to load builtin catalog: {}", e);
            process::exit(1);
        }
    };
    let renderer = match ConditionRenderer::builder()
        .with_templates(Arc::new(CachedTemplateProvider::new(
            InMemoryTemplateStore::new(),
            catalog,
        )))
        .with_data(Arc::new(InMemoryData::new()))
        .build()
    {
        Ok(renderer) => renderer,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            process::exit(1);
        }
    };

    for kind in TemplateKind::ALL {
        let name = format!("{:?}", kind);
        if only_kind.as_deref().is_some_and(|wanted| wanted != name) {
            continue;
        }
        println!("== {} ==", name);
        match renderer.placeholders(kind, engine) {
            Ok(placeholders) if placeholders.is_empty() => println!("  (no placeholders)"),
            Ok(placeholders) => {
                for placeholder in placeholders {
                    println!(
                        "  {{{{{}}}}}  {}",
                        placeholder.name, placeholder.description
                    );
                }
            }
            Err(e) => println!("  ERROR: {}", e),
        }
        println!();
    }
}
