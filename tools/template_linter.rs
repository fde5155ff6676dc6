/// Template Linter — validates a template catalog.
///
/// Usage: template_linter <catalog.ron>
///        template_linter --builtin
///
/// Reports missing template kinds and unbalanced blocks as errors, and
/// placeholders no resolver documents as warnings.

use narrative_export::core::data::InMemoryData;
use narrative_export::core::dispatch::ConditionRenderer;
use narrative_export::core::substitution::{placeholder_names, unbalanced_blocks};
use narrative_export::core::templates::{
    CachedTemplateProvider, InMemoryTemplateStore, TemplateCatalog,
};
use narrative_export::schema::template::{ExportTemplate, Placeholder, RenderingEngineKind};
use std::path::Path;
use std::process;
use std::sync::Arc;

fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: template_linter <catalog.ron> | --builtin");
        process::exit(0);
    }

    let loaded = if args[1] == "--builtin" {
        TemplateCatalog::builtin()
    } else {
        TemplateCatalog::load_from_ron(Path::new(&args[1]))
    };
    let catalog = match loaded {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("ERROR: Failed to load catalog: {}", e);
            process::exit(1);
        }
    };

    println!("Loaded {} templates", catalog.len());

    let renderer = match ConditionRenderer::builder()
        .with_templates(Arc::new(CachedTemplateProvider::new(
            InMemoryTemplateStore::new(),
            catalog.clone(),
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

    let (errors, warnings) = lint_catalog(&catalog, &renderer);

    println!("\n=== Template Lint Report ===\n");

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }

    for error in &errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    if !errors.is_empty() {
        process::exit(1);
    }
}

fn lint_catalog(
    catalog: &TemplateCatalog,
    renderer: &ConditionRenderer,
) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for kind in catalog.missing_kinds() {
        errors.push(format!("No template for {:?}", kind));
    }

    for template in catalog.iter() {
        for marker in unbalanced_blocks(&template.code) {
            errors.push(format!(
                "{:?}: unbalanced block marker {{{{{}}}}}",
                template.kind, marker
            ));
        }
        if template.engine == RenderingEngineKind::Legacy {
            warnings.extend(undocumented_placeholders(template, renderer));
        }
    }

    (errors, warnings)
}

fn undocumented_placeholders(
    template: &ExportTemplate,
    renderer: &ConditionRenderer,
) -> Vec<String> {
    let documented = match renderer.placeholders(template.kind, RenderingEngineKind::Legacy) {
        Ok(documented) => documented,
        Err(e) => return vec![format!("{:?}: {}", template.kind, e)],
    };
    placeholder_names(&template.code)
        .into_iter()
        .filter(|name| !documented.iter().any(|doc| matches_doc(name, doc)))
        .map(|name| {
            format!(
                "{:?}: placeholder {{{{{}}}}} is not documented",
                template.kind, name
            )
        })
        .collect()
}

/// `FIELDNAME` in a documented name stands for any non-empty field name.
fn matches_doc(name: &str, doc: &Placeholder) -> bool {
    match doc.name.split_once("FIELDNAME") {
        Some((prefix, suffix)) => {
            name.len() > prefix.len() + suffix.len()
                && name.starts_with(prefix)
                && name.ends_with(suffix)
        }
        None => doc.name == name,
    }
}
