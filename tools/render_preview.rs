/// Render Preview — renders a condition list against a world file.
///
/// Usage: render_preview --world <world.ron> --conditions <conditions.json>
///                       [--catalog <catalog.ron>] [--settings <settings.ron>]
///                       [--subject <npc-id>] [--project <id>]

use narrative_export::core::data::{DataAccess, InMemoryData};
use narrative_export::core::dispatch::ConditionRenderer;
use narrative_export::core::errors::ErrorCollector;
use narrative_export::core::templates::{
    CachedTemplateProvider, InMemoryTemplateStore, TemplateCatalog,
};
use narrative_export::schema::condition::ParsedCondition;
use narrative_export::schema::entity::ProjectId;
use narrative_export::schema::settings::ExportSettings;
use std::path::Path;
use std::process;
use std::sync::Arc;

fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let mut world_path = None;
    let mut conditions_path = None;
    let mut catalog_path = None;
    let mut settings_path = None;
    let mut subject_id = None;
    let mut project = ProjectId::new("preview");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--world" if i + 1 < args.len() => {
                i += 1;
                world_path = Some(args[i].clone());
            }
            "--conditions" if i + 1 < args.len() => {
                i += 1;
                conditions_path = Some(args[i].clone());
            }
            "--catalog" if i + 1 < args.len() => {
                i += 1;
                catalog_path = Some(args[i].clone());
            }
            "--settings" if i + 1 < args.len() => {
                i += 1;
                settings_path = Some(args[i].clone());
            }
            "--subject" if i + 1 < args.len() => {
                i += 1;
                subject_id = Some(args[i].clone());
            }
            "--project" if i + 1 < args.len() => {
                i += 1;
                project = ProjectId::new(args[i].clone());
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let (Some(world_path), Some(conditions_path)) = (world_path, conditions_path) else {
        print_usage();
        process::exit(1);
    };

    let world =
        InMemoryData::load_from_ron(Path::new(&world_path)).unwrap_or_else(|e| fail("world", e));
    let catalog = match catalog_path {
        Some(path) => TemplateCatalog::load_from_ron(Path::new(&path)),
        None => TemplateCatalog::builtin(),
    }
    .unwrap_or_else(|e| fail("catalog", e));
    let settings = match settings_path {
        Some(path) => {
            ExportSettings::load_from_ron(Path::new(&path)).unwrap_or_else(|e| fail("settings", e))
        }
        None => ExportSettings::default(),
    };
    let conditions: Vec<ParsedCondition> = std::fs::read_to_string(&conditions_path)
        .map_err(|e| e.to_string())
        .and_then(|json| {
            serde_json::from_str(&json).map_err(|e| e.to_string())
        })
        .unwrap_or_else(|e| fail("conditions", e));

    let subject = match subject_id {
        Some(id) => match world.npc(&id) {
            Ok(Some(npc)) => Some(npc),
            Ok(None) => fail("subject", format!("no npc {}", id)),
            Err(e) => fail("subject", e),
        },
        None => None,
    };

    let renderer = ConditionRenderer::builder()
        .with_templates(Arc::new(CachedTemplateProvider::new(
            InMemoryTemplateStore::new(),
            catalog,
        )))
        .with_data(Arc::new(world))
        .build()
        .unwrap_or_else(|e| fail("renderer", e));

    let errors = ErrorCollector::new();
    match renderer.render_conditions(&project, &conditions, &settings, subject.as_ref(), &errors) {
        Ok(code) => println!("{}", code),
        Err(e) => fail("render", e),
    }

    let entries = errors.into_entries();
    if !entries.is_empty() {
        eprintln!("\n{} export errors:", entries.len());
        for entry in &entries {
            eprintln!("  {}", entry);
        }
    }
}

fn fail(what: &str, error: impl std::fmt::Display) -> ! {
    eprintln!("ERROR: {}: {}", what, error);
    process::exit(1);
}

fn print_usage() {
    println!("Usage: render_preview --world <world.ron> --conditions <conditions.json>");
    println!("                      [--catalog <catalog.ron>] [--settings <settings.ron>]");
    println!("                      [--subject <npc-id>] [--project <id>]");
}
