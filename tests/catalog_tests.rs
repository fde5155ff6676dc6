/// Template catalog, customization and cache integration tests.

use narrative_export::core::data::InMemoryData;
use narrative_export::core::dispatch::ConditionRenderer;
use narrative_export::core::errors::{ErrorCollector, RenderError};
use narrative_export::core::substitution::{placeholder_names, unbalanced_blocks};
use narrative_export::core::templates::{
    CachedTemplateProvider, InMemoryTemplateStore, TemplateCatalog, TemplateError,
};
use narrative_export::schema::condition::{ConditionKind, ParsedCondition};
use narrative_export::schema::entity::ProjectId;
use narrative_export::schema::settings::ExportSettings;
use narrative_export::schema::template::{ExportTemplate, RenderingEngineKind, TemplateKind};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;

type Provider = CachedTemplateProvider<InMemoryTemplateStore>;

fn setup() -> (Arc<Provider>, ConditionRenderer) {
    let provider = Arc::new(CachedTemplateProvider::new(
        InMemoryTemplateStore::new(),
        TemplateCatalog::builtin().unwrap(),
    ));
    let world = InMemoryData::load_from_ron(Path::new("template_data/sample_world.ron")).unwrap();
    let renderer = ConditionRenderer::builder()
        .with_templates(provider.clone())
        .with_data(Arc::new(world))
        .build()
        .unwrap();
    (provider, renderer)
}

fn render_time(renderer: &ConditionRenderer, project: &ProjectId) -> String {
    let condition = ParsedCondition::new(
        ConditionKind::GameTime,
        json!({"operator": 1, "hour": 13, "minutes": 45}),
    );
    renderer
        .render_condition(
            project,
            &condition,
            &ExportSettings::default(),
            None,
            &ErrorCollector::new(),
        )
        .unwrap()
}

#[test]
fn builtin_catalog_is_lint_clean() {
    let (_, renderer) = setup();
    let catalog = TemplateCatalog::builtin().unwrap();
    assert!(catalog.missing_kinds().is_empty());

    for template in catalog.iter() {
        assert!(
            unbalanced_blocks(&template.code).is_empty(),
            "{:?} has unbalanced blocks",
            template.kind
        );
        let documented = renderer
            .placeholders(template.kind, RenderingEngineKind::Legacy)
            .unwrap();
        for name in placeholder_names(&template.code) {
            let known = documented.iter().any(|doc| match doc.name.split_once("FIELDNAME") {
                Some((prefix, suffix)) => name.starts_with(prefix) && name.ends_with(suffix),
                None => doc.name == name,
            });
            assert!(known, "{:?} uses undocumented {}", template.kind, name);
        }
    }
}

#[test]
fn customization_applies_after_invalidation() {
    let (provider, renderer) = setup();
    let project = ProjectId::new("demo");
    assert_eq!(
        render_time(&renderer, &project),
        "game_time_minutes() > 825"
    );

    provider.store().customize(
        &project,
        ExportTemplate {
            kind: TemplateKind::GameTime,
            engine: RenderingEngineKind::Legacy,
            code: "clock() >= {{Condition_Hours}}:{{Condition_Minutes}}".to_string(),
        },
    );
    // Still cached.
    assert_eq!(
        render_time(&renderer, &project),
        "game_time_minutes() > 825"
    );

    provider.invalidate(&project, TemplateKind::GameTime);
    assert_eq!(render_time(&renderer, &project), "clock() >= 13:45");

    let other = ProjectId::new("other");
    assert_eq!(render_time(&renderer, &other), "game_time_minutes() > 825");
}

#[test]
fn customized_group_wrapper() {
    let (provider, renderer) = setup();
    let project = ProjectId::new("demo");
    provider.store().customize(
        &project,
        ExportTemplate {
            kind: TemplateKind::ConditionGroup,
            engine: RenderingEngineKind::Legacy,
            code: "[{{Condition_Group_Content}}]".to_string(),
        },
    );
    provider.store().customize(
        &project,
        ExportTemplate {
            kind: TemplateKind::LogicOr,
            engine: RenderingEngineKind::Legacy,
            code: " || ".to_string(),
        },
    );

    let group = ParsedCondition::new(
        ConditionKind::Group,
        json!({"operator": 1, "conditions": [
            {"kind": 15, "data": {"skill_id": "skill-fire"}},
            {"kind": 16, "data": {"skill_id": "skill-fire"}}
        ]}),
    );
    let out = renderer
        .render_condition(
            &project,
            &group,
            &ExportSettings::default(),
            None,
            &ErrorCollector::new(),
        )
        .unwrap();
    assert_eq!(
        out,
        "[player_has_skill(\"skill-fire\") || not player_has_skill(\"skill-fire\")]"
    );
}

#[test]
fn missing_template_is_fatal() {
    let catalog = TemplateCatalog::parse_ron(
        r#"{
            ConditionGroup: (code: "({{Condition_Group_Content}})"),
            LogicAnd: (code: " and "),
        }"#,
    )
    .unwrap();
    assert_eq!(catalog.len(), 2);
    assert!(catalog.missing_kinds().contains(&TemplateKind::GameTime));

    let renderer = ConditionRenderer::builder()
        .with_templates(Arc::new(CachedTemplateProvider::new(
            InMemoryTemplateStore::new(),
            catalog,
        )))
        .with_data(Arc::new(InMemoryData::new()))
        .build()
        .unwrap();
    let result = renderer.render_conditions(
        &ProjectId::new("demo"),
        &[ParsedCondition::new(
            ConditionKind::GameTime,
            json!({"operator": 0, "hour": 1, "minutes": 0}),
        )],
        &ExportSettings::default(),
        None,
        &ErrorCollector::new(),
    );
    assert!(matches!(
        result,
        Err(RenderError::Template(TemplateError::NotFound(TemplateKind::GameTime)))
    ));
}

#[test]
fn catalog_file_round_trips_through_loader() {
    let catalog =
        TemplateCatalog::load_from_ron(Path::new("template_data/default_catalog.ron")).unwrap();
    let builtin = TemplateCatalog::builtin().unwrap();
    assert_eq!(catalog.len(), builtin.len());
    assert_eq!(
        catalog.get(TemplateKind::LogicOr).map(|t| t.code.as_str()),
        Some(" or ")
    );
}
