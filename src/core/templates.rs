/// Export templates — the built-in catalog, per-project customizations, and
/// the populate-once template cache.
use log::{debug, info};
use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, RwLock};
use thiserror::Error;

use crate::schema::entity::ProjectId;
use crate::schema::template::{ExportTemplate, RenderingEngineKind, TemplateKind};

const BUILTIN_CATALOG: &str = include_str!("../../template_data/default_catalog.ron");

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("no template available for {0:?}")]
    NotFound(TemplateKind),
    #[error("template store unavailable: {0}")]
    Store(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Source of templates for the renderer.
pub trait TemplateProvider: Send + Sync {
    fn template(
        &self,
        project: &ProjectId,
        kind: TemplateKind,
    ) -> Result<Arc<ExportTemplate>, TemplateError>;
}

/// Default templates used when a project has no customization.
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    templates: BTreeMap<TemplateKind, ExportTemplate>,
}

// The catalog file maps kinds to bodies; the kind is implied by the key.
#[derive(Debug, Deserialize)]
struct RonTemplate {
    #[serde(default)]
    engine: RenderingEngineKind,
    code: String,
}

impl TemplateCatalog {
    /// The catalog shipped with the crate.
    pub fn builtin() -> Result<TemplateCatalog, TemplateError> {
        Self::parse_ron(BUILTIN_CATALOG)
    }

    pub fn load_from_ron(path: &Path) -> Result<TemplateCatalog, TemplateError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn parse_ron(input: &str) -> Result<TemplateCatalog, TemplateError> {
        let raw: BTreeMap<TemplateKind, RonTemplate> = ron::from_str(input)?;
        let templates = raw
            .into_iter()
            .map(|(kind, template)| {
                let template = ExportTemplate {
                    kind,
                    engine: template.engine,
                    code: template.code,
                };
                (kind, template)
            })
            .collect();
        Ok(TemplateCatalog { templates })
    }

    pub fn get(&self, kind: TemplateKind) -> Option<&ExportTemplate> {
        self.templates.get(&kind)
    }

    pub fn insert(&mut self, template: ExportTemplate) {
        self.templates.insert(template.kind, template);
    }

    /// Kinds with no template in this catalog.
    pub fn missing_kinds(&self) -> Vec<TemplateKind> {
        TemplateKind::ALL
            .iter()
            .copied()
            .filter(|kind| !self.templates.contains_key(kind))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExportTemplate> {
        self.templates.values()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// Persistence for per-project template customizations.
pub trait TemplateStore: Send + Sync {
    fn customized(
        &self,
        project: &ProjectId,
        kind: TemplateKind,
    ) -> Result<Option<ExportTemplate>, TemplateError>;
}

/// A `TemplateStore` kept in memory.
#[derive(Debug, Default)]
pub struct InMemoryTemplateStore {
    templates: RwLock<FxHashMap<(ProjectId, TemplateKind), ExportTemplate>>,
}

impl InMemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn customize(&self, project: &ProjectId, template: ExportTemplate) {
        let mut templates = self
            .templates
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        templates.insert((project.clone(), template.kind), template);
    }

    pub fn reset(&self, project: &ProjectId, kind: TemplateKind) {
        let mut templates = self
            .templates
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        templates.remove(&(project.clone(), kind));
    }
}

impl TemplateStore for InMemoryTemplateStore {
    fn customized(
        &self,
        project: &ProjectId,
        kind: TemplateKind,
    ) -> Result<Option<ExportTemplate>, TemplateError> {
        let templates = self
            .templates
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(templates.get(&(project.clone(), kind)).cloned())
    }
}

/// Serves project templates from a store, falling back to a default
/// catalog, and caches every resolved template until invalidated.
///
/// Cached templates are immutable; a miss loads once and the first
/// inserted value wins. A load that overlaps an `invalidate` of the same
/// key is returned to its caller but not cached.
pub struct CachedTemplateProvider<S> {
    store: S,
    defaults: TemplateCatalog,
    cache: RwLock<TemplateCache>,
}

type CacheKey = (ProjectId, TemplateKind);

#[derive(Default)]
struct TemplateCache {
    entries: FxHashMap<CacheKey, Arc<ExportTemplate>>,
    // Bumped by every invalidation of the key.
    generations: FxHashMap<CacheKey, u64>,
}

impl TemplateCache {
    fn generation(&self, key: &CacheKey) -> u64 {
        self.generations.get(key).copied().unwrap_or(0)
    }
}

impl<S: TemplateStore> CachedTemplateProvider<S> {
    pub fn new(store: S, defaults: TemplateCatalog) -> Self {
        Self {
            store,
            defaults,
            cache: RwLock::new(TemplateCache::default()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Drops the cached template for one project and kind. Call after the
    /// template author edits it.
    pub fn invalidate(&self, project: &ProjectId, kind: TemplateKind) {
        let key = (project.clone(), kind);
        let mut cache = self
            .cache
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *cache.generations.entry(key.clone()).or_insert(0) += 1;
        if cache.entries.remove(&key).is_some() {
            info!(
                "invalidated cached {:?} template for project {}",
                kind, project.0
            );
        }
    }

    pub fn cached_len(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .entries
            .len()
    }

    fn load(
        &self,
        project: &ProjectId,
        kind: TemplateKind,
    ) -> Result<ExportTemplate, TemplateError> {
        if let Some(template) = self.store.customized(project, kind)? {
            return Ok(template);
        }
        self.defaults
            .get(kind)
            .cloned()
            .ok_or(TemplateError::NotFound(kind))
    }
}

impl<S: TemplateStore> TemplateProvider for CachedTemplateProvider<S> {
    fn template(
        &self,
        project: &ProjectId,
        kind: TemplateKind,
    ) -> Result<Arc<ExportTemplate>, TemplateError> {
        let key = (project.clone(), kind);
        let generation = {
            let cache = self
                .cache
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some(template) = cache.entries.get(&key) {
                return Ok(Arc::clone(template));
            }
            cache.generation(&key)
        };

        debug!(
            "template cache miss for {:?} in project {}",
            kind, project.0
        );
        let loaded = Arc::new(self.load(project, kind)?);
        let mut cache = self
            .cache
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if cache.generation(&key) != generation {
            debug!(
                "{:?} template for project {} changed while loading",
                kind, project.0
            );
            return Ok(loaded);
        }
        Ok(Arc::clone(cache.entries.entry(key).or_insert(loaded)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::thread;

    fn project() -> ProjectId {
        ProjectId::new("p1")
    }

    fn small_catalog() -> TemplateCatalog {
        TemplateCatalog::parse_ron(
            r#"{
                Code: (code: "{{Condition_Code}}"),
                LogicAnd: (engine: Legacy, code: " and "),
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn builtin_catalog_is_complete() {
        let catalog = TemplateCatalog::builtin().unwrap();
        assert!(
            catalog.missing_kinds().is_empty(),
            "{:?}",
            catalog.missing_kinds()
        );
        assert_eq!(catalog.len(), TemplateKind::ALL.len());
    }

    #[test]
    fn builtin_catalog_uses_legacy_engine() {
        let catalog = TemplateCatalog::builtin().unwrap();
        assert!(catalog
            .iter()
            .all(|t| t.engine == RenderingEngineKind::Legacy));
    }

    #[test]
    fn parse_sets_kind_from_key() {
        let catalog = small_catalog();
        assert_eq!(
            catalog.get(TemplateKind::Code).unwrap().kind,
            TemplateKind::Code
        );
        assert_eq!(catalog.get(TemplateKind::LogicAnd).unwrap().code, " and ");
        assert!(catalog.get(TemplateKind::LogicOr).is_none());
    }

    #[test]
    fn provider_falls_back_to_defaults() {
        let provider = CachedTemplateProvider::new(InMemoryTemplateStore::new(), small_catalog());
        let template = provider.template(&project(), TemplateKind::LogicAnd).unwrap();
        assert_eq!(template.code, " and ");
    }

    #[test]
    fn provider_reports_missing_template() {
        let provider = CachedTemplateProvider::new(InMemoryTemplateStore::new(), small_catalog());
        let result = provider.template(&project(), TemplateKind::GameTime);
        assert!(matches!(
            result,
            Err(TemplateError::NotFound(TemplateKind::GameTime))
        ));
    }

    #[test]
    fn customization_wins_after_invalidation() {
        let provider = CachedTemplateProvider::new(InMemoryTemplateStore::new(), small_catalog());
        let before = provider.template(&project(), TemplateKind::LogicAnd).unwrap();
        assert_eq!(before.code, " and ");

        provider.store().customize(
            &project(),
            ExportTemplate {
                kind: TemplateKind::LogicAnd,
                engine: RenderingEngineKind::Legacy,
                code: " && ".to_string(),
            },
        );

        // Still cached until the edit invalidates the entry.
        let cached = provider.template(&project(), TemplateKind::LogicAnd).unwrap();
        assert_eq!(cached.code, " and ");

        provider.invalidate(&project(), TemplateKind::LogicAnd);
        let after = provider.template(&project(), TemplateKind::LogicAnd).unwrap();
        assert_eq!(after.code, " && ");
    }

    #[test]
    fn invalidation_only_touches_one_entry() {
        let provider = CachedTemplateProvider::new(InMemoryTemplateStore::new(), small_catalog());
        provider.template(&project(), TemplateKind::LogicAnd).unwrap();
        provider.template(&project(), TemplateKind::Code).unwrap();
        assert_eq!(provider.cached_len(), 2);

        provider.invalidate(&project(), TemplateKind::Code);
        assert_eq!(provider.cached_len(), 1);
    }

    #[test]
    fn customizations_are_per_project() {
        let provider = CachedTemplateProvider::new(InMemoryTemplateStore::new(), small_catalog());
        provider.store().customize(
            &ProjectId::new("other"),
            ExportTemplate {
                kind: TemplateKind::LogicAnd,
                engine: RenderingEngineKind::Legacy,
                code: " AND ".to_string(),
            },
        );
        let template = provider.template(&project(), TemplateKind::LogicAnd).unwrap();
        assert_eq!(template.code, " and ");
    }

    /// Pauses the first lookup after it has read the store, until released.
    struct PausingStore {
        inner: InMemoryTemplateStore,
        gate: std::sync::Mutex<Option<(mpsc::Sender<()>, mpsc::Receiver<()>)>>,
    }

    impl TemplateStore for PausingStore {
        fn customized(
            &self,
            project: &ProjectId,
            kind: TemplateKind,
        ) -> Result<Option<ExportTemplate>, TemplateError> {
            let template = self.inner.customized(project, kind)?;
            let gate = self.gate.lock().unwrap().take();
            if let Some((read, release)) = gate {
                read.send(()).unwrap();
                release.recv().unwrap();
            }
            Ok(template)
        }
    }

    fn and_template(code: &str) -> ExportTemplate {
        ExportTemplate {
            kind: TemplateKind::LogicAnd,
            engine: RenderingEngineKind::Legacy,
            code: code.to_string(),
        }
    }

    #[test]
    fn invalidation_during_load_is_not_lost() {
        let (read_tx, read_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let store = PausingStore {
            inner: InMemoryTemplateStore::new(),
            gate: std::sync::Mutex::new(Some((read_tx, release_rx))),
        };
        store.inner.customize(&project(), and_template(" old "));
        let provider = Arc::new(CachedTemplateProvider::new(store, small_catalog()));

        let loader = {
            let provider = Arc::clone(&provider);
            thread::spawn(move || {
                provider
                    .template(&project(), TemplateKind::LogicAnd)
                    .unwrap()
            })
        };

        read_rx.recv().unwrap();
        provider.store().inner.customize(&project(), and_template(" new "));
        provider.invalidate(&project(), TemplateKind::LogicAnd);
        release_tx.send(()).unwrap();

        assert_eq!(loader.join().unwrap().code, " old ");
        assert_eq!(provider.cached_len(), 0);
        let current = provider.template(&project(), TemplateKind::LogicAnd).unwrap();
        assert_eq!(current.code, " new ");
    }

    #[test]
    fn cached_templates_are_shared() {
        let provider = CachedTemplateProvider::new(InMemoryTemplateStore::new(), small_catalog());
        let a = provider.template(&project(), TemplateKind::Code).unwrap();
        let b = provider.template(&project(), TemplateKind::Code).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
