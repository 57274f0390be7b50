//! Feature Composer - main application orchestrator.
//!
//! Fresh composition:
//! 1. Validate the selection and compute the plan (tokens, steps, finishing)
//! 2. Copy `base` into a staging directory next to the destination
//! 3. Per feature: fragments, structural mutations, additive mutations, env
//! 4. Finishing mutations, then token substitution
//! 5. Publish by renaming staging onto the destination, then write the manifest
//! 6. Install packages and format, neither of which can fail the run
//!
//! Incremental mode runs the same pipeline in place for one feature.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::application::ApplicationError;
use crate::application::ports::{
    CodeFormatter, DependencyResolver, Filesystem, FragmentStore, ManifestStore, PackageInstaller,
};
use crate::application::services::env_service::EnvService;
use crate::application::services::fragment_service::FragmentService;
use crate::application::services::mutation_service::{MutationOutcome, SourceMutator};
use crate::application::services::token_service::{SubstitutionStats, TokenService};
use crate::domain::{
    CompositionPlan, DomainError, Feature, FeatureSelection, FeatureSlot, FeatureStep,
    PlannedMutation, ProjectManifest, Stack, paths,
};
use crate::error::{WeldError, WeldResult};

/// Post-publish steps to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComposeOptions {
    pub install: bool,
    pub format: bool,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            install: true,
            format: true,
        }
    }
}

/// What a composition did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositionReport {
    pub destination: PathBuf,
    pub manifest: ProjectManifest,
    /// Features whose step ran, in priority order.
    pub features: Vec<Feature>,
    pub fragments: Vec<String>,
    /// Mutations that rewrote a file.
    pub applied: Vec<String>,
    /// Mutations whose marker was already present.
    pub skipped: Vec<String>,
    pub env_keys: Vec<String>,
    pub substitution: SubstitutionStats,
    pub packages: Vec<String>,
    pub installed: bool,
    pub warnings: Vec<String>,
}

/// Running record of a pipeline, kept for reports and failure context.
#[derive(Debug, Default)]
struct Progress {
    fragments: Vec<String>,
    applied: Vec<String>,
    skipped: Vec<String>,
    env_keys: Vec<String>,
    /// Files written so far, relative to the project root.
    touched: BTreeSet<PathBuf>,
    /// Action in flight and the file it touches.
    current: Option<(String, String)>,
}

impl Progress {
    fn begin(&mut self, action: impl Into<String>, file: impl Into<String>) {
        self.current = Some((action.into(), file.into()));
    }

    fn done(&mut self) {
        self.current = None;
    }

    fn touch(&mut self, file: impl Into<PathBuf>) {
        self.touched.insert(file.into());
    }
}

pub struct FeatureComposer {
    filesystem: Arc<dyn Filesystem>,
    fragments: FragmentService,
    tokens: TokenService,
    env: EnvService,
    mutator: SourceMutator,
    manifests: Arc<dyn ManifestStore>,
    resolver: Arc<dyn DependencyResolver>,
    installer: Option<Arc<dyn PackageInstaller>>,
    formatter: Option<Arc<dyn CodeFormatter>>,
}

impl FeatureComposer {
    pub fn new(
        filesystem: Arc<dyn Filesystem>,
        store: Arc<dyn FragmentStore>,
        manifests: Arc<dyn ManifestStore>,
        resolver: Arc<dyn DependencyResolver>,
    ) -> Self {
        Self {
            fragments: FragmentService::new(store, filesystem.clone()),
            tokens: TokenService::new(filesystem.clone()),
            env: EnvService::new(filesystem.clone()),
            mutator: SourceMutator::new(filesystem.clone()),
            filesystem,
            manifests,
            resolver,
            installer: None,
            formatter: None,
        }
    }

    pub fn with_installer(mut self, installer: Arc<dyn PackageInstaller>) -> Self {
        self.installer = Some(installer);
        self
    }

    pub fn with_formatter(mut self, formatter: Arc<dyn CodeFormatter>) -> Self {
        self.formatter = Some(formatter);
        self
    }

    /// Compute a fresh plan without touching the filesystem.
    pub fn plan(
        &self,
        stack: Stack,
        project_name: &str,
        selection: FeatureSelection,
    ) -> WeldResult<CompositionPlan> {
        Ok(CompositionPlan::fresh(stack, project_name, selection)?)
    }

    /// Packages a plan installs: base packages on a fresh run, then each
    /// feature's, deduplicated in first-seen order.
    pub fn packages(&self, plan: &CompositionPlan) -> Vec<String> {
        let mut out = if plan.is_fresh() {
            self.resolver.base_packages(plan.stack)
        } else {
            Vec::new()
        };
        for feature in plan.features() {
            for package in self.resolver.packages(plan.stack, feature) {
                if !out.contains(&package) {
                    out.push(package);
                }
            }
        }
        out
    }

    /// Fragment ids the store offers for `stack`.
    pub fn fragments(&self, stack: Stack) -> WeldResult<Vec<String>> {
        self.fragments.available(stack)
    }

    /// Create a new project at `destination`.
    ///
    /// The project name is the destination's last path component.
    #[instrument(
        skip_all,
        fields(stack = %stack, selection = %selection, destination = %destination.display())
    )]
    pub fn compose(
        &self,
        stack: Stack,
        selection: FeatureSelection,
        destination: &Path,
        options: ComposeOptions,
    ) -> WeldResult<CompositionReport> {
        if self.filesystem.exists(destination) {
            return Err(ApplicationError::DestinationExists {
                path: destination.to_path_buf(),
            }
            .into());
        }

        let project_name = project_name_of(destination)?;
        let plan = CompositionPlan::fresh(stack, &project_name, selection)?;
        info!(
            features = plan.steps.len(),
            mutations = plan.mutations().count(),
            "Composition planned"
        );

        let staging = staging_path(destination);
        let mut progress = Progress::default();
        let substitution = match self.stage(&plan, &staging, destination, &mut progress) {
            Ok(stats) => stats,
            Err(e) => {
                warn!(error = %e, staging = %staging.display(), "Composition failed, discarding staging");
                self.discard(&staging);
                return Err(e);
            }
        };
        info!("Project published");

        let manifest = ProjectManifest::new(plan.stack, plan.project_name.clone(), &plan.selection);
        if let Err(e) = self.manifests.save(destination, &manifest) {
            warn!(error = %e, "Manifest write failed, removing published project");
            self.discard(destination);
            return Err(e);
        }

        let mut report = self.report(&plan, destination, manifest, progress, substitution);
        self.finish(&plan, destination, options, &mut report);
        Ok(report)
    }

    /// Add one feature to an existing project, in place.
    ///
    /// There is no staging: a failure part way leaves earlier mutations on
    /// disk and is reported as `IncompleteFeature`. Running the same command
    /// again skips whatever already ran.
    #[instrument(skip_all, fields(destination = %destination.display(), slot = %slot, variant = %variant))]
    pub fn add_feature(
        &self,
        destination: &Path,
        slot: FeatureSlot,
        variant: &str,
        options: ComposeOptions,
    ) -> WeldResult<CompositionReport> {
        let manifest = self.manifests.load(destination)?;
        let mut selection =
            manifest
                .selection()
                .map_err(|e| ApplicationError::ManifestInvalid {
                    path: destination.join(crate::domain::MANIFEST_FILE),
                    reason: e.to_string(),
                })?;

        if selection.is_enabled(slot) {
            return Err(ApplicationError::FeatureAlreadyEnabled {
                slot: slot.to_string(),
                current: selection.get(slot).to_string(),
            }
            .into());
        }

        selection.set(slot, variant)?;
        let feature = selection.feature(slot).ok_or_else(|| DomainError::InvalidFeature {
            slot: slot.to_string(),
            value: variant.to_string(),
            allowed: slot.variants().into_iter().skip(1).collect(),
        })?;

        let plan = CompositionPlan::incremental(
            manifest.stack,
            &manifest.project_name,
            selection,
            feature,
        )?;
        info!(feature = %feature, "Adding feature");

        let mut progress = Progress::default();
        let substitution = match self.build(&plan, destination, &mut progress) {
            Ok(stats) => stats,
            Err(e) => return Err(incomplete(feature, progress, e)),
        };

        let amended =
            ProjectManifest::new(manifest.stack, manifest.project_name.clone(), &plan.selection);
        if let Err(e) = self.manifests.save(destination, &amended) {
            progress.begin("manifest update", crate::domain::MANIFEST_FILE);
            return Err(incomplete(feature, progress, e));
        }

        let mut report = self.report(&plan, destination, amended, progress, substitution);
        self.finish(&plan, destination, options, &mut report);
        Ok(report)
    }

    // -------------------------------------------------------------------------
    // Internal Helpers
    // -------------------------------------------------------------------------

    /// Build into staging and publish.
    fn stage(
        &self,
        plan: &CompositionPlan,
        staging: &Path,
        destination: &Path,
        progress: &mut Progress,
    ) -> WeldResult<SubstitutionStats> {
        self.filesystem.create_dir_all(staging)?;
        let stats = self.build(plan, staging, progress)?;
        self.filesystem.rename(staging, destination)?;
        Ok(stats)
    }

    fn build(
        &self,
        plan: &CompositionPlan,
        root: &Path,
        progress: &mut Progress,
    ) -> WeldResult<SubstitutionStats> {
        if let Some(base) = plan.base_fragment {
            progress.begin(format!("copy fragment {base}"), ".");
            self.fragments.install(plan.stack, base, root, false)?;
            progress.fragments.push(base.to_string());
            progress.done();
        }

        for step in &plan.steps {
            self.run_step(plan.stack, step, root, progress)?;
        }

        if !plan.finishing.is_empty() {
            info!(count = plan.finishing.len(), "Running finishing mutations");
        }
        for planned in &plan.finishing {
            self.run_mutation(root, planned, progress)?;
        }

        // In place, only files this run wrote are ours to rewrite.
        progress.begin("token substitution", ".");
        let stats = if plan.is_fresh() {
            self.tokens.substitute(root, &plan.tokens)?
        } else {
            let files: Vec<PathBuf> = progress.touched.iter().cloned().collect();
            self.tokens.substitute_files(root, &files, &plan.tokens)?
        };
        progress.done();
        info!(
            scanned = stats.scanned,
            rewritten = stats.rewritten,
            "Tokens substituted"
        );
        Ok(stats)
    }

    fn run_step(
        &self,
        stack: Stack,
        step: &FeatureStep,
        root: &Path,
        progress: &mut Progress,
    ) -> WeldResult<()> {
        info!(feature = %step.feature, "Composing feature");

        for id in &step.fragments {
            progress.begin(format!("copy fragment {id}"), ".");
            let fragment = self.fragments.resolve(stack, id)?;
            self.fragments.materialize(&fragment, root, true)?;
            for file in &fragment.files {
                progress.touch(&file.path);
            }
            progress.fragments.push(id.to_string());
            progress.done();
        }

        for planned in step.mutations() {
            self.run_mutation(root, planned, progress)?;
        }

        if !step.env.is_empty() {
            for file in paths::ENV_FILES {
                progress.begin("env merge", *file);
                self.env.merge(&root.join(file), &step.env)?;
                progress.touch(*file);
                progress.done();
            }
            progress
                .env_keys
                .extend(step.env.iter().map(|v| v.key.clone()));
        }

        Ok(())
    }

    fn run_mutation(
        &self,
        root: &Path,
        planned: &PlannedMutation,
        progress: &mut Progress,
    ) -> WeldResult<()> {
        let name = planned.name();
        progress.begin(name.clone(), planned.target);
        progress.touch(planned.target);
        match self.mutator.apply(root, planned)? {
            MutationOutcome::Applied => progress.applied.push(name),
            MutationOutcome::AlreadyApplied => progress.skipped.push(name),
        }
        progress.done();
        Ok(())
    }

    fn report(
        &self,
        plan: &CompositionPlan,
        destination: &Path,
        manifest: ProjectManifest,
        progress: Progress,
        substitution: SubstitutionStats,
    ) -> CompositionReport {
        CompositionReport {
            destination: destination.to_path_buf(),
            manifest,
            features: plan.features(),
            fragments: progress.fragments,
            applied: progress.applied,
            skipped: progress.skipped,
            env_keys: progress.env_keys,
            substitution,
            packages: self.packages(plan),
            installed: false,
            warnings: Vec::new(),
        }
    }

    /// Install and format. Neither can fail the run.
    fn finish(
        &self,
        plan: &CompositionPlan,
        destination: &Path,
        options: ComposeOptions,
        report: &mut CompositionReport,
    ) {
        if options.install && !report.packages.is_empty() {
            if let Some(installer) = &self.installer {
                info!(packages = report.packages.len(), "Installing packages");
                match installer.install(&report.packages, destination) {
                    Ok(()) => report.installed = true,
                    Err(e) => {
                        warn!(error = %e, "Package installation failed");
                        report
                            .warnings
                            .push(format!("package installation failed: {e}"));
                    }
                }
            }
        }

        if options.format {
            if let Some(formatter) = &self.formatter {
                if let Err(e) = formatter.format(destination) {
                    debug!(error = %e, stack = %plan.stack, "Formatter failed, ignoring");
                }
            }
        }
    }

    /// Best-effort removal of a staging directory.
    fn discard(&self, staging: &Path) {
        if !self.filesystem.exists(staging) {
            return;
        }
        if let Err(e) = self.filesystem.remove_dir_all(staging) {
            warn!(error = %e, path = %staging.display(), "Staging cleanup failed");
        }
    }
}

fn project_name_of(destination: &Path) -> WeldResult<String> {
    destination
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            DomainError::InvalidProjectName {
                name: destination.display().to_string(),
                reason: "destination has no final path component".into(),
            }
            .into()
        })
}

/// Uniquely named sibling of `destination`, so the final rename stays on
/// one filesystem.
fn staging_path(destination: &Path) -> PathBuf {
    let name = format!(".weld-staging-{}", Uuid::new_v4().simple());
    match destination.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

fn incomplete(feature: Feature, progress: Progress, err: WeldError) -> WeldError {
    let (mutation, file) = progress
        .current
        .unwrap_or_else(|| ("unknown".into(), ".".into()));
    let reason = match &err {
        WeldError::Application(ApplicationError::MutationFailed { source, .. }) => {
            source.to_string()
        }
        other => other.to_string(),
    };
    ApplicationError::IncompleteFeature {
        feature: feature.to_string(),
        mutation,
        file,
        reason,
        applied: progress.applied,
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{
        MockCodeFormatter, MockDependencyResolver, MockPackageInstaller,
    };
    use crate::application::services::CatalogDependencyResolver;
    use crate::application::testing::{MemoryFs, MemoryManifests, StaticStore};
    use crate::domain::{Cache, FragmentFile};

    const MAIN: &str = "from fastapi import FastAPI\n\nfrom app.core.config import settings\nfrom app.routers.main import api_router\n\napp = FastAPI(title=settings.PROJECT_NAME)\n\napp.include_router(api_router)\n";
    const CONFIG: &str = "class Settings(BaseSettings):\n    PROJECT_NAME: str = \"__PROJECT_NAME__\"\n\n__DATABASE_BLOCK__\n\n__AUTH_BLOCK__\n\n__CACHE_BLOCK__\n\n__TASK_QUEUE_BLOCK__\n\n__OBSERVABILITY_BLOCK__\n";

    fn store() -> StaticStore {
        StaticStore::new()
            .with(
                "base",
                vec![
                    FragmentFile::new("app/main.py", MAIN),
                    FragmentFile::new("app/core/config.py", CONFIG),
                    FragmentFile::new(".env", "PROJECT_NAME=__PROJECT_NAME__\n"),
                    FragmentFile::new(".env.example", "PROJECT_NAME=__PROJECT_NAME__\n"),
                ],
            )
            .with(
                "db_sqlmodel",
                vec![FragmentFile::new("app/core/db.py", "async def init_db():\n    pass\n")],
            )
            .with(
                "redis",
                vec![FragmentFile::new("app/core/redis.py", "redis_client = None\n")],
            )
    }

    struct Fixture {
        fs: Arc<MemoryFs>,
        manifests: Arc<MemoryManifests>,
        composer: FeatureComposer,
    }

    fn fixture_with(store: StaticStore) -> Fixture {
        let fs = Arc::new(MemoryFs::default());
        let manifests = Arc::new(MemoryManifests::default());
        let composer = FeatureComposer::new(
            fs.clone(),
            Arc::new(store),
            manifests.clone(),
            Arc::new(CatalogDependencyResolver),
        );
        Fixture {
            fs,
            manifests,
            composer,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(store())
    }

    fn selection(pairs: &[(&str, &str)]) -> FeatureSelection {
        FeatureSelection::from_pairs(pairs.iter().copied()).unwrap()
    }

    fn no_tools() -> ComposeOptions {
        ComposeOptions {
            install: false,
            format: false,
        }
    }

    #[test]
    fn compose_publishes_wired_project() {
        let f = fixture();
        let dest = Path::new("/work/shop");

        let report = f
            .composer
            .compose(
                Stack::FastApi,
                selection(&[("database", "sqlite"), ("cache", "redis")]),
                dest,
                no_tools(),
            )
            .unwrap();

        let main = f.fs.read("/work/shop/app/main.py").unwrap();
        assert_eq!(main.matches("async def lifespan(").count(), 1);
        assert!(main.contains("await init_db()"));
        assert!(main.contains("await init_redis()"));
        assert!(main.contains("@app.get(\"/health/cache\""));

        let env = f.fs.read("/work/shop/.env").unwrap();
        assert!(env.starts_with("PROJECT_NAME=shop\nDB_PATH=./shop.db\n"));
        assert!(env.contains("REDIS_URL="));

        let config = f.fs.read("/work/shop/app/core/config.py").unwrap();
        assert!(config.contains("    # auth settings: none"));
        assert!(config.contains("DB_PATH: str = \"./shop.db\""));

        assert_eq!(report.fragments, vec!["base", "db_sqlmodel", "redis"]);
        assert_eq!(report.skipped, vec!["lifespan-wrapper"]);
        assert_eq!(f.manifests.get(dest).unwrap().project_name, "shop");
        assert!(
            f.fs
                .paths()
                .iter()
                .all(|p| !p.to_string_lossy().contains(".weld-staging-"))
        );
    }

    #[test]
    fn existing_destination_is_rejected_before_staging() {
        let f = fixture();
        f.fs.put("/work/shop", "a file");

        let err = f
            .composer
            .compose(Stack::FastApi, FeatureSelection::new(), Path::new("/work/shop"), no_tools())
            .unwrap_err();

        assert!(matches!(
            err,
            WeldError::Application(ApplicationError::DestinationExists { .. })
        ));
        assert_eq!(f.fs.paths(), vec![PathBuf::from("/work/shop")]);
    }

    #[test]
    fn failure_discards_staging() {
        // No redis fragment: fails once base is staged.
        let store = StaticStore::new().with("base", vec![FragmentFile::new("app/main.py", MAIN)]);
        let f = fixture_with(store);

        let err = f
            .composer
            .compose(
                Stack::FastApi,
                selection(&[("cache", "redis")]),
                Path::new("/work/shop"),
                no_tools(),
            )
            .unwrap_err();

        assert!(matches!(
            err,
            WeldError::Application(ApplicationError::FragmentNotFound { .. })
        ));
        assert!(f.fs.paths().is_empty());
        assert!(f.manifests.get("/work/shop").is_none());
    }

    #[test]
    fn install_failure_is_a_warning() {
        let mut installer = MockPackageInstaller::new();
        installer.expect_install().times(1).returning(|_, _| {
            Err(ApplicationError::ProcessFailed {
                program: "uv".into(),
                reason: "not found".into(),
            }
            .into())
        });
        let mut formatter = MockCodeFormatter::new();
        formatter.expect_format().times(1).returning(|_| {
            Err(ApplicationError::ProcessFailed {
                program: "black".into(),
                reason: "exit 1".into(),
            }
            .into())
        });

        let f = fixture();
        let composer = f
            .composer
            .with_installer(Arc::new(installer))
            .with_formatter(Arc::new(formatter));

        let report = composer
            .compose(
                Stack::FastApi,
                selection(&[("database", "sqlite")]),
                Path::new("/work/shop"),
                ComposeOptions::default(),
            )
            .unwrap();

        assert!(!report.installed);
        assert_eq!(report.warnings.len(), 1);
        assert!(f.fs.exists(Path::new("/work/shop/app/main.py")));
    }

    #[test]
    fn resolver_is_asked_once_per_feature() {
        let mut resolver = MockDependencyResolver::new();
        resolver
            .expect_base_packages()
            .times(1)
            .returning(|_| vec!["fastapi".into()]);
        resolver
            .expect_packages()
            .times(2)
            .returning(|_, feature| match feature {
                Feature::Database(_) => vec!["sqlmodel".into(), "greenlet".into()],
                _ => vec!["redis".into(), "greenlet".into()],
            });

        let composer = FeatureComposer::new(
            Arc::new(MemoryFs::default()),
            Arc::new(store()),
            Arc::new(MemoryManifests::default()),
            Arc::new(resolver),
        );
        let plan = composer
            .plan(
                Stack::FastApi,
                "shop",
                selection(&[("cache", "redis"), ("database", "sqlite")]),
            )
            .unwrap();

        assert_eq!(
            composer.packages(&plan),
            vec!["fastapi", "sqlmodel", "greenlet", "redis"]
        );
    }

    #[test]
    fn add_feature_extends_project_in_place() {
        let f = fixture();
        let dest = Path::new("/work/shop");
        f.composer
            .compose(Stack::FastApi, selection(&[("database", "sqlite")]), dest, no_tools())
            .unwrap();

        let report = f
            .composer
            .add_feature(dest, FeatureSlot::Cache, "redis", no_tools())
            .unwrap();

        assert_eq!(report.features, vec![Feature::Cache(Cache::Redis)]);
        assert_eq!(report.packages, vec!["redis"]);
        let config = f.fs.read("/work/shop/app/core/config.py").unwrap();
        assert!(config.contains("    # cache settings\n    REDIS_URL"));
        assert!(!config.contains("cache settings: none"));
        assert!(f.fs.read("/work/shop/app/main.py").unwrap().contains("await close_redis()"));
        assert_eq!(
            f.manifests.get(dest).unwrap().variant(FeatureSlot::Cache),
            "redis"
        );

        let err = f
            .composer
            .add_feature(dest, FeatureSlot::Cache, "redis", no_tools())
            .unwrap_err();
        assert!(matches!(
            err,
            WeldError::Application(ApplicationError::FeatureAlreadyEnabled { .. })
        ));
    }

    #[test]
    fn partial_add_reports_applied_mutations() {
        let f = fixture();
        let dest = Path::new("/work/shop");
        f.composer
            .compose(Stack::FastApi, selection(&[("database", "sqlite")]), dest, no_tools())
            .unwrap();
        f.fs.put("/work/shop/app/core/config.py", "class Settings:\n    pass\n");

        let err = f
            .composer
            .add_feature(dest, FeatureSlot::Cache, "redis", no_tools())
            .unwrap_err();

        match err {
            WeldError::Application(ApplicationError::IncompleteFeature {
                feature,
                mutation,
                file,
                applied,
                ..
            }) => {
                assert_eq!(feature, "cache=redis");
                assert_eq!(mutation, "settings-section[cache]");
                assert_eq!(file, "app/core/config.py");
                assert_eq!(
                    applied,
                    vec!["lifecycle-hook[cache]", "health-endpoint[/health/cache]"]
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(
            f.manifests.get(dest).unwrap().variant(FeatureSlot::Cache),
            "none"
        );
    }

    #[test]
    fn add_feature_rewrites_only_files_it_wrote() {
        let f = fixture();
        let dest = Path::new("/work/shop");
        f.composer
            .compose(Stack::FastApi, selection(&[("database", "sqlite")]), dest, no_tools())
            .unwrap();
        f.fs.put_bytes("/work/shop/.venv/lib/pkg/LICENSE.txt", b"Copyright \xe9 2020\n");
        f.fs.put("/work/shop/docs/notes.md", "__PROJECT_NAME__ stays\n");

        let report = f
            .composer
            .add_feature(dest, FeatureSlot::Cache, "redis", no_tools())
            .unwrap();

        assert!(f.fs.read("/work/shop/app/main.py").unwrap().contains("await init_redis()"));
        assert_eq!(
            f.fs.read("/work/shop/docs/notes.md").as_deref(),
            Some("__PROJECT_NAME__ stays\n")
        );
        assert!(report.substitution.scanned > 0);
        assert_eq!(
            f.manifests.get(dest).unwrap().variant(FeatureSlot::Cache),
            "redis"
        );
    }

    #[test]
    fn add_feature_without_manifest_is_not_found() {
        let f = fixture();
        let err = f
            .composer
            .add_feature(Path::new("/work/shop"), FeatureSlot::Cache, "redis", no_tools())
            .unwrap_err();
        assert!(matches!(
            err,
            WeldError::Application(ApplicationError::ManifestNotFound { .. })
        ));
    }
}
