//! CLI Common Utilities
//!
//! Builds the content source, LLM capabilities and orchestrator from the
//! resolved configuration, so command handlers only deal with their own flow.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Runtime;
use tracing::info;

use crate::ai::{ResilientParser, SharedProvider, create_provider};
use crate::capability::{
    LlmDocumentationGenerator, LlmTranslator, LlmVerificationOracle, SharedContentSource,
};
use crate::config::{Config, ConfigLoader, SourceKind};
use crate::orchestrator::Orchestrator;
use crate::source::{GitHubContentSource, LocalContentSource, parse_repository};
use crate::types::{DocError, Result};

/// Command-line values that override the loaded configuration
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Local source root
    pub root: Option<std::path::PathBuf>,
    /// GitHub `owner/repo`; switches the source to GitHub
    pub repository: Option<String>,
    pub branch: Option<String>,
    pub provider: Option<String>,
    pub model: Option<String>,
}

impl Overrides {
    pub fn apply(&self, config: &mut Config) {
        if let Some(root) = &self.root {
            config.source.kind = SourceKind::Local;
            config.source.root = root.clone();
        }
        if let Some(repository) = &self.repository {
            config.source.kind = SourceKind::Github;
            config.source.repository = Some(repository.clone());
        }
        if let Some(branch) = &self.branch {
            config.source.branch = branch.clone();
        }
        if let Some(provider) = &self.provider {
            config.llm.provider = provider.clone();
        }
        if let Some(model) = &self.model {
            config.llm.model = Some(model.clone());
        }
    }
}

/// Command execution context
///
/// Everything a document/verify/list command needs, wired from one `Config`.
pub struct CommandContext {
    pub config: Config,
    pub orchestrator: Arc<Orchestrator>,
}

impl CommandContext {
    /// Load config, apply overrides and build the full pipeline
    pub fn load(overrides: &Overrides) -> Result<Self> {
        let mut config = ConfigLoader::load()?;
        overrides.apply(&mut config);
        config.validate()?;

        let source = build_source(&config)?;
        let provider = create_provider(&config.llm)?;
        info!(
            source = %source.describe(),
            provider = provider.name(),
            model = provider.model(),
            "Pipeline ready"
        );

        let orchestrator = build_orchestrator(&config, source, provider);
        Ok(Self {
            config,
            orchestrator: Arc::new(orchestrator),
        })
    }

    /// Load config and build only the content source
    pub fn load_source(overrides: &Overrides) -> Result<(Config, SharedContentSource)> {
        let mut config = ConfigLoader::load()?;
        overrides.apply(&mut config);
        config.validate()?;

        let source = build_source(&config)?;
        Ok((config, source))
    }

    pub fn extensions(&self) -> &[String] {
        &self.config.documentation.extensions
    }
}

/// Content source selected by `source.kind`
pub fn build_source(config: &Config) -> Result<SharedContentSource> {
    let source = &config.source;
    match source.kind {
        SourceKind::Local => Ok(Arc::new(LocalContentSource::new(&source.root))),
        SourceKind::Github => {
            let repository = source.repository.as_deref().unwrap_or_default();
            let (owner, repo) = parse_repository(repository).ok_or_else(|| {
                DocError::Config(format!(
                    "Invalid repository '{}', expected owner/repo",
                    repository
                ))
            })?;

            let mut github = GitHubContentSource::new(owner, repo, source.branch.clone())?
                .with_token(source.resolved_token());
            if let Some(api_base) = &source.api_base {
                github = github.with_api_base(api_base)?;
            }
            Ok(Arc::new(github))
        }
    }
}

/// Wire LLM-backed capabilities around one shared provider
pub fn build_orchestrator(
    config: &Config,
    source: SharedContentSource,
    provider: SharedProvider,
) -> Orchestrator {
    let timeout = Duration::from_secs(config.llm.timeout_secs);
    let max_chars = config.documentation.max_file_chars;

    Orchestrator::new(
        source,
        Arc::new(LlmDocumentationGenerator::new(
            Arc::clone(&provider),
            timeout,
            max_chars,
        )),
        Arc::new(LlmVerificationOracle::new(
            Arc::clone(&provider),
            timeout,
            max_chars,
        )),
        Arc::new(LlmTranslator::new(provider, timeout)),
    )
    .with_parser(ResilientParser::new(config.parser.raw_fallback_limit))
}

/// Runtime for commands that drive async work
pub fn runtime() -> Result<Runtime> {
    Runtime::new().map_err(DocError::Io)
}
