use crate::config::DiscoveryConfig;
use crate::error::{DiscoveryError, Result, SkipReason, SkippedFile};
use crate::model::{AgentRecord, EvalRecord, Registry};
use crate::scanner::{agent_identifier, relative_path, sibling_eval_candidates, AgentFileScanner};
use agentscan_analysis::{AgentMetadata, FileAnalysis};
use agentscan_identity::IdentityScope;
use agentscan_parser::{ParseError, SourceParser};
use serde::Serialize;
use std::any::Any;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell, Semaphore};
use tokio::task::JoinSet;

/// Outcome of one discovery run
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryReport {
    pub registry: Registry,
    /// Files left out, sorted by path; each was logged once
    pub skipped: Vec<SkippedFile>,
}

struct DiscoveryContext {
    root: PathBuf,
    agent_root: PathBuf,
    config: DiscoveryConfig,
    parser: SourceParser,
    scope: IdentityScope,
    /// Sibling eval file per agent directory, loaded at most once
    siblings: Mutex<HashMap<PathBuf, SiblingSlot>>,
}

/// Evals registered in a sibling eval file
struct SiblingEvals {
    relative: String,
    analysis: FileAnalysis,
}

type SiblingSlot = Arc<OnceCell<Option<Arc<SiblingEvals>>>>;

#[derive(Debug, Clone, Copy)]
enum FileRole {
    Agent,
    Eval,
}

#[derive(Default)]
struct FileOutcome {
    record: Option<AgentRecord>,
    skipped: Vec<SkippedFile>,
}

/// Discover every agent and eval under `root`.
///
/// Per-file failures are logged and listed in the report; only an unusable root or config is
/// an error. Dropping the returned future cancels outstanding work and publishes nothing.
pub async fn discover(
    root: impl AsRef<Path>,
    project_id: &str,
    deployment_id: &str,
    config: &DiscoveryConfig,
) -> Result<DiscoveryReport> {
    config.validate()?;
    let root = root.as_ref();
    let metadata = tokio::fs::metadata(root)
        .await
        .map_err(|e| DiscoveryError::InvalidRoot(format!("{}: {e}", root.display())))?;
    if !metadata.is_dir() {
        return Err(DiscoveryError::InvalidRoot(format!(
            "{} is not a directory",
            root.display()
        )));
    }

    let scope = IdentityScope::new(project_id, deployment_id);
    let agent_root = root.join(&config.agent_dir);
    if !is_dir(&agent_root).await {
        log::info!("No agent directory at {}", agent_root.display());
        return Ok(DiscoveryReport {
            registry: Registry::new(scope, Vec::new()),
            skipped: Vec::new(),
        });
    }

    let ctx = Arc::new(DiscoveryContext {
        root: root.to_path_buf(),
        agent_root,
        config: config.clone(),
        parser: SourceParser::new(config.parser.clone()),
        scope,
        siblings: Mutex::new(HashMap::new()),
    });

    let files = {
        let ctx = Arc::clone(&ctx);
        tokio::task::spawn_blocking(move || AgentFileScanner::new(&ctx.agent_root, &ctx.config).scan())
            .await
            .map_err(|e| DiscoveryError::Task(format!("scan failed: {e}")))?
    };

    let semaphore = Arc::new(Semaphore::new(ctx.config.concurrency));
    let mut tasks = JoinSet::new();
    for path in files {
        let ctx = Arc::clone(&ctx);
        let semaphore = Arc::clone(&semaphore);
        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok();
            process_agent_file(&ctx, &path).await
        });
    }

    let mut agents = Vec::new();
    let mut skipped = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        let outcome = joined.map_err(|e| DiscoveryError::Task(e.to_string()))?;
        agents.extend(outcome.record);
        skipped.extend(outcome.skipped);
    }

    skipped.sort_by(|a, b| a.path.cmp(&b.path));

    let registry = Registry::new(ctx.scope.clone(), agents);
    log::info!(
        "Discovered {} agents with {} evals; skipped {} files",
        registry.len(),
        registry.evals().count(),
        skipped.len()
    );

    Ok(DiscoveryReport { registry, skipped })
}

async fn process_agent_file(ctx: &Arc<DiscoveryContext>, path: &Path) -> FileOutcome {
    let relative = relative_path(&ctx.root, path);
    let analysis = match load_and_analyze(ctx, path, &relative, FileRole::Agent).await {
        Ok(analysis) => analysis,
        Err(skipped) => {
            return FileOutcome {
                record: None,
                skipped: vec![skipped],
            }
        }
    };

    let Some(agent) = analysis.agent.clone() else {
        log::debug!("No agent declaration in {relative}");
        return FileOutcome::default();
    };

    let mut outcome = FileOutcome::default();
    let sibling = sibling_evals(ctx, path, &mut outcome.skipped).await;

    outcome.record = Some(build_record(
        ctx,
        path,
        &relative,
        agent,
        &analysis,
        sibling.as_deref(),
    ));
    outcome
}

/// Sibling evals for the agent at `agent_path`.
///
/// Agents sharing a directory share one load; only the agent that performed it reports a
/// failure, so each broken sibling file is logged and listed once.
async fn sibling_evals(
    ctx: &Arc<DiscoveryContext>,
    agent_path: &Path,
    skipped: &mut Vec<SkippedFile>,
) -> Option<Arc<SiblingEvals>> {
    let dir = agent_path.parent()?.to_path_buf();
    let slot = Arc::clone(ctx.siblings.lock().await.entry(dir).or_default());

    let mut failure = None;
    let failure_slot = &mut failure;
    let loaded = slot
        .get_or_init(move || load_sibling_evals(ctx, agent_path, failure_slot))
        .await
        .clone();
    skipped.extend(failure);
    loaded
}

async fn load_sibling_evals(
    ctx: &Arc<DiscoveryContext>,
    agent_path: &Path,
    failure: &mut Option<SkippedFile>,
) -> Option<Arc<SiblingEvals>> {
    let sibling_path = find_sibling_eval_file(ctx, agent_path).await?;
    let relative = relative_path(&ctx.root, &sibling_path);
    match load_and_analyze(ctx, &sibling_path, &relative, FileRole::Eval).await {
        Ok(analysis) => Some(Arc::new(SiblingEvals { relative, analysis })),
        Err(skipped) => {
            *failure = Some(skipped);
            None
        }
    }
}

async fn load_and_analyze(
    ctx: &Arc<DiscoveryContext>,
    path: &Path,
    relative: &str,
    role: FileRole,
) -> std::result::Result<FileAnalysis, SkippedFile> {
    let unreadable = |message: String| SkippedFile::logged(relative, SkipReason::Unreadable { message });

    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| unreadable(e.to_string()))?;
    if metadata.len() > ctx.config.max_file_bytes {
        return Err(SkippedFile::logged(
            relative,
            SkipReason::TooLarge {
                bytes: metadata.len(),
                limit: ctx.config.max_file_bytes,
            },
        ));
    }

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| unreadable(e.to_string()))?;
    let source = String::from_utf8(bytes).map_err(|e| unreadable(format!("not valid UTF-8: {e}")))?;

    let parser = ctx.parser.clone();
    let stack_bytes = ctx.config.parser.required_stack_bytes();
    let path = path.to_path_buf();
    let joined = tokio::task::spawn_blocking(move || {
        run_on_analysis_thread(stack_bytes, move || {
            let module = parser.parse_path(source, &path)?;
            Ok::<_, ParseError>(match role {
                FileRole::Agent => FileAnalysis::of_agent_file(&module),
                FileRole::Eval => FileAnalysis::of_eval_file(&module),
            })
        })
    })
    .await;

    match joined {
        Ok(Ok(Ok(analysis))) => Ok(analysis),
        Ok(Ok(Err(e))) => Err(SkippedFile::logged(
            relative,
            SkipReason::Unparseable {
                message: e.to_string(),
            },
        )),
        Ok(Err(reason)) => Err(SkippedFile::logged(relative, reason)),
        Err(e) => Err(SkippedFile::logged(
            relative,
            SkipReason::Crashed {
                message: e.to_string(),
            },
        )),
    }
}

/// Run `job` on its own thread with a stack that fits the recursive passes over the module
fn run_on_analysis_thread<T, F>(stack_bytes: usize, job: F) -> std::result::Result<T, SkipReason>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let handle = std::thread::Builder::new()
        .name("agentscan-analysis".to_string())
        .stack_size(stack_bytes)
        .spawn(job)
        .map_err(|e| SkipReason::Crashed {
            message: format!("failed to start analysis thread: {e}"),
        })?;
    handle.join().map_err(|panic| SkipReason::Crashed {
        message: panic_message(panic.as_ref()),
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "analysis panicked".to_string()
    }
}

async fn find_sibling_eval_file(ctx: &DiscoveryContext, agent_path: &Path) -> Option<PathBuf> {
    for candidate in sibling_eval_candidates(agent_path, &ctx.config) {
        if tokio::fs::metadata(&candidate)
            .await
            .is_ok_and(|meta| meta.is_file())
        {
            return Some(candidate);
        }
    }
    None
}

fn build_record(
    ctx: &DiscoveryContext,
    agent_path: &Path,
    relative: &str,
    agent: AgentMetadata,
    analysis: &FileAnalysis,
    sibling: Option<&SiblingEvals>,
) -> AgentRecord {
    let scope = &ctx.scope;
    let stable_id = scope.agent_stable_id(&agent.declared_name);
    let build_id = scope.agent_build_id(relative, &analysis.content_version);

    let inline = analysis
        .evals
        .iter()
        .map(|eval| (relative, &analysis.content_version, eval));
    let from_sibling = sibling.into_iter().flat_map(|sibling| {
        sibling.analysis.evals.iter().map(move |eval| {
            (
                sibling.relative.as_str(),
                &sibling.analysis.content_version,
                eval,
            )
        })
    });

    let evals = inline
        .chain(from_sibling)
        .map(|(source_path, content_version, eval)| EvalRecord {
            build_id: scope.eval_build_id(source_path, &eval.name, content_version),
            stable_id: scope.eval_stable_id(&stable_id, &eval.name),
            name: eval.name.clone(),
            source_path: source_path.to_string(),
            content_version: content_version.clone(),
            description: eval.description.clone(),
            owning_agent_stable_id: stable_id.clone(),
        })
        .collect();

    AgentRecord {
        source_path: relative.to_string(),
        declared_name: agent.declared_name,
        build_id,
        stable_id,
        content_version: analysis.content_version.clone(),
        identifier: agent_identifier(&ctx.agent_root, agent_path),
        description: agent.description,
        input_schema_source: agent.input_schema_source,
        output_schema_source: agent.output_schema_source,
        evals,
    }
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .is_ok_and(|meta| meta.is_dir())
}
