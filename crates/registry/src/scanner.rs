use crate::config::DiscoveryConfig;
use ignore::WalkBuilder;
use std::path::{Component, Path, PathBuf};

/// Finds agent source files under the agent directory
pub struct AgentFileScanner<'c> {
    agent_root: PathBuf,
    config: &'c DiscoveryConfig,
}

impl<'c> AgentFileScanner<'c> {
    pub fn new(agent_root: impl AsRef<Path>, config: &'c DiscoveryConfig) -> Self {
        Self {
            agent_root: agent_root.as_ref().to_path_buf(),
            config,
        }
    }

    /// Candidate agent files in lexicographic path order.
    ///
    /// Eval sibling files, declaration files, installed packages and build tool state are left
    /// out. Every other directory may hold an agent, whatever its name.
    pub fn scan(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();

        let root = self.agent_root.clone();
        let mut builder = WalkBuilder::new(&self.agent_root);
        builder
            .hidden(false)
            .git_ignore(self.config.respect_gitignore)
            .git_global(self.config.respect_gitignore)
            .git_exclude(self.config.respect_gitignore)
            .ignore(self.config.respect_gitignore)
            .require_git(false)
            .sort_by_file_name(|a, b| a.cmp(b));
        builder.filter_entry(move |entry| !is_ignored_scope(entry.path(), &root));

        for result in builder.build() {
            match result {
                Ok(entry) => {
                    let Some(file_type) = entry.file_type() else {
                        continue;
                    };
                    if !file_type.is_file() {
                        continue;
                    }

                    let path = entry.path();
                    if !self.config.is_source_file(path) || is_declaration_file(path) {
                        continue;
                    }
                    if self.config.is_eval_file(path) {
                        log::debug!("Leaving eval file {} to its agent", path.display());
                        continue;
                    }

                    files.push(path.to_path_buf());
                }
                Err(e) => log::warn!("Failed to read entry: {e}"),
            }
        }

        files.sort();
        log::debug!("Found {} candidate agent files", files.len());
        files
    }
}

/// Sibling eval file candidates for an agent file, in extension priority order
pub(crate) fn sibling_eval_candidates(agent_file: &Path, config: &DiscoveryConfig) -> Vec<PathBuf> {
    let Some(dir) = agent_file.parent() else {
        return Vec::new();
    };
    config
        .extensions
        .iter()
        .map(|ext| dir.join(format!("{}.{ext}", config.eval_file_stem)))
        .collect()
}

/// `/`-separated path of `path` relative to `root`
pub(crate) fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Grouping key for an agent: its directory under the agent root, or its file stem when it
/// sits directly in the agent root
pub(crate) fn agent_identifier(agent_root: &Path, agent_file: &Path) -> String {
    let dir = agent_file
        .parent()
        .map(|parent| relative_path(agent_root, parent))
        .unwrap_or_default();
    if !dir.is_empty() {
        return dir;
    }
    agent_file
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn is_declaration_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(".d.ts") || name.ends_with(".d.mts"))
}

fn is_ignored_scope(path: &Path, root: &Path) -> bool {
    if let Ok(relative) = path.strip_prefix(root) {
        for component in relative.components() {
            if let Component::Normal(name) = component {
                let lowered = name.to_string_lossy().to_lowercase();
                if IGNORED_SCOPES.iter().any(|ignored| ignored == &lowered) {
                    return true;
                }
            }
        }
    }
    false
}

/// Directories that never contain user agents
const IGNORED_SCOPES: &[&str] = &["node_modules", ".agentuity", ".git"];

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"export {};").unwrap();
    }

    #[test]
    fn scans_sources_and_skips_eval_siblings() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        touch(&root.join("b/agent.ts"));
        touch(&root.join("b/eval.ts"));
        touch(&root.join("a/agent.ts"));
        touch(&root.join("a/helpers.js"));
        touch(&root.join("a/types.d.ts"));
        touch(&root.join("a/notes.md"));
        touch(&root.join("node_modules/pkg/index.js"));
        touch(&root.join(".agentuity/bundle/index.js"));
        touch(&root.join("standalone.ts"));

        let config = DiscoveryConfig::default();
        let files: Vec<String> = AgentFileScanner::new(root, &config)
            .scan()
            .iter()
            .map(|path| relative_path(root, path))
            .collect();

        assert_eq!(
            files,
            vec!["a/agent.ts", "a/helpers.js", "b/agent.ts", "standalone.ts"]
        );
    }

    #[test]
    fn build_like_agent_names_are_scanned() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        for name in ["build", "coverage", "dist", "__tests__", ".output"] {
            touch(&root.join(name).join("agent.ts"));
        }

        let config = DiscoveryConfig::default();
        let files: Vec<String> = AgentFileScanner::new(root, &config)
            .scan()
            .iter()
            .map(|path| relative_path(root, path))
            .collect();
        assert_eq!(
            files,
            vec![
                ".output/agent.ts",
                "__tests__/agent.ts",
                "build/agent.ts",
                "coverage/agent.ts",
                "dist/agent.ts",
            ]
        );
    }

    #[test]
    fn honours_gitignore_without_git_repo() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        touch(&root.join("keep/agent.ts"));
        touch(&root.join("generated/agent.ts"));
        fs::write(root.join(".gitignore"), b"generated/\n").unwrap();

        let config = DiscoveryConfig::default();
        let files: Vec<String> = AgentFileScanner::new(root, &config)
            .scan()
            .iter()
            .map(|path| relative_path(root, path))
            .collect();
        assert_eq!(files, vec!["keep/agent.ts"]);
    }

    #[test]
    fn identifiers_and_relative_paths() {
        let root = Path::new("/proj/src/agent");
        assert_eq!(
            agent_identifier(root, Path::new("/proj/src/agent/support/agent.ts")),
            "support"
        );
        assert_eq!(
            agent_identifier(root, Path::new("/proj/src/agent/team/billing/agent.ts")),
            "team/billing"
        );
        assert_eq!(agent_identifier(root, Path::new("/proj/src/agent/solo.ts")), "solo");
        assert_eq!(
            relative_path(Path::new("/proj"), Path::new("/proj/src/agent/solo.ts")),
            "src/agent/solo.ts"
        );
    }

    #[test]
    fn sibling_candidates_follow_extension_order() {
        let config = DiscoveryConfig::default();
        let candidates = sibling_eval_candidates(Path::new("/p/src/agent/a/agent.ts"), &config);
        assert_eq!(candidates[0], PathBuf::from("/p/src/agent/a/eval.ts"));
        assert_eq!(candidates[1], PathBuf::from("/p/src/agent/a/eval.tsx"));
    }
}
