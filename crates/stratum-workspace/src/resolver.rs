//! Config resolution
//!
//! Given a source file, find the governing config: walk ancestors for
//! candidates, try direct file-list membership first, then indirect
//! membership through project-reference chains, with deterministic
//! ranking and cycle-safe chain expansion.

use std::cmp::Ordering;
use std::collections::VecDeque;
use std::sync::Arc;

use camino::Utf8Path;
use camino::Utf8PathBuf;
use rustc_hash::FxHashSet;

use crate::config::ParsedConfig;
use crate::fs::FileType;
use crate::paths::normalize_path;
use crate::workspace::Workspace;
use crate::workspace::ROOT_CONFIG_NAMES;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchKind {
    /// The file appears in the config's resolved file list.
    Direct,
    /// The file was previously recorded in the project's asked-files set.
    Indirect,
}

fn is_file_in_dir(file: &Utf8Path, dir: &Utf8Path) -> bool {
    file.starts_with(dir)
}

/// Strict total order over config candidates for one queried file:
/// containment beats non-containment, deeper directory beats shallower,
/// and at equal depth `tsconfig.json` beats `jsconfig.json`.
#[must_use]
pub fn sort_configs(file: &Utf8Path, a: &Utf8Path, b: &Utf8Path) -> Ordering {
    let in_a = a.parent().is_some_and(|dir| is_file_in_dir(file, dir));
    let in_b = b.parent().is_some_and(|dir| is_file_in_dir(file, dir));
    if in_a != in_b {
        return in_b.cmp(&in_a);
    }

    let depth_a = a.components().count();
    let depth_b = b.components().count();
    if depth_a != depth_b {
        return depth_b.cmp(&depth_a);
    }

    let ts_a = a.file_name() == Some("tsconfig.json");
    let ts_b = b.file_name() == Some("tsconfig.json");
    ts_b.cmp(&ts_a).then_with(|| a.cmp(b))
}

impl Workspace {
    /// Locate the governing config for `file`, or absent when resolution
    /// falls through to the inferred project.
    pub async fn find_match_config(&self, file: &Utf8Path) -> Option<Utf8PathBuf> {
        let file = normalize_path(file);

        self.search_ancestor_dirs(&file).await;
        self.prepare_closest_root_config(&file).await;

        if let Some(config) = self.find_config(&file, MatchKind::Direct).await {
            return Some(config);
        }
        self.find_config(&file, MatchKind::Indirect).await
    }

    /// Walk ancestor directories collecting root-config candidates,
    /// stopping at directories a previous resolution already covered.
    async fn search_ancestor_dirs(&self, file: &Utf8Path) {
        let mut dir = file.parent();
        while let Some(current) = dir {
            if !self.searched_dirs.insert(current.to_path_buf()) {
                break;
            }
            for name in ROOT_CONFIG_NAMES {
                let candidate = current.join(name);
                if self.fs.stat(&candidate).await == Some(FileType::File) {
                    self.root_configs.insert(candidate);
                }
            }
            dir = current.parent();
        }
    }

    /// Force-parse the best-ranked candidate containing the file so its
    /// project (and reference chains) exist before the match passes run.
    async fn prepare_closest_root_config(&self, file: &Utf8Path) {
        let mut matches: Vec<Utf8PathBuf> = self
            .root_configs
            .iter()
            .filter(|config| {
                config
                    .parent()
                    .is_some_and(|dir| is_file_in_dir(file, dir))
            })
            .map(|config| config.clone())
            .collect();

        matches.sort_by(|a, b| sort_configs(file, a, b));

        // a candidate that fails to parse must not block its siblings
        for candidate in &matches {
            if self
                .get_or_create_project(candidate)
                .parsed_config()
                .await
                .is_some()
            {
                break;
            }
        }
    }

    async fn find_config(&self, file: &Utf8Path, kind: MatchKind) -> Option<Utf8PathBuf> {
        let mut checked: FxHashSet<Utf8PathBuf> = FxHashSet::default();

        let mut roots: Vec<Utf8PathBuf> =
            self.root_configs.iter().map(|config| config.clone()).collect();
        roots.sort_by(|a, b| sort_configs(file, a, b));

        for root in roots {
            // only candidates whose project already exists participate;
            // the prepare step created the closest one
            let Some(project) = self.projects.get(&root) else {
                continue;
            };
            let Some(parsed) = project.parsed_config().await else {
                continue;
            };

            let mut chains = self.reference_chains(&parsed).await;
            if self.settings.reverse_config_file_priority {
                chains.reverse();
            }

            for chain in chains {
                for config in chain.iter().rev() {
                    if !checked.insert(config.clone()) {
                        continue;
                    }
                    if self.matches(file, config, kind).await {
                        return Some(config.clone());
                    }
                }
            }
        }
        None
    }

    async fn matches(&self, file: &Utf8Path, config: &Utf8Path, kind: MatchKind) -> bool {
        match kind {
            MatchKind::Direct => {
                let project = self.get_or_create_project(config);
                project
                    .parsed_config()
                    .await
                    .is_some_and(|parsed| parsed.file_names.iter().any(|name| name == file))
            }
            MatchKind::Indirect => self
                .projects
                .get(config)
                .is_some_and(|project| project.was_asked(file)),
        }
    }

    /// Expand a config's project references into root-to-leaf path chains.
    ///
    /// An explicit worklist carries the "chain so far" per branch, so
    /// concurrent branches never alias each other's history. A reference
    /// that revisits a config already on the chain is a cycle: the branch
    /// truncates at the repeated node, retaining the partial chain.
    pub(crate) async fn reference_chains(
        &self,
        root: &Arc<ParsedConfig>,
    ) -> Vec<Vec<Utf8PathBuf>> {
        let mut chains = Vec::new();
        let mut work: VecDeque<(Arc<ParsedConfig>, Vec<Utf8PathBuf>)> = VecDeque::new();
        work.push_back((root.clone(), Vec::new()));

        while let Some((parsed, before)) = work.pop_front() {
            if parsed.project_references.is_empty() {
                let mut chain = before;
                chain.push(parsed.config_path.clone());
                chains.push(chain);
                continue;
            }

            for reference in &parsed.project_references {
                let config_path = self.normalize_reference(reference).await;

                if let Some(repeat) = before.iter().position(|c| *c == config_path) {
                    chains.push(before[..repeat.max(1)].to_vec());
                    continue;
                }

                let project = self.get_or_create_project(&config_path);
                if let Some(ref_parsed) = project.parsed_config().await {
                    let mut next = before.clone();
                    next.push(parsed.config_path.clone());
                    work.push_back((ref_parsed, next));
                }
            }
        }
        chains
    }

    /// A reference pointing at a directory is normalized by probing
    /// `tsconfig.json`, then `jsconfig.json`, inside it.
    async fn normalize_reference(&self, reference: &Utf8Path) -> Utf8PathBuf {
        let reference = normalize_path(reference);
        if self.fs.stat(&reference).await == Some(FileType::Directory) {
            for name in ROOT_CONFIG_NAMES {
                let candidate = reference.join(name);
                if self.fs.stat(&candidate).await == Some(FileType::File) {
                    return candidate;
                }
            }
        }
        reference
    }
}
