//! Ancestry walking and execution planning.
//!
//! A project type inherits from at most one parent. Walking the chain from
//! the selected type upwards yields a [`Lineage`], from which two root-first
//! plans are derived:
//!
//! - the command plan, where each ancestor is included only if the link
//!   pointing *to* it has `run-commands` enabled;
//! - the file plan, where every ancestor is included.
//!
//! A gated link skips only that ancestor. Ancestors further up are still
//! visited and judged by their own incoming link.

use crate::config::{Config, FileEntry, ProjectType};
use crate::error::Error;
use crate::resolver::find_type;
use std::collections::HashSet;

/// One batch of work owned by a single project type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanStep<'a, T> {
    pub project_type: &'a ProjectType,
    pub items: &'a [T],
}

/// Ordered command batches, ancestors first
pub type CommandPlan<'a> = Vec<PlanStep<'a, String>>;

/// Ordered file batches, ancestors first
pub type FilePlan<'a> = Vec<PlanStep<'a, FileEntry>>;

#[derive(Debug, Clone)]
struct Link<'a> {
    project_type: &'a ProjectType,
    inherit_commands: bool,
}

/// The resolved ancestry of a project type, selected type first
#[derive(Debug, Clone)]
pub struct Lineage<'a> {
    links: Vec<Link<'a>>,
    issues: Vec<Error>,
}

impl<'a> Lineage<'a> {
    /// Types in the chain, starting with the selected type
    pub fn chain(&self) -> impl Iterator<Item = &'a ProjectType> + '_ {
        self.links.iter().map(|l| l.project_type)
    }

    /// Problems met while walking (missing parents, cycles)
    pub fn issues(&self) -> &[Error] {
        &self.issues
    }

    /// Commands to run, ancestors first
    pub fn command_plan(&self) -> CommandPlan<'a> {
        self.links
            .iter()
            .rev()
            .filter(|l| l.inherit_commands && !l.project_type.commands.is_empty())
            .map(|l| PlanStep {
                project_type: l.project_type,
                items: &l.project_type.commands,
            })
            .collect()
    }

    /// Files to materialize, ancestors first
    pub fn file_plan(&self) -> FilePlan<'a> {
        self.links
            .iter()
            .rev()
            .filter(|l| !l.project_type.files.is_empty())
            .map(|l| PlanStep {
                project_type: l.project_type,
                items: &l.project_type.files,
            })
            .collect()
    }
}

/// Walks parent chains within a catalog
#[derive(Debug, Clone, Copy)]
pub struct InheritanceWalker<'a> {
    config: &'a Config,
}

impl<'a> InheritanceWalker<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Resolve the full ancestry of `project_type`.
    ///
    /// Stops at the first type without a parent, at a parent that cannot be
    /// found, or at a type already seen in this walk.
    pub fn lineage(&self, project_type: &'a ProjectType) -> Lineage<'a> {
        let mut links = vec![Link {
            project_type,
            inherit_commands: true,
        }];
        let mut issues = Vec::new();
        let mut visited = HashSet::from([project_type.name.to_lowercase()]);
        let mut path = vec![project_type.name.clone()];
        let mut current = project_type;

        while let Some(parent) = &current.parent {
            let next = match find_type(self.config, &parent.type_name) {
                Ok(next) => next,
                Err(e) => {
                    tracing::warn!("{} (parent of {})", e, current.name);
                    issues.push(e);
                    break;
                }
            };

            path.push(next.name.clone());
            if !visited.insert(next.name.to_lowercase()) {
                let err = Error::cyclic_inheritance(&path);
                tracing::warn!("{}", err);
                issues.push(err);
                break;
            }

            links.push(Link {
                project_type: next,
                inherit_commands: parent.run_commands,
            });
            current = next;
        }

        Lineage { links, issues }
    }

    /// Root-first command plan for `project_type`
    pub fn plan_commands(&self, project_type: &'a ProjectType) -> CommandPlan<'a> {
        self.lineage(project_type).command_plan()
    }

    /// Root-first file plan for `project_type`
    pub fn plan_files(&self, project_type: &'a ProjectType) -> FilePlan<'a> {
        self.lineage(project_type).file_plan()
    }
}
