//! Validated task catalog.
//!
//! `Catalog` is built once from a `CatalogDefinition` and is immutable
//! afterwards. Sections and tasks are addressed through opaque `SectionRef`
//! and `TaskRef` handles that only the catalog can produce, so string ids are
//! resolved exactly once at the boundary and every later lookup is an index.

use std::collections::HashSet;

use launchpad_types::catalog::{CatalogDefinition, SectionDefinition, TaskDefinition};
use launchpad_types::error::CatalogError;

/// Handle to a section of a specific catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionRef(usize);

/// Handle to a task of a specific catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskRef {
    section: usize,
    task: usize,
}

impl SectionRef {
    /// Ordinal position of the section (0-based).
    pub fn position(&self) -> usize {
        self.0
    }
}

impl TaskRef {
    /// The section owning this task.
    pub fn section(&self) -> SectionRef {
        SectionRef(self.section)
    }

    /// Position of the task within its section (0-based).
    pub fn position(&self) -> usize {
        self.task
    }

    pub(crate) fn indices(&self) -> (usize, usize) {
        (self.section, self.task)
    }
}

/// Closed, ordered set of sections and their tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    sections: Vec<SectionDefinition>,
}

impl Catalog {
    /// Validate a definition.
    ///
    /// Fails on an empty catalog, an empty section, or duplicate ids.
    pub fn from_definition(definition: CatalogDefinition) -> Result<Self, CatalogError> {
        if definition.sections.is_empty() {
            return Err(CatalogError::NoSections);
        }

        let mut section_ids = HashSet::new();
        for section in &definition.sections {
            if !section_ids.insert(section.id.as_str()) {
                return Err(CatalogError::DuplicateSection(section.id.clone()));
            }
            if section.tasks.is_empty() {
                return Err(CatalogError::EmptySection(section.id.clone()));
            }
            let mut task_ids = HashSet::new();
            for task in &section.tasks {
                if !task_ids.insert(task.id.as_str()) {
                    return Err(CatalogError::DuplicateTask {
                        section: section.id.clone(),
                        task: task.id.clone(),
                    });
                }
            }
        }

        Ok(Self {
            sections: definition.sections,
        })
    }

    /// Resolve a section id.
    pub fn section(&self, id: &str) -> Result<SectionRef, CatalogError> {
        self.sections
            .iter()
            .position(|s| s.id == id)
            .map(SectionRef)
            .ok_or_else(|| CatalogError::UnknownSection(id.to_string()))
    }

    /// Resolve a task id within a section.
    pub fn task(&self, section: &str, task: &str) -> Result<TaskRef, CatalogError> {
        let section_ref = self.section(section)?;
        self.sections[section_ref.0]
            .tasks
            .iter()
            .position(|t| t.id == task)
            .map(|idx| TaskRef {
                section: section_ref.0,
                task: idx,
            })
            .ok_or_else(|| CatalogError::UnknownTask {
                section: section.to_string(),
                task: task.to_string(),
            })
    }

    /// Sections in navigation order.
    pub fn sections(&self) -> impl Iterator<Item = SectionRef> + '_ {
        (0..self.sections.len()).map(SectionRef)
    }

    /// Tasks of a section in declared order.
    pub fn tasks(&self, section: SectionRef) -> impl Iterator<Item = TaskRef> + '_ {
        (0..self.sections[section.0].tasks.len()).map(move |task| TaskRef {
            section: section.0,
            task,
        })
    }

    /// Every task in the catalog, section by section.
    pub fn all_tasks(&self) -> impl Iterator<Item = TaskRef> + '_ {
        self.sections().flat_map(|s| self.tasks(s))
    }

    /// The section a session starts in.
    pub fn first_section(&self) -> SectionRef {
        SectionRef(0)
    }

    /// Whether `section` is in range for this catalog.
    pub(crate) fn owns_section(&self, section: SectionRef) -> bool {
        section.0 < self.sections.len()
    }

    /// Whether `task` is in range for this catalog.
    pub(crate) fn owns_task(&self, task: TaskRef) -> bool {
        self.sections
            .get(task.section)
            .is_some_and(|s| task.task < s.tasks.len())
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn task_count(&self) -> usize {
        self.sections.iter().map(|s| s.tasks.len()).sum()
    }

    pub fn section_def(&self, section: SectionRef) -> &SectionDefinition {
        &self.sections[section.0]
    }

    pub fn task_def(&self, task: TaskRef) -> &TaskDefinition {
        &self.sections[task.section].tasks[task.task]
    }

    pub fn section_id(&self, section: SectionRef) -> &str {
        &self.section_def(section).id
    }

    pub fn task_id(&self, task: TaskRef) -> &str {
        &self.task_def(task).id
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            sections: CatalogDefinition::default().sections,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build a catalog from `(section, [tasks])` pairs.
    pub(crate) fn catalog(layout: &[(&str, &[&str])]) -> Catalog {
        let definition = CatalogDefinition {
            sections: layout
                .iter()
                .map(|(id, tasks)| SectionDefinition {
                    id: id.to_string(),
                    title: id.to_uppercase(),
                    icon: None,
                    tasks: tasks
                        .iter()
                        .map(|t| TaskDefinition {
                            id: t.to_string(),
                            title: t.to_uppercase(),
                            description: None,
                        })
                        .collect(),
                })
                .collect(),
        };
        Catalog::from_definition(definition).unwrap()
    }

    #[test]
    fn test_resolve_known_ids() {
        let catalog = catalog(&[("infra", &["repo", "aws"]), ("plan", &["form"])]);
        let plan = catalog.section("plan").unwrap();
        assert_eq!(plan.position(), 1);

        let aws = catalog.task("infra", "aws").unwrap();
        assert_eq!(aws.section(), catalog.section("infra").unwrap());
        assert_eq!(aws.position(), 1);
        assert_eq!(catalog.task_id(aws), "aws");
        assert_eq!(catalog.task_count(), 3);
    }

    #[test]
    fn test_unknown_ids_are_errors() {
        let catalog = catalog(&[("infra", &["repo"])]);
        assert_eq!(
            catalog.section("deploy"),
            Err(CatalogError::UnknownSection("deploy".into()))
        );
        assert_eq!(
            catalog.task("infra", "dns"),
            Err(CatalogError::UnknownTask {
                section: "infra".into(),
                task: "dns".into()
            })
        );
        assert!(matches!(
            catalog.task("nope", "repo"),
            Err(CatalogError::UnknownSection(_))
        ));
    }

    #[test]
    fn test_validation_rejects_bad_definitions() {
        let empty = CatalogDefinition { sections: vec![] };
        assert_eq!(Catalog::from_definition(empty), Err(CatalogError::NoSections));

        let mut def = CatalogDefinition::default();
        def.sections[1].tasks.clear();
        assert_eq!(
            Catalog::from_definition(def),
            Err(CatalogError::EmptySection("planning".into()))
        );

        let mut def = CatalogDefinition::default();
        def.sections[2].id = "infrastructure".into();
        assert_eq!(
            Catalog::from_definition(def),
            Err(CatalogError::DuplicateSection("infrastructure".into()))
        );

        let mut def = CatalogDefinition::default();
        def.sections[0].tasks[1].id = "repo_creation".into();
        assert!(matches!(
            Catalog::from_definition(def),
            Err(CatalogError::DuplicateTask { .. })
        ));
    }

    #[test]
    fn test_iteration_order() {
        let catalog = Catalog::default();
        let ids: Vec<&str> = catalog.all_tasks().map(|t| catalog.task_id(t)).collect();
        assert_eq!(ids.first(), Some(&"repo_creation"));
        assert_eq!(ids.last(), Some(&"wordpress_update"));
        assert_eq!(ids.len(), 8);
        assert_eq!(catalog.first_section(), catalog.section("infrastructure").unwrap());
    }
}
