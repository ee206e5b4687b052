//! Task catalog definitions.
//!
//! A catalog declares the ordered sections of a workflow and the ordered
//! tasks each section owns. It is supplied once at startup (from config or
//! the built-in default) and validated by `launchpad-core` into a closed set.

use serde::{Deserialize, Serialize};

/// The serialized shape of a task catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogDefinition {
    /// Sections in their fixed navigation order.
    pub sections: Vec<SectionDefinition>,
}

/// A named phase of the workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionDefinition {
    /// Stable section id (e.g. "infrastructure").
    pub id: String,
    /// Display title.
    pub title: String,
    /// Display icon (presentation only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Tasks in their fixed declared order.
    pub tasks: Vec<TaskDefinition>,
}

/// The finest-grained unit of progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDefinition {
    /// Stable task id, unique within its section.
    pub id: String,
    /// Display title.
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SectionDefinition {
    fn new(id: &str, title: &str, icon: &str, tasks: Vec<TaskDefinition>) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            icon: Some(icon.to_string()),
            tasks,
        }
    }
}

impl TaskDefinition {
    fn new(id: &str, title: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: Some(description.to_string()),
        }
    }
}

impl Default for CatalogDefinition {
    /// The standard site-launch pipeline: infrastructure, planning, deployment.
    fn default() -> Self {
        Self {
            sections: vec![
                SectionDefinition::new(
                    "infrastructure",
                    "Infrastructure Setup",
                    "🏗️",
                    vec![
                        TaskDefinition::new(
                            "repo_creation",
                            "GitHub Repository",
                            "Create and configure GitHub repository",
                        ),
                        TaskDefinition::new(
                            "aws_provisioning",
                            "AWS Resources",
                            "Provision S3, CloudFront, and CodePipeline",
                        ),
                    ],
                ),
                SectionDefinition::new(
                    "planning",
                    "Planning & Content Generation",
                    "📋",
                    vec![
                        TaskDefinition::new(
                            "questionnaire",
                            "Site Questionnaire",
                            "Complete site configuration questionnaire",
                        ),
                        TaskDefinition::new(
                            "asset_sync",
                            "Asset Synchronization",
                            "Sync scraped assets and content",
                        ),
                        TaskDefinition::new(
                            "sitemap_planning",
                            "Sitemap Planning",
                            "Plan and structure site pages",
                        ),
                        TaskDefinition::new(
                            "content_generation",
                            "Content Generation",
                            "Generate AI-powered content",
                        ),
                    ],
                ),
                SectionDefinition::new(
                    "deployment",
                    "Deployment & Updates",
                    "🚀",
                    vec![
                        TaskDefinition::new(
                            "repository_update",
                            "Repository Update",
                            "Update GitHub repository",
                        ),
                        TaskDefinition::new(
                            "wordpress_update",
                            "WordPress Update",
                            "Deploy to WordPress site",
                        ),
                    ],
                ),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_order() {
        let catalog = CatalogDefinition::default();
        let ids: Vec<&str> = catalog.sections.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["infrastructure", "planning", "deployment"]);
        assert_eq!(catalog.sections[1].tasks.len(), 4);
    }

    #[test]
    fn test_catalog_deserialize_minimal() {
        let json = r#"{"sections":[{"id":"infra","title":"Infra","tasks":[{"id":"repo","title":"Repo"}]}]}"#;
        let catalog: CatalogDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(catalog.sections[0].tasks[0].id, "repo");
        assert!(catalog.sections[0].icon.is_none());
        assert!(catalog.sections[0].tasks[0].description.is_none());
    }
}
