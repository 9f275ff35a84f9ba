//! Project definitions: which outputs a production targets and in which
//! languages. Stored as `<projects_dir>/<name>/project.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::config::DefaultsConfig;
use crate::error::ProjectError;
use crate::executor::planner::ordered_distinct;
use crate::executor::types::{OutputRequest, DEFAULT_LANGUAGE};

pub const PROJECT_FILE: &str = "project.toml";

/// Output id given to the YouTube output of a new project.
const PRIMARY_OUTPUT_ID: &str = "main";
const PRIMARY_PLATFORM: &str = "youtube";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Chunking {
    Auto,
    #[default]
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub id: String,
    pub platform: String,
    #[serde(default)]
    pub chunking: Chunking,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDefaults {
    pub brand: String,
    pub style: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub id: String,
    pub title: String,
    pub source: String,
    #[serde(default)]
    pub languages: Vec<String>,
    pub defaults: ProjectDefaults,
    #[serde(default)]
    pub outputs: Vec<OutputConfig>,
}

impl ProjectConfig {
    /// Every configured output in every project language.
    pub fn output_requests(&self) -> Vec<OutputRequest> {
        let default_langs = [DEFAULT_LANGUAGE.to_string()];
        let languages: &[String] = if self.languages.is_empty() {
            &default_langs
        } else {
            &self.languages
        };

        self.outputs
            .iter()
            .flat_map(|output| {
                languages.iter().map(move |lang| {
                    OutputRequest::new(output.id.clone(), output.platform.clone())
                        .with_language(lang.clone())
                })
            })
            .collect()
    }
}

/// Options accepted when scaffolding a new project. Empty lists fall back to
/// `youtube` / `en`; repeated entries are collapsed.
#[derive(Debug, Clone, Default)]
pub struct NewProjectOptions {
    pub platforms: Vec<String>,
    pub languages: Vec<String>,
    pub brand: Option<String>,
    pub style: Option<String>,
}

pub fn create_project(
    name: &str,
    options: &NewProjectOptions,
    catalog: &Catalog,
    defaults: &DefaultsConfig,
) -> Result<ProjectConfig, ProjectError> {
    validate_name(name)?;

    let platforms = if options.platforms.is_empty() {
        vec![PRIMARY_PLATFORM.to_string()]
    } else {
        ordered_distinct(options.platforms.iter().cloned())
    };
    let languages = if options.languages.is_empty() {
        vec![DEFAULT_LANGUAGE.to_string()]
    } else {
        ordered_distinct(options.languages.iter().cloned())
    };

    let outputs = platforms
        .into_iter()
        .map(|platform| {
            if catalog.platform(&platform).is_none() {
                tracing::warn!(platform = %platform, "unknown platform; renders will use the default aspect ratio");
            }
            let chunking = if catalog
                .platform(&platform)
                .is_some_and(|p| p.chunking_enabled())
            {
                Chunking::Auto
            } else {
                Chunking::None
            };
            let id = if platform == PRIMARY_PLATFORM {
                PRIMARY_OUTPUT_ID.to_string()
            } else {
                platform.clone()
            };
            OutputConfig {
                id,
                platform,
                chunking,
            }
        })
        .collect();

    Ok(ProjectConfig {
        id: name.to_string(),
        title: name.to_string(),
        source: "input/source.pdf".to_string(),
        languages,
        defaults: ProjectDefaults {
            brand: options
                .brand
                .clone()
                .unwrap_or_else(|| defaults.brand.clone()),
            style: options
                .style
                .clone()
                .unwrap_or_else(|| defaults.style.clone()),
        },
        outputs,
    })
}

fn validate_name(name: &str) -> Result<(), ProjectError> {
    let trimmed = name.trim();
    if trimmed.is_empty()
        || trimmed != name
        || name.contains(['/', '\\'])
        || name == "."
        || name == ".."
    {
        return Err(ProjectError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Filesystem layout for projects.
#[derive(Debug, Clone)]
pub struct ProjectStore {
    root: PathBuf,
}

impl ProjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn project_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.project_dir(name).join(PROJECT_FILE).is_file()
    }

    pub fn load(&self, name: &str) -> Result<ProjectConfig, ProjectError> {
        validate_name(name)?;
        let path = self.project_dir(name).join(PROJECT_FILE);
        if !path.is_file() {
            return Err(ProjectError::NotFound(name.to_string()));
        }
        let s = std::fs::read_to_string(&path)?;
        toml::from_str(&s).map_err(|source| ProjectError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Write a new project; refuses to overwrite an existing one.
    pub fn create(&self, project: &ProjectConfig) -> Result<PathBuf, ProjectError> {
        if self.exists(&project.id) {
            return Err(ProjectError::AlreadyExists(project.id.clone()));
        }
        self.save(project)
    }

    pub fn save(&self, project: &ProjectConfig) -> Result<PathBuf, ProjectError> {
        validate_name(&project.id)?;
        let dir = self.project_dir(&project.id);
        std::fs::create_dir_all(&dir)?;
        let path = dir.join(PROJECT_FILE);
        std::fs::write(&path, toml::to_string_pretty(project)?)?;
        tracing::debug!(path = %path.display(), "project saved");
        Ok(path)
    }

    /// Names of all projects under the root, sorted.
    pub fn list(&self) -> Result<Vec<String>, ProjectError> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.path().join(PROJECT_FILE).is_file() {
                names.push(entry.file_name().to_string_lossy().to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::planner::TaskPlanner;
    use crate::executor::types::RenderFilter;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn defaults() -> DefaultsConfig {
        DefaultsConfig::default()
    }

    #[test]
    fn test_new_project_defaults_to_youtube_main() {
        let project = create_project(
            "intro",
            &NewProjectOptions::default(),
            &Catalog::builtin(),
            &defaults(),
        )
        .unwrap();

        assert_eq!(
            project.outputs,
            vec![OutputConfig {
                id: "main".into(),
                platform: "youtube".into(),
                chunking: Chunking::None,
            }]
        );
        assert_eq!(project.languages, vec!["en".to_string()]);
        assert_eq!(project.defaults.brand, "minimal");
    }

    #[test]
    fn test_output_ids_and_chunking_follow_platform() {
        let options = NewProjectOptions {
            platforms: vec!["youtube".into(), "tiktok".into()],
            brand: Some("acme".into()),
            ..Default::default()
        };
        let project =
            create_project("intro", &options, &Catalog::builtin(), &defaults()).unwrap();

        assert_eq!(project.outputs[0].id, "main");
        assert_eq!(project.outputs[1].id, "tiktok");
        assert_eq!(project.outputs[1].chunking, Chunking::Auto);
        assert_eq!(project.defaults.brand, "acme");
    }

    #[test]
    fn test_output_requests_cross_languages() {
        let options = NewProjectOptions {
            platforms: vec!["youtube".into(), "instagram".into()],
            languages: vec!["en".into(), "es".into()],
            ..Default::default()
        };
        let project =
            create_project("intro", &options, &Catalog::builtin(), &defaults()).unwrap();

        let requests = project.output_requests();
        let pairs: Vec<(&str, &str)> = requests
            .iter()
            .map(|r| (r.id.as_str(), r.language_or_default()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("main", "en"),
                ("main", "es"),
                ("instagram", "en"),
                ("instagram", "es"),
            ]
        );
    }

    #[test]
    fn test_repeated_platforms_and_languages_collapse() {
        let options = NewProjectOptions {
            platforms: vec!["tiktok".into(), "youtube".into(), "tiktok".into()],
            languages: vec!["es".into(), "en".into(), "es".into()],
            ..Default::default()
        };
        let project =
            create_project("demo", &options, &Catalog::builtin(), &defaults()).unwrap();

        let ids: Vec<&str> = project.outputs.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["tiktok", "main"]);
        assert_eq!(project.languages, vec!["es".to_string(), "en".to_string()]);

        let catalog = Catalog::builtin();
        let plan = TaskPlanner::new(&catalog).plan_render(
            &project.id,
            &project.output_requests(),
            &RenderFilter::default(),
        );
        plan.validate().unwrap();
        assert_eq!(plan.total_outputs(), 4);
    }

    #[test]
    fn test_invalid_names_rejected() {
        for name in ["", " x", "a/b", ".."] {
            assert!(matches!(
                create_project(name, &NewProjectOptions::default(), &Catalog::builtin(), &defaults()),
                Err(ProjectError::InvalidName(_))
            ));
        }
    }

    #[test]
    fn test_store_round_trip_and_listing() {
        let dir = TempDir::new().unwrap();
        let store = ProjectStore::new(dir.path());
        let project = create_project(
            "intro",
            &NewProjectOptions::default(),
            &Catalog::builtin(),
            &defaults(),
        )
        .unwrap();

        store.create(&project).unwrap();
        assert!(matches!(
            store.create(&project),
            Err(ProjectError::AlreadyExists(_))
        ));
        assert_eq!(store.load("intro").unwrap(), project);
        assert_eq!(store.list().unwrap(), vec!["intro".to_string()]);
        assert!(matches!(
            store.load("missing"),
            Err(ProjectError::NotFound(_))
        ));
    }
}
