//! Media folder resolution
//!
//! Maps an upload's section category and optional parent ids to the remote
//! folder path the file is stored under. Resolution never fails.

use std::fmt;
use std::str::FromStr;

use crate::config::DEFAULT_MEDIA_ROOT_FOLDER;

/// Site sections with a dedicated top-level media folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Hero,
    About,
    Services,
    Team,
    Gallery,
    Projects,
    Portfolio,
    Blog,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Hero,
        Category::About,
        Category::Services,
        Category::Team,
        Category::Gallery,
        Category::Projects,
        Category::Portfolio,
        Category::Blog,
    ];

    /// Exact, case-sensitive match on the section name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Category::Hero => "Hero",
            Category::About => "About",
            Category::Services => "Services",
            Category::Team => "Team",
            Category::Gallery => "Gallery",
            Category::Projects => "Projects",
            Category::Portfolio => "Portfolio",
            Category::Blog => "Blog",
        }
    }

    pub fn folder_segment(&self) -> &'static str {
        match self {
            Category::Hero => "hero",
            Category::About => "about",
            Category::Services => "services",
            Category::Team => "team",
            Category::Gallery => "gallery",
            Category::Projects => "projects",
            Category::Portfolio => "portfolio",
            Category::Blog => "blog",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::from_name(s).ok_or_else(|| format!("Unknown category: {}", s))
    }
}

/// Lowercase, keep `[a-z0-9 _-]`, turn whitespace runs into `-`, squash `-` runs.
pub fn slugify(input: &str) -> String {
    let kept: String = input
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || *c == '_' || *c == '-')
        .collect();

    let mut slug = String::with_capacity(kept.len());
    for c in kept.chars() {
        let c = if c.is_whitespace() { '-' } else { c };
        if c == '-' && slug.ends_with('-') {
            continue;
        }
        slug.push(c);
    }
    slug
}

/// Resolves remote folder paths under a fixed root segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderResolver {
    root: String,
}

impl Default for FolderResolver {
    fn default() -> Self {
        Self::new(DEFAULT_MEDIA_ROOT_FOLDER)
    }
}

impl FolderResolver {
    pub fn new(root: impl Into<String>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn category_folder(&self, category: Category) -> String {
        format!("{}/{}", self.root, category.folder_segment())
    }

    pub fn project_folder(&self, project_id: &str) -> String {
        format!("{}/{}", self.category_folder(Category::Projects), project_id)
    }

    pub fn portfolio_folder(&self, portfolio_id: &str) -> String {
        format!("{}/{}", self.category_folder(Category::Portfolio), portfolio_id)
    }

    pub fn team_folder(&self) -> String {
        self.category_folder(Category::Team)
    }

    pub fn about_folder(&self) -> String {
        self.category_folder(Category::About)
    }

    /// Folder used by the remote store upload probe.
    pub fn health_check_folder(&self) -> String {
        format!("{}/health-check", self.root)
    }

    /// Project id wins over portfolio id; unknown categories land in a gallery subfolder.
    pub fn resolve(
        &self,
        category: Option<&str>,
        project_id: Option<&str>,
        portfolio_id: Option<&str>,
    ) -> String {
        if let Some(id) = project_id {
            return self.project_folder(id);
        }
        if let Some(id) = portfolio_id {
            return self.portfolio_folder(id);
        }

        match category {
            Some(name) => match Category::from_name(name) {
                Some(known) => self.category_folder(known),
                None => {
                    let slug = slugify(name);
                    let gallery = self.category_folder(Category::Gallery);
                    if slug.is_empty() {
                        gallery
                    } else {
                        format!("{}/{}", gallery, slug)
                    }
                }
            },
            None => self.category_folder(Category::Gallery),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_level_categories_map_to_lowercase_folder() {
        let resolver = FolderResolver::default();
        for category in Category::ALL {
            let expected = format!("utkrisht/{}", category.name().to_lowercase());
            assert_eq!(resolver.resolve(Some(category.name()), None, None), expected);
        }
    }

    #[test]
    fn test_missing_category_defaults_to_gallery() {
        let resolver = FolderResolver::default();
        assert_eq!(resolver.resolve(None, None, None), "utkrisht/gallery");
    }

    #[test]
    fn test_unknown_category_gets_gallery_subfolder() {
        let resolver = FolderResolver::default();
        assert_eq!(
            resolver.resolve(Some("  Living Room!! Ideas "), None, None),
            "utkrisht/gallery/living-room-ideas"
        );
        // Case-sensitive match: lowercase "team" is not the Team section.
        assert_eq!(
            resolver.resolve(Some("team"), None, None),
            "utkrisht/gallery/team"
        );
    }

    #[test]
    fn test_unslugable_category_falls_back_to_gallery() {
        let resolver = FolderResolver::default();
        assert_eq!(resolver.resolve(Some("!!!"), None, None), "utkrisht/gallery");
    }

    #[test]
    fn test_project_id_overrides_category() {
        let resolver = FolderResolver::default();
        for category in [Some("Team"), Some("Kitchen"), None] {
            assert_eq!(
                resolver.resolve(category, Some("p1"), Some("x9")),
                "utkrisht/projects/p1"
            );
        }
    }

    #[test]
    fn test_portfolio_id_used_without_project() {
        let resolver = FolderResolver::new("site");
        assert_eq!(
            resolver.resolve(Some("Hero"), None, Some("pf-7")),
            "site/portfolio/pf-7"
        );
    }

    #[test]
    fn test_slugify_rules() {
        assert_eq!(slugify("Master  Bedroom"), "master-bedroom");
        assert_eq!(slugify("a -- b"), "a-b");
        assert_eq!(slugify("Kids_Room 2"), "kids_room-2");
        assert_eq!(slugify("Café & Bar"), "caf-bar");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn test_slugify_is_idempotent() {
        let samples = [
            "Living Room",
            "  --weird   input--  ",
            "ÀÉÎ õ ü",
            "tabs\tand\nnewlines",
            "already-a-slug",
            "__under__score__",
            "a - - - b",
        ];
        for sample in samples {
            let once = slugify(sample);
            assert_eq!(slugify(&once), once, "input: {:?}", sample);
        }
    }
}
