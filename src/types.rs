use std::fmt;

/// The fixed set of asset categories a project is made of.
///
/// Each category maps onto one pipeline task (and, in development mode, one
/// watch binding or a share of one).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssetCategory {
    Pages,
    Scripts,
    Styles,
    Images,
    Fonts,
    Public,
}

impl AssetCategory {
    pub const ALL: [AssetCategory; 6] = [
        AssetCategory::Pages,
        AssetCategory::Scripts,
        AssetCategory::Styles,
        AssetCategory::Images,
        AssetCategory::Fonts,
        AssetCategory::Public,
    ];

    /// Task name used for this category's pipeline.
    pub fn task_name(self) -> &'static str {
        match self {
            AssetCategory::Pages => "page",
            AssetCategory::Scripts => "script",
            AssetCategory::Styles => "style",
            AssetCategory::Images => "image",
            AssetCategory::Fonts => "font",
            AssetCategory::Public => "extra",
        }
    }

    /// Whether development mode recompiles this category on change, as
    /// opposed to only reloading the page.
    pub fn compiled_in_development(self) -> bool {
        matches!(
            self,
            AssetCategory::Pages | AssetCategory::Scripts | AssetCategory::Styles
        )
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AssetCategory::Pages => "pages",
            AssetCategory::Scripts => "scripts",
            AssetCategory::Styles => "styles",
            AssetCategory::Images => "images",
            AssetCategory::Fonts => "fonts",
            AssetCategory::Public => "public",
        };
        f.write_str(s)
    }
}

/// How a reload request should be applied by connected clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReloadKind {
    /// Navigate/refresh the whole page.
    #[default]
    Full,
    /// Swap the changed assets in place without navigation.
    Stream,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_and_task_names() {
        let names: Vec<_> = AssetCategory::ALL
            .into_iter()
            .map(|c| (c.to_string(), c.task_name()))
            .collect();
        assert_eq!(names[0], ("pages".to_string(), "page"));
        assert_eq!(names[5], ("public".to_string(), "extra"));
    }

    #[test]
    fn only_source_categories_are_compiled_in_development() {
        let compiled: Vec<_> = AssetCategory::ALL
            .into_iter()
            .filter(|c| c.compiled_in_development())
            .collect();
        assert_eq!(
            compiled,
            vec![AssetCategory::Pages, AssetCategory::Scripts, AssetCategory::Styles]
        );
    }
}
