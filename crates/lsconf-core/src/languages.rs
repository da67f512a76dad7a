use crate::error::SettingsError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

/// Languages with a supported analysis backend.
///
/// Configuration refers to languages by free-form tags; [`Language::from_tag`]
/// is the only way a tag becomes a `Language`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Language {
    Bash,
    Clojure,
    Cpp,
    CSharp,
    Dart,
    Elixir,
    Elm,
    Erlang,
    FSharp,
    Go,
    Haskell,
    Java,
    Julia,
    Kotlin,
    Lua,
    Markdown,
    Nix,
    Perl,
    Php,
    PowerShell,
    Python,
    R,
    Rego,
    Ruby,
    Rust,
    Scala,
    Swift,
    Terraform,
    TypeScript,
    Yaml,
    Zig,
}

const ALL_LANGUAGES: [Language; 31] = [
    Language::Bash,
    Language::Clojure,
    Language::Cpp,
    Language::CSharp,
    Language::Dart,
    Language::Elixir,
    Language::Elm,
    Language::Erlang,
    Language::FSharp,
    Language::Go,
    Language::Haskell,
    Language::Java,
    Language::Julia,
    Language::Kotlin,
    Language::Lua,
    Language::Markdown,
    Language::Nix,
    Language::Perl,
    Language::Php,
    Language::PowerShell,
    Language::Python,
    Language::R,
    Language::Rego,
    Language::Ruby,
    Language::Rust,
    Language::Scala,
    Language::Swift,
    Language::Terraform,
    Language::TypeScript,
    Language::Yaml,
    Language::Zig,
];

impl Language {
    /// Every supported language, in canonical-name order.
    pub fn all() -> &'static [Language] {
        &ALL_LANGUAGES
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bash => "bash",
            Self::Clojure => "clojure",
            Self::Cpp => "cpp",
            Self::CSharp => "csharp",
            Self::Dart => "dart",
            Self::Elixir => "elixir",
            Self::Elm => "elm",
            Self::Erlang => "erlang",
            Self::FSharp => "fsharp",
            Self::Go => "go",
            Self::Haskell => "haskell",
            Self::Java => "java",
            Self::Julia => "julia",
            Self::Kotlin => "kotlin",
            Self::Lua => "lua",
            Self::Markdown => "markdown",
            Self::Nix => "nix",
            Self::Perl => "perl",
            Self::Php => "php",
            Self::PowerShell => "powershell",
            Self::Python => "python",
            Self::R => "r",
            Self::Rego => "rego",
            Self::Ruby => "ruby",
            Self::Rust => "rust",
            Self::Scala => "scala",
            Self::Swift => "swift",
            Self::Terraform => "terraform",
            Self::TypeScript => "typescript",
            Self::Yaml => "yaml",
            Self::Zig => "zig",
        }
    }

    /// Alternate tags accepted in configuration, all lowercase.
    pub const fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Bash => &["sh", "shell"],
            Self::Cpp => &["c++", "cxx"],
            Self::CSharp => &["c#", "cs"],
            Self::Elixir => &["ex"],
            Self::Erlang => &["erl"],
            Self::FSharp => &["f#"],
            Self::Go => &["golang"],
            Self::Haskell => &["hs"],
            Self::Kotlin => &["kt"],
            Self::Markdown => &["md"],
            Self::PowerShell => &["pwsh"],
            Self::Python => &["py"],
            Self::Ruby => &["rb"],
            Self::Rust => &["rs"],
            Self::Terraform => &["tf", "hcl"],
            Self::TypeScript => &["ts", "javascript", "js"],
            Self::Yaml => &["yml"],
            _ => &[],
        }
    }

    /// Resolve a configuration tag, ignoring letter case and surrounding
    /// whitespace. The error carries `tag` unmodified.
    pub fn from_tag(tag: &str) -> Result<Self, SettingsError> {
        let normalized = tag.trim().to_lowercase();
        ALL_LANGUAGES
            .iter()
            .copied()
            .find(|language| {
                language.as_str() == normalized
                    || language.aliases().contains(&normalized.as_str())
            })
            .ok_or_else(|| SettingsError::unrecognized_language(tag))
    }
}

impl FromStr for Language {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Language {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Language {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Self::from_tag(&tag).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn casing_variants(tag: &str) -> Vec<String> {
        let mixed: String = tag
            .chars()
            .enumerate()
            .map(|(i, c)| {
                if i % 2 == 0 {
                    c.to_ascii_uppercase()
                } else {
                    c.to_ascii_lowercase()
                }
            })
            .collect();
        vec![tag.to_lowercase(), tag.to_uppercase(), mixed]
    }

    #[test]
    fn every_casing_of_every_canonical_tag_resolves_to_same_language() {
        for &language in Language::all() {
            for variant in casing_variants(language.as_str()) {
                assert_eq!(
                    Language::from_tag(&variant).unwrap(),
                    language,
                    "variant {variant}"
                );
            }
        }
    }

    #[test]
    fn cpp_tags_resolve_case_insensitively() {
        assert_eq!(Language::from_tag("CPP").unwrap(), Language::Cpp);
        assert_eq!(Language::from_tag("cpp").unwrap(), Language::Cpp);
        assert_eq!(Language::from_tag("Cpp").unwrap(), Language::Cpp);
        assert_eq!(Language::from_tag("C++").unwrap(), Language::Cpp);
    }

    #[test]
    fn aliases_resolve_to_their_language() {
        assert_eq!(Language::from_tag("PY").unwrap(), Language::Python);
        assert_eq!(Language::from_tag("golang").unwrap(), Language::Go);
        assert_eq!(Language::from_tag("JavaScript").unwrap(), Language::TypeScript);
        assert_eq!(Language::from_tag("C#").unwrap(), Language::CSharp);
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert_eq!(Language::from_tag("  rust\t").unwrap(), Language::Rust);
    }

    #[test]
    fn unrecognized_tag_keeps_original_input() {
        let err = Language::from_tag(" Not_A_Language ").unwrap_err();
        assert_eq!(err.tag(), " Not_A_Language ");
        assert_eq!(err.scope(), None);
        assert!(Language::from_tag("").is_err());
    }

    #[test]
    fn canonical_names_and_aliases_never_collide() {
        let mut seen = HashSet::new();
        for &language in Language::all() {
            assert!(seen.insert(language.as_str()), "{}", language.as_str());
            for alias in language.aliases() {
                assert_eq!(*alias, alias.to_lowercase());
                assert!(seen.insert(alias), "{alias}");
            }
        }
    }

    #[test]
    fn all_is_sorted_and_complete() {
        let all = Language::all();
        assert!(all.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(all.windows(2).all(|pair| pair[0].as_str() < pair[1].as_str()));
        assert_eq!(all.len(), 31);
    }

    #[test]
    fn serde_uses_canonical_name_and_resolver() {
        assert_eq!(
            serde_json::to_string(&Language::CSharp).unwrap(),
            "\"csharp\""
        );
        let parsed: Language = serde_json::from_str("\"RUST\"").unwrap();
        assert_eq!(parsed, Language::Rust);
        let err = serde_json::from_str::<Language>("\"rustt\"").unwrap_err();
        assert!(err.to_string().contains("rustt"));
    }
}
