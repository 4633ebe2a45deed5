//! Heuristic configuration: every vocabulary, threshold and pattern table the
//! classifiers consult, gathered in one immutable structure.
//!
//! The built-in tables come from [`HeuristicConfig::default`]. A TOML file can
//! override any subset of fields; missing fields keep their defaults.

use serde::{Deserialize, Serialize};

use crate::language::Language;
use crate::types::SemanticTag;
use crate::OutlineError;

/// One `(regular expression, tag)` rule of the pattern matcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternRule {
    pub pattern: String,
    pub tag: SemanticTag,
}

impl PatternRule {
    pub fn new(pattern: &str, tag: SemanticTag) -> Self {
        PatternRule {
            pattern: pattern.to_string(),
            tag,
        }
    }
}

/// Indicator tokens used to recognise a language, plus the rules appended to
/// the base rule list when that language wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageProfile {
    pub language: Language,
    pub indicators: Vec<String>,
    pub rules: Vec<PatternRule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicConfig {
    // -- length and count bounds --------------------------------------------
    pub min_heading_chars: usize,
    pub max_heading_chars: usize,
    pub content_max_words: usize,
    pub max_outline_entries: usize,
    pub pattern_max_chars: usize,
    pub typography_max_chars: usize,
    pub filler_ratio_limit: f32,
    pub fragment_min_chars: usize,
    pub toc_fallback_threshold: usize,

    // -- sampling -----------------------------------------------------------
    pub sample_pages: usize,
    pub language_sample_pages: usize,
    pub language_sample_chars: usize,

    // -- positional classifier ---------------------------------------------
    pub position_band: f32,
    pub position_max_words: usize,
    pub position_max_chars: usize,

    // -- title selection ----------------------------------------------------
    pub title_bold_bonus: f32,
    pub title_min_chars: usize,
    pub title_max_chars: usize,
    pub metadata_title_min_chars: usize,
    pub metadata_title_max_chars: usize,

    // -- vocabularies -------------------------------------------------------
    pub filler_words: Vec<String>,
    pub structural_words: Vec<String>,
    pub boilerplate_words: Vec<String>,
    pub boilerplate_phrases: Vec<String>,
    pub bullet_markers: Vec<String>,
    pub code_hosts: Vec<String>,
    pub url_prefixes: Vec<String>,
    pub title_denylist: Vec<String>,
    pub title_denied_prefixes: Vec<String>,

    // -- patterns -----------------------------------------------------------
    pub base_rules: Vec<PatternRule>,
    pub languages: Vec<LanguageProfile>,
}

impl HeuristicConfig {
    /// Parse a TOML override file and validate the result.
    pub fn from_toml_str(input: &str) -> Result<Self, OutlineError> {
        let config: HeuristicConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations whose bounds cannot be satisfied.
    pub fn validate(&self) -> Result<(), OutlineError> {
        if self.min_heading_chars > self.max_heading_chars {
            return Err(OutlineError::InvalidConfig(format!(
                "min_heading_chars ({}) exceeds max_heading_chars ({})",
                self.min_heading_chars, self.max_heading_chars
            )));
        }
        if self.title_min_chars > self.title_max_chars {
            return Err(OutlineError::InvalidConfig(format!(
                "title_min_chars ({}) exceeds title_max_chars ({})",
                self.title_min_chars, self.title_max_chars
            )));
        }
        if self.metadata_title_min_chars > self.metadata_title_max_chars {
            return Err(OutlineError::InvalidConfig(
                "metadata_title_min_chars exceeds metadata_title_max_chars".to_string(),
            ));
        }
        if self.max_outline_entries == 0 {
            return Err(OutlineError::InvalidConfig(
                "max_outline_entries must be at least 1".to_string(),
            ));
        }
        if self.sample_pages == 0 {
            return Err(OutlineError::InvalidConfig(
                "sample_pages must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.filler_ratio_limit) {
            return Err(OutlineError::InvalidConfig(format!(
                "filler_ratio_limit must be within 0..=1, got {}",
                self.filler_ratio_limit
            )));
        }
        Ok(())
    }

    pub fn is_filler_word(&self, word: &str) -> bool {
        self.filler_words.iter().any(|w| w == word)
    }

    pub fn is_structural_word(&self, word: &str) -> bool {
        self.structural_words.iter().any(|w| w == word)
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            min_heading_chars: 3,
            max_heading_chars: 120,
            content_max_words: 6,
            max_outline_entries: 50,
            pattern_max_chars: 200,
            typography_max_chars: 150,
            filler_ratio_limit: 0.3,
            fragment_min_chars: 10,
            toc_fallback_threshold: 3,

            sample_pages: 5,
            language_sample_pages: 3,
            language_sample_chars: 1000,

            position_band: 20.0,
            position_max_words: 10,
            position_max_chars: 100,

            title_bold_bonus: 2.0,
            title_min_chars: 3,
            title_max_chars: 100,
            metadata_title_min_chars: 4,
            metadata_title_max_chars: 199,

            filler_words: strings(&[
                "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
                "this", "that", "which", "have", "has", "been", "will", "would", "could", "should",
            ]),
            structural_words: strings(&[
                "introduction",
                "overview",
                "background",
                "methodology",
                "methods",
                "results",
                "discussion",
                "conclusion",
                "conclusions",
                "summary",
                "abstract",
                "references",
                "bibliography",
                "appendix",
                "acknowledgments",
                "acknowledgements",
                "objectives",
                "goals",
                "purpose",
                "scope",
                "limitations",
                "analysis",
                "evaluation",
                "assessment",
                "review",
                "survey",
                "preface",
                "foreword",
                "recommendations",
            ]),
            boilerplate_words: strings(&[
                "you", "it", "go", "magic", "time", "lets", "ahead", "matters", "showtime", "mode",
                "scale", "lever", "cap", "lamp", "there", "spoke", "connected", "narrated",
                "meaning", "across", "entire", "library", "future", "building", "want", "help",
                "shape", "reimagine", "humble", "kick", "things", "brains", "blazing", "whisperer",
                "feels",
            ]),
            boilerplate_phrases: strings(&[
                "this sample",
                "the guidelines",
                "formatting requirements",
                "academic writing",
                "referencing guidelines",
                "times new roman",
                "department, university",
                "first author",
                "second author",
                "third author",
                "email:",
                "phone:",
                "address:",
                "university/college",
                "color-coded",
                "demonstrates the requirements",
                "which demonstrates",
                "have been",
                "filename.pdf",
                "amd64",
                "x86_64",
            ]),
            bullet_markers: strings(&[
                "\u{2022}", "*", "-", "\u{25E6}", "\u{25AA}", "\u{25AB}", "\u{2013}", "\u{00B7}",
                "\u{2023}", "\u{25CB}", "\u{25A0}",
            ]),
            code_hosts: strings(&["github.com", "gitlab.com", "bitbucket.org"]),
            url_prefixes: strings(&["http", "www."]),
            title_denylist: strings(&[
                "document",
                "page",
                "sample",
                "template",
                "welcome",
                "introduction",
                "untitled",
                "draft",
            ]),
            title_denied_prefixes: strings(&["http", "www", "Page ", "Copyright", "\u{00A9}"]),

            base_rules: default_base_rules(),
            languages: default_languages(),
        }
    }
}

fn default_base_rules() -> Vec<PatternRule> {
    use SemanticTag::*;
    vec![
        PatternRule::new(r"^(?:Chapter|CHAPTER)\s+(?:\d+|[IVXLC]+)\b", Chapter),
        PatternRule::new(r"^(?:Part|PART)\s+(?:\d+|[IVXLC]+)\b", Part),
        PatternRule::new(r"^(?:Section|SECTION)\s+\d+", Section),
        PatternRule::new(r"^\d+\.\d+\.\d+\.?\s+\p{Lu}", Detail),
        PatternRule::new(r"^\d+\.\d+\.?\s+\p{Lu}", Section),
        PatternRule::new(r"^\d+\.\s+\p{Lu}", Chapter),
        PatternRule::new(r"^[IVX]+\.\s+\p{Lu}", Chapter),
        PatternRule::new(r"^[A-Z]\.\s+\p{Lu}", Subsection),
        PatternRule::new(
            r"^(?:Introduction|INTRODUCTION|Conclusions?|CONCLUSIONS?|Abstract|ABSTRACT|Summary|SUMMARY|References|REFERENCES|Bibliography|BIBLIOGRAPHY)$",
            Chapter,
        ),
        PatternRule::new(r"^(?:Appendix|APPENDIX)\b", Chapter),
        PatternRule::new(r"^[A-Z][A-Z ]{2,29}[A-Z]$", Section),
    ]
}

fn default_languages() -> Vec<LanguageProfile> {
    use SemanticTag::*;
    vec![
        LanguageProfile {
            language: Language::Chinese,
            indicators: strings(&[
                "的", "是", "在", "了", "和", "有", "我", "你", "他", "她", "它", "们",
            ]),
            rules: vec![
                PatternRule::new(r"^第[一二三四五六七八九十\d]+章", Chapter),
                PatternRule::new(r"^[一二三四五六七八九十\d]+[、．]", Section),
                PatternRule::new(r"^\d+[、．]\d+", Subsection),
                PatternRule::new(r"^(?:章节|章|节|部分|段落)", Section),
            ],
        },
        LanguageProfile {
            language: Language::Spanish,
            indicators: strings(&[
                "el", "la", "de", "que", "y", "en", "un", "es", "se", "no", "te", "lo",
            ]),
            rules: vec![
                PatternRule::new(r"^(?:Capítulo|CAPÍTULO)\s+\d+", Chapter),
                PatternRule::new(r"^(?:Sección|SECCIÓN)\s+\d+", Section),
                PatternRule::new(r"^(?:Introducción|INTRODUCCIÓN)", Section),
                PatternRule::new(r"^(?:Conclusión|CONCLUSIÓN)", Section),
                PatternRule::new(r"^(?:Resumen|RESUMEN)", Section),
            ],
        },
        LanguageProfile {
            language: Language::French,
            indicators: strings(&[
                "le", "de", "et", "à", "un", "il", "être", "en", "avoir", "que", "pour",
            ]),
            rules: vec![
                PatternRule::new(r"^(?:Chapitre|CHAPITRE)\s+\d+", Chapter),
                PatternRule::new(r"^(?:Section|SECTION)\s+\d+", Section),
                PatternRule::new(r"^(?:Introduction|INTRODUCTION)", Section),
                PatternRule::new(r"^(?:Conclusion|CONCLUSION)", Section),
                PatternRule::new(r"^(?:Résumé|RÉSUMÉ)", Section),
            ],
        },
        LanguageProfile {
            language: Language::German,
            indicators: strings(&[
                "der", "die", "und", "in", "den", "von", "zu", "das", "mit", "sich", "des", "auf",
            ]),
            rules: vec![
                PatternRule::new(r"^(?:Kapitel|KAPITEL)\s+\d+", Chapter),
                PatternRule::new(r"^(?:Abschnitt|ABSCHNITT)\s+\d+", Section),
                PatternRule::new(r"^(?:Einleitung|EINLEITUNG)", Section),
                PatternRule::new(r"^(?:Schlussfolgerung|SCHLUSSFOLGERUNG)", Section),
                PatternRule::new(r"^(?:Zusammenfassung|ZUSAMMENFASSUNG)", Section),
            ],
        },
        LanguageProfile {
            language: Language::Japanese,
            indicators: strings(&[
                "の", "に", "は", "を", "た", "が", "で", "て", "と", "し", "れ", "さ",
            ]),
            rules: vec![
                PatternRule::new(r"^第[一二三四五六七八九十\d]+章", Chapter),
                PatternRule::new(r"^[一二三四五六七八九十\d]+[、．]", Section),
                PatternRule::new(r"^(?:はじめに|序論|序章)", Section),
                PatternRule::new(r"^(?:結論|まとめ|終章)", Section),
                PatternRule::new(r"^(?:概要|要約)", Section),
            ],
        },
        LanguageProfile {
            language: Language::Arabic,
            indicators: strings(&[
                "في", "من", "إلى", "على", "أن", "هذا", "هذه", "التي", "الذي", "كان", "كما",
            ]),
            rules: vec![
                PatternRule::new(r"^الفصل\s+\d+", Chapter),
                PatternRule::new(r"^القسم\s+\d+", Section),
                PatternRule::new(r"^(?:مقدمة|المقدمة)", Section),
                PatternRule::new(r"^(?:خاتمة|الخاتمة)", Section),
                PatternRule::new(r"^(?:ملخص|الملخص)", Section),
            ],
        },
        LanguageProfile {
            language: Language::Russian,
            indicators: strings(&[
                "в", "и", "не", "на", "я", "быть", "он", "с", "что", "а", "по", "это",
            ]),
            rules: vec![
                PatternRule::new(r"^(?:Глава|ГЛАВА)\s+\d+", Chapter),
                PatternRule::new(r"^(?:Раздел|РАЗДЕЛ)\s+\d+", Section),
                PatternRule::new(r"^(?:Введение|ВВЕДЕНИЕ)", Section),
                PatternRule::new(r"^(?:Заключение|ЗАКЛЮЧЕНИЕ)", Section),
                PatternRule::new(r"^(?:Резюме|РЕЗЮМЕ)", Section),
            ],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(HeuristicConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = HeuristicConfig::from_toml_str("max_outline_entries = 10\n").unwrap();
        assert_eq!(config.max_outline_entries, 10);
        assert_eq!(config.sample_pages, 5);
        assert!(!config.base_rules.is_empty());
    }

    #[test]
    fn test_toml_rules_with_lenient_tags() {
        let input = r#"
base_rules = [
    { pattern = "^Lesson \\d+", tag = "main" },
    { pattern = "^Step \\d+", tag = "mystery" },
]
"#;
        let config = HeuristicConfig::from_toml_str(input).unwrap();
        assert_eq!(config.base_rules.len(), 2);
        assert_eq!(config.base_rules[0].tag, SemanticTag::Chapter);
        assert_eq!(config.base_rules[1].tag, SemanticTag::Section);
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let result =
            HeuristicConfig::from_toml_str("min_heading_chars = 90\nmax_heading_chars = 80\n");
        assert!(matches!(result, Err(OutlineError::InvalidConfig(_))));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let result = HeuristicConfig::from_toml_str("max_outline_entries = \"many\"");
        assert!(matches!(result, Err(OutlineError::ConfigParse(_))));
    }

    #[test]
    fn test_zero_outline_cap_rejected() {
        let result = HeuristicConfig::from_toml_str("max_outline_entries = 0\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_vocabulary_lookups() {
        let config = HeuristicConfig::default();
        assert!(config.is_filler_word("the"));
        assert!(!config.is_filler_word("fox"));
        assert!(config.is_structural_word("methodology"));
    }
}
