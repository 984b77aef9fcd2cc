use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;

/// Two or more letter groups joined by `/`, e.g. `Python/Django`.
static SLASH_GROUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\p{L}+(?:/\p{L}+)+").expect("valid slash group pattern"));

/// Contents of a parenthesized group, e.g. `(Python, Go)`.
static PARENTHESIZED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(([^)]+)\)").expect("valid parenthesized pattern"));

/// Text after a colon up to the next comma, e.g. `Developer: Kotlin, remote`.
static AFTER_COLON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":\s*([^,]+)").expect("valid colon pattern"));

/// The parts of a vacancy skills can be read from.
#[derive(Debug, Clone, Copy, Default)]
pub struct VacancyText<'a> {
    pub structured: &'a [String],
    pub title: &'a str,
    /// Upstream description, HTML.
    pub description: &'a str,
}

/// A skill source looks at one part of a vacancy and proposes skill candidates.
/// Sources run in order and earlier sources win when two propose the same string,
/// so the position of a source in the extractor decides the discovery order of its skills.
/// Mined sources (free text) have their candidates checked by every [`CandidateFilter`];
/// curated ones (structured upstream data) are taken as they are.
pub trait SkillSource: Send + Sync {
    fn candidates(&self, vacancy: &VacancyText<'_>) -> Vec<String>;

    fn is_mined(&self) -> bool {
        true
    }
}

/// Key skills the employer entered on the vacancy.
pub struct StructuredSkills;

impl SkillSource for StructuredSkills {
    fn candidates(&self, vacancy: &VacancyText<'_>) -> Vec<String> {
        vacancy.structured.to_vec()
    }

    fn is_mined(&self) -> bool {
        false
    }
}

/// Which free-text field a mined source reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Title,
    Description,
}

impl TextField {
    fn read(&self, vacancy: &VacancyText<'_>) -> String {
        match self {
            TextField::Title => vacancy.title.to_string(),
            TextField::Description => strip_markup(vacancy.description),
        }
    }
}

/// Splits slash groups such as `Java/Kotlin` into `Java`, `Kotlin`.
pub struct SlashGroupSource {
    field: TextField,
}

impl SlashGroupSource {
    pub fn new(field: TextField) -> Self {
        Self { field }
    }
}

impl SkillSource for SlashGroupSource {
    fn candidates(&self, vacancy: &VacancyText<'_>) -> Vec<String> {
        let text = self.field.read(vacancy);
        SLASH_GROUP
            .find_iter(&text)
            .flat_map(|group| group.as_str().split('/'))
            .map(str::to_string)
            .collect()
    }
}

/// Comma separated lists inside parentheses of the title: `Backend (Python, Go)`.
pub struct ParenthesizedListSource;

impl SkillSource for ParenthesizedListSource {
    fn candidates(&self, vacancy: &VacancyText<'_>) -> Vec<String> {
        PARENTHESIZED
            .captures_iter(vacancy.title)
            .filter_map(|caps| caps.get(1))
            .flat_map(|group| group.as_str().split(','))
            .map(str::to_string)
            .collect()
    }
}

/// Whatever follows a colon in the title, up to the next comma.
pub struct AfterColonSource;

impl SkillSource for AfterColonSource {
    fn candidates(&self, vacancy: &VacancyText<'_>) -> Vec<String> {
        AFTER_COLON
            .captures_iter(vacancy.title)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

/// A candidate filter decides whether a mined string is plausible as a skill.
/// Filters are heuristics: they trade a few lost skills for keeping experience
/// ranges, version numbers and similar title noise out of the skill table.
pub trait CandidateFilter: Send + Sync {
    fn accepts(&self, candidate: &str) -> bool;
}

/// Rejects candidates that are too short to mean anything.
pub struct MinLengthFilter {
    min_chars: usize,
}

impl MinLengthFilter {
    pub fn new(min_chars: usize) -> Self {
        Self { min_chars }
    }
}

impl Default for MinLengthFilter {
    fn default() -> Self {
        Self { min_chars: 2 }
    }
}

impl CandidateFilter for MinLengthFilter {
    fn accepts(&self, candidate: &str) -> bool {
        candidate.chars().count() >= self.min_chars
    }
}

/// Rejects candidates carrying digits that usually come from experience
/// ranges ("1-3 years", "3-6 years", "6+") or large numbers ("20 000").
/// A candidate is dropped when it contains any denylisted digit, or when any
/// run of digits contains a number without a leading zero that is at least `threshold`.
pub struct DigitNoiseFilter {
    denylist: Vec<char>,
    threshold: u64,
}

impl DigitNoiseFilter {
    pub fn new(denylist: Vec<char>, threshold: u64) -> Self {
        Self {
            denylist,
            threshold,
        }
    }

    fn has_large_number(&self, candidate: &str) -> bool {
        let digits: Vec<Option<u64>> = candidate
            .chars()
            .map(|c| c.to_digit(10).map(u64::from))
            .collect();

        for start in 0..digits.len() {
            // numbers never start with 0
            if matches!(digits[start], None | Some(0)) {
                continue;
            }
            let mut value = 0u64;
            for digit in digits[start..].iter().map_while(|d| *d) {
                value = value.saturating_mul(10).saturating_add(digit);
                if value >= self.threshold {
                    return true;
                }
            }
        }
        false
    }
}

impl Default for DigitNoiseFilter {
    fn default() -> Self {
        Self {
            denylist: vec!['1', '3', '6'],
            threshold: 11,
        }
    }
}

impl CandidateFilter for DigitNoiseFilter {
    fn accepts(&self, candidate: &str) -> bool {
        if candidate.chars().any(|c| self.denylist.contains(&c)) {
            return false;
        }
        !self.has_large_number(candidate)
    }
}

/// Text extraction for HTML descriptions. Block boundaries become spaces.
pub fn strip_markup(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }
    let fragment = Html::parse_fragment(html);
    fragment
        .root_element()
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<&str>>()
        .join(" ")
}

/// Skill extraction pipeline: sources propose, filters reject, then the
/// ordered set is sorted longest first so multi-word skills surface first.
/// Best effort only, it never fails and may return nothing.
pub struct SkillExtractor {
    sources: Vec<Box<dyn SkillSource>>,
    filters: Vec<Box<dyn CandidateFilter>>,
}

impl SkillExtractor {
    pub fn new(sources: Vec<Box<dyn SkillSource>>, filters: Vec<Box<dyn CandidateFilter>>) -> Self {
        Self { sources, filters }
    }

    /// Only the upstream key skills, no text mining.
    pub fn structured_only() -> Self {
        Self::new(vec![Box::new(StructuredSkills)], Vec::new())
    }

    fn accepts(&self, candidate: &str) -> bool {
        self.filters.iter().all(|f| f.accepts(candidate))
    }

    pub fn extract(&self, structured: &[String], title: &str, description: &str) -> Vec<String> {
        let vacancy = VacancyText {
            structured,
            title,
            description,
        };

        let mut skills: IndexSet<String> = IndexSet::new();
        for source in self.sources.iter() {
            for candidate in source.candidates(&vacancy) {
                let candidate = candidate.trim();
                if candidate.is_empty() {
                    continue;
                }
                if source.is_mined() && !self.accepts(candidate) {
                    continue;
                }
                if !skills.contains(candidate) {
                    skills.insert(candidate.to_string());
                }
            }
        }

        let mut skills: Vec<String> = skills.into_iter().collect();
        // stable: equal lengths keep discovery order
        skills.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
        skills
    }
}

impl Default for SkillExtractor {
    fn default() -> Self {
        Self::new(
            vec![
                Box::new(StructuredSkills),
                Box::new(SlashGroupSource::new(TextField::Title)),
                Box::new(ParenthesizedListSource),
                Box::new(AfterColonSource),
                Box::new(SlashGroupSource::new(TextField::Description)),
            ],
            vec![
                Box::new(MinLengthFilter::default()),
                Box::new(DigitNoiseFilter::default()),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vacancy<'a>(title: &'a str, description: &'a str) -> VacancyText<'a> {
        VacancyText {
            structured: &[],
            title,
            description,
        }
    }

    #[test]
    fn test_slash_groups_split() {
        let source = SlashGroupSource::new(TextField::Title);
        let got = source.candidates(&vacancy("Разработчик Java/Kotlin и CI/CD", ""));
        assert_eq!(got, vec!["Java", "Kotlin", "CI", "CD"]);
    }

    #[test]
    fn test_slash_groups_in_description_markup() {
        let source = SlashGroupSource::new(TextField::Description);
        let got = source.candidates(&vacancy("", "<p>Stack: <b>React/Redux</b></p><ul><li>Docker</li></ul>"));
        assert_eq!(got, vec!["React", "Redux"]);
    }

    #[test]
    fn test_parenthesized_lists() {
        let got = ParenthesizedListSource.candidates(&vacancy("Backend (Python, Go) (remote)", ""));
        assert_eq!(got, vec!["Python", " Go", "remote"]);
    }

    #[test]
    fn test_after_colon() {
        let got = AfterColonSource.candidates(&vacancy("Developer: Kotlin, remote", ""));
        assert_eq!(got, vec!["Kotlin"]);
    }

    #[test]
    fn test_digit_noise_filter() {
        let filter = DigitNoiseFilter::default();
        assert!(filter.accepts("C++"));
        assert!(!filter.accepts("C++3"));
        assert!(!filter.accepts("Java 17"));
        assert!(!filter.accepts("6+ years"));
        assert!(!filter.accepts("Python 20"));
        assert!(!filter.accepts("ES2025"));
        assert!(filter.accepts("Java8"));
        assert!(filter.accepts("ES5"));
        assert!(filter.accepts("Vue 2.0"));
        assert!(!filter.accepts("10x"));
        assert!(filter.accepts("2D"));
    }

    #[test]
    fn test_min_length_filter_counts_chars() {
        let filter = MinLengthFilter::default();
        assert!(!filter.accepts("C"));
        assert!(filter.accepts("Go"));
        assert!(!filter.accepts("Я"));
        assert!(filter.accepts("1С"));
    }

    #[test]
    fn test_strip_markup() {
        assert_eq!(strip_markup(""), "");
        assert_eq!(strip_markup("<p>Hello</p><p>World</p>"), "Hello World");
        assert_eq!(strip_markup("plain text"), "plain text");
    }
}
