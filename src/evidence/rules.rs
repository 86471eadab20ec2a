//! Declarative keyword rule tables for evidence extraction.
//!
//! One ordered table per category, each entry a compiled regex mapped to a
//! candidate value. First match wins within a category, except career
//! keywords, where every match is collected. Keeping the patterns in one
//! table (rather than string literals scattered through control flow) makes
//! each rule unit-testable and extendable without touching the extractor.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::evidence::model::{ConfidenceSignal, DirectionSignal, LifeStage};

/// A single keyword rule: compiled pattern → candidate value.
#[derive(Debug, Clone)]
pub struct KeywordRule<T> {
    /// Human-readable pattern description.
    pub pattern: String,
    /// Compiled regex for matching.
    pub regex: Regex,
    /// Value produced when this rule matches.
    pub value: T,
}

impl<T: Clone> KeywordRule<T> {
    fn new(pattern: &str, value: T) -> Self {
        Self {
            pattern: pattern.to_string(),
            regex: Regex::new(pattern).expect("static rule pattern must compile"),
            value,
        }
    }
}

/// Broad evidence-coverage flags used by the natural phase-transition
/// heuristic. Accumulated (OR-ed) across all user messages in a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageFlags {
    pub name: bool,
    pub work_study: bool,
    pub interests: bool,
    pub skills: bool,
    pub goals: bool,
}

impl CoverageFlags {
    /// Number of covered categories (of 5).
    pub fn count(&self) -> usize {
        [
            self.name,
            self.work_study,
            self.interests,
            self.skills,
            self.goals,
        ]
        .iter()
        .filter(|b| **b)
        .count()
    }

    /// OR another set of flags into this one. Flags never clear.
    pub fn absorb(&mut self, other: CoverageFlags) {
        self.name |= other.name;
        self.work_study |= other.work_study;
        self.interests |= other.interests;
        self.skills |= other.skills;
        self.goals |= other.goals;
    }
}

/// All compiled rule tables, built once and shared by the extractor.
pub struct RuleTables {
    /// Explicit name phrasings with the name in capture group 1.
    name_rules: Vec<Regex>,
    /// Bare capitalized-word name heuristic, rapport stage only.
    bare_name: Regex,
    life_stage_rules: Vec<KeywordRule<LifeStage>>,
    direction_rules: Vec<KeywordRule<DirectionSignal>>,
    /// Career noun patterns mapped to canonical career names. All matches
    /// collected, not first-wins.
    career_keywords: Vec<KeywordRule<&'static str>>,
    confidence_rules: Vec<KeywordRule<ConfidenceSignal>>,
    intrinsic_markers: Regex,
    extrinsic_markers: Regex,
    uncertainty_markers: Regex,
    enthusiasm_markers: Regex,
    goal_markers: Regex,
    exploration_markers: Regex,
    interest_markers: Regex,
    skill_markers: Regex,
    work_study_markers: Regex,
}

fn rx(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static rule pattern must compile")
}

impl RuleTables {
    /// Build the standard rule tables.
    pub fn standard() -> Self {
        let name_rules = vec![
            rx(r"(?i)\bmy name(?:'s| is)\s+([A-Za-z][A-Za-z'-]+)"),
            rx(r"(?i)\bi(?:'| a)m called\s+([A-Za-z][A-Za-z'-]+)"),
            rx(r"(?i)\bcall me\s+([A-Za-z][A-Za-z'-]+)"),
            rx(r"^(?i:i'?m)\s+([A-Z][a-z'-]+)\s*[.!]?$"),
        ];
        let bare_name = rx(r"^([A-Z][a-z'-]{1,20})[.!]?$");

        // Ordered: the more specific stages first so "in my final year of
        // uni" doesn't land on the school rule.
        let life_stage_rules = vec![
            KeywordRule::new(r"(?i)\bgap year\b", LifeStage::GapYear),
            KeywordRule::new(
                r"(?i)\b(uni|university|college|undergrad|studying (a|for)|my degree|my course)\b",
                LifeStage::UniCollege,
            ),
            KeywordRule::new(
                r"(?i)\b(just graduated|recently graduated|finished (uni|university|college)|i graduated|a graduate)\b",
                LifeStage::Graduate,
            ),
            KeywordRule::new(
                r"(?i)\b(high school|secondary school|sixth form|year (9|10|11|12|13)|gcse|a[- ]levels?)\b",
                LifeStage::SecondarySchool,
            ),
            KeywordRule::new(
                r"(?i)\b(my job|i work|working (at|in|as|full)|full[- ]time|employed|my employer)\b",
                LifeStage::Working,
            ),
            KeywordRule::new(
                r"(?i)\b(not (working|studying|in school|in education)|unemployed|between things)\b",
                LifeStage::Neet,
            ),
        ];

        // Ordered: absence first, then a settled single direction, then the
        // shortlist and exploring phrasings. First match wins.
        let direction_rules = vec![
            KeywordRule::new(
                r"(?i)\b(no idea|no clue|nothing in mind|haven'?t thought about|don'?t have any (career )?ideas?|not really thought)\b",
                DirectionSignal::None,
            ),
            KeywordRule::new(
                r"(?i)\b(i(?:'ve| have) decided|i want to (be|become)|set on|my plan is to|definitely (going|want) to|always wanted to be)\b",
                DirectionSignal::One,
            ),
            KeywordRule::new(
                r"(?i)\b(a few (ideas|options|things)|couple of (ideas|options)|torn between|maybe|or possibly|either .+ or|can'?t decide between)\b",
                DirectionSignal::Few,
            ),
            KeywordRule::new(
                r"(?i)\b(exploring|looking into|keeping my options open|open to (ideas|anything|suggestions)|weighing up)\b",
                DirectionSignal::Exploring,
            ),
        ];

        let career_keywords = vec![
            KeywordRule::new(r"(?i)\bteach(er|ing)?\b", "teaching"),
            KeywordRule::new(r"(?i)\bnurs(e|ing)\b", "nursing"),
            KeywordRule::new(r"(?i)\b(doctor|medicine|medic|gp)\b", "medicine"),
            KeywordRule::new(r"(?i)\bengineer(ing)?\b", "engineering"),
            KeywordRule::new(r"(?i)\b(law|lawyer|solicitor|barrister|legal)\b", "law"),
            KeywordRule::new(
                r"(?i)\b(software|programm(er|ing)|coding|coder|developer|tech)\b",
                "software",
            ),
            KeywordRule::new(r"(?i)\bdesign(er)?\b", "design"),
            KeywordRule::new(r"(?i)\bmarketing\b", "marketing"),
            KeywordRule::new(r"(?i)\b(finance|accounting|accountant|banking)\b", "finance"),
            KeywordRule::new(r"(?i)\b(scientist|research(er)?|science)\b", "science"),
            KeywordRule::new(r"(?i)\bpsycholog(y|ist)\b", "psychology"),
            KeywordRule::new(r"(?i)\b(artist|art school|illustrat)\w*\b", "art"),
            KeywordRule::new(r"(?i)\bmusic(ian)?\b", "music"),
            KeywordRule::new(r"(?i)\b(business|entrepreneur|startup|start[- ]up)\b", "business"),
            KeywordRule::new(r"(?i)\b(electrician|plumber|carpenter|trades?person)\b", "trades"),
            KeywordRule::new(r"(?i)\b(journalis(m|t)|writer|writing career)\b", "journalism"),
            KeywordRule::new(r"(?i)\b(chef|cooking|hospitality|catering)\b", "hospitality"),
            KeywordRule::new(r"(?i)\b(vet|veterinary)\b", "veterinary"),
            KeywordRule::new(r"(?i)\b(architect(ure)?)\b", "architecture"),
            KeywordRule::new(r"(?i)\b(police|firefighter|paramedic|armed forces|military)\b", "uniformed services"),
        ];

        // Negated confidence first so "not very confident" never lands on
        // the positive rules.
        let confidence_rules = vec![
            KeywordRule::new(
                r"(?i)\b(not (very |that |really )?(sure|confident|certain)|unsure|doubt(ing)? myself|second[- ]guessing)\b",
                ConfidenceSignal::Low,
            ),
            KeywordRule::new(
                r"(?i)\b((100%|completely|totally|absolutely) (sure|certain|confident)|no doubt|never been more sure)\b",
                ConfidenceSignal::VeryHigh,
            ),
            KeywordRule::new(
                r"(?i)\b(pretty (sure|confident|certain)|quite (sure|confident)|fairly (sure|confident)|very confident)\b",
                ConfidenceSignal::High,
            ),
            KeywordRule::new(
                r"(?i)\b(somewhat (sure|confident)|think so|reasonably confident|i think that'?s (it|right))\b",
                ConfidenceSignal::Moderate,
            ),
        ];

        Self {
            name_rules,
            bare_name,
            life_stage_rules,
            direction_rules,
            career_keywords,
            confidence_rules,
            intrinsic_markers: rx(
                r"(?i)\b(love|passion(ate)?|enjoy|fascinat\w+|excit(es|ed|ing)|interests me|care about|meaningful|fulfilling)\b",
            ),
            extrinsic_markers: rx(
                r"(?i)\b(money|salary|pay(s|check)? well|parents (want|expect)|expected of me|prestige|stable|stability|job security|status|good benefits)\b",
            ),
            uncertainty_markers: rx(
                r"(?i)\b(i don'?t know|not sure|maybe|i guess|confus(ed|ing)|no idea|dunno|who knows)\b",
            ),
            enthusiasm_markers: rx(
                r"(?i)\b(love|excit(ed|ing)|can'?t wait|amazing|awesome|really want|keen)\b|!",
            ),
            goal_markers: rx(
                r"(?i)\b(goal|hope to|want to|aim(ing)? to|dream|plan(ning)? to|achieve|in (five|5|ten|10) years)\b",
            ),
            exploration_markers: rx(
                r"(?i)\b(work experience|internship|volunteer(ed|ing)?|shadow(ed|ing)?|part[- ]time job|tried out|taster|open day|looked into)\b",
            ),
            interest_markers: rx(
                r"(?i)\b(interest(s|ed)?|hobby|hobbies|enjoy|i(?:'m| am) into|i like|fan of|passionate about)\b",
            ),
            skill_markers: rx(
                r"(?i)\b(good at|skill(s|ed)?|strength|strong at|talent(ed)?|i can|experience (in|with))\b",
            ),
            work_study_markers: rx(
                r"(?i)\b(school|uni|university|college|course|degree|job|work(ing)?|studying|employed|gap year)\b",
            ),
        }
    }

    /// Run an ordered rule table. First match wins.
    fn first_match<T: Copy>(rules: &[KeywordRule<T>], text: &str) -> Option<T> {
        rules.iter().find(|r| r.regex.is_match(text)).map(|r| r.value)
    }

    /// Extract a name from explicit phrasing ("my name is …", "call me …").
    pub fn explicit_name(&self, text: &str) -> Option<String> {
        self.name_rules
            .iter()
            .find_map(|r| r.captures(text))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Bare-word name heuristic. Only safe while the rapport stage is
    /// asking for a name; elsewhere a lone capitalized word is more likely
    /// a career or place.
    pub fn bare_name(&self, text: &str) -> Option<String> {
        self.bare_name
            .captures(text.trim())
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    pub fn life_stage(&self, text: &str) -> Option<LifeStage> {
        Self::first_match(&self.life_stage_rules, text)
    }

    pub fn direction_signal(&self, text: &str) -> Option<DirectionSignal> {
        Self::first_match(&self.direction_rules, text)
    }

    /// All career keywords present, in table order.
    pub fn career_mentions(&self, text: &str) -> Vec<String> {
        self.career_keywords
            .iter()
            .filter(|r| r.regex.is_match(text))
            .map(|r| r.value.to_string())
            .collect()
    }

    pub fn confidence_signal(&self, text: &str) -> Option<ConfidenceSignal> {
        Self::first_match(&self.confidence_rules, text)
    }

    /// Count of intrinsic-motivation marker hits.
    pub fn intrinsic_hits(&self, text: &str) -> usize {
        self.intrinsic_markers.find_iter(text).count()
    }

    /// Count of extrinsic-motivation marker hits.
    pub fn extrinsic_hits(&self, text: &str) -> usize {
        self.extrinsic_markers.find_iter(text).count()
    }

    pub fn has_uncertainty_marker(&self, text: &str) -> bool {
        self.uncertainty_markers.is_match(text)
    }

    pub fn has_enthusiasm_marker(&self, text: &str) -> bool {
        self.enthusiasm_markers.is_match(text)
    }

    pub fn has_goal_marker(&self, text: &str) -> bool {
        self.goal_markers.is_match(text)
    }

    pub fn has_exploration_marker(&self, text: &str) -> bool {
        self.exploration_markers.is_match(text)
    }

    /// Whether any career keyword appears (tool gating).
    pub fn has_career_keyword(&self, text: &str) -> bool {
        self.career_keywords.iter().any(|r| r.regex.is_match(text))
    }

    /// Coverage flags for one message (for the natural-transition check).
    pub fn coverage(&self, text: &str) -> CoverageFlags {
        CoverageFlags {
            name: self.explicit_name(text).is_some(),
            work_study: self.work_study_markers.is_match(text),
            interests: self.interest_markers.is_match(text),
            skills: self.skill_markers.is_match(text),
            goals: self.goal_markers.is_match(text),
        }
    }
}

impl Default for RuleTables {
    fn default() -> Self {
        Self::standard()
    }
}
