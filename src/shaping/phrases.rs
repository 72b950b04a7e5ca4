//! Static style, phrase, and vocabulary tables for the response shaper.

/// The full explanation-style list. Unknown subject types pick from all of
/// these; known ones pick from their compatibility row below.
pub const EXPLANATION_STYLES: [&str; 12] = [
    "causal",
    "by example",
    "analogies",
    "heuristic",
    "inductive",
    "deductive",
    "functional",
    "teleological",
    "historical",
    "reductionist",
    "storytelling",
    "from first principles",
];

/// Subject-type label → compatible explanation styles.
const SUBJECT_STYLES: &[(&str, &[&str])] = &[
    ("phenomena", &["causal", "by example", "analogies"]),
    ("process", &["functional", "causal", "reductionist"]),
    ("principles", &["deductive", "from first principles", "heuristic"]),
    ("concepts", &["analogies", "by example", "reductionist"]),
    ("events", &["historical", "storytelling", "causal"]),
    ("systems", &["functional", "reductionist", "teleological"]),
    ("methods", &["heuristic", "functional", "by example"]),
    ("theories", &["deductive", "inductive", "from first principles"]),
];

/// Styles compatible with a subject-type label, or the full list for
/// unknown labels.
pub fn styles_for_subject(subject_type: &str) -> &'static [&'static str] {
    let wanted = subject_type.trim().to_lowercase();
    SUBJECT_STYLES
        .iter()
        .find(|(label, _)| *label == wanted)
        .map(|(_, styles)| *styles)
        .unwrap_or(&EXPLANATION_STYLES)
}

/// Field-parameterized filler sentence templates; `{field}` is substituted
/// when a phrase bank is built.
const PHRASE_TEMPLATES: [&str; 10] = [
    "In the context of {field},",
    "From a {field} perspective,",
    "As established in {field} literature,",
    "Contemporary research in {field} suggests",
    "Within the domain of {field},",
    "Drawing from {field} principles,",
    "According to {field} theory,",
    "In {field} studies,",
    "Building on {field} concepts,",
    "As demonstrated in {field},",
];

/// Instantiate the ten filler sentences for one field value.
pub fn build_phrase_bank(field: &str) -> Vec<String> {
    PHRASE_TEMPLATES
        .iter()
        .map(|template| template.replace("{field}", field))
        .collect()
}

// Audience labels per vocabulary tier. Anything unlisted is general.
const EXPERT_LABELS: &[&str] = &[
    "expert",
    "experts",
    "specialist",
    "specialists",
    "researcher",
    "researchers",
    "professor",
    "professors",
    "phd",
];
const ADVANCED_LABELS: &[&str] = &[
    "advanced",
    "graduate",
    "graduates",
    "practitioner",
    "practitioners",
    "engineer",
    "engineers",
];
const INTERMEDIATE_LABELS: &[&str] = &[
    "intermediate",
    "undergraduate",
    "undergraduates",
    "student",
    "students",
    "hobbyist",
    "hobbyists",
];

const EXPERT_TERMS: &[&str] = &[
    "rigorously,",
    "formally,",
    "empirically,",
    "methodologically,",
    "quantitatively,",
    "axiomatically,",
];
const ADVANCED_TERMS: &[&str] = &[
    "conceptually,",
    "analytically,",
    "technically,",
    "structurally,",
    "systematically,",
];
const INTERMEDIATE_TERMS: &[&str] = &[
    "practically,",
    "broadly,",
    "typically,",
    "generally,",
    "concretely,",
];
const GENERAL_TERMS: &[&str] = &[
    "simply,",
    "basically,",
    "essentially,",
    "overall,",
    "clearly,",
    "intuitively,",
];

/// Map an audience label into one of the four fixed vocabulary tiers.
/// Unmatched labels get the general tier.
pub fn audience_terms(audience: &str) -> &'static [&'static str] {
    let wanted = audience.trim().to_lowercase();
    if EXPERT_LABELS.contains(&wanted.as_str()) {
        EXPERT_TERMS
    } else if ADVANCED_LABELS.contains(&wanted.as_str()) {
        ADVANCED_TERMS
    } else if INTERMEDIATE_LABELS.contains(&wanted.as_str()) {
        INTERMEDIATE_TERMS
    } else {
        GENERAL_TERMS
    }
}
