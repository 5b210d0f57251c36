use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Body-part categories the exercise catalog groups its records under.
pub const BODY_PARTS: [&str; 9] = [
    "cardio",
    "chest",
    "lower arms",
    "lower legs",
    "neck",
    "shoulders",
    "upper arms",
    "upper legs",
    "waist",
];

/// A single catalog exercise. Identity and equality follow `id` only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub body_part: String,
    pub equipment: String,
    pub target: String,
    /// Media reference supplied by the catalog. Never interpreted here.
    pub gif_url: String,
    #[serde(default)]
    pub secondary_muscles: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
}

impl Exercise {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            body_part: String::new(),
            equipment: String::new(),
            target: String::new(),
            gif_url: String::new(),
            secondary_muscles: Vec::new(),
            instructions: Vec::new(),
        }
    }

    pub fn with_body_part(mut self, body_part: impl Into<String>) -> Self {
        self.body_part = body_part.into();
        self
    }
}

impl PartialEq for Exercise {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Exercise {}

impl Hash for Exercise {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BodyPartFilter {
    #[default]
    All,
    Only(String),
}

impl BodyPartFilter {
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            BodyPartFilter::All
        } else {
            BodyPartFilter::Only(trimmed.to_lowercase())
        }
    }

    pub fn matches(&self, exercise: &Exercise) -> bool {
        match self {
            BodyPartFilter::All => true,
            BodyPartFilter::Only(part) => exercise.body_part.eq_ignore_ascii_case(part),
        }
    }

    /// True when the filter names one of the known catalog body parts (or is `All`).
    pub fn is_known(&self) -> bool {
        match self {
            BodyPartFilter::All => true,
            BodyPartFilter::Only(part) => BODY_PARTS.contains(&part.as_str()),
        }
    }
}

/// Catalog order is preserved.
pub fn filter_by_body_part<'a>(
    exercises: &'a [Exercise],
    filter: &BodyPartFilter,
) -> Vec<&'a Exercise> {
    exercises.iter().filter(|e| filter.matches(e)).collect()
}
