//! Zombie-fighting activities suggested when an alert fires.
//!
//! Selection is a uniform pick over the catalog. The just-shown activity is
//! not excluded, so "change task" can land on the same entry again.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A suggested movement and the zompoints it is worth.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Activity {
    pub description: String,
    pub points: u32,
}

impl Activity {
    pub fn new(description: impl Into<String>, points: u32) -> Self {
        Self {
            description: description.into(),
            points,
        }
    }
}

const STANDARD_ACTIVITIES: [(&str, u32); 14] = [
    ("Do 5 zombie arm raises", 10),
    ("Walk like a zombie for 2 minutes", 25),
    ("Do 10 zombie shuffles", 15),
    ("Take 5 deep zombie breaths", 8),
    ("Zombie dance for 1 minute", 20),
    ("Do a zombie yoga pose", 18),
    ("Call a friend and do zombie voice", 30),
    ("Do some zombie neck stretches", 12),
    ("Do 20 zombie jumping jacks", 25),
    ("Practice zombie mindfulness for 3 minutes", 22),
    ("Send a zombie message to family", 15),
    ("Do a quick zombie dance move", 12),
    ("Zombie walk around the room", 18),
    ("Practice zombie survival moves", 35),
];

/// Fixed, non-empty list of activities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    activities: Vec<Activity>,
}

impl Catalog {
    /// The 14 built-in activities.
    pub fn standard() -> Self {
        Self {
            activities: STANDARD_ACTIVITIES
                .iter()
                .map(|&(description, points)| Activity::new(description, points))
                .collect(),
        }
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    pub fn contains(&self, activity: &Activity) -> bool {
        self.activities.contains(activity)
    }

    /// Uniform pick. Repeats of the previous pick are allowed.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Activity {
        self.activities
            .choose(rng)
            .cloned()
            // The standard catalog is never empty; this only guards `Default`.
            .unwrap_or_else(|| {
                let (description, points) = STANDARD_ACTIVITIES[0];
                Activity::new(description, points)
            })
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}
