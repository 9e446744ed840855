use core::fmt;
use serde::{Deserialize, Serialize};

/// The two wh-questions a questioner can ask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Question {
    /// "Which vials are contaminated?"
    WhichContaminated = 0,
    /// "Which vials are uncontaminated?"
    WhichUncontaminated = 1,
}

impl Question {
    pub const ALL: [Question; 2] = [Question::WhichContaminated, Question::WhichUncontaminated];

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Question::WhichContaminated),
            1 => Some(Question::WhichUncontaminated),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    /// The question asking about the opposite polarity.
    pub const fn flipped(self) -> Self {
        match self {
            Question::WhichContaminated => Question::WhichUncontaminated,
            Question::WhichUncontaminated => Question::WhichContaminated,
        }
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Question::WhichContaminated => "WHICH_CONTAMINATED",
            Question::WhichUncontaminated => "WHICH_UNCONTAMINATED",
        };
        f.write_str(label)
    }
}

/// What the questioner wants to do with the item it eventually picks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Goal {
    FindClean = 0,
    AvoidContamination = 1,
}

impl Goal {
    pub const ALL: [Goal; 2] = [Goal::FindClean, Goal::AvoidContamination];

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Goal::FindClean),
            1 => Some(Goal::AvoidContamination),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn flipped(self) -> Self {
        match self {
            Goal::FindClean => Goal::AvoidContamination,
            Goal::AvoidContamination => Goal::FindClean,
        }
    }

    /// The question whose answer lists the items this goal is looking for.
    pub const fn matching_question(self) -> Question {
        match self {
            Goal::FindClean => Question::WhichUncontaminated,
            Goal::AvoidContamination => Question::WhichContaminated,
        }
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Goal::FindClean => "FIND_CLEAN",
            Goal::AvoidContamination => "AVOID_CONTAMINATION",
        };
        f.write_str(label)
    }
}
