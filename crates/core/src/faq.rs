//! Fixed airline FAQ, matched by keyword.

use serde::{Deserialize, Serialize};

pub const FAQ_FALLBACK: &str = "I'm sorry, I don't know the answer to that question.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaqTopic {
    Baggage,
    Seating,
    Wifi,
}

impl FaqTopic {
    pub fn answer(&self) -> &'static str {
        match self {
            Self::Baggage => {
                "You are allowed to bring one bag on the plane. \
                 It must be under 50 pounds and 22 inches x 14 inches x 9 inches."
            }
            Self::Seating => {
                "There are 120 seats on the plane. \
                 There are 22 business class seats and 98 economy seats. \
                 Exit rows are rows 4 and 16. \
                 Rows 5-8 are Economy Plus, with extra legroom. "
            }
            Self::Wifi => "We have free wifi on the plane, join Airline-Wifi",
        }
    }
}

/// First matching topic wins, in the order baggage, seating, wifi.
///
/// Keywords are matched case-sensitively, so `WIFI` or `Baggage` has no topic.
pub fn lookup(question: &str) -> Option<FaqTopic> {
    if question.contains("bag") || question.contains("baggage") {
        Some(FaqTopic::Baggage)
    } else if question.contains("seats") || question.contains("plane") {
        Some(FaqTopic::Seating)
    } else if question.contains("wifi") {
        Some(FaqTopic::Wifi)
    } else {
        None
    }
}
