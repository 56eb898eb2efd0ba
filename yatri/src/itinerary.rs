//! Template-based trip itineraries.
//!
//! A free-text prompt is reduced to a [`TripPlan`] (destination and number of days) by keyword
//! matching, then rendered to an HTML fragment. When several keywords match, the one checked last
//! wins: Bengaluru over Mysore over Hampi over Coorg, and 7 days over 5 over 4 over 3.

use minijinja::{AutoEscape, Environment, context};
use serde::Serialize;
use thiserror::Error;

const TEMPLATE_NAME: &str = "itinerary.html";
const TEMPLATE: &str = include_str!("../assets/templates/itinerary.html");

const DEFAULT_DAYS: u32 = 5;

#[derive(Debug, Error)]
pub enum ItineraryError {
    #[error("failed to render itinerary: {0}")]
    Render(#[from] minijinja::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Coorg,
    Hampi,
    Mysore,
    Bengaluru,
    Karnataka,
}

impl Destination {
    fn detect(prompt: &str) -> Self {
        let mut destination = Destination::Karnataka;
        if prompt.contains("coorg") {
            destination = Destination::Coorg;
        }
        if prompt.contains("hampi") {
            destination = Destination::Hampi;
        }
        if prompt.contains("mysore") {
            destination = Destination::Mysore;
        }
        if prompt.contains("bangalore") || prompt.contains("bengaluru") {
            destination = Destination::Bengaluru;
        }
        destination
    }
}

/// What the traveller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TripPlan {
    pub destination: Destination,
    pub days: u32,
}

impl TripPlan {
    pub fn from_prompt(prompt: &str) -> Self {
        let prompt = prompt.to_lowercase();

        let mut days = DEFAULT_DAYS;
        for candidate in [3, 4, 5, 7] {
            if prompt.contains(&format!("{candidate}-day")) || prompt.contains(&format!("{candidate} day")) {
                days = candidate;
            }
        }

        Self {
            destination: Destination::detect(&prompt),
            days,
        }
    }
}

#[derive(Debug, Serialize)]
struct DayPlan {
    title: &'static str,
    activities: &'static [&'static str],
}

const COORG: [DayPlan; 5] = [
    DayPlan {
        title: "Arrival & Relaxation",
        activities: &[
            "Arrive in Madikeri, the capital of Coorg",
            "Check into your accommodation - we recommend a coffee plantation stay",
            "Visit Abbey Falls in the evening",
            "Enjoy a traditional Kodava dinner",
        ],
    },
    DayPlan {
        title: "Nature & Wildlife",
        activities: &[
            "Early morning trek to Tadiandamol Peak",
            "Visit Dubare Elephant Camp",
            "Afternoon river rafting in the Cauvery River",
            "Evening coffee plantation tour",
        ],
    },
    DayPlan {
        title: "Culture & Heritage",
        activities: &[
            "Visit Raja's Seat for panoramic views",
            "Explore Madikeri Fort",
            "Visit the Omkareshwara Temple",
            "Shop for local spices and coffee",
        ],
    },
    DayPlan {
        title: "Culinary Experiences",
        activities: &[
            "Kodava cuisine cooking class",
            "Visit to local markets",
            "Coffee tasting session",
            "Evening cultural performance",
        ],
    },
    DayPlan {
        title: "Relaxation & Departure",
        activities: &[
            "Morning yoga session amidst nature",
            "Visit to Nagarhole National Park",
            "Last-minute souvenir shopping",
            "Departure with sweet memories",
        ],
    },
];

const HAMPI: [DayPlan; 3] = [
    DayPlan {
        title: "Arrival & Introduction",
        activities: &[
            "Arrive in Hampi",
            "Check into your accommodation",
            "Evening visit to Hemakuta Hill for sunset",
            "Orientation walk around Hampi Bazaar",
        ],
    },
    DayPlan {
        title: "Sacred Center",
        activities: &[
            "Visit Virupaksha Temple",
            "Explore Krishna Temple and Lakshmi Narasimha",
            "Afternoon at Underground Shiva Temple",
            "Evening boat ride across the Tungabhadra River",
        ],
    },
    DayPlan {
        title: "Royal Enclosure",
        activities: &[
            "Visit the Royal Enclosure",
            "Explore Hazara Rama Temple",
            "See the Queen's Bath and Lotus Mahal",
            "Evening at Mahanavami Dibba",
        ],
    },
];

const KARNATAKA: [DayPlan; 5] = [
    DayPlan {
        title: "Bengaluru",
        activities: &[
            "Arrive in Bengaluru, the Garden City",
            "Visit Lalbagh Botanical Garden",
            "Explore Cubbon Park",
            "Evening at MG Road and Commercial Street",
        ],
    },
    DayPlan {
        title: "Mysore",
        activities: &[
            "Travel to Mysore",
            "Visit the magnificent Mysore Palace",
            "Explore Chamundi Hills",
            "Evening at Devaraja Market",
        ],
    },
    DayPlan {
        title: "Coorg",
        activities: &[
            "Travel to Coorg",
            "Visit Abbey Falls",
            "Explore a coffee plantation",
            "Evening at Raja's Seat",
        ],
    },
    DayPlan {
        title: "Hampi",
        activities: &[
            "Travel to Hampi",
            "Explore the ancient ruins",
            "Visit Virupaksha Temple",
            "Sunset from Hemakuta Hill",
        ],
    },
    DayPlan {
        title: "Gokarna/Murudeshwar",
        activities: &[
            "Travel to the coastal region",
            "Relax at Om Beach in Gokarna",
            "Visit Murudeshwar Temple",
            "Enjoy fresh seafood by the beach",
        ],
    },
];

/// Three core days, a fourth for trips longer than three days, a fifth for trips of five or more.
fn scheduled_days(requested: u32) -> usize {
    match requested {
        0..=3 => 3,
        4 => 4,
        _ => 5,
    }
}

/// Renders itineraries from the embedded template.
#[derive(Debug)]
pub struct TripPlanner {
    env: Environment<'static>,
}

impl TripPlanner {
    pub fn new() -> Result<Self, ItineraryError> {
        let mut env = Environment::new();
        // Day plans are fixed strings and the output is embedded as-is by the frontend
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.add_template(TEMPLATE_NAME, TEMPLATE)?;
        Ok(Self { env })
    }

    pub fn render(&self, plan: &TripPlan) -> Result<String, ItineraryError> {
        let (heading, intro, schedule): (&str, &str, &[DayPlan]) = match plan.destination {
            Destination::Coorg => (
                "Coorg Adventure",
                "Experience the beauty of the Scotland of India with this personalized itinerary:",
                &COORG[..scheduled_days(plan.days)],
            ),
            // Hampi is a fixed three-day tour whatever the requested length
            Destination::Hampi => (
                "Hampi Cultural Tour",
                "Explore the ancient ruins of the Vijayanagara Empire with this itinerary:",
                &HAMPI,
            ),
            Destination::Mysore | Destination::Bengaluru | Destination::Karnataka => (
                "Karnataka Adventure",
                "Experience the diverse beauty of Karnataka with this personalized itinerary:",
                &KARNATAKA[..scheduled_days(plan.days)],
            ),
        };

        let template = self.env.get_template(TEMPLATE_NAME)?;
        let html = template.render(context! {
            days => plan.days,
            heading => heading,
            intro => intro,
            schedule => schedule,
        })?;
        Ok(html)
    }

    /// Parse `prompt` and render the matching itinerary.
    pub fn plan(&self, prompt: &str) -> Result<String, ItineraryError> {
        self.render(&TripPlan::from_prompt(prompt))
    }
}
