//! Care-tip selection.
//!
//! Tips are fixed text blocks keyed by the symptom signals that are active
//! today. When no signal is active there is nothing to show, and
//! [`select_care_tips`] returns `None` rather than an empty list.

use serde::Serialize;

use crate::symptom::SymptomRecord;

/// Appetite at or below this counts as poor.
pub const LOW_APPETITE_LEVEL: u8 = 2;

/// Appetite assumed when a record carries none.
const DEFAULT_APPETITE_LEVEL: u8 = 3;

/// Shown under every tip block.
pub const CARE_DISCLAIMER: &str =
    "General health information, not a diagnosis. Follow your doctor's prescriptions and keep regular check-ups.";

/// Symptom signals that drive tip selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CareSignals {
    pub acid_reflux: bool,
    pub throat_discomfort: bool,
    /// 0-5, lower is worse. `None` when unknown.
    pub appetite_level: Option<u8>,
}

impl CareSignals {
    /// Signals as reported on a single record.
    pub fn from_record(record: &SymptomRecord) -> Self {
        Self {
            acid_reflux: record.acid_reflux,
            throat_discomfort: record.throat_discomfort,
            appetite_level: Some(record.appetite_level),
        }
    }

    pub fn low_appetite(&self) -> bool {
        matches!(self.appetite_level, Some(level) if level <= LOW_APPETITE_LEVEL)
    }

    pub fn any_active(&self) -> bool {
        self.acid_reflux || self.throat_discomfort || self.low_appetite()
    }

    /// Replace the appetite reading with a poor/normal flag.
    pub(crate) fn with_poor_appetite(mut self, poor: bool) -> Self {
        self.appetite_level = Some(if poor { 1 } else { DEFAULT_APPETITE_LEVEL });
        self
    }
}

/// What a tip block addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CareTopic {
    AcidReflux,
    ThroatDiscomfort,
    LowAppetite,
}

/// A titled group of advice lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CareTipBlock {
    pub topic: CareTopic,
    pub title: &'static str,
    pub tips: &'static [&'static str],
}

const REFLUX_BLOCK: CareTipBlock = CareTipBlock {
    topic: CareTopic::AcidReflux,
    title: "Easing acid reflux",
    tips: &[
        "Three don'ts: no lying down after meals, no eating within two hours of bed, raise the head of the bed 15-20 cm",
        "Keep fat and spice low; avoid coffee, alcohol, chocolate, mint, onion and rich meat broth",
        "Sit upright or walk slowly for 20 minutes after main meals; avoid bending over and tight waistbands",
        "Take acid suppressants or prokinetics regularly as prescribed; keep an antacid on hand",
    ],
};

const THROAT_BLOCK: CareTipBlock = CareTipBlock {
    topic: CareTopic::ThroatDiscomfort,
    title: "Throat lump sensation",
    tips: &[
        "Relaxation and stress relief; try not to focus on the sensation",
        "Sip warm water, gargle lightly with salt water or honeysuckle and chrysanthemum tea",
        "Ginger and jujube tea warms the stomach; watch your own tolerance",
        "Herbal formulas only under a practitioner's prescription",
    ],
};

const APPETITE_BLOCK: CareTipBlock = CareTipBlock {
    topic: CareTopic::LowAppetite,
    title: "Improving appetite",
    tips: &[
        "Small frequent meals; a little appetising soup before main meals",
        "Warm, soft, easy-to-digest food: porridge, steamed egg, stews; nothing raw, cold or fried",
        "Hawthorn and malt tea 30 minutes before meals aids digestion (skip it with high stomach acid)",
        "30 minutes of gentle exercise and enough sleep every day",
    ],
};

/// Tip blocks for the active signals, in fixed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CareTips {
    pub blocks: Vec<CareTipBlock>,
    pub disclaimer: &'static str,
}

impl CareTips {
    pub fn contains(&self, topic: CareTopic) -> bool {
        self.blocks.iter().any(|b| b.topic == topic)
    }
}

/// Select tip blocks for the given signals; `None` when no signal is active.
pub fn select_care_tips(signals: &CareSignals) -> Option<CareTips> {
    if !signals.any_active() {
        return None;
    }

    let mut blocks = Vec::with_capacity(3);
    if signals.acid_reflux {
        blocks.push(REFLUX_BLOCK);
    }
    if signals.throat_discomfort {
        blocks.push(THROAT_BLOCK);
    }
    if signals.low_appetite() {
        blocks.push(APPETITE_BLOCK);
    }

    Some(CareTips {
        blocks,
        disclaimer: CARE_DISCLAIMER,
    })
}

const BASE_CHECKLIST: [&str; 3] = [
    "Don't lie down right after meals, stop eating two hours before bed, raise the head of the bed 15-20 cm",
    "Avoid spicy, fried, raw, cold and salty food; choose porridge, steamed egg and stews",
    "20-30 minutes of gentle exercise today (an after-meal walk or tai chi)",
];

/// Today's to-do list: the base routine plus one item per active signal.
pub fn daily_checklist(signals: &CareSignals) -> Vec<&'static str> {
    let mut items = BASE_CHECKLIST.to_vec();
    if signals.acid_reflux {
        items.push("If reflux is worse at night, ask your doctor about a night-time acid suppressant or antacid");
    }
    if signals.throat_discomfort {
        items.push("Gargle with warm water or honeysuckle and chrysanthemum tea; try to relax");
    }
    if signals.low_appetite() {
        items.push("Eat small frequent meals with a little soup first; hawthorn and malt tea if acid allows");
    }
    items
}

/// Catalog search keyword suited to today's signals.
pub fn suggested_food_query(signals: &CareSignals) -> &'static str {
    if signals.throat_discomfort {
        "throat"
    } else if signals.acid_reflux {
        "porridge"
    } else {
        "warm"
    }
}
