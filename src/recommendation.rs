//! Keyword-matched recommendations.
//!
//! Free text is classified into a [`Concern`] by substring matching and the
//! concern (or, for [`Concern::General`], the phase) selects a fixed template.

use serde::Serialize;

use crate::cycle::Phase;

const PAIN_KEYWORDS: &[&str] = &["pain", "cramp", "hurt", "ache", "sore", "uncomfortable", "bloated"];
const ENERGY_KEYWORDS: &[&str] = &["tired", "exhausted", "energy", "fatigue", "sleepy", "drained"];
const MOOD_KEYWORDS: &[&str] = &["sad", "happy", "anxious", "stressed", "moody", "emotional", "irritated"];
const HUNGER_KEYWORDS: &[&str] = &["hungry", "craving", "appetite", "food", "eat", "snack"];
const SPECIFIC_SYMPTOMS: &[&str] = &["pain", "cramp", "tired", "mood", "craving", "bloated", "energy"];

const BASE_CONFIDENCE: f64 = 0.5;
const MAX_CONFIDENCE: f64 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Concern {
    Pain,
    Energy,
    Mood,
    Hunger,
    General,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Nutrition,
    SelfCare,
    Productivity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub title: String,
    pub description: String,
    pub tips: Vec<&'static str>,
    pub icon: &'static str,
    pub category: Category,
    pub concern: Concern,
    pub phase: Phase,
    pub confidence: f64,
}

struct Template {
    title: &'static str,
    /// `{phase}` is replaced with the phase name.
    description: &'static str,
    tips: [&'static str; 4],
    icon: &'static str,
    category: Category,
}

/// First matching concern in priority order pain, energy, mood, hunger.
pub fn classify(text: &str) -> Concern {
    let lower = text.to_lowercase();
    let mentions = |keywords: &[&str]| keywords.iter().any(|k| lower.contains(k));

    if mentions(PAIN_KEYWORDS) {
        Concern::Pain
    } else if mentions(ENERGY_KEYWORDS) {
        Concern::Energy
    } else if mentions(MOOD_KEYWORDS) {
        Concern::Mood
    } else if mentions(HUNGER_KEYWORDS) {
        Concern::Hunger
    } else {
        Concern::General
    }
}

/// Heuristic confidence for a free-text request; longer and more specific
/// input scores higher.
pub fn confidence(text: &str) -> f64 {
    let words = text.split_whitespace().count();
    let lower = text.to_lowercase();

    let mut score = BASE_CONFIDENCE;
    if words > 10 {
        score += 0.2;
    }
    if SPECIFIC_SYMPTOMS.iter().any(|k| lower.contains(k)) {
        score += 0.2;
    }
    if words > 20 {
        score += 0.1;
    }
    score.min(MAX_CONFIDENCE)
}

pub fn recommend(text: &str, phase: Phase) -> Recommendation {
    let concern = classify(text);
    let template = template_for(concern, phase);
    Recommendation {
        title: template.title.to_string(),
        description: template.description.replace("{phase}", phase.as_str()),
        tips: template.tips.to_vec(),
        icon: template.icon,
        category: template.category,
        concern,
        phase,
        confidence: confidence(text),
    }
}

fn template_for(concern: Concern, phase: Phase) -> &'static Template {
    match concern {
        Concern::Pain => &PAIN,
        Concern::Energy => &ENERGY,
        Concern::Mood => &MOOD,
        Concern::Hunger => &HUNGER,
        Concern::General => match phase {
            Phase::Menstrual => &MENSTRUAL,
            Phase::Follicular => &FOLLICULAR,
            Phase::Ovulatory => &OVULATORY,
            Phase::Luteal => &LUTEAL,
        },
    }
}

static PAIN: Template = Template {
    title: "Targeted Pain Relief",
    description: "Based on your description of discomfort during your {phase} phase, here are evidence-based suggestions to help you feel better",
    tips: [
        "Apply heat therapy for 15-20 minutes to reduce muscle tension",
        "Try gentle stretches focusing on your lower back and hips",
        "Consider anti-inflammatory foods like turmeric and ginger",
        "Practice deep breathing to help your body relax and manage pain",
    ],
    icon: "🤗",
    category: Category::SelfCare,
};

static ENERGY: Template = Template {
    title: "Natural Energy Boost",
    description: "Gentle, sustainable ways to support your energy levels during your {phase} phase",
    tips: [
        "Focus on iron-rich foods like spinach, beans, and lean meats",
        "Take short 5-10 minute walks to improve circulation",
        "Ensure consistent sleep schedule of 7-9 hours",
        "Try energizing but gentle yoga poses like cat-cow stretches",
    ],
    icon: "⚡",
    category: Category::Nutrition,
};

static MOOD: Template = Template {
    title: "Emotional Wellness Support",
    description: "Mood-supporting strategies tailored for your {phase} phase and how you're feeling right now",
    tips: [
        "Practice 5-10 minutes of mindfulness or meditation",
        "Include mood-supporting foods like dark chocolate and nuts",
        "Try journaling to process and understand your emotions",
        "Connect with supportive friends or family members",
    ],
    icon: "🌈",
    category: Category::SelfCare,
};

static HUNGER: Template = Template {
    title: "Smart Nourishment Strategy",
    description: "Balanced nutrition approach for managing hunger and cravings during your {phase} phase",
    tips: [
        "Combine cravings with nutritious additions (e.g., dark chocolate with nuts)",
        "Focus on protein and healthy fats to maintain satiety",
        "Stay hydrated as dehydration can mimic hunger",
        "Plan regular, balanced meals to prevent extreme hunger",
    ],
    icon: "🍎",
    category: Category::Nutrition,
};

static MENSTRUAL: Template = Template {
    title: "Gentle Menstrual Support",
    description: "Nurturing care recommendations for your {phase} phase",
    tips: [
        "Honor your need for rest and slower pace",
        "Use heat therapy for comfort",
        "Eat warming, iron-rich foods",
        "Practice extra self-compassion",
    ],
    icon: "🌙",
    category: Category::SelfCare,
};

static FOLLICULAR: Template = Template {
    title: "Growth & Renewal Energy",
    description: "Harness your natural renewal energy during the {phase} phase",
    tips: [
        "Try new activities or learn something new",
        "Focus on strength-building exercises",
        "Eat fresh, seasonal foods",
        "Plan creative or challenging projects",
    ],
    icon: "🌱",
    category: Category::Productivity,
};

static OVULATORY: Template = Template {
    title: "Peak Performance Optimization",
    description: "Make the most of your natural peak energy during ovulation",
    tips: [
        "Schedule important conversations or presentations",
        "Try your most challenging workouts",
        "Focus on social connections and networking",
        "Take on ambitious goals or projects",
    ],
    icon: "✨",
    category: Category::Productivity,
};

static LUTEAL: Template = Template {
    title: "Balanced Transition Support",
    description: "Maintain comfort and balance during your {phase} phase",
    tips: [
        "Focus on complex carbohydrates for steady energy",
        "Practice stress-reduction and mindfulness",
        "Prepare mentally and physically for menstruation",
        "Listen carefully to your body's changing needs",
    ],
    icon: "🍂",
    category: Category::Nutrition,
};
