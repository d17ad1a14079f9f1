//! Prompt text, response schemas and the fixed fallback payloads.

use crate::stats::StatKey;
use crate::world::{Character, CharacterProfile, HistoryEntry, ImageRef, Skill, SkillKind};
use gemini::Schema;

/// Shown when portrait generation fails even after retry.
pub const PORTRAIT_PLACEHOLDER: &str = "https://lh3.googleusercontent.com/aida-public/AB6AXuCLAKx5KilVQ6C2HBWpxyj2eFD3ag0DuoidnW4L2zf3ROVbYTqHvzG8DLdpqHkBYJVOaTqrSGGkFFVE8am3QXa4y0AlJGYhB2Sr0GTEl1YdCm2DA2Qd1YKhVcV6OqDaZAL214j2NCx288CF95gNA12R42C8OQ7yXIIW3EXAyFs41m8F3ivDpJ-XQT2I83_ykyf5Y98aKbz3phuzVJLjrVerfQT73xizbR8FWlmuOMBK2GRuI7X_M093P4zgps1a353nwGEbl0zGr5Km";

/// Shown when scene art generation fails even after retry.
pub const SCENE_PLACEHOLDER: &str = "https://lh3.googleusercontent.com/aida-public/AB6AXuBSpMXZpauCMb9Iq8akecPXFGb_05yQxeZb7f3oj2gr_9lSH-V8UIbFE1ItN3BhA4DAFBsHxmssYwIQm8a3eAY47W67Wh_fvK-d2FL6Pr5AE0VnNHWkg6IBmDHvvXpdhckJnb0jtx8I4ozbOVTrIF3BrveS7SDGG9VRYJiZqvrYvH4awyRU7qVfDwPCQkUPX5_lGFIvgzs55osc-QndtakOI0kKGJ75_J0YEMSA7sVUz0Bdrtqgnf8LKJBxzkw_W-QdirrcIAQVejyy";

pub const FALLBACK_BACKSTORY: &str = "A mysterious transfer student with a redacted file.";

pub const FALLBACK_SCENE: &str =
    "The void fluctuates, causing a momentary lapse in reality data. The path ahead is unclear.";

pub const FALLBACK_CHOICES: [&str; 3] = [
    "Attempt to recalibrate",
    "Wait for the glitch to pass",
    "Proceed with caution",
];

/// Phrase swaps applied before an image retry. Each replaces the first
/// occurrence only, in this order.
pub const SOFTENING: [(&str, &str); 6] = [
    ("Japanese manga style", "Sci-fi art style"),
    ("highly attractive", "heroic"),
    ("stunning", "detailed"),
    ("alluring", "cool"),
    ("intense gaze", "focused look"),
    ("masterpiece, 8k", ""),
];

/// Tone down an image prompt that the service refused.
pub fn soften_prompt(prompt: &str) -> String {
    SOFTENING
        .iter()
        .fold(prompt.to_string(), |p, (from, to)| p.replacen(from, to, 1))
}

pub fn fallback_skills() -> Vec<Skill> {
    vec![
        Skill::new(
            "Void Strike",
            "Attacks with cosmic energy.",
            SkillKind::Active,
            StatKey::Str,
        ),
        Skill::new(
            "Tech Shield",
            "Deploys a kinetic barrier.",
            SkillKind::Active,
            StatKey::Int,
        ),
        Skill::new(
            "Survivor",
            "Resilient against harsh environments.",
            SkillKind::Passive,
            StatKey::Vit,
        ),
    ]
}

pub fn portrait_placeholder() -> ImageRef {
    ImageRef::url(PORTRAIT_PLACEHOLDER)
}

pub fn scene_placeholder() -> ImageRef {
    ImageRef::url(SCENE_PLACEHOLDER)
}

pub fn details_prompt(profile: &CharacterProfile) -> String {
    format!(
        "Generate a short, compelling backstory (max 80 words) and 3 unique special skills \
         for a character in a Space Opera RPG named \"Scholomance\".\n\
         Character: {}, Race: {}, Class: {}, Background: {}, Alignment: {}.\n\n\
         The skills should be creative, powerful, and fit a high-tech anime/sci-fi magic school theme.\n\
         Each skill must have a 'statScale' (STR, DEX, INT, CHA, or VIT).",
        profile.name, profile.race, profile.class, profile.background, profile.alignment
    )
}

pub fn details_schema() -> Schema {
    let stat_keys: Vec<&str> = StatKey::all().iter().map(|k| k.abbreviation()).collect();
    let skill = Schema::object()
        .property("name", Schema::string())
        .property("description", Schema::string())
        .property(
            "type",
            Schema::string_enum(&[SkillKind::Active.name(), SkillKind::Passive.name()]),
        )
        .property("statScale", Schema::string_enum(&stat_keys))
        .required(&["name", "description", "type", "statScale"]);

    Schema::object()
        .property("backstory", Schema::string())
        .property("skills", Schema::array(skill))
        .required(&["backstory", "skills"])
}

pub fn portrait_prompt(race: &str, class: &str, description: &str) -> String {
    format!(
        "Japanese manga style, charismatic, very high level of detail, 8k resolution, masterpiece.\n\
         Character portrait of a {race} {class} in a futuristic sci-fi Scholomance academy setting.\n\
         The character should look visually impressive, stylish, and heroic.\n\
         {description}.\n\
         Dynamic neon lighting, vibrant colors, clear features.\n\
         Upper body shot, detailed face and eyes."
    )
}

pub fn scene_image_prompt(description: &str) -> String {
    format!(
        "Japanese manga style, stunning sci-fi aesthetic, very high level of detail, masterpiece, 8k.\n\
         Sci-fi space opera background scenery for the Scholomance Academy.\n\
         {description}.\n\
         No text, atmospheric, dramatic lighting, detailed background art, neon cyberpunk accents."
    )
}

pub fn scene_prompt(history: &[HistoryEntry], action: &str, character: &Character) -> String {
    let context = history
        .iter()
        .map(|entry| entry.to_string())
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are the Game Master (GM) of a Space Opera RPG called Scholomance.\n\
         The player is a {} {} named {}.\n\n\
         Previous Context:\n{context}\n\n\
         Player Action: {action}\n\n\
         Task:\n\
         1. Describe the outcome and the new scene (max 60 words). Keep it dramatic, anime-style, engaging and slightly edgy.\n\
         2. Provide 3 distinct, short choices for the player's next move.",
        character.race, character.class, character.name
    )
}

pub fn scene_schema() -> Schema {
    Schema::object()
        .property("description", Schema::string())
        .property("choices", Schema::array(Schema::string()))
        .required(&["description", "choices"])
}
