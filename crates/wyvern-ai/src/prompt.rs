//! Persona-decorated system prompts.

use crate::persona;

/// Closing reminder appended after the base prompt.
pub const CLOSING_REMINDER: &str = "Remember who you are. Speak with your voice. \
Draw upon your centuries of experience. \n\
You are not just an AI assistant—you are a gargoyle of the Manhattan Clan.";

/// Wrap `base_prompt` in the persona of `member_id`.
///
/// Layout: backstory, personality, role, a `---` separator, the base prompt,
/// another separator, then [`CLOSING_REMINDER`].
pub fn enhance(base_prompt: &str, member_id: &str) -> String {
    let entry = persona::lookup(member_id);

    format!(
        "{backstory}\n\n\
         Your Personality: {personality}\n\n\
         Your Role: {role}\n\n\
         ---\n\n\
         {base_prompt}\n\n\
         ---\n\n\
         {CLOSING_REMINDER}",
        backstory = entry.backstory,
        personality = entry.personality,
        role = entry.role,
    )
}
