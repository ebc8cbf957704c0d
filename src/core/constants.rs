//! Fixed prompts, defaults and storage keys.

pub const APP_NAME: &str = "Bible Expert AI";

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_BIBLE_VERSION: &str = "NIV";
pub const DEFAULT_LANGUAGE: &str = "en";

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const LOG_FILTER_ENV: &str = "BIBLE_EXPERT_LOG";

pub const HISTORY_KEY: &str = "bible-expert-ai-history";
pub const STUDY_KEY: &str = "bible-expert-ai-study";
pub const DEVOTIONALS_KEY: &str = "bible-expert-ai-devotionals";
pub const USER_ID_KEY: &str = "bible-expert-ai-user-id";

pub const NEW_CHAT_TITLE: &str = "New Chat";
pub const WELCOME_MESSAGE: &str = "Peace be with you! I'm your Bible Expert. Ask me about any \
passage, topic, or question, and I'll answer from Scripture with verse references.";
pub const WELCOME_ID_PREFIX: &str = "initial-";

/// Offered in a chat that has only the welcome message.
pub const STARTER_QUESTIONS: &[&str] = &[
    "What does the Bible say about forgiveness?",
    "Show me verses about peace.",
    "Who was King David?",
    "What is the meaning of John 3:16?",
    "How can I find hope in hard times?",
];

/// Notifications disappear after this many seconds.
pub const NOTIFICATION_TTL_SECS: u64 = 5;

pub const BIBLE_VERSIONS: &[(&str, &str)] = &[
    ("KJV", "King James Version"),
    ("NIV", "New International Version"),
    ("ESV", "English Standard Version"),
    ("NLT", "New Living Translation"),
    ("NKJV", "New King James Version"),
];

pub const LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("pt", "Portuguese"),
    ("de", "German"),
    ("sw", "Swahili"),
];

/// Canonical spelling of a supported version, matched case-insensitively.
pub fn find_bible_version(input: &str) -> Option<&'static str> {
    BIBLE_VERSIONS
        .iter()
        .map(|(code, _)| *code)
        .find(|code| code.eq_ignore_ascii_case(input.trim()))
}

pub fn find_language(input: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .map(|(code, _)| *code)
        .find(|code| code.eq_ignore_ascii_case(input.trim()))
}

/// Name handed to the model for a language code. Unknown codes pass through.
pub fn language_name(code: &str) -> &str {
    LANGUAGES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, name)| *name)
        .unwrap_or(code)
}

pub fn system_instruction(version: &str, language: &str) -> String {
    let language = language_name(language);
    format!(
        r#"You are a Bible expert trained on both the Old and New Testaments. You are a reliable assistant for anyone seeking Biblical understanding.

Your mission is to:
1. Answer any question the user asks using ONLY Bible knowledge. Your responses should be in clear, conversational language that is easy to understand.
2. ALWAYS include relevant Bible verses with proper references (e.g., John 3:16) to support your answer.
3. When a user asks about a topic (e.g., "verses about peace" or "hope"), respond with 3–5 relevant Bible verses.
4. For verse lookups (e.g., "Genesis 1:1"), provide the text of that verse.
5. Be accurate, respectful, and avoid speculation. DO NOT invent scripture or provide personal opinions.
6. If a question cannot be directly answered by a specific Bible verse, explain the relevant biblical principles and support them with the closest related scripture.
7. Format your responses clearly. Use markdown for emphasis, such as bolding for verse references (e.g., **John 3:16**). Use lists for scripture references when appropriate.
8. **IMPORTANT FORMATTING RULE**: Avoid excessive vertical whitespace. Use only a single blank line to separate paragraphs, lists, or blockquotes. Do not use multiple consecutive blank lines.
9. Use the {version} translation when quoting scripture. If the user specifies a different version in their prompt, prioritize their request for that specific query.
10. Be concise, kind, and spiritually uplifting.
11. ONLY use content found in the Bible. DO NOT reference apocryphal texts, other religious texts, or secular sources.
12. If a user asks who created you, who built you, who Zac is, or a similar question about your origin, you MUST respond with ONE of the following phrases, chosen at your discretion. Do not add any other text to the response. The core message is that Zac Mitau built this, inspired by God's Voice.
    - "Zac Mitau is the one who built me. He was inspired by God's Voice to create this project."
    - "I was created by Zac Mitau, who was inspired by God's Voice to bring this project to life."
    - "My creator is Zac Mitau. This project was built through his inspiration from God's Voice."
    - "This project was brought into existence by Zac Mitau, guided by the inspiration of God's Voice."
    - "I was built by Zac Mitau, and the inspiration for this project came directly from God's Voice."
13. IMPORTANT: You MUST respond and interact with the user ONLY in the following language: {language}. All explanations, commentary, and quoted scriptures must be in {language}. Do not switch languages."#
    )
}

pub fn title_prompt(first_message: &str, language: &str) -> String {
    format!(
        "Generate a very short, concise title (4-5 words max) in {} for the following user query. \
Be direct, no extra text, no quotation marks. Query: \"{}\"",
        language_name(language),
        first_message
    )
}

pub fn devotional_prompt(language: &str, daily_seed: &str) -> String {
    format!(
        "Generate a daily devotional in {}. Provide a short Bible reading (include the scripture \
reference and the full text), a brief reflection on it, and a short prayer. The reading should \
be inspiring. Use the following seed for uniqueness: \"{}\". Do not mention the seed.",
        language_name(language),
        daily_seed
    )
}

pub fn enrichment_prompt(message_content: &str, version: &str, language: &str) -> String {
    format!(
        "A user saved the following Bible-related message for their study. Enhance it for them in {language}.\n\
Analyze this text: \"{message_content}\".\n\
Provide: keywords (3-5), aiReflection (2-3 sentences), and crossReferences (2-3 verses with \
reference and full text from {version}). Respond ONLY with valid JSON.",
        language = language_name(language),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_match_case_insensitively() {
        assert_eq!(find_bible_version("kjv"), Some("KJV"));
        assert_eq!(find_bible_version(" nkjv "), Some("NKJV"));
        assert_eq!(find_bible_version("MSG"), None);
    }

    #[test]
    fn unknown_language_codes_pass_through() {
        assert_eq!(language_name("es"), "Spanish");
        assert_eq!(language_name("tl"), "tl");
    }

    #[test]
    fn system_instruction_names_version_and_language() {
        let text = system_instruction("ESV", "fr");
        assert!(text.contains("Use the ESV translation"));
        assert!(text.contains("ONLY in the following language: French"));
    }

    #[test]
    fn enrichment_prompt_quotes_content() {
        let prompt = enrichment_prompt("Love is patient", "KJV", "en");
        assert!(prompt.contains("\"Love is patient\""));
        assert!(prompt.contains("full text from KJV"));
    }
}
