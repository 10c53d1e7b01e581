//! Deterministic local fallback responder
//!
//! A pure keyword matcher: no network, no state. It answers whenever no
//! credential is configured and whenever a remote completion comes back
//! without usable content. Matching is case-insensitive and first-match-wins
//! over an ordered intent table, so tests can enumerate every category.

/// How an intent is recognized against the lower-cased input.
#[derive(Debug)]
enum Match {
    /// Input starts with one of the words (followed by a word boundary).
    Prefix(&'static [&'static str]),
    /// Input contains one of the phrases anywhere.
    Contains(&'static [&'static str]),
}

impl Match {
    fn hit(&self, lowered: &str) -> bool {
        match self {
            Match::Prefix(words) => words.iter().any(|w| {
                lowered.strip_prefix(w).is_some_and(|rest| {
                    rest.chars().next().is_none_or(|c| !c.is_alphanumeric())
                })
            }),
            Match::Contains(phrases) => phrases.iter().any(|p| lowered.contains(p)),
        }
    }
}

struct Intent {
    matches: Match,
    reply: &'static str,
}

/// Ordered intent table; the first hit wins, no partial scoring.
const INTENTS: &[Intent] = &[
    Intent {
        matches: Match::Prefix(&[
            "hi",
            "hello",
            "hey",
            "good morning",
            "good afternoon",
            "good evening",
        ]),
        reply: "Hello! I'm Banter, your AI companion. How can I help you today?",
    },
    Intent {
        matches: Match::Contains(&["how are you", "how're you", "how r u"]),
        reply: "I'm doing great, thanks for asking! I'm ready to dig into whatever \
                you have in mind. What would you like to talk about?",
    },
    Intent {
        matches: Match::Contains(&[
            "what can you do",
            "what do you do",
            "your capabilities",
            "help me",
        ]),
        reply: "I can answer questions, explain concepts, help you think through \
                problems, and keep you company in conversation. What would you \
                like help with?",
    },
    Intent {
        matches: Match::Contains(&["tell me about", "what is", "what are", "explain"]),
        reply: "That's an interesting topic. I can give you a general overview, and \
                you can ask follow-up questions wherever you want to go deeper.",
    },
    Intent {
        matches: Match::Contains(&[
            "code",
            "program",
            "javascript",
            "python",
            "rust",
            "react",
            "css",
            "html",
        ]),
        reply: "I'm happy to help with programming questions. Tell me what you're \
                building or paste the error you're seeing and we can work through \
                it together.",
    },
    Intent {
        matches: Match::Contains(&["thank you", "thanks", "thank u"]),
        reply: "You're welcome! Feel free to ask me anything else.",
    },
    Intent {
        matches: Match::Contains(&["bye", "goodbye", "see you", "exit", "quit"]),
        reply: "Goodbye! It was nice chatting with you. Come back any time.",
    },
    Intent {
        matches: Match::Contains(&["who are you", "your name"]),
        reply: "I'm Banter, your personal AI companion. I answer questions, help \
                you think through ideas, and keep the conversation going.",
    },
];

/// Produce a canned reply for `input`.
///
/// Matching happens on the lower-cased input; the generic acknowledgment
/// echoes the original text verbatim.
pub fn respond_locally(input: &str) -> String {
    let lowered = input.to_lowercase();
    for intent in INTENTS {
        if intent.matches.hit(&lowered) {
            return intent.reply.to_string();
        }
    }
    format!(
        "I understand you're asking about \"{}\". Here's my best general take: \
         add a little more detail or ask a follow-up question and I can be more \
         specific.",
        input.trim()
    )
}
