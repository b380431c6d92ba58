//! Scripted assistant: an ordered list of keyword rules, first match wins.
//!
//! [`respond`] is pure. It never touches storage; when the message carries a
//! phone number it returns the lead to create, and the caller persists it.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{json, Map, Value};

/// Source tag for leads captured by the assistant
pub const LEAD_SOURCE: &str = "chatbot";

#[derive(Debug, Clone, Copy)]
enum Trigger {
    /// Substring of the lowercased message
    Contains(&'static str),
    /// A run of ten or more digits
    PhoneNumber,
}

impl Trigger {
    fn fires(self, lowered: &str) -> bool {
        match self {
            Trigger::Contains(needle) => lowered.contains(needle),
            Trigger::PhoneNumber => phone_pattern().is_match(lowered),
        }
    }
}

struct Rule {
    name: &'static str,
    triggers: &'static [Trigger],
    reply: &'static str,
}

const RULES: &[Rule] = &[
    Rule {
        name: "greeting",
        triggers: &[Trigger::Contains("hello"), Trigger::Contains("hi")],
        reply: "Hello! I'm your real estate assistant. I can help you find properties. What are you looking for?",
    },
    Rule {
        name: "two_bedrooms",
        triggers: &[Trigger::Contains("2 bed"), Trigger::Contains("2 bedroom")],
        reply: "Great! I have several 2-bedroom properties available. What's your budget range? And which area do you prefer?",
    },
    Rule {
        name: "three_bedrooms",
        triggers: &[Trigger::Contains("3 bed"), Trigger::Contains("3 bedroom")],
        reply: "Perfect! I have beautiful 3-bedroom properties. What's your budget? When would you like to schedule a visit?",
    },
    Rule {
        name: "budget",
        triggers: &[Trigger::Contains("budget"), Trigger::Contains("price")],
        reply: "Thanks for sharing your budget! I can show you properties in that range. Please share your phone number so I can send you property details and schedule a visit.",
    },
    Rule {
        name: "visit",
        triggers: &[Trigger::Contains("visit"), Trigger::Contains("viewing")],
        reply: "I'd be happy to arrange a property visit for you! Please provide your name, phone number, and preferred date/time.",
    },
    Rule {
        name: "contact",
        triggers: &[Trigger::Contains("phone"), Trigger::PhoneNumber],
        reply: "Thank you! I've saved your contact information. Our team will call you within 24 hours to schedule your property visit. Is there anything specific you'd like to know about the properties?",
    },
];

const FALLBACK: Rule = Rule {
    name: "fallback",
    triggers: &[],
    reply: "I understand you're interested in real estate. Can you tell me more about what you're looking for? For example: number of bedrooms, preferred location, or budget range?",
};

fn phone_pattern() -> &'static Regex {
    static PHONE: OnceLock<Regex> = OnceLock::new();
    PHONE.get_or_init(|| Regex::new(r"[0-9]{10,}").expect("phone pattern should compile"))
}

/// Result of one assistant turn
#[derive(Debug, Clone, PartialEq)]
pub struct ChatOutcome {
    /// Name of the rule that produced the reply
    pub rule: &'static str,
    pub response: &'static str,
    /// Fields for a new lead, present when the message carried a phone number
    pub lead: Option<Map<String, Value>>,
}

/// Pick a reply for `message` and describe any lead to capture.
///
/// Phone capture is independent of which rule answered: a message with a
/// ten-plus digit run always yields exactly one lead.
pub fn respond(message: &str, context: Option<&Map<String, Value>>) -> ChatOutcome {
    let lowered = message.to_lowercase();

    let rule = RULES
        .iter()
        .find(|rule| rule.triggers.iter().any(|trigger| trigger.fires(&lowered)))
        .unwrap_or(&FALLBACK);

    let lead = phone_pattern().find(message).map(|phone| {
        let mut fields = Map::new();
        fields.insert("source".to_string(), json!(LEAD_SOURCE));
        fields.insert("phone".to_string(), json!(phone.as_str()));
        fields.insert("message".to_string(), json!(message));
        fields.insert(
            "context".to_string(),
            Value::Object(context.cloned().unwrap_or_default()),
        );
        fields
    });

    ChatOutcome {
        rule: rule.name,
        response: rule.reply,
        lead,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_matches_anywhere_case_insensitively() {
        let outcome = respond("Well HELLO there", None);
        assert_eq!(outcome.rule, "greeting");
        assert!(outcome.response.starts_with("Hello!"));
        assert!(outcome.lead.is_none());
    }

    #[test]
    fn rules_are_checked_in_order() {
        assert_eq!(respond("2 bed flat please", None).rule, "two_bedrooms");
        assert_eq!(respond("3 bedroom house", None).rule, "three_bedrooms");
        assert_eq!(respond("my budget is 50k", None).rule, "budget");
        assert_eq!(respond("can I book a viewing", None).rule, "visit");
        assert_eq!(respond("call my phone", None).rule, "contact");
        assert_eq!(respond("apartments?", None).rule, "fallback");
        // Greeting outranks everything after it
        assert_eq!(respond("hello, 2 bed under budget", None).rule, "greeting");
    }

    #[test]
    fn phone_number_triggers_contact_reply_and_lead() {
        let outcome = respond("03001234567", None);
        assert_eq!(outcome.rule, "contact");

        let lead = outcome.lead.unwrap();
        assert_eq!(lead["phone"], json!("03001234567"));
        assert_eq!(lead["source"], json!("chatbot"));
        assert_eq!(lead["context"], json!({}));
    }

    #[test]
    fn phone_number_is_captured_whatever_rule_answers() {
        let mut context = Map::new();
        context.insert("propertyId".to_string(), json!("1"));

        let outcome = respond("Hello, 2 bed please, call 923001234567", Some(&context));
        assert_eq!(outcome.rule, "greeting");

        let lead = outcome.lead.unwrap();
        assert_eq!(lead["phone"], json!("923001234567"));
        assert_eq!(lead["message"], json!("Hello, 2 bed please, call 923001234567"));
        assert_eq!(lead["context"], json!({"propertyId": "1"}));
    }

    #[test]
    fn short_digit_runs_are_not_phone_numbers() {
        let outcome = respond("budget 123456789", None);
        assert_eq!(outcome.rule, "budget");
        assert!(outcome.lead.is_none());
    }
}
