//! Reply engine for ExpenseBot
//!
//! An ordered list of rules, each pairing a case-insensitive regex matcher
//! with a responder. The first rule that both matches and produces a reply
//! wins. A rule whose pattern failed to compile, or whose responder cannot
//! build a reply from the captures, counts as no match and evaluation moves
//! on to the next rule.
//!
//! When nothing matches, a digit plus the word "expense" gets a generic
//! acknowledgment; anything else gets the fallback hint.

use regex::{Captures, Regex, RegexBuilder};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::Result;

pub const HELP_REPLY: &str = "I can show examples, suggest categories, or mock a summary of expenses. Try: 'show categories' or 'summary'";
pub const CATEGORIES_REPLY: &str =
    "Common categories: Food, Transport, Bills, Entertainment, Shopping, Others.";
pub const SUMMARY_REPLY: &str = "This month: 12 transactions, total ₱23,450.";
pub const GREETING_REPLY: &str = "Hello! How can I help with your expenses today?";
pub const EXPENSE_NOTED_REPLY: &str = "Expense noted (mock).";
pub const FALLBACK_REPLY: &str = "Sorry, I didn't understand. Try 'help' or ask for 'categories'.";

/// Which canned behaviour a rule provides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleKind {
    Help,
    Categories,
    Summary,
    Greeting,
    AddExpense,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Categories => "categories",
            Self::Summary => "summary",
            Self::Greeting => "greeting",
            Self::AddExpense => "add-expense",
        }
    }
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Builds a reply from a rule's regex captures
pub type TemplateFn = fn(&Captures<'_>) -> Option<String>;

/// How a matched rule produces its reply
#[derive(Clone)]
pub enum Responder {
    /// Fixed text
    Static(String),
    /// Text interpolated from the captures; `None` means the rule failed
    Template(TemplateFn),
}

impl std::fmt::Debug for Responder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Static(text) => f.debug_tuple("Static").field(text).finish(),
            Self::Template(_) => f.write_str("Template(..)"),
        }
    }
}

/// One (matcher, responder) pair in the rule list
#[derive(Debug, Clone)]
pub struct ReplyRule {
    kind: RuleKind,
    pattern: String,
    /// `None` when the pattern did not compile; such a rule never matches
    matcher: Option<Regex>,
    responder: Responder,
}

impl ReplyRule {
    /// Build a rule, tolerating a bad pattern
    ///
    /// A pattern that fails to compile is logged and leaves the rule inert.
    pub fn new(kind: RuleKind, pattern: &str, responder: Responder) -> Self {
        let matcher = match compile(pattern) {
            Ok(re) => Some(re),
            Err(e) => {
                warn!(rule = %kind, pattern, error = %e, "Reply rule pattern failed to compile, rule disabled");
                None
            }
        };

        Self {
            kind,
            pattern: pattern.to_string(),
            matcher,
            responder,
        }
    }

    /// Build a rule, rejecting a bad pattern
    pub fn try_new(kind: RuleKind, pattern: &str, responder: Responder) -> Result<Self> {
        let matcher = compile(pattern)?;
        Ok(Self {
            kind,
            pattern: pattern.to_string(),
            matcher: Some(matcher),
            responder,
        })
    }

    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Whether the pattern compiled
    pub fn is_enabled(&self) -> bool {
        self.matcher.is_some()
    }

    /// Reply for `text`, or `None` if this rule does not apply
    fn evaluate(&self, text: &str) -> Option<String> {
        let matcher = self.matcher.as_ref()?;
        let captures = matcher.captures(text)?;

        match &self.responder {
            Responder::Static(reply) => Some(reply.clone()),
            Responder::Template(build) => {
                let reply = build(&captures);
                if reply.is_none() {
                    debug!(rule = %self.kind, "Responder could not build a reply, skipping rule");
                }
                reply
            }
        }
    }
}

fn compile(pattern: &str) -> std::result::Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

fn add_expense_reply(caps: &Captures<'_>) -> Option<String> {
    let amount = caps.get(1)?.as_str();
    Some(format!("Got it, added expense of ₱{}.", amount))
}

/// The built-in rules, in evaluation order
pub fn default_rules() -> Vec<ReplyRule> {
    vec![
        ReplyRule::new(
            RuleKind::Help,
            r"help|what can you do",
            Responder::Static(HELP_REPLY.to_string()),
        ),
        ReplyRule::new(
            RuleKind::Categories,
            r"categor(?:y|ies)",
            Responder::Static(CATEGORIES_REPLY.to_string()),
        ),
        ReplyRule::new(
            RuleKind::Summary,
            r"summary",
            Responder::Static(SUMMARY_REPLY.to_string()),
        ),
        ReplyRule::new(
            RuleKind::Greeting,
            r"hello|hi",
            Responder::Static(GREETING_REPLY.to_string()),
        ),
        ReplyRule::new(
            RuleKind::AddExpense,
            r"add expense ([0-9]+(?:\.[0-9]+)?)",
            Responder::Template(add_expense_reply),
        ),
    ]
}

/// Why a reply was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "rule", rename_all = "snake_case")]
pub enum Decision {
    /// A rule matched
    Rule(RuleKind),
    /// No rule matched, but the text mentions a number and "expense"
    ExpenseNoted,
    /// Nothing applied
    Fallback,
}

/// A computed reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub text: String,
    pub decision: Decision,
}

/// Ordered rule dispatcher
#[derive(Debug, Clone)]
pub struct ReplyEngine {
    rules: Vec<ReplyRule>,
}

impl Default for ReplyEngine {
    fn default() -> Self {
        Self::with_rules(default_rules())
    }
}

impl ReplyEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: Vec<ReplyRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[ReplyRule] {
        &self.rules
    }

    /// Evaluate the rules in order and pick a reply
    pub fn dispatch(&self, text: &str) -> Reply {
        for rule in &self.rules {
            if let Some(reply) = rule.evaluate(text) {
                debug!(rule = %rule.kind, "Reply rule matched");
                return Reply {
                    text: reply,
                    decision: Decision::Rule(rule.kind),
                };
            }
        }

        if mentions_expense_amount(text) {
            debug!("No rule matched, expense mention detected");
            return Reply {
                text: EXPENSE_NOTED_REPLY.to_string(),
                decision: Decision::ExpenseNoted,
            };
        }

        debug!("No rule matched, using fallback");
        Reply {
            text: FALLBACK_REPLY.to_string(),
            decision: Decision::Fallback,
        }
    }

    /// Reply text only
    pub fn reply(&self, text: &str) -> String {
        self.dispatch(text).text
    }

    /// Which rule (or heuristic) would answer `text`
    pub fn explain(&self, text: &str) -> Decision {
        self.dispatch(text).decision
    }
}

fn mentions_expense_amount(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit()) && text.to_lowercase().contains("expense")
}
