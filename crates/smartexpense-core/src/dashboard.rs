//! Dashboard content
//!
//! All of it is canned. Nothing here reads real financial data.

use serde::Serialize;

use crate::chat::QUICK_REPLIES;
use crate::models::Credential;

pub const APP_NAME: &str = "SmartExpense";
pub const DASHBOARD_TITLE: &str = "Dashboard";
pub const OVERVIEW_TEXT: &str = "This is a mock overview. Connect real data where needed.";
pub const BOT_NAME: &str = "ExpenseBot";
pub const BOT_TAGLINE: &str = "A lightweight prototype chatbot";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeatureCard {
    pub title: &'static str,
    pub description: &'static str,
}

pub const FEATURES: [FeatureCard; 3] = [
    FeatureCard {
        title: "Smart Expense Tracking",
        description:
            "Easily record and categorize your daily expenses using a clean, intuitive interface.",
    },
    FeatureCard {
        title: "Visual Reports & Insights",
        description:
            "View detailed charts and graphs to understand your spending habits and progress.",
    },
    FeatureCard {
        title: "AI Chatbot Assistant",
        description: "Get personalized saving tips, reminders, and budget suggestions through our intelligent chatbot.",
    },
];

/// Everything the protected dashboard shows
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub title: &'static str,
    /// Signed-in user, shown next to the logout action
    pub email: String,
    pub overview: &'static str,
    pub features: &'static [FeatureCard],
    pub bot_name: &'static str,
    pub bot_tagline: &'static str,
    pub quick_replies: &'static [&'static str],
}

impl DashboardView {
    pub fn for_user(credential: &Credential) -> Self {
        Self {
            title: DASHBOARD_TITLE,
            email: credential.email.clone(),
            overview: OVERVIEW_TEXT,
            features: &FEATURES,
            bot_name: BOT_NAME,
            bot_tagline: BOT_TAGLINE,
            quick_replies: &QUICK_REPLIES,
        }
    }
}
