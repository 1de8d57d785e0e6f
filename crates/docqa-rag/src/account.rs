//! Spending summary over raw transaction records
//!
//! The prompt asks the model for a short, percentage-only summary; the answer
//! is then normalized so it always starts with [`SUMMARY_PREFIX`], carries no
//! markdown or absolute currency amounts, and stays within
//! [`SUMMARY_WORD_LIMIT`] words.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use docqa_core::{Error, Result};

pub const SUMMARY_PREFIX: &str = "Here is a summary of your spending habits.";
pub const SUMMARY_WORD_LIMIT: usize = 120;

static MARKDOWN_LINE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:#{1,6}[ \t]+|[-*+][ \t]+|>[ \t]*)").expect("valid markdown line pattern")
});

static MARKDOWN_INLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*+|__+|`+|#+").expect("valid markdown inline pattern"));

static CURRENCY_AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    let amount = r"\d[\d,]*(?:\.\d+)?(?:\s?(?:k|m|bn|thousand|million|billion)\b)?";
    let codes = "usd|eur|gbp|inr|jpy|cny|rmb|cad|aud|nzd|sgd|hkd|myr|idr|php|thb|krw|chf|sek|nok|dkk|zar|aed|brl|mxn";
    let words = "dollars?|euros?|pounds?|rupees?|yen|yuan|francs?|bucks|quid";
    Regex::new(&format!(
        r"(?ix)
        -?[$€£¥₹]\s?{amount}
        | \b(?:{codes}|rs\.?)\s?{amount}
        | (?-i:\b[A-Z]{{3}})\s?{amount}
        | \b{amount}\s?(?:[$€£¥₹]|(?:{codes}|{words})\b)
        | \b{amount}\s?(?-i:[A-Z]{{3}}\b)
        "
    ))
    .expect("valid currency pattern")
});

/// Grouped or two-decimal figures; kept only when they are a percentage
static BARE_AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+\.\d{2})\b%?")
        .expect("valid amount pattern")
});

static EMPTY_PARENS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\s*\)").expect("valid parentheses pattern"));

/// Render the records one per line: strings as-is, anything else as JSON
pub fn render_transactions(transactions: &[Value]) -> String {
    transactions
        .iter()
        .map(|record| match record {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The instruction prompt sent to the model for a list of transactions
pub fn build_account_prompt(transactions: &[Value]) -> Result<String> {
    if transactions.is_empty() {
        return Err(Error::InvalidInput(
            "transaction_data must contain at least one transaction".to_string(),
        ));
    }

    Ok(format!(
        "You are a personal finance assistant. Analyze the bank transactions below and summarize the customer's spending habits.

Rules:
- Transactions marked \"credit\" are deposits into the account, not expenses. Do not count them as spending.
- Group spending into categories and describe each category as a percentage of total spending.
- Never mention absolute amounts or currency sums, only percentages.
- Respond in plain text with no markdown formatting, lists or headings.
- Keep the response under {limit} words.
- Begin the response with exactly this sentence: \"{prefix}\"

Transactions:
{transactions}

Summary:",
        limit = SUMMARY_WORD_LIMIT,
        prefix = SUMMARY_PREFIX,
        transactions = render_transactions(transactions),
    ))
}

/// Clean up a model answer into the fixed summary shape
pub fn normalize_account_summary(raw: &str) -> String {
    let text = MARKDOWN_LINE_MARKER.replace_all(raw, "");
    let text = MARKDOWN_INLINE.replace_all(&text, "");
    let text = CURRENCY_AMOUNT.replace_all(&text, "");
    let text = BARE_AMOUNT.replace_all(&text, |caps: &regex::Captures| {
        let figure = &caps[0];
        if figure.ends_with('%') {
            figure.to_string()
        } else {
            String::new()
        }
    });
    let text = EMPTY_PARENS.replace_all(&text, "");

    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");

    let body = strip_summary_prefix(&collapsed);
    let prefixed = if body.is_empty() {
        SUMMARY_PREFIX.to_string()
    } else {
        format!("{} {}", SUMMARY_PREFIX, body)
    };

    let mut words: Vec<&str> = prefixed.split_whitespace().collect();
    if words.len() > SUMMARY_WORD_LIMIT {
        words.truncate(SUMMARY_WORD_LIMIT);
        return words.join(" ");
    }

    prefixed
}

/// Drop a leading prefix sentence the model already wrote, whatever its case
/// or closing punctuation
fn strip_summary_prefix(text: &str) -> &str {
    let stem = SUMMARY_PREFIX.trim_end_matches('.');
    match text.get(..stem.len()) {
        Some(head) if head.eq_ignore_ascii_case(stem) => text[stem.len()..]
            .trim_start_matches(['.', ':', ';', ',', '!', '-'])
            .trim_start(),
        _ => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_transactions() {
        let rendered = render_transactions(&[
            json!({"category": "groceries"}),
            json!("2024-05-01 credit salary"),
        ]);
        assert_eq!(rendered, "{\"category\":\"groceries\"}\n2024-05-01 credit salary");
    }

    #[test]
    fn test_prompt_rules() {
        let prompt = build_account_prompt(&[json!({"type": "credit"})]).unwrap();
        assert!(prompt.contains("marked \"credit\" are deposits"));
        assert!(prompt.contains("under 120 words"));
        assert!(prompt.contains(SUMMARY_PREFIX));
        assert!(prompt.contains("{\"type\":\"credit\"}"));
    }

    #[test]
    fn test_empty_transactions_rejected() {
        let err = build_account_prompt(&[]).unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn test_normalize_strips_markdown_and_amounts() {
        let raw = "## Overview\n\n**Groceries** took 40% ($1,250.00) of spending.\n- Rent: 35%, about USD 900\n- Travel cost 300 EUR or 25%";
        let summary = normalize_account_summary(raw);

        assert!(summary.starts_with(SUMMARY_PREFIX));
        assert!(!summary.contains('$'));
        assert!(!summary.contains("1,250"));
        assert!(!summary.contains("900"));
        assert!(!summary.contains("300"));
        assert!(!summary.contains('*'));
        assert!(!summary.contains('#'));
        assert!(!summary.contains("()"));
        assert!(summary.contains("Groceries took 40% of spending."));
        assert!(summary.contains("25%"));
    }

    #[test]
    fn test_normalize_keeps_existing_prefix() {
        let raw = format!("{} Dining is 20%.", SUMMARY_PREFIX);
        assert_eq!(normalize_account_summary(&raw), raw);
    }

    #[test]
    fn test_normalize_strips_other_currency_forms() {
        let cases = [
            ("Rent was 300€ which is 40% of spending.", ["300", "€"], "40%"),
            ("Groceries cost SGD 450, about 30%.", ["450", "SGD"], "30%"),
            ("Dining took 1,200 bucks or 20%.", ["1,200", "bucks"], "20%"),
            ("Travel came to CHF 2.5k, near 15%.", ["2.5k", "CHF"], "15%"),
            ("Utilities were 1,050.75 in total, 12.50% overall.", ["1,050.75", "1,050"], "12.50%"),
        ];

        for (raw, gone, kept) in cases {
            let summary = normalize_account_summary(raw);
            for fragment in gone {
                assert!(!summary.contains(fragment), "{:?} left {:?}", summary, fragment);
            }
            assert!(summary.contains(kept), "{:?} lost {:?}", summary, kept);
        }
    }

    #[test]
    fn test_normalize_rewrites_near_prefix() {
        let summary =
            normalize_account_summary("here is a summary of your spending habits: Dining is 20%.");
        assert_eq!(summary, format!("{} Dining is 20%.", SUMMARY_PREFIX));
        assert_eq!(summary.matches("spending habits").count(), 1);
    }

    #[test]
    fn test_normalize_truncates_to_word_limit() {
        let raw = "word ".repeat(500);
        let summary = normalize_account_summary(&raw);
        assert_eq!(summary.split_whitespace().count(), SUMMARY_WORD_LIMIT);
        assert!(summary.starts_with(SUMMARY_PREFIX));
    }

    #[test]
    fn test_normalize_empty_answer() {
        assert_eq!(normalize_account_summary("  \n"), SUMMARY_PREFIX);
    }
}
