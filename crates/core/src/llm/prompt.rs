use crate::domain::recommendation::TickerSymbol;

pub const ETF_COUNT: usize = 4;

pub const RISK_LEVELS: [&str; 3] = ["High Risk", "Medium Risk", "Low Risk"];

pub const DIVERSIFICATION_LEVELS: [&str; 3] = [
    "High Diversification",
    "Moderate Diversification",
    "Low Diversification",
];

/// Builds the ETF recommendation prompt for a non-empty, ordered ticker list.
pub fn build_recommendation_prompt(tickers: &[TickerSymbol]) -> String {
    let ticker_list = tickers
        .iter()
        .map(TickerSymbol::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    let risk_levels = one_of(&RISK_LEVELS);
    let diversification_levels = one_of(&DIVERSIFICATION_LEVELS);

    [
        format!("Given these stock tickers: {ticker_list}"),
        format!(
            "Select the top {ETF_COUNT} ETFs that have the most combined exposure to the given tickers."
        ),
        format!(
            "Every listed ticker must have non-zero exposure in at least one of the {ETF_COUNT} ETFs you select. \
If an ETF covers only some of the tickers, use another of the {ETF_COUNT} slots for the ETF with the most exposure to the uncovered ticker."
        ),
        "For each ETF, give an estimated exposure percentage range for every listed ticker, in the same order as listed above.".to_string(),
        "Use only numbers and the percent sign, for example 3-5%. If you are not sure about the exposure, or there is none, write 0%. Never use words such as Moderate, High, or Low for exposure.".to_string(),
        format!("For each ETF, give a risk level that is exactly one of: {risk_levels}."),
        format!(
            "For each ETF, give a diversification level that is exactly one of: {diversification_levels}."
        ),
        "Do not include disclaimers such as \"I am not a financial advisor\", explanations, or any other commentary.".to_string(),
        format!(
            "Return only a JSON array of exactly {ETF_COUNT} objects. Each object must have exactly these four fields:"
        ),
        "- \"ETF Name\": the fund name followed by its symbol in parentheses".to_string(),
        "- \"Percentages\": an array of strings formatted as \"SYMBOL: range%\", one per listed ticker, in the listed order".to_string(),
        format!("- \"Risk Level\": one of {risk_levels}"),
        format!("- \"Diversification Level\": one of {diversification_levels}"),
        "Example object:".to_string(),
        example_object(),
    ]
    .join("\n")
}

fn one_of(options: &[&str]) -> String {
    options
        .iter()
        .map(|o| format!("\"{o}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

// Placeholder symbols only; real tickers appear once, in the list line.
fn example_object() -> String {
    format!(
        "{{\n  \"ETF Name\": \"Example Growth Fund (EXMP)\",\n  \"Percentages\": [\"SYMBOL1: 3-5%\", \"SYMBOL2: 0%\"],\n  \"Risk Level\": \"{}\",\n  \"Diversification Level\": \"{}\"\n}}",
        RISK_LEVELS[0], DIVERSIFICATION_LEVELS[1]
    )
}
