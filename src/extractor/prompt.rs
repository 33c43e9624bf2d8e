//! Instruction sent with every extraction request

use crate::fetcher::PageContent;

/// Evidence the model should look for before reporting a signal
const SIGNAL_EVIDENCE: &[(&str, &str)] = &[
    ("Careers page exists", "job listings or a hiring page"),
    ("Recent blog post", "dated posts, changelogs, or announcements"),
    ("Pricing page present", "published plans or prices"),
    ("SOC 2 / security compliance", "compliance badges or security certifications"),
    ("Open source", "public repositories or open-source licensing"),
    ("Enterprise focus", "enterprise plans, SSO, or named enterprise customers"),
];

/// Build the single-turn analyst instruction for a fetched page
pub fn build_prompt(page: &PageContent) -> String {
    let title = if page.title.is_empty() {
        "(none)"
    } else {
        page.title.as_str()
    };

    let evidence = SIGNAL_EVIDENCE
        .iter()
        .map(|(label, evidence)| format!("   - \"{label}\" when you see {evidence}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are an expert venture capital analyst. Analyze the website content below \
and extract structured intelligence about this company.\n\n\
Website URL: {url}\n\
Page Title: {title}\n\n\
Website Content:\n\
{content}\n\n\
Extract:\n\
1. A concise 1-2 sentence summary of what the company does\n\
2. 3-6 bullet points about what they do, their products, and value proposition\n\
3. 5-10 relevant keywords/tags\n\
4. 2-4 signals that would interest an investor. Only report a signal backed by \
concrete evidence in the content, for example:\n\
{evidence}",
        url = page.source_url,
        content = page.markdown_body,
    )
}
