//! Terminal and Markdown rendering of model answers

use crate::api::types::UsageMetadata;
use crate::chat_client::ChatResponse;
use crate::grounding::{CitationSource, Grounding};

use colored::Colorize;

/// Plain label for a cited source
pub fn source_label(source: &CitationSource) -> String {
    match source {
        CitationSource::Web { title, uri } => match (title, uri) {
            (Some(title), Some(uri)) => format!("{} ({})", title, uri),
            (Some(title), None) => title.clone(),
            (None, Some(uri)) => uri.clone(),
            (None, None) => "Web source".to_string(),
        },
        CitationSource::Document { uri, title } => title
            .as_ref()
            .or(uri.as_ref())
            .cloned()
            .unwrap_or_else(|| "Document".to_string()),
        CitationSource::Unknown => "Unknown source".to_string(),
    }
}

/// Citation block for the terminal
pub fn format_citations_terminal(grounding: &Grounding) -> String {
    let mut out = String::new();

    if let Some(queries) = &grounding.search_queries {
        out.push_str(&format!("\n{}\n{}\n", "Search queries:".dimmed(), queries));
    }

    if !grounding.sources.is_empty() {
        out.push_str(&format!("\n{}\n", "Sources:".yellow().bold()));
        for (i, source) in grounding.sources.iter().enumerate() {
            let kind = match source {
                CitationSource::Web { .. } => "web",
                CitationSource::Document { .. } => "doc",
                CitationSource::Unknown => "?",
            };
            out.push_str(&format!(
                "  [{}] {} {}\n",
                i + 1,
                source_label(source),
                format!("({})", kind).dimmed()
            ));
        }
    }

    if grounding.grounded_segments > 0 {
        out.push_str(&format!(
            "\n{}\n",
            format!(
                "{} grounded segment(s) in this answer",
                grounding.grounded_segments
            )
            .dimmed()
        ));
    }

    out
}

/// Citation block for Markdown exports
pub fn format_citations_markdown(grounding: &Grounding) -> String {
    if grounding.is_empty() {
        return String::new();
    }

    let mut out = String::from("### Citations\n\n");

    if let Some(queries) = &grounding.search_queries {
        out.push_str(&format!("**Search queries used:** {}\n\n", queries));
    }

    if !grounding.sources.is_empty() {
        out.push_str(&format!("**Sources ({}):**\n\n", grounding.sources.len()));
        for (i, source) in grounding.sources.iter().enumerate() {
            let line = match source {
                CitationSource::Web {
                    title,
                    uri: Some(uri),
                } => format!("[{}]({})", title.as_deref().unwrap_or(uri), uri),
                other => source_label(other),
            };
            out.push_str(&format!("{}. {}\n", i + 1, line));
        }
        out.push('\n');
    }

    if grounding.grounded_segments > 0 {
        out.push_str(&format!(
            "**Grounding supports:** {} segment(s) grounded\n\n",
            grounding.grounded_segments
        ));
    }

    out
}

/// Dimmed token accounting line
pub fn format_usage(usage: &UsageMetadata) -> String {
    let mut line = format!(
        "Tokens: {} prompt, {} response",
        usage.prompt_token_count, usage.candidates_token_count
    );
    if usage.thoughts_token_count > 0 {
        line.push_str(&format!(", {} thinking", usage.thoughts_token_count));
    }
    line.push_str(&format!(", {} total", usage.total_token_count));
    line
}

/// Full terminal rendering of a response; `None` renders nothing
pub fn format_response(response: Option<&ChatResponse>) -> String {
    let Some(response) = response else {
        return String::new();
    };

    let mut out = format!("\n{}\n{}\n", "Assistant:".green().bold(), response.text);
    if let Some(grounding) = &response.grounding {
        out.push_str(&format_citations_terminal(grounding));
    }
    if let Some(usage) = &response.usage {
        out.push_str(&format!("\n{}\n", format_usage(usage).dimmed()));
    }
    out
}

/// Print a response to stdout
pub fn print_response(response: Option<&ChatResponse>) {
    let rendered = format_response(response);
    if !rendered.is_empty() {
        println!("{}", rendered);
    }
}
