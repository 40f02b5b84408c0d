//! Notion page publishing.
//!
//! A note becomes one page under the configured parent page. Block building
//! is pure and tested; only [`publish_note`] touches the network.
//!
//! Notion limits a rich-text run to 2,000 characters and a single request to
//! 100 child blocks, so long prose is split into several runs and the block
//! list is sent as page creation plus `PATCH /blocks/{id}/children` batches.

use anyhow::{bail, Context, Result};
use serde_json::{json, Value};
use std::time::Duration;

use crate::config::Config;
use crate::models::Note;
use crate::progress::{StageProgressEvent, StageProgressReporter};

const NOTION_API: &str = "https://api.notion.com/v1";

/// Maximum characters in one rich-text run.
pub const RICH_TEXT_LIMIT: usize = 2000;
/// Maximum child blocks per request.
pub const BLOCK_BATCH: usize = 100;

/// Map a note language tag to a Notion code-block language.
pub fn notion_language(language: &str) -> &'static str {
    match language.trim().to_ascii_lowercase().as_str() {
        "cpp" | "cc" | "cxx" | "hpp" | "c++" => "c++",
        "c" | "h" => "c",
        "py" | "python" => "python",
        "js" | "jsx" | "mjs" | "javascript" => "javascript",
        "ts" | "tsx" | "typescript" => "typescript",
        "rs" | "rust" => "rust",
        "java" => "java",
        "go" | "golang" => "go",
        "kt" | "kts" | "kotlin" => "kotlin",
        "rb" | "ruby" => "ruby",
        "swift" => "swift",
        "cs" | "c#" | "csharp" => "c#",
        "php" => "php",
        "scala" => "scala",
        "sh" | "bash" => "bash",
        "sql" => "sql",
        "hs" | "haskell" => "haskell",
        "lua" => "lua",
        _ => "plain text",
    }
}

/// Split text into rich-text runs of at most [`RICH_TEXT_LIMIT`] characters.
pub fn rich_text(text: &str) -> Vec<Value> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(RICH_TEXT_LIMIT)
        .map(|chunk| {
            let content: String = chunk.iter().collect();
            json!({ "type": "text", "text": { "content": content } })
        })
        .collect()
}

fn heading(text: &str) -> Value {
    json!({
        "object": "block",
        "type": "heading_2",
        "heading_2": { "rich_text": rich_text(text) }
    })
}

fn paragraph(text: &str) -> Value {
    json!({
        "object": "block",
        "type": "paragraph",
        "paragraph": { "rich_text": rich_text(text) }
    })
}

fn code(text: &str, language: &str) -> Value {
    json!({
        "object": "block",
        "type": "code",
        "code": { "rich_text": rich_text(text), "language": language }
    })
}

fn bullet(text: &str) -> Value {
    json!({
        "object": "block",
        "type": "bulleted_list_item",
        "bulleted_list_item": { "rich_text": rich_text(text) }
    })
}

/// Paragraphs separated by blank lines become separate blocks.
fn prose(text: &str) -> impl Iterator<Item = Value> + '_ {
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(paragraph)
}

/// Build the page body. Sections with no content are omitted.
pub fn note_blocks(note: &Note) -> Vec<Value> {
    let mut blocks = Vec::new();

    for (title, text) in [("Problem", &note.problem), ("Approach", &note.approach)] {
        if !text.trim().is_empty() {
            blocks.push(heading(title));
            blocks.extend(prose(text));
        }
    }

    if !note.pseudocode.trim().is_empty() {
        blocks.push(heading("Pseudocode"));
        blocks.push(code(&note.pseudocode, "plain text"));
    }

    if !note.complexity.trim().is_empty() {
        blocks.push(heading("Complexity"));
        blocks.push(paragraph(&note.complexity));
    }

    if !note.edge_cases.is_empty() {
        blocks.push(heading("Edge Cases"));
        blocks.extend(note.edge_cases.iter().map(|c| bullet(c)));
    }

    if !note.examples.is_empty() {
        blocks.push(heading("Examples"));
        for example in &note.examples {
            for (label, value) in [
                ("Input", &example.input),
                ("Output", &example.output),
                ("Note", &example.note),
            ] {
                if !value.trim().is_empty() {
                    blocks.push(paragraph(&format!("{}: {}", label, value)));
                }
            }
        }
    }

    if !note.explanation.trim().is_empty() {
        blocks.push(heading("Explanation"));
        blocks.extend(prose(&note.explanation));
    }

    if !note.code.trim().is_empty() {
        blocks.push(heading("Code"));
        blocks.push(code(&note.code, notion_language(&note.language)));
    }

    blocks
}

/// Page creation payload carrying the first batch of blocks.
fn page_request(parent_page_id: &str, title: &str, children: &[Value]) -> Value {
    json!({
        "parent": { "page_id": parent_page_id },
        "properties": {
            "title": { "title": rich_text(title) }
        },
        "children": children,
    })
}

/// Create the page and append any remaining blocks. Returns the page URL.
///
/// # Errors
///
/// Fails when the token or parent page is missing, or Notion rejects a
/// request. Nothing is retried; a partial page may remain on failure.
pub async fn publish_note(
    config: &Config,
    note: &Note,
    progress: &dyn StageProgressReporter,
) -> Result<String> {
    let token = config
        .credentials
        .notion_token
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("NOTION_TOKEN environment variable not set"))?;
    let parent = config
        .notion_parent()
        .ok_or_else(|| anyhow::anyhow!("notion.parent_page_id not configured"))?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.notion.timeout_secs))
        .build()?;

    let blocks = note_blocks(note);
    let total = blocks.len() as u64;
    let mut batches = blocks.chunks(BLOCK_BATCH);
    let first = batches.next().unwrap_or(&[]);

    let page = send(
        client
            .post(format!("{}/pages", NOTION_API))
            .json(&page_request(parent, &note.title, first)),
        token,
        &config.notion.api_version,
    )
    .await
    .with_context(|| "Failed to create Notion page")?;

    let page_id = page
        .get("id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow::anyhow!("Invalid Notion response: missing page id"))?
        .to_string();
    let mut sent = first.len() as u64;
    progress.report(StageProgressEvent::Uploading { n: sent, total });

    for batch in batches {
        send(
            client
                .patch(format!("{}/blocks/{}/children", NOTION_API, page_id))
                .json(&json!({ "children": batch })),
            token,
            &config.notion.api_version,
        )
        .await
        .with_context(|| format!("Failed to append blocks to Notion page {}", page_id))?;
        sent += batch.len() as u64;
        progress.report(StageProgressEvent::Uploading { n: sent, total });
    }

    let url = page
        .get("url")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| format!("https://www.notion.so/{}", page_id.replace('-', "")));
    tracing::info!(page = %page_id, blocks = total, "published note to Notion");
    Ok(url)
}

async fn send(request: reqwest::RequestBuilder, token: &str, version: &str) -> Result<Value> {
    let response = request
        .header("Authorization", format!("Bearer {}", token))
        .header("Notion-Version", version)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body_text = response.text().await.unwrap_or_default();
        bail!("Notion API error {}: {}", status, body_text);
    }
    Ok(response.json().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Example;

    fn block_types(blocks: &[Value]) -> Vec<&str> {
        blocks
            .iter()
            .map(|b| b["type"].as_str().unwrap_or_default())
            .collect()
    }

    #[test]
    fn language_mapping() {
        assert_eq!(notion_language("cpp"), "c++");
        assert_eq!(notion_language("py"), "python");
        assert_eq!(notion_language("js"), "javascript");
        assert_eq!(notion_language("ts"), "typescript");
        assert_eq!(notion_language("rs"), "rust");
        assert_eq!(notion_language("unknown"), "plain text");
        assert_eq!(notion_language(""), "plain text");
    }

    #[test]
    fn rich_text_splits_at_limit() {
        let text = "a".repeat(RICH_TEXT_LIMIT * 2 + 5);
        let runs = rich_text(&text);
        assert_eq!(runs.len(), 3);
        assert_eq!(
            runs[0]["text"]["content"].as_str().unwrap().len(),
            RICH_TEXT_LIMIT
        );
        assert_eq!(runs[2]["text"]["content"].as_str().unwrap().len(), 5);
        assert!(rich_text("").is_empty());
    }

    #[test]
    fn full_note_layout() {
        let note = Note {
            title: "Selection Sort".to_string(),
            language: "cpp".to_string(),
            problem: "Sort values.".to_string(),
            approach: "Pick the minimum.\n\nSwap it forward.".to_string(),
            pseudocode: "for i:\n    swap".to_string(),
            complexity: "Time: O(n^2), Space: O(1)".to_string(),
            edge_cases: vec!["empty input".to_string(), "duplicates".to_string()],
            examples: vec![Example::new("[3,1]", "[1,3]", "")],
            explanation: "Grows a sorted prefix.".to_string(),
            code: "int main() {}".to_string(),
        };
        let blocks = note_blocks(&note);
        assert_eq!(
            block_types(&blocks),
            vec![
                "heading_2", "paragraph", // problem
                "heading_2", "paragraph", "paragraph", // approach
                "heading_2", "code", // pseudocode
                "heading_2", "paragraph", // complexity
                "heading_2", "bulleted_list_item", "bulleted_list_item",
                "heading_2", "paragraph", "paragraph", // examples, empty note skipped
                "heading_2", "paragraph", // explanation
                "heading_2", "code", // code
            ]
        );
        assert_eq!(blocks[6]["code"]["language"], "plain text");
        assert_eq!(blocks[blocks.len() - 1]["code"]["language"], "c++");
        assert_eq!(
            blocks[13]["paragraph"]["rich_text"][0]["text"]["content"],
            "Input: [3,1]"
        );
    }

    #[test]
    fn empty_sections_are_omitted() {
        let note = Note {
            title: "x".to_string(),
            pseudocode: "parse input".to_string(),
            ..Note::default()
        };
        let blocks = note_blocks(&note);
        assert_eq!(block_types(&blocks), vec!["heading_2", "code"]);
    }

    #[test]
    fn page_request_shape() {
        let children = vec![paragraph("hello")];
        let body = page_request("parent-1", "Two Sum", &children);
        assert_eq!(body["parent"]["page_id"], "parent-1");
        assert_eq!(
            body["properties"]["title"]["title"][0]["text"]["content"],
            "Two Sum"
        );
        assert_eq!(body["children"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn many_edge_cases_need_batches() {
        let note = Note {
            edge_cases: (0..150).map(|i| format!("case {}", i)).collect(),
            ..Note::default()
        };
        let blocks = note_blocks(&note);
        assert_eq!(blocks.len(), 151);
        assert_eq!(blocks.chunks(BLOCK_BATCH).count(), 2);
    }

    #[tokio::test]
    async fn publish_requires_token() {
        let config = Config::minimal();
        let err = publish_note(&config, &Note::default(), &crate::progress::NoProgress)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("NOTION_TOKEN"));
    }
}
