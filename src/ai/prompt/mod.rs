//! Prompt Builder System
//!
//! Standardized prompt construction for the three LLM-backed capabilities.
//!
//! ## Structure
//!
//! 1. **Role**: who the model is and what it is doing
//! 2. **Objectives**: numbered goals
//! 3. **Context / Code**: the input data
//! 4. **Focus**: restrictions against drift
//! 5. **Output**: the exact JSON shape expected back

use std::path::Path;

use crate::types::SectionText;

/// Prompt section types
#[derive(Debug, Clone)]
pub enum PromptSection {
    Role { expertise: String, task: String },
    Objectives(Vec<String>),
    /// Key-value pairs, rendered in insertion order
    Context(Vec<(String, String)>),
    Text {
        header: Option<String>,
        content: String,
    },
    Code { language: String, content: String },
    Focus {
        target: String,
        restrictions: Vec<String>,
    },
    /// JSON shape the reply must follow
    Output(String),
}

/// Prompt builder for consistent prompt construction
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    sections: Vec<PromptSection>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn role(mut self, expertise: &str, task: &str) -> Self {
        self.sections.push(PromptSection::Role {
            expertise: expertise.to_string(),
            task: task.to_string(),
        });
        self
    }

    pub fn objectives(mut self, objectives: Vec<&str>) -> Self {
        self.sections.push(PromptSection::Objectives(
            objectives.into_iter().map(String::from).collect(),
        ));
        self
    }

    /// Add a context item, appending to the existing context section
    pub fn context_item(mut self, key: &str, value: &str) -> Self {
        let item = (key.to_string(), value.to_string());
        for section in &mut self.sections {
            if let PromptSection::Context(ctx) = section {
                ctx.push(item);
                return self;
            }
        }
        self.sections.push(PromptSection::Context(vec![item]));
        self
    }

    pub fn section(mut self, header: &str, content: &str) -> Self {
        self.sections.push(PromptSection::Text {
            header: Some(header.to_string()),
            content: content.to_string(),
        });
        self
    }

    pub fn code(mut self, language: &str, content: &str) -> Self {
        self.sections.push(PromptSection::Code {
            language: language.to_string(),
            content: content.to_string(),
        });
        self
    }

    pub fn focus(mut self, target: &str, restrictions: Vec<&str>) -> Self {
        self.sections.push(PromptSection::Focus {
            target: target.to_string(),
            restrictions: restrictions.into_iter().map(String::from).collect(),
        });
        self
    }

    pub fn output(mut self, json_shape: &str) -> Self {
        self.sections.push(PromptSection::Output(json_shape.to_string()));
        self
    }

    /// Build the final prompt string
    pub fn build(self) -> String {
        let mut prompt = String::new();

        for section in self.sections {
            match section {
                PromptSection::Role { expertise, task } => {
                    prompt.push_str("<ROLE>\n");
                    prompt.push_str(&format!(
                        "You are an expert {} specializing in {}.\n",
                        expertise, task
                    ));
                    prompt.push_str("</ROLE>\n\n");
                }
                PromptSection::Objectives(objectives) => {
                    prompt.push_str("<OBJECTIVES>\n");
                    for (i, obj) in objectives.iter().enumerate() {
                        prompt.push_str(&format!("{}. {}\n", i + 1, obj));
                    }
                    prompt.push_str("</OBJECTIVES>\n\n");
                }
                PromptSection::Context(ctx) => {
                    prompt.push_str("# Context\n\n");
                    for (key, value) in ctx {
                        prompt.push_str(&format!("**{}**: {}\n", key, value));
                    }
                    prompt.push('\n');
                }
                PromptSection::Text { header, content } => {
                    if let Some(h) = header {
                        prompt.push_str(&format!("# {}\n\n", h));
                    }
                    prompt.push_str(&content);
                    prompt.push_str("\n\n");
                }
                PromptSection::Code { language, content } => {
                    prompt.push_str(&format!("```{}\n", language));
                    prompt.push_str(&content);
                    prompt.push_str("\n```\n\n");
                }
                PromptSection::Focus {
                    target,
                    restrictions,
                } => {
                    prompt.push_str("<FOCUS>\n");
                    prompt.push_str(&format!("IMPORTANT: Focus EXCLUSIVELY on: {}\n", target));
                    for restriction in restrictions {
                        prompt.push_str(&format!("- {}\n", restriction));
                    }
                    prompt.push_str("</FOCUS>\n\n");
                }
                PromptSection::Output(shape) => {
                    prompt.push_str("<OUTPUT>\n");
                    prompt.push_str("Respond with a single JSON object of exactly this shape:\n");
                    prompt.push_str("```json\n");
                    prompt.push_str(&shape);
                    prompt.push_str("\n```\n");
                    prompt.push_str("</OUTPUT>\n\n");
                }
            }
        }

        prompt.trim_end().to_string()
    }
}

// =============================================================================
// Templates
// =============================================================================

const DOCUMENTATION_SHAPE: &str = r#"{
  "filePath": "<path of the file>",
  "summary": "<one paragraph overview>",
  "sections": [
    {"title": "<section title>", "content": "<markdown prose>", "codeExample": "<runnable usage example, optional>"}
  ]
}"#;

const VERIFICATION_SHAPE: &str = r#"{
  "status": "success" | "failed",
  "logs": "<what was checked and what went wrong>",
  "fixedCode": "<corrected example code, only when status is failed>"
}"#;

const TRANSLATION_SHAPE: &str = r#"{
  "summary": "<translated summary>",
  "sections": [{"title": "<translated title>", "content": "<translated content>"}]
}"#;

/// Preset prompt templates for the LLM-backed capabilities
pub struct PromptTemplates;

impl PromptTemplates {
    /// Documentation generation for one source file
    pub fn documentation(file_name: &str, content: &str) -> String {
        PromptBuilder::new()
            .role("code documentation assistant", "developer-facing file documentation")
            .objectives(vec![
                "Summarize WHAT this file does and WHY it exists",
                "Split the explanation into a few titled sections",
                "Give sections a short, realistic usage example where it helps",
            ])
            .context_item("File", file_name)
            .code(code_fence_language(file_name), content)
            .focus(
                file_name,
                vec![
                    "Do NOT speculate about code you cannot see",
                    "Code examples must only use APIs visible in this file",
                ],
            )
            .output(DOCUMENTATION_SHAPE)
            .build()
    }

    /// Verification of documented examples against their source
    pub fn verification(file_name: &str, source: &str, example: &str) -> String {
        let language = code_fence_language(file_name);
        PromptBuilder::new()
            .role("code reviewer", "checking documentation examples against source")
            .objectives(vec![
                "Check that the example code only uses APIs that exist in the source",
                "Check that names, arguments and return values match the source",
                "If anything is wrong, provide a corrected version of the example code",
            ])
            .context_item("File", file_name)
            .section("Source", "")
            .code(language, source)
            .section("Example to verify", "")
            .code(language, example)
            .output(VERIFICATION_SHAPE)
            .build()
    }

    /// Translation of documentation prose. Code is never sent.
    pub fn translation(language: &str, summary: &str, sections: &[SectionText]) -> String {
        let input = serde_json::json!({
            "summary": summary,
            "sections": sections,
        });
        let input = serde_json::to_string_pretty(&input).unwrap_or_default();

        PromptBuilder::new()
            .role("technical translator", "software documentation")
            .objectives(vec![
                "Translate every summary, title and content string",
                "Keep the number and order of sections unchanged",
                "Keep code identifiers, file names and markdown formatting as they are",
            ])
            .context_item("Target language", language)
            .code("json", &input)
            .output(TRANSLATION_SHAPE)
            .build()
    }
}

/// Code fence language for a file name, from its extension
pub fn code_fence_language(file_name: &str) -> &str {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_prompt() {
        let prompt = PromptBuilder::new()
            .role("code analyst", "Rust documentation")
            .objectives(vec!["Analyze code", "Generate docs"])
            .build();

        assert!(prompt.contains("<ROLE>"));
        assert!(prompt.contains("1. Analyze code"));
        assert!(prompt.contains("2. Generate docs"));
    }

    #[test]
    fn test_context_items_keep_order() {
        let prompt = PromptBuilder::new()
            .context_item("Project", "docsync")
            .context_item("Language", "Rust")
            .build();

        let project = prompt.find("**Project**: docsync").unwrap();
        let language = prompt.find("**Language**: Rust").unwrap();
        assert!(project < language);
    }

    #[test]
    fn test_documentation_template() {
        let prompt = PromptTemplates::documentation("src/main.rs", "fn main() {}");

        assert!(prompt.contains("```rs\nfn main() {}"));
        assert!(prompt.contains("\"codeExample\""));
        assert!(prompt.contains("<FOCUS>"));
    }

    #[test]
    fn test_verification_template() {
        let prompt = PromptTemplates::verification("lib.py", "def run(): pass", "run()");
        assert!(prompt.contains("def run(): pass"));
        assert!(prompt.contains("```py\nrun()"));
        assert!(prompt.contains("\"fixedCode\""));
    }

    #[test]
    fn test_translation_template_has_no_code() {
        let sections = vec![SectionText {
            title: "Setup".to_string(),
            content: "Install deps".to_string(),
        }];
        let prompt = PromptTemplates::translation("fr", "Helpers", &sections);

        assert!(prompt.contains("**Target language**: fr"));
        assert!(prompt.contains("Install deps"));
        assert!(!prompt.contains("codeExample"));
    }
}
