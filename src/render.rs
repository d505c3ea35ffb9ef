//! The single HTML page: upload form, the echoed image, and the scores.
//!
//! The markup is embedded so the binary needs no template directory at
//! runtime.

use std::fmt::Write;

use crate::models::ScoredLabel;

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Image classifier</title>
<style>
body { font-family: sans-serif; max-width: 40em; margin: 2em auto; }
img { max-width: 100%; }
table { border-collapse: collapse; margin-top: 1em; }
td, th { padding: 0.25em 1em; border-bottom: 1px solid #ddd; text-align: left; }
.error { color: #a00; }
</style>
</head>
<body>
<h1>Image classifier</h1>
<form action="/classify" method="post" enctype="multipart/form-data">
<input type="file" name="image" accept="image/*">
<input type="submit" value="Classify">
</form>
"#;

const PAGE_TAIL: &str = "</body>\n</html>\n";

/// Scoring state as shown to the user. `Failed` and an empty `Ranked` are
/// deliberately different things.
#[derive(Debug, Clone, PartialEq)]
pub enum Scores {
    NotRequested,
    Ranked(Vec<ScoredLabel>),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct PageParams {
    pub image_b64: Option<String>,
    pub image_type: String,
    pub scores: Scores,
}

impl PageParams {
    pub fn empty() -> Self {
        Self {
            image_b64: None,
            image_type: String::new(),
            scores: Scores::NotRequested,
        }
    }
}

pub fn render_page(params: &PageParams) -> String {
    let mut html = String::from(PAGE_HEAD);

    if let Some(b64) = &params.image_b64 {
        let _ = writeln!(
            html,
            r#"<p><img src="data:{};base64,{}" alt="uploaded image"></p>"#,
            escape(&params.image_type),
            b64
        );
    }

    match &params.scores {
        Scores::NotRequested => {}
        Scores::Failed(reason) => {
            let _ = writeln!(
                html,
                r#"<p class="error">Scoring failed: {}</p>"#,
                escape(reason)
            );
        }
        Scores::Ranked(scores) if scores.is_empty() => {
            html.push_str("<p>The model returned no labels.</p>\n");
        }
        Scores::Ranked(scores) => {
            html.push_str("<table>\n<tr><th>Label</th><th>Score</th></tr>\n");
            for score in scores {
                let _ = writeln!(
                    html,
                    "<tr><td>{}</td><td>{:.4}</td></tr>",
                    escape(&score.label),
                    score.score
                );
            }
            html.push_str("</table>\n");
        }
    }

    html.push_str(PAGE_TAIL);
    html
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
