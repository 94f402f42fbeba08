use regex::Regex;
use std::sync::OnceLock;

fn bold() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*(.*?)\*\*").expect("bold pattern"))
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// 行内加粗，先转义再替换
fn inline(line: &str) -> String {
    bold()
        .replace_all(&html_escape(line), "<strong>$1</strong>")
        .into_owned()
}

/// 将生成的评论（简化 Markdown）渲染为独立 HTML 页面
pub fn render_html(title: &str, markdown: &str) -> String {
    let mut html = format!(
        r#"<!DOCTYPE html>
<html lang="zh-CN">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<style>
body {{ font-family: -apple-system, "Segoe UI", Roboto, "Noto Sans SC", sans-serif; background: #f5f5f5; color: #333; line-height: 1.7; }}
.container {{ max-width: 900px; margin: 0 auto; padding: 30px; background: white; border-radius: 12px; }}
h1 {{ font-size: 26px; color: #1a237e; margin: 8px 0 16px; }}
h2 {{ font-size: 20px; color: #283593; margin: 24px 0 12px; padding-left: 12px; border-left: 4px solid #5c6bc0; }}
h3 {{ font-size: 17px; color: #37474f; margin: 16px 0 8px; }}
p.item {{ margin-left: 20px; }}
hr {{ margin: 32px 0; border: none; border-top: 2px solid #e8eaf6; }}
</style>
</head>
<body>
<div class="container">
"#,
        title = html_escape(title)
    );

    for line in markdown.lines() {
        let rendered = if let Some(rest) = line.strip_prefix("### ") {
            format!("<h3>{}</h3>", inline(rest))
        } else if let Some(rest) = line.strip_prefix("## ") {
            format!("<h2>{}</h2>", inline(rest))
        } else if let Some(rest) = line.strip_prefix("# ") {
            format!("<h1>{}</h1>", inline(rest))
        } else if line.trim() == "---" {
            "<hr>".to_string()
        } else if line.starts_with("- ") {
            format!(r#"<p class="item">{}</p>"#, inline(line))
        } else if line.trim().is_empty() {
            continue;
        } else {
            format!("<p>{}</p>", inline(line))
        };
        html.push_str(&rendered);
        html.push('\n');
    }

    html.push_str("</div>\n</body>\n</html>");
    html
}
