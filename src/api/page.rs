use std::fmt::Write;

use crate::models::Recommendation;

/// Everything the recommendation page can show
#[derive(Debug, Default)]
pub struct PageView<'a> {
    pub titles: Vec<&'a str>,
    pub selected: Option<&'a str>,
    pub error: Option<String>,
    pub recommendations: Vec<Recommendation>,
}

impl<'a> PageView<'a> {
    pub fn new(titles: impl Iterator<Item = &'a str>) -> Self {
        Self {
            titles: titles.collect(),
            ..Default::default()
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn with_recommendations(
        mut self,
        selected: &'a str,
        recommendations: Vec<Recommendation>,
    ) -> Self {
        self.selected = Some(selected);
        self.recommendations = recommendations;
        self
    }

    pub fn render(&self) -> String {
        let mut html = String::with_capacity(4096 + self.titles.len() * 48);

        html.push_str(concat!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n",
            "<meta charset=\"utf-8\">\n",
            "<title>Movie Recommender</title>\n",
            "<style>\n",
            "body{font-family:sans-serif;margin:2rem;}\n",
            ".error{color:#b00020;}\n",
            ".grid{display:flex;flex-wrap:wrap;gap:1rem;}\n",
            ".card{width:180px;text-align:center;}\n",
            ".card img{width:180px;height:270px;object-fit:cover;}\n",
            "</style>\n</head>\n<body>\n",
            "<h1>Movie Recommender</h1>\n",
            "<form method=\"post\" action=\"/\">\n",
            "<select name=\"movie\">\n",
            "<option value=\"\">Select a movie</option>\n",
        ));

        for title in &self.titles {
            let escaped = escape(title);
            let selected = if self.selected == Some(*title) {
                " selected"
            } else {
                ""
            };
            let _ = writeln!(
                html,
                "<option value=\"{}\"{}>{}</option>",
                escaped, selected, escaped
            );
        }

        html.push_str("</select>\n<button type=\"submit\">Recommend</button>\n</form>\n");

        if let Some(error) = &self.error {
            let _ = writeln!(html, "<p class=\"error\">{}</p>", escape(error));
        }

        if let Some(selected) = self.selected {
            let _ = writeln!(html, "<h2>Because you chose {}</h2>", escape(selected));
            html.push_str("<div class=\"grid\">\n");
            for recommendation in &self.recommendations {
                let title = escape(&recommendation.title);
                let _ = writeln!(
                    html,
                    "<div class=\"card\"><img src=\"{}\" alt=\"{}\"><p>{}</p></div>",
                    escape(&recommendation.poster_url),
                    title,
                    title
                );
            }
            html.push_str("</div>\n");
        }

        html.push_str("</body>\n</html>\n");
        html
    }
}

/// Escapes text for use in HTML element content and quoted attributes
pub fn escape(text: &str) -> String {
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
