//! Server-rendered HTML for the browser flow.

use std::fmt::Write;

use crate::auth::{Flash, UserIdentity};
use crate::inference::PredictionResult;

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

fn layout(title: &str, user: Option<&UserIdentity>, flashes: &[Flash], body: &str) -> String {
    let nav = match user {
        Some(user) => format!(
            r#"<span>Signed in as {}</span> <a href="/predict">Predict</a> <a href="/logout">Log out</a>"#,
            escape(&user.user_name)
        ),
        None => r#"<a href="/login">Log in</a> <a href="/register">Register</a>"#.to_string(),
    };

    let mut notices = String::new();
    for flash in flashes {
        let _ = write!(
            notices,
            r#"<div class="alert alert-{}">{}</div>"#,
            flash.category.as_str(),
            escape(&flash.message)
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>{title} | Malaria Screen</title></head>
<body>
<nav><a href="/">Home</a> {nav}</nav>
<main>
{notices}
{body}
</main>
</body>
</html>
"#,
        title = escape(title),
    )
}

pub fn home(flashes: &[Flash]) -> String {
    layout(
        "Home",
        None,
        flashes,
        r#"<h1>Malaria cell screening</h1>
<p>Upload a thin blood smear cell image and a trained model will tell you whether it looks parasitized or uninfected.</p>
<p><a href="/predict">Start a prediction</a></p>"#,
    )
}

pub fn login(flashes: &[Flash], next: Option<&str>) -> String {
    let action = match next {
        Some(next) => crate::auth::session::login_url(next),
        None => "/login".to_string(),
    };

    let body = format!(
        r#"<h1>Log in</h1>
<form method="post" action="{}">
<label>Email <input type="email" name="email" required></label>
<label>Password <input type="password" name="password" required></label>
<button type="submit">Log in</button>
</form>
<p>No account? <a href="/register">Register</a></p>"#,
        escape(&action)
    );

    layout("Log in", None, flashes, &body)
}

pub fn register(flashes: &[Flash]) -> String {
    layout(
        "Register",
        None,
        flashes,
        r#"<h1>Register</h1>
<form method="post" action="/register">
<label>Name <input type="text" name="name" required></label>
<label>Email <input type="email" name="email" required></label>
<label>Password <input type="password" name="password" required></label>
<button type="submit">Create account</button>
</form>"#,
    )
}

pub fn predict(
    user: &UserIdentity,
    models: &[String],
    flashes: &[Flash],
    result: Option<&PredictionResult>,
) -> String {
    let mut options = String::new();
    for model in models {
        let _ = write!(options, r#"<option value="{0}">{0}</option>"#, escape(model));
    }

    let mut body = format!(
        r#"<h1>Classify a cell image</h1>
<form method="post" action="/predict" enctype="multipart/form-data">
<label>Image <input type="file" name="file" accept="image/*"></label>
<label>Model <select name="model">{options}</select></label>
<button type="submit">Predict</button>
</form>"#
    );

    if let Some(result) = result {
        let _ = write!(
            body,
            r#"
<section class="result">
<h2>Result: {label}</h2>
<p>Confidence: {confidence:.2}%</p>
<img src="/{image}" alt="Uploaded cell image">
</section>"#,
            label = result.label,
            confidence = result.confidence,
            image = escape(&result.image_url),
        );
    }

    layout("Predict", Some(user), flashes, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::Label;

    fn user() -> UserIdentity {
        UserIdentity {
            user_id: 1,
            user_name: "<Ada>".into(),
        }
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn predict_page_lists_models_and_result() {
        let result = PredictionResult {
            label: Label::Uninfected,
            confidence: 80.0,
            image_url: "static/uploads/cell.png".into(),
        };
        let html = predict(&user(), &["MobileNet".to_string(), "VGG16".to_string()], &[], Some(&result));

        assert!(html.contains(r#"<option value="VGG16">VGG16</option>"#));
        assert!(html.contains("Result: Uninfected"));
        assert!(html.contains("Confidence: 80.00%"));
        assert!(html.contains(r#"src="/static/uploads/cell.png""#));
        assert!(html.contains("Signed in as &lt;Ada&gt;"));
    }

    #[test]
    fn notices_are_rendered_escaped() {
        let html = predict(&user(), &[], &[Flash::danger("Error processing file: <bad>")], None);
        assert!(html.contains(r#"<div class="alert alert-danger">Error processing file: &lt;bad&gt;</div>"#));
        assert!(!html.contains("Result:"));
    }

    #[test]
    fn login_form_keeps_next() {
        let html = login(&[], Some("/predict"));
        assert!(html.contains(r#"action="/login?next=%2Fpredict""#));
    }
}
