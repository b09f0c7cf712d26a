//! Server-rendered pages.

use std::fmt::Write;

use crate::{quotes::Quote, track::Sound, utils::escape_html};

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>{title}</title>
</head>
<body>
    <nav>
        <a href="/">Home</a> | <a href="/audio/settings">Audio</a> | <a href="/favorite_quotes">Favorite Quotes</a>
    </nav>
    <main>
{body}
    </main>
</body>
</html>
"#,
        title = escape_html(title),
    )
}

fn sound_option(out: &mut String, input_type: &str, field: &str, sound: &Sound) {
    let name = escape_html(&sound.name);
    let duration = sound
        .duration_str
        .as_deref()
        .map(|d| format!(" <small>({d})</small>"))
        .unwrap_or_default();

    let _ = writeln!(
        out,
        r#"            <label><input type="{input_type}" name="{field}" value="{name}"> {name}{duration}</label><br>"#
    );
}

pub fn audio_settings(songs: &[Sound], sound_effects: &[Sound]) -> String {
    let mut body = String::new();
    body.push_str(
        r#"        <h1>Audio Settings</h1>
        <form method="post" action="/audio/settings">
            <fieldset>
            <legend>Music</legend>
            <label><input type="radio" name="music_on" value="true"> On</label>
            <label><input type="radio" name="music_on" value="false" checked> Off</label><br>
"#,
    );
    for song in songs {
        sound_option(&mut body, "checkbox", "music_choices", song);
    }
    body.push_str(
        r#"            <label>Volume <input type="range" name="music_vol" min="0" max="100"></label>
            </fieldset>
            <fieldset>
            <legend>Sound effects</legend>
            <label><input type="radio" name="sfx_on" value="true"> On</label>
            <label><input type="radio" name="sfx_on" value="false" checked> Off</label><br>
"#,
    );
    for sfx in sound_effects {
        sound_option(&mut body, "radio", "sfx_choice", sfx);
    }
    body.push_str(
        r#"            <label>Volume <input type="range" name="sfx_vol" min="0" max="100"></label>
            </fieldset>
            <button type="submit">Save</button>
        </form>"#,
    );

    layout("Audio Settings", &body)
}

fn quote_text(quote: &Quote) -> String {
    match &quote.author {
        Some(author) => format!(
            "<blockquote>{}</blockquote><cite>{}</cite>",
            escape_html(&quote.text),
            escape_html(author)
        ),
        None => format!("<blockquote>{}</blockquote>", escape_html(&quote.text)),
    }
}

pub fn home(quote: Option<&Quote>, is_favorite: bool) -> String {
    let mut body = String::from("        <h1>Home</h1>\n");

    match quote {
        Some(quote) => {
            let text = escape_html(&quote.text);
            let author = quote.author.as_deref().map(escape_html).unwrap_or_default();
            let (to_save, label) = if is_favorite {
                ("false", "Remove from favorites")
            } else {
                ("true", "Save to favorites")
            };

            let _ = write!(
                body,
                r#"        <section class="quote">
            {}
            <form method="post" action="/">
                <input type="hidden" name="quote" value="{text}">
                <input type="hidden" name="author" value="{author}">
                <input type="hidden" name="to_save" value="{to_save}">
                <button type="submit">{label}</button>
            </form>
        </section>"#,
                quote_text(quote)
            );
        }
        None => body.push_str("        <p>No quote for today.</p>"),
    }

    layout("Home", &body)
}

pub fn favorite_quotes(quotes: &[Quote]) -> String {
    let mut body = String::from("        <h1>Favorite Quotes</h1>\n");

    if quotes.is_empty() {
        body.push_str("        <p>No favorite quotes yet.</p>");
    } else {
        body.push_str("        <ul>\n");
        for quote in quotes {
            let _ = writeln!(body, "            <li>{}</li>", quote_text(quote));
        }
        body.push_str("        </ul>");
    }

    layout("Favorite Quotes", &body)
}
