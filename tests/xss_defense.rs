use inkpress::{render, sanitize_html};

fn has_script_construct(html: &str) -> bool {
    let lowered = html.to_lowercase();
    lowered.contains("<script")
        || lowered.contains("javascript:")
        || lowered.contains("onerror=")
        || lowered.contains("onload=")
        || lowered.contains("<iframe")
}

#[test]
fn script_tags_are_removed() {
    let html = render("Hello <script>alert(1)</script> world", "").html;

    assert!(!has_script_construct(&html));
    assert!(!html.contains("alert(1)"));
    assert!(html.contains("Hello"));
}

#[test]
fn event_handlers_are_stripped() {
    let html = render("<img src=x onerror=alert(1)>", "").html;

    assert!(!has_script_construct(&html));
    assert!(html.contains("<img src=\"x\">"));
}

#[test]
fn javascript_links_are_neutralised() {
    let html = render("[x](javascript:alert(1))", "").html;

    assert!(!has_script_construct(&html));
    assert!(html.contains("<a href=\"\""));
}

#[test]
fn obfuscated_schemes_are_neutralised() {
    for markdown in [
        "[x](JaVaScRiPt:alert(1))",
        "<a href=\"java&#x09;script:alert(1)\">x</a>",
        "<a href=\" javascript:alert(1)\">x</a>",
        "[x](vbscript:msgbox(1))",
        "Click <a href=\"&#106avascript:alert(document.domain)\">here</a> now",
        "<a href=\"javascript&#58alert(1)\">x</a>",
        "[x](&#x6A;avascript:alert(1))",
    ] {
        let html = render(markdown, "").html;
        assert!(
            html.contains("href=\"\""),
            "expected neutralised href for {markdown}: {html}"
        );
    }
}

#[test]
fn image_data_uris_survive_but_html_data_uris_do_not() {
    let image = render("![a](data:image/png;base64,AAAA)", "").html;
    assert!(image.contains("src=\"data:image/png;base64,AAAA\""));

    let link = render("[a](data:text/html;base64,AAAA)", "").html;
    assert!(link.contains("href=\"\""));
    assert!(!link.contains("data:text/html"));
}

#[test]
fn dangerous_containers_lose_their_content() {
    let html = render(
        "<iframe src=\"https://evil.example\"></iframe>\n<svg><script>alert(1)</script></svg>\n<form action=\"/x\"><input name=a></form>",
        "",
    )
    .html;

    assert!(!has_script_construct(&html));
    assert!(!html.contains("<svg"));
    assert!(!html.contains("<form"));
    assert!(!html.contains("<input"));
}

#[test]
fn code_blocks_show_markup_as_text() {
    let html = render("```html\n<script>alert(1)</script>\n```", "").html;

    assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    assert!(!html.contains("<script"));
}

#[test]
fn table_cells_escape_markup() {
    let html = render("| a |\n|---|\n| <img src=x onerror=alert(1)> |", "").html;

    assert!(html.contains("<td>&lt;img src=x onerror=alert(1)&gt;</td>"));
    assert!(!html.contains("<img"));
}

#[test]
fn headings_cannot_smuggle_handlers() {
    let result = render("## Intro <b onmouseover=alert(1)>bold</b>", "");

    assert!(!result.html.contains("onmouseover"));
    assert!(result.html.contains("<b>bold</b>"));
    assert_eq!(result.toc[0].text, "Intro bold");
}

#[test]
fn sanitizing_twice_changes_nothing() {
    let inputs = [
        "<p onclick='x'>a</p><script>b</script>",
        "<<script>x</script>script>alert(1)<</script>/script>",
        "<a href=javascript:alert(1) title='say \"hi\"'>x</a>",
        "<IMG SRC=\"jav&#x0A;ascript:alert(1)\">",
        "<a href=\"&#106avascript:alert(1)\">x</a>",
        "<a href=\"javascript&#58alert(1)\">x</a>",
        "plain text with 1 < 2 and 3 > 1",
    ];

    for input in inputs {
        let once = sanitize_html(input);
        assert_eq!(sanitize_html(&once), once, "not idempotent for {input}");
        assert!(!has_script_construct(&once), "unsafe output for {input}: {once}");
    }
}
