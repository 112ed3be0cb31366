use axum::response::Html;

use pdfmeta_reporting::ExportFormat;

use crate::state::Settings;

const INDEX_HTML: &str = include_str!("../templates/index.html");

/// Render the index page, injecting the mount prefix and upload defaults.
pub fn render_index(settings: &Settings) -> Html<String> {
    let checked = if settings.include_text { "checked" } else { "" };
    let (csv_selected, json_selected) = match settings.export_format {
        ExportFormat::Csv => ("selected", ""),
        ExportFormat::Json => ("", "selected"),
    };
    let html = INDEX_HTML
        .replace("{{ base_path }}", &settings.base_path)
        .replace("{{ include_text_checked }}", checked)
        .replace("{{ csv_selected }}", csv_selected)
        .replace("{{ json_selected }}", json_selected)
        .replace("{{ max_upload_mb }}", &settings.max_upload_mb.to_string());
    Html(html)
}
