//! Message rendering.

/// Substitutes `{{userName}}` and `{{documentName}}` in a template.
///
/// The result is frozen into the notification when it is sent.
pub fn render_message(template: &str, user_name: &str, document_name: &str) -> String {
    template
        .replace("{{userName}}", user_name)
        .replace("{{documentName}}", document_name)
}
