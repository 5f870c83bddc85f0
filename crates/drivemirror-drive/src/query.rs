//! Drive search query building
//!
//! Turns an [`EntryQuery`] into the `q` parameter of `files.list` and a
//! [`FieldSet`] into its `fields` mask.

use drivemirror_core::ports::{EntryField, EntryQuery, FieldSet, ParentFilter};

/// MIME type Drive uses for folders
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Quote-safe form of `value` inside a single-quoted query literal
pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '\\' || c == '\'' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// The `q` parameter for `query`; trashed files are always excluded
pub fn search_query(query: &EntryQuery) -> String {
    let mut clauses = Vec::with_capacity(4);

    if let Some(name) = &query.name {
        clauses.push(format!("name = '{}'", escape(name)));
    }
    match &query.parent {
        ParentFilter::Any => {}
        ParentFilter::TopLevel => clauses.push("'root' in parents".to_string()),
        ParentFilter::Folder(id) => clauses.push(format!("'{}' in parents", escape(id.as_str()))),
    }
    if query.folders_only {
        clauses.push(format!("mimeType = '{FOLDER_MIME_TYPE}'"));
    } else if query.files_only {
        clauses.push(format!("mimeType != '{FOLDER_MIME_TYPE}'"));
    }
    clauses.push("trashed = false".to_string());

    clauses.join(" and ")
}

/// Drive field name for an optional entry field
pub fn field_name(field: EntryField) -> &'static str {
    match field {
        EntryField::ModifiedTime => "modifiedTime",
        EntryField::Parents => "parents",
        EntryField::MimeType => "mimeType",
    }
}

/// The `fields` mask for a listing returning `fields`
pub fn fields_mask(fields: &FieldSet) -> String {
    let mut names = vec!["id", "name"];
    names.extend(fields.iter().map(field_name));
    format!("nextPageToken, files({})", names.join(", "))
}
