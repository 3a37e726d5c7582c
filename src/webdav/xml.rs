/// Properties requested when listing a collection.
pub const LISTING_PROPERTIES: &[&str] = &[
    "resourcetype",
    "getcontentlength",
    "getlastmodified",
    "creationdate",
    "displayname",
    "getcontenttype",
    "getetag",
];

/// Build a `DAV:` namespace `<D:propfind>` body requesting the given properties.
pub fn build_propfind_body(properties: &[&str]) -> String {
    let mut body = String::from(r#"<?xml version="1.0" encoding="utf-8"?>"#);
    body.push_str(r#"<D:propfind xmlns:D="DAV:"><D:prop>"#);
    for property in properties {
        body.push_str("<D:");
        body.push_str(property);
        body.push_str("/>");
    }
    body.push_str("</D:prop></D:propfind>");
    body
}
