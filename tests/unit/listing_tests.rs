use dav_trust::parse_listing;

const NEXTCLOUD_LISTING: &str = r#"<?xml version="1.0"?>
<d:multistatus xmlns:d="DAV:" xmlns:s="http://sabredav.org/ns" xmlns:oc="http://owncloud.org/ns">
  <d:response>
    <d:href>/remote.php/dav/files/alice/Notes/</d:href>
    <d:propstat>
      <d:prop>
        <d:getlastmodified>Mon, 05 Oct 2026 08:12:44 GMT</d:getlastmodified>
        <d:resourcetype><d:collection/></d:resourcetype>
        <d:getetag>&quot;6523a1b4c2f0e&quot;</d:getetag>
      </d:prop>
      <d:status>HTTP/1.1 200 OK</d:status>
    </d:propstat>
    <d:propstat>
      <d:prop>
        <d:getcontentlength/>
        <d:getcontenttype/>
      </d:prop>
      <d:status>HTTP/1.1 404 Not Found</d:status>
    </d:propstat>
  </d:response>
  <d:response>
    <d:href>/remote.php/dav/files/alice/Notes/Tom%20%26%20Jerry.md</d:href>
    <d:propstat>
      <d:prop>
        <d:getlastmodified>Sun, 04 Oct 2026 19:01:02 GMT</d:getlastmodified>
        <d:getcontentlength>1523</d:getcontentlength>
        <d:resourcetype/>
        <d:getcontenttype>text/markdown</d:getcontenttype>
        <d:displayname>Tom &amp; Jerry</d:displayname>
      </d:prop>
      <d:status>HTTP/1.1 200 OK</d:status>
    </d:propstat>
  </d:response>
</d:multistatus>"#;

#[test]
fn test_parse_listing_detects_collections_and_files() {
    let entries = parse_listing(NEXTCLOUD_LISTING.as_bytes()).expect("valid multistatus");
    assert_eq!(entries.len(), 2);

    let folder = &entries[0];
    assert_eq!(folder.href, "/remote.php/dav/files/alice/Notes/");
    assert_eq!(folder.name, "Notes");
    assert!(folder.is_collection);
    assert_eq!(folder.content_length, None);
    assert_eq!(folder.etag.as_deref(), Some("\"6523a1b4c2f0e\""));
    assert_eq!(folder.status.as_deref(), Some("HTTP/1.1 200 OK"));

    let file = &entries[1];
    assert_eq!(file.name, "Tom & Jerry.md");
    assert!(!file.is_collection);
    assert_eq!(file.content_length, Some(1523));
    assert_eq!(file.content_type.as_deref(), Some("text/markdown"));
    assert_eq!(file.displayname.as_deref(), Some("Tom & Jerry"));
    assert_eq!(
        file.last_modified.as_deref(),
        Some("Sun, 04 Oct 2026 19:01:02 GMT")
    );
}

#[test]
fn test_parse_listing_accepts_unprefixed_default_namespace() {
    let xml = r#"<multistatus xmlns="DAV:">
        <response><href>/dav/a.txt</href>
          <propstat><prop><getcontentlength>3</getcontentlength></prop>
          <status>HTTP/1.1 200 OK</status></propstat>
        </response>
      </multistatus>"#;

    let entries = parse_listing(xml.as_bytes()).expect("valid multistatus");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "a.txt");
    assert_eq!(entries[0].content_length, Some(3));
}

#[test]
fn test_parse_listing_empty_multistatus() {
    let entries = parse_listing(br#"<D:multistatus xmlns:D="DAV:"/>"#).expect("valid document");
    assert!(entries.is_empty());
}

#[test]
fn test_parse_listing_rejects_malformed_xml() {
    assert!(parse_listing(b"<d:multistatus><d:response></d:multistatus>").is_err());
}
